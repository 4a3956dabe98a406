/// Visual timers: the player slide animation and particle bursts.
///
/// Both are driven by the tick loop and read by the renderer. Nothing in
/// the puzzle logic reads them, except that an active move animation gates
/// the next move.
///
/// Units: particle positions and velocities are in grid cells, so the
/// renderer maps them the same way it maps the player.

use crate::domain::entity::{Direction, Position};

// ══════════════════════════════════════════════════════════════
// Move animation
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct MoveAnimation {
    progress: f32,
    speed: f32,
    direction: Direction,
    box_moved: bool,
}

impl MoveAnimation {
    /// Idle animation (progress already at 1).
    pub fn new(speed: f32) -> Self {
        MoveAnimation {
            progress: 1.0,
            speed,
            direction: Direction::Down,
            box_moved: false,
        }
    }

    pub fn start(&mut self, direction: Direction, box_moved: bool) {
        self.progress = 0.0;
        self.direction = direction;
        self.box_moved = box_moved;
    }

    pub fn tick(&mut self) {
        if self.is_active() {
            self.progress = (self.progress + self.speed).min(1.0);
        }
    }

    pub fn cancel(&mut self) {
        self.progress = 1.0;
        self.box_moved = false;
    }

    pub fn is_active(&self) -> bool {
        self.progress < 1.0
    }

    pub fn box_moved(&self) -> bool {
        self.box_moved
    }

    /// How far (in cells) a sprite still lags behind its settled cell,
    /// opposite to the move direction. (0, 0) when idle.
    pub fn lag(&self) -> (f32, f32) {
        if !self.is_active() {
            return (0.0, 0.0);
        }
        let (dx, dy) = self.direction.delta();
        let remaining = 1.0 - self.progress;
        (-(dx as f32) * remaining, -(dy as f32) * remaining)
    }
}

// ══════════════════════════════════════════════════════════════
// Particles
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BurstKind {
    /// Box landed on the target.
    Success,
    /// Level completed at the advance tile.
    Transition,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: u32,
    pub max_life: u32,
    pub kind: BurstKind,
}

impl Particle {
    /// Remaining life in [0, 1], for fading.
    pub fn fade(&self) -> f32 {
        if self.max_life == 0 { 0.0 } else { self.life as f32 / self.max_life as f32 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        ParticleSystem { particles: Vec::new() }
    }

    /// `count` particles from the centre of `at`, evenly spaced angles.
    /// Speed cycles through `base .. base + spread` tenths of a cell per tick.
    pub fn spawn_burst(&mut self, at: Position, kind: BurstKind, count: u32, life: u32) {
        let (base, spread) = match kind {
            BurstKind::Success => (2, 3),
            BurstKind::Transition => (3, 4),
        };
        let cx = at.x as f32 + 0.5;
        let cy = at.y as f32 + 0.5;
        for i in 0..count {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let speed = (base + i % spread) as f32 / 10.0;
            self.particles.push(Particle {
                x: cx,
                y: cy,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life,
                max_life: life,
                kind,
            });
        }
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_runs_for_inverse_speed_ticks() {
        let mut a = MoveAnimation::new(0.25);
        assert!(!a.is_active());
        a.start(Direction::Right, true);
        assert!(a.is_active());
        assert!(a.box_moved());
        let mut ticks = 0;
        while a.is_active() {
            a.tick();
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert_eq!(a.progress, 1.0);
        assert_eq!(a.lag(), (0.0, 0.0));
    }

    #[test]
    fn lag_points_back_along_the_move() {
        let mut a = MoveAnimation::new(0.25);
        a.start(Direction::Right, false);
        assert_eq!(a.lag(), (-1.0, 0.0));
        a.tick();
        assert_eq!(a.lag(), (-0.75, 0.0));

        a.start(Direction::Up, false);
        a.tick();
        a.tick();
        assert_eq!(a.lag(), (0.0, 0.5));
    }

    #[test]
    fn cancel_stops_animation() {
        let mut a = MoveAnimation::new(0.25);
        a.start(Direction::Left, true);
        a.cancel();
        assert!(!a.is_active());
        assert!(!a.box_moved());
    }

    #[test]
    fn success_burst_shape() {
        let mut ps = ParticleSystem::new();
        ps.spawn_burst(Position::new(4, 2), BurstKind::Success, 30, 60);
        assert_eq!(ps.iter().count(), 30);
        let speeds: Vec<f32> = ps.iter().map(|p| (p.vx * p.vx + p.vy * p.vy).sqrt()).collect();
        for (i, s) in speeds.iter().enumerate() {
            let expected = (2 + i % 3) as f32 / 10.0;
            assert!((s - expected).abs() < 1e-4, "particle {i}: {s} vs {expected}");
        }
        assert!(ps.iter().all(|p| p.x == 4.5 && p.y == 2.5 && p.life == 60));
    }

    #[test]
    fn transition_burst_uses_faster_speeds() {
        let mut ps = ParticleSystem::new();
        ps.spawn_burst(Position::new(0, 0), BurstKind::Transition, 8, 80);
        let max = ps.iter().map(|p| (p.vx * p.vx + p.vy * p.vy).sqrt()).fold(0.0f32, f32::max);
        assert!((max - 0.6).abs() < 1e-4);
    }

    #[test]
    fn particles_expire_after_life_ticks() {
        let mut ps = ParticleSystem::new();
        ps.spawn_burst(Position::new(1, 1), BurstKind::Success, 5, 3);
        ps.update();
        ps.update();
        assert_eq!(ps.iter().count(), 5);
        assert!(ps.iter().all(|p| p.life == 1));
        ps.update();
        assert!(ps.is_empty());
    }

    #[test]
    fn particles_drift_by_velocity() {
        let mut ps = ParticleSystem::new();
        ps.spawn_burst(Position::new(0, 0), BurstKind::Success, 1, 10);
        ps.update();
        let p = ps.iter().next().unwrap();
        // angle 0, speed 0.2
        assert!((p.x - 0.7).abs() < 1e-5);
        assert!((p.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn clear_removes_all() {
        let mut ps = ParticleSystem::new();
        ps.spawn_burst(Position::new(0, 0), BurstKind::Transition, 50, 80);
        ps.clear();
        assert!(ps.is_empty());
    }
}
