/// Events emitted during a simulation step.
/// The presentation layer consumes these once for particles, glows and sound.
/// Nothing in the core reads them back.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Stepped,
    Pushed,
    BoxReachedTarget,
    BoxLeftTarget,
    LevelCompleted,
    Undone,
    LevelReset,
    LevelLoaded { index: usize },
    AllLevelsComplete,
}
