/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Void,        // Outside the map (short rows, beyond the edges)
    Wall,
    Floor,
    Target,      // Where the box must go
    AdvanceTile, // Where the player must stand once the box is placed
}

impl Tile {
    /// Can the player or the box occupy this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Floor | Tile::Target | Tile::AdvanceTile)
    }
}
