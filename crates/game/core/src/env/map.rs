use crate::state::Direction;

/// Tile passability exposed by the host map.
pub trait MapOracle: Send + Sync {
    /// Whether an agent travelling in `direction` may enter tile `(x, y)`.
    fn can_occupy(&self, x: i32, y: i32, direction: Direction) -> bool;
}

/// A map with no obstructions.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenMap;

impl MapOracle for OpenMap {
    fn can_occupy(&self, _x: i32, _y: i32, _direction: Direction) -> bool {
        true
    }
}
