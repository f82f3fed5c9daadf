use std::fmt;

/// Generation-checked handle to an agent stored in the [`AgentArena`](super::AgentArena).
///
/// A handle whose slot has since been reused (generation mismatch) resolves to
/// "not found" instead of aliasing the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId {
    index: u32,
    generation: u32,
}

impl AgentId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Allegiance group. Agents on different teams are opponents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u8);

impl TeamId {
    /// Team of the player party.
    pub const PARTY: Self = Self(0);
    /// Default hostile team.
    pub const HOSTILE: Self = Self(1);

    #[inline]
    pub fn is_opponent_of(self, other: TeamId) -> bool {
        self != other
    }
}

/// Identifier of a skill definition served by the skill oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u16);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skill:{}", self.0)
    }
}

/// Identifier of a status (state) definition served by the status oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusId(pub u16);

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status:{}", self.0)
    }
}

/// Identifier of an animation asset. Resolved by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationId(pub u16);

/// Unique identifier of an in-flight action. Monotonically increasing per field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// Continuous field position expressed in tile units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in tiles.
    pub fn distance(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Tile containing this position.
    pub fn tile(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    /// Returns this position shifted by whole tiles.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx as f32, self.y + dy as f32)
    }

    pub fn offset_by(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Facing of an agent. Screen coordinates: `Down` is +y, `Right` is +x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    /// Unit offset `(dx, dy)` for one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
        }
    }

    /// True when the facing axis is horizontal.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Facing that points from `from` toward `to` along the dominant axis.
    ///
    /// Ties favour the vertical axis, matching how four-way sprites turn.
    pub fn toward(from: Position, to: Position) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy < 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toward_prefers_dominant_axis() {
        let origin = Position::ORIGIN;
        assert_eq!(Direction::toward(origin, Position::new(3.0, 1.0)), Direction::Right);
        assert_eq!(Direction::toward(origin, Position::new(-3.0, 1.0)), Direction::Left);
        assert_eq!(Direction::toward(origin, Position::new(1.0, -2.0)), Direction::Up);
        assert_eq!(Direction::toward(origin, Position::new(2.0, 2.0)), Direction::Down);
    }

    #[test]
    fn reverse_is_involutive() {
        for dir in [Direction::Down, Direction::Left, Direction::Right, Direction::Up] {
            assert_eq!(dir.reverse().reverse(), dir);
            let (dx, dy) = dir.offset();
            let (rx, ry) = dir.reverse().offset();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
    }
}
