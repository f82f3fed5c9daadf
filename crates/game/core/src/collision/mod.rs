//! Effect-area hit testing.
//!
//! Every shape is a pure predicate over the target position, the action's
//! anchor, its range and the caster's facing. Distances are in tiles; the
//! thin shapes (line, wall, cross) have a half-tile tolerance on their narrow
//! axis.

use std::fmt;
use std::str::FromStr;

use crate::state::{Direction, Position};

/// Half-width of the narrow axis of line-like shapes.
const HALF_TILE: f32 = 0.5;

/// Tolerance absorbing float drift from continuous movement.
const EPSILON: f32 = 1e-4;

/// Geometry of an action's effect area.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum Shape {
    /// Euclidean distance within range.
    #[default]
    Circle,
    /// Manhattan distance within range.
    Rhombus,
    /// Both axis deltas within range.
    Square,
    /// Square restricted to the facing side.
    FrontSquare,
    /// Rhombus restricted to the facing side.
    Arc,
    /// Narrow strip extending forward from the anchor.
    Line,
    /// Narrow strip perpendicular to the facing.
    Wall,
    /// Plus shape centred on the anchor.
    Cross,
    /// A shape name the content did not recognise. Never hits.
    #[strum(default)]
    Unknown(String),
}

impl Shape {
    /// Returns `true` when `target` lies inside this shape anchored at `anchor`.
    pub fn contains(&self, target: Position, anchor: Position, range: f32, facing: Direction) -> bool {
        let dx = target.x - anchor.x;
        let dy = target.y - anchor.y;
        let (fx, fy) = facing.offset();
        let forward = dx * fx as f32 + dy * fy as f32;
        let lateral = if facing.is_horizontal() { dy } else { dx };
        let within = |value: f32, limit: f32| value <= limit + EPSILON;

        match self {
            Shape::Circle => within((dx * dx + dy * dy).sqrt(), range),
            Shape::Rhombus => within(dx.abs() + dy.abs(), range),
            Shape::Square => within(dx.abs(), range) && within(dy.abs(), range),
            Shape::FrontSquare => {
                within(dx.abs(), range) && within(dy.abs(), range) && forward >= -EPSILON
            }
            Shape::Arc => within(dx.abs() + dy.abs(), range) && forward >= -EPSILON,
            Shape::Line => {
                within(lateral.abs(), HALF_TILE) && forward >= -EPSILON && within(forward, range)
            }
            Shape::Wall => within(forward.abs(), HALF_TILE) && within(lateral.abs(), range),
            Shape::Cross => {
                (within(dx.abs(), HALF_TILE) && within(dy.abs(), range))
                    || (within(dy.abs(), HALF_TILE) && within(dx.abs(), range))
            }
            Shape::Unknown(name) => {
                tracing::warn!(shape = %name, "unknown collision shape never hits");
                false
            }
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Shape::Unknown(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Shape::Circle => "circle",
            Shape::Rhombus => "rhombus",
            Shape::Square => "square",
            Shape::FrontSquare => "front_square",
            Shape::Arc => "arc",
            Shape::Line => "line",
            Shape::Wall => "wall",
            Shape::Cross => "cross",
            Shape::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Shape {
    fn from(name: String) -> Self {
        match Shape::from_str(&name) {
            Ok(shape) => shape,
            Err(_) => Shape::Unknown(name),
        }
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> Self {
        shape.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: Position = Position::ORIGIN;

    fn at(x: f32, y: f32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn circle_uses_euclidean_distance() {
        assert!(Shape::Circle.contains(at(3.0, 4.0), ANCHOR, 5.0, Direction::Down));
        assert!(!Shape::Circle.contains(at(4.0, 4.0), ANCHOR, 5.0, Direction::Down));
    }

    #[test]
    fn rhombus_and_square_differ_on_diagonals() {
        let corner = at(2.0, 2.0);
        assert!(Shape::Square.contains(corner, ANCHOR, 2.0, Direction::Down));
        assert!(!Shape::Rhombus.contains(corner, ANCHOR, 2.0, Direction::Down));
        assert!(Shape::Rhombus.contains(at(1.0, 1.0), ANCHOR, 2.0, Direction::Down));
    }

    #[test]
    fn front_shapes_exclude_targets_behind() {
        // Facing down means +y is in front.
        assert!(Shape::FrontSquare.contains(at(1.0, 1.0), ANCHOR, 2.0, Direction::Down));
        assert!(!Shape::FrontSquare.contains(at(1.0, -1.0), ANCHOR, 2.0, Direction::Down));
        assert!(Shape::Arc.contains(at(-1.0, 0.0), ANCHOR, 2.0, Direction::Left));
        assert!(!Shape::Arc.contains(at(1.0, 0.0), ANCHOR, 2.0, Direction::Left));
        // Level with the anchor counts as the facing side.
        assert!(Shape::FrontSquare.contains(at(2.0, 0.0), ANCHOR, 2.0, Direction::Down));
    }

    #[test]
    fn line_extends_forward_only() {
        assert!(Shape::Line.contains(at(3.0, 0.4), ANCHOR, 3.0, Direction::Right));
        assert!(!Shape::Line.contains(at(3.0, 0.6), ANCHOR, 3.0, Direction::Right));
        assert!(!Shape::Line.contains(at(-1.0, 0.0), ANCHOR, 3.0, Direction::Right));
        assert!(!Shape::Line.contains(at(3.5, 0.0), ANCHOR, 3.0, Direction::Right));
    }

    #[test]
    fn wall_is_perpendicular_to_line() {
        assert!(Shape::Wall.contains(at(3.0, 0.0), ANCHOR, 3.0, Direction::Up));
        assert!(!Shape::Wall.contains(at(0.0, -1.0), ANCHOR, 3.0, Direction::Up));
        assert!(Shape::Wall.contains(at(0.0, -3.0), ANCHOR, 3.0, Direction::Left));
    }

    #[test]
    fn cross_forms_a_plus() {
        assert!(Shape::Cross.contains(at(0.0, 2.0), ANCHOR, 2.0, Direction::Down));
        assert!(Shape::Cross.contains(at(-2.0, 0.3), ANCHOR, 2.0, Direction::Down));
        assert!(!Shape::Cross.contains(at(1.0, 1.0), ANCHOR, 2.0, Direction::Down));
    }

    #[test]
    fn unknown_shape_never_hits() {
        let shape = Shape::from("spiral".to_string());
        assert_eq!(shape, Shape::Unknown("spiral".to_string()));
        assert!(!shape.contains(ANCHOR, ANCHOR, 10.0, Direction::Down));
    }

    #[test]
    fn names_round_trip() {
        for shape in [Shape::FrontSquare, Shape::Arc, Shape::Cross] {
            assert_eq!(Shape::from(String::from(shape.clone())), shape);
        }
    }
}
