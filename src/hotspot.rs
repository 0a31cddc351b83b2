//! Hotspot based levels.
//!
//! A hotspot is a point in the world with a base level. Each of its
//! [`LevelChange`] rules adds levels step by step as a spawn gets farther
//! away, either horizontally or vertically.

use crate::border::LevelBorder;
use crate::distance::DistanceMethod;
use crate::error::CalculationError;
use crate::numeric::narrow_i32;
use crate::variable::{VariableName, Variables};
use serde::{Deserialize, Serialize};

/// A point in the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance in all three axes.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The position as the seed variables `x`, `y` and `z`.
    pub fn to_variables(&self) -> Variables {
        let mut variables = Variables::new();
        for (name, value) in [("x", self.x), ("y", self.y), ("z", self.z)] {
            if let Ok(name) = VariableName::new(name) {
                variables.set(name, value);
            }
        }
        variables
    }
}

/// Which distance a [`LevelChange`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Distance over `x` and `z`, measured with the given method.
    Horizontal(DistanceMethod),
    /// `center.y - target.y`; the absolute value is used.
    Vertical,
}

/// Adds `level_change` levels for every `distance_per_change` blocks of
/// distance beyond `offset`.
///
/// # Examples
///
/// ```rust
/// use spawncalc::hotspot::{ChangeKind, LevelChange, Position};
/// use spawncalc::{DistanceMethod, LevelBorder};
///
/// let change = LevelChange::new(
///     ChangeKind::Horizontal(DistanceMethod::Chebyshev),
///     1,
///     100.0,
///     50.0,
///     LevelBorder::unbounded(),
/// )
/// .unwrap();
///
/// let center = Position::new(0.0, 64.0, 0.0);
/// assert_eq!(change.level_delta(&center, &Position::new(120.0, 64.0, 30.0)).unwrap(), 0);
/// assert_eq!(change.level_delta(&center, &Position::new(-360.0, 64.0, 30.0)).unwrap(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LevelChange {
    kind: ChangeKind,
    level_change: i32,
    distance_per_change: f64,
    offset: f64,
    border: LevelBorder,
}

impl LevelChange {
    /// Create a rule. `distance_per_change` must be positive and finite,
    /// `offset` must be finite.
    pub fn new(
        kind: ChangeKind,
        level_change: i32,
        distance_per_change: f64,
        offset: f64,
        border: LevelBorder,
    ) -> Result<Self, CalculationError> {
        if !(distance_per_change.is_finite() && distance_per_change > 0.0) {
            return Err(CalculationError::InvalidParameter {
                name: "distance per change",
                reason: format!("must be positive, got {}", distance_per_change),
            });
        }
        if !offset.is_finite() {
            return Err(CalculationError::InvalidParameter {
                name: "offset",
                reason: format!("must be finite, got {}", offset),
            });
        }
        Ok(Self {
            kind,
            level_change,
            distance_per_change,
            offset,
            border,
        })
    }

    /// The axis this change measures along.
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    fn distance(&self, center: &Position, target: &Position) -> f64 {
        match self.kind {
            ChangeKind::Horizontal(method) => method.distance_between(center.x, center.z, target.x, target.z),
            ChangeKind::Vertical => center.y - target.y,
        }
    }

    /// Levels added for a spawn at `target`.
    ///
    /// Fails with `ArithmeticOverflow` if the number of steps or the
    /// resulting delta does not fit into `i32`.
    pub fn level_delta(&self, center: &Position, target: &Position) -> Result<i32, CalculationError> {
        let distance = self.distance(center, target).abs();
        let changing = (distance - self.offset).max(0.0);
        let changes = narrow_i32((changing / self.distance_per_change).floor())?;
        let delta = changes
            .checked_mul(self.level_change)
            .ok_or(CalculationError::ArithmeticOverflow {
                value: f64::from(changes) * f64::from(self.level_change),
                target: "i32",
            })?;
        Ok(self.border.fit(delta))
    }
}

/// A named center with a base level and level change rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    name: String,
    center: Position,
    base_level: i32,
    border: LevelBorder,
    changes: Vec<LevelChange>,
}

impl Hotspot {
    /// Create a hotspot with no level changes.
    ///
    /// `border` fits the final level of a spawn near this hotspot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spawncalc::{Hotspot, LevelBorder, Position};
    ///
    /// let spawn = Hotspot::new("spawn", Position::default(), 5, LevelBorder::unbounded());
    /// assert_eq!(spawn.level_at(&Position::new(1000.0, 0.0, 1000.0)).unwrap(), 5);
    /// ```
    pub fn new(name: &str, center: Position, base_level: i32, border: LevelBorder) -> Self {
        Self {
            name: name.to_string(),
            center,
            base_level,
            border,
            changes: Vec::new(),
        }
    }

    /// Add a level change. Deltas of all changes are summed.
    pub fn with_change(mut self, change: LevelChange) -> Self {
        self.changes.push(change);
        self
    }

    /// The hotspot name, as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The point distances are measured from.
    pub fn center(&self) -> &Position {
        &self.center
    }

    /// The level at the center, before any change.
    pub fn base_level(&self) -> i32 {
        self.base_level
    }

    /// The level changes in the order they were added.
    pub fn changes(&self) -> &[LevelChange] {
        &self.changes
    }

    /// `border.fit(base_level + Σ deltas)`, with checked addition.
    pub fn level_at(&self, target: &Position) -> Result<i32, CalculationError> {
        let mut level = self.base_level;
        for change in &self.changes {
            let delta = change.level_delta(&self.center, target)?;
            level = level
                .checked_add(delta)
                .ok_or(CalculationError::ArithmeticOverflow {
                    value: f64::from(level) + f64::from(delta),
                    target: "i32",
                })?;
        }
        Ok(self.border.fit(level))
    }
}

/// The hotspot closest to `target`; ties go to the earlier hotspot.
pub fn nearest<'a>(hotspots: &'a [Hotspot], target: &Position) -> Option<&'a Hotspot> {
    let mut best: Option<(&Hotspot, f64)> = None;
    for hotspot in hotspots {
        let distance = hotspot.center.distance_to(target);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((hotspot, distance)),
        }
    }
    best.map(|(hotspot, _)| hotspot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal(level_change: i32, per: f64, offset: f64) -> LevelChange {
        LevelChange::new(
            ChangeKind::Horizontal(DistanceMethod::Euclidean),
            level_change,
            per,
            offset,
            LevelBorder::unbounded(),
        )
        .unwrap()
    }

    #[test]
    fn test_level_delta_steps() {
        let change = horizontal(2, 10.0, 5.0);
        let center = Position::default();
        assert_eq!(change.level_delta(&center, &Position::new(14.9, 0.0, 0.0)).unwrap(), 0);
        assert_eq!(change.level_delta(&center, &Position::new(15.0, 0.0, 0.0)).unwrap(), 2);
        assert_eq!(change.level_delta(&center, &Position::new(0.0, 0.0, -36.0)).unwrap(), 6);
    }

    #[test]
    fn test_vertical_uses_absolute_difference() {
        let change = LevelChange::new(ChangeKind::Vertical, 1, 10.0, 0.0, LevelBorder::unbounded()).unwrap();
        let center = Position::new(0.0, 62.0, 0.0);
        assert_eq!(change.level_delta(&center, &Position::new(0.0, 0.0, 0.0)).unwrap(), 6);
        assert_eq!(change.level_delta(&center, &Position::new(0.0, 124.0, 0.0)).unwrap(), 6);
    }

    #[test]
    fn test_delta_is_clamped_by_border() {
        let change = LevelChange::new(
            ChangeKind::Horizontal(DistanceMethod::Chebyshev),
            5,
            1.0,
            0.0,
            LevelBorder::new(None, Some(20)).unwrap(),
        )
        .unwrap();
        assert_eq!(
            change
                .level_delta(&Position::default(), &Position::new(100.0, 0.0, 0.0))
                .unwrap(),
            20
        );
    }

    #[test]
    fn test_delta_overflow() {
        let change = horizontal(i32::MAX, 1.0, 0.0);
        assert!(matches!(
            change.level_delta(&Position::default(), &Position::new(3.0, 0.0, 0.0)),
            Err(CalculationError::ArithmeticOverflow { .. })
        ));
        let far = horizontal(1, 1e-300, 0.0);
        assert!(matches!(
            far.level_delta(&Position::default(), &Position::new(1.0, 0.0, 0.0)),
            Err(CalculationError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let kind = ChangeKind::Vertical;
        let border = LevelBorder::unbounded();
        assert!(LevelChange::new(kind, 1, 0.0, 0.0, border).is_err());
        assert!(LevelChange::new(kind, 1, -5.0, 0.0, border).is_err());
        assert!(LevelChange::new(kind, 1, f64::NAN, 0.0, border).is_err());
        assert!(LevelChange::new(kind, 1, 1.0, f64::INFINITY, border).is_err());
    }

    #[test]
    fn test_hotspot_level_sums_changes() {
        let hotspot = Hotspot::new(
            "spawn",
            Position::new(0.0, 64.0, 0.0),
            3,
            LevelBorder::new(Some(1), Some(50)).unwrap(),
        )
        .with_change(horizontal(1, 100.0, 0.0))
        .with_change(LevelChange::new(ChangeKind::Vertical, 2, 16.0, 0.0, LevelBorder::unbounded()).unwrap());

        assert_eq!(hotspot.level_at(&Position::new(0.0, 64.0, 0.0)).unwrap(), 3);
        // 3 + 2 (250 blocks) + 2 * 2 (32 blocks down)
        assert_eq!(hotspot.level_at(&Position::new(250.0, 32.0, 0.0)).unwrap(), 9);
        assert_eq!(hotspot.level_at(&Position::new(1e6, 64.0, 0.0)).unwrap(), 50);
    }

    #[test]
    fn test_hotspot_sum_overflow() {
        let hotspot = Hotspot::new("edge", Position::default(), i32::MAX, LevelBorder::unbounded())
            .with_change(horizontal(1, 1.0, 0.0));
        assert!(hotspot.level_at(&Position::new(2.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_nearest_prefers_earlier_on_tie() {
        let hotspots = vec![
            Hotspot::new("west", Position::new(-10.0, 0.0, 0.0), 1, LevelBorder::unbounded()),
            Hotspot::new("east", Position::new(10.0, 0.0, 0.0), 2, LevelBorder::unbounded()),
        ];
        assert_eq!(nearest(&hotspots, &Position::default()).unwrap().name(), "west");
        assert_eq!(nearest(&hotspots, &Position::new(3.0, 0.0, 0.0)).unwrap().name(), "east");
        assert!(nearest(&[], &Position::default()).is_none());
    }

    #[test]
    fn test_position_variables() {
        let variables = Position::new(1.0, 2.0, 3.0).to_variables();
        assert_eq!(variables.get("x"), Some(1.0));
        assert_eq!(variables.get("y"), Some(2.0));
        assert_eq!(variables.get("z"), Some(3.0));
    }
}
