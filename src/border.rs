//! Integer clamping for levels.

use crate::error::CalculationError;
use serde::Serialize;

/// Optional lower and upper bound for a level.
///
/// An absent bound leaves that side unbounded.
///
/// # Examples
///
/// ```rust
/// use spawncalc::LevelBorder;
///
/// let border = LevelBorder::new(Some(0), Some(10)).unwrap();
/// assert_eq!(border.fit(-5), 0);
/// assert_eq!(border.fit(15), 10);
/// assert_eq!(border.fit(5), 5);
///
/// assert!(LevelBorder::new(Some(10), Some(0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelBorder {
    min: Option<i32>,
    max: Option<i32>,
}

impl LevelBorder {
    /// Create a border, failing if both bounds are present and `min > max`.
    pub fn new(min: Option<i32>, max: Option<i32>) -> Result<Self, CalculationError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(CalculationError::InvalidBounds { min, max });
            }
        }
        Ok(Self { min, max })
    }

    /// A border without bounds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The lower bound, if any.
    pub fn min(&self) -> Option<i32> {
        self.min
    }

    /// The upper bound, if any.
    pub fn max(&self) -> Option<i32> {
        self.max
    }

    /// Clamp `value` into the border.
    pub fn fit(&self, value: i32) -> i32 {
        match (self.min, self.max) {
            (Some(min), _) if value < min => min,
            (_, Some(max)) if value > max => max,
            _ => value,
        }
    }
}
