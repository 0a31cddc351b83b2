//! Horizontal distance metrics.

use serde::{Deserialize, Serialize};

/// How the horizontal distance between two points is measured.
///
/// Used to compute values that formulas consume, such as the distance of a
/// spawn from a hotspot center. Configuration names are `euclidean`
/// (alias `pythagoras`) and `chebyshev` (alias `minecraft`).
///
/// # Examples
///
/// ```rust
/// use spawncalc::DistanceMethod;
///
/// assert_eq!(DistanceMethod::Euclidean.distance(3.0, 4.0), 5.0);
/// assert_eq!(DistanceMethod::Chebyshev.distance(3.0, -4.0), 4.0);
/// assert_eq!(DistanceMethod::Chebyshev.distance_between(0.0, 0.0, 3.0, 4.0), 4.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    /// `sqrt(dx² + dz²)`.
    #[serde(alias = "pythagoras")]
    Euclidean,
    /// `max(|dx|, |dz|)`, the ring distance of a square grid.
    #[default]
    #[serde(alias = "minecraft")]
    Chebyshev,
}

impl DistanceMethod {
    /// Distance for the given deltas.
    pub fn distance(self, dx: f64, dz: f64) -> f64 {
        match self {
            DistanceMethod::Euclidean => (dx * dx + dz * dz).sqrt(),
            DistanceMethod::Chebyshev => dx.abs().max(dz.abs()),
        }
    }

    /// Distance from `(from_x, from_z)` to `(to_x, to_z)`.
    pub fn distance_between(self, from_x: f64, from_z: f64, to_x: f64, to_z: f64) -> f64 {
        self.distance(to_x - from_x, to_z - from_z)
    }
}
