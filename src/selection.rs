//! Weighted random selection.
//!
//! Entries carry integer weights computed from formulas. A draw `r` in
//! `[0, total)` is mapped onto the weights laid end to end in enumeration
//! order, so every entry is picked with probability `weight / total` and a
//! weight of zero is never picked.

use crate::error::CalculationError;
use crate::variable::Variables;
use rand::{Rng, RngCore};

/// An entry that takes part in a weighted draw.
pub trait Weighted {
    /// Identity of the entry, used in error messages and logs.
    fn name(&self) -> &str;

    /// Compute the entry's weight for the given variables.
    fn weight(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<i32, CalculationError>;
}

/// Compute the weight of every entry, in enumeration order.
///
/// Fails with `InvalidWeight` if an entry's weight is negative.
pub fn weights<'a, T, I>(
    entries: I,
    variables: &Variables,
    rng: &mut dyn RngCore,
) -> Result<Vec<i32>, CalculationError>
where
    T: Weighted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    entries
        .into_iter()
        .map(|entry| {
            let weight = entry.weight(variables, rng)?;
            if weight < 0 {
                return Err(CalculationError::InvalidWeight(format!(
                    "'{}' has negative weight {}",
                    entry.name(),
                    weight
                )));
            }
            Ok(weight)
        })
        .collect()
}

/// Pick an index from non-negative integer weights.
///
/// # Errors
///
/// * `EmptySelection` if `weights` is empty
/// * `InvalidWeight` if a weight is negative or the total is not positive
/// * `ArithmeticOverflow` if the total does not fit into `i32`
///
/// # Examples
///
/// ```rust
/// use spawncalc::selection::pick_index;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let index = pick_index(&[0, 5, 0], &mut rng).unwrap();
/// assert_eq!(index, 1);
///
/// assert!(pick_index(&[0, 0], &mut rng).is_err());
/// ```
pub fn pick_index(weights: &[i32], rng: &mut dyn RngCore) -> Result<usize, CalculationError> {
    if weights.is_empty() {
        return Err(CalculationError::EmptySelection);
    }

    let mut total: i32 = 0;
    for &weight in weights {
        if weight < 0 {
            return Err(CalculationError::InvalidWeight(format!("negative weight {}", weight)));
        }
        total = total
            .checked_add(weight)
            .ok_or(CalculationError::ArithmeticOverflow {
                value: f64::from(total) + f64::from(weight),
                target: "i32",
            })?;
    }
    if total <= 0 {
        return Err(CalculationError::InvalidWeight(format!(
            "total weight must be positive, got {}",
            total
        )));
    }

    let mut remainder = rng.gen_range(0..total);
    for (index, &weight) in weights.iter().enumerate() {
        remainder -= weight;
        if remainder < 0 {
            return Ok(index);
        }
    }
    // remainder < total, so the loop always returns
    Err(CalculationError::EmptySelection)
}

/// Compute every entry's weight and pick one entry.
pub fn select_weighted<'a, T>(
    entries: &'a [T],
    variables: &Variables,
    rng: &mut dyn RngCore,
) -> Result<&'a T, CalculationError>
where
    T: Weighted,
{
    let weights = weights(entries, variables, rng)?;
    let index = pick_index(&weights, rng)?;
    let selected = &entries[index];
    tracing::debug!(
        "selected '{}' with weight {} of {:?}",
        selected.name(),
        weights[index],
        weights
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixed(&'static str, i32);

    impl Weighted for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn weight(&self, _: &Variables, _: &mut dyn RngCore) -> Result<i32, CalculationError> {
            Ok(self.1)
        }
    }

    #[test]
    fn test_frequencies_follow_weights() {
        let weights = [3, 1, 0, 6];
        let draws = 100_000;
        let mut counts = [0usize; 4];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..draws {
            counts[pick_index(&weights, &mut rng).unwrap()] += 1;
        }

        assert_eq!(counts[2], 0);
        for (index, &weight) in weights.iter().enumerate() {
            let expected = f64::from(weight) / 10.0;
            let observed = counts[index] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "entry {}: expected {}, observed {}",
                index,
                expected,
                observed
            );
        }
    }

    #[test]
    fn test_single_positive_weight_always_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(pick_index(&[0, 0, 9, 0], &mut rng).unwrap(), 2);
        }
    }

    #[test]
    fn test_invalid_totals() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(pick_index(&[], &mut rng), Err(CalculationError::EmptySelection));
        assert!(matches!(
            pick_index(&[0, 0], &mut rng),
            Err(CalculationError::InvalidWeight(_))
        ));
        assert!(matches!(
            pick_index(&[5, -1], &mut rng),
            Err(CalculationError::InvalidWeight(_))
        ));
        assert!(matches!(
            pick_index(&[i32::MAX, 1], &mut rng),
            Err(CalculationError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_select_weighted_reports_negative_entry() {
        let entries = [Fixed("common", 5), Fixed("cursed", -2)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        match select_weighted(&entries, &Variables::new(), &mut rng) {
            Err(CalculationError::InvalidWeight(message)) => assert!(message.contains("cursed")),
            other => panic!("Expected InvalidWeight, got {:?}", other.map(|e| e.name())),
        }
    }

    #[test]
    fn test_select_weighted_returns_entry() {
        let entries = [Fixed("never", 0), Fixed("always", 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let selected = select_weighted(&entries, &Variables::new(), &mut rng).unwrap();
        assert_eq!(selected.name(), "always");
    }
}
