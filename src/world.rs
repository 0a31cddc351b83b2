//! Per-world level evaluation.

use crate::border::LevelBorder;
use crate::calculation::Calculation;
use crate::error::CalculationError;
use crate::hotspot::{nearest, Hotspot, Position};
use crate::numeric::floor_integer;
use crate::variable::{VariableName, Variables};
use rand::RngCore;

/// The variable a world's formulas must provide.
pub const LEVEL_VARIABLE: &str = "level";

/// The seed variables of a world's formulas.
pub const POSITION_VARIABLES: [&str; 3] = ["x", "y", "z"];

/// Where a world's level comes from.
#[derive(Debug, Clone)]
pub enum LevelSource {
    /// Formulas over the seeds `x`, `y` and `z` that provide `level`.
    Formulas(Calculation),
    /// The nearest hotspot decides.
    Hotspots(Vec<Hotspot>),
}

/// How levels are computed in one world.
///
/// # Examples
///
/// ```rust
/// use spawncalc::hotspot::Position;
/// use spawncalc::world::{LevelSource, WorldRules};
/// use spawncalc::{Calculation, CalculationNode, LevelBorder};
/// use rand::rngs::mock::StepRng;
///
/// let mut formulas = Calculation::with_seeds(["x", "y", "z"]).unwrap();
/// formulas
///     .add_node(CalculationNode::parse("level", "abs(x) / 100").unwrap())
///     .unwrap();
///
/// let world = WorldRules::new(
///     LevelSource::Formulas(formulas),
///     LevelBorder::new(Some(1), Some(5)).unwrap(),
/// )
/// .unwrap();
///
/// let mut rng = StepRng::new(0, 1);
/// let (variables, level) = world.evaluate(&Position::new(250.0, 64.0, 0.0), &mut rng).unwrap();
/// assert_eq!(level, 2);
/// assert_eq!(variables.get("level"), Some(2.0));
///
/// let (_, level) = world.evaluate(&Position::new(-9000.0, 64.0, 0.0), &mut rng).unwrap();
/// assert_eq!(level, 5);
/// ```
#[derive(Debug, Clone)]
pub struct WorldRules {
    source: LevelSource,
    border: LevelBorder,
}

impl WorldRules {
    /// Create world rules.
    ///
    /// Formulas must be fully resolved, must not need seeds other than the
    /// position variables and must provide `level`. A hotspot list must not
    /// be empty.
    pub fn new(source: LevelSource, border: LevelBorder) -> Result<Self, CalculationError> {
        match &source {
            LevelSource::Formulas(calculation) => {
                calculation.verify()?;
                let extra: Vec<VariableName> = calculation
                    .required_variables()
                    .iter()
                    .filter(|v| !POSITION_VARIABLES.contains(&v.as_str()))
                    .cloned()
                    .collect();
                if !extra.is_empty() {
                    return Err(CalculationError::MissingVariables(extra));
                }
                if !calculation.provides(LEVEL_VARIABLE) {
                    return Err(CalculationError::MissingVariables(vec![VariableName::new(
                        LEVEL_VARIABLE,
                    )?]));
                }
            }
            LevelSource::Hotspots(hotspots) => {
                if hotspots.is_empty() {
                    return Err(CalculationError::EmptySelection);
                }
            }
        }
        Ok(Self { source, border })
    }

    /// Where the level comes from.
    pub fn source(&self) -> &LevelSource {
        &self.source
    }

    /// The border fitted to the computed level.
    pub fn border(&self) -> &LevelBorder {
        &self.border
    }

    /// Compute the variables and the level for a spawn at `position`.
    ///
    /// The fitted level is written back under `level`.
    pub fn evaluate(&self, position: &Position, rng: &mut dyn RngCore) -> Result<(Variables, i32), CalculationError> {
        let mut variables = position.to_variables();
        let raw = match &self.source {
            LevelSource::Formulas(calculation) => {
                calculation.execute(&mut variables, rng)?;
                variables.get(LEVEL_VARIABLE).map(floor_integer).unwrap_or(0)
            }
            LevelSource::Hotspots(hotspots) => match nearest(hotspots, position) {
                Some(hotspot) => {
                    tracing::debug!("hotspot '{}' decides the level", hotspot.name());
                    hotspot.level_at(position)?
                }
                None => return Err(CalculationError::EmptySelection),
            },
        };

        let level = self.border.fit(raw);
        variables.set(VariableName::new(LEVEL_VARIABLE)?, f64::from(level));
        Ok((variables, level))
    }
}
