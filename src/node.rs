//! Calculation nodes.
//!
//! A [`CalculationNode`] computes one derived variable from a formula.

use crate::error::CalculationError;
use crate::expression::Expression;
use crate::variable::{VariableName, Variables};
use rand::RngCore;
use std::collections::BTreeSet;

/// One derived variable and the formula that computes it.
///
/// The node's identity is its provided variable: two nodes providing the
/// same name are equal regardless of their formulas.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{CalculationNode, Expression, Variables};
/// use rand::rngs::mock::StepRng;
///
/// let node = CalculationNode::new(
///     "actualDistance",
///     Expression::parse("max(0, distance - offset)").unwrap(),
/// )
/// .unwrap();
///
/// let mut variables = Variables::from_pairs([("distance", 50.0), ("offset", 40.0)]).unwrap();
/// let mut rng = StepRng::new(0, 1);
/// node.calculate_and_add_variable(&mut variables, &mut rng).unwrap();
/// assert_eq!(variables.get("actualDistance"), Some(10.0));
/// ```
#[derive(Debug, Clone)]
pub struct CalculationNode {
    provided: VariableName,
    expression: Expression,
}

impl CalculationNode {
    /// Create a node providing `name`.
    ///
    /// Fails if the name is not a valid identifier or the formula references
    /// the variable it provides.
    pub fn new(name: &str, expression: Expression) -> Result<Self, CalculationError> {
        let provided = VariableName::new(name)?;
        if expression.variable_set().contains(&provided) {
            return Err(CalculationError::SelfReference(provided));
        }
        Ok(Self {
            provided,
            expression,
        })
    }

    /// Parse `formula` and create a node providing `name`.
    pub fn parse(name: &str, formula: &str) -> Result<Self, CalculationError> {
        let provided = VariableName::new(name)?;
        let expression = Expression::parse(formula).map_err(|source| CalculationError::Evaluation {
            variable: provided.clone(),
            source,
        })?;
        Self::new(name, expression)
    }

    /// The variable this node provides.
    pub fn provided_variable(&self) -> &VariableName {
        &self.provided
    }

    /// The variables the formula reads.
    pub fn required_variables(&self) -> &BTreeSet<VariableName> {
        self.expression.variable_set()
    }

    /// The underlying formula.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluate the formula without writing the result.
    pub fn evaluate(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<f64, CalculationError> {
        let missing = variables.missing(self.required_variables());
        if !missing.is_empty() {
            return Err(CalculationError::MissingVariables(missing));
        }
        self.expression
            .evaluate(variables, rng)
            .map_err(|source| CalculationError::Evaluation {
                variable: self.provided.clone(),
                source,
            })
    }

    /// Evaluate and store the result under the provided name, replacing
    /// any previous value.
    pub fn calculate_and_add_variable(
        &self,
        variables: &mut Variables,
        rng: &mut dyn RngCore,
    ) -> Result<f64, CalculationError> {
        let value = self.evaluate(variables, rng)?;
        variables.set(self.provided.clone(), value);
        Ok(value)
    }
}

impl PartialEq for CalculationNode {
    fn eq(&self, other: &Self) -> bool {
        self.provided == other.provided
    }
}

impl Eq for CalculationNode {}

impl std::hash::Hash for CalculationNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.provided.hash(state);
    }
}
