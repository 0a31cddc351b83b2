//! Formula expressions.
//!
//! An [`Expression`] is parsed once from its source and evaluated many times
//! against a [`Variables`] mapping. The vocabulary covers arithmetic
//! (`+ - * / % ^`), numeric comparisons (`> >= < <= == !=`, yielding `1` or
//! `0`, with `==` tolerating differences up to `1e-9`), boolean operators
//! (`&`, `|`, `~`, where any value `>= 1` is true), the usual math functions
//! and the random functions `random()` and `randomInt(n)`.
//!
//! Random functions draw from the random source passed to
//! [`Expression::evaluate`], so a seeded generator gives reproducible
//! results.

mod functions;
mod lexer;
mod parser;

use crate::error::ExpressionError;
use crate::variable::{VariableName, Variables};
use parser::{BinaryOp, Node, UnaryOp};
use rand::RngCore;
use std::collections::BTreeSet;
use std::fmt;

/// Tolerance of `==` and `!=`.
pub const EQUALITY_EPSILON: f64 = 1e-9;

/// How deep parentheses, operators and calls may nest in one formula.
pub const MAX_NESTING: usize = 256;

/// Named constants usable in formulas.
pub(crate) const CONSTANTS: [(&str, f64); 2] = [("pi", std::f64::consts::PI), ("e", std::f64::consts::E)];

/// Whether `name` is a constant or a function and so cannot name a
/// variable.
pub(crate) fn is_reserved(name: &str) -> bool {
    CONSTANTS.iter().any(|(constant, _)| *constant == name) || functions::Function::lookup(name).is_some()
}

fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn is_true(value: f64) -> bool {
    value >= 1.0
}

/// A parsed, immutable formula.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{Expression, Variables};
/// use rand::rngs::mock::StepRng;
///
/// let expression = Expression::parse("max(0, distance - offset)").unwrap();
/// let names: Vec<&str> = expression.variables().map(|v| v.as_str()).collect();
/// assert_eq!(names, vec!["distance", "offset"]);
///
/// let variables = Variables::from_pairs([("distance", 683.0), ("offset", 40.0)]).unwrap();
/// let mut rng = StepRng::new(0, 1);
/// assert_eq!(expression.evaluate(&variables, &mut rng).unwrap(), 643.0);
/// ```
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    root: Node,
    variables: BTreeSet<VariableName>,
}

impl Expression {
    /// Parse a formula. Every identifier that is neither a function nor a
    /// constant (`pi`, `e`) becomes a free variable.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let root = parser::parse(lexer::tokenize(source)?)?;

        let mut variables = BTreeSet::new();
        collect(&root, &mut variables)?;

        Ok(Self {
            source: source.to_string(),
            root,
            variables,
        })
    }

    /// Parse a formula that may only reference names in `known`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spawncalc::{Expression, ExpressionError};
    /// use std::collections::HashSet;
    ///
    /// let known: HashSet<&str> = ["x", "z"].into_iter().collect();
    /// assert!(Expression::parse_with_known("x + z", &known).is_ok());
    /// assert_eq!(
    ///     Expression::parse_with_known("x + y", &known).unwrap_err(),
    ///     ExpressionError::UnknownVariable("y".into()),
    /// );
    /// ```
    pub fn parse_with_known<S>(source: &str, known: &S) -> Result<Self, ExpressionError>
    where
        S: KnownVariables + ?Sized,
    {
        let expression = Self::parse(source)?;
        if let Some(unknown) = expression.variables.iter().find(|v| !known.is_known(v.as_str())) {
            return Err(ExpressionError::UnknownVariable(unknown.to_string()));
        }
        Ok(expression)
    }

    /// The formula text this expression was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Free variables referenced by the formula, in name order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableName> {
        self.variables.iter()
    }

    /// The free variables as a set.
    pub fn variable_set(&self) -> &BTreeSet<VariableName> {
        &self.variables
    }

    /// Evaluate against `variables`.
    ///
    /// Division by zero and other IEEE-754 edge cases follow floating-point
    /// rules and are not errors.
    pub fn evaluate(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<f64, ExpressionError> {
        eval(&self.root, variables, rng)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// A set of names a formula is allowed to reference.
pub trait KnownVariables {
    /// Whether `name` may be referenced.
    fn is_known(&self, name: &str) -> bool;
}

impl<S: std::hash::BuildHasher> KnownVariables for std::collections::HashSet<&str, S> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<S: std::hash::BuildHasher> KnownVariables for std::collections::HashSet<VariableName, S> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl KnownVariables for BTreeSet<VariableName> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

fn collect(node: &Node, variables: &mut BTreeSet<VariableName>) -> Result<(), ExpressionError> {
    match node {
        Node::Number(_) => {}
        Node::Variable(name) => {
            let name = VariableName::new(name)
                .map_err(|_| ExpressionError::UnknownVariable(name.clone()))?;
            variables.insert(name);
        }
        Node::Unary(_, operand) => collect(operand, variables)?,
        Node::Binary(_, lhs, rhs) => {
            collect(lhs, variables)?;
            collect(rhs, variables)?;
        }
        Node::Call(_, args) => {
            for arg in args {
                collect(arg, variables)?;
            }
        }
    }
    Ok(())
}

fn eval(node: &Node, variables: &Variables, rng: &mut dyn RngCore) -> Result<f64, ExpressionError> {
    match node {
        Node::Number(value) => Ok(*value),
        Node::Variable(name) => variables
            .get(name)
            .ok_or_else(|| ExpressionError::MissingVariable(name.clone())),
        Node::Unary(op, operand) => {
            let value = eval(operand, variables, rng)?;
            Ok(match op {
                UnaryOp::Negate => -value,
                UnaryOp::Plus => value,
                UnaryOp::Not => truth(!is_true(value)),
            })
        }
        Node::Binary(op, lhs, rhs) => {
            let left = eval(lhs, variables, rng)?;
            let right = eval(rhs, variables, rng)?;
            Ok(eval_binary_op(*op, left, right))
        }
        Node::Call(function, args) => {
            let values = args
                .iter()
                .map(|arg| eval(arg, variables, rng))
                .collect::<Result<Vec<_>, _>>()?;
            function.apply(&values, rng)
        }
    }
}

fn eval_binary_op(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Rem => left % right,
        BinaryOp::Pow => left.powf(right),
        BinaryOp::Greater => truth(left > right),
        BinaryOp::GreaterEqual => truth(left >= right),
        BinaryOp::Less => truth(left < right),
        BinaryOp::LessEqual => truth(left <= right),
        BinaryOp::Equal => truth((left - right).abs() <= EQUALITY_EPSILON),
        BinaryOp::NotEqual => truth((left - right).abs() > EQUALITY_EPSILON),
        BinaryOp::And => truth(is_true(left) && is_true(right)),
        BinaryOp::Or => truth(is_true(left) || is_true(right)),
    }
}
