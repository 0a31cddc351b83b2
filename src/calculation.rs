//! Incrementally built calculation graphs.
//!
//! A [`Calculation`] collects [`CalculationNode`]s in any order and keeps an
//! execution order in which every node runs after the nodes it reads from.
//! Nodes whose inputs are not yet provided wait in an unresolved list and
//! are picked up as soon as a later node or seed variable provides them.

use crate::error::CalculationError;
use crate::graph::DependencyGraph;
use crate::node::CalculationNode;
use crate::variable::{VariableName, Variables};
use rand::RngCore;
use std::collections::{BTreeSet, HashSet};

/// An ordered graph of calculation nodes over a set of seed variables.
///
/// Construction never fails because a dependency is still missing: a node
/// that cannot run yet stays unresolved until something provides its
/// inputs. A cycle therefore shows up as nodes that stay unresolved for
/// good. Check [`has_unresolved_nodes`](Self::has_unresolved_nodes) or call
/// [`verify`](Self::verify) once all additions are complete.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{Calculation, CalculationNode, Variables};
/// use rand::rngs::mock::StepRng;
///
/// let mut calculation = Calculation::with_seeds(["x"]).unwrap();
/// // Added before its dependency; resolved once `double` is known.
/// calculation.add_node(CalculationNode::parse("quad", "double * 2").unwrap()).unwrap();
/// assert!(calculation.has_unresolved_nodes());
///
/// calculation.add_node(CalculationNode::parse("double", "x * 2").unwrap()).unwrap();
/// assert!(!calculation.has_unresolved_nodes());
///
/// let mut variables = Variables::from_pairs([("x", 3.0)]).unwrap();
/// calculation.execute(&mut variables, &mut StepRng::new(0, 1)).unwrap();
/// assert_eq!(variables.get("quad"), Some(12.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calculation {
    required: BTreeSet<VariableName>,
    provided: HashSet<VariableName>,
    resolved: Vec<CalculationNode>,
    unresolved: Vec<CalculationNode>,
}

impl Calculation {
    /// Create a calculation without seed variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculation with the given seed variables.
    pub fn with_seeds<I, S>(seeds: I) -> Result<Self, CalculationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut calculation = Self::new();
        for seed in seeds {
            calculation.add_variable(seed.as_ref())?;
        }
        Ok(calculation)
    }

    /// Add a node.
    ///
    /// Fails with `DuplicateNode` if its variable is already provided by a
    /// seed or another node, resolved or not. Otherwise the node is resolved
    /// right away when possible, and every pending node that becomes
    /// resolvable as a consequence is resolved too.
    pub fn add_node(&mut self, node: CalculationNode) -> Result<(), CalculationError> {
        let name = node.provided_variable();
        if self.is_taken(name.as_str()) {
            return Err(CalculationError::DuplicateNode(name.clone()));
        }
        self.unresolved.push(node);
        self.resolve_pending();
        Ok(())
    }

    /// Register an additional seed variable.
    ///
    /// Callers of [`execute`](Self::execute) must supply it from then on.
    pub fn add_variable(&mut self, name: &str) -> Result<(), CalculationError> {
        let name = VariableName::new(name)?;
        if self.is_taken(name.as_str()) {
            return Err(CalculationError::DuplicateNode(name));
        }
        self.required.insert(name.clone());
        self.provided.insert(name);
        self.resolve_pending();
        Ok(())
    }

    fn is_taken(&self, name: &str) -> bool {
        self.provided.contains(name)
            || self
                .unresolved
                .iter()
                .any(|node| node.provided_variable().as_str() == name)
    }

    /// Move every pending node whose inputs are provided to the execution
    /// order, repeating until a pass resolves nothing. Pending nodes are
    /// scanned in insertion order.
    fn resolve_pending(&mut self) {
        loop {
            let mut progressed = false;
            let mut index = 0;
            while index < self.unresolved.len() {
                let ready = self.unresolved[index]
                    .required_variables()
                    .iter()
                    .all(|v| self.provided.contains(v));
                if !ready {
                    index += 1;
                    continue;
                }
                let node = self.unresolved.remove(index);
                tracing::debug!(
                    "resolved '{}' at position {}",
                    node.provided_variable(),
                    self.resolved.len()
                );
                self.provided.insert(node.provided_variable().clone());
                self.resolved.push(node);
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    /// True if at least one node could not be resolved.
    ///
    /// Signals a cycle or a dependency nobody provides.
    pub fn has_unresolved_nodes(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Nodes in execution order.
    pub fn resolved_nodes(&self) -> &[CalculationNode] {
        &self.resolved
    }

    /// Nodes still waiting for inputs, in insertion order.
    pub fn unresolved_nodes(&self) -> &[CalculationNode] {
        &self.unresolved
    }

    /// The seed variables a caller must supply.
    pub fn required_variables(&self) -> &BTreeSet<VariableName> {
        &self.required
    }

    /// Seeds plus the variables of every resolved node.
    pub fn provided_variables(&self) -> &HashSet<VariableName> {
        &self.provided
    }

    /// True if a seed or resolved node provides `name`.
    pub fn provides(&self, name: &str) -> bool {
        self.provided.contains(name)
    }

    /// Run every resolved node in order against `variables`.
    ///
    /// Fails with `MissingVariables` if a seed variable is absent. On any
    /// failure `variables` is left exactly as it was; on success it contains
    /// every seed and every derived variable.
    pub fn execute(&self, variables: &mut Variables, rng: &mut dyn RngCore) -> Result<(), CalculationError> {
        let missing = variables.missing(&self.required);
        if !missing.is_empty() {
            return Err(CalculationError::MissingVariables(missing));
        }

        let mut scratch = variables.clone();
        for node in &self.resolved {
            node.calculate_and_add_variable(&mut scratch, rng)?;
        }
        *variables = scratch;
        Ok(())
    }

    /// Explain unresolved nodes as a typed error.
    ///
    /// Returns `Cycle` if the unresolved nodes contain a cycle, otherwise
    /// `UnresolvedDependency` for the first unresolved node that reads a
    /// variable nobody provides.
    pub fn verify(&self) -> Result<(), CalculationError> {
        if self.unresolved.is_empty() {
            return Ok(());
        }
        tracing::warn!(
            "calculation has {} unresolved node(s): {}",
            self.unresolved.len(),
            self.unresolved
                .iter()
                .map(|node| node.provided_variable().as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let pending: HashSet<&VariableName> = self
            .unresolved
            .iter()
            .map(CalculationNode::provided_variable)
            .collect();

        let mut graph = DependencyGraph::new();
        for node in &self.unresolved {
            graph.add_node(node.provided_variable().clone());
            for required in node.required_variables() {
                if pending.contains(&required) {
                    graph.add_dependency(node.provided_variable().clone(), required.clone());
                }
            }
        }
        graph.detect_cycles()?;

        for node in &self.unresolved {
            let missing: Vec<VariableName> = node
                .required_variables()
                .iter()
                .filter(|v| !self.provided.contains(*v) && !pending.contains(v))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(CalculationError::UnresolvedDependency {
                    variable: node.provided_variable().clone(),
                    missing,
                });
            }
        }

        // Acyclic and nothing missing means a pending node only waits on
        // other pending nodes, which cannot happen after a fixpoint pass.
        let first = &self.unresolved[0];
        Err(CalculationError::UnresolvedDependency {
            variable: first.provided_variable().clone(),
            missing: first
                .required_variables()
                .iter()
                .filter(|v| !self.provided.contains(*v))
                .cloned()
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn node(name: &str, formula: &str) -> CalculationNode {
        CalculationNode::parse(name, formula).unwrap()
    }

    fn order(calculation: &Calculation) -> Vec<&str> {
        calculation
            .resolved_nodes()
            .iter()
            .map(|n| n.provided_variable().as_str())
            .collect()
    }

    fn default_world_nodes() -> Vec<CalculationNode> {
        vec![
            node("centerX", "123"),
            node("centerY", "62"),
            node("centerZ", "-672"),
            node("horizontalDistancePerLevel", "80"),
            node("offset", "40"),
            node("verticalDistancePerLevel", "10"),
            node("distance", "sqrt((x-centerX)^2+(z-centerZ)^2)"),
            node("actualDistance", "max(0,distance-offset)"),
            node(
                "levelHorizontal",
                "min(100,floor(actualDistance/horizontalDistancePerLevel))",
            ),
            node("levelVertical", "floor(max(0,centerY-y)/verticalDistancePerLevel)"),
            node("level", "levelHorizontal+levelVertical"),
        ]
    }

    fn assert_topological(calculation: &Calculation) {
        let mut seen: HashSet<&str> = calculation
            .required_variables()
            .iter()
            .map(|v| v.as_str())
            .collect();
        for n in calculation.resolved_nodes() {
            for required in n.required_variables() {
                assert!(
                    seen.contains(required.as_str()),
                    "'{}' runs before its input '{}'",
                    n.provided_variable(),
                    required
                );
            }
            seen.insert(n.provided_variable().as_str());
        }
    }

    #[test]
    fn test_default_world_level() {
        let mut calculation = Calculation::with_seeds(["x", "y", "z"]).unwrap();
        for n in default_world_nodes() {
            calculation.add_node(n).unwrap();
        }
        assert!(!calculation.has_unresolved_nodes());
        assert!(calculation.verify().is_ok());

        let mut variables = Variables::from_pairs([("x", 0.0), ("y", 0.0), ("z", 0.0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        calculation.execute(&mut variables, &mut rng).unwrap();

        let distance = variables.get("distance").unwrap();
        assert!((distance - 683.164).abs() < 1e-3);
        assert_eq!(variables.get("levelHorizontal"), Some(8.0));
        assert_eq!(variables.get("levelVertical"), Some(6.0));
        assert_eq!(variables.get("level"), Some(14.0));
    }

    #[test]
    fn test_reverse_insertion_order_is_topological() {
        let mut calculation = Calculation::with_seeds(["x", "y", "z"]).unwrap();
        for n in default_world_nodes().into_iter().rev() {
            calculation.add_node(n).unwrap();
        }
        assert!(!calculation.has_unresolved_nodes());
        assert_eq!(calculation.resolved_nodes().len(), 11);
        assert_topological(&calculation);
    }

    #[test]
    fn test_interleaved_insertion_order_is_topological() {
        let mut nodes = default_world_nodes();
        // a fixed shuffle: odd positions first, then even positions reversed
        let mut shuffled = Vec::new();
        let mut index = 1;
        while index < nodes.len() {
            shuffled.push(nodes[index].clone());
            index += 2;
        }
        nodes.retain(|n| !shuffled.contains(n));
        shuffled.extend(nodes.into_iter().rev());

        let mut calculation = Calculation::new();
        for n in shuffled {
            calculation.add_node(n).unwrap();
        }
        assert!(calculation.has_unresolved_nodes());
        for seed in ["z", "y", "x"] {
            calculation.add_variable(seed).unwrap();
        }
        assert!(!calculation.has_unresolved_nodes());
        assert_topological(&calculation);
    }

    #[test]
    fn test_tie_break_follows_insertion_order() {
        let mut calculation = Calculation::new();
        calculation.add_node(node("zeta", "seed + 1")).unwrap();
        calculation.add_node(node("alpha", "seed + 2")).unwrap();
        calculation.add_node(node("mid", "seed + 3")).unwrap();
        assert!(calculation.resolved_nodes().is_empty());

        calculation.add_variable("seed").unwrap();
        assert_eq!(order(&calculation), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_chain_resolves_in_one_addition() {
        let mut calculation = Calculation::new();
        calculation.add_node(node("c", "b + 1")).unwrap();
        calculation.add_node(node("b", "a + 1")).unwrap();
        calculation.add_node(node("d", "c + b")).unwrap();
        calculation.add_node(node("a", "1")).unwrap();
        assert_eq!(order(&calculation), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut calculation = Calculation::with_seeds(["x"]).unwrap();
        calculation.add_node(node("a", "x")).unwrap();
        calculation.add_node(node("b", "missing")).unwrap();

        assert!(matches!(
            calculation.add_node(node("a", "2")),
            Err(CalculationError::DuplicateNode(_))
        ));
        assert!(matches!(
            calculation.add_node(node("b", "3")),
            Err(CalculationError::DuplicateNode(_))
        ));
        assert!(matches!(
            calculation.add_node(node("x", "4")),
            Err(CalculationError::DuplicateNode(_))
        ));
        assert!(matches!(
            calculation.add_variable("a"),
            Err(CalculationError::DuplicateNode(_))
        ));
        assert!(matches!(
            calculation.add_variable(""),
            Err(CalculationError::InvalidVariableName(_))
        ));
        assert!(matches!(
            calculation.add_variable("random"),
            Err(CalculationError::InvalidVariableName(_))
        ));
        assert_eq!(calculation.resolved_nodes().len(), 1);
    }

    #[test]
    fn test_cycle_stays_unresolved() {
        let mut calculation = Calculation::with_seeds(["x"]).unwrap();
        calculation.add_node(node("a", "b + x")).unwrap();
        calculation.add_node(node("b", "c")).unwrap();
        calculation.add_node(node("c", "a")).unwrap();
        calculation.add_node(node("free", "x * 2")).unwrap();

        assert!(calculation.has_unresolved_nodes());
        assert_eq!(order(&calculation), vec!["free"]);

        match calculation.verify() {
            Err(CalculationError::Cycle { path }) => {
                let names: Vec<&str> = path.iter().map(|v| v.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c", "a"]);
            }
            other => panic!("Expected Cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_reports_unprovided_dependency() {
        let mut calculation = Calculation::with_seeds(["x"]).unwrap();
        calculation.add_node(node("a", "x + ghost")).unwrap();
        calculation.add_node(node("b", "a")).unwrap();

        match calculation.verify() {
            Err(CalculationError::UnresolvedDependency { variable, missing }) => {
                assert_eq!(variable.as_str(), "a");
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].as_str(), "ghost");
            }
            other => panic!("Expected UnresolvedDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_seed_does_not_mutate() {
        let mut calculation = Calculation::with_seeds(["x", "y", "z"]).unwrap();
        for n in default_world_nodes() {
            calculation.add_node(n).unwrap();
        }

        let mut variables = Variables::from_pairs([("x", 0.0), ("y", 0.0)]).unwrap();
        let before = variables.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        match calculation.execute(&mut variables, &mut rng) {
            Err(CalculationError::MissingVariables(missing)) => {
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].as_str(), "z");
            }
            other => panic!("Expected MissingVariables, got {:?}", other),
        }
        assert_eq!(variables, before);
    }

    #[test]
    fn test_evaluation_failure_does_not_mutate() {
        let mut calculation = Calculation::with_seeds(["n"]).unwrap();
        calculation.add_node(node("first", "n + 1")).unwrap();
        calculation.add_node(node("roll", "randomInt(n)")).unwrap();

        let mut variables = Variables::from_pairs([("n", 0.0)]).unwrap();
        let before = variables.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            calculation.execute(&mut variables, &mut rng),
            Err(CalculationError::Evaluation { .. })
        ));
        assert_eq!(variables, before);
    }

    #[test]
    fn test_execute_is_idempotent() {
        let mut calculation = Calculation::with_seeds(["x", "y", "z"]).unwrap();
        for n in default_world_nodes() {
            calculation.add_node(n).unwrap();
        }
        let seeds = Variables::from_pairs([("x", 512.0), ("y", 40.0), ("z", -91.5)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut first = seeds.clone();
        calculation.execute(&mut first, &mut rng).unwrap();
        let mut second = seeds.clone();
        calculation.execute(&mut second, &mut rng).unwrap();
        calculation.execute(&mut second, &mut rng).unwrap();

        for (name, value) in first.iter() {
            assert_eq!(second.get(name.as_str()).map(f64::to_bits), Some(value.to_bits()));
        }
    }

    #[test]
    fn test_extra_variables_are_ignored() {
        let mut calculation = Calculation::with_seeds(["x"]).unwrap();
        calculation.add_node(node("y2", "x * x")).unwrap();
        let mut variables = Variables::from_pairs([("x", 3.0), ("unused", 1.0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        calculation.execute(&mut variables, &mut rng).unwrap();
        assert_eq!(variables.get("y2"), Some(9.0));
        assert_eq!(variables.get("unused"), Some(1.0));
    }

    #[test]
    fn test_provided_variables_grow() {
        let mut calculation = Calculation::with_seeds(["x"]).unwrap();
        assert!(calculation.provides("x"));
        assert!(!calculation.provides("a"));
        calculation.add_node(node("a", "x")).unwrap();
        assert!(calculation.provides("a"));
        assert_eq!(calculation.provided_variables().len(), 2);
        assert_eq!(calculation.required_variables().len(), 1);
    }
}
