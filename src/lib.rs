//! # spawncalc - Derived-Variable Calculation Engine for Level-Scaled Spawns
//!
//! A small engine that turns user-authored formulas into numbers for
//! monster spawns:
//! - **Derived variables**: formulas reference each other by name and run
//!   in a dependency order resolved incrementally as they are added
//! - **Cycle detection**: circular references never produce an order and
//!   are reported with their path
//! - **Weighted variants**: one variant per spawn, drawn proportionally to
//!   formula-computed integer weights
//! - **Bernoulli drops**: each loot entry rolls independently against its
//!   formula-computed chance
//!
//! ## Core Concepts
//!
//! ### Calculation Pipeline
//!
//! ```text
//! [seed variables] → [Calculation] → [Variables + level] → [Variant] → [SpawnOutcome]
//! ```
//!
//! 1. **Seeds** are supplied per evaluation (the spawn coordinates `x`, `y`, `z`)
//! 2. A **Calculation** runs its resolved nodes in order, adding every derived variable
//! 3. **Selection** picks a variant whose attributes, name and loot are
//!    computed from the same mapping
//!
//! Randomness is always passed in as a [`rand::RngCore`], so a seeded
//! generator makes every step reproducible.
//!
//! ## Example
//!
//! ```rust
//! use spawncalc::{Calculation, CalculationNode, Variables};
//! use rand::rngs::mock::StepRng;
//!
//! let mut calculation = Calculation::with_seeds(["x", "y", "z"]).unwrap();
//!
//! // Insertion order does not matter.
//! calculation
//!     .add_node(CalculationNode::parse("level", "floor(distance / 100)").unwrap())
//!     .unwrap();
//! calculation
//!     .add_node(CalculationNode::parse("distance", "sqrt(x^2 + z^2)").unwrap())
//!     .unwrap();
//! assert!(!calculation.has_unresolved_nodes());
//!
//! let mut variables = Variables::from_pairs([("x", 300.0), ("y", 64.0), ("z", 400.0)]).unwrap();
//!
//! calculation.execute(&mut variables, &mut StepRng::new(0, 1)).unwrap();
//! assert_eq!(variables.get("distance"), Some(500.0));
//! assert_eq!(variables.get("level"), Some(5.0));
//! ```
//!
//! ## Modules
//!
//! - [`expression`] - Formula parsing and evaluation
//! - [`variable`] - Variable names and mappings
//! - [`node`] - One formula providing one variable
//! - [`calculation`] - Incremental dependency resolution and execution
//! - [`graph`] - Dependency graph and cycle paths
//! - [`numeric`] - Rounding, narrowing and saturating floor
//! - [`border`] - Integer clamping
//! - [`distance`] - Horizontal distance metrics
//! - [`hotspot`] - Distance-based level sources
//! - [`selection`] - Weighted random selection
//! - [`loot`] - Drop entries and loot tables
//! - [`variant`] - Spawn variants and their effects
//! - [`world`] - Per-world level evaluation
//! - [`rules`] - The complete rule set
//! - [`config`] - TOML/JSON configuration
//! - [`registry`] - The active rule set and reloads
//! - [`error`] - Error types

pub mod border;
pub mod calculation;
pub mod config;
pub mod distance;
pub mod error;
pub mod expression;
pub mod graph;
pub mod hotspot;
pub mod loot;
pub mod node;
pub mod numeric;
pub mod registry;
pub mod rules;
pub mod selection;
pub mod variable;
pub mod variant;
pub mod world;

pub use border::LevelBorder;
pub use calculation::Calculation;
pub use config::RulesConfig;
pub use distance::DistanceMethod;
pub use error::{CalculationError, ConfigError, ExpressionError, ReloadError};
pub use expression::Expression;
pub use hotspot::{Hotspot, Position};
pub use loot::{DropEntry, ItemDrop, LootTable};
pub use node::CalculationNode;
pub use registry::RuleRegistry;
pub use rules::{Rules, SpawnRequest};
pub use variable::{VariableName, Variables};
pub use variant::{DeathData, EntityRules, SpawnOutcome, Variant};
pub use world::{LevelSource, WorldRules};
