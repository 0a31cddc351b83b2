//! The complete rule set for spawn evaluation.

use crate::error::CalculationError;
use crate::hotspot::Position;
use crate::variant::{EntityRules, SpawnOutcome};
use crate::world::WorldRules;
use rand::RngCore;
use std::collections::BTreeMap;

/// One spawn the host asks about.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub world: String,
    pub entity_type: String,
    pub position: Position,
}

impl SpawnRequest {
    /// Create a request for `entity_type` spawning at `position` in `world`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spawncalc::{Position, SpawnRequest};
    ///
    /// let request = SpawnRequest::new("overworld", "ZOMBIE", Position::new(300.0, 64.0, 400.0));
    /// assert_eq!(request.entity_type, "ZOMBIE");
    /// ```
    pub fn new(world: impl Into<String>, entity_type: impl Into<String>, position: Position) -> Self {
        Self {
            world: world.into(),
            entity_type: entity_type.into(),
            position,
        }
    }
}

/// World rules by world name and variants by entity type.
///
/// Built once, then shared read-only between spawn evaluations.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    worlds: BTreeMap<String, WorldRules>,
    entities: BTreeMap<String, EntityRules>,
}

impl Rules {
    /// Create an empty rule set. It evaluates no spawn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the rules of a world, failing with `DuplicateEntry` if the world
    /// is already configured.
    pub fn add_world(&mut self, name: &str, world: WorldRules) -> Result<(), CalculationError> {
        if self.worlds.contains_key(name) {
            return Err(CalculationError::DuplicateEntry(name.to_string()));
        }
        self.worlds.insert(name.to_string(), world);
        Ok(())
    }

    /// Add the variants of an entity type, failing with `DuplicateEntry` if
    /// the type is already configured.
    pub fn add_entity(&mut self, entity_type: &str, rules: EntityRules) -> Result<(), CalculationError> {
        if self.entities.contains_key(entity_type) {
            return Err(CalculationError::DuplicateEntry(entity_type.to_string()));
        }
        self.entities.insert(entity_type.to_string(), rules);
        Ok(())
    }

    /// The rules of a world, if configured.
    pub fn world(&self, name: &str) -> Option<&WorldRules> {
        self.worlds.get(name)
    }

    /// The variants of an entity type, if configured.
    pub fn entity(&self, entity_type: &str) -> Option<&EntityRules> {
        self.entities.get(entity_type)
    }

    /// Configured world names in sorted order.
    pub fn worlds(&self) -> impl Iterator<Item = &str> {
        self.worlds.keys().map(String::as_str)
    }

    /// Configured entity types in sorted order.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Evaluate a spawn.
    ///
    /// Returns `Ok(None)` if the world or the entity type is not
    /// configured. Errors are local to this call.
    pub fn spawn(&self, request: &SpawnRequest, rng: &mut dyn RngCore) -> Result<Option<SpawnOutcome>, CalculationError> {
        let (Some(world), Some(entity)) = (self.world(&request.world), self.entity(&request.entity_type)) else {
            return Ok(None);
        };

        let (variables, level) = world.evaluate(&request.position, rng)?;
        let outcome = entity.spawn(&request.entity_type, level, &variables, rng)?;
        tracing::debug!(
            "{} in '{}' at ({:.1}, {:.1}, {:.1}): level {}, variant '{}'",
            request.entity_type,
            request.world,
            request.position.x,
            request.position.y,
            request.position.z,
            level,
            outcome.variant
        );
        Ok(Some(outcome))
    }
}
