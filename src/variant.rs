//! Spawn variants and their effects.
//!
//! A [`Variant`] is one weighted alternative for an entity type. Applying
//! it produces a [`SpawnOutcome`]: the name, attribute values and death
//! data the host applies to the spawned entity.

use crate::error::CalculationError;
use crate::loot::{ItemDrop, LootTable};
use crate::node::CalculationNode;
use crate::numeric::narrow_i32;
use crate::selection::{select_weighted, Weighted};
use crate::variable::Variables;
use rand::RngCore;
use serde::Serialize;
use std::collections::BTreeMap;

const PLACEHOLDERS: [&str; 3] = ["level", "variation", "type"];

/// Fill `$level`, `$variation` and `$type` into a name pattern.
///
/// A placeholder directly preceded by another `$` is left as written.
///
/// # Examples
///
/// ```rust
/// use spawncalc::variant::render_name;
///
/// assert_eq!(render_name("[$level] $type", 14, "brute", "ZOMBIE"), "[14] ZOMBIE");
/// assert_eq!(render_name("$$level", 14, "brute", "ZOMBIE"), "$$level");
/// ```
pub fn render_name(pattern: &str, level: i32, variation: &str, entity_type: &str) -> String {
    let level = level.to_string();
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    let mut previous: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        if c == '$' && previous != Some('$') {
            let tail = &rest[1..];
            let hit = PLACEHOLDERS.iter().find(|p| tail.starts_with(**p));
            if let Some(&placeholder) = hit {
                out.push_str(match placeholder {
                    "level" => level.as_str(),
                    "variation" => variation,
                    _ => entity_type,
                });
                rest = &tail[placeholder.len()..];
                previous = placeholder.chars().last();
                continue;
            }
        }
        out.push(c);
        previous = Some(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// What the host keeps with the entity and applies on its death.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathData {
    /// Experience to drop; `None` keeps the host's default.
    pub experience: Option<i32>,
    pub drops: Vec<ItemDrop>,
    pub replace_default_drops: bool,
}

/// The effects of a selected variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnOutcome {
    pub variant: String,
    pub level: i32,
    pub custom_name: Option<String>,
    pub name_visible: bool,
    /// Attribute identifier to base value.
    pub attributes: BTreeMap<String, f64>,
    pub death: DeathData,
}

/// One weighted alternative for an entity type.
///
/// Identity is the variant name.
#[derive(Debug, Clone)]
pub struct Variant {
    name: String,
    weight: CalculationNode,
    name_pattern: Option<String>,
    name_visible: bool,
    attributes: BTreeMap<String, CalculationNode>,
    experience: Option<CalculationNode>,
    loot: LootTable,
}

impl Variant {
    /// Create a variant with a weight formula and no effects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spawncalc::Variant;
    ///
    /// let variant = Variant::new("brute", "level / 2").unwrap();
    /// assert_eq!(variant.name(), "brute");
    /// assert!(Variant::new("", "1").is_err());
    /// ```
    pub fn new(name: &str, weight: &str) -> Result<Self, CalculationError> {
        Self::with_weight_node(name, CalculationNode::parse("weight", weight)?)
    }

    /// Create a variant from an already built weight node.
    pub fn with_weight_node(name: &str, weight: CalculationNode) -> Result<Self, CalculationError> {
        if name.is_empty() {
            return Err(CalculationError::InvalidVariableName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            weight,
            name_pattern: None,
            name_visible: false,
            attributes: BTreeMap::new(),
            experience: None,
            loot: LootTable::default(),
        })
    }

    /// Set the custom name pattern and whether the host shows it.
    ///
    /// See [`render_name`] for the placeholders.
    pub fn with_name_pattern(mut self, pattern: impl Into<String>, visible: bool) -> Self {
        self.name_pattern = Some(pattern.into());
        self.name_visible = visible;
        self
    }

    /// Set an attribute's base value formula. The node's variable names the
    /// attribute.
    pub fn with_attribute(mut self, node: CalculationNode) -> Self {
        self.attributes
            .insert(node.provided_variable().as_str().to_string(), node);
        self
    }

    /// Set the experience formula. Without one the host keeps its default.
    pub fn with_experience(mut self, node: CalculationNode) -> Self {
        self.experience = Some(node);
        self
    }

    /// Set the loot table rolled on death.
    pub fn with_loot(mut self, loot: LootTable) -> Self {
        self.loot = loot;
        self
    }

    /// The variant name, used as `$variation` in name patterns.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The drops rolled when an entity of this variant dies.
    pub fn loot(&self) -> &LootTable {
        &self.loot
    }

    /// Compute every effect of this variant.
    ///
    /// `variables` should already contain `level`.
    pub fn apply(
        &self,
        entity_type: &str,
        level: i32,
        variables: &Variables,
        rng: &mut dyn RngCore,
    ) -> Result<SpawnOutcome, CalculationError> {
        let custom_name = self
            .name_pattern
            .as_deref()
            .map(|pattern| render_name(pattern, level, &self.name, entity_type));

        let mut attributes = BTreeMap::new();
        for (attribute, node) in &self.attributes {
            attributes.insert(attribute.clone(), node.evaluate(variables, rng)?);
        }

        let experience = match &self.experience {
            Some(node) => Some(narrow_i32(node.evaluate(variables, rng)?)?),
            None => None,
        };

        Ok(SpawnOutcome {
            variant: self.name.clone(),
            level,
            custom_name,
            name_visible: self.name_visible,
            attributes,
            death: DeathData {
                experience,
                drops: self.loot.generate_loot(variables, rng)?,
                replace_default_drops: self.loot.replaces_default_drops(),
            },
        })
    }
}

impl Weighted for Variant {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<i32, CalculationError> {
        narrow_i32(self.weight.evaluate(variables, rng)?)
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variant {}

/// The variants of one entity type, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct EntityRules {
    variants: Vec<Variant>,
}

impl EntityRules {
    /// Create an empty set of variants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant, failing with `DuplicateEntry` if its name is taken.
    pub fn add(&mut self, variant: Variant) -> Result<(), CalculationError> {
        match self
            .variants
            .binary_search_by(|v| v.name.as_str().cmp(variant.name.as_str()))
        {
            Ok(_) => Err(CalculationError::DuplicateEntry(variant.name)),
            Err(index) => {
                self.variants.insert(index, variant);
                Ok(())
            }
        }
    }

    /// The variants, ordered by name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spawncalc::{EntityRules, Variant};
    ///
    /// let mut rules = EntityRules::new();
    /// rules.add(Variant::new("zeta", "1").unwrap()).unwrap();
    /// rules.add(Variant::new("alpha", "1").unwrap()).unwrap();
    ///
    /// let names: Vec<&str> = rules.variants().iter().map(|v| v.name()).collect();
    /// assert_eq!(names, ["alpha", "zeta"]);
    /// ```
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Whether no variant is configured.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Pick a variant by weight and apply it.
    pub fn spawn(
        &self,
        entity_type: &str,
        level: i32,
        variables: &Variables,
        rng: &mut dyn RngCore,
    ) -> Result<SpawnOutcome, CalculationError> {
        let variant = select_weighted(&self.variants, variables, rng)?;
        variant.apply(entity_type, level, variables, rng)
    }
}
