//! Declarative rule configuration.
//!
//! [`RulesConfig`] mirrors the configuration file. [`RulesConfig::build`]
//! validates it and turns it into [`Rules`]; every failure names the
//! position of the offending entry.
//!
//! ```toml
//! [worlds.overworld.variables]
//! distance = "sqrt(x^2 + z^2)"
//! level = "floor(distance / 100)"
//!
//! [worlds.overworld.borders]
//! min = 1
//! max = 100
//!
//! [entities.ZOMBIE.variants.plain]
//! weight = 10
//! name = "[$level] $type"
//!
//! [entities.ZOMBIE.variants.plain.attributes]
//! max_health = "20 + level"
//!
//! [entities.ZOMBIE.variants.plain.drops.bones]
//! item = "BONE"
//! chance = 0.5
//! ```

use crate::border::LevelBorder;
use crate::calculation::Calculation;
use crate::distance::DistanceMethod;
use crate::error::{CalculationError, ConfigError};
use crate::expression::Expression;
use crate::hotspot::{ChangeKind, Hotspot, LevelChange, Position};
use crate::loot::{DropEntry, LootTable};
use crate::node::CalculationNode;
use crate::rules::Rules;
use crate::variable::VariableName;
use crate::variant::{EntityRules, Variant};
use crate::world::{LevelSource, WorldRules, LEVEL_VARIABLE, POSITION_VARIABLES};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// Table entries in document order.
///
/// Formula tables keep the order they are written in, which decides the
/// execution order of formulas that become ready at the same time.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<V>(pub Vec<(String, V)>);

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> Entries<V> {
    /// Iterate in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<V: Serialize> Serialize for Entries<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Entries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut seen = HashSet::new();
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    if !seen.insert(key.clone()) {
                        return Err(serde::de::Error::custom(format!("duplicate key '{}'", key)));
                    }
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// A formula written as a string or a bare number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Formula(pub String);

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(Formula(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text,
            Repr::Integer(n) => n.to_string(),
            Repr::Float(n) => n.to_string(),
        }))
    }
}

impl From<&str> for Formula {
    fn from(source: &str) -> Self {
        Formula(source.to_string())
    }
}

/// Optional level bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BorderConfig {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

/// One level change rule of a hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LevelChangeConfig {
    pub level_change: i32,
    pub distance_per_change: f64,
    #[serde(default)]
    pub distance_offset: f64,
    /// Horizontal rules only.
    #[serde(default)]
    pub distance_method: Option<DistanceMethod>,
    #[serde(default)]
    pub borders: Option<BorderConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HotspotConfig {
    pub center: Position,
    #[serde(default)]
    pub base_level: i32,
    #[serde(default)]
    pub horizontal: Option<LevelChangeConfig>,
    #[serde(default)]
    pub vertical: Option<LevelChangeConfig>,
    #[serde(default)]
    pub borders: Option<BorderConfig>,
}

/// A world's level source and bounds. Exactly one of `variables` and
/// `hotspots` must be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct WorldConfig {
    #[serde(default)]
    pub variables: Entries<Formula>,
    #[serde(default)]
    pub hotspots: Entries<HotspotConfig>,
    #[serde(default)]
    pub borders: Option<BorderConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DropConfig {
    pub item: String,
    pub chance: Formula,
    #[serde(default)]
    pub amount: Option<Formula>,
    #[serde(default)]
    pub damage: Option<Formula>,
    #[serde(default)]
    pub data: Option<Formula>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VariantConfig {
    pub weight: Formula,
    /// Name pattern with `$level`, `$variation` and `$type`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_visible: bool,
    #[serde(default)]
    pub attributes: Entries<Formula>,
    #[serde(default)]
    pub experience: Option<Formula>,
    #[serde(default)]
    pub drops: Entries<DropConfig>,
    #[serde(default)]
    pub replace_default_drops: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EntityConfig {
    #[serde(default)]
    pub variants: Entries<VariantConfig>,
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(default)]
    pub worlds: Entries<WorldConfig>,
    #[serde(default)]
    pub entities: Entries<EntityConfig>,
}

fn at(path: &str, key: &str) -> String {
    format!("{}.{}", path, key)
}

fn invalid(path: String) -> impl FnOnce(CalculationError) -> ConfigError {
    move |source| ConfigError::Invalid { path, source }
}

fn structure(path: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Structure {
        path: path.into(),
        message: message.into(),
    }
}

fn border(config: Option<&BorderConfig>, path: &str) -> Result<LevelBorder, ConfigError> {
    match config {
        Some(b) => LevelBorder::new(b.min, b.max).map_err(invalid(at(path, "borders"))),
        None => Ok(LevelBorder::unbounded()),
    }
}

fn parse_node(name: &str, formula: &Formula, known: &BTreeSet<VariableName>, path: String) -> Result<CalculationNode, ConfigError> {
    let expression = Expression::parse_with_known(&formula.0, known).map_err(|source| ConfigError::Formula {
        path: path.clone(),
        source,
    })?;
    CalculationNode::new(name, expression).map_err(invalid(path))
}

fn names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Result<BTreeSet<VariableName>, CalculationError> {
    names.into_iter().map(VariableName::new).collect()
}

impl RulesConfig {
    /// Read a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a file, choosing the format by extension (`.json` is JSON,
    /// everything else TOML).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&text),
            _ => Self::from_toml(&text),
        }
    }

    /// Validate the configuration and build the rule set.
    ///
    /// World formulas may reference `x`, `y`, `z` and the world's own
    /// variables and must provide `level`. Variant and drop formulas may
    /// reference `x`, `y`, `z`, `level` and the variables every world
    /// declares.
    pub fn build(&self) -> Result<Rules, ConfigError> {
        if self.worlds.is_empty() {
            return Err(structure("worlds", "no worlds configured"));
        }
        if self.entities.is_empty() {
            return Err(structure("entities", "no entities configured"));
        }

        let mut rules = Rules::new();
        let mut shared: Option<BTreeSet<VariableName>> = None;
        for (name, world) in self.worlds.iter() {
            let path = at("worlds", name);
            let (rules_for_world, declared) = build_world(world, &path)?;
            rules.add_world(name, rules_for_world).map_err(invalid(path))?;
            shared = Some(match shared {
                Some(previous) => previous.intersection(&declared).cloned().collect(),
                None => declared,
            });
        }

        let mut known = names(POSITION_VARIABLES.iter().copied().chain([LEVEL_VARIABLE])).map_err(invalid("worlds".into()))?;
        known.extend(shared.unwrap_or_default());

        for (entity_type, entity) in self.entities.iter() {
            let path = at("entities", entity_type);
            let entity_rules = build_entity(entity, &known, &path)?;
            rules.add_entity(entity_type, entity_rules).map_err(invalid(path))?;
        }

        tracing::debug!(
            "built rules for {} world(s) and {} entity type(s)",
            self.worlds.len(),
            self.entities.len()
        );
        Ok(rules)
    }
}

/// Build one world and return it with the variables its formulas declare.
fn build_world(world: &WorldConfig, path: &str) -> Result<(WorldRules, BTreeSet<VariableName>), ConfigError> {
    let world_border = border(world.borders.as_ref(), path)?;
    let mut declared = BTreeSet::new();

    let source = match (world.variables.is_empty(), world.hotspots.is_empty()) {
        (false, true) => {
            let variables_path = at(path, "variables");
            let mut known = names(POSITION_VARIABLES).map_err(invalid(variables_path.clone()))?;
            for (name, _) in world.variables.iter() {
                let name = VariableName::new(name).map_err(invalid(at(&variables_path, name)))?;
                known.insert(name.clone());
                declared.insert(name);
            }

            let mut calculation = Calculation::with_seeds(POSITION_VARIABLES).map_err(invalid(variables_path.clone()))?;
            for (name, formula) in world.variables.iter() {
                let entry = at(&variables_path, name);
                let node = parse_node(name, formula, &known, entry.clone())?;
                calculation.add_node(node).map_err(invalid(entry))?;
            }
            LevelSource::Formulas(calculation)
        }
        (true, false) => {
            let mut hotspots = Vec::with_capacity(world.hotspots.len());
            for (name, hotspot) in world.hotspots.iter() {
                hotspots.push(build_hotspot(name, hotspot, &at(&at(path, "hotspots"), name))?);
            }
            LevelSource::Hotspots(hotspots)
        }
        (true, true) => return Err(structure(path, "either variables or hotspots must be configured")),
        (false, false) => return Err(structure(path, "variables and hotspots cannot be combined")),
    };

    let rules = match WorldRules::new(source, world_border) {
        Ok(rules) => rules,
        Err(source) => {
            let detail = match &source {
                CalculationError::UnresolvedDependency { variable, .. } => at(&at(path, "variables"), variable.as_str()),
                CalculationError::Cycle { .. } | CalculationError::MissingVariables(_) => at(path, "variables"),
                _ => path.to_string(),
            };
            return Err(ConfigError::Invalid { path: detail, source });
        }
    };
    Ok((rules, declared))
}

fn build_hotspot(name: &str, config: &HotspotConfig, path: &str) -> Result<Hotspot, ConfigError> {
    if config.horizontal.is_none() && config.vertical.is_none() {
        return Err(structure(path, "missing level change configuration"));
    }

    let mut hotspot = Hotspot::new(name, config.center, config.base_level, border(config.borders.as_ref(), path)?);
    if let Some(horizontal) = &config.horizontal {
        let method = horizontal.distance_method.unwrap_or_default();
        hotspot = hotspot.with_change(build_change(ChangeKind::Horizontal(method), horizontal, &at(path, "horizontal"))?);
    }
    if let Some(vertical) = &config.vertical {
        let change_path = at(path, "vertical");
        if vertical.distance_method.is_some() {
            return Err(structure(at(&change_path, "distance-method"), "only horizontal changes measure with a distance method"));
        }
        hotspot = hotspot.with_change(build_change(ChangeKind::Vertical, vertical, &change_path)?);
    }
    Ok(hotspot)
}

fn build_change(kind: ChangeKind, config: &LevelChangeConfig, path: &str) -> Result<LevelChange, ConfigError> {
    LevelChange::new(
        kind,
        config.level_change,
        config.distance_per_change,
        config.distance_offset,
        border(config.borders.as_ref(), path)?,
    )
    .map_err(invalid(path.to_string()))
}

fn build_entity(entity: &EntityConfig, known: &BTreeSet<VariableName>, path: &str) -> Result<EntityRules, ConfigError> {
    if entity.variants.is_empty() {
        return Err(structure(at(path, "variants"), "no variants configured"));
    }

    let mut rules = EntityRules::new();
    for (name, config) in entity.variants.iter() {
        let variant_path = at(&at(path, "variants"), name);
        let variant = build_variant(name, config, known, &variant_path)?;
        rules.add(variant).map_err(invalid(variant_path))?;
    }
    Ok(rules)
}

fn build_variant(name: &str, config: &VariantConfig, known: &BTreeSet<VariableName>, path: &str) -> Result<Variant, ConfigError> {
    let weight_path = at(path, "weight");
    let weight = parse_node("weight", &config.weight, known, weight_path.clone())?;
    let mut variant = Variant::with_weight_node(name, weight).map_err(invalid(path.to_string()))?;

    if let Some(pattern) = &config.name {
        variant = variant.with_name_pattern(pattern.clone(), config.name_visible);
    }
    for (attribute, formula) in config.attributes.iter() {
        let node = parse_node(attribute, formula, known, at(&at(path, "attributes"), attribute))?;
        variant = variant.with_attribute(node);
    }
    if let Some(experience) = &config.experience {
        variant = variant.with_experience(parse_node("experience", experience, known, at(path, "experience"))?);
    }

    let mut loot = LootTable::new(config.replace_default_drops);
    for (drop_name, drop) in config.drops.iter() {
        let drop_path = at(&at(path, "drops"), drop_name);
        let chance = parse_node("dropChance", &drop.chance, known, at(&drop_path, "chance"))?;
        let mut entry = DropEntry::with_chance_node(drop_name, &drop.item, chance).map_err(invalid(drop_path.clone()))?;
        if let Some(amount) = &drop.amount {
            entry = entry.with_amount(parse_node("amount", amount, known, at(&drop_path, "amount"))?);
        }
        if let Some(damage) = &drop.damage {
            entry = entry.with_damage(parse_node("damage", damage, known, at(&drop_path, "damage"))?);
        }
        if let Some(data) = &drop.data {
            entry = entry.with_data(parse_node("data", data, known, at(&drop_path, "data"))?);
        }
        loot.add(entry).map_err(invalid(drop_path))?;
    }
    Ok(variant.with_loot(loot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SpawnRequest;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BASIC: &str = r#"
        [worlds.overworld.variables]
        level = "abs(x) / 10"

        [entities.ZOMBIE.variants.plain]
        weight = 1
    "#;

    fn error_path(text: &str) -> String {
        let err = RulesConfig::from_toml(text).unwrap().build().unwrap_err();
        err.path().unwrap_or_default().to_string()
    }

    #[test]
    fn test_basic_toml_builds() {
        let rules = RulesConfig::from_toml(BASIC).unwrap().build().unwrap();
        assert!(rules.world("overworld").is_some());
        assert!(rules.entity("ZOMBIE").is_some());
    }

    #[test]
    fn test_entries_keep_document_order() {
        let config = RulesConfig::from_toml(
            r#"
            [worlds.w.variables]
            zeta = "1"
            alpha = 2
            level = 3.5
            "#,
        )
        .unwrap();
        let (_, world) = config.worlds.iter().next().unwrap();
        let keys: Vec<&str> = world.variables.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "level"]);
        let formulas: Vec<&str> = world.variables.iter().map(|(_, f)| f.0.as_str()).collect();
        assert_eq!(formulas, vec!["1", "2", "3.5"]);
    }

    #[test]
    fn test_unknown_variable_has_path() {
        let text = r#"
            [worlds.overworld.variables]
            level = "distance / 10"
            [entities.ZOMBIE.variants.plain]
            weight = 1
        "#;
        let err = RulesConfig::from_toml(text).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigError::Formula { .. }));
        assert_eq!(err.path(), Some("worlds.overworld.variables.level"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let text = r#"
            [worlds.overworld.variables]
            a = "level + 1"
            level = "a"
            [entities.ZOMBIE.variants.plain]
            weight = 1
        "#;
        let err = RulesConfig::from_toml(text).unwrap().build().unwrap_err();
        match err {
            ConfigError::Invalid {
                path,
                source: CalculationError::Cycle { path: cycle },
            } => {
                assert_eq!(path, "worlds.overworld.variables");
                assert_eq!(cycle.len(), 3);
            }
            other => panic!("Expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_level_is_rejected() {
        let text = r#"
            [worlds.overworld.variables]
            distance = "abs(x)"
            [entities.ZOMBIE.variants.plain]
            weight = 1
        "#;
        assert_eq!(error_path(text), "worlds.overworld.variables");
    }

    #[test]
    fn test_variant_formula_validated_against_worlds() {
        let text = r#"
            [worlds.a.variables]
            distance = "abs(x)"
            level = "distance / 10"
            [worlds.b.variables]
            level = "1"
            [entities.ZOMBIE.variants.plain]
            weight = "distance"
        "#;
        assert_eq!(error_path(text), "entities.ZOMBIE.variants.plain.weight");

        let shared = text.replace("level = \"1\"", "distance = \"0\"\nlevel = \"1\"");
        assert!(RulesConfig::from_toml(&shared).unwrap().build().is_ok());
    }

    #[test]
    fn test_reserved_variable_names_rejected() {
        for (key, formula) in [("e", "5"), ("random", "5"), ("pi", "3")] {
            let text = format!(
                "[worlds.overworld.variables]\n{} = \"{}\"\nlevel = \"{} * 2\"\n\n[entities.ZOMBIE.variants.plain]\nweight = 1\n",
                key, formula, key
            );
            let err = RulesConfig::from_toml(&text).unwrap().build().unwrap_err();
            assert!(
                matches!(
                    &err,
                    ConfigError::Invalid {
                        source: CalculationError::InvalidVariableName(name),
                        ..
                    } if name == key
                ),
                "unexpected error {:?}",
                err
            );
            assert_eq!(err.path(), Some(format!("worlds.overworld.variables.{}", key).as_str()));
        }
    }

    #[test]
    fn test_reserved_attribute_names_rejected() {
        let text = format!("{}\n[entities.ZOMBIE.variants.plain.attributes]\nmax = \"20\"\n", BASIC);
        assert_eq!(error_path(&text), "entities.ZOMBIE.variants.plain.attributes.max");
    }

    #[test]
    fn test_border_errors_have_path() {
        let text = format!("{}\n[worlds.overworld.borders]\nmin = 10\nmax = 0\n", BASIC);
        assert_eq!(error_path(&text), "worlds.overworld.borders");
    }

    #[test]
    fn test_hotspot_requires_change() {
        let text = r#"
            [worlds.overworld.hotspots.spawn]
            center = { x = 0.0, y = 64.0, z = 0.0 }
            [entities.ZOMBIE.variants.plain]
            weight = 1
        "#;
        assert_eq!(error_path(text), "worlds.overworld.hotspots.spawn");
    }

    #[test]
    fn test_hotspot_world_spawns() {
        let text = r#"
            [worlds.overworld.hotspots.spawn]
            center = { x = 0.0, y = 64.0, z = 0.0 }
            base-level = 1
            borders = { max = 10 }

            [worlds.overworld.hotspots.spawn.horizontal]
            level-change = 1
            distance-per-change = 100
            distance-offset = 50
            distance-method = "pythagoras"

            [worlds.overworld.hotspots.spawn.vertical]
            level-change = 1
            distance-per-change = 20

            [entities.SKELETON.variants.archer]
            weight = "level"
            name = "$variation ($level)"
            name-visible = true
            experience = "level * 2"
        "#;
        let rules = RulesConfig::from_toml(text).unwrap().build().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = rules
            .spawn(
                &SpawnRequest::new("overworld", "SKELETON", Position::new(300.0, 24.0, 400.0)),
                &mut rng,
            )
            .unwrap()
            .unwrap();
        // 1 + floor((500 - 50) / 100) + floor(40 / 20)
        assert_eq!(outcome.level, 7);
        assert_eq!(outcome.custom_name.as_deref(), Some("archer (7)"));
        assert_eq!(outcome.death.experience, Some(14));
    }

    #[test]
    fn test_vertical_rejects_distance_method() {
        let text = r#"
            [worlds.overworld.hotspots.spawn]
            center = { x = 0.0, y = 64.0, z = 0.0 }
            [worlds.overworld.hotspots.spawn.vertical]
            level-change = 1
            distance-per-change = 20
            distance-method = "euclidean"
            [entities.ZOMBIE.variants.plain]
            weight = 1
        "#;
        assert_eq!(
            error_path(text),
            "worlds.overworld.hotspots.spawn.vertical.distance-method"
        );
    }

    #[test]
    fn test_drop_defaults_and_paths() {
        let text = r#"
            [worlds.overworld.variables]
            level = "5"
            [entities.ZOMBIE.variants.plain]
            weight = 1
            replace-default-drops = true
            [entities.ZOMBIE.variants.plain.drops.flesh]
            item = "ROTTEN_FLESH"
            chance = 1
            amount = "level"
            [entities.ZOMBIE.variants.plain.drops.broken]
            item = "STONE"
            chance = "1 +"
        "#;
        assert_eq!(error_path(text), "entities.ZOMBIE.variants.plain.drops.broken.chance");

        let fixed = text.replace("chance = \"1 +\"", "chance = 0");
        let rules = RulesConfig::from_toml(&fixed).unwrap().build().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = rules
            .spawn(&SpawnRequest::new("overworld", "ZOMBIE", Position::default()), &mut rng)
            .unwrap()
            .unwrap();
        assert!(outcome.death.replace_default_drops);
        assert_eq!(outcome.death.drops.len(), 1);
        assert_eq!(outcome.death.drops[0].item, "ROTTEN_FLESH");
        assert_eq!(outcome.death.drops[0].amount, 5);
        assert_eq!(outcome.death.drops[0].damage, 0);
    }

    #[test]
    fn test_json_matches_toml() {
        let json = r#"{
            "worlds": { "overworld": { "variables": { "level": "abs(x) / 10" } } },
            "entities": { "ZOMBIE": { "variants": { "plain": { "weight": 1 } } } }
        }"#;
        let from_json = RulesConfig::from_json(json).unwrap();
        let from_toml = RulesConfig::from_toml(BASIC).unwrap();
        assert_eq!(from_json, from_toml);
    }

    #[test]
    fn test_json_duplicate_keys_rejected() {
        let json = r#"{ "worlds": { "w": { "variables": { "level": "1", "level": "2" } } } }"#;
        assert!(matches!(RulesConfig::from_json(json), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let text = format!("{}\ncolour = \"red\"\n", BASIC);
        assert!(matches!(RulesConfig::from_toml(&text), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = RulesConfig::from_toml(BASIC).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RulesConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_empty_configuration_rejected() {
        let err = RulesConfig::default().build().unwrap_err();
        assert_eq!(err.path(), Some("worlds"));
    }
}
