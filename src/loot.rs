//! Item drops rolled on death.
//!
//! Every [`DropEntry`] is rolled on its own: a uniform draw `u` in `[0, 1)`
//! materializes the drop iff `u <= chance`.

use crate::error::CalculationError;
use crate::node::CalculationNode;
use crate::numeric::{narrow_i16, narrow_i32, narrow_i8};
use crate::variable::Variables;
use rand::{Rng, RngCore};
use serde::Serialize;
use std::collections::BTreeMap;

/// A materialized drop handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDrop {
    /// Item type identifier, as configured.
    pub item: String,
    pub amount: i32,
    pub damage: i16,
    pub data: i8,
}

/// One independently rolled drop.
///
/// Identity is the entry name.
#[derive(Debug, Clone)]
pub struct DropEntry {
    name: String,
    item: String,
    chance: CalculationNode,
    amount: CalculationNode,
    damage: CalculationNode,
    data: CalculationNode,
}

impl DropEntry {
    /// Create an entry with the given chance formula and the default
    /// amount `1`, damage `0` and data `0`.
    pub fn new(name: &str, item: &str, chance: &str) -> Result<Self, CalculationError> {
        Self::with_chance_node(name, item, CalculationNode::parse("dropChance", chance)?)
    }

    /// Create an entry from an already built chance node, with the same
    /// defaults as [`new`](Self::new).
    pub fn with_chance_node(name: &str, item: &str, chance: CalculationNode) -> Result<Self, CalculationError> {
        if name.is_empty() {
            return Err(CalculationError::InvalidVariableName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            item: item.to_string(),
            chance,
            amount: CalculationNode::parse("amount", "1")?,
            damage: CalculationNode::parse("damage", "0")?,
            data: CalculationNode::parse("data", "0")?,
        })
    }

    /// Replace the amount formula.
    pub fn with_amount(mut self, node: CalculationNode) -> Self {
        self.amount = node;
        self
    }

    /// Replace the damage formula.
    pub fn with_damage(mut self, node: CalculationNode) -> Self {
        self.damage = node;
        self
    }

    /// Replace the data formula.
    pub fn with_data(mut self, node: CalculationNode) -> Self {
        self.data = node;
        self
    }

    /// The entry name, unique within a loot table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The item type identifier handed to the host.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// The raw drop chance. Values at or above `1` always drop, values
    /// below `0` never do.
    pub fn chance(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<f64, CalculationError> {
        self.chance.evaluate(variables, rng)
    }

    /// Compute the drop without rolling for it.
    pub fn materialize(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<ItemDrop, CalculationError> {
        Ok(ItemDrop {
            item: self.item.clone(),
            amount: narrow_i32(self.amount.evaluate(variables, rng)?)?,
            damage: narrow_i16(self.damage.evaluate(variables, rng)?)?,
            data: narrow_i8(self.data.evaluate(variables, rng)?)?,
        })
    }

    /// Roll for the drop and materialize it on success.
    pub fn roll(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<Option<ItemDrop>, CalculationError> {
        let u: f64 = rng.gen();
        let chance = self.chance(variables, rng)?;
        let hit = u <= chance;
        tracing::trace!("drop '{}': rolled {:.4} against {:.4}, hit: {}", self.name, u, chance, hit);
        if !hit {
            return Ok(None);
        }
        self.materialize(variables, rng).map(Some)
    }
}

impl PartialEq for DropEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DropEntry {}

/// The drops of a variant, ordered by entry name.
#[derive(Debug, Clone, Default)]
pub struct LootTable {
    entries: BTreeMap<String, DropEntry>,
    replace_default_drops: bool,
}

impl LootTable {
    /// Create an empty table.
    ///
    /// With `replace_default_drops` the host drops only what this table
    /// rolls; otherwise the rolled drops come on top of the defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spawncalc::{DropEntry, LootTable};
    ///
    /// let mut table = LootTable::new(true);
    /// table.add(DropEntry::new("bones", "BONE", "0.5").unwrap()).unwrap();
    /// assert!(table.replaces_default_drops());
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn new(replace_default_drops: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            replace_default_drops,
        }
    }

    /// Add an entry, failing with `DuplicateEntry` if its name is taken.
    pub fn add(&mut self, entry: DropEntry) -> Result<(), CalculationError> {
        if self.entries.contains_key(entry.name()) {
            return Err(CalculationError::DuplicateEntry(entry.name));
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Whether the host should drop only this table's loot.
    pub fn replaces_default_drops(&self) -> bool {
        self.replace_default_drops
    }

    /// Iterate over the entries ordered by name.
    pub fn entries(&self) -> impl Iterator<Item = &DropEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Roll every entry once.
    pub fn generate_loot(&self, variables: &Variables, rng: &mut dyn RngCore) -> Result<Vec<ItemDrop>, CalculationError> {
        generate_loot(self.entries.values(), variables, rng)
    }
}

/// Roll every entry once and collect the drops that materialize.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{loot::generate_loot, DropEntry, Variables};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let entries = [
///     DropEntry::new("bones", "BONE", "1").unwrap(),
///     DropEntry::new("nothing", "DIAMOND", "-1").unwrap(),
/// ];
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let drops = generate_loot(&entries, &Variables::new(), &mut rng).unwrap();
/// assert_eq!(drops.len(), 1);
/// assert_eq!(drops[0].item, "BONE");
/// assert_eq!(drops[0].amount, 1);
/// ```
pub fn generate_loot<'a, I>(entries: I, variables: &Variables, rng: &mut dyn RngCore) -> Result<Vec<ItemDrop>, CalculationError>
where
    I: IntoIterator<Item = &'a DropEntry>,
{
    let mut drops = Vec::new();
    for entry in entries {
        if let Some(drop) = entry.roll(variables, rng)? {
            drops.push(drop);
        }
    }
    Ok(drops)
}
