//! Default world example: level formulas, variants and loot from TOML
//!
//! This example demonstrates:
//! - Building rules from a configuration document
//! - Evaluating spawns at a few positions
//! - Reading the death data a host would apply later

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spawncalc::*;

const CONFIG: &str = r#"
[worlds.overworld.variables]
centerX = 123
centerY = 62
centerZ = -672
horizontalDistancePerLevel = 80
offset = 40
verticalDistancePerLevel = 10
distance = "sqrt((x - centerX)^2 + (z - centerZ)^2)"
actualDistance = "max(0, distance - offset)"
levelHorizontal = "min(100, floor(actualDistance / horizontalDistancePerLevel))"
levelVertical = "floor(max(0, centerY - y) / verticalDistancePerLevel)"
level = "levelHorizontal + levelVertical"

[worlds.overworld.borders]
min = 1
max = 100

[entities.ZOMBIE.variants.common]
weight = 10
name = "[$level] $type"
experience = "5 + level"

[entities.ZOMBIE.variants.common.attributes]
max_health = "20 + level * 2"

[entities.ZOMBIE.variants.common.drops.flesh]
item = "ROTTEN_FLESH"
chance = 0.8
amount = "1 + randomInt(3)"

[entities.ZOMBIE.variants.brute]
weight = "min(10, level / 2)"
name = "[$level] $variation $type"
name-visible = true

[entities.ZOMBIE.variants.brute.attributes]
max_health = "40 + level * 4"
attack_damage = "3 + level / 5"

[entities.ZOMBIE.variants.brute.drops.iron]
item = "IRON_INGOT"
chance = "0.02 * level"
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Default World Demo ===\n");

    let rules = RulesConfig::from_toml(CONFIG)?.build()?;
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    let positions = [
        Position::new(0.0, 0.0, 0.0),
        Position::new(123.0, 70.0, -672.0),
        Position::new(-1500.0, 12.0, 2200.0),
    ];

    for position in positions {
        let request = SpawnRequest::new("overworld", "ZOMBIE", position);
        let Some(outcome) = rules.spawn(&request, &mut rng)? else {
            continue;
        };

        println!(
            "At ({:.0}, {:.0}, {:.0}): level {}, variant '{}'",
            position.x, position.y, position.z, outcome.level, outcome.variant
        );
        if let Some(name) = &outcome.custom_name {
            println!("  Name: {} (visible: {})", name, outcome.name_visible);
        }
        for (attribute, value) in &outcome.attributes {
            println!("  {}: {:.2}", attribute, value);
        }
        if let Some(experience) = outcome.death.experience {
            println!("  Experience: {}", experience);
        }
        for drop in &outcome.death.drops {
            println!("  Drop: {} x{}", drop.item, drop.amount);
        }
        println!();
    }

    Ok(())
}
