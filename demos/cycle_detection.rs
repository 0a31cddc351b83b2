//! Cycle detection example: what happens when formulas reference each other
//!
//! This example shows:
//! - Nodes in a cycle stay unresolved instead of producing an order
//! - How `verify` reports the cycle path
//! - How a late seed variable resolves waiting nodes

use spawncalc::*;

fn main() -> Result<(), CalculationError> {
    println!("=== Setting up circular formulas ===\n");

    let mut calculation = Calculation::with_seeds(["x", "y", "z"])?;
    for (name, formula) in [("a", "b + 1"), ("b", "c * 2"), ("c", "a - x")] {
        calculation.add_node(CalculationNode::parse(name, formula)?)?;
        println!("{} = {}", name, formula);
    }

    println!("\n=== Checking the graph (should detect cycle) ===\n");

    println!("Unresolved nodes: {}", calculation.has_unresolved_nodes());
    match calculation.verify() {
        Err(CalculationError::Cycle { path }) => {
            println!("✓ Cycle detected successfully!");
            let names: Vec<&str> = path.iter().map(VariableName::as_str).collect();
            println!("\nCycle path: {}", names.join(" -> "));
        }
        Err(e) => println!("✗ Unexpected error: {}", e),
        Ok(()) => println!("✗ ERROR: Cycle was not detected! This should not happen."),
    }

    println!("\n=== Missing seed, supplied later ===\n");

    let mut late = Calculation::with_seeds(["x"])?;
    late.add_node(CalculationNode::parse("scaled", "offset * 2")?)?;
    late.add_node(CalculationNode::parse("level", "floor(x / scaled)")?)?;
    println!("scaled = offset * 2");
    println!("level = floor(x / scaled)");

    if let Err(e) = late.verify() {
        println!("Before: {}", e);
    }

    late.add_variable("offset")?;
    late.verify()?;
    println!("After adding seed 'offset': all nodes resolved");

    let mut variables = Variables::from_pairs([("x", 100.0), ("offset", 5.0)])?;
    late.execute(&mut variables, &mut rand::thread_rng())?;
    println!("\nResults:");
    println!("  scaled: {:.2}", variables.get("scaled").unwrap_or_default());
    println!("  level: {:.2}", variables.get("level").unwrap_or_default());

    println!("\n✓ Valid dependency chain resolved successfully!");
    Ok(())
}
