//! Basic usage example for deen plugins
//!
//! Run with: cargo run --example basic_usage

use deen_domain::{Category, Direction};
use deen_plugins::PluginRegistry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== deen plugins basic usage ===\n");

    let registry = PluginRegistry::with_builtins()?;

    println!("1. Registered plugins:");
    for plugin in registry.list(None) {
        let descriptor = plugin.descriptor();
        println!(
            "   {:<16} {:<11} reversible={} aliases={:?}",
            descriptor.name, descriptor.category, descriptor.reversible, descriptor.aliases
        );
    }

    println!("\n2. Encoding with a codec and reverting it...");
    let base64 = registry.lookup("b64").ok_or("base64 not registered")?;
    let encoded = base64.apply(Direction::Forward, b"Hello, deen!")?;
    println!("   encoded: {}", String::from_utf8_lossy(&encoded));
    let decoded = base64.apply(Direction::Reverse, &encoded)?;
    println!("   decoded: {}", String::from_utf8_lossy(&decoded));

    println!("\n3. Hashing...");
    for hash in registry.list(Some(Category::Hash)) {
        let digest = hash.apply(Direction::Forward, b"Hello, deen!")?;
        println!("   {:<7} {}", hash.name(), String::from_utf8_lossy(&digest));
    }

    println!("\n4. Formatting JSON...");
    let formatter = registry.lookup("json-format").ok_or("json formatter not registered")?;
    let pretty = formatter.apply(Direction::Forward, br#"{"b":1,"a":[true,null]}"#)?;
    println!("{}", String::from_utf8_lossy(&pretty));

    println!("\n5. Handling malformed input...");
    match formatter.apply(Direction::Forward, b"{bad json") {
        Ok(_) => println!("   unexpected success"),
        Err(e) => println!("   error: {}", e),
    }

    Ok(())
}
