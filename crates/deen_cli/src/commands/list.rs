use anyhow::Result;
use console::style;
use deen_domain::Category;
use deen_plugins::PluginRegistry;

pub fn run(registry: &PluginRegistry, category: Option<Category>, all: bool) -> Result<()> {
    let plugins: Vec<_> = registry
        .list(category)
        .into_iter()
        .filter(|p| all || p.prerequisites())
        .collect();

    if plugins.is_empty() {
        println!("{}", style("No plugins match").yellow());
        return Ok(());
    }

    let mut current: Option<Category> = None;
    for plugin in &plugins {
        let descriptor = plugin.descriptor();
        if current != Some(descriptor.category) {
            if current.is_some() {
                println!();
            }
            println!("{}", style(descriptor.category).bold().cyan());
            current = Some(descriptor.category);
        }

        let mut line = format!(
            "  {:<16} {:<12}",
            style(&descriptor.name).bold(),
            descriptor.display_name
        );
        if descriptor.reversible {
            line.push_str(&format!(" {}", style("reversible").green()));
        }
        if !descriptor.aliases.is_empty() {
            line.push_str(&format!(
                " {}",
                style(format!("aka {}", descriptor.aliases.join(", "))).dim()
            ));
        }
        if !plugin.prerequisites() {
            line.push_str(&format!(" {}", style("(unavailable)").red()));
        }
        println!("{line}");
    }

    Ok(())
}
