//! Graph command - show entities and relationships of a dataset.

use std::path::PathBuf;

use colored::Colorize;
use relsynth::input::DatasetLoader;
use relsynth::GraphBuilder;

pub fn run(manifest: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = DatasetLoader::new().load(&manifest)?;
    let entityset = GraphBuilder::new().build(&dataset)?;

    if json_output {
        let graph = serde_json::json!({
            "id": entityset.id,
            "entry_point": dataset.entry_point,
            "entities": entityset.entities().map(|e| serde_json::json!({
                "id": e.id,
                "index": e.index,
                "rows": e.row_count(),
                "variables": e.variable_types(),
            })).collect::<Vec<_>>(),
            "relationships": entityset.relationships(),
        });
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Entity graph for".cyan().bold(),
        entityset.id.white()
    );
    println!();

    println!("{}", "Entities:".yellow().bold());
    for entity in entityset.entities() {
        let marker = if dataset.entry_point.as_deref() == Some(entity.id.as_str()) {
            " (entry point)".green().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} [{} rows, index {}]{}",
            entity.id.white().bold(),
            entity.row_count(),
            entity.index,
            marker
        );
        if verbose {
            for variable in entity.variables() {
                println!("    {:24} {:?}", variable.name, variable.vtype);
            }
        }
    }
    println!();

    println!("{}", "Relationships:".yellow().bold());
    if entityset.relationships().is_empty() {
        println!("  {}", "none".dimmed());
    }
    for rel in entityset.relationships() {
        println!(
            "  {}.{} -> {}.{}",
            rel.child_entity, rel.child_variable, rel.parent_entity, rel.parent_variable
        );
    }

    Ok(())
}
