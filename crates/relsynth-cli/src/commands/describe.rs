//! Describe command - print primitive metadata and default hyperparameters.

use colored::Colorize;
use relsynth::primitive::MULTI_TABLE_METADATA;
use relsynth::Hyperparams;

pub fn run(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let metadata = &*MULTI_TABLE_METADATA;
    let defaults = Hyperparams::default();

    if json_output {
        let description = serde_json::json!({
            "metadata": metadata,
            "hyperparams": defaults,
        });
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!("{} {}", metadata.name.cyan().bold(), metadata.version.white());
    println!("  id:       {}", metadata.id);
    println!("  path:     {}", metadata.path);
    println!("  family:   {:?}", metadata.primitive_family);
    println!("  keywords: {}", metadata.keywords.join(", "));
    println!();
    println!("{}", "Default hyperparameters:".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&defaults)?);
    println!();
    println!(
        "{} {}",
        "Tune:".yellow().bold(),
        metadata.hyperparameters_to_tune.join(", ")
    );
    Ok(())
}
