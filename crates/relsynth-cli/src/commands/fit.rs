//! Fit command - synthesize and prune features, save the fitted params.

use std::path::PathBuf;

use colored::Colorize;
use relsynth::input::DatasetLoader;
use relsynth::primitive::{CallOptions, Fit, GetParams};
use relsynth::MultiTableFeaturizer;

use crate::cli::TuningArgs;

pub fn run(
    manifest: PathBuf,
    output: PathBuf,
    tuning: TuningArgs,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !manifest.exists() {
        return Err(format!("Manifest not found: {}", manifest.display()).into());
    }

    eprintln!(
        "{} {}",
        "Fitting on".cyan().bold(),
        manifest.display().to_string().white()
    );

    let hyperparams = tuning.resolve()?;
    let dataset = DatasetLoader::new().load(&manifest)?;

    let mut featurizer = MultiTableFeaturizer::new(hyperparams)?;
    featurizer.fit(&dataset, CallOptions::default())?;

    let params = featurizer.get_params();
    if let Some(state) = &params.state {
        eprintln!(
            "{} {} features for '{}'",
            "Retained".green().bold(),
            state.features.len(),
            state.target_entity
        );
        if verbose {
            for feature in &state.features {
                eprintln!("  {:40} {:?}", feature.name, feature.output_type);
            }
        }
    }

    params.save(&output)?;
    eprintln!(
        "{} {}",
        "Saved params to".green().bold(),
        output.display().to_string().white()
    );
    Ok(())
}
