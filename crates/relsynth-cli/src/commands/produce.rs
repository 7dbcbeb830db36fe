//! Produce command - compute saved features for a dataset.

use std::path::PathBuf;

use colored::Colorize;
use relsynth::input::DatasetLoader;
use relsynth::primitive::{CallOptions, Produce, SetParams};
use relsynth::{Hyperparams, MultiTableFeaturizer, Params};

use crate::cli::ReturnResultChoice;

pub fn run(
    manifest: PathBuf,
    params: PathBuf,
    output: Option<PathBuf>,
    return_result: ReturnResultChoice,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !params.exists() {
        return Err(format!(
            "Params file not found: {}\nRun 'relsynth fit' first.",
            params.display()
        )
        .into());
    }

    eprintln!(
        "{} {}",
        "Producing for".cyan().bold(),
        manifest.display().to_string().white()
    );

    let params = Params::load(&params)?;
    let dataset = DatasetLoader::new().load(&manifest)?;

    let hyperparams = Hyperparams {
        return_result: return_result.into(),
        ..Default::default()
    };
    let mut featurizer = MultiTableFeaturizer::new(hyperparams)?;
    featurizer.set_params(params)?;
    let result = featurizer.produce(&dataset, CallOptions::default())?;

    super::write_output(&result.value, output.as_deref())
}
