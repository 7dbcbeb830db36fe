//! Fit-produce command - fit on one dataset and produce for another.

use std::path::PathBuf;

use colored::Colorize;
use relsynth::input::DatasetLoader;
use relsynth::primitive::{CallOptions, Fit, GetParams, Produce};
use relsynth::MultiTableFeaturizer;

use crate::cli::TuningArgs;

pub fn run(
    train: PathBuf,
    test: PathBuf,
    output: Option<PathBuf>,
    params_out: Option<PathBuf>,
    tuning: TuningArgs,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let hyperparams = tuning.resolve()?;
    let loader = DatasetLoader::new();

    eprintln!(
        "{} {}",
        "Fitting on".cyan().bold(),
        train.display().to_string().white()
    );
    let train_set = loader.load(&train)?;
    let mut featurizer = MultiTableFeaturizer::new(hyperparams)?;
    featurizer.fit(&train_set, CallOptions::default())?;

    if let Some(path) = params_out {
        featurizer.get_params().save(&path)?;
    }

    eprintln!(
        "{} {}",
        "Producing for".cyan().bold(),
        test.display().to_string().white()
    );
    let test_set = loader.load(&test)?;
    let result = featurizer.produce(&test_set, CallOptions::default())?;

    super::write_output(&result.value, output.as_deref())
}
