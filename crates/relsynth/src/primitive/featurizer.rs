//! Multi-table deep feature synthesis with unsupervised pruning.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::hyperparams::{Hyperparams, ReturnResult};
use super::metadata::{MULTI_TABLE_METADATA, PrimitiveMetadata};
use super::output::OutputTable;
use super::params::{FittedState, Params, schema_digest};
use super::{CallOptions, CallResult, Fit, GetParams, Primitive, Produce, SetParams};
use crate::dataset::{Dataset, Table};
use crate::error::{Result, SynthError};
use crate::graph::{Entity, GraphBuilder, resolve_target_resource};
use crate::prune::Pruner;
use crate::synthesis::{BasicEngine, FeatureMatrix, SynthesisEngine, SynthesisRequest};

/// Creates features for one table of a multi-table dataset by following its
/// foreign keys, then keeps the subset that is mostly present and not
/// redundant.
///
/// # Example
///
/// ```no_run
/// use relsynth::input::DatasetLoader;
/// use relsynth::primitive::{CallOptions, Fit, Hyperparams, MultiTableFeaturizer, Produce};
///
/// # fn main() -> relsynth::Result<()> {
/// let train = DatasetLoader::new().load("train/datasetDoc.json")?;
/// let test = DatasetLoader::new().load("test/datasetDoc.json")?;
///
/// let mut featurizer = MultiTableFeaturizer::new(Hyperparams::default())?;
/// featurizer.fit(&train, CallOptions::default())?;
/// let output = featurizer.produce(&test, CallOptions::default())?.value;
/// println!("{} features", output.n_columns());
/// # Ok(())
/// # }
/// ```
pub struct MultiTableFeaturizer<E = BasicEngine> {
    hyperparams: Hyperparams,
    engine: E,
    state: Option<FittedState>,
}

impl MultiTableFeaturizer<BasicEngine> {
    /// Create an unfitted featurizer using the built-in engine.
    pub fn new(hyperparams: Hyperparams) -> Result<Self> {
        Self::with_engine(hyperparams, BasicEngine::new())
    }
}

impl<E: SynthesisEngine> MultiTableFeaturizer<E> {
    /// Create an unfitted featurizer using a custom synthesis engine.
    pub fn with_engine(hyperparams: Hyperparams, engine: E) -> Result<Self> {
        hyperparams.validate()?;
        Ok(Self {
            hyperparams,
            engine,
            state: None,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn fitted_state(&self) -> Option<&FittedState> {
        self.state.as_ref()
    }

    /// Variables of the target table that must not feed synthesis.
    ///
    /// The target column is always left out. `use_columns` keeps only the
    /// listed column indices; otherwise `exclude_columns` drops the listed
    /// ones. Indices past the last column are skipped.
    fn ignore_variables(&self, table: &Table) -> IndexMap<String, Vec<String>> {
        let columns = &table.schema.columns;
        let mut ignored: Vec<String> = Vec::new();

        if let Some(target) = table.schema.target_column() {
            ignored.push(target.name.clone());
        }

        for &index in self
            .hyperparams
            .use_columns
            .iter()
            .chain(&self.hyperparams.exclude_columns)
        {
            if index >= columns.len() {
                warn!(table = %table.name, index, "column index out of range, skipping");
            }
        }

        if !self.hyperparams.use_columns.is_empty() {
            for (index, column) in columns.iter().enumerate() {
                if !self.hyperparams.use_columns.contains(&index) {
                    ignored.push(column.name.clone());
                }
            }
        } else {
            for &index in &self.hyperparams.exclude_columns {
                if let Some(column) = columns.get(index) {
                    ignored.push(column.name.clone());
                }
            }
        }

        ignored.sort();
        ignored.dedup();
        let mut map = IndexMap::new();
        if !ignored.is_empty() {
            debug!(table = %table.name, ?ignored, "ignoring variables");
            map.insert(table.name.clone(), ignored);
        }
        map
    }

    /// Assemble the output table from the target entity and the features.
    fn combine(&self, table: &Table, entity: &Entity, features: FeatureMatrix) -> Result<OutputTable> {
        let mut output = OutputTable::new();
        let original = |name: &str| {
            entity.variable(name).map(|v| v.values.clone()).ok_or_else(|| {
                SynthError::construction(&table.name, format!("column '{}' not in entity", name))
            })
        };
        let feature_columns = features.columns().to_vec();

        match self.hyperparams.return_result {
            ReturnResult::New => {
                output.push_column(entity.index.clone(), entity.index_values().to_vec());
                for column in feature_columns {
                    output.push_column(column.name, column.values);
                }
                if let Some(target) = table.schema.target_column() {
                    output.push_column(target.name.clone(), original(&target.name)?);
                }
            }
            ReturnResult::Append => {
                for column in &table.schema.columns {
                    output.push_column(column.name.clone(), original(&column.name)?);
                }
                for column in feature_columns {
                    output.push_column(column.name, column.values);
                }
            }
            ReturnResult::Replace => {
                // Features take the slot of the first attribute removed
                let mut pending = Some(feature_columns);
                for column in &table.schema.columns {
                    if column.is_attribute() && column.refers_to.is_none() {
                        for f in pending.take().into_iter().flatten() {
                            output.push_column(f.name, f.values);
                        }
                        continue;
                    }
                    output.push_column(column.name.clone(), original(&column.name)?);
                }
                for f in pending.into_iter().flatten() {
                    output.push_column(f.name, f.values);
                }
            }
        }

        Ok(output)
    }
}

impl<E> Primitive for MultiTableFeaturizer<E> {
    type Hyperparams = Hyperparams;

    fn metadata(&self) -> &'static PrimitiveMetadata {
        &MULTI_TABLE_METADATA
    }

    fn hyperparams(&self) -> &Hyperparams {
        &self.hyperparams
    }
}

impl<E: SynthesisEngine> Fit<Dataset> for MultiTableFeaturizer<E> {
    fn fit(&mut self, inputs: &Dataset, options: CallOptions) -> Result<CallResult<()>> {
        if !options.is_empty() {
            debug!(?options, "call limits are not enforced");
        }
        let target = resolve_target_resource(inputs, self.hyperparams.target_resource.as_deref())?;
        let table = inputs
            .table(&target)
            .ok_or_else(|| SynthError::construction(&target, "target resource not found"))?;

        let entityset = GraphBuilder::new().build(inputs)?;

        let request = SynthesisRequest {
            target_entity: target.clone(),
            ignore_variables: self.ignore_variables(table),
            max_depth: self.hyperparams.max_depth,
            agg_primitives: self.hyperparams.agg_primitives.clone(),
            trans_primitives: self.hyperparams.trans_primitives.clone(),
            chunk_size: self.hyperparams.chunk_size,
        };
        let (mut matrix, features) = self.engine.synthesize(&entityset, &request)?;

        // Produce repeats this before any null accounting
        matrix.normalize_non_finite();

        let (_, retained) =
            Pruner::with_config(self.hyperparams.prune_config()).prune(&matrix, &features)?;

        let variable_types = entityset.variable_types();
        info!(
            target_entity = %target,
            candidates = features.len(),
            retained = retained.len(),
            "fitted featurizer"
        );
        self.state = Some(FittedState {
            target_entity: target,
            features: retained,
            training_digest: schema_digest(&variable_types),
            variable_types,
        });

        Ok(CallResult::finished(()))
    }
}

impl<E: SynthesisEngine> Produce<Dataset> for MultiTableFeaturizer<E> {
    type Output = OutputTable;

    fn produce(&self, inputs: &Dataset, options: CallOptions) -> Result<CallResult<OutputTable>> {
        let state = self.state.as_ref().ok_or(SynthError::NotFitted)?;
        if !options.is_empty() {
            debug!(?options, "call limits are not enforced");
        }

        let table = inputs.table(&state.target_entity).ok_or_else(|| {
            SynthError::construction(&state.target_entity, "target resource not found")
        })?;

        let entityset = GraphBuilder::new()
            .with_variable_types(state.variable_types.clone())
            .build(inputs)?;
        if schema_digest(&entityset.variable_types()) != state.training_digest {
            warn!("input schema differs from the training schema");
        }

        let entity = entityset.entity(&state.target_entity).ok_or_else(|| {
            SynthError::construction(&state.target_entity, "target entity not in entity set")
        })?;

        let matrix = self.engine.recompute(
            &entityset,
            &state.target_entity,
            &state.features,
            self.hyperparams.chunk_size,
        )?;
        let mut matrix = matrix.reindex(entity.index_values());
        matrix.normalize_non_finite();

        info!(
            target_entity = %state.target_entity,
            rows = matrix.n_rows(),
            features = matrix.n_columns(),
            "produced feature matrix"
        );
        let output = self.combine(table, entity, matrix)?;
        Ok(CallResult::finished(output))
    }
}

impl<E> GetParams for MultiTableFeaturizer<E> {
    type Params = Params;

    fn get_params(&self) -> Params {
        Params {
            state: self.state.clone(),
        }
    }
}

impl<E> SetParams for MultiTableFeaturizer<E> {
    type Params = Params;

    fn set_params(&mut self, params: Params) -> Result<()> {
        self.state = params.state;
        Ok(())
    }
}
