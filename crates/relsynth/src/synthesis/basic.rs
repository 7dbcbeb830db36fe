//! Built-in depth-limited synthesis engine.

use tracing::{debug, info};

use super::compute::Calculator;
use super::feature::{AggPrimitive, FeatureDescriptor};
use super::matrix::{FeatureColumn, FeatureMatrix};
use super::{ChunkSize, SynthesisEngine, SynthesisRequest};
use crate::dataset::Value;
use crate::error::{Result, SynthError};
use crate::graph::{EntitySet, Relationship};

/// Stacks identity, transform, aggregation and direct features up to the
/// requested depth.
///
/// For an entity, features are generated in this order: identity features of
/// its non-key variables, transforms of those, aggregations over each child
/// relationship (primitives in request order, `COUNT` once per
/// relationship), then direct features from each parent. Recursion never
/// walks back over the relationship it arrived through.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEngine;

impl BasicEngine {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate the features `synthesize` would compute, without computing
    /// them.
    pub fn generate(&self, es: &EntitySet, request: &SynthesisRequest) -> Result<Vec<FeatureDescriptor>> {
        if es.entity(&request.target_entity).is_none() {
            return Err(SynthError::construction(
                &request.target_entity,
                "target entity not in entity set",
            ));
        }
        if request.max_depth == 0 {
            return Err(SynthError::Config("max_depth must be at least 1".to_string()));
        }
        let generator = Generator { es, request };
        Ok(generator.features_for(&request.target_entity, request.max_depth, None))
    }
}

impl SynthesisEngine for BasicEngine {
    fn synthesize(
        &self,
        entityset: &EntitySet,
        request: &SynthesisRequest,
    ) -> Result<(FeatureMatrix, Vec<FeatureDescriptor>)> {
        let features = self.generate(entityset, request)?;
        info!(
            target_entity = %request.target_entity,
            max_depth = request.max_depth,
            features = features.len(),
            "generated candidate features"
        );
        let matrix = self.recompute(
            entityset,
            &request.target_entity,
            &features,
            request.chunk_size,
        )?;
        Ok((matrix, features))
    }

    fn recompute(
        &self,
        entityset: &EntitySet,
        target_entity: &str,
        features: &[FeatureDescriptor],
        chunk_size: ChunkSize,
    ) -> Result<FeatureMatrix> {
        let target = entityset.entity(target_entity).ok_or_else(|| {
            SynthError::construction(target_entity, "target entity not in entity set")
        })?;
        if let Some(stray) = features.iter().find(|f| f.entity != target_entity) {
            return Err(SynthError::UnknownFeature {
                feature: stray.name.clone(),
                message: format!(
                    "feature describes '{}', not target entity '{}'",
                    stray.entity, target_entity
                ),
            });
        }

        let total = target.row_count();
        let step = chunk_size.rows_for(total);
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(total); features.len()];
        let mut calculator = Calculator::new(entityset);

        for start in (0..total).step_by(step) {
            let end = (start + step).min(total);
            debug!(start, end, total, "computing feature chunk");
            for (feature, column) in features.iter().zip(columns.iter_mut()) {
                column.extend(calculator.rows(feature, start..end)?);
            }
        }

        let mut matrix = FeatureMatrix::new(target.index.clone(), target.index_values().to_vec());
        for (feature, values) in features.iter().zip(columns) {
            matrix.push_column(FeatureColumn::new(feature.name.clone(), values));
        }
        Ok(matrix)
    }
}

struct Generator<'a> {
    es: &'a EntitySet,
    request: &'a SynthesisRequest,
}

impl Generator<'_> {
    /// Features of `entity` no deeper than `depth`.
    fn features_for(
        &self,
        entity_id: &str,
        depth: usize,
        arrived_by: Option<&Relationship>,
    ) -> Vec<FeatureDescriptor> {
        let Some(entity) = self.es.entity(entity_id) else {
            return Vec::new();
        };
        let mut features = Vec::new();

        let identities: Vec<FeatureDescriptor> = entity
            .variables()
            .filter(|v| !v.vtype.is_key())
            .filter(|v| !self.request.is_ignored(entity_id, &v.name))
            .map(|v| FeatureDescriptor::identity(entity_id, &v.name, v.vtype))
            .collect();
        features.extend(identities.iter().cloned());

        if depth == 0 {
            return features;
        }

        for primitive in &self.request.trans_primitives {
            for base in identities.iter().filter(|f| primitive.applies_to(f.output_type)) {
                features.push(FeatureDescriptor::transform(*primitive, base.clone()));
            }
        }

        for relationship in self.es.children_of(entity_id) {
            if Some(relationship) == arrived_by {
                continue;
            }
            let child_label = self.child_label(relationship);
            let child_features =
                self.features_for(&relationship.child_entity, depth - 1, Some(relationship));

            for primitive in &self.request.agg_primitives {
                if *primitive == AggPrimitive::Count {
                    features.push(FeatureDescriptor::count(relationship, &child_label));
                    continue;
                }
                for base in child_features
                    .iter()
                    .filter(|f| primitive.applies_to(f.output_type))
                {
                    features.push(FeatureDescriptor::aggregation(
                        *primitive,
                        relationship,
                        &child_label,
                        base.clone(),
                    ));
                }
            }
        }

        for relationship in self.es.parents_of(entity_id) {
            if Some(relationship) == arrived_by {
                continue;
            }
            let parent_label = self.parent_label(relationship);
            for base in self.features_for(&relationship.parent_entity, depth - 1, Some(relationship)) {
                features.push(FeatureDescriptor::direct(relationship, &parent_label, base));
            }
        }

        features
    }

    /// Child name in feature names, qualified by the foreign key when the
    /// same pair of entities is linked more than once.
    fn child_label(&self, relationship: &Relationship) -> String {
        if self.is_ambiguous(relationship) {
            format!("{}[{}]", relationship.child_entity, relationship.child_variable)
        } else {
            relationship.child_entity.clone()
        }
    }

    fn parent_label(&self, relationship: &Relationship) -> String {
        if self.is_ambiguous(relationship) {
            format!("{}[{}]", relationship.parent_entity, relationship.child_variable)
        } else {
            relationship.parent_entity.clone()
        }
    }

    fn is_ambiguous(&self, relationship: &Relationship) -> bool {
        self.es
            .relationships()
            .iter()
            .filter(|r| {
                r.parent_entity == relationship.parent_entity
                    && r.child_entity == relationship.child_entity
            })
            .count()
            > 1
    }
}
