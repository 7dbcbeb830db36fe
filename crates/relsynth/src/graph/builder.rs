//! Builds an [`EntitySet`] from a [`Dataset`].

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use super::{Entity, EntitySet, Relationship, Variable};
use crate::dataset::{Dataset, Resource, Table, Value};
use crate::error::{Result, SynthError};
use crate::inference::VariableTyper;
use crate::schema::VariableType;

/// Variable types per entity, per variable.
pub type VariableTypes = IndexMap<String, IndexMap<String, VariableType>>;

/// Converts dataset tables into typed entities and relationships.
pub struct GraphBuilder {
    typer: VariableTyper,
    fixed_types: VariableTypes,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            typer: VariableTyper::new(),
            fixed_types: VariableTypes::new(),
        }
    }

    /// Use known variable types instead of inferring them.
    ///
    /// `produce` passes the types recorded at fit time so both calls parse
    /// cells identically. Columns not listed are still inferred.
    pub fn with_variable_types(mut self, types: VariableTypes) -> Self {
        self.fixed_types = types;
        self
    }

    /// Build the entity graph.
    ///
    /// Non-tabular resources are skipped. Fails on the first table without a
    /// usable primary key and on foreign keys that do not resolve.
    pub fn build(&self, dataset: &Dataset) -> Result<EntitySet> {
        let mut entities = IndexMap::new();

        for (resource_id, resource) in dataset.resources() {
            let table = match resource {
                Resource::Table(table) => table,
                Resource::Other { kind, .. } => {
                    debug!(resource = %resource_id, ?kind, "skipping non-tabular resource");
                    continue;
                }
            };
            let entity = self.build_entity(table)?;
            entities.insert(entity.id.clone(), entity);
        }

        let relationships = build_relationships(dataset, &entities)?;
        debug!(
            entities = entities.len(),
            relationships = relationships.len(),
            "built entity graph"
        );

        Ok(EntitySet {
            id: dataset.id.clone(),
            entities,
            relationships,
        })
    }

    fn build_entity(&self, table: &Table) -> Result<Entity> {
        table.check()?;
        let primary_key = table
            .schema
            .primary_key()
            .ok_or_else(|| SynthError::construction(&table.name, "cannot find primary key"))?
            .name
            .clone();

        let mut types = self.typer.type_table(table, &primary_key);
        if let Some(fixed) = self.fixed_types.get(&table.name) {
            for (name, vtype) in types.iter_mut() {
                if let Some(known) = fixed.get(name) {
                    *vtype = *known;
                }
            }
        }

        let mut variables = IndexMap::new();
        for (name, vtype) in types {
            let col_index = table.data.column_index(&name).ok_or_else(|| {
                SynthError::construction(&table.name, format!("no data for column '{}'", name))
            })?;
            let values = table
                .data
                .column_values(col_index)
                .map(|raw| Value::parse(raw, vtype))
                .collect();
            variables.insert(name.clone(), Variable { name, vtype, values });
        }

        let index_lookup = index_lookup(&table.name, &variables[&primary_key].values)?;

        Ok(Entity {
            id: table.name.clone(),
            index: primary_key,
            variables,
            index_lookup,
            row_count: table.row_count(),
        })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Map each primary-key value to its row, rejecting nulls and duplicates.
fn index_lookup(table: &str, index: &[Value]) -> Result<HashMap<String, usize>> {
    let mut lookup = HashMap::with_capacity(index.len());
    for (row, value) in index.iter().enumerate() {
        let key = value.key().ok_or_else(|| {
            SynthError::construction(table, format!("null primary key value at row {}", row))
        })?;
        if lookup.insert(key.clone(), row).is_some() {
            return Err(SynthError::construction(
                table,
                format!("duplicate primary key value '{}'", key),
            ));
        }
    }
    Ok(lookup)
}

/// Register one relationship per foreign key, child→parent only.
fn build_relationships(
    dataset: &Dataset,
    entities: &IndexMap<String, Entity>,
) -> Result<Vec<Relationship>> {
    let relations = dataset.relations_graph();
    let mut relationships = Vec::new();

    for entity in entities.values() {
        let Some(links) = relations.get(&entity.id) else {
            continue;
        };

        // The parent→child half of each pair is the same relationship seen
        // from the other side
        for link in links.iter().filter(|l| l.other_is_parent) {
            let parent = entities.get(&link.other).ok_or_else(|| {
                SynthError::construction(
                    &entity.id,
                    format!(
                        "column '{}' references unknown table '{}'",
                        link.column, link.other
                    ),
                )
            })?;
            if parent.variable(&link.other_column).is_none() {
                return Err(SynthError::construction(
                    &entity.id,
                    format!(
                        "column '{}' references unknown column '{}.{}'",
                        link.column, link.other, link.other_column
                    ),
                ));
            }
            if parent.index != link.other_column {
                return Err(SynthError::construction(
                    &entity.id,
                    format!(
                        "column '{}' must reference the primary key of '{}', not '{}'",
                        link.column, link.other, link.other_column
                    ),
                ));
            }

            relationships.push(Relationship {
                parent_entity: parent.id.clone(),
                parent_variable: link.other_column.clone(),
                child_entity: entity.id.clone(),
                child_variable: link.column.clone(),
            });
        }
    }

    Ok(relationships)
}

/// Pick the table features are synthesized for.
///
/// An explicit resource wins, then the dataset entry point, then the only
/// table of the dataset.
pub fn resolve_target_resource(dataset: &Dataset, requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return match dataset.resource(name) {
            Some(Resource::Table(_)) => Ok(name.to_string()),
            Some(Resource::Other { .. }) => Err(SynthError::construction(
                name,
                "target resource is not a table",
            )),
            None => Err(SynthError::construction(name, "target resource not found")),
        };
    }

    if let Some(entry) = &dataset.entry_point {
        return resolve_target_resource(dataset, Some(entry));
    }

    let mut tables = dataset.tables();
    match (tables.next(), tables.next()) {
        (Some(only), None) => Ok(only.name.clone()),
        (None, _) => Err(SynthError::construction(&dataset.id, "dataset has no tables")),
        (Some(_), Some(_)) => Err(SynthError::construction(
            &dataset.id,
            "several tables and no entry point; set a target resource",
        )),
    }
}
