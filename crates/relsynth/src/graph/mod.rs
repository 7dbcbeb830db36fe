//! Entity graph - typed, indexed entities linked by child→parent relationships.
//!
//! The graph mirrors a [`Dataset`](crate::dataset::Dataset): one [`Entity`] per
//! table and one [`Relationship`] per foreign key. It is rebuilt on every
//! `fit` and `produce` call and never persisted.

mod builder;

pub use builder::{GraphBuilder, VariableTypes, resolve_target_resource};

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Value;
use crate::schema::VariableType;

/// A typed column of an entity.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub vtype: VariableType,
    /// One value per entity row, in the table's natural order.
    pub values: Vec<Value>,
}

/// One table's rows treated as instances of a type.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Entity id (the resource id).
    pub id: String,
    /// Name of the index variable.
    pub index: String,
    variables: IndexMap<String, Variable>,
    index_lookup: HashMap<String, usize>,
    row_count: usize,
}

impl Entity {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Variables in column order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Index values in natural row order.
    pub fn index_values(&self) -> &[Value] {
        &self.variables[&self.index].values
    }

    /// Row position of an index value.
    pub fn row_of(&self, key: &Value) -> Option<usize> {
        key.key().and_then(|k| self.index_lookup.get(&k).copied())
    }

    /// Variable types keyed by variable name.
    pub fn variable_types(&self) -> IndexMap<String, VariableType> {
        self.variables
            .values()
            .map(|v| (v.name.clone(), v.vtype))
            .collect()
    }
}

/// A foreign-key link from a child entity to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub parent_entity: String,
    pub parent_variable: String,
    pub child_entity: String,
    pub child_variable: String,
}

/// The full entity graph.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    pub id: String,
    entities: IndexMap<String, Entity>,
    relationships: Vec<Relationship>,
}

impl EntitySet {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Entities in dataset order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Relationships where `entity` is the parent.
    pub fn children_of<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.parent_entity == entity)
    }

    /// Relationships where `entity` is the child.
    pub fn parents_of<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.child_entity == entity)
    }

    /// Variable types of every entity, as recorded in fitted state.
    pub fn variable_types(&self) -> VariableTypes {
        self.entities
            .values()
            .map(|e| (e.id.clone(), e.variable_types()))
            .collect()
    }
}
