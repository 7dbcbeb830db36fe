//! Column metadata.

use serde::{Deserialize, Serialize};

use super::types::{ColumnRole, DeclaredType};

/// Reference from a foreign-key column to another resource's column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced resource id.
    pub resource: String,
    /// Referenced column name (normally the resource's primary key).
    pub column: String,
}

/// Metadata for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,
    /// Declared storage type, if the manifest gives one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<DeclaredType>,
    /// Roles of the column in its table.
    #[serde(default)]
    pub roles: Vec<ColumnRole>,
    /// Foreign-key reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refers_to: Option<ForeignKey>,
}

impl ColumnMeta {
    /// Create an attribute column with no declared type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            roles: vec![ColumnRole::Attribute],
            refers_to: None,
        }
    }

    /// Create a primary-key column.
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            roles: vec![ColumnRole::PrimaryKey],
            ..Self::new(name)
        }
    }

    /// Set the declared storage type.
    pub fn with_type(mut self, declared: DeclaredType) -> Self {
        self.declared_type = Some(declared);
        self
    }

    /// Replace the column roles.
    pub fn with_roles(mut self, roles: Vec<ColumnRole>) -> Self {
        self.roles = roles;
        self
    }

    /// Mark the column as a foreign key into `resource.column`.
    pub fn references(mut self, resource: impl Into<String>, column: impl Into<String>) -> Self {
        self.refers_to = Some(ForeignKey {
            resource: resource.into(),
            column: column.into(),
        });
        self
    }

    pub fn has_role(&self, role: ColumnRole) -> bool {
        self.roles.contains(&role)
    }

    /// Whether this column is an ordinary input column.
    ///
    /// Columns without any declared role count as attributes.
    pub fn is_attribute(&self) -> bool {
        (self.roles.is_empty() || self.has_role(ColumnRole::Attribute))
            && !self.has_role(ColumnRole::PrimaryKey)
            && !self.is_target()
    }

    /// Whether this column is a prediction target.
    pub fn is_target(&self) -> bool {
        self.has_role(ColumnRole::Target) || self.has_role(ColumnRole::SuggestedTarget)
    }
}
