//! Core type definitions for schema representation.

use serde::{Deserialize, Serialize};

/// Storage type observed in raw cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Text/string values.
    String,
    /// Boolean values (true/false).
    Boolean,
    /// Date and/or time values.
    DateTime,
    /// Date only (no time component).
    Date,
    /// Unable to determine type.
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::DateTime | ColumnType::Date)
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Unknown
    }
}

/// Storage type declared for a column in a dataset manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Integer,
    Real,
    Boolean,
    DateTime,
    Categorical,
    /// Free-form natural language text.
    Text,
    /// Opaque string with no further meaning.
    String,
}

/// Role a column plays in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Unique row identifier.
    PrimaryKey,
    /// Ordinary input column.
    Attribute,
    /// The label a downstream model predicts.
    Target,
    /// A label candidate when no explicit target is declared.
    SuggestedTarget,
    /// Column only available at training time.
    Privileged,
}

/// Semantic type of an entity variable, deciding which synthesis
/// primitives apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// The entity's own primary key.
    Index,
    /// A foreign key into another entity.
    Id,
    Numeric,
    Categorical,
    Boolean,
    Datetime,
    Text,
}

impl VariableType {
    /// Key variables identify rows and are never used as feature inputs.
    pub fn is_key(&self) -> bool {
        matches!(self, VariableType::Index | VariableType::Id)
    }
}

impl From<DeclaredType> for VariableType {
    fn from(declared: DeclaredType) -> Self {
        match declared {
            DeclaredType::Integer | DeclaredType::Real => VariableType::Numeric,
            DeclaredType::Boolean => VariableType::Boolean,
            DeclaredType::DateTime => VariableType::Datetime,
            DeclaredType::Categorical | DeclaredType::String => VariableType::Categorical,
            DeclaredType::Text => VariableType::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_mapping() {
        assert_eq!(VariableType::from(DeclaredType::Real), VariableType::Numeric);
        assert_eq!(VariableType::from(DeclaredType::String), VariableType::Categorical);
        assert_eq!(VariableType::from(DeclaredType::Text), VariableType::Text);
    }

    #[test]
    fn test_roles_deserialize_snake_case() {
        let roles: Vec<ColumnRole> =
            serde_json::from_str(r#"["primary_key", "suggested_target"]"#).unwrap();
        assert_eq!(roles, vec![ColumnRole::PrimaryKey, ColumnRole::SuggestedTarget]);
    }
}
