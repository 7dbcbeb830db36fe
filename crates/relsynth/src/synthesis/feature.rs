//! Feature descriptors and synthesis primitives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SynthError;
use crate::graph::Relationship;
use crate::schema::VariableType;

/// Aggregation applied over a parent's child rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggPrimitive {
    Mean,
    Sum,
    Count,
    Mode,
    NumUnique,
}

impl AggPrimitive {
    /// Default aggregation set, in generation order.
    pub const DEFAULTS: [AggPrimitive; 5] = [
        AggPrimitive::Mean,
        AggPrimitive::Sum,
        AggPrimitive::Count,
        AggPrimitive::Mode,
        AggPrimitive::NumUnique,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggPrimitive::Mean => "MEAN",
            AggPrimitive::Sum => "SUM",
            AggPrimitive::Count => "COUNT",
            AggPrimitive::Mode => "MODE",
            AggPrimitive::NumUnique => "NUM_UNIQUE",
        }
    }

    /// Whether the primitive accepts a base feature of this type.
    ///
    /// `Count` takes no base feature and accepts nothing here.
    pub fn applies_to(&self, input: VariableType) -> bool {
        match self {
            AggPrimitive::Mean | AggPrimitive::Sum => input == VariableType::Numeric,
            AggPrimitive::Mode | AggPrimitive::NumUnique => input == VariableType::Categorical,
            AggPrimitive::Count => false,
        }
    }

    pub fn output_type(&self, input: VariableType) -> VariableType {
        match self {
            AggPrimitive::Mode => input,
            _ => VariableType::Numeric,
        }
    }
}

impl FromStr for AggPrimitive {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(AggPrimitive::Mean),
            "sum" => Ok(AggPrimitive::Sum),
            "count" => Ok(AggPrimitive::Count),
            "mode" => Ok(AggPrimitive::Mode),
            "num_unique" => Ok(AggPrimitive::NumUnique),
            other => Err(SynthError::Config(format!(
                "unknown aggregation primitive '{}'",
                other
            ))),
        }
    }
}

/// Row-wise transform of a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransPrimitive {
    Day,
    Week,
    Month,
    Year,
    NumWords,
    NumCharacters,
}

impl TransPrimitive {
    /// Default transform set, in generation order.
    pub const DEFAULTS: [TransPrimitive; 6] = [
        TransPrimitive::Day,
        TransPrimitive::Week,
        TransPrimitive::Month,
        TransPrimitive::Year,
        TransPrimitive::NumWords,
        TransPrimitive::NumCharacters,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransPrimitive::Day => "DAY",
            TransPrimitive::Week => "WEEK",
            TransPrimitive::Month => "MONTH",
            TransPrimitive::Year => "YEAR",
            TransPrimitive::NumWords => "NUM_WORDS",
            TransPrimitive::NumCharacters => "NUM_CHARACTERS",
        }
    }

    pub fn applies_to(&self, input: VariableType) -> bool {
        match self {
            TransPrimitive::Day
            | TransPrimitive::Week
            | TransPrimitive::Month
            | TransPrimitive::Year => input == VariableType::Datetime,
            TransPrimitive::NumWords | TransPrimitive::NumCharacters => {
                input == VariableType::Text
            }
        }
    }
}

impl FromStr for TransPrimitive {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TransPrimitive::Day),
            "week" => Ok(TransPrimitive::Week),
            "month" => Ok(TransPrimitive::Month),
            "year" => Ok(TransPrimitive::Year),
            "num_words" => Ok(TransPrimitive::NumWords),
            "num_characters" => Ok(TransPrimitive::NumCharacters),
            other => Err(SynthError::Config(format!(
                "unknown transform primitive '{}'",
                other
            ))),
        }
    }
}

/// How a feature is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    /// A variable of the entity itself.
    Identity { variable: String },
    /// A parent feature copied onto each child row.
    Direct {
        relationship: Relationship,
        base: Box<FeatureDescriptor>,
    },
    /// A child feature aggregated per parent row. `Count` has no base.
    Aggregation {
        primitive: AggPrimitive,
        relationship: Relationship,
        base: Option<Box<FeatureDescriptor>>,
    },
    /// A row-wise transform of a feature on the same entity.
    Transform {
        primitive: TransPrimitive,
        base: Box<FeatureDescriptor>,
    },
}

/// Identifies one synthesized column. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Column name in the feature matrix.
    pub name: String,
    /// Entity whose rows the feature describes.
    pub entity: String,
    pub kind: FeatureKind,
    /// Type of the produced values.
    pub output_type: VariableType,
    /// Number of stacked primitives; identity features have depth 0.
    pub depth: usize,
}

impl FeatureDescriptor {
    pub fn identity(entity: &str, variable: &str, vtype: VariableType) -> Self {
        Self {
            name: variable.to_string(),
            entity: entity.to_string(),
            kind: FeatureKind::Identity {
                variable: variable.to_string(),
            },
            output_type: vtype,
            depth: 0,
        }
    }

    /// Bring a parent feature onto the child entity of `relationship`.
    ///
    /// `parent_label` names the parent in the feature name.
    pub fn direct(relationship: &Relationship, parent_label: &str, base: FeatureDescriptor) -> Self {
        Self {
            name: format!("{}.{}", parent_label, base.name),
            entity: relationship.child_entity.clone(),
            output_type: base.output_type,
            depth: base.depth + 1,
            kind: FeatureKind::Direct {
                relationship: relationship.clone(),
                base: Box::new(base),
            },
        }
    }

    /// Aggregate a child feature onto the parent entity of `relationship`.
    ///
    /// `child_label` names the child in the feature name.
    pub fn aggregation(
        primitive: AggPrimitive,
        relationship: &Relationship,
        child_label: &str,
        base: FeatureDescriptor,
    ) -> Self {
        Self {
            name: format!("{}({}.{})", primitive.name(), child_label, base.name),
            entity: relationship.parent_entity.clone(),
            output_type: primitive.output_type(base.output_type),
            depth: base.depth + 1,
            kind: FeatureKind::Aggregation {
                primitive,
                relationship: relationship.clone(),
                base: Some(Box::new(base)),
            },
        }
    }

    /// Count child rows per parent row.
    pub fn count(relationship: &Relationship, child_label: &str) -> Self {
        Self {
            name: format!("{}({})", AggPrimitive::Count.name(), child_label),
            entity: relationship.parent_entity.clone(),
            output_type: VariableType::Numeric,
            depth: 1,
            kind: FeatureKind::Aggregation {
                primitive: AggPrimitive::Count,
                relationship: relationship.clone(),
                base: None,
            },
        }
    }

    pub fn transform(primitive: TransPrimitive, base: FeatureDescriptor) -> Self {
        Self {
            name: format!("{}({})", primitive.name(), base.name),
            entity: base.entity.clone(),
            output_type: VariableType::Numeric,
            depth: base.depth + 1,
            kind: FeatureKind::Transform {
                primitive,
                base: Box::new(base),
            },
        }
    }

    /// The descriptor this one is built on, if any.
    pub fn base(&self) -> Option<&FeatureDescriptor> {
        match &self.kind {
            FeatureKind::Identity { .. } => None,
            FeatureKind::Direct { base, .. } | FeatureKind::Transform { base, .. } => Some(&**base),
            FeatureKind::Aggregation { base, .. } => base.as_deref(),
        }
    }
}

impl fmt::Display for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Feature: {}>", self.name)
    }
}
