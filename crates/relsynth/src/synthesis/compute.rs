//! Feature value computation over an entity set.

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use chrono::Datelike;
use indexmap::IndexMap;

use super::feature::{AggPrimitive, FeatureDescriptor, FeatureKind, TransPrimitive};
use crate::dataset::Value;
use crate::error::{Result, SynthError};
use crate::graph::{Entity, EntitySet, Relationship};

/// Computes feature columns, caching full columns of non-target features.
pub(crate) struct Calculator<'a> {
    es: &'a EntitySet,
    cache: HashMap<(String, String), Rc<Vec<Value>>>,
}

impl<'a> Calculator<'a> {
    pub(crate) fn new(es: &'a EntitySet) -> Self {
        Self {
            es,
            cache: HashMap::new(),
        }
    }

    /// Values of `feature` for every row of its entity.
    fn full(&mut self, feature: &FeatureDescriptor) -> Result<Rc<Vec<Value>>> {
        let key = (feature.entity.clone(), feature.name.clone());
        if let Some(values) = self.cache.get(&key) {
            return Ok(Rc::clone(values));
        }
        let rows = self.entity(feature, &feature.entity)?.row_count();
        let values = Rc::new(self.rows(feature, 0..rows)?);
        self.cache.insert(key, Rc::clone(&values));
        Ok(values)
    }

    /// Values of `feature` for a contiguous range of its entity's rows.
    pub(crate) fn rows(&mut self, feature: &FeatureDescriptor, range: Range<usize>) -> Result<Vec<Value>> {
        match &feature.kind {
            FeatureKind::Identity { variable } => {
                let entity = self.entity(feature, &feature.entity)?;
                let var = entity.variable(variable).ok_or_else(|| {
                    unknown(feature, format!("entity '{}' has no variable '{}'", entity.id, variable))
                })?;
                Ok(var.values[range].to_vec())
            }
            FeatureKind::Transform { primitive, base } => {
                let values = self.rows(base, range)?;
                Ok(values.iter().map(|v| apply_transform(*primitive, v)).collect())
            }
            FeatureKind::Direct { relationship, base } => {
                let parent_values = self.full(base)?;
                let (parent, child) = self.endpoints(feature, relationship)?;
                let fk = foreign_keys(feature, child, relationship)?;
                Ok(fk[range]
                    .iter()
                    .map(|key| {
                        parent
                            .row_of(key)
                            .map_or(Value::Null, |row| parent_values[row].clone())
                    })
                    .collect())
            }
            FeatureKind::Aggregation {
                primitive,
                relationship,
                base,
            } => {
                let base_values = match base {
                    Some(b) => Some(self.full(b)?),
                    None => None,
                };
                let (parent, child) = self.endpoints(feature, relationship)?;
                let fk = foreign_keys(feature, child, relationship)?;

                let mut groups: Vec<Vec<usize>> = vec![Vec::new(); range.len()];
                for (child_row, key) in fk.iter().enumerate() {
                    if let Some(parent_row) = parent.row_of(key) {
                        if range.contains(&parent_row) {
                            groups[parent_row - range.start].push(child_row);
                        }
                    }
                }

                Ok(groups
                    .iter()
                    .map(|rows| aggregate(*primitive, rows, base_values.as_deref()))
                    .collect())
            }
        }
    }

    fn entity(&self, feature: &FeatureDescriptor, id: &str) -> Result<&'a Entity> {
        self.es
            .entity(id)
            .ok_or_else(|| unknown(feature, format!("entity '{}' not found", id)))
    }

    fn endpoints(
        &self,
        feature: &FeatureDescriptor,
        relationship: &Relationship,
    ) -> Result<(&'a Entity, &'a Entity)> {
        Ok((
            self.entity(feature, &relationship.parent_entity)?,
            self.entity(feature, &relationship.child_entity)?,
        ))
    }
}

fn foreign_keys<'e>(
    feature: &FeatureDescriptor,
    child: &'e Entity,
    relationship: &Relationship,
) -> Result<&'e [Value]> {
    child
        .variable(&relationship.child_variable)
        .map(|v| v.values.as_slice())
        .ok_or_else(|| {
            unknown(
                feature,
                format!(
                    "entity '{}' has no variable '{}'",
                    child.id, relationship.child_variable
                ),
            )
        })
}

fn unknown(feature: &FeatureDescriptor, message: String) -> SynthError {
    SynthError::UnknownFeature {
        feature: feature.name.clone(),
        message,
    }
}

/// Aggregate the base values of one parent's child rows.
///
/// Empty groups give 0 for counts, sums and unique counts, missing otherwise.
fn aggregate(primitive: AggPrimitive, rows: &[usize], base: Option<&Vec<Value>>) -> Value {
    if primitive == AggPrimitive::Count {
        return Value::Int(rows.len() as i64);
    }
    let Some(base) = base else {
        return Value::Null;
    };
    let present = rows.iter().map(|&r| &base[r]).filter(|v| !v.is_missing());

    match primitive {
        AggPrimitive::Sum => Value::Float(present.filter_map(Value::as_f64).sum()),
        AggPrimitive::Mean => {
            let nums: Vec<f64> = present.filter_map(Value::as_f64).collect();
            if nums.is_empty() {
                Value::Null
            } else {
                Value::Float(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }
        AggPrimitive::Mode => {
            let mut counts: IndexMap<String, (usize, &Value)> = IndexMap::new();
            for value in present {
                if let Some(key) = value.key() {
                    counts.entry(key).or_insert((0, value)).0 += 1;
                }
            }
            // Ties go to the value seen first
            let mut best: Option<(usize, &Value)> = None;
            for (count, value) in counts.values() {
                if best.is_none_or(|(c, _)| *count > c) {
                    best = Some((*count, *value));
                }
            }
            best.map_or(Value::Null, |(_, v)| v.clone())
        }
        AggPrimitive::NumUnique => {
            let mut seen: Vec<String> = present.filter_map(Value::key).collect();
            seen.sort();
            seen.dedup();
            Value::Int(seen.len() as i64)
        }
        AggPrimitive::Count => unreachable!("count handled above"),
    }
}

fn apply_transform(primitive: TransPrimitive, value: &Value) -> Value {
    match primitive {
        TransPrimitive::Day => value
            .as_datetime()
            .map_or(Value::Null, |dt| Value::Int(dt.day() as i64)),
        TransPrimitive::Week => value
            .as_datetime()
            .map_or(Value::Null, |dt| Value::Int(dt.iso_week().week() as i64)),
        TransPrimitive::Month => value
            .as_datetime()
            .map_or(Value::Null, |dt| Value::Int(dt.month() as i64)),
        TransPrimitive::Year => value
            .as_datetime()
            .map_or(Value::Null, |dt| Value::Int(dt.year() as i64)),
        TransPrimitive::NumWords => value
            .as_text()
            .map_or(Value::Null, |s| Value::Int(s.split_whitespace().count() as i64)),
        TransPrimitive::NumCharacters => value
            .as_text()
            .map_or(Value::Null, |s| Value::Int(s.chars().count() as i64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[Value]) -> Vec<Value> {
        raw.to_vec()
    }

    #[test]
    fn test_aggregate_empty_groups() {
        let base = values(&[Value::Int(1)]);
        assert_eq!(aggregate(AggPrimitive::Count, &[], None), Value::Int(0));
        assert_eq!(aggregate(AggPrimitive::Sum, &[], Some(&base)), Value::Float(0.0));
        assert_eq!(aggregate(AggPrimitive::Mean, &[], Some(&base)), Value::Null);
        assert_eq!(aggregate(AggPrimitive::Mode, &[], Some(&base)), Value::Null);
        assert_eq!(aggregate(AggPrimitive::NumUnique, &[], Some(&base)), Value::Int(0));
    }

    #[test]
    fn test_aggregate_skips_missing() {
        let base = values(&[Value::Int(2), Value::Null, Value::Float(4.0)]);
        assert_eq!(aggregate(AggPrimitive::Mean, &[0, 1, 2], Some(&base)), Value::Float(3.0));
        assert_eq!(aggregate(AggPrimitive::Sum, &[0, 1, 2], Some(&base)), Value::Float(6.0));
        assert_eq!(aggregate(AggPrimitive::Count, &[0, 1, 2], Some(&base)), Value::Int(3));
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let base = values(&[
            Value::from("b"),
            Value::from("a"),
            Value::from("a"),
            Value::from("b"),
        ]);
        assert_eq!(aggregate(AggPrimitive::Mode, &[0, 1, 2, 3], Some(&base)), Value::from("b"));
        assert_eq!(aggregate(AggPrimitive::NumUnique, &[0, 1, 2, 3], Some(&base)), Value::Int(2));
    }

    #[test]
    fn test_transforms() {
        let dt = Value::parse("2024-03-15 10:30:00", crate::schema::VariableType::Datetime);
        assert_eq!(apply_transform(TransPrimitive::Day, &dt), Value::Int(15));
        assert_eq!(apply_transform(TransPrimitive::Month, &dt), Value::Int(3));
        assert_eq!(apply_transform(TransPrimitive::Year, &dt), Value::Int(2024));
        assert_eq!(apply_transform(TransPrimitive::Week, &dt), Value::Int(11));
        assert_eq!(apply_transform(TransPrimitive::Year, &Value::Null), Value::Null);

        let text = Value::from("two words");
        assert_eq!(apply_transform(TransPrimitive::NumWords, &text), Value::Int(2));
        assert_eq!(apply_transform(TransPrimitive::NumCharacters, &text), Value::Int(9));
    }
}
