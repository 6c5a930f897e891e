//! Search predicates: a mapping from attribute name to a constraint.
//!
//! A [`Constraint`] is decided when the predicate is built, either through the
//! typed builder or from a JSON document, so translation never has to look at
//! the shape of a value again.
//!
//! JSON forms accepted per attribute:
//! * a string or number: equality
//! * `[lo, hi]`: inclusive range
//! * `{"min": lo, "max": hi}`: inclusive range, a missing or null bound is open
//! * `{"$eq": v}`: equality
//! * `{"$gt" | "$gte": lo, "$lt" | "$lte": hi}`: range with exclusive/inclusive bounds

use std::ops::{Bound, RangeBounds};

use crate::datatype::{DataType, Value};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equality(Value),
    Range { lower: Bound<Value>, upper: Bound<Value> },
}

impl Constraint {
    pub fn is_equality(&self) -> bool {
        matches!(self, Constraint::Equality(_))
    }
    pub fn is_range(&self) -> bool {
        matches!(self, Constraint::Range { .. })
    }
}

/// Attribute order is kept; it is the order constraints are translated in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    entries: Vec<(String, Constraint)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }
    /// Sets the constraint for an attribute, replacing an earlier one in place.
    pub fn insert(&mut self, attribute: impl Into<String>, constraint: Constraint) {
        let attribute = attribute.into();
        match self.entries.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, existing)) => *existing = constraint,
            None => self.entries.push((attribute, constraint)),
        }
    }
    pub fn equals<V: DataType>(mut self, attribute: impl Into<String>, value: V) -> Self {
        self.insert(attribute, Constraint::Equality(value.into_value()));
        self
    }
    /// Adds a range constraint; `18..=65`, `18..` and `..65` all work.
    pub fn range<V, R>(mut self, attribute: impl Into<String>, range: R) -> Self
    where
        V: DataType + Clone,
        R: RangeBounds<V>,
    {
        let lower = to_value_bound(range.start_bound());
        let upper = to_value_bound(range.end_bound());
        self.insert(attribute, Constraint::Range { lower, upper });
        self
    }
    pub fn get(&self, attribute: &str) -> Option<&Constraint> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, constraint)| constraint)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.entries.iter().map(|(name, constraint)| (name.as_str(), constraint))
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn equality_count(&self) -> usize {
        self.entries.iter().filter(|(_, c)| c.is_equality()).count()
    }
    pub fn range_count(&self) -> usize {
        self.entries.iter().filter(|(_, c)| c.is_range()).count()
    }

    /// Builds a predicate from a JSON document. `null` is rejected before
    /// anything else happens.
    pub fn from_json(json: &serde_json::Value) -> Result<Predicate> {
        let map = match json {
            serde_json::Value::Null => {
                return Err(ClientError::Value("search criteria cannot be null".into()));
            }
            serde_json::Value::Object(map) => map,
            other => {
                return Err(ClientError::Value(format!(
                    "search criteria must be an object, got {}",
                    other
                )));
            }
        };
        let mut predicate = Predicate::new();
        for (attribute, value) in map {
            let constraint = constraint_from_json(attribute, value)?;
            predicate.insert(attribute.as_str(), constraint);
        }
        Ok(predicate)
    }
}

fn to_value_bound<V: DataType + Clone>(bound: Bound<&V>) -> Bound<Value> {
    match bound {
        Bound::Included(v) => Bound::Included(v.clone().into_value()),
        Bound::Excluded(v) => Bound::Excluded(v.clone().into_value()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn constraint_from_json(attribute: &str, json: &serde_json::Value) -> Result<Constraint> {
    use serde_json::Value as Json;
    match json {
        Json::String(_) | Json::Number(_) => Ok(Constraint::Equality(Value::from_json(json)?)),
        Json::Array(items) => match items.as_slice() {
            [lo, hi] => Ok(Constraint::Range {
                lower: Bound::Included(Value::from_json(lo)?),
                upper: Bound::Included(Value::from_json(hi)?),
            }),
            _ => Err(ClientError::Type(format!(
                "range for '{}' must be [lower, upper], got {} elements",
                attribute,
                items.len()
            ))),
        },
        Json::Object(ops) if ops.is_empty() => Err(ClientError::Type(format!(
            "constraint for '{}' is an empty object",
            attribute
        ))),
        Json::Object(ops) => {
            let mut equal = None;
            let mut lower = Bound::Unbounded;
            let mut upper = Bound::Unbounded;
            let mut seen_lower = false;
            let mut seen_upper = false;
            for (op, value) in ops {
                let (slot, seen) = match op.as_str() {
                    "$eq" => {
                        equal = Some(Value::from_json(value)?);
                        continue;
                    }
                    "min" | "$gte" | "$gt" => (&mut lower, &mut seen_lower),
                    "max" | "$lte" | "$lt" => (&mut upper, &mut seen_upper),
                    _ => {
                        return Err(ClientError::Value(format!(
                            "unknown operator '{}' for '{}'",
                            op, attribute
                        )));
                    }
                };
                if *seen {
                    return Err(ClientError::Value(format!(
                        "conflicting bounds for '{}' at '{}'",
                        attribute, op
                    )));
                }
                *seen = true;
                // min/max may be given as null to leave that side open
                if value.is_null() && (op == "min" || op == "max") {
                    continue;
                }
                let value = Value::from_json(value)?;
                *slot = match op.as_str() {
                    "$gt" | "$lt" => Bound::Excluded(value),
                    _ => Bound::Included(value),
                };
            }
            if equal.is_none() && matches!((&lower, &upper), (Bound::Unbounded, Bound::Unbounded)) {
                return Err(ClientError::Value(format!(
                    "range for '{}' is open on both sides",
                    attribute
                )));
            }
            match equal {
                Some(value) if matches!((&lower, &upper), (Bound::Unbounded, Bound::Unbounded)) => {
                    if ops.len() > 1 {
                        return Err(ClientError::Type(format!(
                            "'$eq' cannot be combined with other operators for '{}'",
                            attribute
                        )));
                    }
                    Ok(Constraint::Equality(value))
                }
                Some(_) => Err(ClientError::Type(format!(
                    "'$eq' cannot be combined with range operators for '{}'",
                    attribute
                ))),
                None => Ok(Constraint::Range { lower, upper }),
            }
        }
        other => Err(ClientError::Type(format!(
            "unsupported constraint for '{}': {}",
            attribute, other
        ))),
    }
}
