//! Turns a [`Predicate`] into the two constraint arrays the transport reads:
//! one of equality constraints and one of range constraints.

use std::ops::Bound;
use std::sync::Arc;

use tracing::debug;

use crate::buffer::{BufferAllocator, ConstraintBuffer, ConstraintEntry, ConstraintKind};
use crate::datatype::Value;
use crate::error::{ClientError, Result};
use crate::predicate::{Constraint, Predicate};

#[derive(Debug, Clone, PartialEq)]
pub struct EqualityConstraint {
    attribute: String,
    value: Value,
}

impl EqualityConstraint {
    pub fn new(attribute: impl Into<String>, value: Value) -> Self {
        Self {
            attribute: attribute.into(),
            value,
        }
    }
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl ConstraintEntry for EqualityConstraint {
    const KIND: ConstraintKind = ConstraintKind::Equality;
    fn attribute(&self) -> &str {
        &self.attribute
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeConstraint {
    attribute: String,
    lower: Bound<Value>,
    upper: Bound<Value>,
}

impl RangeConstraint {
    /// Both bounds must carry the same value type when present.
    pub fn new(attribute: impl Into<String>, lower: Bound<Value>, upper: Bound<Value>) -> Result<Self> {
        let attribute = attribute.into();
        if let (Some(lo), Some(hi)) = (bound_value(&lower), bound_value(&upper)) {
            if lo.identifier() != hi.identifier() {
                return Err(ClientError::Type(format!(
                    "range for '{}' mixes {} and {} bounds",
                    attribute,
                    lo.data_type(),
                    hi.data_type()
                )));
            }
        }
        Ok(Self {
            attribute,
            lower,
            upper,
        })
    }
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
    pub fn lower(&self) -> &Bound<Value> {
        &self.lower
    }
    pub fn upper(&self) -> &Bound<Value> {
        &self.upper
    }
}

impl ConstraintEntry for RangeConstraint {
    const KIND: ConstraintKind = ConstraintKind::Range;
    fn attribute(&self) -> &str {
        &self.attribute
    }
}

fn bound_value(bound: &Bound<Value>) -> Option<&Value> {
    match bound {
        Bound::Included(v) | Bound::Excluded(v) => Some(v),
        Bound::Unbounded => None,
    }
}

/// The translated form of a predicate. A kind with no entries has no buffer.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    equalities: Option<ConstraintBuffer<EqualityConstraint>>,
    ranges: Option<ConstraintBuffer<RangeConstraint>>,
}

impl ConstraintSet {
    pub fn equalities(&self) -> &[EqualityConstraint] {
        self.equalities.as_ref().map(|b| b.as_slice()).unwrap_or(&[])
    }
    pub fn ranges(&self) -> &[RangeConstraint] {
        self.ranges.as_ref().map(|b| b.as_slice()).unwrap_or(&[])
    }
    pub fn equality_count(&self) -> usize {
        self.equalities().len()
    }
    pub fn range_count(&self) -> usize {
        self.ranges().len()
    }
    pub fn len(&self) -> usize {
        self.equality_count() + self.range_count()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// The attribute at `index` of equalities followed by ranges.
    pub fn attribute_at(&self, index: usize) -> Option<&str> {
        let equalities = self.equalities();
        if index < equalities.len() {
            return Some(equalities[index].attribute());
        }
        self.ranges()
            .get(index - equalities.len())
            .map(|r| r.attribute())
    }
    pub fn summary(&self) -> ConstraintSummary {
        ConstraintSummary {
            equalities: self.equalities().iter().map(|c| c.attribute().to_owned()).collect(),
            ranges: self.ranges().iter().map(|c| c.attribute().to_owned()).collect(),
        }
    }
}

/// Attribute names a search was issued with, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSummary {
    pub equalities: Vec<String>,
    pub ranges: Vec<String>,
}

pub fn translate(predicate: &Predicate, allocator: &Arc<dyn BufferAllocator>) -> Result<ConstraintSet> {
    let equality_count = predicate.equality_count();
    let range_count = predicate.range_count();

    let mut set = ConstraintSet::default();
    if equality_count > 0 {
        set.equalities = Some(ConstraintBuffer::allocate(allocator, equality_count)?);
    }
    if range_count > 0 {
        set.ranges = Some(ConstraintBuffer::allocate(allocator, range_count)?);
    }

    for (attribute, constraint) in predicate.iter() {
        match (constraint, set.equalities.as_mut(), set.ranges.as_mut()) {
            (Constraint::Equality(value), Some(buffer), _) => {
                buffer.push(EqualityConstraint::new(attribute, value.clone()))?;
            }
            (Constraint::Range { lower, upper }, _, Some(buffer)) => {
                buffer.push(RangeConstraint::new(attribute, lower.clone(), upper.clone())?)?;
            }
            _ => {
                return Err(ClientError::Invariant(format!(
                    "no buffer was allocated for '{}'",
                    attribute
                )));
            }
        }
    }
    debug!(equalities = equality_count, ranges = range_count, "predicate translated");
    Ok(set)
}
