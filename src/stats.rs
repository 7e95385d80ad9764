//! Column statistics over aligned records.

use crate::align::AlignedRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub first: f64,
    pub last: f64,
}

impl ColumnStats {
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// The numeric values of `name`, in record order, skipping nulls.
pub fn values(records: &[AlignedRecord], name: &str) -> Vec<f64> {
    records.iter().filter_map(|r| r.number(name)).collect()
}

/// Statistics of `name`, or `None` when no record carries a number for it.
pub fn column(records: &[AlignedRecord], name: &str) -> Option<ColumnStats> {
    let values = values(records, name);
    let (&first, &last) = (values.first()?, values.last()?);

    Some(ColumnStats {
        count: values.len(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        sum: values.iter().sum(),
        first,
        last,
    })
}

/// The record holding the largest value of `name`.
pub fn peak<'a>(records: &'a [AlignedRecord], name: &str) -> Option<(&'a AlignedRecord, f64)> {
    records
        .iter()
        .filter_map(|r| r.number(name).map(|v| (r, v)))
        .fold(None, |best, (r, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((r, v)),
        })
}

// -- Tests -------------------------------------------------------------------
