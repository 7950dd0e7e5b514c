//! Index facts
//!
//! The unit of work handed to a [`BulkLoader`](crate::loader::BulkLoader).
//! Dimension names borrow from the shared [`DimensionTables`] or from
//! `'static` constants, so building facts allocates only the vector.
//!
//! [`DimensionTables`]: crate::dimensions::DimensionTables

/// A single unit of index content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fact<'a> {
    /// Column `column` is a member of row `row` in `dimension`.
    Bit {
        dimension: &'a str,
        column: u64,
        row: u64,
    },
    /// Column `column` has integer `value` in field `dimension`.
    Value {
        dimension: &'a str,
        column: u64,
        value: i64,
    },
}

impl<'a> Fact<'a> {
    pub fn bit(dimension: &'a str, column: u64, row: u64) -> Self {
        Fact::Bit {
            dimension,
            column,
            row,
        }
    }

    pub fn value(dimension: &'a str, column: u64, value: i64) -> Self {
        Fact::Value {
            dimension,
            column,
            value,
        }
    }

    pub fn dimension(&self) -> &'a str {
        match self {
            Fact::Bit { dimension, .. } | Fact::Value { dimension, .. } => dimension,
        }
    }

    pub fn column(&self) -> u64 {
        match self {
            Fact::Bit { column, .. } | Fact::Value { column, .. } => *column,
        }
    }
}
