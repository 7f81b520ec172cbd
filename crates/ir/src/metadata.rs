// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Column metadata
//!
//! Data types as reported by a database for the columns of a result set,
//! unified across dialects.

use serde::{Deserialize, Serialize};

/// SQL data types (unified across dialects)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DataType {
    // Numeric types
    Integer,
    BigInt,
    SmallInt,
    TinyInt,
    Decimal,
    Float,
    Double,

    // String types
    Varchar(Option<usize>),
    Char(Option<usize>),
    Text,

    // Binary types
    Binary,
    VarBinary(Option<usize>),
    Blob,

    // Date/Time types
    Date,
    Time,
    DateTime,
    Timestamp,

    // Boolean
    Boolean,

    // JSON
    Json,

    // Special types
    Uuid,

    // Unknown/Other (with original type name)
    Other(String),
}

impl DataType {
    /// Integer family (candidates for discrete inspection)
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Integer | DataType::BigInt | DataType::SmallInt | DataType::TinyInt
        )
    }

    /// Floating point and fixed point numbers
    pub fn is_fractional(&self) -> bool {
        matches!(self, DataType::Decimal | DataType::Float | DataType::Double)
    }

    /// Character types (candidates for discrete inspection)
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            DataType::Varchar(_) | DataType::Char(_) | DataType::Text
        )
    }

    /// Whether values of this type carry a date part
    pub fn has_date(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::DateTime | DataType::Timestamp
        )
    }

    /// Whether values of this type carry a time-of-day part
    pub fn has_time(&self) -> bool {
        matches!(
            self,
            DataType::Time | DataType::DateTime | DataType::Timestamp
        )
    }
}

/// Metadata for a column of a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_families() {
        assert!(DataType::BigInt.is_integer());
        assert!(!DataType::Double.is_integer());
        assert!(DataType::Decimal.is_fractional());
        assert!(DataType::Varchar(Some(10)).is_textual());
        assert!(!DataType::Json.is_textual());
    }

    #[test]
    fn test_temporal_parts() {
        assert!(DataType::Date.has_date());
        assert!(!DataType::Date.has_time());
        assert!(DataType::Timestamp.has_date() && DataType::Timestamp.has_time());
        assert!(!DataType::Time.has_date());
    }
}
