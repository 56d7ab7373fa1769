// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for relexec
//!
//! Every fallible call in the crate returns [`Result`]. End-of-stream is not
//! an error: operators report it as `Ok(None)`.

use thiserror::Error;

use super::types::DataType;

/// Result type alias for relexec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for operator execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Schema errors
    // =========================================================================
    /// Relation not known to the storage layer
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Relation already registered
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Attribute absent from an operator's input schema
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// No index on the requested attribute
    #[error("no index on '{table}.{column}'")]
    IndexNotFound { table: String, column: String },

    /// Row arity does not match the relation's schema
    #[error("expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    // =========================================================================
    // Value errors
    // =========================================================================
    /// Two values (or a value and a column) of different types were compared
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: DataType, found: DataType },

    /// NaN or infinite REAL where a totally ordered value is required
    #[error("non-finite real value cannot be compared")]
    NonFiniteReal,

    /// Text value longer than the attribute's declared width
    #[error("value for column {column} is too long, max {max}, got {got}")]
    ValueTooLong {
        column: String,
        max: usize,
        got: usize,
    },

    // =========================================================================
    // Tuple errors
    // =========================================================================
    /// Encoded tuple exceeds the configured maximum tuple size
    #[error("tuple of {size} bytes exceeds maximum tuple size {max}")]
    TupleTooLarge { size: usize, max: usize },

    /// Tuple bytes do not decode under the given schema
    #[error("corrupt tuple: {0}")]
    CorruptTuple(String),

    // =========================================================================
    // Operator construction errors
    // =========================================================================
    /// Condition cannot be evaluated against the given schemas
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// Join algorithm does not support the given condition
    #[error("unsupported join condition: {0}")]
    UnsupportedJoinCondition(String),

    /// Aggregate cannot be applied to the given attribute
    #[error("invalid aggregate: {0}")]
    InvalidAggregate(String),

    /// Invalid argument to a constructor
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // Execution errors
    // =========================================================================
    /// `next` was called on an operator that has not been opened
    #[error("{0} used before open")]
    NotOpen(String),

    /// `next` was called again after the operator returned an error
    #[error("{0} aborted by an earlier failure")]
    Aborted(String),

    /// Failure reported by the storage or index layer
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error (spill files, storage adapters)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new ColumnNotFound error
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound(column.into())
    }

    /// Create a new TypeMismatch error
    pub fn type_mismatch(expected: DataType, found: DataType) -> Self {
        Error::TypeMismatch { expected, found }
    }

    /// Create a new ValueTooLong error
    pub fn value_too_long(column: impl Into<String>, max: usize, got: usize) -> Self {
        Error::ValueTooLong {
            column: column.into(),
            max,
            got,
        }
    }

    /// Create a new CorruptTuple error
    pub fn corrupt_tuple(message: impl Into<String>) -> Self {
        Error::CorruptTuple(message.into())
    }

    /// Create a new InvalidCondition error
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Error::InvalidCondition(message.into())
    }

    /// Create a new UnsupportedJoinCondition error
    pub fn unsupported_join_condition(message: impl Into<String>) -> Self {
        Error::UnsupportedJoinCondition(message.into())
    }

    /// Create a new InvalidAggregate error
    pub fn invalid_aggregate(message: impl Into<String>) -> Self {
        Error::InvalidAggregate(message.into())
    }

    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create a new NotOpen error for the named operator
    pub fn not_open(operator: impl Into<String>) -> Self {
        Error::NotOpen(operator.into())
    }

    /// Create a new Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io {
            message: message.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Create a new Aborted error
    pub fn aborted(operator: impl Into<String>) -> Self {
        Error::Aborted(operator.into())
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TableNotFound(_) | Error::ColumnNotFound(_) | Error::IndexNotFound { .. }
        )
    }

    /// Check if this error is a programming error in the operator tree
    /// rather than a runtime failure of the storage layer.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::ColumnNotFound(_)
                | Error::TypeMismatch { .. }
                | Error::NonFiniteReal
                | Error::InvalidCondition(_)
                | Error::UnsupportedJoinCondition(_)
                | Error::InvalidAggregate(_)
                | Error::NotOpen(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::TableNotFound("emp".to_string()).to_string(),
            "table 'emp' not found"
        );
        assert_eq!(
            Error::column_not_found("emp.sal").to_string(),
            "column 'emp.sal' not found"
        );
        assert_eq!(
            Error::type_mismatch(DataType::Integer, DataType::Text).to_string(),
            "type mismatch: expected INTEGER, found TEXT"
        );
        assert_eq!(
            Error::TupleTooLarge { size: 5000, max: 4096 }.to_string(),
            "tuple of 5000 bytes exceeds maximum tuple size 4096"
        );
        assert_eq!(
            Error::not_open("HashJoin").to_string(),
            "HashJoin used before open"
        );
        assert_eq!(
            Error::aborted("Aggregate").to_string(),
            "Aggregate aborted by an earlier failure"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::column_not_found("c").is_not_found());
        assert!(Error::TableNotFound("t".to_string()).is_not_found());
        assert!(!Error::NonFiniteReal.is_not_found());

        assert!(Error::NonFiniteReal.is_contract_violation());
        assert!(Error::unsupported_join_condition("<").is_contract_violation());
        assert!(!Error::storage("disk gone").is_contract_violation());
        assert!(!Error::io("short read").is_contract_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("short read"));
    }
}
