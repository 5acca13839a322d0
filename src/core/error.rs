use std::fmt;
use thiserror::Error;

use crate::models::report::Category;

/// Which extracted record a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Profile,
    Requirement,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Profile => f.write_str("profile"),
            RecordKind::Requirement => f.write_str("requirement"),
        }
    }
}

/// Errors produced by the matching engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("malformed {record}: field `{field}` {detail}")]
    MalformedInput {
        record: RecordKind,
        field: String,
        detail: String,
    },

    #[error("incomplete score: no result for the {0} category")]
    IncompleteScore(Category),
}
