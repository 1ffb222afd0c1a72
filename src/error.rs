use thiserror::Error;

use crate::criteria::ast::FilterOperator;

/// Data errors raised while parsing rules or evaluating criteria. These are
/// never recovered internally; a single bad operator or operand aborts the
/// whole call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("{operator} operator requires a two-element [low, high] value")]
    InvalidOperand { operator: FilterOperator },

    #[error("unknown order direction: {0}")]
    UnknownDirection(String),
}
