pub mod criteria;
pub mod error;
pub mod records;

pub use criteria::ast::{Criteria, Filter, FilterOperator, FilterValue, Order, OrderDirection};
pub use criteria::eval::{
    compare_values, evaluate_filter, validate_object, validate_object_with_messages,
};
pub use criteria::rules::{convert_operator, parse_rules, Rule, RuleMap};
pub use error::CriteriaError;
