pub mod ast;
pub mod eval;
pub mod rules;

pub use ast::{Criteria, Filter, FilterOperator, FilterValue, Order, OrderDirection};
pub use eval::{evaluate_filter, validate_object, validate_object_with_messages};
pub use rules::{convert_operator, parse_rules, Rule, RuleMap};
