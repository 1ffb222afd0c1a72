use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::CriteriaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Like,
    NotLike,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    IsNull,
    IsNotNull,
    Between,
    NotBetween,
    // Declared vocabulary without evaluation support; the evaluator rejects
    // filters carrying these.
    In,
    NotIn,
}

impl FilterOperator {
    pub fn token(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "EQUAL",
            FilterOperator::NotEqual => "NOT_EQUAL",
            FilterOperator::Greater => "GREATER",
            FilterOperator::GreaterEqual => "GREATER_EQUAL",
            FilterOperator::Less => "LESS",
            FilterOperator::LessEqual => "LESS_EQUAL",
            FilterOperator::Like => "LIKE",
            FilterOperator::NotLike => "NOT_LIKE",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::NotContains => "NOT_CONTAINS",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::NotStartsWith => "NOT_STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
            FilterOperator::NotEndsWith => "NOT_ENDS_WITH",
            FilterOperator::IsNull => "IS_NULL",
            FilterOperator::IsNotNull => "IS_NOT_NULL",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::NotBetween => "NOT_BETWEEN",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FilterOperator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s {
            "EQUAL" => FilterOperator::Equal,
            "NOT_EQUAL" => FilterOperator::NotEqual,
            "GREATER" => FilterOperator::Greater,
            "GREATER_EQUAL" => FilterOperator::GreaterEqual,
            "LESS" => FilterOperator::Less,
            "LESS_EQUAL" => FilterOperator::LessEqual,
            "LIKE" => FilterOperator::Like,
            "NOT_LIKE" => FilterOperator::NotLike,
            "CONTAINS" => FilterOperator::Contains,
            "NOT_CONTAINS" => FilterOperator::NotContains,
            "STARTS_WITH" => FilterOperator::StartsWith,
            "NOT_STARTS_WITH" => FilterOperator::NotStartsWith,
            "ENDS_WITH" => FilterOperator::EndsWith,
            "NOT_ENDS_WITH" => FilterOperator::NotEndsWith,
            "IS_NULL" => FilterOperator::IsNull,
            "IS_NOT_NULL" => FilterOperator::IsNotNull,
            "BETWEEN" => FilterOperator::Between,
            "NOT_BETWEEN" => FilterOperator::NotBetween,
            "IN" => FilterOperator::In,
            "NOT_IN" => FilterOperator::NotIn,
            _ => return Err(CriteriaError::UnsupportedOperator(s.to_string())),
        };
        Ok(operator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => Err(CriteriaError::UnknownDirection(s.to_string())),
        }
    }
}

/// A comparison value carried by a filter. Deserializes untagged, so rule
/// files write plain scalars and lists; an omitted value reads as `Null`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<FilterValue>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => write!(f, "null"),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::String(s) => write!(f, "{}", s),
            FilterValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// A single filter condition: field, operator, comparison value, and an
/// optional message reported when the filter fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
    pub message: Option<String>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// A sort condition. The criteria core only aggregates orders; applying them
/// to a result set is the caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub direction: OrderDirection,
}

impl Order {
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// A criteria tree: a leaf of filters and orders, or a boolean composition of
/// two (or one) child criteria. Composition never mutates operands; trees are
/// cloned for reuse and evaluated without locking.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Leaf {
        filters: Vec<Filter>,
        orders: Vec<Order>,
    },
    And {
        left: Box<Criteria>,
        right: Box<Criteria>,
    },
    Or {
        left: Box<Criteria>,
        right: Box<Criteria>,
    },
    Not {
        inner: Box<Criteria>,
    },
}

impl Criteria {
    pub fn new(filters: Vec<Filter>, orders: Vec<Order>) -> Self {
        Criteria::Leaf { filters, orders }
    }

    pub fn and(self, other: Criteria) -> Criteria {
        Criteria::And {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn or(self, other: Criteria) -> Criteria {
        Criteria::Or {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Criteria {
        Criteria::Not {
            inner: Box::new(self),
        }
    }

    /// All filters in the tree, left to right, depth first. No deduplication.
    pub fn filters(&self) -> Vec<&Filter> {
        match self {
            Criteria::Leaf { filters, .. } => filters.iter().collect(),
            Criteria::And { left, right } | Criteria::Or { left, right } => {
                let mut all = left.filters();
                all.extend(right.filters());
                all
            }
            Criteria::Not { inner } => inner.filters(),
        }
    }

    /// All orders in the tree, left to right, depth first.
    pub fn orders(&self) -> Vec<&Order> {
        match self {
            Criteria::Leaf { orders, .. } => orders.iter().collect(),
            Criteria::And { left, right } | Criteria::Or { left, right } => {
                let mut all = left.orders();
                all.extend(right.orders());
                all
            }
            Criteria::Not { inner } => inner.orders(),
        }
    }

    pub fn has_filters(&self) -> bool {
        match self {
            Criteria::Leaf { filters, .. } => !filters.is_empty(),
            Criteria::And { left, right } | Criteria::Or { left, right } => {
                left.has_filters() || right.has_filters()
            }
            Criteria::Not { inner } => inner.has_filters(),
        }
    }

    pub fn has_orders(&self) -> bool {
        match self {
            Criteria::Leaf { orders, .. } => !orders.is_empty(),
            Criteria::And { left, right } | Criteria::Or { left, right } => {
                left.has_orders() || right.has_orders()
            }
            Criteria::Not { inner } => inner.has_orders(),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Leaf { filters, orders } => {
                let filters: Vec<String> = filters.iter().map(|x| x.to_string()).collect();
                let orders: Vec<String> = orders.iter().map(|x| x.to_string()).collect();
                write!(
                    f,
                    "Leaf(filters=[{}], orders=[{}])",
                    filters.join(", "),
                    orders.join(", ")
                )
            }
            Criteria::And { left, right } => write!(f, "And(left={}, right={})", left, right),
            Criteria::Or { left, right } => write!(f, "Or(left={}, right={})", left, right),
            Criteria::Not { inner } => write!(f, "Not(criteria={})", inner),
        }
    }
}
