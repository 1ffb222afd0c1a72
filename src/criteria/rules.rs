use indexmap::IndexMap;
use serde::Deserialize;

use crate::criteria::ast::{Criteria, Filter, FilterOperator, FilterValue};
use crate::error::CriteriaError;

/// One declarative rule entry: a short operator mnemonic, a comparison value
/// (absent means null), and an optional failure message.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub operator: String,
    #[serde(default)]
    pub value: FilterValue,
    #[serde(default)]
    pub message: Option<String>,
}

/// Field-keyed rule data. Insertion order is the filter order, which is the
/// order failure messages are reported in.
pub type RuleMap = IndexMap<String, Rule>;

/// Build a flat criteria leaf from rule data, one filter per entry. The first
/// unknown mnemonic aborts the parse.
pub fn parse_rules(rules: &RuleMap) -> Result<Criteria, CriteriaError> {
    let mut filters = Vec::with_capacity(rules.len());
    for (field, rule) in rules {
        let operator = convert_operator(&rule.operator)?;
        let mut filter = Filter::new(field.clone(), operator, rule.value.clone());
        if let Some(message) = &rule.message {
            filter = filter.with_message(message.clone());
        }
        filters.push(filter);
    }
    Ok(Criteria::new(filters, Vec::new()))
}

/// Translate a rule-file mnemonic into the operator vocabulary.
pub fn convert_operator(token: &str) -> Result<FilterOperator, CriteriaError> {
    let operator = match token {
        "eq" => FilterOperator::Equal,
        "ne" => FilterOperator::NotEqual,
        "gt" => FilterOperator::Greater,
        "ge" => FilterOperator::GreaterEqual,
        "lt" => FilterOperator::Less,
        "le" => FilterOperator::LessEqual,
        "like" => FilterOperator::Like,
        "not_like" => FilterOperator::NotLike,
        "contains" => FilterOperator::Contains,
        "not_contains" => FilterOperator::NotContains,
        "starts_with" => FilterOperator::StartsWith,
        "not_starts_with" => FilterOperator::NotStartsWith,
        "ends_with" => FilterOperator::EndsWith,
        "not_ends_with" => FilterOperator::NotEndsWith,
        "is_null" => FilterOperator::IsNull,
        "is_not_null" => FilterOperator::IsNotNull,
        "between" => FilterOperator::Between,
        "not_between" => FilterOperator::NotBetween,
        _ => return Err(CriteriaError::UnknownOperator(token.to_string())),
    };
    Ok(operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::eval::{validate_object, validate_object_with_messages};
    use serde_json::json;

    fn base_rules() -> RuleMap {
        serde_yaml::from_str(
            r#"
name: { operator: eq, value: John, message: Name must be John }
age: { operator: gt, value: 18 }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_rules_builds_filters_in_order() {
        let criteria = parse_rules(&base_rules()).unwrap();
        let filters = criteria.filters();

        assert_eq!(filters.len(), 2);
        assert!(!criteria.has_orders());

        assert_eq!(filters[0].field, "name");
        assert_eq!(filters[0].operator, FilterOperator::Equal);
        assert_eq!(filters[0].value, FilterValue::String("John".to_string()));
        assert_eq!(filters[0].message.as_deref(), Some("Name must be John"));

        assert_eq!(filters[1].field, "age");
        assert_eq!(filters[1].operator, FilterOperator::Greater);
        assert_eq!(filters[1].message, None);
    }

    #[test]
    fn test_rule_map_preserves_document_order() {
        let rules: RuleMap = serde_yaml::from_str(
            r#"
zebra: { operator: eq, value: 1 }
apple: { operator: eq, value: 2 }
mango: { operator: eq, value: 3 }
"#,
        )
        .unwrap();
        let criteria = parse_rules(&rules).unwrap();
        let fields: Vec<&str> = criteria.filters().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_empty_rules_accept_everything() {
        let criteria = parse_rules(&RuleMap::new()).unwrap();
        assert!(!criteria.has_filters());
        assert!(validate_object(&json!({}), &criteria).unwrap());
    }

    #[test]
    fn test_omitted_value_reads_as_null() {
        let rules: RuleMap = serde_yaml::from_str("nickname: { operator: is_null }").unwrap();
        let criteria = parse_rules(&rules).unwrap();
        assert_eq!(criteria.filters()[0].value, FilterValue::Null);
        assert!(validate_object(&json!({}), &criteria).unwrap());
        assert!(!validate_object(&json!({ "nickname": "Jo" }), &criteria).unwrap());
    }

    #[test]
    fn test_unknown_mnemonic_aborts_the_parse() {
        let rules: RuleMap =
            serde_yaml::from_str("name: { operator: equals, value: John }").unwrap();
        let err = parse_rules(&rules).unwrap_err();
        assert_eq!(err, CriteriaError::UnknownOperator("equals".to_string()));
    }

    #[test]
    fn test_convert_operator_mnemonics() {
        let mnemonics = [
            ("eq", FilterOperator::Equal),
            ("ne", FilterOperator::NotEqual),
            ("gt", FilterOperator::Greater),
            ("ge", FilterOperator::GreaterEqual),
            ("lt", FilterOperator::Less),
            ("le", FilterOperator::LessEqual),
            ("like", FilterOperator::Like),
            ("not_like", FilterOperator::NotLike),
            ("contains", FilterOperator::Contains),
            ("not_contains", FilterOperator::NotContains),
            ("starts_with", FilterOperator::StartsWith),
            ("not_starts_with", FilterOperator::NotStartsWith),
            ("ends_with", FilterOperator::EndsWith),
            ("not_ends_with", FilterOperator::NotEndsWith),
            ("is_null", FilterOperator::IsNull),
            ("is_not_null", FilterOperator::IsNotNull),
            ("between", FilterOperator::Between),
            ("not_between", FilterOperator::NotBetween),
        ];
        for (mnemonic, operator) in mnemonics {
            assert_eq!(convert_operator(mnemonic), Ok(operator));
        }

        assert_eq!(convert_operator("eq").unwrap().to_string(), "EQUAL");
        assert_eq!(
            convert_operator("unknown"),
            Err(CriteriaError::UnknownOperator("unknown".to_string()))
        );
        // No mnemonics exist for the declared-but-unsupported operators.
        assert!(convert_operator("in").is_err());
        assert!(convert_operator("not_in").is_err());
    }

    #[test]
    fn test_parsed_rules_validate_records() {
        let criteria = parse_rules(&base_rules()).unwrap();

        assert!(validate_object(&json!({ "name": "John", "age": 20 }), &criteria).unwrap());
        assert!(!validate_object(&json!({ "name": "John", "age": 10 }), &criteria).unwrap());
        assert!(!validate_object(&json!({ "name": "Jane", "age": 20 }), &criteria).unwrap());

        let (ok, messages) =
            validate_object_with_messages(&json!({ "name": "John", "age": 10 }), &criteria)
                .unwrap();
        assert!(!ok);
        assert_eq!(messages, vec!["Field 'age' failed GREATER check".to_string()]);

        let (ok, messages) =
            validate_object_with_messages(&json!({ "name": "Jane", "age": 10 }), &criteria)
                .unwrap();
        assert!(!ok);
        assert_eq!(
            messages,
            vec![
                "Name must be John".to_string(),
                "Field 'age' failed GREATER check".to_string(),
            ]
        );
    }

    #[test]
    fn test_null_check_rules() {
        let rules: RuleMap = serde_yaml::from_str(
            r#"
foo: { operator: is_null }
bar: { operator: is_not_null }
"#,
        )
        .unwrap();
        let criteria = parse_rules(&rules).unwrap();

        assert!(validate_object(&json!({ "foo": null, "bar": 1 }), &criteria).unwrap());
        assert!(!validate_object(&json!({ "foo": 1, "bar": null }), &criteria).unwrap());
    }

    #[test]
    fn test_pattern_rules() {
        let rules: RuleMap = serde_yaml::from_str(
            r#"
foo: { operator: like, value: "J%n" }
bar: { operator: not_like, value: "J%n" }
"#,
        )
        .unwrap();
        let criteria = parse_rules(&rules).unwrap();

        assert!(validate_object(&json!({ "foo": "John", "bar": "Jane" }), &criteria).unwrap());
        assert!(!validate_object(&json!({ "foo": "Jane", "bar": "John" }), &criteria).unwrap());
    }

    #[test]
    fn test_range_rules() {
        let rules: RuleMap = serde_yaml::from_str(
            r#"
foo: { operator: between, value: [1, 5] }
bar: { operator: not_between, value: [1, 5] }
"#,
        )
        .unwrap();
        let criteria = parse_rules(&rules).unwrap();

        assert!(validate_object(&json!({ "foo": 3, "bar": 10 }), &criteria).unwrap());
        assert!(!validate_object(&json!({ "foo": 0, "bar": 3 }), &criteria).unwrap());
    }

    #[test]
    fn test_malformed_range_rule_fails_the_validation_call() {
        let rules: RuleMap = serde_yaml::from_str("foo: { operator: between, value: [1] }").unwrap();
        let criteria = parse_rules(&rules).unwrap();
        assert!(validate_object(&json!({ "foo": 1 }), &criteria).is_err());
    }

    #[test]
    fn test_rules_parse_from_json_too() {
        let rules: RuleMap = serde_json::from_str(
            r#"{ "name": { "operator": "eq", "value": "John" }, "age": { "operator": "ge", "value": 18 } }"#,
        )
        .unwrap();
        let criteria = parse_rules(&rules).unwrap();
        assert!(validate_object(&json!({ "name": "John", "age": 18 }), &criteria).unwrap());
    }
}
