//! Declarative widget option schema: field descriptors, normalization, and
//! validation.
//!
//! Each widget defines a list of [`FieldDescriptor`]s describing its options
//! (name, required flag, default, validator) and runs its user-supplied
//! `[widgets.<name>]` table through [`normalize`] and [`validate`]. Errors
//! are collected per field, never short-circuited, and presented to the user
//! as one aggregated message via [`aggregate_errors`].

use std::collections::HashMap;

use toml::Value;

/// Validator kinds dispatched over a widget option value.
///
/// Kept as a plain enum rather than boxed closures so descriptors stay
/// `'static` data and the set of accepted shapes is visible in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Any TOML string.
    Str,
    /// A TOML boolean.
    Bool,
    /// Any TOML integer.
    Int,
    /// An integer strictly greater than zero.
    PositiveInt,
    /// A TOML float (integers are accepted and widened).
    Float,
    /// A string drawn from a fixed set of accepted values.
    OneOf(&'static [&'static str]),
}

impl Validator {
    /// Check a value against this validator.
    ///
    /// Returns a human-readable message on failure. The message is included
    /// verbatim in the aggregated error text, prefixed with the field name.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::Str => match value {
                Value::String(_) => Ok(()),
                other => Err(format!("expected a string, got {}", type_name(other))),
            },
            Validator::Bool => match value {
                Value::Boolean(_) => Ok(()),
                other => Err(format!("expected a boolean, got {}", type_name(other))),
            },
            Validator::Int => match value {
                Value::Integer(_) => Ok(()),
                other => Err(format!("expected an integer, got {}", type_name(other))),
            },
            Validator::PositiveInt => match value {
                Value::Integer(n) if *n > 0 => Ok(()),
                Value::Integer(n) => Err(format!("expected a positive integer, got {}", n)),
                other => Err(format!("expected a positive integer, got {}", type_name(other))),
            },
            Validator::Float => match value {
                Value::Float(_) | Value::Integer(_) => Ok(()),
                other => Err(format!("expected a number, got {}", type_name(other))),
            },
            Validator::OneOf(accepted) => match value {
                Value::String(s) if accepted.contains(&s.as_str()) => Ok(()),
                Value::String(s) => Err(format!(
                    "invalid value '{}', expected one of: {}",
                    s,
                    accepted.join(", ")
                )),
                other => Err(format!("expected a string, got {}", type_name(other))),
            },
        }
    }
}

/// TOML value type name for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "array",
        Value::Table(_) => "table",
    }
}

/// Schema entry describing one widget option.
///
/// Descriptors are immutable, defined once per widget. A field that is
/// `required` with a default always normalizes to a value; a required field
/// without a default produces a "field missing" error when the user omits it.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Option key, unique within a widget's descriptor list.
    pub name: &'static str,
    /// Whether the field must be present after normalization.
    pub required: bool,
    /// Value used when the user does not set the field.
    pub default: Option<Value>,
    /// Validator applied when a value is present.
    pub validator: Validator,
}

impl FieldDescriptor {
    /// New optional field with no default.
    pub fn new(name: &'static str, validator: Validator) -> Self {
        Self {
            name,
            required: false,
            default: None,
            validator,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Merge a user-supplied option table with descriptor defaults.
///
/// For each descriptor the user value wins when present; otherwise the
/// default is used. Optional fields without defaults are omitted entirely.
/// Keys the user set that no descriptor names are not carried over (the
/// consumer warns about those separately).
pub fn normalize(
    user: &HashMap<String, Value>,
    descriptors: &[FieldDescriptor],
) -> HashMap<String, Value> {
    let mut table = HashMap::new();

    for desc in descriptors {
        if let Some(value) = user.get(desc.name) {
            table.insert(desc.name.to_string(), value.clone());
        } else if let Some(ref default) = desc.default {
            table.insert(desc.name.to_string(), default.clone());
        }
    }

    table
}

/// Validate a normalized option table against its descriptors.
///
/// Every field error is collected, in descriptor order:
/// - a required field with no value emits `field missing: <name>`
/// - a present value that fails its validator emits the validator's message
///   prefixed with `field <name>: `
///
/// Returns `None` when the table is clean.
pub fn validate(
    table: &HashMap<String, Value>,
    descriptors: &[FieldDescriptor],
) -> Option<Vec<String>> {
    let mut errors = Vec::new();

    for desc in descriptors {
        match table.get(desc.name) {
            None => {
                if desc.required {
                    errors.push(format!("field missing: {}", desc.name));
                }
            }
            Some(value) => {
                if let Err(message) = desc.validator.check(value) {
                    errors.push(format!("field {}: {}", desc.name, message));
                }
            }
        }
    }

    if errors.is_empty() { None } else { Some(errors) }
}

/// Join collected field errors into a single fatal message.
///
/// The fixed header names the widget; one error per line below it. The
/// consuming widget logs this once and then degrades for its lifetime.
pub fn aggregate_errors(widget: &str, errors: &[String]) -> String {
    format!(
        "invalid configuration for widget '{}':\n{}",
        widget,
        errors.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_field(name: &'static str) -> FieldDescriptor {
        FieldDescriptor::new(name, Validator::Int)
    }

    #[test]
    fn test_normalize_uses_defaults_for_empty_user_table() {
        let descriptors = vec![
            FieldDescriptor::new("x", Validator::Int)
                .required()
                .default_value(5),
            FieldDescriptor::new("label", Validator::Str).default_value("mem"),
        ];

        let user = HashMap::new();
        let table = normalize(&user, &descriptors);

        assert_eq!(table.get("x"), Some(&Value::Integer(5)));
        assert_eq!(table.get("label"), Some(&Value::String("mem".to_string())));
        // Defaults satisfy every required field, so validation is clean.
        assert_eq!(validate(&table, &descriptors), None);
    }

    #[test]
    fn test_normalize_user_value_wins_over_default() {
        let descriptors = vec![int_field("x").default_value(5)];

        let mut user = HashMap::new();
        user.insert("x".to_string(), Value::Integer(9));

        let table = normalize(&user, &descriptors);
        assert_eq!(table.get("x"), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_normalize_omits_unset_optional_without_default() {
        let descriptors = vec![FieldDescriptor::new("command", Validator::Str)];

        let table = normalize(&HashMap::new(), &descriptors);
        assert!(!table.contains_key("command"));
    }

    #[test]
    fn test_normalize_drops_unknown_keys() {
        let descriptors = vec![int_field("x")];

        let mut user = HashMap::new();
        user.insert("x".to_string(), Value::Integer(1));
        user.insert("typo".to_string(), Value::Integer(2));

        let table = normalize(&user, &descriptors);
        assert_eq!(table.len(), 1);
        assert!(!table.contains_key("typo"));
    }

    #[test]
    fn test_validate_missing_required_without_default() {
        let descriptors = vec![FieldDescriptor::new("x", Validator::Int).required()];

        let table = normalize(&HashMap::new(), &descriptors);
        let errors = validate(&table, &descriptors).expect("expected errors");

        assert_eq!(errors, vec!["field missing: x".to_string()]);
    }

    #[test]
    fn test_validate_errors_in_descriptor_order_not_short_circuited() {
        let descriptors = vec![
            FieldDescriptor::new("a", Validator::Int).required(),
            FieldDescriptor::new("b", Validator::Bool),
            FieldDescriptor::new("c", Validator::Str).required(),
        ];

        let mut user = HashMap::new();
        user.insert("b".to_string(), Value::Integer(3));

        let table = normalize(&user, &descriptors);
        let errors = validate(&table, &descriptors).expect("expected errors");

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "field missing: a");
        assert!(errors[1].starts_with("field b: "));
        assert_eq!(errors[2], "field missing: c");
    }

    #[test]
    fn test_validator_message_appears_verbatim_in_aggregate() {
        let descriptors = vec![FieldDescriptor::new("height", Validator::PositiveInt)];

        let mut user = HashMap::new();
        user.insert("height".to_string(), Value::Integer(-4));

        let table = normalize(&user, &descriptors);
        let errors = validate(&table, &descriptors).unwrap();

        let message = Validator::PositiveInt
            .check(&Value::Integer(-4))
            .unwrap_err();
        let aggregated = aggregate_errors("memory", &errors);

        assert!(aggregated.contains(&message));
        assert!(aggregated.starts_with("invalid configuration for widget 'memory':"));
    }

    #[test]
    fn test_validate_clean_table_returns_none() {
        let descriptors = vec![
            FieldDescriptor::new("battery", Validator::Str)
                .required()
                .default_value("BAT0"),
            FieldDescriptor::new("no_icon", Validator::Bool).default_value(false),
        ];

        let table = normalize(&HashMap::new(), &descriptors);
        assert_eq!(validate(&table, &descriptors), None);
    }

    #[test]
    fn test_validator_str() {
        assert!(Validator::Str.check(&Value::String("x".into())).is_ok());
        let err = Validator::Str.check(&Value::Integer(1)).unwrap_err();
        assert_eq!(err, "expected a string, got integer");
    }

    #[test]
    fn test_validator_bool() {
        assert!(Validator::Bool.check(&Value::Boolean(true)).is_ok());
        assert!(Validator::Bool.check(&Value::String("yes".into())).is_err());
    }

    #[test]
    fn test_validator_positive_int() {
        assert!(Validator::PositiveInt.check(&Value::Integer(1)).is_ok());
        assert!(Validator::PositiveInt.check(&Value::Integer(0)).is_err());
        assert!(Validator::PositiveInt.check(&Value::Integer(-1)).is_err());
        assert!(
            Validator::PositiveInt
                .check(&Value::String("5".into()))
                .is_err()
        );
    }

    #[test]
    fn test_validator_float_accepts_integers() {
        assert!(Validator::Float.check(&Value::Float(0.5)).is_ok());
        assert!(Validator::Float.check(&Value::Integer(2)).is_ok());
        assert!(Validator::Float.check(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_validator_one_of() {
        const MODES: &[&str] = &["percentage", "absolute"];
        let v = Validator::OneOf(MODES);

        assert!(v.check(&Value::String("absolute".into())).is_ok());

        let err = v.check(&Value::String("both".into())).unwrap_err();
        assert!(err.contains("'both'"));
        assert!(err.contains("percentage, absolute"));

        assert!(v.check(&Value::Integer(1)).is_err());
    }

    #[test]
    fn test_aggregate_errors_layout() {
        let errors = vec!["field missing: x".to_string(), "field y: bad".to_string()];
        let text = aggregate_errors("battery", &errors);

        assert_eq!(
            text,
            "invalid configuration for widget 'battery':\nfield missing: x\nfield y: bad"
        );
    }
}
