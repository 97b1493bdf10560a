use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::fiscal_entity::FiscalEntity;

/// Form data as collected by the host application.
pub type FieldSet = Map<String, Value>;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Missing field '{0}'")]
    Missing(String),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl ToString) -> FieldError {
    FieldError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn pop(fields: &mut FieldSet, field: &str) -> Result<Value, FieldError> {
    fields
        .remove(field)
        .ok_or_else(|| FieldError::Missing(field.to_string()))
}

pub fn pop_string(fields: &mut FieldSet, field: &str) -> Result<String, FieldError> {
    match pop(fields, field)? {
        Value::String(value) => Ok(value),
        other => Err(invalid(field, format!("expected text, got {other}"))),
    }
}

/// Accepts a JSON integer or a string holding one.
pub fn pop_integer<T: FromStr>(fields: &mut FieldSet, field: &str) -> Result<T, FieldError>
where
    T::Err: std::fmt::Display,
{
    let text = match pop(fields, field)? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text,
        other => return Err(invalid(field, format!("expected an integer, got {other}"))),
    };
    text.trim().parse().map_err(|e| invalid(field, e))
}

/// Accepts a JSON number or a string holding a decimal.
pub fn pop_decimal(fields: &mut FieldSet, field: &str) -> Result<Decimal, FieldError> {
    let text = match pop(fields, field)? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text,
        other => return Err(invalid(field, format!("expected a number, got {other}"))),
    };
    Decimal::from_str(text.trim()).map_err(|e| invalid(field, e))
}

/// Builds a fiscal entity out of every remaining field.
pub fn into_fiscal_entity(fields: FieldSet) -> Result<FiscalEntity, FieldError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| invalid("fiscal entity", e))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::test_support::field_set;

    #[test]
    fn test_pop_integer_accepts_numbers_and_text() {
        let mut fields = field_set(json!({ "a": 12, "b": " 7 ", "c": "x", "d": -1 }));

        assert_eq!(pop_integer::<u64>(&mut fields, "a").unwrap(), 12);
        assert_eq!(pop_integer::<usize>(&mut fields, "b").unwrap(), 7);
        assert!(matches!(
            pop_integer::<u64>(&mut fields, "c"),
            Err(FieldError::Invalid { .. })
        ));
        assert!(pop_integer::<u32>(&mut fields, "d").is_err());
        assert!(matches!(
            pop_integer::<u64>(&mut fields, "a"),
            Err(FieldError::Missing(field)) if field == "a"
        ));
    }

    #[test]
    fn test_pop_decimal() {
        let mut fields = field_set(json!({ "rate": 42.5, "xchg": "4.9763", "bad": true }));

        assert_eq!(pop_decimal(&mut fields, "rate").unwrap(), Decimal::new(425, 1));
        assert_eq!(pop_decimal(&mut fields, "xchg").unwrap(), Decimal::new(49763, 4));
        assert!(pop_decimal(&mut fields, "bad").is_err());
    }

    #[test]
    fn test_pop_string_removes_field() {
        let mut fields = field_set(json!({ "flavor": "Rust", "other": 1 }));

        assert_eq!(pop_string(&mut fields, "flavor").unwrap(), "Rust");
        assert!(!fields.contains_key("flavor"));
        assert!(pop_string(&mut fields, "other").is_err());
    }

    #[test]
    fn test_fiscal_entity_rejects_unknown_fields() {
        let fields = field_set(json!({
            "name": "ACME",
            "owner_fullname": "Jo Doe",
            "registration_id": "J1",
            "fiscal_code": "RO1",
            "address": "Street 1",
            "bank_iban_account": "RO00",
            "bank_name": "Bank",
            "hourly_rate": 10,
        }));

        assert!(matches!(
            into_fiscal_entity(fields),
            Err(FieldError::Invalid { .. })
        ));
    }
}
