//! Record validation against an entity definition.
//!
//! Checks mirror what a browser enforces for the rendered inputs: `required`,
//! the input `type`, `min`/`max`, and select membership. Nothing more.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::error::ValidationErrors;
use crate::types::{EntityDef, FieldDef, FieldType, Record};

/// Storage format for date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for time fields.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse an `HH:MM` time.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).ok()
}

/// True when a value counts as "not filled in".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Validate every field of `record` declared by `entity`.
///
/// Keys in the record that the entity does not declare are ignored.
pub fn validate_record(entity: &EntityDef, record: &Record) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for field in &entity.fields {
        if let Err(message) = validate_value(field, record.get(&field.name)) {
            errors.push(field.name.clone(), message);
        }
    }
    errors.into_result()
}

/// Validate a single value against its field definition.
pub fn validate_value(field: &FieldDef, value: Option<&Value>) -> Result<(), String> {
    if is_blank(value) {
        return if field.required {
            Err("is required".into())
        } else {
            Ok(())
        };
    }
    let Some(value) = value else {
        return Ok(());
    };

    match &field.type_ {
        FieldType::Number { min, max, integer } => {
            let n = as_number(value).ok_or_else(|| "must be a number".to_string())?;
            if *integer && !is_whole(value, n) {
                return Err("must be a whole number".into());
            }
            if let Some(min) = min {
                if n < *min {
                    return Err(format!("must be at least {min}"));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Err(format!("must be at most {max}"));
                }
            }
            Ok(())
        }
        FieldType::Date => {
            let s = value.as_str().ok_or("must be a date (YYYY-MM-DD)")?;
            parse_date(s)
                .map(|_| ())
                .ok_or_else(|| "must be a date (YYYY-MM-DD)".into())
        }
        FieldType::Time => {
            let s = value.as_str().ok_or("must be a time (HH:MM)")?;
            parse_time(s)
                .map(|_| ())
                .ok_or_else(|| "must be a time (HH:MM)".into())
        }
        FieldType::Email => {
            let s = value.as_str().ok_or("must be a valid email address")?;
            if looks_like_email(s) {
                Ok(())
            } else {
                Err("must be a valid email address".into())
            }
        }
        FieldType::Select { options } => {
            let s = value.as_str().ok_or("must be one of the listed options")?;
            if options.iter().any(|o| o.value == s) {
                Ok(())
            } else {
                Err(format!("'{s}' is not one of the listed options"))
            }
        }
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Password
        | FieldType::Reference { .. } => {
            if value.is_string() {
                Ok(())
            } else {
                Err("must be text".into())
            }
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Stored integers must be JSON integers so typed readers can decode them.
fn is_whole(value: &Value, n: f64) -> bool {
    match value {
        Value::Number(num) => num.is_i64() || num.is_u64(),
        _ => n.fract() == 0.0,
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectOption;
    use serde_json::json;

    fn appointment() -> EntityDef {
        EntityDef::new("appointment", "appointments")
            .field(FieldDef::new("date", FieldType::Date).required())
            .field(FieldDef::new("time", FieldType::Time).required())
            .field(FieldDef::new(
                "status",
                FieldType::Select {
                    options: vec![
                        SelectOption::new("scheduled", 0),
                        SelectOption::new("completed", 1),
                    ],
                },
            ))
            .field(FieldDef::new(
                "fee",
                FieldType::Number {
                    min: Some(0.0),
                    max: Some(500.0),
                    integer: false,
                },
            ))
            .field(FieldDef::new("contact", FieldType::Email))
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn valid_record_passes() {
        let r = record(json!({
            "date": "2024-03-01",
            "time": "09:30",
            "status": "scheduled",
            "fee": 120,
            "contact": "front@clinic.test",
            "unknown": 1
        }));
        assert!(validate_record(&appointment(), &r).is_ok());
    }

    #[test]
    fn missing_required_fields_reported_in_order() {
        let r = record(json!({"date": "", "status": "scheduled"}));
        let errors = validate_record(&appointment(), &r).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "time"]);
        assert_eq!(errors.for_field("date"), Some("is required"));
    }

    #[test]
    fn optional_blank_fields_pass() {
        let r = record(json!({"date": "2024-03-01", "time": "10:00", "fee": "", "contact": null}));
        assert!(validate_record(&appointment(), &r).is_ok());
    }

    #[test]
    fn type_constraints() {
        let r = record(json!({
            "date": "03/01/2024",
            "time": "9am",
            "status": "lost",
            "fee": "900",
            "contact": "nobody"
        }));
        let errors = validate_record(&appointment(), &r).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.for_field("date"), Some("must be a date (YYYY-MM-DD)"));
        assert_eq!(errors.for_field("time"), Some("must be a time (HH:MM)"));
        assert_eq!(errors.for_field("fee"), Some("must be at most 500"));
        assert!(errors.for_field("status").unwrap().contains("lost"));
        assert_eq!(
            errors.for_field("contact"),
            Some("must be a valid email address")
        );
    }

    #[test]
    fn integer_numbers() {
        let field = FieldDef::new(
            "max_teams",
            FieldType::Number {
                min: Some(2.0),
                max: None,
                integer: true,
            },
        );
        assert!(validate_value(&field, Some(&json!(16))).is_ok());
        assert!(validate_value(&field, Some(&json!("8"))).is_ok());
        assert_eq!(
            validate_value(&field, Some(&json!(2.5))),
            Err("must be a whole number".into())
        );
        assert_eq!(
            validate_value(&field, Some(&json!(4.0))),
            Err("must be a whole number".into())
        );
        assert_eq!(
            validate_value(&field, Some(&json!(1))),
            Err("must be at least 2".into())
        );
        assert_eq!(
            validate_value(&field, Some(&json!("many"))),
            Err("must be a number".into())
        );
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(
            parse_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_date("2023-02-29").is_none());
        assert_eq!(parse_time("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(parse_time("24:00").is_none());
    }
}
