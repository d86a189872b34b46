//! Business rules for product records.
//!
//! Both entry points build a complete candidate record, then run every rule
//! over it and report all violations together, keyed by the camelCase field
//! name. Cross-field rules only run when the counts involved are valid
//! themselves.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::models::Product;

/// Candidate product fields as submitted by a client.
///
/// Every field is optional: create requires code, size and manufacturer,
/// update overlays whatever is present onto the stored record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub size: Option<String>,
    pub manufacturer: Option<String>,
    #[schema(value_type = Option<i64>)]
    pub stock: Option<CountInput>,
    #[schema(value_type = Option<i64>)]
    pub bad_stock: Option<CountInput>,
    #[schema(value_type = Option<i64>)]
    pub bookings: Option<CountInput>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// A count as received: a JSON number or the text of a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountInput {
    Number(serde_json::Number),
    Text(String),
}

impl CountInput {
    /// The integer value, if the input denotes one. Integral floats such as
    /// `5.0` or `1e2` count as integers.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CountInput::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            CountInput::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

impl From<i64> for CountInput {
    fn from(value: i64) -> Self {
        CountInput::Number(value.into())
    }
}

/// A record that passed every rule, normalized (trimmed, blanks dropped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub code: String,
    pub size: String,
    pub manufacturer: String,
    pub stock: i64,
    pub bad_stock: i64,
    pub bookings: i64,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Validates a record for creation. Missing counts default to 0.
pub fn validate_new(input: ProductInput) -> Result<ProductFields, ValidationErrors> {
    check(Candidate {
        name: optional_text(input.name),
        code: input.code,
        size: input.size,
        manufacturer: input.manufacturer,
        stock: input.stock.unwrap_or(CountInput::from(0)),
        bad_stock: input.bad_stock.unwrap_or(CountInput::from(0)),
        bookings: input.bookings.unwrap_or(CountInput::from(0)),
        image_url: optional_text(input.image_url),
        description: optional_text(input.description),
    })
}

/// Overlays `input` on `existing` and validates the merged record.
///
/// Absent fields keep their stored value. A present but blank optional text
/// field clears it.
pub fn validate_update(
    existing: &Product,
    input: ProductInput,
) -> Result<ProductFields, ValidationErrors> {
    check(Candidate {
        name: merge_optional(input.name, &existing.name),
        code: input.code.or_else(|| Some(existing.code.clone())),
        size: input.size.or_else(|| Some(existing.size.clone())),
        manufacturer: input
            .manufacturer
            .or_else(|| Some(existing.manufacturer.clone())),
        stock: input.stock.unwrap_or(CountInput::from(existing.stock)),
        bad_stock: input.bad_stock.unwrap_or(CountInput::from(existing.bad_stock)),
        bookings: input.bookings.unwrap_or(CountInput::from(existing.bookings)),
        image_url: merge_optional(input.image_url, &existing.image_url),
        description: merge_optional(input.description, &existing.description),
    })
}

struct Candidate {
    name: Option<String>,
    code: Option<String>,
    size: Option<String>,
    manufacturer: Option<String>,
    stock: CountInput,
    bad_stock: CountInput,
    bookings: CountInput,
    image_url: Option<String>,
    description: Option<String>,
}

fn check(candidate: Candidate) -> Result<ProductFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let code = required(&mut errors, "code", candidate.code, "Product code is required");
    let size = required(&mut errors, "size", candidate.size, "Size is required");
    let manufacturer = required(
        &mut errors,
        "manufacturer",
        candidate.manufacturer,
        "Manufacturer is required",
    );

    let stock = count(&mut errors, "stock", "Stock", &candidate.stock);
    let bad_stock = count(&mut errors, "badStock", "Bad stock", &candidate.bad_stock);
    let bookings = count(&mut errors, "bookings", "Bookings", &candidate.bookings);

    if let Some(stock) = stock {
        if bad_stock.is_some_and(|bad_stock| bad_stock > stock) {
            errors.add(
                "badStock",
                violation("bad_stock_exceeds_stock", "Bad stock cannot exceed total stock"),
            );
        }
        if bookings.is_some_and(|bookings| bookings > stock) {
            errors.add(
                "bookings",
                violation("bookings_exceed_stock", "Bookings cannot exceed total stock"),
            );
        }
    }

    match (code, size, manufacturer, stock, bad_stock, bookings) {
        (Some(code), Some(size), Some(manufacturer), Some(stock), Some(bad_stock), Some(bookings))
            if errors.is_empty() =>
        {
            Ok(ProductFields {
                name: candidate.name,
                code,
                size,
                manufacturer,
                stock,
                bad_stock,
                bookings,
                image_url: candidate.image_url,
                description: candidate.description,
            })
        }
        _ => Err(errors),
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
    message: &'static str,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, violation("required", message));
            None
        }
    }
}

fn count(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &CountInput,
) -> Option<i64> {
    match value.as_integer() {
        Some(n) if n >= 0 => Some(n),
        Some(_) => {
            errors.add(
                field,
                ValidationError::new("range")
                    .with_message(Cow::Owned(format!("{} cannot be negative", label))),
            );
            None
        }
        None => {
            errors.add(
                field,
                ValidationError::new("integer")
                    .with_message(Cow::Owned(format!("{} must be an integer", label))),
            );
            None
        }
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn merge_optional(incoming: Option<String>, stored: &Option<String>) -> Option<String> {
    match incoming {
        Some(v) => optional_text(Some(v)),
        None => stored.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;

    fn input() -> ProductInput {
        ProductInput {
            code: Some("WID-1".into()),
            size: Some("M".into()),
            manufacturer: Some("Acme".into()),
            ..Default::default()
        }
    }

    fn messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
        errors
            .field_errors()
            .get(field)
            .map(|errs| {
                errs.iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_validate_new_defaults_counts_and_trims() {
        let fields = validate_new(ProductInput {
            name: Some("  ".into()),
            code: Some("  WID-1 ".into()),
            description: Some(" Blue widget ".into()),
            ..input()
        })
        .unwrap();

        assert_eq!(fields.code, "WID-1");
        assert_eq!(fields.name, None);
        assert_eq!(fields.description.as_deref(), Some("Blue widget"));
        assert_eq!((fields.stock, fields.bad_stock, fields.bookings), (0, 0, 0));
    }

    #[test]
    fn test_validate_new_reports_every_violation() {
        let errors = validate_new(ProductInput {
            code: None,
            size: Some("   ".into()),
            manufacturer: None,
            stock: Some(CountInput::from(-1)),
            bookings: Some(CountInput::Text("lots".into())),
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(messages(&errors, "code"), ["Product code is required"]);
        assert_eq!(messages(&errors, "size"), ["Size is required"]);
        assert_eq!(messages(&errors, "manufacturer"), ["Manufacturer is required"]);
        assert_eq!(messages(&errors, "stock"), ["Stock cannot be negative"]);
        assert_eq!(messages(&errors, "bookings"), ["Bookings must be an integer"]);
        assert!(messages(&errors, "badStock").is_empty());
    }

    #[test]
    fn test_cross_field_rules() {
        let errors = validate_new(ProductInput {
            stock: Some(CountInput::from(5)),
            bad_stock: Some(CountInput::from(6)),
            bookings: Some(CountInput::from(7)),
            ..input()
        })
        .unwrap_err();

        assert_eq!(
            messages(&errors, "badStock"),
            ["Bad stock cannot exceed total stock"]
        );
        assert_eq!(
            messages(&errors, "bookings"),
            ["Bookings cannot exceed total stock"]
        );
    }

    #[test]
    fn test_boundary_counts_are_valid() {
        let fields = validate_new(ProductInput {
            stock: Some(CountInput::from(5)),
            bad_stock: Some(CountInput::from(5)),
            bookings: Some(CountInput::from(5)),
            ..input()
        })
        .unwrap();

        assert_eq!(fields.bad_stock, 5);
    }

    #[test]
    fn test_cross_field_skipped_when_stock_invalid() {
        let errors = validate_new(ProductInput {
            stock: Some(CountInput::from(-3)),
            bad_stock: Some(CountInput::from(1)),
            ..input()
        })
        .unwrap_err();

        assert_eq!(messages(&errors, "stock").len(), 1);
        assert!(messages(&errors, "badStock").is_empty());
    }

    #[test]
    fn test_count_input_parsing() {
        assert_eq!(CountInput::Text(" 12 ".into()).as_integer(), Some(12));
        assert_eq!(CountInput::Text("1.5".into()).as_integer(), None);
        let float: serde_json::Number = serde_json::from_str("2.5").unwrap();
        assert_eq!(CountInput::Number(float).as_integer(), None);

        let parsed: ProductInput =
            serde_json::from_str(r#"{"stock": 4, "badStock": "2"}"#).unwrap();
        assert_eq!(parsed.stock.and_then(|c| c.as_integer()), Some(4));
        assert_eq!(parsed.bad_stock.and_then(|c| c.as_integer()), Some(2));
    }

    #[test]
    fn test_integral_floats_are_integers() {
        let parsed: ProductInput =
            serde_json::from_str(r#"{"stock": 5.0, "badStock": 1e2, "bookings": "3.0"}"#)
                .unwrap();
        assert_eq!(parsed.stock.and_then(|c| c.as_integer()), Some(5));
        assert_eq!(parsed.bad_stock.and_then(|c| c.as_integer()), Some(100));
        assert_eq!(parsed.bookings.and_then(|c| c.as_integer()), Some(3));

        assert_eq!(CountInput::Text("NaN".into()).as_integer(), None);
        assert_eq!(CountInput::Text("inf".into()).as_integer(), None);
        let huge: serde_json::Number = serde_json::from_str("1e300").unwrap();
        assert_eq!(CountInput::Number(huge).as_integer(), None);

        let fields = validate_new(ProductInput {
            stock: Some(CountInput::Number(serde_json::from_str("5.0").unwrap())),
            ..input()
        })
        .unwrap();
        assert_eq!(fields.stock, 5);
    }

    #[test]
    fn test_validate_update_bookings_above_merged_stock() {
        let existing = Product::new(
            validate_new(ProductInput {
                stock: Some(CountInput::from(10)),
                bookings: Some(CountInput::from(8)),
                ..input()
            })
            .unwrap(),
            now(),
        );

        let errors = validate_update(
            &existing,
            ProductInput {
                stock: Some(CountInput::from(5)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            messages(&errors, "bookings"),
            ["Bookings cannot exceed total stock"]
        );
        assert!(messages(&errors, "badStock").is_empty());
    }

    #[test]
    fn test_validate_update_merges_before_cross_field_check() {
        let existing = Product::new(
            validate_new(ProductInput {
                stock: Some(CountInput::from(10)),
                bad_stock: Some(CountInput::from(5)),
                ..input()
            })
            .unwrap(),
            now(),
        );

        let errors = validate_update(
            &existing,
            ProductInput {
                stock: Some(CountInput::from(3)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            messages(&errors, "badStock"),
            ["Bad stock cannot exceed total stock"]
        );

        let fields = validate_update(
            &existing,
            ProductInput {
                stock: Some(CountInput::from(6)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!((fields.stock, fields.bad_stock), (6, 5));
        assert_eq!(fields.code, "WID-1");
    }

    #[test]
    fn test_validate_update_blank_required_and_clearing_optional() {
        let existing = Product::new(
            validate_new(ProductInput {
                name: Some("Widget".into()),
                ..input()
            })
            .unwrap(),
            now(),
        );

        let errors = validate_update(
            &existing,
            ProductInput {
                code: Some("  ".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(messages(&errors, "code"), ["Product code is required"]);

        let fields = validate_update(
            &existing,
            ProductInput {
                name: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(fields.name, None);
        assert_eq!(fields.manufacturer, "Acme");
    }
}
