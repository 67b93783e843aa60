//! Listing contract for creating and editing classes

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use flex_core::error::ValidationErrors;
use flex_core::types::normalize_weekday;
use flex_models::ListingFields;
use serde_json::Value;

use crate::base::{
    as_body, check_numbers, check_positive, check_present, check_strings, string_field, Body,
    Contract, ValidationResult,
};

/// Listing fields that must be JSON strings
pub const STRING_FIELDS: [&str; 5] = [
    "type",
    "classDateDay",
    "classDateTime",
    "startDate",
    "description",
];

/// Listing fields that must be strictly positive JSON numbers
pub const NUMBER_FIELDS: [&str; 2] = ["length", "wage"];

/// Contract for the seven owner-editable listing fields
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingContract;

impl ListingContract {
    pub fn new() -> Self {
        Self
    }

    /// Validate the body and extract typed listing fields
    pub fn parse(&self, value: &Value) -> Result<ListingFields, ValidationErrors> {
        let body = as_body(value)?;
        self.validate(body)?;

        let mut errors = ValidationErrors::new();

        let class_date_day = match normalize_weekday(string_field(body, "classDateDay")) {
            Some(day) => day.to_string(),
            None => {
                errors.add("classDateDay", "must be a day of the week");
                String::new()
            }
        };

        let start_date = parse_start_date(string_field(body, "startDate")).unwrap_or_else(|| {
            errors.add("startDate", "must be an RFC 3339 timestamp or YYYY-MM-DD date");
            Utc::now()
        });

        let length = body
            .get("length")
            .and_then(Value::as_f64)
            .filter(|n| n.fract() == 0.0 && *n <= f64::from(i32::MAX))
            .map(|n| n as i32)
            .unwrap_or_else(|| {
                errors.add("length", "must be a whole number of minutes");
                0
            });

        let wage = body.get("wage").and_then(Value::as_f64).unwrap_or_default();

        errors.into_result()?;

        Ok(ListingFields {
            class_type: string_field(body, "type").to_string(),
            length,
            wage,
            class_date_day,
            class_date_time: string_field(body, "classDateTime").to_string(),
            start_date,
            description: string_field(body, "description").to_string(),
        })
    }
}

impl Contract<Body> for ListingContract {
    /// Presence, then type, then range; stops at the first stage that fails.
    fn validate(&self, body: &Body) -> ValidationResult {
        let all: Vec<&str> = STRING_FIELDS.iter().chain(NUMBER_FIELDS.iter()).copied().collect();

        let mut errors = ValidationErrors::new();
        check_present(body, &all, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        check_strings(body, &STRING_FIELDS, &mut errors);
        check_numbers(body, &NUMBER_FIELDS, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        check_positive(body, &NUMBER_FIELDS, &mut errors);
        errors.into_result()
    }
}

fn parse_start_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
