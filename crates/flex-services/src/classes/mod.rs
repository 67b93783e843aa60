//! Class application services
//!
//! `ApplicationCoordinator` is the only writer of the two membership sets
//! (`Class.userApplied` and `User.classApplied`). Every operation that touches
//! both directories runs as a short saga of idempotent steps, class side first,
//! so a failure between the steps leaves at most a class-side link that a
//! retry or [`ApplicationCoordinator::reconcile`] completes.

mod apply;
mod listings;
mod repair;

use std::sync::Arc;

use flex_core::error::{FlexError, FlexResult};
use flex_core::traits::Id;
use flex_core::types::normalize_weekday;
use flex_db::{ClassDirectory, UserDirectory};
use flex_models::Class;

pub use repair::RepairReport;

/// Coordinates every operation that spans the user and class directories
#[derive(Clone)]
pub struct ApplicationCoordinator {
    users: Arc<dyn UserDirectory>,
    classes: Arc<dyn ClassDirectory>,
}

impl ApplicationCoordinator {
    pub fn new(users: Arc<dyn UserDirectory>, classes: Arc<dyn ClassDirectory>) -> Self {
        Self { users, classes }
    }

    /// Re-read a class after a mutation
    async fn current(&self, class_id: Id) -> FlexResult<Class> {
        self.classes
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| FlexError::not_found("Class", class_id))
    }
}

/// Optional narrowing for `list_available`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub class_type: Option<String>,
    /// Lowercase weekday names; a class matches if it falls on any of them
    pub days: Vec<String>,
}

impl ListingFilters {
    /// Build filters from raw query values, e.g. `type=hatha&days=Monday,friday`
    pub fn parse(class_type: Option<&str>, days: Option<&str>) -> FlexResult<Self> {
        let class_type = class_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let mut parsed = Vec::new();
        for raw in days.unwrap_or_default().split(',').filter(|d| !d.trim().is_empty()) {
            let day = normalize_weekday(raw)
                .ok_or_else(|| FlexError::invalid("days", format!("{} is not a day of the week", raw.trim())))?;
            if !parsed.iter().any(|d| d == day) {
                parsed.push(day.to_string());
            }
        }

        Ok(Self {
            class_type,
            days: parsed,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_normalize_days() {
        let filters = ListingFilters::parse(Some("hatha"), Some("Monday, friday,monday")).unwrap();
        assert_eq!(filters.class_type.as_deref(), Some("hatha"));
        assert_eq!(filters.days, vec!["monday", "friday"]);
    }

    #[test]
    fn test_filters_empty_values() {
        let filters = ListingFilters::parse(Some(" "), Some("")).unwrap();
        assert_eq!(filters, ListingFilters::default());
        assert_eq!(ListingFilters::parse(None, None).unwrap(), ListingFilters::default());
    }

    #[test]
    fn test_filters_reject_unknown_day() {
        let err = ListingFilters::parse(None, Some("monday,someday")).unwrap_err();
        assert_eq!(err.status_code(), 422);
    }
}
