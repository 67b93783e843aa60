//! Class listing model
//!
//! Table: classes

use chrono::{DateTime, Utc};
use flex_core::traits::Id;
use serde::{Deserialize, Serialize};

use crate::user::Applicant;

/// A class listing posted by a studio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Id,

    /// Yoga style, e.g. "hatha"
    #[serde(rename = "type")]
    pub class_type: String,

    /// Length in minutes
    pub length: i32,

    /// Hourly wage
    pub wage: f64,

    /// Lowercase weekday name
    pub class_date_day: String,

    pub class_date_time: String,
    pub start_date: DateTime<Utc>,
    pub description: String,

    /// Owning studio user
    pub posted_by: Id,

    /// Studio display name, copied from the owner at posting time
    pub studio: Option<String>,

    pub date_posted: DateTime<Utc>,

    /// Applicant set, no duplicates
    pub user_applied: Vec<Id>,
}

impl Class {
    pub fn has_applicant(&self, user_id: Id) -> bool {
        self.user_applied.contains(&user_id)
    }

    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.posted_by == user_id
    }

    /// Overwrite the seven editable listing fields
    pub fn apply_fields(&mut self, fields: &ListingFields) {
        self.class_type = fields.class_type.clone();
        self.length = fields.length;
        self.wage = fields.wage;
        self.class_date_day = fields.class_date_day.clone();
        self.class_date_time = fields.class_date_time.clone();
        self.start_date = fields.start_date;
        self.description = fields.description.clone();
    }
}

/// A listing as its owner sees it: the class plus its resolved applicants
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OwnedClass {
    #[serde(flatten)]
    pub class: Class,
    pub applicants: Vec<Applicant>,
}

/// The seven owner-editable listing fields, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub class_type: String,
    pub length: i32,
    pub wage: f64,
    pub class_date_day: String,
    pub class_date_time: String,
    pub start_date: DateTime<Utc>,
    pub description: String,
}

/// Data for inserting a new listing
#[derive(Debug, Clone)]
pub struct NewClass {
    pub fields: ListingFields,
    pub posted_by: Id,
    pub studio: Option<String>,
    pub date_posted: DateTime<Utc>,
}

impl NewClass {
    /// Materialize the listing with the given id and an empty applicant set
    pub fn into_class(self, id: Id) -> Class {
        let fields = self.fields;
        Class {
            id,
            class_type: fields.class_type,
            length: fields.length,
            wage: fields.wage,
            class_date_day: fields.class_date_day,
            class_date_time: fields.class_date_time,
            start_date: fields.start_date,
            description: fields.description,
            posted_by: self.posted_by,
            studio: self.studio,
            date_posted: self.date_posted,
            user_applied: Vec::new(),
        }
    }
}
