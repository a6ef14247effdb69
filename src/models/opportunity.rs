use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    errors::Result,
    utils::{
        get_record_id::serialize_record_key,
        time::{iso_timestamp, parse_deadline},
        validator::validate_deadline,
    },
};

/// The nine organizer-editable fields. Used both as request body and as
/// store content, so create and update write exactly the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpportunityFields {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[validate(range(min = 0))]
    pub volunteers_needed: i64,
    #[validate(custom(function = "validate_deadline"))]
    pub deadline: String, // ! stored as UTC millis, compared lexically
    #[serde(rename = "thumbnail_URL", default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub organizer_name: String,
    #[validate(email)]
    pub organizer_email: String, // ! owner key
}

impl OpportunityFields {
    /// Rewrites the deadline as a UTC `...000Z` timestamp, the form `time_now`
    /// produces, so text order in the store is time order.
    pub fn with_utc_deadline(mut self) -> Result<Self> {
        let Some(at) = parse_deadline(&self.deadline) else {
            let mut errors = ValidationErrors::new();
            errors.add("deadline", ValidationError::new("deadline_not_iso8601"));
            return Err(errors.into());
        };
        self.deadline = iso_timestamp(at);
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename(serialize = "_id"), serialize_with = "serialize_record_key")]
    pub id: RecordId,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub volunteers_needed: i64,
    pub deadline: String,
    #[serde(rename = "thumbnail_URL", default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub organizer_name: String,
    pub organizer_email: String,
}
