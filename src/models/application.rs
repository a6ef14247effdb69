use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use surrealdb::RecordId;
use validator::Validate;

use crate::utils::get_record_id::record_key;

const RESERVED_KEYS: [&str; 5] = ["_id", "id", "postId", "applicant_email", "organizer_email"];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplicationRequest {
    #[serde(rename = "postId")]
    #[validate(length(min = 1))]
    pub post_id: String,
    #[validate(email)]
    pub applicant_email: String,
    #[validate(email)]
    pub organizer_email: String,
    /// Remaining slots as the applicant saw them.
    pub volunteers_needed: i64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Store content for a new application.
#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    #[serde(rename = "postId")]
    pub post_id: String,
    pub applicant_email: String,
    pub organizer_email: String,
    pub details: Map<String, Value>,
}

impl NewApplication {
    /// `organizer_email` comes from the stored post, not from the request body.
    pub fn from_request(request: ApplicationRequest, organizer_email: String) -> Self {
        let mut details = request.details;
        details.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        details.insert(
            "volunteers_needed".to_string(),
            Value::from(request.volunteers_needed),
        );
        Self {
            post_id: request.post_id,
            applicant_email: request.applicant_email,
            organizer_email,
            details,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: RecordId,
    #[serde(rename = "postId")]
    pub post_id: String,
    pub applicant_email: String,
    pub organizer_email: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

// Details are written back at the top level, the same flat document the client submitted.
impl Serialize for Application {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_id", &record_key(&self.id))?;
        map.serialize_entry("postId", &self.post_id)?;
        map.serialize_entry("applicant_email", &self.applicant_email)?;
        map.serialize_entry("organizer_email", &self.organizer_email)?;
        for (key, value) in &self.details {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
