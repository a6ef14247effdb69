use surrealdb::{Surreal, engine::any::Any};

use crate::{
    middleware::Caller,
    models::opportunity::{Opportunity, OpportunityFields},
    state::AppState,
};

pub async fn store() -> Surreal<Any> {
    AppState::for_tests().await.sdb
}

pub fn caller(email: &str) -> Caller {
    Caller {
        email: email.to_string(),
    }
}

pub fn fields(title: &str, organizer_email: &str, volunteers_needed: i64, deadline: &str) -> OpportunityFields {
    OpportunityFields {
        title: title.to_string(),
        category: "Community".to_string(),
        description: "Help out for an afternoon".to_string(),
        location: "Dhaka".to_string(),
        volunteers_needed,
        deadline: deadline.to_string(),
        thumbnail_url: "https://img.example/post.png".to_string(),
        organizer_name: "Organizer".to_string(),
        organizer_email: organizer_email.to_string(),
    }
}

pub async fn post(sdb: &Surreal<Any>, organizer_email: &str, volunteers_needed: i64) -> Opportunity {
    crate::services::opportunity::create_opportunity(
        sdb,
        &caller(organizer_email),
        fields("Beach clean-up", organizer_email, volunteers_needed, "2030-01-01T00:00:00.000Z"),
    )
    .await
    .expect("create post")
}
