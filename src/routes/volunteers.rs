use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    errors::Result,
    middleware::Caller,
    models::{
        opportunity::{Opportunity, OpportunityFields},
        results::{CountResult, DeleteResult, InsertResult, UpdateResult},
    },
    services::opportunity,
    state::AppState,
    utils::{get_record_id::record_key, time::time_now, validated_form::ValidatedJson},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u32>,
    #[serde(rename = "searchQuery")]
    pub search_query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountQuery {
    #[serde(rename = "searchQuery")]
    pub search_query: Option<String>,
}

pub async fn upcoming(State(state): State<AppState>) -> Result<Json<Vec<Opportunity>>> {
    let opportunities = opportunity::list_upcoming(&state.sdb, &time_now()).await?;
    Ok(Json(opportunities))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Opportunity>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size);
    let start = query.page.unwrap_or(0).saturating_mul(u64::from(limit));
    let search = query.search_query.unwrap_or_default();

    let opportunities = opportunity::list_opportunities(&state.sdb, &search, start, limit).await?;
    Ok(Json(opportunities))
}

pub async fn count(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<CountResult>> {
    let search = query.search_query.unwrap_or_default();
    let total_post = opportunity::count_opportunities(&state.sdb, &search).await?;
    Ok(Json(CountResult { total_post }))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Opportunity>> {
    Ok(Json(opportunity::get_opportunity(&state.sdb, &id).await?))
}

pub async fn mine(
    State(state): State<AppState>,
    caller: Caller,
    Path(email): Path<String>,
) -> Result<Json<Vec<Opportunity>>> {
    let opportunities = opportunity::list_by_organizer(&state.sdb, &caller, &email).await?;
    Ok(Json(opportunities))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<OpportunityFields>,
) -> Result<Json<InsertResult>> {
    let created = opportunity::create_opportunity(&state.sdb, &caller, input).await?;
    Ok(Json(InsertResult {
        acknowledged: true,
        inserted_id: record_key(&created.id),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<OpportunityFields>,
) -> Result<Json<UpdateResult>> {
    Ok(Json(
        opportunity::update_opportunity(&state.sdb, &caller, &id, input).await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>> {
    Ok(Json(
        opportunity::delete_opportunity(&state.sdb, &caller, &id).await?,
    ))
}
