use surrealdb::{Surreal, engine::any::Any};
use tracing::info;

use crate::{
    consts::{db_const::OPPORTUNITY_TABLE, listing_const::UPCOMING_LIMIT},
    errors::{Error, Result},
    middleware::Caller,
    models::{
        opportunity::{Opportunity, OpportunityFields},
        permission::{Permission, PermissionChecker},
        results::{DeleteResult, UpdateResult},
    },
    utils::get_record_id::{get_record_id_from_string, record_key},
};

#[derive(serde::Deserialize)]
struct CountRow {
    total: u64,
}

pub async fn create_opportunity(
    sdb: &Surreal<Any>,
    caller: &Caller,
    fields: OpportunityFields,
) -> Result<Opportunity> {
    caller.check_permission(Permission::OpportunityCreate, &fields.organizer_email)?;
    let fields = fields.with_utc_deadline()?;

    let opportunity = sdb
        .create::<Option<Opportunity>>(OPPORTUNITY_TABLE)
        .content(fields)
        .await?
        .ok_or(Error::InternalServerError)?;

    info!(post = %record_key(&opportunity.id), organizer = %caller.email, "opportunity created");
    Ok(opportunity)
}

pub async fn get_opportunity(sdb: &Surreal<Any>, id: &str) -> Result<Opportunity> {
    sdb.select::<Option<Opportunity>>(get_record_id_from_string(OPPORTUNITY_TABLE, id))
        .await?
        .ok_or(Error::NotFound)
}

/// Replaces the nine editable fields, creating the post under `id` when it does not exist.
pub async fn update_opportunity(
    sdb: &Surreal<Any>,
    caller: &Caller,
    id: &str,
    fields: OpportunityFields,
) -> Result<UpdateResult> {
    caller.check_permission(Permission::OpportunityUpdate, &fields.organizer_email)?;
    let fields = fields.with_utc_deadline()?;

    let post_id = get_record_id_from_string(OPPORTUNITY_TABLE, id);
    let existing = sdb.select::<Option<Opportunity>>(post_id.clone()).await?;
    if let Some(existing) = &existing {
        caller.check_permission(Permission::OpportunityUpdate, &existing.organizer_email)?;
    }

    sdb.upsert::<Option<Opportunity>>(post_id.clone())
        .merge(fields)
        .await?
        .ok_or(Error::InternalServerError)?;

    let upserted_id = existing.is_none().then(|| record_key(&post_id));
    if let Some(key) = &upserted_id {
        info!(post = %key, "opportunity created by update");
    }

    Ok(UpdateResult {
        acknowledged: true,
        matched_count: u64::from(existing.is_some()),
        upserted_id,
    })
}

/// Applications pointing at the post are left in place.
pub async fn delete_opportunity(
    sdb: &Surreal<Any>,
    caller: &Caller,
    id: &str,
) -> Result<DeleteResult> {
    let post_id = get_record_id_from_string(OPPORTUNITY_TABLE, id);
    let post = sdb
        .select::<Option<Opportunity>>(post_id.clone())
        .await?
        .ok_or(Error::NotFound)?;
    caller.check_permission(Permission::OpportunityDelete, &post.organizer_email)?;

    let deleted = sdb.delete::<Option<Opportunity>>(post_id).await?;
    info!(post = %record_key(&post.id), "opportunity deleted");

    Ok(DeleteResult {
        acknowledged: true,
        deleted_count: u64::from(deleted.is_some()),
    })
}

/// Case-insensitive literal substring match on the title, ordered by id.
pub async fn list_opportunities(
    sdb: &Surreal<Any>,
    search: &str,
    start: u64,
    limit: u32,
) -> Result<Vec<Opportunity>> {
    let opportunities = sdb
        .query("SELECT * FROM type::table($table) WHERE string::contains(string::lowercase(title), $search) ORDER BY id LIMIT $limit START $start;")
        .bind(("table", OPPORTUNITY_TABLE))
        .bind(("search", search.to_lowercase()))
        .bind(("limit", limit))
        .bind(("start", start))
        .await?
        .take::<Vec<Opportunity>>(0)?;
    Ok(opportunities)
}

pub async fn count_opportunities(sdb: &Surreal<Any>, search: &str) -> Result<u64> {
    let row = sdb
        .query("SELECT count() AS total FROM type::table($table) WHERE string::contains(string::lowercase(title), $search) GROUP ALL;")
        .bind(("table", OPPORTUNITY_TABLE))
        .bind(("search", search.to_lowercase()))
        .await?
        .take::<Option<CountRow>>(0)?;
    Ok(row.map(|row| row.total).unwrap_or(0))
}

/// Posts whose deadline is strictly after `now`, soonest first.
pub async fn list_upcoming(sdb: &Surreal<Any>, now: &str) -> Result<Vec<Opportunity>> {
    let opportunities = sdb
        .query("SELECT * FROM type::table($table) WHERE deadline > $now ORDER BY deadline ASC LIMIT $limit;")
        .bind(("table", OPPORTUNITY_TABLE))
        .bind(("now", now.to_string()))
        .bind(("limit", UPCOMING_LIMIT))
        .await?
        .take::<Vec<Opportunity>>(0)?;
    Ok(opportunities)
}

pub async fn list_by_organizer(
    sdb: &Surreal<Any>,
    caller: &Caller,
    organizer_email: &str,
) -> Result<Vec<Opportunity>> {
    caller.check_permission(Permission::OpportunityListOwn, organizer_email)?;

    let opportunities = sdb
        .query("SELECT * FROM type::table($table) WHERE organizer_email = $email ORDER BY id;")
        .bind(("table", OPPORTUNITY_TABLE))
        .bind(("email", organizer_email.to_string()))
        .await?
        .take::<Vec<Opportunity>>(0)?;
    Ok(opportunities)
}
