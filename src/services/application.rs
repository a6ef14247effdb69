use surrealdb::{RecordId, Surreal, engine::any::Any};
use tracing::{info, warn};

use crate::{
    consts::{
        db_const::{APPLICATION_TABLE, OPPORTUNITY_TABLE, UNIQUE_APPLICATION_INDEX},
        listing_const::MIN_OPEN_SLOTS,
    },
    errors::{Error, Result},
    middleware::Caller,
    models::{
        application::{Application, ApplicationRequest, NewApplication},
        opportunity::Opportunity,
        permission::{Permission, PermissionChecker},
        results::DeleteResult,
    },
    utils::get_record_id::{get_record_id_from_string, record_key},
};

pub const ALREADY_APPLIED: &str = "You have already applied on this opportunity.";

const SUBMIT_ATTEMPTS: usize = 3;

// Decrement and insert commit together. The decrement is conditional, so a
// post that filled up since the caller looked at it yields 0 and nothing is
// written. A duplicate that slipped past the existence check trips the unique
// index and cancels the whole transaction, decrement included.
const SUBMIT_QUERY: &str = "
BEGIN TRANSACTION;
IF array::len((UPDATE $post SET volunteers_needed -= 1 WHERE volunteers_needed > $min_open)) > 0 {
    CREATE type::table($table) CONTENT $application;
    1
} ELSE {
    0
};
COMMIT TRANSACTION;
";

// The increment only runs when this call actually removed the application.
const WITHDRAW_QUERY: &str = "
BEGIN TRANSACTION;
IF array::len((DELETE $application RETURN BEFORE)) > 0 {
    UPDATE $post SET volunteers_needed += 1;
    1
} ELSE {
    0
};
COMMIT TRANSACTION;
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoOpenSlots,
    OwnPost,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accepted(Application),
    Rejected(Rejection),
}

pub async fn find_application(
    sdb: &Surreal<Any>,
    applicant_email: &str,
    post_id: &str,
) -> Result<Option<Application>> {
    let application = sdb
        .query("SELECT * FROM type::table($table) WHERE applicant_email = $applicant_email AND postId = $post_id LIMIT 1;")
        .bind(("table", APPLICATION_TABLE))
        .bind(("applicant_email", applicant_email.to_string()))
        .bind(("post_id", post_id.to_string()))
        .await?
        .take::<Vec<Application>>(0)?
        .into_iter()
        .next();
    Ok(application)
}

pub async fn submit_application(
    sdb: &Surreal<Any>,
    caller: &Caller,
    request: ApplicationRequest,
) -> Result<SubmitOutcome> {
    caller.check_permission(Permission::ApplicationSubmit, &request.applicant_email)?;

    if request.volunteers_needed <= MIN_OPEN_SLOTS {
        return Ok(SubmitOutcome::Rejected(Rejection::NoOpenSlots));
    }
    if request.organizer_email == request.applicant_email {
        return Ok(SubmitOutcome::Rejected(Rejection::OwnPost));
    }

    let post_id = get_record_id_from_string(OPPORTUNITY_TABLE, &request.post_id);
    let post = sdb
        .select::<Option<Opportunity>>(post_id.clone())
        .await?
        .ok_or(Error::NotFound)?;
    if post.organizer_email == request.applicant_email {
        return Ok(SubmitOutcome::Rejected(Rejection::OwnPost));
    }

    let post_key = record_key(&post_id);
    if find_application(sdb, &request.applicant_email, &post_key)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(ALREADY_APPLIED.to_string()));
    }

    let applicant_email = request.applicant_email.clone();
    let mut application = NewApplication::from_request(request, post.organizer_email);
    application.post_id = post_key.clone();

    let mut attempt = 1;
    let claimed = loop {
        match run_submit(sdb, &post_id, &application).await {
            Ok(claimed) => break claimed,
            Err(SubmitFailure::Duplicate) => {
                warn!(post = %post_key, applicant = %applicant_email, "duplicate application rejected by unique index");
                return Err(Error::Conflict(ALREADY_APPLIED.to_string()));
            }
            Err(SubmitFailure::Retryable(error)) if attempt < SUBMIT_ATTEMPTS => {
                warn!(post = %post_key, attempt, "submit transaction conflicted, retrying: {error}");
                attempt += 1;
            }
            Err(SubmitFailure::Retryable(error) | SubmitFailure::Store(error)) => {
                return Err(error.into());
            }
        }
    };

    if !claimed {
        warn!(post = %post_key, "application rejected, no open slots left");
        return Ok(SubmitOutcome::Rejected(Rejection::NoOpenSlots));
    }

    let application = find_application(sdb, &applicant_email, &post_key)
        .await?
        .ok_or(Error::InternalServerError)?;
    info!(
        application = %record_key(&application.id),
        post = %post_key,
        applicant = %applicant_email,
        "application accepted"
    );
    Ok(SubmitOutcome::Accepted(application))
}

enum SubmitFailure {
    Duplicate,
    Retryable(surrealdb::Error),
    Store(surrealdb::Error),
}

impl From<surrealdb::Error> for SubmitFailure {
    fn from(error: surrealdb::Error) -> Self {
        let message = error.to_string();
        if message.contains(UNIQUE_APPLICATION_INDEX) {
            Self::Duplicate
        } else if message.contains("can be retried") || message.contains("read or write conflict") {
            Self::Retryable(error)
        } else {
            Self::Store(error)
        }
    }
}

/// One run of the submit transaction. `true` when a slot was claimed and the
/// application written.
async fn run_submit(
    sdb: &Surreal<Any>,
    post_id: &RecordId,
    application: &NewApplication,
) -> core::result::Result<bool, SubmitFailure> {
    let mut response = sdb
        .query(SUBMIT_QUERY)
        .bind(("post", post_id.clone()))
        .bind(("min_open", MIN_OPEN_SLOTS))
        .bind(("table", APPLICATION_TABLE))
        .bind(("application", application.clone()))
        .await?;

    // A cancelled transaction reports "not executed" on every statement but
    // the one that failed, so the cause has to be picked out.
    let mut errors: Vec<_> = response.take_errors().into_iter().collect();
    errors.sort_by_key(|(index, _)| *index);
    let mut failures: Vec<SubmitFailure> = errors.into_iter().map(|(_, error)| error.into()).collect();
    if failures.iter().any(|f| matches!(f, SubmitFailure::Duplicate)) {
        return Err(SubmitFailure::Duplicate);
    }
    if let Some(position) = failures.iter().position(|f| matches!(f, SubmitFailure::Retryable(_))) {
        return Err(failures.swap_remove(position));
    }
    if !failures.is_empty() {
        return Err(failures.swap_remove(0));
    }

    let claimed = response.take::<Option<i64>>(0)?.unwrap_or(0);
    Ok(claimed > 0)
}

pub async fn withdraw_application(
    sdb: &Surreal<Any>,
    caller: &Caller,
    id: &str,
) -> Result<DeleteResult> {
    let application_id = get_record_id_from_string(APPLICATION_TABLE, id);
    let application = sdb
        .select::<Option<Application>>(application_id.clone())
        .await?
        .ok_or(Error::NotFound)?;
    caller.check_permission(Permission::ApplicationWithdraw, &application.applicant_email)?;

    let post_id = get_record_id_from_string(OPPORTUNITY_TABLE, &application.post_id);
    let removed = sdb
        .query(WITHDRAW_QUERY)
        .bind(("application", application_id))
        .bind(("post", post_id))
        .await?
        .take::<Option<i64>>(0)?
        .unwrap_or(0);

    if removed > 0 {
        info!(
            application = %record_key(&application.id),
            post = %application.post_id,
            "application withdrawn"
        );
    }

    Ok(DeleteResult {
        acknowledged: true,
        deleted_count: u64::from(removed > 0),
    })
}

pub async fn list_by_applicant(
    sdb: &Surreal<Any>,
    caller: &Caller,
    applicant_email: &str,
) -> Result<Vec<Application>> {
    caller.check_permission(Permission::ApplicationListOwn, applicant_email)?;

    let applications = sdb
        .query("SELECT * FROM type::table($table) WHERE applicant_email = $email ORDER BY id;")
        .bind(("table", APPLICATION_TABLE))
        .bind(("email", applicant_email.to_string()))
        .await?
        .take::<Vec<Application>>(0)?;
    Ok(applications)
}
