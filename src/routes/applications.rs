use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    errors::Result,
    middleware::Caller,
    models::{
        application::{Application, ApplicationRequest},
        results::{DeleteResult, InsertResult, MessageResponse},
    },
    services::application::{self, SubmitOutcome},
    state::AppState,
    utils::{get_record_id::record_key, validated_form::ValidatedJson},
};

pub async fn applied(
    State(state): State<AppState>,
    caller: Caller,
    Path(email): Path<String>,
) -> Result<Json<Vec<Application>>> {
    let applications = application::list_by_applicant(&state.sdb, &caller, &email).await?;
    Ok(Json(applications))
}

/// A refused application is not an error: the client gets 200 with a message.
pub async fn submit(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<ApplicationRequest>,
) -> Result<Response> {
    let response = match application::submit_application(&state.sdb, &caller, input).await? {
        SubmitOutcome::Accepted(created) => Json(InsertResult {
            acknowledged: true,
            inserted_id: record_key(&created.id),
        })
        .into_response(),
        SubmitOutcome::Rejected(reason) => {
            tracing::info!(?reason, applicant = %caller.email, "application not allowed");
            Json(MessageResponse {
                message: "Not allowed".to_string(),
            })
            .into_response()
        }
    };
    Ok(response)
}

pub async fn withdraw(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>> {
    Ok(Json(
        application::withdraw_application(&state.sdb, &caller, &id).await?,
    ))
}
