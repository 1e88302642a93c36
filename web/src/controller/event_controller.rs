use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::event::PublishParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use events::{Envelope, UserId};
use service::config::ApiVersion;

use log::*;

/// POST an event to every open stream of a user, on whichever instance
/// those streams live. The caller is assumed to have already authorized the
/// event's content; this endpoint only checks that the caller has a session.
#[utoipa::path(
    post,
    path = "/events/{user_id}",
    params(
        ApiVersion,
        ("user_id" = u64, Path, description = "User ID to deliver the event to")
    ),
    request_body = PublishParams,
    responses(
        (status = 200, description = "Event accepted by the events broker"),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Events broker unreachable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn publish(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(publisher_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(params): Json<PublishParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST {} event for user {user_id} from user {publisher_id}", params.kind);

    let envelope = Envelope::new(user_id, params.kind, params.data);
    app_state.publisher.publish(&envelope).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), "ok")))
}
