use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::AppState;
use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use std::convert::Infallible;

/// SSE handler that establishes the long-lived connection delivering hub
/// events to one authenticated user.
///
/// Lifecycle: the caller's identity is resolved before this handler runs
/// (the extractor rejects with 401 otherwise), the subscription registers the
/// connection with the hub, and dropping the stream deregisters it again, no
/// matter how the connection ended. Events are written to the wire as they
/// arrive; Axum flushes after each one.
pub(crate) async fn sse_handler(
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Establishing SSE connection for user {user_id}");

    let mut subscription = app_state.hub.subscribe(user_id);

    let stream = stream! {
        // First frame lets the client tell an open-but-idle stream apart
        // from a network stall.
        yield Ok(Event::default().event("connected").data("Connected"));

        while let Some(envelope) = subscription.recv().await {
            yield Ok(Event::default()
                .event(envelope.event.kind)
                .data(envelope.event.data));
        }

        // recv only returns None when the hub itself has shut down; a client
        // disconnect instead drops this stream, and the subscription with it.
        debug!("SSE connection for user {user_id} closing");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
