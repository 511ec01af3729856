//! # WebSocket Updates
//!
//! `GET /ws/applications/{id}` upgrades the connection and streams every
//! [`OfferUpdate`] published for that application as a JSON text frame.
//!
//! The observer is removed when the client disconnects or a write fails.
//! When the notifier shuts down the server sends a close frame.

use crate::api::rest::error::ApiError;
use crate::api::rest::handlers::{AppState, parse_application_id};
use crate::application::services::{ObserverHandle, OfferUpdate, SubscriberNotifier};
use crate::domain::value_objects::ApplicationId;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Upgrades to a WebSocket subscribed to one application's updates.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for a malformed application ID.
pub async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let application_id = parse_application_id(&id)?;
    let notifier = Arc::clone(state.service.notifier());
    Ok(ws.on_upgrade(move |socket| stream_updates(socket, notifier, application_id)))
}

enum Step {
    Continue,
    Stop,
}

async fn stream_updates(
    socket: WebSocket,
    notifier: Arc<SubscriberNotifier>,
    application_id: ApplicationId,
) {
    let mut observer = notifier.subscribe(application_id);
    let subscriber = observer.id();
    debug!(application_id = %application_id, subscriber = %subscriber, "websocket subscribed");

    let (mut sink, mut stream) = socket.split();

    loop {
        let step = tokio::select! {
            update = observer.recv() => match update {
                Some(update) => forward(&mut sink, &observer, &update).await,
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    Step::Stop
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => Step::Stop,
                Some(Ok(_)) => Step::Continue,
            },
        };
        if matches!(step, Step::Stop) {
            break;
        }
    }

    notifier.unsubscribe(application_id, subscriber);
    debug!(application_id = %application_id, subscriber = %subscriber, "websocket closed");
}

async fn forward<S>(sink: &mut S, observer: &ObserverHandle, update: &OfferUpdate) -> Step
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = match serde_json::to_string(update) {
        Ok(text) => text,
        Err(e) => {
            warn!(subscriber = %observer.id(), error = %e, "failed to encode offer update");
            return Step::Continue;
        }
    };

    match sink.send(Message::Text(text.into())).await {
        Ok(()) => Step::Continue,
        Err(e) => {
            warn!(
                application_id = %observer.application_id(),
                subscriber = %observer.id(),
                error = %e,
                "failed to write offer update"
            );
            Step::Stop
        }
    }
}
