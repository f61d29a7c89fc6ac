//! Dashboard routes.
//!
//! `GET /dashboard` answers with the whole view at once; `GET /dashboard/ws`
//! pushes the same body after every publication.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use tracing::{debug, error};

use super::SearchQuery;
use crate::AppState;
use crate::error::ApiResult;
use crate::responses::DashboardResponse;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/ws", get(dashboard_socket))
}

/// GET /dashboard
async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let (status, projections) = state.view.query(query.text()?);
    Ok(Json(DashboardResponse::new(
        &projections,
        &status,
        &state.currency,
    )))
}

/// GET /dashboard/ws
async fn dashboard_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| push_updates(socket, state))
}

/// Sends the current view, then every later publication, until either side goes away.
async fn push_updates(mut socket: WebSocket, state: AppState) {
    let mut changes = state.view.changes();
    debug!("Dashboard subscriber connected");

    loop {
        let view = Arc::clone(&changes.borrow_and_update());
        let body = match serde_json::to_string(&DashboardResponse::from_view(&view, &state.currency))
        {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode dashboard update");
                break;
            }
        };
        if socket.send(Message::Text(body.into())).await.is_err() {
            break;
        }

        let keep_open = tokio::select! {
            changed = changes.changed() => changed.is_ok(),
            () = closed(&mut socket) => false,
        };
        if !keep_open {
            break;
        }
    }

    debug!("Dashboard subscriber disconnected");
}

/// Resolves once the client closes the socket; other client frames are ignored.
async fn closed(socket: &mut WebSocket) {
    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
    }
}
