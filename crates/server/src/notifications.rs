use api_types::notification::{
    NotificationSelection, NotificationView, ParentNotificationView, Updated,
};
use axum::{Extension, extract::State};
use engine::Actor;

use crate::{ServerError, extract::Json, server::ServerState, views};

fn selection(payload: NotificationSelection) -> Result<engine::NotificationSelection, ServerError> {
    Ok(engine::NotificationSelection::new(payload.ids, payload.all)?)
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<NotificationView>>, ServerError> {
    let notifications = state.engine.notifications(&actor).await?;
    Ok(Json(notifications.iter().map(views::notification).collect()))
}

pub async fn hide(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<NotificationSelection>,
) -> Result<Json<Updated>, ServerError> {
    let updated = state
        .engine
        .hide_notifications(&actor, &selection(payload)?)
        .await?;
    Ok(Json(Updated { updated }))
}

pub async fn read(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<NotificationSelection>,
) -> Result<Json<Updated>, ServerError> {
    let updated = state
        .engine
        .mark_notifications_read(&actor, &selection(payload)?)
        .await?;
    Ok(Json(Updated { updated }))
}

/// Parents only; everybody else gets an empty list.
pub async fn parent_list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ParentNotificationView>>, ServerError> {
    let notifications = state.engine.parent_notifications(&actor).await?;
    Ok(Json(
        notifications.iter().map(views::parent_notification).collect(),
    ))
}
