//! Dashboard and parent notifications.
//!
//! Workflows fan out one message to a set of recipients through
//! [`notify_users`], which writes all rows with a single batch insert inside
//! the caller's transaction.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{Condition, QueryFilter, QueryOrder, prelude::*, sea_query::OnConflict};
use uuid::Uuid;

use crate::{
    Action, Actor, DashboardNotification, EngineError, NotificationCategory, ParentNotification,
    ResultEngine, Role, access, dashboard_notifications, parent_notifications, users,
};

use super::Engine;

/// Which of the actor's notifications an update applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationSelection {
    All,
    Ids(Vec<Uuid>),
}

impl NotificationSelection {
    /// Builds a selection from request fields; `all` wins over `ids`.
    pub fn new(ids: Option<Vec<Uuid>>, all: bool) -> ResultEngine<Self> {
        if all {
            return Ok(Self::All);
        }
        match ids {
            Some(ids) if !ids.is_empty() => Ok(Self::Ids(ids)),
            _ => Err(EngineError::InvalidInput(
                "provide notification ids or set all to true".to_string(),
            )),
        }
    }

    fn condition(&self, recipient: Uuid) -> Condition {
        let condition = Condition::all()
            .add(dashboard_notifications::Column::RecipientId.eq(recipient.to_string()));
        match self {
            Self::All => condition,
            Self::Ids(ids) => condition.add(
                dashboard_notifications::Column::Id
                    .is_in(ids.iter().map(ToString::to_string)),
            ),
        }
    }
}

/// Inserts one notification per distinct recipient. Returns how many were written.
pub(super) async fn notify_users<C: ConnectionTrait>(
    db: &C,
    recipients: impl IntoIterator<Item = Uuid>,
    category: NotificationCategory,
    title: &str,
    message: &str,
) -> ResultEngine<usize> {
    let recipients: BTreeSet<Uuid> = recipients.into_iter().collect();
    if recipients.is_empty() {
        return Ok(0);
    }
    let now = Utc::now();
    let models: Vec<dashboard_notifications::ActiveModel> = recipients
        .iter()
        .map(|recipient| {
            let notification =
                DashboardNotification::new(*recipient, category, title, message, now);
            dashboard_notifications::ActiveModel::from(&notification)
        })
        .collect();
    dashboard_notifications::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    tracing::debug!(count = recipients.len(), %category, title, "notifications queued");
    Ok(recipients.len())
}

/// Ids of users holding any of `roles`, plus superusers when asked.
pub(super) async fn users_with_roles<C: ConnectionTrait>(
    db: &C,
    roles: &[Role],
    include_superusers: bool,
) -> ResultEngine<Vec<Uuid>> {
    let mut condition =
        Condition::any().add(users::Column::Role.is_in(roles.iter().map(|r| r.as_str())));
    if include_superusers {
        condition = condition.add(users::Column::IsSuperuser.eq(true));
    }
    users::Entity::find()
        .filter(condition)
        .all(db)
        .await?
        .into_iter()
        .map(|model| crate::util::parse_uuid(&model.id, "user"))
        .collect()
}

/// Writes a parent notification unless one of the same type already exists
/// for the invoice. Returns `true` when a row was inserted.
pub(super) async fn notify_parent<C: ConnectionTrait>(
    db: &C,
    notification: &ParentNotification,
) -> ResultEngine<bool> {
    let inserted = parent_notifications::Entity::insert(parent_notifications::ActiveModel::from(
        notification,
    ))
    .on_conflict(
        OnConflict::columns([
            parent_notifications::Column::InvoiceId,
            parent_notifications::Column::NotificationType,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(inserted > 0)
}

impl Engine {
    /// Sends one dashboard message to each recipient.
    pub async fn notify(
        &self,
        recipients: &[Uuid],
        category: NotificationCategory,
        title: &str,
        message: &str,
    ) -> ResultEngine<usize> {
        notify_users(
            &self.database,
            recipients.iter().copied(),
            category,
            title,
            message,
        )
        .await
    }

    /// The actor's visible notifications, newest first.
    pub async fn notifications(&self, actor: &Actor) -> ResultEngine<Vec<DashboardNotification>> {
        access::require(actor, Action::ViewNotifications)?;
        dashboard_notifications::Entity::find()
            .filter(dashboard_notifications::Column::RecipientId.eq(actor.user_id.to_string()))
            .filter(dashboard_notifications::Column::IsHidden.eq(false))
            .order_by_desc(dashboard_notifications::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(DashboardNotification::try_from)
            .collect()
    }

    /// Hides notifications from the actor's dashboard. Returns the number hidden.
    pub async fn hide_notifications(
        &self,
        actor: &Actor,
        selection: &NotificationSelection,
    ) -> ResultEngine<u64> {
        access::require(actor, Action::ViewNotifications)?;
        let result = dashboard_notifications::Entity::update_many()
            .col_expr(dashboard_notifications::Column::IsHidden, Expr::value(true))
            .filter(selection.condition(actor.user_id))
            .filter(dashboard_notifications::Column::IsHidden.eq(false))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Marks notifications as read. Returns the number changed.
    pub async fn mark_notifications_read(
        &self,
        actor: &Actor,
        selection: &NotificationSelection,
    ) -> ResultEngine<u64> {
        access::require(actor, Action::ViewNotifications)?;
        let result = dashboard_notifications::Entity::update_many()
            .col_expr(dashboard_notifications::Column::IsRead, Expr::value(true))
            .filter(selection.condition(actor.user_id))
            .filter(dashboard_notifications::Column::IsRead.eq(false))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Notifications addressed to a parent. Other roles get an empty list.
    pub async fn parent_notifications(
        &self,
        actor: &Actor,
    ) -> ResultEngine<Vec<ParentNotification>> {
        if actor.role != Role::Parent {
            return Ok(Vec::new());
        }
        parent_notifications::Entity::find()
            .filter(parent_notifications::Column::ParentId.eq(actor.user_id.to_string()))
            .order_by_desc(parent_notifications::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ParentNotification::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_requires_ids_or_all() {
        assert!(NotificationSelection::new(None, false).is_err());
        assert!(NotificationSelection::new(Some(Vec::new()), false).is_err());
        assert_eq!(
            NotificationSelection::new(Some(vec![Uuid::nil()]), true).unwrap(),
            NotificationSelection::All
        );
    }
}
