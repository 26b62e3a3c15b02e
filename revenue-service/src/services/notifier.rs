//! Notification fan-out for revenue-service.
//!
//! Workflow handlers build [`Notice`] intents after a state-changing write
//! commits and hand them to the [`Notifier`]. Delivery is best-effort: role
//! recipients are resolved against `profiles`, all inserts are issued
//! concurrently, and failures are logged and swallowed. A lost inbox entry
//! never rolls back or fails the triggering workflow step.

use crate::models::Role;
use crate::services::Database;
use crate::services::metrics::record_notification;
use futures::future::join_all;
use uuid::Uuid;

/// Who a notice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    User(Uuid),
    Role(Role),
}

/// An intent to create inbox entries, emitted by a workflow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn user(user_id: Uuid, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::User(user_id),
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn role(role: Role, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Role(role),
            title: title.into(),
            message: message.into(),
        }
    }

    /// The review-staff fan-out: one notice per staff role. Expanded to
    /// individual recipients at dispatch time.
    pub fn staff(title: &str, message: &str) -> Vec<Self> {
        vec![
            Notice::role(Role::Officer, title, message),
            Notice::role(Role::Admin, title, message),
        ]
    }
}

/// Dispatches notices against the notifications table.
#[derive(Clone)]
pub struct Notifier {
    db: Database,
}

impl Notifier {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Deliver a batch of notices. Role recipients are resolved to every
    /// matching profile; all inserts run concurrently with no ordering or
    /// atomicity across the batch. Partial failure is logged, counted and
    /// otherwise ignored.
    pub async fn dispatch(&self, notices: Vec<Notice>) {
        let mut targets: Vec<(Uuid, String, String)> = Vec::new();

        for notice in notices {
            match notice.recipient {
                Recipient::User(user_id) => {
                    targets.push((user_id, notice.title, notice.message));
                }
                Recipient::Role(role) => match self.db.list_profiles_by_role(role).await {
                    Ok(profiles) => {
                        for profile in profiles {
                            targets.push((
                                profile.profile_id,
                                notice.title.clone(),
                                notice.message.clone(),
                            ));
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            role = role.as_str(),
                            error = %e,
                            "Failed to resolve notification recipients"
                        );
                        record_notification("resolve_failed");
                    }
                },
            }
        }

        let inserts = targets.iter().map(|(user_id, title, message)| {
            let db = self.db.clone();
            async move {
                match db.insert_notification(*user_id, title, message).await {
                    Ok(()) => {
                        record_notification("sent");
                    }
                    Err(e) => {
                        tracing::error!(
                            user_id = %user_id,
                            title = %title,
                            error = %e,
                            "Failed to insert notification"
                        );
                        record_notification("failed");
                    }
                }
            }
        });

        join_all(inserts).await;
    }
}
