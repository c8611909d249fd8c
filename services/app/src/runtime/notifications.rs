//! services/app/src/runtime/notifications.rs
//!
//! The transient notification queue. Every entry owns the handle of the task
//! that will expire it, so dismissal cancels that task explicitly.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

struct Entry {
    notification: Notification,
    expiry: JoinHandle<()>,
}

/// Insertion-ordered queue of notifications that remove themselves after `timeout`.
#[derive(Clone)]
pub struct NotificationQueue {
    entries: Arc<Mutex<Vec<Entry>>>,
    timeout: Duration,
}

impl NotificationQueue {
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            timeout,
        }
    }

    /// Appends a notification and schedules its removal. Returns its id.
    pub async fn enqueue(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        };
        let id = notification.id;
        info!("Notification {:?}: {}", severity, notification.message);

        let mut entries = self.entries.lock().await;
        let expiry = tokio::spawn(expire_after(
            Arc::downgrade(&self.entries),
            id,
            self.timeout,
        ));
        entries.push(Entry {
            notification,
            expiry,
        });
        id
    }

    pub async fn success(&self, message: impl Into<String>) -> Uuid {
        self.enqueue(message, Severity::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Uuid {
        self.enqueue(message, Severity::Error).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Uuid {
        self.enqueue(message, Severity::Info).await
    }

    /// Removes a notification now. Unknown or already expired ids are ignored.
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let removed = take_entry(&mut *self.entries.lock().await, id);
        match removed {
            Some(entry) => {
                entry.expiry.abort();
                debug!("Notification {} dismissed", id);
                true
            }
            None => false,
        }
    }

    /// The live notifications in insertion order.
    pub async fn snapshot(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    /// Drops every notification and cancels all pending expiry tasks.
    pub async fn clear(&self) {
        let drained: Vec<Entry> = self.entries.lock().await.drain(..).collect();
        for entry in drained {
            entry.expiry.abort();
        }
    }
}

fn take_entry(entries: &mut Vec<Entry>, id: Uuid) -> Option<Entry> {
    let index = entries.iter().position(|e| e.notification.id == id)?;
    Some(entries.remove(index))
}

async fn expire_after(entries: Weak<Mutex<Vec<Entry>>>, id: Uuid, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    let Some(entries) = entries.upgrade() else {
        return;
    };
    // Own handle is dropped, not aborted: this task is finishing anyway.
    if take_entry(&mut *entries.lock().await, id).is_some() {
        debug!("Notification {} expired", id);
    }
}
