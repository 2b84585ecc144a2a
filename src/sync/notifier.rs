//! User notifications
//!
//! Transient messages for merge and sync outcomes. Each message expires on its own
//! timer; a newer message never cancels an older one.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

const HISTORY_LIMIT: usize = 50;

/// Sink for user-facing messages
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// A message that has been shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

struct Toast {
    notification: Notification,
    expires_at: Instant,
}

#[derive(Default)]
struct ToastState {
    visible: Vec<Toast>,
    history: VecDeque<Notification>,
}

/// Toast-style notifier: messages stay visible for a fixed duration
pub struct ToastNotifier {
    duration: Duration,
    state: Mutex<ToastState>,
}

impl ToastNotifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: Mutex::new(ToastState::default()),
        }
    }

    /// Messages still on screen, oldest first. Expired messages are dropped here.
    pub fn visible(&self) -> Vec<String> {
        let now = Instant::now();
        let Ok(mut state) = self.state.lock() else {
            return Vec::new();
        };
        state.visible.retain(|toast| toast.expires_at > now);
        state
            .visible
            .iter()
            .map(|toast| toast.notification.message.clone())
            .collect()
    }

    /// Every message shown, oldest first, bounded
    pub fn history(&self) -> Vec<Notification> {
        self.state
            .lock()
            .map(|state| state.history.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("{}", message);

        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.to_string(),
            shown_at: Utc::now(),
        };

        if let Ok(mut state) = self.state.lock() {
            state.visible.push(Toast {
                notification: notification.clone(),
                expires_at: Instant::now() + self.duration,
            });
            state.history.push_back(notification);
            while state.history.len() > HISTORY_LIMIT {
                state.history.pop_front();
            }
        }
    }
}
