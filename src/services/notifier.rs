use crate::config::NotificationConfig;
use crate::error::Result;
use crate::swipe_error;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{error, warn};
use zbus::zvariant::Value;
use zbus::Connection;

const APP_NAME: &str = "SwipeDown";
const EXPIRE_TIMEOUT_MS: i32 = 5000;
const DBUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Operator-facing surface for failures the daemon recovers from
#[async_trait::async_trait]
pub trait OperatorNotifier: Send + Sync {
    /// Show a human-readable failure message
    async fn notify(&self, summary: &str, body: &str);
}

/// Factory function to create a notifier based on configuration and the dry_run flag
pub fn create_notifier(config: &NotificationConfig, dry_run: bool) -> Arc<dyn OperatorNotifier> {
    if config.desktop && !dry_run {
        Arc::new(DesktopNotifier::new())
    } else {
        Arc::new(LogNotifier)
    }
}

/// Только журнал
pub struct LogNotifier;

#[async_trait::async_trait]
impl OperatorNotifier for LogNotifier {
    async fn notify(&self, summary: &str, body: &str) {
        error!("{}: {}", summary, body);
    }
}

/// Уведомления рабочего стола через org.freedesktop.Notifications
pub struct DesktopNotifier {
    connection: OnceCell<Connection>,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            connection: OnceCell::new(),
        }
    }

    async fn send(&self, summary: &str, body: &str) -> Result<()> {
        let connection = self
            .connection
            .get_or_try_init(|| async { Connection::session().await })
            .await?;

        let actions: Vec<&str> = Vec::new();
        let hints: HashMap<&str, Value<'_>> = HashMap::new();

        connection
            .call_method(
                Some("org.freedesktop.Notifications"),
                "/org/freedesktop/Notifications",
                Some("org.freedesktop.Notifications"),
                "Notify",
                &(APP_NAME, 0u32, "dialog-error", summary, body, actions, hints, EXPIRE_TIMEOUT_MS),
            )
            .await?;

        Ok(())
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl OperatorNotifier for DesktopNotifier {
    async fn notify(&self, summary: &str, body: &str) {
        error!("{}: {}", summary, body);

        let sent = timeout(DBUS_TIMEOUT, self.send(summary, body))
            .await
            .unwrap_or_else(|_| Err(swipe_error!(internal, "сервис уведомлений не ответил за {:?}", DBUS_TIMEOUT)));

        if let Err(e) = sent {
            warn!("Не удалось показать уведомление через D-Bus: {}", e);
        }
    }
}
