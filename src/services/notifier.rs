use crate::config::Config;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

const APP_NAME: &str = "Auto Proceed";

/// Лёгкие неблокирующие уведомления о смене состояния
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub fn create_notifier(config: &Config) -> Arc<dyn Notifier> {
    match config.notifications.mode.as_str() {
        "desktop" => Arc::new(DesktopNotifier),
        _ => Arc::new(LogNotifier),
    }
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!("{}: {}", APP_NAME, message);
    }
}

/// Уведомления через `notify-send`; процесс не ожидается
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        info!("{}: {}", APP_NAME, message);

        let spawned = Command::new("notify-send")
            .arg("--app-name")
            .arg(APP_NAME)
            .arg("--expire-time")
            .arg("2000")
            .arg(APP_NAME)
            .arg(message)
            .spawn();

        // Child отпускается сразу, tokio сам дождётся его в фоне
        if let Err(e) = spawned {
            warn!("Не удалось показать уведомление через notify-send: {}", e);
        }
    }
}
