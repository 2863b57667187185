//! Тестовые двойники для хоста, индикатора и уведомлений.
//!
//! Все двойники пишут в общий [`Journal`], чтобы тесты могли проверять
//! порядок побочных эффектов между разными компонентами.

use crate::config::IntervalSource;
use crate::error::Result;
use crate::proceed_error;
use crate::services::{CommandHost, Notifier, StatusIndicator, StatusView, WindowStore};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

pub struct RecordingHost {
    journal: Journal,
    failing: HashSet<String>,
}

impl RecordingHost {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            failing: HashSet::new(),
        }
    }

    pub fn failing(journal: Journal, failing: &[&str]) -> Self {
        Self {
            journal,
            failing: failing.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl CommandHost for RecordingHost {
    async fn execute(&self, command: &str, args: Option<&serde_json::Value>) -> Result<()> {
        match args {
            Some(args) => self.journal.push(format!("dispatch:{} {}", command, args)),
            None => self.journal.push(format!("dispatch:{}", command)),
        }
        tokio::task::yield_now().await;

        if self.failing.contains(command) {
            return Err(proceed_error!(unavailable, "{}", command));
        }
        Ok(())
    }
}

/// Хост, у которого каждая команда выполняется заметное время
pub struct SlowHost {
    journal: Journal,
    delay: Duration,
}

impl SlowHost {
    pub fn new(journal: Journal, delay: Duration) -> Self {
        Self { journal, delay }
    }
}

#[async_trait::async_trait]
impl CommandHost for SlowHost {
    async fn execute(&self, command: &str, _args: Option<&serde_json::Value>) -> Result<()> {
        self.journal.push(format!("start:{}", command));
        tokio::time::sleep(self.delay).await;
        self.journal.push(format!("done:{}", command));
        Ok(())
    }
}

/// Хранилище, у которого недоступен диск
pub struct FailingStore;

impl WindowStore for FailingStore {
    fn get_flag(&self, _key: &str) -> Result<Option<bool>> {
        Err(proceed_error!(store, "хранилище недоступно"))
    }

    fn set_flag(&self, _key: &str, _value: bool) -> Result<()> {
        Err(proceed_error!(store, "хранилище недоступно"))
    }
}

pub struct RecordingStatus(pub Journal);

impl StatusIndicator for RecordingStatus {
    fn show(&self, view: &StatusView) {
        self.0.push(if view.highlighted { "status:on" } else { "status:off" });
    }

    fn hide(&self) {
        self.0.push("status:hidden");
    }
}

pub struct RecordingNotifier(pub Journal);

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.0.push(format!("notify:{}", message));
    }
}

pub struct FixedInterval(pub Duration);

impl IntervalSource for FixedInterval {
    fn interval(&self) -> Duration {
        self.0
    }
}

/// Даёт порождённым задачам отработать до ближайшей точки ожидания
pub async fn settle() {
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
