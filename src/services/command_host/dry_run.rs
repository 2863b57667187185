use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use super::r#trait::CommandHost;

pub struct DryRunCommandHost {
    executed: AtomicU64,
}

impl DryRunCommandHost {
    pub fn new() -> Self {
        info!("Инициализация DryRunCommandHost");
        Self {
            executed: AtomicU64::new(0),
        }
    }
}

#[async_trait::async_trait]
impl CommandHost for DryRunCommandHost {
    async fn execute(&self, command: &str, args: Option<&serde_json::Value>) -> Result<()> {
        let count = self.executed.fetch_add(1, Ordering::Relaxed) + 1;
        match args {
            Some(args) => info!("[DRY RUN] #{} команда {} {}", count, command, args),
            None => info!("[DRY RUN] #{} команда {}", count, command),
        }
        Ok(())
    }
}
