use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Реестр команд хоста
#[async_trait::async_trait]
pub trait CommandHost: Send + Sync {
    /// Выполнить команду хоста. Ошибка означает, что команда недоступна
    /// в текущем контексте UI или упала у хоста.
    async fn execute(&self, command: &str, args: Option<&serde_json::Value>) -> Result<()>;
}

/// Factory function to create an appropriate command host based on the dry_run flag
pub fn create_command_host(config: Arc<Config>, dry_run: bool) -> Result<Arc<dyn CommandHost>> {
    if dry_run {
        Ok(Arc::new(super::dry_run::DryRunCommandHost::new()))
    } else {
        Ok(Arc::new(super::process::ProcessCommandHost::new(&config.host)?))
    }
}
