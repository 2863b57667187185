use crate::error::Result;
use crate::events::HostEvent;
use tokio::sync::mpsc;

/// Trait for host bridges that can run in different modes
#[async_trait::async_trait]
pub trait HostBridge {
    /// Читать события хоста, пока источник не иссякнет или канал не закроется
    async fn run(self: Box<Self>, events: mpsc::Sender<HostEvent>) -> Result<()>;
}

/// Factory function to create an appropriate host bridge based on the dry_run flag
pub fn create_host_bridge(dry_run: bool) -> Box<dyn HostBridge + Send> {
    if dry_run {
        Box::new(super::dry_run::DryRunBridge::new())
    } else {
        Box::new(super::stdin::StdinBridge::new())
    }
}
