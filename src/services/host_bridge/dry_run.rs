use crate::error::Result;
use crate::events::{HostEvent, UserCommand};
use crate::proceed_error;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::info;

use super::HostBridge;

pub struct DryRunBridge;

impl DryRunBridge {
    pub fn new() -> Self {
        Self
    }

    fn script() -> Vec<HostEvent> {
        vec![
            HostEvent::ActiveEditorChanged(Some("src/main.rs - dry_run".to_string())),
            HostEvent::ActiveTerminalChanged(Some("bash - dry_run".to_string())),
            HostEvent::Command(UserCommand::TriggerNow),
            HostEvent::ActiveEditorChanged(None),
            HostEvent::Command(UserCommand::SmartConfirm),
        ]
    }
}

#[async_trait::async_trait]
impl HostBridge for DryRunBridge {
    async fn run(self: Box<Self>, events: mpsc::Sender<HostEvent>) -> Result<()> {
        info!("Dry-run режим - HostBridge эмулирует смену фокуса");

        let script = Self::script();
        let mut index = 0;
        let mut ticker = interval(Duration::from_secs(10));

        loop {
            ticker.tick().await;

            let event = script[index].clone();
            info!("Dry-run: эмулируем событие хоста {:?}", event);
            events
                .send(event)
                .await
                .map_err(|_| proceed_error!(internal, "канал событий сессии закрыт"))?;

            index = (index + 1) % script.len();
        }
    }
}
