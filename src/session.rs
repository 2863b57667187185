use crate::events::{HostEvent, UserCommand};
use crate::services::StateController;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Контекст одного окна.
///
/// Единолично владеет [`StateController`] (а через него и таймером) и
/// обрабатывает события фокуса и команды строго по одному, в порядке
/// поступления в канал. Если оба потока фокуса сработали на одно физическое
/// действие, побеждает событие, пришедшее последним.
pub struct WindowSession {
    window_id: String,
    controller: StateController,
    handled: u64,
}

impl WindowSession {
    pub fn new(window_id: impl Into<String>, controller: StateController) -> Self {
        Self {
            window_id: window_id.into(),
            controller,
            handled: 0,
        }
    }

    pub async fn run<F>(mut self, mut events: mpsc::Receiver<HostEvent>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Сессия окна '{}' запущена", self.window_id);
        self.controller.activate();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Сессия окна '{}' получила сигнал завершения", self.window_id);
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("Источник событий хоста завершился");
                        break;
                    }
                },
            }
        }

        let enabled = self.controller.is_enabled();
        self.controller.shutdown();
        info!(
            "Сессия окна '{}' завершена, обработано событий: {}, сохранённое состояние: {}",
            self.window_id,
            self.handled,
            if enabled { "ON" } else { "OFF" }
        );
    }

    pub async fn handle_event(&mut self, event: HostEvent) {
        self.handled += 1;

        if let Some(focus) = event.focus_event() {
            debug!("Смена фокуса: {}", focus);
            self.controller.on_focus_changed(focus.region);
            return;
        }

        match event {
            HostEvent::Command(command) => self.handle_command(command).await,
            HostEvent::ActiveTerminalChanged(None) => {
                debug!("Активный терминал закрыт, фокус не изменился");
            }
            other => debug!("Событие без действия: {:?}", other),
        }
    }

    async fn handle_command(&mut self, command: UserCommand) {
        info!("Команда {}", command);

        match command {
            UserCommand::Toggle => {
                self.controller.toggle();
            }
            UserCommand::Enable => self.controller.enable(),
            UserCommand::Disable => self.controller.disable(),
            UserCommand::TriggerNow => {
                let report = self.controller.trigger_now().await;
                debug!(
                    "Ручной проход: выполнено {}, пропущено {}",
                    report.dispatched(),
                    report.failed()
                );
            }
            UserCommand::SmartConfirm => {
                if let Err(e) = self.controller.smart_confirm().await {
                    warn!("Сквозной ввод не выполнен: {}", e);
                }
            }
        }
    }
}
