use crate::config::Config;
use crate::events::UserCommand;
use crate::debug_if_enabled;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Двухпозиционное представление состояния для строки статуса
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub icon: &'static str,
    pub label: &'static str,
    pub tooltip: &'static str,
    pub highlighted: bool,
    /// Команда по клику
    pub command: UserCommand,
}

impl StatusView {
    pub fn for_state(enabled: bool) -> Self {
        if enabled {
            Self {
                icon: "check",
                label: "Auto-Proceed ON",
                tooltip: "Auto Proceed is ACTIVE for this window\nClick to disable",
                highlighted: true,
                command: UserCommand::Toggle,
            }
        } else {
            Self {
                icon: "x",
                label: "Auto-Proceed OFF",
                tooltip: "Auto Proceed is OFF for this window\nClick to enable",
                highlighted: false,
                command: UserCommand::Toggle,
            }
        }
    }

    /// Текст в синтаксисе иконок редактора: `$(check) Auto-Proceed ON`
    pub fn text(&self) -> String {
        format!("$({}) {}", self.icon, self.label)
    }
}

pub trait StatusIndicator: Send + Sync {
    fn show(&self, view: &StatusView);
    fn hide(&self);
}

pub fn create_status_indicator(config: &Config) -> Arc<dyn StatusIndicator> {
    match &config.status.file {
        Some(path) => Arc::new(StatusFile::new(path.clone())),
        None => Arc::new(LogStatus),
    }
}

pub struct LogStatus;

impl StatusIndicator for LogStatus {
    fn show(&self, view: &StatusView) {
        info!("Статус: {}", view.text());
    }

    fn hide(&self) {
        debug_if_enabled!("Индикатор статуса скрыт");
    }
}

/// JSON для custom-модуля waybar (`return-type: json`)
#[derive(Debug, Serialize)]
struct WaybarStatus<'a> {
    text: &'a str,
    tooltip: &'a str,
    class: &'a str,
    alt: &'a str,
}

/// Пишет состояние в файл, который читает панель рабочего стола
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: PathBuf) -> Self {
        info!("Статус будет записываться в {:?}", path);
        Self { path }
    }

    fn render(view: &StatusView) -> serde_json::Result<String> {
        let class = if view.highlighted { "on" } else { "off" };
        serde_json::to_string(&WaybarStatus {
            text: view.label,
            tooltip: view.tooltip,
            class,
            alt: view.icon,
        })
    }
}

impl StatusIndicator for StatusFile {
    fn show(&self, view: &StatusView) {
        info!("Статус: {}", view.text());

        let rendered = match Self::render(view) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("Не удалось сериализовать статус: {}", e);
                return;
            }
        };

        // Синхронная запись на потоке рантайма: файл в одну строку
        if let Err(e) = std::fs::write(&self.path, rendered + "\n") {
            warn!("Не удалось записать статус в {:?}: {}", self.path, e);
        }
    }

    fn hide(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug_if_enabled!("Файл статуса {:?} удалён", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Не удалось удалить файл статуса {:?}: {}", self.path, e),
        }
    }
}
