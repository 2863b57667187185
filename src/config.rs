use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::services::window_store::is_valid_window_id;

pub const ENV_PREFIX: &str = "AUTO_PROCEED_";

/// Интервал между тиками, если настройка отсутствует или некорректна
pub const DEFAULT_INTERVAL_MS: u64 = 1500;

const INTERVAL_KEY: &str = "proceed.interval_ms";

/// Команды подтверждения, которые пробуются на каждом тике (порядок важен)
pub const DEFAULT_ACCEPT_COMMANDS: [&str; 5] = [
    "antigravity.agent.acceptAgentStep",
    "antigravity.terminalCommand.accept",
    "antigravity.prioritized.agentAcceptFocusedHunk",
    "antigravity.command.accept",
    "antigravity.terminalCommand.run",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub proceed: ProceedConfig,
    pub host: HostConfig,
    pub window: WindowConfig,
    pub status: StatusConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Интервал тиков здесь намеренно отсутствует: он перечитывается при каждом
/// запуске цикла через [`IntervalSource`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProceedConfig {
    pub commands: Vec<String>,
    /// Команда хоста для сквозного ввода (newline) в smart confirm
    pub type_command: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    pub program: String,
    /// Шаблоны аргументов: `{command}` и `{args}` (JSON аргументов команды)
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    pub id: String,
    pub state_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub mode: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            proceed: ProceedConfig {
                commands: DEFAULT_ACCEPT_COMMANDS.iter().map(|c| c.to_string()).collect(),
                type_command: "default:type".to_string(),
            },
            host: HostConfig {
                program: "auto-proceed-dispatch".to_string(),
                args: vec!["{command}".to_string(), "{args}".to_string()],
            },
            window: WindowConfig {
                id: "default".to_string(),
                state_dir: PathBuf::from("auto-proceed-state"),
            },
            status: StatusConfig::default(),
            notifications: NotificationConfig {
                mode: "log".to_string(),
            },
        }
    }
}

impl Config {
    /// Слои конфигурации: значения по умолчанию, TOML-файл, переменные окружения
    pub fn figment<P: AsRef<Path>>(config_path: P) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        Self::from_figment(Self::figment(config_path))
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.proceed.commands.is_empty() {
            anyhow::bail!("Список команд proceed.commands не может быть пустым");
        }

        for (i, command) in self.proceed.commands.iter().enumerate() {
            if command.trim().is_empty() {
                anyhow::bail!("Пустой идентификатор команды #{}", i + 1);
            }
        }

        if self.proceed.type_command.trim().is_empty() {
            anyhow::bail!("proceed.type_command не может быть пустым");
        }

        if self.host.program.trim().is_empty() {
            anyhow::bail!("host.program не может быть пустым");
        }

        match self.notifications.mode.as_str() {
            "log" | "desktop" => {}
            _ => anyhow::bail!("Неверный режим уведомлений: {}", self.notifications.mode),
        }

        if self.window.id.trim().is_empty() {
            anyhow::bail!("window.id не может быть пустым");
        }

        if !is_valid_window_id(&self.window.id) {
            anyhow::bail!(
                "window.id '{}' должен состоять из [A-Za-z0-9._-] и не начинаться с точки",
                self.window.id
            );
        }

        Ok(())
    }
}

/// Источник интервала тиков, читается при каждом запуске цикла
pub trait IntervalSource: Send + Sync {
    fn interval(&self) -> Duration;
}

/// Перечитывает те же слои, что и [`Config::load`], так что правка файла
/// подхватывается при следующем включении.
pub struct LayeredIntervalSource {
    config_path: PathBuf,
}

impl LayeredIntervalSource {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }
}

impl IntervalSource for LayeredIntervalSource {
    fn interval(&self) -> Duration {
        read_interval(&Config::figment(&self.config_path))
    }
}

pub fn read_interval(figment: &Figment) -> Duration {
    let raw = match figment.extract_inner::<i64>(INTERVAL_KEY) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{} не задан или не число ({}), используем {}мс", INTERVAL_KEY, e, DEFAULT_INTERVAL_MS);
            None
        }
    };

    Duration::from_millis(resolve_interval_ms(raw))
}

pub fn resolve_interval_ms(raw: Option<i64>) -> u64 {
    match raw {
        Some(ms) if ms > 0 => ms as u64,
        Some(ms) => {
            debug!("Некорректный интервал {}мс, используем {}мс", ms, DEFAULT_INTERVAL_MS);
            DEFAULT_INTERVAL_MS
        }
        None => DEFAULT_INTERVAL_MS,
    }
}
