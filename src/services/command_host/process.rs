use crate::config::HostConfig;
use crate::error::{ProceedError, Result};
use crate::proceed_error;
use crate::trace_if_enabled;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use super::r#trait::CommandHost;

const COMMAND_PLACEHOLDER: &str = "{command}";
const ARGS_PLACEHOLDER: &str = "{args}";

/// Выполняет команды хоста через внешнюю программу-мост.
///
/// Каждая команда запускает `program` с аргументами из шаблона. Ненулевой код
/// выхода считается «команда недоступна». Таймаута нет: зависшая команда
/// задерживает тик.
pub struct ProcessCommandHost {
    program: String,
    args: Vec<String>,
}

impl ProcessCommandHost {
    pub fn new(config: &HostConfig) -> Result<Self> {
        info!("Инициализация ProcessCommandHost: {} {:?}", config.program, config.args);

        if !config.args.iter().any(|arg| arg.contains(COMMAND_PLACEHOLDER)) {
            return Err(proceed_error!(
                internal,
                "host.args должен содержать {} для передачи идентификатора команды",
                COMMAND_PLACEHOLDER
            ));
        }

        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
        })
    }

    fn build_argv(&self, command: &str, args: Option<&serde_json::Value>) -> Vec<String> {
        let args_json = args.map(|value| value.to_string());

        self.args
            .iter()
            .filter_map(|template| {
                // Аргумент, состоящий только из {args}, выпадает, если аргументов нет
                if template == ARGS_PLACEHOLDER && args_json.is_none() {
                    return None;
                }
                Some(
                    template
                        .replace(COMMAND_PLACEHOLDER, command)
                        .replace(ARGS_PLACEHOLDER, args_json.as_deref().unwrap_or("")),
                )
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CommandHost for ProcessCommandHost {
    async fn execute(&self, command: &str, args: Option<&serde_json::Value>) -> Result<()> {
        let argv = self.build_argv(command, args);
        trace_if_enabled!("Запуск {} {:?}", self.program, argv);

        let output = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProceedError::dispatch(command, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(proceed_error!(
                unavailable,
                "{} ({}): {}",
                command,
                output.status,
                stderr.trim()
            ));
        }

        Ok(())
    }
}
