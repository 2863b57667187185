use crate::error::Result;
use crate::events::{FocusEvent, FocusRegion, FocusStream};
use crate::proceed_error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Команды, которые регистрируются у хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserCommand {
    Toggle,
    Enable,
    Disable,
    TriggerNow,
    /// Сквозное действие для клавиши Enter в редакторе или поле ввода агента
    SmartConfirm,
}

impl UserCommand {
    pub const ALL: [UserCommand; 5] = [
        UserCommand::Toggle,
        UserCommand::Enable,
        UserCommand::Disable,
        UserCommand::TriggerNow,
        UserCommand::SmartConfirm,
    ];

    pub fn id(self) -> &'static str {
        match self {
            UserCommand::Toggle => "auto-proceed.toggle",
            UserCommand::Enable => "auto-proceed.enable",
            UserCommand::Disable => "auto-proceed.disable",
            UserCommand::TriggerNow => "auto-proceed.triggerNow",
            UserCommand::SmartConfirm => "auto-proceed.smartEnter",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            UserCommand::Toggle => "toggle",
            UserCommand::Enable => "enable",
            UserCommand::Disable => "disable",
            UserCommand::TriggerNow => "trigger-now",
            UserCommand::SmartConfirm => "smart-enter",
        }
    }

    /// Принимает полный идентификатор хоста или короткое имя
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|command| command.id() == id || command.short_name() == id)
    }
}

impl fmt::Display for UserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Событие от хоста: два независимых потока фокуса и вызовы команд
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ActiveTerminalChanged(Option<String>),
    ActiveEditorChanged(Option<String>),
    Command(UserCommand),
}

impl HostEvent {
    /// Сводит оба потока фокуса к одному тегированному событию.
    ///
    /// Потеря активного терминала не означает смену фокуса и ничего не даёт.
    pub fn focus_event(&self) -> Option<FocusEvent> {
        match self {
            HostEvent::ActiveTerminalChanged(Some(_)) => Some(FocusEvent::new(
                FocusRegion::Terminal,
                FocusStream::ActiveTerminal,
            )),
            HostEvent::ActiveTerminalChanged(None) => None,
            HostEvent::ActiveEditorChanged(Some(_)) => Some(FocusEvent::new(
                FocusRegion::Editor,
                FocusStream::ActiveEditor,
            )),
            HostEvent::ActiveEditorChanged(None) => Some(FocusEvent::new(
                FocusRegion::NoEditor,
                FocusStream::ActiveEditor,
            )),
            HostEvent::Command(_) => None,
        }
    }

    /// Разбор одной строки протокола моста:
    /// `terminal [name]`, `editor [path]`, `command <id>`.
    /// Пустые строки и комментарии `#` возвращают `Ok(None)`.
    pub fn parse_line(line: &str) -> Result<Option<HostEvent>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        match verb {
            "terminal" => Ok(Some(HostEvent::ActiveTerminalChanged(argument))),
            "editor" => Ok(Some(HostEvent::ActiveEditorChanged(argument))),
            "command" => {
                let id = argument
                    .ok_or_else(|| proceed_error!(protocol, "команда без идентификатора"))?;
                UserCommand::from_id(&id)
                    .map(|command| Some(HostEvent::Command(command)))
                    .ok_or_else(|| proceed_error!(protocol, "неизвестная команда '{}'", id))
            }
            other => Err(proceed_error!(protocol, "неизвестное событие '{}'", other)),
        }
    }
}
