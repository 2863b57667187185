use serde::{Deserialize, Serialize};
use std::fmt;

/// Логическая область UI, которая сейчас удерживает фокус ввода
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusRegion {
    Terminal,
    Editor,
    /// Фокус ушёл с редактора: боковая панель, чат, ввод агента
    NoEditor,
}

impl FocusRegion {
    /// Желаемое состояние автоподтверждения для области фокуса
    pub fn desired_state(self) -> bool {
        match self {
            FocusRegion::Terminal => true,
            FocusRegion::Editor => true,
            FocusRegion::NoEditor => false,
        }
    }
}

impl fmt::Display for FocusRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusRegion::Terminal => write!(f, "terminal"),
            FocusRegion::Editor => write!(f, "editor"),
            FocusRegion::NoEditor => write!(f, "none"),
        }
    }
}

/// Из какого потока хоста пришло событие
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusStream {
    ActiveTerminal,
    ActiveEditor,
}

/// Событие смены области фокуса
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub region: FocusRegion,
    pub stream: FocusStream,
    pub timestamp: std::time::Instant,
}

impl FocusEvent {
    pub fn new(region: FocusRegion, stream: FocusStream) -> Self {
        Self {
            region,
            stream,
            timestamp: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for FocusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} ({}ms ago)",
            self.stream,
            self.region,
            self.timestamp.elapsed().as_millis()
        )
    }
}
