use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProceedError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка сериализации: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Команда {command} не выполнена: {reason}")]
    Dispatch { command: String, reason: String },

    #[error("Команда недоступна в текущем контексте: {0}")]
    CommandUnavailable(String),

    #[error("Ошибка хранилища состояния окна: {0}")]
    Store(String),

    #[error("Ошибка протокола хоста: {0}")]
    Protocol(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl ProceedError {
    pub fn dispatch(command: &str, reason: impl Into<String>) -> Self {
        ProceedError::Dispatch {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProceedError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! proceed_error {
    (unavailable, $($arg:tt)*) => {
        $crate::error::ProceedError::CommandUnavailable(format!($($arg)*))
    };
    (store, $($arg:tt)*) => {
        $crate::error::ProceedError::Store(format!($($arg)*))
    };
    (protocol, $($arg:tt)*) => {
        $crate::error::ProceedError::Protocol(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::ProceedError::Internal(format!($($arg)*))
    };
}
