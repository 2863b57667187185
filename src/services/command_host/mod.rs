//! CommandHost: доставка идентификаторов команд в редактор-хост.
//!
//! Модуль ничего не знает о состоянии автоподтверждения. Он только выполняет
//! команду и сообщает об успехе или ошибке; решать, что делать с ошибкой,
//! должен вызывающий код.

mod dry_run;
mod process;
mod r#trait;

pub use self::r#trait::{create_command_host, CommandHost};
