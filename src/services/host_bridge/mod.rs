//! HostBridge: источник событий хоста для сессии окна.
//!
//! Мост только переводит внешний протокол в [`HostEvent`] и кладёт события в
//! общий канал в порядке поступления. Никаких решений о включении он не
//! принимает: политику применяет StateController.

mod dry_run;
mod stdin;
mod r#trait;

pub use self::r#trait::{create_host_bridge, HostBridge};
