pub mod command_host;
pub mod host_bridge;
pub mod notifier;
pub mod proceeder;
pub mod state_controller;
pub mod status;
pub mod window_store;

#[cfg(test)]
pub mod testing;

pub use command_host::{create_command_host, CommandHost};
pub use host_bridge::create_host_bridge;
pub use notifier::{create_notifier, Notifier};
pub use proceeder::{CommandDispatcher, DispatchReport, ProceederLoop};
pub use state_controller::{ControllerDeps, StateController};
pub use status::{create_status_indicator, StatusIndicator, StatusView};
pub use window_store::{FileWindowStore, MemoryStorage, WindowStore};
