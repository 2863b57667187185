pub mod focus;
pub mod host;

pub use focus::{FocusEvent, FocusRegion, FocusStream};
pub use host::{HostEvent, UserCommand};
