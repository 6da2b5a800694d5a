pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, PlatformCommandError, ShellError};
pub use events::{EventBus, PlatformEvent, ShellEvent};
pub use id::{new_id, WindowHandle};
pub use types::{Rect, ShellMode, Size};

pub type Result<T> = std::result::Result<T, ShellError>;
