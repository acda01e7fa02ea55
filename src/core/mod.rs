pub mod config;
pub mod error;
pub mod types;

pub use config::{config, SessionConfig};
pub use error::{FiresError, ImportError, LlmError, Result};
pub use types::{Allegiance, StatusTier};
