//! Model-facing layer: HTTP client, context serialization, prompt assembly

pub mod client;
pub mod context;
pub mod prompt;

pub use client::{ChatMessage, Completion, LlmClient, ModelBackend, Role};
pub use context::{ContextCaps, ContextSerializer};
pub use prompt::{build_system_prompt, ReferenceDoc};
