//! A-Prime agents crate - the capabilities a classified turn is handed to.
//!
//! Backends (`LlmClient`, `WebSearch`, `ImageGenerator`) wrap the external
//! HTTP services. Handlers turn a shaped `Payload` into a response string and
//! are looked up by category through the `HandlerRegistry`.

pub mod backend;
pub mod error;
pub mod handler;
pub mod mock;
pub mod payload;
pub mod prompts;

pub use backend::{Backends, ImageGenerator, LlmClient, ModelHandle, WebSearch};
pub use error::HandlerError;
pub use handler::{Handler, HandlerRegistry};
pub use payload::{Payload, PromptMessage, PromptRole};
