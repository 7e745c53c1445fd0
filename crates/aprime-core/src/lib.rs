pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::AprimeConfig;
pub use error::{AprimeError, Result};
pub use store::SessionStore;
pub use types::*;
