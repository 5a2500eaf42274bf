pub mod config;
pub mod error;
pub mod types;

pub use config::MedibotConfig;
pub use error::{MedibotError, Result};
pub use types::*;
