//! Shared utilities

pub mod error;
pub mod format;

pub use error::{AppError, AppResult};
pub use format::format_time;
