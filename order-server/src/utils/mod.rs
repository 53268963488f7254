//! Utility Module

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse, ok};
pub use result::AppResult;
