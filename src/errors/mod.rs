//! Centralized error handling for the subtitle companion service
//!
//! # Error Categories
//!
//! - **Provider Errors**: metadata lookups that timed out, failed or returned
//!   unusable payloads. Recovered by the resolver, never surfaced.
//! - **Store Errors**: snapshot and subtitle file persistence
//! - **Web Errors**: upload and request validation
//!
//! ```rust
//! use subtitle_companion::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("identifier must not be empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for provider lookups
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Convenience type alias for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;
