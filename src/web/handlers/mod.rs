//! Web handlers module
//!
//! Handlers are grouped by audience: `addon` serves media-center clients,
//! the others back the management API.

pub mod addon;
pub mod health;
pub mod history;
pub mod subtitles;
