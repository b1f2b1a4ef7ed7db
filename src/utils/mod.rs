//! Shared helpers

pub mod http_client;

pub use http_client::StandardHttpClient;

/// Remove trailing slashes so paths can be appended with `format!`
pub fn trim_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
