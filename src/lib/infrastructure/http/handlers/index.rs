//! Liveness handler

/// Reports that the API is up
pub async fn handler() -> &'static str {
    "API is running..."
}
