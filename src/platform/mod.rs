//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - The browser host (canvas, listeners, frame loop) on wasm32

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn unix_time_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn unix_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seed for a fresh visit: the configured one, else the clock
pub fn visit_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(unix_time_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_seed_prefers_configured() {
        assert_eq!(visit_seed(Some(42)), 42);
        assert!(visit_seed(None) > 0);
    }
}
