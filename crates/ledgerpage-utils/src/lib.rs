//! Utility functions and helpers

use std::time::Instant;

/// Milliseconds elapsed since `start`, with sub-millisecond precision
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Mask an identifier for log lines, keeping only the first two characters
pub fn mask_identifier(id: &str) -> String {
    let visible: String = id.chars().take(2).collect();
    format!("{}***", visible)
}
