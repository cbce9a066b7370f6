//! Linux-specific window defaults for stickynotes.

#![cfg(target_os = "linux")]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::env;

/// Initialize Linux-specific components
///
/// # Errors
///
/// Returns an error if initialization fails
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if !supports_transparency() {
        tracing::warn!("No Wayland or X11 display detected; notes will be drawn opaque");
    }
    Ok(())
}

/// Get platform name
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

/// Icon used for note and manager windows
#[must_use]
pub fn default_icon() -> &'static str {
    "assets/icon.png"
}

/// Transparent windows need a compositing display server.
///
/// Any Wayland session composites; under X11 we assume a compositor is
/// running since every mainstream desktop ships one.
#[must_use]
pub fn supports_transparency() -> bool {
    env::var_os("WAYLAND_DISPLAY").is_some() || env::var_os("DISPLAY").is_some()
}
