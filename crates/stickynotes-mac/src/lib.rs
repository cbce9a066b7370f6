//! macOS-specific window defaults for stickynotes.
//!
//! Window chrome differs per platform; the note protocol does not.

#![cfg(target_os = "macos")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

/// Initialize macOS-specific components.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Initializing macOS platform components");
    Ok(())
}

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "macOS"
}

/// Icon bundled for the dock.
#[must_use]
pub fn default_icon() -> &'static str {
    "assets/icon.icns"
}

/// The window server always composites, so transparency is available.
#[must_use]
pub fn supports_transparency() -> bool {
    true
}
