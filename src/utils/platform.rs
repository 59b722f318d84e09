//! Platform-specific directories for Linkloader

use std::path::PathBuf;

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/Linkloader
/// - Windows: %APPDATA%\Linkloader
/// - Linux: ~/.config/linkloader
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linkloader")
    }

    #[cfg(not(target_os = "linux"))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Linkloader")
    }
}
