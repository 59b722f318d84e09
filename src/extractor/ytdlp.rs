//! yt-dlp wrapper for catalog queries
//!
//! This module drives yt-dlp for the three invocations a query needs.
//! It supports an explicitly configured binary, a bundled yt-dlp (next to the
//! executable or in a macOS .app bundle) and system-installed yt-dlp.

use crate::extractor::models::ToolOutput;
use crate::extractor::traits::MediaTool;
use crate::utils::error::ToolError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// yt-dlp backed [`MediaTool`]
#[derive(Debug, Clone)]
pub struct YtDlpTool {
    ytdlp_path: PathBuf,
}

impl YtDlpTool {
    /// Locate yt-dlp and verify it exists
    ///
    /// Search order:
    /// 1. Configured path
    /// 2. Bundled yt-dlp
    /// 3. System PATH
    /// 4. Common installation paths
    pub fn new(configured: Option<&Path>) -> Result<Self, ToolError> {
        match locate_ytdlp(configured) {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                Ok(Self::with_path(path))
            }
            None => {
                error!("yt-dlp not found anywhere!");
                Err(ToolError::NotFound)
            }
        }
    }

    /// Use the given binary without any lookup
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: path.into(),
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    async fn run(&self, args: &[&str], url: &str) -> Result<ToolOutput, ToolError> {
        debug!("Running {} {:?} {}", self.ytdlp_path.display(), args, url);

        // The URL goes after "--" so it is never read as an option
        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--no-warnings")
            .args(args)
            .arg("--")
            .arg(url)
            .output()
            .await?;

        let output = ToolOutput::from(output);
        if !output.is_success() {
            warn!(
                "yt-dlp exited with {:?}: {}",
                output.code,
                output.stderr.trim()
            );
        }
        Ok(output)
    }
}

#[async_trait]
impl MediaTool for YtDlpTool {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    /// Uses: yt-dlp --print title --print description --print thumbnail
    async fn fetch_metadata_fields(&self, url: &str) -> Result<ToolOutput, ToolError> {
        self.run(
            &[
                // Keep the description on a single line
                "--replace-in-metadata",
                "description",
                r"\s+",
                " ",
                "--print",
                "title",
                "--print",
                "description",
                "--print",
                "thumbnail",
            ],
            url,
        )
        .await
    }

    /// Uses: yt-dlp -F
    async fn list_formats(&self, url: &str) -> Result<ToolOutput, ToolError> {
        self.run(&["-F"], url).await
    }

    /// Uses: yt-dlp -f {format_id} -g
    async fn resolve_link(&self, url: &str, format_id: &str) -> Result<ToolOutput, ToolError> {
        self.run(&["-f", format_id, "-g"], url).await
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Configured path
/// 2. Bundled (next to the executable or inside .app bundle)
/// 3. System PATH
/// 4. Common installation paths
pub fn locate_ytdlp(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if let Some(path) = executable_file(path) {
            return Some(path);
        }
        warn!("Configured yt-dlp is not an executable file: {:?}", path);
    }

    if let Some(bundled) = find_bundled_ytdlp() {
        info!("✓ Using bundled yt-dlp: {:?}", bundled);
        return Some(bundled);
    }

    if let Some(system) = find_in_path() {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

fn binary_name() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    }
}

/// Find bundled yt-dlp next to the executable or inside a macOS .app bundle
fn find_bundled_ytdlp() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    // Structure: Linkloader.app/Contents/MacOS/linkloader
    //                                  /Resources/bin/yt-dlp
    if exe_dir.ends_with("MacOS") {
        let contents_dir = exe_dir.parent()?;
        let ytdlp_path = contents_dir
            .join("Resources")
            .join("bin")
            .join(binary_name());

        debug!("Checking bundled path: {:?}", ytdlp_path);

        if ytdlp_path.is_file() && is_executable(&ytdlp_path) {
            return Some(ytdlp_path);
        }
    }

    let dev_path = exe_dir.join(binary_name());
    if dev_path.is_file() && is_executable(&dev_path) {
        return Some(dev_path);
    }

    None
}

fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|path| path.exists())
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/Library/Frameworks/Python.framework/Versions/Current/bin/yt-dlp",
        // pip --user
        "~/.local/bin/yt-dlp",
    ];

    common_paths
        .iter()
        .find_map(|path_str| executable_file(&expand_home(path_str)))
}

fn expand_home(path_str: &str) -> PathBuf {
    match (path_str.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path_str),
    }
}

/// The path itself if it names an executable regular file
fn executable_file(path: &Path) -> Option<PathBuf> {
    (path.is_file() && is_executable(path)).then(|| path.to_path_buf())
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_executable_file_needs_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yt-dlp");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(executable_file(&path), None);

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(executable_file(&path), Some(path.clone()));

        // Directories never qualify, whatever their mode
        assert_eq!(executable_file(dir.path()), None);
        assert_eq!(executable_file(Path::new("/definitely/not/here")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_configured_path_wins() {
        let path = Path::new("/bin/sh");
        if path.exists() {
            assert_eq!(locate_ytdlp(Some(path)), Some(path.to_path_buf()));
        }
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.local/bin/yt-dlp"), home.join(".local/bin/yt-dlp"));
        }
        assert_eq!(expand_home("/usr/bin/yt-dlp"), PathBuf::from("/usr/bin/yt-dlp"));
    }

    #[test]
    fn test_is_executable() {
        let path = PathBuf::from("/bin/ls");
        if path.exists() {
            assert!(is_executable(&path));
        }
        assert!(!is_executable(Path::new("/definitely/not/here")));
    }

    // /bin/echo stands in for yt-dlp and prints the argv it was given
    #[cfg(unix)]
    #[tokio::test]
    async fn test_argument_layout() {
        if !Path::new("/bin/echo").exists() {
            return;
        }
        let tool = YtDlpTool::with_path("/bin/echo");

        let out = tool.list_formats("https://example.com/v").await.unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout.trim(), "--no-warnings -F -- https://example.com/v");

        let out = tool
            .resolve_link("https://example.com/v", "137")
            .await
            .unwrap();
        assert_eq!(
            out.stdout.trim(),
            "--no-warnings -f 137 -g -- https://example.com/v"
        );

        let out = tool
            .fetch_metadata_fields("https://example.com/v")
            .await
            .unwrap();
        assert!(out
            .stdout
            .contains("--print title --print description --print thumbnail -- https://example.com/v"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        if !Path::new("/bin/false").exists() {
            return;
        }
        let tool = YtDlpTool::with_path("/bin/false");
        let out = tool.list_formats("https://example.com/v").await.unwrap();
        assert!(!out.is_success());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let tool = YtDlpTool::with_path("/definitely/not/here/yt-dlp");
        let err = tool.list_formats("https://example.com/v").await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn(_)));
    }
}
