use std::borrow::Cow;
use std::env;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Decodes a project directory name into a display name
///
/// Project directories are named after the working directory with every `/` replaced by
/// `-`. The mapping is lossy (a literal `-` in the original path also becomes `/`), so
/// the result is only used for display.
///
/// # Examples
///
/// ```
/// use transcript_lens::utils::decode_project_name;
///
/// assert_eq!(decode_project_name("-Users-alice-code-app"), "Users/alice/code/app");
/// ```
pub fn decode_project_name(dir_name: &str) -> String {
    dir_name.replace('-', "/").trim_start_matches('/').to_string()
}

/// Rejects paths that are symbolic links
///
/// Uses `symlink_metadata` so the link itself is inspected, not its target.
pub fn validate_path_not_symlink(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

    if metadata.file_type().is_symlink() {
        bail!("Symlinks are not allowed: {}", path.display());
    }

    Ok(())
}

/// Validates that a file's size is within `max_bytes`
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and subsequent file operations.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than `max_bytes`
pub fn validate_file_size(file: &File, path: &Path, max_bytes: u64) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > max_bytes {
        bail!("File too large: {} ({} bytes, max {} bytes)", path.display(), file_size, max_bytes);
    }

    Ok(())
}

/// Opens a log file for reading after rejecting symlinks and oversized files
pub fn safe_open_file(path: &Path, max_bytes: u64) -> Result<File> {
    validate_path_not_symlink(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;

    let file = File::open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    validate_file_size(&file, path, max_bytes)?;

    Ok(file)
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use transcript_lens::utils::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/.claude/projects");
/// // Returns "~/.claude/projects" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
