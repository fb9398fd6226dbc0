use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::models::ProjectInfo;
use crate::utils::{decode_project_name, validate_path_not_symlink};

/// Maximum number of projects to process (security: prevent resource exhaustion)
pub const MAX_PROJECTS: usize = 1000;

/// Maximum number of session files per project (security: prevent resource exhaustion)
pub const MAX_SESSION_FILES_PER_PROJECT: usize = 10_000;

/// Display name of the plain transcript directory
pub const TRANSCRIPTS_PROJECT_NAME: &str = "OpenCode Sessions";

/// Discover every project directory holding session logs
///
/// Each directory under `<claude_dir>/projects` with at least one `*.jsonl` file is a
/// project; its name is decoded for display with [`decode_project_name`]. A
/// `<claude_dir>/transcripts` directory with `*.jsonl` files is reported as one more
/// project named [`TRANSCRIPTS_PROJECT_NAME`]. Results are sorted by name.
///
/// # Errors
///
/// Returns an error if:
/// - The projects directory exists but cannot be read
/// - A directory entry cannot be accessed
/// - More than [`MAX_PROJECTS`] projects are found
/// - A project has more than [`MAX_SESSION_FILES_PER_PROJECT`] session files
///
/// Symlinked or unreadable project directories are logged as warnings and skipped.
/// A missing projects directory is not an error.
pub fn discover_projects(claude_dir: &Path) -> Result<Vec<ProjectInfo>> {
    let mut projects = Vec::new();
    let projects_dir = claude_dir.join("projects");

    if projects_dir.is_dir() {
        let entries = fs::read_dir(&projects_dir).with_context(|| {
            format!("Failed to read projects directory: {}", projects_dir.display())
        })?;

        let mut seen = 0;
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if let Err(e) = validate_path_not_symlink(&path) {
                tracing::warn!(path = %path.display(), error = %e, "skipping project directory");
                continue;
            }
            if !path.is_dir() {
                continue;
            }

            let Some(dir_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            seen += 1;
            if seen > MAX_PROJECTS {
                bail!(
                    "Resource limit exceeded: Found more than {} projects. This may indicate a misconfiguration.",
                    MAX_PROJECTS
                );
            }

            let files = match fs::read_dir(&path) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to read project directory"
                    );
                    continue;
                }
            };
            let session_files = collect_session_files(files, &path)?;
            if session_files.is_empty() {
                continue;
            }

            projects.push(ProjectInfo {
                name: decode_project_name(&dir_name),
                project_dir: path,
                session_files,
            });
        }
    }

    let transcripts_dir = claude_dir.join("transcripts");
    if transcripts_dir.is_dir() && validate_path_not_symlink(&transcripts_dir).is_ok() {
        let files = fs::read_dir(&transcripts_dir).with_context(|| {
            format!("Failed to read transcripts directory: {}", transcripts_dir.display())
        })?;
        let session_files = collect_session_files(files, &transcripts_dir)?;
        if !session_files.is_empty() {
            projects.push(ProjectInfo {
                name: TRANSCRIPTS_PROJECT_NAME.to_string(),
                project_dir: transcripts_dir,
                session_files,
            });
        }
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

/// Collect the `*.jsonl` files of one directory, sorted by path
///
/// Symlinked files are skipped with a warning.
pub(crate) fn collect_session_files(entries: ReadDir, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut session_files = Vec::new();

    for entry in entries.flatten() {
        let file_path = entry.path();
        if file_path.extension().is_none_or(|ext| ext != "jsonl") {
            continue;
        }

        if let Err(e) = validate_path_not_symlink(&file_path) {
            tracing::warn!(path = %file_path.display(), error = %e, "skipping session file");
            continue;
        }
        if !file_path.is_file() {
            continue;
        }

        if session_files.len() >= MAX_SESSION_FILES_PER_PROJECT {
            bail!(
                "Resource limit exceeded: {} has more than {} session files",
                dir.display(),
                MAX_SESSION_FILES_PER_PROJECT
            );
        }
        session_files.push(file_path);
    }

    session_files.sort();
    Ok(session_files)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::*;

    /// Helper to create a project directory with the given session files
    fn create_project_dir(projects_dir: &Path, dir_name: &str, session_files: &[&str]) -> PathBuf {
        let project_dir = projects_dir.join(dir_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for filename in session_files {
            fs::write(project_dir.join(filename), "{}\n").expect("Failed to write session file");
        }

        project_dir
    }

    #[test]
    fn test_discover_projects_with_valid_structure() {
        let claude_dir = TempDir::new().unwrap();
        let projects_dir = claude_dir.path().join("projects");

        create_project_dir(&projects_dir, "-Users-test-zeta", &["b.jsonl", "a.jsonl"]);
        create_project_dir(&projects_dir, "-Users-test-alpha", &["c.jsonl"]);

        let projects = discover_projects(claude_dir.path()).unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Users/test/alpha");
        assert_eq!(projects[1].name, "Users/test/zeta");
        assert_eq!(projects[1].session_count(), 2);
        assert!(projects[1].session_files[0].ends_with("a.jsonl"));
        assert_eq!(projects[0].project_dir, projects_dir.join("-Users-test-alpha"));
    }

    #[test]
    fn test_discover_projects_missing_directory() {
        let claude_dir = TempDir::new().unwrap();
        assert!(discover_projects(claude_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_projects_skips_empty_and_non_jsonl() {
        let claude_dir = TempDir::new().unwrap();
        let projects_dir = claude_dir.path().join("projects");

        create_project_dir(&projects_dir, "-empty", &[]);
        create_project_dir(&projects_dir, "-notes", &["readme.txt", "data.json"]);
        create_project_dir(&projects_dir, "-real", &["s.jsonl", "readme.txt"]);
        fs::write(projects_dir.join("stray.jsonl"), "{}").unwrap();

        let projects = discover_projects(claude_dir.path()).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "real");
        assert_eq!(projects[0].session_count(), 1);
    }

    #[test]
    fn test_discover_projects_includes_transcripts() {
        let claude_dir = TempDir::new().unwrap();
        create_project_dir(&claude_dir.path().join("projects"), "-work-app", &["s.jsonl"]);
        create_project_dir(claude_dir.path(), "transcripts", &["t1.jsonl", "t2.jsonl"]);

        let projects = discover_projects(claude_dir.path()).unwrap();
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![TRANSCRIPTS_PROJECT_NAME, "work/app"]);
        assert_eq!(projects[0].session_count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_projects_skips_symlinked_directory() {
        let claude_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        create_project_dir(outside.path(), "target", &["s.jsonl"]);

        let projects_dir = claude_dir.path().join("projects");
        fs::create_dir_all(&projects_dir).unwrap();
        std::os::unix::fs::symlink(outside.path().join("target"), projects_dir.join("-linked"))
            .unwrap();

        assert!(discover_projects(claude_dir.path()).unwrap().is_empty());
    }

    // ===== Security Tests: Resource Limits =====

    #[test]
    fn test_discover_projects_max_projects_limit() {
        let claude_dir = TempDir::new().unwrap();
        let projects_dir = claude_dir.path().join("projects");

        for i in 0..=MAX_PROJECTS {
            fs::create_dir_all(projects_dir.join(format!("-p{}", i))).unwrap();
        }

        let err = discover_projects(claude_dir.path()).unwrap_err();
        assert!(err.to_string().contains("Resource limit exceeded"));
    }
}
