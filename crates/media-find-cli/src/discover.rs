//! Extension-based file discovery

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Recursively collect the files under `root` whose extension matches one
/// of `extensions` (case-insensitive, no leading dot). Unreadable entries
/// are logged and skipped. The result is sorted for a deterministic probe
/// order.
pub fn discover_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let extensions: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e == &ext.to_lowercase()))
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_discovers_matching_extensions_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("season1");
        fs::create_dir(&nested).unwrap();

        touch(&dir.path().join("movie.mkv"));
        touch(&dir.path().join("clip.MP4"));
        touch(&dir.path().join("notes.txt"));
        touch(&nested.join("episode.mkv"));

        let files = discover_files(dir.path(), &["mkv".to_string(), "mp4".to_string()]);

        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("clip.MP4"),
                PathBuf::from("movie.mkv"),
                PathBuf::from("season1/episode.mkv"),
            ]
        );
    }

    #[test]
    fn test_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"));

        assert!(discover_files(dir.path(), &["mkv".to_string()]).is_empty());
    }
}
