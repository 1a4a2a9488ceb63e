//! Directory walking and exclusion.

use ignore::WalkBuilder;
use std::fs;
use std::path::Path;

use crate::config::FormatConfig;
use crate::document::{FormatError, MarkdownFile};

/// Extension of the documents the formatter picks up
pub const MARKDOWN_EXTENSION: &str = "md";

/// `/`-separated form of `path` relative to `root`.
pub fn to_relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collects the Markdown documents under the configured root.
///
/// Excluded directories are pruned before they are entered, so nothing below
/// them is visited. Results are sorted by relative path.
pub fn find_markdown_files(config: &FormatConfig) -> Result<Vec<MarkdownFile>, FormatError> {
    let root = config.root_dir.as_path();
    let metadata = fs::metadata(root).map_err(|err| FormatError::RootDirectory {
        path: root.to_path_buf(),
        reason: err.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(FormatError::RootDirectory {
            path: root.to_path_buf(),
            reason: "root path is not a directory".to_string(),
        });
    }

    let mut walk_builder = WalkBuilder::new(root);
    walk_builder.standard_filters(false).follow_links(false);

    let prune_root = root.to_path_buf();
    let prune_config = config.clone();
    walk_builder.filter_entry(move |entry| {
        if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return true;
        }
        let rel_path = to_relative_path(&prune_root, entry.path());
        if prune_config.is_excluded(&rel_path) {
            log::debug!("Skipping excluded directory {rel_path}");
            return false;
        }
        true
    });

    let mut files = Vec::new();
    for result in walk_builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Error walking directory: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(MARKDOWN_EXTENSION) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        let rel_path = to_relative_path(root, path);
        files.push(MarkdownFile::new(path.to_path_buf(), rel_path, size));
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    log::debug!("Found {} markdown files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "# Doc\n").unwrap();
    }

    fn found(config: &FormatConfig) -> Vec<String> {
        find_markdown_files(config)
            .unwrap()
            .into_iter()
            .map(|file| file.rel_path)
            .collect()
    }

    #[test]
    fn test_finds_markdown_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "readme.md");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "docs/guide.md");
        touch(dir.path(), "docs/deep/er/page.md");

        assert_eq!(
            found(&FormatConfig::new(dir.path())),
            vec!["docs/deep/er/page.md", "docs/guide.md", "readme.md"]
        );
    }

    #[test]
    fn test_default_exclusions_prune_subtrees() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "readme.md");
        touch(dir.path(), "node_modules/readme.md");
        touch(dir.path(), "node_modules/pkg/docs/readme.md");
        touch(dir.path(), "vendor/lib.md");
        touch(dir.path(), ".git/description.md");

        assert_eq!(found(&FormatConfig::new(dir.path())), vec!["readme.md"]);
    }

    #[test]
    fn test_nested_directory_with_excluded_name_is_kept() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "docs/build/page.md");

        assert_eq!(found(&FormatConfig::new(dir.path())), vec!["docs/build/page.md"]);
    }

    #[test]
    fn test_custom_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "docs/generated/api.md");
        touch(dir.path(), "docs/guide.md");
        touch(dir.path(), "node_modules/readme.md");

        let config = FormatConfig::new(dir.path()).with_exclude_patterns(["docs/generated/"]);
        assert_eq!(found(&config), vec!["docs/guide.md", "node_modules/readme.md"]);
    }

    #[test]
    fn test_records_size() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.md");
        let files = find_markdown_files(&FormatConfig::new(dir.path())).unwrap();
        assert_eq!(files[0].size, 6);
        assert!(files[0].content().is_none());
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = FormatConfig::new(dir.path().join("absent"));
        assert!(matches!(
            find_markdown_files(&config),
            Err(FormatError::RootDirectory { .. })
        ));
    }

    #[test]
    fn test_root_is_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.md");
        let err = find_markdown_files(&FormatConfig::new(dir.path().join("a.md"))).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
