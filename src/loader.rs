use crate::error::{SyncError, SyncResult};
use crate::tree::LocaleTree;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;

/// Parse a locale file's content
///
/// The JSON must be an object whose values are strings or further objects:
/// ```json
/// {
///     "common": { "ok": "OK", "cancel": "Cancel" },
///     "title": "121 Portal"
/// }
/// ```
///
/// # Arguments
/// * `content` - Raw JSON text
/// * `origin` - Where the content came from, used in error messages
pub fn parse_locale(content: &str, origin: &str) -> SyncResult<LocaleTree> {
    serde_json::from_str(content).map_err(|e| SyncError::json(origin, e))
}

/// Load a locale tree from a single JSON file
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON, or values other than strings and objects
pub fn load_locale_file(path: &Path) -> SyncResult<LocaleTree> {
    let content = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
    parse_locale(&content, &path.display().to_string())
}

/// Find the target languages in an assets directory
///
/// Scans the directory for `*.json` files; the file stem is the language
/// code (`fr.json` -> `"fr"`). The source language's own file is excluded.
/// Languages are returned sorted so runs are reproducible.
pub fn discover_languages(dir: &Path, source_language: &str) -> SyncResult<Vec<String>> {
    if !dir.is_dir() {
        return Err(SyncError::Config(format!(
            "assets path is not a directory: {}",
            dir.display()
        )));
    }

    let entries = fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))?;

    let mut languages = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SyncError::io(dir, e))?.path();

        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let Some(language) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!("Skipping file with non UTF-8 name: {}", path.display());
            continue;
        };

        if language != source_language {
            languages.push(language.to_string());
        }
    }

    languages.sort();
    Ok(languages)
}

/// Render a tree the way locale files are stored in the repository:
/// sorted keys, 4-space indentation, raw UTF-8 and a trailing newline
pub fn render_locale(tree: &LocaleTree) -> SyncResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut serializer)
        .map_err(|e| SyncError::json("rendered locale", e))?;
    buf.push(b'\n');

    String::from_utf8(buf).map_err(|e| SyncError::Config(format!("rendered non UTF-8 output: {}", e)))
}

/// Write a locale file, replacing the previous content atomically
///
/// The new content goes to a sibling `.tmp` file first and is then renamed
/// over the target, so an interrupted write never leaves a truncated file.
pub fn write_locale_file(path: &Path, tree: &LocaleTree) -> SyncResult<()> {
    let rendered = render_locale(tree)?;
    let tmp_path = path.with_extension("json.tmp");

    fs::write(&tmp_path, rendered).map_err(|e| SyncError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SyncError::io(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discover_languages_excludes_source() {
        let dir = tempdir().unwrap();
        for name in ["en.json", "fr.json", "ar.json", "nl.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let languages = discover_languages(dir.path(), "en").unwrap();
        assert_eq!(languages, vec!["ar", "fr", "nl"]);
    }

    #[test]
    fn test_discover_languages_missing_dir() {
        let dir = tempdir().unwrap();
        let result = discover_languages(&dir.path().join("missing"), "en");
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_render_locale_format() {
        let tree = LocaleTree::new()
            .with_leaf("zz", "Zürich")
            .with_branch("aa", LocaleTree::new().with_leaf("b", "x"));
        let rendered = render_locale(&tree).unwrap();
        assert_eq!(
            rendered,
            "{\n    \"aa\": {\n        \"b\": \"x\"\n    },\n    \"zz\": \"Zürich\"\n}\n"
        );
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fr.json");
        let tree = LocaleTree::new().with_leaf("hello", "bonjour");

        write_locale_file(&path, &tree).unwrap();
        assert_eq!(load_locale_file(&path).unwrap(), tree);
        assert!(!dir.path().join("fr.json.tmp").exists());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fr.json");
        fs::write(&path, r#"{"a": [1, 2]}"#).unwrap();

        match load_locale_file(&path) {
            Err(SyncError::Json { origin, .. }) => assert!(origin.ends_with("fr.json")),
            other => panic!("Expected Json error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_locale_file(&dir.path().join("xx.json"));
        assert!(matches!(result, Err(SyncError::Io { .. })));
    }
}
