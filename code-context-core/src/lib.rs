//! code-context core library - line-oriented structure extraction for JavaScript source

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Extraction is strictly per-line; only block comments span lines
// - No global mutable state (compiled patterns are immutable once built)
// - No randomness, clocks, or async
// - Deterministic traversal order must be explicit
// - Identical input yields byte-for-byte identical output

pub mod classifier;
pub mod comments;
pub mod config;
pub mod context;
pub mod error;
pub mod report;
pub mod rules;

pub use classifier::{parse_bytes, parse_context, parse_context_with, ParseOptions};
pub use config::ResolvedConfig;
pub use context::{Context, ContextKind};
pub use error::ContextError;
pub use report::{render_json, render_jsonl, render_text, FileContext};

use anyhow::{Context as _, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extract context from a file, or from every supported file under a directory
///
/// Files are visited in sorted path order and extracted in parallel. A file
/// that cannot be read, is not UTF-8, or fails strict comment checking is
/// skipped with a warning.
pub fn extract_path(path: &Path, config: &ResolvedConfig) -> Result<Vec<FileContext>> {
    let source_files: Vec<PathBuf> = collect_source_files(path)?
        .into_iter()
        .filter(|file| config.should_include(relative_to(file, path)))
        .collect();

    debug!(root = %path.display(), files = source_files.len(), "extracting context");

    let results: Vec<(PathBuf, Result<FileContext>)> = source_files
        .into_par_iter()
        .map(|file| {
            let result = extract_file(&file, config);
            (file, result)
        })
        .collect();

    let mut contexts = Vec::with_capacity(results.len());
    let mut skipped_files: usize = 0;
    for (file, result) in results {
        match result {
            Ok(file_context) => contexts.push(file_context),
            Err(e) => {
                warn!("skipping file {}: {:#}", file.display(), e);
                skipped_files += 1;
            }
        }
    }
    if skipped_files > 0 {
        warn!("skipped {} file(s) due to extraction errors", skipped_files);
    }

    Ok(contexts)
}

/// Extract context from one in-memory buffer, applying the configured type filter
pub fn extract_source(
    file: &str,
    text: &str,
    config: &ResolvedConfig,
) -> std::result::Result<FileContext, ContextError> {
    let contexts = parse_context_with(text, &config.parse_options, |ctx, _, _| {
        config.keeps(ctx.kind()).then_some(ctx)
    })?;

    Ok(FileContext {
        file: file.to_string(),
        contexts,
    })
}

fn extract_file(path: &Path, config: &ResolvedConfig) -> Result<FileContext> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = classifier::as_text(&bytes)?;
    Ok(extract_source(&path.display().to_string(), text, config)?)
}

/// Path used for include/exclude matching: relative to the scanned root
fn relative_to<'a>(file: &'a Path, root: &Path) -> &'a Path {
    if root.is_dir() {
        file.strip_prefix(root).unwrap_or(file)
    } else {
        file
    }
}

/// Check if a file is a supported source file
fn is_supported_source_file(filename: &str) -> bool {
    // Skip TypeScript declaration files (.d.ts)
    if filename.ends_with(".d.ts") {
        return false;
    }

    matches!(
        Path::new(filename).extension().and_then(|e| e.to_str()),
        Some("js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx")
    )
}

/// Collect all supported source files from a path (file or directory)
///
/// Supported extensions:
/// - JavaScript: .js, .mjs, .cjs, .jsx
/// - TypeScript: .ts, .mts, .cts, .tsx (excludes .d.ts declaration files)
///
/// An explicitly named file is kept whatever its extension.
fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        collect_source_files_recursive(path, &mut files)?;
    } else {
        anyhow::bail!("path does not exist: {}", path.display());
    }

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || name == "node_modules"
        || name == "dist"
        || name == "build"
        || name == "coverage"
        || name == "target"
}

/// Process one directory entry, pushing source files or recursing into dirs
fn process_dir_entry(
    path: PathBuf,
    metadata: std::fs::Metadata,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    use std::ffi::OsStr;

    if metadata.is_symlink() {
        return Ok(());
    }

    if metadata.is_dir() {
        if let Some(name) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
            if is_skipped_dir(name) {
                return Ok(());
            }
        }
        collect_source_files_recursive(&path, files)?;
    } else if metadata.is_file() {
        if let Some(filename) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
            if is_supported_source_file(filename) {
                files.push(path);
            }
        }
    }

    Ok(())
}

/// Recursively collect supported source files from a directory
fn collect_source_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        process_dir_entry(path, metadata, files)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_source_file("index.js"));
        assert!(is_supported_source_file("module.mjs"));
        assert!(is_supported_source_file("component.tsx"));
        assert!(!is_supported_source_file("types.d.ts"));
        assert!(!is_supported_source_file("README.md"));
        assert!(!is_supported_source_file("Makefile"));
    }

    #[test]
    fn test_skipped_dirs() {
        assert!(is_skipped_dir(".git"));
        assert!(is_skipped_dir("node_modules"));
        assert!(!is_skipped_dir("src"));
    }

    #[test]
    fn test_extract_source_applies_type_filter() {
        let config: config::CodeContextConfig =
            serde_json::from_str(r#"{"types": ["declaration"]}"#).unwrap();
        let resolved = config.resolve().unwrap();
        let result = extract_source(
            "inline.js",
            "/* c */\nvar a = 1;\nfunction b() {}\nvar c = 2;",
            &resolved,
        )
        .unwrap();
        let names: Vec<&str> = result.contexts.iter().filter_map(Context::name).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(result.file, "inline.js");
    }

    #[test]
    fn test_extract_source_strict_comments() {
        let config: config::CodeContextConfig =
            serde_json::from_str(r#"{"strict_comments": true}"#).unwrap();
        let resolved = config.resolve().unwrap();
        let result = extract_source("broken.js", "/* open", &resolved);
        assert_eq!(result, Err(ContextError::MalformedComment { line: 1 }));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let resolved = ResolvedConfig::defaults().unwrap();
        let missing = Path::new("/definitely/not/here/code-context");
        assert!(extract_path(missing, &resolved).is_err());
    }
}
