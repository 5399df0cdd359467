//! Configuration file support for code-context
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.codecontextrc.json` in project root
//! 3. `codecontext.config.json` in project root
//! 4. `"codeContext"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::classifier::ParseOptions;
use crate::context::ContextKind;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when no config is specified
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/*.min.js",
];

/// code-context configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeContextConfig {
    /// Glob patterns for files to include (default: all supported extensions)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude (default: node_modules, dist, build, minified)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Record types to keep (default: all)
    #[serde(default)]
    pub types: Vec<String>,

    /// Attach literal comment text to comment records
    #[serde(default)]
    pub comment_body: Option<bool>,

    /// Treat unterminated block comments as errors
    #[serde(default)]
    pub strict_comments: Option<bool>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Record types to keep (None means keep all)
    pub types: Option<BTreeSet<ContextKind>>,
    /// Options forwarded to the classifier
    pub parse_options: ParseOptions,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl CodeContextConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for name in &self.types {
            name.parse::<ContextKind>()
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("invalid entry in types: {}", name))?;
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        // Defaults apply only when the user gave no excludes
        let exclude = {
            let mut builder = GlobSetBuilder::new();
            if self.exclude.is_empty() {
                for pattern in DEFAULT_EXCLUDES {
                    builder.add(Glob::new(pattern)?);
                }
            } else {
                for pattern in &self.exclude {
                    builder.add(Glob::new(pattern)?);
                }
            }
            builder.build()?
        };

        let types = if self.types.is_empty() {
            None
        } else {
            let kinds = self
                .types
                .iter()
                .map(|name| name.parse::<ContextKind>().map_err(|e| anyhow::anyhow!(e)))
                .collect::<Result<BTreeSet<_>>>()?;
            Some(kinds)
        };

        Ok(ResolvedConfig {
            include,
            exclude,
            types,
            parse_options: ParseOptions {
                include_comment_body: self.comment_body.unwrap_or(false),
                strict_comments: self.strict_comments.unwrap_or(false),
            },
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a file path should be included based on include/exclude patterns
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        // Check exclude first
        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        // If include patterns exist, file must match at least one
        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Check if a record type survives the configured type filter
    pub fn keeps(&self, kind: ContextKind) -> bool {
        self.types.as_ref().map_or(true, |types| types.contains(&kind))
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        CodeContextConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.codecontextrc.json`
/// 2. `codecontext.config.json`
/// 3. `"codeContext"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(CodeContextConfig, PathBuf)>> {
    let rc_path = project_root.join(".codecontextrc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = project_root.join("codecontext.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<CodeContextConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: CodeContextConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load config from the "codeContext" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<CodeContextConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("codeContext") {
        Some(value) => {
            let config: CodeContextConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid codeContext config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid codeContext config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (CodeContextConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = CodeContextConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert!(resolved.include.is_none());
        assert!(resolved.types.is_none());
        assert_eq!(resolved.parse_options, ParseOptions::default());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: CodeContextConfig = serde_json::from_str("{}").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "include": ["src/**/*.js"],
            "exclude": ["src/vendor/**"],
            "types": ["function statement", "prototype-method"],
            "comment_body": true,
            "strict_comments": true
        }"#;
        let config: CodeContextConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        let resolved = config.resolve().unwrap();
        assert!(resolved.include.is_some());
        assert!(resolved.parse_options.include_comment_body);
        assert!(resolved.parse_options.strict_comments);
        assert!(resolved.keeps(ContextKind::FunctionStatement));
        assert!(resolved.keeps(ContextKind::PrototypeMethod));
        assert!(!resolved.keeps(ContextKind::Comment));
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result: Result<CodeContextConfig, _> = serde_json::from_str(r#"{"unknown_field": true}"#);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_unknown_type() {
        let config: CodeContextConfig = serde_json::from_str(r#"{"types": ["class"]}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_invalid_glob_pattern() {
        let config: CodeContextConfig =
            serde_json::from_str(r#"{"include": ["[invalid"]}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_keeps_everything_by_default() {
        let resolved = ResolvedConfig::defaults().unwrap();
        for kind in ContextKind::ALL {
            assert!(resolved.keeps(kind));
        }
    }

    #[test]
    fn test_should_include_default_excludes() {
        let resolved = ResolvedConfig::defaults().unwrap();
        assert!(!resolved.should_include(Path::new("node_modules/pkg/index.js")));
        assert!(!resolved.should_include(Path::new("dist/bundle.js")));
        assert!(!resolved.should_include(Path::new("lib/jquery.min.js")));
        assert!(resolved.should_include(Path::new("src/index.js")));
        assert!(resolved.should_include(Path::new("lib/template.js")));
    }

    #[test]
    fn test_should_include_custom_patterns() {
        let config: CodeContextConfig = serde_json::from_str(
            r#"{
            "include": ["src/**/*.js"],
            "exclude": ["src/generated/**"]
        }"#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();
        assert!(resolved.should_include(Path::new("src/api.js")));
        assert!(!resolved.should_include(Path::new("lib/util.js")));
        assert!(!resolved.should_include(Path::new("src/generated/types.js")));
    }

    #[test]
    fn test_discover_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".codecontextrc.json");
        fs::write(&config_path, r#"{"comment_body": true}"#).unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.comment_body, Some(true));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_config_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("codecontext.config.json"),
            r#"{"types": ["comment"]}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.types, vec!["comment"]);
    }

    #[test]
    fn test_discover_package_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
            "name": "my-project",
            "version": "1.0.0",
            "codeContext": {
                "exclude": ["test/**"],
                "strict_comments": true
            }
        }"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.strict_comments, Some(true));
        assert_eq!(config.exclude, vec!["test/**"]);
    }

    #[test]
    fn test_discover_package_json_without_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "my-project", "version": "1.0.0"}"#,
        )
        .unwrap();

        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();

        // Both present: .codecontextrc.json should win
        fs::write(
            dir.path().join(".codecontextrc.json"),
            r#"{"types": ["method"]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("codecontext.config.json"),
            r#"{"types": ["property"]}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.types,
            vec!["method"],
            ".codecontextrc.json should take priority"
        );
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert!(resolved.config_path.is_none());
        assert!(resolved.types.is_none());
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"types": ["declaration"]}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert!(resolved.keeps(ContextKind::Declaration));
        assert!(!resolved.keeps(ContextKind::Method));
        assert_eq!(resolved.config_path, Some(config_path));
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("broken.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = load_config_file(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }
}
