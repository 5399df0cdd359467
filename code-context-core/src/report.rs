//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Files appear in the order given (callers sort by path)
//! - Records keep scan order within a file
//! - Byte-for-byte identical output across runs

use crate::context::Context;
use serde::{Deserialize, Serialize};

/// Widest value shown in text output before truncation
const TEXT_VALUE_WIDTH: usize = 60;

/// Context records extracted from one source buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub file: String,
    pub contexts: Vec<Context>,
}

/// Render results as a text table per file
pub fn render_text(files: &[FileContext]) -> String {
    let mut output = String::new();

    for file in files {
        output.push_str(&format!("{}\n", file.file));

        if file.contexts.is_empty() {
            output.push_str("  (no context)\n");
            continue;
        }

        output.push_str(&format!("  {:<6} {:<20} {}\n", "LINE", "TYPE", "SIGNATURE"));
        for ctx in &file.contexts {
            output.push_str(&format!(
                "  {:<6} {:<20} {}\n",
                ctx.begin(),
                ctx.kind().as_str(),
                describe(ctx)
            ));
        }
    }

    output
}

/// Render results as pretty-printed JSON
pub fn render_json(files: &[FileContext]) -> String {
    serde_json::to_string_pretty(files).unwrap_or_else(|_| "[]".to_string())
}

/// Render results as JSON Lines, one record per line with a `file` key
pub fn render_jsonl(files: &[FileContext]) -> String {
    let mut output = String::new();

    for file in files {
        for ctx in &file.contexts {
            let mut value = match serde_json::to_value(ctx) {
                Ok(value) => value,
                Err(_) => continue,
            };
            if let serde_json::Value::Object(map) = &mut value {
                map.insert(
                    "file".to_string(),
                    serde_json::Value::String(file.file.clone()),
                );
            }
            output.push_str(&value.to_string());
            output.push('\n');
        }
    }

    output
}

fn describe(ctx: &Context) -> String {
    match ctx {
        Context::Comment { begin, end, .. } => format!("lines {}-{}", begin, end),
        Context::Property { string, value, .. }
        | Context::PrototypeProperty { string, value, .. }
        | Context::Declaration { string, value, .. } => {
            format!("{} = {}", string, truncate(value.trim_end(), TEXT_VALUE_WIDTH))
        }
        other => other.signature().unwrap_or_default().to_string(),
    }
}

/// Truncate to `width` characters, marking the cut with `...`
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
