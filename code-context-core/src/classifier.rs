//! Line classifier
//!
//! Single forward pass over the input lines. Block comment spans are resolved
//! once up front, so a comment opener is completed by a lookup instead of by
//! stitching neighbouring records together afterwards.
//!
//! Global invariants enforced:
//! - Records are emitted in strictly increasing `begin` order
//! - A line yields at most one record
//! - Identical input yields identical output
//! - No state survives the call

use crate::comments::{extract_comments, CommentSpan};
use crate::context::Context;
use crate::error::ContextError;
use crate::rules::{classify_line, Line, Matched};
use std::collections::BTreeMap;
use tracing::debug;

/// Knobs for a single parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach the literal comment text to comment records
    pub include_comment_body: bool,
    /// Fail with `MalformedComment` instead of skipping an unterminated opener
    pub strict_comments: bool,
}

/// Extract context records from `text` with default options
pub fn parse_context(text: &str) -> Vec<Context> {
    // Lenient parsing has no failure path
    parse_context_with(text, &ParseOptions::default(), |ctx, _, _| Some(ctx))
        .unwrap_or_default()
}

/// Extract context records, passing each candidate through `on_each`
///
/// `on_each` receives the candidate record, the number of records emitted so
/// far, and every line of the input. Returning `None` drops the candidate;
/// returning `Some` keeps the (possibly rewritten) record.
pub fn parse_context_with<F>(
    text: &str,
    options: &ParseOptions,
    mut on_each: F,
) -> Result<Vec<Context>, ContextError>
where
    F: FnMut(Context, usize, &[&str]) -> Option<Context>,
{
    let normalized = text.replace('\r', "");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let comments = extract_comments(&normalized);
    let mut contexts = Vec::new();

    for (index, raw) in lines.iter().enumerate() {
        let line = Line::new(index + 1, raw);

        let candidate = match classify_line(&line) {
            None => continue,
            Some(Matched::Record(ctx)) => ctx,
            Some(Matched::CommentOpen) => match comments.get(&line.number) {
                Some(span) => comment_record(span, options),
                None if inside_comment(&comments, line.number) => continue,
                None if options.strict_comments => {
                    return Err(ContextError::MalformedComment { line: line.number });
                }
                None => {
                    debug!(line = line.number, "skipping unterminated block comment");
                    continue;
                }
            },
        };

        if let Some(ctx) = on_each(candidate, contexts.len(), &lines) {
            contexts.push(ctx);
        }
    }

    debug!(
        lines = lines.len(),
        comments = comments.len(),
        records = contexts.len(),
        "classified source"
    );

    Ok(contexts)
}

/// Extract context records from raw bytes
///
/// Fails with `InvalidArgument` when the bytes are not UTF-8 text.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Vec<Context>, ContextError> {
    parse_context_with(as_text(bytes)?, options, |ctx, _, _| Some(ctx))
}

/// View `bytes` as text, or fail with `InvalidArgument`
pub fn as_text(bytes: &[u8]) -> Result<&str, ContextError> {
    std::str::from_utf8(bytes)
        .map_err(|e| ContextError::InvalidArgument(format!("expected UTF-8 text: {}", e)))
}

fn comment_record(span: &CommentSpan, options: &ParseOptions) -> Context {
    Context::Comment {
        begin: span.begin,
        end: span.end,
        content: options
            .include_comment_body
            .then(|| span.content.clone()),
    }
}

/// True when `line` falls in the body of a span that opened on an earlier line
fn inside_comment(comments: &BTreeMap<usize, CommentSpan>, line: usize) -> bool {
    comments
        .range(..line)
        .next_back()
        .is_some_and(|(_, span)| span.end >= line)
}
