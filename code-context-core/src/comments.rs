//! Block comment extraction
//!
//! Locates every `/* ... */` span (doc-style `/** ... */` included) in a
//! text buffer and reports the lines it occupies.
//!
//! Global invariants enforced:
//! - Deterministic extraction (pure function of the text)
//! - One entry per block comment, keyed by its 1-based opening line
//! - An opener without a closer produces no entry
//! - Spans never overlap: scanning resumes after the end of each match

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A resolved block comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSpan {
    /// Line of the `/*` delimiter (1-indexed)
    pub begin: usize,
    /// Line of the `*/` delimiter (1-indexed)
    pub end: usize,
    /// Literal comment text, delimiters included
    pub content: String,
}

fn block_comment_re() -> &'static Regex {
    static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
    BLOCK_RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").unwrap())
}

/// Extract all block comments from `text`
///
/// The returned map is ordered by opening line. When two comments open on the
/// same line only the first one is kept, since the line classifier can emit
/// at most one record per line.
pub fn extract_comments(text: &str) -> BTreeMap<usize, CommentSpan> {
    let mut comments = BTreeMap::new();
    let mut line = 1;
    let mut cursor = 0;

    for m in block_comment_re().find_iter(text) {
        line += count_newlines(&text[cursor..m.start()]);
        let begin = line;
        let end = begin + count_newlines(m.as_str());

        comments.entry(begin).or_insert_with(|| CommentSpan {
            begin,
            end,
            content: m.as_str().to_string(),
        });

        line = end;
        cursor = m.end();
    }

    comments
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}
