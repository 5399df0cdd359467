//! Ordered line rules
//!
//! Each rule pairs an anchored pattern with a projector that turns the
//! pattern's captures into a [`Context`]. Rules are tried in table order and
//! the first match wins, so a more specific shape must sit above every more
//! general shape that would also match it:
//!
//! - `X.prototype.y = ...` also satisfies `receiver.name = ...`
//! - `receiver.name = function(...)` also satisfies `receiver.name = <expr>`
//! - `module.exports = function(...)` also satisfies `receiver.name = function(...)`
//!
//! Patterns run against the line with leading whitespace removed.

use crate::context::Context;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// One input line as seen by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    /// Line text with carriage returns already removed
    pub raw: &'a str,
    /// `raw` with leading whitespace removed
    pub strict: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, raw: &'a str) -> Self {
        Line {
            number,
            raw,
            strict: raw.trim_start(),
        }
    }
}

/// Syntactic shape recognized by a rule, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    CommentOpen,
    FunctionStatement,
    FunctionExpression,
    ExportsNamedFunction,
    ExportsAnonymousFunction,
    PrototypeMethod,
    PrototypeProperty,
    Method,
    Property,
    Declaration,
}

/// Outcome of a successful rule match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matched {
    /// The line opens a block comment; its span must be looked up separately
    CommentOpen,
    Record(Context),
}

type Projector = fn(&Captures<'_>, &Line<'_>) -> Matched;

pub struct Rule {
    pub shape: Shape,
    pattern: Regex,
    project: Projector,
}

impl Rule {
    fn new(shape: Shape, pattern: &str, project: Projector) -> Self {
        Rule {
            shape,
            pattern: Regex::new(pattern).unwrap(),
            project,
        }
    }

    /// Try this rule against a line
    pub fn apply(&self, line: &Line<'_>) -> Option<Matched> {
        let caps = self.pattern.captures(line.strict)?;
        Some((self.project)(&caps, line))
    }
}

/// Trailing part of any function-valued assignment: optional name, optional params
const FUNCTION_TAIL: &str = r"function\b[ \t]*(?:[\w$]+[ \t]*)?(?:\(([^)]*))?";

/// The rule table, in precedence order
pub fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule::new(Shape::CommentOpen, r"^/\*", comment_open),
            Rule::new(
                Shape::FunctionStatement,
                r"^function[ \t]+([\w$]+)[ \t]*\(([^)]*)",
                function_statement,
            ),
            Rule::new(
                Shape::FunctionExpression,
                &format!(r"^var[ \t]+([\w$]+)[ \t]*=[ \t]*{}", FUNCTION_TAIL),
                function_expression,
            ),
            Rule::new(
                Shape::ExportsNamedFunction,
                r"^(module\.exports)[ \t]*=[ \t]*function[ \t]+([\w$]+)[ \t]*(?:\(([^)]*))?",
                exports_named_function,
            ),
            Rule::new(
                Shape::ExportsAnonymousFunction,
                r"^(module\.exports)[ \t]*=[ \t]*function\b[ \t]*(?:\(([^)]*))?",
                exports_anonymous_function,
            ),
            Rule::new(
                Shape::PrototypeMethod,
                &format!(
                    r"^([\w$]+)\.prototype\.([\w$]+)[ \t]*=[ \t]*{}",
                    FUNCTION_TAIL
                ),
                prototype_method,
            ),
            Rule::new(
                Shape::PrototypeProperty,
                r"^([\w$]+)\.prototype\.([\w$]+)[ \t]*=[ \t]*([^\n;]+)",
                prototype_property,
            ),
            Rule::new(
                Shape::Method,
                &format!(r"^([\w$.]+)\.([\w$]+)[ \t]*=[ \t]*{}", FUNCTION_TAIL),
                method,
            ),
            Rule::new(
                Shape::Property,
                r"^([\w$]+)\.([\w$]+)[ \t]*=[ \t]*([^\n;]+)",
                property,
            ),
            Rule::new(
                Shape::Declaration,
                r"^var[ \t]+([\w$]+)[ \t]*=[ \t]*([^\n;]+)",
                declaration,
            ),
        ]
    })
}

/// Run the table against a line; first match wins
pub fn classify_line(line: &Line<'_>) -> Option<Matched> {
    rules().iter().find_map(|rule| rule.apply(line))
}

/// Shape of the first rule matching `line`, if any
pub fn shape_of(line: &Line<'_>) -> Option<Shape> {
    rules()
        .iter()
        .find(|rule| rule.pattern.is_match(line.strict))
        .map(|rule| rule.shape)
}

/// Split a captured parameter list into identifier tokens
///
/// Splits on every non-word character and drops empty pieces. Default values
/// and destructuring patterns are not understood: `{a, b} = {}` yields
/// `["a", "b"]` and `x = 1` yields `["x", "1"]`.
pub fn split_params(list: &str) -> Vec<String> {
    list.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn params(caps: &Captures<'_>, index: usize) -> Vec<String> {
    caps.get(index)
        .map(|m| split_params(m.as_str()))
        .unwrap_or_default()
}

fn comment_open(_caps: &Captures<'_>, _line: &Line<'_>) -> Matched {
    Matched::CommentOpen
}

fn function_statement(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let name = group(caps, 1);
    Matched::Record(Context::FunctionStatement {
        begin: line.number,
        string: format!("{}()", name),
        params: params(caps, 2),
        name,
        original: line.raw.to_string(),
    })
}

fn function_expression(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let name = group(caps, 1);
    Matched::Record(Context::FunctionExpression {
        begin: line.number,
        receiver: None,
        string: format!("{}()", name),
        params: params(caps, 2),
        name,
        original: line.raw.to_string(),
    })
}

fn exports_named_function(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let name = group(caps, 2);
    Matched::Record(Context::FunctionExpression {
        begin: line.number,
        receiver: Some(group(caps, 1)),
        string: format!("{}()", name),
        params: params(caps, 3),
        name,
        original: line.raw.to_string(),
    })
}

fn exports_anonymous_function(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let receiver = group(caps, 1);
    Matched::Record(Context::FunctionExpression {
        begin: line.number,
        string: format!("{}()", receiver),
        receiver: Some(receiver),
        name: String::new(),
        params: params(caps, 2),
        original: line.raw.to_string(),
    })
}

fn prototype_method(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let class = group(caps, 1);
    let name = group(caps, 2);
    Matched::Record(Context::PrototypeMethod {
        begin: line.number,
        string: format!("{}.prototype.{}()", class, name),
        class,
        name,
        params: params(caps, 3),
        original: line.raw.to_string(),
    })
}

fn prototype_property(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let class = group(caps, 1);
    let name = group(caps, 2);
    Matched::Record(Context::PrototypeProperty {
        begin: line.number,
        string: format!("{}.prototype.{}", class, name),
        class,
        name,
        value: group(caps, 3),
        original: line.raw.to_string(),
    })
}

fn method(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let receiver = group(caps, 1);
    let name = group(caps, 2);
    Matched::Record(Context::Method {
        begin: line.number,
        string: format!("{}.{}()", receiver, name),
        receiver,
        name,
        params: params(caps, 3),
        original: line.raw.to_string(),
    })
}

fn property(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    let receiver = group(caps, 1);
    let name = group(caps, 2);
    Matched::Record(Context::Property {
        begin: line.number,
        string: format!("{}.{}", receiver, name),
        receiver,
        name,
        value: group(caps, 3),
        original: line.raw.to_string(),
    })
}

/// Declarations re-capture from the untrimmed line so the initializer is
/// taken from the full text rather than the trimmed view.
fn declaration(caps: &Captures<'_>, line: &Line<'_>) -> Matched {
    static RAW_RE: OnceLock<Regex> = OnceLock::new();
    let raw_re =
        RAW_RE.get_or_init(|| Regex::new(r"var[ \t]+([\w$]+)[ \t]*=[ \t]*([^\n;]+)").unwrap());

    let (name, value) = match raw_re.captures(line.raw) {
        Some(raw) => (group(&raw, 1), group(&raw, 2)),
        None => (group(caps, 1), group(caps, 2)),
    };
    Matched::Record(Context::Declaration {
        begin: line.number,
        string: name.clone(),
        name,
        value,
        original: line.raw.to_string(),
    })
}
