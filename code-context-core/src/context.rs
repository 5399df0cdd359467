//! Context records
//!
//! One record describes one recognized line. Records serialize with a `type`
//! tag whose spellings ("function statement", "prototype method", ...) are
//! part of the output format.
//!
//! Invariants:
//! - `begin` is the 1-based number of the line that produced the record
//! - `params` is always present, possibly empty
//! - comment records satisfy `end >= begin`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A structural record extracted from one line of source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Context {
    /// `/* ... */` or `/** ... */` spanning lines `begin..=end`
    #[serde(rename = "comment")]
    Comment {
        begin: usize,
        end: usize,
        /// Literal comment text, attached only when requested
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// `function name(a, b)`
    #[serde(rename = "function statement")]
    FunctionStatement {
        begin: usize,
        name: String,
        #[serde(alias = "args")]
        params: Vec<String>,
        string: String,
        original: String,
    },

    /// `var name = function(a, b)` or `module.exports = function name(a, b)`
    #[serde(rename = "function expression")]
    FunctionExpression {
        begin: usize,
        /// Set to `module.exports` for export assignments
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<String>,
        name: String,
        #[serde(alias = "args")]
        params: Vec<String>,
        string: String,
        original: String,
    },

    /// `receiver.name = function(a, b)`
    #[serde(rename = "method")]
    Method {
        begin: usize,
        receiver: String,
        name: String,
        #[serde(alias = "args")]
        params: Vec<String>,
        string: String,
        original: String,
    },

    /// `Class.prototype.name = function(a, b)`
    #[serde(rename = "prototype method")]
    PrototypeMethod {
        begin: usize,
        class: String,
        name: String,
        #[serde(alias = "args")]
        params: Vec<String>,
        string: String,
        original: String,
    },

    /// `receiver.name = value;`
    #[serde(rename = "property")]
    Property {
        begin: usize,
        receiver: String,
        name: String,
        value: String,
        string: String,
        original: String,
    },

    /// `Class.prototype.name = value;`
    #[serde(rename = "prototype property")]
    PrototypeProperty {
        begin: usize,
        class: String,
        name: String,
        value: String,
        string: String,
        original: String,
    },

    /// `var name = value;`
    #[serde(rename = "declaration")]
    Declaration {
        begin: usize,
        name: String,
        value: String,
        string: String,
        original: String,
    },
}

impl Context {
    /// The 1-based line the record was produced from
    pub fn begin(&self) -> usize {
        match self {
            Context::Comment { begin, .. }
            | Context::FunctionStatement { begin, .. }
            | Context::FunctionExpression { begin, .. }
            | Context::Method { begin, .. }
            | Context::PrototypeMethod { begin, .. }
            | Context::Property { begin, .. }
            | Context::PrototypeProperty { begin, .. }
            | Context::Declaration { begin, .. } => *begin,
        }
    }

    pub fn kind(&self) -> ContextKind {
        match self {
            Context::Comment { .. } => ContextKind::Comment,
            Context::FunctionStatement { .. } => ContextKind::FunctionStatement,
            Context::FunctionExpression { .. } => ContextKind::FunctionExpression,
            Context::Method { .. } => ContextKind::Method,
            Context::PrototypeMethod { .. } => ContextKind::PrototypeMethod,
            Context::Property { .. } => ContextKind::Property,
            Context::PrototypeProperty { .. } => ContextKind::PrototypeProperty,
            Context::Declaration { .. } => ContextKind::Declaration,
        }
    }

    /// Extracted name; `None` for comments
    pub fn name(&self) -> Option<&str> {
        match self {
            Context::Comment { .. } => None,
            Context::FunctionStatement { name, .. }
            | Context::FunctionExpression { name, .. }
            | Context::Method { name, .. }
            | Context::PrototypeMethod { name, .. }
            | Context::Property { name, .. }
            | Context::PrototypeProperty { name, .. }
            | Context::Declaration { name, .. } => Some(name),
        }
    }

    /// Mutable access to the name, for callbacks that rewrite records
    pub fn name_mut(&mut self) -> Option<&mut String> {
        match self {
            Context::Comment { .. } => None,
            Context::FunctionStatement { name, .. }
            | Context::FunctionExpression { name, .. }
            | Context::Method { name, .. }
            | Context::PrototypeMethod { name, .. }
            | Context::Property { name, .. }
            | Context::PrototypeProperty { name, .. }
            | Context::Declaration { name, .. } => Some(name),
        }
    }

    /// Parameter identifiers for function-shaped records
    pub fn params(&self) -> Option<&[String]> {
        match self {
            Context::FunctionStatement { params, .. }
            | Context::FunctionExpression { params, .. }
            | Context::Method { params, .. }
            | Context::PrototypeMethod { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Human-readable signature (the `string` field)
    pub fn signature(&self) -> Option<&str> {
        match self {
            Context::Comment { .. } => None,
            Context::FunctionStatement { string, .. }
            | Context::FunctionExpression { string, .. }
            | Context::Method { string, .. }
            | Context::PrototypeMethod { string, .. }
            | Context::Property { string, .. }
            | Context::PrototypeProperty { string, .. }
            | Context::Declaration { string, .. } => Some(string),
        }
    }

    /// The source line the record was built from
    pub fn original(&self) -> Option<&str> {
        match self {
            Context::Comment { .. } => None,
            Context::FunctionStatement { original, .. }
            | Context::FunctionExpression { original, .. }
            | Context::Method { original, .. }
            | Context::PrototypeMethod { original, .. }
            | Context::Property { original, .. }
            | Context::PrototypeProperty { original, .. }
            | Context::Declaration { original, .. } => Some(original),
        }
    }
}

/// Record classification tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    #[serde(rename = "comment")]
    Comment,
    #[serde(rename = "function statement")]
    FunctionStatement,
    #[serde(rename = "function expression")]
    FunctionExpression,
    #[serde(rename = "method")]
    Method,
    #[serde(rename = "prototype method")]
    PrototypeMethod,
    #[serde(rename = "property")]
    Property,
    #[serde(rename = "prototype property")]
    PrototypeProperty,
    #[serde(rename = "declaration")]
    Declaration,
}

impl ContextKind {
    pub const ALL: [ContextKind; 8] = [
        ContextKind::Comment,
        ContextKind::FunctionStatement,
        ContextKind::FunctionExpression,
        ContextKind::Method,
        ContextKind::PrototypeMethod,
        ContextKind::Property,
        ContextKind::PrototypeProperty,
        ContextKind::Declaration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Comment => "comment",
            ContextKind::FunctionStatement => "function statement",
            ContextKind::FunctionExpression => "function expression",
            ContextKind::Method => "method",
            ContextKind::PrototypeMethod => "prototype method",
            ContextKind::Property => "property",
            ContextKind::PrototypeProperty => "prototype property",
            ContextKind::Declaration => "declaration",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextKind {
    type Err = String;

    /// Accepts the canonical spelling as well as `-`/`_` separated forms
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        ContextKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown context type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_method() -> Context {
        Context::PrototypeMethod {
            begin: 3,
            class: "Template".to_string(),
            name: "get".to_string(),
            params: vec!["key".to_string()],
            string: "Template.prototype.get()".to_string(),
            original: "Template.prototype.get = function(key) {".to_string(),
        }
    }

    #[test]
    fn test_serializes_type_tag() {
        let json = serde_json::to_value(sample_method()).unwrap();
        assert_eq!(json["type"], "prototype method");
        assert_eq!(json["class"], "Template");
        assert_eq!(json["params"], serde_json::json!(["key"]));
    }

    #[test]
    fn test_comment_omits_missing_content() {
        let comment = Context::Comment {
            begin: 1,
            end: 4,
            content: None,
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "comment", "begin": 1, "end": 4})
        );
    }

    #[test]
    fn test_function_expression_omits_missing_receiver() {
        let ctx = Context::FunctionExpression {
            begin: 1,
            receiver: None,
            name: "app".to_string(),
            params: vec![],
            string: "app()".to_string(),
            original: "var app = function() {".to_string(),
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("receiver").is_none());
        assert_eq!(json["params"], serde_json::json!([]));
    }

    #[test]
    fn test_deserialize_legacy_args_key() {
        let json = r#"{
            "type": "function statement",
            "begin": 1,
            "name": "app",
            "args": ["a", "b"],
            "string": "app()",
            "original": "function app(a, b) {"
        }"#;
        let ctx: Context = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.params(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn test_accessors() {
        let mut ctx = sample_method();
        assert_eq!(ctx.begin(), 3);
        assert_eq!(ctx.kind(), ContextKind::PrototypeMethod);
        assert_eq!(ctx.name(), Some("get"));
        assert_eq!(ctx.signature(), Some("Template.prototype.get()"));

        if let Some(name) = ctx.name_mut() {
            *name = "foo".to_string();
        }
        assert_eq!(ctx.name(), Some("foo"));
    }

    #[test]
    fn test_kind_from_str_variants() {
        assert_eq!(
            "function statement".parse::<ContextKind>(),
            Ok(ContextKind::FunctionStatement)
        );
        assert_eq!(
            "prototype-method".parse::<ContextKind>(),
            Ok(ContextKind::PrototypeMethod)
        );
        assert_eq!(
            "Prototype_Property".parse::<ContextKind>(),
            Ok(ContextKind::PrototypeProperty)
        );
        assert!("class".parse::<ContextKind>().is_err());
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in ContextKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.to_string()));
        }
    }
}
