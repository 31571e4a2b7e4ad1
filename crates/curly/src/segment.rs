//! The compiled segment (AST) model and its render interpreter.

use serde_json::Value;

use crate::compiler::Compiler;
use crate::context::{Frame, Position};
use crate::template::Template;

/// One node of a compiled template.
///
/// Segments are immutable once built and delimiter-agnostic: the delimiters
/// in force when a tag was parsed leave no trace here. Comments never make
/// it into the tree.
#[derive(Debug, Clone)]
pub(crate) enum Segment {
    /// Literal text, written verbatim.
    Text(String),
    /// `{{name}}` or `{{&name}}`; the escape flag is fixed at parse time.
    Variable { name: String, escape_html: bool },
    /// `{{#name}}...{{/name}}`.
    Section { name: String, body: Vec<Segment> },
    /// `{{^name}}...{{/name}}`.
    Inverted { name: String, body: Vec<Segment> },
    /// `{{>name}}`, resolved and compiled eagerly at parse time.
    Include(Template),
}

impl Segment {
    pub(crate) fn render(&self, compiler: &Compiler, frame: &Frame<'_>, out: &mut String) {
        match self {
            Segment::Text(text) => out.push_str(text),

            Segment::Variable { name, escape_html } => {
                let text = match frame.resolve(name, compiler.standards_mode) {
                    Some(value) => stringify(&value),
                    None => match &compiler.default_value {
                        Some(default) => default.clone(),
                        None => return,
                    },
                };
                if *escape_html {
                    out.push_str(&escape_html_text(&text));
                } else {
                    out.push_str(&text);
                }
            }

            Segment::Section { name, body } => {
                let Some(value) = frame.resolve(name, compiler.standards_mode) else {
                    return;
                };
                match value.as_ref() {
                    Value::Null => {}
                    Value::Array(items) => {
                        let last = items.len().saturating_sub(1);
                        for (i, item) in items.iter().enumerate() {
                            let position = if i == 0 {
                                Position::First
                            } else if i == last {
                                Position::Last
                            } else {
                                Position::Other
                            };
                            let child = Frame {
                                value: item,
                                index: i + 1,
                                position,
                                parent: Some(frame),
                            };
                            for seg in body {
                                seg.render(compiler, &child, out);
                            }
                        }
                    }
                    Value::Bool(truthy) => {
                        if *truthy {
                            for seg in body {
                                seg.render(compiler, frame, out);
                            }
                        }
                    }
                    other => {
                        // "dot into" the value: one pass with it as context
                        let child = Frame {
                            value: other,
                            index: 0,
                            position: Position::Other,
                            parent: Some(frame),
                        };
                        for seg in body {
                            seg.render(compiler, &child, out);
                        }
                    }
                }
            }

            Segment::Inverted { name, body } => {
                let falsy = match frame.resolve(name, compiler.standards_mode) {
                    None => true,
                    Some(value) => match value.as_ref() {
                        Value::Null | Value::Bool(false) => true,
                        Value::Array(items) => items.is_empty(),
                        _ => false,
                    },
                };
                if falsy {
                    for seg in body {
                        seg.render(compiler, frame, out);
                    }
                }
            }

            Segment::Include(template) => template.render_value_to(frame.value, out),
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        // numbers, booleans, arrays and objects display as compact JSON
        other => other.to_string(),
    }
}

/// Replacements applied inside HTML output. Order matters: ampersands are
/// escaped first so the entities inserted by later rows survive intact.
const HTML_ESCAPES: [(&str, &str); 5] = [
    ("&", "&amp;"),
    ("'", "&apos;"),
    ("\"", "&quot;"),
    ("<", "&lt;"),
    (">", "&gt;"),
];

pub(crate) fn escape_html_text(text: &str) -> String {
    let mut escaped = text.to_string();
    for (from, to) in HTML_ESCAPES {
        escaped = escaped.replace(from, to);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_table_order_avoids_double_escaping() {
        assert_eq!(escape_html_text("<a>&"), "&lt;a&gt;&amp;");
        assert_eq!(escape_html_text("a&amp;b"), "a&amp;amp;b");
        assert_eq!(escape_html_text(r#"'"'"#), "&apos;&quot;&apos;");
        assert_eq!(escape_html_text("plain"), "plain");
    }

    #[test]
    fn stringify_value_kinds() {
        assert_eq!(stringify(&json!(null)), "");
        assert_eq!(stringify(&json!("text")), "text");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!([1, 2])), "[1,2]");
    }
}
