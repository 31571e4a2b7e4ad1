//! # Curly - Mustache Templating
//!
//! `curly` compiles [Mustache](http://mustache.github.com/) templates into an
//! immutable intermediate form once, then renders that form against any
//! serializable data, any number of times, from any thread.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! let template = curly::compiler().compile("Hello {{arg}}!").unwrap();
//!
//! let mut context = HashMap::new();
//! context.insert("arg", "world");
//! assert_eq!(template.render(&context).unwrap(), "Hello world!");
//! ```
//!
//! Any `serde::Serialize` value works as render data: maps and structs
//! become keyed contexts, sequences drive section iteration.
//!
//! ## Tag Syntax
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | variable, HTML-escaped by default |
//! | `{{&name}}` / `{{{name}}}` | variable, never escaped |
//! | `{{#name}}...{{/name}}` | section: iterated, conditional, or scoped |
//! | `{{^name}}...{{/name}}` | inverted section: rendered when falsy/empty/missing |
//! | `{{>name}}` | partial, fetched and compiled at compile time |
//! | `{{!comment}}` | comment, discarded |
//! | `{{=<% %>=}}` | remap delimiters for the rest of the template |
//!
//! Delimiters may be one or two characters per side. The triple-mustache
//! form `{{{name}}}` is only recognized while delimiters are at their
//! default `{{ }}`.
//!
//! ## Sections
//!
//! A section's behavior follows the kind of value its name resolves to:
//! sequences render the body once per element (with the element as the new
//! context), booleans gate the body, and any other non-null value scopes
//! the body to that value ("dot into" an object). `{{.}}` refers to the
//! current context value itself:
//!
//! ```rust
//! use serde_json::json;
//!
//! let template = curly::compiler()
//!     .compile("{{#items}}{{.}} {{/items}}{{^items}}none{{/items}}")
//!     .unwrap();
//!
//! let data = json!({ "items": ["a", "b"] });
//! assert_eq!(template.render_value(&data), "a b ");
//!
//! let empty = json!({ "items": [] });
//! assert_eq!(template.render_value(&empty), "none");
//! ```
//!
//! Inside an iteration the special variables `-index` (1-based), `-first`
//! and `-last` expose the element's position.
//!
//! ## Name Resolution
//!
//! A name missing from the current section context is looked up in the
//! enclosing contexts, innermost first. This is an extension beyond the
//! Mustache baseline; disable it with
//! [`standards_mode(true)`](Compiler::standards_mode). A variable that
//! resolves to nothing renders as the compiler's
//! [`default_value`](Compiler::default_value), or as empty text when none
//! is configured; it is never a render error.
//!
//! ## Partials
//!
//! `{{>name}}` tags are resolved while the including template compiles,
//! through the [`TemplateSource`] configured on the compiler. A partial
//! renders against the current context's data value as a fresh root, so a
//! partial cannot observe the including iteration's position metadata.
//! Inclusion nests at most [`MAX_INCLUDE_DEPTH`] levels deep; a template
//! that includes itself fails compilation instead of recursing forever.

mod compiler;
mod context;
mod error;
mod parse;
mod segment;
mod template;

pub use compiler::{Compiler, TemplateSource, MAX_INCLUDE_DEPTH};
pub use error::{Error, Result};
pub use template::Template;

/// Returns a compiler with the default configuration: HTML escaping on,
/// standards mode off, no default value, and no partial source.
pub fn compiler() -> Compiler {
    Compiler::new()
}
