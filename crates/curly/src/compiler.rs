//! Compiler configuration and the template-source capability.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::error::Result;
use crate::parse;
use crate::template::Template;

/// Maximum partial nesting depth before compilation fails with
/// [`Error::IncludeDepth`](crate::Error::IncludeDepth).
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Supplies the source text of named partials during compilation.
///
/// Partials (`{{>name}}` tags) are resolved eagerly while the including
/// template is compiled, so a fetch failure aborts the enclosing compile.
/// Implementations are provided for `HashMap<String, String>` (in-memory
/// partials) and for closures:
///
/// ```rust
/// use std::collections::HashMap;
///
/// let mut partials = HashMap::new();
/// partials.insert("greeting".to_string(), "Hello {{name}}".to_string());
///
/// let template = curly::compiler()
///     .source(partials)
///     .compile("{{>greeting}}!")
///     .unwrap();
/// ```
pub trait TemplateSource: Send + Sync {
    /// Returns the source text for the template with the given name.
    fn fetch(&self, name: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

impl TemplateSource for HashMap<String, String> {
    fn fetch(&self, name: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| format!("no template named '{}'", name).into())
    }
}

impl<F> TemplateSource for F
where
    F: Fn(&str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
{
    fn fetch(&self, name: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self(name)
    }
}

/// The default source: every fetch fails until a real one is configured.
struct Unconfigured;

impl TemplateSource for Unconfigured {
    fn fetch(&self, _name: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Err("template loading not configured".into())
    }
}

/// Immutable compilation options.
///
/// Obtained from [`compiler()`](crate::compiler). Every setter returns a new
/// `Compiler`, so a shared instance is never mutated:
///
/// ```rust
/// let compiler = curly::compiler()
///     .escape_html(false)
///     .default_value("n/a");
///
/// let template = compiler.compile("{{missing}}").unwrap();
/// assert_eq!(template.render(&()).unwrap(), "n/a");
/// ```
#[derive(Clone)]
pub struct Compiler {
    pub(crate) escape_html: bool,
    pub(crate) standards_mode: bool,
    pub(crate) default_value: Option<String>,
    pub(crate) source: Arc<dyn TemplateSource>,
}

impl Compiler {
    pub(crate) fn new() -> Self {
        Self {
            escape_html: true,
            standards_mode: false,
            default_value: None,
            source: Arc::new(Unconfigured),
        }
    }

    /// Sets whether `{{name}}` variables are HTML-escaped. Defaults to true.
    ///
    /// `{{&name}}` and `{{{name}}}` tags are never escaped regardless.
    pub fn escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    /// Enables or disables standards mode. Defaults to false.
    ///
    /// Standards mode disables the non-standard extension that looks up
    /// names missing from the current section context in enclosing contexts.
    pub fn standards_mode(mut self, standards: bool) -> Self {
        self.standards_mode = standards;
        self
    }

    /// Sets the text substituted for variables that resolve to nothing.
    ///
    /// Without a default, unresolved variables render as empty text.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the source used to fetch partials named by `{{>name}}` tags.
    pub fn source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Compiles the template into a repeatedly renderable [`Template`].
    pub fn compile(&self, source: &str) -> Result<Template> {
        let segments = parse::parse(source, self, 0)?;
        Ok(Template::new(segments, self.clone()))
    }

    /// Compiles a template read from an [`io::Read`](std::io::Read) source.
    pub fn compile_reader(&self, mut source: impl Read) -> Result<Template> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        self.compile(&text)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("escape_html", &self.escape_html)
            .field("standards_mode", &self.standards_mode)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let compiler = Compiler::new();
        assert!(compiler.escape_html);
        assert!(!compiler.standards_mode);
        assert!(compiler.default_value.is_none());
    }

    #[test]
    fn setters_return_new_config() {
        let base = Compiler::new();
        let modified = base.clone().escape_html(false).standards_mode(true);
        assert!(base.escape_html);
        assert!(!modified.escape_html);
        assert!(modified.standards_mode);
    }

    #[test]
    fn unconfigured_source_fails() {
        let err = Unconfigured.fetch("anything").unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn hashmap_source() {
        let mut partials = HashMap::new();
        partials.insert("a".to_string(), "body".to_string());
        assert_eq!(partials.fetch("a").unwrap(), "body");
        assert!(partials.fetch("b").is_err());
    }

    #[test]
    fn closure_source() {
        let source = |name: &str| -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(format!("hello from {}", name))
        };
        assert_eq!(source.fetch("x").unwrap(), "hello from x");
    }

    #[test]
    fn compile_reader_reads_everything() {
        let template = Compiler::new()
            .compile_reader("Hello {{name}}!".as_bytes())
            .unwrap();
        let out = template.render_value(&serde_json::json!({ "name": "world" }));
        assert_eq!(out, "Hello world!");
    }
}
