//! The compiled template artifact and render entry points.

use serde::Serialize;
use serde_json::Value;

use crate::compiler::Compiler;
use crate::context::Frame;
use crate::error::Result;
use crate::segment::Segment;

/// A compiled template, ready to render any number of times.
///
/// Produced by [`Compiler::compile`]. Immutable: one `Template` can be
/// shared across threads and rendered concurrently, since each render call
/// owns its own context stack.
///
/// ```rust
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Invite {
///     name: String,
/// }
///
/// let template = curly::compiler().compile("Dear {{name}},").unwrap();
/// let out = template.render(&Invite { name: "Ada".into() }).unwrap();
/// assert_eq!(out, "Dear Ada,");
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
    compiler: Compiler,
}

impl Template {
    pub(crate) fn new(segments: Vec<Segment>, compiler: Compiler) -> Self {
        Self { segments, compiler }
    }

    /// Renders this template against any serializable data value.
    ///
    /// The data is serialized into a value tree first; structs and maps
    /// become keyed contexts, sequences drive section iteration.
    pub fn render(&self, data: &impl Serialize) -> Result<String> {
        let value = serde_json::to_value(data)?;
        Ok(self.render_value(&value))
    }

    /// Renders against an already-built [`Value`] tree.
    ///
    /// Rendering itself cannot fail: unresolved variables fall back to the
    /// compiler's default value (or empty text), and missing section values
    /// render nothing.
    pub fn render_value(&self, value: &Value) -> String {
        let mut out = String::new();
        self.render_value_to(value, &mut out);
        out
    }

    /// Renders against a [`Value`] tree, appending to an existing buffer.
    pub fn render_value_to(&self, value: &Value, out: &mut String) {
        let root = Frame::root(value);
        for segment in &self.segments {
            segment.render(&self.compiler, &root, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn template_is_send_and_sync() {
        assert_send_sync::<super::Template>();
    }

    #[test]
    fn render_accepts_serializable_structs() {
        #[derive(serde::Serialize)]
        struct Data {
            greeting: String,
            count: u32,
        }

        let template = crate::compiler()
            .compile("{{greeting}} x{{count}}")
            .unwrap();
        let out = template
            .render(&Data {
                greeting: "hi".into(),
                count: 3,
            })
            .unwrap();
        assert_eq!(out, "hi x3");
    }

    #[test]
    fn render_value_to_appends() {
        let template = crate::compiler().compile("{{n}}").unwrap();
        let mut out = String::from("n=");
        template.render_value_to(&json!({ "n": 7 }), &mut out);
        assert_eq!(out, "n=7");
    }

    #[test]
    fn concurrent_renders_share_one_template() {
        let template = std::sync::Arc::new(
            crate::compiler()
                .compile("{{#items}}{{.}}{{/items}}")
                .unwrap(),
        );
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let template = template.clone();
                std::thread::spawn(move || {
                    template.render_value(&json!({ "items": [n, n, n] }))
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let expected = format!("{0}{0}{0}", n);
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
