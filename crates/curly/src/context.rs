//! Render-time context frames and name resolution.
//!
//! A render call builds a singly-linked stack of [`Frame`]s: one root frame
//! for the caller's data, plus one transient frame per section iteration
//! step (or per "dot into a value" section). Frames live on the call stack
//! for exactly as long as the section body that created them renders.

use std::borrow::Cow;

use serde_json::Value;

/// Where an iteration element sits inside its sequence.
///
/// Exposed to templates through the special variables `-first` and `-last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    First,
    Other,
    Last,
}

/// One level of the render-time context stack.
///
/// `index` is 1-based inside a sequence iteration and 0 everywhere else.
/// The parent link is a plain borrow; frames are never stored beyond the
/// section body that created them.
pub(crate) struct Frame<'a> {
    pub value: &'a Value,
    pub index: usize,
    pub position: Position,
    pub parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    /// The frame a render call starts from.
    pub fn root(value: &'a Value) -> Self {
        Frame {
            value,
            index: 0,
            position: Position::Other,
            parent: None,
        }
    }

    /// Resolves a name against this frame.
    ///
    /// Special names short-circuit: `.` and `this` yield the frame's own
    /// value, `-index`, `-first` and `-last` yield iteration metadata.
    /// Anything else is looked up as a key when the frame's value is an
    /// object; a missing key falls back to the parent chain unless
    /// `standards_mode` is set. `None` means "missing", which is distinct
    /// from a key that is present with a null value.
    pub fn resolve<'f>(&'f self, name: &str, standards_mode: bool) -> Option<Cow<'f, Value>> {
        match name {
            "." | "this" => return Some(Cow::Borrowed(self.value)),
            "-index" => return Some(Cow::Owned(Value::from(self.index as u64))),
            "-first" => return Some(Cow::Owned(Value::Bool(self.position == Position::First))),
            "-last" => return Some(Cow::Owned(Value::Bool(self.position == Position::Last))),
            _ => {}
        }

        let mut frame: Option<&Frame<'_>> = Some(self);
        while let Some(current) = frame {
            if let Value::Object(map) = current.value {
                if let Some(found) = map.get(name) {
                    return Some(Cow::Borrowed(found));
                }
            }
            if standards_mode {
                break;
            }
            frame = current.parent;
        }
        None
    }
}
