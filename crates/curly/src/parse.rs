//! The one-pass, character-driven template parser.
//!
//! A single forward pass over the source converts text plus the live
//! delimiter state into a segment tree. Nested sections are handled by an
//! explicit stack of open-section levels; the delimiter state is local to
//! the pass and never outlives it.

use crate::compiler::{Compiler, MAX_INCLUDE_DEPTH};
use crate::error::{Error, Result};
use crate::segment::Segment;
use crate::template::Template;

/// Parser states. The `Matching*` states exist only for two-character
/// delimiters: the first character is consumed tentatively, and flushed
/// back as literal text if the second does not follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    MatchingStart,
    Tag,
    MatchingEnd,
}

/// The current open/close tag markers, one or two characters each.
///
/// Mutated only by `{{=X Y=}}` directives during the pass; compiled
/// segments carry no trace of the delimiters they were parsed under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Delims {
    start1: char,
    start2: Option<char>,
    end1: char,
    end2: Option<char>,
}

impl Delims {
    fn standard() -> Self {
        Delims {
            start1: '{',
            start2: Some('{'),
            end1: '}',
            end2: Some('}'),
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::standard()
    }

    /// Applies a `{{=X Y=}}` directive body (the text between the `=` signs).
    fn update(&mut self, directive: &str, line: usize) -> Result<()> {
        let invalid = || {
            Error::parse(
                format!(
                    "invalid delimiter configuration '{}', expected two \
                     whitespace-separated delimiters of one or two characters",
                    directive
                ),
                line,
            )
        };

        let mut tokens = directive.split_whitespace();
        let (Some(start), Some(end), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(invalid());
        };
        let (start1, start2) = split_delim(start).ok_or_else(invalid)?;
        let (end1, end2) = split_delim(end).ok_or_else(invalid)?;

        self.start1 = start1;
        self.start2 = start2;
        self.end1 = end1;
        self.end2 = end2;
        Ok(())
    }
}

fn split_delim(token: &str) -> Option<(char, Option<char>)> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let second = chars.next();
    if chars.next().is_some() {
        return None;
    }
    Some((first, second))
}

/// One open section awaiting its close tag.
struct OpenLevel {
    name: String,
    line: usize,
    inverted: bool,
    segments: Vec<Segment>,
}

/// The segment list currently being accumulated into.
fn top<'a>(root: &'a mut Vec<Segment>, stack: &'a mut [OpenLevel]) -> &'a mut Vec<Segment> {
    match stack.last_mut() {
        Some(level) => &mut level.segments,
        None => root,
    }
}

fn last_is_compound(segments: &[Segment]) -> bool {
    matches!(
        segments.last(),
        Some(Segment::Section { .. } | Segment::Inverted { .. })
    )
}

/// Whether the newline immediately following the tag just processed should
/// be swallowed. True right after a section open (the level is still empty)
/// and right after a section close (the last emitted segment is compound).
fn skip_after_tag(root: &[Segment], stack: &[OpenLevel]) -> bool {
    match stack.last() {
        Some(level) => level.segments.is_empty() || last_is_compound(&level.segments),
        None => last_is_compound(root),
    }
}

fn flush_text(root: &mut Vec<Segment>, stack: &mut [OpenLevel], text: &mut String) {
    if !text.is_empty() {
        top(root, stack).push(Segment::Text(std::mem::take(text)));
    }
}

/// Rejects a tag whose text still contains the start-delimiter sequence,
/// the usual symptom of a missing close delimiter.
fn sanity_check_tag(tag: &str, line: usize, delims: &Delims) -> Result<()> {
    let chars: Vec<char> = tag.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c != delims.start1 {
            continue;
        }
        let full_match = match delims.start2 {
            None => true,
            Some(second) => chars.get(i + 1) == Some(&second),
        };
        if full_match {
            return Err(Error::parse(
                format!(
                    "tag contains start tag delimiter, probably missing close delimiter '{}'",
                    tag
                ),
                line,
            ));
        }
    }
    Ok(())
}

fn require_no_newlines(tag: &str, line: usize) -> Result<()> {
    if tag.contains('\n') || tag.contains('\r') {
        return Err(Error::parse(
            format!("invalid tag name, contains newline '{}'", tag.escape_default()),
            line,
        ));
    }
    Ok(())
}

/// Strips the surrounding `=` signs from a delimiter directive tag.
fn delim_directive(tag: &str, line: usize) -> Result<&str> {
    // caller guarantees the leading '='
    if tag.len() < 2 || !tag.ends_with('=') {
        return Err(Error::parse(
            format!("invalid delimiter configuration '{}', expected '=X Y='", tag),
            line,
        ));
    }
    Ok(&tag[1..tag.len() - 1])
}

/// Classifies one tag by its leading sigil and emits the matching segment.
fn add_tag(
    root: &mut Vec<Segment>,
    stack: &mut Vec<OpenLevel>,
    compiler: &Compiler,
    depth: usize,
    raw: &str,
    line: usize,
) -> Result<()> {
    let tag = raw.trim();
    let Some(sigil) = tag.chars().next() else {
        // an empty tag resolves nothing and renders nothing
        top(root, stack).push(Segment::Variable {
            name: String::new(),
            escape_html: compiler.escape_html,
        });
        return Ok(());
    };
    let name = tag[sigil.len_utf8()..].trim().to_string();

    match sigil {
        '#' | '^' => {
            require_no_newlines(tag, line)?;
            stack.push(OpenLevel {
                name,
                line,
                inverted: sigil == '^',
                segments: Vec::new(),
            });
        }
        '/' => {
            require_no_newlines(tag, line)?;
            let Some(level) = stack.pop() else {
                return Err(Error::parse(
                    format!("section close tag with no open tag '{}'", name),
                    line,
                ));
            };
            if level.name != name {
                return Err(Error::parse(
                    format!(
                        "section close tag with mismatched open tag '{}' != '{}'",
                        name, level.name
                    ),
                    line,
                ));
            }
            let segment = if level.inverted {
                Segment::Inverted {
                    name,
                    body: level.segments,
                }
            } else {
                Segment::Section {
                    name,
                    body: level.segments,
                }
            };
            top(root, stack).push(segment);
        }
        '>' => {
            if depth >= MAX_INCLUDE_DEPTH {
                return Err(Error::IncludeDepth {
                    name,
                    limit: MAX_INCLUDE_DEPTH,
                });
            }
            let partial = compiler.source.fetch(&name).map_err(|source| Error::Load {
                name: name.clone(),
                source,
            })?;
            let segments = parse(&partial, compiler, depth + 1)?;
            top(root, stack).push(Segment::Include(Template::new(segments, compiler.clone())));
        }
        '!' => {} // comment, nothing emitted
        '&' => {
            require_no_newlines(tag, line)?;
            top(root, stack).push(Segment::Variable {
                name,
                escape_html: false,
            });
        }
        _ => {
            require_no_newlines(tag, line)?;
            top(root, stack).push(Segment::Variable {
                name: tag.to_string(),
                escape_html: compiler.escape_html,
            });
        }
    }
    Ok(())
}

/// Compiles template source into a segment tree.
///
/// `depth` counts partial nesting; the top-level compile passes 0.
pub(crate) fn parse(source: &str, compiler: &Compiler, depth: usize) -> Result<Vec<Segment>> {
    let mut root: Vec<Segment> = Vec::new();
    let mut stack: Vec<OpenLevel> = Vec::new();
    let mut delims = Delims::standard();
    let mut state = State::Text;
    let mut text = String::new();
    let mut line = 1usize;
    let mut skip_newline = false;
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            if skip_newline {
                skip_newline = false;
                continue;
            }
        } else {
            skip_newline = false;
        }

        match state {
            State::Text => {
                if c == delims.start1 {
                    if delims.start2.is_none() {
                        flush_text(&mut root, &mut stack, &mut text);
                        state = State::Tag;
                    } else {
                        state = State::MatchingStart;
                    }
                } else {
                    text.push(c);
                }
            }

            State::MatchingStart => {
                if Some(c) == delims.start2 {
                    flush_text(&mut root, &mut stack, &mut text);
                    state = State::Tag;
                } else {
                    text.push(delims.start1);
                    if c != delims.start1 {
                        text.push(c);
                        state = State::Text;
                    }
                }
            }

            State::Tag => {
                if c == delims.end1 {
                    if delims.end2.is_none() {
                        if text.starts_with('=') {
                            let directive = delim_directive(&text, line)?.to_string();
                            delims.update(&directive, line)?;
                            text.clear();
                        } else {
                            sanity_check_tag(&text, line, &delims)?;
                            let tag = std::mem::take(&mut text);
                            add_tag(&mut root, &mut stack, compiler, depth, &tag, line)?;
                            skip_newline = skip_after_tag(&root, &stack);
                        }
                        state = State::Text;
                    } else {
                        state = State::MatchingEnd;
                    }
                } else {
                    text.push(c);
                }
            }

            State::MatchingEnd => {
                if Some(c) == delims.end2 {
                    if text.starts_with('=') {
                        let directive = delim_directive(&text, line)?.to_string();
                        delims.update(&directive, line)?;
                        text.clear();
                    } else {
                        // with default delimiters, {{{name must close with }}}
                        // and is rewritten into the equivalent {{&name
                        if delims.is_default() && text.starts_with('{') {
                            if chars.next() != Some('}') {
                                let shown = format!("{}{}{}", "{{{", text, "}}");
                                return Err(Error::parse(
                                    format!("invalid triple-mustache tag '{}'", shown),
                                    line,
                                ));
                            }
                            text.replace_range(0..1, "&");
                        }
                        sanity_check_tag(&text, line, &delims)?;
                        let tag = std::mem::take(&mut text);
                        add_tag(&mut root, &mut stack, compiler, depth, &tag, line)?;
                        skip_newline = skip_after_tag(&root, &stack);
                    }
                    state = State::Text;
                } else {
                    text.push(delims.end1);
                    if c != delims.end1 {
                        text.push(c);
                        state = State::Tag;
                    }
                }
            }
        }
    }

    match state {
        State::Text => flush_text(&mut root, &mut stack, &mut text),
        State::MatchingStart => {
            text.push(delims.start1);
            flush_text(&mut root, &mut stack, &mut text);
        }
        State::MatchingEnd => {
            text.push(delims.end1);
            flush_text(&mut root, &mut stack, &mut text);
        }
        State::Tag => {
            return Err(Error::parse(
                format!("template ended while parsing a tag '{}'", text),
                line,
            ));
        }
    }

    if let Some(level) = stack.last() {
        let kind = if level.inverted { "inverted section" } else { "section" };
        return Err(Error::parse(
            format!("{} '{}' missing close tag", kind, level.name),
            level.line,
        ));
    }

    Ok(root)
}
