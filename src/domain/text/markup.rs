//! Markup deserialization into rich text
//!
//! `MarkupProvider` is the seam; `TagMarkup` is the built-in provider for the
//! `<tag>text</tag>` syntax used by stored templates.

use thiserror::Error;

use super::component::{Component, Decoration, NamedColor, Style, TextColor};

/// Markup that could not be turned into rich text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("closing tag </{found}> matches no open tag (innermost: {expected:?})")]
    UnbalancedClose {
        expected: Option<String>,
        found: String,
    },

    #[error("invalid color: {0}")]
    InvalidColor(String),
}

/// Turns a markup string into a rich text tree.
pub trait MarkupProvider: Send + Sync {
    fn deserialize(&self, input: &str) -> Result<Component, MarkupError>;
}

/// Built-in tag markup.
///
/// Known tags: the named colors, `#rrggbb`, decorations (`bold`/`b`,
/// `italic`/`i`/`em`, `underlined`/`underline`/`u`, `strikethrough`/`st`,
/// `obfuscated`/`obf`), `reset`, and `newline`/`br`. Unknown tags are kept
/// verbatim as text, as is a `<` that never reaches a `>`. `\<` produces a
/// literal `<`. Closing an outer tag also closes every tag opened inside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagMarkup;

impl TagMarkup {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupProvider for TagMarkup {
    fn deserialize(&self, input: &str) -> Result<Component, MarkupError> {
        let mut builder = TreeBuilder::new();
        let mut chars = input.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\\' if matches!(chars.peek(), Some((_, '<'))) => {
                    chars.next();
                    builder.buffer.push('<');
                }
                '<' => {
                    let rest = &input[idx + 1..];
                    match tag_extent(rest) {
                        TagExtent::Tag(len) => {
                            builder.handle_tag(&rest[..len])?;
                            // Skip the tag body and the closing '>'
                            let skip = rest[..len].chars().count() + 1;
                            for _ in 0..skip {
                                chars.next();
                            }
                        }
                        TagExtent::Literal => builder.buffer.push('<'),
                    }
                }
                _ => builder.buffer.push(ch),
            }
        }

        Ok(builder.finish())
    }
}

enum TagExtent {
    /// Byte length of the tag body (between '<' and '>')
    Tag(usize),
    Literal,
}

fn tag_extent(rest: &str) -> TagExtent {
    let starts_tag = rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '#' | '_'));
    if !starts_tag {
        return TagExtent::Literal;
    }

    for (i, c) in rest.char_indices() {
        match c {
            '>' => return TagExtent::Tag(i),
            '<' => return TagExtent::Literal,
            c if c.is_whitespace() => return TagExtent::Literal,
            _ => {}
        }
    }

    TagExtent::Literal
}

enum TagKind {
    Style { style: Style, name: String },
    Reset,
    Newline,
}

fn resolve(name: &str) -> Result<Option<TagKind>, MarkupError> {
    let decoration = match name {
        "reset" => return Ok(Some(TagKind::Reset)),
        "newline" | "br" => return Ok(Some(TagKind::Newline)),
        "bold" | "b" => Some((Decoration::Bold, "bold")),
        "italic" | "i" | "em" => Some((Decoration::Italic, "italic")),
        "underlined" | "underline" | "u" => Some((Decoration::Underlined, "underlined")),
        "strikethrough" | "st" => Some((Decoration::Strikethrough, "strikethrough")),
        "obfuscated" | "obf" => Some((Decoration::Obfuscated, "obfuscated")),
        _ => None,
    };

    if let Some((decoration, canonical)) = decoration {
        return Ok(Some(TagKind::Style {
            style: Style::decorated(decoration),
            name: canonical.to_string(),
        }));
    }

    if let Some(color) = NamedColor::from_name(name) {
        return Ok(Some(TagKind::Style {
            style: Style::color(TextColor::Named(color)),
            name: color.name().to_string(),
        }));
    }

    if name.starts_with('#') {
        let color =
            TextColor::from_hex(name).ok_or_else(|| MarkupError::InvalidColor(name.to_string()))?;
        return Ok(Some(TagKind::Style {
            style: Style::color(color),
            name: name.to_string(),
        }));
    }

    Ok(None)
}

struct Frame {
    tag: String,
    component: Component,
}

struct TreeBuilder {
    stack: Vec<Frame>,
    buffer: String,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                tag: String::new(),
                component: Component::empty(),
            }],
            buffer: String::new(),
        }
    }

    fn handle_tag(&mut self, raw: &str) -> Result<(), MarkupError> {
        if let Some(name) = raw.strip_prefix('/') {
            let lower = name.to_ascii_lowercase();
            return match resolve(&lower)? {
                Some(TagKind::Style { name, .. }) => self.close(&name),
                // </reset> and </newline> carry no meaning
                Some(_) => Ok(()),
                None => {
                    self.push_literal(raw);
                    Ok(())
                }
            };
        }

        match resolve(&raw.to_ascii_lowercase())? {
            Some(TagKind::Style { style, name }) => {
                self.flush();
                self.stack.push(Frame {
                    tag: name,
                    component: Component::styled("", style),
                });
            }
            Some(TagKind::Reset) => {
                self.flush();
                while self.stack.len() > 1 {
                    self.pop_frame();
                }
            }
            Some(TagKind::Newline) => self.buffer.push('\n'),
            None => self.push_literal(raw),
        }

        Ok(())
    }

    fn push_literal(&mut self, raw: &str) {
        self.buffer.push('<');
        self.buffer.push_str(raw);
        self.buffer.push('>');
    }

    /// Close the innermost frame opened by `name`, along with any frames
    /// opened after it.
    fn close(&mut self, name: &str) -> Result<(), MarkupError> {
        // Index 0 is the root frame and never matches
        let Some(depth) = self.stack.iter().skip(1).rposition(|frame| frame.tag == name) else {
            let expected = (self.stack.len() > 1)
                .then(|| self.stack[self.stack.len() - 1].tag.clone());
            return Err(MarkupError::UnbalancedClose {
                expected,
                found: name.to_string(),
            });
        };

        self.flush();
        while self.stack.len() > depth + 1 {
            self.pop_frame();
        }
        Ok(())
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        if let Some(top) = self.stack.last_mut() {
            top.component.children.push(Component::text(text));
        }
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if frame.component.children.is_empty() {
                return;
            }
            if let Some(parent) = self.stack.last_mut() {
                parent.component.children.push(frame.component);
            }
        }
    }

    fn finish(mut self) -> Component {
        self.flush();
        while self.stack.len() > 1 {
            self.pop_frame();
        }

        let mut root = self
            .stack
            .pop()
            .map(|frame| frame.component)
            .unwrap_or_default();

        if root.children.len() == 1 {
            root.children.remove(0)
        } else {
            root
        }
    }
}
