//! Rich text tree produced by markup deserialization

use std::fmt;

use serde::{Deserialize, Serialize};

/// The sixteen named chat colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::DarkBlue,
        NamedColor::DarkGreen,
        NamedColor::DarkAqua,
        NamedColor::DarkRed,
        NamedColor::DarkPurple,
        NamedColor::Gold,
        NamedColor::Gray,
        NamedColor::DarkGray,
        NamedColor::Blue,
        NamedColor::Green,
        NamedColor::Aqua,
        NamedColor::Red,
        NamedColor::LightPurple,
        NamedColor::Yellow,
        NamedColor::White,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedColor::Black => "black",
            NamedColor::DarkBlue => "dark_blue",
            NamedColor::DarkGreen => "dark_green",
            NamedColor::DarkAqua => "dark_aqua",
            NamedColor::DarkRed => "dark_red",
            NamedColor::DarkPurple => "dark_purple",
            NamedColor::Gold => "gold",
            NamedColor::Gray => "gray",
            NamedColor::DarkGray => "dark_gray",
            NamedColor::Blue => "blue",
            NamedColor::Green => "green",
            NamedColor::Aqua => "aqua",
            NamedColor::Red => "red",
            NamedColor::LightPurple => "light_purple",
            NamedColor::Yellow => "yellow",
            NamedColor::White => "white",
        }
    }

    /// Look up a color by name, accepting the `grey` spellings
    pub fn from_name(name: &str) -> Option<Self> {
        let name = match name {
            "grey" => "gray",
            "dark_grey" => "dark_gray",
            other => other,
        };
        Self::ALL.into_iter().find(|color| color.name() == name)
    }
}

/// A text color, either named or `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TextColor {
    Named(NamedColor),
    Hex(u32),
}

impl TextColor {
    /// Parse `#rrggbb`
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(TextColor::Hex)
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextColor::Named(color) => f.write_str(color.name()),
            TextColor::Hex(rgb) => write!(f, "#{:06x}", rgb),
        }
    }
}

impl From<TextColor> for String {
    fn from(color: TextColor) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for TextColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NamedColor::from_name(&value)
            .map(TextColor::Named)
            .or_else(|| TextColor::from_hex(&value))
            .ok_or_else(|| format!("unknown color: {}", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoration {
    Bold,
    Italic,
    Underlined,
    Strikethrough,
    Obfuscated,
}

/// Style of a component. `None` inherits from the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlined: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscated: Option<bool>,
}

impl Style {
    pub fn color(color: TextColor) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn decorated(decoration: Decoration) -> Self {
        let mut style = Self::default();
        style.set(decoration, true);
        style
    }

    pub fn set(&mut self, decoration: Decoration, value: bool) {
        let slot = match decoration {
            Decoration::Bold => &mut self.bold,
            Decoration::Italic => &mut self.italic,
            Decoration::Underlined => &mut self.underlined,
            Decoration::Strikethrough => &mut self.strikethrough,
            Decoration::Obfuscated => &mut self.obfuscated,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// Resolve `child` against this style; values set on the child win.
    pub fn merge(&self, child: &Style) -> Style {
        Style {
            color: child.color.or(self.color),
            bold: child.bold.or(self.bold),
            italic: child.italic.or(self.italic),
            underlined: child.underlined.or(self.underlined),
            strikethrough: child.strikethrough.or(self.strikethrough),
            obfuscated: child.obfuscated.or(self.obfuscated),
        }
    }
}

/// A node of rich text: its own content, a style, and children that
/// inherit that style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "text", default)]
    pub content: String,
    #[serde(flatten)]
    pub style: Style,
    #[serde(rename = "extra", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Component>,
}

impl Component {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Self {
            content: content.into(),
            style,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn append(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    /// Concatenated content of this node and its descendants, depth-first.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        out.push_str(&self.content);
        for child in &self.children {
            child.write_plain(out);
        }
    }

    /// Replace every literal occurrence of `literal` with `replacement`.
    ///
    /// Matching is done per node against its own content, so a literal split
    /// across two nodes is not found. Each match becomes a child holding a
    /// copy of `replacement`; surrounding text stays under this node's style.
    pub fn replace_text(&self, literal: &str, replacement: &Component) -> Component {
        if literal.is_empty() {
            return self.clone();
        }

        let mut children = Vec::with_capacity(self.children.len());
        let content = if self.content.contains(literal) {
            let mut parts = self.content.split(literal);
            let head = parts.next().unwrap_or_default().to_string();
            for part in parts {
                children.push(replacement.clone());
                if !part.is_empty() {
                    children.push(Component::text(part));
                }
            }
            head
        } else {
            self.content.clone()
        };

        children.extend(
            self.children
                .iter()
                .map(|child| child.replace_text(literal, replacement)),
        );

        Component {
            content,
            style: self.style.clone(),
            children,
        }
    }

    /// Find the first node (depth-first) whose own content equals `content`,
    /// returning it with its effective style.
    pub fn find_text(&self, content: &str) -> Option<(&Component, Style)> {
        self.find_with(content, &Style::default())
    }

    fn find_with(&self, content: &str, inherited: &Style) -> Option<(&Component, Style)> {
        let effective = inherited.merge(&self.style);
        if self.content == content {
            return Some((self, effective));
        }
        self.children
            .iter()
            .find_map(|child| child.find_with(content, &effective))
    }
}

impl From<&str> for Component {
    fn from(content: &str) -> Self {
        Component::text(content)
    }
}

impl From<String> for Component {
    fn from(content: String) -> Self {
        Component::text(content)
    }
}
