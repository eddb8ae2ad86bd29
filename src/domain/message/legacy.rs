//! Legacy `&`-code translation into markup tags

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Marker character that starts a legacy code
pub const LEGACY_MARKER: char = '&';

lazy_static! {
    /// Legacy code to markup tag. Built once; readers never lock.
    static ref LEGACY_CODES: HashMap<char, &'static str> = HashMap::from([
        ('0', "<black>"),
        ('1', "<dark_blue>"),
        ('2', "<dark_green>"),
        ('3', "<dark_aqua>"),
        ('4', "<dark_red>"),
        ('5', "<dark_purple>"),
        ('6', "<gold>"),
        ('7', "<gray>"),
        ('8', "<dark_gray>"),
        ('9', "<blue>"),
        ('a', "<green>"),
        ('b', "<aqua>"),
        ('c', "<red>"),
        ('d', "<light_purple>"),
        ('e', "<yellow>"),
        ('f', "<white>"),
        ('k', "<obfuscated>"),
        ('l', "<bold>"),
        ('m', "<strikethrough>"),
        ('n', "<underline>"),
        ('o', "<italic>"),
        ('r', "<reset>"),
    ]);
}

/// Whether `content` contains the legacy marker at all
pub fn contains_legacy(content: &str) -> bool {
    content.contains(LEGACY_MARKER)
}

/// Replace every `&<code>` with its markup tag. Codes are case-sensitive and
/// any other `&` is left alone.
pub fn translate(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == LEGACY_MARKER {
            if let Some(tag) = chars.peek().and_then(|code| LEGACY_CODES.get(code)) {
                out.push_str(tag);
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }

    out
}
