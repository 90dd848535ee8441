//! Typed interpretations of raw entry values.

use std::fmt;

/// A value type that can be read out of an entry.
pub trait FromValue: Sized {
    /// Human readable description used in diagnostics.
    const EXPECTED: &'static str;

    fn from_value(raw: &str) -> Option<Self>;
}

/// Identifier-like string: profile names, tags, room names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(pub String);

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used for case-insensitive comparisons.
    pub fn folded(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alpha(pub u8);

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromValue for Ident {
    const EXPECTED: &'static str = "identifier";

    fn from_value(raw: &str) -> Option<Self> {
        let ok = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        ok.then(|| Ident(raw.to_string()))
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "flag";

    fn from_value(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

fn components<const N: usize>(raw: &str) -> Option<[i64; N]> {
    let mut out = [0i64; N];
    let mut parts = raw.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

impl FromValue for Rgb {
    const EXPECTED: &'static str = "RGB color `r,g,b`";

    fn from_value(raw: &str) -> Option<Self> {
        let [r, g, b] = components::<3>(raw)?;
        Some(Rgb {
            r: u8::try_from(r).ok()?,
            g: u8::try_from(g).ok()?,
            b: u8::try_from(b).ok()?,
        })
    }
}

impl FromValue for Position {
    const EXPECTED: &'static str = "position `x,y`";

    fn from_value(raw: &str) -> Option<Self> {
        let [x, y] = components::<2>(raw)?;
        Some(Position {
            x: i32::try_from(x).ok()?,
            y: i32::try_from(y).ok()?,
        })
    }
}

impl FromValue for Alpha {
    const EXPECTED: &'static str = "alpha value 0-255";

    fn from_value(raw: &str) -> Option<Self> {
        let v: i64 = raw.parse().ok()?;
        u8::try_from(v).ok().map(Alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_reject_spaces() {
        assert_eq!(Ident::from_value("door_01"), Some(Ident("door_01".into())));
        assert_eq!(Ident::from_value("two words"), None);
        assert_eq!(Ident::from_value(""), None);
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(bool::from_value("Yes"), Some(true));
        assert_eq!(bool::from_value("0"), Some(false));
        assert_eq!(bool::from_value("maybe"), None);
    }

    #[test]
    fn colors_and_positions() {
        assert_eq!(
            Rgb::from_value("10, 20,30"),
            Some(Rgb { r: 10, g: 20, b: 30 })
        );
        assert_eq!(Rgb::from_value("10,20,300"), None);
        assert_eq!(Rgb::from_value("10,20"), None);
        assert_eq!(Position::from_value("-4,7"), Some(Position { x: -4, y: 7 }));
        assert_eq!(Alpha::from_value("256"), None);
    }
}
