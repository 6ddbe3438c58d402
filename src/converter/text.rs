//! Text-shaped converters: strings, single characters and UUIDs

use uuid::Uuid;

use super::{DefaultConverter, TypeConverter, non_blank};

/// Identity converter
///
/// Never fails. An absent value becomes an empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringConverter;

impl StringConverter {
    pub fn new() -> Self {
        Self
    }
}

impl TypeConverter for StringConverter {
    type Output = String;

    fn try_convert(&self, value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn try_convert_opt(&self, value: Option<&str>) -> Option<String> {
        Some(value.unwrap_or_default().to_string())
    }
}

/// Accepts exactly one character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharConverter;

impl CharConverter {
    pub fn new() -> Self {
        Self
    }
}

impl TypeConverter for CharConverter {
    type Output = char;

    fn try_convert(&self, value: &str) -> Option<char> {
        let mut chars = non_blank(value)?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// Textual UUID layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidLayout {
    /// `67e55044-10b1-426f-9247-bb680e5fe0c8`
    Hyphenated,
    /// `67e5504410b1426f9247bb680e5fe0c8`
    Simple,
    /// `{67e55044-10b1-426f-9247-bb680e5fe0c8}`
    Braced,
    /// `urn:uuid:67e55044-10b1-426f-9247-bb680e5fe0c8`
    Urn,
}

impl UuidLayout {
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Hyphenated => value.len() == 36 && value.as_bytes()[8] == b'-',
            Self::Simple => value.len() == 32 && !value.contains('-'),
            Self::Braced => value.starts_with('{') && value.ends_with('}'),
            Self::Urn => value.len() > 9 && value[..9].eq_ignore_ascii_case("urn:uuid:"),
        }
    }
}

/// Converter for UUIDs, optionally restricted to one layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UuidConverter {
    layout: Option<UuidLayout>,
}

impl UuidConverter {
    /// Accept any layout the `uuid` crate can parse
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only `layout`
    pub fn with_layout(layout: UuidLayout) -> Self {
        Self {
            layout: Some(layout),
        }
    }
}

impl TypeConverter for UuidConverter {
    type Output = Uuid;

    fn try_convert(&self, value: &str) -> Option<Uuid> {
        let value = non_blank(value)?.trim();

        if let Some(layout) = self.layout {
            if !value.is_ascii() || !layout.matches(value) {
                return None;
            }
        }
        Uuid::parse_str(value).ok()
    }
}

impl DefaultConverter for String {
    type Converter = StringConverter;

    fn default_converter() -> Self::Converter {
        StringConverter
    }
}

impl DefaultConverter for char {
    type Converter = CharConverter;

    fn default_converter() -> Self::Converter {
        CharConverter
    }
}

impl DefaultConverter for Uuid {
    type Converter = UuidConverter;

    fn default_converter() -> Self::Converter {
        UuidConverter::new()
    }
}
