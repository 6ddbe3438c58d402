//! Boolean converter with configurable literals

use super::{DefaultConverter, TypeConverter, eq_ignore_case, non_blank};
use crate::constants::{DEFAULT_FALSE_LITERAL, DEFAULT_TRUE_LITERAL};

/// Maps two literals to `true` and `false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolConverter {
    true_literal: String,
    false_literal: String,
    case_sensitive: bool,
}

impl BoolConverter {
    /// `"true"` / `"false"`, case-insensitive
    pub fn new() -> Self {
        Self::with_literals(DEFAULT_TRUE_LITERAL, DEFAULT_FALSE_LITERAL, false)
    }

    /// Custom literals such as `"Y"` / `"N"` or `"1"` / `"0"`
    pub fn with_literals(
        true_literal: impl Into<String>,
        false_literal: impl Into<String>,
        case_sensitive: bool,
    ) -> Self {
        Self {
            true_literal: true_literal.into(),
            false_literal: false_literal.into(),
            case_sensitive,
        }
    }

    fn matches(&self, value: &str, literal: &str) -> bool {
        if self.case_sensitive {
            value == literal
        } else {
            eq_ignore_case(value, literal)
        }
    }
}

impl Default for BoolConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeConverter for BoolConverter {
    type Output = bool;

    fn try_convert(&self, value: &str) -> Option<bool> {
        let value = non_blank(value)?;

        if self.matches(value, &self.true_literal) {
            Some(true)
        } else if self.matches(value, &self.false_literal) {
            Some(false)
        } else {
            None
        }
    }
}

impl DefaultConverter for bool {
    type Converter = BoolConverter;

    fn default_converter() -> Self::Converter {
        BoolConverter::new()
    }
}
