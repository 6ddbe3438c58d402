//! Enum converter
//!
//! Enums opt in by implementing [`CsvEnum`], usually through the
//! [`csv_enum!`](crate::csv_enum) macro. The variant table is checked when the
//! converter is built, so a table that cannot be matched unambiguously is a
//! configuration error instead of a conversion-time surprise.

use std::fmt;
use std::marker::PhantomData;

use super::{TypeConverter, eq_ignore_case, non_blank};
use crate::{Error, Result};

/// Fieldless enum with a table of textual variant names
pub trait CsvEnum: Copy + Send + Sync + 'static {
    /// Every variant with the literal that selects it
    fn variants() -> &'static [(&'static str, Self)];
}

/// Implement [`CsvEnum`] for a fieldless enum using the variant identifiers
/// as literals
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum SkyCondition { Clr, Few, Sct, Bkn, Ovc }
///
/// csvmap::csv_enum!(SkyCondition { Clr, Few, Sct, Bkn, Ovc });
/// ```
#[macro_export]
macro_rules! csv_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::converter::CsvEnum for $ty {
            fn variants() -> &'static [(&'static str, Self)] {
                &[$((stringify!($variant), $ty::$variant)),+]
            }
        }
    };
}

/// Converts variant names into enum values
pub struct EnumConverter<E> {
    ignore_case: bool,
    _target: PhantomData<fn() -> E>,
}

impl<E: CsvEnum> EnumConverter<E> {
    /// Build a converter, validating the variant table
    ///
    /// Fails when the table is empty or two names collide under the chosen
    /// comparison (for example `Ok` and `OK` with `ignore_case`).
    pub fn new(ignore_case: bool) -> Result<Self> {
        let variants = E::variants();
        let type_name = std::any::type_name::<E>();

        if variants.is_empty() {
            return Err(Error::configuration(format!(
                "Enum converter for {} has no variants",
                type_name
            )));
        }

        for (i, (name, _)) in variants.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(Error::configuration(format!(
                    "Enum converter for {} has a blank variant name",
                    type_name
                )));
            }

            let collides = variants[i + 1..].iter().any(|(other, _)| {
                if ignore_case {
                    eq_ignore_case(name, other)
                } else {
                    name == other
                }
            });
            if collides {
                return Err(Error::configuration(format!(
                    "Enum converter for {} has ambiguous variant name '{}'",
                    type_name, name
                )));
            }
        }

        Ok(Self {
            ignore_case,
            _target: PhantomData,
        })
    }

    /// Case-insensitive converter
    pub fn case_insensitive() -> Result<Self> {
        Self::new(true)
    }

    /// Case-sensitive converter
    pub fn case_sensitive() -> Result<Self> {
        Self::new(false)
    }
}

impl<E> Clone for EnumConverter<E> {
    fn clone(&self) -> Self {
        Self {
            ignore_case: self.ignore_case,
            _target: PhantomData,
        }
    }
}

impl<E> fmt::Debug for EnumConverter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumConverter")
            .field("target", &std::any::type_name::<E>())
            .field("ignore_case", &self.ignore_case)
            .finish()
    }
}

impl<E: CsvEnum> TypeConverter for EnumConverter<E> {
    type Output = E;

    fn try_convert(&self, value: &str) -> Option<E> {
        let value = non_blank(value)?;

        E::variants()
            .iter()
            .find(|(name, _)| {
                if self.ignore_case {
                    eq_ignore_case(name, value)
                } else {
                    *name == value
                }
            })
            .map(|(_, variant)| *variant)
    }
}
