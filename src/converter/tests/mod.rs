//! Converter test helpers

use super::TypeConverter;

mod boolean_tests;
mod nullable_tests;

/// Assert that every input converts successfully
pub fn assert_all_convert<C: TypeConverter>(converter: &C, inputs: &[&str]) {
    for input in inputs {
        assert!(
            converter.try_convert(input).is_some(),
            "expected {:?} to convert to {}",
            input,
            converter.target_type()
        );
    }
}

/// Assert that every input is rejected
pub fn assert_none_convert<C: TypeConverter>(converter: &C, inputs: &[&str]) {
    for input in inputs {
        assert!(
            converter.try_convert(input).is_none(),
            "expected {:?} to be rejected by {}",
            input,
            converter.target_type()
        );
    }
}
