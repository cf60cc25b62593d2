//! Search tests grouped by parameter type and composition.

pub mod composition_tests;
pub mod date_tests;
pub mod number_tests;
pub mod reference_tests;
pub mod string_tests;
pub mod token_tests;
