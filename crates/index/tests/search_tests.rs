//! Search behavior per parameter type.

mod common;
mod search;
