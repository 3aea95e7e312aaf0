//! Integration-level tests, grouped by subsystem.
//!
//! Symbol names are unique per test: the registry is global and
//! assumptions set on a symbol persist for the process lifetime.

mod differentiation_tests;
mod eval_tests;
mod property_tests;
mod scalar_assumption_tests;
mod scalar_expression_tests;
mod substitution_tests;
mod tensor_expression_tests;
mod tensor_scalar_tests;
mod tensor_space_tests;
