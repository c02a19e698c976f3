//! Use cases (application services)

pub mod corroborate;
pub mod evaluate_caa;
pub mod run_perspective_check;
