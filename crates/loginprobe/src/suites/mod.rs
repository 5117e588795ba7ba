//! Test suites shipped with the crate.

pub mod login;

pub use login::{login_suite, SUITE_NAME};
