//! Test support for mqctl: a mock messaging client that records every
//! call so contract tests can assert exactly what the handlers invoked.

pub mod mocks;

pub use mocks::{Call, MockMessagingClient};
