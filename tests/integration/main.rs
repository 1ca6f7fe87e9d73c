//! Integration test binary -- all host integration tests consolidated into a
//! single binary.

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

mod cli;
mod dataset_search;
mod error_recovery;
