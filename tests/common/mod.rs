//! Common test utilities for infratest integration tests.
//!
//! This module provides:
//! - `MockRunner`: scripted terraform runner with invocation counting
//! - `lab`: the S3 bucket lab scenario (expected names, options builder)

#![allow(dead_code)]

pub mod lab;
pub mod mock;

pub use lab::*;
pub use mock::*;
