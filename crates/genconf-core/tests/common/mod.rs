//! Common test utilities for genconf-core
//!
//! Document builders and assertion helpers shared by the integration tests.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod builders;

pub use assertions::*;
pub use builders::*;
