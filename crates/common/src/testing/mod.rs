#![cfg(any(test, feature = "testing"))]

// Testing utilities for unitmock crates
//
// This module provides a catalog of small but realistic types (a mail service,
// a logger interface, an abstract shape, a type with a catch-all handler and a
// type covering every default-value category) to exercise mock synthesis
// against.

pub mod fixtures;

pub use fixtures::*;
