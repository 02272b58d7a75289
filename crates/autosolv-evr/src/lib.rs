//! RPM version primitives
//!
//! This crate provides `epoch:version-release` parsing, the `rpmvercmp`
//! segment ordering and dependency expressions (`name >= 1.0-1`) with RPM
//! range-overlap matching.

mod comparator;
mod dependency;
mod evr;
mod operator;

pub use comparator::rpmvercmp;
pub use dependency::Dependency;
pub use evr::{Evr, EvrError};
pub use operator::{InvalidOperatorError, Operator};
