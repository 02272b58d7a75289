// Package model for RPM packages and advisories
//
// Packages are immutable apart from the dependency edits the resolver makes
// (dropping a requirement, clearing conflicts, dropping an obsoletes entry).

mod advisory;
mod convert;
mod package;

pub use advisory::{Advisory, CollectionEntry, Reference};
pub use convert::{AdvisoryData, CollectionData, PackageData};
pub use package::{Package, PackageKind};
