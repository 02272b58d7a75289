//! Repository file records and their conversion into [`Package`].

use autosolv_evr::{Dependency, Evr};
use serde::{Deserialize, Serialize};

use super::{Advisory, CollectionEntry, Package, Reference};
use crate::error::{Result, SolvError};

/// A package record as stored in a repository file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PackageData {
    pub name: String,
    pub evr: String,
    #[serde(default = "default_arch")]
    pub arch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub buildtime: i64,
    #[serde(default, rename = "size")]
    pub install_size: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obsoletes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// An advisory record as stored in a repository file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdvisoryData {
    pub id: String,
    #[serde(default = "default_advisory_evr")]
    pub evr: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub buildtime: i64,
    #[serde(default)]
    pub reboot_suggested: bool,
    #[serde(default)]
    pub collection: Vec<CollectionData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CollectionData {
    pub name: String,
    pub evr: String,
    #[serde(default = "default_arch")]
    pub arch: String,
}

fn default_arch() -> String {
    "noarch".to_string()
}

fn default_advisory_evr() -> String {
    "1".to_string()
}

fn parse_deps(entries: &[String]) -> Result<Vec<Dependency>> {
    entries
        .iter()
        .map(|e| Dependency::parse(e).map_err(SolvError::from))
        .collect()
}

impl TryFrom<&PackageData> for Package {
    type Error = SolvError;

    fn try_from(data: &PackageData) -> Result<Self> {
        let mut pkg = Package::new(&data.name, Evr::parse(&data.evr)?, &data.arch);
        pkg.summary = data.summary.clone();
        pkg.buildtime = data.buildtime;
        pkg.install_size = data.install_size;
        pkg.requires = parse_deps(&data.requires)?;
        pkg.provides = parse_deps(&data.provides)?;
        pkg.conflicts = parse_deps(&data.conflicts)?;
        pkg.obsoletes = parse_deps(&data.obsoletes)?;
        pkg.files = data.files.clone();
        Ok(pkg)
    }
}

impl TryFrom<&AdvisoryData> for Package {
    type Error = SolvError;

    fn try_from(data: &AdvisoryData) -> Result<Self> {
        let collection = data
            .collection
            .iter()
            .map(|c| {
                Ok(CollectionEntry {
                    name: c.name.clone(),
                    evr: Evr::parse(&c.evr)?,
                    arch: c.arch.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let advisory = Advisory {
            category: data.category.clone(),
            severity: data.severity.clone(),
            reboot_suggested: data.reboot_suggested,
            collection,
            references: data.references.clone(),
        };

        let name = if data.id.starts_with("patch:") {
            data.id.clone()
        } else {
            format!("patch:{}", data.id)
        };

        let mut pkg = Package::new_advisory(name, Evr::parse(&data.evr)?, advisory);
        pkg.buildtime = data.buildtime;
        Ok(pkg)
    }
}

impl From<&Package> for PackageData {
    fn from(pkg: &Package) -> Self {
        let render = |deps: &[Dependency]| deps.iter().map(|d| d.to_string()).collect();
        Self {
            name: pkg.name.clone(),
            evr: pkg.evr.to_string(),
            arch: pkg.arch.clone(),
            summary: pkg.summary.clone(),
            buildtime: pkg.buildtime,
            install_size: pkg.install_size,
            requires: render(&pkg.requires),
            provides: render(&pkg.provides),
            conflicts: render(&pkg.conflicts),
            obsoletes: render(&pkg.obsoletes),
            files: pkg.files.clone(),
        }
    }
}
