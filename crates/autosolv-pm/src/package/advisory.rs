use autosolv_evr::Evr;
use serde::{Deserialize, Serialize};

/// Update advisory metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Advisory {
    /// Advisory type (security, bugfix, enhancement)
    pub category: Option<String>,
    pub severity: Option<String>,
    /// Whether installing the update suggests a reboot
    pub reboot_suggested: bool,
    /// Packages updated by this advisory
    pub collection: Vec<CollectionEntry>,
    pub references: Vec<Reference>,
}

/// A package listed in an advisory collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    pub name: String,
    pub evr: Evr,
    pub arch: String,
}

impl CollectionEntry {
    pub fn nevra(&self) -> String {
        format!("{}-{}.{}", self.name, self.evr, self.arch)
    }
}

/// External reference (bug tracker, CVE)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Reference {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub href: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Advisory {
    /// Collection entries for `name.arch`
    pub fn entries_for<'a>(
        &'a self,
        name: &'a str,
        arch: &'a str,
    ) -> impl Iterator<Item = &'a CollectionEntry> + 'a {
        self.collection
            .iter()
            .filter(move |e| e.name == name && e.arch == arch)
    }
}
