//! `data.json` export of a transaction

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::package::Package;
use crate::solver::{Pool, Transaction};

/// File name of the export
pub const REPORT_FILE: &str = "data.json";

/// Installed packages keyed by `name.arch`
pub type Report = BTreeMap<String, PackageReport>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub nevra: String,
    pub name: String,
    pub evr: String,
    pub arch: String,
    pub repo: String,
    pub buildtime: i64,
    pub epoch: String,
    pub version: String,
    pub release: Option<String>,
    /// `epoch:name-version.release.arch`
    pub envra: String,
    pub updateinfos: Vec<UpdateInfo>,
}

/// An advisory covering an installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    pub name: String,
    pub patchcategory: Option<String>,
    pub severity: Option<String>,
    pub buildtime: i64,
    pub reboot: bool,
    pub references: Vec<ReferenceReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceReport {
    pub references: String,
    pub reference_title: String,
    pub reference_href: String,
    pub reference_type: String,
}

/// Describe every installed package, with the advisories whose update
/// collection lists the same `name.arch` at or below the installed EVR.
pub fn build_report(pool: &Pool, transaction: &Transaction) -> Report {
    let advisories: Vec<&Package> = pool
        .iter()
        .map(|(_, p)| p)
        .filter(|p| p.is_advisory())
        .collect();

    let mut report = Report::new();
    for id in transaction.installs() {
        let Some(pkg) = pool.package(id) else { continue };
        log::info!("Retrieving update info for {}", pkg.nevra());

        let mut entry = package_report(pkg, pool.repo_name(id).unwrap_or("@commandline"));
        for advisory_pkg in &advisories {
            let Some(advisory) = &advisory_pkg.advisory else { continue };
            if advisory
                .entries_for(&pkg.name, &pkg.arch)
                .any(|e| e.evr <= pkg.evr)
            {
                entry.updateinfos.push(UpdateInfo {
                    name: advisory_pkg.name.clone(),
                    patchcategory: advisory.category.clone(),
                    severity: advisory.severity.clone(),
                    buildtime: advisory_pkg.buildtime,
                    reboot: advisory.reboot_suggested,
                    references: advisory
                        .references
                        .iter()
                        .map(|r| ReferenceReport {
                            references: r.id.clone(),
                            reference_title: r.title.clone(),
                            reference_href: r.href.clone(),
                            reference_type: r.kind.clone(),
                        })
                        .collect(),
                });
            }
        }
        report.insert(pkg.name_arch(), entry);
    }
    report
}

fn package_report(pkg: &Package, repo: &str) -> PackageReport {
    let epoch = pkg.evr.epoch.to_string();
    let envra = match &pkg.evr.release {
        Some(release) => format!("{}:{}-{}.{}.{}", epoch, pkg.name, pkg.evr.version, release, pkg.arch),
        None => format!("{}:{}-{}.{}", epoch, pkg.name, pkg.evr.version, pkg.arch),
    };

    PackageReport {
        nevra: pkg.nevra(),
        name: pkg.name.clone(),
        evr: pkg.evr.to_string(),
        arch: pkg.arch.clone(),
        repo: repo.to_string(),
        buildtime: pkg.buildtime,
        epoch,
        version: pkg.evr.version.clone(),
        release: pkg.evr.release.clone(),
        envra,
        updateinfos: Vec::new(),
    }
}

/// Write `data.json` into `dir`, returning its path
pub fn write_report(report: &Report, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(REPORT_FILE);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut serializer)?;
    buf.push(b'\n');

    fs::write(&path, buf)?;
    log::debug!("Wrote {} packages to {}", report.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Advisory, CollectionEntry, Reference};
    use crate::repository::Repository;
    use autosolv_evr::Evr;

    fn advisory(id: &str, evr: &str) -> Package {
        let advisory = Advisory {
            category: Some("security".to_string()),
            severity: Some("Important".to_string()),
            reboot_suggested: false,
            collection: vec![CollectionEntry {
                name: "openssl".to_string(),
                evr: Evr::parse(evr).unwrap(),
                arch: "x86_64".to_string(),
            }],
            references: vec![Reference {
                id: "1700".to_string(),
                title: "CVE-2019-1547".to_string(),
                href: "https://bugzilla.redhat.com/1700".to_string(),
                kind: "bugzilla".to_string(),
            }],
        };
        let mut pkg = Package::new_advisory(id, Evr::parse("1").unwrap(), advisory);
        pkg.buildtime = 1570000000;
        pkg
    }

    fn pool() -> Pool {
        let mut updates = Repository::new("updates");
        let mut openssl = Package::new("openssl", Evr::parse("1:1.1.1d-2.fc30").unwrap(), "x86_64");
        openssl.buildtime = 1569000000;
        updates.add_package(openssl);
        updates.add_package(Package::new("tzdata", Evr::parse("2019c").unwrap(), "noarch"));
        updates.add_package(advisory("patch:FEDORA-2019-a", "1:1.1.1d-2.fc30"));
        updates.add_package(advisory("patch:FEDORA-2019-b", "1:1.1.1e-1.fc30"));

        let mut pool = Pool::default();
        pool.add_repository(updates);
        pool
    }

    #[test]
    fn test_package_fields() {
        let pool = pool();
        let report = build_report(&pool, &Transaction::from_packages(&[1, 0]));

        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["openssl.x86_64", "tzdata.noarch"]);

        let openssl = &report["openssl.x86_64"];
        assert_eq!(openssl.nevra, "openssl-1:1.1.1d-2.fc30.x86_64");
        assert_eq!(openssl.evr, "1:1.1.1d-2.fc30");
        assert_eq!(openssl.repo, "updates");
        assert_eq!(openssl.epoch, "1");
        assert_eq!(openssl.version, "1.1.1d");
        assert_eq!(openssl.release.as_deref(), Some("2.fc30"));
        assert_eq!(openssl.envra, "1:openssl-1.1.1d.2.fc30.x86_64");

        let tzdata = &report["tzdata.noarch"];
        assert_eq!(tzdata.epoch, "0");
        assert_eq!(tzdata.release, None);
        assert_eq!(tzdata.envra, "0:tzdata-2019c.noarch");
        assert!(tzdata.updateinfos.is_empty());
    }

    #[test]
    fn test_updateinfos_at_or_below_installed() {
        let pool = pool();
        let report = build_report(&pool, &Transaction::from_packages(&[0]));

        let infos = &report["openssl.x86_64"].updateinfos;
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "patch:FEDORA-2019-a");
        assert_eq!(infos[0].patchcategory.as_deref(), Some("security"));
        assert_eq!(infos[0].buildtime, 1570000000);
        assert_eq!(infos[0].references[0].reference_type, "bugzilla");
    }

    #[test]
    fn test_write_report() {
        let pool = pool();
        let report = build_report(&pool, &Transaction::from_packages(&[0, 1]));
        let dir = tempfile::tempdir().unwrap();

        let path = write_report(&report, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("data.json"));

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["openssl.x86_64"]["buildtime"], 1569000000);
        assert_eq!(
            written["openssl.x86_64"]["updateinfos"][0]["references"][0]["references"],
            "1700"
        );
        assert!(written["tzdata.noarch"]["release"].is_null());
    }
}
