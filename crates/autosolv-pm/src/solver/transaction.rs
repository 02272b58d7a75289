use std::collections::HashSet;
use std::fmt;

use super::pool::{PackageId, Pool};

/// Accepted install plan of a successful solve
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Operations to perform
    pub operations: Vec<Operation>,
}

/// A single operation in a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Install a package
    Install(PackageId),
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install every listed package, duplicates dropped
    pub fn from_packages(packages: &[PackageId]) -> Self {
        let mut seen = HashSet::new();
        let operations = packages
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .map(Operation::Install)
            .collect();
        Self { operations }
    }

    pub fn install(&mut self, id: PackageId) {
        self.operations.push(Operation::Install(id));
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Get all packages that will be installed
    pub fn installs(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.operations.iter().map(|op| match op {
            Operation::Install(id) => *id,
        })
    }

    /// Sum of installed sizes in bytes
    pub fn install_size_change(&self, pool: &Pool) -> i64 {
        self.installs()
            .filter_map(|id| pool.package(id))
            .map(|p| p.install_size as i64)
            .sum()
    }

    /// Order installs so that providers come before the packages requiring
    /// them. Dependency cycles keep their original order.
    pub fn sort(&mut self, pool: &Pool) {
        let installs: Vec<PackageId> = self.installs().collect();
        let mut visited = HashSet::new();
        let mut ordered = Vec::with_capacity(installs.len());

        for &id in &installs {
            visit(pool, id, &installs, &mut visited, &mut ordered);
        }

        self.operations = ordered.into_iter().map(Operation::Install).collect();
    }

    /// Get a summary of the transaction
    pub fn summary(&self, pool: &Pool) -> TransactionSummary {
        let mut summary = TransactionSummary::default();
        for id in self.installs() {
            match pool.package(id) {
                Some(p) if p.is_advisory() => summary.advisories += 1,
                _ => summary.installs += 1,
            }
        }
        summary
    }
}

fn visit(
    pool: &Pool,
    id: PackageId,
    installs: &[PackageId],
    visited: &mut HashSet<PackageId>,
    ordered: &mut Vec<PackageId>,
) {
    if !visited.insert(id) {
        return;
    }
    if let Some(pkg) = pool.package(id) {
        for dep in &pkg.requires {
            let providers = pool.what_provides(dep);
            for &other in installs {
                if other != id && providers.contains(&other) {
                    visit(pool, other, installs, visited, ordered);
                }
            }
        }
    }
    ordered.push(id);
}

/// Summary of a transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    pub installs: usize,
    pub advisories: usize,
}

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.installs > 0 {
            parts.push(format!("{} install(s)", self.installs));
        }
        if self.advisories > 0 {
            parts.push(format!("{} advisory(ies)", self.advisories));
        }
        if parts.is_empty() {
            write!(f, "Nothing to do")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}
