//! Package selections: token matching against the pool and set operations

use autosolv_evr::{Dependency, Evr};
use glob::{MatchOptions, Pattern};

use super::job::{Job, JobAction, JobFlags, JobTarget};
use super::pool::{PackageId, Pool};

/// How a selection matched its expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Package name, glob, `name.arch` or `name op evr`
    Name,
    /// Canonical `name-[epoch:]version-release[.arch]`
    Canon,
    /// Capability (provides)
    Provides,
    /// Owned file path
    FileList,
}

/// Set operations of the `selection:` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOp {
    Add,
    Subtract,
    Filter,
    SymmetricDifference,
}

impl SelectionOp {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "add" => Some(SelectionOp::Add),
            "subtract" => Some(SelectionOp::Subtract),
            "filter" => Some(SelectionOp::Filter),
            "symmetric_difference" => Some(SelectionOp::SymmetricDifference),
            _ => None,
        }
    }
}

/// An ordered, duplicate free set of packages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: Vec<PackageId>,
    kind: Option<SelectionKind>,
}

impl Selection {
    pub fn new(ids: Vec<PackageId>, kind: SelectionKind) -> Self {
        let mut selection = Self {
            ids: Vec::with_capacity(ids.len()),
            kind: Some(kind),
        };
        for id in ids {
            selection.push(id);
        }
        selection
    }

    /// Every package of the pool
    pub fn all(pool: &Pool) -> Self {
        Self::new(pool.iter().map(|(id, _)| id).collect(), SelectionKind::Name)
    }

    fn push(&mut self, id: PackageId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn ids(&self) -> &[PackageId] {
        &self.ids
    }

    pub fn kind(&self) -> Option<SelectionKind> {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: PackageId) -> bool {
        self.ids.contains(&id)
    }

    /// Union
    pub fn add(&mut self, other: &Selection) {
        for &id in &other.ids {
            self.push(id);
        }
    }

    pub fn subtract(&mut self, other: &Selection) {
        self.ids.retain(|id| !other.contains(*id));
    }

    /// Intersection
    pub fn filter(&mut self, other: &Selection) {
        self.ids.retain(|id| other.contains(*id));
    }

    pub fn symmetric_difference(&mut self, other: &Selection) {
        let only_other: Vec<PackageId> = other
            .ids
            .iter()
            .copied()
            .filter(|id| !self.contains(*id))
            .collect();
        self.subtract(other);
        self.ids.extend(only_other);
    }

    pub fn apply(&mut self, op: SelectionOp, other: &Selection) {
        match op {
            SelectionOp::Add => self.add(other),
            SelectionOp::Subtract => self.subtract(other),
            SelectionOp::Filter => self.filter(other),
            SelectionOp::SymmetricDifference => self.symmetric_difference(other),
        }
    }

    /// Keep only packages of the repository at `repo`
    pub fn filter_repo(&mut self, pool: &Pool, repo: usize) {
        self.ids.retain(|&id| pool.repo_index(id) == Some(repo));
    }

    /// Turn the selection into jobs.
    ///
    /// Name matches give one job per package name, capability and file
    /// matches a single job over all providers.
    pub fn jobs(&self, pool: &Pool, action: JobAction, flags: JobFlags) -> Vec<Job> {
        if self.ids.is_empty() {
            return Vec::new();
        }

        match self.kind {
            Some(SelectionKind::Provides) | Some(SelectionKind::FileList) => {
                let target = match self.ids.as_slice() {
                    [id] => JobTarget::Solvable(*id),
                    ids => JobTarget::OneOf(ids.to_vec()),
                };
                vec![Job::new(action, target).with_flags(flags)]
            }
            _ => {
                let mut groups: Vec<(&str, Vec<PackageId>)> = Vec::new();
                for &id in &self.ids {
                    let Some(pkg) = pool.package(id) else { continue };
                    match groups.iter_mut().find(|(name, _)| *name == pkg.name) {
                        Some((_, ids)) => ids.push(id),
                        None => groups.push((pkg.name.as_str(), vec![id])),
                    }
                }

                groups
                    .into_iter()
                    .map(|(_, ids)| match ids.as_slice() {
                        [id] => Job::new(action, JobTarget::Solvable(*id))
                            .with_flags(flags | JobFlags::TARGETED),
                        _ => Job::new(action, JobTarget::OneOf(ids)).with_flags(flags),
                    })
                    .collect()
            }
        }
    }
}

/// Literal or glob matcher, optionally case-insensitive
struct Matcher {
    literal: String,
    pattern: Option<Pattern>,
    nocase: bool,
}

impl Matcher {
    fn new(expr: &str, nocase: bool) -> Self {
        let pattern = if is_glob(expr) { Pattern::new(expr).ok() } else { None };
        Self {
            literal: expr.to_string(),
            pattern,
            nocase,
        }
    }

    fn is_literal(&self) -> bool {
        self.pattern.is_none() && !self.nocase
    }

    fn matches(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches_with(
                candidate,
                MatchOptions {
                    case_sensitive: !self.nocase,
                    require_literal_separator: false,
                    require_literal_leading_dot: false,
                },
            ),
            None if self.nocase => candidate.eq_ignore_ascii_case(&self.literal),
            None => candidate == self.literal,
        }
    }
}

fn is_glob(expr: &str) -> bool {
    expr.contains(['*', '?', '['])
}

fn sorted(mut ids: Vec<PackageId>) -> Vec<PackageId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl Pool {
    /// Select the packages matching a token.
    ///
    /// Tries name forms first (exact or glob name, `name.arch`, canonical
    /// NEVRA, `name op evr`), then capabilities, then owned files for tokens
    /// starting with `/`. The first non-empty match wins.
    pub fn select(&self, expr: &str, nocase: bool) -> Selection {
        let expr = expr.trim();
        if expr.is_empty() {
            return Selection::default();
        }

        let by_name = self.select_name(expr, nocase);
        if !by_name.is_empty() {
            return by_name;
        }

        let by_provides = self.select_provides(expr, nocase);
        if !by_provides.is_empty() {
            return by_provides;
        }

        if expr.starts_with('/') {
            return self.select_files(expr, nocase);
        }

        Selection::default()
    }

    /// Packages with exactly this name, EVR and architecture
    pub fn select_nevra(&self, name: &str, evr: &Evr, arch: &str) -> Vec<PackageId> {
        self.packages_by_name(name)
            .iter()
            .copied()
            .filter(|&id| {
                self.package(id)
                    .map(|p| p.evr == *evr && p.arch == arch)
                    .unwrap_or(false)
            })
            .collect()
    }

    fn select_name(&self, expr: &str, nocase: bool) -> Selection {
        let matcher = Matcher::new(expr, nocase);

        let ids: Vec<PackageId> = if matcher.is_literal() {
            self.packages_by_name(expr).to_vec()
        } else {
            self.iter()
                .filter(|(_, p)| matcher.matches(&p.name))
                .map(|(id, _)| id)
                .collect()
        };
        if !ids.is_empty() {
            return Selection::new(ids, SelectionKind::Name);
        }

        if let Some((name, arch)) = expr.rsplit_once('.') {
            if self.is_known_arch(arch) {
                let matcher = Matcher::new(name, nocase);
                let arch_matcher = Matcher::new(arch, nocase);
                let ids: Vec<PackageId> = self
                    .iter()
                    .filter(|(_, p)| matcher.matches(&p.name) && arch_matcher.matches(&p.arch))
                    .map(|(id, _)| id)
                    .collect();
                if !ids.is_empty() {
                    return Selection::new(ids, SelectionKind::Name);
                }
            }
        }

        if expr.contains('-') {
            let ids: Vec<PackageId> = self
                .iter()
                .filter(|(_, p)| {
                    let nevr = p.nevr();
                    let with_epoch = format!("{}-{}:{}", p.name, p.evr.epoch, strip_epoch(&p.evr));
                    let mut forms = vec![
                        format!("{}.{}", nevr, p.arch),
                        format!("{}.{}", with_epoch, p.arch),
                        nevr,
                        with_epoch,
                    ];
                    // a token without epoch matches any epoch
                    if p.evr.epoch != 0 {
                        let without_epoch = format!("{}-{}", p.name, strip_epoch(&p.evr));
                        forms.push(format!("{}.{}", without_epoch, p.arch));
                        forms.push(without_epoch);
                    }
                    forms.iter().any(|form| matcher.matches(form))
                })
                .map(|(id, _)| id)
                .collect();
            if !ids.is_empty() {
                return Selection::new(ids, SelectionKind::Canon);
            }
        }

        if let Some(dep) = relational(expr) {
            let name_matcher = Matcher::new(&dep.name, nocase);
            let ids: Vec<PackageId> = self
                .iter()
                .filter(|(_, p)| name_matcher.matches(&p.name) && dep.matches_evr(&p.evr))
                .map(|(id, _)| id)
                .collect();
            if !ids.is_empty() {
                return Selection::new(ids, SelectionKind::Name);
            }
        }

        Selection::default()
    }

    fn select_provides(&self, expr: &str, nocase: bool) -> Selection {
        let dep = relational(expr).unwrap_or_else(|| Dependency::name(expr));
        let matcher = Matcher::new(&dep.name, nocase);

        let mut ids = Vec::new();
        let capabilities: Vec<&str> = if matcher.is_literal() {
            vec![dep.name.as_str()]
        } else {
            self.capability_names().filter(|c| matcher.matches(c)).collect()
        };
        for capability in capabilities {
            let wanted = Dependency {
                name: capability.to_string(),
                constraint: dep.constraint.clone(),
            };
            ids.extend(
                self.providers_of(capability)
                    .iter()
                    .copied()
                    .filter(|&id| self.package(id).map(|p| p.provides_dep(&wanted)).unwrap_or(false)),
            );
        }

        Selection::new(sorted(ids), SelectionKind::Provides)
    }

    fn select_files(&self, expr: &str, nocase: bool) -> Selection {
        let matcher = Matcher::new(expr, nocase);
        let ids = if matcher.is_literal() {
            self.owners_of(expr).to_vec()
        } else {
            let mut ids = Vec::new();
            for file in self.file_names().filter(|f| matcher.matches(f)) {
                ids.extend_from_slice(self.owners_of(file));
            }
            sorted(ids)
        };
        Selection::new(ids, SelectionKind::FileList)
    }

    fn is_known_arch(&self, arch: &str) -> bool {
        arch == "src"
            || self.arch().known().any(|a| a.eq_ignore_ascii_case(arch))
            || self.iter().any(|(_, p)| p.arch.eq_ignore_ascii_case(arch))
    }
}

/// `version[-release]` without the epoch
fn strip_epoch(evr: &Evr) -> String {
    match &evr.release {
        Some(release) => format!("{}-{}", evr.version, release),
        None => evr.version.clone(),
    }
}

/// Parse `name op evr`, `None` for anything else
fn relational(expr: &str) -> Option<Dependency> {
    if !expr.contains(['<', '>', '=']) {
        return None;
    }
    Dependency::parse(expr).ok().filter(|d| d.is_versioned())
}
