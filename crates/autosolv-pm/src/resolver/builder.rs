//! Turns command line tokens into the initial job list

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{Result, SolvError};
use crate::solver::{
    JobAction, JobFlags, JobList, PackageId, Pool, Selection, SelectionKind, SelectionOp,
};

/// Builds the initial job list from package tokens.
///
/// A token is a package name, a glob, a canonical NEVRA, a `name op evr`
/// relation, a capability or a file path, optionally behind directives:
///
/// - `repo:<name>:<expr>` restricts the match to one repository
/// - `job:<flag,...>:<expr>` overrides the action and modifier flags
/// - `selection:<op>:<expr>` updates the persistent selection filter
///   instead of producing jobs
///
/// Directives nest, e.g. `repo:updates:job:weak:bash`.
pub struct JobBuilder<'p> {
    pool: &'p Pool,
    action: JobAction,
    flags: JobFlags,
    /// Persistent filter applied to every plain selection
    filter: Option<Selection>,
    jobs: JobList,
    /// Newest advisory update per `name.arch` and the jobs holding it
    update_stack: HashMap<String, (PackageId, Vec<usize>)>,
}

impl<'p> JobBuilder<'p> {
    pub fn new(pool: &'p Pool) -> Self {
        Self {
            pool,
            action: JobAction::Install,
            flags: JobFlags::empty(),
            filter: None,
            jobs: JobList::new(),
            update_stack: HashMap::new(),
        }
    }

    /// Default action of the produced jobs
    pub fn with_action(mut self, action: JobAction) -> Self {
        self.action = action;
        self
    }

    /// Default modifier flags of the produced jobs
    pub fn with_flags(mut self, flags: JobFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn jobs(&self) -> &JobList {
        &self.jobs
    }

    pub fn filter(&self) -> Option<&Selection> {
        self.filter.as_ref()
    }

    pub fn add_tokens<I, S>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref())?;
        }
        Ok(())
    }

    /// Add the jobs of a single token
    pub fn add_token(&mut self, token: &str) -> Result<()> {
        let mut expr = token.trim();
        let mut repo = None;
        let mut action = self.action;
        let mut flags = self.flags;

        loop {
            if let Some(rest) = expr.strip_prefix("repo:") {
                let (name, rest) = split_directive(rest, token)?;
                repo = Some(self.repo_index(name)?);
                expr = rest;
            } else if let Some(rest) = expr.strip_prefix("job:") {
                let (names, rest) = split_directive(rest, token)?;
                (action, flags) = parse_job_flags(names, action, token)?;
                expr = rest;
            } else if let Some(rest) = expr.strip_prefix("selection:") {
                let (op_name, rest) = split_directive(rest, token)?;
                let op = SelectionOp::parse(op_name).ok_or_else(|| SolvError::UnknownSelectionOp {
                    op: op_name.to_string(),
                    token: token.to_string(),
                })?;
                let selection = self.select(rest, repo)?;
                self.apply_filter(op, &selection);
                return Ok(());
            } else {
                break;
            }
        }

        let mut selection = self.select(expr, repo)?;
        if let Some(filter) = &self.filter {
            selection.filter(filter);
            if selection.is_empty() {
                return Err(SolvError::NothingMatches(expr.to_string()));
            }
        }

        self.expand_advisories(&selection, action, flags)?;
        for job in selection.jobs(self.pool, action, flags) {
            self.jobs.push(job);
        }
        Ok(())
    }

    pub fn build(self) -> JobList {
        self.jobs
    }

    /// Select `expr`, retrying case-insensitively when nothing matches
    fn select(&self, expr: &str, repo: Option<usize>) -> Result<Selection> {
        let mut selection = self.select_in(expr, repo, false);
        if selection.is_empty() {
            selection = self.select_in(expr, repo, true);
            if !selection.is_empty() {
                log::info!("[ignoring case for '{}']", expr);
            }
        }
        if selection.is_empty() {
            return Err(SolvError::NothingMatches(expr.to_string()));
        }

        match selection.kind() {
            Some(SelectionKind::FileList) => log::info!("[using file list match for '{}']", expr),
            Some(SelectionKind::Provides) => log::info!("[using capability match for '{}']", expr),
            _ => {}
        }
        Ok(selection)
    }

    fn select_in(&self, expr: &str, repo: Option<usize>, nocase: bool) -> Selection {
        let mut selection = self.pool.select(expr, nocase);
        if let Some(repo) = repo {
            selection.filter_repo(self.pool, repo);
        }
        selection
    }

    fn apply_filter(&mut self, op: SelectionOp, selection: &Selection) {
        let filter = self.filter.get_or_insert_with(|| match op {
            SelectionOp::Subtract | SelectionOp::Filter => Selection::all(self.pool),
            SelectionOp::Add | SelectionOp::SymmetricDifference => Selection::default(),
        });
        filter.apply(op, selection);
        log::debug!("Selection filter now holds {} packages", filter.len());
    }

    fn repo_index(&self, name: &str) -> Result<usize> {
        let repositories = self.pool.repositories();
        repositories
            .iter()
            .position(|repo| repo.name == name)
            .ok_or_else(|| SolvError::UnknownRepository {
                name: name.to_string(),
                available: repositories
                    .iter()
                    .map(|repo| repo.name.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            })
    }

    /// Add a targeted job for every update listed by a selected advisory
    fn expand_advisories(&mut self, selection: &Selection, action: JobAction, flags: JobFlags) -> Result<()> {
        let pool = self.pool;
        for &id in selection.ids() {
            let Some(advisory) = pool.package(id).and_then(|p| p.advisory.as_ref()) else {
                continue;
            };

            for entry in &advisory.collection {
                let matched = pool.select_nevra(&entry.name, &entry.evr, &entry.arch);
                if matched.is_empty() {
                    log::debug!("{} of {} is not in the pool", entry.nevra(), pool.nevra(id));
                    continue;
                }
                let updates = Selection::new(matched, SelectionKind::Canon);
                for job in updates.jobs(pool, action, flags | JobFlags::TARGETED) {
                    let position = self.jobs.push(job);
                    self.stack_update(position)?;
                }
            }
        }
        Ok(())
    }

    /// Keep only the newest advisory update of each `name.arch` active
    fn stack_update(&mut self, position: usize) -> Result<()> {
        let pool = self.pool;
        let ids = match self.jobs.get(position) {
            Some(job) => job.solvables(pool),
            None => return Ok(()),
        };

        for id in ids {
            let Some(pkg) = pool.package(id) else { continue };
            let Some((current, positions)) = self.update_stack.get_mut(&pkg.name_arch()) else {
                self.update_stack.insert(pkg.name_arch(), (id, vec![position]));
                continue;
            };

            if *current == id {
                continue;
            }
            if pool.evrcmp(id, *current) == Ordering::Greater {
                log::info!("Keeping update {} over {}", pool.nevra(id), pool.nevra(*current));
                for &older in positions.iter() {
                    self.jobs.neutralize(older)?;
                }
                *current = id;
                *positions = vec![position];
            } else {
                log::info!("Dropping update {}, {} is newer", pool.nevra(id), pool.nevra(*current));
                self.jobs.neutralize(position)?;
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Split `<argument>:<rest>` of a directive
fn split_directive<'t>(input: &'t str, token: &str) -> Result<(&'t str, &'t str)> {
    input
        .split_once(':')
        .ok_or_else(|| SolvError::MalformedDirective(token.to_string()))
}

/// Parse the comma separated names of a `job:` directive.
///
/// Action names replace the action, modifier names replace the default
/// modifiers.
fn parse_job_flags(names: &str, default_action: JobAction, token: &str) -> Result<(JobAction, JobFlags)> {
    let mut action = default_action;
    let mut flags = JobFlags::empty();

    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if let Some(parsed) = JobAction::parse(name) {
            action = parsed;
        } else if let Some(flag) = JobFlags::parse(name) {
            flags |= flag;
        } else {
            return Err(SolvError::UnknownJobFlag {
                flag: name.to_string(),
                token: token.to_string(),
            });
        }
    }
    Ok((action, flags))
}
