use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Instant;

use autosolv_evr::Dependency;

use super::cache::JobCache;
use super::maintain::maintain;
use crate::error::{Result, SolvError};
use crate::solver::{
    Engine, Job, JobFlags, JobList, PackageId, Pool, Problem, Rule, RuleInfo, RuleInfoKind, RuleKind,
    Solution, SolutionElement, Transaction,
};

/// Default cap on solve rounds
pub const DEFAULT_MAX_ROUNDS: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Rounds after which resolution gives up
    pub max_rounds: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl ResolverOptions {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

/// Resolves engine problems without asking anyone.
///
/// Each round submits the job list to the engine. Every reported problem
/// is classified by its root rule and remediated by editing the job list
/// or the in-memory package metadata. Jobs are only neutralized or replaced
/// in place during a round, so the positions the engine reported stay
/// valid; appended jobs are merged and neutralized slots compacted once the
/// round is over.
///
/// An unresolved requirement is first handled with a heuristic (upgrade
/// the provider, or allow several versions side by side). When the same
/// requirement comes back the resolver applies one of the engine's own
/// solutions instead.
pub struct ConflictResolver<E: Engine> {
    engine: E,
    options: ResolverOptions,
    /// (requirer NEVRA, dependency) pairs already handled heuristically
    seen: HashSet<(String, String)>,
    cache: JobCache,
    rounds: usize,
}

impl<E: Engine> ConflictResolver<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            options: ResolverOptions::default(),
            seen: HashSet::new(),
            cache: JobCache::new(),
            rounds: 0,
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Rounds run by the last `resolve` call
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Run rounds until the engine reports no problem, then return its
    /// transaction.
    pub fn resolve(&mut self, pool: &mut Pool, jobs: &mut JobList) -> Result<Transaction> {
        let start = Instant::now();
        self.rounds = 0;

        loop {
            self.rounds += 1;
            let problems = self.engine.solve(pool, jobs)?;
            if problems.is_empty() {
                log::info!(
                    "Resolved {} jobs in {} round(s) ({:?})",
                    jobs.active_count(),
                    self.rounds,
                    start.elapsed()
                );
                return self.engine.transaction(pool);
            }

            log::info!(
                "Round {}: {} problem(s), {} active jobs",
                self.rounds,
                problems.len(),
                jobs.active_count()
            );

            self.cache.rebuild(jobs, pool);
            let mut appended = Vec::new();
            for problem in &problems {
                self.remediate(pool, jobs, problem, &mut appended)?;
            }

            for job in appended {
                if !jobs.contains(&job) {
                    jobs.push(job);
                }
            }

            let maintenance = maintain(jobs, pool)?;
            log::debug!(
                "Round {}: {} superseded, {} slots dropped, {} jobs left",
                self.rounds,
                maintenance.superseded,
                maintenance.removed,
                jobs.len()
            );

            if self.rounds >= self.options.max_rounds {
                return Err(SolvError::NotConverged {
                    rounds: self.rounds,
                    problems: problems.len(),
                });
            }
        }
    }

    fn remediate(
        &mut self,
        pool: &mut Pool,
        jobs: &mut JobList,
        problem: &Problem,
        appended: &mut Vec<Job>,
    ) -> Result<()> {
        let rule = problem
            .root_rule()
            .ok_or(SolvError::MissingRootRule { problem: problem.id })?;
        let Some(info) = rule.infos().first() else {
            return Err(SolvError::MissingRootRule { problem: problem.id });
        };
        log::debug!("Problem {}: {}", problem.id, rule.describe(pool));

        match (rule.kind(), info.kind) {
            (RuleKind::Package, RuleInfoKind::SameName) => self.same_name(pool, jobs, problem, info, appended),
            (RuleKind::Package, RuleInfoKind::NothingProvides) => self.nothing_provides(pool, problem, info),
            (RuleKind::Package, RuleInfoKind::Requires) => self.requires(pool, jobs, problem, info, appended),
            (RuleKind::Package, RuleInfoKind::Conflicts) => self.conflicts(pool, problem, info),
            (RuleKind::Package, RuleInfoKind::Obsoletes) => self.obsoletes(pool, jobs, problem, info),
            (RuleKind::InferiorArch, RuleInfoKind::InferiorArch)
            | (RuleKind::Job, RuleInfoKind::JobConflict)
            | (RuleKind::Job, RuleInfoKind::JobNothingProvides) => {
                self.drop_request(pool, jobs, problem, info, appended)
            }
            _ => Err(unhandled(pool, problem, rule, info)),
        }
    }

    /// Two packages of the same name and arch: drop the older one
    fn same_name(
        &mut self,
        pool: &Pool,
        jobs: &mut JobList,
        problem: &Problem,
        info: &RuleInfo,
        appended: &mut Vec<Job>,
    ) -> Result<()> {
        let (Some(a), Some(b)) = (info.package, info.other_package) else {
            return Err(unhandled_info(pool, problem, RuleKind::Package, info));
        };

        if pool.nevra(a) == pool.nevra(b) {
            let mut holders = self.live_holders(pool, jobs, a);
            for position in self.live_holders(pool, jobs, b) {
                if !holders.contains(&position) {
                    holders.push(position);
                }
            }
            holders.sort_unstable();
            if holders.len() < 2 {
                log::warn!(
                    "No duplicate job holds {}, falling back to the proposed solutions",
                    pool.nevra(a)
                );
                return self.apply_solution(pool, jobs, problem, None, appended);
            }
            for &position in holders.iter().skip(1) {
                log::info!("Dropping duplicate job {}", jobs_describe(pool, jobs, position));
                jobs.neutralize(position)?;
            }
            return Ok(());
        }

        let inferior = match pool.evrcmp(a, b) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal => {
                let arch_of = |id: PackageId| pool.package(id).map(|p| p.arch.as_str()).unwrap_or("");
                if pool.arch().is_better(arch_of(a), arch_of(b)) {
                    b
                } else {
                    a
                }
            }
        };

        let holders = self.live_holders(pool, jobs, inferior);
        if holders.is_empty() {
            log::warn!(
                "No job holds {}, falling back to the proposed solutions",
                pool.nevra(inferior)
            );
            return self.apply_solution(pool, jobs, problem, None, appended);
        }
        for position in holders {
            log::info!("Dropping {} in favour of a newer version", jobs_describe(pool, jobs, position));
            jobs.neutralize(position)?;
        }
        Ok(())
    }

    /// A requirement nothing in the pool provides: forget it
    fn nothing_provides(&mut self, pool: &mut Pool, problem: &Problem, info: &RuleInfo) -> Result<()> {
        let (Some(id), Some(dep)) = (info.package, info.dependency.as_ref()) else {
            return Err(unhandled_info(pool, problem, RuleKind::Package, info));
        };
        log::info!("Removing requirement {} of {}", dep, pool.nevra(id));
        let others = pool.who_requires(dep).into_iter().filter(|&other| other != id).count();
        if others > 0 {
            log::debug!("{} other package(s) still require {}", others, dep);
        }
        pool.remove_requires(id, dep);
        Ok(())
    }

    /// A requirement whose providers cannot be installed
    fn requires(
        &mut self,
        pool: &Pool,
        jobs: &mut JobList,
        problem: &Problem,
        info: &RuleInfo,
        appended: &mut Vec<Job>,
    ) -> Result<()> {
        let (Some(requirer), Some(dep)) = (info.package, info.dependency.as_ref()) else {
            return Err(unhandled_info(pool, problem, RuleKind::Package, info));
        };

        let signature = (pool.nevra(requirer), dep.to_string());
        if !self.seen.insert(signature) {
            log::info!(
                "{} requiring {} came back, applying a proposed solution",
                pool.nevra(requirer),
                dep
            );
            return self.apply_solution(pool, jobs, problem, Some(dep), appended);
        }

        if self.upgrade_providers(pool, jobs, dep, appended)? {
            return Ok(());
        }
        if self.upgrade_requirer(pool, jobs, requirer, appended)? {
            return Ok(());
        }

        let mut names = vec![pool.package(requirer).map(|p| p.name.clone()).unwrap_or_default()];
        for id in pool.what_provides(dep) {
            if let Some(pkg) = pool.package(id) {
                if !names.contains(&pkg.name) {
                    names.push(pkg.name.clone());
                }
            }
        }
        for name in names.into_iter().filter(|n| !n.is_empty()) {
            let job = Job::multiversion(name);
            if !jobs.contains(&job) && !appended.contains(&job) {
                log::info!("Allowing several versions: {}", job.describe(pool));
                appended.push(job);
            }
        }
        Ok(())
    }

    /// Replace jobs holding an old provider of `dep` by the lowest newer
    /// version satisfying it. Returns whether any job was replaced.
    fn upgrade_providers(
        &self,
        pool: &Pool,
        jobs: &mut JobList,
        dep: &Dependency,
        appended: &mut Vec<Job>,
    ) -> Result<bool> {
        let capability = Dependency::name(dep.name.as_str());
        let mut names: Vec<&str> = Vec::new();
        for &id in pool.providers_of(&dep.name) {
            if let Some(pkg) = pool.package(id) {
                if !names.contains(&pkg.name.as_str()) {
                    names.push(pkg.name.as_str());
                }
            }
        }

        let mut upgraded = false;
        for name in names {
            for entry in self.cache.entries(name) {
                if !entry.is_live(jobs) {
                    continue;
                }
                let Some(pkg) = pool.package(entry.package) else { continue };
                if !pkg.provides_dep(&capability) {
                    continue;
                }

                let newer = pool
                    .newer_versions(entry.package)
                    .into_iter()
                    .find(|&id| pool.package(id).map(|p| p.provides_dep(dep)).unwrap_or(false));
                let Some(newer) = newer else { continue };

                log::info!(
                    "Replacing {} with {} to satisfy {}",
                    pool.nevra(entry.package),
                    pool.nevra(newer),
                    dep
                );
                jobs.neutralize(entry.position)?;
                let job = Job::install(newer).with_flags(entry.job.flags | JobFlags::TARGETED);
                if !appended.contains(&job) {
                    appended.push(job);
                }
                upgraded = true;
            }
        }
        Ok(upgraded)
    }

    /// Replace jobs holding `requirer` by its next higher version
    fn upgrade_requirer(
        &self,
        pool: &Pool,
        jobs: &mut JobList,
        requirer: PackageId,
        appended: &mut Vec<Job>,
    ) -> Result<bool> {
        let Some(newer) = pool.next_higher_version(requirer) else {
            return Ok(false);
        };

        let holders = self.live_holders(pool, jobs, requirer);
        for &position in &holders {
            let flags = jobs.get(position).map(|job| job.flags).unwrap_or_default();
            log::info!("Replacing {} with {}", pool.nevra(requirer), pool.nevra(newer));
            jobs.neutralize(position)?;
            let job = Job::install(newer).with_flags(flags | JobFlags::TARGETED);
            if !appended.contains(&job) {
                appended.push(job);
            }
        }
        Ok(!holders.is_empty())
    }

    /// Clear the conflicts of both packages
    fn conflicts(&mut self, pool: &mut Pool, problem: &Problem, info: &RuleInfo) -> Result<()> {
        let (Some(a), Some(b)) = (info.package, info.other_package) else {
            return Err(unhandled_info(pool, problem, RuleKind::Package, info));
        };
        let cleared = pool.clear_conflicts(a) + pool.clear_conflicts(b);
        log::info!(
            "Cleared {} conflict(s) between {} and {}",
            cleared,
            pool.nevra(a),
            pool.nevra(b)
        );
        Ok(())
    }

    /// Drop the obsoleted package, or the obsoletes entry when no job holds it
    fn obsoletes(&mut self, pool: &mut Pool, jobs: &mut JobList, problem: &Problem, info: &RuleInfo) -> Result<()> {
        let (Some(obsoleting), Some(obsoleted), Some(dep)) =
            (info.package, info.other_package, info.dependency.as_ref())
        else {
            return Err(unhandled_info(pool, problem, RuleKind::Package, info));
        };

        let holders = self.live_holders(pool, jobs, obsoleted);
        if holders.is_empty() {
            log::info!("Removing obsoletes {} of {}", dep, pool.nevra(obsoleting));
            pool.remove_obsoletes(obsoleting, dep);
            return Ok(());
        }
        for position in holders {
            log::info!(
                "Dropping {}, obsoleted by {}",
                jobs_describe(pool, jobs, position),
                pool.nevra(obsoleting)
            );
            jobs.neutralize(position)?;
        }
        Ok(())
    }

    /// Neutralize the reported job, or the jobs of the flagged package.
    /// Falls back to the proposed solutions when no job is left to drop.
    fn drop_request(
        &mut self,
        pool: &Pool,
        jobs: &mut JobList,
        problem: &Problem,
        info: &RuleInfo,
        appended: &mut Vec<Job>,
    ) -> Result<()> {
        let mut positions: Vec<usize> = info.job.into_iter().filter(|&p| jobs.is_active(p)).collect();
        if positions.is_empty() {
            if let Some(id) = info.package {
                positions = self.live_holders(pool, jobs, id);
            }
        }

        if positions.is_empty() {
            log::warn!(
                "Nothing to drop for {}, falling back to the proposed solutions",
                info.describe(pool)
            );
            return self.apply_solution(pool, jobs, problem, None, appended);
        }
        for position in positions {
            log::info!("Dropping {}: {}", jobs_describe(pool, jobs, position), info.describe(pool));
            jobs.neutralize(position)?;
        }
        Ok(())
    }

    /// Apply the solution chosen by [`pick_solution`]
    fn apply_solution(
        &mut self,
        pool: &Pool,
        jobs: &mut JobList,
        problem: &Problem,
        dep: Option<&Dependency>,
        appended: &mut Vec<Job>,
    ) -> Result<()> {
        let solutions = problem.solutions();
        let index =
            pick_solution(pool, solutions, dep).ok_or(SolvError::NoSolution { problem: problem.id })?;
        let solution = &solutions[index];
        log::info!("Problem {}: applying solution {}: {}", problem.id, index + 1, solution.text());

        for element in solution.elements() {
            match element {
                SolutionElement::ReplaceJob { position, job } => {
                    jobs.replace(*position, job.clone())?;
                }
                SolutionElement::AddJob { job } => {
                    if !jobs.contains(job) && !appended.contains(job) {
                        appended.push(job.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Positions of the still untouched jobs holding `id`
    fn live_holders(&self, pool: &Pool, jobs: &JobList, id: PackageId) -> Vec<usize> {
        let mut positions = Vec::new();
        for entry in self.cache.holding(pool, id) {
            if entry.is_live(jobs) && !positions.contains(&entry.position) {
                positions.push(entry.position);
            }
        }
        positions
    }
}

/// Choose among the engine's solutions, `None` when there are none.
///
/// In order of preference:
///
/// 1. a single-element solution about an inferior architecture;
/// 2. the first solution whose packages all satisfy `dep` (name match with
///    EVR at least the wanted one, or a matching provide);
/// 3. the solution whose packages have the oldest average build time,
///    solutions without packages last, earlier solutions on ties.
pub fn pick_solution(pool: &Pool, solutions: &[Solution], dep: Option<&Dependency>) -> Option<usize> {
    if solutions.is_empty() {
        return None;
    }

    if let Some(index) = solutions
        .iter()
        .position(|s| s.elements().len() == 1 && s.text().contains("inferior architecture"))
    {
        return Some(index);
    }

    if let Some(dep) = dep {
        let satisfying = solutions.iter().position(|s| {
            let packages = s.packages(pool);
            !packages.is_empty() && packages.iter().all(|&id| satisfies(pool, id, dep))
        });
        if satisfying.is_some() {
            return satisfying;
        }
    }

    solutions
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| {
            let packages = s.packages(pool);
            if packages.is_empty() {
                return (true, 0);
            }
            let total: i64 = packages
                .iter()
                .filter_map(|&id| pool.package(id))
                .map(|p| p.buildtime)
                .sum();
            (false, total / packages.len() as i64)
        })
        .map(|(index, _)| index)
}

fn satisfies(pool: &Pool, id: PackageId, dep: &Dependency) -> bool {
    let Some(pkg) = pool.package(id) else {
        return false;
    };
    if pkg.name == dep.name {
        return dep
            .evr()
            .map(|wanted| pkg.evr.compare_loose(wanted) != Ordering::Less)
            .unwrap_or(true);
    }
    pkg.provides_dep(dep)
}

fn jobs_describe(pool: &Pool, jobs: &JobList, position: usize) -> String {
    jobs.get(position)
        .map(|job| job.describe(pool))
        .unwrap_or_else(|| format!("job {}", position))
}

fn unhandled(pool: &Pool, problem: &Problem, rule: &Rule, info: &RuleInfo) -> SolvError {
    unhandled_info(pool, problem, rule.kind(), info)
}

fn unhandled_info(pool: &Pool, problem: &Problem, kind: RuleKind, info: &RuleInfo) -> SolvError {
    SolvError::UnhandledRule {
        problem: problem.id,
        rule: kind.to_string(),
        info: info.kind.to_string(),
        packages: info
            .packages()
            .into_iter()
            .map(|id| pool.nevra(id))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
