use std::collections::{HashMap, HashSet};

use autosolv_evr::Dependency;

use super::engine::Engine;
use super::job::{Job, JobAction, JobList, JobTarget};
use super::policy::Policy;
use super::pool::{PackageId, Pool};
use super::problem::{Problem, Solution, SolutionElement};
use super::rule::{Rule, RuleInfo, RuleInfoKind, RuleKind};
use super::transaction::Transaction;
use crate::error::{Result, SolvError};

/// Deterministic reference engine.
///
/// Decides one candidate per install job in job order, then closes the
/// requirements of every decided package breadth-first. It never
/// backtracks: a requirement whose providers are all blocked by earlier
/// decisions becomes a problem, together with job changes that would avoid
/// it.
#[derive(Debug, Default)]
pub struct Solver {
    policy: Policy,
    /// Report targeted packages that have a better-arch build
    infarch_check: bool,
    /// Decisions of the last problem-free solve
    decided: Option<Vec<PackageId>>,
    solves: usize,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_infarch_check(mut self, enabled: bool) -> Self {
        self.infarch_check = enabled;
        self
    }

    /// Number of `solve` calls so far
    pub fn solve_count(&self) -> usize {
        self.solves
    }
}

impl Engine for Solver {
    fn solve(&mut self, pool: &Pool, jobs: &JobList) -> Result<Vec<Problem>> {
        let start = std::time::Instant::now();
        self.solves += 1;

        let mut state = SolveState::new(pool, jobs, &self.policy, self.infarch_check);
        state.run();
        let problems = state.problems();

        log::debug!(
            "Solve {} took {:?}: {} packages decided, {} problems",
            self.solves,
            start.elapsed(),
            state.decided.len(),
            problems.len()
        );

        self.decided = if problems.is_empty() {
            Some(state.decided)
        } else {
            None
        };
        Ok(problems)
    }

    fn transaction(&self, pool: &Pool) -> Result<Transaction> {
        let decided = self
            .decided
            .as_ref()
            .ok_or_else(|| SolvError::Engine("no successful solve to build a transaction from".to_string()))?;

        let mut transaction = Transaction::from_packages(decided);
        transaction.sort(pool);
        Ok(transaction)
    }
}

/// Why a package was decided
#[derive(Debug, Clone, Copy)]
enum Reason {
    Job(usize),
    Requirement(PackageId),
}

/// What keeps a candidate from being installed next to the decided set
#[derive(Debug, Clone)]
enum Block {
    SameName(PackageId),
    /// `package` conflicts with `dep` provided by `other`
    Conflict {
        package: PackageId,
        dep: Dependency,
        other: PackageId,
    },
    /// `package` obsoletes `dep` matching `other`
    Obsoletes {
        package: PackageId,
        dep: Dependency,
        other: PackageId,
    },
}

impl Block {
    /// The decided package standing in the way of `candidate`
    fn decided(&self, candidate: PackageId) -> PackageId {
        match self {
            Block::SameName(decided) => *decided,
            Block::Conflict { package, other, .. } | Block::Obsoletes { package, other, .. } => {
                if *package == candidate {
                    *other
                } else {
                    *package
                }
            }
        }
    }

    fn rule(&self, candidate: PackageId) -> Rule {
        let info = match self {
            Block::SameName(decided) => RuleInfo::new(RuleInfoKind::SameName)
                .with_package(*decided)
                .with_other_package(candidate),
            Block::Conflict { package, dep, other } => RuleInfo::new(RuleInfoKind::Conflicts)
                .with_package(*package)
                .with_dependency(dep.clone())
                .with_other_package(*other),
            Block::Obsoletes { package, dep, other } => RuleInfo::new(RuleInfoKind::Obsoletes)
                .with_package(*package)
                .with_dependency(dep.clone())
                .with_other_package(*other),
        };
        Rule::new(RuleKind::Package).with_info(info)
    }
}

enum Pick {
    Chosen(PackageId),
    Blocked(PackageId, Block),
    Empty,
}

/// State of a single solve
struct SolveState<'a> {
    pool: &'a Pool,
    jobs: &'a JobList,
    policy: &'a Policy,
    infarch_check: bool,

    decided: Vec<PackageId>,
    decided_set: HashSet<PackageId>,
    reasons: HashMap<PackageId, Reason>,

    /// Packages excluded by erase/lock jobs, with the job position
    forbidden: HashMap<PackageId, usize>,
    multiversion: HashSet<String>,

    /// Rules of the problems found, with the responsible job
    pending: Vec<(Rule, Option<usize>)>,
}

impl<'a> SolveState<'a> {
    fn new(pool: &'a Pool, jobs: &'a JobList, policy: &'a Policy, infarch_check: bool) -> Self {
        Self {
            pool,
            jobs,
            policy,
            infarch_check,
            decided: Vec::new(),
            decided_set: HashSet::new(),
            reasons: HashMap::new(),
            forbidden: HashMap::new(),
            multiversion: HashSet::new(),
            pending: Vec::new(),
        }
    }

    fn run(&mut self) {
        let pool = self.pool;
        let jobs = self.jobs;

        for (pos, job) in jobs.active() {
            match job.action {
                JobAction::Multiversion => {
                    if let JobTarget::Name(name) = &job.target {
                        self.multiversion.insert(name.clone());
                    }
                    for id in job.solvables(pool) {
                        if let Some(pkg) = pool.package(id) {
                            self.multiversion.insert(pkg.name.clone());
                        }
                    }
                }
                JobAction::Erase | JobAction::Lock => {
                    for id in job.solvables(pool) {
                        self.forbidden.entry(id).or_insert(pos);
                    }
                }
                _ => {}
            }
        }

        for (pos, job) in jobs.active() {
            if job.action.is_install_like() {
                self.decide_job(pos, job);
            }
        }

        self.close_requirements();
    }

    fn decide_job(&mut self, pos: usize, job: &Job) {
        let pool = self.pool;
        let candidates = job.solvables(pool);

        if candidates.is_empty() {
            let mut info = RuleInfo::new(RuleInfoKind::JobNothingProvides).with_job(pos);
            match &job.target {
                JobTarget::Provides(dep) => info = info.with_dependency(dep.clone()),
                JobTarget::Name(name) => info = info.with_dependency(Dependency::name(name.as_str())),
                _ => {}
            }
            self.report(Rule::new(RuleKind::Job).with_info(info), Some(pos));
            return;
        }

        if candidates.iter().any(|id| self.decided_set.contains(id)) {
            return;
        }

        let allowed: Vec<PackageId> = candidates
            .iter()
            .copied()
            .filter(|id| !self.forbidden.contains_key(id))
            .collect();
        if allowed.is_empty() {
            let info = RuleInfo::new(RuleInfoKind::JobConflict)
                .with_package(candidates[0])
                .with_job(pos);
            self.report(Rule::new(RuleKind::Job).with_info(info), Some(pos));
            return;
        }

        let installable: Vec<PackageId> = allowed
            .iter()
            .copied()
            .filter(|&id| self.is_installable(id))
            .collect();
        if installable.is_empty() {
            let info = RuleInfo::new(RuleInfoKind::NotInstallable)
                .with_package(allowed[0])
                .with_job(pos);
            self.report(Rule::new(RuleKind::Package).with_info(info), Some(pos));
            return;
        }

        if self.infarch_check {
            if let [id] = installable.as_slice() {
                if let Some(better) = pool.better_arch_sibling(*id) {
                    let info = RuleInfo::new(RuleInfoKind::InferiorArch)
                        .with_package(*id)
                        .with_other_package(better)
                        .with_job(pos);
                    self.report(Rule::new(RuleKind::InferiorArch).with_info(info), Some(pos));
                    return;
                }
            }
        }

        match self.pick(&installable) {
            Pick::Chosen(id) => self.decide(id, Reason::Job(pos)),
            Pick::Blocked(candidate, block) => self.report(block.rule(candidate), Some(pos)),
            Pick::Empty => {}
        }
    }

    fn close_requirements(&mut self) {
        let pool = self.pool;
        let mut index = 0;

        while index < self.decided.len() {
            let id = self.decided[index];
            index += 1;
            let Some(pkg) = pool.package(id) else { continue };

            for dep in &pkg.requires {
                if dep.is_rpmlib() {
                    continue;
                }

                let providers = pool.what_provides(dep);
                if providers.iter().any(|p| self.decided_set.contains(p)) {
                    continue;
                }

                let responsible = self.root_job(id);
                let info = RuleInfo::new(RuleInfoKind::NothingProvides)
                    .with_package(id)
                    .with_dependency(dep.clone());

                if providers.is_empty() {
                    self.report(Rule::new(RuleKind::Package).with_info(info), responsible);
                    continue;
                }

                let installable: Vec<PackageId> = providers
                    .iter()
                    .copied()
                    .filter(|p| !self.forbidden.contains_key(p) && self.is_installable(*p))
                    .collect();

                let mut info = RuleInfo { kind: RuleInfoKind::Requires, ..info };
                match self.pick(&installable) {
                    Pick::Chosen(provider) => self.decide(provider, Reason::Requirement(id)),
                    Pick::Blocked(candidate, block) => {
                        info.other_package = Some(block.decided(candidate));
                        self.report(Rule::new(RuleKind::Package).with_info(info), responsible);
                    }
                    Pick::Empty => self.report(Rule::new(RuleKind::Package).with_info(info), responsible),
                }
            }
        }
    }

    fn is_installable(&self, id: PackageId) -> bool {
        self.pool
            .package(id)
            .map(|p| self.pool.arch().is_compatible(&p.arch))
            .unwrap_or(false)
    }

    /// Best candidate that fits the decided set, or the best blocked one
    fn pick(&self, candidates: &[PackageId]) -> Pick {
        let mut first_blocked = None;
        for id in self.policy.select_preferred(self.pool, candidates) {
            match self.blocker(id) {
                None => return Pick::Chosen(id),
                Some(block) => {
                    if first_blocked.is_none() {
                        first_blocked = Some((id, block));
                    }
                }
            }
        }
        match first_blocked {
            Some((id, block)) => Pick::Blocked(id, block),
            None => Pick::Empty,
        }
    }

    fn blocker(&self, candidate: PackageId) -> Option<Block> {
        let pool = self.pool;
        let cp = pool.package(candidate)?;

        for &decided in &self.decided {
            if decided == candidate {
                continue;
            }
            let Some(dp) = pool.package(decided) else { continue };

            if dp.name == cp.name && dp.arch == cp.arch && !self.multiversion.contains(&cp.name) {
                return Some(Block::SameName(decided));
            }
            if let Some(dep) = dp.conflict_against(cp) {
                return Some(Block::Conflict { package: decided, dep: dep.clone(), other: candidate });
            }
            if let Some(dep) = cp.conflict_against(dp) {
                return Some(Block::Conflict { package: candidate, dep: dep.clone(), other: decided });
            }
            if let Some(dep) = dp.obsoletes_against(cp) {
                return Some(Block::Obsoletes { package: decided, dep: dep.clone(), other: candidate });
            }
            if let Some(dep) = cp.obsoletes_against(dp) {
                return Some(Block::Obsoletes { package: candidate, dep: dep.clone(), other: decided });
            }
        }
        None
    }

    fn decide(&mut self, id: PackageId, reason: Reason) {
        if self.decided_set.insert(id) {
            self.decided.push(id);
            self.reasons.insert(id, reason);
        }
    }

    /// Job that caused `id` to be decided, following requirement chains
    fn root_job(&self, id: PackageId) -> Option<usize> {
        let mut current = id;
        for _ in 0..=self.decided.len() {
            match self.reasons.get(&current)? {
                Reason::Job(pos) => return Some(*pos),
                Reason::Requirement(parent) => current = *parent,
            }
        }
        None
    }

    fn report(&mut self, rule: Rule, responsible: Option<usize>) {
        if let Some(pos) = responsible {
            if self.jobs.get(pos).map(|j| j.is_weak()).unwrap_or(false) {
                log::debug!("Ignoring problem of weak job {}: {}", pos, rule.describe(self.pool));
                return;
            }
        }
        if self.pending.iter().any(|(r, _)| *r == rule) {
            return;
        }
        self.pending.push((rule, responsible));
    }

    fn problems(&self) -> Vec<Problem> {
        self.pending
            .iter()
            .enumerate()
            .map(|(index, (rule, responsible))| {
                let mut problem = Problem::new(index + 1).with_rule(rule.clone());
                for solution in self.solutions(rule, *responsible) {
                    problem.add_solution(solution);
                }
                problem
            })
            .collect()
    }

    fn solutions(&self, rule: &Rule, responsible: Option<usize>) -> Vec<Solution> {
        let pool = self.pool;
        let mut solutions = Vec::new();
        let Some(info) = rule.infos().first() else {
            return solutions;
        };

        match info.kind {
            RuleInfoKind::Requires => {
                if let (Some(dep), Some(blocker)) = (&info.dependency, info.other_package) {
                    let providers: Vec<PackageId> = pool
                        .what_provides(dep)
                        .into_iter()
                        .filter(|&p| p != blocker && !self.forbidden.contains_key(&p) && self.is_installable(p))
                        .collect();
                    for provider in self.policy.select_preferred(pool, &providers) {
                        solutions.push(self.alternative(provider, blocker));
                    }
                }
            }
            RuleInfoKind::InferiorArch => {
                if let (Some(pos), Some(package), Some(better)) = (info.job, info.package, info.other_package) {
                    solutions.push(Solution::new().with_element(
                        SolutionElement::ReplaceJob { position: pos, job: Job::install(better) },
                        format!("install {} instead of {}", pool.nevra(better), pool.nevra(package)),
                    ));
                }
            }
            _ => {}
        }

        let mut droppable: Vec<usize> = responsible.into_iter().collect();
        if matches!(
            info.kind,
            RuleInfoKind::SameName | RuleInfoKind::Conflicts | RuleInfoKind::Obsoletes
        ) {
            for id in info.packages() {
                if let Some(pos) = self.root_job(id) {
                    if !droppable.contains(&pos) {
                        droppable.push(pos);
                    }
                }
            }
        }
        for pos in droppable {
            if let Some(job) = self.jobs.get(pos) {
                solutions.push(Solution::new().with_element(
                    SolutionElement::ReplaceJob { position: pos, job: job.to_noop() },
                    format!("do not ask to {}", job.describe(pool)),
                ));
            }
        }

        solutions
    }

    /// Install `provider` in place of the decided `blocker`
    fn alternative(&self, provider: PackageId, blocker: PackageId) -> Solution {
        let pool = self.pool;
        let (element, mut text) = match self.reasons.get(&blocker) {
            Some(Reason::Job(pos)) => (
                SolutionElement::ReplaceJob { position: *pos, job: Job::install(provider) },
                format!("install {} instead of {}", pool.nevra(provider), pool.nevra(blocker)),
            ),
            _ => (
                SolutionElement::AddJob { job: Job::install(provider) },
                format!("install {}", pool.nevra(provider)),
            ),
        };

        if let (Some(p), Some(b)) = (pool.package(provider), pool.package(blocker)) {
            if pool.arch().is_better(&b.arch, &p.arch) {
                text.push_str(" despite the inferior architecture");
            }
        }
        Solution::new().with_element(element, text)
    }
}
