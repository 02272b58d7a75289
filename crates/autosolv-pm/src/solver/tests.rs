//! Reference engine tests
//!
//! These tests validate the problems, rules and solutions the engine
//! reports for the situations the conflict resolver has to handle.

use super::*;
use crate::package::Package;
use autosolv_evr::{Dependency, Evr};

/// Helper to create an x86_64 package
fn pkg(name: &str, evr: &str) -> Package {
    Package::new(name, Evr::parse(evr).unwrap(), "x86_64")
}

/// Helper to create a package with an explicit architecture
fn pkg_arch(name: &str, evr: &str, arch: &str) -> Package {
    Package::new(name, Evr::parse(evr).unwrap(), arch)
}

/// Helper to create a package with requirements
fn pkg_with_requires(name: &str, evr: &str, requires: &[&str]) -> Package {
    let mut p = pkg(name, evr);
    p.requires = requires.iter().map(|r| Dependency::parse(r).unwrap()).collect();
    p
}

fn dep(s: &str) -> Dependency {
    Dependency::parse(s).unwrap()
}

fn installs(solver: &Solver, pool: &Pool) -> Vec<String> {
    let mut names: Vec<String> = solver
        .transaction(pool)
        .unwrap()
        .installs()
        .map(|id| pool.nevra(id))
        .collect();
    names.sort();
    names
}

fn root_info(problem: &Problem) -> &RuleInfo {
    &problem.root_rule().unwrap().infos()[0]
}

// ============================================================================
// Basic Installation Tests
// ============================================================================

#[test]
fn test_install_single() {
    let pool = Pool::builder().add_package(pkg("a", "1.0-1")).build();
    let jobs: JobList = vec![Job::install(0)].into();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert_eq!(installs(&solver, &pool), vec!["a-1.0-1.x86_64"]);
    assert_eq!(solver.solve_count(), 1);
}

#[test]
fn test_install_with_dependencies() {
    let pool = Pool::builder()
        .add_package(pkg_with_requires("a", "1.0-1", &["b >= 1.0", "rpmlib(PayloadIsXz) <= 5.2-1"]))
        .add_package(pkg_with_requires("b", "1.0-1", &["c"]))
        .add_package(pkg("c", "1.0-1"))
        .add_package(pkg("c", "2.0-1"))
        .build();
    let jobs: JobList = vec![Job::install(0)].into();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert_eq!(
        installs(&solver, &pool),
        vec!["a-1.0-1.x86_64", "b-1.0-1.x86_64", "c-2.0-1.x86_64"]
    );

    // providers come first
    let order: Vec<PackageId> = solver.transaction(&pool).unwrap().installs().collect();
    assert_eq!(order, vec![3, 1, 0]);
}

#[test]
fn test_install_name_job_picks_best() {
    let pool = Pool::builder()
        .add_package(pkg("a", "1.0-1"))
        .add_package(pkg("a", "2.0-1"))
        .add_package(pkg_arch("a", "3.0-1", "i686"))
        .build();
    let jobs: JobList = vec![Job::new(JobAction::Install, JobTarget::Name("a".into()))].into();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert_eq!(installs(&solver, &pool), vec!["a-2.0-1.x86_64"]);
}

#[test]
fn test_file_requirement() {
    let mut bash = pkg("bash", "5.0-1");
    bash.files.push("/usr/bin/bash".to_string());
    let pool = Pool::builder()
        .add_package(pkg_with_requires("script", "1.0-1", &["/usr/bin/bash"]))
        .add_package(bash)
        .build();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &vec![Job::install(0)].into()).unwrap().is_empty());
    assert_eq!(installs(&solver, &pool), vec!["bash-5.0-1.x86_64", "script-1.0-1.x86_64"]);
}

#[test]
fn test_neutralized_jobs_are_ignored() {
    let pool = Pool::builder().add_package(pkg("a", "1.0-1")).build();
    let jobs: JobList = vec![Job::install(0).to_noop()].into();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert!(solver.transaction(&pool).unwrap().is_empty());
}

#[test]
fn test_transaction_requires_successful_solve() {
    let pool = Pool::builder().add_package(pkg_with_requires("a", "1.0-1", &["missing"])).build();
    let mut solver = Solver::new();
    assert!(matches!(solver.transaction(&pool), Err(crate::SolvError::Engine(_))));

    assert_eq!(solver.solve(&pool, &vec![Job::install(0)].into()).unwrap().len(), 1);
    assert!(solver.transaction(&pool).is_err());
}

// ============================================================================
// Problem Classification Tests
// ============================================================================

#[test]
fn test_nothing_provides() {
    let pool = Pool::builder().add_package(pkg_with_requires("a", "1.0-1", &["libmissing.so.1"])).build();
    let jobs: JobList = vec![Job::install(0)].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].id, 1);
    assert_eq!(problems[0].root_rule().unwrap().kind(), RuleKind::Package);

    let info = root_info(&problems[0]);
    assert_eq!(info.kind, RuleInfoKind::NothingProvides);
    assert_eq!(info.package, Some(0));
    assert_eq!(info.dependency, Some(dep("libmissing.so.1")));

    let texts: Vec<String> = problems[0].solutions().iter().map(|s| s.text()).collect();
    assert_eq!(texts, vec!["do not ask to install a-1.0-1.x86_64"]);
}

#[test]
fn test_same_name() {
    let pool = Pool::builder()
        .add_package(pkg("x", "1.0-1"))
        .add_package(pkg("x", "2.0-1"))
        .build();
    let jobs: JobList = vec![Job::install(0), Job::install(1)].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    assert_eq!(problems.len(), 1);
    let info = root_info(&problems[0]);
    assert_eq!(info.kind, RuleInfoKind::SameName);
    assert_eq!(info.package, Some(0));
    assert_eq!(info.other_package, Some(1));
    assert_eq!(problems[0].solutions().len(), 2);
}

#[test]
fn test_multiversion_allows_same_name() {
    let pool = Pool::builder()
        .add_package(pkg("kernel", "5.0-1"))
        .add_package(pkg("kernel", "5.1-1"))
        .build();
    let jobs: JobList = vec![Job::install(0), Job::install(1), Job::multiversion("kernel")].into();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert_eq!(installs(&solver, &pool).len(), 2);
}

#[test]
fn test_same_name_other_arch_is_allowed() {
    let pool = Pool::builder()
        .add_package(pkg("glibc", "2.29-1"))
        .add_package(pkg_arch("glibc", "2.29-1", "i686"))
        .build();
    let jobs: JobList = vec![Job::install(0), Job::install(1)].into();

    assert!(Solver::new().solve(&pool, &jobs).unwrap().is_empty());
}

#[test]
fn test_requires_blocked_by_same_name() {
    let pool = Pool::builder()
        .add_package(pkg("a", "1.0-1"))
        .add_package(pkg("a", "2.0-1"))
        .add_package(pkg_with_requires("b", "1.0-1", &["a >= 2.0"]))
        .build();
    let jobs: JobList = vec![Job::install(0), Job::install(2)].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    assert_eq!(problems.len(), 1);
    let info = root_info(&problems[0]);
    assert_eq!(info.kind, RuleInfoKind::Requires);
    assert_eq!(info.package, Some(2));
    assert_eq!(info.other_package, Some(0));
    assert_eq!(info.dependency, Some(dep("a >= 2.0")));

    let solutions = problems[0].solutions();
    assert_eq!(solutions.len(), 2);
    assert_eq!(solutions[0].text(), "install a-2.0-1.x86_64 instead of a-1.0-1.x86_64");
    assert_eq!(
        solutions[0].elements(),
        &[SolutionElement::ReplaceJob { position: 0, job: Job::install(1) }]
    );
    assert_eq!(solutions[1].text(), "do not ask to install b-1.0-1.x86_64");
}

#[test]
fn test_conflicts() {
    let mut a = pkg("a", "1.0-1");
    a.conflicts.push(dep("b"));
    let pool = Pool::builder().add_package(a).add_package(pkg("b", "1.0-1")).build();
    let jobs: JobList = vec![Job::install(0), Job::install(1)].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    assert_eq!(problems.len(), 1);
    let info = root_info(&problems[0]);
    assert_eq!(info.kind, RuleInfoKind::Conflicts);
    assert_eq!(info.package, Some(0));
    assert_eq!(info.other_package, Some(1));
    assert_eq!(info.dependency, Some(dep("b")));
}

#[test]
fn test_obsoletes() {
    let mut new = pkg("new-tool", "2.0-1");
    new.obsoletes.push(dep("old-tool < 2.0"));
    let pool = Pool::builder().add_package(pkg("old-tool", "1.0-1")).add_package(new).build();
    let jobs: JobList = vec![Job::install(0), Job::install(1)].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    let info = root_info(&problems[0]);
    assert_eq!(info.kind, RuleInfoKind::Obsoletes);
    assert_eq!(info.package, Some(1));
    assert_eq!(info.other_package, Some(0));
}

#[test]
fn test_job_conflict_with_erase() {
    let pool = Pool::builder().add_package(pkg("a", "1.0-1")).build();
    let jobs: JobList = vec![
        Job::new(JobAction::Lock, JobTarget::Name("a".into())),
        Job::install(0),
    ]
    .into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    let rule = problems[0].root_rule().unwrap();
    assert_eq!(rule.kind(), RuleKind::Job);
    assert_eq!(rule.infos()[0].kind, RuleInfoKind::JobConflict);
    assert_eq!(rule.infos()[0].job, Some(1));
}

#[test]
fn test_job_nothing_provides() {
    let pool = Pool::builder().add_package(pkg("a", "1.0-1")).build();
    let jobs: JobList = vec![Job::new(JobAction::Install, JobTarget::Provides(dep("ghost")))].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    let info = root_info(&problems[0]);
    assert_eq!(info.kind, RuleInfoKind::JobNothingProvides);
    assert_eq!(info.job, Some(0));
    assert_eq!(info.dependency, Some(dep("ghost")));
}

#[test]
fn test_not_installable_arch() {
    let pool = Pool::builder().add_package(pkg_arch("a", "1.0-1", "aarch64")).build();
    let problems = Solver::new().solve(&pool, &vec![Job::install(0)].into()).unwrap();
    assert_eq!(root_info(&problems[0]).kind, RuleInfoKind::NotInstallable);
}

#[test]
fn test_inferior_arch() {
    let pool = Pool::builder()
        .add_package(pkg_arch("a", "1.0-1", "i686"))
        .add_package(pkg("a", "1.0-1"))
        .build();
    let jobs: JobList = vec![Job::install(0)].into();

    assert!(Solver::new().solve(&pool, &jobs).unwrap().is_empty());

    let problems = Solver::new().with_infarch_check(true).solve(&pool, &jobs).unwrap();
    assert_eq!(problems.len(), 1);
    let rule = problems[0].root_rule().unwrap();
    assert_eq!(rule.kind(), RuleKind::InferiorArch);
    assert_eq!(rule.infos()[0].package, Some(0));
    assert_eq!(rule.infos()[0].other_package, Some(1));
    assert_eq!(
        problems[0].solutions()[0].text(),
        "install a-1.0-1.x86_64 instead of a-1.0-1.i686"
    );
}

#[test]
fn test_requires_with_locked_provider() {
    let mut lib32 = pkg_arch("libfoo", "2.0-1", "i686");
    lib32.provides.push(dep("libfoo-api = 2"));
    let mut lib64 = pkg("libfoo", "1.0-1");
    lib64.provides.push(dep("libfoo-api = 1"));
    let pool = Pool::builder()
        .add_package(lib64)
        .add_package(lib32)
        .add_package(pkg_with_requires("app", "1.0-1", &["libfoo-api >= 2"]))
        .build();
    let jobs: JobList = vec![Job::install(0), Job::install(2)].into();

    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    assert!(problems.is_empty(), "different arches install side by side");

    let jobs: JobList = vec![
        Job::install(0),
        Job::install(2),
        Job::new(JobAction::Lock, JobTarget::Solvable(1)),
    ]
    .into();
    let problems = Solver::new().solve(&pool, &jobs).unwrap();
    assert_eq!(root_info(&problems[0]).kind, RuleInfoKind::Requires);
    assert_eq!(root_info(&problems[0]).other_package, None);
}

#[test]
fn test_weak_job_problems_are_dropped() {
    let pool = Pool::builder()
        .add_package(pkg_with_requires("a", "1.0-1", &["missing"]))
        .add_package(pkg("b", "1.0-1"))
        .build();
    let jobs: JobList = vec![Job::install(0).with_flags(JobFlags::WEAK), Job::install(1)].into();

    let mut solver = Solver::new();
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert!(installs(&solver, &pool).contains(&"b-1.0-1.x86_64".to_string()));
}

#[test]
fn test_fresh_state_each_solve() {
    let mut pool = Pool::builder()
        .add_package(pkg_with_requires("a", "1.0-1", &["missing"]))
        .build();
    let jobs: JobList = vec![Job::install(0)].into();

    let mut solver = Solver::new();
    assert_eq!(solver.solve(&pool, &jobs).unwrap().len(), 1);
    pool.remove_requires(0, &dep("missing"));
    assert!(solver.solve(&pool, &jobs).unwrap().is_empty());
    assert_eq!(solver.solve_count(), 2);
}
