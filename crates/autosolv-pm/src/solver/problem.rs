use super::job::Job;
use super::pool::{PackageId, Pool};
use super::rule::Rule;

/// One step of a solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionElement {
    /// Replace the job at `position` of the solved job list
    ReplaceJob { position: usize, job: Job },
    /// Append a new job
    AddJob { job: Job },
}

impl SolutionElement {
    pub fn job(&self) -> &Job {
        match self {
            SolutionElement::ReplaceJob { job, .. } | SolutionElement::AddJob { job } => job,
        }
    }
}

/// An engine-proposed fix for a problem
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    elements: Vec<SolutionElement>,
    texts: Vec<String>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, element: SolutionElement, text: impl Into<String>) -> Self {
        self.elements.push(element);
        self.texts.push(text.into());
        self
    }

    pub fn elements(&self) -> &[SolutionElement] {
        &self.elements
    }

    /// Text of each element
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn text(&self) -> String {
        self.texts.join(", ")
    }

    /// Packages the solution would install: the targets of every active job
    /// it introduces
    pub fn packages(&self, pool: &Pool) -> Vec<PackageId> {
        let mut packages = Vec::new();
        for element in &self.elements {
            let job = element.job();
            if !job.is_active() {
                continue;
            }
            for id in job.solvables(pool) {
                if !packages.contains(&id) {
                    packages.push(id);
                }
            }
        }
        packages
    }
}

/// A reason why a job list cannot be satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// 1-based, unique within one solve
    pub id: usize,
    rules: Vec<Rule>,
    solutions: Vec<Solution>,
}

impl Problem {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            rules: Vec::new(),
            solutions: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn add_solution(&mut self, solution: Solution) {
        self.solutions.push(solution);
    }

    /// The rule that caused the problem
    pub fn root_rule(&self) -> Option<&Rule> {
        self.rules.first()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// Generate a human-readable description of this problem
    pub fn describe(&self, pool: &Pool) -> String {
        let mut lines = vec![format!("Problem {}:", self.id)];
        for rule in &self.rules {
            lines.push(format!("  - {}", rule.describe(pool)));
        }
        for (index, solution) in self.solutions.iter().enumerate() {
            lines.push(format!("  Solution {}: {}", index + 1, solution.text()));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use crate::solver::rule::{RuleInfo, RuleInfoKind, RuleKind};
    use autosolv_evr::Evr;

    fn pool() -> Pool {
        Pool::builder()
            .add_package(Package::new("a", Evr::parse("1.0-1").unwrap(), "x86_64"))
            .add_package(Package::new("b", Evr::parse("1.0-1").unwrap(), "x86_64"))
            .build()
    }

    #[test]
    fn test_root_rule() {
        let mut problem = Problem::new(1);
        assert!(problem.root_rule().is_none());

        problem.add_rule(Rule::new(RuleKind::Job).with_info(RuleInfo::new(RuleInfoKind::JobConflict)));
        problem.add_rule(Rule::new(RuleKind::Package));
        assert_eq!(problem.root_rule().map(|r| r.kind()), Some(RuleKind::Job));
        assert_eq!(problem.rules().len(), 2);
    }

    #[test]
    fn test_solution_packages() {
        let pool = pool();
        let solution = Solution::new()
            .with_element(
                SolutionElement::ReplaceJob { position: 0, job: Job::install(0).to_noop() },
                "do not ask to install a-1.0-1.x86_64",
            )
            .with_element(SolutionElement::AddJob { job: Job::install(1) }, "install b-1.0-1.x86_64");

        assert_eq!(solution.packages(&pool), vec![1]);
        assert_eq!(
            solution.text(),
            "do not ask to install a-1.0-1.x86_64, install b-1.0-1.x86_64"
        );
        assert_eq!(solution.elements()[1].job(), &Job::install(1));
    }

    #[test]
    fn test_describe() {
        let pool = pool();
        let mut problem = Problem::new(2).with_rule(
            Rule::new(RuleKind::Package)
                .with_info(RuleInfo::new(RuleInfoKind::SameName).with_package(0).with_other_package(0)),
        );
        problem.add_solution(Solution::new().with_element(
            SolutionElement::AddJob { job: Job::install(1) },
            "install b-1.0-1.x86_64",
        ));

        let text = problem.describe(&pool);
        assert!(text.starts_with("Problem 2:"));
        assert!(text.contains("cannot install both a-1.0-1.x86_64 and a-1.0-1.x86_64"));
        assert!(text.contains("Solution 1: install b-1.0-1.x86_64"));
    }
}
