//! Package pool, jobs and the resolution engine interface.
//!
//! # Architecture
//!
//! - [`Pool`]: registry of all available packages with lookup by name,
//!   capability and file
//! - [`Job`] / [`JobList`]: what the caller asks for, at stable positions
//! - [`Selection`]: token matching against the pool
//! - [`Engine`]: `solve(pool, jobs) -> problems`, then `transaction(pool)`
//! - [`Problem`], [`Rule`], [`RuleInfo`], [`Solution`]: why a job list
//!   cannot be satisfied and what the engine proposes to change
//! - [`Solver`]: the deterministic reference engine
//!
//! # Example
//!
//! ```ignore
//! use autosolv_pm::solver::{Engine, Job, JobList, Pool, Solver};
//!
//! let pool = Pool::default();
//! // ... add packages to pool
//!
//! let jobs: JobList = vec![Job::install(0)].into();
//! let mut solver = Solver::new();
//! if solver.solve(&pool, &jobs)?.is_empty() {
//!     let transaction = solver.transaction(&pool)?;
//! }
//! ```

mod arch;
mod engine;
mod job;
mod policy;
mod pool;
mod problem;
mod rule;
mod selection;
mod solver;
mod transaction;

#[cfg(test)]
mod tests;

pub use arch::ArchPolicy;
pub use engine::Engine;
pub use job::{Job, JobAction, JobFlags, JobList, JobTarget};
pub use policy::Policy;
pub use pool::{PackageId, Pool, PoolBuilder, RepoInfo};
pub use problem::{Problem, Solution, SolutionElement};
pub use rule::{Rule, RuleInfo, RuleInfoKind, RuleKind};
pub use selection::{Selection, SelectionKind, SelectionOp};
pub use solver::Solver;
pub use transaction::{Operation, Transaction, TransactionSummary};
