pub mod error;
pub mod package;
pub mod report;
pub mod repository;
pub mod resolver;
pub mod solver;

pub use error::{Result, SolvError};
pub use package::{Advisory, Package, PackageKind};
pub use repository::{Repository, RepositoryManager};
pub use resolver::{ConflictResolver, JobBuilder, JobCache, ResolverOptions};
pub use solver::{
    ArchPolicy, Engine, Job, JobAction, JobFlags, JobList, JobTarget, Policy, Pool, Problem,
    Solver, Transaction,
};
