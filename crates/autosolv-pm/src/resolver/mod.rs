//! Automated conflict resolution around an [`Engine`](crate::solver::Engine).
//!
//! - [`JobBuilder`]: package tokens and directives to the initial job list
//! - [`JobCache`]: per-round index of the jobs holding each package
//! - [`ConflictResolver`]: the solve, remediate, maintain loop
//! - [`maintain`]: one install job per name and arch, then compaction

mod builder;
mod cache;
mod maintain;
mod resolver;


pub use builder::JobBuilder;
pub use cache::{JobCache, JobCacheEntry};
pub use maintain::{maintain, Maintenance};
pub use resolver::{pick_solution, ConflictResolver, ResolverOptions, DEFAULT_MAX_ROUNDS};
