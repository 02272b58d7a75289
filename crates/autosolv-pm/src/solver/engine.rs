use super::job::JobList;
use super::pool::Pool;
use super::problem::Problem;
use super::transaction::Transaction;
use crate::error::Result;

/// A resolution engine driven by the conflict resolver.
///
/// Every `solve` call starts from fresh solver state bound to the given
/// pool, so dependency edits made between calls are picked up.
pub trait Engine {
    /// Solve `jobs` against `pool`. Job positions in the returned rules and
    /// solution elements refer to `jobs`.
    fn solve(&mut self, pool: &Pool, jobs: &JobList) -> Result<Vec<Problem>>;

    /// Transaction of the last solve that reported no problems
    fn transaction(&self, pool: &Pool) -> Result<Transaction>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn solve(&mut self, pool: &Pool, jobs: &JobList) -> Result<Vec<Problem>> {
        (**self).solve(pool, jobs)
    }

    fn transaction(&self, pool: &Pool) -> Result<Transaction> {
        (**self).transaction(pool)
    }
}
