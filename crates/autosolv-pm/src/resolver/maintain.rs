use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::error::Result;
use crate::solver::{JobList, PackageId, Pool};

/// Outcome of a maintenance pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maintenance {
    /// Jobs neutralized because a newer one holds the same name and arch
    pub superseded: usize,
    /// Neutralized slots dropped from the list
    pub removed: usize,
}

/// Keep one install job per name and architecture, then compact.
///
/// Only active install/update jobs targeting exactly one package take
/// part. The highest EVR wins, the earliest position on ties. Positions
/// change here and nowhere else.
pub fn maintain(jobs: &mut JobList, pool: &Pool) -> Result<Maintenance> {
    let mut kept: IndexMap<(&str, &str), (usize, PackageId)> = IndexMap::new();
    let mut losers = Vec::new();

    for (position, job) in jobs.active() {
        if !job.action.is_install_like() {
            continue;
        }
        let Some(id) = job.single_solvable(pool) else { continue };
        let Some(pkg) = pool.package(id) else { continue };

        match kept.get_mut(&(pkg.name.as_str(), pkg.arch.as_str())) {
            None => {
                kept.insert((pkg.name.as_str(), pkg.arch.as_str()), (position, id));
            }
            Some(current) => {
                if pool.evrcmp(id, current.1) == Ordering::Greater {
                    log::debug!("{} supersedes {}", pool.nevra(id), pool.nevra(current.1));
                    losers.push(current.0);
                    *current = (position, id);
                } else {
                    losers.push(position);
                }
            }
        }
    }

    for &position in &losers {
        jobs.neutralize(position)?;
    }
    let removed = jobs.compact();

    Ok(Maintenance {
        superseded: losers.len(),
        removed,
    })
}
