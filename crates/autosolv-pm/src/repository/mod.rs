mod manager;
mod repository;

pub use manager::RepositoryManager;
pub use repository::{Repository, RepositoryFile, DEFAULT_PRIORITY};
