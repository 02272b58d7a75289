use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolvError {
    // Job construction errors
    #[error("nothing matches '{0}'")]
    NothingMatches(String),

    #[error("No repository named \"{name}\", possible repositories: {available}")]
    UnknownRepository { name: String, available: String },

    #[error("Unknown job flag \"{flag}\" in \"{token}\"")]
    UnknownJobFlag { flag: String, token: String },

    #[error("Unknown selection operation \"{op}\" in \"{token}\"")]
    UnknownSelectionOp { op: String, token: String },

    #[error("Malformed directive \"{0}\"")]
    MalformedDirective(String),

    // Resolution errors
    #[error("Unhandled rule in problem {problem}: {rule}/{info} ({packages})")]
    UnhandledRule {
        problem: usize,
        rule: String,
        info: String,
        packages: String,
    },

    #[error("Problem {problem} has no root rule")]
    MissingRootRule { problem: usize },

    #[error("Resolution did not converge after {rounds} rounds, {problems} problems left")]
    NotConverged { rounds: usize, problems: usize },

    #[error("Problem {problem} offers no solution to apply")]
    NoSolution { problem: usize },

    #[error("Solver error: {0}")]
    Engine(String),

    #[error("Job position {0} is out of range")]
    InvalidJobPosition(usize),

    // Package data errors
    #[error(transparent)]
    Evr(#[from] autosolv_evr::EvrError),

    #[error("Failed to parse repository data: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid repository {name}: {message}")]
    InvalidRepository { name: String, message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SolvError>;
