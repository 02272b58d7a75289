use anyhow::{bail, Context, Result};
use autosolv_pm::report::{build_report, write_report};
use autosolv_pm::repository::{Repository, RepositoryManager};
use autosolv_pm::resolver::{ConflictResolver, JobBuilder, ResolverOptions, DEFAULT_MAX_ROUNDS};
use autosolv_pm::solver::{ArchPolicy, JobFlags, Pool, Solver, Transaction};
use clap::Args;
use console::style;
use std::path::{Path, PathBuf};

use crate::config::AutosolvConfig;

const DEFAULT_BASEARCH: &str = "x86_64";
const DEFAULT_RELEASEVER: &str = "30";

#[derive(Args, Debug, Default)]
pub struct SolveArgs {
    /// Packages, globs, capabilities or package-list files.
    /// Accepts `repo:`, `job:` and `selection:` prefixes
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Directory of repository JSON files
    #[arg(long)]
    pub repodir: Option<PathBuf>,

    /// Base architecture [default: x86_64]
    #[arg(long)]
    pub basearch: Option<String>,

    /// Release version [default: 30]
    #[arg(long)]
    pub releasever: Option<String>,

    /// Directory to use for the data.json export [default: ./]
    #[arg(long)]
    pub exportdir: Option<PathBuf>,

    /// Fulfill jobs when possible without reporting a problem otherwise
    #[arg(long)]
    pub weak: bool,

    /// Give up after this many solve rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Report requests for packages that have a better-arch build
    #[arg(long)]
    pub infarch_check: bool,

    /// Drop every conflict and obsolete before solving
    #[arg(long)]
    pub strip_conflicts: bool,

    /// Use this configuration file instead of searching for autosolv.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Effective settings after merging flags, configuration and defaults
#[derive(Debug)]
struct Settings {
    basearch: String,
    releasever: String,
    repodir: Option<PathBuf>,
    exportdir: PathBuf,
    weak: bool,
    max_rounds: usize,
    infarch_check: bool,
    strip_conflicts: bool,
    config: AutosolvConfig,
}

impl Settings {
    fn merge(args: &SolveArgs, config: AutosolvConfig) -> Self {
        Self {
            basearch: args
                .basearch
                .clone()
                .or_else(|| config.basearch.clone())
                .unwrap_or_else(|| DEFAULT_BASEARCH.to_string()),
            releasever: args
                .releasever
                .clone()
                .or_else(|| config.releasever.clone())
                .unwrap_or_else(|| DEFAULT_RELEASEVER.to_string()),
            repodir: args
                .repodir
                .clone()
                .or_else(|| config.repodir.as_ref().map(|dir| config.base_dir.join(dir))),
            exportdir: args
                .exportdir
                .clone()
                .or_else(|| config.exportdir.as_ref().map(|dir| config.base_dir.join(dir)))
                .unwrap_or_else(|| PathBuf::from("./")),
            weak: args.weak || config.weak.unwrap_or(false),
            max_rounds: args.max_rounds.or(config.max_rounds).unwrap_or(DEFAULT_MAX_ROUNDS),
            infarch_check: args.infarch_check || config.infarch_check.unwrap_or(false),
            strip_conflicts: args.strip_conflicts,
            config,
        }
    }
}

pub fn execute(args: SolveArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => AutosolvConfig::load_file(path)?,
        None => AutosolvConfig::load_from_cwd()?.unwrap_or_default(),
    };
    let settings = Settings::merge(&args, config);

    let mut pool = load_pool(&settings)?;
    if settings.strip_conflicts {
        let stripped = pool.strip_conflicts_and_obsoletes();
        log::info!("Stripped {} conflicts and obsoletes", stripped);
    }

    let tokens = expand_tokens(&args.packages)?;

    let mut flags = JobFlags::CLEANDEPS;
    if settings.weak {
        flags |= JobFlags::WEAK;
    }
    let mut builder = JobBuilder::new(&pool).with_flags(flags);
    builder.add_tokens(&tokens)?;
    let mut jobs = builder.build();

    if jobs.active_count() == 0 {
        println!("no package matched.");
        return Ok(1);
    }

    let solver = Solver::new().with_infarch_check(settings.infarch_check);
    let mut resolver = ConflictResolver::new(solver)
        .with_options(ResolverOptions::default().with_max_rounds(settings.max_rounds));
    let transaction = resolver
        .resolve(&mut pool, &mut jobs)
        .context("Dependency resolution failed")?;

    if transaction.is_empty() {
        println!("Nothing to do.");
        return Ok(0);
    }

    log::info!("Transaction: {}", transaction.summary(&pool));
    print_summary(&pool, &transaction);

    let report = build_report(&pool, &transaction);
    let path = write_report(&report, &settings.exportdir)
        .with_context(|| format!("Failed to write report to {}", settings.exportdir.display()))?;
    println!("{} Wrote {}", style("Info:").cyan(), path.display());

    Ok(0)
}

fn load_pool(settings: &Settings) -> Result<Pool> {
    let mut manager = RepositoryManager::new();

    if let Some(dir) = &settings.repodir {
        if !dir.is_dir() {
            bail!("Repository directory {} does not exist", dir.display());
        }
        let count = manager
            .load_dir(dir)
            .with_context(|| format!("Failed to load repositories from {}", dir.display()))?;
        log::debug!("Loaded {} repositories from {}", count, dir.display());
    }

    for repo in &settings.config.repos {
        let path = repo.resolve_path(&settings.releasever, &settings.basearch, &settings.config.base_dir);
        let mut loaded = Repository::load(&path)
            .with_context(|| format!("Failed to load repository '{}' from {}", repo.name, path.display()))?
            .with_priority(repo.priority);
        loaded.name = repo.name.clone();
        loaded.enabled = repo.enabled;
        manager.add_repository(loaded);
    }

    if manager.repositories().is_empty() {
        bail!("No repositories configured, use --repodir or a [[repo]] entry in autosolv.toml");
    }

    Ok(manager.into_pool(ArchPolicy::new(&settings.basearch)))
}

/// Replace tokens naming a readable file by the file's lines.
/// `#` starts a comment.
fn expand_tokens(args: &[String]) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if path.is_file() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read package list {}", path.display()))?;
            tokens.extend(parse_package_list(&content));
        } else {
            tokens.push(arg.clone());
        }
    }
    Ok(tokens)
}

fn parse_package_list(content: &str) -> impl Iterator<Item = String> + '_ {
    content.lines().filter_map(|line| {
        let token = line.split('#').next().unwrap_or("").trim();
        (!token.is_empty()).then(|| token.to_string())
    })
}

fn print_summary(pool: &Pool, transaction: &Transaction) {
    println!();
    println!("{}", style("Transaction summary:").bold());
    println!();
    println!("{} installed packages:", transaction.len());
    for id in transaction.installs() {
        println!("  - {}", style(pool.nevra(id)).green());
    }
    println!(
        "install size change: {} K",
        transaction.install_size_change(pool) / 1024
    );
}
