mod config;
mod solve;

use anyhow::Result;
use clap::Parser;
use console::style;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "autosolv")]
#[command(about = "RPM dependency solver that resolves conflicts without asking")]
#[command(version)]
struct Args {
    #[command(flatten)]
    solve: solve::SolveArgs,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

fn run() -> Result<i32> {
    let args = Args::parse();
    init_logging(args.verbose);
    solve::execute(args.solve)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
