use std::io;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden_app::SecurityFilter;
use warden_domain::Operation;
use warden_main::{hook, proxy::Proxy, Cli, TopLevelCommand};

fn main() {
    // Logs go to stderr: stdout is the wire in proxy mode and the decision
    // surface in check mode.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut filter = SecurityFilter::new()?;
    if let Some(base_dir) = cli.base_dir.clone().or_else(|| std::env::current_dir().ok()) {
        filter = filter.base_dir(base_dir);
    }

    match cli.subcommands {
        Some(TopLevelCommand::Hook) => Ok(hook::run(&filter, io::stdin().lock())),
        None => match cli.check {
            Some(path) => {
                let op: Operation = cli
                    .op
                    .parse()
                    .map_err(|_| anyhow!("unknown operation '{}'", cli.op))?;

                let decision = filter.check(op, &path);
                println!("Decision: {}", decision.verdict);
                println!("Reason: {}", decision.reason);
                Ok(if decision.is_deny() { 2 } else { 0 })
            }
            None => {
                Proxy::new(filter).run(io::stdin().lock(), io::stdout().lock())?;
                Ok(0)
            }
        },
    }
}
