use super::print::{print_config, print_messages, print_rules};
use super::setup::{Cli, Commands};
use clap::Parser;
use resub::api::{CmdMessage, CmdResult, ConfigAction};
use resub::error::{ResubError, Result};
use resub::init::{initialize, load_config, rules_path, ResubContext};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    PartialFailure,
}

pub fn run() -> Result<Outcome> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let rules_override = cli.rules.as_deref();

    let result = match cli.command {
        Commands::Init => handle_init(&cwd, rules_override)?,
        Commands::Config { key, value } => handle_config(&cwd, key, value)?,
        Commands::Rules => {
            let ctx = init_context(&cwd, rules_override)?;
            handle_rules(&ctx)?
        }
        Commands::Repack { path } => {
            let ctx = init_mutating_context(&cwd, rules_override)?;
            ctx.api.repackage_container(&path, cli.force)?
        }
        Commands::Containers { dir } => {
            let ctx = init_mutating_context(&cwd, rules_override)?;
            ctx.api.scan_and_repackage_containers(&dir, cli.force)?
        }
        Commands::Text { dir } => {
            let ctx = init_mutating_context(&cwd, rules_override)?;
            ctx.api.scan_and_rewrite_plain_text(&dir)?
        }
    };

    print_messages(&result.messages);
    if result.has_failures() {
        Ok(Outcome::PartialFailure)
    } else {
        Ok(Outcome::Clean)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "resub=debug" } else { "resub=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cwd: &Path, rules_override: Option<&Path>) -> Result<ResubContext> {
    let ctx = initialize(cwd, rules_override)?;
    if ctx.bootstrapped_rules {
        print_messages(&[CmdMessage::warning(format!(
            "Rules file not found. An example was created at {}",
            ctx.api.rules_path().display()
        ))]);
    }
    Ok(ctx)
}

/// Like `init_context`, but refuses to edit files with freshly generated example rules.
fn init_mutating_context(cwd: &Path, rules_override: Option<&Path>) -> Result<ResubContext> {
    let ctx = init_context(cwd, rules_override)?;
    if ctx.bootstrapped_rules {
        return Err(ResubError::RuleSourceMissing(
            ctx.api.rules_path().to_path_buf(),
        ));
    }
    Ok(ctx)
}

fn handle_init(cwd: &Path, rules_override: Option<&Path>) -> Result<CmdResult> {
    let config = load_config(cwd)?;
    let path = rules_path(cwd, &config, rules_override);
    resub::commands::init::run(&path)
}

fn handle_rules(ctx: &ResubContext) -> Result<CmdResult> {
    let result = ctx.api.show_rules()?;
    print_rules(&result.rules);
    Ok(result)
}

fn handle_config(cwd: &Path, key: Option<String>, value: Option<String>) -> Result<CmdResult> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = resub::commands::config::run(cwd, action.clone())?;
    if let (ConfigAction::ShowAll, Some(config)) = (&action, &result.config) {
        print_config(config);
    }
    Ok(result)
}
