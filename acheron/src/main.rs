/*!
 * Interactive search-and-install front-end for dnf.
 * Ranks the repo packages matching every search term, lets the user
 * pick results by number, and hands the selection to dnf. With no
 * terms at all it runs a full system upgrade instead.
 */
mod search_command;

use ach_core::config::Config;
use ach_core::index::FieldSet;
use ach_core::install;
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use search_command::SearchCommand;
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;

#[derive(Parser, Debug)]
#[command(name = "acheron", version, about = "Search the dnf repos and install packages by number")]
struct Cli {
    /// Search terms; every term must match somewhere. Globs allowed.
    terms: Vec<String>,

    /// Show every available version, not just the newest per name
    #[arg(short = 'a', long)]
    all_versions: bool,

    /// List results top-down instead of strongest-match-last
    #[arg(short = 'f', long)]
    forward: bool,

    /// Do not match terms against package summaries
    #[arg(short = 'S', long)]
    no_summary: bool,

    /// Also match terms against package descriptions
    #[arg(short = 'd', long)]
    description: bool,

    /// Drive the install transaction directly instead of calling the
    /// engine's install subcommand (experimental, needs root)
    #[arg(short = 't', long)]
    transaction: bool,

    /// Print the engine command instead of running it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    assume_yes: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().filter_or("ACHERON_LOG", "warn")).init();
    install_sigint_handler()?;

    let cli = Cli::parse();
    let config = Config::load();

    if cli.terms.is_empty() {
        install::upgrade(&config, cli.assume_yes, cli.dry_run)
            .context("system upgrade failed")?;
        return Ok(());
    }

    let command = SearchCommand {
        terms: cli.terms,
        fields: FieldSet {
            name: true,
            summary: !cli.no_summary,
            description: cli.description,
        },
        latest_only: !cli.all_versions,
        reverse: config.reverse_display && !cli.forward,
        use_transaction: cli.transaction,
        dry_run: cli.dry_run,
        assume_yes: cli.assume_yes,
        config,
    };
    return command.execute();
}

/// Ctrl-C anywhere (prompt, subprocess wait) ends the run: a newline
/// so the shell prompt lands clean, then exit status 1.
fn install_sigint_handler() -> anyhow::Result<()> {
    let mut signals = Signals::new([SIGINT]).context("could not install signal handler")?;
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            eprintln!();
            std::process::exit(1);
        }
    });
    return Ok(());
}
