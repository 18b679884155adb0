/*!
 * Hands the selected packages to the engine. The default path builds a
 * `sudo dnf install` command line and lets dnf own the conversation;
 * the experimental path drives resolve/download/apply as separate
 * engine steps with our own confirmation in between.
 */
use std::process::{Command, Stdio};

use duct::cmd;
use thiserror::Error;

use crate::config::Config;
use crate::display::human_size;
use crate::get_user_permission;
use crate::index::PkgRecord;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("could not run '{0}': {1}")]
    Engine(String, #[source] std::io::Error),
    #[error("transaction {0} step exited with {1}")]
    Step(&'static str, std::process::ExitStatus),
}

/* SUBCOMMAND STRATEGY */
/// Argv for the subcommand strategy, privilege wrapper first.
pub fn install_args(config: &Config, pkgs: &[PkgRecord], assume_yes: bool) -> Vec<String> {
    let mut args = vec![
        config.privilege_wrapper.to_owned(),
        config.pkg_manager.to_owned(),
        "install".to_string(),
    ];
    if assume_yes {
        args.push("-y".to_string());
    }
    args.extend(pkgs.iter().map(|pkg| pkg.specifier()));
    return args;
}

pub fn upgrade_args(config: &Config, assume_yes: bool) -> Vec<String> {
    let mut args = vec![
        config.privilege_wrapper.to_owned(),
        config.pkg_manager.to_owned(),
        "upgrade".to_string(),
    ];
    if assume_yes {
        args.push("-y".to_string());
    }
    return args;
}

/// `sudo dnf install <specifier>...` with the terminal attached; the
/// engine owns confirmation and progress on this path.
pub fn install(config: &Config, pkgs: &[PkgRecord], assume_yes: bool, dry_run: bool) -> Result<(), InstallError> {
    let argv = install_args(config, pkgs, assume_yes);
    if dry_run {
        println!("{}", argv.join(" "));
        return Ok(());
    }
    return run_inherited(&argv);
}

/// Full system upgrade, the no-search-terms path.
pub fn upgrade(config: &Config, assume_yes: bool, dry_run: bool) -> Result<(), InstallError> {
    let argv = upgrade_args(config, assume_yes);
    if dry_run {
        println!("{}", argv.join(" "));
        return Ok(());
    }
    return run_inherited(&argv);
}

fn run_inherited(argv: &[String]) -> Result<(), InstallError> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };
    log::info!("running: {}", argv.join(" "));

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|err| InstallError::Engine(argv.join(" "), err))?;

    // The engine already presented whatever went wrong.
    if !status.success() {
        log::warn!("{program} exited with {status}");
    }
    return Ok(());
}

/* DIRECT-TRANSACTION STRATEGY */
/**
 * Experimental: drive the engine through explicit steps instead of
 * handing it the whole job. Every step runs the engine with the
 * terminal attached so its progress reporting comes through.
 * The process must already be running as root.
 */
#[derive(Debug, Default)]
pub struct Transaction {
    pkgs: Vec<PkgRecord>,
}

impl Transaction {
    pub fn new() -> Transaction {
        return Transaction { pkgs: Vec::new() };
    }

    pub fn add(&mut self, pkg: PkgRecord) {
        self.pkgs.push(pkg);
    }

    pub fn len(&self) -> usize {
        return self.pkgs.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.pkgs.is_empty();
    }

    /// Dependency resolution stays with the engine: a test transaction
    /// resolves and verifies without touching the system.
    pub fn resolve(&self, config: &Config) -> Result<(), InstallError> {
        return self.run_step(config, "resolve", &["--setopt=tsflags=test", "--assumeyes"]);
    }

    pub fn download(&self, config: &Config) -> Result<(), InstallError> {
        return self.run_step(config, "download", &["--downloadonly", "--assumeyes"]);
    }

    pub fn apply(&self, config: &Config) -> Result<(), InstallError> {
        return self.run_step(config, "apply", &["--assumeyes"]);
    }

    /// Package count, versions, and the total install size.
    pub fn summarize(&self) -> String {
        let total: u64 = self.pkgs.iter().map(|pkg| pkg.size).sum();
        let mut lines = vec![format!("Installing {} package(s):", self.pkgs.len())];
        for pkg in &self.pkgs {
            lines.push(format!("  {}-{}", pkg.name, pkg.version_release()));
        }
        lines.push(format!("Total install size: {}", human_size(total)));
        return lines.join("\n");
    }

    /// Prints the summary and asks before anything is downloaded.
    pub fn confirm(&self, assume_yes: bool) -> bool {
        println!("{}", self.summarize());
        return get_user_permission(assume_yes, "Proceed with installation?");
    }

    fn run_step(&self, config: &Config, step: &'static str, extra: &[&str]) -> Result<(), InstallError> {
        let mut argv: Vec<String> = vec![config.pkg_manager.to_owned(), "install".to_string()];
        argv.extend(extra.iter().map(|arg| arg.to_string()));
        argv.extend(self.pkgs.iter().map(|pkg| pkg.specifier()));

        log::info!("transaction {step}: {}", argv.join(" "));
        let Some((program, args)) = argv.split_first() else {
            return Ok(());
        };

        let output = cmd(program.as_str(), args)
            .unchecked()
            .run()
            .map_err(|err| InstallError::Engine(argv.join(" "), err))?;
        if !output.status.success() {
            return Err(InstallError::Step(step, output.status));
        }
        return Ok(());
    }
}

/* PRIVILEGE ELEVATION */
/// True when the process already has root.
pub fn running_as_root() -> bool {
    return nix::unistd::Uid::effective().is_root();
}

/// Re-runs the current executable under the privilege wrapper with the
/// original arguments. Fire and forget: the child owns the terminal
/// and its exit status is not translated.
pub fn reexec_elevated(config: &Config) -> Result<(), InstallError> {
    let exe = std::env::current_exe()
        .map_err(|err| InstallError::Engine("current_exe".to_string(), err))?;

    let mut command = Command::new(&config.privilege_wrapper);
    command.arg(exe);
    command.args(std::env::args().skip(1));

    let mut child = command.spawn()
        .map_err(|err| InstallError::Engine(config.privilege_wrapper.to_owned(), err))?;
    let _ = child.wait();
    return Ok(());
}
