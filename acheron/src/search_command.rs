/*!
 * The interactive flow: open the index, rank, list, select, install.
 */
use ach_core::config::Config;
use ach_core::display;
use ach_core::index::{FieldSet, PkgIndex, PkgRecord};
use ach_core::install::{self, Transaction};
use ach_core::query::Query;
use ach_core::selector;
use anyhow::Context;

#[derive(Debug)]
pub struct SearchCommand {
    pub config: Config,
    pub terms: Vec<String>,
    pub fields: FieldSet,
    pub latest_only: bool,
    pub reverse: bool,
    pub use_transaction: bool,
    pub dry_run: bool,
    pub assume_yes: bool,
}

impl SearchCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        // The direct-transaction strategy needs the whole process to be
        // root before the index is even opened.
        if self.use_transaction && !install::running_as_root() {
            log::info!("not root, re-running under {}", self.config.privilege_wrapper);
            install::reexec_elevated(&self.config).context("privilege elevation failed")?;
            return Ok(());
        }

        let index = PkgIndex::open(&self.config).context("could not open the package index")?;
        let query = Query::rank(&index, &self.terms, self.fields, self.latest_only);
        if query.is_empty() {
            println!("No packages found.");
            return Ok(());
        }

        let use_color = display::use_color(&self.config);
        let width = display::terminal_width();
        for line in display::render_results(&query, &index, self.reverse, use_color, width) {
            println!("{line}");
        }

        let selected = selector::prompt_selection(&query);
        if selected.is_empty() {
            println!("No packages selected.");
            return Ok(());
        }

        if self.use_transaction {
            return self.run_transaction(selected);
        }
        install::install(&self.config, &selected, self.assume_yes, self.dry_run)
            .context("install failed")?;
        return Ok(());
    }

    fn run_transaction(&self, pkgs: Vec<PkgRecord>) -> anyhow::Result<()> {
        let mut transaction = Transaction::new();
        for pkg in pkgs {
            transaction.add(pkg);
        }

        transaction.resolve(&self.config).context("dependency resolution failed")?;
        if self.dry_run {
            println!("{}", transaction.summarize());
            return Ok(());
        }
        if !transaction.confirm(self.assume_yes) {
            println!("Aborting.");
            return Ok(());
        }
        transaction.download(&self.config).context("download failed")?;
        transaction.apply(&self.config).context("apply failed")?;
        return Ok(());
    }
}
