//! renewalradar - track recurring subscriptions, renewals and monthly budgets

pub mod cli;
pub mod domain;
pub mod report;
pub mod store;

use anyhow::Result;
use clap::CommandFactory;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        Context, handle_add, handle_budget, handle_delete, handle_list_usage, handle_summary,
        handle_update_status, handle_view,
    },
    logging,
};

/// Main entry point for the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose);

    if let Command::Completions(args) = &cli.command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "renewalradar",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let config = Config::load()?;
    let ctx = Context {
        db_path: config.db_path(cli.db.as_ref()),
        expiring_days: config.expiring_days,
        report_currency: config.report_currency()?,
        today: chrono::Local::now().date_naive(),
    };
    tracing::debug!(db = %ctx.db_path.display(), today = %ctx.today, "resolved context");

    match &cli.command {
        Command::Add(args) => handle_add(args, &ctx),
        Command::Delete(args) => handle_delete(args, &ctx),
        Command::UpdateStatus(args) => handle_update_status(args, &ctx),
        Command::View(args) => handle_view(args, &ctx),
        Command::Summary(args) => handle_summary(args, &ctx),
        Command::Budget(args) => handle_budget(args, &ctx),
        Command::ListUsage(args) => handle_list_usage(args, &ctx),
        Command::Completions(_) => Ok(()),
    }
}
