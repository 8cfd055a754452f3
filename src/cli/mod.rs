//! CLI command definitions and handlers

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod output;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::store::SortKey;
use output::OutputFormat;

/// renewalradar - track recurring subscriptions, renewals and monthly budgets
#[derive(Parser, Debug)]
#[command(name = "renewalradar", version, about, long_about = None)]
pub struct Cli {
    /// Subscription database file (overrides config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a new subscription
    Add(AddArgs),

    /// Delete a subscription
    Delete(DeleteArgs),

    /// Change status, payment method, tags, parent or renewal date
    UpdateStatus(UpdateStatusArgs),

    /// List subscriptions with filters, sorting and totals
    View(ViewArgs),

    /// Portfolio overview: counts, spend breakdowns, upcoming renewals
    Summary(SummaryArgs),

    /// Set or review monthly budgets
    Budget(BudgetArgs),

    /// Show how often tags and payment methods are used
    ListUsage(ListUsageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Selects one subscription by name or id.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Subscription name (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Subscription id
    #[arg(long)]
    pub id: Option<i64>,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Subscription name
    #[arg(long)]
    pub name: String,

    /// Cost per billing cycle
    #[arg(long, allow_hyphen_values = true)]
    pub cost: String,

    /// monthly, quarterly, biannual or annual (yearly)
    #[arg(long)]
    pub billing_cycle: String,

    /// ISO currency code, e.g. USD
    #[arg(long)]
    pub currency: String,

    /// First billing date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: String,

    /// Next renewal date (YYYY-MM-DD); derived from the start date when omitted
    #[arg(long)]
    pub renewal_date: Option<String>,

    /// End of the free trial (YYYY-MM-DD)
    #[arg(long)]
    pub trial_end_date: Option<String>,

    /// Visa, Mastercard, PayPal, BankTransfer or UPI
    #[arg(long)]
    pub payment_method: Option<String>,

    /// Tag (can be specified multiple times)
    #[arg(long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Initial status (default: active)
    #[arg(long)]
    pub status: Option<String>,

    /// Parent subscription, by id or name
    #[arg(long)]
    pub parent: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `delete` command
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Confirm the deletion
    #[arg(long)]
    pub confirm: bool,

    /// Same as --confirm
    #[arg(long)]
    pub force: bool,

    /// Show what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `update-status` command
#[derive(Parser, Debug, Clone)]
pub struct UpdateStatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// New status: active, trial, expiring or cancelled
    #[arg(long)]
    pub to: Option<String>,

    /// New payment method
    #[arg(long, conflicts_with = "clear_payment_method")]
    pub payment_method: Option<String>,

    /// Remove the payment method
    #[arg(long)]
    pub clear_payment_method: bool,

    /// Add a tag (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub add_tag: Vec<String>,

    /// Remove a tag (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub remove_tag: Vec<String>,

    /// Remove all tags before adding
    #[arg(long)]
    pub clear_tags: bool,

    /// New parent subscription, by id or name
    #[arg(long, conflicts_with = "no_parent")]
    pub parent: Option<String>,

    /// Detach from the parent subscription
    #[arg(long)]
    pub no_parent: bool,

    /// New renewal date (YYYY-MM-DD)
    #[arg(long)]
    pub renewal_date: Option<String>,
}

/// Arguments for the `view` command
#[derive(Parser, Debug, Clone)]
pub struct ViewArgs {
    /// Filter by stored status (can be specified multiple times)
    #[arg(long = "status", action = ArgAction::Append)]
    pub statuses: Vec<String>,

    /// Filter by currency
    #[arg(long)]
    pub currency: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Filter by payment method (can be specified multiple times)
    #[arg(long = "payment-method", action = ArgAction::Append)]
    pub payment_methods: Vec<String>,

    /// Sort column
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Show at most this many subscriptions
    #[arg(long)]
    pub limit: Option<usize>,

    /// Days before renewal to show a subscription as expiring
    #[arg(long)]
    pub expiring_days: Option<i64>,

    /// Show costs converted to this currency
    #[arg(long)]
    pub convert_to: Option<String>,

    /// Render parent/child relationships as a tree
    #[arg(long)]
    pub tree: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `summary` command
#[derive(Parser, Debug, Clone)]
pub struct SummaryArgs {
    /// Filter by stored status (can be specified multiple times)
    #[arg(long = "status", action = ArgAction::Append)]
    pub statuses: Vec<String>,

    /// Filter by currency
    #[arg(long)]
    pub currency: Option<String>,

    /// Filter by payment method (can be specified multiple times)
    #[arg(long = "payment-method", action = ArgAction::Append)]
    pub payment_methods: Vec<String>,

    /// Days ahead counted as upcoming renewals
    #[arg(long)]
    pub expiring_days: Option<i64>,

    /// Report all amounts in this currency
    #[arg(long)]
    pub convert_to: Option<String>,

    /// Show the N most expensive subscriptions with tag and payment breakdowns
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `budget` command
#[derive(Parser, Debug, Clone)]
#[command(group(clap::ArgGroup::new("mode").args(["set", "view"]).multiple(false)))]
pub struct BudgetArgs {
    /// Set the budget amount for the month
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    pub set: Option<String>,

    /// Show budgets and their utilization (default)
    #[arg(long)]
    pub view: bool,

    /// Budget currency (default: USD when setting)
    #[arg(long)]
    pub currency: Option<String>,

    /// Year (default: current year when setting)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month 1-12 (default: current month when setting)
    #[arg(long)]
    pub month: Option<u32>,

    /// Count only subscriptions with this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Count only subscriptions using this payment method
    #[arg(long)]
    pub payment_method: Option<String>,

    /// List the subscriptions counted toward each budget
    #[arg(long)]
    pub detailed: bool,

    /// Print the exchange-rate table
    #[arg(long)]
    pub show_rates: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `list-usage` command
#[derive(Parser, Debug, Clone)]
pub struct ListUsageArgs {
    /// List tag usage
    #[arg(long)]
    pub list_tags: bool,

    /// List payment method usage
    #[arg(long)]
    pub list_payment_methods: bool,

    /// Also list allowed tags no subscription uses
    #[arg(long)]
    pub unused_tags: bool,

    /// Filter by stored status (can be specified multiple times)
    #[arg(long = "status", action = ArgAction::Append)]
    pub statuses: Vec<String>,

    /// Filter by currency
    #[arg(long)]
    pub currency: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Filter by payment method (can be specified multiple times)
    #[arg(long = "payment-method", action = ArgAction::Append)]
    pub payment_methods: Vec<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
