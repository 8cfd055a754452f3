use super::*;
use crate::cli::error::CommandError;
use crate::cli::{
    AddArgs, BudgetArgs, Cli, Command, DeleteArgs, ListUsageArgs, SummaryArgs, UpdateStatusArgs,
    ViewArgs,
};
use crate::domain::{BillingCycle, Subscription, YearMonth};
use crate::report::{RateTable, RiskLevel, SubscriptionView, UNSPECIFIED};
use crate::store::{SqliteStore, SubscriptionRepository};
use clap::Parser;
use pretty_assertions::assert_eq;

// Test helpers
fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ctx(today: &str) -> Context {
    Context {
        db_path: PathBuf::from(":memory:"),
        expiring_days: None,
        report_currency: None,
        today: date(today),
    }
}

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn parse(subcommand: &str, args: &[&str]) -> Command {
    let mut argv = vec!["renewalradar", subcommand];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

fn add_args(args: &[&str]) -> AddArgs {
    match parse("add", args) {
        Command::Add(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn delete_args(args: &[&str]) -> DeleteArgs {
    match parse("delete", args) {
        Command::Delete(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn update_args(args: &[&str]) -> UpdateStatusArgs {
    match parse("update-status", args) {
        Command::UpdateStatus(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn view_args(args: &[&str]) -> ViewArgs {
    match parse("view", args) {
        Command::View(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn summary_args(args: &[&str]) -> SummaryArgs {
    match parse("summary", args) {
        Command::Summary(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn budget_args(args: &[&str]) -> BudgetArgs {
    match parse("budget", args) {
        Command::Budget(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn usage_args(args: &[&str]) -> ListUsageArgs {
    match parse("list-usage", args) {
        Command::ListUsage(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

/// Adds a monthly USD subscription with the given extra flags.
fn add(store: &mut SqliteStore, name: &str, cost: &str, start: &str, extra: &[&str]) -> i64 {
    let mut args = vec![
        "--name",
        name,
        "--cost",
        cost,
        "--billing-cycle",
        "monthly",
        "--currency",
        "USD",
        "--start-date",
        start,
    ];
    args.extend_from_slice(extra);
    add_subscription(store, &add_args(&args), date("2024-01-01"))
        .unwrap()
        .subscription
        .id()
        .unwrap()
}

fn command_error(err: &anyhow::Error) -> &CommandError {
    err.downcast_ref::<CommandError>()
        .unwrap_or_else(|| panic!("expected a command error, got {err:#}"))
}

// ===========================================
// Shared utilities
// ===========================================

#[test]
fn truncate_str_adds_ellipsis() {
    assert_eq!(truncate_str("Netflix", 10), "Netflix");
    assert_eq!(truncate_str("Amazon Prime Video", 10), "Amazon Pr…");
}

#[test]
fn report_currency_precedence() {
    let eur = Currency::new("EUR").unwrap();
    let gbp = Currency::new("GBP").unwrap();
    let usd = Currency::usd();

    assert_eq!(report_currency(Some(&gbp), Some(&eur), [&usd]), gbp);
    assert_eq!(report_currency(None, Some(&eur), [&gbp, &gbp]), gbp);
    assert_eq!(report_currency(None, Some(&eur), [&gbp, &usd]), eur);
    assert_eq!(report_currency(None, None, [&gbp, &usd]), usd);
    assert_eq!(report_currency(None, None, std::iter::empty()), usd);
}

#[test]
fn expiring_days_prefers_flag_then_config() {
    let mut context = ctx("2024-01-01");
    assert_eq!(expiring_days(None, &context).unwrap(), 7);
    context.expiring_days = Some(14);
    assert_eq!(expiring_days(None, &context).unwrap(), 14);
    assert_eq!(expiring_days(Some(3), &context).unwrap(), 3);
    assert!(expiring_days(Some(-1), &context).is_err());
}

#[test]
fn context_opens_store_at_nested_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = ctx("2024-01-01");
    context.db_path = dir.path().join("nested").join("subscriptions.db");

    let store = context.open_store().unwrap();
    assert!(store.list_subscriptions(&SubscriptionFilter::new()).unwrap().is_empty());
    assert!(context.db_path.exists());
}

#[test]
fn build_filter_rejects_unknown_status() {
    let err = build_filter(&["paused".to_string()], None, None, &[]).unwrap_err();
    assert!(matches!(err, CommandError::Validation(_)));
}

// ===========================================
// add
// ===========================================

#[test]
fn add_netflix_derives_renewal_and_annual_cost() {
    let mut store = store();
    let args = add_args(&[
        "--name",
        "Netflix",
        "--cost",
        "15.99",
        "--billing-cycle",
        "monthly",
        "--currency",
        "usd",
        "--start-date",
        "2024-01-15",
        "--payment-method",
        "visa",
        "--tag",
        "personal",
    ]);

    let outcome = add_subscription(&mut store, &args, date("2024-01-20")).unwrap();
    let sub = &outcome.subscription;

    assert!(sub.id().is_some());
    assert_eq!(sub.renewal_date(), date("2024-02-15"));
    assert_eq!(sub.status(), Status::Active);
    assert_eq!(sub.currency().as_str(), "USD");
    assert_eq!(sub.payment_method().map(|m| m.as_str()), Some("Visa"));
    assert_eq!(outcome.days_until_renewal, 26);
    assert!((outcome.annual_cost - 191.88).abs() < 1e-9);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn add_resolves_parent_by_name_case_insensitively() {
    let mut store = store();
    let parent = add(&mut store, "Family Plan", "20", "2024-01-01", &[]);

    let args = add_args(&[
        "--name",
        "Kid Profile",
        "--cost",
        "5",
        "--billing-cycle",
        "monthly",
        "--currency",
        "USD",
        "--start-date",
        "2024-01-01",
        "--parent",
        "family plan",
    ]);
    let outcome = add_subscription(&mut store, &args, date("2024-01-01")).unwrap();

    assert_eq!(outcome.subscription.parent_subscription_id(), Some(parent));
    assert_eq!(outcome.parent_name.as_deref(), Some("Family Plan"));
}

#[test]
fn add_with_unknown_parent_fails_without_writing() {
    let mut store = store();
    let args = add_args(&[
        "--name",
        "Orphan",
        "--cost",
        "5",
        "--billing-cycle",
        "monthly",
        "--currency",
        "USD",
        "--start-date",
        "2024-01-01",
        "--parent",
        "Nobody",
    ]);

    let err = add_subscription(&mut store, &args, date("2024-01-01")).unwrap_err();
    assert!(matches!(command_error(&err), CommandError::NotFound(_)));
    assert!(store.list_subscriptions(&SubscriptionFilter::new()).unwrap().is_empty());
}

#[test]
fn add_rejects_non_positive_cost() {
    let mut store = store();
    let args = add_args(&[
        "--name",
        "Free",
        "--cost",
        "-3",
        "--billing-cycle",
        "monthly",
        "--currency",
        "USD",
        "--start-date",
        "2024-01-01",
    ]);

    let err = add_subscription(&mut store, &args, date("2024-01-01")).unwrap_err();
    assert!(matches!(command_error(&err), CommandError::Validation(_)));
    assert!(err.to_string().contains("invalid cost: '-3'"));
    assert!(store.list_subscriptions(&SubscriptionFilter::new()).unwrap().is_empty());
}

// ===========================================
// resolve
// ===========================================

#[test]
fn numeric_reference_falls_back_to_name() {
    let mut store = store();
    let id = add(&mut store, "1984", "3", "2024-01-01", &[]);

    let found = resolve_reference(&store, "1984").unwrap().into_unique("1984").unwrap();
    assert_eq!(found.id(), Some(id));

    let by_id = resolve_reference(&store, &id.to_string()).unwrap();
    assert!(matches!(by_id, ResolveResult::Unique(s) if s.name() == "1984"));
}

#[test]
fn duplicate_names_are_ambiguous() {
    let mut store = store();
    let first = add(&mut store, "Spotify", "10", "2024-01-01", &[]);
    let second = add(&mut store, "spotify", "12", "2024-01-01", &[]);

    let err = resolve_target(
        &store,
        &crate::cli::TargetArgs {
            name: Some("Spotify".to_string()),
            id: None,
        },
    )
    .unwrap_err();
    match command_error(&err) {
        CommandError::Ambiguous { ids, .. } => assert_eq!(ids, &vec![first, second]),
        other => panic!("unexpected error {other:?}"),
    }
}

// ===========================================
// delete
// ===========================================

#[test]
fn delete_parent_is_blocked_even_with_force() {
    let mut store = store();
    let parent = add(&mut store, "Family Plan", "20", "2024-01-01", &[]);
    let child = add(&mut store, "Kid", "5", "2024-01-01", &["--parent", "Family Plan"]);

    for flag in ["--confirm", "--force"] {
        let err = delete_subscription(
            &mut store,
            &delete_args(&["--name", "Family Plan", flag]),
            date("2024-01-10"),
        )
        .unwrap_err();
        match command_error(&err) {
            CommandError::HasChildren { name, children } => {
                assert_eq!(name, "Family Plan");
                assert_eq!(children, &vec![(child, "Kid".to_string())]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    assert!(store.get_subscription(parent).unwrap().is_some());
    assert!(store.get_subscription(child).unwrap().is_some());
}

#[test]
fn delete_dry_run_leaves_record() {
    let mut store = store();
    let id = add(&mut store, "Hulu", "8", "2024-01-01", &[]);

    let outcome = delete_subscription(
        &mut store,
        &delete_args(&["--id", &id.to_string(), "--dry-run"]),
        date("2024-01-10"),
    )
    .unwrap();

    assert!(!outcome.deleted);
    assert!(store.get_subscription(id).unwrap().is_some());
}

#[test]
fn delete_requires_confirmation() {
    let mut store = store();
    let id = add(&mut store, "Hulu", "8", "2024-01-01", &[]);

    let err = delete_subscription(&mut store, &delete_args(&["--name", "hulu"]), date("2024-01-10"))
        .unwrap_err();
    assert!(matches!(command_error(&err), CommandError::Validation(_)));
    assert!(store.get_subscription(id).unwrap().is_some());
}

#[test]
fn confirmed_delete_removes_record() {
    let mut store = store();
    let id = add(&mut store, "Hulu", "8", "2024-01-01", &[]);

    let outcome = delete_subscription(
        &mut store,
        &delete_args(&["--name", "Hulu", "--confirm"]),
        date("2024-01-10"),
    )
    .unwrap();

    assert!(outcome.deleted);
    assert!(store.get_subscription(id).unwrap().is_none());
}

#[test]
fn delete_warns_when_current_budget_affected() {
    let mut store = store();
    add(&mut store, "Cloud", "30", "2024-01-10", &[]);
    let feb = YearMonth::new(2024, 2).unwrap();
    store.set_budget(feb, &Currency::usd(), 100.0).unwrap();

    let outcome = delete_subscription(
        &mut store,
        &delete_args(&["--name", "Cloud", "--confirm"]),
        date("2024-02-15"),
    )
    .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("February 2024"));
}

#[test]
fn delete_unknown_id_is_not_found() {
    let mut store = store();
    let args = delete_args(&["--id", "42", "--confirm"]);
    let err = delete_subscription(&mut store, &args, date("2024-01-01")).unwrap_err();
    assert_eq!(
        command_error(&err).to_string(),
        "subscription with id 42 not found. Use `renewalradar view` to list subscriptions."
    );
}

// ===========================================
// update-status
// ===========================================

#[test]
fn update_to_same_status_writes_nothing() {
    let mut store = store();
    let id = add(&mut store, "Netflix", "15.99", "2024-01-15", &[]);
    let before = store.get_subscription(id).unwrap().unwrap();

    let outcome =
        update_subscription(&mut store, &update_args(&["--name", "Netflix", "--to", "active"]))
            .unwrap();

    assert!(outcome.is_unchanged());
    let after = store.get_subscription(id).unwrap().unwrap();
    assert_eq!(after.updated_at(), before.updated_at());
}

#[test]
fn update_changes_status_and_tags() {
    let mut store = store();
    let id = add(&mut store, "Netflix", "15.99", "2024-01-15", &["--tag", "personal"]);

    let outcome = update_subscription(
        &mut store,
        &update_args(&[
            "--id",
            &id.to_string(),
            "--to",
            "cancelled",
            "--add-tag",
            "shared",
            "--remove-tag",
            "personal",
        ]),
    )
    .unwrap();

    assert_eq!(
        outcome.changes,
        vec![
            "status: active -> cancelled".to_string(),
            "tags: [personal] -> [shared]".to_string(),
        ]
    );
    let stored = store.get_subscription(id).unwrap().unwrap();
    assert_eq!(stored.status(), Status::Cancelled);
    assert_eq!(Tag::join(stored.tags()), "shared");
}

#[test]
fn update_without_changes_is_rejected() {
    let mut store = store();
    add(&mut store, "Netflix", "15.99", "2024-01-15", &[]);

    let err = update_subscription(&mut store, &update_args(&["--name", "Netflix"])).unwrap_err();
    assert!(matches!(command_error(&err), CommandError::Validation(_)));
}

#[test]
fn update_rejects_parent_cycles() {
    let mut store = store();
    add(&mut store, "Bundle", "20", "2024-01-01", &[]);
    add(&mut store, "Addon", "5", "2024-01-01", &["--parent", "Bundle"]);

    let err = update_subscription(
        &mut store,
        &update_args(&["--name", "Bundle", "--parent", "Addon"]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("cycle"));

    let err = update_subscription(
        &mut store,
        &update_args(&["--name", "Bundle", "--parent", "Bundle"]),
    )
    .unwrap_err();
    assert!(matches!(command_error(&err), CommandError::Validation(_)));
}

#[test]
fn update_detaches_parent() {
    let mut store = store();
    add(&mut store, "Bundle", "20", "2024-01-01", &[]);
    let addon = add(&mut store, "Addon", "5", "2024-01-01", &["--parent", "Bundle"]);

    update_subscription(&mut store, &update_args(&["--name", "Addon", "--no-parent"])).unwrap();

    let stored = store.get_subscription(addon).unwrap().unwrap();
    assert_eq!(stored.parent_subscription_id(), None);
}

// ===========================================
// view
// ===========================================

#[test]
fn view_marks_near_renewals_expiring() {
    let mut store = store();
    add(&mut store, "Soon", "10", "2023-12-25", &[]);
    add(&mut store, "Later", "10", "2024-01-15", &[]);
    let context = ctx("2024-01-20");

    let report = view_report(&store, &view_args(&[]), &context).unwrap();
    let mut warnings = Vec::new();
    let views = view::enrich(
        &report.subscriptions,
        context.today,
        report.expiring_days,
        None,
        &RateTable::standard(),
        &mut warnings,
    );

    let statuses: Vec<(&str, Status)> = views
        .iter()
        .map(|v| (v.subscription.name(), v.display_status))
        .collect();
    assert_eq!(
        statuses,
        vec![("Later", Status::Active), ("Soon", Status::Expiring)]
    );
    // display label only; storage keeps active
    assert_eq!(report.subscriptions[1].status(), Status::Active);
}

#[test]
fn view_filters_by_tag_and_sorts() {
    let mut store = store();
    add(&mut store, "Slack", "8", "2024-01-01", &["--tag", "work"]);
    add(&mut store, "GitHub", "4", "2024-01-01", &["--tag", "work", "--tag", "personal"]);
    add(&mut store, "Netflix", "15", "2024-01-01", &["--tag", "personal"]);

    let report = view_report(
        &store,
        &view_args(&["--tag", "work", "--sort", "cost", "--desc"]),
        &ctx("2024-01-10"),
    )
    .unwrap();

    let names: Vec<&str> = report.subscriptions.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Slack", "GitHub"]);
    assert_eq!(report.filters, vec!["tag=work".to_string()]);
}

#[test]
fn view_conversion_falls_back_for_unsupported_target_rates() {
    let sub = Subscription::builder(
        "Tool",
        10.0,
        BillingCycle::Monthly,
        Currency::usd(),
        date("2024-01-01"),
    )
    .build()
    .unwrap();
    let subs = vec![sub];
    let rates = RateTable::from_rates([("USD", 1.0)]);
    let mut warnings = Vec::new();

    let views = view::enrich(
        &subs,
        date("2024-01-10"),
        7,
        Some(&Currency::new("EUR").unwrap()),
        &rates,
        &mut warnings,
    );

    assert_eq!(warnings.len(), 1);
    assert!(views[0].converted.is_none());
    assert_eq!(views[0].effective_monthly().1.as_str(), "USD");
}

#[test]
fn upcoming_renewals_skip_cancelled_and_sort_soonest_first() {
    let a = Subscription::builder(
        "A",
        1.0,
        BillingCycle::Monthly,
        Currency::usd(),
        date("2024-01-01"),
    )
    .renewal_date(Some(date("2024-01-25")))
    .build()
    .unwrap();
    let b = Subscription::builder(
        "B",
        1.0,
        BillingCycle::Monthly,
        Currency::usd(),
        date("2024-01-01"),
    )
    .renewal_date(Some(date("2024-01-12")))
    .build()
    .unwrap();
    let c = Subscription::builder(
        "C",
        1.0,
        BillingCycle::Monthly,
        Currency::usd(),
        date("2024-01-01"),
    )
    .renewal_date(Some(date("2024-01-11")))
    .status(Status::Cancelled)
    .build()
    .unwrap();
    let today = date("2024-01-10");
    let views: Vec<SubscriptionView<'_>> = [&a, &b, &c]
        .into_iter()
        .map(|s| SubscriptionView::new(s, today, 7))
        .collect();

    let upcoming = view::upcoming_renewals(&views, 30);
    let names: Vec<&str> = upcoming.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
}

// ===========================================
// summary
// ===========================================

#[test]
fn summary_payment_buckets_sum_to_total() {
    let mut store = store();
    add(
        &mut store,
        "Slack",
        "10",
        "2024-01-01",
        &["--payment-method", "Visa", "--tag", "work", "--tag", "shared"],
    );
    add(&mut store, "Zoom", "5", "2024-01-01", &["--tag", "work"]);
    add(&mut store, "Hotstar", "7", "2024-01-01", &["--payment-method", "UPI"]);

    let report = summarize(&store, &summary_args(&["--top", "2"]), &ctx("2024-01-10")).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.report_currency.as_str(), "USD");
    assert!((report.monthly_total - 22.0).abs() < 1e-9);

    let top = report.top.as_ref().unwrap();
    let top_names: Vec<&str> = top.subscriptions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(top_names, vec!["Slack", "Hotstar"]);

    let payment_sum: f64 = top.by_payment_method.iter().map(|b| b.amount).sum();
    assert!((payment_sum - report.monthly_total).abs() < 1e-9);
    assert!(
        top.by_payment_method
            .iter()
            .any(|b| b.name == UNSPECIFIED && b.amount == 5.0)
    );

    let tag_sum: f64 = top.by_tag.iter().map(|b| b.amount).sum();
    assert!(tag_sum > report.monthly_total);
}

#[test]
fn summary_converts_mixed_currencies() {
    let mut store = store();
    add(&mut store, "US Tool", "11", "2024-01-01", &[]);
    let args = add_args(&[
        "--name",
        "EU Tool",
        "--cost",
        "10",
        "--billing-cycle",
        "monthly",
        "--currency",
        "EUR",
        "--start-date",
        "2024-01-01",
    ]);
    add_subscription(&mut store, &args, date("2024-01-01")).unwrap();

    let report =
        summarize(&store, &summary_args(&["--convert-to", "EUR"]), &ctx("2024-01-10")).unwrap();

    assert_eq!(report.report_currency.as_str(), "EUR");
    // 11 USD is 10 EUR at 1.10
    assert!((report.monthly_total - 20.0).abs() < 1e-9);
    assert_eq!(report.by_currency.len(), 2);
    assert!(report.warnings.is_empty());
}

#[test]
fn summary_counts_display_statuses() {
    let mut store = store();
    add(&mut store, "Soon", "10", "2023-12-25", &[]);
    add(&mut store, "Gone", "10", "2024-01-01", &["--status", "cancelled"]);

    let report = summarize(&store, &summary_args(&[]), &ctx("2024-01-20")).unwrap();

    assert_eq!(
        report.status_counts,
        vec![
            summary::StatusCount { status: Status::Expiring, count: 1 },
            summary::StatusCount { status: Status::Cancelled, count: 1 },
        ]
    );
    assert_eq!(report.upcoming_renewals.len(), 1);
}

// ===========================================
// budget
// ===========================================

#[test]
fn february_budget_is_ok_at_eighty_percent() {
    let mut store = store();
    add(&mut store, "Streaming", "50", "2024-01-05", &[]);
    add(&mut store, "Cloud", "30", "2024-02-10", &[]);
    add(&mut store, "Old Gym", "20", "2024-01-01", &["--status", "cancelled"]);

    let set = set_budget(
        &mut store,
        &budget_args(&["--set", "100", "--currency", "USD", "--year", "2024", "--month", "2"]),
        date("2024-02-15"),
    )
    .unwrap();
    assert!(set.created);

    let report = budget_report(
        &store,
        &budget_args(&["--year", "2024", "--month", "2"]),
        date("2024-02-15"),
    )
    .unwrap();

    assert_eq!(report.budgets.len(), 1);
    let row = &report.budgets[0];
    assert!(row.is_current);
    assert_eq!(row.utilization.utilized, 80.0);
    assert_eq!(row.utilization.remaining, 20.0);
    assert_eq!(row.utilization.percent, 80.0);
    assert_eq!(row.utilization.risk, RiskLevel::Ok);
    assert_eq!(row.utilization.count(), 2);
    assert_eq!(report.total_usd.cap, 100.0);
}

#[test]
fn set_budget_twice_updates() {
    let mut store = store();
    let today = date("2024-03-10");

    let first = set_budget(&mut store, &budget_args(&["--set", "100"]), today).unwrap();
    let second = set_budget(&mut store, &budget_args(&["--set", "150"]), today).unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!((second.year, second.month), (2024, 3));
    assert_eq!(second.currency.as_str(), "USD");

    let budgets = store.get_budgets(Some(2024), Some(3), None).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount(), 150.0);
}

#[test]
fn set_budget_validates_inputs() {
    let mut store = store();
    let today = date("2024-03-10");

    for args in [
        vec!["--set", "0"],
        vec!["--set", "abc"],
        vec!["--set", "100", "--month", "13"],
        vec!["--set", "100", "--year", "1999"],
        vec!["--set", "100", "--year", "2035"],
        vec!["--set", "100", "--currency", "XYZ"],
    ] {
        let err = set_budget(&mut store, &budget_args(&args), today).unwrap_err();
        assert!(
            matches!(command_error(&err), CommandError::Validation(_)),
            "{args:?} should be rejected"
        );
    }
    assert!(store.get_budgets(None, None, None).unwrap().is_empty());
}

#[test]
fn budget_view_filters_utilization_by_tag() {
    let mut store = store();
    add(&mut store, "Slack", "40", "2024-02-01", &["--tag", "work"]);
    add(&mut store, "Netflix", "15", "2024-02-01", &["--tag", "personal"]);
    store
        .set_budget(YearMonth::new(2024, 2).unwrap(), &Currency::usd(), 50.0)
        .unwrap();

    let args = budget_args(&["--tag", "work"]);
    let report = budget_report(&store, &args, date("2024-03-01")).unwrap();

    let row = &report.budgets[0];
    assert!(!row.is_current);
    assert_eq!(row.utilization.cap, 50.0);
    assert_eq!(row.utilization.utilized, 40.0);
    assert_eq!(report.filters, vec!["tag=work".to_string()]);
}

// ===========================================
// list-usage
// ===========================================

#[test]
fn usage_counts_tags_and_lists_unused() {
    let mut store = store();
    add(&mut store, "Slack", "8", "2024-01-01", &["--tag", "work", "--payment-method", "Visa"]);
    add(&mut store, "GitHub", "4", "2024-01-01", &["--tag", "work", "--tag", "personal"]);

    let report = usage_report(&store, &usage_args(&["--unused-tags"])).unwrap();

    let tags: Vec<(&str, usize)> = report
        .tags
        .as_ref()
        .unwrap()
        .iter()
        .map(|u| (u.name.as_str(), u.count))
        .collect();
    assert_eq!(tags, vec![("work", 2), ("personal", 1)]);
    assert_eq!(
        report.unused_tags,
        Some(vec![
            "shared".to_string(),
            "family".to_string(),
            "business".to_string()
        ])
    );
    let methods = report.payment_methods.as_ref().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!((methods[0].name.as_str(), methods[0].count), ("Visa", 1));
}

#[test]
fn usage_lists_only_requested_section() {
    let mut store = store();
    add(&mut store, "Slack", "8", "2024-01-01", &["--tag", "work", "--payment-method", "Visa"]);

    let report = usage_report(&store, &usage_args(&["--list-payment-methods"])).unwrap();

    assert!(report.tags.is_none());
    assert!(report.unused_tags.is_none());
    assert!(report.payment_methods.is_some());
}
