use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use tripdesk::config::Config;
use tripdesk::data::export::{export_csv_to_path, ExportScope};
use tripdesk::data::loader::load_records;
use tripdesk::data::summary::DashboardStats;
use tripdesk::data::value::parse_date;
use tripdesk::display::{render_dashboard, render_snapshot, RenderOptions};
use tripdesk::entities::{
    Agent, Booking, Entity, MarkupAgent, Passenger, Payment, Role, User, VIEW_NAMES,
};
use tripdesk::{DatePredicate, TabularView, TextMatchMode};

fn print_help() {
    println!(
        "{}",
        "Tripdesk - travel agency back-office tables".blue().bold()
    );
    println!();
    println!("{}", "Usage:".yellow());
    println!("  tripdesk <VIEW> [OPTIONS]");
    println!("  tripdesk dashboard [--data DIR]");
    println!("  tripdesk --generate-config");
    println!();
    println!("{}", "Views:".yellow());
    println!("  {}", VIEW_NAMES.join(", "));
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}          - Search the view's text fields", "--search Q".green());
    println!(
        "  {} - Search matching (default substring)",
        "--mode substring|fuzzy|regex".green()
    );
    println!(
        "  {}  - Keep only these category values",
        "--filter FIELD=V1,V2".green()
    );
    println!(
        "  {}  - Inclusive numeric range, either side optional",
        "--range FIELD=MIN..MAX".green()
    );
    println!(
        "  {} - One day, or an inclusive window",
        "--date FIELD=DAY|FROM..TO".green()
    );
    println!(
        "  {}        - Sort by a column; repeat to flip direction",
        "--sort FIELD".green()
    );
    println!("  {}            - Show page N", "--page N".green());
    println!("  {}       - Rows per page", "--page-size N".green());
    println!(
        "  {}          - Load <VIEW>.json from DIR instead of built-in data",
        "--data DIR".green()
    );
    println!(
        "  {}      - Write the current page as CSV (--all for every filtered row)",
        "--export FILE".green()
    );
    println!("  {}      - Use this config file", "--config FILE".green());
    println!("  {}               - Print captured log entries", "--log".green());
    println!("  {}           - Debug-level logging", "--verbose".green());
    println!();
    println!("{}", "Examples:".yellow());
    println!("  tripdesk bookings --filter status=pending,confirmed --sort amount --sort amount");
    println!("  tripdesk payments --date date=2025-04-21..2025-04-23 --export payments.csv --all");
}

#[derive(Debug, Default, PartialEq)]
struct ViewArgs {
    search: Option<String>,
    mode: Option<TextMatchMode>,
    filters: Vec<(String, Vec<String>)>,
    ranges: Vec<(String, f64, f64)>,
    dates: Vec<(String, DatePredicate)>,
    sorts: Vec<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    data_dir: Option<PathBuf>,
    export: Option<PathBuf>,
    export_all: bool,
    config: Option<PathBuf>,
    show_log: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    GenerateConfig,
    Dashboard(ViewArgs),
    View(String, ViewArgs),
}

/// Split `FIELD=VALUE`
fn split_assignment<'a>(flag: &str, raw: &'a str) -> Result<(&'a str, &'a str)> {
    raw.split_once('=')
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| anyhow!("{} expects FIELD=VALUE, got '{}'", flag, raw))
}

fn parse_bound(raw: &str, unbounded: f64) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(unbounded);
    }
    raw.parse()
        .with_context(|| format!("'{}' is not a number", raw))
}

fn parse_range(raw: &str) -> Result<(f64, f64)> {
    let (min, max) = raw
        .split_once("..")
        .ok_or_else(|| anyhow!("range '{}' must look like MIN..MAX", raw))?;
    Ok((
        parse_bound(min, f64::NEG_INFINITY)?,
        parse_bound(max, f64::INFINITY)?,
    ))
}

fn parse_day(raw: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| anyhow!("'{}' is not a date (expected YYYY-MM-DD)", raw))
}

fn parse_date_predicate(raw: &str) -> Result<DatePredicate> {
    match raw.split_once("..") {
        Some((from, to)) => Ok(DatePredicate::Between {
            from: parse_day(from)?,
            to: parse_day(to)?,
        }),
        None => parse_day(raw)?
            .map(DatePredicate::On)
            .ok_or_else(|| anyhow!("--date needs a day or a FROM..TO window")),
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut target: Option<String> = None;
    let mut opts = ViewArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", flag))
        };

        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--generate-config" => return Ok(Command::GenerateConfig),
            "--search" => opts.search = Some(value("--search")?),
            "--mode" => opts.mode = Some(value("--mode")?.parse()?),
            "--filter" => {
                let raw = value("--filter")?;
                let (field, values) = split_assignment("--filter", &raw)?;
                let values = values
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                opts.filters.push((field.to_string(), values));
            }
            "--range" => {
                let raw = value("--range")?;
                let (field, range) = split_assignment("--range", &raw)?;
                let (min, max) = parse_range(range)?;
                opts.ranges.push((field.to_string(), min, max));
            }
            "--date" => {
                let raw = value("--date")?;
                let (field, predicate) = split_assignment("--date", &raw)?;
                opts.dates
                    .push((field.to_string(), parse_date_predicate(predicate)?));
            }
            "--sort" => opts.sorts.push(value("--sort")?),
            "--page" => {
                opts.page = Some(value("--page")?.parse().context("--page expects a number")?)
            }
            "--page-size" => {
                opts.page_size = Some(
                    value("--page-size")?
                        .parse()
                        .context("--page-size expects a number")?,
                )
            }
            "--data" => opts.data_dir = Some(PathBuf::from(value("--data")?)),
            "--export" => opts.export = Some(PathBuf::from(value("--export")?)),
            "--all" => opts.export_all = true,
            "--config" => opts.config = Some(PathBuf::from(value("--config")?)),
            "--log" => opts.show_log = true,
            "--verbose" | "-v" => opts.verbose = true,
            flag if flag.starts_with('-') => bail!("Unknown option '{}'", flag),
            name => {
                if let Some(previous) = &target {
                    bail!("Unexpected argument '{}' after '{}'", name, previous);
                }
                target = Some(name.to_string());
            }
        }
    }

    match target.as_deref() {
        None => Ok(Command::Help),
        Some("dashboard") => Ok(Command::Dashboard(opts)),
        Some(name) if VIEW_NAMES.contains(&name) => Ok(Command::View(name.to_string(), opts)),
        Some(name) => bail!(
            "Unknown view '{}' (expected one of: dashboard, {})",
            name,
            VIEW_NAMES.join(", ")
        ),
    }
}

fn load_config(opts: &ViewArgs) -> Result<Config> {
    match &opts.config {
        Some(path) => Config::load_from(path),
        None => Config::load().or_else(|e| {
            // An unwritable config dir should not stop the tables from showing
            debug!(target: "config", "Using default config: {:#}", e);
            Ok(Config::default())
        }),
    }
}

fn records_for<R: Entity>(data_dir: Option<&Path>) -> Result<Vec<R>> {
    match data_dir {
        Some(dir) => load_records(dir.join(format!("{}.json", R::VIEW_NAME))),
        None => R::sample_records(),
    }
}

fn open_view<R: Entity>(opts: &ViewArgs, config: &Config) -> Result<TabularView<R>> {
    let records = records_for::<R>(opts.data_dir.as_deref())?;
    let view_config = config.behavior.apply(R::view_config()?)?;
    let mut view = TabularView::new(records, view_config)?;
    view.set_link_radius(config.behavior.page_link_radius);
    Ok(view)
}

fn apply_args<R>(view: &mut TabularView<R>, opts: &ViewArgs) -> Result<()> {
    if let Some(mode) = opts.mode {
        view.set_search_mode(mode)?;
    }
    if let Some(query) = &opts.search {
        view.set_search(query.as_str())?;
    }
    for (field, values) in &opts.filters {
        view.set_categories(field, values.iter().map(String::as_str))?;
    }
    for (field, min, max) in &opts.ranges {
        view.set_range(field, *min, *max)?;
    }
    for (field, predicate) in &opts.dates {
        view.set_date(field, *predicate)?;
    }
    for field in &opts.sorts {
        view.sort_by(field)?;
    }
    if let Some(size) = opts.page_size {
        view.set_page_size(size)?;
    }
    if let Some(page) = opts.page {
        view.go_to_page(page);
    }
    Ok(())
}

fn run_view<R: Entity>(opts: &ViewArgs, config: &Config) -> Result<()> {
    let mut view = open_view::<R>(opts, config)?;
    apply_args(&mut view, opts)?;
    info!(
        target: "cli",
        "{}: {} active filters, sort {}",
        R::VIEW_NAME,
        view.criteria().active_count(),
        view.sort_spec()
    );

    let options = RenderOptions::from(&config.display);
    print!("{}", render_snapshot(&view, &options));

    if let Some(path) = &opts.export {
        let scope = if opts.export_all {
            ExportScope::AllFiltered
        } else {
            ExportScope::CurrentPage
        };
        let count = export_csv_to_path(&view, path, scope)?;
        let message = format!("Exported {} rows to {}", count, path.display());
        if options.color {
            println!("{}", message.green());
        } else {
            println!("{}", message);
        }
    }
    Ok(())
}

fn run_dashboard(opts: &ViewArgs, config: &Config) -> Result<()> {
    let bookings = open_view::<Booking>(opts, config)?;
    let agents = open_view::<Agent>(opts, config)?;
    let payments = open_view::<Payment>(opts, config)?;
    let stats = DashboardStats::from_views(&bookings, &agents, &payments)?;
    print!(
        "{}",
        render_dashboard(&stats, &RenderOptions::from(&config.display))
    );
    Ok(())
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    println!("Configuration file created at: {}", path.display());
    println!("Edit this file to customize tripdesk.");
    Ok(())
}

fn run(command: Command) -> Result<()> {
    let opts = match &command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::GenerateConfig => return generate_config(),
        Command::Dashboard(opts) | Command::View(_, opts) => opts,
    };

    let logs = tripdesk::logging::init_tracing(if opts.verbose { "debug" } else { "info" });
    let config = load_config(opts)?;

    let result = match &command {
        Command::Dashboard(opts) => run_dashboard(opts, &config),
        Command::View(name, opts) => match name.as_str() {
            tripdesk::entities::agent::VIEW_NAME => run_view::<Agent>(opts, &config),
            tripdesk::entities::booking::VIEW_NAME => run_view::<Booking>(opts, &config),
            tripdesk::entities::passenger::VIEW_NAME => run_view::<Passenger>(opts, &config),
            tripdesk::entities::payment::VIEW_NAME => run_view::<Payment>(opts, &config),
            tripdesk::entities::user::VIEW_NAME => run_view::<User>(opts, &config),
            tripdesk::entities::role::VIEW_NAME => run_view::<Role>(opts, &config),
            tripdesk::entities::markup::VIEW_NAME => run_view::<MarkupAgent>(opts, &config),
            other => Err(anyhow!("Unknown view '{}'", other)),
        },
        Command::Help | Command::GenerateConfig => Ok(()),
    };

    if opts.show_log {
        for entry in logs.get_recent(usize::MAX) {
            eprintln!("{}", entry.format_for_display());
        }
    }
    result
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = parse_args(&args).and_then(run) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn view_args(line: &str) -> ViewArgs {
        match parse_args(&args(line)).unwrap() {
            Command::View(_, opts) | Command::Dashboard(opts) => opts,
            other => panic!("expected a view command, got {:?}", other),
        }
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
        assert_eq!(parse_args(&args("agents --help")).unwrap(), Command::Help);
    }

    #[test]
    fn test_view_with_options() {
        let command = parse_args(&args(
            "bookings --search paris --filter status=pending,confirmed --sort amount --sort amount --page 2",
        ))
        .unwrap();
        let Command::View(name, opts) = command else {
            panic!("expected a view command");
        };
        assert_eq!(name, "bookings");
        assert_eq!(opts.search.as_deref(), Some("paris"));
        assert_eq!(
            opts.filters,
            vec![(
                "status".to_string(),
                vec!["pending".to_string(), "confirmed".to_string()]
            )]
        );
        assert_eq!(opts.sorts, vec!["amount", "amount"]);
        assert_eq!(opts.page, Some(2));
    }

    #[test]
    fn test_open_ranges() {
        let opts = view_args("agents --range revenue=20000.. --range bookings=..30");
        assert_eq!(
            opts.ranges,
            vec![
                ("revenue".to_string(), 20000.0, f64::INFINITY),
                ("bookings".to_string(), f64::NEG_INFINITY, 30.0)
            ]
        );
    }

    #[test]
    fn test_date_forms() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 4, d);
        let opts = view_args("payments --date date=2025-04-22 --date date=2025-04-21..");
        assert_eq!(
            opts.dates,
            vec![
                ("date".to_string(), DatePredicate::On(day(22).unwrap())),
                (
                    "date".to_string(),
                    DatePredicate::Between {
                        from: day(21),
                        to: None
                    }
                )
            ]
        );
    }

    #[test]
    fn test_bad_input_is_rejected() {
        assert!(parse_args(&args("planets")).is_err());
        assert!(parse_args(&args("agents --bogus")).is_err());
        assert!(parse_args(&args("agents --range revenue")).is_err());
        assert!(parse_args(&args("agents --date day=yesterday")).is_err());
        assert!(parse_args(&args("agents --page")).is_err());
        assert!(parse_args(&args("agents --mode telepathy")).is_err());
    }

    #[test]
    fn test_apply_args_to_view() {
        let opts = view_args("agents --filter status=active --sort revenue --sort revenue --page-size 2 --page 2");
        let mut view = Agent::sample_view().unwrap();
        apply_args(&mut view, &opts).unwrap();
        let names: Vec<&str> = view.page_items().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Emily Davis", "Michael Wilson"]);
    }

    #[test]
    fn test_apply_args_rejects_undeclared_filter() {
        let opts = view_args("agents --filter email=x");
        let mut view = Agent::sample_view().unwrap();
        assert!(apply_args(&mut view, &opts).is_err());
    }
}
