use std::{path::PathBuf, sync::Barrier};

use anyhow::{Context, Result, anyhow};
use chrono::{Days, Local, NaiveDate};
use circulation_desk::{
    Catalog, CatalogSnapshot, CirculationEvent, CirculationObserver, CirculationReport,
    DeskConfig, ItemId, ItemType, LibraryError, LibraryItem, PlaybackAction, TracingObserver,
    User, UserId, parse_duration_days, parse_id,
};
use clap::Parser;
use colored::Colorize;
use crossbeam_utils::thread;
use rand::Rng;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the circulation desk demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose output with detailed operation logs
    #[arg(short, long)]
    verbose: bool,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// JSON file with desk settings (fine rate, currency, stress threads)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Date treated as today, YYYY-MM-DD; defaults to the local date
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Run concurrent borrow/return storms after the scenario
    #[arg(short, long)]
    stress_test: bool,

    /// Threads for the stress test, overrides the config file
    #[arg(long)]
    threads: Option<usize>,

    /// Print a JSON snapshot of the catalog at the end
    #[arg(long)]
    json: bool,
}

/// Prints circulation events the way the front desk announces them
#[derive(Debug)]
struct ConsoleObserver {
    /// Label printed in front of amounts
    currency: String,
}

impl CirculationObserver for ConsoleObserver {
    fn on_event(&self, event: &CirculationEvent) {
        match event {
            CirculationEvent::Returned(receipt) if receipt.is_late() => println!(
                "{}",
                format!(
                    "User {} returned Item {} late by {} days -> Fine: {}{}",
                    receipt.record.user_id(),
                    receipt.record.item_id(),
                    receipt.overdue_days,
                    self.currency,
                    receipt.fine
                )
                .red()
            ),
            CirculationEvent::Returned(receipt) => println!(
                "User {} returned Item {} on time. No fine.",
                receipt.record.user_id(),
                receipt.record.item_id()
            ),
            CirculationEvent::Archived { title, issue_number, .. } => {
                println!("Archived e-magazine issue: {issue_number} (\"{title}\")");
            }
            CirculationEvent::Playback { title, action, .. } => match action {
                PlaybackAction::Play => println!("Playing audiobook: \"{title}\""),
                PlaybackAction::Pause => println!("Paused: \"{title}\""),
                PlaybackAction::Stop => println!("Stopped: \"{title}\""),
            },
            CirculationEvent::Borrowed(_) => {}
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let mut config = match &args.config {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::default(),
    };
    if let Some(threads) = args.threads {
        config.stress_threads = threads.max(1);
    }
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("{}", "LibraNet Circulation Desk".green().bold());
    println!("=====================================\n");

    let mut catalog = Catalog::new();
    catalog.register_observer(Box::new(TracingObserver));
    catalog.register_observer(Box::new(ConsoleObserver { currency: config.currency.clone() }));

    let users = run_scenario(&catalog, &config, today)?;

    if args.verbose {
        println!();
        CirculationReport::print_catalog(&catalog);
    }

    CirculationReport::print_fine_summary(&catalog, &users, &config.currency);

    if args.stress_test {
        stress_test(&config, today)?;
    }

    if args.json {
        println!("\n{}", CatalogSnapshot::capture(&catalog).to_json()?);
    }

    println!("\n{}", "Demonstration complete!".green().bold());
    Ok(())
}

/// Install the global tracing subscriber
fn init_tracing(args: &Args) {
    let default_level = if args.verbose { "debug" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Offset `start` by a number of days
fn days_after(start: NaiveDate, days: u64) -> Result<NaiveDate> {
    start.checked_add_days(Days::new(days)).ok_or_else(|| anyhow!("{start} + {days} days is out of range"))
}

/// Walk through a typical day at the desk, returning the patrons involved
fn run_scenario(catalog: &Catalog, config: &DeskConfig, today: NaiveDate) -> Result<Vec<User>> {
    let rate = config.fine_per_day;
    let clean_code = parse_id("101")?;
    let effective_java = parse_id("202")?;
    let tech_monthly = parse_id("303")?;

    catalog.add_item(
        LibraryItem::book(clean_code, "Clean Code", "Robert C. Martin", 464).with_fine_per_day(rate),
    )?;
    catalog.add_item(
        LibraryItem::audiobook(effective_java, "Effective Java (Audio)", "Joshua Bloch", 3600)
            .with_fine_per_day(rate),
    )?;
    catalog.add_item(
        LibraryItem::e_magazine(tech_monthly, "Tech Monthly", "Editor Team", 42).with_fine_per_day(rate),
    )?;

    let aisha = User::new(UserId(1), "Aisha");
    let vikram = User::new(UserId(2), "Vikram");

    let record = catalog.borrow_item(clean_code, &aisha, "14 days", today)?;
    println!("{}", circulation_desk::report::format_record(&record, &config.currency));

    match catalog.borrow_item(clean_code, &vikram, "7 days", today) {
        Err(err @ LibraryError::ItemUnavailable { .. }) => println!("{} {err}", "Failure:".yellow()),
        Err(err) => return Err(err.into()),
        Ok(_) => return Err(anyhow!("item {clean_code} was lent twice")),
    }

    let record = catalog.borrow_item(effective_java, &vikram, "7 days", today)?;
    println!("{}", circulation_desk::report::format_record(&record, &config.currency));
    catalog.playback(effective_java, PlaybackAction::Play)?;
    catalog.playback(effective_java, PlaybackAction::Pause)?;

    catalog.return_item(clean_code, days_after(today, 17)?)?;

    catalog.archive_item(tech_monthly)?;

    println!("\nAudiobooks in catalog:");
    for item in catalog.search_by_type(ItemType::Audiobook) {
        println!("   - {item}");
    }

    if let Err(err) = parse_id("12a") {
        println!("{} {err}", "Error:".yellow());
    }
    if let Err(err) = parse_duration_days("3fortnights") {
        println!("{} {err}", "Error:".yellow());
    }

    Ok(vec![aisha, vikram])
}

/// Items lent out during the random storm
const STORM_ITEMS: u32 = 20;

/// Operations each storm thread performs
const STORM_OPS_PER_THREAD: usize = 200;

/// Hammer a fresh catalog from several threads and check it stays consistent
fn stress_test(config: &DeskConfig, today: NaiveDate) -> Result<()> {
    println!("{}", "\nRunning stress test with concurrent operations...".yellow().bold());

    let catalog = Catalog::new();
    for id in 0..STORM_ITEMS {
        catalog.add_item(
            LibraryItem::book(ItemId(id), "Stress Copy", "Load Tester", 100).with_fine_per_day(config.fine_per_day),
        )?;
    }

    single_item_race(&catalog, config.stress_threads, today)?;
    random_storm(&catalog, config.stress_threads, today)?;

    let inconsistent = catalog
        .items()
        .into_iter()
        .filter(|item| item.is_available() == item.current_loan().is_some())
        .count();
    if inconsistent > 0 {
        return Err(anyhow!("{inconsistent} items ended in an inconsistent state"));
    }

    println!("All {} items consistent after the storm", catalog.len());
    for (user, total) in catalog.fines() {
        tracing::debug!(user = %user, total = %total, "Storm fine total");
    }
    Ok(())
}

/// Every thread tries to borrow item 0 at the same moment; exactly one may win
fn single_item_race(catalog: &Catalog, threads: usize, today: NaiveDate) -> Result<()> {
    let barrier = Barrier::new(threads);

    let outcomes = thread::scope(|s| {
        let handles = (0..threads)
            .map(|n| -> Result<_> {
                let barrier = &barrier;
                let user = User::new(UserId(u32::try_from(n)?), "Racer");
                Ok(s.spawn(move |_| {
                    barrier.wait();
                    catalog.borrow_item(ItemId(0), &user, "7 days", today)
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("borrower thread panicked")))
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|_| anyhow!("borrower scope panicked"))??;

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    println!(
        "{} threads raced for item 0: {} succeeded, {} were turned away",
        threads,
        winners,
        threads.saturating_sub(winners)
    );
    if winners != 1 {
        return Err(anyhow!("expected exactly one winner, got {winners}"));
    }

    catalog.return_item(ItemId(0), today).context("returning the raced item")?;
    Ok(())
}

/// Random borrows and returns across all storm items
fn random_storm(catalog: &Catalog, threads: usize, today: NaiveDate) -> Result<()> {
    println!(
        "Spawning {threads} threads with {STORM_OPS_PER_THREAD} random borrow/return operations each"
    );

    thread::scope(|s| {
        let handles = (0..threads)
            .map(|n| -> Result<_> {
                let user = User::new(UserId(u32::try_from(n)?), "Storm");
                Ok(s.spawn(move |_| storm_worker(catalog, &user, today)))
            })
            .collect::<Result<Vec<_>>>()?;

        for handle in handles {
            handle.join().map_err(|_| anyhow!("storm thread panicked"))??;
        }
        Ok::<(), anyhow::Error>(())
    })
    .map_err(|_| anyhow!("storm scope panicked"))?
}

/// One storm thread: expected rejections are counted, anything else aborts
fn storm_worker(catalog: &Catalog, user: &User, today: NaiveDate) -> Result<()> {
    let mut rng = rand::rng();
    let mut completed = 0_usize;

    for _ in 0..STORM_OPS_PER_THREAD {
        let item_id = ItemId(rng.random_range(0..STORM_ITEMS));
        let outcome = if rng.random_bool(0.5) {
            let days = rng.random_range(1_u64..=21);
            catalog.borrow_item(item_id, user, &format!("{days} days"), today).map(|_| ())
        } else {
            let returned_on = days_after(today, rng.random_range(0_u64..=30))?;
            catalog.return_item(item_id, returned_on).map(|_| ())
        };

        match outcome {
            Ok(()) => completed = completed.saturating_add(1),
            Err(LibraryError::ItemUnavailable { .. } | LibraryError::ItemNotBorrowed { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }

    tracing::debug!(user = %user.id, completed, "Storm worker finished");
    Ok(())
}
