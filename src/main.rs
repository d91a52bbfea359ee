//! wp-unclaimed CLI - find unclaimed plugin slugs across WordPress sites

use clap::Parser;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use wp_unclaimed::{
    Error, Report, Scan, ScanEvent, SiteInventory,
    output::{render_inventory, render_report, write_json_report},
};

/// WordPress dependency confusion scanner - finds plugin slugs that sites
/// reference but nobody has claimed on the official registry
#[derive(Parser, Debug)]
#[command(name = "wp-unclaimed")]
#[command(version, about, long_about = None)]
#[command(after_help = "Use responsibly and only on sites you have permission to test.")]
struct Args {
    /// Target URLs to scan
    targets: Vec<String>,

    /// File containing target URLs, one per line
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Number of concurrent workers per phase
    #[arg(short = 't', long = "threads", default_value_t = wp_unclaimed::DEFAULT_WORKERS)]
    threads: usize,

    /// Save the vulnerability report to a JSON file
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Also list claimed and indeterminate plugins per site
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Allow scanning private/internal IP addresses (localhost, 192.168.x.x, etc.)
    #[arg(long = "allow-private")]
    allow_private: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    print_banner();

    match run_scan(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[!]".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run_scan(args: Args) -> wp_unclaimed::Result<()> {
    let targets = load_targets(&args)?;

    let scan = Scan::builder(targets)
        .workers(args.threads)
        .allow_private(args.allow_private)
        .build()?;

    println!(
        "{} Starting scan for {} target(s) with {} workers...",
        "[*]".blue(),
        scan.target_count(),
        args.threads.max(1)
    );

    let outcome = scan.run_with_progress(print_progress).await;

    if outcome.unique_slugs() == 0 {
        println!();
        println!(
            "{} Scan complete. No plugins were found across any of the targets.",
            "[+]".green()
        );
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    let report = Report::build(&outcome);
    writeln!(writer).map_err(Error::OutputFailed)?;
    render_report(&report, &mut writer)?;

    if args.verbose {
        let inventories = SiteInventory::build_all(&outcome);
        writeln!(writer).map_err(Error::OutputFailed)?;
        writeln!(writer, "{} All found plugins:", "[*]".blue()).map_err(Error::OutputFailed)?;
        render_inventory(&inventories, &mut writer)?;
    }

    if let Some(path) = &args.output {
        write_json_report(&report, path)?;
        writeln!(
            writer,
            "{} Results saved to {}",
            "[+]".green(),
            path.display()
        )
        .map_err(Error::OutputFailed)?;
    }

    Ok(())
}

/// Render a progress event as a console line
fn print_progress(event: ScanEvent) {
    match event {
        ScanEvent::ExtractionStarted { .. } => {
            println!(
                "{} Phase 1: Scraping sites to identify plugins...",
                "[*]".blue()
            );
        }
        ScanEvent::TargetScraped {
            index,
            total,
            target,
            slugs_found,
            error,
        } => {
            if let Some(error) = error {
                eprintln!("  {} Error scraping {}: {}", "[!]".red(), target, error);
            }
            println!(
                "  > Scraped {}/{}: {} (found {} plugins)",
                index, total, target, slugs_found
            );
        }
        ScanEvent::VerificationStarted { slugs } => {
            println!();
            println!(
                "{} Phase 2: Checking the status of {} unique plugins...",
                "[*]".blue(),
                slugs
            );
        }
        ScanEvent::SlugChecked {
            index,
            total,
            slug,
            status,
        } => {
            println!("  > Checked {}/{}: {} -> {}", index, total, slug, status);
        }
    }
}

/// Merge positional targets with the optional target list file
fn load_targets(args: &Args) -> wp_unclaimed::Result<Vec<String>> {
    let mut targets = args.targets.clone();

    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path).map_err(|source| Error::TargetList {
            path: path.display().to_string(),
            source,
        })?;
        targets.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    Ok(targets)
}

fn print_banner() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("wp-unclaimed v{}", VERSION);
    println!("WordPress unclaimed-plugin scanner");
    println!();
}
