//! Gallery-Sweep main entry point
//!
//! This is the command-line interface for the Gallery-Sweep image crawler.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use gallery_sweep::config::{load_config, ConfigOverrides, CrawlConfig, RendererKind};
use gallery_sweep::execute_run;
use gallery_sweep::logging::{bootstrap_logging, init_logging};
use gallery_sweep::output::{print_summary, RunDirectory};
use std::path::PathBuf;
use tokio::sync::{oneshot, watch};

/// Gallery-Sweep: a bounded single-site image crawler
///
/// Walks a paginated gallery site from START_URL, following "next page"
/// controls or same-site links, and writes every image it finds into an
/// HTML report under a timestamped run folder.
#[derive(Parser, Debug)]
#[command(name = "gallery-sweep")]
#[command(version)]
#[command(about = "A bounded single-site image crawler", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed URL (overrides START_URL)
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Maximum pages to visit, 0 for no limit (overrides MAX_PAGES)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Parent folder for run output (overrides OUTPUT_DIR)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Page renderer engine: static or chromium (overrides RENDERER)
    #[arg(long, value_name = "ENGINE")]
    renderer: Option<RendererKind>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and print it without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_url: self.start_url.clone(),
            max_pages: self.max_pages,
            output_dir: self.output_dir.clone(),
            engine: self.renderer,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Stdout only until the configuration is known to be good
    let bootstrap = bootstrap_logging(cli.verbose, cli.quiet);
    let config = match load_config(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e).context("invalid configuration");
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let run_dir = RunDirectory::create(&config.output_dir, Local::now())
        .context("failed to create run directory")?;
    drop(bootstrap);

    let logging = init_logging(cli.verbose, cli.quiet, Some(&run_dir.log_path()))
        .context("failed to initialize logging")?;

    tracing::info!("Results will be written to {}", run_dir.path().display());

    let (interrupt, force_quit) = spawn_interrupt_handler();
    let run = tokio::select! {
        result = execute_run(&config, &run_dir, interrupt) => Some(result),
        Ok(()) = force_quit => None,
    };

    // A cancelled run has already dropped, and so released, its renderer
    let Some(result) = run else {
        tracing::error!("Force quit requested, crawl abandoned without a report");
        drop(logging);
        std::process::exit(130);
    };
    let summary = result.context("crawl aborted")?;

    print_summary(&summary);

    // Flushes the run log
    drop(logging);
    Ok(())
}

/// Wires Ctrl+C to the crawl
///
/// The first press flips the watch channel so the traversal stops at the
/// next step boundary. A second press fires the oneshot, which abandons the
/// run.
fn spawn_interrupt_handler() -> (watch::Receiver<bool>, oneshot::Receiver<()>) {
    let (stop_tx, stop_rx) = watch::channel(false);
    let (force_tx, force_rx) = oneshot::channel();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, stopping after the current page (press again to force quit)");
            let _ = stop_tx.send(true);

            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nForce quit requested, closing the renderer...");
                let _ = force_tx.send(());
            }
        }
    });

    (stop_rx, force_rx)
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== Gallery-Sweep Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", config.start_url);
    println!("  Pager selector: {}", config.pager_selector);
    if config.is_unbounded() {
        println!("  Max pages: unlimited");
    } else {
        println!("  Max pages: {}", config.max_pages);
    }
    println!(
        "  Page load timeout: {}s",
        config.page_load_timeout.as_secs()
    );

    println!("\nRenderer:");
    println!("  Engine: {}", config.engine);
    println!(
        "  User agent: {}",
        config.user_agent.as_deref().unwrap_or("(default)")
    );
    println!("  Scroll settle: {}ms", config.scroll_settle.as_millis());
    println!(
        "  Navigation settle: {}ms",
        config.navigation_settle.as_millis()
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output_dir.display());

    println!("\n✓ Configuration is valid");
}
