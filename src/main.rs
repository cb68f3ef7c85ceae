use batchfetch::batch::BatchController;
use batchfetch::capability::HttpCapability;
use batchfetch::config::{ConfigLoader, FetchConfig};
use batchfetch::input;
use batchfetch::metrics::snapshot::MetricsSnapshot;
use batchfetch::output::{self, OutputHandler};
use batchfetch::output::console::ConsoleOutput;
use batchfetch::output::markdown::MarkdownOutput;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "batchfetch")]
#[command(version)]
#[command(about = "Fetch many URLs concurrently and save them as markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every URL listed in a file
    Run {
        /// Input file with one URL per line
        input: PathBuf,

        /// Directory to save fetched pages into [default: materials]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of concurrent fetches [default: 5]
        #[arg(short, long)]
        threads: Option<usize>,

        /// Per-URL timeout in seconds [default: 30]
        #[arg(long)]
        timeout: Option<u64>,

        /// Optional configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let level = logger.filter();
    let multi = Arc::new(indicatif::MultiProgress::new());

    match cli.command {
        Commands::Run { input, output, threads, timeout, config, no_progress } => {
            let progress = !no_progress;
            if progress {
                indicatif_log_bridge::LogWrapper::new((*multi).clone(), logger).try_init()?;
            } else {
                log::set_boxed_logger(Box::new(logger))?;
            }
            log::set_max_level(level);

            let mut settings = match &config {
                Some(path) => {
                    log::info!("Loading config from {:?}", path);
                    ConfigLoader::load(path)?
                }
                None => FetchConfig::default(),
            };
            if let Some(threads) = threads {
                settings.concurrency = threads;
            }
            if let Some(timeout) = timeout {
                settings.timeout_secs = timeout;
            }
            if let Some(output) = output {
                settings.output_dir = output.to_string_lossy().into_owned();
            }
            let engine_config = settings.engine()?;

            let urls = input::load_urls(&input)?;
            if urls.is_empty() {
                eprintln!("No URLs found in input file");
                std::process::exit(1);
            }

            let console = ConsoleOutput::new(progress.then(|| multi.clone()));
            console.line(&format!("Found {} URLs to fetch", urls.len()))?;
            console.line(&format!("Using {} threads", engine_config.max_concurrency))?;

            let mut handlers: Vec<Box<dyn OutputHandler>> = vec![
                Box::new(MarkdownOutput::new(
                    PathBuf::from(&settings.output_dir),
                    console.clone(),
                )?),
                Box::new(console.clone()),
            ];
            if let Some(report) = ConfigLoader::create_report(&settings).await? {
                handlers.push(report);
            }

            let capability = Arc::new(HttpCapability::new(&settings.user_agent)?);
            let controller = BatchController::new(engine_config, None)?;

            let mut progress_bar: Option<ProgressBar> = None;
            let mut progress_task = None;
            if progress {
                let pb = multi.add(ProgressBar::new(urls.len() as u64));
                pb.set_style(ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                    .progress_chars("#>-"));

                let mut metrics_rx = controller.watch_metrics();
                let pb_clone = pb.clone();
                progress_bar = Some(pb);
                progress_task = Some(tokio::spawn(async move {
                    while metrics_rx.changed().await.is_ok() {
                        let snapshot: MetricsSnapshot = metrics_rx.borrow().clone();
                        pb_clone.set_position(snapshot.items_completed);
                        pb_clone.set_message(format!(
                            "Active: {} | Failed: {} | Rate: {:.2}/s",
                            snapshot.active_workers,
                            snapshot.items_failed,
                            snapshot.items_per_second
                        ));
                    }
                }));
            }

            let summary = controller.execute(urls, capability).await;

            if let Some(task) = progress_task {
                task.abort();
            }
            if let Some(pb) = progress_bar {
                pb.finish_and_clear();
            }

            let written = output::write_all(&summary, &mut handlers, &console).await;
            let (succeeded, failed) = written.counts(&summary);

            println!("\nComplete: {} succeeded, {} failed", succeeded, failed);

            if !written.is_success(&summary) {
                std::process::exit(1);
            }
        }
        Commands::Check { config } => {
            match ConfigLoader::load(&config) {
                Ok(cfg) => {
                    println!("✅ Config is valid:");
                    println!("   Concurrency: {}", cfg.concurrency);
                    println!("   Timeout: {}s", cfg.timeout_secs);
                    println!("   Output dir: {}", cfg.output_dir);
                    println!("   Report: {:?}", cfg.report);
                }
                Err(e) => {
                    eprintln!("❌ Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
