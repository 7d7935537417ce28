use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dpr_config::UnusedKeyPolicy;
use dpr_runtime::{CsvDirSource, NullSink, ReportDriver};

#[derive(Parser)]
#[command(name = "dpr")]
#[command(about = "Daily production report ingestion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Validate and reconcile every report sheet under a directory
    Ingest {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Fail instead of warn when the config carries keys nothing reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,

        /// Directory holding CSV exports of the report sheet (walked recursively)
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations.
    Migrate,

    /// Register report dates (inclusive range) so they get identifiers.
    RegisterDates {
        /// First date, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,

        /// Last date, YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present. Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = dpr_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = dpr_db::status(&pool).await?;
                    println!(
                        "db_ok={} has_report_dates_table={} registered_dates={}",
                        s.ok, s.has_report_dates_table, s.registered_dates
                    );
                }
                DbCmd::Migrate => {
                    dpr_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
                DbCmd::RegisterDates { from, to } => {
                    let n = dpr_db::register_report_dates(&pool, from, to).await?;
                    println!("registered_dates={n}");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = dpr_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Ingest {
            config_paths,
            strict_config,
            dir,
        } => {
            let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
            let loaded = dpr_config::load_layered_yaml(&path_refs)?;
            let policy = if strict_config {
                UnusedKeyPolicy::Fail
            } else {
                UnusedKeyPolicy::Warn
            };
            let unused = dpr_config::report_unused_keys(&loaded.config_json, policy)?;
            for key in &unused.unused_leaf_pointers {
                warn!(key = %key, "config key is not used");
            }
            let engine = loaded.engine()?;
            let tz = engine.tz()?;

            let pool = dpr_db::connect_from_env().await?;
            let reference = dpr_db::load_reference_data(&pool).await?;
            let store = dpr_db::PgSnapshotStore::new(pool.clone());
            let dates = dpr_db::PgDateIds::new(pool.clone());

            let source = CsvDirSource::open(&dir, &engine.sheet_name)
                .with_context(|| format!("cannot list report files under {}", dir.display()))?;

            let mut driver = ReportDriver::new(&engine, &reference, tz, &store, &dates);
            info!(config_hash = %loaded.config_hash, run_id = %driver.summary().run_id, dir = %dir.display(), "ingest start");

            let mut sink = NullSink;
            driver
                .process_files(source, &mut sink)
                .await
                .context("ingest aborted on store fault")?;

            let summary = driver.finish();
            info!(
                run_id = %summary.run_id,
                success = summary.success,
                error = summary.error,
                warning = summary.warning,
                info = summary.info,
                "ingest done"
            );
            println!("config_hash={}", loaded.config_hash);
            print!("{summary}");
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
