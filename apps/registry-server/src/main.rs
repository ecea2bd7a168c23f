use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use project_registry::{config::ProjectRegistryConfig, ProjectRegistry};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";
const API_INGRESS: &str = "api_ingress";
// sqlx has no "never" for idle/lifetime reaping through sea-orm
const MEMORY_CONN_KEEPALIVE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Adds `mode=rwc` so the database file is created on first start.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) if q.contains("mode=") => {
            out.push('?');
            out.push_str(q);
        }
        Some(q) => {
            out.push('?');
            out.push_str(q);
            out.push_str("&mode=rwc");
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Sqlite,
    Postgres,
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(dsn: &str) -> Result<Backend> {
    let raw = dsn.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Project Registry Server - institutions, projects and their owners over REST
#[derive(Parser)]
#[command(name = "registry-server")]
#[command(about = "Project Registry Server - institutions, projects and users over REST")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Project Registry Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

/// Settings every command needs resolved before doing anything.
struct Resolved {
    addr: SocketAddr,
    dsn: String,
    backend: Backend,
    db: DatabaseConfig,
    ingress: ApiIngressConfig,
    registry: ProjectRegistryConfig,
}

fn resolve(config: &AppConfig, args: &CliArgs) -> Result<Resolved> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address '{}:{}'",
                config.server.host, config.server.port
            )
        })?;

    let db = match config.database.clone() {
        Some(db) => db,
        None => {
            tracing::warn!("No database configuration found, using defaults");
            AppConfig::default()
                .database
                .ok_or_else(|| anyhow!("No default database configuration"))?
        }
    };

    // --mock swaps whatever is configured for in-memory SQLite
    let dsn = if args.mock {
        MEMORY_DSN.to_string()
    } else {
        db.url.trim().to_owned()
    };
    let backend = detect_from_dsn(&dsn)?;

    Ok(Resolved {
        addr,
        dsn,
        backend,
        db,
        ingress: config.module_config(API_INGRESS)?,
        registry: config.module_config(ProjectRegistry::NAME)?,
    })
}

/// Pool settings for a resolved DSN.
///
/// An in-memory SQLite database lives exactly as long as its single
/// connection, so that connection is pinned: one slot, never reaped.
fn connect_options(dsn: &str, db: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(dsn.to_owned());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(true);

    if dsn == MEMORY_DSN {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_KEEPALIVE)
            .max_lifetime(MEMORY_CONN_KEEPALIVE);
    } else {
        opts.max_connections(db.max_conns.unwrap_or(10));
    }

    if let Some(ms) = db.busy_timeout_ms {
        let busy = Duration::from_millis(u64::from(ms));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }
    opts
}

async fn connect(resolved: &Resolved, base_dir: &Path) -> Result<DatabaseConnection> {
    let dsn = match resolved.backend {
        // Absolutize sqlite DSNs to avoid cwd issues
        Backend::Sqlite => absolutize_sqlite_dsn(&resolved.dsn, base_dir, true)?,
        Backend::Postgres => resolved.dsn.clone(),
    };

    let opts = connect_options(&dsn, &resolved.db);

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {dsn}"))?;
    tracing::info!("Connected DB backend: {:?}", resolved.backend);
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let resolved = resolve(&config, &args)?;

    // Base dir for resolving relative sqlite paths (already absolute & created)
    let base_dir = PathBuf::from(&config.server.home_dir);
    let db = connect(&resolved, &base_dir).await?;

    tracing::info!("Initializing modules...");
    ProjectRegistry::migrate(&db).await?;
    let registry = ProjectRegistry::new(db, resolved.registry.clone());

    let mut ingress = ApiIngress::new(resolved.ingress.clone());
    ingress.register_openapi(ProjectRegistry::openapi());

    let routes = registry.register_rest(axum::Router::new())?;
    let router = ingress.build_router(routes)?;

    ingress.serve(router, resolved.addr).await
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let resolved = resolve(&config, &args)?;
    tracing::info!(
        addr = %resolved.addr,
        backend = ?resolved.backend,
        "Configuration is valid"
    );
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
