use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

// -------- levels --------

/// `None` means the sink is switched off. Unknown strings fall back to INFO.
fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" | "none" => None,
        _ => Some(LevelFilter::INFO),
    }
}

/// True if `target` is `prefix` itself or one of its `prefix::` children.
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- rotating file sink --------

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

/// Relative log paths live under `base_dir` (the server home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating_file(
    path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotatingFile> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        path,
        AppendCount::new(max_backups),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(RotatingFile(Arc::new(Mutex::new(rot))))
}

fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<RotatingFile> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, base_dir);
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    match open_rotating_file(&path, max_bytes as usize, backups) {
        Ok(file) => Some(file),
        Err(e) => {
            // the subscriber is not installed yet, so stderr is all we have
            eprintln!(
                "Failed to open log file for '{}': {} ({})",
                name,
                path.display(),
                e
            );
            None
        }
    }
}

// -------- per-subsystem routing --------

/// Picks the log file for an event by its target prefix, falling back to the
/// default file. Events without a destination are dropped.
#[derive(Clone, Default)]
struct FileRouter {
    fallback: Option<RotatingFile>,
    by_prefix: Vec<(String, RotatingFile)>,
}

impl FileRouter {
    fn resolve(&self, target: &str) -> Option<RotatingFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_prefix(target, prefix))
            .map(|(_, file)| file.clone())
            .or_else(|| self.fallback.clone())
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.by_prefix.is_empty()
    }
}

struct RoutedWriter(Option<RotatingFile>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve(meta.target()))
    }
}

// -------- plan --------

/// Filters and sinks derived from a `LoggingConfig`, ready to install.
struct LogPlan {
    console: Targets,
    file: Targets,
    router: FileRouter,
}

impl LogPlan {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let default = cfg.get(DEFAULT_SECTION);

        let default_console = default
            .and_then(|s| parse_level(&s.console_level))
            .unwrap_or(LevelFilter::OFF);
        let default_file = default
            .filter(|s| !s.file.trim().is_empty())
            .and_then(|s| parse_level(&s.file_level))
            .unwrap_or(LevelFilter::OFF);

        let mut console = Targets::new().with_default(default_console);
        let mut file = Targets::new().with_default(default_file);
        let mut router = FileRouter {
            fallback: default.and_then(|s| open_section_file(DEFAULT_SECTION, s, base_dir)),
            by_prefix: Vec::new(),
        };

        for (name, section) in cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION) {
            console = console.with_target(
                name.clone(),
                parse_level(&section.console_level).unwrap_or(LevelFilter::OFF),
            );

            // a subsystem without its own file shares the default one
            let file_level = match open_section_file(name, section, base_dir) {
                Some(sink) => {
                    router.by_prefix.push((name.clone(), sink));
                    parse_level(&section.file_level).unwrap_or(LevelFilter::OFF)
                }
                None if router.fallback.is_some() => {
                    parse_level(&section.file_level).unwrap_or(default_file)
                }
                None => LevelFilter::OFF,
            };
            file = file.with_target(name.clone(), file_level);
        }

        Self {
            console,
            file,
            router,
        }
    }

    fn install(self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

        let console_layer = fmt::layer()
            .with_ansi(std::io::stdout().is_terminal())
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(self.console);

        let file_layer = (!self.router.is_empty()).then(|| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(self.router)
                .with_filter(self.file)
        });

        let _ = Registry::default()
            .with(console_layer)
            .with(file_layer)
            .try_init();
    }
}

// -------- public init --------

/// Install the global subscriber described by `cfg`.
///
/// Relative log file paths are resolved against `base_dir` (normally
/// `server.home_dir`). An empty config installs a plain console logger.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Route `log` records (sqlx, sea-orm) into tracing before the subscriber exists.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    LogPlan::from_config(cfg, base_dir).install();
}

fn init_default_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("trace"), Some(LevelFilter::TRACE));
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level(" Info "), Some(LevelFilter::INFO));
        assert_eq!(parse_level("warn"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("ERROR"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("off"), None);
        assert_eq!(parse_level("none"), None);
        assert_eq!(parse_level("loud"), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_prefix_matching_respects_module_boundaries() {
        assert!(matches_prefix("project_registry", "project_registry"));
        assert!(matches_prefix("project_registry::api::rest", "project_registry"));
        assert!(!matches_prefix("project_registry_extra", "project_registry"));
        assert!(!matches_prefix("sea_orm", "project_registry"));
    }

    #[test]
    fn test_relative_log_paths_resolve_under_base_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let absolute = tmp.path().join("abs.log");
        let kept = resolve_log_path(&absolute.to_string_lossy(), Path::new("/elsewhere"));
        assert_eq!(kept, absolute);
    }

    #[test]
    fn test_open_rotating_file_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let mut file = open_rotating_file(&p, 128 * 1024, 2).expect("writer should be created");
        file.write_all(b"hello\n").unwrap();
        file.flush().unwrap();
        assert!(p.parent().unwrap().is_dir());
    }

    #[test]
    fn test_plan_routes_subsystems_to_their_own_files() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert(
            "project_registry".into(),
            section("debug", "logs/registry_module.log", "debug"),
        );
        cfg.insert("sea_orm".into(), section("warn", "", "warn"));

        let plan = LogPlan::from_config(&cfg, tmp.path());

        assert!(plan.router.fallback.is_some());
        assert_eq!(plan.router.by_prefix.len(), 1);
        assert!(plan.router.resolve("project_registry::domain").is_some());
        // no own file: falls back to the default one
        assert!(plan.router.resolve("sea_orm::driver").is_some());
    }

    #[test]
    fn test_plan_without_files_has_empty_router() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "", "debug"));

        let plan = LogPlan::from_config(&cfg, tmp.path());
        assert!(plan.router.is_empty());
        assert!(plan.router.resolve("anything").is_none());
    }
}
