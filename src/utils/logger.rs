use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::time::UtcTime, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::error::{AppError, AppResult};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

const LOG_FILE_PREFIX: &str = "kico-progress.log";

/// Level per store target. Progress writes are traced at debug so a support
/// log shows every append and sync flip; the other documents change rarely.
const STORE_TARGETS: &[(&str, &str)] = &[
    ("app::progress", "debug"),
    ("app::storage", "debug"),
    ("app::device", "info"),
    ("app::speech", "info"),
    ("app::instructions", "info"),
    ("app::settings", "info"),
    ("app::command", "info"),
];

/// `warn` for dependencies, then one directive per store target.
pub fn default_directives() -> String {
    let mut directives = String::from("warn");
    for (target, level) in STORE_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level);
    }
    directives
}

/// Installs the global subscriber. Everything that passes the filter goes to
/// a daily file under the data directory's `logs/`; the console only shows
/// warnings so a host shell's own output stays readable. Later calls are
/// no-ops.
pub fn init_logging(log_dir: &Path) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| -> AppResult<()> {
            std::fs::create_dir_all(log_dir)?;

            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let env_filter = match EnvFilter::try_from_default_env() {
                Ok(filter) => filter,
                Err(_) => EnvFilter::try_new(default_directives())
                    .map_err(|err| AppError::other(format!("invalid log filter: {err}")))?,
            };

            LOGGER_GUARD
                .set(guard)
                .map_err(|_| AppError::other("logging already initialised"))?;

            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339());
            let console_layer = fmt::layer()
                .with_target(true)
                .with_timer(UtcTime::rfc_3339())
                .with_filter(LevelFilter::WARN);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(console_layer)
                .try_init()
                .map_err(|err| AppError::other(format!("failed to install subscriber: {err}")))?;

            Ok(())
        })
        .map(|_| ())
}
