use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Log destination and format, resolved from the environment once at
/// startup. `ER_LOG_DIR` switches output from stdout to a daily-rotated
/// file; `ER_LOG_JSON=1` switches the event format to JSON lines.
#[derive(Debug, Clone, Default)]
struct LogConfig {
    dir: Option<PathBuf>,
    json: bool,
}

impl LogConfig {
    fn from_env() -> Self {
        Self {
            dir: std::env::var_os("ER_LOG_DIR").map(PathBuf::from),
            json: std::env::var("ER_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    fn file_writer(&self, app_name: &'static str) -> Option<BoxMakeWriter> {
        let dir = self.dir.clone()?;
        if let Err(err) = std::fs::create_dir_all(&dir) {
            eprintln!("failed to create log dir {}: {err}; logging to stdout", dir.display());
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(BoxMakeWriter::new(non_blocking))
    }
}

/// Initialize the process-wide tracing subscriber. `RUST_LOG` filters when
/// present (default `info`); destination and format come from `ER_LOG_DIR`
/// and `ER_LOG_JSON`. Calling twice is harmless; the second init is a
/// no-op.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let config = LogConfig::from_env();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match (config.file_writer(app_name), config.json) {
        (Some(writer), true) => {
            let _ = builder.json().with_writer(writer).try_init();
        }
        (Some(writer), false) => {
            let _ = builder.with_writer(writer).try_init();
        }
        (None, true) => {
            let _ = builder.json().try_init();
        }
        (None, false) => {
            let _ = builder.try_init();
        }
    }
}

/// Route panics through `tracing` so a crash in the batch job or a request
/// handler lands in the same log stream as everything else. Installs once
/// per process; set `ER_LOG_INCLUDE_BACKTRACE=1` to chain the default hook.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let include_backtrace = std::env::var("ER_LOG_INCLUDE_BACKTRACE")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload not string".into());

            tracing::error!(
                application = app_name,
                run_id = crate::run_id::get(),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %message,
                "panic captured"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}
