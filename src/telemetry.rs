use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::EnvFilter;

/// Daily rolling log file under `log_dir`. `RUST_LOG` overrides the default
/// DEBUG level. The returned guard must live until shutdown or buffered lines
/// are lost.
pub fn init(log_dir: &str) -> WorkerGuard {
    let file_appender = rolling::daily(log_dir, "hrms.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}
