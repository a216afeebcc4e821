//! slog root logger used for per-component service loggers.
//!
//! The HTTP layer logs through `tracing`; long-lived services carry an
//! slog `Logger` child tagged with their component name.

use slog::{o, Drain, Logger};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 4096,
            use_color: true,
        }
    }
}

pub fn setup_logger(config: &LoggerConfig) -> Logger {
    let decorator = if config.use_color {
        slog_term::TermDecorator::new().build()
    } else {
        slog_term::TermDecorator::new().force_plain().build()
    };
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::info;

    #[test]
    fn logger_builds_and_logs() {
        let logger = setup_logger(&LoggerConfig::default());
        info!(logger, "logger smoke test"; "component" => "tests");
    }
}
