use std::sync::Once;

/// Where the active filter comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FilterSource {
    /// Directive string in `env_logger` syntax.
    Directives(String),
    /// A single level for every target.
    Level(log::LevelFilter),
}

/// Backend settings for draw-call diagnostics.
///
/// Filter precedence: `env_filter`, then the `RUST_LOG` variable, then
/// `default_level`. Useful directives are "symbol_sdf=trace" to see halo
/// pass decisions and "symbol_sdf=debug" for one line per draw.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.env_filter = Some(directives.into());
        self
    }

    pub(crate) fn filter_source(&self, rust_log: Option<String>) -> FilterSource {
        self.env_filter
            .clone()
            .or(rust_log)
            .map(FilterSource::Directives)
            .unwrap_or(FilterSource::Level(self.default_level))
    }
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend on first call; later calls do nothing.
///
/// A logger that was installed elsewhere first (test harnesses do this) is
/// left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.filter_source(std::env::var("RUST_LOG").ok()) {
            FilterSource::Directives(d) => builder.parse_filters(&d),
            FilterSource::Level(level) => builder.filter_level(level),
        };
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("symbol-sdf logging ready");
        }
    });
}
