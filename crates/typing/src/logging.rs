//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Installs the global subscriber: an `EnvFilter` (from `RUST_LOG`, else
/// the configured directives) over a fmt layer.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.filter)?,
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_ansi(config.ansi))
		.try_init()
		.map_err(|err| ConfigError::Subscriber(err.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_filter_is_reported() {
		if std::env::var_os("RUST_LOG").is_some() {
			return;
		}
		let config = LoggingConfig {
			filter: "kindred_typing=notalevel".to_owned(),
			ansi: false,
		};
		assert!(matches!(init(&config), Err(ConfigError::Filter(_))));
	}
}
