//! Environment configuration, read from TOML.
//!
//! ```toml
//! [processor]
//! mode = "worker"
//! class = "cpu_blocking"
//!
//! [logging]
//! filter = "kindred_typing=debug"
//! ```

use std::path::Path;

use kindred_worker::TaskClass;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub processor: ProcessorConfig,
	pub logging: LoggingConfig,
}

impl Config {
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&input)
	}
}

/// Which processor deferred expressions are handed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
	pub mode: ProcessorMode,
	/// Task class used by thread, worker and delegating modes.
	pub class: WorkerClass,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorMode {
	#[default]
	Inline,
	Thread,
	Worker,
	Delegating,
}

/// Serializable mirror of [`TaskClass`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerClass {
	Interactive,
	Background,
	IoBlocking,
	#[default]
	CpuBlocking,
}

impl From<WorkerClass> for TaskClass {
	fn from(class: WorkerClass) -> Self {
		match class {
			WorkerClass::Interactive => TaskClass::Interactive,
			WorkerClass::Background => TaskClass::Background,
			WorkerClass::IoBlocking => TaskClass::IoBlocking,
			WorkerClass::CpuBlocking => TaskClass::CpuBlocking,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
	/// `EnvFilter` directives used when `RUST_LOG` is unset.
	pub filter: String,
	pub ansi: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			filter: "warn".to_owned(),
			ansi: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_empty_config_uses_defaults() {
		let config = Config::from_toml("").expect("empty config parses");
		assert_eq!(config, Config::default());
		assert_eq!(config.processor.mode, ProcessorMode::Inline);
		assert_eq!(config.logging.filter, "warn");
	}

	#[test]
	fn test_processor_section() {
		let config = Config::from_toml(
			r#"
[processor]
mode = "worker"
class = "io_blocking"
"#,
		)
		.expect("config parses");
		assert_eq!(config.processor.mode, ProcessorMode::Worker);
		assert_eq!(TaskClass::from(config.processor.class), TaskClass::IoBlocking);
	}

	#[test]
	fn test_unknown_fields_are_rejected() {
		let err = Config::from_toml("[processor]\nthreads = 4\n").expect_err("unknown field");
		assert!(matches!(err, ConfigError::Toml(_)));
	}

	#[test]
	fn test_load_reports_missing_file() {
		let err = Config::load("/nonexistent/kindred.toml").expect_err("missing file");
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}
