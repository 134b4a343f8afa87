use std::path::Path;
use std::time::Duration;

use log::LogLevel;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthMode, RequestAuth};
use crate::correlate::DEFAULT_EVENTS_LIMIT;
use crate::error::{GateError, Result};
use crate::poll::{DEFAULT_INTERVAL_MS, DEFAULT_TIMEOUT_MS, PollBudget};

pub const APP_NAME: &str = "plategate";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
	pub version: u8,
	pub backend_url: String,
	pub auth: AuthMode,
	pub secret: Option<String>,
	pub secret_header: String,
	pub request_timeout_ms: u64,
	pub poll_interval_ms: u64,
	pub poll_timeout_ms: u64,
	pub events_limit: usize,
	pub lane: Option<String>,
	pub log_level: String,
	pub log_file: bool,
}

impl ::std::default::Default for Conf {
	fn default() -> Self {
		Self {
			version: 0,
			backend_url: "http://localhost:8000".into(),
			auth: AuthMode::None,
			secret: None,
			secret_header: "X-Secret".into(),
			request_timeout_ms: 10_000,
			poll_interval_ms: DEFAULT_INTERVAL_MS,
			poll_timeout_ms: DEFAULT_TIMEOUT_MS,
			events_limit: DEFAULT_EVENTS_LIMIT,
			lane: None,
			log_level: "info".into(),
			log_file: true,
		}
	}
}

impl Conf {
	pub fn validate(&self) -> Result<()> {
		if self.backend_url.trim().is_empty() {
			return Err(GateError::Config("backend_url is empty".into()));
		}
		if self.poll_interval_ms == 0 {
			return Err(GateError::Config("poll_interval_ms must be positive".into()));
		}
		if self.events_limit == 0 {
			return Err(GateError::Config("events_limit must be positive".into()));
		}
		if self.auth != AuthMode::None && self.auth().header_for(&self.backend_url).is_none() {
			return Err(GateError::Config(format!(
				"auth mode {:?} needs a secret",
				self.auth
			)));
		}
		self.log_level()?;
		Ok(())
	}

	pub fn log_level(&self) -> Result<LogLevel> {
		self.log_level.parse().map_err(GateError::Config)
	}

	pub fn budget(&self) -> Result<PollBudget> {
		PollBudget::from_millis(self.poll_interval_ms, self.poll_timeout_ms)
	}

	pub fn auth(&self) -> RequestAuth {
		RequestAuth::new(self.auth, self.secret_header.clone(), self.secret.clone())
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}
}

/// Load the configuration from `path`, or from the default confy location.
pub fn load_config(path: Option<&Path>) -> Result<Conf> {
	let loaded: std::result::Result<Conf, confy::ConfyError> = match path {
		Some(path) => confy::load_path(path),
		None => confy::load(APP_NAME, None),
	};
	loaded.map_err(|e| GateError::Config(format!("failed to load configuration: {e}")))
}
