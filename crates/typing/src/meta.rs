//! Metadata attached to symbols and terms.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Timestamped, insertion-ordered attributes. The typing core threads these
/// through construction without interpreting them.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
	created: DateTime<Utc>,
	attributes: Arc<IndexMap<Arc<str>, Arc<str>>>,
}

impl Metadata {
	pub fn new() -> Self {
		Self {
			created: Utc::now(),
			attributes: Arc::default(),
		}
	}

	pub fn created(&self) -> DateTime<Utc> {
		self.created
	}

	pub fn attribute(&self, key: &str) -> Option<&str> {
		self.attributes.get(key).map(|v| &**v)
	}

	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attributes.iter().map(|(k, v)| (&**k, &**v))
	}

	/// Returns a copy carrying `key = value`.
	pub fn with_attribute(&self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
		let mut attributes = (*self.attributes).clone();
		attributes.insert(key.into(), value.into());
		Self {
			created: self.created,
			attributes: Arc::new(attributes),
		}
	}

	/// Returns a copy with a fresh timestamp and the same attributes.
	pub fn renew(&self) -> Self {
		Self {
			created: Utc::now(),
			attributes: self.attributes.clone(),
		}
	}
}

impl Default for Metadata {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_renew_keeps_attributes() {
		let meta = Metadata::new().with_attribute("origin", "test");
		let renewed = meta.renew();
		assert_eq!(renewed.attribute("origin"), Some("test"));
		assert!(renewed.created() >= meta.created());
		assert_eq!(meta.attributes().count(), 1);
	}
}
