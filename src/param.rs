//! Request parameter payloads.
//!
//! The execution engine never serializes parameters itself; it accepts the rendered string
//! and sends it as-is. This module holds the two payload shapes the request surface accepts:
//! URL-encoded key/value pairs (query strings and form bodies) and JSON documents.

/// A payload that can be rendered to the string form sent over the transport.
pub trait Parameter {
	/// Renders the payload to its wire form.
	fn render(&self) -> String;
}

/// URL-encoded key/value pairs.
///
/// Rendered with `form_urlencoded`, so names and values may contain arbitrary text; pair
/// order is preserved.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UrlQuery {
	pairs: Vec<(String, String)>,
}

impl UrlQuery {
	/// Creates an empty query.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends one name/value pair.
	#[must_use]
	pub fn pair(mut self, name: &str, value: &str) -> Self {
		self.pairs.push((name.to_owned(), value.to_owned()));
		self
	}

	/// Returns whether the query has no pairs.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}
}

impl Parameter for UrlQuery {
	fn render(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());
		for (name, value) in &self.pairs {
			let _ = serializer.append_pair(name, value);
		}
		serializer.finish()
	}
}

/// A JSON document body.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonBody(pub serde_json::Value);

impl Parameter for JsonBody {
	fn render(&self) -> String {
		self.0.to_string()
	}
}

impl From<serde_json::Value> for JsonBody {
	fn from(value: serde_json::Value) -> Self {
		Self(value)
	}
}
