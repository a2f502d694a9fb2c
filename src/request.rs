//! The caller-visible request surface.
//!
//! A [`Client`] holds base configuration and builds one-shot [`Request`] objects bound to an
//! injected [`Connector`]. Each verb assembles the per-request option entries on top of the
//! client's base set (per-request keys override base keys), injects the default user agent
//! when none was configured, and hands the merged set to the execution engine. One request
//! object corresponds to one transport handle; the verbs consume the request.

use crate::engine;
use crate::error::Error;
use crate::options::{ClientOptions, OptionSet, TransportOption, Value, USER_AGENT};
use crate::param::{Parameter, UrlQuery};
use crate::response::Response;
use crate::transport::Connector;

/// A factory for requests sharing one base configuration.
#[derive(Clone, Debug)]
pub struct Client {
	options: ClientOptions,
}

impl Client {
	/// Creates a client with the default configuration.
	#[must_use]
	pub fn new() -> Self {
		Self {
			options: ClientOptions::new(),
		}
	}

	/// Creates a client with the given base configuration.
	#[must_use]
	pub fn with_options(options: ClientOptions) -> Self {
		Self { options }
	}

	/// Builds a one-shot request bound to the given connector.
	pub fn request<C: Connector>(&self, connector: C) -> Request<C> {
		Request::new(connector, self.options.clone())
	}
}

impl Default for Client {
	fn default() -> Self {
		Self::new()
	}
}

/// One request in the making: a connector, the client's base configuration, and the
/// per-request option entries accumulated by the verb methods.
#[derive(Debug)]
pub struct Request<C> {
	connector: C,
	base: ClientOptions,
	options: OptionSet,
}

impl<C: Connector> Request<C> {
	/// Creates a request bound to a connector, on top of the given base configuration.
	pub fn new(connector: C, base: ClientOptions) -> Self {
		Self {
			connector,
			base,
			options: OptionSet::new(),
		}
	}

	/// Sets a raw per-request transport option, overriding the base configuration.
	#[must_use]
	pub fn set(mut self, option: TransportOption, value: Value) -> Self {
		self.options.set(option, value);
		self
	}

	/// Makes a GET request, with the query pairs appended to the URL.
	///
	/// # Errors
	/// Fails with the engine error kinds described on [`execute`](crate::execute).
	pub async fn get(mut self, url: &str, query: Option<&UrlQuery>) -> Result<Response, Error> {
		self.set_url(url, query);
		self.options.set(TransportOption::HttpGet, Value::Bool(true));
		self.execute().await
	}

	/// Makes a POST request carrying the rendered payload as the body.
	///
	/// # Errors
	/// Fails with the engine error kinds described on [`execute`](crate::execute).
	pub async fn post(mut self, url: &str, body: &dyn Parameter) -> Result<Response, Error> {
		self.set_url(url, None);
		self.prepare_payload(body);
		self.execute().await
	}

	/// Makes a PUT request.
	///
	/// With `payload` set, the rendered parameters travel as the request body; otherwise
	/// they are appended to the URL as a query string.
	///
	/// # Errors
	/// Fails with the engine error kinds described on [`execute`](crate::execute).
	pub async fn put(
		self,
		url: &str,
		params: &dyn Parameter,
		payload: bool,
	) -> Result<Response, Error> {
		self.custom("PUT", url, params, payload).await
	}

	/// Makes a PATCH request; parameter placement follows [`put`](Self::put).
	///
	/// # Errors
	/// Fails with the engine error kinds described on [`execute`](crate::execute).
	pub async fn patch(
		self,
		url: &str,
		params: &dyn Parameter,
		payload: bool,
	) -> Result<Response, Error> {
		self.custom("PATCH", url, params, payload).await
	}

	/// Makes a DELETE request; parameter placement follows [`put`](Self::put).
	///
	/// # Errors
	/// Fails with the engine error kinds described on [`execute`](crate::execute).
	pub async fn delete(
		self,
		url: &str,
		params: &dyn Parameter,
		payload: bool,
	) -> Result<Response, Error> {
		self.custom("DELETE", url, params, payload).await
	}

	/// Makes a HEAD request, with the query pairs appended to the URL.
	///
	/// # Errors
	/// Fails with the engine error kinds described on [`execute`](crate::execute).
	pub async fn head(mut self, url: &str, query: Option<&UrlQuery>) -> Result<Response, Error> {
		self.set_url(url, query);
		self.options.set(TransportOption::HttpGet, Value::Bool(true));
		self.options.set(TransportOption::NoBody, Value::Bool(true));
		self.execute().await
	}

	async fn custom(
		mut self,
		verb: &str,
		url: &str,
		params: &dyn Parameter,
		payload: bool,
	) -> Result<Response, Error> {
		if payload {
			self.set_url(url, None);
			self.prepare_payload(params);
		} else {
			let rendered = params.render();
			let full = if rendered.is_empty() {
				url.to_owned()
			} else {
				format!("{url}?{rendered}")
			};
			self.options.set(TransportOption::Url, Value::Str(full));
		}
		self.options
			.set(TransportOption::CustomRequest, Value::Str(verb.to_owned()));
		self.execute().await
	}

	fn set_url(&mut self, url: &str, query: Option<&UrlQuery>) {
		let full = match query {
			Some(query) if !query.is_empty() => format!("{url}?{}", query.render()),
			_ => url.to_owned(),
		};
		self.options.set(TransportOption::Url, Value::Str(full));
	}

	fn prepare_payload(&mut self, body: &dyn Parameter) {
		self.options.set(TransportOption::Post, Value::Bool(true));
		self.options
			.set(TransportOption::PostFields, Value::Str(body.render()));
	}

	async fn execute(mut self) -> Result<Response, Error> {
		let mut merged = self.base.to_option_set();
		merged.merge(&self.options);
		merged.set_default(TransportOption::UserAgent, Value::Str(USER_AGENT.to_owned()));
		log::trace!("executing request with {} transport options", merged.len());
		engine::execute(&mut self.connector, merged).await
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::param::JsonBody;
	use crate::transport::fake::{FakeConnector, FakeHandle, Lifecycle};
	use futures_executor::block_on;
	use serde_json::json;
	use std::cell::RefCell;
	use std::rc::Rc;

	fn connector() -> (FakeConnector, Rc<RefCell<Option<OptionSet>>>) {
		let handle = FakeHandle::completed(
			200,
			"ok",
			&["HTTP/1.1 200 OK", ""],
			Lifecycle::default(),
		);
		let connector = FakeConnector::new(handle);
		let opened_with = Rc::clone(&connector.opened_with);
		(connector, opened_with)
	}

	fn opened(options: &Rc<RefCell<Option<OptionSet>>>) -> OptionSet {
		options.borrow().clone().expect("no handle was opened")
	}

	/// Tests GET wiring: query appended to the URL, GET selector set, default user agent
	/// injected.
	#[test]
	fn test_get() {
		let (connector, opened_with) = connector();
		let query = UrlQuery::new().pair("a", "1").pair("b", "2");
		let response = block_on(
			Client::new()
				.request(connector)
				.get("http://example.com/x", Some(&query)),
		)
		.unwrap();
		assert!(!response.error);
		let options = opened(&opened_with);
		assert_eq!(
			options.get(TransportOption::Url),
			Some(&Value::Str("http://example.com/x?a=1&b=2".to_owned()))
		);
		assert_eq!(options.get(TransportOption::HttpGet), Some(&Value::Bool(true)));
		assert_eq!(
			options.get(TransportOption::UserAgent),
			Some(&Value::Str(USER_AGENT.to_owned()))
		);
	}

	/// Tests that an empty query leaves the URL untouched.
	#[test]
	fn test_get_empty_query() {
		let (connector, opened_with) = connector();
		let _ = block_on(
			Client::new()
				.request(connector)
				.get("http://example.com/x", Some(&UrlQuery::new())),
		)
		.unwrap();
		assert_eq!(
			opened(&opened_with).get(TransportOption::Url),
			Some(&Value::Str("http://example.com/x".to_owned()))
		);
	}

	/// Tests that a configured user agent is not overridden by the default.
	#[test]
	fn test_explicit_user_agent_kept() {
		let (connector, opened_with) = connector();
		let client = Client::with_options(ClientOptions::new().user_agent("custom/9"));
		let _ = block_on(client.request(connector).get("http://example.com/", None)).unwrap();
		assert_eq!(
			opened(&opened_with).get(TransportOption::UserAgent),
			Some(&Value::Str("custom/9".to_owned()))
		);
	}

	/// Tests POST wiring: body rendered into the post fields.
	#[test]
	fn test_post() {
		let (connector, opened_with) = connector();
		let body = JsonBody(json!({"k": "v"}));
		let _ = block_on(
			Client::new()
				.request(connector)
				.post("http://example.com/x", &body),
		)
		.unwrap();
		let options = opened(&opened_with);
		assert_eq!(options.get(TransportOption::Post), Some(&Value::Bool(true)));
		assert_eq!(
			options.get(TransportOption::PostFields),
			Some(&Value::Str(r#"{"k":"v"}"#.to_owned()))
		);
	}

	/// Tests PUT with the parameters as the request body.
	#[test]
	fn test_put_payload() {
		let (connector, opened_with) = connector();
		let params = UrlQuery::new().pair("a", "1");
		let _ = block_on(
			Client::new()
				.request(connector)
				.put("http://example.com/x", &params, true),
		)
		.unwrap();
		let options = opened(&opened_with);
		assert_eq!(
			options.get(TransportOption::CustomRequest),
			Some(&Value::Str("PUT".to_owned()))
		);
		assert_eq!(
			options.get(TransportOption::PostFields),
			Some(&Value::Str("a=1".to_owned()))
		);
		assert_eq!(
			options.get(TransportOption::Url),
			Some(&Value::Str("http://example.com/x".to_owned()))
		);
	}

	/// Tests PUT with the parameters in the query string.
	#[test]
	fn test_put_query() {
		let (connector, opened_with) = connector();
		let params = UrlQuery::new().pair("a", "1");
		let _ = block_on(
			Client::new()
				.request(connector)
				.put("http://example.com/x", &params, false),
		)
		.unwrap();
		let options = opened(&opened_with);
		assert_eq!(
			options.get(TransportOption::Url),
			Some(&Value::Str("http://example.com/x?a=1".to_owned()))
		);
		assert!(!options.contains(TransportOption::PostFields));
	}

	/// Tests HEAD wiring: body suppressed.
	#[test]
	fn test_head() {
		let (connector, opened_with) = connector();
		let _ = block_on(
			Client::new()
				.request(connector)
				.head("http://example.com/x", None),
		)
		.unwrap();
		let options = opened(&opened_with);
		assert_eq!(options.get(TransportOption::NoBody), Some(&Value::Bool(true)));
		assert_eq!(options.get(TransportOption::HttpGet), Some(&Value::Bool(true)));
	}

	/// Tests that per-request options override the client's base configuration.
	#[test]
	fn test_request_overrides_base() {
		let (connector, opened_with) = connector();
		let client = Client::with_options(ClientOptions::new().timeout(5));
		let _ = block_on(
			client
				.request(connector)
				.set(TransportOption::Timeout, Value::Int(30))
				.get("http://example.com/", None),
		)
		.unwrap();
		assert_eq!(
			opened(&opened_with).get(TransportOption::Timeout),
			Some(&Value::Int(30))
		);
	}

	/// Tests that client cookies and headers reach the merged option set.
	#[test]
	fn test_base_headers_and_cookies_folded() {
		let (connector, opened_with) = connector();
		let client = Client::with_options(
			ClientOptions::new()
				.header("X-Requested-With", "XMLHttpRequest")
				.cookie("session", "abc"),
		);
		let _ = block_on(client.request(connector).get("http://example.com/", None)).unwrap();
		let options = opened(&opened_with);
		assert_eq!(
			options.get(TransportOption::HttpHeader),
			Some(&Value::List(vec![
				"X-Requested-With: XMLHttpRequest".to_owned()
			]))
		);
		assert_eq!(
			options.get(TransportOption::Cookie),
			Some(&Value::Str("session=abc".to_owned()))
		);
	}
}
