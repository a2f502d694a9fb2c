//! Transport option sets and client-level configuration.
//!
//! An [`OptionSet`] is the ordered, unique-key mapping from transport option identifiers to
//! values that the execution engine consumes read-only. It is assembled in two layers:
//! [`ClientOptions`] holds the base configuration shared by every request built from one
//! [`Client`](crate::Client), and the request surface adds per-request entries (URL, method
//! selector, body bytes) on top. The two layers are merged at execution time, per-request
//! keys overriding base keys with the same identifier.

/// The default user agent, injected at execution time when no other was configured.
pub const USER_AGENT: &str = concat!("amhc/", env!("CARGO_PKG_VERSION"));

/// Identifiers for the transport options a request can carry.
///
/// These are symbolic stand-ins for the option codes of whatever transport the injected
/// [`Connector`](crate::Connector) wraps; a curl-backed connector would translate each
/// variant to the corresponding `CURLOPT_`/`CURLINFO_` code when opening the handle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransportOption {
	/// The target URL, including any query string.
	Url,
	/// Force a plain GET request.
	HttpGet,
	/// Send the request as a POST.
	Post,
	/// The raw, already-serialized request body.
	PostFields,
	/// Override the request method with a custom verb (`PUT`, `PATCH`, `DELETE`).
	CustomRequest,
	/// Suppress transfer of the response body (HEAD requests).
	NoBody,
	/// Additional outgoing header lines, each of the form `Name: value`.
	HttpHeader,
	/// The outgoing `User-Agent` header value.
	UserAgent,
	/// The outgoing `Referer` header value.
	Referer,
	/// The transport-level timeout in seconds.
	Timeout,
	/// The HTTP authentication method mask; see [`Auth`].
	HttpAuth,
	/// The `username:password` credential pair for HTTP authentication.
	Credentials,
	/// The rendered `Cookie` header contents.
	Cookie,
	/// Ask the transport to emit verbose diagnostics.
	Verbose,
	/// Ask the transport to record the raw outgoing header trace for later retrieval.
	CaptureRequestTrace,
	/// Deliver response headers inline with the body instead of through the header callback.
	HeadersInBody,
	/// Hand the response body back to the caller instead of writing it to an output stream.
	ReturnBody,
}

/// The value assigned to a transport option.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
	/// A boolean flag.
	Bool(bool),
	/// An integer, used for timeouts and auth masks.
	Int(i64),
	/// A string, used for URLs, bodies, and credential pairs.
	Str(String),
	/// A list of strings, used for outgoing header lines.
	List(Vec<String>),
}

/// An ordered mapping from transport option identifiers to values.
///
/// Keys are unique and iteration follows insertion order. Writing a key that is already
/// present replaces its value in place, so the last write wins without disturbing the
/// original position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OptionSet {
	entries: Vec<(TransportOption, Value)>,
}

impl OptionSet {
	/// Creates an empty option set.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an option, replacing any existing value under the same identifier.
	pub fn set(&mut self, option: TransportOption, value: Value) {
		match self.entries.iter_mut().find(|(key, _)| *key == option) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((option, value)),
		}
	}

	/// Sets an option only if it is not already present.
	pub fn set_default(&mut self, option: TransportOption, value: Value) {
		if !self.contains(option) {
			self.entries.push((option, value));
		}
	}

	/// Returns the value of an option, if set.
	#[must_use]
	pub fn get(&self, option: TransportOption) -> Option<&Value> {
		self.entries
			.iter()
			.find(|(key, _)| *key == option)
			.map(|(_, value)| value)
	}

	/// Returns whether an option is present.
	#[must_use]
	pub fn contains(&self, option: TransportOption) -> bool {
		self.entries.iter().any(|(key, _)| *key == option)
	}

	/// Applies every entry of `overrides` on top of this set.
	///
	/// Keys present in both sets take the value from `overrides`; keys only in `overrides`
	/// are appended in their own insertion order.
	pub fn merge(&mut self, overrides: &Self) {
		for (option, value) in overrides.iter() {
			self.set(*option, value.clone());
		}
	}

	/// Iterates over the entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &(TransportOption, Value)> {
		self.entries.iter()
	}

	/// Returns the number of options set.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the set is empty.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the configured transport timeout in seconds, if any.
	#[must_use]
	pub fn timeout(&self) -> Option<i64> {
		match self.get(TransportOption::Timeout) {
			Some(Value::Int(seconds)) => Some(*seconds),
			_ => None,
		}
	}
}

/// The HTTP authentication methods a request can offer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Auth {
	/// HTTP Basic authentication.
	Basic,
	/// HTTP Digest authentication.
	Digest,
	/// Negotiate (SPNEGO) authentication.
	Negotiate,
	/// NTLM authentication.
	Ntlm,
	/// Any method the server offers.
	Any,
	/// Any method the server offers except ones that transmit the password in the clear.
	AnySafe,
}

impl Auth {
	/// Returns the bitmask stored under [`TransportOption::HttpAuth`].
	#[must_use]
	pub fn mask(self) -> i64 {
		const BASIC: i64 = 1;
		const DIGEST: i64 = 1 << 1;
		const NEGOTIATE: i64 = 1 << 2;
		const NTLM: i64 = 1 << 3;
		match self {
			Self::Basic => BASIC,
			Self::Digest => DIGEST,
			Self::Negotiate => NEGOTIATE,
			Self::Ntlm => NTLM,
			Self::Any => BASIC | DIGEST | NEGOTIATE | NTLM,
			Self::AnySafe => DIGEST | NEGOTIATE | NTLM,
		}
	}
}

/// Base configuration shared by every request built from one client.
///
/// This is a consuming builder. Headers and cookies are kept as ordered name/value lists and
/// folded into the option set when the request executes: headers become the
/// [`HttpHeader`](TransportOption::HttpHeader) line list, cookies render URL-encoded and
/// joined by `"; "` under [`Cookie`](TransportOption::Cookie).
#[derive(Clone, Debug)]
pub struct ClientOptions {
	options: OptionSet,
	headers: Vec<(String, String)>,
	cookies: Vec<(String, String)>,
}

impl Default for ClientOptions {
	fn default() -> Self {
		let mut options = OptionSet::new();
		options.set(TransportOption::CaptureRequestTrace, Value::Bool(true));
		options.set(TransportOption::HeadersInBody, Value::Bool(false));
		options.set(TransportOption::ReturnBody, Value::Bool(true));
		Self {
			options,
			headers: Vec::new(),
			cookies: Vec::new(),
		}
	}
}

impl ClientOptions {
	/// Creates the default configuration.
	///
	/// The defaults ask the transport to record the outgoing header trace, to deliver
	/// response headers through the header callback rather than inline with the body, and to
	/// hand the body back to the caller.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Enables or disables verbose transport diagnostics.
	#[must_use]
	pub fn verbose(mut self, enable: bool) -> Self {
		self.options.set(TransportOption::Verbose, Value::Bool(enable));
		self
	}

	/// Selects the HTTP authentication methods to offer.
	#[must_use]
	pub fn http_auth(mut self, auth: Auth) -> Self {
		self.options
			.set(TransportOption::HttpAuth, Value::Int(auth.mask()));
		self
	}

	/// Sets the transport-level timeout in seconds.
	#[must_use]
	pub fn timeout(mut self, seconds: i64) -> Self {
		self.options
			.set(TransportOption::Timeout, Value::Int(seconds));
		self
	}

	/// Offers HTTP Basic authentication with the given credentials.
	#[must_use]
	pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
		self.options
			.set(TransportOption::HttpAuth, Value::Int(Auth::Basic.mask()));
		self.options.set(
			TransportOption::Credentials,
			Value::Str(format!("{username}:{password}")),
		);
		self
	}

	/// Adds an outgoing header, replacing any earlier header with the same name.
	#[must_use]
	pub fn header(mut self, name: &str, value: &str) -> Self {
		match self.headers.iter_mut().find(|(key, _)| key == name) {
			Some(entry) => entry.1 = value.to_owned(),
			None => self.headers.push((name.to_owned(), value.to_owned())),
		}
		self
	}

	/// Adds several outgoing headers.
	#[must_use]
	pub fn headers<'a>(mut self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		for (name, value) in headers {
			self = self.header(name, value);
		}
		self
	}

	/// Sets the outgoing `User-Agent` header.
	#[must_use]
	pub fn user_agent(mut self, user_agent: &str) -> Self {
		self.options
			.set(TransportOption::UserAgent, Value::Str(user_agent.to_owned()));
		self
	}

	/// Sets the outgoing `Referer` header.
	#[must_use]
	pub fn referer(mut self, referer: &str) -> Self {
		self.options
			.set(TransportOption::Referer, Value::Str(referer.to_owned()));
		self
	}

	/// Adds a cookie to send with every request.
	#[must_use]
	pub fn cookie(mut self, name: &str, value: &str) -> Self {
		match self.cookies.iter_mut().find(|(key, _)| key == name) {
			Some(entry) => entry.1 = value.to_owned(),
			None => self.cookies.push((name.to_owned(), value.to_owned())),
		}
		self
	}

	/// Sets a raw transport option directly.
	#[must_use]
	pub fn set(mut self, option: TransportOption, value: Value) -> Self {
		self.options.set(option, value);
		self
	}

	/// Folds the configuration into a single option set.
	#[must_use]
	pub fn to_option_set(&self) -> OptionSet {
		let mut options = self.options.clone();
		if !self.headers.is_empty() {
			let lines = self
				.headers
				.iter()
				.map(|(name, value)| format!("{name}: {value}"))
				.collect();
			options.set(TransportOption::HttpHeader, Value::List(lines));
		}
		if !self.cookies.is_empty() {
			let rendered = self
				.cookies
				.iter()
				.map(|(name, value)| {
					form_urlencoded::Serializer::new(String::new())
						.append_pair(name, value)
						.finish()
				})
				.collect::<Vec<_>>()
				.join("; ");
			options.set(TransportOption::Cookie, Value::Str(rendered));
		}
		options
	}
}
