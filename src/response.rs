//! The response record and the terminal-state classifier.
//!
//! [`classify`] inspects the one-shot snapshot of a completed transport handle and produces
//! a [`Response`], separating the two failure categories a completed transfer can carry: a
//! transport-level error (non-zero low-level error code: DNS, connect, TLS failures) and an
//! HTTP-level error (a 4xx or 5xx status from the peer). Transport errors take precedence in
//! the unified code and message. Two terminal states are not representable as a response and
//! abort the call instead: a failed request-header trace retrieval, and the timeout case in
//! which the transport never observed any response at all.

use crate::capture::{HeaderCapture, Headers};
use crate::error::Error;
use crate::transport::Outcome;

/// An immutable snapshot of one completed request, returned to the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
	/// The effective URL, after any redirects the transport followed.
	pub effective_url: String,

	/// The unified error code: the transport error code if one exists, else the HTTP status
	/// code if it is an error, else zero.
	pub error_code: u32,

	/// The raw response body, possibly empty.
	pub body: String,

	/// Whether any error occurred, transport-level or HTTP-level.
	pub error: bool,

	/// The unified error message: the transport's message for transport errors, else the
	/// response status line for HTTP errors, else empty.
	pub error_message: String,

	/// Whether a transport-level error occurred.
	pub transport_error: bool,

	/// The transport's low-level error code; zero when no transport error occurred.
	pub transport_error_code: u32,

	/// The transport's own error message; empty when no transport error occurred.
	pub transport_error_message: String,

	/// Whether the final HTTP status is a 4xx or 5xx.
	pub http_error: bool,

	/// The final HTTP status code, or zero if none was observed.
	pub http_status: u16,

	/// The response status line when any error occurred, else empty.
	pub http_error_message: String,

	/// The raw outgoing request header lines, as recorded by the transport.
	pub request_headers: Vec<String>,

	/// The captured response headers.
	pub headers: Headers,
}

impl Response {
	/// Returns whether the status is informational (1xx).
	#[must_use]
	pub fn is_info(&self) -> bool {
		(100..200).contains(&self.http_status)
	}

	/// Returns whether the status indicates success (2xx).
	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.http_status)
	}

	/// Returns whether the status is a redirect (3xx).
	#[must_use]
	pub fn is_redirect(&self) -> bool {
		(300..400).contains(&self.http_status)
	}

	/// Returns whether the status is a client error (4xx).
	#[must_use]
	pub fn is_client_error(&self) -> bool {
		(400..500).contains(&self.http_status)
	}

	/// Returns whether the status is a server error (5xx).
	#[must_use]
	pub fn is_server_error(&self) -> bool {
		(500..600).contains(&self.http_status)
	}
}

/// Classifies the terminal state of a completed transfer into a response record.
///
/// `timeout` is the configured transport timeout in seconds, used only to enrich the
/// timeout error's message.
///
/// # Errors
/// Returns [`Error::RequestTrace`] if the snapshot carries no outgoing-header trace, and
/// [`Error::TimedOut`] if the body is empty, no transport error occurred, and no HTTP status
/// was observed at all. Both checks are deliberate conjunctions: a non-empty body with
/// status zero is unusual but is not a timeout.
pub(crate) fn classify(
	outcome: Outcome,
	capture: HeaderCapture,
	timeout: Option<i64>,
) -> Result<Response, Error> {
	let transport_error = outcome.error_code != 0;
	let http_error = matches!(outcome.http_status / 100, 4 | 5);
	let error = transport_error || http_error;
	let error_code = if transport_error {
		outcome.error_code
	} else if http_error {
		u32::from(outcome.http_status)
	} else {
		0
	};

	let trace = outcome.request_trace.ok_or_else(|| Error::RequestTrace {
		url: outcome.effective_url.clone(),
	})?;
	let request_headers = trace
		.split("\r\n")
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect();

	let http_error_message = if error {
		capture.status_line().unwrap_or_default().to_owned()
	} else {
		String::new()
	};
	let error_message = if transport_error {
		outcome.error_message.clone()
	} else {
		http_error_message.clone()
	};

	if outcome.body.is_empty() && !transport_error && outcome.http_status == 0 {
		return Err(Error::TimedOut {
			url: outcome.effective_url,
			timeout,
		});
	}

	Ok(Response {
		effective_url: outcome.effective_url,
		error_code,
		body: outcome.body,
		error,
		error_message,
		transport_error,
		transport_error_code: outcome.error_code,
		transport_error_message: outcome.error_message,
		http_error,
		http_status: outcome.http_status,
		http_error_message,
		request_headers,
		headers: capture.into_headers(),
	})
}
