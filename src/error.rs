//! Errors that abort a request attempt.
//!
//! Only two situations abort a request without producing a [`Response`](crate::Response):
//! engine-level resource failures (the transport could not allocate a handle, or retrieving
//! the outgoing request-header trace failed after completion) and the timeout case (the
//! transport gave up without ever observing a response). Everything else, including
//! transport-level errors such as failed connections and full HTTP failures such as a 500,
//! produces a complete `Response` with its `error` flag set, so the caller can still inspect
//! status, body, and headers.

use std::fmt::{Display, Formatter};

/// An engine-level failure that aborted the request attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
	/// The transport could not allocate a handle for the request.
	///
	/// The contained string is the transport's own description of the allocation failure.
	Resource(String),

	/// Retrieving the raw outgoing request-header trace from a completed handle failed.
	///
	/// This is distinct from the request itself failing; the transport was asked to record
	/// the outgoing headers and could not produce them.
	RequestTrace {
		/// The effective URL of the request whose trace could not be retrieved.
		url: String,
	},

	/// The transport never received any part of a response before giving up.
	///
	/// This is raised when the request completed with an empty body, no transport-level
	/// error, and no HTTP status observed at all. It is kept distinct from a generic
	/// transport error so that callers can apply timeout-specific retry policy.
	TimedOut {
		/// The effective URL of the request that timed out.
		url: String,

		/// The configured transport timeout in seconds, if one was set.
		timeout: Option<i64>,
	},
}

impl Error {
	/// Returns whether this error is the timeout case.
	#[must_use]
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::TimedOut { .. })
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		match self {
			Self::Resource(message) => {
				write!(f, "transport handle allocation failed: {message}")
			}
			Self::RequestTrace { url } => {
				write!(f, "failed to retrieve outgoing request headers, [url] {url}")
			}
			Self::TimedOut {
				url,
				timeout: Some(seconds),
			} => {
				write!(f, "request timed out after {seconds} sec, [url] {url}")
			}
			Self::TimedOut { url, timeout: None } => {
				write!(f, "request timed out, [url] {url}")
			}
		}
	}
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
	use super::*;

	/// Tests that only the timeout variant reports itself as a timeout.
	#[test]
	fn test_is_timeout() {
		assert!(Error::TimedOut {
			url: "http://example.com/".to_owned(),
			timeout: None,
		}
		.is_timeout());
		assert!(!Error::Resource("out of handles".to_owned()).is_timeout());
		assert!(!Error::RequestTrace {
			url: "http://example.com/".to_owned(),
		}
		.is_timeout());
	}

	/// Tests the display forms.
	#[test]
	fn test_display() {
		assert_eq!(
			Error::TimedOut {
				url: "http://example.com/".to_owned(),
				timeout: Some(5),
			}
			.to_string(),
			"request timed out after 5 sec, [url] http://example.com/"
		);
		assert_eq!(
			Error::RequestTrace {
				url: "http://example.com/".to_owned(),
			}
			.to_string(),
			"failed to retrieve outgoing request headers, [url] http://example.com/"
		);
	}
}
