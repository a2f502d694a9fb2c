//! Transport collaborator interfaces.
//!
//! The execution engine does not talk to a concrete transport library. It drives three
//! injected collaborators: a [`Connector`] that allocates transport handles from an assembled
//! option set, the [`Handle`]s themselves, and a multi-handle [`Scheduler`] that advances
//! registered handles without blocking. A curl-backed connector would wrap `curl_easy_init`,
//! the easy handle, and the multi interface respectively; tests substitute scripted fakes.
//!
//! Both of the engine's suspension points, the readiness wait and the backoff sleep, live on
//! the scheduler, so the crate itself never names an executor or a timer.

use crate::error::Error;
use crate::options::OptionSet;
use std::time::Duration;

/// A per-line response header callback installed on a transport handle.
///
/// The transport invokes the callback once per raw header line as data arrives, and treats
/// the returned value as the number of bytes consumed.
pub type HeaderFn = Box<dyn FnMut(&str) -> usize>;

/// The result of one non-blocking drive step on a [`Scheduler`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Drive {
	/// More work is available immediately; the engine repeats the drive step without
	/// yielding. This is an internal retry signal, distinct from I/O readiness.
	Again,

	/// The drive step completed and the scheduler remains healthy.
	Ok,

	/// The scheduler is in a terminal error state and no further progress is possible.
	Failed,
}

/// The result of waiting for transport readiness.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Readiness {
	/// At least one registered handle has pending I/O.
	Ready,

	/// No readiness was observed: either the wait timed out or the transport could not
	/// watch the handle set at all (a degraded state some transports report under resource
	/// pressure). The engine backs off instead of spinning.
	Unknown,

	/// The wait failed terminally.
	Failed,
}

/// A snapshot of the terminal state of one driven transport handle.
///
/// Taken exactly once, after the drive loop ends and before the handle is closed. This is
/// the read-only input to the response classifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Outcome {
	/// The effective URL, after any redirects the transport followed.
	pub effective_url: String,

	/// The raw response body, possibly empty.
	pub body: String,

	/// The transport's low-level error code; zero means no transport error.
	pub error_code: u32,

	/// The transport's own error message, empty when there was no error.
	pub error_message: String,

	/// The final HTTP status code, or zero if no response was ever observed.
	pub http_status: u16,

	/// The raw outgoing request-header trace, or `None` if retrieving it failed.
	pub request_trace: Option<String>,
}

impl Outcome {
	/// Takes the terminal snapshot of a completed handle.
	pub fn snapshot<H: Handle>(handle: &H) -> Self {
		Self {
			effective_url: handle.effective_url(),
			body: handle.body(),
			error_code: handle.error_code(),
			error_message: handle.error_message(),
			http_status: handle.http_status(),
			request_trace: handle.request_trace(),
		}
	}
}

/// One underlying connection/request object driven by the engine.
///
/// A handle is owned by exactly one request task; handles are never shared. The
/// introspection methods are only meaningful once the drive loop has ended.
pub trait Handle {
	/// Installs the per-line response header callback.
	fn install_header_fn(&mut self, callback: HeaderFn);

	/// Returns the effective URL of the transfer.
	fn effective_url(&self) -> String;

	/// Returns the response body received so far.
	fn body(&self) -> String;

	/// Returns the low-level transport error code; zero means no error.
	fn error_code(&self) -> u32;

	/// Returns the transport's error message for the current error code.
	fn error_message(&self) -> String;

	/// Returns the final HTTP status code, or zero if none was observed.
	fn http_status(&self) -> u16;

	/// Returns the raw outgoing request-header trace, or `None` if retrieval failed.
	fn request_trace(&self) -> Option<String>;

	/// Closes the handle, releasing its transport resources.
	///
	/// The engine calls this exactly once, after deregistration.
	fn close(&mut self);
}

/// A non-blocking driver capable of advancing registered transport handles.
///
/// One scheduler instance is created per request and released when the request completes;
/// registered handles are driven by repeated [`drive`](Self::drive) calls interleaved with
/// readiness waits.
pub trait Scheduler {
	/// The handle type this scheduler drives.
	type Handle: Handle;

	/// Registers a handle with the scheduler.
	fn register(&mut self, handle: &mut Self::Handle);

	/// Deregisters a handle from the scheduler.
	fn deregister(&mut self, handle: &mut Self::Handle);

	/// Performs one non-blocking drive step.
	fn drive(&mut self, handle: &mut Self::Handle) -> Drive;

	/// Returns the number of handles that still have work outstanding.
	fn active(&self) -> usize;

	/// Suspends the calling task until a registered handle has pending I/O, the wait times
	/// out, or the wait fails.
	async fn await_readiness(&mut self, timeout: Duration) -> Readiness;

	/// Suspends the calling task for the given interval.
	///
	/// Used by the engine's backoff when readiness is unknown; kept on the scheduler so the
	/// engine does not depend on any particular timer implementation.
	async fn sleep(&mut self, interval: Duration);
}

/// Opens transport handles from assembled option sets.
pub trait Connector {
	/// The handle type this connector produces.
	type Handle: Handle;

	/// The scheduler type that drives this connector's handles.
	type Scheduler: Scheduler<Handle = Self::Handle>;

	/// Opens a new transport handle configured with the given options.
	///
	/// # Errors
	/// Returns [`Error::Resource`] if the transport cannot allocate a handle.
	fn open(&mut self, options: &OptionSet) -> Result<Self::Handle, Error>;

	/// Creates a fresh multi-handle scheduler for one request.
	fn scheduler(&mut self) -> Self::Scheduler;
}

#[cfg(test)]
pub(crate) mod fake;
