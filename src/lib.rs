#![forbid(unsafe_code)]
#![warn(future_incompatible, nonstandard_style, rust_2018_idioms, unused)]
#![warn(
	missing_debug_implementations,
	missing_docs,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_import_braces,
	unused_qualifications,
	unused_results
)]
#![warn(clippy::pedantic, clippy::cargo)]
// The whole crate is single-threaded cooperative: one task per in-flight request, no handle
// shared across tasks. Futures therefore do not need to be Send, and plain async trait
// methods are the right shape for the injected collaborators.
#![allow(async_fn_in_trait)]

//! Agnostic Multi-Handle Client
//!
//! This crate is the execution engine of a cooperative-wait HTTP client: callers assemble a
//! request from fluent configuration, submit it, and await a structured [`Response`] that
//! distinguishes transport failure from HTTP-level failure. The engine drives a curl-style
//! transport handle to completion through a non-blocking multi-handle scheduler, backing off
//! exponentially when readiness reporting degrades, capturing response headers line by line
//! (with correct handling of interim `100 Continue` preambles), and classifying the terminal
//! transport state into a single outcome.
//!
//! The crate is not tied to any specific asynchronous executor, nor to any concrete
//! transport library: the transport is injected through the [`Connector`], [`Handle`], and
//! [`Scheduler`] traits, and both of the engine's suspension points live on the scheduler. A
//! production connector would wrap a real curl-like transport; tests substitute scripted
//! fakes.
//!
//! # Example
//! ```no_run
//! use amhc::{
//!		Client, Connector, Drive, Error, Handle, HeaderFn, OptionSet, Readiness, Scheduler,
//!		TransportOption, Value,
//! };
//! use std::time::Duration;
//!
//! // A canned transport that completes immediately with a fixed response.
//! struct CannedHandle {
//!		callback: Option<HeaderFn>,
//!		url: String,
//! }
//!
//! impl Handle for CannedHandle {
//!		fn install_header_fn(&mut self, callback: HeaderFn) {
//!			self.callback = Some(callback);
//!		}
//!		fn effective_url(&self) -> String {
//!			self.url.clone()
//!		}
//!		fn body(&self) -> String {
//!			"hello".to_owned()
//!		}
//!		fn error_code(&self) -> u32 {
//!			0
//!		}
//!		fn error_message(&self) -> String {
//!			String::new()
//!		}
//!		fn http_status(&self) -> u16 {
//!			200
//!		}
//!		fn request_trace(&self) -> Option<String> {
//!			Some("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n".to_owned())
//!		}
//!		fn close(&mut self) {}
//! }
//!
//! struct CannedScheduler {
//!		done: bool,
//! }
//!
//! impl Scheduler for CannedScheduler {
//!		type Handle = CannedHandle;
//!		fn register(&mut self, _handle: &mut CannedHandle) {}
//!		fn deregister(&mut self, _handle: &mut CannedHandle) {}
//!		fn drive(&mut self, handle: &mut CannedHandle) -> Drive {
//!			if let Some(callback) = handle.callback.as_mut() {
//!				let _ = callback("HTTP/1.1 200 OK\r\n");
//!				let _ = callback("content-type: text/plain\r\n");
//!				let _ = callback("\r\n");
//!			}
//!			self.done = true;
//!			Drive::Ok
//!		}
//!		fn active(&self) -> usize {
//!			usize::from(!self.done)
//!		}
//!		async fn await_readiness(&mut self, _timeout: Duration) -> Readiness {
//!			Readiness::Ready
//!		}
//!		async fn sleep(&mut self, _interval: Duration) {}
//! }
//!
//! struct CannedConnector;
//!
//! impl Connector for CannedConnector {
//!		type Handle = CannedHandle;
//!		type Scheduler = CannedScheduler;
//!		fn open(&mut self, options: &OptionSet) -> Result<CannedHandle, Error> {
//!			let url = match options.get(TransportOption::Url) {
//!				Some(Value::Str(url)) => url.clone(),
//!				_ => String::new(),
//!			};
//!			Ok(CannedHandle { callback: None, url })
//!		}
//!		fn scheduler(&mut self) -> CannedScheduler {
//!			CannedScheduler { done: false }
//!		}
//! }
//!
//! let response = futures_executor::block_on(
//!		Client::new()
//!			.request(CannedConnector)
//!			.get("http://example.com/", None),
//! )
//! .unwrap();
//! assert!(!response.error);
//! assert_eq!(response.http_status, 200);
//! assert_eq!(response.headers.first("content-type"), Some("text/plain"));
//! ```

mod capture;
mod engine;
mod error;
mod options;
mod param;
mod request;
mod response;
mod transport;

pub use capture::{HeaderCapture, Headers};
pub use engine::execute;
pub use error::Error;
pub use options::{Auth, ClientOptions, OptionSet, TransportOption, Value, USER_AGENT};
pub use param::{JsonBody, Parameter, UrlQuery};
pub use request::{Client, Request};
pub use response::Response;
pub use transport::{Connector, Drive, Handle, HeaderFn, Outcome, Readiness, Scheduler};
