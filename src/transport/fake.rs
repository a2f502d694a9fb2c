//! Scripted in-memory transport for tests.

use super::{Connector, Drive, Handle, HeaderFn, Readiness, Scheduler};
use crate::error::Error;
use crate::options::OptionSet;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Shared instrumentation counters, cloneable into fakes and inspected by tests.
#[derive(Clone, Debug, Default)]
pub(crate) struct Lifecycle {
	pub closes: Rc<Cell<u32>>,
	pub registrations: Rc<Cell<u32>>,
	pub deregistrations: Rc<Cell<u32>>,
	pub scheduler_drops: Rc<Cell<u32>>,
	pub drive_calls: Rc<Cell<u32>>,
	pub sleeps: Rc<RefCell<Vec<Duration>>>,
}

fn bump(cell: &Rc<Cell<u32>>) {
	cell.set(cell.get() + 1);
}

/// A fake transport handle with canned terminal state.
pub(crate) struct FakeHandle {
	pub header_lines: Vec<String>,
	pub body: String,
	pub error_code: u32,
	pub error_message: String,
	pub http_status: u16,
	pub request_trace: Option<String>,
	pub effective_url: String,
	pub callback: Option<HeaderFn>,
	pub lifecycle: Lifecycle,
}

impl FakeHandle {
	/// A handle that completes successfully with the given status, body, and header lines.
	pub fn completed(
		status: u16,
		body: &str,
		header_lines: &[&str],
		lifecycle: Lifecycle,
	) -> Self {
		Self {
			header_lines: header_lines.iter().map(|line| (*line).to_owned()).collect(),
			body: body.to_owned(),
			error_code: 0,
			error_message: String::new(),
			http_status: status,
			request_trace: Some("GET /x HTTP/1.1\r\nHost: example.com\r\n\r\n".to_owned()),
			effective_url: "http://example.com/x".to_owned(),
			callback: None,
			lifecycle,
		}
	}

	/// Feeds the scripted header lines through the installed callback, once.
	fn deliver_headers(&mut self) {
		let lines = std::mem::take(&mut self.header_lines);
		if let Some(callback) = self.callback.as_mut() {
			for line in lines {
				let raw = format!("{line}\r\n");
				assert_eq!(callback(&raw), raw.len());
			}
		}
	}
}

impl Handle for FakeHandle {
	fn install_header_fn(&mut self, callback: HeaderFn) {
		self.callback = Some(callback);
	}

	fn effective_url(&self) -> String {
		self.effective_url.clone()
	}

	fn body(&self) -> String {
		self.body.clone()
	}

	fn error_code(&self) -> u32 {
		self.error_code
	}

	fn error_message(&self) -> String {
		self.error_message.clone()
	}

	fn http_status(&self) -> u16 {
		self.http_status
	}

	fn request_trace(&self) -> Option<String> {
		self.request_trace.clone()
	}

	fn close(&mut self) {
		bump(&self.lifecycle.closes);
	}
}

/// A fake multi-handle scheduler driven by scripts.
///
/// `drives` supplies the result of each drive step (defaulting to [`Drive::Ok`] once
/// exhausted); `waits` supplies readiness results, and the request is considered complete
/// (no active handles) once the wait script is exhausted. Sleeps are recorded, never slept.
pub(crate) struct FakeScheduler {
	pub drives: VecDeque<Drive>,
	pub waits: VecDeque<Readiness>,
	pub lifecycle: Lifecycle,
	registered: usize,
}

impl FakeScheduler {
	pub fn new(drives: Vec<Drive>, waits: Vec<Readiness>, lifecycle: Lifecycle) -> Self {
		Self {
			drives: drives.into(),
			waits: waits.into(),
			lifecycle,
			registered: 0,
		}
	}
}

impl Scheduler for FakeScheduler {
	type Handle = FakeHandle;

	fn register(&mut self, _handle: &mut FakeHandle) {
		self.registered += 1;
		bump(&self.lifecycle.registrations);
	}

	fn deregister(&mut self, _handle: &mut FakeHandle) {
		assert!(self.registered > 0, "deregister without register");
		self.registered -= 1;
		bump(&self.lifecycle.deregistrations);
	}

	fn drive(&mut self, handle: &mut FakeHandle) -> Drive {
		bump(&self.lifecycle.drive_calls);
		handle.deliver_headers();
		self.drives.pop_front().unwrap_or(Drive::Ok)
	}

	fn active(&self) -> usize {
		if self.waits.is_empty() {
			0
		} else {
			self.registered
		}
	}

	async fn await_readiness(&mut self, _timeout: Duration) -> Readiness {
		self.waits.pop_front().unwrap_or(Readiness::Ready)
	}

	async fn sleep(&mut self, interval: Duration) {
		self.lifecycle.sleeps.borrow_mut().push(interval);
	}
}

impl Drop for FakeScheduler {
	fn drop(&mut self) {
		bump(&self.lifecycle.scheduler_drops);
	}
}

/// A fake connector handing out one prepared handle and scripted schedulers.
pub(crate) struct FakeConnector {
	pub handle: Option<FakeHandle>,
	pub drives: Vec<Drive>,
	pub waits: Vec<Readiness>,
	pub lifecycle: Lifecycle,
	pub opened_with: Rc<RefCell<Option<OptionSet>>>,
	pub fail_open: bool,
}

impl FakeConnector {
	/// A connector that will produce the given handle and an immediately-completing
	/// scheduler.
	pub fn new(handle: FakeHandle) -> Self {
		let lifecycle = handle.lifecycle.clone();
		Self {
			handle: Some(handle),
			drives: Vec::new(),
			waits: Vec::new(),
			lifecycle,
			opened_with: Rc::default(),
			fail_open: false,
		}
	}
}

impl Connector for FakeConnector {
	type Handle = FakeHandle;
	type Scheduler = FakeScheduler;

	fn open(&mut self, options: &OptionSet) -> Result<FakeHandle, Error> {
		*self.opened_with.borrow_mut() = Some(options.clone());
		if self.fail_open {
			return Err(Error::Resource("no free transport handles".to_owned()));
		}
		Ok(self.handle.take().expect("handle already taken"))
	}

	fn scheduler(&mut self) -> FakeScheduler {
		FakeScheduler::new(
			std::mem::take(&mut self.drives),
			std::mem::take(&mut self.waits),
			self.lifecycle.clone(),
		)
	}
}
