//! The request execution engine.
//!
//! [`execute`] drives one transport handle to completion on behalf of a single cooperative
//! task. The loop never blocks the caller's scheduler: it drains immediately-available work,
//! then suspends until the transport reports readiness. When the readiness wait returns the
//! degraded "unknown" result, the engine suspends for an exponentially growing backoff
//! interval instead of spinning, and resets the interval as soon as a real readiness signal
//! resumes. This keeps a starved transport from monopolizing the scheduler while still
//! reacting quickly once signals return.
//!
//! Teardown is unconditional: whatever path ends the loop, the handle is deregistered, the
//! scheduler released, and the handle closed, in that order, exactly once. Classification of
//! the terminal state happens only after teardown, so even a classification failure cannot
//! leak a handle.

use crate::capture::HeaderCapture;
use crate::error::Error;
use crate::options::OptionSet;
use crate::response::{classify, Response};
use crate::transport::{Connector, Drive, Handle, Outcome, Readiness, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// The initial backoff interval after an unknown readiness result.
const BACKOFF_FLOOR: Duration = Duration::from_millis(10);

/// The backoff ceiling; consecutive unknown results never suspend longer than this.
const BACKOFF_CEILING: Duration = Duration::from_millis(1000);

/// How long one readiness wait may take before the loop re-drives the scheduler.
const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

/// Executes one request described by an assembled option set.
///
/// Opens a handle through the connector, installs the header capture callback, registers the
/// handle with a fresh multi-handle scheduler, and drives it to completion. On completion the
/// terminal transport state is classified into a [`Response`].
///
/// # Errors
/// Returns [`Error::Resource`] if the connector cannot allocate a handle,
/// [`Error::RequestTrace`] if the outgoing request-header trace could not be retrieved from
/// the completed handle, and [`Error::TimedOut`] if the transport gave up without observing
/// any response. All other outcomes, including transport-level errors and HTTP 4xx/5xx
/// failures, produce an `Ok` response with its `error` flag set.
pub async fn execute<C: Connector>(
	connector: &mut C,
	options: OptionSet,
) -> Result<Response, Error> {
	let mut handle = connector.open(&options)?;

	// The capture is shared between this task and the callback held by the handle; the
	// request is a single cooperative task, so a plain Rc<RefCell> suffices.
	let capture = Rc::new(RefCell::new(HeaderCapture::new()));
	{
		let sink = Rc::clone(&capture);
		handle.install_header_fn(Box::new(move |line| sink.borrow_mut().feed(line)));
	}

	let mut scheduler = connector.scheduler();
	scheduler.register(&mut handle);
	log::debug!("transport handle registered; driving to completion");

	let mut backoff = BACKOFF_FLOOR;
	loop {
		// Drain work the driver reports as immediately available without yielding.
		let status = loop {
			match scheduler.drive(&mut handle) {
				Drive::Again => (),
				other => break other,
			}
		};
		if status != Drive::Ok {
			log::debug!("scheduler left the ok state: {status:?}");
			break;
		}
		if scheduler.active() == 0 {
			break;
		}
		match scheduler.await_readiness(READINESS_TIMEOUT).await {
			Readiness::Ready => backoff = BACKOFF_FLOOR,
			Readiness::Unknown => {
				log::trace!("no readiness observed; backing off for {backoff:?}");
				scheduler.sleep(backoff).await;
				backoff = std::cmp::min(backoff * 2, BACKOFF_CEILING);
			}
			Readiness::Failed => {
				log::debug!("readiness wait failed terminally");
				break;
			}
		}
	}

	// Snapshot before any teardown; introspection needs a live handle.
	let outcome = Outcome::snapshot(&handle);
	log::debug!(
		"transfer finished: status={}, errno={}, [url] {}",
		outcome.http_status,
		outcome.error_code,
		outcome.effective_url
	);

	// Teardown order is fixed: deregister, release the scheduler, close the handle. Each
	// happens exactly once on every path, including when classification fails below.
	scheduler.deregister(&mut handle);
	drop(scheduler);
	handle.close();
	drop(handle);

	let capture = Rc::try_unwrap(capture)
		.map(RefCell::into_inner)
		.unwrap_or_else(|shared| shared.borrow().clone());
	classify(outcome, capture, options.timeout())
}
