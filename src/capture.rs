//! Response header capture.
//!
//! The transport delivers response headers one raw line at a time, in order, as data arrives.
//! [`HeaderCapture`] consumes those lines and produces the final ordered multi-value header
//! map, discarding anything that belongs to an interim `100 Continue` preamble: a server that
//! asks the client to proceed sends a full interim status line and header block whose
//! contents are not part of the final response. Authentication handshakes can produce more
//! than one such preamble on a single exchange, so the machine tolerates repeated cycles.
//!
//! Alongside the header map, the machine records the most recent non-interim status line it
//! sees. The status line is not a header and never enters the map; it is kept separately so
//! the response classifier can use it as the error message for pure HTTP failures.

/// States of the header capture machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
	/// Initial state, and the state after a continue preamble ends: the next line may be a
	/// status line, a continue line, or the first header of the real response.
	AwaitingContinueOrHeader,

	/// Inside a `100 Continue` preamble; every line until the terminating blank is discarded.
	InContinuePreamble,

	/// Header lines of the real response are being recorded.
	Capturing,

	/// A blank line ended the headers. The map stays closed for writes unless another
	/// continue cycle begins.
	Closed,
}

/// The final ordered multi-value header map.
///
/// Names are lower-cased; repeated names accumulate their values in arrival order, and the
/// names themselves keep first-insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Headers {
	entries: Vec<(String, Vec<String>)>,
}

impl Headers {
	/// Returns every value recorded under a name.
	///
	/// Lookup is case-insensitive; stored names are already lower-cased.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&[String]> {
		self.entries
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, values)| values.as_slice())
	}

	/// Returns the first value recorded under a name.
	#[must_use]
	pub fn first(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(|values| values.first()).map(String::as_str)
	}

	/// Iterates over names and their value lists in first-insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries
			.iter()
			.map(|(name, values)| (name.as_str(), values.as_slice()))
	}

	/// Returns the number of distinct header names.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether no headers were captured.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn append(&mut self, name: String, value: String) {
		match self.entries.iter_mut().find(|(key, _)| *key == name) {
			Some(entry) => entry.1.push(value),
			None => self.entries.push((name, vec![value])),
		}
	}
}

/// Consumes raw response header lines and builds the final header map.
///
/// One instance is owned by each in-flight request; the engine installs [`feed`](Self::feed)
/// as the transport's per-line header callback.
#[derive(Clone, Debug)]
pub struct HeaderCapture {
	state: State,
	headers: Headers,
	status_line: Option<String>,
}

impl HeaderCapture {
	/// Creates a capture machine in its initial state.
	#[must_use]
	pub fn new() -> Self {
		Self {
			state: State::AwaitingContinueOrHeader,
			headers: Headers::default(),
			status_line: None,
		}
	}

	/// Processes one raw header line and returns the number of bytes consumed.
	///
	/// The returned count is always the full length of `raw`, regardless of how the line was
	/// classified; the transport treats it as an acknowledgement of consumption. The line is
	/// trimmed of trailing CR/LF before classification.
	pub fn feed(&mut self, raw: &str) -> usize {
		let line = raw.trim_end_matches(['\r', '\n']);
		if line.is_empty() {
			// A blank inside the preamble ends the interim response; headers for the real
			// response may still follow. A blank anywhere else ends the headers.
			self.state = match self.state {
				State::InContinuePreamble => State::AwaitingContinueOrHeader,
				_ => State::Closed,
			};
		} else if line.eq_ignore_ascii_case("HTTP/1.1 100 Continue") {
			self.state = State::InContinuePreamble;
		} else if self.state != State::InContinuePreamble {
			match line.split_once(':') {
				Some((name, value)) => {
					if self.state != State::Closed {
						self.headers
							.append(name.trim().to_ascii_lowercase(), value.trim().to_owned());
						self.state = State::Capturing;
					}
				}
				None => {
					// No colon: a status line or a malformed line. Either way it is not a
					// header; status lines of non-interim responses are recorded separately.
					if let Some(code) = parse_status_code(line) {
						if !(100..=199).contains(&code) {
							self.status_line = Some(line.to_owned());
						}
					}
				}
			}
		}
		raw.len()
	}

	/// Returns the most recent non-interim status line, if one was seen.
	#[must_use]
	pub fn status_line(&self) -> Option<&str> {
		self.status_line.as_deref()
	}

	/// Returns the headers captured so far.
	#[must_use]
	pub fn headers(&self) -> &Headers {
		&self.headers
	}

	/// Finalizes the capture, yielding the header map.
	#[must_use]
	pub fn into_headers(self) -> Headers {
		self.headers
	}
}

impl Default for HeaderCapture {
	fn default() -> Self {
		Self::new()
	}
}

/// Extracts the HTTP status code from a lone status line, if it is one.
///
/// Uses a zero-length headers array: httparse populates the code before noticing there is no
/// room for headers, so `TooManyHeaders` is as acceptable as completion, and nothing ties up
/// the lifetime of a real headers array.
fn parse_status_code(line: &str) -> Option<u16> {
	let mut buf = Vec::with_capacity(line.len() + 4);
	buf.extend_from_slice(line.as_bytes());
	buf.extend_from_slice(b"\r\n\r\n");
	let mut headers = [];
	let mut resp = httparse::Response::new(&mut headers);
	match resp.parse(&buf) {
		Ok(_) | Err(httparse::Error::TooManyHeaders) => resp.code,
		Err(_) => None,
	}
}
