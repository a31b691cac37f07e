//! Response starting and response bodies.

use std::fmt;

/// A response header as a `(name, value)` pair.
pub type Header = (String, String);

/// Starts the response: receives the status line and the header list.
///
/// Implemented for any `FnMut(&str, Vec<Header>)` closure and for
/// [`ResponseHead`], which simply records what it was given.
pub trait StartResponse {
    /// Starts the response with a status line such as `"200 OK"`.
    fn start(&mut self, status: &str, headers: Vec<Header>);
}

impl<F> StartResponse for F
where
    F: FnMut(&str, Vec<Header>),
{
    fn start(&mut self, status: &str, headers: Vec<Header>) {
        self(status, headers)
    }
}

/// Records the status and headers passed to [`StartResponse::start`].
///
/// A later call replaces what an earlier call recorded.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{ResponseHead, StartResponse};
///
/// let mut head = ResponseHead::default();
/// head.start("404 Not Found", vec![("Content-Type".into(), "text/plain".into())]);
///
/// assert_eq!(head.status(), Some("404 Not Found"));
/// assert_eq!(head.header("content-type"), Some("text/plain"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    status: Option<String>,
    headers: Vec<Header>,
}

impl ResponseHead {
    /// Returns the recorded status line, if the response was started.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns the recorded headers in order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Returns the first value of a header, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when the exact `(name, value)` pair was recorded.
    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.headers.iter().any(|(n, v)| n == name && v == value)
    }

    /// Consumes the recorder, returning the headers.
    pub fn into_headers(self) -> Vec<Header> {
        self.headers
    }
}

impl StartResponse for ResponseHead {
    fn start(&mut self, status: &str, headers: Vec<Header>) {
        self.status = Some(status.to_string());
        self.headers = headers;
    }
}

/// The output of a handler.
#[derive(Default)]
pub enum Body {
    /// No output
    #[default]
    Empty,
    /// A single string
    Text(String),
    /// Chunks already materialized
    Chunks(Vec<String>),
    /// Chunks produced on demand
    Lazy(Box<dyn Iterator<Item = String> + Send>),
}

impl Body {
    /// Wraps an iterator as a lazy body.
    pub fn lazy<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Body::Lazy(Box::new(chunks.into_iter()))
    }

    /// Materializes the first pending chunk.
    ///
    /// A single string becomes the sole pending chunk. A lazy body has its
    /// first chunk pulled now, so any work the producer does before emitting
    /// output has happened by the time this returns; every chunk, the first
    /// included, is still yielded afterwards. An exhausted lazy body becomes an
    /// empty chunk list.
    pub fn force_first(self) -> Self {
        match self {
            Body::Text(text) => Body::Chunks(vec![text]),
            Body::Lazy(mut chunks) => match chunks.next() {
                Some(first) => Body::Lazy(Box::new(std::iter::once(first).chain(chunks))),
                None => Body::Chunks(Vec::new()),
            },
            other => other,
        }
    }

    /// Collects every chunk, consuming lazy bodies.
    pub fn into_chunks(self) -> Vec<String> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(text) => vec![text],
            Body::Chunks(chunks) => chunks,
            Body::Lazy(chunks) => chunks.collect(),
        }
    }

    /// Concatenates every chunk.
    pub fn into_string(self) -> String {
        self.into_chunks().concat()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Chunks(chunks) => f.debug_tuple("Chunks").field(chunks).finish(),
            Body::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<String>> for Body {
    fn from(chunks: Vec<String>) -> Self {
        Body::Chunks(chunks)
    }
}
