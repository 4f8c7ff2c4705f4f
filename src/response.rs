//! Response wrapper that preserves both parsed data and raw response details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful HTTP response: the deserialized body plus the transaction
/// details it came with.
///
/// Domain calls such as [`Client::create_booking`](crate::Client::create_booking)
/// unwrap this for you; the generic [`Client::get`](crate::Client::get) and
/// [`Client::post`](crate::Client::post) hand it back as is.
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use junction::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use junction::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("location", HeaderValue::from_static("https://example.com/results"));
    ///
    /// let response = Response::new(
    ///     (),
    ///     String::new(),
    ///     StatusCode::CREATED,
    ///     headers,
    ///     Duration::from_millis(100),
    /// );
    ///
    /// assert_eq!(response.header("location"), Some("https://example.com/results"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
