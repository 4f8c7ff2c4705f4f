//! Describes one request to the Junction API before it is resolved against
//! the client's base URL.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// What to send: method, target, extra headers and query pairs.
///
/// The target is either an API path (`/places`, `/bookings/{id}/confirm`) or
/// an absolute URL handed back by the API, such as a search `Location` or a
/// `links.next` page locator. Absolute targets are used verbatim.
///
/// Query pairs are appended in insertion order after any query the target
/// already carries. Junction filters use bracketed keys, which are
/// percent-encoded on the wire.
///
/// # Examples
///
/// ```
/// use junction::metadata::RequestMetadata;
/// use http::Method;
///
/// let request = RequestMetadata::new(Method::GET, "/places")
///     .query("page[limit]", "100")
///     .query("filter[iata][eq]", "LHR");
///
/// assert_eq!(request.query[1], ("filter[iata][eq]".to_string(), "LHR".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub method: Method,
    /// API path or absolute URL.
    pub target: String,
    /// Sent in addition to the client's default headers.
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestMetadata {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
        }
    }

    /// Adds a per-request header, e.g. an idempotency or correlation id.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigurationError`](crate::Error::ConfigurationError) when the
    /// name or value is not a valid header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> crate::Result<Self> {
        let name = HeaderName::try_from(name.as_ref()).map_err(|e| {
            crate::Error::ConfigurationError(format!("Invalid header name: {}", e))
        })?;
        let value = HeaderValue::try_from(value.as_ref()).map_err(|e| {
            crate::Error::ConfigurationError(format!("Invalid header value: {}", e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }
}
