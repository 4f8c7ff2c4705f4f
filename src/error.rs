//! Error types for Junction API calls.
//!
//! Every non-success HTTP response, from any endpoint, goes through a single
//! translation path ([`ApiError::from_parts`]) that turns the API's problem
//! document into a status, a readable message and a list of field errors.
//! Lifecycle guards that reject an operation before anything is sent surface
//! as [`UsageError`].

use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use std::fmt;

/// The main error type for Junction API calls.
///
/// # Examples
///
/// ```no_run
/// use junction::{Client, Error, PlaceQuery};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key("key").build()?;
/// let mut places = client.search_places(PlaceQuery::new().name_like("Lond"))?;
///
/// match places.next().await {
///     Some(Ok(place)) => println!("{}", place.name),
///     Some(Err(Error::Api(err))) => {
///         eprintln!("API error {}: {}", err.status, err.message);
///         for field in &err.errors {
///             eprintln!("  {}: {}", field.pointer, field.detail);
///         }
///     }
///     Some(Err(e)) => eprintln!("Other error: {}", e),
///     None => println!("No places found"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// Surfaced unmodified from `reqwest` and never retried.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// The request timed out.
    ///
    /// Only raised when a timeout was configured on the client.
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("{0}")]
    Api(ApiError),

    /// Failed to deserialize a successful response body into the expected type.
    ///
    /// Preserves both the raw body and the serde message, which is what you
    /// need when the API schema drifts.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid configuration was provided (missing API key, bad header, etc.).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided or returned as a page locator.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A search was created but the response carried no `Location` header
    /// pointing at its results.
    #[error("Search response (status {status}) has no Location header")]
    MissingLocation {
        /// The HTTP status code of the search creation response
        status: StatusCode,
    },

    /// The operation is not valid for the current lifecycle state.
    ///
    /// Raised before any request is sent.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// A page prefetch was requested after [`Client::close`](crate::Client::close).
    #[error("Client is closed")]
    ClientClosed,

    /// The background page fetch panicked or was aborted.
    #[error("Background fetch failed: {0}")]
    BackgroundTask(String),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::MissingLocation { status } => Some(*status),
            Error::Network(err) => err.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api(err) => Some(&err.raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the field-level errors of a translated API error.
    ///
    /// Empty for every other kind of error.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Api(err) => &err.errors,
            _ => &[],
        }
    }

    /// Returns `true` if this is a lifecycle guard violation.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

/// Operations rejected by a booking or cancellation because of its state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `confirm` was called on a booking that was never priced.
    #[error("Booking has not been priced yet")]
    BookingNotPriced,

    /// `refresh` or `confirm` was called on a confirmed booking.
    #[error("Booking already confirmed")]
    BookingAlreadyConfirmed,

    /// The number of delivery choices does not match the fulfillment entries.
    #[error("Expected {expected} delivery choices, got {provided}")]
    FulfillmentMismatch {
        /// Fulfillment entries returned by the last pricing
        expected: usize,
        /// Choices passed to `confirm`
        provided: usize,
    },

    /// `confirm` was called on a cancellation that was never requested.
    #[error("Cancellation has not been requested yet")]
    CancellationNotRequested,

    /// `request` or `confirm` was called on a confirmed cancellation.
    #[error("Cancellation already confirmed")]
    CancellationAlreadyConfirmed,
}

/// A single `(pointer, detail)` entry of an API error document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    /// JSON pointer to the offending request field, e.g. `/passengers/0/email`.
    pub pointer: String,
    /// What is wrong with it.
    pub detail: String,
}

/// A non-success response, translated.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The HTTP status code
    pub status: StatusCode,
    /// `"{title}: {detail}"` followed by one line per field error, or the raw
    /// body when it is not a problem document
    pub message: String,
    /// Field-level errors, in the order the API listed them
    pub errors: Vec<FieldError>,
    /// The raw response body
    pub raw_response: String,
    /// The response headers
    pub headers: HeaderMap,
}

#[derive(Deserialize)]
struct ProblemDocument {
    title: String,
    detail: String,
    #[serde(default)]
    errors: Vec<FieldError>,
}

impl ApiError {
    /// Translates the parts of a non-success response.
    ///
    /// # Examples
    ///
    /// ```
    /// use junction::ApiError;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = ApiError::from_parts(
    ///     StatusCode::UNPROCESSABLE_ENTITY,
    ///     HeaderMap::new(),
    ///     r#"{"title":"Invalid","detail":"bad field","errors":[{"pointer":"/x","detail":"required"}]}"#.to_string(),
    /// );
    ///
    /// assert!(err.message.starts_with("Invalid: bad field"));
    /// assert_eq!(err.errors[0].pointer, "/x");
    /// ```
    pub fn from_parts(status: StatusCode, headers: HeaderMap, raw_response: String) -> Self {
        let (message, errors) = match serde_json::from_str::<ProblemDocument>(&raw_response) {
            Ok(doc) => {
                let mut message = format!("{}: {}", doc.title, doc.detail);
                for field in &doc.errors {
                    message.push_str(&format!("\n  - {}: {}", field.pointer, field.detail));
                }
                (message, doc.errors)
            }
            Err(_) => (raw_response.clone(), Vec::new()),
        };

        Self {
            status,
            message,
            errors,
            raw_response,
            headers,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

/// A specialized `Result` type for Junction API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_problem_document() {
        let body = r#"{"title":"Invalid","detail":"bad field","errors":[{"pointer":"/x","detail":"required"}]}"#;
        let err = ApiError::from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            HeaderMap::new(),
            body.to_string(),
        );

        assert_eq!(err.status.as_u16(), 422);
        assert!(err.message.contains("Invalid: bad field"));
        assert!(err.message.contains("- /x: required"));
        assert_eq!(
            err.errors,
            vec![FieldError {
                pointer: "/x".to_string(),
                detail: "required".to_string(),
            }]
        );
        assert_eq!(err.raw_response, body);
    }

    #[test]
    fn problem_document_without_field_errors() {
        let err = ApiError::from_parts(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            r#"{"type":"about:blank","title":"Not Found","status":404,"detail":"no such booking"}"#
                .to_string(),
        );

        assert_eq!(err.message, "Not Found: no such booking");
        assert!(err.errors.is_empty());
    }

    #[test]
    fn falls_back_to_raw_body() {
        let err = ApiError::from_parts(
            StatusCode::BAD_GATEWAY,
            HeaderMap::new(),
            "<html>upstream down</html>".to_string(),
        );

        assert_eq!(err.message, "<html>upstream down</html>");
        assert!(err.errors.is_empty());
    }

    #[test]
    fn json_without_title_falls_back_to_raw_body() {
        let err = ApiError::from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
            r#"{"message":"boom"}"#.to_string(),
        );

        assert_eq!(err.message, r#"{"message":"boom"}"#);
    }

    #[test]
    fn error_accessors() {
        let err = Error::Api(ApiError::from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            HeaderMap::new(),
            r#"{"title":"Invalid","detail":"bad","errors":[{"pointer":"/a","detail":"b"}]}"#
                .to_string(),
        ));
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.field_errors().len(), 1);
        assert!(err.raw_response().is_some());
        assert!(!err.is_usage());
        assert!(err.to_string().contains("Invalid: bad"));

        let usage = Error::from(UsageError::BookingAlreadyConfirmed);
        assert!(usage.is_usage());
        assert_eq!(usage.status(), None);
        assert!(usage.field_errors().is_empty());
    }
}
