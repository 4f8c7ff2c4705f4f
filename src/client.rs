//! HTTP client for the Junction API.
//!
//! The [`Client`] type is the main entry point: searches, bookings and
//! cancellations all start here. Use [`ClientBuilder`] to configure it.

use crate::{
    booking::Booking,
    cancellation::Cancellation,
    error::ApiError,
    metadata::RequestMetadata,
    scheduler::Scheduler,
    search::{FlightSearchBody, PassengerAge, PlaceQuery, TrainSearchBody},
    stream::ResultsStream,
    types::{BookingId, FlightOffer, OfferId, Passenger, Place, PlaceId, TrainOffer},
    Error, Response, Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://content-api.junction.dev";

/// Delay between two polls of a search whose results are still being computed.
pub const DEFAULT_PENDING_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// A result stream fetches the next page in the background once fewer than
/// this many items are buffered.
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 90;

/// Page size requested from paginated list endpoints.
pub const PAGE_LIMIT: u32 = 100;

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_ENV: &str = "JUNCTION_API_KEY";
const BASE_URL_ENV: &str = "JUNCTION_BASE_URL";

/// A client for the Junction API.
///
/// The client is cheap to clone and is meant to be shared: all clones use the
/// same connection pool and the same background scheduler for result-page
/// prefetches. Call [`close`](Client::close) when done to let in-flight
/// prefetches finish.
///
/// # Examples
///
/// ```no_run
/// use junction::{Client, PlaceQuery, PlaceType};
///
/// # async fn example() -> Result<(), junction::Error> {
/// let client = Client::builder().api_key("my-key").build()?;
///
/// let mut airports = client.search_places(
///     PlaceQuery::new().name_like("London").place_type(PlaceType::Airport),
/// )?;
/// while let Some(place) = airports.next().await {
///     let place = place?;
///     println!("{} ({:?})", place.name, place.iata_code);
/// }
///
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    pending_retry_interval: Duration,
    prefetch_threshold: usize,
    scheduler: Scheduler,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from `JUNCTION_API_KEY` and, if set, `JUNCTION_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key variable is missing.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::ConfigurationError(format!("{} is not set", API_KEY_ENV)))?;

        let mut builder = Self::builder().api_key(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(base_url)?;
        }
        builder.build()
    }

    /// Makes a typed HTTP request.
    ///
    /// Any non-2xx status is translated into [`Error::Api`].
    pub async fn call<Req, Res>(
        &self,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let start_time = Instant::now();
        let response = self.execute(&metadata, body).await?;
        self.parse_response(response, start_time).await
    }

    /// Makes a GET request to a path or absolute URL.
    pub async fn get<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::GET, path);
        self.call::<(), Res>(metadata, None).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::POST, path);
        self.call(metadata, Some(body)).await
    }

    /// Searches places matching `query`.
    ///
    /// Nothing is sent until the first item is pulled from the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL and query cannot form a valid URL.
    pub fn search_places(&self, query: PlaceQuery) -> Result<ResultsStream<Place>> {
        let metadata = RequestMetadata::new(Method::GET, "/places")
            .queries(query.to_query_params());
        let url = self.resolve(&metadata)?;
        Ok(ResultsStream::new(self.clone(), url.to_string()))
    }

    /// Starts a flight search and returns a stream over its offers.
    ///
    /// Offers are computed asynchronously by the API; the stream keeps
    /// polling until they are ready.
    pub async fn flight_search(
        &self,
        origin: &PlaceId,
        destination: &PlaceId,
        depart_after: DateTime<Utc>,
        passenger_birth_dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Result<ResultsStream<FlightOffer>> {
        let body = FlightSearchBody {
            origin_id: origin,
            destination_id: destination,
            departure_after: depart_after,
            passenger_ages: PassengerAge::from_birth_dates(passenger_birth_dates),
        };
        let location = self.start_search("/flight-searches", &body).await?;
        Ok(ResultsStream::new(self.clone(), location))
    }

    /// Starts a train search, optionally with a return leg, and returns a
    /// stream over its offers.
    pub async fn train_search(
        &self,
        origin: &PlaceId,
        destination: &PlaceId,
        depart_after: DateTime<Utc>,
        return_depart_after: Option<DateTime<Utc>>,
        passenger_birth_dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Result<ResultsStream<TrainOffer>> {
        let body = TrainSearchBody {
            origin_id: origin,
            destination_id: destination,
            departure_after: depart_after,
            passenger_ages: PassengerAge::from_birth_dates(passenger_birth_dates),
            return_departure_after: return_depart_after,
        };
        let location = self.start_search("/train-searches", &body).await?;
        Ok(ResultsStream::new(self.clone(), location))
    }

    /// Creates a draft booking without contacting the API.
    ///
    /// Call [`Booking::refresh`] to price it.
    pub fn draft_booking(
        &self,
        offer: OfferId,
        passengers: impl IntoIterator<Item = Passenger>,
    ) -> Booking {
        Booking::new(self.clone(), offer, passengers.into_iter().collect())
    }

    /// Creates and prices a booking for `offer`.
    pub async fn create_booking(
        &self,
        offer: OfferId,
        passengers: impl IntoIterator<Item = Passenger>,
    ) -> Result<Booking> {
        let mut booking = self.draft_booking(offer, passengers);
        booking.refresh().await?;
        Ok(booking)
    }

    /// Requests the cancellation of a booking and returns it with its refund
    /// quote. Call [`Cancellation::confirm`] to go through with it.
    pub async fn request_cancellation(&self, booking: BookingId) -> Result<Cancellation> {
        let mut cancellation = Cancellation::new(self.clone(), booking);
        cancellation.request().await?;
        Ok(cancellation)
    }

    /// Stops launching page prefetches and waits for the running ones.
    ///
    /// Result streams that still need a page fail with [`Error::ClientClosed`].
    /// The connection pool is released once the last clone is dropped.
    pub async fn close(&self) {
        tracing::debug!("Closing client, draining page prefetches");
        self.inner.scheduler.close().await;
    }

    /// Returns `true` once [`close`](Client::close) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.scheduler.is_closed()
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub(crate) fn pending_retry_interval(&self) -> Duration {
        self.inner.pending_retry_interval
    }

    pub(crate) fn prefetch_threshold(&self) -> usize {
        self.inner.prefetch_threshold
    }

    /// Builds the full URL: the target joined onto the base URL, then the query.
    pub(crate) fn resolve(&self, metadata: &RequestMetadata) -> Result<Url> {
        let mut url = self.inner.base_url.join(&metadata.target)?;
        if !metadata.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&metadata.query);
        }
        Ok(url)
    }

    /// Sends a single request and returns the response whatever its status.
    pub(crate) async fn execute<Req>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&Req>,
    ) -> Result<reqwest::Response>
    where
        Req: Serialize,
    {
        let url = self.resolve(metadata)?;

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            "Executing HTTP request"
        );

        let mut request = self.inner.http_client.request(metadata.method.clone(), url);

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }

        for (name, value) in &metadata.headers {
            request = request.header(name, value);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            let json = serde_json::to_value(body)
                .map_err(|e| Error::SerializationFailed(e.to_string()))?;
            request = request.json(&json);
        }

        let response = request.send().await?;

        Ok(response)
    }

    /// Parses a response into a typed `Response`, translating non-2xx.
    pub(crate) async fn parse_response<Res>(
        &self,
        response: reqwest::Response,
        start_time: Instant,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let response = Self::check_status(response).await?;
        let status = response.status();
        let headers = response.headers().clone();

        let raw_body = response.text().await?;
        let latency = start_time.elapsed();

        match serde_json::from_str::<Res>(&raw_body) {
            Ok(data) => Ok(Response::new(data, raw_body, status, headers, latency)),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    status = status.as_u16(),
                    "Response body does not match the expected shape"
                );

                Err(Error::DeserializationFailed {
                    raw_response: raw_body,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }

    /// Passes 2xx responses through and translates everything else.
    pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        tracing::info!(status = status.as_u16(), "Received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let raw_response = response.text().await.unwrap_or_default();
        let err = ApiError::from_parts(status, headers, raw_response);

        tracing::debug!(
            status = status.as_u16(),
            field_errors = err.errors.len(),
            "Translated API error"
        );

        Err(Error::Api(err))
    }

    /// POSTs a search and returns the results locator from `Location`.
    async fn start_search<Req>(&self, path: &str, body: &Req) -> Result<String>
    where
        Req: Serialize,
    {
        let metadata = RequestMetadata::new(Method::POST, path);
        let response = self.execute(&metadata, Some(body)).await?;
        let response = Self::check_status(response).await?;

        let status = response.status();
        let location = response
            .headers()
            .get(http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(Error::MissingLocation { status })?;

        tracing::debug!(path, location = %location, "Search created");
        Ok(location)
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use junction::ClientBuilder;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), junction::Error> {
/// let client = ClientBuilder::new()
///     .api_key("my-key")
///     .timeout(Duration::from_secs(30))
///     .pending_retry_interval(Duration::from_secs(2))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    pending_retry_interval: Duration,
    prefetch_threshold: usize,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
            pending_retry_interval: DEFAULT_PENDING_RETRY_INTERVAL,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the API endpoint. Defaults to [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how long a result stream waits before polling a search whose
    /// results are still pending. Polling has no attempt cap.
    pub fn pending_retry_interval(mut self, interval: Duration) -> Self {
        self.pending_retry_interval = interval;
        self
    }

    /// Sets the buffer low-water mark under which a result stream fetches
    /// the next page in the background. With `0`, a page is fetched only
    /// once the buffer is empty.
    pub fn prefetch_threshold(mut self, threshold: usize) -> Self {
        self.prefetch_threshold = threshold;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was provided or if the client
    /// configuration is invalid.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .ok_or_else(|| Error::ConfigurationError("API key is required".to_string()))?;
        let mut api_key = HeaderValue::try_from(api_key)
            .map_err(|e| Error::ConfigurationError(format!("Invalid API key: {}", e)))?;
        api_key.set_sensitive(true);

        let mut default_headers = self.default_headers;
        default_headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers,
                timeout: self.timeout,
                pending_retry_interval: self.pending_retry_interval,
                prefetch_threshold: self.prefetch_threshold,
                scheduler: Scheduler::new(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
