//! Lazily paginated, prefetching result streams.
//!
//! A [`ResultsStream`] follows the `links.next` chain of a paginated endpoint.
//! While fewer than the prefetch threshold items are buffered it fetches the
//! next page on the client's scheduler, so network latency overlaps with the
//! caller working through the current page. At most one fetch is in flight
//! per stream: the slot is a single `Option<JoinHandle>` and the next locator
//! is moved into the fetch task, so a second fetch cannot be started before
//! the first has been harvested.

use crate::{metadata::RequestMetadata, Client, Error, Result};
use futures_util::stream::{self, Stream};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Instant;
use tokio::task::JoinHandle;

/// One page of a paginated endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    #[serde(default)]
    pub(crate) links: Links,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub(crate) next: Option<String>,
}

/// A pull-based sequence over a paginated result set.
///
/// [`next`](ResultsStream::next) yields `Some(Ok(item))` for each item in
/// server order, `Some(Err(_))` once if a page fetch failed, and `None` when
/// the results are exhausted. After `None` every further pull returns `None`.
///
/// The stream ends when the API returns an empty page, even if that page still
/// carries a `next` link, or a page without a `next` link.
///
/// A failed fetch does not discard items already buffered: they are yielded
/// first, then the error, then the stream ends.
///
/// Dropping the stream aborts a fetch still in flight.
///
/// # Examples
///
/// ```no_run
/// use junction::{Client, PlaceId};
/// use chrono::{NaiveDate, Utc};
///
/// # async fn example() -> Result<(), junction::Error> {
/// let client = Client::from_env()?;
/// let mut offers = client
///     .flight_search(
///         &PlaceId::from("place_01j44f6jw3erbr4rgna3xdtvxn"),
///         &PlaceId::from("place_01j44f3vfje1pbbr16etj2s26c"),
///         Utc::now(),
///         [NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()],
///     )
///     .await?;
///
/// if let Some(offer) = offers.next().await {
///     let offer = offer?;
///     println!("{} {}", offer.price.amount, offer.price.currency);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResultsStream<T> {
    client: Client,
    buffer: VecDeque<T>,
    next: Option<String>,
    in_flight: Option<JoinHandle<Result<Page<T>>>>,
    failure: Option<Error>,
}

impl<T> ResultsStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(client: Client, first_page: String) -> Self {
        Self {
            client,
            buffer: VecDeque::new(),
            next: Some(first_page),
            in_flight: None,
            failure: None,
        }
    }

    /// Pulls the next item.
    ///
    /// Suspends only when the buffer is empty and a page fetch is in flight.
    pub async fn next(&mut self) -> Option<Result<T>> {
        if self.in_flight.as_ref().is_some_and(JoinHandle::is_finished) {
            self.harvest().await;
        }

        self.prefetch();

        if self.buffer.is_empty() && self.in_flight.is_some() {
            self.harvest().await;
            self.prefetch();
        }

        match self.buffer.pop_front() {
            Some(item) => Some(Ok(item)),
            None => self.failure.take().map(Err),
        }
    }

    /// Adapts the stream to a [`futures_util::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        stream::unfold(self, |mut results| async move {
            results.next().await.map(|item| (item, results))
        })
    }

    /// Number of items fetched but not yet pulled.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` while a page fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns `true` once every pull will return `None`.
    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_empty()
            && self.in_flight.is_none()
            && self.next.is_none()
            && self.failure.is_none()
    }

    /// Starts a background fetch if the buffer is low, nothing is in flight,
    /// and there is a page left to fetch.
    fn prefetch(&mut self) {
        // An empty buffer always needs a page, whatever the threshold.
        let low_water = self.client.prefetch_threshold().max(1);
        if self.in_flight.is_some() || self.buffer.len() >= low_water {
            return;
        }
        let Some(locator) = self.next.take() else {
            return;
        };

        tracing::debug!(
            locator = %locator,
            buffered = self.buffer.len(),
            "Prefetching next page"
        );

        let task = fetch_page::<T>(self.client.clone(), locator);
        match self.client.scheduler().spawn(task) {
            Ok(handle) => self.in_flight = Some(handle),
            Err(e) => self.failure = Some(e),
        }
    }

    /// Waits for the in-flight fetch and applies its outcome.
    async fn harvest(&mut self) {
        let Some(handle) = self.in_flight.take() else {
            return;
        };

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(Error::BackgroundTask(e.to_string())),
        };

        match outcome {
            Ok(page) if page.items.is_empty() => {
                tracing::debug!("Empty page, end of results");
            }
            Ok(page) => {
                tracing::debug!(
                    items = page.items.len(),
                    has_next = page.links.next.is_some(),
                    "Page received"
                );
                self.buffer.extend(page.items);
                self.next = page.links.next;
            }
            Err(e) => self.failure = Some(e),
        }
    }
}

impl<T> std::fmt::Debug for ResultsStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsStream")
            .field("buffered", &self.buffer.len())
            .field("next", &self.next)
            .field("fetching", &self.in_flight.is_some())
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl<T> Drop for ResultsStream<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// GETs one page, waiting and polling again for as long as the API answers
/// 202 (results still being computed).
async fn fetch_page<T>(client: Client, locator: String) -> Result<Page<T>>
where
    T: DeserializeOwned,
{
    let metadata = RequestMetadata::new(Method::GET, locator);
    let interval = client.pending_retry_interval();
    let mut polls = 0usize;

    loop {
        let start_time = Instant::now();
        let response = client.execute::<()>(&metadata, None).await?;

        if response.status() == StatusCode::ACCEPTED {
            polls += 1;
            tracing::info!(
                url = %metadata.target,
                polls = polls,
                delay = ?interval,
                "Results pending - waiting before retry"
            );
            drop(response);
            tokio::time::sleep(interval).await;
            continue;
        }

        let page = client.parse_response::<Page<T>>(response, start_time).await?;
        return Ok(page.data);
    }
}
