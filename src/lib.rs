//! # Junction - an async client for the Junction travel content API
//!
//! Search places, flight and train offers, then book and cancel them. Built
//! on `reqwest` and `tokio`, with API errors translated into one structured
//! type and `tracing` events for every request.
//!
//! ## Quick Start
//!
//! ```no_run
//! use junction::{Client, DeliveryOption, PlaceQuery};
//! use chrono::{NaiveDate, Utc};
//!
//! # async fn example(passenger: junction::Passenger) -> Result<(), junction::Error> {
//! let client = Client::from_env()?;
//!
//! // Lazily paginated: pages are fetched as you pull.
//! let mut places = client.search_places(PlaceQuery::new().name_like("Brighton"))?;
//! let origin = places.next().await.transpose()?.expect("no such place").id;
//! # let destination = origin.clone();
//!
//! // Offer searches run server-side; the stream polls until results are ready.
//! let birth = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
//! let mut offers = client
//!     .train_search(&origin, &destination, Utc::now(), None, [birth])
//!     .await?;
//! let offer = offers.next().await.transpose()?.expect("no offers");
//!
//! // Price, then confirm with one delivery choice per fulfillment entry.
//! let mut booking = client.create_booking(offer.id, [passenger]).await?;
//! let choices = vec![DeliveryOption::ElectronicTicket; booking.fulfillment_options().len()];
//! booking.confirm(&choices).await?;
//!
//! // Cancel: request a refund quote, then confirm it.
//! let booking_id = booking.id().expect("confirmed bookings have an id").clone();
//! let mut cancellation = client.request_cancellation(booking_id).await?;
//! let refund = cancellation.confirm().await?;
//! println!("Refunded {} {}", refund.refund_amount.amount, refund.refund_amount.currency);
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Result streams
//!
//! [`ResultsStream`] buffers one page at a time and fetches the next page in
//! the background once fewer than [`DEFAULT_PREFETCH_THRESHOLD`] items are
//! left, with at most one fetch in flight. A `202 Accepted` page means the
//! results are still being computed: the stream waits
//! [`DEFAULT_PENDING_RETRY_INTERVAL`] and asks again, with no attempt cap.
//!
//! ## Lifecycles
//!
//! [`Booking`] and [`Cancellation`] reject operations that are invalid for
//! their current state with [`Error::Usage`] before anything is sent.

pub mod booking;
pub mod cancellation;
mod client;
mod error;
pub mod metadata;
mod response;
mod scheduler;
mod search;
mod stream;
pub mod types;

pub use booking::{Booking, BookingRecord, BookingState};
pub use cancellation::{Cancellation, CancellationState};
pub use client::{
    Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_PENDING_RETRY_INTERVAL,
    DEFAULT_PREFETCH_THRESHOLD, PAGE_LIMIT,
};
pub use error::{ApiError, Error, FieldError, Result, UsageError};
pub use response::Response;
pub use search::PlaceQuery;
pub use stream::ResultsStream;
pub use types::{
    BookingId, BookingStatus, CancellationId, DeliveryOption, FlightOffer, OfferId, Passenger,
    PaymentStatus, Place, PlaceId, PlaceType, Price, RefundInformation, RefundStatus, TrainOffer,
};
