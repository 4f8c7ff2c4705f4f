//! Booking lifecycle: draft, priced, confirmed.
//!
//! A booking moves forward only. Pricing (`refresh`) may be repeated until the
//! booking is confirmed; confirming requires one delivery choice per
//! fulfillment entry returned by the last pricing. Guards run before anything
//! is sent, and state is replaced wholesale from the API response only once
//! the request succeeded.

use crate::error::UsageError;
use crate::types::{
    BookingId, BookingStatus, DeliveryOption, FareRule, Fulfillment, FulfillmentChoice, OfferId,
    Passenger, PaymentStatus, Price, TicketInformation,
};
use crate::{Client, Result};
use serde::{Deserialize, Serialize};

const BOOKINGS_PATH: &str = "/bookings";

/// The booking document returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Assigned by the API; changes when the booking is priced again
    pub id: BookingId,
    /// Status reported by the API
    pub status: BookingStatus,
    /// Passengers as stored by the API
    pub passengers: Vec<Passenger>,
    /// Total price
    pub price: Price,
    /// Ticket details, filled in once the carrier issued tickets
    #[serde(default)]
    pub ticket_information: Option<TicketInformation>,
    /// Conditions attached to the fare
    #[serde(default)]
    pub fare_rules: Vec<FareRule>,
}

/// Where a [`Booking`] is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    /// Offer and passengers known, nothing sent yet.
    Draft,
    /// Priced by the API, not yet confirmed.
    Priced {
        record: BookingRecord,
        fulfillment: Vec<Fulfillment>,
    },
    /// Confirmed. Terminal.
    Confirmed {
        record: BookingRecord,
        fulfillment: Vec<Fulfillment>,
        payment_status: PaymentStatus,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingEnvelope {
    booking: BookingRecord,
    #[serde(default)]
    fulfillment_information: Vec<Fulfillment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmEnvelope {
    #[serde(flatten)]
    envelope: BookingEnvelope,
    payment_status: PaymentStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingBody<'a> {
    offer_id: &'a OfferId,
    passengers: &'a [Passenger],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBookingBody {
    fulfillment_choices: Vec<FulfillmentChoice>,
}

/// A booking of one offer for a set of passengers.
///
/// # Examples
///
/// ```no_run
/// use junction::{Client, DeliveryOption, OfferId, Passenger};
///
/// # async fn example(client: Client, passenger: Passenger) -> Result<(), junction::Error> {
/// let mut booking = client
///     .create_booking(OfferId::from("train_offer_01"), [passenger])
///     .await?;
/// println!("Price: {:?}", booking.price());
///
/// let choices = vec![DeliveryOption::ElectronicTicket; booking.fulfillment_options().len()];
/// let payment = booking.confirm(&choices).await?;
/// println!("Payment {:?}, booking {:?}", payment, booking.status());
/// # Ok(())
/// # }
/// ```
pub struct Booking {
    client: Client,
    offer: OfferId,
    passengers: Vec<Passenger>,
    state: BookingState,
}

impl Booking {
    pub(crate) fn new(client: Client, offer: OfferId, passengers: Vec<Passenger>) -> Self {
        Self {
            client,
            offer,
            passengers,
            state: BookingState::Draft,
        }
    }

    /// Prices the booking, or prices it again.
    ///
    /// Every call creates the booking anew on the API side, so the id may
    /// change.
    ///
    /// # Errors
    ///
    /// [`UsageError::BookingAlreadyConfirmed`] if the booking is confirmed; no
    /// request is sent in that case.
    pub async fn refresh(&mut self) -> Result<()> {
        if let BookingState::Confirmed { .. } = self.state {
            return Err(UsageError::BookingAlreadyConfirmed.into());
        }

        let body = CreateBookingBody {
            offer_id: &self.offer,
            passengers: &self.passengers,
        };
        let envelope = self
            .client
            .post::<_, BookingEnvelope>(BOOKINGS_PATH, &body)
            .await?
            .data;

        tracing::debug!(
            booking_id = %envelope.booking.id,
            status = ?envelope.booking.status,
            fulfillment_entries = envelope.fulfillment_information.len(),
            "Booking priced"
        );

        self.state = BookingState::Priced {
            record: envelope.booking,
            fulfillment: envelope.fulfillment_information,
        };
        Ok(())
    }

    /// Confirms the booking with one delivery choice per fulfillment entry,
    /// in the order of [`fulfillment_options`](Booking::fulfillment_options).
    ///
    /// Returns the payment status reported by the API.
    ///
    /// # Errors
    ///
    /// Usage errors, raised before any request: the booking was never priced,
    /// is already confirmed, or `choices` does not have one entry per
    /// fulfillment entry.
    pub async fn confirm(&mut self, choices: &[DeliveryOption]) -> Result<PaymentStatus> {
        let (record, fulfillment) = match &self.state {
            BookingState::Draft => return Err(UsageError::BookingNotPriced.into()),
            BookingState::Confirmed { .. } => {
                return Err(UsageError::BookingAlreadyConfirmed.into())
            }
            BookingState::Priced {
                record,
                fulfillment,
            } => (record, fulfillment),
        };

        if choices.len() != fulfillment.len() {
            return Err(UsageError::FulfillmentMismatch {
                expected: fulfillment.len(),
                provided: choices.len(),
            }
            .into());
        }

        let body = ConfirmBookingBody {
            fulfillment_choices: choices
                .iter()
                .zip(fulfillment)
                .map(|(option, entry)| FulfillmentChoice {
                    delivery_option: *option,
                    segment_sequence: entry.segment_sequence,
                })
                .collect(),
        };
        let path = format!("{}/{}/confirm", BOOKINGS_PATH, record.id);
        let confirmed = self
            .client
            .post::<_, ConfirmEnvelope>(path, &body)
            .await?
            .data;

        tracing::debug!(
            booking_id = %confirmed.envelope.booking.id,
            status = ?confirmed.envelope.booking.status,
            payment_status = ?confirmed.payment_status,
            "Booking confirmed"
        );

        let payment_status = confirmed.payment_status;
        self.state = BookingState::Confirmed {
            record: confirmed.envelope.booking,
            fulfillment: confirmed.envelope.fulfillment_information,
            payment_status,
        };
        Ok(payment_status)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &BookingState {
        &self.state
    }

    /// The offer being booked.
    pub fn offer_id(&self) -> &OfferId {
        &self.offer
    }

    /// Returns `true` once [`confirm`](Booking::confirm) succeeded.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, BookingState::Confirmed { .. })
    }

    /// The API record, once priced.
    pub fn record(&self) -> Option<&BookingRecord> {
        match &self.state {
            BookingState::Draft => None,
            BookingState::Priced { record, .. } | BookingState::Confirmed { record, .. } => {
                Some(record)
            }
        }
    }

    /// The API id, once priced.
    pub fn id(&self) -> Option<&BookingId> {
        self.record().map(|record| &record.id)
    }

    /// The API status, once priced.
    pub fn status(&self) -> Option<BookingStatus> {
        self.record().map(|record| record.status)
    }

    /// Passengers as returned by the API, or as given while still a draft.
    pub fn passengers(&self) -> &[Passenger] {
        match self.record() {
            Some(record) => &record.passengers,
            None => &self.passengers,
        }
    }

    /// Total price, once priced.
    pub fn price(&self) -> Option<&Price> {
        self.record().map(|record| &record.price)
    }

    /// Ticket details, when the API has sent any.
    pub fn ticket(&self) -> Option<&TicketInformation> {
        self.record()?.ticket_information.as_ref()
    }

    /// Fare conditions; empty while a draft.
    pub fn fare_rules(&self) -> &[FareRule] {
        match self.record() {
            Some(record) => &record.fare_rules,
            None => &[],
        }
    }

    /// Delivery options per segment from the last pricing or confirmation.
    pub fn fulfillment_options(&self) -> &[Fulfillment] {
        match &self.state {
            BookingState::Draft => &[],
            BookingState::Priced { fulfillment, .. }
            | BookingState::Confirmed { fulfillment, .. } => fulfillment,
        }
    }

    /// Payment status returned by confirmation.
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        match &self.state {
            BookingState::Confirmed { payment_status, .. } => Some(*payment_status),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Booking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Booking")
            .field("offer", &self.offer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
