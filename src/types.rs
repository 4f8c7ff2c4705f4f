//! Value types exchanged with the Junction API.
//!
//! These mirror the API's JSON documents (camelCase on the wire). Search
//! results are read-only; bookings and cancellations wrap the records defined
//! here in their own lifecycle types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// Generates: struct, new(), as_str(), Display, From<&str>.
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a server-assigned identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a place (city, station, airport, port).
    PlaceId
);
string_id!(
    /// Identifier of a flight or train offer.
    OfferId
);
string_id!(
    /// Identifier of a booking.
    BookingId
);
string_id!(
    /// Identifier of a cancellation.
    CancellationId
);

/// Kind of place. Unknown kinds deserialize to `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceType {
    City,
    RailwayStation,
    Airport,
    FerryPort,
    /// Any type this client does not know about.
    #[serde(other)]
    Unspecified,
}

impl PlaceType {
    /// The value used in `filter[type][eq]`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Unspecified => "unspecified",
            PlaceType::City => "city",
            PlaceType::RailwayStation => "railway-station",
            PlaceType::Airport => "airport",
            PlaceType::FerryPort => "ferry-port",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Decimal degrees, north positive.
    pub latitude: f64,
    /// Decimal degrees, east positive.
    pub longitude: f64,
}

/// A city, station, airport or port, as returned by place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Identifier used as search origin or destination
    pub id: PlaceId,
    /// Display name
    pub name: String,
    /// What the place is; a city may also be a railway station
    #[serde(default)]
    pub place_types: Vec<PlaceType>,
    /// Location of the place
    pub coordinates: Coordinates,
    /// ISO 3166-1 alpha-2 code
    pub country_code: String,
    /// Country display name
    pub country_name: String,
    /// Set for airports
    #[serde(default)]
    pub iata_code: Option<String>,
    /// IANA time zone name, e.g. `Europe/London`
    pub time_zone: String,
    /// Last change to this record
    pub updated_at: DateTime<Utc>,
}

/// An amount in a given ISO 4217 currency. The amount is a decimal string on
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Exact decimal amount
    pub amount: Decimal,
    /// ISO 4217 code, e.g. `EUR`
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakdownType {
    BaseFare,
    Tax,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// The share of the total this line accounts for
    pub price: Price,
    /// Base fare or tax
    pub breakdown_type: BreakdownType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassportRequirement {
    NotRequired,
    Required,
    RequiredWithIssueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FareType {
    Economy,
    Premium,
    Business,
    First,
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fare {
    /// Cabin or class
    #[serde(rename = "type")]
    pub fare_type: FareType,
    /// Carrier's name for the fare, e.g. "Anytime Return"
    pub marketing_name: String,
}

/// Origin or destination of a segment. Airports carry an IATA code, stations
/// do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub place_id: PlaceId,
    pub name: String,
    #[serde(default)]
    pub iata_code: Option<String>,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Where the segment starts
    pub origin: Stop,
    /// Where the segment ends
    pub destination: Stop,
    /// Scheduled departure
    pub departure_at: DateTime<Utc>,
    /// Scheduled arrival
    // The API has shipped both spellings.
    #[serde(alias = "arrivaleAt")]
    pub arrival_at: DateTime<Utc>,
    /// Fare booked on this segment
    pub fare: Fare,
}

/// A bookable flight itinerary from a flight search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    /// Pass to [`Client::create_booking`](crate::Client::create_booking)
    pub id: OfferId,
    /// The offer can no longer be booked after this instant
    pub expires_at: DateTime<Utc>,
    /// Total for all passengers
    pub price: Price,
    /// How the total is made up
    #[serde(default)]
    pub price_breakdown: Vec<PriceBreakdown>,
    /// Passport data the booking will need
    pub passport_information: PassportRequirement,
    /// Legs in travel order
    pub segments: Vec<Segment>,
}

/// A bookable train journey from a train search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainOffer {
    /// Pass to [`Client::create_booking`](crate::Client::create_booking)
    pub id: OfferId,
    /// The offer can no longer be booked after this instant
    pub expires_at: DateTime<Utc>,
    /// Total for all passengers
    pub price: Price,
    /// How the total is made up
    #[serde(default)]
    pub price_breakdown: Vec<PriceBreakdown>,
    /// Passport data the booking will need
    pub passport_information: PassportRequirement,
    /// Legs in travel order, outbound then return
    pub segments: Vec<Segment>,
    /// Operator-specific details, passed through untouched
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportInformation {
    /// Passport number
    pub document_number: String,
    /// ISO 3166-1 alpha-2 code of the issuing country
    pub issue_country: String,
    /// ISO 3166-1 alpha-2 code
    pub nationality: String,
    pub expiration_date: NaiveDate,
    pub issue_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street lines, most specific first
    pub address_lines: Vec<String>,
    /// ISO 3166-1 alpha-2 code
    pub country_code: String,
    pub postal_code: String,
    pub city: String,
}

/// A traveller on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    /// Must match the birth date given to the search
    pub date_of_birth: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// Receives tickets and booking notices
    pub email: String,
    /// E.164 format, e.g. `+441234567890`
    pub phone_number: String,
    /// Required when the offer's
    /// [`PassportRequirement`] is not `NotRequired`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_information: Option<PassportInformation>,
    /// Home address of the passenger
    pub residential_address: Address,
}

/// Booking status as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    NotTicketed,
    Error,
    Cancelled,
    Fulfilled,
}

/// Payment status returned when a booking is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Requested,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryOption {
    ElectronicTicket,
    KioskCollect,
}

/// Delivery options offered for one segment of a priced booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    /// Options to choose from, in the API's order of preference
    #[serde(
        rename = "deliveryOption",
        alias = "deliveryOptions",
        deserialize_with = "one_or_many"
    )]
    pub delivery_options: Vec<DeliveryOption>,
    /// 1-based position of the segment in the offer
    pub segment_sequence: u32,
}

/// One delivery choice sent when confirming a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentChoice {
    /// The chosen option
    pub delivery_option: DeliveryOption,
    /// The segment it applies to
    pub segment_sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareRule {
    /// Short heading, e.g. "Refunds"
    pub title: String,
    /// Full text of the rule
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Fulfilled,
}

/// Ticket state of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInformation {
    /// `Pending` until the carrier issued the ticket
    pub status: TicketStatus,
    /// Download link for electronic tickets
    #[serde(default)]
    pub ticket_url: Option<String>,
    /// Reference to give at a kiosk for collected tickets
    #[serde(default)]
    pub collection_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Requested,
    Confirmed,
}

/// Refund quote or final refund of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundInformation {
    /// `Requested` while the refund is a quote, `Confirmed` once final
    pub status: RefundStatus,
    /// What was paid for the booking
    pub booking_price: Price,
    /// What will be refunded
    pub refund_amount: Price,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<DeliveryOption>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(DeliveryOption),
        Many(Vec<DeliveryOption>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(option) => vec![option],
        OneOrMany::Many(options) => options,
    })
}
