//! Fixtures shared by the wiremock suites.

#![allow(dead_code)]

use chrono::NaiveDate;
use junction::types::{Address, Gender, PassportInformation};
use junction::{Client, Passenger};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub const PENDING_INTERVAL: Duration = Duration::from_millis(20);

pub fn client(server: &MockServer) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .unwrap()
        .pending_retry_interval(PENDING_INTERVAL)
        .build()
        .unwrap()
}

pub fn place(name: &str) -> Value {
    json!({
        "id": format!("place_{}", name.to_lowercase()),
        "name": name,
        "placeTypes": ["city"],
        "coordinates": {"latitude": 50.82, "longitude": -0.14},
        "countryCode": "GB",
        "countryName": "United Kingdom",
        "iataCode": null,
        "timeZone": "Europe/London",
        "updatedAt": "2024-08-01T10:00:00Z"
    })
}

pub fn page(items: Vec<Value>, next: Option<String>) -> Value {
    json!({"items": items, "links": {"next": next}})
}

pub fn problem(title: &str, detail: &str) -> Value {
    json!({
        "type": "https://errors.junction.dev/validation",
        "title": title,
        "status": 422,
        "instance": "/bookings",
        "detail": detail,
        "errors": [{"pointer": "/passengers/0/email", "detail": "must be a valid email"}]
    })
}

pub fn passenger() -> Passenger {
    Passenger {
        date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        gender: Gender::Female,
        email: "ada@example.com".to_string(),
        phone_number: "+4407770000001".to_string(),
        passport_information: Some(PassportInformation {
            document_number: "1".to_string(),
            issue_country: "GB".to_string(),
            nationality: "GB".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            issue_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        }),
        residential_address: Address {
            address_lines: vec!["1 Foo Road".to_string()],
            country_code: "GB".to_string(),
            postal_code: "BN1".to_string(),
            city: "Brighton".to_string(),
        },
    }
}

pub fn booking_response(id: &str, status: &str, segments: u32) -> Value {
    let fulfillment: Vec<Value> = (1..=segments)
        .map(|sequence| {
            json!({
                "deliveryOptions": ["electronic-ticket", "kiosk-collect"],
                "segmentSequence": sequence
            })
        })
        .collect();

    json!({
        "booking": {
            "id": id,
            "status": status,
            "passengers": [serde_json::to_value(passenger()).unwrap()],
            "price": {"amount": "42.50", "currency": "GBP"},
            "ticketInformation": {"status": "pending", "ticketUrl": null, "collectionReference": null},
            "fareRules": [{"title": "Changes", "body": "Not permitted"}]
        },
        "fulfillmentInformation": fulfillment
    })
}

pub fn confirmed_booking_response(id: &str, segments: u32) -> Value {
    let mut body = booking_response(id, "confirmed", segments);
    body["paymentStatus"] = json!("confirmed");
    body
}

pub fn cancellation_response(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "refundInformation": {
            "status": status,
            "bookingPrice": {"amount": "42.50", "currency": "GBP"},
            "refundAmount": {"amount": "30.00", "currency": "GBP"}
        }
    })
}

fn stop(place_id: &str, name: &str, iata: Option<&str>) -> Value {
    json!({
        "placeId": place_id,
        "name": name,
        "iataCode": iata,
        "coordinates": {"latitude": 51.47, "longitude": -0.45}
    })
}

pub fn flight_offer(id: &str) -> Value {
    json!({
        "id": id,
        "expiresAt": "2026-10-20T12:00:00Z",
        "price": {"amount": "99.99", "currency": "EUR"},
        "priceBreakdown": [
            {"price": {"amount": "80.00", "currency": "EUR"}, "breakdownType": "base-fare"},
            {"price": {"amount": "19.99", "currency": "EUR"}, "breakdownType": "tax"}
        ],
        "passportInformation": "required",
        "segments": [{
            "origin": stop("place_lhr", "Heathrow", Some("LHR")),
            "destination": stop("place_cdg", "Charles de Gaulle", Some("CDG")),
            "departureAt": "2026-10-23T08:00:00Z",
            "arrivalAt": "2026-10-23T10:15:00Z",
            "fare": {"type": "economy", "marketingName": "Basic"}
        }]
    })
}

pub fn train_offer(id: &str) -> Value {
    json!({
        "id": id,
        "expiresAt": "2026-10-20T12:00:00Z",
        "price": {"amount": "25.10", "currency": "GBP"},
        "priceBreakdown": [],
        "passportInformation": "not-required",
        "segments": [{
            "origin": stop("place_bton", "Brighton", None),
            "destination": stop("place_vic", "London Victoria", None),
            "departureAt": "2026-10-23T12:30:00Z",
            "arrivaleAt": "2026-10-23T13:32:00Z",
            "fare": {"type": "unspecified", "marketingName": "Anytime"}
        }],
        "metadata": {"operator": "Southern"}
    })
}
