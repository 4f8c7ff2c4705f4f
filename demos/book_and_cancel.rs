//! Booking and cancellation lifecycle.
//!
//! This example shows how to:
//! - Price a booking for an offer
//! - Confirm it with one delivery choice per segment
//! - Request and confirm its cancellation
//! - Tell usage errors apart from API errors
//!
//! Run with: `JUNCTION_API_KEY=... cargo run --example book_and_cancel -- <offer-id>`

use chrono::NaiveDate;
use junction::types::{Address, Gender};
use junction::{Client, DeliveryOption, Error, OfferId, Passenger};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("junction=debug,book_and_cancel=info")
        .init();

    let Some(offer) = std::env::args().nth(1) else {
        eprintln!("usage: book_and_cancel <offer-id>");
        return Ok(());
    };

    let client = Client::from_env()?;

    let passenger = Passenger {
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        gender: Gender::Female,
        email: "jane.doe@example.com".to_string(),
        phone_number: "+441234567890".to_string(),
        passport_information: None,
        residential_address: Address {
            address_lines: vec!["1 Example Street".to_string()],
            country_code: "GB".to_string(),
            postal_code: "BN1 1AA".to_string(),
            city: "Brighton".to_string(),
        },
    };

    let mut booking = client.draft_booking(OfferId::new(offer), [passenger]);

    // Operations invalid for the current state fail locally, before any request.
    match booking.confirm(&[DeliveryOption::ElectronicTicket]).await {
        Err(e) if e.is_usage() => println!("Rejected locally: {}", e),
        other => println!("Unexpected: {:?}", other),
    }

    println!("=== Pricing ===");
    booking.refresh().await?;
    if let Some(price) = booking.price() {
        println!("Price: {} {}", price.amount, price.currency);
    }
    for rule in booking.fare_rules() {
        println!("{}: {}", rule.title, rule.body);
    }

    println!("\n=== Confirming ===");
    let choices: Vec<DeliveryOption> = booking
        .fulfillment_options()
        .iter()
        .map(|entry| {
            entry
                .delivery_options
                .first()
                .copied()
                .unwrap_or(DeliveryOption::ElectronicTicket)
        })
        .collect();
    let payment = booking.confirm(&choices).await?;
    println!("Booking {:?}, payment {:?}", booking.status(), payment);

    let Some(booking_id) = booking.id().cloned() else {
        return Ok(());
    };

    println!("\n=== Cancelling ===");
    let mut cancellation = client.request_cancellation(booking_id).await?;
    if let Some(refund) = cancellation.refund() {
        println!(
            "Refund quote: {} {}",
            refund.refund_amount.amount, refund.refund_amount.currency
        );
    }

    match cancellation.confirm().await {
        Ok(refund) => println!("Refund {:?}: {}", refund.status, refund.refund_amount.amount),
        Err(Error::Api(e)) => println!("Cancellation rejected ({}): {}", e.status, e.message),
        Err(e) => return Err(e),
    }

    client.close().await;
    Ok(())
}
