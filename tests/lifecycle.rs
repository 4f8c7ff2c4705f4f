//! Booking and cancellation lifecycles against a wiremock server.

mod common;

use common::{
    booking_response, cancellation_response, client, confirmed_booking_response, passenger,
    problem,
};
use junction::{
    BookingId, BookingState, BookingStatus, CancellationState, DeliveryOption, Error, OfferId,
    PaymentStatus, RefundStatus, UsageError,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_pricing(server: &MockServer, id: &str, segments: u32) {
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(booking_response(id, "pending", segments)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_booking_prices_the_offer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(header("x-api-key", "test-key"))
        .and(body_partial_json(json!({
            "offerId": "offer_1",
            "passengers": [{"firstName": "Ada", "dateOfBirth": "2000-01-01"}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(booking_response("booking_1", "pending", 2)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let booking = client
        .create_booking(OfferId::from("offer_1"), [passenger()])
        .await
        .unwrap();

    assert!(matches!(booking.state(), BookingState::Priced { .. }));
    assert_eq!(booking.id().map(BookingId::as_str), Some("booking_1"));
    assert_eq!(booking.status(), Some(BookingStatus::Pending));
    assert_eq!(
        booking.price().unwrap().amount,
        Decimal::from_str("42.50").unwrap()
    );
    assert_eq!(booking.fulfillment_options().len(), 2);
    assert_eq!(
        booking.fulfillment_options()[0].delivery_options,
        vec![DeliveryOption::ElectronicTicket, DeliveryOption::KioskCollect]
    );
    assert_eq!(booking.fare_rules()[0].title, "Changes");
    assert_eq!(booking.passengers()[0].last_name, "Lovelace");
    assert!(!booking.is_confirmed());
    assert_eq!(booking.payment_status(), None);
}

#[tokio::test]
async fn test_confirm_draft_is_rejected_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut booking = client.draft_booking(OfferId::from("offer_1"), [passenger()]);

    let result = booking.confirm(&[DeliveryOption::ElectronicTicket]).await;

    assert!(matches!(
        result,
        Err(Error::Usage(UsageError::BookingNotPriced))
    ));
    assert!(matches!(booking.state(), BookingState::Draft));
    assert_eq!(booking.passengers().len(), 1);
    assert!(booking.fare_rules().is_empty());
}

#[tokio::test]
async fn test_fulfillment_count_must_match() {
    let mock_server = MockServer::start().await;
    mount_pricing(&mock_server, "booking_1", 2).await;

    Mock::given(method("POST"))
        .and(path("/bookings/booking_1/confirm"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(confirmed_booking_response("booking_1", 2)),
        )
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut booking = client
        .create_booking(OfferId::from("offer_1"), [passenger()])
        .await
        .unwrap();

    let err = booking
        .confirm(&[DeliveryOption::ElectronicTicket])
        .await
        .unwrap_err();

    assert!(err.is_usage());
    assert!(matches!(
        err,
        Error::Usage(UsageError::FulfillmentMismatch {
            expected: 2,
            provided: 1
        })
    ));
    assert!(matches!(booking.state(), BookingState::Priced { .. }));
}

#[tokio::test]
async fn test_confirm_pairs_choices_with_segments() {
    let mock_server = MockServer::start().await;
    mount_pricing(&mock_server, "booking_1", 2).await;

    Mock::given(method("POST"))
        .and(path("/bookings/booking_1/confirm"))
        .and(body_partial_json(json!({
            "fulfillmentChoices": [
                {"deliveryOption": "electronic-ticket", "segmentSequence": 1},
                {"deliveryOption": "kiosk-collect", "segmentSequence": 2}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(confirmed_booking_response("booking_1", 2)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut booking = client
        .create_booking(OfferId::from("offer_1"), [passenger()])
        .await
        .unwrap();

    let payment = booking
        .confirm(&[DeliveryOption::ElectronicTicket, DeliveryOption::KioskCollect])
        .await
        .unwrap();

    assert_eq!(payment, PaymentStatus::Confirmed);
    assert!(booking.is_confirmed());
    assert_eq!(booking.status(), Some(BookingStatus::Confirmed));
    assert_eq!(booking.payment_status(), Some(PaymentStatus::Confirmed));

    // Terminal: neither confirm nor refresh sends anything
    let again = booking
        .confirm(&[DeliveryOption::ElectronicTicket, DeliveryOption::KioskCollect])
        .await;
    assert!(matches!(
        again,
        Err(Error::Usage(UsageError::BookingAlreadyConfirmed))
    ));
    let refresh = booking.refresh().await;
    assert!(matches!(
        refresh,
        Err(Error::Usage(UsageError::BookingAlreadyConfirmed))
    ));

    let posts = mock_server.received_requests().await.unwrap();
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn test_refresh_replaces_priced_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(booking_response("booking_1", "pending", 1)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(booking_response("booking_2", "pending", 2)),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut booking = client
        .create_booking(OfferId::from("offer_1"), [passenger()])
        .await
        .unwrap();
    assert_eq!(booking.id().unwrap().as_str(), "booking_1");
    assert_eq!(booking.fulfillment_options().len(), 1);

    booking.refresh().await.unwrap();

    assert_eq!(booking.id().unwrap().as_str(), "booking_2");
    assert_eq!(booking.fulfillment_options().len(), 2);
    assert_eq!(booking.offer_id().as_str(), "offer_1");
}

#[tokio::test]
async fn test_failed_confirm_keeps_priced_state() {
    let mock_server = MockServer::start().await;
    mount_pricing(&mock_server, "booking_1", 1).await;

    Mock::given(method("POST"))
        .and(path("/bookings/booking_1/confirm"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(problem("Offer expired", "Search again")),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut booking = client
        .create_booking(OfferId::from("offer_1"), [passenger()])
        .await
        .unwrap();
    let before = booking.state().clone();

    let err = booking
        .confirm(&[DeliveryOption::KioskCollect])
        .await
        .unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.status.as_u16(), 422);
            assert!(api.message.starts_with("Offer expired: Search again"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(booking.state(), &before);
    assert!(!booking.is_confirmed());
}

#[tokio::test]
async fn test_cancellation_request_then_confirm() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings/booking_1/request-cancellation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cancellation_response("cancellation_1", "requested")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cancellations/cancellation_1/confirm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cancellation_response("cancellation_1", "confirmed")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut cancellation = client
        .request_cancellation(BookingId::from("booking_1"))
        .await
        .unwrap();

    assert!(matches!(
        cancellation.state(),
        CancellationState::Requested { .. }
    ));
    assert_eq!(cancellation.booking_id().as_str(), "booking_1");
    assert_eq!(cancellation.id().unwrap().as_str(), "cancellation_1");
    assert_eq!(cancellation.refund_status(), Some(RefundStatus::Requested));
    let quoted = cancellation.refund().unwrap().refund_amount.clone();

    let refund = cancellation.confirm().await.unwrap();

    assert_eq!(refund.status, RefundStatus::Confirmed);
    assert_eq!(refund.refund_amount, quoted);
    assert_eq!(refund.refund_amount.amount, Decimal::from_str("30.00").unwrap());
    assert!(cancellation.is_confirmed());

    assert!(matches!(
        cancellation.confirm().await,
        Err(Error::Usage(UsageError::CancellationAlreadyConfirmed))
    ));
    assert!(matches!(
        cancellation.request().await,
        Err(Error::Usage(UsageError::CancellationAlreadyConfirmed))
    ));
}

#[tokio::test]
async fn test_cancellation_can_be_requested_again() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings/booking_1/request-cancellation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cancellation_response("cancellation_1", "requested")),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut cancellation = client
        .request_cancellation(BookingId::from("booking_1"))
        .await
        .unwrap();

    let refund = cancellation.request().await.unwrap();

    assert_eq!(refund.status, RefundStatus::Requested);
    assert!(!cancellation.is_confirmed());
}

#[tokio::test]
async fn test_failed_cancellation_request_surfaces_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings/booking_9/request-cancellation"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({
                "type": "https://errors.junction.dev/not-found",
                "title": "Not Found",
                "status": 404,
                "detail": "No booking with id booking_9"
            })),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = client
        .request_cancellation(BookingId::from("booking_9"))
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(err.to_string().contains("Not Found: No booking with id booking_9"));
    assert!(err.field_errors().is_empty());
}
