//! Place and train offer search.
//!
//! This example shows how to:
//! - Build a client from `JUNCTION_API_KEY`
//! - Stream places page by page
//! - Start a train search and read offers as they become ready
//!
//! Run with: `JUNCTION_API_KEY=... cargo run --example search_places`

use chrono::{Duration, NaiveDate, Utc};
use junction::{Client, Error, PlaceQuery, PlaceType};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("junction=debug,search_places=info")
        .init();

    let client = Client::from_env()?;

    println!("=== Stations named like \"London\" ===");
    let mut stations = client.search_places(
        PlaceQuery::new()
            .name_like("London")
            .place_type(PlaceType::RailwayStation),
    )?;

    let mut shown = Vec::new();
    while let Some(station) = stations.next().await {
        let station = station?;
        println!("{:<40} {}", station.name, station.id);
        shown.push(station);
        if shown.len() == 10 {
            break;
        }
    }

    let [origin, destination, ..] = shown.as_slice() else {
        println!("Need two stations to search offers");
        client.close().await;
        return Ok(());
    };

    println!("\n=== Train offers {} -> {} ===", origin.name, destination.name);
    let mut offers = client
        .train_search(
            &origin.id,
            &destination.id,
            Utc::now() + Duration::days(7),
            None,
            [NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()],
        )
        .await?;

    // Results may take a while: the stream polls until the search completes.
    while let Some(offer) = offers.next().await {
        match offer {
            Ok(offer) => println!(
                "{}: {} {} ({} segments)",
                offer.id,
                offer.price.amount,
                offer.price.currency,
                offer.segments.len()
            ),
            Err(Error::Api(e)) => {
                println!("API rejected the search: {}", e.message);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    client.close().await;
    Ok(())
}
