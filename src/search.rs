//! Search parameters: place filters and the bodies that start offer searches.

use crate::client::PAGE_LIMIT;
use crate::types::{PlaceId, PlaceType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Filters for [`Client::search_places`](crate::Client::search_places).
///
/// Every filter is optional; an empty query lists all places.
///
/// # Examples
///
/// ```
/// use junction::{PlaceQuery, PlaceType};
///
/// let query = PlaceQuery::new()
///     .name_like("Brighton")
///     .place_type(PlaceType::RailwayStation);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaceQuery {
    name_like: Option<String>,
    place_type: Option<PlaceType>,
    iata: Option<String>,
    coordinates: Option<(f64, f64, u32)>,
    search_within: Option<PlaceId>,
}

impl PlaceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places whose name contains `name`.
    pub fn name_like(mut self, name: impl Into<String>) -> Self {
        self.name_like = Some(name.into());
        self
    }

    pub fn place_type(mut self, place_type: PlaceType) -> Self {
        self.place_type = Some(place_type);
        self
    }

    /// Places with this exact IATA code.
    pub fn iata(mut self, code: impl Into<String>) -> Self {
        self.iata = Some(code.into());
        self
    }

    /// Places within `radius_km` of a point.
    pub fn near(mut self, latitude: f64, longitude: f64, radius_km: u32) -> Self {
        self.coordinates = Some((latitude, longitude, radius_km));
        self
    }

    /// Places located inside another place, e.g. stations of a city.
    pub fn within(mut self, place: PlaceId) -> Self {
        self.search_within = Some(place);
        self
    }

    pub(crate) fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("page[limit]".to_string(), PAGE_LIMIT.to_string())];
        if let Some(name) = &self.name_like {
            params.push(("filter[name][like]".to_string(), name.clone()));
        }
        if let Some(place_type) = self.place_type {
            params.push(("filter[type][eq]".to_string(), place_type.as_str().to_string()));
        }
        if let Some(iata) = &self.iata {
            params.push(("filter[iata][eq]".to_string(), iata.clone()));
        }
        if let Some((latitude, longitude, radius)) = self.coordinates {
            params.push((
                "query[coordinates]".to_string(),
                format!("{},{},{}", latitude, longitude, radius),
            ));
        }
        if let Some(place) = &self.search_within {
            params.push(("query[placeToSearchWithin]".to_string(), place.to_string()));
        }
        params
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PassengerAge {
    date_of_birth: NaiveDate,
}

impl PassengerAge {
    pub(crate) fn from_birth_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<Self> {
        dates
            .into_iter()
            .map(|date_of_birth| Self { date_of_birth })
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlightSearchBody<'a> {
    pub(crate) origin_id: &'a PlaceId,
    pub(crate) destination_id: &'a PlaceId,
    pub(crate) departure_after: DateTime<Utc>,
    pub(crate) passenger_ages: Vec<PassengerAge>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrainSearchBody<'a> {
    pub(crate) origin_id: &'a PlaceId,
    pub(crate) destination_id: &'a PlaceId,
    pub(crate) departure_after: DateTime<Utc>,
    pub(crate) passenger_ages: Vec<PassengerAge>,
    pub(crate) return_departure_after: Option<DateTime<Utc>>,
}
