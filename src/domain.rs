use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned rectangle given by its south-west and north-east corners.
///
/// Edges are inclusive. Corners are taken as given: a box whose `top_right`
/// lies south or west of `bottom_left` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub bottom_left: Location,
    pub top_right: Location,
}

impl BoundingBox {
    pub fn new(bottom_left: Location, top_right: Location) -> Self {
        Self {
            bottom_left,
            top_right,
        }
    }

    pub fn contains(&self, location: &Location) -> bool {
        location.lat >= self.bottom_left.lat
            && location.lat <= self.top_right.lat
            && location.lng >= self.bottom_left.lng
            && location.lng <= self.top_right.lng
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cat {
    pub id: String,
    pub name: String,
    pub breed: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<NaiveDate>,
    pub filename: Option<String>,
    pub owner: String,
    pub location: Location,
    pub created_at: DateTime<Utc>,
}

/// Payload for a new cat. `owner` is whatever the client sent and is
/// replaced with the caller's id before the record is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCat {
    pub name: String,
    pub breed: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<NaiveDate>,
    pub filename: Option<String>,
    pub owner: Option<String>,
    pub location: Location,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatPatch {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<NaiveDate>,
    pub filename: Option<String>,
    pub owner: Option<String>,
    pub location: Option<Location>,
}

impl CatPatch {
    pub fn apply(&self, cat: &mut Cat) {
        if let Some(name) = &self.name {
            cat.name = name.clone();
        }
        if let Some(breed) = &self.breed {
            cat.breed = Some(breed.clone());
        }
        if let Some(weight) = self.weight {
            cat.weight = Some(weight);
        }
        if let Some(birthdate) = self.birthdate {
            cat.birthdate = Some(birthdate);
        }
        if let Some(filename) = &self.filename {
            cat.filename = Some(filename.clone());
        }
        if let Some(owner) = &self.owner {
            cat.owner = owner.clone();
        }
        if let Some(location) = self.location {
            cat.location = location;
        }
    }
}
