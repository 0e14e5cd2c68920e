use crate::domain;
use async_graphql::{InputObject, Object, SimpleObject, ID};
use chrono::NaiveDate;

/// GraphQL representation of a Cat
#[derive(Clone)]
pub struct Cat {
    pub inner: domain::Cat,
}

impl From<domain::Cat> for Cat {
    fn from(cat: domain::Cat) -> Self {
        Self { inner: cat }
    }
}

#[Object]
impl Cat {
    /// The unique identifier for the cat
    async fn id(&self) -> ID {
        ID(self.inner.id.clone())
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn breed(&self) -> Option<&str> {
        self.inner.breed.as_deref()
    }

    /// Weight in kilograms
    async fn weight(&self) -> Option<f64> {
        self.inner.weight
    }

    async fn birthdate(&self) -> Option<NaiveDate> {
        self.inner.birthdate
    }

    /// Name of the uploaded picture
    async fn filename(&self) -> Option<&str> {
        self.inner.filename.as_deref()
    }

    /// Id of the user who owns the cat
    async fn owner(&self) -> ID {
        ID(self.inner.owner.clone())
    }

    async fn location(&self) -> Location {
        self.inner.location.into()
    }

    /// When the cat was created
    async fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.created_at
    }
}

#[derive(SimpleObject, Clone, Copy)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl From<domain::Location> for Location {
    fn from(location: domain::Location) -> Self {
        Self {
            lat: location.lat,
            lng: location.lng,
        }
    }
}

#[derive(InputObject, Clone, Copy)]
pub struct LocationInput {
    pub lat: f64,
    pub lng: f64,
}

impl From<LocationInput> for domain::Location {
    fn from(input: LocationInput) -> Self {
        domain::Location::new(input.lat, input.lng)
    }
}

/// Fields for a new cat. `owner` is accepted but always replaced by the
/// authenticated caller.
#[derive(InputObject)]
pub struct CatInput {
    pub name: String,
    pub breed: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<NaiveDate>,
    pub filename: Option<String>,
    pub owner: Option<ID>,
    pub location: LocationInput,
}

impl From<CatInput> for domain::NewCat {
    fn from(input: CatInput) -> Self {
        Self {
            name: input.name,
            breed: input.breed,
            weight: input.weight,
            birthdate: input.birthdate,
            filename: input.filename,
            owner: input.owner.map(|id| id.0),
            location: input.location.into(),
        }
    }
}

/// Fields to change on an existing cat; omitted fields keep their value
#[derive(InputObject)]
pub struct CatModifyInput {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<NaiveDate>,
    pub filename: Option<String>,
    /// Honoured for admins only
    pub owner: Option<ID>,
    pub location: Option<LocationInput>,
}

impl From<CatModifyInput> for domain::CatPatch {
    fn from(input: CatModifyInput) -> Self {
        Self {
            name: input.name,
            breed: input.breed,
            weight: input.weight,
            birthdate: input.birthdate,
            filename: input.filename,
            owner: input.owner.map(|id| id.0),
            location: input.location.map(Into::into),
        }
    }
}
