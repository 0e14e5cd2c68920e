use crate::domain::{BoundingBox, Cat, CatPatch, NewCat};
use crate::error::StoreError;
use async_trait::async_trait;

#[cfg(feature = "db")]
pub mod database;
pub mod in_memory;

#[cfg(feature = "db")]
pub use database::DatabaseCatStore;
pub use in_memory::InMemoryCatStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Predicate over cat documents. Unset fields do not constrain the match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatFilter {
    pub id: Option<String>,
    pub owner: Option<String>,
    pub within: Option<BoundingBox>,
}

impl CatFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn by_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    pub fn within(area: BoundingBox) -> Self {
        Self {
            within: Some(area),
            ..Self::default()
        }
    }

    pub fn and_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn matches(&self, cat: &Cat) -> bool {
        self.id.as_deref().map_or(true, |id| cat.id == id)
            && self.owner.as_deref().map_or(true, |owner| cat.owner == owner)
            && self.within.map_or(true, |area| area.contains(&cat.location))
    }
}

/// Storage capability set for cat documents
#[async_trait]
pub trait CatStore: Send + Sync {
    async fn find(&self, filter: &CatFilter) -> StoreResult<Vec<Cat>>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Cat>>;

    /// Apply `patch` to the first match and return the post-update record
    async fn find_one_and_update(
        &self,
        filter: &CatFilter,
        patch: &CatPatch,
    ) -> StoreResult<Option<Cat>>;

    /// Remove the first match and return the record as it was before removal
    async fn find_one_and_delete(&self, filter: &CatFilter) -> StoreResult<Option<Cat>>;

    /// Persist a new record with a fresh id. `None` means the backend did not
    /// hand back the stored document.
    async fn create(&self, new_cat: NewCat) -> StoreResult<Option<Cat>>;
}
