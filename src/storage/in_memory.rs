use super::{CatFilter, CatStore, StoreResult};
use crate::domain::{Cat, CatPatch, NewCat};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory storage implementation for development/testing.
///
/// Records are kept in insertion order, which is the order `find` returns.
#[derive(Clone, Default)]
pub struct InMemoryCatStore {
    cats: Arc<RwLock<Vec<Cat>>>,
}

impl InMemoryCatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatStore for InMemoryCatStore {
    async fn find(&self, filter: &CatFilter) -> StoreResult<Vec<Cat>> {
        let cats = self.cats.read().await;
        Ok(cats.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Cat>> {
        let cats = self.cats.read().await;
        Ok(cats.iter().find(|c| c.id == id).cloned())
    }

    async fn find_one_and_update(
        &self,
        filter: &CatFilter,
        patch: &CatPatch,
    ) -> StoreResult<Option<Cat>> {
        let mut cats = self.cats.write().await;
        let Some(cat) = cats.iter_mut().find(|c| filter.matches(c)) else {
            return Ok(None);
        };

        patch.apply(cat);
        debug!("Updated cat {}", cat.id);
        Ok(Some(cat.clone()))
    }

    async fn find_one_and_delete(&self, filter: &CatFilter) -> StoreResult<Option<Cat>> {
        let mut cats = self.cats.write().await;
        let Some(index) = cats.iter().position(|c| filter.matches(c)) else {
            return Ok(None);
        };

        let removed = cats.remove(index);
        debug!("Deleted cat {}", removed.id);
        Ok(Some(removed))
    }

    async fn create(&self, new_cat: NewCat) -> StoreResult<Option<Cat>> {
        let cat = Cat {
            id: Uuid::new_v4().to_string(),
            name: new_cat.name,
            breed: new_cat.breed,
            weight: new_cat.weight,
            birthdate: new_cat.birthdate,
            filename: new_cat.filename,
            owner: new_cat.owner.unwrap_or_default(),
            location: new_cat.location,
            created_at: Utc::now(),
        };

        self.cats.write().await.push(cat.clone());
        debug!("Created cat: {} with id {}", cat.name, cat.id);
        Ok(Some(cat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn new_cat(name: &str, owner: &str) -> NewCat {
        NewCat {
            name: name.to_string(),
            breed: None,
            weight: None,
            birthdate: None,
            filename: None,
            owner: Some(owner.to_string()),
            location: Location::new(1.0, 1.0),
        }
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids_and_keeps_order() {
        let store = InMemoryCatStore::new();
        let a = store.create(new_cat("A", "u1")).await.unwrap().unwrap();
        let b = store.create(new_cat("B", "u1")).await.unwrap().unwrap();

        assert_ne!(a.id, b.id);
        let all = store.find(&CatFilter::all()).await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn update_and_delete_respect_filter() {
        let store = InMemoryCatStore::new();
        let cat = store.create(new_cat("A", "u1")).await.unwrap().unwrap();
        let patch = CatPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        let miss = store
            .find_one_and_update(&CatFilter::by_id(&cat.id).and_owner("u2"), &patch)
            .await
            .unwrap();
        assert!(miss.is_none());

        let hit = store
            .find_one_and_update(&CatFilter::by_id(&cat.id).and_owner("u1"), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.name, "Renamed");

        let deleted = store
            .find_one_and_delete(&CatFilter::by_id(&cat.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(deleted.name, "Renamed");
        assert!(store.find(&CatFilter::all()).await.unwrap().is_empty());
        assert!(store.find_by_id(&cat.id).await.unwrap().is_none());
    }
}
