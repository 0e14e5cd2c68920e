use crate::auth::{Session, SessionUser};
use crate::domain::{BoundingBox, Cat, CatPatch, Location, NewCat};
use crate::error::{CatError, Result};
use crate::metrics::CatMetrics;
use crate::storage::{CatFilter, CatStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Query and mutation handlers for cats, independent of the transport.
///
/// Each call performs at most one store operation. Mutations take the
/// caller's session explicitly; queries are public.
#[derive(Clone)]
pub struct CatResolver {
    store: Arc<dyn CatStore>,
}

impl CatResolver {
    pub fn new(store: Arc<dyn CatStore>) -> Self {
        Self { store }
    }

    /// Every cat, in store order
    pub async fn cats(&self) -> Result<Vec<Cat>> {
        let started = Instant::now();
        let result = self
            .store
            .find(&CatFilter::all())
            .await
            .map_err(CatError::from);
        observe("cats", started, &result);
        result
    }

    pub async fn cat_by_id(&self, id: &str) -> Result<Cat> {
        let started = Instant::now();
        let result = match self.store.find_by_id(id).await {
            Ok(Some(cat)) => Ok(cat),
            Ok(None) => Err(CatError::NotFound),
            Err(e) => Err(e.into()),
        };
        observe("cat_by_id", started, &result);
        result
    }

    /// Cats owned by `owner_id`. An owner without cats is reported as
    /// `NotFound`, same as an unknown owner.
    pub async fn cats_by_owner(&self, owner_id: &str) -> Result<Vec<Cat>> {
        let started = Instant::now();
        let result = self
            .store
            .find(&CatFilter::by_owner(owner_id))
            .await
            .map_err(CatError::from)
            .and_then(non_empty);
        observe("cats_by_owner", started, &result);
        result
    }

    /// Cats located inside the rectangle spanned by the two corners. The
    /// corners are not validated; an inverted rectangle finds nothing.
    pub async fn cats_by_area(
        &self,
        top_right: Location,
        bottom_left: Location,
    ) -> Result<Vec<Cat>> {
        let started = Instant::now();
        let area = BoundingBox::new(bottom_left, top_right);
        let result = self
            .store
            .find(&CatFilter::within(area))
            .await
            .map_err(CatError::from)
            .and_then(non_empty);
        observe("cats_by_area", started, &result);
        result
    }

    /// Store a new cat owned by the caller, whatever owner the input named
    pub async fn create_cat(&self, session: &Session, input: NewCat) -> Result<Cat> {
        let started = Instant::now();
        let result = self.insert_owned(session, input).await;
        observe("create_cat", started, &result);
        result
    }

    /// Apply `patch` to a cat the caller owns, or to any cat for admins.
    /// Returns the record after the update.
    pub async fn update_cat(&self, session: &Session, id: &str, patch: CatPatch) -> Result<Cat> {
        let started = Instant::now();
        let result = self.update_owned(session, id, patch).await;
        observe("update_cat", started, &result);
        result
    }

    /// Remove a cat the caller owns, or any cat for admins. Returns the
    /// record as it was before removal.
    pub async fn delete_cat(&self, session: &Session, id: &str) -> Result<Cat> {
        let started = Instant::now();
        let result = self.delete_owned(session, id).await;
        observe("delete_cat", started, &result);
        result
    }

    async fn insert_owned(&self, session: &Session, mut input: NewCat) -> Result<Cat> {
        let user = require_user(session)?;
        input.owner = Some(user.id.clone());

        let cat = self
            .store
            .create(input)
            .await?
            .ok_or_else(|| CatError::Internal("Error creating cat".to_string()))?;
        info!(cat_id = %cat.id, owner = %cat.owner, "Created cat");
        Ok(cat)
    }

    async fn update_owned(&self, session: &Session, id: &str, mut patch: CatPatch) -> Result<Cat> {
        let user = require_user(session)?;
        if !user.is_admin() && patch.owner.take().is_some() {
            warn!(user_id = %user.id, cat_id = %id, "Ignoring owner change from non-admin");
        }

        let cat = self
            .store
            .find_one_and_update(&ownership_filter(user, id), &patch)
            .await?
            .ok_or(CatError::NotFound)?;
        info!(cat_id = %cat.id, user_id = %user.id, "Updated cat");
        Ok(cat)
    }

    async fn delete_owned(&self, session: &Session, id: &str) -> Result<Cat> {
        let user = require_user(session)?;
        let cat = self
            .store
            .find_one_and_delete(&ownership_filter(user, id))
            .await?
            .ok_or(CatError::NotFound)?;
        info!(cat_id = %cat.id, user_id = %user.id, "Deleted cat");
        Ok(cat)
    }
}

fn require_user(session: &Session) -> Result<&SessionUser> {
    session.user.as_ref().ok_or(CatError::Unauthenticated)
}

/// `{id}` for admins, `{id, owner = caller}` for everyone else. A cat owned
/// by someone else therefore looks exactly like a missing one.
fn ownership_filter(user: &SessionUser, id: &str) -> CatFilter {
    let filter = CatFilter::by_id(id);
    if user.is_admin() {
        filter
    } else {
        filter.and_owner(user.id.clone())
    }
}

fn non_empty(cats: Vec<Cat>) -> Result<Vec<Cat>> {
    if cats.is_empty() {
        Err(CatError::NotFound)
    } else {
        Ok(cats)
    }
}

fn observe<T>(operation: &'static str, started: Instant, result: &Result<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => {
            match e {
                CatError::Store(_) | CatError::Internal(_) => {
                    error!(operation, "Cat operation failed: {}", e)
                }
                CatError::Unauthenticated => warn!(operation, "Unauthenticated cat mutation"),
                CatError::NotFound => debug!(operation, "Cat not found"),
            }
            e.outcome()
        }
    };
    CatMetrics::record(operation, outcome, started.elapsed());
}
