use super::{CatFilter, CatStore, StoreResult};
use crate::domain::{Cat, CatPatch, NewCat};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use libsql::params::Params;
use libsql::{Builder, Connection, Database, Value};
use tracing::{debug, info};
use uuid::Uuid;

const MIGRATION_SQL: &str = include_str!("../../migrations/001_create_cats.sql");

/// Cat documents in a libSQL table. The full document lives in `data` as
/// JSON; `owner`, `lat` and `lng` are copied into indexed columns so the
/// owner and bounding-box predicates run in SQL.
pub struct DatabaseCatStore {
    db: Database,
}

fn db_error(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Database {
        message: format!("{context}: {e}"),
    }
}

impl DatabaseCatStore {
    /// Open a remote database for `libsql://` / `http(s)://` URLs, a local
    /// file otherwise, and run migrations.
    pub async fn connect(url: &str, auth_token: Option<String>) -> StoreResult<Self> {
        let db = if is_remote(url) {
            let token = auth_token.ok_or_else(|| StoreError::Database {
                message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
            })?;
            info!("Connecting to remote libSQL database at {}", url);
            Builder::new_remote(url.to_string(), token)
                .build()
                .await
                .map_err(|e| db_error("Failed to connect to database", e))?
        } else {
            info!("Opening local libSQL database at {}", url);
            Builder::new_local(url)
                .build()
                .await
                .map_err(|e| db_error("Failed to open database", e))?
        };

        let store = Self { db };
        store.run_migrations().await?;
        Ok(store)
    }

    fn connection(&self) -> StoreResult<Connection> {
        self.db
            .connect()
            .map_err(|e| db_error("Failed to get database connection", e))
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running database migrations...");
        self.connection()?
            .execute_batch(MIGRATION_SQL)
            .await
            .map_err(|e| db_error("Failed to run migrations", e))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    async fn select(
        &self,
        conn: &Connection,
        filter: &CatFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Cat>> {
        let (clause, values) = where_clause(filter);
        let mut sql = format!("SELECT data FROM cats WHERE {clause} ORDER BY rowid");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut rows = conn
            .query(&sql, Params::Positional(values))
            .await
            .map_err(|e| db_error("Failed to query cats", e))?;

        let mut cats = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_error("Failed to read row", e))?
        {
            let data: String = row
                .get(0)
                .map_err(|e| db_error("Failed to get data", e))?;
            cats.push(serde_json::from_str(&data)?);
        }
        Ok(cats)
    }

    async fn insert(&self, conn: &Connection, cat: &Cat) -> StoreResult<()> {
        let data = serde_json::to_string(cat)?;
        conn.execute(
            "INSERT INTO cats (id, owner, lat, lng, data, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, datetime('now'))",
            libsql::params![
                cat.id.clone(),
                cat.owner.clone(),
                cat.location.lat,
                cat.location.lng,
                data,
                cat.created_at.to_rfc3339()
            ],
        )
        .await
        .map_err(|e| db_error("Failed to insert cat", e))?;
        Ok(())
    }

    /// Run a statement ending in `RETURNING data` and decode the first row
    async fn returning_one(
        &self,
        conn: &Connection,
        sql: &str,
        values: Vec<Value>,
        context: &str,
    ) -> StoreResult<Option<Cat>> {
        let mut rows = conn
            .query(sql, Params::Positional(values))
            .await
            .map_err(|e| db_error(context, e))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_error("Failed to read row", e))?
        else {
            return Ok(None);
        };
        let data: String = row
            .get(0)
            .map_err(|e| db_error("Failed to get data", e))?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("libsql://") || url.starts_with("http://") || url.starts_with("https://")
}

fn where_clause(filter: &CatFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(id) = &filter.id {
        conditions.push("id = ?");
        values.push(Value::Text(id.clone()));
    }
    if let Some(owner) = &filter.owner {
        conditions.push("owner = ?");
        values.push(Value::Text(owner.clone()));
    }
    if let Some(area) = &filter.within {
        conditions.push("lat >= ? AND lat <= ? AND lng >= ? AND lng <= ?");
        values.push(Value::Real(area.bottom_left.lat));
        values.push(Value::Real(area.top_right.lat));
        values.push(Value::Real(area.bottom_left.lng));
        values.push(Value::Real(area.top_right.lng));
    }

    if conditions.is_empty() {
        ("1 = 1".to_string(), values)
    } else {
        (conditions.join(" AND "), values)
    }
}

/// First row matching the filter, in insertion order
fn first_match(filter: &CatFilter) -> (String, Vec<Value>) {
    let (clause, values) = where_clause(filter);
    (
        format!("rowid = (SELECT rowid FROM cats WHERE {clause} ORDER BY rowid LIMIT 1)"),
        values,
    )
}

/// Single `UPDATE` that patches the JSON document and its indexed columns
/// for the first matching row. Fields absent from the patch are untouched.
fn update_statement(filter: &CatFilter, patch: &CatPatch) -> (String, Vec<Value>) {
    let mut paths = Vec::new();
    let mut columns = Vec::new();
    let mut values = Vec::new();

    if let Some(name) = &patch.name {
        paths.push("'$.name', ?");
        values.push(Value::Text(name.clone()));
    }
    if let Some(breed) = &patch.breed {
        paths.push("'$.breed', ?");
        values.push(Value::Text(breed.clone()));
    }
    if let Some(weight) = patch.weight {
        paths.push("'$.weight', ?");
        values.push(Value::Real(weight));
    }
    if let Some(birthdate) = patch.birthdate {
        paths.push("'$.birthdate', ?");
        values.push(Value::Text(birthdate.to_string()));
    }
    if let Some(filename) = &patch.filename {
        paths.push("'$.filename', ?");
        values.push(Value::Text(filename.clone()));
    }
    if let Some(owner) = &patch.owner {
        paths.push("'$.owner', ?");
        values.push(Value::Text(owner.clone()));
    }
    if let Some(location) = patch.location {
        paths.push("'$.location.lat', ?, '$.location.lng', ?");
        values.push(Value::Real(location.lat));
        values.push(Value::Real(location.lng));
    }

    // Indexed columns mirror the document.
    if let Some(owner) = &patch.owner {
        columns.push("owner = ?");
        values.push(Value::Text(owner.clone()));
    }
    if let Some(location) = patch.location {
        columns.push("lat = ?, lng = ?");
        values.push(Value::Real(location.lat));
        values.push(Value::Real(location.lng));
    }

    let mut assignments = Vec::new();
    if !paths.is_empty() {
        assignments.push(format!("data = json_set(data, {})", paths.join(", ")));
    }
    assignments.extend(columns.into_iter().map(str::to_string));
    assignments.push("updated_at = datetime('now')".to_string());

    let (target, filter_values) = first_match(filter);
    values.extend(filter_values);
    (
        format!(
            "UPDATE cats SET {} WHERE {target} RETURNING data",
            assignments.join(", ")
        ),
        values,
    )
}

#[async_trait]
impl CatStore for DatabaseCatStore {
    async fn find(&self, filter: &CatFilter) -> StoreResult<Vec<Cat>> {
        let conn = self.connection()?;
        self.select(&conn, filter, None).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Cat>> {
        let conn = self.connection()?;
        let mut found = self.select(&conn, &CatFilter::by_id(id), Some(1)).await?;
        Ok(found.pop())
    }

    async fn find_one_and_update(
        &self,
        filter: &CatFilter,
        patch: &CatPatch,
    ) -> StoreResult<Option<Cat>> {
        let conn = self.connection()?;
        let (sql, values) = update_statement(filter, patch);
        let updated = self
            .returning_one(&conn, &sql, values, "Failed to update cat")
            .await?;
        if let Some(cat) = &updated {
            debug!("Updated cat {}", cat.id);
        }
        Ok(updated)
    }

    async fn find_one_and_delete(&self, filter: &CatFilter) -> StoreResult<Option<Cat>> {
        let conn = self.connection()?;
        let (target, values) = first_match(filter);
        let sql = format!("DELETE FROM cats WHERE {target} RETURNING data");
        let deleted = self
            .returning_one(&conn, &sql, values, "Failed to delete cat")
            .await?;
        if let Some(cat) = &deleted {
            debug!("Deleted cat {}", cat.id);
        }
        Ok(deleted)
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

        let conn = self.connection()?;
        self.insert(&conn, &cat).await?;
        info!("Created cat: {} with id {}", cat.name, cat.id);

        // Read back so a silently dropped write surfaces as `None`.
        let mut stored = self.select(&conn, &CatFilter::by_id(&cat.id), Some(1)).await?;
        Ok(stored.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundingBox, Location};

    async fn temp_store() -> (tempfile::TempDir, DatabaseCatStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cats.db");
        let store = DatabaseCatStore::connect(path.to_str().unwrap(), None)
            .await
            .unwrap();
        (dir, store)
    }

    fn new_cat(name: &str, owner: &str, lat: f64, lng: f64) -> NewCat {
        NewCat {
            name: name.to_string(),
            breed: Some("Persian".to_string()),
            weight: Some(3.5),
            birthdate: None,
            filename: None,
            owner: Some(owner.to_string()),
            location: Location::new(lat, lng),
        }
    }

    #[test]
    fn where_clause_for_empty_filter_matches_all() {
        let (clause, values) = where_clause(&CatFilter::all());
        assert_eq!(clause, "1 = 1");
        assert!(values.is_empty());
    }

    #[test]
    fn where_clause_binds_every_predicate() {
        let filter = CatFilter::by_id("c1").and_owner("u1");
        let (clause, values) = where_clause(&filter);
        assert_eq!(clause, "id = ? AND owner = ?");
        assert_eq!(values.len(), 2);
    }

    #[tokio::test]
    async fn round_trips_documents_through_sql() {
        let (_dir, store) = temp_store().await;
        let inside = store.create(new_cat("In", "u1", 5.0, 5.0)).await.unwrap().unwrap();
        store.create(new_cat("Out", "u2", 50.0, 5.0)).await.unwrap().unwrap();

        let fetched = store.find_by_id(&inside.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "In");
        assert_eq!(fetched.breed.as_deref(), Some("Persian"));

        let area = BoundingBox::new(Location::new(0.0, 0.0), Location::new(10.0, 10.0));
        let found = store.find(&CatFilter::within(area)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, inside.id);

        let by_owner = store.find(&CatFilter::by_owner("u2")).await.unwrap();
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].name, "Out");
    }

    #[tokio::test]
    async fn update_then_delete_returns_expected_images() {
        let (_dir, store) = temp_store().await;
        let cat = store.create(new_cat("Tom", "u1", 1.0, 1.0)).await.unwrap().unwrap();
        let patch = CatPatch {
            location: Some(Location::new(2.0, 2.0)),
            ..Default::default()
        };

        let updated = store
            .find_one_and_update(&CatFilter::by_id(&cat.id).and_owner("u1"), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.location, Location::new(2.0, 2.0));

        let deleted = store
            .find_one_and_delete(&CatFilter::by_id(&cat.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(deleted.location, Location::new(2.0, 2.0));
        assert!(store
            .find_one_and_delete(&CatFilter::by_id(&cat.id))
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn update_statement_binds_patch_before_filter() {
        let patch = CatPatch {
            name: Some("Thomas".to_string()),
            owner: Some("u2".to_string()),
            ..Default::default()
        };
        let (sql, values) = update_statement(&CatFilter::by_id("c1").and_owner("u1"), &patch);
        assert_eq!(
            sql,
            "UPDATE cats SET data = json_set(data, '$.name', ?, '$.owner', ?), owner = ?, \
             updated_at = datetime('now') WHERE rowid = (SELECT rowid FROM cats \
             WHERE id = ? AND owner = ? ORDER BY rowid LIMIT 1) RETURNING data"
        );
        assert_eq!(values.len(), 5);
        assert!(matches!(&values[3], Value::Text(id) if id == "c1"));
    }

    #[tokio::test]
    async fn non_owner_filter_leaves_row_in_place() {
        let (_dir, store) = temp_store().await;
        let cat = store.create(new_cat("Tom", "u1", 1.0, 1.0)).await.unwrap().unwrap();
        let foreign = CatFilter::by_id(&cat.id).and_owner("u2");

        assert!(store.find_one_and_delete(&foreign).await.unwrap().is_none());
        let patch = CatPatch {
            name: Some("Hijacked".to_string()),
            ..Default::default()
        };
        assert!(store
            .find_one_and_update(&foreign, &patch)
            .await
            .unwrap()
            .is_none());

        let kept = store.find_by_id(&cat.id).await.unwrap().unwrap();
        assert_eq!(kept, cat);
    }

    #[tokio::test]
    async fn owner_reassignment_moves_cat_between_owners() {
        let (_dir, store) = temp_store().await;
        let first = store.create(new_cat("Tom", "u1", 1.0, 1.0)).await.unwrap().unwrap();
        let second = store.create(new_cat("Kit", "u1", 2.0, 2.0)).await.unwrap().unwrap();
        let patch = CatPatch {
            owner: Some("u2".to_string()),
            weight: Some(4.0),
            ..Default::default()
        };

        let updated = store
            .find_one_and_update(&CatFilter::by_id(&first.id), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.owner, "u2");
        assert_eq!(updated.weight, Some(4.0));
        assert_eq!(updated.name, "Tom");
        assert_eq!(updated.created_at, first.created_at);

        let moved = store.find(&CatFilter::by_owner("u2")).await.unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, first.id);
        let remaining = store.find(&CatFilter::by_owner("u1")).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);

        // Updates keep insertion order.
        let all = store.find(&CatFilter::all()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    }
}
