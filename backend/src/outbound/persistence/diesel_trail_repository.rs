//! PostgreSQL-backed `TrailRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{TrailRepository, TrailRepositoryError};
use crate::domain::{Trail, TrailId};

use super::models::{NewTrailRow, TrailChangeset, TrailRow};
use super::pool::{DbPool, PoolError};
use super::schema::trails;

/// Diesel-backed implementation of the trail repository port.
#[derive(Clone)]
pub struct DieselTrailRepository {
    pool: DbPool,
}

impl DieselTrailRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TrailRepositoryError {
    TrailRepositoryError::connection(error.to_string())
}

/// Map Diesel errors to repository errors; a primary key clash is a conflict
/// on `trail_id`.
fn map_diesel_error(error: diesel::result::Error, trail_id: &str) -> TrailRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TrailRepositoryError::conflict(trail_id)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            TrailRepositoryError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => TrailRepositoryError::query("database query error"),
        _ => TrailRepositoryError::query("database error"),
    }
}

fn row_to_trail(row: TrailRow) -> Result<Trail, TrailRepositoryError> {
    Trail::restore(row.into())
        .map_err(|err| TrailRepositoryError::query(format!("corrupt trail row: {err}")))
}

#[async_trait]
impl TrailRepository for DieselTrailRepository {
    async fn insert(&self, trail: &Trail) -> Result<(), TrailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(trails::table)
            .values(NewTrailRow::from(trail))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, trail.id().as_str()))
    }

    async fn find_by_id(&self, id: &TrailId) -> Result<Option<Trail>, TrailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = trails::table
            .filter(trails::id.eq(id.as_str()))
            .select(TrailRow::as_select())
            .first::<TrailRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, id.as_str()))?;

        row.map(row_to_trail).transpose()
    }

    async fn list_newest_first(&self) -> Result<Vec<Trail>, TrailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TrailRow> = trails::table
            .order((trails::created_at.desc(), trails::id.desc()))
            .select(TrailRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, ""))?;

        rows.into_iter().map(row_to_trail).collect()
    }

    async fn replace(&self, trail: &Trail) -> Result<bool, TrailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(trails::table.filter(trails::id.eq(trail.id().as_str())))
            .set(TrailChangeset::from(trail))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, trail.id().as_str()))?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &TrailId) -> Result<bool, TrailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(trails::table.filter(trails::id.eq(id.as_str())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, id.as_str()))?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> Result<(), TrailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| TrailRepositoryError::connection(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.

    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, DatabaseErrorInformation, Error as DieselError};
    use rstest::{fixture, rstest};

    use super::*;

    struct Info(&'static str);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("trails")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some("trails_pkey")
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info("boom")))
    }

    #[fixture]
    fn valid_row() -> TrailRow {
        let now = Utc::now();
        TrailRow {
            id: "ridge".to_owned(),
            title: "Ridge".to_owned(),
            description: String::new(),
            location: "Peak District".to_owned(),
            image_path: Some("1_ridge.jpg".to_owned()),
            media: vec!["a.jpg".to_owned()],
            created_at: now,
            updated_at: now,
            ai_caption: None,
            ai_tags: Vec::new(),
            ai_analyzed_at: None,
        }
    }

    #[rstest]
    fn unique_violation_maps_to_conflict() {
        let err = map_diesel_error(database_error(DatabaseErrorKind::UniqueViolation), "ridge");
        assert_eq!(err, TrailRepositoryError::conflict("ridge"));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(database_error(DatabaseErrorKind::ClosedConnection), "ridge");
        assert!(matches!(err, TrailRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(DieselError::NotFound, "ridge");
        assert!(matches!(err, TrailRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, TrailRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn row_converts_to_trail(valid_row: TrailRow) {
        let trail = row_to_trail(valid_row).expect("valid row");
        assert_eq!(trail.id().as_str(), "ridge");
        assert_eq!(trail.image_path(), Some("1_ridge.jpg"));
        assert_eq!(trail.media(), ["a.jpg".to_owned()]);
    }

    #[rstest]
    fn corrupt_identifier_is_a_query_error(mut valid_row: TrailRow) {
        valid_row.id = "not a valid id".to_owned();
        let err = row_to_trail(valid_row).expect_err("corrupt row");
        assert!(matches!(err, TrailRepositoryError::Query { .. }));
    }
}
