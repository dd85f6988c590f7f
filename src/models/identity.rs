//! # Identity Model
//!
//! Chat-platform users known to the system. An identity is created on the
//! first authentication call and never changes afterwards: repeated
//! registrations with the same external id are ignored, so name fields keep
//! whatever was sent first.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{Result, TodoError};
use crate::models::timestamp;

/// A registered chat-platform user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub handle: String,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: NaiveDateTime,
}

/// New identity for registration (without generated fields)
#[derive(Debug, Clone, Default)]
pub struct NewIdentity {
    pub external_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub handle: Option<String>,
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: i64,
    external_id: String,
    first_name: String,
    last_name: String,
    handle: String,
    created_at: String,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = TodoError;

    fn try_from(row: IdentityRow) -> Result<Self> {
        Ok(Identity {
            id: row.id,
            external_id: row.external_id,
            first_name: row.first_name,
            last_name: row.last_name,
            handle: row.handle,
            created_at: timestamp::parse_stored(&row.created_at)?,
        })
    }
}

impl Identity {
    /// Register an identity if it is not known yet and return the stored record.
    pub async fn register(
        pool: &SqlitePool,
        new_identity: NewIdentity,
        now: NaiveDateTime,
    ) -> Result<Identity> {
        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (external_id, first_name, last_name, handle, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_identity.external_id)
        .bind(new_identity.first_name.unwrap_or_default())
        .bind(new_identity.last_name.unwrap_or_default())
        .bind(new_identity.handle.unwrap_or_default())
        .bind(timestamp::format(&now))
        .execute(pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            crate::logging::log_identity_operation("register", &new_identity.external_id, "created");
        }

        Self::find_by_external_id(pool, &new_identity.external_id)
            .await?
            .ok_or_else(|| {
                TodoError::Internal(format!(
                    "identity {} missing after registration",
                    new_identity.external_id
                ))
            })
    }

    /// Find an identity by its chat-platform id
    pub async fn find_by_external_id(
        pool: &SqlitePool,
        external_id: &str,
    ) -> Result<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, external_id, first_name, last_name, handle, created_at
            FROM users
            WHERE external_id = ?
            "#,
        )
        .bind(external_id)
        .fetch_optional(pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }
}
