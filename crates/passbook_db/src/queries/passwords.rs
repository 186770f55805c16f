//! Password record queries.
//!
//! All functions take the pool handle and return fully-formed
//! [`PasswordRecord`] values, most-recently-touched first. Single-record
//! operations run as independent transactions (last write wins on the same
//! id); the batch variants group their statements into one transaction so the
//! whole batch commits or rolls back together.

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::models::{NewPassword, PasswordPatch, PasswordRecord, VaultStats};
use crate::search;

const SELECT_RECORD: &str = r#"
    SELECT id, service, username, password, url, notes, folder, tags,
           expires_at, created_at, updated_at
    FROM passwords
"#;

/// List every record, most recently updated first. Ties fall back to
/// insertion order.
pub async fn list_passwords(pool: &SqlitePool) -> DbResult<Vec<PasswordRecord>> {
    let records = sqlx::query_as::<_, PasswordRecord>(&format!(
        "{SELECT_RECORD} ORDER BY updated_at DESC, rowid ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(records)
}

/// Get a record by id. A missing id is `None`, never an error.
pub async fn get_password(pool: &SqlitePool, id: &str) -> DbResult<Option<PasswordRecord>> {
    let mut conn = pool.acquire().await?;
    fetch_by_id(&mut conn, id).await
}

/// Search by service or username substring, case-insensitively.
///
/// A whitespace-only query behaves exactly like [`list_passwords`]. Matching
/// is delegated to [`search::filter_by_substring`] so repository search and
/// the in-memory engine share one definition, including non-ASCII case
/// folding the SQL `LIKE` operator doesn't do.
pub async fn search_passwords(pool: &SqlitePool, query: &str) -> DbResult<Vec<PasswordRecord>> {
    let records = list_passwords(pool).await?;
    if query.trim().is_empty() {
        return Ok(records);
    }
    Ok(search::filter_by_substring(&records, query))
}

/// Create a record: validate, assign id, stamp both timestamps, insert.
pub async fn create_password(pool: &SqlitePool, new: NewPassword) -> DbResult<PasswordRecord> {
    let record = new.into_record()?;
    let mut conn = pool.acquire().await?;
    insert_record(&mut conn, &record).await?;
    debug!(id = %record.id, service = %record.service, "created password record");
    Ok(record)
}

/// Merge a patch onto an existing record and persist it.
///
/// Fails with [`DbError::NotFound`] when the id is absent. `id` and
/// `created_at` are never altered; `updated_at` is refreshed. The
/// read-modify-write runs inside one transaction.
pub async fn update_password(
    pool: &SqlitePool,
    id: &str,
    patch: PasswordPatch,
) -> DbResult<PasswordRecord> {
    let mut tx = pool.begin().await?;
    let record = merge_update(&mut tx, id, patch).await?;
    tx.commit().await?;
    Ok(record)
}

/// Delete a record. Returns whether a row existed; deleting a missing id is
/// not an error.
pub async fn delete_password(pool: &SqlitePool, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM passwords WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove every record unconditionally. Test/reset use; callers should gate
/// this behind explicit confirmation.
pub async fn clear_passwords(pool: &SqlitePool) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM passwords").execute(pool).await?;
    debug!(removed = result.rows_affected(), "cleared vault");
    Ok(result.rows_affected())
}

/// Get vault statistics.
pub async fn get_stats(pool: &SqlitePool) -> DbResult<VaultStats> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM passwords")
        .fetch_one(pool)
        .await?;
    Ok(VaultStats {
        total,
        has_any: total > 0,
    })
}

/// Insert a batch of records in one transaction. Either every payload is
/// persisted or none is; results come back in input order.
pub async fn create_many(
    pool: &SqlitePool,
    batch: Vec<NewPassword>,
) -> DbResult<Vec<PasswordRecord>> {
    let mut tx = pool.begin().await?;
    let mut records = Vec::with_capacity(batch.len());
    for new in batch {
        let record = new.into_record()?;
        insert_record(&mut tx, &record).await?;
        records.push(record);
    }
    tx.commit().await?;
    Ok(records)
}

/// Apply a batch of patches in one transaction. A single missing id or
/// invalid merge rolls the whole batch back.
pub async fn update_many(
    pool: &SqlitePool,
    batch: Vec<(String, PasswordPatch)>,
) -> DbResult<Vec<PasswordRecord>> {
    let mut tx = pool.begin().await?;
    let mut records = Vec::with_capacity(batch.len());
    for (id, patch) in batch {
        records.push(merge_update(&mut tx, &id, patch).await?);
    }
    tx.commit().await?;
    Ok(records)
}

async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<PasswordRecord>> {
    let record = sqlx::query_as::<_, PasswordRecord>(&format!("{SELECT_RECORD} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(record)
}

async fn insert_record(conn: &mut SqliteConnection, record: &PasswordRecord) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO passwords (id, service, username, password, url, notes, folder, tags,
                               expires_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.service)
    .bind(&record.username)
    .bind(&record.password)
    .bind(&record.url)
    .bind(&record.notes)
    .bind(&record.folder)
    .bind(&record.tags)
    .bind(record.expires_at)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn merge_update(
    conn: &mut SqliteConnection,
    id: &str,
    patch: PasswordPatch,
) -> DbResult<PasswordRecord> {
    let Some(mut record) = fetch_by_id(conn, id).await? else {
        return Err(DbError::not_found("password", id));
    };
    patch.apply(&mut record);
    record.validate()?;

    sqlx::query(
        r#"
        UPDATE passwords
        SET service = ?, username = ?, password = ?, url = ?, notes = ?,
            folder = ?, tags = ?, expires_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&record.service)
    .bind(&record.username)
    .bind(&record.password)
    .bind(&record.url)
    .bind(&record.notes)
    .bind(&record.folder)
    .bind(&record.tags)
    .bind(record.expires_at)
    .bind(record.updated_at)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(record)
}
