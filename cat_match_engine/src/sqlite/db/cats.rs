use chrono::Utc;
use log::trace;
use sqlx::{types::Json, QueryBuilder, Sqlite, SqliteConnection};

use crate::db_types::{Cat, CatId, CatUpdate, NewCat, UserId};

/// Fetches a live (not soft-deleted) cat.
pub async fn fetch_cat(id: &CatId, conn: &mut SqliteConnection) -> Result<Option<Cat>, sqlx::Error> {
    let cat = sqlx::query_as("SELECT * FROM cats WHERE id = $1 AND deleted_at IS NULL")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(cat)
}

pub async fn fetch_cats_for_owner(owner: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Cat>, sqlx::Error> {
    let cats = sqlx::query_as("SELECT * FROM cats WHERE owner_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC")
        .bind(owner.as_str())
        .fetch_all(conn)
        .await?;
    Ok(cats)
}

/// Takes the write lock on the given cats.
///
/// This MUST be the first statement of a transaction. A transaction that reads before it writes may find that its
/// snapshot is stale by the time it asks for the write lock, and SQLite will fail it immediately rather than wait.
/// Issued first, the lock request simply waits (up to the busy timeout) for any competing writer to finish, and every
/// read that follows sees the latest committed state.
///
/// Rows are touched in ascending id order so that row-locking engines cannot deadlock on the same pair.
pub async fn lock_cats(ids: &[&CatId], conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let mut ids = ids.iter().map(|id| id.as_str()).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE cats SET updated_at = updated_at WHERE id IN (");
    let mut list = builder.separated(", ");
    for id in &ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");
    let result = builder.build().execute(conn).await?;
    trace!("🗃️ Locked cats {}", ids.join(", "));
    Ok(result.rows_affected())
}

/// Flags the cat as matched. Returns false if the cat does not exist.
pub async fn set_cat_matched(id: &CatId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE cats SET has_matched = 1, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL")
        .bind(id.as_str())
        .bind(Utc::now())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Inserts a new cat for `owner`. This is not atomic. You can embed this call inside a transaction if you need to
/// ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_cat(owner: &UserId, cat: NewCat, conn: &mut SqliteConnection) -> Result<Cat, sqlx::Error> {
    let now = Utc::now();
    let cat = sqlx::query_as(
        r#"
            INSERT INTO cats (
                id,
                owner_id,
                name,
                race,
                sex,
                age_in_months,
                description,
                image_urls,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(CatId::random().as_str())
    .bind(owner.as_str())
    .bind(cat.name.trim())
    .bind(cat.race)
    .bind(cat.sex)
    .bind(cat.age_in_months)
    .bind(cat.description.trim())
    .bind(Json(&cat.image_urls))
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(cat)
}

pub async fn update_cat(id: &CatId, update: CatUpdate, conn: &mut SqliteConnection) -> Result<Option<Cat>, sqlx::Error> {
    let cat = sqlx::query_as(
        r#"
            UPDATE cats SET
                name = $2,
                race = $3,
                sex = $4,
                age_in_months = $5,
                description = $6,
                image_urls = $7,
                updated_at = $8
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(update.name.trim())
    .bind(update.race)
    .bind(update.sex)
    .bind(update.age_in_months)
    .bind(update.description.trim())
    .bind(Json(&update.image_urls))
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(cat)
}

/// Sets the `deleted_at` timestamp on the cat. Cats are never removed from the table.
pub async fn soft_delete_cat(id: &CatId, conn: &mut SqliteConnection) -> Result<Option<Cat>, sqlx::Error> {
    let now = Utc::now();
    let cat = sqlx::query_as(
        "UPDATE cats SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL RETURNING *",
    )
    .bind(id.as_str())
    .bind(now)
    .fetch_optional(conn)
    .await?;
    Ok(cat)
}
