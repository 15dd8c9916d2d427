use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{CatId, MatchId, MatchRequest, MatchRequestDetail, MatchStatus, NewMatchRequest, UserId};

pub async fn fetch_match_request(id: &MatchId, conn: &mut SqliteConnection) -> Result<Option<MatchRequest>, sqlx::Error> {
    let request =
        sqlx::query_as("SELECT * FROM match_requests WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(request)
}

/// Returns the request linking `a` and `b`, in either direction and with any status, if there is one.
pub async fn find_match_by_pair(
    a: &CatId,
    b: &CatId,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchRequest>, sqlx::Error> {
    let request = sqlx::query_as(
        r#"
        SELECT * FROM match_requests
        WHERE (issuer_cat_id = $1 AND match_cat_id = $2) OR (issuer_cat_id = $2 AND match_cat_id = $1)
        LIMIT 1
        "#,
    )
    .bind(a.as_str())
    .bind(b.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(request)
}

/// All requests referencing `cat` in either role, newest first.
pub async fn match_requests_for_cat(cat: &CatId, conn: &mut SqliteConnection) -> Result<Vec<MatchRequest>, sqlx::Error> {
    let requests = sqlx::query_as(
        "SELECT * FROM match_requests WHERE issuer_cat_id = $1 OR match_cat_id = $1 ORDER BY created_at DESC",
    )
    .bind(cat.as_str())
    .fetch_all(conn)
    .await?;
    Ok(requests)
}

/// Stores a new `pending` request. The unique pair index rejects a second request between the same two cats.
pub async fn insert_match_request(
    request: NewMatchRequest,
    conn: &mut SqliteConnection,
) -> Result<MatchRequest, sqlx::Error> {
    let now = Utc::now();
    let request: MatchRequest = sqlx::query_as(
        r#"
            INSERT INTO match_requests (
                id,
                issuer_cat_id,
                match_cat_id,
                message,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(MatchId::random().as_str())
    .bind(request.issuer_cat_id.as_str())
    .bind(request.match_cat_id.as_str())
    .bind(request.message.trim())
    .bind(MatchStatus::Pending)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Match request {} inserted", request.id);
    Ok(request)
}

/// Moves a request out of `pending`. Returns `None` if the request does not exist or is no longer pending, in which
/// case nothing was changed.
pub async fn update_match_status(
    id: &MatchId,
    status: MatchStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchRequest>, sqlx::Error> {
    let request = sqlx::query_as(
        "UPDATE match_requests SET status = $2, updated_at = $3 WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(id.as_str())
    .bind(status)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    Ok(request)
}

/// Deletes the request, but only if it is still pending. Returns the number of rows removed (0 or 1).
pub async fn delete_pending_match(id: &MatchId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM match_requests WHERE id = $1 AND status = 'pending'")
        .bind(id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Every request touching a live cat owned by `owner`, in either role, joined with the issuer's owner profile and both
/// cats. Newest first.
pub async fn match_details_for_owner(
    owner: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<MatchRequestDetail>, sqlx::Error> {
    let details = sqlx::query_as(
        r#"
        SELECT
            m.id,
            m.message,
            m.status,
            m.created_at,
            u.name AS issuer_name,
            u.email AS issuer_email,
            u.created_at AS issuer_created_at,
            ic.id AS user_cat_id,
            ic.name AS user_cat_name,
            ic.race AS user_cat_race,
            ic.sex AS user_cat_sex,
            ic.description AS user_cat_description,
            ic.age_in_months AS user_cat_age_in_months,
            ic.image_urls AS user_cat_image_urls,
            ic.has_matched AS user_cat_has_matched,
            ic.created_at AS user_cat_created_at,
            tc.id AS match_cat_id,
            tc.name AS match_cat_name,
            tc.race AS match_cat_race,
            tc.sex AS match_cat_sex,
            tc.description AS match_cat_description,
            tc.age_in_months AS match_cat_age_in_months,
            tc.image_urls AS match_cat_image_urls,
            tc.has_matched AS match_cat_has_matched,
            tc.created_at AS match_cat_created_at
        FROM match_requests m
        JOIN cats ic ON ic.id = m.issuer_cat_id
        JOIN cats tc ON tc.id = m.match_cat_id
        JOIN users u ON u.id = ic.owner_id
        WHERE (ic.owner_id = $1 AND ic.deleted_at IS NULL) OR (tc.owner_id = $1 AND tc.deleted_at IS NULL)
        ORDER BY m.created_at DESC, m.id
        "#,
    )
    .bind(owner.as_str())
    .fetch_all(conn)
    .await?;
    Ok(details)
}
