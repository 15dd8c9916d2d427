use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User, UserId};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as("INSERT INTO users (id, name, email, created_at) VALUES ($1, $2, $3, $4) RETURNING *")
        .bind(user.id.as_str())
        .bind(user.name)
        .bind(user.email)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;
    Ok(user)
}

pub async fn fetch_user(id: &UserId, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(user)
}
