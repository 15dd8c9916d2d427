#![allow(dead_code)]
use cat_match_engine::{
    db_types::{Cat, NewCat, NewUser, Race, Sex, User, UserId},
    CatManagement,
    Identity,
    SqliteDatabase,
};
use chrono::{Duration, Utc};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/cms_test_store_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::drop_database(url).await.expect("Error dropping stale database");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    debug!("🚀️ Created Sqlite database {url}");
}

/// Creates a fresh, migrated database at a random location.
pub async fn prepare_test_env(max_connections: u32) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    create_database(&url).await;
    let db = SqliteDatabase::new_with_url(&url, max_connections).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await;
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Could not remove test database {url}: {e}");
    }
}

pub async fn seed_user(db: &SqliteDatabase, name: &str) -> User {
    let email = format!("{}.{}@example.com", name.to_lowercase(), rand::random::<u32>());
    db.insert_user(NewUser::new(UserId::random(), name.to_string(), email)).await.expect("Error inserting user")
}

pub fn new_cat(name: &str, sex: Sex) -> NewCat {
    NewCat {
        name: name.to_string(),
        race: Race::Ragdoll,
        sex,
        age_in_months: 18,
        description: format!("{name} likes long naps in the sun"),
        image_urls: vec![format!("https://images.example.com/{}.jpg", name.to_lowercase())],
    }
}

pub async fn seed_cat(db: &SqliteDatabase, owner: &User, name: &str, sex: Sex) -> Cat {
    db.insert_cat(&owner.id, new_cat(name, sex)).await.expect("Error inserting cat")
}

pub fn identity_for(user: &User) -> Identity {
    Identity::new(user.id.clone(), Utc::now() + Duration::hours(1))
}
