use crate::db::{connect_db, Database, UserId};

/// Fresh in-memory database with the real schema applied.
pub async fn init_test_db() -> Database {
    let pool = connect_db("sqlite::memory:", 1)
        .await
        .expect("failed to create in-memory database");
    let db = Database::new(pool);
    db.migrate().await.expect("failed to run migrations");
    db
}

pub async fn test_user(db: &Database) -> UserId {
    db.create_user("Test User", None, 0)
        .await
        .expect("failed to create test user")
        .id
}

/// User with a bearer token already issued.
pub async fn test_user_with_token(db: &Database, token: &str) -> UserId {
    let user = test_user(db).await;
    db.create_token(user, token, 1)
        .await
        .expect("failed to create test token");
    user
}
