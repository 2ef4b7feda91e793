//! Repository tests against a real database. Skipped unless TEST_DATABASE_URL is set.

use anyhow::Result;
use cats_api::database::models::{CatFields, CatFilter, CatPatch};
use cats_api::database::postgres::{PgCatRepository, PgUserRepository};
use cats_api::database::{CatRepository, DatabaseManager, StoreError, UserRepository};
use sqlx::postgres::PgPoolOptions;

async fn pool() -> Result<Option<sqlx::PgPool>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return Ok(None);
    };
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(pool))
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn cat_crud_round_trip() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let repo = PgCatRepository::new(pool);
    let name = unique("tom");

    let cat = repo
        .create(CatFields { name: name.clone(), age: 3, gender: "male".into() })
        .await?;
    assert_eq!(repo.get(cat.id).await?, cat);

    let filter = CatFilter { name: Some(name.clone()), ..Default::default() };
    assert_eq!(repo.list(&filter).await?, vec![cat.clone()]);

    let patched = repo.patch(cat.id, CatPatch { age: Some(4), ..Default::default() }).await?;
    assert_eq!(patched.age, 4);
    assert_eq!(patched.name, name);

    repo.delete(cat.id).await?;
    assert!(repo.get(cat.id).await.unwrap_err().is_not_found());
    assert!(repo.delete(cat.id).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn oversized_names_violate_the_column_limit() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let repo = PgCatRepository::new(pool);

    let err = repo
        .create(CatFields { name: "n".repeat(65), age: 3, gender: "male".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
    Ok(())
}

#[tokio::test]
async fn usernames_are_unique() -> Result<()> {
    let Some(pool) = pool().await? else { return Ok(()) };
    let repo = PgUserRepository::new(pool);
    let username = unique("user");

    let user = repo.create(&username, "hash").await?;
    assert!(matches!(repo.create(&username, "hash").await, Err(StoreError::Conflict(_))));
    assert_eq!(repo.find_by_id(user.id).await?.map(|u| u.username), Some(username.clone()));
    assert!(!repo.set_active(&username, false).await?.is_active);
    Ok(())
}
