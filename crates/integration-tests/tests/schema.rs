//! Schema tests against a migrated database (`DATABASE_URL`). Every test
//! runs inside a transaction that is rolled back.

#![allow(clippy::unwrap_used)]

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

async fn begin() -> Transaction<'static, Postgres> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    pool.begin().await.unwrap()
}

async fn insert_owner(tx: &mut Transaction<'static, Postgres>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO owners (id, email, name) VALUES ($1, $2, 'Dueño de prueba')")
        .bind(id)
        .bind(format!("{id}@vitrina.test"))
        .execute(&mut **tx)
        .await
        .unwrap();
    id
}

async fn insert_tenant(
    tx: &mut Transaction<'static, Postgres>,
    slug: &str,
) -> Result<Uuid, sqlx::Error> {
    let owner_id = insert_owner(tx).await;
    sqlx::query_scalar(
        "INSERT INTO tenants (slug, name, owner_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(slug)
    .bind("Tienda de prueba")
    .bind(owner_id)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_product(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: Uuid,
    code: &str,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO products (tenant_id, code, name, original_price, price, stock)
         VALUES ($1, $2, 'Taladro', 100, 90, 1) RETURNING id",
    )
    .bind(tenant_id)
    .bind(code)
    .fetch_one(&mut **tx)
    .await
}

fn is_constraint_violation(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|c| c == code)
}

#[tokio::test]
#[ignore = "Requires a migrated database"]
async fn test_tenant_defaults() {
    let mut tx = begin().await;
    let id = insert_tenant(&mut tx, "prueba-defaults").await.unwrap();

    let (status, plan, branding): (String, String, serde_json::Value) =
        sqlx::query_as("SELECT status, plan, branding FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .unwrap();
    assert_eq!(status, "active");
    assert_eq!(plan, "starter");
    assert_eq!(branding, serde_json::json!({}));
    tx.rollback().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a migrated database"]
async fn test_bad_slug_is_rejected() {
    let mut tx = begin().await;
    let err = insert_tenant(&mut tx, "Con Mayúsculas").await.unwrap_err();
    // check_violation
    assert!(is_constraint_violation(&err, "23514"), "{err}");
}

#[tokio::test]
#[ignore = "Requires a migrated database"]
async fn test_unknown_owner_is_rejected() {
    let mut tx = begin().await;
    let err = sqlx::query("INSERT INTO tenants (slug, name, owner_id) VALUES ('sin-duenio', 'X', $1)")
        .bind(Uuid::new_v4())
        .execute(&mut *tx)
        .await
        .unwrap_err();
    // foreign_key_violation
    assert!(is_constraint_violation(&err, "23503"), "{err}");
}

#[tokio::test]
#[ignore = "Requires a migrated database"]
async fn test_duplicate_slug_is_unique_violation() {
    let mut tx = begin().await;
    insert_tenant(&mut tx, "prueba-duplicada").await.unwrap();
    let err = insert_tenant(&mut tx, "prueba-duplicada").await.unwrap_err();
    assert!(is_constraint_violation(&err, "23505"), "{err}");
}

#[tokio::test]
#[ignore = "Requires a migrated database"]
async fn test_product_code_unique_per_tenant() {
    let mut tx = begin().await;
    let first = insert_tenant(&mut tx, "prueba-codigos-a").await.unwrap();
    let second = insert_tenant(&mut tx, "prueba-codigos-b").await.unwrap();

    insert_product(&mut tx, first, "MK-1").await.unwrap();
    // Same code in another tenant is fine.
    insert_product(&mut tx, second, "MK-1").await.unwrap();

    let err = insert_product(&mut tx, first, "MK-1").await.unwrap_err();
    assert!(is_constraint_violation(&err, "23505"), "{err}");
}

#[tokio::test]
#[ignore = "Requires a migrated database"]
async fn test_tenant_delete_cascades_to_products() {
    let mut tx = begin().await;
    let tenant = insert_tenant(&mut tx, "prueba-cascada").await.unwrap();
    insert_product(&mut tx, tenant, "MK-1").await.unwrap();

    sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(tenant)
        .execute(&mut *tx)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT count(*) FROM products WHERE tenant_id = $1")
        .bind(tenant)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    tx.rollback().await.unwrap();
}
