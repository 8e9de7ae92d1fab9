use chrono::{Duration, NaiveDate, NaiveDateTime};
use listkit::{Association, AssociationRegistry, ListQuery};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE tenant (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE asset (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    name TEXT NOT NULL,
    lifecycle_state TEXT NOT NULL,
    risk_score INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE TABLE asset_tag (
    id TEXT PRIMARY KEY,
    asset_id TEXT NOT NULL,
    tag_value TEXT NOT NULL
);
";

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared(SCHEMA).await?;
    Ok(db)
}

pub fn asset_registry() -> AssociationRegistry {
    AssociationRegistry::new(vec![
        Association::new("tenant", "tenant", "tenant_id", "id").project(&["name"]),
        Association::new("asset_tags", "asset_tag", "id", "asset_id").one_to_many(),
    ])
    .expect("asset registry is valid")
}

pub fn asset_list_query() -> ListQuery {
    ListQuery::new("asset", asset_registry()).with_mandatory_joins(&["tenant"])
}

/// A fixed base instant; fixtures offset from it so `created_at` ordering
/// is under test control.
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn minutes_after_base(minutes: i64) -> String {
    (base_time() + Duration::minutes(minutes))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

pub async fn insert_tenant(db: &DatabaseConnection, name: &str) -> Result<String, DbErr> {
    let id = Uuid::new_v4().to_string();
    db.execute_unprepared(&format!(
        "INSERT INTO tenant (id, name) VALUES ('{id}', '{name}')"
    ))
    .await?;
    Ok(id)
}

pub async fn insert_asset(
    db: &DatabaseConnection,
    id: &str,
    tenant_id: &str,
    name: &str,
    lifecycle_state: &str,
    created_at: &str,
) -> Result<(), DbErr> {
    db.execute_unprepared(&format!(
        "INSERT INTO asset (id, tenant_id, name, lifecycle_state, created_at) \
         VALUES ('{id}', '{tenant_id}', '{name}', '{lifecycle_state}', '{created_at}')"
    ))
    .await?;
    Ok(())
}

pub async fn insert_tag(
    db: &DatabaseConnection,
    asset_id: &str,
    tag_value: &str,
) -> Result<(), DbErr> {
    let id = Uuid::new_v4().to_string();
    db.execute_unprepared(&format!(
        "INSERT INTO asset_tag (id, asset_id, tag_value) VALUES ('{id}', '{asset_id}', '{tag_value}')"
    ))
    .await?;
    Ok(())
}
