//! Postgres 版模型对象存储（需启用 `infra-sqlx` 特性）
//!
//! 每个模型类型共用一张表，按 `model_type` 区分：
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS model_objects (
//!     model_type     TEXT   NOT NULL,
//!     oid            TEXT   NOT NULL,
//!     numeric_id     BIGSERIAL,
//!     entity_version BIGINT NOT NULL,
//!     payload        JSONB  NOT NULL,
//!     PRIMARY KEY (model_type, oid)
//! );
//! ```
//!
//! 乐观更新依赖单条 `UPDATE ... WHERE entity_version = $expected` 的原子性。
//!
use crate::{
    error::{DomainError, DomainResult as Result},
    model_object::ModelObject,
    persist::{MergeOutcome, ModelObjectStore},
    value_object::{EntityVersion, ValueObject},
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use std::marker::PhantomData;

pub const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS model_objects (
    model_type     TEXT   NOT NULL,
    oid            TEXT   NOT NULL,
    numeric_id     BIGSERIAL,
    entity_version BIGINT NOT NULL,
    payload        JSONB  NOT NULL,
    PRIMARY KEY (model_type, oid)
)"#;

pub struct PgModelObjectStore<M> {
    pool: PgPool,
    _marker: PhantomData<fn() -> M>,
}

impl<M> PgModelObjectStore<M>
where
    M: ModelObject,
{
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// 建表（幂等）
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    fn decode(row: &sqlx::postgres::PgRow) -> Result<M> {
        let payload: Value = row.try_get("payload")?;
        let numeric_id: i64 = row.try_get("numeric_id")?;
        let version: i64 = row.try_get("entity_version")?;
        let mut model_object: M = serde_json::from_value(payload)?;
        model_object.set_numeric_id(to_u64(numeric_id)?);
        model_object.set_entity_version(EntityVersion::from_value(to_u64(version)?));
        Ok(model_object)
    }

    async fn current_version(&self, oid: &str) -> Result<Option<u64>> {
        let row = sqlx::query(
            "SELECT entity_version FROM model_objects WHERE model_type = $1 AND oid = $2",
        )
        .bind(M::TYPE)
        .bind(oid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_get::<i64, _>("entity_version"))
            .transpose()?
            .map(to_u64)
            .transpose()
    }
}

fn to_u64(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|e| DomainError::Database {
        reason: format!("negative column value {value}: {e}"),
    })
}

fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|e| DomainError::Database {
        reason: format!("value {value} out of range: {e}"),
    })
}

fn oid_text<M: ModelObject>(model_object: &M) -> Result<String> {
    model_object
        .oid()
        .map(ToString::to_string)
        .ok_or_else(|| DomainError::InvalidState {
            reason: format!("{} without oid cannot be stored", M::TYPE),
        })
}

#[async_trait]
impl<M> ModelObjectStore<M> for PgModelObjectStore<M>
where
    M: ModelObject,
{
    async fn find(&self, oid: &M::Oid) -> Result<Option<M>> {
        let row = sqlx::query(
            "SELECT numeric_id, entity_version, payload FROM model_objects \
             WHERE model_type = $1 AND oid = $2",
        )
        .bind(M::TYPE)
        .bind(oid.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_all(&self) -> Result<Vec<M>> {
        let rows = sqlx::query(
            "SELECT numeric_id, entity_version, payload FROM model_objects \
             WHERE model_type = $1 ORDER BY numeric_id",
        )
        .bind(M::TYPE)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn persist(&self, mut model_object: M) -> Result<M> {
        let oid = oid_text(&model_object)?;
        model_object.tracking().validate()?;
        model_object.set_entity_version(EntityVersion::new().next());

        let row = sqlx::query(
            "INSERT INTO model_objects (model_type, oid, entity_version, payload) \
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING RETURNING numeric_id",
        )
        .bind(M::TYPE)
        .bind(&oid)
        .bind(to_i64(model_object.entity_version().value())?)
        .bind(serde_json::to_value(&model_object)?)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(DomainError::already_exists(M::TYPE, oid));
        };
        model_object.set_numeric_id(to_u64(row.try_get("numeric_id")?)?);
        Ok(model_object)
    }

    async fn merge(&self, mut model_object: M) -> Result<MergeOutcome<M>> {
        let oid = oid_text(&model_object)?;
        let expected = model_object.entity_version();

        let stored = match model_object.oid() {
            Some(typed) => self.find(typed).await?,
            None => None,
        };
        let Some(stored) = stored else {
            return Err(DomainError::not_found(M::TYPE, oid));
        };
        if stored.entity_version() != expected {
            return Err(DomainError::VersionConflict {
                expected: expected.value(),
                actual: stored.entity_version().value(),
            });
        }
        if stored.same_content_as(&model_object)? {
            return Ok(MergeOutcome::NotModified(stored));
        }

        model_object
            .tracking_mut()
            .carry_creation_from(stored.tracking());
        model_object.tracking().validate()?;
        let next = expected.try_next()?;
        model_object.set_entity_version(next);
        if let Some(numeric_id) = stored.numeric_id() {
            model_object.set_numeric_id(numeric_id);
        }

        let result = sqlx::query(
            "UPDATE model_objects SET entity_version = $1, payload = $2 \
             WHERE model_type = $3 AND oid = $4 AND entity_version = $5",
        )
        .bind(to_i64(next.value())?)
        .bind(serde_json::to_value(&model_object)?)
        .bind(M::TYPE)
        .bind(&oid)
        .bind(to_i64(expected.value())?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // 读取之后被并发修改或删除
            return match self.current_version(&oid).await? {
                Some(actual) => Err(DomainError::VersionConflict {
                    expected: expected.value(),
                    actual,
                }),
                None => Err(DomainError::not_found(M::TYPE, oid)),
            };
        }

        Ok(MergeOutcome::Updated(model_object))
    }

    async fn remove(&self, oid: &M::Oid) -> Result<Option<M>> {
        let row = sqlx::query(
            "DELETE FROM model_objects WHERE model_type = $1 AND oid = $2 \
             RETURNING numeric_id, entity_version, payload",
        )
        .bind(M::TYPE)
        .bind(oid.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r01f_macros::{model_object, oid};

    #[oid]
    struct ParcelOid(String);

    #[model_object(oid = ParcelOid, tag = "parcel")]
    #[derive(Clone)]
    struct Parcel {
        weight_grams: u32,
    }

    #[test]
    fn column_conversions_reject_out_of_range_values() {
        assert_eq!(to_u64(0).unwrap(), 0);
        assert_eq!(to_u64(i64::MAX).unwrap(), i64::MAX as u64);
        assert!(matches!(to_u64(-1), Err(DomainError::Database { .. })));

        assert_eq!(to_i64(42).unwrap(), 42);
        assert!(matches!(to_i64(u64::MAX), Err(DomainError::Database { .. })));
    }

    #[test]
    fn oid_is_required_for_storage() {
        let parcel = Parcel::default();
        assert!(matches!(
            oid_text(&parcel),
            Err(DomainError::InvalidState { .. })
        ));

        let mut parcel = Parcel {
            weight_grams: 500,
            ..Default::default()
        };
        parcel.set_oid(ParcelOid::new("p-1".into()));
        assert_eq!(oid_text(&parcel).unwrap(), "p-1");
    }

    /// 需要可用的 Postgres：`DATABASE_URL=... cargo test -p r01f-domain --features infra-sqlx -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn round_trip_against_database() -> anyhow::Result<()> {
        let url = std::env::var("DATABASE_URL")?;
        let pool = PgPool::connect(&url).await?;
        let store = PgModelObjectStore::<Parcel>::new(pool);
        store.migrate().await?;

        let mut parcel = Parcel {
            weight_grams: 250,
            ..Default::default()
        };
        let oid = ParcelOid::new(uuid::Uuid::new_v4().to_string());
        parcel.set_oid(oid.clone());
        parcel
            .tracking_mut()
            .stamp_created(Some("alice"), chrono::Utc::now());

        let stored = store.persist(parcel).await?;
        assert_eq!(stored.entity_version().value(), 1);
        assert!(matches!(
            store.persist(stored.clone()).await,
            Err(DomainError::AlreadyExists { .. })
        ));

        let mut heavier = stored.clone();
        heavier.weight_grams = 300;
        let merged = store.merge(heavier).await?.into_inner();
        assert_eq!(merged.entity_version().value(), 2);
        assert_eq!(merged.tracking().created_by(), Some("alice"));

        let mut stale = stored;
        stale.weight_grams = 1;
        assert!(matches!(
            store.merge(stale).await,
            Err(DomainError::VersionConflict {
                expected: 1,
                actual: 2
            })
        ));

        assert_eq!(store.remove(&oid).await?.map(|p| p.weight_grams), Some(300));
        assert!(store.find(&oid).await?.is_none());
        Ok(())
    }
}
