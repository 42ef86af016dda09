//! 内存版模型对象存储
//!
//! 基于 `DashMap` 的 `ModelObjectStore` 实现：合并时的版本检查与写入
//! 在同一条目锁内完成，因此对同一 OID 的并发合并只有一个能成功。
//! 典型用途：测试环境、示例与本地开发。
//!
use crate::{
    error::{DomainError, DomainResult as Result},
    model_object::ModelObject,
    persist::{MergeOutcome, ModelObjectStore},
    value_object::{EntityVersion, ValueObject},
};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub struct InMemoryModelObjectStore<M>
where
    M: ModelObject,
{
    objects: DashMap<M::Oid, M>,
    sequence: AtomicU64,
}

impl<M> Default for InMemoryModelObjectStore<M>
where
    M: ModelObject,
{
    fn default() -> Self {
        Self {
            objects: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl<M> InMemoryModelObjectStore<M>
where
    M: ModelObject,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn require_oid<M: ModelObject>(model_object: &M) -> Result<M::Oid> {
    model_object
        .oid()
        .cloned()
        .ok_or_else(|| DomainError::InvalidState {
            reason: format!("{} without oid cannot be stored", M::TYPE),
        })
}

#[async_trait]
impl<M> ModelObjectStore<M> for InMemoryModelObjectStore<M>
where
    M: ModelObject,
{
    async fn find(&self, oid: &M::Oid) -> Result<Option<M>> {
        Ok(self.objects.get(oid).map(|e| e.value().clone()))
    }

    async fn exists(&self, oid: &M::Oid) -> Result<bool> {
        Ok(self.objects.contains_key(oid))
    }

    async fn find_all(&self) -> Result<Vec<M>> {
        let mut all: Vec<M> = self.objects.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|m| m.numeric_id());
        Ok(all)
    }

    async fn persist(&self, mut model_object: M) -> Result<M> {
        let oid = require_oid(&model_object)?;
        model_object.tracking().validate()?;

        match self.objects.entry(oid) {
            Entry::Occupied(e) => Err(DomainError::already_exists(M::TYPE, e.key())),
            Entry::Vacant(e) => {
                let numeric_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                model_object.set_numeric_id(numeric_id);
                model_object.set_entity_version(EntityVersion::new().next());
                debug!(model_type = M::TYPE, oid = %e.key(), numeric_id, "persisted");
                e.insert(model_object.clone());
                Ok(model_object)
            }
        }
    }

    async fn merge(&self, mut model_object: M) -> Result<MergeOutcome<M>> {
        let oid = require_oid(&model_object)?;

        let Some(mut stored) = self.objects.get_mut(&oid) else {
            return Err(DomainError::not_found(M::TYPE, &oid));
        };

        let actual = stored.entity_version();
        let expected = model_object.entity_version();
        if actual != expected {
            return Err(DomainError::VersionConflict {
                expected: expected.value(),
                actual: actual.value(),
            });
        }

        if stored.same_content_as(&model_object)? {
            debug!(model_type = M::TYPE, oid = %oid, version = %actual, "unchanged");
            return Ok(MergeOutcome::NotModified(stored.value().clone()));
        }

        model_object
            .tracking_mut()
            .carry_creation_from(stored.tracking());
        model_object.tracking().validate()?;
        if let Some(numeric_id) = stored.numeric_id() {
            model_object.set_numeric_id(numeric_id);
        }
        let next = actual.try_next()?;
        model_object.set_entity_version(next);
        *stored = model_object.clone();
        debug!(model_type = M::TYPE, oid = %oid, version = %next, "merged");

        Ok(MergeOutcome::Updated(model_object))
    }

    async fn remove(&self, oid: &M::Oid) -> Result<Option<M>> {
        Ok(self.objects.remove(oid).map(|(_, m)| m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r01f_macros::{model_object, oid};
    use std::sync::Arc;

    #[oid]
    struct TaskOid(String);

    #[model_object(oid = TaskOid, tag = "task")]
    #[derive(Clone)]
    struct Task {
        title: String,
    }

    fn task(oid: &str, title: &str) -> Task {
        let mut t = Task {
            title: title.into(),
            ..Default::default()
        };
        t.set_oid(TaskOid::new(oid.into()));
        t
    }

    #[tokio::test]
    async fn persist_assigns_numeric_id_and_first_version() {
        let store = InMemoryModelObjectStore::<Task>::new();
        let a = store.persist(task("t-1", "a")).await.unwrap();
        let b = store.persist(task("t-2", "b")).await.unwrap();
        assert_eq!(a.entity_version().value(), 1);
        assert_eq!(a.numeric_id(), Some(1));
        assert_eq!(b.numeric_id(), Some(2));
        assert!(store.exists(&TaskOid::new("t-1".into())).await.unwrap());

        let all = store.find_all().await.unwrap();
        assert_eq!(
            all.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[tokio::test]
    async fn persist_rejects_duplicates_and_missing_oid() {
        let store = InMemoryModelObjectStore::<Task>::new();
        store.persist(task("t-1", "a")).await.unwrap();
        let err = store.persist(task("t-1", "again")).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));

        let err = store.persist(Task::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn merge_checks_version_and_detects_changes() {
        let store = InMemoryModelObjectStore::<Task>::new();
        let stored = store.persist(task("t-1", "a")).await.unwrap();

        let same = store.merge(stored.clone()).await.unwrap();
        assert!(matches!(same, MergeOutcome::NotModified(ref t) if t.entity_version().value() == 1));

        let mut changed = stored.clone();
        changed.title = "b".into();
        let updated = store.merge(changed).await.unwrap().into_inner();
        assert_eq!(updated.entity_version().value(), 2);
        assert_eq!(updated.numeric_id(), Some(1));

        // 基于过期版本的修改
        let mut stale = stored;
        stale.title = "c".into();
        let err = store.merge(stale).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::VersionConflict {
                expected: 1,
                actual: 2
            }
        ));

        let err = store.merge(task("t-404", "x")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn merge_keeps_stored_creation_tracking() {
        let store = InMemoryModelObjectStore::<Task>::new();
        let mut first = task("t-1", "a");
        first
            .tracking_mut()
            .stamp_created(Some("alice"), chrono::Utc::now());
        let stored = store.persist(first).await.unwrap();

        // 不带跟踪信息的修改（如 JSON 报文）
        let mut bare = task("t-1", "b");
        bare.set_entity_version(stored.entity_version());
        bare.tracking_mut().stamp_updated(Some("bob"), chrono::Utc::now());
        let merged = store.merge(bare).await.unwrap().into_inner();
        assert_eq!(merged.tracking().created_by(), Some("alice"));
        assert_eq!(merged.tracking().created_at(), stored.tracking().created_at());
        assert_eq!(merged.tracking().last_updated_by(), Some("bob"));

        let mut forged = merged.clone();
        forged.title = "c".into();
        forged
            .tracking_mut()
            .stamp_created(Some("mallory"), chrono::Utc::now());
        let merged = store.merge(forged).await.unwrap().into_inner();
        assert_eq!(merged.tracking().created_by(), Some("alice"));
        let current = store.find(&TaskOid::new("t-1".into())).await.unwrap().unwrap();
        assert_eq!(current.tracking().created_by(), Some("alice"));
    }

    #[tokio::test]
    async fn remove_returns_removed_object() {
        let store = InMemoryModelObjectStore::<Task>::new();
        store.persist(task("t-1", "a")).await.unwrap();
        let oid = TaskOid::new("t-1".into());
        assert_eq!(store.remove(&oid).await.unwrap().unwrap().title, "a");
        assert!(store.remove(&oid).await.unwrap().is_none());
        assert!(store.find(&oid).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_merges_on_same_version_have_one_winner() {
        let store = Arc::new(InMemoryModelObjectStore::<Task>::new());
        let stored = store.persist(task("t-1", "start")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let mut candidate = stored.clone();
            candidate.title = format!("writer-{i}");
            handles.push(tokio::spawn(async move { store.merge(candidate).await }));
        }

        let mut winners = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(MergeOutcome::Updated(_)) => winners += 1,
                Err(DomainError::VersionConflict { .. }) => conflicts += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 15);

        let current = store.find(&TaskOid::new("t-1".into())).await.unwrap().unwrap();
        assert_eq!(current.entity_version().value(), 2);
    }
}
