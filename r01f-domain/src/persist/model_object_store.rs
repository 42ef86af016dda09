//! 模型对象存储协议
//!
//! CRUD 编排所委托的底层持久化层（相当于实体管理器）。
//! 版本号由存储负责：创建时赋 1，有修改的合并时递增；
//! 合并时若版本与存储不一致则返回 `VersionConflict`。
//!
use crate::{error::DomainResult as Result, model_object::ModelObject};
use async_trait::async_trait;
use std::sync::Arc;

/// 合并（乐观更新）的结果
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome<M> {
    /// 内容有变化，版本已递增
    Updated(M),
    /// 内容无变化，返回存储中的原对象
    NotModified(M),
}

impl<M> MergeOutcome<M> {
    pub fn into_inner(self) -> M {
        match self {
            Self::Updated(m) | Self::NotModified(m) => m,
        }
    }
}

#[async_trait]
pub trait ModelObjectStore<M>: Send + Sync
where
    M: ModelObject,
{
    async fn find(&self, oid: &M::Oid) -> Result<Option<M>>;

    async fn exists(&self, oid: &M::Oid) -> Result<bool> {
        Ok(self.find(oid).await?.is_some())
    }

    /// 按数值 id 升序返回全部对象
    async fn find_all(&self) -> Result<Vec<M>>;

    /// 插入新对象；OID 必须已分配且未被占用
    async fn persist(&self, model_object: M) -> Result<M>;

    /// 乐观更新：`model_object.entity_version()` 必须等于存储中的版本
    async fn merge(&self, model_object: M) -> Result<MergeOutcome<M>>;

    /// 删除并返回被删除的对象
    async fn remove(&self, oid: &M::Oid) -> Result<Option<M>>;
}

#[async_trait]
impl<M, T> ModelObjectStore<M> for Arc<T>
where
    M: ModelObject,
    T: ModelObjectStore<M> + ?Sized,
{
    async fn find(&self, oid: &M::Oid) -> Result<Option<M>> {
        (**self).find(oid).await
    }

    async fn exists(&self, oid: &M::Oid) -> Result<bool> {
        (**self).exists(oid).await
    }

    async fn find_all(&self) -> Result<Vec<M>> {
        (**self).find_all().await
    }

    async fn persist(&self, model_object: M) -> Result<M> {
        (**self).persist(model_object).await
    }

    async fn merge(&self, model_object: M) -> Result<MergeOutcome<M>> {
        (**self).merge(model_object).await
    }

    async fn remove(&self, oid: &M::Oid) -> Result<Option<M>> {
        (**self).remove(oid).await
    }
}
