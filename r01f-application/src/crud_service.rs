//! CRUD 编排服务
//!
//! 在存储协议之上完成一次 CRUD 调用的完整流程：
//! 前置条件检查、只读模式、OID 生成、存在性检查、校验、跟踪信息盖章，
//! 最后委托存储执行并把结果封装为 `CrudResult`。
//!
//! 返回值约定：
//! - `Ok(CrudResult::Err(..))`：类型化失败（未找到、校验失败、冲突等）；
//! - `Err(AppError::IllegalState)`：调用方违反前置条件（编程错误）。
//!
use crate::{context::UserContext, error::AppError};
use async_trait::async_trait;
use chrono::Utc;
use r01f_domain::{
    config::PersistenceConfig,
    error::DomainError,
    model_object::ModelObject,
    oid::Oid,
    persist::{CrudError, CrudResult, MergeOutcome, ModelObjectStore, RequestedOperation},
    validation::ModelObjectValidator,
    value_object::EntityVersion,
};
use std::{marker::PhantomData, sync::Arc};
use tracing::{debug, info, warn};

/// CRUD 服务
#[async_trait]
pub trait CrudService<M>: Send + Sync
where
    M: ModelObject,
{
    async fn load(&self, ctx: &UserContext, oid: &M::Oid) -> Result<CrudResult<M>, AppError>;

    /// 创建：实体版本必须为 0
    async fn create(&self, ctx: &UserContext, model_object: M) -> Result<CrudResult<M>, AppError>;

    /// 更新：必须带 OID 且实体版本非 0
    async fn update(&self, ctx: &UserContext, model_object: M) -> Result<CrudResult<M>, AppError>;

    /// 按实体版本分派到创建或更新
    async fn save(&self, ctx: &UserContext, model_object: M) -> Result<CrudResult<M>, AppError> {
        if model_object.entity_version().is_new() {
            self.create(ctx, model_object).await
        } else {
            self.update(ctx, model_object).await
        }
    }

    async fn delete(&self, ctx: &UserContext, oid: &M::Oid) -> Result<CrudResult<M>, AppError>;

    async fn load_all(&self, ctx: &UserContext) -> Result<Vec<M>, AppError>;
}

/// 基于 `ModelObjectStore` 的 CRUD 服务实现
pub struct ModelObjectCrudService<M, S>
where
    M: ModelObject,
    S: ModelObjectStore<M>,
{
    store: S,
    validator: Option<Arc<dyn ModelObjectValidator<M>>>,
    config: PersistenceConfig,
    _marker: PhantomData<fn() -> M>,
}

impl<M, S> ModelObjectCrudService<M, S>
where
    M: ModelObject,
    S: ModelObjectStore<M>,
{
    pub fn new(store: S, config: PersistenceConfig) -> Self {
        Self {
            store,
            validator: None,
            config,
            _marker: PhantomData,
        }
    }

    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: ModelObjectValidator<M> + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn reject_if_read_only(
        &self,
        requested: RequestedOperation,
        oid: &str,
    ) -> Option<CrudResult<M>> {
        if !self.config.read_only {
            return None;
        }
        warn!(model_type = M::TYPE, oid, %requested, "rejected: read-only mode");
        Some(CrudResult::error(CrudError::bad_request(
            requested,
            M::TYPE,
            Some(oid.to_string()),
            "persistence is in read-only mode",
        )))
    }

    fn validate(&self, requested: RequestedOperation, model_object: &M) -> Option<CrudResult<M>> {
        let errors = self.validator.as_ref()?.validate(model_object);
        if errors.is_empty() {
            return None;
        }
        let oid = model_object.oid_text();
        warn!(model_type = M::TYPE, oid = %oid, %requested, errors = errors.len(), "rejected: validation");
        Some(CrudResult::error(CrudError::validation(
            requested,
            M::TYPE,
            Some(oid),
            errors,
        )))
    }

    /// 存储错误到类型化失败的映射
    fn failure(&self, requested: RequestedOperation, oid: &str, err: DomainError) -> CrudResult<M> {
        let oid_text = Some(oid.to_string());
        let error = match err {
            DomainError::NotFound { .. } => CrudError::not_found(requested, M::TYPE, oid_text),
            e @ (DomainError::VersionConflict { .. } | DomainError::AlreadyExists { .. }) => {
                warn!(model_type = M::TYPE, oid, %requested, error = %e, "rejected: conflict");
                CrudError::bad_request(requested, M::TYPE, oid_text, e.to_string())
            }
            e => {
                warn!(model_type = M::TYPE, oid, %requested, error = %e, "store failure");
                CrudError::server_error(requested, M::TYPE, oid_text, e.to_string())
            }
        };
        CrudResult::error(error)
    }

    /// 盖创建章并插入；`requested` 可能是被转为创建的更新
    async fn persist(
        &self,
        requested: RequestedOperation,
        ctx: &UserContext,
        mut model_object: M,
    ) -> CrudResult<M> {
        let oid = model_object.oid_text();
        model_object.set_entity_version(EntityVersion::new());
        model_object
            .tracking_mut()
            .stamp_created(ctx.user_code(), Utc::now());

        match self.store.persist(model_object).await {
            Ok(created) => {
                info!(
                    model_type = M::TYPE,
                    oid = %oid,
                    %requested,
                    performed = "created",
                    version = %created.entity_version(),
                    correlation_id = ctx.correlation_id(),
                    "persisted"
                );
                CrudResult::created(requested, created)
            }
            Err(e) => self.failure(requested, &oid, e),
        }
    }
}

#[async_trait]
impl<M, S> CrudService<M> for ModelObjectCrudService<M, S>
where
    M: ModelObject,
    S: ModelObjectStore<M>,
{
    async fn load(&self, ctx: &UserContext, oid: &M::Oid) -> Result<CrudResult<M>, AppError> {
        const REQUESTED: RequestedOperation = RequestedOperation::Load;
        let oid_text = oid.to_string();

        let result = match self.store.find(oid).await {
            Ok(Some(found)) => CrudResult::loaded(found),
            Ok(None) => CrudResult::error(CrudError::not_found(REQUESTED, M::TYPE, Some(oid_text.clone()))),
            Err(e) => self.failure(REQUESTED, &oid_text, e),
        };
        debug!(
            model_type = M::TYPE,
            oid = %oid_text,
            requested = %REQUESTED,
            performed = ?result.performed(),
            correlation_id = ctx.correlation_id(),
            "load"
        );
        Ok(result)
    }

    async fn create(
        &self,
        ctx: &UserContext,
        mut model_object: M,
    ) -> Result<CrudResult<M>, AppError> {
        const REQUESTED: RequestedOperation = RequestedOperation::Create;

        if model_object.entity_version().is_persisted() {
            return Err(AppError::IllegalState(format!(
                "cannot create {}[{}] with entity version {}: a new model object must have version 0",
                M::TYPE,
                model_object.oid_text(),
                model_object.entity_version().value()
            )));
        }
        if let Some(rejected) = self.reject_if_read_only(REQUESTED, &model_object.oid_text()) {
            return Ok(rejected);
        }

        if model_object.oid().is_none() {
            if !self.config.auto_generate_oid {
                warn!(model_type = M::TYPE, requested = %REQUESTED, "rejected: missing oid");
                return Ok(CrudResult::error(CrudError::bad_request(
                    REQUESTED,
                    M::TYPE,
                    None,
                    "oid is required when oid generation is disabled",
                )));
            }
            model_object.set_oid(<M::Oid as Oid>::generate());
            debug!(model_type = M::TYPE, oid = %model_object.oid_text(), "generated oid");
        }

        let oid_text = model_object.oid_text();
        if let Some(oid) = model_object.oid() {
            match self.store.exists(oid).await {
                Ok(true) => {
                    warn!(model_type = M::TYPE, oid = %oid_text, requested = %REQUESTED, "rejected: already exists");
                    return Ok(CrudResult::error(CrudError::bad_request(
                        REQUESTED,
                        M::TYPE,
                        Some(oid_text.clone()),
                        format!("{}[{}] already exists", M::TYPE, oid_text),
                    )));
                }
                Ok(false) => {}
                Err(e) => return Ok(self.failure(REQUESTED, &oid_text, e)),
            }
        }

        if let Some(rejected) = self.validate(REQUESTED, &model_object) {
            return Ok(rejected);
        }

        Ok(self.persist(REQUESTED, ctx, model_object).await)
    }

    async fn update(
        &self,
        ctx: &UserContext,
        mut model_object: M,
    ) -> Result<CrudResult<M>, AppError> {
        const REQUESTED: RequestedOperation = RequestedOperation::Update;

        let Some(oid) = model_object.oid().cloned() else {
            return Err(AppError::IllegalState(format!(
                "cannot update {} without oid",
                M::TYPE
            )));
        };
        let oid_text = oid.to_string();
        if model_object.entity_version().is_new() {
            return Err(AppError::IllegalState(format!(
                "cannot update {}[{}] with entity version 0: use create for new model objects",
                M::TYPE,
                oid_text
            )));
        }
        if let Some(rejected) = self.reject_if_read_only(REQUESTED, &oid_text) {
            return Ok(rejected);
        }
        if let Some(rejected) = self.validate(REQUESTED, &model_object) {
            return Ok(rejected);
        }

        match self.store.exists(&oid).await {
            Ok(true) => {}
            Ok(false) if self.config.update_creates_missing => {
                info!(model_type = M::TYPE, oid = %oid_text, "update of missing model object converted to create");
                return Ok(self.persist(REQUESTED, ctx, model_object).await);
            }
            Ok(false) => {
                warn!(model_type = M::TYPE, oid = %oid_text, requested = %REQUESTED, "rejected: not found");
                return Ok(CrudResult::error(CrudError::not_found(
                    REQUESTED,
                    M::TYPE,
                    Some(oid_text),
                )));
            }
            Err(e) => return Ok(self.failure(REQUESTED, &oid_text, e)),
        }

        model_object
            .tracking_mut()
            .stamp_updated(ctx.user_code(), Utc::now());

        let result = match self.store.merge(model_object).await {
            Ok(MergeOutcome::Updated(updated)) => {
                info!(
                    model_type = M::TYPE,
                    oid = %oid_text,
                    requested = %REQUESTED,
                    performed = "updated",
                    version = %updated.entity_version(),
                    correlation_id = ctx.correlation_id(),
                    "merged"
                );
                CrudResult::updated(REQUESTED, updated)
            }
            Ok(MergeOutcome::NotModified(stored)) => {
                debug!(
                    model_type = M::TYPE,
                    oid = %oid_text,
                    requested = %REQUESTED,
                    performed = "not_modified",
                    "unchanged"
                );
                CrudResult::not_modified(REQUESTED, stored)
            }
            Err(e) => self.failure(REQUESTED, &oid_text, e),
        };
        Ok(result)
    }

    async fn delete(&self, ctx: &UserContext, oid: &M::Oid) -> Result<CrudResult<M>, AppError> {
        const REQUESTED: RequestedOperation = RequestedOperation::Delete;
        let oid_text = oid.to_string();

        if let Some(rejected) = self.reject_if_read_only(REQUESTED, &oid_text) {
            return Ok(rejected);
        }

        let result = match self.store.remove(oid).await {
            Ok(Some(removed)) => {
                info!(
                    model_type = M::TYPE,
                    oid = %oid_text,
                    requested = %REQUESTED,
                    performed = "deleted",
                    correlation_id = ctx.correlation_id(),
                    "removed"
                );
                CrudResult::deleted(removed)
            }
            Ok(None) => CrudResult::error(CrudError::not_found(REQUESTED, M::TYPE, Some(oid_text))),
            Err(e) => self.failure(REQUESTED, &oid_text, e),
        };
        Ok(result)
    }

    async fn load_all(&self, ctx: &UserContext) -> Result<Vec<M>, AppError> {
        let all = self.store.find_all().await?;
        debug!(
            model_type = M::TYPE,
            count = all.len(),
            correlation_id = ctx.correlation_id(),
            "load all"
        );
        Ok(all)
    }
}
