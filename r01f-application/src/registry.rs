use crate::{context::UserContext, crud_service::CrudService, error::AppError};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use r01f_domain::{
    error::DomainError,
    model_object::ModelObject,
    persist::{CrudError, CrudResult, RequestedOperation},
};
use serde_json::Value;
use std::any::{Any, type_name};
use std::sync::Arc;
use tracing::{debug, warn};

/// 类型擦除后的 CRUD 服务：以 OID 文本与 JSON 进行调度
#[async_trait]
trait ErasedCrudService: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn model_type_name(&self) -> &'static str;

    async fn load_json(&self, ctx: &UserContext, oid: &str)
    -> Result<CrudResult<Value>, AppError>;

    async fn save_json(&self, ctx: &UserContext, value: Value)
    -> Result<CrudResult<Value>, AppError>;

    async fn delete_json(
        &self,
        ctx: &UserContext,
        oid: &str,
    ) -> Result<CrudResult<Value>, AppError>;
}

struct TypedEntry<M: ModelObject> {
    service: Arc<dyn CrudService<M>>,
}

impl<M: ModelObject> TypedEntry<M> {
    fn parse_oid(requested: RequestedOperation, oid: &str) -> Result<M::Oid, CrudResult<Value>> {
        oid.parse::<M::Oid>().map_err(|_| {
            warn!(model_type = M::TYPE, oid, %requested, "rejected: malformed oid");
            CrudResult::error(CrudError::bad_request(
                requested,
                M::TYPE,
                Some(oid.to_string()),
                format!("malformed {} oid", M::TYPE),
            ))
        })
    }
}

fn into_json<M: ModelObject>(result: CrudResult<M>) -> Result<CrudResult<Value>, AppError> {
    match result {
        CrudResult::Ok(ok) => {
            let (requested, performed) = (ok.requested(), ok.performed());
            let value = serde_json::to_value(ok.into_model_object()).map_err(DomainError::from)?;
            Ok(CrudResult::ok(requested, performed, value))
        }
        CrudResult::Err(err) => Ok(CrudResult::Err(err)),
    }
}

#[async_trait]
impl<M: ModelObject> ErasedCrudService for TypedEntry<M> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn model_type_name(&self) -> &'static str {
        type_name::<M>()
    }

    async fn load_json(
        &self,
        ctx: &UserContext,
        oid: &str,
    ) -> Result<CrudResult<Value>, AppError> {
        let oid = match Self::parse_oid(RequestedOperation::Load, oid) {
            Ok(oid) => oid,
            Err(rejected) => return Ok(rejected),
        };
        into_json(self.service.load(ctx, &oid).await?)
    }

    async fn save_json(
        &self,
        ctx: &UserContext,
        value: Value,
    ) -> Result<CrudResult<Value>, AppError> {
        // 请求的操作按报文中的实体版本推断
        let requested = match value.get("entity_version").and_then(Value::as_u64) {
            Some(v) if v > 0 => RequestedOperation::Update,
            _ => RequestedOperation::Create,
        };
        let oid = value
            .get("oid")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let model_object: M = match serde_json::from_value(value) {
            Ok(m) => m,
            Err(e) => {
                warn!(model_type = M::TYPE, %requested, error = %e, "rejected: malformed body");
                return Ok(CrudResult::error(CrudError::bad_request(
                    requested,
                    M::TYPE,
                    oid,
                    format!("malformed {} body: {e}", M::TYPE),
                )));
            }
        };
        into_json(self.service.save(ctx, model_object).await?)
    }

    async fn delete_json(
        &self,
        ctx: &UserContext,
        oid: &str,
    ) -> Result<CrudResult<Value>, AppError> {
        let oid = match Self::parse_oid(RequestedOperation::Delete, oid) {
            Ok(oid) => oid,
            Err(rejected) => return Ok(rejected),
        };
        into_json(self.service.delete(ctx, &oid).await?)
    }
}

/// CRUD 服务注册表
/// - 以模型类型标签（`ModelObject::TYPE`）为键，每个标签只能注册一次
/// - `service::<M>()` 取回强类型服务；`*_json` 按标签以 JSON 调度
pub struct CrudServiceRegistry {
    services: DashMap<&'static str, Arc<dyn ErasedCrudService>>,
}

impl Default for CrudServiceRegistry {
    fn default() -> Self {
        Self {
            services: DashMap::new(),
        }
    }
}

impl CrudServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模型对象的 CRUD 服务
    pub fn register<M>(&self, service: Arc<dyn CrudService<M>>) -> Result<(), AppError>
    where
        M: ModelObject,
    {
        match self.services.entry(M::TYPE) {
            Entry::Occupied(_) => Err(AppError::AlreadyRegistered {
                model_type: M::TYPE,
            }),
            Entry::Vacant(e) => {
                e.insert(Arc::new(TypedEntry { service }));
                debug!(model_type = M::TYPE, "crud service registered");
                Ok(())
            }
        }
    }

    /// 取回强类型服务
    pub fn service<M>(&self) -> Result<Arc<dyn CrudService<M>>, AppError>
    where
        M: ModelObject,
    {
        let entry = self.entry(M::TYPE)?;
        match entry.as_any().downcast_ref::<TypedEntry<M>>() {
            Some(typed) => Ok(typed.service.clone()),
            None => Err(AppError::TypeMismatch {
                expected: type_name::<M>(),
                found: entry.model_type_name(),
            }),
        }
    }

    pub fn is_registered(&self, model_type: &str) -> bool {
        self.services.contains_key(model_type)
    }

    /// 已注册的模型类型标签（按字典序）
    pub fn registered_tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.services.iter().map(|e| *e.key()).collect();
        tags.sort_unstable();
        tags
    }

    pub async fn load_json(
        &self,
        model_type: &str,
        ctx: &UserContext,
        oid: &str,
    ) -> Result<CrudResult<Value>, AppError> {
        self.entry(model_type)?.load_json(ctx, oid).await
    }

    /// 按报文中的实体版本创建或更新
    pub async fn save_json(
        &self,
        model_type: &str,
        ctx: &UserContext,
        value: Value,
    ) -> Result<CrudResult<Value>, AppError> {
        self.entry(model_type)?.save_json(ctx, value).await
    }

    pub async fn delete_json(
        &self,
        model_type: &str,
        ctx: &UserContext,
        oid: &str,
    ) -> Result<CrudResult<Value>, AppError> {
        self.entry(model_type)?.delete_json(ctx, oid).await
    }

    // 先克隆出 Arc，避免跨 await 持有分片锁
    fn entry(&self, model_type: &str) -> Result<Arc<dyn ErasedCrudService>, AppError> {
        self.services
            .get(model_type)
            .map(|e| e.value().clone())
            .ok_or_else(|| AppError::ServiceNotRegistered(model_type.to_string()))
    }
}
