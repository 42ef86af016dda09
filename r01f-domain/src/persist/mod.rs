//! 持久化（persist）
//!
//! 定义 CRUD 结果代数与模型对象存储协议，并提供通用实现：
//! - 结果与操作类型（`CrudResult`、`RequestedOperation`、`PerformedOperation`）；
//! - 底层存储协议（`ModelObjectStore`）与合并结果（`MergeOutcome`）；
//! - 内存实现（`InMemoryModelObjectStore`）与可选的 Postgres 实现（`PgModelObjectStore`）。
//!
//! 该模块聚焦协议与乐观锁语义，具体后端由上层选择并注入。
//!
mod crud_result;
mod inmemory_store;
mod model_object_store;
#[cfg(feature = "infra-sqlx")]
mod pg_store;

pub use crud_result::{
    CrudError, CrudErrorKind, CrudOk, CrudResult, PerformedOperation, RequestedOperation,
};
pub use inmemory_store::InMemoryModelObjectStore;
pub use model_object_store::{MergeOutcome, ModelObjectStore};
#[cfg(feature = "infra-sqlx")]
pub use pg_store::{CREATE_TABLE_SQL, PgModelObjectStore};
