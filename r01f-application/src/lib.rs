//! R01F 应用层（r01f-application）
//!
//! 在领域层的存储协议之上编排 CRUD：
//! - `crud_service`：存在性检查、只读模式、OID 生成、校验与结果封装；
//! - `registry`：按模型类型标签注册与路由 CRUD 服务；
//! - `rest`：HTTP 状态码/报文与 `CrudResult` 之间的映射。
//!
pub mod context;
pub mod crud_service;
pub mod error;
pub mod registry;
pub mod rest;

pub use context::UserContext;
pub use crud_service::{CrudService, ModelObjectCrudService};
pub use error::AppError;
pub use registry::CrudServiceRegistry;
