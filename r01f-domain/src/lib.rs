//! R01F 持久化领域层（r01f-domain）
//!
//! 提供以模型对象为中心的通用 CRUD 构件：
//! - 强类型标识（`oid`）与模型对象（`model_object`）建模
//! - 实体版本与跟踪信息等值对象（`value_object`）
//! - 规约（`specification`）与校验（`validation`）
//! - CRUD 结果代数与存储协议（`persist`）
//! - 持久化配置（`config`）
//!
//! 本 crate 与具体存储实现解耦，仅定义协议与最小必要的错误类型；
//! 内存存储用于测试与本地开发，Postgres 存储通过 `infra-sqlx` 特性启用。
//!
//! 典型用法：
//! 1. 使用 `#[oid]` 与 `#[model_object]` 定义模型对象；
//! 2. 选择 `persist` 中的存储实现；
//! 3. 在应用层通过 CRUD 服务编排加载、创建、更新与删除。
//!
pub mod config;
pub mod error;
pub mod model_object;
pub mod oid;
pub mod persist;
pub mod specification;
pub mod validation;
pub mod value_object;

// 允许在本 crate 内部通过 ::r01f_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::r01f_domain 路径。
extern crate self as r01f_domain;
