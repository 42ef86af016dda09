//! 领域层统一错误定义
//!
//! 聚焦序列化、配置、存储与乐观锁等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/解析 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },

    // --- 配置 ---
    #[error("config error: {reason}")]
    Config { reason: String },

    // --- 存储/持久化 ---
    #[error("database error: {reason}")]
    Database { reason: String },
    #[error("already exists: model_type={model_type}, oid={oid}")]
    AlreadyExists { model_type: String, oid: String },
    #[error("not found: model_type={model_type}, oid={oid}")]
    NotFound { model_type: String, oid: String },
    #[error("version conflict: expected={expected}, actual={actual}")]
    VersionConflict { expected: u64, actual: u64 },

    // --- 模型对象状态 ---
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
}

impl DomainError {
    pub fn not_found(model_type: impl Into<String>, oid: impl ToString) -> Self {
        Self::NotFound {
            model_type: model_type.into(),
            oid: oid.to_string(),
        }
    }

    pub fn already_exists(model_type: impl Into<String>, oid: impl ToString) -> Self {
        Self::AlreadyExists {
            model_type: model_type.into(),
            oid: oid.to_string(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ---- Cross-crate conversions for infrastructure convenience ----
// 允许在基础设施层直接使用 `?` 将 sqlx/uuid/toml 等错误转换为 DomainError

#[cfg(feature = "infra-sqlx")]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database {
            reason: err.to_string(),
        }
    }
}

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<std::num::ParseIntError> for DomainError {
    fn from(err: std::num::ParseIntError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<std::str::ParseBoolError> for DomainError {
    fn from(err: std::str::ParseBoolError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Config {
            reason: err.to_string(),
        }
    }
}
