//! CRUD 结果代数
//!
//! 每次 CRUD 调用产生一个不可变的 `CrudResult`：成功时携带请求的操作、
//! 实际执行的操作与模型对象；失败时携带类型化的错误。
//! 请求与执行可能不同，例如对不存在对象的更新被转为创建。
//!
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 调用方请求的持久化操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestedOperation {
    Create,
    Update,
    Delete,
    Load,
}

impl fmt::Display for RequestedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Load => "load",
        };
        f.write_str(s)
    }
}

/// 实际执行的持久化操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformedOperation {
    Created,
    Updated,
    Deleted,
    Loaded,
    NotModified,
}

impl PerformedOperation {
    /// 是否改变了存储状态
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Created | Self::Updated | Self::Deleted)
    }
}

impl fmt::Display for PerformedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Loaded => "loaded",
            Self::NotModified => "not_modified",
        };
        f.write_str(s)
    }
}

/// 错误分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrudErrorKind {
    BadRequest { reason: String },
    NotFound,
    Validation { errors: Vec<ValidationError> },
    ServerError { reason: String },
}

impl fmt::Display for CrudErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest { reason } => write!(f, "bad request: {reason}"),
            Self::NotFound => f.write_str("not found"),
            Self::Validation { errors } => {
                f.write_str("validation failed: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            Self::ServerError { reason } => write!(f, "server error: {reason}"),
        }
    }
}

/// 类型化的 CRUD 失败
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{requested} {model_type}[{}] failed: {kind}", .oid.as_deref().unwrap_or("-"))]
pub struct CrudError {
    requested: RequestedOperation,
    model_type: String,
    oid: Option<String>,
    kind: CrudErrorKind,
}

impl CrudError {
    pub fn new(
        requested: RequestedOperation,
        model_type: impl Into<String>,
        oid: Option<String>,
        kind: CrudErrorKind,
    ) -> Self {
        Self {
            requested,
            model_type: model_type.into(),
            oid: oid.filter(|o| !o.is_empty()),
            kind,
        }
    }

    pub fn bad_request(
        requested: RequestedOperation,
        model_type: &str,
        oid: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            requested,
            model_type,
            oid,
            CrudErrorKind::BadRequest {
                reason: reason.into(),
            },
        )
    }

    pub fn not_found(requested: RequestedOperation, model_type: &str, oid: Option<String>) -> Self {
        Self::new(requested, model_type, oid, CrudErrorKind::NotFound)
    }

    pub fn validation(
        requested: RequestedOperation,
        model_type: &str,
        oid: Option<String>,
        errors: Vec<ValidationError>,
    ) -> Self {
        Self::new(requested, model_type, oid, CrudErrorKind::Validation { errors })
    }

    pub fn server_error(
        requested: RequestedOperation,
        model_type: &str,
        oid: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            requested,
            model_type,
            oid,
            CrudErrorKind::ServerError {
                reason: reason.into(),
            },
        )
    }

    pub fn requested(&self) -> RequestedOperation {
        self.requested
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn kind(&self) -> &CrudErrorKind {
        &self.kind
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, CrudErrorKind::NotFound)
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self.kind, CrudErrorKind::BadRequest { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, CrudErrorKind::Validation { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.kind, CrudErrorKind::ServerError { .. })
    }
}

/// 成功结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudOk<M> {
    requested: RequestedOperation,
    performed: PerformedOperation,
    model_object: M,
}

impl<M> CrudOk<M> {
    pub fn requested(&self) -> RequestedOperation {
        self.requested
    }

    pub fn performed(&self) -> PerformedOperation {
        self.performed
    }

    pub fn model_object(&self) -> &M {
        &self.model_object
    }

    pub fn into_model_object(self) -> M {
        self.model_object
    }
}

/// 一次 CRUD 调用的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrudResult<M> {
    Ok(CrudOk<M>),
    Err(CrudError),
}

impl<M> CrudResult<M> {
    pub fn ok(requested: RequestedOperation, performed: PerformedOperation, model_object: M) -> Self {
        Self::Ok(CrudOk {
            requested,
            performed,
            model_object,
        })
    }

    pub fn loaded(model_object: M) -> Self {
        Self::ok(RequestedOperation::Load, PerformedOperation::Loaded, model_object)
    }

    pub fn created(requested: RequestedOperation, model_object: M) -> Self {
        Self::ok(requested, PerformedOperation::Created, model_object)
    }

    pub fn updated(requested: RequestedOperation, model_object: M) -> Self {
        Self::ok(requested, PerformedOperation::Updated, model_object)
    }

    pub fn deleted(model_object: M) -> Self {
        Self::ok(
            RequestedOperation::Delete,
            PerformedOperation::Deleted,
            model_object,
        )
    }

    pub fn not_modified(requested: RequestedOperation, model_object: M) -> Self {
        Self::ok(requested, PerformedOperation::NotModified, model_object)
    }

    pub fn error(error: CrudError) -> Self {
        Self::Err(error)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    pub fn requested(&self) -> RequestedOperation {
        match self {
            Self::Ok(ok) => ok.requested,
            Self::Err(err) => err.requested,
        }
    }

    /// 成功时实际执行的操作
    pub fn performed(&self) -> Option<PerformedOperation> {
        match self {
            Self::Ok(ok) => Some(ok.performed),
            Self::Err(_) => None,
        }
    }

    pub fn model_object(&self) -> Option<&M> {
        match self {
            Self::Ok(ok) => Some(&ok.model_object),
            Self::Err(_) => None,
        }
    }

    pub fn error_ref(&self) -> Option<&CrudError> {
        match self {
            Self::Ok(_) => None,
            Self::Err(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<M, CrudError> {
        match self {
            Self::Ok(ok) => Ok(ok.model_object),
            Self::Err(err) => Err(err),
        }
    }

    pub fn map<N, F>(self, f: F) -> CrudResult<N>
    where
        F: FnOnce(M) -> N,
    {
        match self {
            Self::Ok(ok) => CrudResult::Ok(CrudOk {
                requested: ok.requested,
                performed: ok.performed,
                model_object: f(ok.model_object),
            }),
            Self::Err(err) => CrudResult::Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exposes_requested_and_performed() {
        let r = CrudResult::created(RequestedOperation::Update, 7);
        assert!(r.is_ok());
        assert_eq!(r.requested(), RequestedOperation::Update);
        assert_eq!(r.performed(), Some(PerformedOperation::Created));
        assert_eq!(r.model_object(), Some(&7));
        assert_eq!(r.map(|n| n * 2).into_result().unwrap(), 14);
    }

    #[test]
    fn error_display_names_operation_type_and_oid() {
        let err = CrudError::not_found(RequestedOperation::Load, "order", Some("o-1".into()));
        assert_eq!(err.to_string(), "load order[o-1] failed: not found");

        let err = CrudError::validation(
            RequestedOperation::Create,
            "order",
            Some(String::new()),
            vec![
                ValidationError::for_field("name", "blank"),
                ValidationError::new(None, "too cheap"),
            ],
        );
        assert_eq!(err.oid(), None);
        assert_eq!(
            err.to_string(),
            "create order[-] failed: validation failed: name: blank; too cheap"
        );
    }

    #[test]
    fn error_result_has_no_model_object() {
        let r: CrudResult<u8> = CrudResult::error(CrudError::server_error(
            RequestedOperation::Delete,
            "order",
            None,
            "disk full",
        ));
        assert!(r.is_err());
        assert_eq!(r.performed(), None);
        assert_eq!(r.requested(), RequestedOperation::Delete);
        assert!(r.error_ref().unwrap().is_server_error());
        assert!(r.into_result().is_err());
    }

    #[test]
    fn only_writes_are_writes() {
        assert!(PerformedOperation::Created.is_write());
        assert!(!PerformedOperation::NotModified.is_write());
        assert!(!PerformedOperation::Loaded.is_write());
    }
}
