use r01f_domain::error::DomainError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    /// 调用方违反前置条件（编程错误），不以 CRUD 结果表达
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("service not registered: model_type={0}")]
    ServiceNotRegistered(String),

    #[error("service already registered: model_type={model_type}")]
    AlreadyRegistered { model_type: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
