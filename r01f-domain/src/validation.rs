//! 模型对象校验
//!
//! 校验器返回的错误列表为空即视为通过；规则以规约（`Specification`）表达。
//!
use crate::specification::Specification;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单条校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    message: String,
}

impl ValidationError {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_owned),
            message: message.into(),
        }
    }

    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(Some(field), message)
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// 模型对象校验器
pub trait ModelObjectValidator<M>: Send + Sync {
    fn validate(&self, model_object: &M) -> Vec<ValidationError>;
}

struct Rule<M> {
    spec: Box<dyn Specification<M> + Send + Sync>,
    error: ValidationError,
}

/// 由一组规约组成的校验器，按注册顺序逐条检查
pub struct RuleSetValidator<M> {
    rules: Vec<Rule<M>>,
}

impl<M> Default for RuleSetValidator<M> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<M> RuleSetValidator<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加规则：候选对象不满足 `spec` 时产生一条 `field: message` 错误
    pub fn rule<S>(mut self, field: &str, message: impl Into<String>, spec: S) -> Self
    where
        S: Specification<M> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            spec: Box::new(spec),
            error: ValidationError::for_field(field, message),
        });
        self
    }

    /// 针对整个对象（跨字段）的规则，错误不关联字段
    pub fn rule_for_object<S>(mut self, message: impl Into<String>, spec: S) -> Self
    where
        S: Specification<M> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            spec: Box::new(spec),
            error: ValidationError::new(None, message),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<M> ModelObjectValidator<M> for RuleSetValidator<M>
where
    M: Send + Sync,
{
    fn validate(&self, model_object: &M) -> Vec<ValidationError> {
        self.rules
            .iter()
            .filter(|rule| !rule.spec.is_satisfied_by(model_object))
            .map(|rule| rule.error.clone())
            .collect()
    }
}
