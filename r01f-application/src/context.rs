use bon::Builder;

/// 用户上下文（User Context）
///
/// 承载一次 CRUD 调用的横切信息：
/// - 用户编码（`user_code`）：写入模型对象的创建/更新跟踪信息；
/// - 关联 ID（`correlation_id`）：用于日志串联。
///
/// 典型用法：
/// ```rust
/// use r01f_application::context::UserContext;
///
/// let ctx = UserContext::builder()
///     .user_code("alice")
///     .correlation_id("cor-123")
///     .build();
/// assert_eq!(ctx.user_code(), Some("alice"));
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct UserContext {
    #[builder(into)]
    user_code: Option<String>,
    #[builder(into)]
    correlation_id: Option<String>,
}

impl UserContext {
    /// 匿名调用（无用户编码）
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_code: impl Into<String>) -> Self {
        Self {
            user_code: Some(user_code.into()),
            correlation_id: None,
        }
    }

    pub fn user_code(&self) -> Option<&str> {
        self.user_code.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}
