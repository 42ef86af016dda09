//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//! 这里提供持久化元数据所需的两个值对象：实体版本与跟踪信息。
//!

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 实体版本（用于乐观锁）
///
/// 首次持久化前为 0；存储在创建时赋值为 1，并在每次有修改的更新时递增。
///
/// # 示例
///
/// ```
/// use r01f_domain::value_object::EntityVersion;
///
/// let v1 = EntityVersion::new();
/// assert_eq!(v1.value(), 0);
/// assert!(v1.is_new());
///
/// let v2 = v1.next();
/// assert_eq!(v2.value(), 1);
/// assert!(v2.is_persisted());
///
/// assert!(v2 > v1);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityVersion(u64);

impl EntityVersion {
    /// 创建初始版本（版本号为 0）
    pub const fn new() -> Self {
        Self(0)
    }

    /// 从值创建版本号
    ///
    /// ```
    /// use r01f_domain::value_object::EntityVersion;
    ///
    /// let v = EntityVersion::from_value(5);
    /// assert_eq!(v.value(), 5);
    /// ```
    pub const fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// 获取下一个版本号（到达上限后保持不变）
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// 获取下一个版本号，溢出时返回错误
    pub fn try_next(&self) -> Result<Self, crate::error::DomainError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| crate::error::DomainError::InvalidState {
                reason: format!("entity version {} cannot be incremented", self.0),
            })
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// 尚未持久化
    pub fn is_new(&self) -> bool {
        self.0 == 0
    }

    /// 已经持久化（版本大于零）
    pub fn is_persisted(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EntityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for EntityVersion {
    fn from(value: u64) -> Self {
        Self::from_value(value)
    }
}

impl From<EntityVersion> for u64 {
    fn from(version: EntityVersion) -> Self {
        version.value()
    }
}

/// 创建/更新跟踪信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    created_at: Option<DateTime<Utc>>,
    created_by: Option<String>,
    last_updated_at: Option<DateTime<Utc>>,
    last_updated_by: Option<String>,
}

impl TrackingInfo {
    pub fn created_at(&self) -> Option<&DateTime<Utc>> {
        self.created_at.as_ref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn last_updated_at(&self) -> Option<&DateTime<Utc>> {
        self.last_updated_at.as_ref()
    }

    pub fn last_updated_by(&self) -> Option<&str> {
        self.last_updated_by.as_deref()
    }

    /// 记录创建：同时填充创建与最后更新信息
    pub fn stamp_created(&mut self, user: Option<&str>, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.created_by = user.map(str::to_owned);
        self.stamp_updated(user, now);
    }

    /// 沿用已存储对象的创建信息，忽略调用方提交的创建字段
    pub fn carry_creation_from(&mut self, stored: &TrackingInfo) {
        self.created_at = stored.created_at;
        self.created_by = stored.created_by.clone();
    }

    /// 记录更新：仅改写最后更新信息
    pub fn stamp_updated(&mut self, user: Option<&str>, now: DateTime<Utc>) {
        self.last_updated_at = Some(now);
        self.last_updated_by = user.map(str::to_owned);
    }
}

impl ValueObject for TrackingInfo {
    type Error = crate::error::DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        match (self.created_at, self.last_updated_at) {
            (Some(created), Some(updated)) if updated < created => {
                Err(crate::error::DomainError::InvalidValue {
                    reason: "last update precedes creation".to_string(),
                })
            }
            (None, Some(_)) => Err(crate::error::DomainError::InvalidValue {
                reason: "updated but never created".to_string(),
            }),
            _ => Ok(()),
        }
    }
}
