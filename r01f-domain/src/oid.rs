//! 对象标识（OID）
//!
//! OID 是包装原始主键的强类型标识。通常通过 `#[oid]` 宏为单字段 tuple struct
//! 生成全部样板实现，例如 `#[oid] struct OrderOid(Uuid);`。
//!
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::{Debug, Display},
    hash::Hash,
    str::FromStr,
};

/// 模型对象的强类型标识
pub trait Oid:
    Clone
    + Eq
    + Hash
    + Debug
    + Display
    + FromStr
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// 生成一个新的唯一标识
    fn generate() -> Self;
}

/// 可被自动生成的原始主键类型
pub trait OidValue {
    fn generate() -> Self;
}

impl OidValue for uuid::Uuid {
    fn generate() -> Self {
        uuid::Uuid::new_v4()
    }
}

impl OidValue for String {
    fn generate() -> Self {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
