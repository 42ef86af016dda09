//! 模型对象（Model Object）基础抽象
//!
//! 为可持久化的领域实体提供统一的 OID、数值 id、实体版本（乐观锁）与跟踪信息。
//! 一般通过 `#[model_object]` 宏生成字段与实现。
//!
use crate::{
    error::DomainResult,
    oid::Oid,
    value_object::{EntityVersion, TrackingInfo},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// 持久化元数据字段名，不参与内容比较
pub const METADATA_FIELDS: &[&str] = &["numeric_id", "entity_version", "tracking"];

/// 可持久化的模型对象
pub trait ModelObject: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// 模型类型标签（稳定名称，用于日志与注册表路由）
    const TYPE: &'static str;

    type Oid: Oid;

    /// OID 在首次持久化前可能尚未分配
    fn oid(&self) -> Option<&Self::Oid>;

    fn set_oid(&mut self, oid: Self::Oid);

    /// 存储分配的数值 id
    fn numeric_id(&self) -> Option<u64>;

    fn set_numeric_id(&mut self, numeric_id: u64);

    fn entity_version(&self) -> EntityVersion;

    fn set_entity_version(&mut self, version: EntityVersion);

    fn tracking(&self) -> &TrackingInfo;

    fn tracking_mut(&mut self) -> &mut TrackingInfo;

    /// 去掉持久化元数据后的序列化内容
    ///
    /// OID 属于内容的一部分；数值 id、版本与跟踪信息不属于。
    fn content(&self) -> DomainResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            for field in METADATA_FIELDS {
                map.remove(*field);
            }
        }
        Ok(value)
    }

    /// 两个对象的业务内容是否一致
    fn same_content_as(&self, other: &Self) -> DomainResult<bool> {
        Ok(self.content()? == other.content()?)
    }

    /// OID 的文本形式（未分配时为空串），用于日志与错误
    fn oid_text(&self) -> String {
        self.oid().map(ToString::to_string).unwrap_or_default()
    }
}
