//! R01F 过程宏
//!
//! - `#[model_object]`：为具名字段结构体注入持久化元数据字段并实现 `ModelObject`
//! - `#[oid]`：为单字段 tuple struct 生成强类型 OID 所需的全部实现
//!
use proc_macro::TokenStream;

mod model_object;
mod oid;
mod utils;

/// 模型对象宏
/// - 若缺失则追加字段：`oid: Option<OidType>`, `numeric_id: Option<u64>`,
///   `entity_version: EntityVersion`, `tracking: TrackingInfo`，并置于字段最前
/// - 自动实现 `::r01f_domain::model_object::ModelObject`
/// - 参数：`#[model_object(oid = OidType, tag = "...", debug = true|false)]`；
///   `oid` 必填，`tag` 默认为结构体名的 snake_case 形式
#[proc_macro_attribute]
pub fn model_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_object::expand(attr, item)
}

/// OID 宏
/// 用于 `struct OrderOid(Uuid);` 或 `struct OrderOid(String);` 形式的标识类型，
/// 生成派生、`new`、`Display`、`FromStr`、转换以及 `::r01f_domain::oid::Oid` 实现。
#[proc_macro_attribute]
pub fn oid(attr: TokenStream, item: TokenStream) -> TokenStream {
    oid::expand(attr, item)
}
