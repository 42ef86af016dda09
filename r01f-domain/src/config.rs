//! 持久化配置
//!
//! 控制 CRUD 编排的行为开关，可从 TOML 文件加载并由环境变量覆盖：
//!
//! ```toml
//! read_only = false
//! auto_generate_oid = true
//! update_creates_missing = true
//! ```
//!
use crate::error::{DomainError, DomainResult};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_READ_ONLY: &str = "R01F_READ_ONLY";
pub const ENV_AUTO_GENERATE_OID: &str = "R01F_AUTO_GENERATE_OID";
pub const ENV_UPDATE_CREATES_MISSING: &str = "R01F_UPDATE_CREATES_MISSING";

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// 只读模式：拒绝所有写操作
    #[builder(default = false)]
    pub read_only: bool,
    /// 创建时 OID 缺失则自动生成
    #[builder(default = true)]
    pub auto_generate_oid: bool,
    /// 更新一个不存在的对象时转为创建
    #[builder(default = true)]
    pub update_creates_missing: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            auto_generate_oid: true,
            update_creates_missing: true,
        }
    }
}

impl PersistenceConfig {
    pub fn from_toml_str(raw: &str) -> DomainResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// 使用进程环境变量覆盖
    pub fn with_env_overrides(self) -> DomainResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// 使用给定的查找函数覆盖（便于测试）
    pub fn with_overrides<F>(mut self, lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_READ_ONLY) {
            self.read_only = parse_flag(ENV_READ_ONLY, &v)?;
        }
        if let Some(v) = lookup(ENV_AUTO_GENERATE_OID) {
            self.auto_generate_oid = parse_flag(ENV_AUTO_GENERATE_OID, &v)?;
        }
        if let Some(v) = lookup(ENV_UPDATE_CREATES_MISSING) {
            self.update_creates_missing = parse_flag(ENV_UPDATE_CREATES_MISSING, &v)?;
        }
        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> DomainResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DomainError::Config {
            reason: format!("{key}: expected a boolean, found '{other}'"),
        }),
    }
}
