//! Singleton instance and its holder
//!
//! `SingletonInstance` can only be created by an `InstanceHolder`, so every
//! instance that exists was published through the double-checked path.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::config::PayloadConfig;
use crate::errors::{HolderError, Result};
use crate::holder::{HolderObserver, LazyHolder, StatsSnapshot};

/// 唯一的共享实例
///
/// 构造后不可变。`data` 来自赢得构造竞争的那次调用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingletonInstance {
    data: String,
    created_at: DateTime<Utc>,
    constructed_by: Option<String>,
}

impl SingletonInstance {
    fn new(data: String) -> Self {
        Self {
            data,
            created_at: Utc::now(),
            constructed_by: std::thread::current().name().map(str::to_string),
        }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 执行构造的线程名（匿名线程为 `None`）
    pub fn constructed_by(&self) -> Option<&str> {
        self.constructed_by.as_deref()
    }
}

/// 构造载荷校验策略
///
/// 只有 `try_get_instance` 会校验载荷，且只校验真正执行构造的那次调用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadPolicy {
    pub allow_empty: bool,
    /// 最大字节数，0 表示不限制
    pub max_len: usize,
}

impl Default for PayloadPolicy {
    fn default() -> Self {
        Self {
            allow_empty: false,
            max_len: 4096,
        }
    }
}

impl PayloadPolicy {
    pub fn unrestricted() -> Self {
        Self {
            allow_empty: true,
            max_len: 0,
        }
    }

    pub fn validate(&self, data: &str) -> Result<()> {
        if data.is_empty() && !self.allow_empty {
            return Err(HolderError::construction("Payload must not be empty"));
        }
        if self.max_len > 0 && data.len() > self.max_len {
            return Err(HolderError::construction(format!(
                "Payload is {} bytes, limit is {}",
                data.len(),
                self.max_len
            )));
        }
        Ok(())
    }
}

impl From<&PayloadConfig> for PayloadPolicy {
    fn from(config: &PayloadConfig) -> Self {
        Self {
            allow_empty: config.allow_empty,
            max_len: config.max_len,
        }
    }
}

/// `SingletonInstance` 的持有器
///
/// 通过引用或 `Arc` 注入给使用方；测试可以各自创建新的持有器。
#[derive(Debug, Default)]
pub struct InstanceHolder {
    inner: LazyHolder<SingletonInstance>,
    policy: PayloadPolicy,
}

impl InstanceHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PayloadPolicy) -> Self {
        Self {
            inner: LazyHolder::new(),
            policy,
        }
    }

    pub fn with_observer(mut self, observer: HolderObserver) -> Self {
        self.inner = self.inner.with_observer(observer);
        self
    }

    /// 获取唯一实例
    ///
    /// 实例已存在时直接返回（不加锁），`data` 被静默丢弃；否则进入
    /// 双重检查的慢路径，由赢得构造的调用提供载荷。
    pub fn get_instance(&self, data: impl Into<String>) -> Arc<SingletonInstance> {
        self.inner
            .get_or_init(move || SingletonInstance::new(data.into()))
    }

    /// 获取唯一实例，构造前按策略校验载荷
    ///
    /// 校验失败时错误只返回给本次调用者，槽位保持为空，后续调用可以重试。
    pub fn try_get_instance(&self, data: impl Into<String>) -> Result<Arc<SingletonInstance>> {
        let policy = self.policy;
        self.inner.get_or_try_init(move || {
            let data = data.into();
            policy.validate(&data)?;
            Ok(SingletonInstance::new(data))
        })
    }

    /// 查看实例但不触发构造
    pub fn peek(&self) -> Option<Arc<SingletonInstance>> {
        self.inner.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    pub fn policy(&self) -> PayloadPolicy {
        self.policy
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats()
    }
}
