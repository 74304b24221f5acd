//! Process-wide InstanceHolder
//!
//! 为确实需要全局访问的代码提供一个进程级持有器。其余代码应通过引用或
//! `Arc` 注入 `InstanceHolder`。

use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

use crate::config::try_get_config;
use crate::errors::Result;
use crate::instance::{InstanceHolder, PayloadPolicy, SingletonInstance};

/// 全局持有器
///
/// 首次访问时按已加载的配置确定载荷策略；之后修改配置不会影响它。
static GLOBAL_HOLDER: Lazy<InstanceHolder> = Lazy::new(|| {
    let policy = try_get_config()
        .map(|config| PayloadPolicy::from(&config.payload))
        .unwrap_or_default();
    debug!("Global instance holder created with {:?}", policy);
    InstanceHolder::with_policy(policy)
});

/// 获取全局持有器
pub fn global_holder() -> &'static InstanceHolder {
    &GLOBAL_HOLDER
}

/// 获取进程级唯一实例
pub fn get_instance(data: impl Into<String>) -> Arc<SingletonInstance> {
    GLOBAL_HOLDER.get_instance(data)
}

/// 获取进程级唯一实例，构造前校验载荷
pub fn try_get_instance(data: impl Into<String>) -> Result<Arc<SingletonInstance>> {
    GLOBAL_HOLDER.try_get_instance(data)
}
