use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 持有器在慢路径上产生的事件
///
/// 快路径（实例已存在）不产生任何事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolderEvent {
    /// 本次调用完成了实例构造并发布
    Constructed,
    /// 进入临界区后发现实例已被其他线程构造
    LostRace,
    /// 构造闭包返回了错误，槽位保持为空
    ConstructionFailed { reason: String },
}

impl HolderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HolderEvent::Constructed => "constructed",
            HolderEvent::LostRace => "lost_race",
            HolderEvent::ConstructionFailed { .. } => "construction_failed",
        }
    }
}

/// 事件观察者回调
///
/// 回调在临界区释放之后调用，可以安全地再次访问同一个持有器。
pub type HolderObserver = Arc<dyn Fn(&HolderEvent) + Send + Sync>;
