//! 子系统能力接口
//!
//! 控制器通过对象安全的 trait 广播状态切换，不依赖继承基类，
//! 也不持有裸指针：子系统按值归控制器所有，广播时以
//! `&dyn Subsystem` 多态遍历。

use putterbot_protocol::RobotState;

/// 子系统能力集
///
/// 消息投递是各子系统强类型的句柄方法（消息类型不同），
/// 本 trait 只承载广播所需的公共操作。
pub trait Subsystem: Send {
    /// 子系统名（日志/遥测标识）
    fn name(&self) -> &'static str;

    /// 系统状态切换通知
    ///
    /// 必须立即把执行器同步置为安全中立输出（零功率），
    /// 无论是否有脚本序列正在执行。
    fn on_state_change(&self, state: RobotState);
}
