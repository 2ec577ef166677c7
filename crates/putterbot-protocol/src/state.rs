//! 机器人运行状态定义
//!
//! 系统级模式切换（使能/禁用/自动）会广播给所有子系统，
//! 每个子系统必须立即进入安全状态（执行器零输出）。

/// 机器人运行状态
///
/// 状态切换由场控/驾驶站触发，控制器收到后广播给全部子系统。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RobotState {
    /// 禁用（默认、安全状态）
    #[default]
    Disabled,

    /// 手动操作（操作员手柄控制）
    Teleop,

    /// 自动程序
    Autonomous,
}

impl RobotState {
    /// 是否允许执行器输出
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl std::fmt::Display for RobotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disabled => "disabled",
            Self::Teleop => "teleop",
            Self::Autonomous => "autonomous",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        assert_eq!(RobotState::default(), RobotState::Disabled);
        assert!(!RobotState::Disabled.is_enabled());
    }

    #[test]
    fn test_enabled_states() {
        assert!(RobotState::Teleop.is_enabled());
        assert!(RobotState::Autonomous.is_enabled());
    }

    #[test]
    fn test_display() {
        assert_eq!(RobotState::Teleop.to_string(), "teleop");
    }
}
