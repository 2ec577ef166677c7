//! 机器人控制器
//!
//! 每个控制周期轮询一次手柄，把输入翻译为命令消息投递给各子系统
//! 邮箱。控制器本身不含执行器逻辑，投递永不阻塞；子系统缺席时
//! 跳过对应分发，其余子系统不受影响。

use crate::drivetrain::Drivetrain;
use crate::putter::Putter;
use crate::subsystem::Subsystem;
use putterbot_hal::{Axis, Button, Gamepad};
use putterbot_protocol::{DriveMessage, PutterMessage, RobotState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// X/Y 键低速定位的输出幅值
const SLOW_MOVE_OUTPUT: f32 = 0.1;

/// 把手柄按键状态映射为 Putter 命令
///
/// 优先级从高到低：左肩键增速、右肩键减速、A 触发击球、
/// X/Y 低速正反转。每个周期恰好产生一条消息；无按键时发送
/// 零输出保持消息，使执行器在空闲周期回到中立位。
fn putter_command<G: Gamepad + ?Sized>(gamepad: &G) -> PutterMessage {
    if gamepad.button(Button::BumperLeft) {
        PutterMessage::IncSpeed
    } else if gamepad.button(Button::BumperRight) {
        PutterMessage::DecSpeed
    } else if gamepad.button(Button::A) {
        PutterMessage::Putt
    } else if gamepad.button(Button::X) {
        PutterMessage::SlowMove { output: SLOW_MOVE_OUTPUT }
    } else if gamepad.button(Button::Y) {
        PutterMessage::SlowMove { output: -SLOW_MOVE_OUTPUT }
    } else {
        PutterMessage::SlowMove { output: 0.0 }
    }
}

/// 机器人控制器
///
/// 持有手柄和可选的子系统句柄。子系统通过 `with_*` 链式挂载，
/// 未挂载的子系统在分发和广播时直接跳过。
pub struct RobotController<G: Gamepad> {
    gamepad: G,
    putter: Option<Putter>,
    drivetrain: Option<Drivetrain>,
    state: RobotState,
    loop_count: u64,
}

impl<G: Gamepad> RobotController<G> {
    /// 创建控制器（初始为 Disabled，不分发命令）
    pub fn new(gamepad: G) -> Self {
        Self {
            gamepad,
            putter: None,
            drivetrain: None,
            state: RobotState::default(),
            loop_count: 0,
        }
    }

    /// 挂载 Putter 子系统
    pub fn with_putter(mut self, putter: Putter) -> Self {
        self.putter = Some(putter);
        self
    }

    /// 挂载底盘子系统
    pub fn with_drivetrain(mut self, drivetrain: Drivetrain) -> Self {
        self.drivetrain = Some(drivetrain);
        self
    }

    /// 当前机器人状态
    pub fn state(&self) -> RobotState {
        self.state
    }

    /// 已执行的控制周期数
    pub fn loop_count(&self) -> u64 {
        self.loop_count
    }

    /// Putter 子系统句柄（未挂载时为 None）
    pub fn putter(&self) -> Option<&Putter> {
        self.putter.as_ref()
    }

    /// 切换机器人状态并广播给所有已挂载的子系统
    ///
    /// 广播在当前线程同步完成：返回时所有执行器已置零，
    /// 正在执行的脚本序列已被标记抢占。
    pub fn set_state(&mut self, state: RobotState) {
        if state == self.state {
            return;
        }
        info!(from = %self.state, to = %state, "Robot state change");
        self.state = state;
        for subsystem in self.subsystems() {
            debug!(subsystem = subsystem.name(), "Broadcasting state change");
            subsystem.on_state_change(state);
        }
    }

    /// 执行一个控制周期：轮询手柄，向每个已挂载子系统投递一条消息
    ///
    /// Disabled 状态下不分发（执行器保持状态切换时强制的中立位）。
    pub fn poll_once(&mut self) {
        self.loop_count = self.loop_count.wrapping_add(1);
        if !self.state.is_enabled() {
            return;
        }

        if let Some(drivetrain) = &self.drivetrain {
            drivetrain.post(DriveMessage::Kiwi {
                x: self.gamepad.axis(Axis::LeftX),
                y: self.gamepad.axis(Axis::LeftY),
                r: self.gamepad.axis(Axis::RightX),
            });
        }

        if let Some(putter) = &self.putter {
            putter.post(putter_command(&self.gamepad));
        }
    }

    /// 以固定周期运行控制循环，直到 shutdown 标志置位
    ///
    /// 退出前切换到 Disabled，保证所有执行器回到中立位。
    pub fn run(&mut self, period: Duration, shutdown: &AtomicBool) {
        info!(period_ms = period.as_millis() as u64, "Control loop started");
        while !shutdown.load(Ordering::Acquire) {
            self.poll_once();
            spin_sleep::sleep(period);
        }
        self.set_state(RobotState::Disabled);
        info!(cycles = self.loop_count, "Control loop stopped");
    }

    fn subsystems(&self) -> impl Iterator<Item = &dyn Subsystem> {
        let putter = self.putter.as_ref().map(|p| p as &dyn Subsystem);
        let drivetrain = self.drivetrain.as_ref().map(|d| d as &dyn Subsystem);
        putter.into_iter().chain(drivetrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use putterbot_hal::mock::MockGamepad;

    #[test]
    fn test_putter_command_idle_is_neutral_hold() {
        let pad = MockGamepad::new();
        assert_eq!(putter_command(&pad), PutterMessage::SlowMove { output: 0.0 });
    }

    #[test]
    fn test_putter_command_buttons() {
        let pad = MockGamepad::new();

        pad.press(Button::A);
        assert_eq!(putter_command(&pad), PutterMessage::Putt);
        pad.release_all();

        pad.press(Button::X);
        assert_eq!(
            putter_command(&pad),
            PutterMessage::SlowMove { output: SLOW_MOVE_OUTPUT }
        );
        pad.release_all();

        pad.press(Button::Y);
        assert_eq!(
            putter_command(&pad),
            PutterMessage::SlowMove { output: -SLOW_MOVE_OUTPUT }
        );
    }

    #[test]
    fn test_putter_command_bumpers_take_priority() {
        // 肩键与 A 同时按下时，速度调节优先于击球
        let pad = MockGamepad::new();
        pad.press(Button::A);
        pad.press(Button::BumperLeft);
        assert_eq!(putter_command(&pad), PutterMessage::IncSpeed);

        pad.release(Button::BumperLeft);
        pad.press(Button::BumperRight);
        assert_eq!(putter_command(&pad), PutterMessage::DecSpeed);
    }

    #[test]
    fn test_controller_without_subsystems_polls_safely() {
        // 子系统全部缺席：轮询只推进周期计数，不会出错
        let mut controller = RobotController::new(MockGamepad::new());
        controller.set_state(RobotState::Teleop);
        controller.poll_once();
        controller.poll_once();
        assert_eq!(controller.loop_count(), 2);
    }

    #[test]
    fn test_state_change_is_idempotent() {
        let mut controller = RobotController::new(MockGamepad::new());
        assert_eq!(controller.state(), RobotState::Disabled);
        controller.set_state(RobotState::Teleop);
        controller.set_state(RobotState::Teleop);
        assert_eq!(controller.state(), RobotState::Teleop);
    }
}
