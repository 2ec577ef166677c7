//! 底盘子系统任务
//!
//! 三轮全向（Kiwi）底盘：三个全向轮按 120° 均布，滚动方向分别
//! 位于 90°、210°、330°。每条 `Kiwi { x, y, r }` 消息混合为三个
//! 轮速输出；幅值超出 [-1, 1] 时整体等比缩小，保持运动方向不变。

use crate::config::DrivetrainConfig;
use crate::error::DriverError;
use crate::mailbox::{Mailbox, MailboxSender, mailbox};
use crate::subsystem::Subsystem;
use crossbeam_channel::RecvTimeoutError;
use putterbot_hal::{ControlMode, MotorController};
use putterbot_protocol::{DriveMessage, RobotState};
use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{error, info, trace};

/// sqrt(3) / 2，120° 均布轮系的混合系数
const SIN_120: f32 = 0.866_025_4;

/// 把平移 (x, y) 和旋转 r 混合为三个轮速
///
/// 轮序：前轮（滚动方向 90°）、左后轮（210°）、右后轮（330°）。
/// 任一轮幅值超过 1 时整体等比缩小。
fn kiwi_mix(x: f32, y: f32, r: f32) -> [f32; 3] {
    let mut wheels = [
        y + r,
        -SIN_120 * x - 0.5 * y + r,
        SIN_120 * x - 0.5 * y + r,
    ];

    let max = wheels.iter().fold(0.0f32, |acc, w| acc.max(w.abs()));
    if max > 1.0 {
        for w in &mut wheels {
            *w /= max;
        }
    }
    wheels
}

/// 底盘子系统句柄
///
/// 与 Putter 相同的任务结构：邮箱 + 专职工作线程，Drop 时先关闭
/// 邮箱再 join。底盘命令没有时序脚本，工作循环只把最新的混合
/// 结果写给三个电机。
pub struct Drivetrain {
    /// 邮箱发送端（Drop 时在 join 之前提前关闭）
    tx: ManuallyDrop<MailboxSender<DriveMessage>>,
    motors: [Arc<dyn MotorController>; 3],
    is_running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Drivetrain {
    /// 子系统名
    pub const NAME: &'static str = "drivetrain";

    /// 创建底盘任务
    ///
    /// # Errors
    /// - `DriverError::MotorNotAlive`: 任一轮电机启动时不在线
    /// - `DriverError::Motor`: 电机配置失败
    pub fn new(
        motors: [Arc<dyn MotorController>; 3],
        config: DrivetrainConfig,
    ) -> Result<Self, DriverError> {
        for motor in &motors {
            if !motor.is_alive() {
                return Err(DriverError::MotorNotAlive { name: Self::NAME });
            }
            motor.set_control_mode(ControlMode::PercentOutput)?;
        }

        let (tx, rx) = mailbox(Self::NAME);
        let is_running = Arc::new(AtomicBool::new(true));

        let worker_motors = motors.clone();
        let worker_running = is_running.clone();
        let worker =
            std::thread::spawn(move || drivetrain_loop(worker_motors, rx, worker_running, config));

        info!(subsystem = Self::NAME, "Drivetrain task started");
        Ok(Self {
            tx: ManuallyDrop::new(tx),
            motors,
            is_running,
            worker: Some(worker),
        })
    }

    /// 投递一条驱动消息（永不阻塞）
    pub fn post(&self, message: DriveMessage) {
        self.tx.post(message);
    }

    /// 状态切换处理：从当前线程同步把三个轮电机全部置零
    pub fn handle_state_change(&self, state: RobotState) {
        for motor in &self.motors {
            if let Err(e) = motor.set_output(0.0) {
                error!(subsystem = Self::NAME, "Failed to force neutral output: {}", e);
            }
        }
        info!(subsystem = Self::NAME, %state, "State change: actuators forced to neutral");
    }
}

impl Subsystem for Drivetrain {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_state_change(&self, state: RobotState) {
        self.handle_state_change(state);
    }
}

impl Drop for Drivetrain {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        // SAFETY: tx 只在这里 drop 一次，之后不再访问
        unsafe { ManuallyDrop::drop(&mut self.tx) };
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(subsystem = Self::NAME, "Drivetrain worker panicked");
            }
        }
    }
}

fn drivetrain_loop(
    motors: [Arc<dyn MotorController>; 3],
    rx: Mailbox<DriveMessage>,
    is_running: Arc<AtomicBool>,
    config: DrivetrainConfig,
) {
    loop {
        if !is_running.load(Ordering::Acquire) {
            trace!(subsystem = Drivetrain::NAME, "Run flag cleared, exiting");
            break;
        }

        match rx.recv_timeout(config.idle_tick) {
            Ok(DriveMessage::Kiwi { x, y, r }) => {
                let wheels = kiwi_mix(x, y, r);
                for (motor, output) in motors.iter().zip(wheels) {
                    if let Err(e) = motor.set_output(output) {
                        error!(
                            subsystem = Drivetrain::NAME,
                            "Failed to set wheel output: {}", e
                        );
                    }
                }
            },
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => {
                trace!(subsystem = Drivetrain::NAME, "Mailbox disconnected, exiting");
                break;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kiwi_mix_rest() {
        assert_eq!(kiwi_mix(0.0, 0.0, 0.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_kiwi_mix_pure_rotation() {
        // 原地旋转：三轮同速同向
        assert_eq!(kiwi_mix(0.0, 0.0, 0.5), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_kiwi_mix_pure_forward() {
        // 纯前进：前轮全速，两后轮半速反向
        let wheels = kiwi_mix(0.0, 1.0, 0.0);
        assert_eq!(wheels[0], 1.0);
        assert_eq!(wheels[1], -0.5);
        assert_eq!(wheels[2], -0.5);
    }

    #[test]
    fn test_kiwi_mix_pure_strafe_skips_front_wheel() {
        // 纯横移：前轮滚动方向与运动方向垂直，输出为零
        let wheels = kiwi_mix(1.0, 0.0, 0.0);
        assert_eq!(wheels[0], 0.0);
        assert!((wheels[1] + SIN_120).abs() < 1e-6);
        assert!((wheels[2] - SIN_120).abs() < 1e-6);
    }

    #[test]
    fn test_kiwi_mix_normalizes_preserving_ratios() {
        // 满平移 + 满旋转会超出 [-1, 1]，等比缩小后方向不变
        let wheels = kiwi_mix(0.0, 1.0, 1.0);
        let max = wheels.iter().fold(0.0f32, |acc, w| acc.max(w.abs()));
        assert!((max - 1.0).abs() < 1e-6);
        // 缩放前为 [2.0, 0.5, 0.5]，比例 4:1:1
        assert!((wheels[0] / wheels[1] - 4.0).abs() < 1e-6);
    }
}
