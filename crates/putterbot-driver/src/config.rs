//! 子系统任务配置
//!
//! 所有数值常量集中为具名配置项（默认值来自
//! `putterbot_protocol::constants`），时间量以 `time_unit` 为刻度，
//! 测试可以把刻度缩到毫秒级验证序列时长。

use putterbot_protocol::SpeedSetting;
use putterbot_protocol::constants::{PUTTER_RAMP_RATE, TELEMETRY_INTERVAL};
use std::time::Duration;

/// Putter 任务配置
///
/// # Example
///
/// ```
/// use putterbot_driver::PutterConfig;
/// use std::time::Duration;
///
/// // 默认配置（时间刻度 1 秒）
/// let config = PutterConfig::default();
///
/// // 测试用：毫秒级时间刻度
/// let config = PutterConfig {
///     time_unit: Duration::from_millis(10),
///     ..PutterConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PutterConfig {
    /// 初始速度设定
    pub initial_speed: SpeedSetting,
    /// 时间刻度（相位时长、节奏延时按它换算；默认 1 秒）
    pub time_unit: Duration,
    /// 空闲循环节拍（阻塞接收的超时，用于遥测节拍和退出检查）
    pub idle_tick: Duration,
    /// 遥测发布间隔（每 N 次循环一次；0 按每次循环处理）
    pub telemetry_interval: u64,
    /// 电机电压斜坡速率（V/s）
    pub ramp_rate: f64,
}

impl Default for PutterConfig {
    fn default() -> Self {
        Self {
            initial_speed: SpeedSetting::default(),
            time_unit: Duration::from_secs(1),
            idle_tick: Duration::from_millis(20),
            telemetry_interval: TELEMETRY_INTERVAL,
            ramp_rate: PUTTER_RAMP_RATE,
        }
    }
}

/// Drivetrain 任务配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrivetrainConfig {
    /// 空闲循环节拍
    pub idle_tick: Duration,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            idle_tick: Duration::from_millis(20),
        }
    }
}
