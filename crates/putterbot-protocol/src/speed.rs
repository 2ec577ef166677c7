//! 击球速度设定
//!
//! 速度以百分位整数存储（10..=99），避免浮点步进累积误差：
//! 反复增速收敛到恰好 0.99，反复减速收敛到恰好 0.10。

use crate::constants::{
    SPEED_DEFAULT_HUNDREDTHS, SPEED_MAX_HUNDREDTHS, SPEED_MIN_HUNDREDTHS, SPEED_STEP_HUNDREDTHS,
};
use thiserror::Error;

/// 速度设定错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedError {
    /// 初始值超出 [0.10, 0.99] 范围
    #[error("Speed {0} hundredths out of range [{SPEED_MIN_HUNDREDTHS}, {SPEED_MAX_HUNDREDTHS}]")]
    OutOfRange(u8),
}

/// 击球速度设定（百分位定点）
///
/// 内部存储百分位整数（例如 50 表示 0.50），步进恒为 0.01。
/// 增速只在上限处截断，减速只在下限处截断，两个方向互不检查
/// 对侧边界。
///
/// # Example
///
/// ```
/// use putterbot_protocol::SpeedSetting;
///
/// let mut speed = SpeedSetting::default();
/// assert_eq!(speed.as_f32(), 0.50);
///
/// speed.increment();
/// assert_eq!(speed.hundredths(), 51);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedSetting(u8);

impl SpeedSetting {
    /// 下限（0.10）
    pub const MIN: Self = Self(SPEED_MIN_HUNDREDTHS);
    /// 上限（0.99）
    pub const MAX: Self = Self(SPEED_MAX_HUNDREDTHS);

    /// 从百分位整数创建
    ///
    /// # Errors
    /// - `SpeedError::OutOfRange`: 值不在 [10, 99] 内
    pub fn from_hundredths(value: u8) -> Result<Self, SpeedError> {
        if (SPEED_MIN_HUNDREDTHS..=SPEED_MAX_HUNDREDTHS).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SpeedError::OutOfRange(value))
        }
    }

    /// 获取百分位整数值
    pub fn hundredths(self) -> u8 {
        self.0
    }

    /// 获取浮点速度值（恰好两位小数）
    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    /// 获取浮点速度值（f64，用于相位时长计算）
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// 增速一步（在 0.99 处截断）
    pub fn increment(&mut self) {
        self.0 = (self.0 + SPEED_STEP_HUNDREDTHS).min(SPEED_MAX_HUNDREDTHS);
    }

    /// 减速一步（在 0.10 处截断）
    pub fn decrement(&mut self) {
        self.0 = (self.0 - SPEED_STEP_HUNDREDTHS).max(SPEED_MIN_HUNDREDTHS);
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        Self(SPEED_DEFAULT_HUNDREDTHS)
    }
}

impl std::fmt::Display for SpeedSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.as_f32())
    }
}
