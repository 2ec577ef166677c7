//! 控制常量定义
//!
//! 集中定义所有控制相关的常量，避免在代码中散落"魔法数"。

/// 击球速度下限（百分位，对应 0.10）
pub const SPEED_MIN_HUNDREDTHS: u8 = 10;

/// 击球速度上限（百分位，对应 0.99）
pub const SPEED_MAX_HUNDREDTHS: u8 = 99;

/// 击球速度默认值（百分位，对应 0.50）
pub const SPEED_DEFAULT_HUNDREDTHS: u8 = 50;

/// 速度增减步长（百分位，对应每次 0.01）
pub const SPEED_STEP_HUNDREDTHS: u8 = 1;

/// 击球序列前段/回摆相位系数（k1）
///
/// 相位时长 = k1 / speed 个时间单位，速度越低相位越长。
pub const PUTT_STROKE_COEFF: f64 = 0.25;

/// 击球序列随摆相位系数（k2 = 1.25 * k1）
pub const PUTT_FOLLOW_THROUGH_COEFF: f64 = 0.3125;

/// 击球序列相位间停顿（时间单位）
pub const PUTT_PAUSE: f64 = 0.2;

/// 速度调节后的节奏延时（时间单位）
pub const SPEED_ADJUST_PACE: f64 = 0.1;

/// 遥测发布间隔（每 N 次循环发布一次）
pub const TELEMETRY_INTERVAL: u64 = 25;

/// 电机电压斜坡速率（V/s，硬件配置值）
pub const PUTTER_RAMP_RATE: f64 = 240.0;
