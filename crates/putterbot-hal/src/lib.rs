//! # Putterbot HAL
//!
//! 硬件抽象层，提供统一的执行器/输入/遥测接口抽象。
//!
//! 电机驱动、手柄解码、仪表盘遥测都由场外供应商框架提供，
//! 本层只定义消费接口，不重新实现硬件能力。
//! `mock` feature 提供无硬件的内存实现，用于测试和演示程序。

use thiserror::Error;

#[cfg(feature = "mock")]
pub mod mock;

/// 电机层统一错误类型
#[derive(Error, Debug)]
pub enum MotorError {
    #[error("Device Error: {0}")]
    Device(#[from] MotorDeviceError),
    #[error("Output {0} out of range [-1, 1]")]
    OutputOutOfRange(f32),
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorDeviceErrorKind {
    Unknown,
    NotFound,
    NotAlive,
    BusFault,
    UnsupportedConfig,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct MotorDeviceError {
    pub kind: MotorDeviceErrorKind,
    pub message: String,
}

impl MotorDeviceError {
    pub fn new(kind: MotorDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            MotorDeviceErrorKind::NotFound | MotorDeviceErrorKind::NotAlive
        )
    }
}

impl From<String> for MotorDeviceError {
    fn from(message: String) -> Self {
        Self::new(MotorDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for MotorDeviceError {
    fn from(message: &str) -> Self {
        Self::new(MotorDeviceErrorKind::Unknown, message)
    }
}

/// 电机控制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// 百分比输出（相对母线电压）
    #[default]
    PercentOutput,
    /// 位置闭环（本仓库未使用，保留接口）
    Position,
}

/// 电机控制器抽象
///
/// 子系统任务独占持有电机句柄用于脚本序列输出；同时状态切换
/// 必须能从控制器线程同步置零，所以接口取 `&self`，实现方通过
/// 内部可变性保证线程安全。
pub trait MotorController: Send + Sync {
    /// 设置输出（[-1, 1]，正值为正转）
    fn set_output(&self, value: f32) -> Result<(), MotorError>;

    /// 设备是否在线（上电且总线可达）
    fn is_alive(&self) -> bool;

    /// 设置控制模式
    fn set_control_mode(&self, mode: ControlMode) -> Result<(), MotorError>;

    /// 设置电压斜坡速率（V/s）
    fn set_ramp_rate(&self, volts_per_second: f64) -> Result<(), MotorError>;
}

/// 手柄按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    BumperLeft,
    BumperRight,
}

/// 手柄摇杆轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// 操作员输入设备抽象
///
/// 控制器每个周期轮询一次；按键为离散状态查询，摇杆轴返回 [-1, 1]。
pub trait Gamepad: Send {
    /// 查询按键当前是否按下
    fn button(&self, button: Button) -> bool;

    /// 查询摇杆轴当前值（[-1, 1]）
    fn axis(&self, axis: Axis) -> f32;
}

// 控制器按值持有手柄；演示程序需要在脚本线程里共享同一个
// mock 手柄，因此为 Arc<T> 提供转发实现。
impl<T: Gamepad + Sync + ?Sized> Gamepad for std::sync::Arc<T> {
    fn button(&self, button: Button) -> bool {
        (**self).button(button)
    }

    fn axis(&self, axis: Axis) -> f32 {
        (**self).axis(axis)
    }
}

/// 遥测接收端抽象
///
/// 具名数值发布，fire-and-forget，无确认、无失败信号。
pub trait Telemetry: Send + Sync {
    /// 发布一个具名数值
    fn put_number(&self, key: &str, value: f64);
}

/// 空遥测端（丢弃所有发布）
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {
    fn put_number(&self, _key: &str, _value: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_device_error_fatal_kinds() {
        let not_alive = MotorDeviceError::new(MotorDeviceErrorKind::NotAlive, "no heartbeat");
        assert!(not_alive.is_fatal());

        let bus_fault = MotorDeviceError::new(MotorDeviceErrorKind::BusFault, "crc mismatch");
        assert!(!bus_fault.is_fatal());
    }

    #[test]
    fn test_motor_error_display() {
        let err = MotorError::OutputOutOfRange(1.5);
        assert!(err.to_string().contains("1.5"));

        let err: MotorError = MotorDeviceError::from("bus down").into();
        assert!(err.to_string().contains("bus down"));
    }

    #[test]
    fn test_null_telemetry_is_noop() {
        NullTelemetry.put_number("Putter Speed", 0.5);
    }
}
