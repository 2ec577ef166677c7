//! 任务层错误类型定义

use putterbot_hal::MotorError;
use thiserror::Error;

/// 任务层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 电机层错误
    #[error("Motor error: {0}")]
    Motor(#[from] MotorError),

    /// 子系统启动时执行器不在线
    ///
    /// 物理设备缺失或损坏，无法安全运行，无重试、无降级模式。
    #[error("Subsystem '{name}' motor not alive at startup")]
    MotorNotAlive { name: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use putterbot_hal::MotorDeviceError;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::MotorNotAlive { name: "putter" };
        assert!(err.to_string().contains("putter"));
    }

    #[test]
    fn test_from_motor_error() {
        let motor_error: MotorError = MotorDeviceError::from("bus down").into();
        let err: DriverError = motor_error.into();
        assert!(matches!(err, DriverError::Motor(_)));
    }
}
