//! Mock 硬件实现（无硬件依赖）
//!
//! 录制式的内存实现：电机记录每次输出及其时刻，手柄由测试方
//! 显式设置状态，遥测端把发布收进一个向量。全部接口取 `&self`，
//! 内部用原子量/`parking_lot` 锁保证线程安全，可以跨线程共享。

use crate::{Axis, Button, ControlMode, Gamepad, MotorController, MotorError, Telemetry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

/// Mock 电机：记录输出时间线
///
/// `timeline()` 返回 (时刻, 输出值) 序列，供测试断言脚本序列的
/// 相位顺序和时长。
pub struct MockMotor {
    alive: AtomicBool,
    /// 最近一次输出（f32 位模式写入 AtomicU32，免锁读取）
    last_output_bits: AtomicU32,
    timeline: Mutex<Vec<(Instant, f32)>>,
    ramp_rate: Mutex<Option<f64>>,
    control_mode: Mutex<ControlMode>,
}

impl MockMotor {
    /// 创建在线的 mock 电机
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            last_output_bits: AtomicU32::new(0.0f32.to_bits()),
            timeline: Mutex::new(Vec::new()),
            ramp_rate: Mutex::new(None),
            control_mode: Mutex::new(ControlMode::default()),
        }
    }

    /// 创建离线的 mock 电机（用于构造失败路径测试）
    pub fn dead() -> Self {
        let motor = Self::new();
        motor.alive.store(false, Ordering::Relaxed);
        motor
    }

    /// 标记设备掉线/上线
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }

    /// 最近一次输出值
    pub fn last_output(&self) -> f32 {
        f32::from_bits(self.last_output_bits.load(Ordering::Acquire))
    }

    /// 输出时间线快照
    pub fn timeline(&self) -> Vec<(Instant, f32)> {
        self.timeline.lock().clone()
    }

    /// 输出值序列（忽略时刻）
    pub fn outputs(&self) -> Vec<f32> {
        self.timeline.lock().iter().map(|&(_, v)| v).collect()
    }

    /// 清空记录
    pub fn clear_timeline(&self) {
        self.timeline.lock().clear();
    }

    /// 配置过的斜坡速率
    pub fn ramp_rate(&self) -> Option<f64> {
        *self.ramp_rate.lock()
    }

    /// 当前控制模式
    pub fn control_mode(&self) -> ControlMode {
        *self.control_mode.lock()
    }
}

impl Default for MockMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorController for MockMotor {
    fn set_output(&self, value: f32) -> Result<(), MotorError> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(MotorError::OutputOutOfRange(value));
        }
        self.last_output_bits.store(value.to_bits(), Ordering::Release);
        self.timeline.lock().push((Instant::now(), value));
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    fn set_control_mode(&self, mode: ControlMode) -> Result<(), MotorError> {
        *self.control_mode.lock() = mode;
        Ok(())
    }

    fn set_ramp_rate(&self, volts_per_second: f64) -> Result<(), MotorError> {
        *self.ramp_rate.lock() = Some(volts_per_second);
        Ok(())
    }
}

/// Mock 手柄：测试方显式设置按键/轴状态
#[derive(Default)]
pub struct MockGamepad {
    buttons: Mutex<HashMap<Button, bool>>,
    axes: Mutex<HashMap<Axis, f32>>,
}

impl MockGamepad {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按下某个按键
    pub fn press(&self, button: Button) {
        self.buttons.lock().insert(button, true);
    }

    /// 松开某个按键
    pub fn release(&self, button: Button) {
        self.buttons.lock().insert(button, false);
    }

    /// 松开所有按键
    pub fn release_all(&self) {
        self.buttons.lock().clear();
    }

    /// 设置摇杆轴值
    pub fn set_axis(&self, axis: Axis, value: f32) {
        self.axes.lock().insert(axis, value);
    }
}

impl Gamepad for MockGamepad {
    fn button(&self, button: Button) -> bool {
        self.buttons.lock().get(&button).copied().unwrap_or(false)
    }

    fn axis(&self, axis: Axis) -> f32 {
        self.axes.lock().get(&axis).copied().unwrap_or(0.0)
    }
}

/// Mock 遥测端：把发布收进向量
#[derive(Default)]
pub struct MockTelemetry {
    entries: Mutex<Vec<(String, f64)>>,
}

impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有发布过的条目
    pub fn entries(&self) -> Vec<(String, f64)> {
        self.entries.lock().clone()
    }

    /// 某个 key 最近一次发布的值
    pub fn last(&self, key: &str) -> Option<f64> {
        self.entries
            .lock()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|&(_, v)| v)
    }
}

impl Telemetry for MockTelemetry {
    fn put_number(&self, key: &str, value: f64) {
        self.entries.lock().push((key.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_motor_records_timeline() {
        let motor = MockMotor::new();
        motor.set_output(0.25).unwrap();
        motor.set_output(-0.50).unwrap();

        assert_eq!(motor.outputs(), vec![0.25, -0.50]);
        assert_eq!(motor.last_output(), -0.50);
    }

    #[test]
    fn test_mock_motor_rejects_out_of_range() {
        let motor = MockMotor::new();
        assert!(matches!(
            motor.set_output(1.5),
            Err(MotorError::OutputOutOfRange(_))
        ));
        // 越界输出不进时间线
        assert!(motor.outputs().is_empty());
    }

    #[test]
    fn test_dead_motor() {
        let motor = MockMotor::dead();
        assert!(!motor.is_alive());
        motor.set_alive(true);
        assert!(motor.is_alive());
    }

    #[test]
    fn test_mock_gamepad_defaults_released() {
        let pad = MockGamepad::new();
        assert!(!pad.button(Button::A));
        assert_eq!(pad.axis(Axis::LeftX), 0.0);

        pad.press(Button::A);
        pad.set_axis(Axis::LeftX, 0.7);
        assert!(pad.button(Button::A));
        assert_eq!(pad.axis(Axis::LeftX), 0.7);

        pad.release_all();
        assert!(!pad.button(Button::A));
    }

    #[test]
    fn test_mock_telemetry_last() {
        let sink = MockTelemetry::new();
        sink.put_number("Putter Speed", 0.50);
        sink.put_number("Putter Speed", 0.51);
        assert_eq!(sink.last("Putter Speed"), Some(0.51));
        assert_eq!(sink.last("missing"), None);
        assert_eq!(sink.entries().len(), 2);
    }
}
