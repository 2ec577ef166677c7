//! Putter 子系统任务
//!
//! 把离散命令流翻译为按时间排布的执行器设定点序列。
//!
//! 工作线程阻塞消费邮箱，按命令分发：
//! - 低速直驱：直接设定电机输出
//! - 速度调节：百分位步进 + 节奏延时，随后清空同一连发的积压
//! - 击球（Putt）：五相定时脚本，相位时长与当前速度成反比，
//!   每个相位边界检查状态切换纪元，完成或被抢占后清空邮箱积压
//!
//! 状态切换通知从调用方线程同步把电机置零，并递增纪元计数器，
//! 使正在执行的脚本序列在下一个相位边界放弃。

use crate::config::PutterConfig;
use crate::error::DriverError;
use crate::mailbox::{Mailbox, MailboxSender, mailbox};
use crate::subsystem::Subsystem;
use arc_swap::ArcSwap;
use crossbeam_channel::RecvTimeoutError;
use putterbot_hal::{ControlMode, MotorController, Telemetry};
use putterbot_protocol::constants::{
    PUTT_FOLLOW_THROUGH_COEFF, PUTT_PAUSE, PUTT_STROKE_COEFF, SPEED_ADJUST_PACE,
};
use putterbot_protocol::{PutterMessage, RobotState, SpeedSetting};
use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, trace};

/// 遥测键名
const TELEMETRY_KEY: &str = "Putter Speed";

/// Putter 状态快照（ArcSwap 无锁读取）
#[derive(Debug, Clone)]
pub struct PutterStatus {
    /// 当前速度设定（恰好两位小数）
    pub speed: f32,
    /// 最近一次命令的电机输出
    pub last_output: f32,
    /// 工作循环计数
    pub loop_count: u64,
}

/// 击球脚本的一个相位
#[derive(Debug, Clone, Copy, PartialEq)]
struct PuttPhase {
    /// 相位内的电机输出
    output: f32,
    /// 相位驻留时长
    dwell: Duration,
}

/// 在当前速度下展开五相击球脚本
///
/// 前段/回摆相位时长 = k1 / speed，随摆相位时长 = k2 / speed，
/// 相位间停顿固定 0.2 个时间单位。速度越低，相位越长。
fn putt_phases(speed: SpeedSetting, time_unit: Duration) -> [PuttPhase; 5] {
    let s = speed.as_f64();
    let stroke = time_unit.mul_f64(PUTT_STROKE_COEFF / s);
    let pause = time_unit.mul_f64(PUTT_PAUSE);
    let follow = time_unit.mul_f64(PUTT_FOLLOW_THROUGH_COEFF / s);
    let half = speed.as_f32() / 2.0;

    [
        // 前段：半速接近球
        PuttPhase { output: half, dwell: stroke },
        PuttPhase { output: 0.0, dwell: pause },
        // 回摆：全速反向击打
        PuttPhase { output: -speed.as_f32(), dwell: stroke },
        PuttPhase { output: 0.0, dwell: pause },
        // 随摆：半速回位
        PuttPhase { output: half, dwell: follow },
    ]
}

/// Putter 子系统句柄
///
/// 持有邮箱发送端和工作线程；Drop 时先关闭邮箱再 join 工作线程。
/// 执行器句柄在任务生命周期内由任务独占使用，状态切换置零是
/// 唯一的外部同步写入点。
pub struct Putter {
    /// 邮箱发送端
    ///
    /// Drop 时需要在 join 工作线程之前**提前关闭通道**，
    /// 否则工作循环可能一直收不到 Disconnected 而卡住退出。
    tx: ManuallyDrop<MailboxSender<PutterMessage>>,
    motor: Arc<dyn MotorController>,
    /// 状态切换纪元（每次切换 +1，脚本相位边界比对）
    epoch: Arc<AtomicU64>,
    /// 运行标志（Drop 时置 false）
    is_running: Arc<AtomicBool>,
    status: Arc<ArcSwap<PutterStatus>>,
    worker: Option<JoinHandle<()>>,
}

impl Putter {
    /// 子系统名
    pub const NAME: &'static str = "putter";

    /// 创建 Putter 任务
    ///
    /// 配置电机控制模式和电压斜坡速率，启动工作线程。
    ///
    /// # Errors
    /// - `DriverError::MotorNotAlive`: 执行器启动时不在线（致命，无重试）
    /// - `DriverError::Motor`: 电机配置失败
    pub fn new(
        motor: Arc<dyn MotorController>,
        telemetry: Arc<dyn Telemetry>,
        config: PutterConfig,
    ) -> Result<Self, DriverError> {
        if !motor.is_alive() {
            return Err(DriverError::MotorNotAlive { name: Self::NAME });
        }
        motor.set_control_mode(ControlMode::PercentOutput)?;
        motor.set_ramp_rate(config.ramp_rate)?;

        let (tx, rx) = mailbox(Self::NAME);
        let epoch = Arc::new(AtomicU64::new(0));
        let is_running = Arc::new(AtomicBool::new(true));
        let status = Arc::new(ArcSwap::from_pointee(PutterStatus {
            speed: config.initial_speed.as_f32(),
            last_output: 0.0,
            loop_count: 0,
        }));

        let worker_state = PutterWorker {
            motor: motor.clone(),
            rx,
            telemetry,
            epoch: epoch.clone(),
            is_running: is_running.clone(),
            status: status.clone(),
            speed: config.initial_speed,
            last_output: 0.0,
            iloop: 0,
            config,
        };
        let worker = std::thread::spawn(move || worker_state.run());

        info!(subsystem = Self::NAME, "Putter task started");
        Ok(Self {
            tx: ManuallyDrop::new(tx),
            motor,
            epoch,
            is_running,
            status,
            worker: Some(worker),
        })
    }

    /// 投递一条命令消息（永不阻塞）
    pub fn post(&self, message: PutterMessage) {
        self.tx.post(message);
    }

    /// 读取状态快照
    pub fn status(&self) -> Arc<PutterStatus> {
        self.status.load_full()
    }

    /// 状态切换处理
    ///
    /// 递增纪元（Release，工作线程在相位边界以 Acquire 比对），
    /// 并从当前线程同步把电机置零——正在阻塞执行的脚本序列
    /// 不会再写出后续相位输出。
    pub fn handle_state_change(&self, state: RobotState) {
        self.epoch.fetch_add(1, Ordering::Release);
        if let Err(e) = self.motor.set_output(0.0) {
            error!(subsystem = Self::NAME, "Failed to force neutral output: {}", e);
        }
        info!(subsystem = Self::NAME, %state, "State change: actuator forced to neutral");
    }
}

impl Subsystem for Putter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_state_change(&self, state: RobotState) {
        self.handle_state_change(state);
    }
}

impl Drop for Putter {
    fn drop(&mut self) {
        // Release：工作线程看到 false 时，之前的写入全部可见
        self.is_running.store(false, Ordering::Release);
        // SAFETY: tx 只在这里 drop 一次，之后不再访问
        unsafe { ManuallyDrop::drop(&mut self.tx) };
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(subsystem = Self::NAME, "Putter worker panicked");
            }
        }
    }
}

/// Putter 工作线程状态
///
/// 封装循环内的全部可变状态（速度设定、循环计数、最近输出），
/// 避免循环函数参数列表过长。
struct PutterWorker {
    motor: Arc<dyn MotorController>,
    rx: Mailbox<PutterMessage>,
    telemetry: Arc<dyn Telemetry>,
    epoch: Arc<AtomicU64>,
    is_running: Arc<AtomicBool>,
    status: Arc<ArcSwap<PutterStatus>>,
    speed: SpeedSetting,
    last_output: f32,
    iloop: u64,
    config: PutterConfig,
}

impl PutterWorker {
    /// 工作循环
    ///
    /// 阻塞消费邮箱（带空闲节拍超时），按命令分发；每 N 次循环
    /// 发布一次速度遥测，并刷新状态快照。
    fn run(mut self) {
        let pace = self.config.time_unit.mul_f64(SPEED_ADJUST_PACE);
        // 间隔为 0 时按每次循环发布，避免取余除零
        let telemetry_interval = self.config.telemetry_interval.max(1);

        loop {
            // Acquire：看到 false 时句柄侧的清理写入已可见
            if !self.is_running.load(Ordering::Acquire) {
                trace!(subsystem = Putter::NAME, "Run flag cleared, exiting");
                break;
            }
            self.iloop = self.iloop.wrapping_add(1);

            match self.rx.recv_timeout(self.config.idle_tick) {
                Ok(PutterMessage::SlowMove { output }) => {
                    // 低速定位：输出范围由调用方约定，不做二次校验
                    self.set_output(output);
                },
                Ok(PutterMessage::Putt) => {
                    self.run_putt_sequence();
                },
                Ok(PutterMessage::IncSpeed) => {
                    self.speed.increment();
                    spin_sleep::sleep(pace);
                    self.rx.clear();
                },
                Ok(PutterMessage::DecSpeed) => {
                    self.speed.decrement();
                    spin_sleep::sleep(pace);
                    self.rx.clear();
                },
                Err(RecvTimeoutError::Timeout) => {
                    // 空闲节拍：正常情况，用于遥测和退出检查
                },
                Err(RecvTimeoutError::Disconnected) => {
                    trace!(subsystem = Putter::NAME, "Mailbox disconnected, exiting");
                    break;
                },
            }

            // 遥测：每 N 次循环发布一次当前速度（恰好两位小数）
            if self.iloop % telemetry_interval == 0 {
                self.telemetry.put_number(TELEMETRY_KEY, self.speed.as_f64());
            }

            self.status.store(Arc::new(PutterStatus {
                speed: self.speed.as_f32(),
                last_output: self.last_output,
                loop_count: self.iloop,
            }));
        }
    }

    fn set_output(&mut self, value: f32) {
        match self.motor.set_output(value) {
            Ok(()) => self.last_output = value,
            Err(e) => {
                error!(subsystem = Putter::NAME, "Failed to set motor output: {}", e);
            },
        }
    }

    /// 执行五相击球脚本
    ///
    /// 序列在任务自己的循环里阻塞执行（建模不可中断的机械动作），
    /// 唯一的抢占点是状态切换：每个相位边界比对纪元，发现切换就
    /// 放弃剩余相位（置零已由状态切换方同步完成）。完成或被抢占
    /// 后清空邮箱积压，期间排队的重复触发不会重放脚本。
    fn run_putt_sequence(&mut self) {
        let start_epoch = self.epoch.load(Ordering::Acquire);
        let phases = putt_phases(self.speed, self.config.time_unit);
        let mut cancelled = false;

        debug!(subsystem = Putter::NAME, speed = %self.speed, "Putt sequence start");
        for phase in phases {
            if self.epoch.load(Ordering::Acquire) != start_epoch {
                cancelled = true;
                break;
            }
            self.set_output(phase.output);
            spin_sleep::sleep(phase.dwell);
        }

        if cancelled {
            info!(subsystem = Putter::NAME, "Putt sequence preempted by state change");
        } else {
            debug!(subsystem = Putter::NAME, "Putt sequence complete");
        }
        self.rx.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_putt_phase_outputs() {
        let speed = SpeedSetting::default(); // 0.50
        let phases = putt_phases(speed, Duration::from_secs(1));

        let outputs: Vec<f32> = phases.iter().map(|p| p.output).collect();
        assert_eq!(outputs, vec![0.25, 0.0, -0.50, 0.0, 0.25]);
    }

    #[test]
    fn test_putt_total_duration_half_speed() {
        // speed = 0.50：0.5 + 0.2 + 0.5 + 0.2 + 0.625 = 2.025 个时间单位
        let speed = SpeedSetting::default();
        let phases = putt_phases(speed, Duration::from_secs(1));

        let total: Duration = phases.iter().map(|p| p.dwell).sum();
        assert_eq!(total, Duration::from_millis(2025));
    }

    #[test]
    fn test_putt_duration_scales_with_time_unit() {
        let speed = SpeedSetting::default();
        let phases = putt_phases(speed, Duration::from_millis(40));

        let total: Duration = phases.iter().map(|p| p.dwell).sum();
        assert_eq!(total, Duration::from_millis(81)); // 2.025 * 40ms
    }

    #[test]
    fn test_putt_phases_longer_at_lower_speed() {
        let slow = SpeedSetting::from_hundredths(10).unwrap();
        let fast = SpeedSetting::from_hundredths(99).unwrap();
        let unit = Duration::from_secs(1);

        let slow_total: Duration = putt_phases(slow, unit).iter().map(|p| p.dwell).sum();
        let fast_total: Duration = putt_phases(fast, unit).iter().map(|p| p.dwell).sum();
        assert!(slow_total > fast_total);
    }
}
