//! 操作台主入口
//!
//! 在 mock 硬件上运行完整的控制栈：控制器 + Putter + Kiwi 底盘。
//! 可选的演示脚本线程模拟手柄操作（增速、击球、低速定位），
//! 用于在没有真实硬件时验证任务分发和时序行为。

mod config;

use anyhow::Context;
use clap::Parser;
use config::OperatorConfig;
use putterbot_driver::{Drivetrain, DrivetrainConfig, Putter, RobotController};
use putterbot_hal::mock::{MockGamepad, MockMotor, MockTelemetry};
use putterbot_hal::{Button, MotorController, Telemetry};
use putterbot_protocol::RobotState;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// 击球机器人操作台
#[derive(Parser, Debug)]
#[command(name = "putterbot_operator")]
#[command(about = "Putter robot operator console (mock hardware)", long_about = None)]
struct Args {
    /// 配置文件路径（TOML，省略时使用默认配置）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 运行演示脚本（模拟一串手柄操作后退出）
    #[arg(long)]
    demo: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("putterbot_operator=info".parse().unwrap())
                .add_directive("putterbot_driver=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => OperatorConfig::load(path)?,
        None => OperatorConfig::default(),
    };
    info!(?config, "Operator console starting");

    // mock 硬件：一台击球电机，三台底盘轮电机
    let putter_motor = Arc::new(MockMotor::new());
    let wheel_motors = [
        Arc::new(MockMotor::new()),
        Arc::new(MockMotor::new()),
        Arc::new(MockMotor::new()),
    ];
    let telemetry = Arc::new(MockTelemetry::new());
    let gamepad = Arc::new(MockGamepad::new());

    let putter = Putter::new(
        putter_motor.clone() as Arc<dyn MotorController>,
        telemetry.clone() as Arc<dyn Telemetry>,
        config.putter_config()?,
    )
    .context("Failed to start putter task")?;
    let drivetrain = Drivetrain::new(
        [
            wheel_motors[0].clone() as Arc<dyn MotorController>,
            wheel_motors[1].clone() as Arc<dyn MotorController>,
            wheel_motors[2].clone() as Arc<dyn MotorController>,
        ],
        DrivetrainConfig::default(),
    )
    .context("Failed to start drivetrain task")?;

    let mut controller = RobotController::new(gamepad.clone())
        .with_putter(putter)
        .with_drivetrain(drivetrain);
    controller.set_state(RobotState::Teleop);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal. Shutting down...");
        flag.store(true, Ordering::Release);
    })
    .expect("Failed to set signal handler");

    if args.demo {
        let pad = gamepad.clone();
        let flag = shutdown.clone();
        let time_unit = Duration::from_millis(config.time_unit_ms);
        std::thread::spawn(move || {
            demo_script(&pad, time_unit);
            flag.store(true, Ordering::Release);
        });
    }

    controller.run(config.cycle(), &shutdown);

    if let Some(putter) = controller.putter() {
        let status = putter.status();
        info!(
            speed = format!("{:.2}", status.speed),
            loops = status.loop_count,
            "Final putter status"
        );
    }
    if let Some(speed) = telemetry.last("Putter Speed") {
        info!(speed, "Last published telemetry");
    }
    Ok(())
}

/// 演示脚本：两次增速、一次击球、短暂低速回位
fn demo_script(pad: &MockGamepad, time_unit: Duration) {
    let tap = |button: Button, hold: Duration| {
        pad.press(button);
        std::thread::sleep(hold);
        pad.release_all();
        std::thread::sleep(Duration::from_millis(50));
    };

    info!("Demo script: bumping speed up twice");
    tap(Button::BumperLeft, Duration::from_millis(30));
    tap(Button::BumperLeft, Duration::from_millis(30));

    info!("Demo script: triggering putt");
    tap(Button::A, Duration::from_millis(30));
    // 等完整脚本结束（约 2.025 个时间单位 @ 0.52）再回位
    std::thread::sleep(time_unit.mul_f64(2.5));

    info!("Demo script: slow repositioning");
    tap(Button::Y, Duration::from_millis(200));

    info!("Demo script finished");
}
