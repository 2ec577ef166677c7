//! 子系统任务层模块
//!
//! 本模块提供 putterbot 的核心任务框架，包括：
//! - 单生产者/单消费者邮箱（控制器 → 子系统任务）
//! - 子系统任务（Putter、Drivetrain）：独立工作线程 + 阻塞式命令循环
//! - 状态切换广播与脚本序列的协作式抢占
//! - 机器人控制器：每周期轮询手柄并分发命令消息
//!
//! # 并发模型
//!
//! 每个子系统一个独立工作线程，只通过自己的邮箱与控制器通信；
//! 执行器句柄由子系统任务独占使用，状态切换时由句柄线程同步置零。
//! 控制器投递消息永不阻塞（fire-and-forget）。

mod config;
mod error;
pub mod drivetrain;
pub mod mailbox;
pub mod putter;
pub mod robot;
pub mod subsystem;

pub use config::{DrivetrainConfig, PutterConfig};
pub use drivetrain::Drivetrain;
pub use error::DriverError;
pub use mailbox::{Mailbox, MailboxSender, mailbox};
pub use putter::{Putter, PutterStatus};
pub use robot::RobotController;
pub use subsystem::Subsystem;
