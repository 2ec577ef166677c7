//! # Putterbot Protocol
//!
//! 子系统命令消息定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 控制常量定义（限幅、步长、击球相位系数）
//! - `message`: 子系统命令消息（Putter / Drivetrain）
//! - `speed`: 击球速度设定（百分位定点表示）
//! - `state`: 机器人运行状态（Disabled / Teleop / Autonomous）
//!
//! ## 设计说明
//!
//! 每个子系统有自己的消息枚举：命令 ID 与参数合并为枚举变体，
//! 单条消息天然只携带一个命令，参数只按该命令解释。
//! 控制器每个周期为每个子系统构造一条消息并投递到其邮箱。

pub mod constants;
pub mod message;
pub mod speed;
pub mod state;

// 重新导出常用类型
pub use constants::*;
pub use message::{DriveMessage, PutterMessage};
pub use speed::{SpeedError, SpeedSetting};
pub use state::RobotState;
