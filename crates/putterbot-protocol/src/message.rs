//! 子系统命令消息定义
//!
//! 控制器每个周期读取一次手柄状态，为每个子系统合成恰好一条消息，
//! 通过邮箱投递给子系统任务。消息即"命令 ID + 参数联合体"：
//! 枚举变体保证单条消息只激活一个命令，参数只按该命令解释。

/// Putter 子系统命令消息
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PutterMessage {
    /// 低速直接驱动（定位用）
    ///
    /// 输出值由调用方限定范围（[-1, 1]），子系统不做二次校验。
    SlowMove {
        /// 电机输出（调用方约定范围）
        output: f32,
    },

    /// 执行一次完整的五相击球序列
    ///
    /// 序列在当前速度设定下按固定脚本执行，相位时长与速度成反比。
    /// 序列执行期间任务阻塞，完成后清空邮箱积压，避免重放。
    Putt,

    /// 速度设定增一步（0.01，上限 0.99）
    IncSpeed,

    /// 速度设定减一步（0.01，下限 0.10）
    DecSpeed,
}

/// Drivetrain 子系统命令消息
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DriveMessage {
    /// Kiwi 全向底盘驱动（三轮 120° 布局）
    Kiwi {
        /// 横向分量（左摇杆 X）
        x: f32,
        /// 纵向分量（左摇杆 Y）
        y: f32,
        /// 旋转分量（右摇杆 X）
        r: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_putter_message_carries_single_command() {
        let msg = PutterMessage::SlowMove { output: 0.1 };
        match msg {
            PutterMessage::SlowMove { output } => assert_eq!(output, 0.1),
            _ => panic!("Expected SlowMove variant"),
        }
    }

    #[test]
    fn test_drive_message_kiwi_params() {
        let msg = DriveMessage::Kiwi {
            x: 0.5,
            y: -0.5,
            r: 0.25,
        };
        let DriveMessage::Kiwi { x, y, r } = msg;
        assert_eq!((x, y, r), (0.5, -0.5, 0.25));
    }
}
