//! 操作台配置
//!
//! TOML 配置文件 + 默认值。所有字段可省略，省略时取比赛默认值。

use anyhow::Context;
use putterbot_driver::PutterConfig;
use putterbot_protocol::SpeedSetting;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 操作台配置（TOML 反序列化）
///
/// # Example
///
/// ```toml
/// cycle_ms = 20
/// time_unit_ms = 1000
/// initial_speed_hundredths = 50
/// telemetry_interval = 25
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorConfig {
    /// 控制周期（毫秒）
    pub cycle_ms: u64,
    /// 击球脚本时间单位（毫秒，比赛值 1000）
    pub time_unit_ms: u64,
    /// 初始速度设定（百分位，10..=99）
    pub initial_speed_hundredths: u8,
    /// 遥测发布间隔（工作循环次数）
    pub telemetry_interval: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            cycle_ms: 20,
            time_unit_ms: 1000,
            initial_speed_hundredths: 50,
            telemetry_interval: 25,
        }
    }
}

impl OperatorConfig {
    /// 从 TOML 文件加载配置
    ///
    /// # Errors
    /// 文件不可读或内容不是合法的配置 TOML 时返回错误
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// 转换为 Putter 任务配置
    ///
    /// # Errors
    /// 初始速度不在 [10, 99] 范围内、或遥测间隔为 0 时返回错误
    pub fn putter_config(&self) -> anyhow::Result<PutterConfig> {
        let initial_speed = SpeedSetting::from_hundredths(self.initial_speed_hundredths)
            .context("Invalid initial_speed_hundredths in config")?;
        anyhow::ensure!(
            self.telemetry_interval > 0,
            "telemetry_interval must be at least 1"
        );
        Ok(PutterConfig {
            initial_speed,
            time_unit: Duration::from_millis(self.time_unit_ms),
            telemetry_interval: self.telemetry_interval,
            ..PutterConfig::default()
        })
    }

    /// 控制周期
    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_competition_values() {
        let config = OperatorConfig::default();
        assert_eq!(config.cycle_ms, 20);
        assert_eq!(config.time_unit_ms, 1000);
        assert_eq!(config.initial_speed_hundredths, 50);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: OperatorConfig = toml::from_str("cycle_ms = 10").unwrap();
        assert_eq!(config.cycle_ms, 10);
        assert_eq!(config.time_unit_ms, 1000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<OperatorConfig, _> = toml::from_str("cycle_msec = 10");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_telemetry_interval_rejected_at_conversion() {
        let config = OperatorConfig {
            telemetry_interval: 0,
            ..OperatorConfig::default()
        };
        assert!(config.putter_config().is_err());
    }

    #[test]
    fn test_invalid_speed_rejected_at_conversion() {
        let config = OperatorConfig {
            initial_speed_hundredths: 5,
            ..OperatorConfig::default()
        };
        assert!(config.putter_config().is_err());
    }
}
