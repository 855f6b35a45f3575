//! 串口链路参数

use std::time::Duration;

/// 校验位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    None,
    #[default]
    Even,
    Odd,
}

/// 串口链路参数
///
/// 默认值与执行器出厂设置一致：19200 波特，8 数据位，偶校验，1 停止位，从站地址 1。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerialConfig {
    /// 串口设备路径（如 "/dev/ttyUSB0"、"COM3"）
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    /// RTU 从站地址
    pub slave: u8,
    /// 单次请求的响应超时（毫秒）
    pub timeout_ms: u64,
}

impl SerialConfig {
    pub const DEFAULT_BAUD_RATE: u32 = 19_200;
    pub const DEFAULT_SLAVE: u8 = 1;

    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: Self::DEFAULT_BAUD_RATE,
            data_bits: 8,
            parity: Parity::Even,
            stop_bits: 1,
            slave: Self::DEFAULT_SLAVE,
            timeout_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 19_200);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, 1);
        assert_eq!(config.slave, 1);
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml() {
        let config: SerialConfig = toml::from_str(
            r#"
            port = "COM3"
            parity = "none"
            timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.port, "COM3");
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.baud_rate, 19_200);
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }
}
