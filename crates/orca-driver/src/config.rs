//! 驱动配置（TOML）
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 19200
//! parity = "even"
//! slave = 1
//! timeout_ms = 1000
//!
//! [protocol]
//! high_speed_response = "baud_and_delay"
//! settling_time = "wide32"
//! ```
//!
//! 所有字段都有默认值，缺省的段落或字段使用出厂设置。

use crate::builder::ActuatorLinkBuilder;
use orca_protocol::ProtocolProfile;
use orca_transport::SerialConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 驱动配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// 串口链路参数
    pub serial: SerialConfig,
    /// 固件修订版本参数
    pub protocol: ProtocolProfile,
}

impl DriverConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存配置到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 以本配置初始化的链路 Builder
    pub fn link_builder(&self) -> ActuatorLinkBuilder {
        ActuatorLinkBuilder::from_config(self)
    }
}
