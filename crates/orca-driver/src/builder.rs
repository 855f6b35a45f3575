//! Builder 模式实现
//!
//! 提供链式构造 [`ActuatorLink`] 的便捷方式。

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::link::ActuatorLink;
use orca_protocol::ProtocolProfile;
use orca_transport::{ModbusTransport, SerialConfig};

/// RTU 从站地址的合法范围（0 为广播地址，不会应答）
const SLAVE_RANGE: std::ops::RangeInclusive<u8> = 1..=247;

/// ActuatorLink Builder（链式构造）
///
/// # Example
///
/// ```
/// use orca_driver::ActuatorLinkBuilder;
/// use orca_protocol::{HighSpeedResponseLayout, ProtocolProfile, SettlingTimeWidth};
/// # use orca_transport::MockTransport;
/// # let transport = MockTransport::new();
///
/// let link = ActuatorLinkBuilder::new()
///     .slave(1)
///     .profile(ProtocolProfile::new(
///         HighSpeedResponseLayout::StateByte,
///         SettlingTimeWidth::Wide32,
///     ))
///     .build(transport)
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ActuatorLinkBuilder {
    slave: u8,
    profile: ProtocolProfile,
    connect_on_build: bool,
}

impl Default for ActuatorLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorLinkBuilder {
    pub fn new() -> Self {
        Self {
            slave: SerialConfig::DEFAULT_SLAVE,
            profile: ProtocolProfile::default(),
            connect_on_build: true,
        }
    }

    /// 从驱动配置初始化（从站地址与协议配置）
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new().slave(config.serial.slave).profile(config.protocol)
    }

    /// 设置从站地址（默认 1）
    pub fn slave(mut self, slave: u8) -> Self {
        self.slave = slave;
        self
    }

    /// 设置协议配置（固件修订版本参数）
    pub fn profile(mut self, profile: ProtocolProfile) -> Self {
        self.profile = profile;
        self
    }

    /// 构建时是否打开链路（默认打开）
    pub fn connect_on_build(mut self, connect: bool) -> Self {
        self.connect_on_build = connect;
        self
    }

    pub fn build<T: ModbusTransport>(self, transport: T) -> Result<ActuatorLink<T>, DriverError> {
        if !SLAVE_RANGE.contains(&self.slave) {
            return Err(DriverError::InvalidInput(format!(
                "slave address {} out of range 1..=247",
                self.slave
            )));
        }

        let mut link = ActuatorLink::with_settings(transport, self.slave, self.profile);
        if self.connect_on_build {
            link.connect()?;
        }
        Ok(link)
    }
}
