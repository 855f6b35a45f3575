//! 设备信息与出厂限值

use crate::error::Result;
use crate::motion::MotionController;
use orca_protocol::Register;
use orca_protocol::bits::combine_u32_from_register_pair;
use orca_protocol::units::mv_to_v;
use orca_transport::ModbusTransport;
use semver::{BuildMetadata, Prerelease, Version};
use tracing::debug;

/// SERIAL_NUMBER 到 STATOR_CONFIG 的寄存器块
const INFO_BLOCK_START: u16 = Register::SerialNumber.address();
const INFO_BLOCK_LEN: u16 = Register::StatorConfig.address() - INFO_BLOCK_START + 1;

/// 设备信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceInfo {
    pub serial_number: u32,
    pub major_version: u16,
    /// 0 表示正式发布
    pub release_state: u16,
    pub revision_number: u16,
    pub commit_id: u32,
    pub hardware_version: u16,
    /// 通信超时（ms）
    pub comms_timeout_ms: u16,
    pub stator_config: u16,
}

impl DeviceInfo {
    fn from_block(block: &[u16]) -> Self {
        let at = |register: Register| block[(register.address() - INFO_BLOCK_START) as usize];
        let pair = |register: Register| {
            let offset = (register.address() - INFO_BLOCK_START) as usize;
            combine_u32_from_register_pair(block[offset], block[offset + 1])
        };

        Self {
            serial_number: pair(Register::SerialNumber),
            major_version: at(Register::MajorVersion),
            release_state: at(Register::ReleaseState),
            revision_number: at(Register::RevisionNumber),
            commit_id: pair(Register::CommitId),
            hardware_version: at(Register::HwVersion),
            comms_timeout_ms: at(Register::CommsTimeout),
            stator_config: at(Register::StatorConfig),
        }
    }

    /// 固件版本：`major.revision.0`，非正式发布带 `-rs.<release_state>`
    pub fn firmware_version(&self) -> Version {
        let pre = if self.release_state == 0 {
            Prerelease::EMPTY
        } else {
            Prerelease::new(&format!("rs.{}", self.release_state)).unwrap_or_default()
        };
        Version {
            major: self.major_version as u64,
            minor: self.revision_number as u64,
            patch: 0,
            pre,
            build: BuildMetadata::EMPTY,
        }
    }
}

/// 出厂限值（MAX_TEMP..MAX_POWER）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactoryLimits {
    pub max_temp_c: u16,
    pub min_voltage_v: f64,
    pub max_voltage_v: f64,
    pub max_current_ma: u16,
    pub max_power_w: u16,
}

impl<T: ModbusTransport> MotionController<T> {
    /// 一次读取整块设备信息
    pub fn device_info(&mut self) -> Result<DeviceInfo> {
        let block = self
            .link_mut()
            .read_register(INFO_BLOCK_START, INFO_BLOCK_LEN)?;
        let info = DeviceInfo::from_block(&block);
        debug!(
            "Device info: serial {}, firmware {}",
            info.serial_number,
            info.firmware_version()
        );
        Ok(info)
    }

    pub fn factory_limits(&mut self) -> Result<FactoryLimits> {
        let block = self.link_mut().read_register(Register::MaxTemp.address(), 5)?;
        Ok(FactoryLimits {
            max_temp_c: block[0],
            min_voltage_v: mv_to_v(block[1]),
            max_voltage_v: mv_to_v(block[2]),
            max_current_ma: block[3],
            max_power_w: block[4],
        })
    }
}
