//! 位置控制器增益与用户限值

use crate::error::Result;
use crate::motion::MotionController;
use orca_protocol::bits::{combine_u32_from_register_pair, pair_from_slice, split_u32_to_register_pair};
use orca_protocol::registers::ctrl1;
use orca_protocol::{ProtocolError, Register};
use orca_transport::ModbusTransport;
use tracing::info;

/// 位置控制器参数（PC_P_GAIN 起始的 6 个寄存器）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionGains {
    pub p: u16,
    pub i: u16,
    pub dv: u16,
    pub de: u16,
    /// 力饱和（mN）
    pub force_saturation_mn: u32,
}

impl PositionGains {
    pub const REGISTERS: usize = 6;

    pub fn to_registers(&self) -> [u16; Self::REGISTERS] {
        let (sat_low, sat_high) = split_u32_to_register_pair(self.force_saturation_mn);
        [self.p, self.i, self.dv, self.de, sat_low, sat_high]
    }

    pub fn from_registers(registers: &[u16]) -> std::result::Result<Self, ProtocolError> {
        let [p, i, dv, de, rest @ ..] = registers else {
            return Err(ProtocolError::RegisterCount {
                what: "position gains",
                expected: Self::REGISTERS,
                actual: registers.len(),
            });
        };
        let (sat_low, sat_high) = pair_from_slice(rest, "position gains")?;
        Ok(Self {
            p: *p,
            i: *i,
            dv: *dv,
            de: *de,
            force_saturation_mn: combine_u32_from_register_pair(sat_low, sat_high),
        })
    }
}

/// 用户限值（USER_MAX_TEMP 起始的 5 个寄存器）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserLimits {
    pub max_temp_c: u16,
    pub max_force_mn: u32,
    pub max_power_w: u16,
    pub safety_damping: u16,
}

impl UserLimits {
    pub const REGISTERS: usize = 5;

    pub fn to_registers(&self) -> [u16; Self::REGISTERS] {
        let (force_low, force_high) = split_u32_to_register_pair(self.max_force_mn);
        [
            self.max_temp_c,
            force_low,
            force_high,
            self.max_power_w,
            self.safety_damping,
        ]
    }

    pub fn from_registers(registers: &[u16]) -> std::result::Result<Self, ProtocolError> {
        let [temp, force_low, force_high, power, damping, ..] = registers else {
            return Err(ProtocolError::RegisterCount {
                what: "user limits",
                expected: Self::REGISTERS,
                actual: registers.len(),
            });
        };
        Ok(Self {
            max_temp_c: *temp,
            max_force_mn: combine_u32_from_register_pair(*force_low, *force_high),
            max_power_w: *power,
            safety_damping: *damping,
        })
    }
}

impl<T: ModbusTransport> MotionController<T> {
    /// 写入位置控制器增益并通知固件加载
    pub fn tune_position_controller(&mut self, gains: &PositionGains) -> Result<()> {
        let link = self.link_mut();
        link.write_registers(Register::PcPGain.address(), &gains.to_registers())?;
        link.write_u16(Register::CtrlReg1, ctrl1::SET_POSITION_CONTROLLER_GAIN)?;
        info!("Position controller tuned: {:?}", gains);
        Ok(())
    }

    pub fn position_gains(&mut self) -> Result<PositionGains> {
        let registers = self
            .link_mut()
            .read_register(Register::PcPGain.address(), PositionGains::REGISTERS as u16)?;
        Ok(PositionGains::from_registers(&registers)?)
    }

    pub fn set_user_limits(&mut self, limits: &UserLimits) -> Result<()> {
        self.link_mut()
            .write_registers(Register::UserMaxTemp.address(), &limits.to_registers())?;
        info!("User limits set: {:?}", limits);
        Ok(())
    }

    pub fn user_limits(&mut self) -> Result<UserLimits> {
        let registers = self
            .link_mut()
            .read_register(Register::UserMaxTemp.address(), UserLimits::REGISTERS as u16)?;
        Ok(UserLimits::from_registers(&registers)?)
    }
}
