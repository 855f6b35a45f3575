//! 传感器快照
//!
//! STATOR_TEMP (336) 到 COIL_TEMP (356) 用一次读请求取回，
//! 保证同一快照内的数值来自同一控制周期。

use crate::error::Result;
use crate::motion::MotionController;
use orca_protocol::Register;
use orca_protocol::bits::combine_from_register_pair;
use orca_protocol::units::{mn_to_n, mv_to_v, um_to_mm};
use orca_transport::ModbusTransport;

const SENSOR_BLOCK_START: u16 = Register::StatorTemp.address();
const SENSOR_BLOCK_LEN: u16 = Register::CoilTemp.address() - SENSOR_BLOCK_START + 1;

/// 传感器读数（寄存器原始单位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSnapshot {
    pub stator_temp_c: u16,
    pub driver_temp_c: u16,
    pub coil_temp_c: u16,
    pub voltage_mv: u16,
    pub position_um: i32,
    pub speed_mm_s: i32,
    pub acceleration_mm_s2: i32,
    pub force_mn: i32,
    pub power_w: u16,
    pub average_power_w: u16,
}

impl SensorSnapshot {
    fn from_block(block: &[u16]) -> Self {
        let at = |register: Register| block[(register.address() - SENSOR_BLOCK_START) as usize];
        let signed = |register: Register| {
            let offset = (register.address() - SENSOR_BLOCK_START) as usize;
            combine_from_register_pair(block[offset], block[offset + 1])
        };

        Self {
            stator_temp_c: at(Register::StatorTemp),
            driver_temp_c: at(Register::DriverTemp),
            coil_temp_c: at(Register::CoilTemp),
            voltage_mv: at(Register::VddFinal),
            position_um: signed(Register::ShaftPositionUm),
            speed_mm_s: signed(Register::ShaftSpeedMmps),
            acceleration_mm_s2: signed(Register::ShaftAccelMmpss),
            force_mn: signed(Register::Force),
            power_w: at(Register::Power),
            average_power_w: at(Register::AvgPower),
        }
    }

    pub fn position_mm(&self) -> f64 {
        um_to_mm(self.position_um)
    }

    pub fn force_n(&self) -> f64 {
        mn_to_n(self.force_mn)
    }

    pub fn voltage_v(&self) -> f64 {
        mv_to_v(self.voltage_mv)
    }
}

impl<T: ModbusTransport> MotionController<T> {
    pub fn sensors(&mut self) -> Result<SensorSnapshot> {
        let block = self
            .link_mut()
            .read_register(SENSOR_BLOCK_START, SENSOR_BLOCK_LEN)?;
        Ok(SensorSnapshot::from_block(&block))
    }

    /// 当前位置（µm）
    pub fn position_um(&mut self) -> Result<i32> {
        Ok(self
            .link_mut()
            .read_i32(Register::ShaftPositionUm.address())?)
    }

    /// 实测力（mN）
    pub fn force_mn(&mut self) -> Result<i32> {
        Ok(self.link_mut().read_i32(Register::Force.address())?)
    }
}
