//! 触觉效果寄存器块
//!
//! - HAPTIC_STATUS (641)：效果使能位域
//! - 弹簧 0-2：基地址 `644 + 6 * spring`，各 6 个寄存器
//! - 振荡器 0-1：基地址 `664 + 4 * oscillator`，各 4 个寄存器

use crate::bits::{combine_from_register_pair, split_to_register_pair};
use crate::registers::Register;
use crate::ProtocolError;
use bilge::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 效果使能位域（HAPTIC_STATUS）
#[bitsize(16)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq, Default)]
pub struct HapticEffects {
    pub constant_force: bool, // Bit 0
    pub spring0: bool,        // Bit 1
    pub spring1: bool,        // Bit 2
    pub spring2: bool,        // Bit 3
    pub damper: bool,         // Bit 4
    pub inertia: bool,        // Bit 5
    pub oscillator0: bool,    // Bit 6
    pub oscillator1: bool,    // Bit 7
    pub reserved: u8,         // Bit 8-15
}

impl HapticEffects {
    /// 全部关闭
    pub fn none() -> Self {
        HapticEffects::from(0u16)
    }

    pub fn to_register(self) -> u16 {
        u16::from(self)
    }

    pub fn from_register(value: u16) -> Self {
        HapticEffects::from(value)
    }
}

/// 弹簧作用方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum SpringCoupling {
    #[default]
    Both = 0,
    Positive = 1,
    Negative = 2,
}

/// 弹簧编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringId {
    Spring0,
    Spring1,
    Spring2,
}

impl SpringId {
    /// 块起始寄存器
    pub fn base(self) -> Register {
        match self {
            SpringId::Spring0 => Register::S0GainNMm,
            SpringId::Spring1 => Register::S1GainNMm,
            SpringId::Spring2 => Register::S2GainNMm,
        }
    }
}

/// 弹簧效果（6 个寄存器）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringEffect {
    pub gain_n_per_mm: u16,
    pub center_um: i32,
    pub coupling: SpringCoupling,
    pub dead_zone_mm: u16,
    pub force_saturation_n: u16,
}

impl SpringEffect {
    pub const REGISTERS: usize = 6;

    pub fn to_registers(&self) -> [u16; Self::REGISTERS] {
        let (center_low, center_high) = split_to_register_pair(self.center_um);
        [
            self.gain_n_per_mm,
            center_low,
            center_high,
            self.coupling.into(),
            self.dead_zone_mm,
            self.force_saturation_n,
        ]
    }

    pub fn from_registers(registers: &[u16]) -> Result<Self, ProtocolError> {
        let [gain, center_low, center_high, coupling, dead_zone, saturation, ..] = registers else {
            return Err(ProtocolError::RegisterCount {
                what: "spring effect",
                expected: Self::REGISTERS,
                actual: registers.len(),
            });
        };
        let coupling = SpringCoupling::try_from(*coupling)
            .map_err(|_| ProtocolError::invalid("spring_coupling", *coupling))?;

        Ok(Self {
            gain_n_per_mm: *gain,
            center_um: combine_from_register_pair(*center_low, *center_high),
            coupling,
            dead_zone_mm: *dead_zone,
            force_saturation_n: *saturation,
        })
    }
}

/// 振荡器波形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum OscillatorWaveform {
    #[default]
    Square = 0,
    Sine = 1,
    Triangle = 2,
    Sawtooth = 3,
}

/// 振荡器编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorId {
    Oscillator0,
    Oscillator1,
}

impl OscillatorId {
    pub fn base(self) -> Register {
        match self {
            OscillatorId::Oscillator0 => Register::O0GainN,
            OscillatorId::Oscillator1 => Register::O1GainN,
        }
    }
}

/// 振荡器效果（4 个寄存器）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OscillatorEffect {
    pub gain_n: u16,
    pub waveform: OscillatorWaveform,
    /// 频率（0.1 Hz）
    pub frequency_dhz: u16,
    /// 占空比（%）
    pub duty: u16,
}

impl OscillatorEffect {
    pub const REGISTERS: usize = 4;

    pub fn to_registers(&self) -> [u16; Self::REGISTERS] {
        [self.gain_n, self.waveform.into(), self.frequency_dhz, self.duty]
    }

    pub fn from_registers(registers: &[u16]) -> Result<Self, ProtocolError> {
        let [gain, waveform, frequency, duty, ..] = registers else {
            return Err(ProtocolError::RegisterCount {
                what: "oscillator effect",
                expected: Self::REGISTERS,
                actual: registers.len(),
            });
        };
        let waveform = OscillatorWaveform::try_from(*waveform)
            .map_err(|_| ProtocolError::invalid("oscillator_type", *waveform))?;

        Ok(Self {
            gain_n: *gain,
            waveform,
            frequency_dhz: *frequency,
            duty: *duty,
        })
    }
}
