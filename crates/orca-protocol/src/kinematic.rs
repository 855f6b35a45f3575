//! 运动学动作槽
//!
//! 固件提供 32 个动作槽，每个占 6 个连续寄存器：
//!
//! | 偏移 | 内容 |
//! |---|---|
//! | 0-1 | 目标位置 µm（i32，低字在前） |
//! | 2-3 | 结算时间 ms（i32，低字在前；16 位固件高字为 0） |
//! | 4 | 自动启动延迟 ms（u16） |
//! | 5 | 链式位域 [`KinematicChain`] |

use crate::bits::{combine_from_register_pair, split_to_register_pair};
use crate::profile::SettlingTimeWidth;
use crate::ProtocolError;
use bilge::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 动作槽数量
pub const KINEMATIC_SLOT_COUNT: usize = 32;

/// 单个动作槽的寄存器数量
pub const KINEMATIC_SLOT_REGISTERS: usize = 6;

/// 轨迹类型字段（2 位）的最大值
const MOTION_TYPE_MAX: u8 = 0b11;

/// 下一个动作槽 ID 字段（5 位）的最大值
const NEXT_ID_MAX: u8 = 0b1_1111;

/// 轨迹类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MotionType {
    /// 最小功率
    MinimumPower = 0,
    /// 最小加加速度（最平滑）
    #[default]
    MinimumJerk = 1,
}

/// 动作槽链式位域（偏移 5）
///
/// 位序为 LSB first：
/// - Bit 0-1: 轨迹类型
/// - Bit 2-6: 下一个动作槽 ID
/// - Bit 7: 完成后自动启动下一个动作槽
/// - Bit 8-15: 保留
#[bitsize(16)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq, Default)]
pub struct KinematicChain {
    pub motion_type: u2,
    pub next_id: u5,
    pub auto_start_next: bool,
    pub reserved: u8,
}

impl KinematicChain {
    /// 打包三元组，超出位宽时返回错误
    pub fn pack(motion_type: u8, next_id: u8, auto_start_next: bool) -> Result<Self, ProtocolError> {
        if motion_type > MOTION_TYPE_MAX {
            return Err(ProtocolError::invalid("motion_type", motion_type));
        }
        if next_id > NEXT_ID_MAX {
            return Err(ProtocolError::invalid("next_id", next_id));
        }

        let mut chain = KinematicChain::from(0u16);
        chain.set_motion_type(u2::new(motion_type));
        chain.set_next_id(u5::new(next_id));
        chain.set_auto_start_next(auto_start_next);
        Ok(chain)
    }

    /// 解包为 `(motion_type, next_id, auto_start_next)`
    pub fn unpack(self) -> (u8, u8, bool) {
        (
            self.motion_type().value(),
            self.next_id().value(),
            self.auto_start_next(),
        )
    }

    pub fn to_register(self) -> u16 {
        u16::from(self)
    }

    pub fn from_register(value: u16) -> Self {
        KinematicChain::from(value)
    }
}

/// 单个动作槽配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KinematicMotion {
    pub position_target_um: i32,
    pub settling_time_ms: i32,
    pub auto_start_delay_ms: u16,
    pub motion_type: MotionType,
    pub next_id: u8,
    pub auto_start_next: bool,
}

impl KinematicMotion {
    /// 编码为 6 个寄存器值
    pub fn to_registers(
        &self,
        settling_time: SettlingTimeWidth,
    ) -> Result<[u16; KINEMATIC_SLOT_REGISTERS], ProtocolError> {
        let chain = KinematicChain::pack(self.motion_type.into(), self.next_id, self.auto_start_next)?;
        let (pos_low, pos_high) = split_to_register_pair(self.position_target_um);
        let (time_low, time_high) = match settling_time {
            SettlingTimeWidth::Wide32 => split_to_register_pair(self.settling_time_ms),
            SettlingTimeWidth::Narrow16 => {
                let narrow = u16::try_from(self.settling_time_ms)
                    .map_err(|_| ProtocolError::invalid("settling_time_ms", self.settling_time_ms))?;
                (narrow, 0)
            },
        };

        Ok([
            pos_low,
            pos_high,
            time_low,
            time_high,
            self.auto_start_delay_ms,
            chain.to_register(),
        ])
    }

    /// 从 6 个寄存器值解码
    pub fn from_registers(
        registers: &[u16],
        settling_time: SettlingTimeWidth,
    ) -> Result<Self, ProtocolError> {
        if registers.len() < KINEMATIC_SLOT_REGISTERS {
            return Err(ProtocolError::RegisterCount {
                what: "kinematic motion",
                expected: KINEMATIC_SLOT_REGISTERS,
                actual: registers.len(),
            });
        }

        let settling_time_ms = match settling_time {
            SettlingTimeWidth::Wide32 => combine_from_register_pair(registers[2], registers[3]),
            SettlingTimeWidth::Narrow16 => registers[2] as i32,
        };
        let (motion_type, next_id, auto_start_next) =
            KinematicChain::from_register(registers[5]).unpack();
        let motion_type = MotionType::try_from(motion_type)
            .map_err(|_| ProtocolError::invalid("motion_type", motion_type))?;

        Ok(Self {
            position_target_um: combine_from_register_pair(registers[0], registers[1]),
            settling_time_ms,
            auto_start_delay_ms: registers[4],
            motion_type,
            next_id,
            auto_start_next,
        })
    }
}

/// KINEMATIC_STATUS 寄存器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KinematicStatus {
    /// 当前动作槽 ID（bit 0-14）
    pub active_id: u16,
    /// 运动进行中（bit 15）
    pub in_progress: bool,
}

impl KinematicStatus {
    const IN_PROGRESS: u16 = 0x8000;
    const ID_MASK: u16 = 0x7FFF;

    pub fn from_register(value: u16) -> Self {
        Self {
            active_id: value & Self::ID_MASK,
            in_progress: value & Self::IN_PROGRESS != 0,
        }
    }

    pub fn to_register(self) -> u16 {
        let flag = if self.in_progress { Self::IN_PROGRESS } else { 0 };
        flag | (self.active_id & Self::ID_MASK)
    }
}
