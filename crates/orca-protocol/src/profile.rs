//! 固件版本相关的线格式差异
//!
//! 不同固件修订版本在以下两点上不兼容：
//!
//! 1. ManageHighSpeedStream 响应：2 字段（波特率、延迟）或 3 字段（额外的状态命令，u8 或 u32）
//! 2. 动作槽结算时间：32 位（占两个寄存器）或 16 位（高字保留为 0）
//!
//! 编解码器不做自动猜测，由调用方通过 [`ProtocolProfile`] 显式指定。

/// ManageHighSpeedStream 响应布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HighSpeedResponseLayout {
    /// 波特率 (u32) + 延迟 (u16)，共 6 字节
    #[default]
    BaudAndDelay,
    /// 状态命令 (u8) + 波特率 (u32) + 延迟 (u16)，共 7 字节
    StateByte,
    /// 状态命令 (u32) + 波特率 (u32) + 延迟 (u16)，共 10 字节
    StateWord,
}

impl HighSpeedResponseLayout {
    /// 响应载荷固定长度
    pub const fn payload_len(self) -> usize {
        match self {
            Self::BaudAndDelay => 6,
            Self::StateByte => 7,
            Self::StateWord => 10,
        }
    }
}

/// 动作槽结算时间字段宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SettlingTimeWidth {
    /// 32 位有符号，低字在前
    #[default]
    Wide32,
    /// 16 位，高字写 0；超过 `u16::MAX` 的值被拒绝
    Narrow16,
}

/// 协议配置（固件修订版本参数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProtocolProfile {
    pub high_speed_response: HighSpeedResponseLayout,
    pub settling_time: SettlingTimeWidth,
}

impl ProtocolProfile {
    pub fn new(high_speed_response: HighSpeedResponseLayout, settling_time: SettlingTimeWidth) -> Self {
        Self {
            high_speed_response,
            settling_time,
        }
    }
}
