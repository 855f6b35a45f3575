//! ManageHighSpeedStream（功能码 65）
//!
//! 请求：子功能 (u16) + 目标波特率 (u32) + 目标响应延迟 µs (u16)
//! 响应：布局随固件修订版本而变，见 [`HighSpeedResponseLayout`]

use super::ensure_len;
use crate::ProtocolError;
use crate::profile::HighSpeedResponseLayout;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// 启用子功能码
pub const HIGH_SPEED_ENABLE: u16 = 0xFF00;
/// 停用子功能码
pub const HIGH_SPEED_DISABLE: u16 = 0x0000;

/// 高速流管理请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManageHighSpeedStreamRequest {
    pub enable: bool,
    pub baud_rate: u32,
    pub delay_us: u16,
}

impl ManageHighSpeedStreamRequest {
    pub const LEN: usize = 8;
    const NAME: &'static str = "ManageHighSpeedStream request";

    /// 创建启用指令
    pub fn enable(baud_rate: u32, delay_us: u16) -> Self {
        Self {
            enable: true,
            baud_rate,
            delay_us,
        }
    }

    /// 创建停用指令（恢复默认链路参数）
    pub fn disable() -> Self {
        Self {
            enable: false,
            baud_rate: 0,
            delay_us: 0,
        }
    }

    pub fn sub_function(&self) -> u16 {
        if self.enable {
            HIGH_SPEED_ENABLE
        } else {
            HIGH_SPEED_DISABLE
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        buf.put_u16(self.sub_function());
        buf.put_u32(self.baud_rate);
        buf.put_u16(self.delay_us);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::LEN)?;
        let mut buf = payload;
        let enable = match buf.get_u16() {
            HIGH_SPEED_ENABLE => true,
            HIGH_SPEED_DISABLE => false,
            other => return Err(ProtocolError::invalid("high_speed_sub_function", other)),
        };
        Ok(Self {
            enable,
            baud_rate: buf.get_u32(),
            delay_us: buf.get_u16(),
        })
    }
}

/// 高速流管理响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManageHighSpeedStreamResponse {
    /// 状态命令（仅 3 字段布局存在）
    pub state_command: Option<u32>,
    /// 实际生效的波特率
    pub baud_rate: u32,
    /// 实际生效的响应延迟（µs）
    pub delay_us: u16,
}

impl ManageHighSpeedStreamResponse {
    const NAME: &'static str = "ManageHighSpeedStream response";

    pub fn encode(&self, layout: HighSpeedResponseLayout) -> Result<Bytes, ProtocolError> {
        let mut buf = BytesMut::with_capacity(layout.payload_len());
        let state = self.state_command.unwrap_or_default();
        match layout {
            HighSpeedResponseLayout::BaudAndDelay => {},
            HighSpeedResponseLayout::StateByte => {
                let state = u8::try_from(state)
                    .map_err(|_| ProtocolError::invalid("state_command", state))?;
                buf.put_u8(state);
            },
            HighSpeedResponseLayout::StateWord => buf.put_u32(state),
        }
        buf.put_u32(self.baud_rate);
        buf.put_u16(self.delay_us);
        Ok(buf.freeze())
    }

    pub fn decode(payload: &[u8], layout: HighSpeedResponseLayout) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, layout.payload_len())?;
        let mut buf = payload;
        let state_command = match layout {
            HighSpeedResponseLayout::BaudAndDelay => None,
            HighSpeedResponseLayout::StateByte => Some(buf.get_u8() as u32),
            HighSpeedResponseLayout::StateWord => Some(buf.get_u32()),
        };
        Ok(Self {
            state_command,
            baud_rate: buf.get_u32(),
            delay_us: buf.get_u16(),
        })
    }
}
