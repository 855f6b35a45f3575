//! MotorWriteStream（功能码 105）
//!
//! 请求：寄存器地址 (u16) + 宽度 (u8) + 数据 (u32)
//! 响应：模式 (u8) + [`MotorStatus`]

use super::{MotorStatus, ensure_len};
use crate::ProtocolError;
use crate::registers::RegisterWidth;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// 电机写流请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorWriteStreamRequest {
    pub address: u16,
    pub width: RegisterWidth,
    pub data: u32,
}

impl MotorWriteStreamRequest {
    pub const LEN: usize = 7;
    const NAME: &'static str = "MotorWriteStream request";

    /// 宽度为 1 时只保留低 16 位
    pub fn new(address: u16, width: RegisterWidth, data: u32) -> Self {
        let data = match width {
            RegisterWidth::Single => data & 0xFFFF,
            RegisterWidth::Double => data,
        };
        Self {
            address,
            width,
            data,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        buf.put_u16(self.address);
        buf.put_u8(self.width.into());
        buf.put_u32(self.data);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::LEN)?;
        let mut buf = payload;
        let address = buf.get_u16();
        let width = RegisterWidth::from_wire(buf.get_u8())?;
        Ok(Self::new(address, width, buf.get_u32()))
    }
}

/// 电机写流响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorWriteStreamResponse {
    pub mode: u8,
    pub status: MotorStatus,
}

impl MotorWriteStreamResponse {
    pub const LEN: usize = 1 + MotorStatus::LEN;
    const NAME: &'static str = "MotorWriteStream response";

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        buf.put_u8(self.mode);
        self.status.put(&mut buf);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::LEN)?;
        let mut buf = payload;
        Ok(Self {
            mode: buf.get_u8(),
            status: MotorStatus::get(&mut buf),
        })
    }
}
