//! MotorCommandStream（功能码 100）
//!
//! 请求：子功能 (u8) + 数据 (i32)
//! 响应：[`MotorStatus`]（15 字节）

use super::{MotorStatus, ensure_len};
use crate::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};

/// 指令流子功能
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CommandSubFunction {
    /// 力控制流，数据为力（mN）
    ForceStream = 28,
    /// 位置控制流，数据为位置（µm）
    PositionStream = 30,
    /// 触觉流，数据为效果使能位域
    HapticStream = 32,
    /// 运动学流，数据为触发的动作槽 ID
    KinematicStream = 34,
    /// 未命名的子功能
    #[num_enum(catch_all)]
    Other(u8),
}

/// 电机指令流请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommandStreamRequest {
    pub sub_function: CommandSubFunction,
    pub data: i32,
}

impl MotorCommandStreamRequest {
    pub const LEN: usize = 5;
    const NAME: &'static str = "MotorCommandStream request";

    pub fn new(sub_function: CommandSubFunction, data: i32) -> Self {
        Self { sub_function, data }
    }

    /// 力控制流指令
    pub fn force(force_mn: i32) -> Self {
        Self::new(CommandSubFunction::ForceStream, force_mn)
    }

    /// 位置控制流指令
    pub fn position(position_um: i32) -> Self {
        Self::new(CommandSubFunction::PositionStream, position_um)
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        buf.put_u8(self.sub_function.into());
        buf.put_i32(self.data);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::LEN)?;
        let mut buf = payload;
        Ok(Self {
            sub_function: CommandSubFunction::from(buf.get_u8()),
            data: buf.get_i32(),
        })
    }
}

/// 电机指令流响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorCommandStreamResponse {
    pub status: MotorStatus,
}

impl MotorCommandStreamResponse {
    pub const LEN: usize = MotorStatus::LEN;
    const NAME: &'static str = "MotorCommandStream response";

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        self.status.put(&mut buf);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::LEN)?;
        let mut buf = payload;
        Ok(Self {
            status: MotorStatus::get(&mut buf),
        })
    }
}
