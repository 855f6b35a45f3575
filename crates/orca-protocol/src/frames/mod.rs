//! 厂商自定义功能码帧
//!
//! 四个功能码叠加在 Modbus RTU 之上：
//!
//! | 帧 | 功能码 | 请求 | 响应 |
//! |---|---|---|---|
//! | ManageHighSpeedStream | 65 | 8 字节 | 6 / 7 / 10 字节（见 [`HighSpeedResponseLayout`]） |
//! | MotorCommandStream | 100 | 5 字节 | 15 字节 |
//! | MotorReadStream | 104 | 3 字节 | 18（单寄存器）/ 20（双寄存器）字节 |
//! | MotorWriteStream | 105 | 7 字节 | 16 字节 |
//!
//! 本模块只处理载荷：从站地址、功能码字节和 CRC 由外部传输层负责。
//! 所有多字节字段为大端字节序。解码时若载荷短于固定长度，直接返回
//! [`ProtocolError::FrameLength`]，不做部分解析。

mod command_stream;
mod high_speed;
mod read_stream;
mod write_stream;

pub use command_stream::*;
pub use high_speed::*;
pub use read_stream::*;
pub use write_stream::*;

use crate::ProtocolError;
use crate::profile::{HighSpeedResponseLayout, ProtocolProfile};
use bytes::{Buf, BufMut, Bytes};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 厂商自定义功能码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CustomFunction {
    /// 高速流管理（0x41）
    ManageHighSpeedStream = 65,
    /// 电机指令流（0x64）
    MotorCommandStream = 100,
    /// 电机读流（0x68）
    MotorReadStream = 104,
    /// 电机写流（0x69）
    MotorWriteStream = 105,
}

impl CustomFunction {
    pub fn code(self) -> u8 {
        self.into()
    }

    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        Self::try_from(code).map_err(|_| ProtocolError::UnknownFunctionCode(code))
    }
}

/// 校验载荷长度（不足即失败）
pub(crate) fn ensure_len(frame: &'static str, payload: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if payload.len() < expected {
        return Err(ProtocolError::FrameLength {
            frame,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// 电机状态（指令流 / 读流 / 写流响应共享的 15 字节尾部）
///
/// | 字段 | 类型 |
/// |---|---|
/// | position_um | i32 |
/// | force_mn | i32 |
/// | power_w | i16 |
/// | temperature_c | i8 |
/// | voltage_mv | u16 |
/// | errors | u16 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorStatus {
    pub position_um: i32,
    pub force_mn: i32,
    pub power_w: i16,
    pub temperature_c: i8,
    pub voltage_mv: u16,
    pub errors: u16,
}

impl MotorStatus {
    pub const LEN: usize = 15;

    pub(crate) fn put(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.position_um);
        buf.put_i32(self.force_mn);
        buf.put_i16(self.power_w);
        buf.put_i8(self.temperature_c);
        buf.put_u16(self.voltage_mv);
        buf.put_u16(self.errors);
    }

    /// 调用方负责事先校验长度
    pub(crate) fn get(buf: &mut impl Buf) -> Self {
        Self {
            position_um: buf.get_i32(),
            force_mn: buf.get_i32(),
            power_w: buf.get_i16(),
            temperature_c: buf.get_i8(),
            voltage_mv: buf.get_u16(),
            errors: buf.get_u16(),
        }
    }

    /// 是否存在活动错误
    pub fn has_errors(&self) -> bool {
        self.errors != 0
    }
}

/// 自定义帧请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFrame {
    ManageHighSpeedStream(ManageHighSpeedStreamRequest),
    MotorCommandStream(MotorCommandStreamRequest),
    MotorReadStream(MotorReadStreamRequest),
    MotorWriteStream(MotorWriteStreamRequest),
}

/// 自定义帧响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFrameResult {
    ManageHighSpeedStream(ManageHighSpeedStreamResponse),
    MotorCommandStream(MotorCommandStreamResponse),
    MotorReadStream(MotorReadStreamResponse),
    MotorWriteStream(MotorWriteStreamResponse),
}

impl CustomFrame {
    pub fn function(&self) -> CustomFunction {
        match self {
            CustomFrame::ManageHighSpeedStream(_) => CustomFunction::ManageHighSpeedStream,
            CustomFrame::MotorCommandStream(_) => CustomFunction::MotorCommandStream,
            CustomFrame::MotorReadStream(_) => CustomFunction::MotorReadStream,
            CustomFrame::MotorWriteStream(_) => CustomFunction::MotorWriteStream,
        }
    }

    pub fn function_code(&self) -> u8 {
        self.function().code()
    }

    /// 编码请求载荷
    pub fn encode(&self) -> Bytes {
        match self {
            CustomFrame::ManageHighSpeedStream(req) => req.encode(),
            CustomFrame::MotorCommandStream(req) => req.encode(),
            CustomFrame::MotorReadStream(req) => req.encode(),
            CustomFrame::MotorWriteStream(req) => req.encode(),
        }
    }

    /// 解码请求载荷（设备端 / 仿真器使用）
    pub fn decode(function_code: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(match CustomFunction::from_code(function_code)? {
            CustomFunction::ManageHighSpeedStream => {
                CustomFrame::ManageHighSpeedStream(ManageHighSpeedStreamRequest::decode(payload)?)
            },
            CustomFunction::MotorCommandStream => {
                CustomFrame::MotorCommandStream(MotorCommandStreamRequest::decode(payload)?)
            },
            CustomFunction::MotorReadStream => {
                CustomFrame::MotorReadStream(MotorReadStreamRequest::decode(payload)?)
            },
            CustomFunction::MotorWriteStream => {
                CustomFrame::MotorWriteStream(MotorWriteStreamRequest::decode(payload)?)
            },
        })
    }

    /// 期望的响应载荷长度
    pub fn response_len(&self, profile: &ProtocolProfile) -> usize {
        match self {
            CustomFrame::ManageHighSpeedStream(_) => profile.high_speed_response.payload_len(),
            CustomFrame::MotorCommandStream(_) => MotorCommandStreamResponse::LEN,
            CustomFrame::MotorReadStream(req) => MotorReadStreamResponse::payload_len(req.width),
            CustomFrame::MotorWriteStream(_) => MotorWriteStreamResponse::LEN,
        }
    }

    /// 按本请求的类型解码响应载荷
    pub fn decode_response(
        &self,
        payload: &[u8],
        profile: &ProtocolProfile,
    ) -> Result<CustomFrameResult, ProtocolError> {
        Ok(match self {
            CustomFrame::ManageHighSpeedStream(_) => CustomFrameResult::ManageHighSpeedStream(
                ManageHighSpeedStreamResponse::decode(payload, profile.high_speed_response)?,
            ),
            CustomFrame::MotorCommandStream(_) => {
                CustomFrameResult::MotorCommandStream(MotorCommandStreamResponse::decode(payload)?)
            },
            CustomFrame::MotorReadStream(req) => CustomFrameResult::MotorReadStream(
                MotorReadStreamResponse::decode(payload, req.width)?,
            ),
            CustomFrame::MotorWriteStream(_) => {
                CustomFrameResult::MotorWriteStream(MotorWriteStreamResponse::decode(payload)?)
            },
        })
    }
}

impl CustomFrameResult {
    pub fn function(&self) -> CustomFunction {
        match self {
            CustomFrameResult::ManageHighSpeedStream(_) => CustomFunction::ManageHighSpeedStream,
            CustomFrameResult::MotorCommandStream(_) => CustomFunction::MotorCommandStream,
            CustomFrameResult::MotorReadStream(_) => CustomFunction::MotorReadStream,
            CustomFrameResult::MotorWriteStream(_) => CustomFunction::MotorWriteStream,
        }
    }

    /// 编码响应载荷（设备端 / 仿真器使用）
    pub fn encode(&self, layout: HighSpeedResponseLayout) -> Result<Bytes, ProtocolError> {
        match self {
            CustomFrameResult::ManageHighSpeedStream(resp) => resp.encode(layout),
            CustomFrameResult::MotorCommandStream(resp) => Ok(resp.encode()),
            CustomFrameResult::MotorReadStream(resp) => Ok(resp.encode()),
            CustomFrameResult::MotorWriteStream(resp) => Ok(resp.encode()),
        }
    }

    /// 电机状态尾部（高速流管理响应没有）
    pub fn motor_status(&self) -> Option<&MotorStatus> {
        match self {
            CustomFrameResult::ManageHighSpeedStream(_) => None,
            CustomFrameResult::MotorCommandStream(resp) => Some(&resp.status),
            CustomFrameResult::MotorReadStream(resp) => Some(&resp.status),
            CustomFrameResult::MotorWriteStream(resp) => Some(&resp.status),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_status() -> MotorStatus {
    MotorStatus {
        position_um: -12_345,
        force_mn: 67_890,
        power_w: -12,
        temperature_c: -5,
        voltage_mv: 24_100,
        errors: 0x0042,
    }
}
