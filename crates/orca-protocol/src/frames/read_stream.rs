//! MotorReadStream（功能码 104）
//!
//! 请求：寄存器地址 (u16) + 宽度 (u8)
//! 响应：寄存器值（宽度 1 为 u16，宽度 2 为 u32）+ 模式 (u8) + [`MotorStatus`]

use super::{MotorStatus, ensure_len};
use crate::ProtocolError;
use crate::mode::ActuatorMode;
use crate::registers::RegisterWidth;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// 电机读流请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorReadStreamRequest {
    pub address: u16,
    pub width: RegisterWidth,
}

impl MotorReadStreamRequest {
    pub const LEN: usize = 3;
    const NAME: &'static str = "MotorReadStream request";

    pub fn new(address: u16, width: RegisterWidth) -> Self {
        Self { address, width }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        buf.put_u16(self.address);
        buf.put_u8(self.width.into());
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::LEN)?;
        let mut buf = payload;
        let address = buf.get_u16();
        let width = RegisterWidth::from_wire(buf.get_u8())?;
        Ok(Self { address, width })
    }
}

/// 电机读流响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorReadStreamResponse {
    /// 寄存器值（宽度 1 时只有低 16 位有效）
    pub value: u32,
    pub width: RegisterWidth,
    /// 当前模式（原始值）
    pub mode: u8,
    pub status: MotorStatus,
}

impl MotorReadStreamResponse {
    const NAME: &'static str = "MotorReadStream response";

    /// 响应载荷长度：18（单寄存器）/ 20（双寄存器）
    pub const fn payload_len(width: RegisterWidth) -> usize {
        match width {
            RegisterWidth::Single => 2 + 1 + MotorStatus::LEN,
            RegisterWidth::Double => 4 + 1 + MotorStatus::LEN,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::payload_len(self.width));
        match self.width {
            RegisterWidth::Single => buf.put_u16(self.value as u16),
            RegisterWidth::Double => buf.put_u32(self.value),
        }
        buf.put_u8(self.mode);
        self.status.put(&mut buf);
        buf.freeze()
    }

    pub fn decode(payload: &[u8], width: RegisterWidth) -> Result<Self, ProtocolError> {
        ensure_len(Self::NAME, payload, Self::payload_len(width))?;
        let mut buf = payload;
        let value = match width {
            RegisterWidth::Single => buf.get_u16() as u32,
            RegisterWidth::Double => buf.get_u32(),
        };
        Ok(Self {
            value,
            width,
            mode: buf.get_u8(),
            status: MotorStatus::get(&mut buf),
        })
    }

    /// 按寄存器宽度解释为有符号值
    pub fn signed_value(&self) -> i32 {
        match self.width {
            RegisterWidth::Single => self.value as u16 as i16 as i32,
            RegisterWidth::Double => self.value as i32,
        }
    }

    pub fn actuator_mode(&self) -> Result<ActuatorMode, ProtocolError> {
        ActuatorMode::from_register(self.mode as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::sample_status;

    #[test]
    fn test_request_layout() {
        let req = MotorReadStreamRequest::new(342, RegisterWidth::Double);
        assert_eq!(&req.encode()[..], &[0x01, 0x56, 0x02]);
        assert_eq!(MotorReadStreamRequest::decode(&req.encode()).unwrap(), req);
    }

    #[test]
    fn test_request_bad_width() {
        assert!(matches!(
            MotorReadStreamRequest::decode(&[0x01, 0x3F, 0x03]),
            Err(ProtocolError::InvalidValue { field: "register_width", value: 3 })
        ));
    }

    #[test]
    fn test_payload_lengths() {
        assert_eq!(MotorReadStreamResponse::payload_len(RegisterWidth::Single), 18);
        assert_eq!(MotorReadStreamResponse::payload_len(RegisterWidth::Double), 20);
    }

    #[test]
    fn test_single_width_response() {
        let resp = MotorReadStreamResponse {
            value: 0x8003,
            width: RegisterWidth::Single,
            mode: 5,
            status: sample_status(),
        };
        let payload = resp.encode();
        assert_eq!(payload.len(), 18);
        assert_eq!(&payload[..3], &[0x80, 0x03, 0x05]);

        let decoded = MotorReadStreamResponse::decode(&payload, RegisterWidth::Single).unwrap();
        assert_eq!(decoded, resp);
        assert_eq!(decoded.signed_value(), -32765);
        assert_eq!(decoded.actuator_mode().unwrap(), ActuatorMode::Kinematic);
    }

    #[test]
    fn test_double_width_response() {
        let resp = MotorReadStreamResponse {
            value: (-250_000i32) as u32,
            width: RegisterWidth::Double,
            mode: 3,
            status: sample_status(),
        };
        let payload = resp.encode();
        assert_eq!(payload.len(), 20);
        let decoded = MotorReadStreamResponse::decode(&payload, RegisterWidth::Double).unwrap();
        assert_eq!(decoded.signed_value(), -250_000);
        assert_eq!(decoded.status, sample_status());
    }

    #[test]
    fn test_missing_error_field() {
        let resp = MotorReadStreamResponse {
            value: 1,
            width: RegisterWidth::Single,
            mode: 1,
            status: sample_status(),
        };
        let payload = resp.encode();
        assert!(matches!(
            MotorReadStreamResponse::decode(&payload[..16], RegisterWidth::Single),
            Err(ProtocolError::FrameLength { expected: 18, actual: 16, .. })
        ));
    }
}
