//! 驱动层错误类型定义

use orca_protocol::ProtocolError;
use orca_transport::{ExceptionCode, TransportError};
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输失败（I/O、断开、超时），调用方可重试或重连
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// 执行器返回 Modbus 异常（地址、值或功能码无效），不自动重试
    #[error("Modbus exception for function 0x{function_code:02X}: {code}")]
    Exception {
        function_code: u8,
        code: ExceptionCode,
    },

    /// 响应载荷短于固定长度（固件与驱动版本不匹配）
    #[error("Invalid {frame} frame length: expected {expected}, got {actual}")]
    FrameLength {
        frame: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 其他协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(ProtocolError),

    /// 无效输入（如空写入、越界的动作槽）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 是否可通过重试/重连恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DriverError::Transport(_))
    }

    /// 是否为执行器返回的异常响应
    pub fn is_exception(&self) -> bool {
        matches!(self, DriverError::Exception { .. })
    }
}

impl From<TransportError> for DriverError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Exception {
                function_code,
                code,
            } => DriverError::Exception {
                function_code,
                code,
            },
            other => DriverError::Transport(other),
        }
    }
}

impl From<ProtocolError> for DriverError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::FrameLength {
                frame,
                expected,
                actual,
            } => DriverError::FrameLength {
                frame,
                expected,
                actual,
            },
            other => DriverError::Protocol(other),
        }
    }
}
