//! # Orca Transport Layer
//!
//! Modbus RTU 传输抽象。串口管理、CRC-16、RTU 分帧和请求/响应匹配都由
//! 实现 [`ModbusTransport`] 的外部 Modbus 客户端负责，本 crate 只定义契约。
//!
//! - [`ModbusTransport`]: 标准功能码（03/06/16）与厂商自定义功能码的统一接口
//! - [`TransportError`]: 传输层错误
//! - [`SerialConfig`]: 串口链路参数（默认 19200 8E1，从站地址 1）
//! - `mock`（需 `mock` feature）: 内存仿真执行器

mod config;
mod exception;

#[cfg(feature = "mock")]
pub mod mock;

pub use config::{Parity, SerialConfig};
pub use exception::ExceptionCode;

#[cfg(feature = "mock")]
pub use mock::{MockFault, MockHandle, MockOp, MockTransport};

use thiserror::Error;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Response timeout")]
    Timeout,

    /// 链路断开（串口被拔出等）
    #[error("Link disconnected")]
    Disconnected,

    #[error("Transport not connected")]
    NotConnected,

    /// 从站返回 Modbus 异常响应
    #[error("Modbus exception for function 0x{function_code:02X}: {code}")]
    Exception {
        function_code: u8,
        code: ExceptionCode,
    },

    /// 响应格式错误（CRC、地址或功能码不匹配等）
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// 是否可通过上层重试或重连恢复（本层从不重试）
    ///
    /// 只有从站明确拒绝的异常响应不可恢复。
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransportError::Exception { .. })
    }
}

/// Modbus 传输接口
///
/// 所有方法都是同步阻塞调用，一次只处理一个请求。
/// `slave` 为 RTU 从站地址。
pub trait ModbusTransport {
    /// 打开链路
    fn connect(&mut self) -> Result<(), TransportError>;

    /// 功能码 03：读保持寄存器
    fn read_holding_registers(
        &mut self,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError>;

    /// 功能码 06：写单个寄存器
    fn write_register(&mut self, slave: u8, address: u16, value: u16) -> Result<(), TransportError>;

    /// 功能码 16：写多个寄存器
    fn write_registers(&mut self, slave: u8, address: u16, values: &[u16]) -> Result<(), TransportError>;

    /// 厂商自定义功能码：发送载荷，返回响应载荷（不含地址、功能码和 CRC）
    fn execute_custom(
        &mut self,
        slave: u8,
        function_code: u8,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError>;

    /// 关闭链路
    fn close(&mut self);
}

impl<T: ModbusTransport + ?Sized> ModbusTransport for Box<T> {
    fn connect(&mut self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn read_holding_registers(
        &mut self,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        (**self).read_holding_registers(slave, address, count)
    }

    fn write_register(&mut self, slave: u8, address: u16, value: u16) -> Result<(), TransportError> {
        (**self).write_register(slave, address, value)
    }

    fn write_registers(&mut self, slave: u8, address: u16, values: &[u16]) -> Result<(), TransportError> {
        (**self).write_registers(slave, address, values)
    }

    fn execute_custom(
        &mut self,
        slave: u8,
        function_code: u8,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).execute_custom(slave, function_code, payload)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
