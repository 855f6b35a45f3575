//! 执行器链路
//!
//! [`ActuatorLink`] 独占一个传输实例和从站地址，把传输层错误翻译为
//! [`DriverError`]。本层不做任何重试：一次失败的交换立即返回给调用方。

use crate::error::DriverError;
use orca_protocol::bits::{
    combine_from_register_pair, combine_u32_from_register_pair, split_to_register_pair,
    split_u32_to_register_pair,
};
use orca_protocol::{
    CommandSubFunction, CustomFrame, CustomFrameResult, ManageHighSpeedStreamRequest,
    ManageHighSpeedStreamResponse, MotorCommandStreamRequest, MotorCommandStreamResponse,
    MotorReadStreamRequest, MotorReadStreamResponse, MotorWriteStreamRequest,
    MotorWriteStreamResponse, ProtocolProfile, Register, RegisterWidth,
};
use orca_transport::{ModbusTransport, SerialConfig, TransportError};
use tracing::{debug, warn};

pub(crate) type Result<T> = std::result::Result<T, DriverError>;

/// 单个执行器的 Modbus 链路
///
/// 半双工串口同一时刻只允许一个请求在途，所有方法都需要 `&mut self`。
/// 多个调用方共享时使用 [`crate::SharedActuatorLink`]。
#[derive(Debug)]
pub struct ActuatorLink<T> {
    transport: T,
    slave: u8,
    profile: ProtocolProfile,
}

impl<T: ModbusTransport> ActuatorLink<T> {
    /// 默认从站地址 1、默认协议配置（不打开链路）
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, SerialConfig::DEFAULT_SLAVE, ProtocolProfile::default())
    }

    pub(crate) fn with_settings(transport: T, slave: u8, profile: ProtocolProfile) -> Self {
        Self {
            transport,
            slave,
            profile,
        }
    }

    /// 创建并打开链路
    pub fn open(transport: T) -> Result<Self> {
        let mut link = Self::new(transport);
        link.connect()?;
        Ok(link)
    }

    pub fn connect(&mut self) -> Result<()> {
        self.transport.connect().map_err(|e| {
            warn!("Failed to open link to slave {}: {}", self.slave, e);
            DriverError::from(e)
        })?;
        debug!("Link to slave {} opened", self.slave);
        Ok(())
    }

    pub fn close(&mut self) {
        self.transport.close();
        debug!("Link to slave {} closed", self.slave);
    }

    pub fn slave(&self) -> u8 {
        self.slave
    }

    pub fn profile(&self) -> &ProtocolProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: ProtocolProfile) {
        self.profile = profile;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    // ==================== 标准寄存器访问 ====================

    /// 读取 `count` 个连续保持寄存器
    pub fn read_register(&mut self, address: u16, count: u16) -> Result<Vec<u16>> {
        if count == 0 {
            return Err(DriverError::InvalidInput("register count must be non-zero".into()));
        }
        debug!("read {} register(s) at {}", count, address);

        let values = self
            .transport
            .read_holding_registers(self.slave, address, count)
            .map_err(|e| fail("read", address, e))?;
        if values.len() != count as usize {
            let err = TransportError::InvalidResponse(format!(
                "expected {} register(s), got {}",
                count,
                values.len()
            ));
            return Err(fail("read", address, err));
        }
        Ok(values)
    }

    pub fn write_register(&mut self, address: u16, value: u16) -> Result<()> {
        debug!("write {} = {}", address, value);
        self.transport
            .write_register(self.slave, address, value)
            .map_err(|e| fail("write", address, e))
    }

    pub fn write_registers(&mut self, address: u16, values: &[u16]) -> Result<()> {
        if values.is_empty() {
            return Err(DriverError::InvalidInput("no register values to write".into()));
        }
        debug!("write {} register(s) at {}: {:?}", values.len(), address, values);
        self.transport
            .write_registers(self.slave, address, values)
            .map_err(|e| fail("write", address, e))
    }

    // ==================== 命名寄存器 / 32 位值 ====================

    /// 按寄存器表中的宽度读取
    pub fn read(&mut self, register: Register) -> Result<Vec<u16>> {
        self.read_register(register.address(), register.width().count())
    }

    pub fn read_u16(&mut self, register: Register) -> Result<u16> {
        let values = self.read_register(register.address(), 1)?;
        Ok(values[0])
    }

    pub fn write_u16(&mut self, register: Register, value: u16) -> Result<()> {
        self.write_register(register.address(), value)
    }

    /// 读取低字在前的 32 位无符号值
    pub fn read_u32(&mut self, address: u16) -> Result<u32> {
        let values = self.read_register(address, 2)?;
        Ok(combine_u32_from_register_pair(values[0], values[1]))
    }

    /// 读取低字在前的 32 位有符号值
    pub fn read_i32(&mut self, address: u16) -> Result<i32> {
        let values = self.read_register(address, 2)?;
        Ok(combine_from_register_pair(values[0], values[1]))
    }

    pub fn write_u32(&mut self, address: u16, value: u32) -> Result<()> {
        let (low, high) = split_u32_to_register_pair(value);
        self.write_registers(address, &[low, high])
    }

    pub fn write_i32(&mut self, address: u16, value: i32) -> Result<()> {
        let (low, high) = split_to_register_pair(value);
        self.write_registers(address, &[low, high])
    }

    // ==================== 自定义功能码 ====================

    /// 发送自定义帧并按请求类型解码响应
    pub fn execute_custom_frame(&mut self, frame: &CustomFrame) -> Result<CustomFrameResult> {
        let payload = self.exchange(frame)?;
        decoded(frame, frame.decode_response(&payload, &self.profile))
    }

    /// 高速流管理，返回实际生效的参数
    pub fn manage_high_speed_stream(
        &mut self,
        enable: bool,
        baud_rate: u32,
        delay_us: u16,
    ) -> Result<ManageHighSpeedStreamResponse> {
        let request = if enable {
            ManageHighSpeedStreamRequest::enable(baud_rate, delay_us)
        } else {
            ManageHighSpeedStreamRequest::disable()
        };
        let frame = CustomFrame::ManageHighSpeedStream(request);
        let payload = self.exchange(&frame)?;
        decoded(&frame, ManageHighSpeedStreamResponse::decode(&payload, self.profile.high_speed_response))
    }

    pub fn motor_command_stream(
        &mut self,
        sub_function: CommandSubFunction,
        data: i32,
    ) -> Result<MotorCommandStreamResponse> {
        let frame = CustomFrame::MotorCommandStream(MotorCommandStreamRequest::new(sub_function, data));
        let payload = self.exchange(&frame)?;
        decoded(&frame, MotorCommandStreamResponse::decode(&payload))
    }

    pub fn motor_read_stream(&mut self, address: u16, width: RegisterWidth) -> Result<MotorReadStreamResponse> {
        let frame = CustomFrame::MotorReadStream(MotorReadStreamRequest::new(address, width));
        let payload = self.exchange(&frame)?;
        decoded(&frame, MotorReadStreamResponse::decode(&payload, width))
    }

    pub fn motor_write_stream(
        &mut self,
        address: u16,
        width: RegisterWidth,
        data: u32,
    ) -> Result<MotorWriteStreamResponse> {
        let frame = CustomFrame::MotorWriteStream(MotorWriteStreamRequest::new(address, width, data));
        let payload = self.exchange(&frame)?;
        decoded(&frame, MotorWriteStreamResponse::decode(&payload))
    }

    fn exchange(&mut self, frame: &CustomFrame) -> Result<Vec<u8>> {
        let function_code = frame.function_code();
        let request = frame.encode();
        debug!("custom function {} request: {:02X?}", function_code, &request[..]);

        let response = self
            .transport
            .execute_custom(self.slave, function_code, &request)
            .map_err(|e| {
                warn!("Custom function {} failed: {}", function_code, e);
                DriverError::from(e)
            })?;
        debug!("custom function {} response: {} byte(s)", function_code, response.len());
        Ok(response)
    }
}

fn fail(operation: &str, address: u16, err: TransportError) -> DriverError {
    warn!("Register {} at {} failed: {}", operation, address, err);
    DriverError::from(err)
}

fn decoded<R>(frame: &CustomFrame, result: std::result::Result<R, orca_protocol::ProtocolError>) -> Result<R> {
    result.map_err(|e| {
        warn!("Failed to decode function {} response: {}", frame.function_code(), e);
        DriverError::from(e)
    })
}
