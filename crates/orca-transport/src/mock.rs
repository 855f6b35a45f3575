//! 内存仿真执行器
//!
//! 用于无硬件测试。除了一个普通的寄存器表，还模拟以下固件行为：
//!
//! - 写 CTRL_REG_3 → MODE_OF_OPERATION 跟随
//! - 写 KIN_SW_TRIGGER → KINEMATIC_STATUS = `0x8000 | id`
//! - 进入 AutoZero 后，模式寄存器被轮询 N 次后切到 AUTO_ZERO_EXIT_MODE
//! - CTRL_REG_0 的 CLEAR_ERRORS 位清除 ERROR_0
//! - 四个自定义功能码
//!
//! 每个请求（包括失败的）都记录在操作日志中。故障可以按寄存器地址或按自定义功能码注入。

use crate::{ExceptionCode, ModbusTransport, TransportError};
use orca_protocol::bits::{combine_u32_from_register_pair, split_u32_to_register_pair};
use orca_protocol::registers::ctrl0;
use orca_protocol::{
    ActuatorMode, CommandSubFunction, CustomFrame, CustomFrameResult, HighSpeedResponseLayout,
    KinematicStatus, ManageHighSpeedStreamResponse, MotorCommandStreamResponse,
    MotorReadStreamResponse, MotorStatus, MotorWriteStreamResponse, ProtocolError, Register,
    RegisterWidth,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

const FC_READ_HOLDING: u8 = 0x03;
const FC_WRITE_SINGLE: u8 = 0x06;
const FC_WRITE_MULTIPLE: u8 = 0x10;

/// 单次读请求的寄存器上限
const MAX_READ_COUNT: u16 = 125;
/// 单次写请求的寄存器上限
const MAX_WRITE_COUNT: usize = 123;

/// 默认 AutoZero 轮询次数
const DEFAULT_AUTO_ZERO_POLLS: u32 = 3;

/// 注入的故障
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    Io,
    Timeout,
    Disconnected,
    Exception(ExceptionCode),
}

impl MockFault {
    fn to_error(self, function_code: u8) -> TransportError {
        match self {
            MockFault::Io => TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "injected I/O failure",
            )),
            MockFault::Timeout => TransportError::Timeout,
            MockFault::Disconnected => TransportError::Disconnected,
            MockFault::Exception(code) => TransportError::Exception {
                function_code,
                code,
            },
        }
    }
}

/// 操作日志条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOp {
    Connect,
    Close,
    Read { address: u16, count: u16 },
    Write { address: u16, value: u16 },
    WriteMany { address: u16, values: Vec<u16> },
    Custom { function_code: u8, payload: Vec<u8> },
}

#[derive(Debug)]
struct MockState {
    slave: u8,
    connected: bool,
    registers: HashMap<u16, u16>,
    ops: Vec<MockOp>,
    address_faults: HashMap<u16, MockFault>,
    custom_faults: HashMap<u8, MockFault>,
    /// None 表示永不退出 AutoZero
    auto_zero_exit_after: Option<u32>,
    auto_zero_active: bool,
    auto_zero_polls: u32,
    status: MotorStatus,
    high_speed_layout: HighSpeedResponseLayout,
    high_speed: Option<(u32, u16)>,
    custom_truncate: Option<usize>,
    last_stream: Option<(CommandSubFunction, i32)>,
}

impl MockState {
    fn new(slave: u8) -> Self {
        let mut registers = HashMap::new();
        registers.insert(Register::ModeOfOperation.address(), ActuatorMode::Sleep.to_register());
        registers.insert(Register::AutoZeroExitMode.address(), ActuatorMode::Sleep.to_register());

        Self {
            slave,
            connected: false,
            registers,
            ops: Vec::new(),
            address_faults: HashMap::new(),
            custom_faults: HashMap::new(),
            auto_zero_exit_after: Some(DEFAULT_AUTO_ZERO_POLLS),
            auto_zero_active: false,
            auto_zero_polls: 0,
            status: MotorStatus::default(),
            high_speed_layout: HighSpeedResponseLayout::default(),
            high_speed: None,
            custom_truncate: None,
            last_stream: None,
        }
    }

    fn register(&self, address: u16) -> u16 {
        self.registers.get(&address).copied().unwrap_or(0)
    }

    fn mode_byte(&self) -> u8 {
        self.register(Register::ModeOfOperation.address()) as u8
    }

    fn check_link(&self, slave: u8) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        // 地址不匹配的从站不会应答
        if slave != self.slave {
            return Err(TransportError::Timeout);
        }
        Ok(())
    }

    fn check_faults(&self, function_code: u8, address: u16, count: u16) -> Result<(), TransportError> {
        for offset in 0..count {
            if let Some(fault) = self.address_faults.get(&address.wrapping_add(offset)) {
                return Err(fault.to_error(function_code));
            }
        }
        Ok(())
    }

    /// 带固件副作用的寄存器读取
    fn load(&mut self, address: u16) -> u16 {
        if address == Register::ModeOfOperation.address() && self.auto_zero_active {
            match self.auto_zero_exit_after {
                Some(limit) if self.auto_zero_polls >= limit => self.finish_auto_zero(),
                _ => self.auto_zero_polls += 1,
            }
        }
        self.register(address)
    }

    fn finish_auto_zero(&mut self) {
        let exit = self.register(Register::AutoZeroExitMode.address());
        let exit = match ActuatorMode::from_register(exit) {
            Ok(ActuatorMode::AutoZero) | Err(_) => ActuatorMode::Sleep,
            Ok(mode) => mode,
        };
        trace!("mock: auto-zero finished, exiting to {:?}", exit);
        self.auto_zero_active = false;
        self.status.position_um = 0;
        self.registers
            .insert(Register::ModeOfOperation.address(), exit.to_register());
    }

    /// 带固件副作用的寄存器写入
    fn store(&mut self, address: u16, value: u16) {
        self.registers.insert(address, value);

        if address == Register::CtrlReg3.address() {
            self.registers.insert(Register::ModeOfOperation.address(), value);
            self.auto_zero_active = value == ActuatorMode::AutoZero.to_register();
            self.auto_zero_polls = 0;
        } else if address == Register::KinSwTrigger.address() {
            let status = KinematicStatus {
                active_id: value,
                in_progress: true,
            };
            self.registers
                .insert(Register::KinematicStatus.address(), status.to_register());
        } else if address == Register::CtrlReg0.address() && value & ctrl0::CLEAR_ERRORS != 0 {
            self.registers.insert(Register::Error0.address(), 0);
            self.status.errors = 0;
        }
    }

    fn execute_custom(&mut self, function_code: u8, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let frame = CustomFrame::decode(function_code, payload).map_err(|err| {
            let code = match err {
                ProtocolError::UnknownFunctionCode(_) => ExceptionCode::IllegalFunction,
                _ => ExceptionCode::IllegalDataValue,
            };
            TransportError::Exception {
                function_code,
                code,
            }
        })?;

        let result = match frame {
            CustomFrame::ManageHighSpeedStream(req) => {
                self.high_speed = req.enable.then_some((req.baud_rate, req.delay_us));
                let (baud_rate, delay_us) = self.high_speed.unwrap_or((19_200, 0));
                let state_command = match self.high_speed_layout {
                    HighSpeedResponseLayout::BaudAndDelay => None,
                    _ => Some(u32::from(req.enable)),
                };
                CustomFrameResult::ManageHighSpeedStream(ManageHighSpeedStreamResponse {
                    state_command,
                    baud_rate,
                    delay_us,
                })
            },
            CustomFrame::MotorCommandStream(req) => {
                self.last_stream = Some((req.sub_function, req.data));
                match req.sub_function {
                    CommandSubFunction::ForceStream => self.status.force_mn = req.data,
                    CommandSubFunction::PositionStream => self.status.position_um = req.data,
                    CommandSubFunction::KinematicStream => {
                        self.store(Register::KinSwTrigger.address(), req.data as u16)
                    },
                    _ => {},
                }
                CustomFrameResult::MotorCommandStream(MotorCommandStreamResponse {
                    status: self.status,
                })
            },
            CustomFrame::MotorReadStream(req) => {
                self.check_faults(function_code, req.address, req.width.count())?;
                let value = match req.width {
                    RegisterWidth::Single => self.load(req.address) as u32,
                    RegisterWidth::Double => {
                        let low = self.load(req.address);
                        let high = self.load(req.address.wrapping_add(1));
                        combine_u32_from_register_pair(low, high)
                    },
                };
                CustomFrameResult::MotorReadStream(MotorReadStreamResponse {
                    value,
                    width: req.width,
                    mode: self.mode_byte(),
                    status: self.status,
                })
            },
            CustomFrame::MotorWriteStream(req) => {
                self.check_faults(function_code, req.address, req.width.count())?;
                match req.width {
                    RegisterWidth::Single => self.store(req.address, req.data as u16),
                    RegisterWidth::Double => {
                        let (low, high) = split_u32_to_register_pair(req.data);
                        self.store(req.address, low);
                        self.store(req.address.wrapping_add(1), high);
                    },
                }
                CustomFrameResult::MotorWriteStream(MotorWriteStreamResponse {
                    mode: self.mode_byte(),
                    status: self.status,
                })
            },
        };

        let mut bytes = result
            .encode(self.high_speed_layout)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?
            .to_vec();
        if let Some(len) = self.custom_truncate {
            bytes.truncate(len);
        }
        Ok(bytes)
    }
}

/// 仿真执行器（实现 [`ModbusTransport`]）
///
/// 通过 [`MockTransport::handle`] 获取共享句柄，在传输被 `ActuatorLink` 接管后
/// 仍可检查寄存器和操作日志、注入故障。
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// 从站地址为 1 的仿真执行器（未连接）
    pub fn new() -> Self {
        Self::with_slave(1)
    }

    pub fn with_slave(slave: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::new(slave))),
        }
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: self.state.clone(),
        }
    }
}

impl ModbusTransport for MockTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.ops.push(MockOp::Connect);
        state.connected = true;
        Ok(())
    }

    fn read_holding_registers(
        &mut self,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        let mut state = self.state.lock();
        state.ops.push(MockOp::Read { address, count });
        state.check_link(slave)?;
        if count == 0 || count > MAX_READ_COUNT {
            return Err(TransportError::Exception {
                function_code: FC_READ_HOLDING,
                code: ExceptionCode::IllegalDataValue,
            });
        }
        state.check_faults(FC_READ_HOLDING, address, count)?;
        Ok((0..count).map(|offset| state.load(address.wrapping_add(offset))).collect())
    }

    fn write_register(&mut self, slave: u8, address: u16, value: u16) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.ops.push(MockOp::Write { address, value });
        state.check_link(slave)?;
        state.check_faults(FC_WRITE_SINGLE, address, 1)?;
        state.store(address, value);
        Ok(())
    }

    fn write_registers(&mut self, slave: u8, address: u16, values: &[u16]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.ops.push(MockOp::WriteMany {
            address,
            values: values.to_vec(),
        });
        state.check_link(slave)?;
        if values.is_empty() || values.len() > MAX_WRITE_COUNT {
            return Err(TransportError::Exception {
                function_code: FC_WRITE_MULTIPLE,
                code: ExceptionCode::IllegalDataValue,
            });
        }
        state.check_faults(FC_WRITE_MULTIPLE, address, values.len() as u16)?;
        for (offset, value) in values.iter().enumerate() {
            state.store(address.wrapping_add(offset as u16), *value);
        }
        Ok(())
    }

    fn execute_custom(
        &mut self,
        slave: u8,
        function_code: u8,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        state.ops.push(MockOp::Custom {
            function_code,
            payload: payload.to_vec(),
        });
        state.check_link(slave)?;
        if let Some(fault) = state.custom_faults.get(&function_code) {
            return Err(fault.to_error(function_code));
        }
        state.execute_custom(function_code, payload)
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.ops.push(MockOp::Close);
        state.connected = false;
    }
}

/// 仿真执行器的共享检查句柄
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// 读取寄存器（无固件副作用）
    pub fn register(&self, address: u16) -> u16 {
        self.state.lock().register(address)
    }

    pub fn registers(&self, address: u16, count: u16) -> Vec<u16> {
        let state = self.state.lock();
        (0..count).map(|offset| state.register(address.wrapping_add(offset))).collect()
    }

    /// 直接设置寄存器（无固件副作用）
    pub fn set_register(&self, address: u16, value: u16) {
        self.state.lock().registers.insert(address, value);
    }

    pub fn set_registers(&self, address: u16, values: &[u16]) {
        let mut state = self.state.lock();
        for (offset, value) in values.iter().enumerate() {
            state.registers.insert(address.wrapping_add(offset as u16), *value);
        }
    }

    /// 当前 MODE_OF_OPERATION 原始值
    pub fn mode(&self) -> u16 {
        self.register(Register::ModeOfOperation.address())
    }

    pub fn set_mode(&self, mode: ActuatorMode) {
        self.set_register(Register::ModeOfOperation.address(), mode.to_register());
    }

    /// 设置 KINEMATIC_STATUS 中的活动动作槽
    pub fn set_active_motion(&self, active_id: u16, in_progress: bool) {
        let status = KinematicStatus {
            active_id,
            in_progress,
        };
        self.set_register(Register::KinematicStatus.address(), status.to_register());
    }

    pub fn ops(&self) -> Vec<MockOp> {
        self.state.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.lock().ops.clear();
    }

    /// 所有写请求（单写与多写），按 `(起始地址, 值)` 展开
    pub fn writes(&self) -> Vec<(u16, Vec<u16>)> {
        self.state
            .lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                MockOp::Write { address, value } => Some((*address, vec![*value])),
                MockOp::WriteMany { address, values } => Some((*address, values.clone())),
                _ => None,
            })
            .collect()
    }

    /// 设置 AutoZero 在多少次模式轮询后退出（None = 永不退出）
    pub fn set_auto_zero_exit_after(&self, polls: Option<u32>) {
        self.state.lock().auto_zero_exit_after = polls;
    }

    /// 当前 AutoZero 过程中的模式轮询次数
    pub fn auto_zero_polls(&self) -> u32 {
        self.state.lock().auto_zero_polls
    }

    /// 对涉及 `address` 的所有请求注入故障
    pub fn inject_fault(&self, address: u16, fault: MockFault) {
        self.state.lock().address_faults.insert(address, fault);
    }

    pub fn inject_custom_fault(&self, function_code: u8, fault: MockFault) {
        self.state.lock().custom_faults.insert(function_code, fault);
    }

    pub fn clear_faults(&self) {
        let mut state = self.state.lock();
        state.address_faults.clear();
        state.custom_faults.clear();
    }

    pub fn status(&self) -> MotorStatus {
        self.state.lock().status
    }

    pub fn set_status(&self, status: MotorStatus) {
        self.state.lock().status = status;
    }

    pub fn set_high_speed_layout(&self, layout: HighSpeedResponseLayout) {
        self.state.lock().high_speed_layout = layout;
    }

    /// 当前生效的高速流参数 `(baud, delay_us)`
    pub fn high_speed(&self) -> Option<(u32, u16)> {
        self.state.lock().high_speed
    }

    /// 截断之后所有自定义帧响应（模拟固件版本不匹配）
    pub fn truncate_custom_responses(&self, len: Option<usize>) {
        self.state.lock().custom_truncate = len;
    }

    pub fn last_stream_command(&self) -> Option<(CommandSubFunction, i32)> {
        self.state.lock().last_stream
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_protocol::{
        CustomFrame, ManageHighSpeedStreamRequest, MotorCommandStreamRequest,
        MotorReadStreamRequest, MotorWriteStreamRequest, ProtocolProfile,
    };

    fn connected() -> (MockTransport, MockHandle) {
        let mut mock = MockTransport::new();
        mock.connect().unwrap();
        let handle = mock.handle();
        (mock, handle)
    }

    #[test]
    fn test_requires_connection() {
        let mut mock = MockTransport::new();
        assert!(matches!(
            mock.read_holding_registers(1, 317, 1),
            Err(TransportError::NotConnected)
        ));
    }

    #[test]
    fn test_wrong_slave_times_out() {
        let (mut mock, _) = connected();
        assert!(matches!(
            mock.read_holding_registers(2, 317, 1),
            Err(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_mode_register_mirrors_control_register() {
        let (mut mock, handle) = connected();
        assert_eq!(mock.read_holding_registers(1, 317, 1).unwrap(), vec![1]);
        mock.write_register(1, 3, 5).unwrap();
        assert_eq!(handle.mode(), 5);
    }

    #[test]
    fn test_trigger_sets_kinematic_status() {
        let (mut mock, handle) = connected();
        mock.write_register(1, 9, 2).unwrap();
        assert_eq!(handle.register(319), 0x8002);
    }

    #[test]
    fn test_auto_zero_exits_after_polls() {
        let (mut mock, handle) = connected();
        handle.set_auto_zero_exit_after(Some(2));
        mock.write_registers(1, 171, &[2, 30, 3]).unwrap();
        mock.write_register(1, 3, 55).unwrap();

        assert_eq!(mock.read_holding_registers(1, 317, 1).unwrap(), vec![55]);
        assert_eq!(mock.read_holding_registers(1, 317, 1).unwrap(), vec![55]);
        assert_eq!(mock.read_holding_registers(1, 317, 1).unwrap(), vec![3]);
    }

    #[test]
    fn test_fault_injection_by_address() {
        let (mut mock, handle) = connected();
        handle.inject_fault(172, MockFault::Exception(ExceptionCode::IllegalDataValue));

        let err = mock.write_registers(1, 171, &[2, 30, 1]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Exception {
                function_code: 0x10,
                code: ExceptionCode::IllegalDataValue
            }
        ));
        // 失败的请求不改变寄存器
        assert_eq!(handle.register(171), 0);
        assert_eq!(handle.ops().len(), 2);
    }

    #[test]
    fn test_read_count_limits() {
        let (mut mock, _) = connected();
        assert!(mock.read_holding_registers(1, 0, 0).is_err());
        assert!(mock.read_holding_registers(1, 0, 126).is_err());
        assert!(mock.write_registers(1, 0, &[]).is_err());
    }

    #[test]
    fn test_custom_read_stream() {
        let (mut mock, handle) = connected();
        handle.set_registers(140, &[0x93E0, 0x0004]);
        let request = CustomFrame::MotorReadStream(MotorReadStreamRequest::new(140, RegisterWidth::Double));
        let payload = mock
            .execute_custom(1, request.function_code(), &request.encode())
            .unwrap();
        let result = request
            .decode_response(&payload, &ProtocolProfile::default())
            .unwrap();
        let CustomFrameResult::MotorReadStream(resp) = result else {
            panic!("unexpected response {result:?}");
        };
        assert_eq!(resp.value, 300_000);
        assert_eq!(resp.mode, 1);
    }

    #[test]
    fn test_custom_write_stream_applies_side_effects() {
        let (mut mock, handle) = connected();
        let request = MotorWriteStreamRequest::new(3, RegisterWidth::Single, 3);
        let payload = mock.execute_custom(1, 105, &request.encode()).unwrap();
        assert_eq!(payload.len(), MotorWriteStreamResponse::LEN);
        assert_eq!(payload[0], 3);
        assert_eq!(handle.mode(), 3);
    }

    #[test]
    fn test_custom_command_stream() {
        let (mut mock, handle) = connected();
        let request = MotorCommandStreamRequest::position(42_000);
        let payload = mock.execute_custom(1, 100, &request.encode()).unwrap();
        let resp = MotorCommandStreamResponse::decode(&payload).unwrap();
        assert_eq!(resp.status.position_um, 42_000);
        assert_eq!(
            handle.last_stream_command(),
            Some((CommandSubFunction::PositionStream, 42_000))
        );
    }

    #[test]
    fn test_custom_high_speed_layouts() {
        let (mut mock, handle) = connected();
        let request = ManageHighSpeedStreamRequest::enable(625_000, 80);
        let payload = mock.execute_custom(1, 65, &request.encode()).unwrap();
        assert_eq!(payload.len(), 6);
        assert_eq!(handle.high_speed(), Some((625_000, 80)));

        handle.set_high_speed_layout(HighSpeedResponseLayout::StateWord);
        let payload = mock.execute_custom(1, 65, &request.encode()).unwrap();
        assert_eq!(payload.len(), 10);
    }

    #[test]
    fn test_unknown_function_code() {
        let (mut mock, _) = connected();
        assert!(matches!(
            mock.execute_custom(1, 66, &[]),
            Err(TransportError::Exception {
                function_code: 66,
                code: ExceptionCode::IllegalFunction
            })
        ));
    }

    #[test]
    fn test_truncated_custom_response() {
        let (mut mock, handle) = connected();
        handle.truncate_custom_responses(Some(14));
        let request = MotorCommandStreamRequest::force(100);
        let payload = mock.execute_custom(1, 100, &request.encode()).unwrap();
        assert_eq!(payload.len(), 14);
    }
}
