//! 指令流与高速流
//!
//! 指令流每帧同时下发一个设定值并取回 [`MotorStatus`]，适合周期性闭环控制。
//! 固件在持续收不到流指令时会按通信超时自行进入 Sleep。

use crate::error::{ClientError, Result};
use crate::motion::MotionController;
use orca_protocol::units::{mm_to_um, n_to_mn};
use orca_protocol::{
    CommandSubFunction, KINEMATIC_SLOT_COUNT, ManageHighSpeedStreamResponse, MotorStatus,
};
use orca_transport::ModbusTransport;
use tracing::info;

impl<T: ModbusTransport> MotionController<T> {
    /// 力控制流（mN）
    pub fn command_force_stream(&mut self, force_mn: i32) -> Result<MotorStatus> {
        self.command_stream(CommandSubFunction::ForceStream, force_mn)
    }

    /// 位置控制流（µm）
    pub fn command_position_stream(&mut self, position_um: i32) -> Result<MotorStatus> {
        self.command_stream(CommandSubFunction::PositionStream, position_um)
    }

    /// 以牛顿为单位的力控制流
    pub fn command_force_n(&mut self, force_n: f64) -> Result<MotorStatus> {
        self.command_force_stream(n_to_mn(force_n))
    }

    /// 以毫米为单位的位置控制流
    pub fn command_position_mm(&mut self, position_mm: f64) -> Result<MotorStatus> {
        self.command_position_stream(mm_to_um(position_mm))
    }

    /// 通过指令流触发动作槽
    pub fn command_kinematic_stream(&mut self, motion_id: u8) -> Result<MotorStatus> {
        if motion_id as usize >= KINEMATIC_SLOT_COUNT {
            return Err(ClientError::InvalidInput(format!(
                "kinematic slot {} out of range 0..{}",
                motion_id, KINEMATIC_SLOT_COUNT
            )));
        }
        self.command_stream(CommandSubFunction::KinematicStream, motion_id as i32)
    }

    fn command_stream(&mut self, sub_function: CommandSubFunction, data: i32) -> Result<MotorStatus> {
        let response = self.link_mut().motor_command_stream(sub_function, data)?;
        Ok(response.status)
    }

    /// 开启高速流，返回执行器实际采用的参数
    pub fn enable_high_speed(
        &mut self,
        baud_rate: u32,
        delay_us: u16,
    ) -> Result<ManageHighSpeedStreamResponse> {
        let response = self
            .link_mut()
            .manage_high_speed_stream(true, baud_rate, delay_us)?;
        info!(
            "High-speed stream enabled: {} baud, {} us delay",
            response.baud_rate, response.delay_us
        );
        Ok(response)
    }

    pub fn disable_high_speed(&mut self) -> Result<ManageHighSpeedStreamResponse> {
        let response = self.link_mut().manage_high_speed_stream(false, 0, 0)?;
        info!("High-speed stream disabled");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_driver::{ActuatorLink, DriverError};
    use orca_protocol::{HighSpeedResponseLayout, ProtocolProfile, SettlingTimeWidth};
    use orca_transport::{MockHandle, MockTransport};

    fn controller() -> (MotionController<MockTransport>, MockHandle) {
        let mock = MockTransport::new();
        let handle = mock.handle();
        let link = ActuatorLink::open(mock).unwrap();
        (MotionController::new(link), handle)
    }

    #[test]
    fn test_force_stream_returns_status() {
        let (mut ctl, handle) = controller();
        let status = ctl.command_force_n(-1.25).unwrap();
        assert_eq!(
            handle.last_stream_command(),
            Some((CommandSubFunction::ForceStream, -1_250))
        );
        assert_eq!(status.force_mn, -1_250);
    }

    #[test]
    fn test_position_stream() {
        let (mut ctl, handle) = controller();
        let status = ctl.command_position_mm(42.0).unwrap();
        assert_eq!(
            handle.last_stream_command(),
            Some((CommandSubFunction::PositionStream, 42_000))
        );
        assert_eq!(status.position_um, 42_000);
    }

    #[test]
    fn test_kinematic_stream_triggers_slot() {
        let (mut ctl, handle) = controller();
        ctl.command_kinematic_stream(3).unwrap();
        assert_eq!(handle.register(319), 0x8003);
        assert!(matches!(
            ctl.command_kinematic_stream(32),
            Err(ClientError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_truncated_stream_response() {
        let (mut ctl, handle) = controller();
        handle.truncate_custom_responses(Some(10));
        let err = ctl.command_force_stream(0).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Driver(DriverError::FrameLength {
                expected: 15,
                actual: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_high_speed_enable_disable() {
        let (mut ctl, handle) = controller();
        let response = ctl.enable_high_speed(625_000, 80).unwrap();
        assert_eq!(response.baud_rate, 625_000);
        assert_eq!(response.delay_us, 80);
        assert_eq!(response.state_command, None);
        assert_eq!(handle.high_speed(), Some((625_000, 80)));

        ctl.disable_high_speed().unwrap();
        assert_eq!(handle.high_speed(), None);
    }

    #[test]
    fn test_high_speed_state_word_layout() {
        let (mut ctl, handle) = controller();
        handle.set_high_speed_layout(HighSpeedResponseLayout::StateWord);
        ctl.link_mut().set_profile(ProtocolProfile::new(
            HighSpeedResponseLayout::StateWord,
            SettlingTimeWidth::Wide32,
        ));

        let response = ctl.enable_high_speed(1_040_000, 50).unwrap();
        assert_eq!(response.state_command, Some(1));
    }
}
