//! 系统控制：错误清除、零点、复位、参数保存与恢复出厂
//!
//! 控制寄存器中的位都是一次性命令，固件执行后自行清零。

use crate::error::Result;
use crate::motion::MotionController;
use orca_protocol::Register;
use orca_protocol::registers::{ctrl0, ctrl2, ctrl4};
use orca_transport::ModbusTransport;
use tracing::{info, warn};

/// 保存到 Flash 的参数组（CTRL_REG_2）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Params,
    Tuning,
    UserOptions,
    KinematicConfig,
    HapticConfig,
}

impl SaveTarget {
    fn flag(self) -> u16 {
        match self {
            SaveTarget::Params => ctrl2::SAVE_PARAMS,
            SaveTarget::Tuning => ctrl2::SAVE_TUNING,
            SaveTarget::UserOptions => ctrl2::SAVE_USER_OPTS,
            SaveTarget::KinematicConfig => ctrl2::SAVE_KINEMATIC_CONFIG,
            SaveTarget::HapticConfig => ctrl2::SAVE_HAPTIC_CONFIG,
        }
    }
}

/// 恢复出厂值的参数组（CTRL_REG_4）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsTarget {
    Params,
    Tuning,
    MotorUserOptions,
    ModbusUserOptions,
    KinematicConfig,
    HapticConfig,
}

impl DefaultsTarget {
    fn flag(self) -> u16 {
        match self {
            DefaultsTarget::Params => ctrl4::SET_DEFAULT_PARAMS,
            DefaultsTarget::Tuning => ctrl4::SET_DEFAULT_TUNING,
            DefaultsTarget::MotorUserOptions => ctrl4::SET_DEFAULT_MOTOR_USER_OPTS,
            DefaultsTarget::ModbusUserOptions => ctrl4::SET_DEFAULT_MODBUS_USER_OPTS,
            DefaultsTarget::KinematicConfig => ctrl4::SET_DEFAULT_KINEMATIC_CONFIG,
            DefaultsTarget::HapticConfig => ctrl4::SET_DEFAULT_HAPTIC_CONFIG,
        }
    }
}

/// 错误字（ERROR_0 当前 / ERROR_1 锁存）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorWords {
    pub active: u16,
    pub latched: u16,
}

impl ErrorWords {
    pub fn has_active(&self) -> bool {
        self.active != 0
    }
}

impl<T: ModbusTransport> MotionController<T> {
    pub fn clear_errors(&mut self) -> Result<()> {
        self.link_mut().write_u16(Register::CtrlReg0, ctrl0::CLEAR_ERRORS)?;
        info!("Errors cleared");
        Ok(())
    }

    /// 以当前位置为零点
    pub fn zero_position(&mut self) -> Result<()> {
        self.link_mut().write_u16(Register::CtrlReg0, ctrl0::ZERO_POSITION)?;
        info!("Position zeroed");
        Ok(())
    }

    pub fn invert_position(&mut self) -> Result<()> {
        Ok(self
            .link_mut()
            .write_u16(Register::CtrlReg0, ctrl0::INVERT_POSITION)?)
    }

    /// 软复位（执行器会短暂失去响应）
    pub fn full_reset(&mut self) -> Result<()> {
        warn!("Full reset requested");
        Ok(self
            .link_mut()
            .write_u16(Register::CtrlReg0, ctrl0::FULL_RESET)?)
    }

    pub fn save_to_flash(&mut self, target: SaveTarget) -> Result<()> {
        self.link_mut().write_u16(Register::CtrlReg2, target.flag())?;
        info!("Saved {:?} to flash", target);
        Ok(())
    }

    pub fn restore_defaults(&mut self, target: DefaultsTarget) -> Result<()> {
        self.link_mut().write_u16(Register::CtrlReg4, target.flag())?;
        info!("Restored factory defaults for {:?}", target);
        Ok(())
    }

    pub fn errors(&mut self) -> Result<ErrorWords> {
        let words = self.link_mut().read_register(Register::Error0.address(), 2)?;
        Ok(ErrorWords {
            active: words[0],
            latched: words[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_driver::ActuatorLink;
    use orca_transport::{MockHandle, MockTransport};

    fn controller() -> (MotionController<MockTransport>, MockHandle) {
        let mock = MockTransport::new();
        let handle = mock.handle();
        let link = ActuatorLink::open(mock).unwrap();
        handle.clear_ops();
        (MotionController::new(link), handle)
    }

    #[test]
    fn test_clear_errors() {
        let (mut ctl, handle) = controller();
        handle.set_register(432, 0x0040);
        handle.set_register(433, 0x0041);
        assert!(ctl.errors().unwrap().has_active());

        ctl.clear_errors().unwrap();
        let errors = ctl.errors().unwrap();
        assert!(!errors.has_active());
        assert_eq!(errors.latched, 0x0041);
    }

    #[test]
    fn test_control_flags() {
        let (mut ctl, handle) = controller();
        ctl.zero_position().unwrap();
        ctl.invert_position().unwrap();
        ctl.full_reset().unwrap();
        ctl.save_to_flash(SaveTarget::KinematicConfig).unwrap();
        ctl.save_to_flash(SaveTarget::HapticConfig).unwrap();
        ctl.restore_defaults(DefaultsTarget::ModbusUserOptions).unwrap();

        assert_eq!(
            handle.writes(),
            vec![
                (0, vec![4]),
                (0, vec![8]),
                (0, vec![1]),
                (2, vec![128]),
                (2, vec![512]),
                (4, vec![8]),
            ]
        );
    }
}
