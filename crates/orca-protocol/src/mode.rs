//! 执行器模式定义

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 执行器工作模式
///
/// 通过写 CTRL_REG_3 切换，从 MODE_OF_OPERATION 读回。
/// 同一时刻只有一个模式生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum ActuatorMode {
    /// 休眠（禁止触发运动）
    #[default]
    Sleep = 1,
    /// 力控制
    Force = 2,
    /// 位置控制
    Position = 3,
    /// 触觉效果
    Haptic = 4,
    /// 运动学动作槽
    Kinematic = 5,
    /// 自动归零（完成后固件自行切到退出模式）
    AutoZero = 55,
}

impl ActuatorMode {
    /// 解析寄存器值
    pub fn from_register(value: u16) -> Result<Self, ProtocolError> {
        Self::try_from(value).map_err(|_| ProtocolError::invalid("mode", value))
    }

    /// 写入寄存器的值
    pub fn to_register(self) -> u16 {
        self.into()
    }
}

/// MODE_OF_OPERATION 读回的模式
///
/// 固件可能报告不在 [`ActuatorMode`] 中的值（例如归零结束后的过渡值），
/// 读回时保留原始值而不报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportedMode {
    Known(ActuatorMode),
    Unlisted(u16),
}

impl ReportedMode {
    pub fn from_register(value: u16) -> Self {
        match ActuatorMode::try_from(value) {
            Ok(mode) => ReportedMode::Known(mode),
            Err(_) => ReportedMode::Unlisted(value),
        }
    }

    pub fn to_register(self) -> u16 {
        match self {
            ReportedMode::Known(mode) => mode.to_register(),
            ReportedMode::Unlisted(value) => value,
        }
    }

    /// 已知模式；表外的值返回 `None`
    pub fn known(self) -> Option<ActuatorMode> {
        match self {
            ReportedMode::Known(mode) => Some(mode),
            ReportedMode::Unlisted(_) => None,
        }
    }
}

impl From<ActuatorMode> for ReportedMode {
    fn from(mode: ActuatorMode) -> Self {
        ReportedMode::Known(mode)
    }
}

impl PartialEq<ActuatorMode> for ReportedMode {
    fn eq(&self, other: &ActuatorMode) -> bool {
        self.to_register() == other.to_register()
    }
}

/// 自动归零方式（ZERO_MODE 寄存器）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum AutoZeroMode {
    /// 以负向行程端为零点
    Negative = 0,
    /// 手动归零
    Manual = 1,
    /// 命令触发的自动归零
    #[default]
    Enabled = 2,
    /// 上电自动归零
    OnBoot = 3,
}

impl AutoZeroMode {
    pub fn from_register(value: u16) -> Result<Self, ProtocolError> {
        Self::try_from(value).map_err(|_| ProtocolError::invalid("zero_mode", value))
    }
}
