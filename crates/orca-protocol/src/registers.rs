//! 保持寄存器地址表
//!
//! 所有寄存器地址由固件约定，集中在 [`Register`] 表中，避免魔数散落。
//! 唯一允许计算的地址是文档化的块偏移：
//!
//! - 运动学动作槽：`KIN_MOTION_BASE + 6 * motion_id`
//! - 弹簧效果：`644 + 6 * spring`（见 [`crate::haptic`]）
//! - 振荡器效果：`664 + 4 * oscillator`（见 [`crate::haptic`]）
//!
//! 32 位寄存器占两个相邻地址，低字在前（`*_H` 为 `address + 1`）。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 寄存器宽度（以 16 位寄存器计）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RegisterWidth {
    /// 单寄存器（16 位）
    Single = 1,
    /// 双寄存器（32 位，低字在前）
    Double = 2,
}

impl RegisterWidth {
    /// 占用的寄存器数量
    pub fn count(self) -> u16 {
        u8::from(self) as u16
    }

    /// 解析线上的宽度字节
    pub fn from_wire(value: u8) -> Result<Self, ProtocolError> {
        Self::try_from(value).map_err(|_| ProtocolError::invalid("register_width", value))
    }
}

macro_rules! register_map {
    ($(
        $(#[$doc:meta])*
        $name:ident = $addr:literal, $width:ident;
    )*) => {
        /// 命名寄存器表
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Register {
            $(
                $(#[$doc])*
                $name,
            )*
        }

        impl Register {
            /// 表中全部寄存器（按声明顺序）
            pub const ALL: &'static [Register] = &[$(Register::$name),*];

            /// 寄存器起始地址
            pub const fn address(self) -> u16 {
                match self {
                    $(Register::$name => $addr,)*
                }
            }

            /// 寄存器宽度
            pub const fn width(self) -> RegisterWidth {
                match self {
                    $(Register::$name => RegisterWidth::$width,)*
                }
            }

            /// 寄存器名称（用于日志）
            pub const fn name(self) -> &'static str {
                match self {
                    $(Register::$name => stringify!($name),)*
                }
            }

            /// 按起始地址反查
            pub fn from_address(address: u16) -> Option<Register> {
                match address {
                    $($addr => Some(Register::$name),)*
                    _ => None,
                }
            }
        }
    };
}

register_map! {
    // ===== 控制寄存器 =====
    /// 系统控制（复位、清错、归零、反向）
    CtrlReg0 = 0, Single;
    /// 系统标志与标定
    CtrlReg1 = 1, Single;
    /// 写入永久存储
    CtrlReg2 = 2, Single;
    /// 模式配置（写入目标模式）
    CtrlReg3 = 3, Single;
    /// 恢复默认值
    CtrlReg4 = 4, Single;
    /// 运动学软件触发（写入动作槽 ID）
    KinSwTrigger = 9, Single;

    // ===== 位置控制器 =====
    PcPGain = 133, Single;
    PcIGain = 134, Single;
    PcDvGain = 135, Single;
    PcDeGain = 136, Single;
    /// 位置控制器力饱和（mN）
    PcForceSaturation = 137, Double;

    // ===== 用户限制 =====
    /// 用户最高温度（°C）
    UserMaxTemp = 139, Single;
    /// 用户最大力（mN）
    UserMaxForce = 140, Double;
    /// 用户最大功率（W）
    UserMaxPower = 142, Single;
    SafetyDGain = 143, Single;

    // ===== 自动归零 =====
    ZeroMode = 171, Single;
    AutoZeroForceN = 172, Single;
    AutoZeroExitMode = 173, Single;

    // ===== 状态 =====
    /// 当前模式（只读）
    ModeOfOperation = 317, Single;
    /// 运动学状态：bit 15 运动中，bit 0-14 当前动作槽
    KinematicStatus = 319, Single;

    // ===== 传感器 =====
    StatorTemp = 336, Single;
    DriverTemp = 337, Single;
    /// 供电电压（mV）
    VddFinal = 338, Single;
    ShaftPositionUm = 342, Double;
    ShaftSpeedMmps = 344, Double;
    ShaftAccelMmpss = 346, Double;
    /// 实测力（mN）
    Force = 348, Double;
    Power = 350, Single;
    AvgPower = 355, Single;
    CoilTemp = 356, Single;

    // ===== 执行器极限 =====
    MaxTemp = 401, Single;
    MinVoltage = 402, Single;
    MaxVoltage = 403, Single;
    MaxCurrent = 404, Single;
    MaxPower = 405, Single;

    // ===== 执行器信息 =====
    SerialNumber = 406, Double;
    MajorVersion = 408, Single;
    ReleaseState = 409, Single;
    RevisionNumber = 410, Single;
    CommitId = 411, Double;
    HwVersion = 414, Single;
    CommsTimeout = 417, Single;
    StatorConfig = 418, Single;

    // ===== 错误 =====
    /// 当前错误
    Error0 = 432, Single;
    /// 锁存错误
    Error1 = 433, Single;

    // ===== 触觉效果 =====
    /// 效果使能位域
    HapticStatus = 641, Single;
    ConstantForceMn = 642, Double;
    S0GainNMm = 644, Single;
    S0CenterUm = 645, Double;
    S0Coupling = 647, Single;
    S0DeadZoneMm = 648, Single;
    S0ForceSatN = 649, Single;
    S1GainNMm = 650, Single;
    S1CenterUm = 651, Double;
    S1Coupling = 653, Single;
    S1DeadZoneMm = 654, Single;
    S1ForceSatN = 655, Single;
    S2GainNMm = 656, Single;
    S2CenterUm = 657, Double;
    S2Coupling = 659, Single;
    S2DeadZoneMm = 660, Single;
    S2ForceSatN = 661, Single;
    D0GainNsMm = 662, Single;
    I0GainNs2Mm = 663, Single;
    O0GainN = 664, Single;
    O0Type = 665, Single;
    O0FreqDhz = 666, Single;
    O0Duty = 667, Single;
    O1GainN = 668, Single;
    O1Type = 669, Single;
    O1FreqDhz = 670, Single;
    O1Duty = 671, Single;
    ConstForceFilter = 672, Single;

    // ===== 运动学 =====
    /// 第一个动作槽起始地址
    KinMotion0 = 780, Single;
    /// 上电后的起始动作槽
    KinHomeId = 972, Single;
}

/// 运动学动作槽基地址
pub const KIN_MOTION_BASE: u16 = Register::KinMotion0.address();

/// 每个动作槽占用的寄存器数量
pub const KIN_MOTION_STRIDE: u16 = 6;

/// 动作槽 `motion_id` 的起始地址
pub fn kinematic_motion_address(motion_id: u8) -> Result<u16, ProtocolError> {
    if motion_id as usize >= crate::kinematic::KINEMATIC_SLOT_COUNT {
        return Err(ProtocolError::invalid("motion_id", motion_id));
    }
    Ok(KIN_MOTION_BASE + KIN_MOTION_STRIDE * motion_id as u16)
}

/// CTRL_REG_0 标志位
pub mod ctrl0 {
    pub const FULL_RESET: u16 = 1;
    pub const CLEAR_ERRORS: u16 = 2;
    pub const ZERO_POSITION: u16 = 4;
    pub const INVERT_POSITION: u16 = 8;
}

/// CTRL_REG_1 标志位
pub mod ctrl1 {
    /// 应用位置控制器增益
    pub const SET_POSITION_CONTROLLER_GAIN: u16 = 1024;
}

/// CTRL_REG_2 标志位（写入 flash）
pub mod ctrl2 {
    pub const SAVE_PARAMS: u16 = 1;
    pub const SAVE_TUNING: u16 = 32;
    pub const SAVE_USER_OPTS: u16 = 64;
    pub const SAVE_KINEMATIC_CONFIG: u16 = 128;
    pub const SAVE_HAPTIC_CONFIG: u16 = 512;
}

/// CTRL_REG_4 标志位（恢复默认）
pub mod ctrl4 {
    pub const SET_DEFAULT_PARAMS: u16 = 1;
    pub const SET_DEFAULT_TUNING: u16 = 2;
    pub const SET_DEFAULT_MOTOR_USER_OPTS: u16 = 4;
    pub const SET_DEFAULT_MODBUS_USER_OPTS: u16 = 8;
    pub const SET_DEFAULT_KINEMATIC_CONFIG: u16 = 16;
    pub const SET_DEFAULT_HAPTIC_CONFIG: u16 = 32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_addresses_are_unique() {
        let mut seen = HashSet::new();
        for reg in Register::ALL {
            assert!(seen.insert(reg.address()), "duplicate address for {}", reg.name());
        }
    }

    #[test]
    fn test_double_registers_do_not_overlap_next_entry() {
        let occupied: HashSet<u16> = Register::ALL.iter().map(|r| r.address()).collect();
        for reg in Register::ALL {
            if reg.width() == RegisterWidth::Double {
                assert!(
                    !occupied.contains(&(reg.address() + 1)),
                    "{} high word collides with another entry",
                    reg.name()
                );
            }
        }
    }

    #[test]
    fn test_well_known_addresses() {
        assert_eq!(Register::CtrlReg3.address(), 3);
        assert_eq!(Register::KinSwTrigger.address(), 9);
        assert_eq!(Register::ModeOfOperation.address(), 317);
        assert_eq!(Register::KinematicStatus.address(), 319);
        assert_eq!(Register::ZeroMode.address(), 171);
        assert_eq!(Register::AutoZeroExitMode.address(), 173);
        assert_eq!(Register::UserMaxForce.address(), 140);
        assert_eq!(Register::SerialNumber.address(), 406);
        assert_eq!(Register::KinHomeId.address(), 972);
    }

    #[test]
    fn test_kinematic_motion_address() {
        assert_eq!(kinematic_motion_address(0).unwrap(), 780);
        assert_eq!(kinematic_motion_address(1).unwrap(), 786);
        assert_eq!(kinematic_motion_address(3).unwrap(), 798);
        assert_eq!(kinematic_motion_address(31).unwrap(), 966);
        assert!(kinematic_motion_address(32).is_err());
    }

    #[test]
    fn test_from_address() {
        assert_eq!(Register::from_address(317), Some(Register::ModeOfOperation));
        assert_eq!(Register::from_address(343), None);
    }

    #[test]
    fn test_register_width_from_wire() {
        assert_eq!(RegisterWidth::from_wire(1).unwrap(), RegisterWidth::Single);
        assert_eq!(RegisterWidth::from_wire(2).unwrap(), RegisterWidth::Double);
        assert!(RegisterWidth::from_wire(3).is_err());
        assert_eq!(RegisterWidth::Double.count(), 2);
    }
}
