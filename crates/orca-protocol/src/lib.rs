//! # Orca Protocol
//!
//! Orca 系列直线电机执行器的 Modbus 协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `registers`: 保持寄存器地址表（结构化，键 → 地址 + 宽度）
//! - `bits`: 32 位数值与两个 16 位寄存器之间的拆分/合并
//! - `mode`: 执行器模式与控制寄存器标志位
//! - `kinematic`: 运动学动作槽（6 寄存器布局）与链式位域
//! - `haptic`: 触觉效果寄存器块
//! - `frames`: 四个厂商自定义功能码（65/100/104/105）的载荷编解码
//! - `profile`: 固件版本相关的线格式差异（显式参数，不做猜测）
//! - `units`: 单位换算（mm/µm、N/mN、s/ms）
//!
//! ## 字节序
//!
//! 自定义帧载荷中的多字节整数一律使用大端字节序。
//! 32 位寄存器值按"低字在前"占用两个相邻的保持寄存器。

pub mod bits;
pub mod frames;
pub mod haptic;
pub mod kinematic;
pub mod mode;
pub mod profile;
pub mod registers;
pub mod units;

// 重新导出常用类型
pub use bits::*;
pub use frames::*;
pub use haptic::{
    HapticEffects, OscillatorEffect, OscillatorId, OscillatorWaveform, SpringCoupling, SpringEffect,
    SpringId,
};
pub use kinematic::{
    KINEMATIC_SLOT_COUNT, KinematicChain, KinematicMotion, KinematicStatus, MotionType,
};
pub use mode::{ActuatorMode, AutoZeroMode, ReportedMode};
pub use profile::{HighSpeedResponseLayout, ProtocolProfile, SettlingTimeWidth};
pub use registers::{Register, RegisterWidth};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 载荷长度不足（固件与驱动版本不匹配）
    #[error("Invalid {frame} frame length: expected {expected}, got {actual}")]
    FrameLength {
        frame: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown custom function code: {0}")]
    UnknownFunctionCode(u8),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },

    /// 寄存器数量与布局不符
    #[error("Invalid register count for {what}: expected {expected}, got {actual}")]
    RegisterCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ProtocolError {
    pub(crate) fn invalid(field: &'static str, value: impl Into<i64>) -> Self {
        ProtocolError::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
