//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use orca_sdk::prelude::*;
//! ```

// 客户端层（推荐使用）
pub use orca_client::{
    AutoZeroConfig, AutoZeroWait, CancelToken, MotionController, StrokeOutcome, StrokeProfile,
    StrokeState,
};

// 驱动层
pub use orca_driver::{ActuatorLink, ActuatorLinkBuilder, DriverConfig, SharedActuatorLink};

// 传输接口
pub use orca_transport::ModbusTransport;

// 协议类型
pub use orca_protocol::{
    ActuatorMode, AutoZeroMode, KinematicMotion, ProtocolProfile, Register, ReportedMode,
};

// 错误类型
pub use orca_client::ClientError;
pub use orca_driver::DriverError;
pub use orca_protocol::ProtocolError;
pub use orca_transport::TransportError;
