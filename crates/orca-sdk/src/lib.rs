//! Orca SDK - Orca 系列直线电机执行器 Rust SDK
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 寄存器表、位打包、自定义功能码载荷编解码
//! - **传输层** (`transport`): Modbus RTU 传输接口（外部实现）与仿真执行器
//! - **驱动层** (`driver`): 执行器链路、错误分类、配置加载
//! - **客户端层** (`client`): 运动控制（双缓冲动作槽、模式策略、自动归零）
//!
//! # 快速开始
//!
//! ```rust
//! use orca_sdk::prelude::*;
//! # use orca_sdk::transport::MockTransport;
//!
//! # fn main() -> Result<(), ClientError> {
//! # let transport = MockTransport::new();
//! let link = ActuatorLinkBuilder::new().slave(1).connect_on_build(true).build(transport)?;
//! let mut controller = MotionController::new(link);
//!
//! controller.apply_stroke(&StrokeProfile::new(100.0, 50.0))?;
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod prelude;

pub use orca_client as client;
pub use orca_driver as driver;
pub use orca_protocol as protocol;
pub use orca_transport as transport;

// 协议层
pub use orca_protocol::{ActuatorMode, ProtocolError, ProtocolProfile, Register};

// 传输层
pub use orca_transport::{ModbusTransport, SerialConfig, TransportError};

// 驱动层
pub use orca_driver::{ActuatorLink, ActuatorLinkBuilder, DriverConfig, DriverError, SharedActuatorLink};

// 客户端层（推荐入口）
pub use orca_client::{ClientError, MotionController};

pub use logging::init_logging;
