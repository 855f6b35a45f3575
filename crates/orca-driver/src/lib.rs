//! # Orca Driver
//!
//! 执行器链路层：独占传输、错误分类、串行化共享与配置加载。
//!
//! # 示例
//!
//! ```
//! use orca_driver::ActuatorLink;
//! use orca_protocol::{Register, RegisterWidth};
//! # use orca_transport::MockTransport;
//! # let transport = MockTransport::new();
//!
//! let mut link = ActuatorLink::open(transport).unwrap();
//! let mode = link.read_u16(Register::ModeOfOperation).unwrap();
//! let status = link.motor_read_stream(Register::KinematicStatus.address(), RegisterWidth::Single).unwrap();
//! # let _ = (mode, status);
//! ```

mod builder;
mod config;
mod error;
mod link;
mod shared;

pub use builder::ActuatorLinkBuilder;
pub use config::{ConfigError, DriverConfig};
pub use error::DriverError;
pub use link::ActuatorLink;
pub use shared::SharedActuatorLink;
