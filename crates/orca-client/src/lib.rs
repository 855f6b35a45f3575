//! # Orca Client
//!
//! 执行器运动控制层：
//!
//! - 两点往复运动的双缓冲重编程（不打断正在执行的运动）
//! - 模式切换策略（仅在不同时写入）
//! - 自动归零（可超时、可取消）
//! - 触觉效果、控制器增益、用户限值、设备信息、系统命令
//!
//! # 示例
//!
//! ```
//! use orca_client::{MotionController, StrokeOutcome, StrokeState};
//! use orca_driver::ActuatorLink;
//! # use orca_transport::MockTransport;
//! # let transport = MockTransport::new();
//!
//! let link = ActuatorLink::open(transport).unwrap();
//! let mut controller = MotionController::new(link);
//!
//! let mut jog = StrokeState::default();
//! jog.set_length(50.0);
//! let profile = jog.set_rate(100.0);
//!
//! match controller.apply_stroke(&profile).unwrap() {
//!     StrokeOutcome::Running(swap) => println!("running slots {:?}", swap.pair),
//!     StrokeOutcome::Sleeping => println!("sleeping"),
//! }
//! ```

mod auto_zero;
mod error;
mod haptic;
mod info;
pub mod kinematic;
mod motion;
mod sensors;
mod stream;
mod system;
mod tuning;

pub use auto_zero::{AutoZeroConfig, AutoZeroWait, CancelToken};
pub use error::{ClientError, Result};
pub use info::{DeviceInfo, FactoryLimits};
pub use kinematic::{
    SlotPair, SlotSwap, StrokeLimits, StrokeProfile, StrokeState, StrokeTargets, plan_slot_swap,
};
pub use motion::{MotionController, StrokeOutcome};
pub use sensors::SensorSnapshot;
pub use system::{DefaultsTarget, ErrorWords, SaveTarget};
pub use tuning::{PositionGains, UserLimits};
