//! 自动归零
//!
//! 先写 ZERO_MODE / AUTO_ZERO_FORCE_N / AUTO_ZERO_EXIT_MODE 三个寄存器，
//! 再切到 AutoZero 模式。固件完成归零后自行切换到退出模式，
//! 因此等待过程就是轮询模式寄存器直到它离开 AutoZero。

use crate::error::{ClientError, Result};
use crate::motion::MotionController;
use orca_protocol::{ActuatorMode, AutoZeroMode, Register, ReportedMode};
use orca_transport::ModbusTransport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// 自动归零参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutoZeroConfig {
    pub zero_mode: AutoZeroMode,
    /// 归零时的最大推力（N）
    pub max_force_n: u16,
    /// 归零完成后固件切换到的模式
    pub exit_mode: ActuatorMode,
}

impl Default for AutoZeroConfig {
    fn default() -> Self {
        Self {
            zero_mode: AutoZeroMode::Enabled,
            max_force_n: 50,
            exit_mode: ActuatorMode::Sleep,
        }
    }
}

impl AutoZeroConfig {
    /// ZERO_MODE 起始的三个寄存器值
    pub fn to_registers(&self) -> [u16; 3] {
        [
            self.zero_mode.into(),
            self.max_force_n,
            self.exit_mode.to_register(),
        ]
    }
}

/// 取消令牌
///
/// 克隆后交给其他线程，调用 [`CancelToken::cancel`] 可中止正在进行的等待。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// 等待策略
#[derive(Debug, Clone)]
pub struct AutoZeroWait {
    /// `None` 表示无限等待（仍可通过取消令牌中止）
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub cancel: Option<CancelToken>,
}

impl Default for AutoZeroWait {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            poll_interval: Duration::from_millis(20),
            cancel: None,
        }
    }
}

impl AutoZeroWait {
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl<T: ModbusTransport> MotionController<T> {
    /// 写入归零参数并进入 AutoZero 模式（不等待完成）
    ///
    /// 参数写入失败时直接返回，不会切换模式。
    pub fn command_auto_zero(&mut self, config: &AutoZeroConfig) -> Result<()> {
        self.link_mut()
            .write_registers(Register::ZeroMode.address(), &config.to_registers())
            .inspect_err(|e| warn!("Failed to write auto-zero config: {}", e))?;
        self.set_mode(ActuatorMode::AutoZero)
    }

    /// 执行自动归零并阻塞等待完成，返回固件切换到的退出模式
    ///
    /// 模式寄存器的原始值一旦不等于 AutoZero 即视为完成，
    /// 退出值不在模式表内时以 [`ReportedMode::Unlisted`] 返回。
    /// 任一写入失败都立即返回，不进入轮询。
    pub fn auto_zero_wait(
        &mut self,
        config: &AutoZeroConfig,
        wait: &AutoZeroWait,
    ) -> Result<ReportedMode> {
        self.command_auto_zero(config)?;

        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            if wait.is_cancelled() {
                warn!("Auto-zero wait cancelled after {} polls", polls);
                return Err(ClientError::Cancelled);
            }

            let mode = self.reported_mode()?;
            polls += 1;
            trace!("Auto-zero poll {}: mode {:?}", polls, mode);
            if mode.to_register() != ActuatorMode::AutoZero.to_register() {
                info!(
                    "Auto-zero finished in {:?} ({} polls), mode now {:?}",
                    start.elapsed(),
                    polls,
                    mode
                );
                return Ok(mode);
            }

            let sleep_duration = match wait.timeout {
                Some(timeout) => {
                    let remaining = timeout.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        return Err(ClientError::Timeout {
                            timeout_ms: timeout.as_millis() as u64,
                        });
                    }
                    wait.poll_interval.min(remaining)
                },
                None => wait.poll_interval,
            };

            std::thread::sleep(sleep_duration);
        }
    }
}
