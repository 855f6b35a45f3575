//! 共享链路
//!
//! 半双工串口上重叠的请求会破坏帧对应关系，因此多个调用方共享同一条链路时
//! 必须串行化。[`SharedActuatorLink`] 用互斥锁保证任一时刻只有一个交换在途。

use crate::error::DriverError;
use crate::link::ActuatorLink;
use orca_protocol::{CustomFrame, CustomFrameResult};
use orca_transport::ModbusTransport;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// 可克隆的串行化链路句柄
#[derive(Debug)]
pub struct SharedActuatorLink<T> {
    inner: Arc<Mutex<ActuatorLink<T>>>,
}

impl<T> Clone for SharedActuatorLink<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ModbusTransport> SharedActuatorLink<T> {
    pub fn new(link: ActuatorLink<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(link)),
        }
    }

    /// 独占链路（持锁期间可执行多步操作，如整组动作槽重编程）
    pub fn lock(&self) -> MutexGuard<'_, ActuatorLink<T>> {
        self.inner.lock()
    }

    /// 在持锁状态下执行闭包
    pub fn with<R>(&self, f: impl FnOnce(&mut ActuatorLink<T>) -> R) -> R {
        let mut link = self.inner.lock();
        f(&mut link)
    }

    pub fn read_register(&self, address: u16, count: u16) -> Result<Vec<u16>, DriverError> {
        self.lock().read_register(address, count)
    }

    pub fn write_register(&self, address: u16, value: u16) -> Result<(), DriverError> {
        self.lock().write_register(address, value)
    }

    pub fn write_registers(&self, address: u16, values: &[u16]) -> Result<(), DriverError> {
        self.lock().write_registers(address, values)
    }

    pub fn execute_custom_frame(&self, frame: &CustomFrame) -> Result<CustomFrameResult, DriverError> {
        self.lock().execute_custom_frame(frame)
    }
}
