//! 客户端层错误类型

use orca_driver::DriverError;
use orca_protocol::ProtocolError;
use thiserror::Error;

/// 客户端层错误
///
/// 所有寄存器级失败都不是致命的：错误返回给调用方，由调用方决定重试、
/// 放弃或降级运行。本层不做内部重试。
#[derive(Debug, Error)]
pub enum ClientError {
    /// 链路或执行器错误
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// 轮询超时（如自动归零未在期限内结束）
    #[error("Operation timeout after {timeout_ms}ms")]
    Timeout {
        /// 超时时间（毫秒）
        timeout_ms: u64,
    },

    /// 调用方通过取消令牌中止了等待
    #[error("Operation cancelled")]
    Cancelled,

    /// 无效参数（如动作槽 ID 越界）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// 是否可通过重试/重连恢复
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Driver(e) => e.is_recoverable(),
            ClientError::Timeout { .. } => true,
            ClientError::Cancelled | ClientError::InvalidInput(_) => false,
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        ClientError::Driver(DriverError::from(err))
    }
}

/// 客户端层 Result 别名
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use orca_transport::TransportError;

    #[test]
    fn test_display() {
        assert_eq!(
            ClientError::Timeout { timeout_ms: 30_000 }.to_string(),
            "Operation timeout after 30000ms"
        );
        assert_eq!(ClientError::Cancelled.to_string(), "Operation cancelled");

        let err = ClientError::from(DriverError::from(TransportError::Disconnected));
        assert_eq!(err.to_string(), "Transport error: Link disconnected");
    }

    #[test]
    fn test_recoverable() {
        assert!(ClientError::from(DriverError::from(TransportError::Timeout)).is_recoverable());
        assert!(ClientError::Timeout { timeout_ms: 1 }.is_recoverable());
        assert!(!ClientError::Cancelled.is_recoverable());
        assert!(!ClientError::InvalidInput("x".into()).is_recoverable());
    }

    #[test]
    fn test_protocol_error_goes_through_driver() {
        let err: ClientError = ProtocolError::InvalidValue {
            field: "mode",
            value: 9,
        }
        .into();
        assert!(matches!(err, ClientError::Driver(DriverError::Protocol(_))));
    }
}
