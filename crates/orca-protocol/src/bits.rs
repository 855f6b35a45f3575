//! 32 位数值 ↔ 两个 16 位寄存器
//!
//! 约定：`low` 写入较低地址，`high` 写入 `address + 1`。
//! `high` 总是通过右移得到，不能复制 `low`。

use crate::ProtocolError;

/// 将有符号 32 位值拆分为 `(low, high)`
///
/// 对任意 `i32` 都可通过 [`combine_from_register_pair`] 还原（补码正确）。
#[inline]
pub fn split_to_register_pair(value: i32) -> (u16, u16) {
    split_u32_to_register_pair(value as u32)
}

/// 将无符号 32 位值拆分为 `(low, high)`
#[inline]
pub fn split_u32_to_register_pair(value: u32) -> (u16, u16) {
    let low = (value & 0xFFFF) as u16;
    let high = ((value >> 16) & 0xFFFF) as u16;
    (low, high)
}

/// 由 `(low, high)` 合并为有符号 32 位值
#[inline]
pub fn combine_from_register_pair(low: u16, high: u16) -> i32 {
    combine_u32_from_register_pair(low, high) as i32
}

/// 由 `(low, high)` 合并为无符号 32 位值（不做符号扩展）
#[inline]
pub fn combine_u32_from_register_pair(low: u16, high: u16) -> u32 {
    ((high as u32) << 16) | low as u32
}

/// 从寄存器切片读取一对（低字在前）
pub fn pair_from_slice(registers: &[u16], what: &'static str) -> Result<(u16, u16), ProtocolError> {
    match registers {
        [low, high, ..] => Ok((*low, *high)),
        _ => Err(ProtocolError::RegisterCount {
            what,
            expected: 2,
            actual: registers.len(),
        }),
    }
}
