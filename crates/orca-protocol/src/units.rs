//! 单位换算
//!
//! 寄存器使用整数单位（µm、mN、ms），上层 API 使用浮点（mm、N、s）。
//! 换算四舍五入到最近整数，并饱和到 `i32` 范围。

/// 四舍五入并饱和到 `i32`（NaN 映射为 0）
#[inline]
pub fn round_to_i32(value: f64) -> i32 {
    // `as` 转换对浮点做饱和处理，NaN 得 0
    value.round() as i32
}

/// 四舍五入并截断到非负
#[inline]
pub fn round_non_negative(value: f64) -> i32 {
    round_to_i32(value).max(0)
}

/// mm → µm
#[inline]
pub fn mm_to_um(mm: f64) -> i32 {
    round_to_i32(mm * 1000.0)
}

/// µm → mm
#[inline]
pub fn um_to_mm(um: i32) -> f64 {
    um as f64 / 1000.0
}

/// N → mN
#[inline]
pub fn n_to_mn(newtons: f64) -> i32 {
    round_to_i32(newtons * 1000.0)
}

/// mN → N
#[inline]
pub fn mn_to_n(millinewtons: i32) -> f64 {
    millinewtons as f64 / 1000.0
}

/// s → ms
#[inline]
pub fn s_to_ms(seconds: f64) -> i32 {
    round_to_i32(seconds * 1000.0)
}

/// mV → V
#[inline]
pub fn mv_to_v(millivolts: u16) -> f64 {
    millivolts as f64 / 1000.0
}
