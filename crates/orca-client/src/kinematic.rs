//! 两点往复运动的规划（纯计算，无 I/O）
//!
//! 四个动作槽分成两组 {0,1} 和 {2,3}。每组中偶数槽是"去程"（驶向行程终点），
//! 奇数槽是"回程"（驶回起点），两槽互为 next_id 形成闭环。
//! 重编程时只写不活动的那一组，再触发它，活动组中的运动不会被打断。

use orca_protocol::units::{round_non_negative, round_to_i32};

/// 一组动作槽
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPair {
    /// 去程槽（目标 = 行程终点）
    pub outbound: u8,
    /// 回程槽（目标 = 行程起点）
    pub inbound: u8,
}

impl SlotPair {
    pub const LOW: SlotPair = SlotPair {
        outbound: 0,
        inbound: 1,
    };
    pub const HIGH: SlotPair = SlotPair {
        outbound: 2,
        inbound: 3,
    };

    pub fn contains(&self, id: u16) -> bool {
        id == self.outbound as u16 || id == self.inbound as u16
    }
}

/// 一次缓冲切换的计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSwap {
    /// 规划时的活动动作槽
    pub active_id: u16,
    /// 将被写入的（不活动）组
    pub pair: SlotPair,
    /// 写入完成后触发的槽
    pub trigger_id: u8,
}

/// 根据活动动作槽选择要写入的组和要触发的槽
///
/// 活动槽在 {0,1} 时写 {2,3}，否则写 {0,1}。
/// 活动槽是回程槽（1 或 3）时触发新组的回程槽，否则触发去程槽，保持运动方向连续。
pub fn plan_slot_swap(active_id: u16) -> SlotSwap {
    let pair = if SlotPair::LOW.contains(active_id) {
        SlotPair::HIGH
    } else {
        SlotPair::LOW
    };
    let trigger_id = if active_id == 1 || active_id == 3 {
        pair.inbound
    } else {
        pair.outbound
    };

    SlotSwap {
        active_id,
        pair,
        trigger_id,
    }
}

/// 往复运动参数（用户单位）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeProfile {
    /// 行程速率（mm/s）
    pub rate_mm_s: f64,
    /// 行程长度（mm）
    pub length_mm: f64,
    /// 行程起点偏移（mm）
    pub start_offset_mm: f64,
}

/// 换算后的寄存器目标值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeTargets {
    pub settling_time_ms: i32,
    pub start_um: i32,
    pub end_um: i32,
}

impl StrokeProfile {
    pub fn new(rate_mm_s: f64, length_mm: f64) -> Self {
        Self {
            rate_mm_s,
            length_mm,
            start_offset_mm: 0.0,
        }
    }

    pub fn with_offset(mut self, start_offset_mm: f64) -> Self {
        self.start_offset_mm = start_offset_mm;
        self
    }

    /// 速率或长度未设置（非正数或 NaN）时不应触发运动
    pub fn is_idle(&self) -> bool {
        !(self.rate_mm_s > 0.0 && self.length_mm > 0.0)
    }

    /// 结算时间与起止位置，全部截断到非负
    pub fn targets(&self) -> StrokeTargets {
        let settling_time_ms = if self.rate_mm_s > 0.0 {
            round_non_negative(self.length_mm / self.rate_mm_s * 1000.0)
        } else {
            0
        };
        let start_um = round_non_negative(self.start_offset_mm * 1000.0);
        let end_um = round_to_i32((self.length_mm + self.start_offset_mm) * 1000.0).max(0);

        StrokeTargets {
            settling_time_ms,
            start_um,
            end_um,
        }
    }
}

/// 点动（jog）调节的限制
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeLimits {
    pub max_rate_mm_s: f64,
    pub max_length_mm: f64,
    pub rate_step_mm_s: f64,
    pub length_step_mm: f64,
}

impl Default for StrokeLimits {
    fn default() -> Self {
        Self {
            max_rate_mm_s: 500.0,
            max_length_mm: 150.0,
            rate_step_mm_s: 10.0,
            length_step_mm: 5.0,
        }
    }
}

/// 调用方持有的点动状态
///
/// 每次调节后把 [`StrokeState::profile`] 传给
/// [`MotionController::apply_stroke`](crate::MotionController::apply_stroke)。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokeState {
    profile: StrokeProfile,
    limits: StrokeLimits,
}

impl StrokeState {
    pub fn new(limits: StrokeLimits) -> Self {
        Self {
            profile: StrokeProfile::default(),
            limits,
        }
    }

    pub fn profile(&self) -> StrokeProfile {
        self.profile
    }

    pub fn limits(&self) -> &StrokeLimits {
        &self.limits
    }

    pub fn increase_rate(&mut self) -> StrokeProfile {
        self.set_rate(self.profile.rate_mm_s + self.limits.rate_step_mm_s)
    }

    pub fn decrease_rate(&mut self) -> StrokeProfile {
        self.set_rate(self.profile.rate_mm_s - self.limits.rate_step_mm_s)
    }

    pub fn increase_length(&mut self) -> StrokeProfile {
        self.set_length(self.profile.length_mm + self.limits.length_step_mm)
    }

    pub fn decrease_length(&mut self) -> StrokeProfile {
        self.set_length(self.profile.length_mm - self.limits.length_step_mm)
    }

    pub fn set_rate(&mut self, rate_mm_s: f64) -> StrokeProfile {
        self.profile.rate_mm_s = rate_mm_s.clamp(0.0, self.limits.max_rate_mm_s);
        self.profile
    }

    pub fn set_length(&mut self, length_mm: f64) -> StrokeProfile {
        self.profile.length_mm = length_mm.clamp(0.0, self.limits.max_length_mm);
        self.profile
    }

    pub fn set_start_offset(&mut self, start_offset_mm: f64) -> StrokeProfile {
        self.profile.start_offset_mm = start_offset_mm.max(0.0);
        self.profile
    }

    /// 速率和长度归零（下一次 apply 会让执行器休眠）
    pub fn stop(&mut self) -> StrokeProfile {
        self.profile.rate_mm_s = 0.0;
        self.profile.length_mm = 0.0;
        self.profile
    }
}
