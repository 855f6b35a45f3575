//! 位打包与动作槽规划的属性测试
//!
//! 使用 proptest 验证往返与不变量。

use orca_sdk::client::kinematic::{SlotPair, StrokeProfile, plan_slot_swap};
use orca_sdk::protocol::bits::{
    combine_from_register_pair, combine_u32_from_register_pair, split_to_register_pair,
    split_u32_to_register_pair,
};
use orca_sdk::protocol::{
    KinematicChain, KinematicMotion, MotionType, SettlingTimeWidth,
};
use proptest::prelude::*;

fn motion_type() -> impl Strategy<Value = MotionType> {
    prop_oneof![Just(MotionType::MinimumPower), Just(MotionType::MinimumJerk)]
}

proptest! {
    /// 任意 i32 拆分后合并得到原值
    #[test]
    fn register_pair_round_trip(value in any::<i32>()) {
        let (low, high) = split_to_register_pair(value);
        prop_assert_eq!(combine_from_register_pair(low, high), value);
    }

    /// 高字来自移位而非复制低字
    #[test]
    fn high_word_is_shifted(value in any::<u32>()) {
        let (low, high) = split_u32_to_register_pair(value);
        prop_assert_eq!(high as u32, value >> 16);
        prop_assert_eq!(combine_u32_from_register_pair(low, high), value);
    }

    /// 位宽内的三元组打包后解包得到原值
    #[test]
    fn chain_triple_round_trip(kind in 0u8..4, next_id in 0u8..32, auto_start in any::<bool>()) {
        let chain = KinematicChain::pack(kind, next_id, auto_start).unwrap();
        prop_assert_eq!(chain.unpack(), (kind, next_id, auto_start));
        prop_assert_eq!(KinematicChain::from_register(chain.to_register()).unpack(), (kind, next_id, auto_start));
    }

    /// 超出 5 位的 next_id 被拒绝
    #[test]
    fn chain_rejects_wide_next_id(next_id in 32u8..) {
        prop_assert!(KinematicChain::pack(1, next_id, false).is_err());
    }

    #[test]
    fn kinematic_motion_round_trip(
        position in any::<i32>(),
        settling in any::<i32>(),
        delay in any::<u16>(),
        kind in motion_type(),
        next_id in 0u8..32,
        auto_start in any::<bool>(),
    ) {
        let motion = KinematicMotion {
            position_target_um: position,
            settling_time_ms: settling,
            auto_start_delay_ms: delay,
            motion_type: kind,
            next_id,
            auto_start_next: auto_start,
        };
        let registers = motion.to_registers(SettlingTimeWidth::Wide32).unwrap();
        prop_assert_eq!(KinematicMotion::from_registers(&registers, SettlingTimeWidth::Wide32).unwrap(), motion);
    }

    /// 写入的组永远不包含活动槽，触发槽属于写入的组
    #[test]
    fn swap_never_touches_live_pair(active in 0u16..4) {
        let swap = plan_slot_swap(active);
        prop_assert!(!swap.pair.contains(active));
        prop_assert!(swap.pair.contains(swap.trigger_id as u16));
        prop_assert!(swap.pair == SlotPair::LOW || swap.pair == SlotPair::HIGH);
        // 方向连续：回程槽之后仍触发回程槽
        prop_assert_eq!(active % 2, (swap.trigger_id % 2) as u16);
    }

    /// 目标值总是非负
    #[test]
    fn stroke_targets_non_negative(
        rate in -500.0..500.0f64,
        length in -200.0..200.0f64,
        offset in -200.0..200.0f64,
    ) {
        let targets = StrokeProfile::new(rate, length).with_offset(offset).targets();
        prop_assert!(targets.settling_time_ms >= 0);
        prop_assert!(targets.start_um >= 0);
        prop_assert!(targets.end_um >= 0);
    }
}
