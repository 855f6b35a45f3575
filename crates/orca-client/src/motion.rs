//! 运动控制器：模式切换与运动学动作槽
//!
//! 多步操作（整组动作槽重编程、自动归零配置）不是事务：中途失败会留下
//! 部分更新，但执行器始终继续运行最后一次完整提交的运动曲线。

use crate::error::{ClientError, Result};
use crate::kinematic::{SlotSwap, StrokeProfile, plan_slot_swap};
use orca_driver::ActuatorLink;
use orca_protocol::registers::kinematic_motion_address;
use orca_protocol::{
    ActuatorMode, KINEMATIC_SLOT_COUNT, KinematicMotion, KinematicStatus, MotionType, Register,
    ReportedMode, kinematic::KINEMATIC_SLOT_REGISTERS,
};
use orca_transport::ModbusTransport;
use tracing::{debug, info, warn};

/// 一次 [`MotionController::apply_stroke`] 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// 参数为零，执行器已休眠，未写动作槽也未触发
    Sleeping,
    /// 已重编程并触发
    Running(SlotSwap),
}

/// 运动控制器
///
/// 独占一条 [`ActuatorLink`]，所有操作严格顺序执行。
#[derive(Debug)]
pub struct MotionController<T> {
    link: ActuatorLink<T>,
}

impl<T: ModbusTransport> MotionController<T> {
    pub fn new(link: ActuatorLink<T>) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &ActuatorLink<T> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut ActuatorLink<T> {
        &mut self.link
    }

    pub fn into_link(self) -> ActuatorLink<T> {
        self.link
    }

    // ==================== 模式 ====================

    /// 读取当前模式（MODE_OF_OPERATION），表外的值视为协议错误
    pub fn get_mode(&mut self) -> Result<ActuatorMode> {
        let raw = self.link.read_u16(Register::ModeOfOperation)?;
        Ok(ActuatorMode::from_register(raw)?)
    }

    /// 读取当前模式，保留表外的原始值
    pub fn reported_mode(&mut self) -> Result<ReportedMode> {
        let raw = self.link.read_u16(Register::ModeOfOperation)?;
        Ok(ReportedMode::from_register(raw))
    }

    /// 写入目标模式（CTRL_REG_3）
    pub fn set_mode(&mut self, mode: ActuatorMode) -> Result<()> {
        self.link.write_u16(Register::CtrlReg3, mode.to_register())?;
        info!("Actuator mode set to: {:?}", mode);
        Ok(())
    }

    /// 仅在当前模式不同时写入，返回是否发生了切换
    ///
    /// 当前模式为表外的值时一律写入目标模式。
    pub fn ensure_mode(&mut self, mode: ActuatorMode) -> Result<bool> {
        let current = self.reported_mode()?;
        if current == mode {
            debug!("Actuator already in {:?}", mode);
            return Ok(false);
        }
        if let ReportedMode::Unlisted(raw) = current {
            warn!("Actuator reports unlisted mode {}, switching to {:?}", raw, mode);
        }
        self.set_mode(mode)?;
        Ok(true)
    }

    // ==================== 动作槽 ====================

    pub fn kinematic_status(&mut self) -> Result<KinematicStatus> {
        let raw = self.link.read_u16(Register::KinematicStatus)?;
        Ok(KinematicStatus::from_register(raw))
    }

    /// 写入一个动作槽（6 个寄存器一次写完）
    pub fn set_kinematic_motion(&mut self, motion_id: u8, motion: &KinematicMotion) -> Result<()> {
        let address = slot_address(motion_id)?;
        let registers = motion.to_registers(self.link.profile().settling_time)?;
        self.link.write_registers(address, &registers)?;
        debug!("Kinematic slot {} set to {:?}", motion_id, motion);
        Ok(())
    }

    pub fn read_kinematic_motion(&mut self, motion_id: u8) -> Result<KinematicMotion> {
        let address = slot_address(motion_id)?;
        let registers = self
            .link
            .read_register(address, KINEMATIC_SLOT_REGISTERS as u16)?;
        Ok(KinematicMotion::from_registers(&registers, self.link.profile().settling_time)?)
    }

    /// 软件触发动作槽（KIN_SW_TRIGGER）
    pub fn trigger_kinematic_motion(&mut self, motion_id: u8) -> Result<()> {
        check_slot(motion_id)?;
        self.link.write_u16(Register::KinSwTrigger, motion_id as u16)?;
        debug!("Kinematic slot {} triggered", motion_id);
        Ok(())
    }

    /// 上电后的起始动作槽（KIN_HOME_ID）
    pub fn set_home_motion(&mut self, motion_id: u8) -> Result<()> {
        check_slot(motion_id)?;
        Ok(self.link.write_u16(Register::KinHomeId, motion_id as u16)?)
    }

    pub fn home_motion(&mut self) -> Result<u16> {
        Ok(self.link.read_u16(Register::KinHomeId)?)
    }

    // ==================== 两点往复运动 ====================

    /// 双缓冲重编程两点往复运动
    ///
    /// 1. 读 KINEMATIC_STATUS 得到活动槽
    /// 2. 选择不活动的组并计算目标
    /// 3. 写去程槽（终点，next = 回程槽）
    /// 4. 写回程槽（起点，next = 去程槽）
    /// 5. 触发新组中与当前方向一致的槽
    ///
    /// 任一步失败都直接返回错误，不回滚已完成的写入。
    pub fn configure_two_point_motion(&mut self, profile: &StrokeProfile) -> Result<SlotSwap> {
        let status = self.kinematic_status()?;
        let swap = plan_slot_swap(status.active_id);
        let targets = profile.targets();

        let outbound = KinematicMotion {
            position_target_um: targets.end_um,
            settling_time_ms: targets.settling_time_ms,
            auto_start_delay_ms: 0,
            motion_type: MotionType::MinimumJerk,
            next_id: swap.pair.inbound,
            auto_start_next: true,
        };
        let inbound = KinematicMotion {
            position_target_um: targets.start_um,
            next_id: swap.pair.outbound,
            ..outbound
        };

        self.set_kinematic_motion(swap.pair.outbound, &outbound)
            .inspect_err(|e| warn!("Failed to write outbound slot {}: {}", swap.pair.outbound, e))?;
        self.set_kinematic_motion(swap.pair.inbound, &inbound)
            .inspect_err(|e| warn!("Failed to write inbound slot {}: {}", swap.pair.inbound, e))?;
        self.trigger_kinematic_motion(swap.trigger_id)
            .inspect_err(|e| warn!("Failed to trigger slot {}: {}", swap.trigger_id, e))?;

        info!(
            "Two-point motion reprogrammed: active {} -> slots {}/{}, triggered {} ({} ms, {}..{} um)",
            swap.active_id,
            swap.pair.outbound,
            swap.pair.inbound,
            swap.trigger_id,
            targets.settling_time_ms,
            targets.start_um,
            targets.end_um
        );
        Ok(swap)
    }

    /// 按往复参数切换模式并重编程
    ///
    /// 速率或长度为零（或未设置）时切到 Sleep，不写动作槽也不触发；
    /// 否则先切到 Kinematic 再重编程。模式只在不同时写入。
    pub fn apply_stroke(&mut self, profile: &StrokeProfile) -> Result<StrokeOutcome> {
        if profile.is_idle() {
            self.ensure_mode(ActuatorMode::Sleep)?;
            return Ok(StrokeOutcome::Sleeping);
        }

        self.ensure_mode(ActuatorMode::Kinematic)?;
        let swap = self.configure_two_point_motion(profile)?;
        Ok(StrokeOutcome::Running(swap))
    }
}

fn check_slot(motion_id: u8) -> Result<()> {
    if motion_id as usize >= KINEMATIC_SLOT_COUNT {
        return Err(ClientError::InvalidInput(format!(
            "kinematic slot {} out of range 0..{}",
            motion_id, KINEMATIC_SLOT_COUNT
        )));
    }
    Ok(())
}

fn slot_address(motion_id: u8) -> Result<u16> {
    check_slot(motion_id)?;
    Ok(kinematic_motion_address(motion_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic::SlotPair;
    use orca_driver::DriverError;
    use orca_protocol::SettlingTimeWidth;
    use orca_protocol::ProtocolProfile;
    use orca_transport::{ExceptionCode, MockFault, MockHandle, MockOp, MockTransport};

    fn controller() -> (MotionController<MockTransport>, MockHandle) {
        let mock = MockTransport::new();
        let handle = mock.handle();
        let link = ActuatorLink::open(mock).unwrap();
        handle.clear_ops();
        (MotionController::new(link), handle)
    }

    fn slot_writes(handle: &MockHandle) -> Vec<u16> {
        handle
            .writes()
            .into_iter()
            .filter(|(address, _)| (780..972).contains(address))
            .map(|(address, _)| address)
            .collect()
    }

    #[test]
    fn test_ensure_mode_skips_redundant_write() {
        let (mut ctl, handle) = controller();
        handle.set_mode(ActuatorMode::Kinematic);
        assert!(!ctl.ensure_mode(ActuatorMode::Kinematic).unwrap());
        assert!(handle.writes().is_empty());

        assert!(ctl.ensure_mode(ActuatorMode::Sleep).unwrap());
        assert_eq!(handle.writes(), vec![(3, vec![1])]);
    }

    #[test]
    fn test_unknown_mode_value() {
        let (mut ctl, handle) = controller();
        handle.set_register(317, 42);
        assert!(matches!(
            ctl.get_mode(),
            Err(ClientError::Driver(DriverError::Protocol(_)))
        ));
    }

    #[test]
    fn test_reported_mode_tolerates_unknown_value() {
        let (mut ctl, handle) = controller();
        handle.set_register(317, 42);
        assert_eq!(ctl.reported_mode().unwrap(), ReportedMode::Unlisted(42));

        handle.set_mode(ActuatorMode::Force);
        assert_eq!(ctl.reported_mode().unwrap(), ActuatorMode::Force);
    }

    #[test]
    fn test_ensure_mode_from_unknown_value_writes_target() {
        let (mut ctl, handle) = controller();
        handle.set_register(317, 42);
        assert!(ctl.ensure_mode(ActuatorMode::Sleep).unwrap());
        assert_eq!(handle.writes(), vec![(3, vec![1])]);
        assert_eq!(handle.mode(), 1);
    }

    #[test]
    fn test_apply_from_unknown_mode_switches_to_kinematic() {
        let (mut ctl, handle) = controller();
        handle.set_register(317, 0);

        let outcome = ctl.apply_stroke(&StrokeProfile::new(100.0, 50.0)).unwrap();
        assert!(matches!(outcome, StrokeOutcome::Running(_)));
        assert_eq!(handle.writes()[0], (3, vec![5]));
        assert_eq!(handle.mode(), 5);
    }

    #[test]
    fn test_slot_round_trip() {
        let (mut ctl, handle) = controller();
        let motion = KinematicMotion {
            position_target_um: 65_000,
            settling_time_ms: 750,
            auto_start_delay_ms: 20,
            motion_type: MotionType::MinimumJerk,
            next_id: 6,
            auto_start_next: false,
        };
        ctl.set_kinematic_motion(5, &motion).unwrap();
        assert_eq!(handle.writes(), vec![(810, motion.to_registers(SettlingTimeWidth::Wide32).unwrap().to_vec())]);
        assert_eq!(ctl.read_kinematic_motion(5).unwrap(), motion);
    }

    #[test]
    fn test_slot_out_of_range() {
        let (mut ctl, handle) = controller();
        let motion = KinematicMotion {
            position_target_um: 0,
            settling_time_ms: 0,
            auto_start_delay_ms: 0,
            motion_type: MotionType::MinimumJerk,
            next_id: 0,
            auto_start_next: false,
        };
        assert!(matches!(
            ctl.set_kinematic_motion(32, &motion),
            Err(ClientError::InvalidInput(_))
        ));
        assert!(ctl.trigger_kinematic_motion(40).is_err());
        assert!(handle.ops().is_empty());
    }

    #[test]
    fn test_two_point_from_slot_zero() {
        let (mut ctl, handle) = controller();
        handle.set_active_motion(0, true);

        let swap = ctl
            .configure_two_point_motion(&StrokeProfile::new(100.0, 50.0))
            .unwrap();
        assert_eq!(swap.pair, SlotPair::HIGH);
        assert_eq!(swap.trigger_id, 2);

        // 去程槽 2：终点 50 mm，next = 3；回程槽 3：起点 0，next = 2
        let chain_out = orca_protocol::KinematicChain::pack(1, 3, true).unwrap().to_register();
        let chain_in = orca_protocol::KinematicChain::pack(1, 2, true).unwrap().to_register();
        assert_eq!(
            handle.writes(),
            vec![
                (792, vec![50_000, 0, 500, 0, 0, chain_out]),
                (798, vec![0, 0, 500, 0, 0, chain_in]),
                (9, vec![2]),
            ]
        );
        assert_eq!(handle.register(319), 0x8002);
    }

    #[test]
    fn test_two_point_keeps_direction() {
        let (mut ctl, handle) = controller();
        handle.set_active_motion(3, true);
        let swap = ctl
            .configure_two_point_motion(&StrokeProfile::new(50.0, 20.0))
            .unwrap();
        assert_eq!(swap.pair, SlotPair::LOW);
        assert_eq!(swap.trigger_id, 1);
        assert_eq!(slot_writes(&handle), vec![780, 786]);
        assert_eq!(handle.writes().last(), Some(&(9, vec![1])));
    }

    #[test]
    fn test_two_point_narrow_settling_time() {
        let (mut ctl, handle) = controller();
        ctl.link_mut().set_profile(ProtocolProfile {
            settling_time: SettlingTimeWidth::Narrow16,
            ..ProtocolProfile::default()
        });
        // 0.5 mm/s 跑 100 mm 需要 200 s，超过 16 位毫秒
        let err = ctl
            .configure_two_point_motion(&StrokeProfile::new(0.5, 100.0))
            .unwrap_err();
        assert!(matches!(err, ClientError::Driver(DriverError::Protocol(_))));
        assert!(slot_writes(&handle).is_empty());
    }

    #[test]
    fn test_failed_slot_write_stops_sequence() {
        let (mut ctl, handle) = controller();
        handle.set_active_motion(2, true);
        handle.inject_fault(786, MockFault::Exception(ExceptionCode::ServerDeviceBusy));

        let err = ctl
            .configure_two_point_motion(&StrokeProfile::new(100.0, 50.0))
            .unwrap_err();
        assert!(matches!(err, ClientError::Driver(DriverError::Exception { .. })));
        // 去程槽已写入（不回滚），回程槽失败，未触发
        assert_eq!(handle.register(780), 50_000);
        assert!(!handle.writes().iter().any(|(address, _)| *address == 9));
    }

    #[test]
    fn test_apply_zero_length_sleeps_without_trigger() {
        let (mut ctl, handle) = controller();
        handle.set_mode(ActuatorMode::Kinematic);

        let outcome = ctl.apply_stroke(&StrokeProfile::new(100.0, 0.0)).unwrap();
        assert_eq!(outcome, StrokeOutcome::Sleeping);
        assert_eq!(handle.writes(), vec![(3, vec![1])]);
        assert_eq!(handle.mode(), 1);
    }

    #[test]
    fn test_apply_switches_to_kinematic_before_slots() {
        let (mut ctl, handle) = controller();
        let outcome = ctl.apply_stroke(&StrokeProfile::new(100.0, 50.0)).unwrap();
        assert!(matches!(outcome, StrokeOutcome::Running(_)));

        let addresses: Vec<u16> = handle.writes().into_iter().map(|(address, _)| address).collect();
        assert_eq!(addresses, vec![3, 792, 798, 9]);
        assert_eq!(handle.mode(), 5);
    }

    #[test]
    fn test_apply_in_kinematic_does_not_rewrite_mode() {
        let (mut ctl, handle) = controller();
        handle.set_mode(ActuatorMode::Kinematic);
        ctl.apply_stroke(&StrokeProfile::new(100.0, 50.0)).unwrap();
        ctl.apply_stroke(&StrokeProfile::new(120.0, 40.0)).unwrap();
        assert!(!handle.writes().iter().any(|(address, _)| *address == 3));

        // 第二次重编程基于第一次触发的槽 2，写回 {0,1}
        assert_eq!(slot_writes(&handle), vec![792, 798, 780, 786]);
    }

    #[test]
    fn test_apply_mode_read_failure() {
        let (mut ctl, handle) = controller();
        handle.inject_fault(317, MockFault::Disconnected);
        let err = ctl.apply_stroke(&StrokeProfile::new(100.0, 50.0)).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(handle.ops(), vec![MockOp::Read { address: 317, count: 1 }]);
    }
}
