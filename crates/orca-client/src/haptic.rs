//! 触觉效果配置
//!
//! 效果参数只有在执行器处于 Haptic 模式并在 HAPTIC_STATUS 中使能后才生效。

use crate::error::Result;
use crate::motion::MotionController;
use orca_protocol::{
    HapticEffects, OscillatorEffect, OscillatorId, Register, SpringEffect, SpringId,
};
use orca_transport::ModbusTransport;
use tracing::debug;

impl<T: ModbusTransport> MotionController<T> {
    /// 写入效果使能位域
    pub fn set_haptic_effects(&mut self, effects: HapticEffects) -> Result<()> {
        self.link_mut()
            .write_u16(Register::HapticStatus, effects.to_register())?;
        debug!("Haptic effects enabled: {:?}", effects);
        Ok(())
    }

    pub fn haptic_effects(&mut self) -> Result<HapticEffects> {
        let raw = self.link_mut().read_u16(Register::HapticStatus)?;
        Ok(HapticEffects::from_register(raw))
    }

    /// 恒力（mN，32 位有符号）
    pub fn set_constant_force(&mut self, force_mn: i32) -> Result<()> {
        Ok(self
            .link_mut()
            .write_i32(Register::ConstantForceMn.address(), force_mn)?)
    }

    pub fn constant_force(&mut self) -> Result<i32> {
        Ok(self.link_mut().read_i32(Register::ConstantForceMn.address())?)
    }

    /// 恒力低通滤波系数
    pub fn set_constant_force_filter(&mut self, filter: u16) -> Result<()> {
        Ok(self.link_mut().write_u16(Register::ConstForceFilter, filter)?)
    }

    pub fn set_spring_effect(&mut self, spring: SpringId, effect: &SpringEffect) -> Result<()> {
        let address = spring.base().address();
        self.link_mut()
            .write_registers(address, &effect.to_registers())?;
        debug!("{:?} set to {:?}", spring, effect);
        Ok(())
    }

    pub fn spring_effect(&mut self, spring: SpringId) -> Result<SpringEffect> {
        let registers = self
            .link_mut()
            .read_register(spring.base().address(), SpringEffect::REGISTERS as u16)?;
        Ok(SpringEffect::from_registers(&registers)?)
    }

    /// 阻尼增益（N·s/mm）
    pub fn set_damper(&mut self, gain: u16) -> Result<()> {
        Ok(self.link_mut().write_u16(Register::D0GainNsMm, gain)?)
    }

    /// 惯性增益（N·s²/mm）
    pub fn set_inertia(&mut self, gain: u16) -> Result<()> {
        Ok(self.link_mut().write_u16(Register::I0GainNs2Mm, gain)?)
    }

    pub fn set_oscillator_effect(
        &mut self,
        oscillator: OscillatorId,
        effect: &OscillatorEffect,
    ) -> Result<()> {
        let address = oscillator.base().address();
        self.link_mut()
            .write_registers(address, &effect.to_registers())?;
        debug!("{:?} set to {:?}", oscillator, effect);
        Ok(())
    }

    pub fn oscillator_effect(&mut self, oscillator: OscillatorId) -> Result<OscillatorEffect> {
        let registers = self
            .link_mut()
            .read_register(oscillator.base().address(), OscillatorEffect::REGISTERS as u16)?;
        Ok(OscillatorEffect::from_registers(&registers)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::MotionController;
    use crate::error::ClientError;
    use orca_driver::{ActuatorLink, DriverError};
    use orca_protocol::{
        HapticEffects, OscillatorEffect, OscillatorId, OscillatorWaveform, SpringCoupling,
        SpringEffect, SpringId,
    };
    use orca_transport::{MockHandle, MockTransport};

    fn controller() -> (MotionController<MockTransport>, MockHandle) {
        let mock = MockTransport::new();
        let handle = mock.handle();
        let link = ActuatorLink::open(mock).unwrap();
        handle.clear_ops();
        (MotionController::new(link), handle)
    }

    #[test]
    fn test_effect_bits() {
        let (mut ctl, handle) = controller();
        let mut effects = HapticEffects::none();
        effects.set_constant_force(true);
        effects.set_spring2(true);
        effects.set_oscillator1(true);
        ctl.set_haptic_effects(effects).unwrap();

        assert_eq!(handle.register(641), 0b1000_1001);
        assert_eq!(ctl.haptic_effects().unwrap(), effects);
    }

    #[test]
    fn test_constant_force_is_low_word_first() {
        let (mut ctl, handle) = controller();
        ctl.set_constant_force(-2).unwrap();
        assert_eq!(handle.registers(642, 2), vec![0xFFFE, 0xFFFF]);
        assert_eq!(ctl.constant_force().unwrap(), -2);
    }

    #[test]
    fn test_spring_block() {
        let (mut ctl, handle) = controller();
        let spring = SpringEffect {
            gain_n_per_mm: 12,
            center_um: 70_000,
            coupling: SpringCoupling::Positive,
            dead_zone_mm: 2,
            force_saturation_n: 40,
        };
        ctl.set_spring_effect(SpringId::Spring2, &spring).unwrap();
        assert_eq!(handle.writes(), vec![(656, spring.to_registers().to_vec())]);
        assert_eq!(ctl.spring_effect(SpringId::Spring2).unwrap(), spring);
    }

    #[test]
    fn test_invalid_spring_coupling() {
        let (mut ctl, handle) = controller();
        handle.set_register(647, 9);
        assert!(matches!(
            ctl.spring_effect(SpringId::Spring0),
            Err(ClientError::Driver(DriverError::Protocol(_)))
        ));
    }

    #[test]
    fn test_oscillator_block() {
        let (mut ctl, handle) = controller();
        let oscillator = OscillatorEffect {
            gain_n: 5,
            waveform: OscillatorWaveform::Sine,
            frequency_dhz: 25,
            duty: 50,
        };
        ctl.set_oscillator_effect(OscillatorId::Oscillator1, &oscillator)
            .unwrap();
        assert_eq!(handle.registers(668, 4), vec![5, 1, 25, 50]);
        assert_eq!(
            ctl.oscillator_effect(OscillatorId::Oscillator1).unwrap(),
            oscillator
        );
    }

    #[test]
    fn test_damper_inertia_filter() {
        let (mut ctl, handle) = controller();
        ctl.set_damper(3).unwrap();
        ctl.set_inertia(4).unwrap();
        ctl.set_constant_force_filter(10).unwrap();
        assert_eq!(
            handle.writes(),
            vec![(662, vec![3]), (663, vec![4]), (672, vec![10])]
        );
    }
}
