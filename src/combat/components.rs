//! Combat-related data: hit points, stun gauge and the attack gate.

/// Remaining hit points.
///
/// Damage never takes `current` below zero, so every reader sees a
/// non-negative value. Death is derived from `current`, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPoints {
    current: f32,
}

impl HitPoints {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
        }
    }

    /// Remove up to `amount` hit points and return how many were removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.current);
        self.current -= actual;
        actual
    }

    pub fn current(&self) -> f32 {
        self.current.max(0.0)
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Accumulated stun against a threshold.
///
/// The gauge only grows until it is reset, and a reset always returns it to
/// zero: overflow above `max` is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StunGauge {
    current: f32,
    max: f32,
}

impl StunGauge {
    pub fn new(max: f32) -> Self {
        Self { current: 0.0, max }
    }

    /// Add stun. Negative amounts are ignored.
    pub fn accumulate(&mut self, amount: f32) {
        self.current += amount.max(0.0);
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }
}

/// Whether the enemy may start an attack, plus the flags of the swing in
/// progress.
///
/// `attackable` drops the instant a swing starts and comes back only through
/// [`CombatGate::recover`], which the owner calls when its post-attack
/// recovery timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatGate {
    attackable: bool,
    /// Swing can currently be parried by the target
    parryable: bool,
    /// Attack hitbox is live
    damage_active: bool,
}

impl Default for CombatGate {
    fn default() -> Self {
        Self {
            attackable: true,
            parryable: false,
            damage_active: false,
        }
    }
}

impl CombatGate {
    pub fn attackable(&self) -> bool {
        self.attackable
    }

    pub fn is_parryable(&self) -> bool {
        self.parryable
    }

    pub fn is_damage_active(&self) -> bool {
        self.damage_active
    }

    /// Swing starts: close the gate and open the damage window.
    pub fn begin_attack(&mut self) {
        self.attackable = false;
        self.parryable = false;
        self.damage_active = true;
    }

    pub fn open_parry_window(&mut self) {
        self.parryable = true;
    }

    /// Close the damage window. Returns `true` if it was open.
    pub fn end_damage_window(&mut self) -> bool {
        std::mem::replace(&mut self.damage_active, false)
    }

    /// Drop every flag of the swing in progress without reopening the gate.
    pub fn clear_swing(&mut self) {
        self.parryable = false;
        self.damage_active = false;
    }

    pub fn recover(&mut self) {
        self.attackable = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_floors_at_zero() {
        let mut hp = HitPoints::new(30.0);
        assert_eq!(hp.take_damage(12.0), 12.0);
        assert_eq!(hp.take_damage(50.0), 18.0);
        assert_eq!(hp.current(), 0.0);
        assert!(hp.is_dead());
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let mut hp = HitPoints::new(10.0);
        hp.take_damage(4.0);
        assert_eq!(hp.take_damage(-5.0), 0.0);
        assert_eq!(hp.current(), 6.0);
    }

    #[test]
    fn stun_gauge_discards_overflow_on_reset() {
        let mut gauge = StunGauge::new(10.0);
        gauge.accumulate(6.0);
        assert!(!gauge.is_full());
        gauge.accumulate(7.5);
        assert!(gauge.is_full());
        assert_eq!(gauge.current(), 13.5);

        gauge.reset();
        assert_eq!(gauge.current(), 0.0);
        assert!(!gauge.is_full());
    }

    #[test]
    fn stun_gauge_only_grows() {
        let mut gauge = StunGauge::new(10.0);
        gauge.accumulate(3.0);
        gauge.accumulate(-2.0);
        assert_eq!(gauge.current(), 3.0);
    }

    #[test]
    fn gate_cycle() {
        let mut gate = CombatGate::default();
        assert!(gate.attackable());

        gate.begin_attack();
        assert!(!gate.attackable());
        assert!(gate.is_damage_active());
        assert!(!gate.is_parryable());

        gate.open_parry_window();
        assert!(gate.is_parryable());

        assert!(gate.end_damage_window());
        assert!(!gate.end_damage_window());
        assert!(!gate.attackable());

        gate.recover();
        assert!(gate.attackable());
    }
}
