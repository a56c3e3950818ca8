//! Presentation flags written by the state machine.
//!
//! The animation layer reads these; nothing here ever feeds back into a
//! transition decision.

const FLAG_COUNT: usize = 7;

/// Looping animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimFlag {
    Patrol,
    Idle,
    Chase,
    Stun,
    Dead,
    BasicAttack,
    SkillAttack,
}

impl AnimFlag {
    fn index(self) -> usize {
        self as usize
    }
}

/// One-shot animation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTrigger {
    Hurt,
    PlayDead,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animator {
    flags: [bool; FLAG_COUNT],
    triggers: Vec<AnimTrigger>,
}

impl Animator {
    pub fn set(&mut self, flag: AnimFlag, on: bool) {
        self.flags[flag.index()] = on;
    }

    pub fn get(&self, flag: AnimFlag) -> bool {
        self.flags[flag.index()]
    }

    pub fn fire(&mut self, trigger: AnimTrigger) {
        self.triggers.push(trigger);
    }

    /// Triggers fired since the last drain, oldest first.
    pub fn pending_triggers(&self) -> &[AnimTrigger] {
        &self.triggers
    }

    pub fn drain_triggers(&mut self) -> impl Iterator<Item = AnimTrigger> + '_ {
        self.triggers.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut animator = Animator::default();
        animator.set(AnimFlag::Chase, true);
        animator.set(AnimFlag::Stun, true);
        animator.set(AnimFlag::Chase, false);

        assert!(!animator.get(AnimFlag::Chase));
        assert!(animator.get(AnimFlag::Stun));
        assert!(!animator.get(AnimFlag::Patrol));
    }

    #[test]
    fn triggers_drain_in_order() {
        let mut animator = Animator::default();
        animator.fire(AnimTrigger::Hurt);
        animator.fire(AnimTrigger::PlayDead);

        let drained: Vec<_> = animator.drain_triggers().collect();
        assert_eq!(drained, vec![AnimTrigger::Hurt, AnimTrigger::PlayDead]);
        assert!(animator.pending_triggers().is_empty());
    }
}
