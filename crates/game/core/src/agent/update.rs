//! Per-tick agent update.

use crate::action::ActionRequest;
use crate::agent::{Activity, AgentFlags, CombatAgent, FieldSnapshot, Life, Pose, PoseKind};
use crate::env::{Env, RegenTerm};
use crate::error::log_recovered;
use crate::formula::{FormulaScope, SharedVars, evaluate};
use crate::state::FrameTimer;
use crate::stats::{BattlerStats, ResourceKind};

/// Resource changes from one regen application (positive = gained).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegenDeltas {
    pub hp: i32,
    pub mp: i32,
    pub tp: i32,
}

impl RegenDeltas {
    pub fn is_zero(&self) -> bool {
        self.hp == 0 && self.mp == 0 && self.tp == 0
    }
}

/// What happened during one [`CombatAgent::update`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateOutcome {
    /// A cast completed and its action should be queued.
    pub emitted: Option<ActionRequest>,
    /// Regen/slip applied this tick.
    pub regen: Option<RegenDeltas>,
    /// Hp reached zero outside action resolution (slip damage).
    pub slain: bool,
    /// The death transition finished; the agent can be removed.
    pub removable: bool,
}

impl CombatAgent {
    /// Advances every counter of this agent by one frame.
    ///
    /// Never fails: unknown statuses and bad formulas are logged and skipped.
    pub fn update(&mut self, env: &Env<'_>, snapshot: &FieldSnapshot, vars: &SharedVars) -> UpdateOutcome {
        let config = env.config();
        let mut outcome = UpdateOutcome::default();

        if let Life::Dying { removal } = &mut self.life {
            removal.tick();
            outcome.removable = removal.is_expired() && !env.world().is_event_running();
            return outcome;
        }

        // 1. Pose
        if self.pose.kind == PoseKind::Hurt && self.pose.timer.tick() {
            self.pose = self.stance_pose();
        }

        // 2. Timers
        self.cooldowns.tick(config.combo_window_frames);
        self.wait.tick();
        self.movement_lock.tick();
        self.tick_alert();
        if let Some(hit) = &mut self.last_hit
            && hit.timer.tick()
        {
            self.last_hit = None;
        }
        if let Activity::Guarding { parry, .. } = &mut self.activity {
            parry.tick();
        }
        self.advance_readiness();

        // 3. Regen / slip
        if self.regen.is_expired() {
            self.regen.reset(config.regen_interval());
        }
        if self.regen.tick() {
            let deltas = self.apply_regen(env, snapshot, vars);
            if !deltas.is_zero() {
                outcome.regen = Some(deltas);
            }
        }

        // 4. Dodge
        self.advance_dodge(env);

        // 5. Cast
        if let Activity::Casting { slot, skill, timer } = &mut self.activity
            && timer.tick()
        {
            let (slot, skill) = (*slot, *skill);
            self.activity = Activity::Ready;
            self.pose = Pose::default();
            outcome.emitted = Some(self.request(skill, Some(slot)));
        }

        // 6. Death
        outcome.slain = self.stats.is_dead();
        outcome
    }

    fn stance_pose(&self) -> Pose {
        let kind = match self.activity {
            Activity::Ready => PoseKind::Idle,
            Activity::Casting { .. } => PoseKind::Casting,
            Activity::Guarding { .. } => PoseKind::Guarding,
            Activity::Dodging { .. } => PoseKind::Dodging,
        };
        Pose {
            kind,
            timer: FrameTimer::IDLE,
        }
    }

    fn advance_dodge(&mut self, env: &Env<'_>) {
        let Activity::Dodging {
            direction,
            steps,
            was_invincible,
        } = self.activity
        else {
            return;
        };

        let (dx, dy) = direction.offset();
        let step = env.config().dodge_step;
        let next = self.position.offset_by(dx as f32 * step, dy as f32 * step);
        let (tx, ty) = next.tile();
        let blocked = next.tile() != self.position.tile() && !env.map().can_occupy(tx, ty, direction);
        if !blocked {
            self.position = next;
        }

        let remaining = steps - 1;
        if blocked || remaining == 0 {
            self.flags.set(AgentFlags::INVINCIBLE, was_invincible);
            self.flags.remove(AgentFlags::DASHING);
            self.activity = Activity::Ready;
            self.pose = Pose::default();
        } else {
            self.activity = Activity::Dodging {
                direction,
                steps: remaining,
                was_invincible,
            };
        }
    }

    /// Applies one regen/slip step from every active status.
    fn apply_regen(&mut self, env: &Env<'_>, snapshot: &FieldSnapshot, vars: &SharedVars) -> RegenDeltas {
        let mut totals = [0.0f64; 3];
        let kinds = [ResourceKind::Hp, ResourceKind::Mp, ResourceKind::Tp];

        for active in self.statuses.entries() {
            let def = match env.status(active.id) {
                Ok(def) => def,
                Err(error) => {
                    log_recovered("regen", &error);
                    continue;
                }
            };
            let caster = active
                .source
                .and_then(|source| snapshot.get(source))
                .map_or(&self.stats, |view| &view.stats);

            for (total, kind) in totals.iter_mut().zip(kinds) {
                *total += regen_contribution(def.regen(kind), kind, caster, &self.stats, vars);
            }
        }

        let mut deltas = RegenDeltas::default();
        for (total, kind) in totals.into_iter().zip(kinds) {
            let amount = total.round();
            if amount == 0.0 {
                continue;
            }
            let amount = amount.clamp(i32::MIN as f64, i32::MAX as f64) as i32;
            let gained = -self.stats.resources.get_mut(kind).apply_damage(-amount);
            match kind {
                ResourceKind::Hp => deltas.hp = gained,
                ResourceKind::Mp => deltas.mp = gained,
                ResourceKind::Tp => deltas.tp = gained,
            }
        }
        deltas
    }
}

fn regen_contribution(
    term: &RegenTerm,
    kind: ResourceKind,
    caster: &BattlerStats,
    target: &BattlerStats,
    vars: &SharedVars,
) -> f64 {
    let maximum = target.resources.get(kind).maximum as f64;
    let mut value = term.flat as f64 + term.percent as f64 * maximum;

    if let Some(formula) = &term.formula {
        let scope = FormulaScope {
            caster,
            target,
            vars,
        };
        match evaluate(formula, &scope) {
            Ok(extra) => value += extra,
            Err(error) => log_recovered("regen_formula", &error),
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::agent::fixtures::agent;
    use crate::combat::SlotKey;
    use crate::config::CombatConfig;
    use crate::env::{
        EffectResult, FormulaInput, FormulaOracle, MapOracle, PcgRng, QuietWorld, SkillDef,
        StatusDef, WorldOracle,
    };
    use crate::formula::Expr;
    use crate::state::{AgentId, Direction, Position, SkillId, StatusId, TeamId};
    use crate::stats::StatKey;

    struct NoDamage;

    impl FormulaOracle for NoDamage {
        fn apply(&self, _input: &FormulaInput<'_>) -> EffectResult {
            EffectResult::default()
        }
    }

    /// Blocks every tile with `x >= wall`.
    struct Wall(i32);

    impl MapOracle for Wall {
        fn can_occupy(&self, x: i32, _y: i32, _direction: Direction) -> bool {
            x < self.0
        }
    }

    struct Cutscene;

    impl WorldOracle for Cutscene {
        fn is_event_running(&self) -> bool {
            true
        }
    }

    fn statuses() -> BTreeMap<StatusId, StatusDef> {
        let mut statuses = BTreeMap::new();
        statuses.insert(
            StatusId(1),
            StatusDef {
                hp_regen: RegenTerm {
                    flat: -3,
                    percent: -0.05,
                    formula: None,
                },
                ..StatusDef::new(StatusId(1), "Poison")
            },
        );
        statuses.insert(
            StatusId(2),
            StatusDef {
                mp_regen: RegenTerm {
                    flat: 0,
                    percent: 0.0,
                    formula: Some(Expr::Div(
                        Box::new(Expr::Caster(StatKey::Level)),
                        Box::new(Expr::Var(0)),
                    )),
                },
                hp_regen: RegenTerm {
                    flat: 2,
                    ..RegenTerm::default()
                },
                ..StatusDef::new(StatusId(2), "Cursed Spring")
            },
        );
        statuses
    }

    fn run(
        a: &mut CombatAgent,
        frames: u32,
        map: &dyn MapOracle,
        world: &dyn WorldOracle,
    ) -> Vec<UpdateOutcome> {
        let config = CombatConfig::default();
        let skills: BTreeMap<SkillId, SkillDef> = BTreeMap::new();
        let statuses = statuses();
        let env = Env::new(&config, &skills, &statuses, map, &NoDamage, world, &PcgRng);
        let snapshot = FieldSnapshot::default();
        let vars = SharedVars::new();
        (0..frames).map(|_| a.update(&env, &snapshot, &vars)).collect()
    }

    #[test]
    fn slip_damage_every_fifteen_frames() {
        let mut a = agent(0, TeamId::HOSTILE, 0.0, 0.0);
        a.statuses.add(StatusId(1), None, None);

        let outcomes = run(&mut a, 15, &crate::env::OpenMap, &QuietWorld);
        assert!(outcomes[..14].iter().all(|o| o.regen.is_none()));
        // 3 flat + 5% of 100
        assert_eq!(outcomes[14].regen, Some(RegenDeltas { hp: -8, mp: 0, tp: 0 }));
        assert_eq!(a.stats.hp(), 92);
    }

    #[test]
    fn non_finite_formula_is_discarded() {
        let mut a = agent(0, TeamId::HOSTILE, 0.0, 0.0);
        a.stats.resources.hp.current = 50;
        a.statuses.add(StatusId(2), None, None);

        let outcomes = run(&mut a, 15, &crate::env::OpenMap, &QuietWorld);
        // Division by an unset variable yields infinity; only the flat hp term applies.
        assert_eq!(outcomes[14].regen, Some(RegenDeltas { hp: 2, mp: 0, tp: 0 }));
        assert_eq!(a.stats.resources.mp.current, 50);
    }

    #[test]
    fn slip_damage_can_slay() {
        let mut a = agent(0, TeamId::HOSTILE, 0.0, 0.0);
        a.stats.resources.hp.current = 5;
        a.statuses.add(StatusId(1), None, Some(AgentId::new(7, 0)));
        let outcomes = run(&mut a, 15, &crate::env::OpenMap, &QuietWorld);
        assert!(outcomes[14].slain);
    }

    #[test]
    fn cast_emits_after_its_frames() {
        let mut a = agent(0, TeamId::HOSTILE, 0.0, 0.0);
        a.activity = Activity::Casting {
            slot: SlotKey::Skill(1),
            skill: SkillId(9),
            timer: FrameTimer::new(3),
        };
        let outcomes = run(&mut a, 3, &crate::env::OpenMap, &QuietWorld);
        assert!(outcomes[1].emitted.is_none());
        let emitted = outcomes[2].emitted.as_ref().unwrap();
        assert_eq!(emitted.skill, SkillId(9));
        assert_eq!(emitted.slot, Some(SlotKey::Skill(1)));
        assert_eq!(a.activity, Activity::Ready);
    }

    #[test]
    fn dodge_moves_and_restores_flags() {
        let mut a = agent(0, TeamId::HOSTILE, 0.0, 0.0);
        a.dodge(Direction::Right, 4).unwrap();
        run(&mut a, 4, &crate::env::OpenMap, &QuietWorld);
        assert_eq!(a.position, Position::new(1.0, 0.0));
        assert!(!a.has(AgentFlags::INVINCIBLE));
        assert!(!a.has(AgentFlags::DASHING));
        assert_eq!(a.activity, Activity::Ready);
    }

    #[test]
    fn dodge_stops_at_impassable_tile() {
        let mut a = agent(0, TeamId::HOSTILE, 0.0, 0.0);
        a.dodge(Direction::Right, 12).unwrap();
        run(&mut a, 12, &Wall(1), &QuietWorld);
        // Tile 1 starts at x = 0.5.
        assert!(a.position.x < 0.5);
        assert_eq!(a.activity, Activity::Ready);
    }

    #[test]
    fn dying_waits_for_world_events() {
        let mut a = agent(0, TeamId::PARTY, 0.0, 0.0);
        a.begin_dying(0);
        let blocked = run(&mut a, 2, &crate::env::OpenMap, &Cutscene);
        assert!(blocked.iter().all(|o| !o.removable));
        let free = run(&mut a, 1, &crate::env::OpenMap, &QuietWorld);
        assert!(free[0].removable);
    }
}
