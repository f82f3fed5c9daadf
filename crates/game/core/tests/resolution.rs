mod common;

use combat_core::env::{EffectResult, GuardSpec, Scope, SkillDef};
use combat_core::outbox::{HitOutcome, PopupKind};
use combat_core::{
    ActionResolver, AgentId, CombatEvent, CombatField, Controller, Direction, Position,
    Presentation, SkillId, SlotKey, TeamId,
};

use common::{ScriptedFormula, World, battler, strike, with_slot};

const GUARD: u16 = 9;
const RIPOSTE: u16 = 3;

fn guard_skill() -> SkillDef {
    SkillDef {
        scope: Scope::User,
        guard: Some(GuardSpec {
            flat_reduction: 10,
            percent_reduction: 0.2,
            counter_parry: vec![SkillId(RIPOSTE)],
            ..GuardSpec::default()
        }),
        ..SkillDef::new(SkillId(GUARD), "Guard")
    }
}

fn guard_world(damage: i32) -> World {
    let mut formula = ScriptedFormula::damage(damage);
    formula.per_skill.insert(
        SkillId(RIPOSTE),
        EffectResult {
            hp_damage: 30,
            ..EffectResult::default()
        },
    );
    World::new(formula)
        .with_skill(strike(1, 1.5))
        .with_skill(strike(RIPOSTE, 1.5))
        .with_skill(guard_skill())
}

/// Spawns a guarding knight at the origin and an orc one tile to its right.
fn guard_duel(world: &World, guard_rate: f32) -> (CombatField, AgentId, AgentId) {
    let env = world.env();
    let mut field = CombatField::new(11);

    let mut knight = with_slot(battler("Knight", TeamId::PARTY, 250), SlotKey::Guard, GUARD);
    knight.stats.rates.grd = guard_rate;
    let knight = field.spawn(&knight, Position::new(0.0, 0.0), Controller::Player);
    let orc = field.spawn(
        &with_slot(battler("Orc", TeamId::HOSTILE, 100), SlotKey::Attack, 1),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );

    let raised = field
        .agent_mut(knight)
        .expect("knight")
        .execute_guard(true, SlotKey::Guard, &env);
    assert_eq!(raised, Ok(true));
    (field, knight, orc)
}

fn attack(field: &mut CombatField, world: &World, caster: AgentId, skill: u16) -> usize {
    let env = world.env();
    let request = field
        .agent(caster)
        .expect("caster")
        .request(SkillId(skill), Some(SlotKey::Attack));
    field.queue(request, &env).expect("skill is defined");
    ActionResolver::new(field, &env).resolve_pending()
}

fn hp(field: &CombatField, id: AgentId) -> u32 {
    field.agent(id).expect("agent").stats.hp()
}

#[test]
fn guard_reduces_flat_then_percent() {
    let world = guard_world(100);
    let (mut field, knight, orc) = guard_duel(&world, 1.0);

    assert_eq!(attack(&mut field, &world, orc, 1), 1);

    assert_eq!(hp(&field, knight), 250 - 72);
    let guarded = field.outbox.presentation().iter().any(|p| {
        matches!(p, Presentation::Log(entry) if entry.outcome == HitOutcome::Guarded && entry.hp_damage == 72)
    });
    assert!(guarded);
}

#[test]
fn zero_guard_rate_never_parries() {
    let world = guard_world(100);
    let (mut field, knight, orc) = guard_duel(&world, 0.0);

    attack(&mut field, &world, orc, 1);

    assert_eq!(hp(&field, knight), 178);
    assert!(field.pending.is_empty());
}

#[test]
fn parry_ignore_at_threshold_never_parries() {
    let mut world = guard_world(100);
    if let Some(skill) = world.skills.get_mut(&SkillId(1)) {
        skill.ignore_parry = 1.0;
    }
    let (mut field, knight, orc) = guard_duel(&world, 2.0);

    attack(&mut field, &world, orc, 1);

    assert_eq!(hp(&field, knight), 178);
}

#[test]
fn parry_skips_damage_moves_aggro_and_counters() {
    let world = guard_world(100);
    let (mut field, knight, orc) = guard_duel(&world, 2.0);

    attack(&mut field, &world, orc, 1);

    // No damage, a parry popup, and the attacker's threat toward the knight grows.
    assert_eq!(hp(&field, knight), 250);
    assert!(field.outbox.presentation().iter().any(|p| matches!(
        p,
        Presentation::Popup { kind: PopupKind::Parry, .. }
    )));
    let orc_agent = field.agent(orc).expect("orc");
    assert_eq!(orc_agent.aggro.get(knight), Some(10.0));

    // The counter-parry skill is queued as a retaliation facing the attacker.
    assert_eq!(field.pending.len(), 1);
    let riposte = &field.pending[0];
    assert_eq!(riposte.caster, knight);
    assert_eq!(riposte.skill, SkillId(RIPOSTE));
    assert!(riposte.retaliation);
    assert_eq!(field.agent(knight).expect("knight").facing, Direction::Right);

    // It resolves on the next pass and is never retaliated against.
    let env = world.env();
    assert_eq!(ActionResolver::new(&mut field, &env).resolve_pending(), 1);
    assert_eq!(hp(&field, orc), 70);
    assert!(field.pending.is_empty());
}

#[test]
fn single_hit_aggro_is_base_plus_weighted_damage() {
    let world = World::new(ScriptedFormula::damage(50)).with_skill(strike(1, 1.5));
    let mut field = CombatField::new(3);
    let archer = field.spawn(
        &battler("Archer", TeamId::PARTY, 100),
        Position::new(0.0, 0.0),
        Controller::Ai,
    );
    let wolf = field.spawn(
        &battler("Wolf", TeamId::HOSTILE, 200),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );

    attack(&mut field, &world, archer, 1);

    let config = &world.config;
    let expected = config.aggro_base + 50.0 * config.aggro_hp_weight;
    let wolf = field.agent(wolf).expect("wolf");
    assert_eq!(wolf.aggro.get(archer), Some(expected));
    // In sight, so the wolf engages its attacker.
    assert_eq!(wolf.target(), Some(archer));
}

#[test]
fn player_caused_aggro_is_scaled() {
    let world = World::new(ScriptedFormula::damage(50)).with_skill(strike(1, 1.5));
    let mut field = CombatField::new(3);
    let hero = field.spawn(
        &battler("Hero", TeamId::PARTY, 100),
        Position::new(0.0, 0.0),
        Controller::Player,
    );
    let wolf = field.spawn(
        &battler("Wolf", TeamId::HOSTILE, 200),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );

    attack(&mut field, &world, hero, 1);

    let expected = (10.0 + 50.0) * world.config.player_aggro_factor;
    assert_eq!(field.agent(wolf).expect("wolf").aggro.get(hero), Some(expected));
}

#[test]
fn same_team_hits_cause_no_aggro() {
    let heal = SkillDef {
        scope: Scope::Allies,
        range: 2.0,
        ..SkillDef::new(SkillId(6), "Heal")
    };
    let world = World::new(ScriptedFormula::damage(-20)).with_skill(heal);
    let mut field = CombatField::new(3);
    let cleric = field.spawn(
        &battler("Cleric", TeamId::PARTY, 100),
        Position::new(0.0, 0.0),
        Controller::Ai,
    );
    let ally = field.spawn(
        &battler("Ally", TeamId::PARTY, 100),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );
    field.agent_mut(ally).expect("ally").stats.resources.hp.current = 50;

    attack(&mut field, &world, cleric, 6);

    let ally = field.agent(ally).expect("ally");
    assert_eq!(ally.stats.hp(), 70);
    assert!(ally.aggro.is_empty());
    assert_eq!(ally.last_struck_by(), None);
}

#[test]
fn knockback_stops_before_obstruction() {
    let mut world = World::new(ScriptedFormula::damage(5)).with_skill(SkillDef {
        knockback: 3,
        ..strike(4, 1.5)
    });
    world.map.walls.insert((3, 0));
    let mut field = CombatField::new(5);
    let brute = field.spawn(
        &battler("Brute", TeamId::HOSTILE, 100),
        Position::new(0.0, 0.0),
        Controller::Ai,
    );
    let squire = field.spawn(
        &battler("Squire", TeamId::PARTY, 100),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );
    field.agent_mut(brute).expect("brute").facing = Direction::Right;

    attack(&mut field, &world, brute, 4);

    let squire_agent = field.agent(squire).expect("squire");
    assert_eq!(squire_agent.position, Position::new(2.0, 0.0));
    assert!(!squire_agent.can_move());
    assert!(field.outbox.presentation().contains(&Presentation::Jump {
        agent: squire,
        from: Position::new(1.0, 0.0),
        to: Position::new(2.0, 0.0),
    }));
}

#[test]
fn knockback_into_adjacent_wall_hops() {
    let mut world = World::new(ScriptedFormula::damage(5)).with_skill(SkillDef {
        knockback: 2,
        ..strike(4, 1.5)
    });
    world.map.walls.insert((2, 0));
    let mut field = CombatField::new(5);
    let brute = field.spawn(
        &battler("Brute", TeamId::HOSTILE, 100),
        Position::new(0.0, 0.0),
        Controller::Ai,
    );
    let squire = field.spawn(
        &battler("Squire", TeamId::PARTY, 100),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );
    field.agent_mut(brute).expect("brute").facing = Direction::Right;

    attack(&mut field, &world, brute, 4);

    assert_eq!(field.agent(squire).expect("squire").position, Position::new(1.0, 0.0));
    assert!(field
        .outbox
        .presentation()
        .contains(&Presentation::Hop { agent: squire }));
}

#[test]
fn fully_resisted_knockback_hops_and_locks_movement() {
    let world = World::new(ScriptedFormula::damage(5)).with_skill(SkillDef {
        knockback: 2,
        ..strike(4, 1.5)
    });
    let mut field = CombatField::new(5);
    let brute = field.spawn(
        &battler("Brute", TeamId::HOSTILE, 100),
        Position::new(0.0, 0.0),
        Controller::Ai,
    );
    let mut anchor = battler("Anchor", TeamId::PARTY, 100);
    anchor.stats.rates.knockback_resist = 1.0;
    let anchor = field.spawn(&anchor, Position::new(1.0, 0.0), Controller::Ai);
    field.agent_mut(brute).expect("brute").facing = Direction::Right;

    attack(&mut field, &world, brute, 4);

    let anchor_agent = field.agent(anchor).expect("anchor");
    assert_eq!(anchor_agent.position, Position::new(1.0, 0.0));
    assert!(!anchor_agent.can_move());
    assert!(field
        .outbox
        .presentation()
        .contains(&Presentation::Hop { agent: anchor }));
}

#[test]
fn parry_counters_take_precedence_over_guard_counters() {
    const BASH: u16 = 5;
    let mut world = guard_world(100).with_skill(strike(BASH, 1.5));
    if let Some(guard) = world
        .skills
        .get_mut(&SkillId(GUARD))
        .and_then(|skill| skill.guard.as_mut())
    {
        guard.counter_guard = vec![SkillId(BASH)];
    }

    // A guarded hit fires only the guard counters.
    let (mut field, knight, orc) = guard_duel(&world, 1.0);
    attack(&mut field, &world, orc, 1);
    let queued: Vec<_> = field.pending.iter().map(|a| (a.caster, a.skill)).collect();
    assert_eq!(queued, vec![(knight, SkillId(BASH))]);

    // A parried hit fires only the parry counters.
    let (mut field, knight, orc) = guard_duel(&world, 2.0);
    attack(&mut field, &world, orc, 1);
    let queued: Vec<_> = field.pending.iter().map(|a| (a.caster, a.skill)).collect();
    assert_eq!(queued, vec![(knight, SkillId(RIPOSTE))]);
}

#[test]
fn passive_retaliation_queues_against_attacker() {
    let world = World::new(ScriptedFormula::damage(5))
        .with_skill(strike(1, 1.5))
        .with_skill(strike(7, 1.5));
    let mut field = CombatField::new(9);
    let hero = field.spawn(
        &battler("Hero", TeamId::PARTY, 100),
        Position::new(0.0, 0.0),
        Controller::Player,
    );
    let mut urchin = battler("Urchin", TeamId::HOSTILE, 100);
    urchin.retaliation_skills = vec![SkillId(7)];
    let urchin = field.spawn(&urchin, Position::new(0.0, 1.0), Controller::Ai);

    attack(&mut field, &world, hero, 1);

    assert_eq!(field.pending.len(), 1);
    let spikes = &field.pending[0];
    assert_eq!(spikes.caster, urchin);
    assert!(spikes.retaliation);
    assert_eq!(spikes.slot, None);
    assert_eq!(spikes.direction, Direction::Up);
}

#[test]
fn missed_hits_still_cause_base_aggro() {
    let mut formula = ScriptedFormula::default();
    formula.default.missed = true;
    let world = World::new(formula).with_skill(strike(1, 1.5));
    let mut field = CombatField::new(2);
    let hero = field.spawn(
        &battler("Hero", TeamId::PARTY, 100),
        Position::new(0.0, 0.0),
        Controller::Ai,
    );
    let bat = field.spawn(
        &battler("Bat", TeamId::HOSTILE, 100),
        Position::new(1.0, 0.0),
        Controller::Ai,
    );

    attack(&mut field, &world, hero, 1);

    let bat = field.agent(bat).expect("bat");
    assert_eq!(bat.aggro.get(hero), Some(world.config.aggro_base));
    assert_eq!(bat.last_struck_by(), None);
    assert!(field.outbox.presentation().iter().any(|p| matches!(
        p,
        Presentation::Popup { kind: PopupKind::Miss, .. }
    )));
    assert!(
        !field
            .outbox
            .events()
            .iter()
            .any(|e| matches!(e, CombatEvent::EngagementChanged { .. }))
    );
}
