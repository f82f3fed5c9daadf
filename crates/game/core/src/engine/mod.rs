//! Fixed-order tick scheduling.
//!
//! The [`CombatEngine`] drives a [`CombatField`] one frame at a time. Each
//! tick runs these phases in order:
//!
//! 1. Snapshot the field (AI reads this, never live state)
//! 2. Update player-controlled agents
//! 3. Update AI agents near a player: timers, targeting, decision, acting
//! 4. Resolve pending actions whose delay elapsed
//! 5. Tick status durations
//! 6. Apply polled player commands
//! 7. Remove agents whose death transition finished
//!
//! The order is part of the contract: AI decisions in a tick see the player
//! as it was when the tick began.

mod command;

pub use command::{PlayerCommand, PlayerInput};

use crate::action::ActionResolver;
use crate::agent::{BattlerTemplate, Controller, Engagement, FieldSnapshot, SlotUse};
use crate::ai::{TargetChange, TargetingManager, decide_action, engage_followers};
use crate::env::Env;
use crate::error::log_recovered;
use crate::outbox::CombatEvent;
use crate::state::{AgentId, CombatField, Direction};

/// Summary of one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actions resolved in the actions phase.
    pub resolved: usize,
    /// Agents defeated this tick outside action resolution (slip damage).
    pub slain: Vec<AgentId>,
    /// Agents removed from the field.
    pub removed: Vec<AgentId>,
}

/// Runs the simulation over a borrowed field.
pub struct CombatEngine<'a> {
    field: &'a mut CombatField,
}

impl<'a> CombatEngine<'a> {
    pub fn new(field: &'a mut CombatField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &CombatField {
        self.field
    }

    /// Advances the field by one frame.
    ///
    /// Never fails: every recovered problem is logged and skipped.
    pub fn tick(&mut self, env: &Env<'_>, commands: &[PlayerCommand]) -> TickReport {
        let mut report = TickReport::default();
        let mut removable = Vec::new();

        // 1. Snapshot
        let snapshot = FieldSnapshot::capture(&self.field.agents);

        // 2. Players
        let players: Vec<_> = snapshot.players().map(|view| (view.id, view.position)).collect();
        for &(id, _) in &players {
            self.update_agent(id, env, &snapshot, &mut report, &mut removable);
        }

        // 3. AI within range of a player (everyone when no player is on the field)
        let radius = env.config().update_radius;
        let ai: Vec<AgentId> = snapshot
            .iter()
            .filter(|view| !view.is_player())
            .filter(|view| {
                players.is_empty()
                    || players
                        .iter()
                        .any(|(_, position)| position.distance(view.position) <= radius)
            })
            .map(|view| view.id)
            .collect();
        for id in ai {
            if self.update_agent(id, env, &snapshot, &mut report, &mut removable) {
                self.run_ai(id, env, &snapshot);
            }
        }

        // 4. Pending actions
        report.resolved = ActionResolver::new(self.field, env).resolve_pending();

        // 5. Status durations
        for (id, agent) in self.field.agents.iter_mut() {
            for status in agent.statuses.tick() {
                tracing::trace!(agent = %id, %status, "status expired");
            }
        }

        // 6. Player commands
        for command in commands {
            self.apply_command(command, env);
        }

        // 7. Removal
        for id in removable {
            if self.field.agents.remove(id).is_some() {
                self.field.pending.retain(|action| action.caster != id);
                self.field.outbox.emit(CombatEvent::Removed { agent: id });
                tracing::debug!(agent = %id, "removed");
                report.removed.push(id);
            }
        }

        report
    }

    /// Runs the per-frame update of one agent. Returns `true` if the agent
    /// is still alive afterwards.
    fn update_agent(
        &mut self,
        id: AgentId,
        env: &Env<'_>,
        snapshot: &FieldSnapshot,
        report: &mut TickReport,
        removable: &mut Vec<AgentId>,
    ) -> bool {
        let field = &mut *self.field;
        let Some(agent) = field.agents.get_mut(id) else {
            return false;
        };
        let outcome = agent.update(env, snapshot, &field.vars);
        let credit = agent.last_struck_by();

        if let Some(request) = outcome.emitted {
            field.queue(request, env);
        }
        if outcome.removable {
            removable.push(id);
        }
        if outcome.slain && ActionResolver::new(field, env).defeat(id, credit) {
            report.slain.push(id);
            return false;
        }
        !outcome.removable && field.agents.get(id).is_some_and(|agent| agent.is_alive())
    }

    /// Targeting, decision and acting for one AI agent.
    fn run_ai(&mut self, id: AgentId, env: &Env<'_>, snapshot: &FieldSnapshot) {
        let field = &mut *self.field;
        let Some(agent) = field.agents.get_mut(id) else {
            return;
        };

        let change = TargetingManager::new(snapshot).update(agent, &mut field.outbox);
        if let Some(TargetChange::Engaged(target)) = change {
            engage_followers(&mut field.agents, id, target, &mut field.outbox);
        }

        let Some(agent) = field.agents.get_mut(id) else {
            return;
        };
        if !TargetingManager::is_eligible(agent) || !agent.is_engaged() {
            return;
        }
        let Some(decided) = decide_action(agent, snapshot, env) else {
            return;
        };
        if !agent.is_action_ready() {
            return;
        }

        let aim = agent
            .ally_target
            .or(agent.target())
            .and_then(|target| snapshot.get(target))
            .map(|view| view.position);
        if let Some(aim) = aim
            && aim != agent.position
        {
            agent.facing = Direction::toward(agent.position, aim);
        }

        match agent.use_slot(decided.slot, env) {
            Ok(SlotUse::Emitted(request)) => {
                agent.consume_readiness();
                field.queue(request, env);
            }
            Ok(SlotUse::Casting { .. }) => agent.consume_readiness(),
            Err(error) => {
                log_recovered("ai_use_slot", &error);
                agent.decided = None;
            }
        }
    }

    fn apply_command(&mut self, command: &PlayerCommand, env: &Env<'_>) {
        let Some(agent) = self.field.agents.get_mut(command.agent) else {
            tracing::warn!(agent = %command.agent, "command for missing agent");
            return;
        };

        let result = match command.input {
            PlayerInput::UseSlot(slot) => agent.use_slot(slot, env).map(|used| match used {
                SlotUse::Emitted(request) => Some(request),
                SlotUse::Casting { .. } => None,
            }),
            PlayerInput::Guard { active, slot } => agent.execute_guard(active, slot, env).map(|_| None),
            PlayerInput::Dodge { direction, steps } => agent.dodge(direction, steps).map(|_| None),
        };
        match result {
            Ok(Some(request)) => {
                self.field.queue(request, env);
            }
            Ok(None) => {}
            Err(error) => log_recovered("player_command", &error),
        }
    }

    /// Replaces the player agent `current` with a fresh agent built from
    /// `template` (party member switch).
    ///
    /// The newcomer takes over the position, facing, and every engagement
    /// and aggro entry that pointed at the old agent. Returns the new handle,
    /// or `None` if `current` is not on the field.
    pub fn switch_player(&mut self, current: AgentId, template: &BattlerTemplate) -> Option<AgentId> {
        let old = self.field.agents.remove(current)?;
        self.field.pending.retain(|action| action.caster != current);

        let id = self.field.spawn(template, old.position, Controller::Player);
        if let Some(agent) = self.field.agents.get_mut(id) {
            agent.facing = old.facing;
        }

        for (_, agent) in self.field.agents.iter_mut() {
            agent.aggro.transfer(current, id);
            if let Engagement::Engaged { target, .. } = &mut agent.engagement
                && *target == current
            {
                *target = id;
            }
        }

        self.field.outbox.emit(CombatEvent::Removed { agent: current });
        tracing::debug!(from = %current, to = %id, "player switched");
        Some(id)
    }
}
