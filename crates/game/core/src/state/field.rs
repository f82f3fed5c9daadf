//! The combat field: every agent plus in-flight actions and outputs.

use std::collections::BTreeMap;

use crate::action::{Action, ActionRequest};
use crate::agent::{BattlerTemplate, CombatAgent, Controller};
use crate::env::{Env, RollContext, compute_seed};
use crate::error::log_recovered;
use crate::formula::SharedVars;
use crate::outbox::Outbox;
use crate::state::{ActionId, AgentId, Arena, Position, TeamId};

/// Arena of combat agents.
pub type AgentArena = Arena<CombatAgent>;

/// Experience and gold granted to one team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reward {
    pub exp: u64,
    pub gold: u64,
}

/// Accumulated rewards per team, drained by the host's progression system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardLedger {
    totals: BTreeMap<TeamId, Reward>,
}

impl RewardLedger {
    pub fn grant(&mut self, team: TeamId, exp: u32, gold: u32) {
        let entry = self.totals.entry(team).or_default();
        entry.exp += exp as u64;
        entry.gold += gold as u64;
    }

    pub fn get(&self, team: TeamId) -> Reward {
        self.totals.get(&team).copied().unwrap_or_default()
    }

    pub fn drain(&mut self) -> BTreeMap<TeamId, Reward> {
        std::mem::take(&mut self.totals)
    }
}

/// Mutable simulation state owned by the engine.
#[derive(Clone, Debug, Default)]
pub struct CombatField {
    pub agents: AgentArena,
    /// Actions waiting for their delay, in emission order.
    pub pending: Vec<Action>,
    pub outbox: Outbox,
    pub rewards: RewardLedger,
    pub vars: SharedVars,

    /// RNG seed for deterministic rolls. Set once when the field is created.
    pub seed: u64,
    /// Roll sequence number, incremented by every roll.
    nonce: u64,
    next_action_id: u64,
}

impl CombatField {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Puts a battler on the field and returns its handle.
    pub fn spawn(&mut self, template: &BattlerTemplate, position: Position, controller: Controller) -> AgentId {
        let id = self
            .agents
            .insert_with(|id| template.spawn(id, position, controller));
        tracing::debug!(agent = %id, battler = %template.name, "spawned");
        id
    }

    pub fn agent(&self, id: AgentId) -> Option<&CombatAgent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut CombatAgent> {
        self.agents.get_mut(id)
    }

    /// Turns a request into a queued action with a fresh id.
    ///
    /// Unknown skills are logged and dropped.
    pub fn queue(&mut self, request: ActionRequest, env: &Env<'_>) -> Option<ActionId> {
        let skill = match env.skill(request.skill) {
            Ok(skill) => skill,
            Err(error) => {
                log_recovered("queue_action", &error);
                return None;
            }
        };
        self.next_action_id += 1;
        let id = ActionId(self.next_action_id);
        tracing::trace!(action = %id, caster = %request.caster, skill = %request.skill, "queued");
        self.pending.push(Action::new(id, request, skill));
        Some(id)
    }

    /// Uniform roll in `[0, 1)` for `agent`.
    pub fn roll(&mut self, env: &Env<'_>, agent: AgentId, context: RollContext) -> f64 {
        self.nonce += 1;
        let seed = compute_seed(self.seed, self.nonce, agent.index(), context);
        env.rng().random(seed)
    }
}
