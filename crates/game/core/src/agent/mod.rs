//! Combat agent component.
//!
//! A [`CombatAgent`] is attached to every combat-capable entity on the field.
//! It composes the battler's [`BattlerStats`] with the real-time state the
//! action layer needs:
//!
//! - **Engagement**: idle, alerted or engaged with a target
//! - **Activity**: ready, casting, guarding or dodging
//! - **Life**: alive, or dying and waiting for removal
//!
//! Each of the three is an explicit enum; transitions go through the methods
//! in `engagement`, `decide` and `update`.

mod decide;
mod engagement;
mod error;
mod template;
mod update;
mod view;

pub use decide::SlotUse;
pub use error::AgentError;
pub use template::{AiProfile, BattlerTemplate, LootDrop, LootKind, SlotBinding, StatBlock};
pub use update::{RegenDeltas, UpdateOutcome};
pub use view::{AgentView, FieldSnapshot};

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::combat::{AggroTable, CooldownTable, GuardProfile, SlotKey};
use crate::config::CombatConfig;
use crate::state::{
    ActiveStatuses, AgentId, AnimationId, Direction, FrameTimer, Position, SkillId, TeamId,
};
use crate::stats::BattlerStats;

bitflags! {
    /// Per-agent behaviour switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
    pub struct AgentFlags: u8 {
        /// Objects (barrels, totems). Never targeted by AI and never alert anyone.
        const INANIMATE         = 1 << 0;
        /// Excluded from hostile target collection.
        const INVINCIBLE        = 1 << 1;
        /// Excluded from all target collection and from AI.
        const HIDDEN            = 1 << 2;
        /// `engage` is rejected.
        const ENGAGEMENT_LOCKED = 1 << 3;
        /// Dashing agents cannot parry.
        const DASHING           = 1 << 4;
        /// Immune to knockback.
        const NO_KNOCKBACK      = 1 << 5;
    }
}

/// Whether the battler is a party member or a hostile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    /// Party member. Defeat leaves the agent dying instead of granting rewards.
    Actor,
    #[default]
    Enemy,
}

/// Who drives the agent's decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    Player,
    #[default]
    Ai,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Engagement {
    #[default]
    Idle,
    /// Hit from outside sight. Sight is boosted until the timer runs out.
    Alerted { source: AgentId, timer: FrameTimer },
    /// Locked onto `target`. `boosted` pursuit applies when the engagement
    /// started from an alert.
    Engaged { target: AgentId, boosted: bool },
}

impl Engagement {
    pub fn target(&self) -> Option<AgentId> {
        match self {
            Engagement::Engaged { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self, Engagement::Engaged { .. })
    }

    pub fn is_alerted(&self) -> bool {
        matches!(self, Engagement::Alerted { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Activity {
    #[default]
    Ready,
    Casting {
        slot: SlotKey,
        skill: SkillId,
        timer: FrameTimer,
    },
    /// Guard stance. The parry window runs first, plain guarding after.
    Guarding {
        profile: GuardProfile,
        parry: FrameTimer,
    },
    Dodging {
        direction: Direction,
        steps: u32,
        /// Invincibility to restore when the dodge ends.
        was_invincible: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Life {
    #[default]
    Alive,
    /// Defeated. Removed once the timer has elapsed and no world event runs.
    Dying { removal: FrameTimer },
}

/// Decision-cadence phase. AI agents wait `action_interval` frames before
/// acting, or the shorter `combo_interval` while a combo is chained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionPhase {
    #[default]
    Prepare,
    Combo,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoseKind {
    #[default]
    Idle,
    Casting,
    Guarding,
    Dodging,
    Hurt,
    Dead,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub kind: PoseKind,
    /// Frames until a transient pose (hurt) reverts.
    pub timer: FrameTimer,
}

/// Action the AI picked and will use once its cadence allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecidedAction {
    pub slot: SlotKey,
    pub skill: SkillId,
}

/// Who struck the agent last, kept for kill credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastHit {
    pub by: AgentId,
    pub timer: FrameTimer,
}

/// Experience, gold and loot granted when a non-actor is defeated.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounty {
    pub exp: u32,
    pub gold: u32,
    pub loot: Vec<LootDrop>,
}

/// Real-time combat state of one battler.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatAgent {
    pub id: AgentId,
    pub name: String,
    pub kind: AgentKind,
    pub controller: Controller,
    pub team: TeamId,
    pub position: Position,
    pub facing: Direction,
    pub flags: AgentFlags,

    // === Composed stats ===
    pub stats: BattlerStats,
    pub statuses: ActiveStatuses,

    // === State machines ===
    pub engagement: Engagement,
    pub activity: Activity,
    pub life: Life,
    pub phase: ActionPhase,
    pub pose: Pose,

    // === AI ===
    pub ai: AiProfile,
    pub decided: Option<DecidedAction>,
    pub ally_target: Option<AgentId>,
    pub leader: Option<AgentId>,
    pub followers: ArrayVec<AgentId, { CombatConfig::MAX_FOLLOWERS }>,
    pub aggro: AggroTable,
    pub last_hit: Option<LastHit>,

    // === Skills ===
    pub cooldowns: CooldownTable,
    pub known_skills: Vec<SkillId>,
    pub counter_skill: Option<SkillId>,
    pub retaliation_skills: Vec<SkillId>,
    pub defeat_skills: Vec<SkillId>,
    pub defeat_animation: Option<AnimationId>,
    pub bounty: Bounty,

    // === Counters ===
    /// AI is paused while this runs.
    pub wait: FrameTimer,
    /// Host movement is suppressed while this runs.
    pub movement_lock: FrameTimer,
    prepare: u32,
    regen: FrameTimer,
}

impl CombatAgent {
    /// A bare agent with no skills, full resources and default AI ranges.
    pub fn new(id: AgentId, team: TeamId, position: Position, stats: BattlerStats) -> Self {
        Self {
            id,
            name: String::new(),
            kind: AgentKind::Enemy,
            controller: Controller::Ai,
            team,
            position,
            facing: Direction::Down,
            flags: AgentFlags::empty(),
            stats,
            statuses: ActiveStatuses::empty(),
            engagement: Engagement::Idle,
            activity: Activity::Ready,
            life: Life::Alive,
            phase: ActionPhase::Prepare,
            pose: Pose::default(),
            ai: AiProfile::default(),
            decided: None,
            ally_target: None,
            leader: None,
            followers: ArrayVec::new(),
            aggro: AggroTable::new(),
            last_hit: None,
            cooldowns: CooldownTable::new(),
            known_skills: Vec::new(),
            counter_skill: None,
            retaliation_skills: Vec::new(),
            defeat_skills: Vec::new(),
            defeat_animation: None,
            bounty: Bounty::default(),
            wait: FrameTimer::IDLE,
            movement_lock: FrameTimer::IDLE,
            prepare: 0,
            regen: FrameTimer::IDLE,
        }
    }

    pub fn is_player(&self) -> bool {
        self.controller == Controller::Player
    }

    pub fn is_actor(&self) -> bool {
        self.kind == AgentKind::Actor
    }

    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.life, Life::Dying { .. })
    }

    pub fn has(&self, flag: AgentFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn target(&self) -> Option<AgentId> {
        self.engagement.target()
    }

    pub fn is_engaged(&self) -> bool {
        self.engagement.is_engaged()
    }

    /// The AI skips paused agents.
    pub fn is_paused(&self) -> bool {
        self.wait.is_running()
    }

    pub fn can_move(&self) -> bool {
        self.is_alive()
            && self.movement_lock.is_expired()
            && !matches!(self.activity, Activity::Dodging { .. } | Activity::Casting { .. })
    }

    /// Whether `skill` is equipped in a slot or otherwise learned.
    pub fn knows(&self, skill: SkillId) -> bool {
        self.known_skills.contains(&skill) || self.cooldowns.iter().any(|c| c.skill() == Some(skill))
    }

    pub fn last_struck_by(&self) -> Option<AgentId> {
        self.last_hit.map(|hit| hit.by)
    }

    /// Records `by` as the last opponent to land a hit.
    pub fn mark_struck_by(&mut self, by: AgentId, frames: u32) {
        self.last_hit = Some(LastHit {
            by,
            timer: FrameTimer::new(frames),
        });
    }

    pub fn set_wait(&mut self, frames: u32) {
        self.wait.reset(frames);
    }

    pub fn lock_movement(&mut self, frames: u32) {
        if self.movement_lock.remaining() < frames {
            self.movement_lock.reset(frames);
        }
    }

    /// Plays the hurt pose unless a stance pose is showing.
    pub fn flinch(&mut self, frames: u32) {
        if matches!(self.pose.kind, PoseKind::Idle | PoseKind::Hurt) {
            self.pose = Pose {
                kind: PoseKind::Hurt,
                timer: FrameTimer::new(frames),
            };
        }
    }

    // ========================================================================
    // Guard queries
    // ========================================================================

    pub fn guard_profile(&self) -> Option<&GuardProfile> {
        match &self.activity {
            Activity::Guarding { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn is_guarding(&self) -> bool {
        self.guard_profile().is_some()
    }

    pub fn in_parry_window(&self) -> bool {
        matches!(&self.activity, Activity::Guarding { parry, .. } if parry.is_running())
    }

    /// Drops a cast in progress. Returns `true` if one was cancelled.
    pub fn cancel_cast(&mut self) -> bool {
        if matches!(self.activity, Activity::Casting { .. }) {
            self.activity = Activity::Ready;
            self.pose = Pose::default();
            return true;
        }
        false
    }

    /// Switches the agent into the dying state.
    pub fn begin_dying(&mut self, removal_frames: u32) {
        self.cancel_cast();
        if let Activity::Dodging { was_invincible, .. } = self.activity {
            self.flags.set(AgentFlags::INVINCIBLE, was_invincible);
        }
        self.activity = Activity::Ready;
        self.flags.remove(AgentFlags::DASHING);
        self.life = Life::Dying {
            removal: FrameTimer::new(removal_frames),
        };
        self.pose = Pose {
            kind: PoseKind::Dead,
            timer: FrameTimer::IDLE,
        };
        self.decided = None;
        self.cooldowns.clear_combos();
    }

    /// Clears this agent's own leader and follower links.
    pub fn clear_group(&mut self) {
        self.leader = None;
        self.followers.clear();
    }

    pub fn add_follower(&mut self, follower: AgentId) -> bool {
        if self.followers.contains(&follower) {
            return true;
        }
        self.followers.try_push(follower).is_ok()
    }
}
