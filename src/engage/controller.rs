//! The engagement state machine

use super::collaborators::{pick_click_point, AcquireMode, Collaborators, InteractMode, LootTask};
use super::ownership::{OwnerId, WalkingOwnership};
use super::pacing::{JitterPacer, Pacer};
use super::profile::{LiveSettings, SharedSettings, Stance, TargetProfile};
use super::shutdown::ShutdownSignal;
use super::EngagementState;
use crate::config::{Config, PacingConfig, ScreenConfig, TargetingConfig};
use crate::core::types::{HuntError, Step, Tile, Waypoint};
use crate::game::GameState;
use crate::pathing::{ObstacleSet, PathPlanner};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What one call to [`EngagementController::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// State after the tick
    pub state: EngagementState,
    /// Whether the learned-obstacle set was cleared
    pub obstacles_cleared: bool,
    /// Step handed to the movement collaborator, if any
    pub moved: Option<Step>,
}

/// Bookkeeping for the target currently engaged
#[derive(Debug, Clone)]
struct Engagement {
    id: u32,
    profile: Option<TargetProfile>,
    floor: Option<i32>,
    last_target: Option<Waypoint>,
    last_me: Option<Waypoint>,
    reached_range: bool,
    attacked: bool,
}

impl Engagement {
    fn new(id: u32) -> Self {
        Engagement {
            id,
            profile: None,
            floor: None,
            last_target: None,
            last_me: None,
            reached_range: false,
            attacked: false,
        }
    }
}

/// A kill waiting to be looted or skinned
#[derive(Debug, Clone, Copy)]
struct Corpse {
    screen: (i32, i32),
    skin_hotkey: Option<u32>,
}

/// Polls game state and drives movement, attacks and looting.
///
/// Walking ownership is held only while a step toward the target is being
/// issued; every other path through [`tick`](Self::tick) releases it.
pub struct EngagementController<G: GameState> {
    game: G,
    collaborators: Collaborators,
    planner: PathPlanner,
    obstacles: ObstacleSet,
    ownership: Arc<WalkingOwnership>,
    settings: SharedSettings,
    targeting: TargetingConfig,
    screen: ScreenConfig,
    pacing: PacingConfig,
    pacer: Box<dyn Pacer>,
    shutdown: Arc<ShutdownSignal>,
    state: EngagementState,
    engagement: Option<Engagement>,
    corpse: Option<Corpse>,
    loot_task: Option<Box<dyn LootTask>>,
    stuck: Duration,
    last_attempted: Option<Tile>,
}

impl<G: GameState> EngagementController<G> {
    pub fn new(
        game: G,
        collaborators: Collaborators,
        ownership: Arc<WalkingOwnership>,
        config: &Config,
    ) -> Self {
        let shutdown = Arc::new(ShutdownSignal::new());
        let settings = SharedSettings::new(LiveSettings {
            loot_mode: config.targeting.loot_mode,
            profiles: config.targeting.profiles.clone(),
        });

        EngagementController {
            game,
            collaborators,
            planner: PathPlanner::new(config.pacing.search_radius)
                .with_node_budget(config.pacing.node_budget),
            obstacles: ObstacleSet::new(config.targeting.blacklist.iter().copied()),
            ownership,
            settings,
            targeting: config.targeting.clone(),
            screen: config.screen.clone(),
            pacing: config.pacing.clone(),
            pacer: Box::new(JitterPacer::new(Arc::clone(&shutdown))),
            shutdown,
            state: EngagementState::NoTarget,
            engagement: None,
            corpse: None,
            loot_task: None,
            stuck: Duration::ZERO,
            last_attempted: None,
        }
    }

    /// Replaces the randomized pacer
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn state(&self) -> EngagementState {
        self.state
    }

    pub fn learned_obstacles(&self) -> &HashSet<Tile> {
        self.obstacles.learned()
    }

    /// Time accumulated without moving since the last step that succeeded
    pub fn stuck_elapsed(&self) -> Duration {
        self.stuck
    }

    /// Handle to the live-updatable settings
    pub fn settings(&self) -> SharedSettings {
        self.settings.clone()
    }

    pub fn shutdown_signal(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.shutdown)
    }

    /// Runs until the shutdown signal fires or the process goes away
    pub fn run(&mut self) {
        info!("engagement loop started");
        loop {
            self.pacer.pause(self.pacing.poll);
            if self.shutdown.is_shutdown() {
                break;
            }
            if !self.game.is_attached() {
                error!("attached process is gone, stopping engagement");
                break;
            }
            self.tick();
        }
        self.release_walking();
        self.stop_loot_task();
        info!("engagement loop stopped");
    }

    /// One iteration of the state machine, without the poll pause
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome {
            state: self.state,
            obstacles_cleared: false,
            moved: None,
        };

        match self.state {
            EngagementState::NoTarget => self.tick_idle(&mut outcome),
            EngagementState::Pursuing | EngagementState::InRange => {
                self.tick_engaged(&mut outcome)
            }
            EngagementState::Looting => self.tick_looting(),
            EngagementState::Skinning => self.tick_skinning(),
        }

        outcome.state = self.state;
        outcome
    }

    fn tick_idle(&mut self, outcome: &mut TickOutcome) {
        match self.game.target_id() {
            None => {}
            Some(0) => {
                self.release_walking();
                self.acquire_target();
                self.pacer.pause(self.pacing.acquire);
                if let Some(id) = self.game.target_id().filter(|id| *id > 0) {
                    self.begin(id);
                    self.evaluate(outcome);
                }
            }
            Some(id) => {
                self.begin(id);
                self.evaluate(outcome);
            }
        }
    }

    fn tick_engaged(&mut self, outcome: &mut TickOutcome) {
        let Some(id) = self.game.target_id() else {
            return;
        };
        if id == 0 {
            self.end_engagement(outcome);
            return;
        }
        if self.engagement.as_ref().map(|e| e.id) != Some(id) {
            info!(id, "target switched");
            self.clear_learned(outcome);
            self.begin(id);
        }
        self.evaluate(outcome);
    }

    fn begin(&mut self, id: u32) {
        info!(id, "target acquired");
        self.engagement = Some(Engagement::new(id));
        self.state = EngagementState::Pursuing;
        self.stuck = Duration::ZERO;
        self.last_attempted = None;
    }

    fn evaluate(&mut self, outcome: &mut TickOutcome) {
        let Some(info) = self.game.target_info() else {
            debug!("target entity unavailable");
            self.enter_idle(outcome);
            return;
        };

        let Some(profile) = self.settings.profile_for(&info.name) else {
            info!(name = %info.name, "no profile for target, reacquiring");
            self.release_walking();
            self.acquire_target();
            self.enter_idle(outcome);
            return;
        };

        let Some(engagement) = self.engagement.as_mut() else {
            return;
        };
        engagement.profile = Some(profile.clone());
        let floor = *engagement.floor.get_or_insert(info.position.z);
        if info.position.z == floor {
            engagement.last_target = Some(info.position);
        }
        let Some(target) = engagement.last_target else {
            return;
        };

        let Some(me) = self.game.my_position() else {
            return;
        };
        engagement.last_me = Some(me);

        if !me.same_floor(&target) {
            self.release_walking();
            return;
        }

        if in_range(&profile, me.tile(), target.tile()) {
            self.hold_in_range();
        } else {
            self.state = EngagementState::Pursuing;
            match profile.stance {
                Stance::Hold => self.release_walking(),
                Stance::Chase => self.pursue(me, target, outcome),
            }
        }
    }

    fn hold_in_range(&mut self) {
        self.release_walking();
        if self.state != EngagementState::InRange {
            debug!("target in range");
        }
        self.state = EngagementState::InRange;
        self.stuck = Duration::ZERO;

        let first_attack = match self.engagement.as_mut() {
            Some(engagement) => {
                engagement.reached_range = true;
                !std::mem::replace(&mut engagement.attacked, true)
            }
            None => false,
        };
        if first_attack {
            self.collaborators.actions.press_action(self.targeting.attack_key);
        }
    }

    fn pursue(&mut self, me: Waypoint, target: Waypoint, outcome: &mut TickOutcome) {
        if !self.ownership.try_acquire(OwnerId::ENGAGEMENT) {
            let conflict = self.ownership.ensure_held(OwnerId::ENGAGEMENT);
            if let Err(e) = conflict {
                warn!(error = %e, "cannot move toward target");
            }
            return;
        }

        let obstacles = self.obstacles.for_level(me.z);
        let Some(step) = self.planner.find_step(me.tile(), target.tile(), &obstacles) else {
            let e = HuntError::path_not_found(me, target);
            debug!(error = %e, "holding position");
            return;
        };

        let destination = me.tile().offset(step);
        self.last_attempted = Some(destination);
        self.collaborators.movement.walk(me, destination.on_floor(me.z));
        outcome.moved = Some(step);

        let waited = self.pacer.pause(self.pacing.post_move);
        match self.game.my_position() {
            Some(after) if after == me => {
                self.stuck += waited;
                if self.stuck >= Duration::from_millis(self.pacing.stuck_threshold_ms) {
                    if let Some(tile) = self.last_attempted.take() {
                        self.obstacles.learn(tile);
                        warn!(%tile, "stuck, marking tile as obstacle");
                    }
                    self.stuck = Duration::ZERO;
                }
            }
            Some(_) => self.stuck = Duration::ZERO,
            None => {}
        }
    }

    fn end_engagement(&mut self, outcome: &mut TickOutcome) {
        let engagement = self.engagement.take();
        self.enter_idle(outcome);

        let Some(engagement) = engagement else {
            return;
        };
        info!(id = engagement.id, "target lost");

        let (Some(target), Some(me)) = (engagement.last_target, engagement.last_me) else {
            return;
        };
        if !engagement.reached_range {
            return;
        }

        let skin_hotkey = engagement.profile.as_ref().and_then(|p| p.skin_hotkey);
        let corpse = Corpse {
            screen: self.corpse_screen(target, me),
            skin_hotkey,
        };
        if !self.targeting.loot_table.is_empty() {
            self.corpse = Some(corpse);
            self.state = EngagementState::Looting;
        } else if skin_hotkey.is_some() {
            self.corpse = Some(corpse);
            self.state = EngagementState::Skinning;
        }
    }

    fn tick_looting(&mut self) {
        let Some(corpse) = self.corpse else {
            self.state = EngagementState::NoTarget;
            return;
        };

        self.pacer.pause(self.pacing.loot_settle);
        self.stop_loot_task();

        let (x, y) = corpse.screen;
        self.collaborators.actions.interact_at(x, y, InteractMode::Use);
        self.pacer.pause(self.pacing.loot_open);

        let mode = self.settings.loot_mode();
        let task = self.collaborators.looter.launch(&self.targeting.loot_table, mode);
        self.loot_task = Some(task);
        info!(x, y, ?mode, "looting corpse");

        if corpse.skin_hotkey.is_some() {
            self.state = EngagementState::Skinning;
        } else {
            self.corpse = None;
            self.state = EngagementState::NoTarget;
        }
    }

    fn tick_skinning(&mut self) {
        if let Some(Corpse {
            screen: (x, y),
            skin_hotkey: Some(key),
        }) = self.corpse.take()
        {
            self.collaborators.actions.press_action(key);
            self.pacer.pause(self.pacing.skin_press);
            self.collaborators.actions.interact_at(x, y, InteractMode::Click);
            self.pacer.pause(self.pacing.skin_interact);
            info!(x, y, "skinned corpse");
        }
        self.state = EngagementState::NoTarget;
    }

    /// NoTarget entry: drop ownership and everything learned
    fn enter_idle(&mut self, outcome: &mut TickOutcome) {
        self.release_walking();
        self.clear_learned(outcome);
        self.engagement = None;
        self.stuck = Duration::ZERO;
        self.last_attempted = None;
        self.state = EngagementState::NoTarget;
    }

    fn clear_learned(&mut self, outcome: &mut TickOutcome) {
        let dropped = self.obstacles.clear_learned();
        if dropped > 0 {
            debug!(dropped, "cleared learned obstacles");
        }
        outcome.obstacles_cleared = true;
    }

    fn acquire_target(&mut self) {
        match self.targeting.acquire {
            AcquireMode::Hotkey => {
                self.collaborators.actions.press_action(self.targeting.attack_key)
            }
            AcquireMode::BattleList => {
                let region = self.screen.battle_list;
                let texts = self.collaborators.selector.read_battle_list(&region);
                let profiles = self.settings.profiles();
                match pick_click_point(&texts, &profiles, &region, self.screen.title_bar_offset) {
                    Some((x, y)) => {
                        self.collaborators.actions.interact_at(x, y, InteractMode::Click)
                    }
                    None => debug!(words = texts.len(), "no battle-list entry matches"),
                }
            }
        }
    }

    fn corpse_screen(&self, target: Waypoint, me: Waypoint) -> (i32, i32) {
        let size = self.screen.square_size;
        (
            self.screen.center_x + (target.x - me.x) * size,
            self.screen.center_y + (target.y - me.y) * size,
        )
    }

    fn release_walking(&self) {
        if self.ownership.release(OwnerId::ENGAGEMENT) {
            debug!("released walking ownership");
        }
    }

    fn stop_loot_task(&mut self) {
        if let Some(task) = self.loot_task.take() {
            task.stop();
            task.join();
        }
    }
}

/// Distance gate: 0 with hold stance never gates, 0 with chase means adjacent
fn in_range(profile: &TargetProfile, me: Tile, target: Tile) -> bool {
    let dx = me.x.abs_diff(target.x);
    let dy = me.y.abs_diff(target.y);
    match (profile.engage_distance, profile.stance) {
        (0, Stance::Hold) => true,
        (0, Stance::Chase) => dx <= 1 && dy <= 1,
        (d, _) => dx <= d && dy <= d,
    }
}
