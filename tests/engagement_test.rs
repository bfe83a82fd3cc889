//! State-machine scenarios driven by a scripted game and recording collaborators

use hunt_core::config::Config;
use hunt_core::engage::{
    AcquireMode, Actions, Collaborators, DelayRange, EngagementController, EngagementHandle,
    EngagementState, InteractMode, LootLauncher, LootMode, LootTable, LootTask, Movement,
    OwnerId, Pacer, RecognizedText, ScreenRegion, Stance, TargetProfile, TargetSelector,
    TickOutcome, WalkingOwnership, WILDCARD,
};
use hunt_core::game::{GameState, TargetInfo};
use hunt_core::{Step, Tile, Waypoint};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const ATTACK_KEY: u32 = 11;
const SKIN_KEY: u32 = 9;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Walk { to: Tile, holder: Option<OwnerId> },
    Press(u32),
    Interact(i32, i32, InteractMode),
    Launch(usize, LootMode),
    LootStopped(usize),
    LootJoined(usize),
}

type Log = Arc<Mutex<Vec<Event>>>;

struct World {
    ids: VecDeque<Option<u32>>,
    target: Option<TargetInfo>,
    me: Waypoint,
    frozen: bool,
    attached: bool,
}

impl World {
    fn new(ids: &[u32], target: Option<Waypoint>, name: &str) -> Self {
        World {
            ids: ids.iter().map(|id| Some(*id)).collect(),
            target: target.map(|position| TargetInfo {
                id: ids.first().copied().unwrap_or(0),
                position,
                name: name.to_string(),
                hp: Some(100),
            }),
            me: Waypoint::new(0, 0, 7),
            frozen: false,
            attached: true,
        }
    }
}

type Shared = Arc<Mutex<World>>;

struct ScriptedGame(Shared);

impl GameState for ScriptedGame {
    fn target_id(&mut self) -> Option<u32> {
        self.0.lock().unwrap().ids.pop_front().unwrap_or(Some(0))
    }

    fn target_info(&mut self) -> Option<TargetInfo> {
        self.0.lock().unwrap().target.clone()
    }

    fn my_position(&mut self) -> Option<Waypoint> {
        Some(self.0.lock().unwrap().me)
    }

    fn is_attached(&self) -> bool {
        self.0.lock().unwrap().attached
    }
}

struct RecordingMovement {
    world: Shared,
    log: Log,
    ownership: Arc<WalkingOwnership>,
}

impl Movement for RecordingMovement {
    fn walk(&mut self, _from: Waypoint, to: Waypoint) {
        self.log.lock().unwrap().push(Event::Walk {
            to: to.tile(),
            holder: self.ownership.holder(),
        });
        let mut world = self.world.lock().unwrap();
        if !world.frozen {
            world.me = to;
        }
    }
}

struct RecordingActions(Log);

impl Actions for RecordingActions {
    fn press_action(&mut self, key: u32) {
        self.0.lock().unwrap().push(Event::Press(key));
    }

    fn interact_at(&mut self, x: i32, y: i32, mode: InteractMode) {
        self.0.lock().unwrap().push(Event::Interact(x, y, mode));
    }
}

struct FixedSelector(Vec<RecognizedText>);

impl TargetSelector for FixedSelector {
    fn read_battle_list(&mut self, _region: &ScreenRegion) -> Vec<RecognizedText> {
        self.0.clone()
    }
}

struct RecordingLootTask {
    run: usize,
    log: Log,
}

impl LootTask for RecordingLootTask {
    fn stop(&self) {
        self.log.lock().unwrap().push(Event::LootStopped(self.run));
    }

    fn join(self: Box<Self>) {
        self.log.lock().unwrap().push(Event::LootJoined(self.run));
    }

    fn is_finished(&self) -> bool {
        false
    }
}

struct RecordingLooter {
    runs: usize,
    log: Log,
}

impl LootLauncher for RecordingLooter {
    fn launch(&mut self, _table: &LootTable, mode: LootMode) -> Box<dyn LootTask> {
        let run = self.runs;
        self.runs += 1;
        self.log.lock().unwrap().push(Event::Launch(run, mode));
        Box::new(RecordingLootTask {
            run,
            log: Arc::clone(&self.log),
        })
    }
}

/// Charges the lower bound of every band without sleeping
struct FixedPacer;

impl Pacer for FixedPacer {
    fn pause(&mut self, range: DelayRange) -> Duration {
        Duration::from_millis(range.min_ms)
    }
}

struct Harness {
    world: Shared,
    log: Log,
    ownership: Arc<WalkingOwnership>,
    controller: EngagementController<ScriptedGame>,
}

impl Harness {
    fn new(config: Config, world: World) -> Self {
        Self::with_battle_list(config, world, Vec::new())
    }

    fn with_battle_list(config: Config, world: World, words: Vec<RecognizedText>) -> Self {
        let mut harness = Self::live(config, world, words);
        harness.controller = harness.controller.with_pacer(FixedPacer);
        harness
    }

    /// Keeps the randomized pacer, for tests that run the real loop
    fn live(config: Config, world: World, words: Vec<RecognizedText>) -> Self {
        let world = Arc::new(Mutex::new(world));
        let log: Log = Arc::default();
        let ownership = Arc::new(WalkingOwnership::new());
        let collaborators = Collaborators {
            movement: Box::new(RecordingMovement {
                world: Arc::clone(&world),
                log: Arc::clone(&log),
                ownership: Arc::clone(&ownership),
            }),
            actions: Box::new(RecordingActions(Arc::clone(&log))),
            selector: Box::new(FixedSelector(words)),
            looter: Box::new(RecordingLooter {
                runs: 0,
                log: Arc::clone(&log),
            }),
        };
        let controller = EngagementController::new(
            ScriptedGame(Arc::clone(&world)),
            collaborators,
            Arc::clone(&ownership),
            &config,
        );

        Harness {
            world,
            log,
            ownership,
            controller,
        }
    }

    fn ticks(&mut self, n: usize) -> Vec<TickOutcome> {
        (0..n).map(|_| self.controller.tick()).collect()
    }

    fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    fn walks(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Walk { .. }))
            .collect()
    }
}

fn config(profiles: Vec<TargetProfile>) -> Config {
    let mut config = Config::default();
    config.targeting.profiles = profiles;
    config.targeting.attack_key = ATTACK_KEY;
    config.pacing.post_move = DelayRange::fixed(100);
    config.screen.center_x = 500;
    config.screen.center_y = 400;
    config.screen.square_size = 32;
    config
}

fn rat(distance: u32) -> Vec<TargetProfile> {
    vec![TargetProfile::new("Rat", distance, Stance::Chase)]
}

#[test]
fn test_target_read_sequence_drives_states() {
    let world = World::new(&[5, 5, 5, 0], Some(Waypoint::new(10, 0, 7)), "Rat");
    let mut harness = Harness::new(config(rat(1)), world);
    assert_eq!(harness.controller.state(), EngagementState::NoTarget);

    let outcomes = harness.ticks(4);
    let states: Vec<_> = outcomes.iter().map(|o| o.state).collect();
    let cleared: Vec<_> = outcomes.iter().map(|o| o.obstacles_cleared).collect();

    assert_eq!(
        states,
        vec![
            EngagementState::Pursuing,
            EngagementState::Pursuing,
            EngagementState::Pursuing,
            EngagementState::NoTarget,
        ]
    );
    assert_eq!(cleared, vec![false, false, false, true]);
    assert_eq!(harness.walks().len(), 3);
    assert_eq!(harness.ownership.holder(), None);
}

#[test]
fn test_stuck_detection_learns_attempted_tile() {
    let mut world = World::new(&[5; 6], Some(Waypoint::new(5, 0, 7)), "Rat");
    world.frozen = true;
    let mut harness = Harness::new(config(rat(1)), world);

    let first = harness.ticks(3);
    assert!(first.iter().all(|o| o.moved == Some(Step::new(1, 0))));
    assert!(harness.controller.learned_obstacles().is_empty());
    assert_eq!(harness.controller.stuck_elapsed(), Duration::from_millis(300));

    let fourth = harness.controller.tick();
    assert_eq!(fourth.moved, Some(Step::new(1, 0)));
    assert_eq!(harness.controller.learned_obstacles().len(), 1);
    assert!(harness.controller.learned_obstacles().contains(&Tile::new(1, 0)));
    assert_eq!(harness.controller.stuck_elapsed(), Duration::ZERO);

    let detour = harness.controller.tick().moved;
    assert!(
        detour == Some(Step::new(1, 1)) || detour == Some(Step::new(1, -1)),
        "unexpected detour {:?}",
        detour
    );
}

#[test]
fn test_ownership_released_in_range_and_reacquired() {
    let world = World::new(&[5; 8], Some(Waypoint::new(3, 0, 7)), "Rat");
    let mut harness = Harness::new(config(rat(1)), world);

    let outcomes = harness.ticks(2);
    assert!(outcomes.iter().all(|o| o.state == EngagementState::Pursuing));
    assert_eq!(harness.ownership.holder(), Some(OwnerId::ENGAGEMENT));

    let in_range = harness.controller.tick();
    assert_eq!(in_range.state, EngagementState::InRange);
    assert_eq!(harness.ownership.holder(), None);

    // A peer may walk while the controller holds position
    let waypoints = OwnerId::new("waypoints");
    assert!(harness.ownership.try_acquire(waypoints));
    assert!(harness.ownership.release(waypoints));

    harness.world.lock().unwrap().target.as_mut().unwrap().position = Waypoint::new(6, 0, 7);
    let chase = harness.controller.tick();
    assert_eq!(chase.state, EngagementState::Pursuing);
    assert_eq!(chase.moved, Some(Step::new(1, 0)));

    let walks = harness.walks();
    assert_eq!(walks.len(), 3);
    for walk in walks {
        assert!(matches!(
            walk,
            Event::Walk {
                holder: Some(OwnerId::ENGAGEMENT),
                ..
            }
        ));
    }

    let presses = harness
        .events()
        .into_iter()
        .filter(|e| *e == Event::Press(ATTACK_KEY))
        .count();
    assert_eq!(presses, 1);
}

#[test]
fn test_peer_holding_token_blocks_movement() {
    let world = World::new(&[5, 5], Some(Waypoint::new(4, 4, 7)), "Rat");
    let mut harness = Harness::new(config(rat(1)), world);
    let waypoints = OwnerId::new("waypoints");
    assert!(harness.ownership.try_acquire(waypoints));

    let outcomes = harness.ticks(2);
    assert!(outcomes.iter().all(|o| o.moved.is_none()));
    assert!(outcomes.iter().all(|o| o.state == EngagementState::Pursuing));
    assert!(harness.walks().is_empty());
    assert_eq!(harness.ownership.holder(), Some(waypoints));
}

#[test]
fn test_loot_then_skin_and_replace_loot_task() {
    let mut config = config(vec![TargetProfile::new("Rat", 1, Stance::Chase).with_skin(SKIN_KEY)]);
    config.targeting.loot_table = LootTable::new(["gold coin"]);
    config.targeting.loot_mode = LootMode::OpenOnly;
    let world = World::new(&[5, 0, 6, 0], Some(Waypoint::new(1, 1, 7)), "Rat");
    let mut harness = Harness::new(config, world);

    let states: Vec<_> = harness.ticks(8).iter().map(|o| o.state).collect();
    assert_eq!(
        states,
        vec![
            EngagementState::InRange,
            EngagementState::Looting,
            EngagementState::Skinning,
            EngagementState::NoTarget,
            EngagementState::InRange,
            EngagementState::Looting,
            EngagementState::Skinning,
            EngagementState::NoTarget,
        ]
    );

    let corpse = (500 + 32, 400 + 32);
    assert_eq!(
        harness.events(),
        vec![
            Event::Press(ATTACK_KEY),
            Event::Interact(corpse.0, corpse.1, InteractMode::Use),
            Event::Launch(0, LootMode::OpenOnly),
            Event::Press(SKIN_KEY),
            Event::Interact(corpse.0, corpse.1, InteractMode::Click),
            Event::Press(ATTACK_KEY),
            Event::LootStopped(0),
            Event::LootJoined(0),
            Event::Interact(corpse.0, corpse.1, InteractMode::Use),
            Event::Launch(1, LootMode::OpenOnly),
            Event::Press(SKIN_KEY),
            Event::Interact(corpse.0, corpse.1, InteractMode::Click),
        ]
    );
}

#[test]
fn test_skinning_without_loot_table() {
    let config = config(vec![TargetProfile::new("Rat", 0, Stance::Chase).with_skin(SKIN_KEY)]);
    let world = World::new(&[5, 0], Some(Waypoint::new(-1, 0, 7)), "Rat");
    let mut harness = Harness::new(config, world);

    let states: Vec<_> = harness.ticks(3).iter().map(|o| o.state).collect();
    assert_eq!(
        states,
        vec![
            EngagementState::InRange,
            EngagementState::Skinning,
            EngagementState::NoTarget,
        ]
    );
    assert!(!harness
        .events()
        .iter()
        .any(|e| matches!(e, Event::Launch(..) | Event::Interact(_, _, InteractMode::Use))));
}

#[test]
fn test_kill_without_reaching_range_is_not_looted() {
    let mut config = config(rat(1));
    config.targeting.loot_table = LootTable::new(["gold coin"]);
    let world = World::new(&[5, 0], Some(Waypoint::new(8, 0, 7)), "Rat");
    let mut harness = Harness::new(config, world);

    let states: Vec<_> = harness.ticks(2).iter().map(|o| o.state).collect();
    assert_eq!(states, vec![EngagementState::Pursuing, EngagementState::NoTarget]);
}

#[test]
fn test_profile_mismatch_reacquires() {
    let world = World::new(&[5], Some(Waypoint::new(2, 0, 7)), "Dragon");
    let mut harness = Harness::new(config(rat(1)), world);

    let outcome = harness.controller.tick();
    assert_eq!(outcome.state, EngagementState::NoTarget);
    assert!(outcome.obstacles_cleared);
    assert_eq!(harness.events(), vec![Event::Press(ATTACK_KEY)]);
    assert_eq!(harness.ownership.holder(), None);
}

#[test]
fn test_exact_profile_beats_wildcard() {
    let profiles = vec![
        TargetProfile::new(WILDCARD, 0, Stance::Hold),
        TargetProfile::new("Rat", 1, Stance::Chase),
    ];

    let world = World::new(&[5], Some(Waypoint::new(6, 0, 7)), "Rat");
    let mut harness = Harness::new(config(profiles.clone()), world);
    let outcome = harness.controller.tick();
    assert_eq!(outcome.state, EngagementState::Pursuing);
    assert_eq!(outcome.moved, Some(Step::new(1, 0)));

    let world = World::new(&[5], Some(Waypoint::new(6, 0, 7)), "Orc");
    let mut harness = Harness::new(config(profiles), world);
    let outcome = harness.controller.tick();
    assert_eq!(outcome.state, EngagementState::InRange);
    assert!(harness.walks().is_empty());
}

#[test]
fn test_hold_stance_waits_out_of_range() {
    let profiles = vec![TargetProfile::new("Rat", 2, Stance::Hold)];
    let world = World::new(&[5, 5], Some(Waypoint::new(6, 0, 7)), "Rat");
    let mut harness = Harness::new(config(profiles), world);

    let outcomes = harness.ticks(2);
    assert!(outcomes.iter().all(|o| o.state == EngagementState::Pursuing));
    assert!(harness.walks().is_empty());
    assert_eq!(harness.ownership.holder(), None);
}

#[test]
fn test_target_on_other_floor_is_not_chased() {
    let world = World::new(&[5, 5], Some(Waypoint::new(3, 0, 6)), "Rat");
    let mut harness = Harness::new(config(rat(1)), world);

    let outcomes = harness.ticks(2);
    assert!(outcomes.iter().all(|o| o.moved.is_none()));
    assert_eq!(harness.ownership.holder(), None);
}

#[test]
fn test_battle_list_acquisition_clicks_match() {
    let mut config = config(rat(1));
    config.targeting.acquire = AcquireMode::BattleList;
    config.screen.title_bar_offset = 20;
    config.screen.battle_list = ScreenRegion {
        x: 1200,
        y: 300,
        width: 160,
        height: 400,
    };
    let words = vec![
        RecognizedText {
            text: "Wolf".to_string(),
            left: 10,
            top: 5,
            width: 30,
            height: 10,
        },
        RecognizedText {
            text: "rat".to_string(),
            left: 10,
            top: 25,
            width: 20,
            height: 10,
        },
    ];
    let world = World::new(&[0, 0], None, "");
    let mut harness = Harness::with_battle_list(config, world, words);

    let outcome = harness.controller.tick();
    assert_eq!(outcome.state, EngagementState::NoTarget);
    assert_eq!(
        harness.events(),
        vec![Event::Interact(1200 + 10 + 10, 300 + 25 + 5 - 20, InteractMode::Click)]
    );
}

#[test]
fn test_handle_stops_loop() {
    let world = World::new(&[], None, "");
    let harness = Harness::live(config(rat(1)), world, Vec::new());
    let handle = EngagementHandle::spawn(harness.controller).unwrap();

    handle.update_loot_mode(LootMode::OpenOnly);
    thread::sleep(Duration::from_millis(20));
    assert!(!handle.is_finished());
    handle.stop();
    assert_eq!(harness.ownership.holder(), None);
}

#[test]
fn test_loop_exits_when_process_gone() {
    let mut world = World::new(&[], None, "");
    world.attached = false;
    let harness = Harness::live(config(rat(1)), world, Vec::new());
    let handle = EngagementHandle::spawn(harness.controller).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(handle.is_finished());
}

#[test]
fn test_stop_interrupts_long_poll_pause() {
    let mut config = config(rat(1));
    config.pacing.poll = DelayRange::fixed(10_000);
    let world = World::new(&[], None, "");
    let harness = Harness::live(config, world, Vec::new());
    let handle = EngagementHandle::spawn(harness.controller).unwrap();

    thread::sleep(Duration::from_millis(30));
    let start = Instant::now();
    handle.stop();
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_profile_update_applies_to_running_loop() {
    let world = World::new(&[5; 400], Some(Waypoint::new(4, 0, 7)), "Orc");
    let harness = Harness::live(config(rat(1)), world, Vec::new());
    let log = Arc::clone(&harness.log);
    let walked = move || {
        log.lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, Event::Walk { .. }))
    };
    let handle = EngagementHandle::spawn(harness.controller).unwrap();

    thread::sleep(Duration::from_millis(300));
    assert!(!walked());

    handle.update_profiles(vec![TargetProfile::new("Orc", 1, Stance::Chase)]);
    let deadline = Instant::now() + Duration::from_secs(5);
    while !walked() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(walked());
    handle.stop();
}
