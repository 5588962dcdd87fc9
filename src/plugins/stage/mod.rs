//! Stage loop: runs the waves of a game session.
//!
//! ```text
//!   OnEnter(InGame) ─► SettingUp ─(1 s)─► ShowingWaveInfo ─(3 s)─► PlayingGame
//!                                            ▲                       │
//!                                            └── next wave ◄─────────┤ all sets finished,
//!                                                                    │ enough kills
//!                                     Won ◄── last wave ◄────────────┤
//!                                     Lost ◄── too few kills / player dead
//!   OnExit(InGame) ─► Paused (spawners stopped, player disabled)
//! ```
//!
//! Like the spawner, the loop's state callbacks only edit [`StageRun`] and queue
//! [`StageRequest`]s. `apply_stage_requests` turns those into spawner calls, player changes and
//! [`StageEvent`] messages.

use bevy::ecs::message::{Message, MessageReader};
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::common::waves::{EnemySet, WaveData, WaveTable};
use crate::plugins::GameplaySet;
use crate::plugins::enemies::EnemyFinished;
use crate::plugins::player::{PLAYER_SPAWN, Player, PlayerInput, PlayerLife};
use crate::plugins::projectiles::commit::recall_bullets_owned_by;
use crate::plugins::spawner::{EnemySpawner, SpawnerFinished, SpawnerRoster};
use crate::utilities::state_machine::{State, StateMachine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageState {
    SettingUp,
    /// Leaving the game: spawners stopped, player switched off.
    Paused,
    ShowingWaveInfo,
    PlayingGame,
    Won,
    Lost,
}

/// Cues for audio/UI collaborators.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// One-based wave number.
    WaveStarted { wave: u32 },
    Won,
    Lost { player_died: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageRequest {
    StartSet(EnemySet),
    /// `WaveTable::spawners` index.
    StopSpawner(usize),
    ResetPlayer,
    DisablePlayer,
    Event(StageEvent),
}

#[derive(Debug, Clone, Default)]
pub struct StageRun {
    pub waves: Vec<WaveData>,
    pub wave_index: Option<usize>,
    pub kills: u32,
    pub remaining: u32,
    pub score: u32,
    pub sets_started: usize,
    pub sets_completed: usize,
    pub player_dead: bool,
    pub banner: String,
    pub subtitle: String,
    pub setup_secs: f32,
    pub banner_secs: f32,
    requests: Vec<StageRequest>,
}

impl StageRun {
    pub fn current_wave(&self) -> Option<&WaveData> {
        self.wave_index.and_then(|i| self.waves.get(i))
    }

    fn stop_started_sets(&mut self) {
        let Some(wave) = self.current_wave() else {
            return;
        };
        let stops: Vec<StageRequest> = wave.sets[..self.sets_started.min(wave.sets.len())]
            .iter()
            .rev()
            .map(|set| StageRequest::StopSpawner(set.spawner))
            .collect();
        self.requests.extend(stops);
    }
}

type Machine = StateMachine<StageState, StageRun>;

#[derive(Resource, Debug, Default)]
pub struct StageLoop {
    machine: Machine,
    run: StageRun,
}

/// Read-only summary for a HUD.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct StageBoard {
    pub score: u32,
    pub kills: u32,
    pub required_kills: u32,
    pub remaining: u32,
    /// One-based, 0 before the first wave.
    pub wave: u32,
    pub banner: String,
    pub subtitle: String,
}

impl StageLoop {
    pub fn new(waves: Vec<WaveData>, tunables: &Tunables) -> Self {
        let run = StageRun {
            waves,
            setup_secs: tunables.stage_setup_secs,
            banner_secs: tunables.wave_banner_secs,
            ..default()
        };
        Self { machine: Machine::new(stage_states()), run }
    }

    /// Begin a session from the first wave.
    pub fn start(&mut self) {
        self.run.kills = 0;
        self.run.score = 0;
        self.run.wave_index = None;
        self.run.player_dead = false;
        self.machine.transition(&mut self.run, StageState::SettingUp, false);
    }

    pub fn pause(&mut self) {
        self.machine.transition(&mut self.run, StageState::Paused, false);
    }

    pub fn tick(&mut self, dt: f32) {
        self.machine.tick(&mut self.run, dt);
    }

    /// Not started yet counts as paused.
    pub fn state(&self) -> StageState {
        self.machine.current_state().unwrap_or(StageState::Paused)
    }

    pub fn run(&self) -> &StageRun {
        &self.run
    }

    pub fn set_player_dead(&mut self, dead: bool) {
        self.run.player_dead = dead;
    }

    pub fn on_enemy_finished(&mut self, killed_by_player: bool, score: u32) {
        if killed_by_player {
            self.run.kills += 1;
            self.run.score += score;
        }
        self.run.remaining = self.run.remaining.saturating_sub(1);
    }

    /// One enemy set of the current wave has run to completion.
    pub fn on_set_completed(&mut self) {
        if !self.machine.is_in(StageState::PlayingGame) {
            return;
        }
        self.run.sets_completed += 1;
        let total = self.run.current_wave().map_or(0, |w| w.sets.len());
        if self.run.sets_completed >= total {
            finish_wave(&mut self.machine, &mut self.run);
        }
    }

    pub fn take_requests(&mut self) -> Vec<StageRequest> {
        std::mem::take(&mut self.run.requests)
    }

    pub fn board(&self) -> StageBoard {
        StageBoard {
            score: self.run.score,
            kills: self.run.kills,
            required_kills: self.run.current_wave().map_or(0, |w| w.required_kills),
            remaining: self.run.remaining,
            wave: self.run.wave_index.map_or(0, |i| i as u32 + 1),
            banner: self.run.banner.clone(),
            subtitle: self.run.subtitle.clone(),
        }
    }
}

// -----------------------------------------------------------------------------
// States
// -----------------------------------------------------------------------------

fn stage_states() -> [(StageState, State<StageState, StageRun>); 6] {
    [
        (
            StageState::SettingUp,
            State::empty().on_enter(setting_up_enter).on_update(setting_up_update),
        ),
        (StageState::Paused, State::empty().on_enter(paused_enter)),
        (
            StageState::ShowingWaveInfo,
            State::empty()
                .on_enter(wave_info_enter)
                .on_update(wave_info_update)
                .on_exit(clear_banner),
        ),
        (
            StageState::PlayingGame,
            State::empty().on_enter(playing_enter).on_update(playing_update),
        ),
        (StageState::Won, State::empty().on_enter(won_enter)),
        (StageState::Lost, State::empty().on_enter(lost_enter)),
    ]
}

fn clear_banner(_: &mut Machine, run: &mut StageRun) {
    run.banner.clear();
    run.subtitle.clear();
}

fn setting_up_enter(_: &mut Machine, run: &mut StageRun) {
    run.remaining = 0;
    run.sets_started = 0;
    run.requests.push(StageRequest::ResetPlayer);
}

fn setting_up_update(m: &mut Machine, run: &mut StageRun) {
    if m.time_in_current_state() > run.setup_secs {
        m.transition(run, StageState::ShowingWaveInfo, false);
    }
}

fn paused_enter(m: &mut Machine, run: &mut StageRun) {
    run.stop_started_sets();
    run.requests.push(StageRequest::DisablePlayer);
    clear_banner(m, run);
}

fn wave_info_enter(m: &mut Machine, run: &mut StageRun) {
    let next = run.wave_index.map_or(0, |i| i + 1);
    let Some(wave) = run.waves.get(next) else {
        // Nothing (left) to play.
        m.transition(run, StageState::Won, false);
        return;
    };

    run.remaining = wave.total_enemies();
    run.wave_index = Some(next);
    run.kills = 0;
    run.banner = format!("Wave {:02}", next + 1);
    run.requests.push(StageRequest::Event(StageEvent::WaveStarted { wave: next as u32 + 1 }));
    info!("Wave {} starting", next + 1);
}

fn wave_info_update(m: &mut Machine, run: &mut StageRun) {
    if m.time_in_current_state() > run.banner_secs {
        m.transition(run, StageState::PlayingGame, false);
    }
}

fn playing_enter(m: &mut Machine, run: &mut StageRun) {
    run.sets_started = 0;
    run.sets_completed = 0;
    if run.current_wave().is_some_and(|w| w.sets.is_empty()) {
        finish_wave(m, run);
    }
}

fn playing_update(m: &mut Machine, run: &mut StageRun) {
    if run.player_dead {
        m.transition(run, StageState::Lost, false);
        return;
    }

    let Some(wave) = run.current_wave() else {
        return;
    };
    // All sets kicked off: waiting for their enemies to finish.
    let Some(set) = wave.sets.get(run.sets_started).copied() else {
        return;
    };
    if m.time_in_current_state() > set.start_secs {
        run.requests.push(StageRequest::StartSet(set));
        run.sets_started += 1;
    }
}

fn finish_wave(m: &mut Machine, run: &mut StageRun) {
    let Some(wave) = run.current_wave() else {
        return;
    };
    let last = run.wave_index.is_some_and(|i| i + 1 >= run.waves.len());

    if !run.player_dead && run.kills >= wave.required_kills {
        let next = if last { StageState::Won } else { StageState::ShowingWaveInfo };
        m.transition(run, next, false);
    } else {
        m.transition(run, StageState::Lost, false);
    }
}

fn won_enter(_: &mut Machine, run: &mut StageRun) {
    run.banner = "You Won!".to_string();
    run.subtitle = "Press Esc to exit".to_string();
    run.requests.push(StageRequest::Event(StageEvent::Won));
    info!("Stage won with {} points", run.score);
}

fn lost_enter(_: &mut Machine, run: &mut StageRun) {
    run.stop_started_sets();

    let required = run.current_wave().map_or(0, |w| w.required_kills);
    run.banner = if run.player_dead {
        "You Lose. You did not survive the wave.".to_string()
    } else {
        format!("You Lose. You only killed {:02} / {:02}.", run.kills, required)
    };
    run.subtitle = "Press Esc to exit".to_string();
    run.requests.push(StageRequest::Event(StageEvent::Lost { player_died: run.player_dead }));
    info!("Stage lost");
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.init_resource::<StageLoop>()
        .init_resource::<StageBoard>()
        .add_message::<StageEvent>()
        .add_systems(OnEnter(GameState::InGame), begin_stage)
        .add_systems(OnExit(GameState::InGame), leave_stage)
        .add_systems(
            Update,
            (
                observe_player,
                count_enemies,
                count_finished_sets,
                tick_stage,
                apply_stage_requests,
                publish_board,
                quit_to_title,
            )
                .chain()
                .in_set(GameplaySet::Stage),
        );
}

pub fn begin_stage(
    table: Res<WaveTable>,
    tunables: Res<Tunables>,
    mut stage: ResMut<StageLoop>,
) {
    *stage = StageLoop::new(table.waves.clone(), &tunables);
    stage.start();
}

/// Exclusive: pause and apply the resulting stops before scoped entities go away.
pub fn leave_stage(world: &mut World) {
    world.resource_mut::<StageLoop>().pause();
    apply_stage_requests(world);
    let board = world.resource::<StageLoop>().board();
    world.insert_resource(board);
}

pub fn observe_player(
    q_player: Query<&PlayerLife, With<Player>>,
    mut stage: ResMut<StageLoop>,
) {
    let dead = q_player.iter().any(|life| *life == PlayerLife::Dead);
    stage.set_player_dead(dead);
}

pub fn count_enemies(
    tunables: Res<Tunables>,
    mut reader: MessageReader<EnemyFinished>,
    mut stage: ResMut<StageLoop>,
) {
    for msg in reader.read() {
        stage.on_enemy_finished(msg.killed_by_player, tunables.enemy_score);
    }
}

pub fn count_finished_sets(
    mut reader: MessageReader<SpawnerFinished>,
    mut stage: ResMut<StageLoop>,
) {
    for _ in reader.read() {
        stage.on_set_completed();
    }
}

pub fn tick_stage(time: Res<Time>, mut stage: ResMut<StageLoop>) {
    stage.tick(time.delta_secs());
}

/// Exclusive: apply queued stage side effects.
pub fn apply_stage_requests(world: &mut World) {
    let requests = world.resource_mut::<StageLoop>().take_requests();
    if requests.is_empty() {
        return;
    }
    let roster = world.resource::<SpawnerRoster>().0.clone();

    for request in requests {
        match request {
            StageRequest::StartSet(set) => {
                let spawner = roster
                    .get(set.spawner)
                    .and_then(|e| world.get_mut::<EnemySpawner>(*e));
                match spawner {
                    Some(mut spawner) => spawner.start(set.num_enemies, set.traverse_secs),
                    None => error!("Enemy set refers to unknown spawner {}", set.spawner),
                }
            }
            StageRequest::StopSpawner(i) => {
                if let Some(mut spawner) =
                    roster.get(i).and_then(|e| world.get_mut::<EnemySpawner>(*e))
                {
                    spawner.stop();
                }
            }
            StageRequest::ResetPlayer => {
                let mut q = world.query::<(&mut Player, &mut PlayerLife, &mut Transform)>();
                for (mut player, mut life, mut tf) in q.iter_mut(world) {
                    player.velocity = Vec2::ZERO;
                    *life = PlayerLife::Active;
                    tf.translation = PLAYER_SPAWN;
                }
            }
            StageRequest::DisablePlayer => {
                let mut q = world.query_filtered::<(Entity, &mut PlayerLife), With<Player>>();
                let mut players = Vec::new();
                for (e, mut life) in q.iter_mut(world) {
                    if *life == PlayerLife::Active {
                        *life = PlayerLife::Disabled;
                    }
                    players.push(e);
                }
                // The projectile pipeline may not run again before the player is despawned.
                for player in players {
                    recall_bullets_owned_by(world, player);
                }
            }
            StageRequest::Event(event) => {
                world.write_message(event);
            }
        }
    }
}

pub fn publish_board(stage: Res<StageLoop>, mut board: ResMut<StageBoard>) {
    let next = stage.board();
    if *board != next {
        *board = next;
    }
}

pub fn quit_to_title(mut input: ResMut<PlayerInput>, mut next: ResMut<NextState<GameState>>) {
    if input.quit {
        input.quit = false;
        next.set(GameState::Title);
    }
}
