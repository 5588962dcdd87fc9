//! Title screen: keeps a spawner busy in the background and starts the game on fire.
//!
//! Attract mode walks the spawners in a shuffled order so the same path never plays twice in
//! a row, reshuffling after each full pass. `Tunables::attract_seed` pins the shuffle for
//! repeatable runs.

use bevy::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::GameplaySet;
use crate::plugins::player::PlayerInput;
use crate::plugins::spawner::{EnemySpawner, SpawnerRoster};

pub const ATTRACT_TRAVERSE_SECS: f32 = 5.0;
/// Enemy count per attract run is drawn from `MIN..=MAX`.
pub const ATTRACT_MIN_ENEMIES: u32 = 5;
pub const ATTRACT_MAX_ENEMIES: u32 = 11;

#[derive(Resource, Debug, Clone)]
pub struct TitleAttract {
    /// Roster indices in play order.
    order: Vec<usize>,
    cursor: Option<usize>,
    rng: SmallRng,
}

impl FromWorld for TitleAttract {
    fn from_world(world: &mut World) -> Self {
        match world.get_resource::<Tunables>().and_then(|t| t.attract_seed) {
            Some(seed) => Self::seeded(seed),
            None => Self::with_rng(SmallRng::from_entropy()),
        }
    }
}

impl TitleAttract {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self { order: Vec::new(), cursor: None, rng }
    }

    /// Roster index of the spawner currently playing.
    pub fn current(&self) -> Option<usize> {
        self.cursor.and_then(|c| self.order.get(c).copied())
    }

    /// Advance to the next spawner. Returns its roster index and how many enemies to send.
    pub fn advance(&mut self, roster_len: usize) -> Option<(usize, u32)> {
        if roster_len == 0 {
            return None;
        }
        if self.order.len() != roster_len {
            self.order = (0..roster_len).collect();
            self.cursor = None;
        }

        let next = match self.cursor {
            Some(c) if c + 1 < self.order.len() => c + 1,
            _ => {
                self.reshuffle();
                0
            }
        };
        self.cursor = Some(next);

        let count = self.rng.gen_range(ATTRACT_MIN_ENEMIES..=ATTRACT_MAX_ENEMIES);
        self.current().map(|i| (i, count))
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }

    fn reshuffle(&mut self) {
        let last = self.current();
        for i in (1..self.order.len()).rev() {
            let r = self.rng.gen_range(0..i);
            self.order.swap(i, r);
        }
        // Never replay the spawner that just finished.
        if self.order.len() > 1 && self.order.first().copied() == last {
            self.order.swap(0, 1);
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<TitleAttract>()
        .add_systems(OnExit(GameState::Title), stop_attract)
        .add_systems(
            Update,
            (run_attract, start_on_fire)
                .chain()
                .after(GameplaySet::Spawners)
                .run_if(in_state(GameState::Title)),
        );
}

pub fn run_attract(
    roster: Res<SpawnerRoster>,
    mut attract: ResMut<TitleAttract>,
    mut q: Query<&mut EnemySpawner>,
) {
    let busy = attract
        .current()
        .and_then(|i| roster.0.get(i))
        .and_then(|e| q.get(*e).ok())
        .is_some_and(|s| s.is_spawning());
    if busy {
        return;
    }

    let Some((i, count)) = attract.advance(roster.0.len()) else {
        return;
    };
    if let Some(mut spawner) = roster.0.get(i).and_then(|e| q.get_mut(*e).ok()) {
        spawner.start(count, ATTRACT_TRAVERSE_SECS);
    }
}

pub fn stop_attract(
    roster: Res<SpawnerRoster>,
    mut attract: ResMut<TitleAttract>,
    mut q: Query<&mut EnemySpawner>,
) {
    if let Some(mut spawner) = attract
        .current()
        .and_then(|i| roster.0.get(i))
        .and_then(|e| q.get_mut(*e).ok())
    {
        spawner.stop();
    }
    attract.reset();
}

pub fn start_on_fire(mut input: ResMut<PlayerInput>, mut next: ResMut<NextState<GameState>>) {
    if input.fire {
        input.fire = false;
        info!("Starting game");
        next.set(GameState::InGame);
    }
}
