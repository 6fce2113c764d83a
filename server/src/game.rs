//! The authoritative game world
//!
//! Owns every entity collection and runs the fixed-order tick: bullets
//! advance, players advance and fire, collisions resolve (players before
//! obstacles), dead players are removed, and every other tick one snapshot
//! per surviving player is produced for the transport to deliver. All
//! mutation happens inside [`GameWorld::tick`] and the inbound handlers;
//! the caller is responsible for serializing them on one timeline.

use crate::collision::{apply_collisions, apply_obstacle_collisions};
use crate::entity::{Bullet, Player};
use crate::obstacle::{GeometryError, Obstacle};
use log::{debug, info};
use rand::Rng;
use shared::{
    GameUpdate, LeaderboardEntry, LEADERBOARD_SIZE, MAP_SIZE_X, MAP_SIZE_Y, MAX_SPAWN_ATTEMPTS,
    PLAYER_RADIUS,
};
use std::cmp::Ordering;

/// Join failed because rejection sampling found no obstacle-free position.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("no obstacle-free spawn position found after {0} attempts")]
    Exhausted(u32),
}

/// Everything one tick asks the transport to deliver.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Players whose hit points reached zero this tick; each gets a
    /// game-over notification and loses its connection.
    pub eliminated: Vec<u32>,
    /// One per-recipient snapshot; empty on non-broadcast ticks.
    pub snapshots: Vec<(u32, GameUpdate)>,
}

pub struct GameWorld {
    /// Join order is load-bearing: collision attribution and leaderboard
    /// tie-breaks iterate this Vec front to back.
    players: Vec<Player>,
    bullets: Vec<Bullet>,
    obstacles: Vec<Obstacle>,
    next_bullet_id: u64,
    send_snapshot: bool,
    tick_count: u64,
}

impl GameWorld {
    /// Builds a world with the fixed obstacle layout. The layout is static
    /// for the lifetime of the world; nothing ever mutates it.
    pub fn new() -> Result<Self, GeometryError> {
        Ok(GameWorld {
            players: Vec::new(),
            bullets: Vec::new(),
            obstacles: Self::default_layout()?,
            next_bullet_id: 0,
            send_snapshot: false,
            tick_count: 0,
        })
    }

    fn default_layout() -> Result<Vec<Obstacle>, GeometryError> {
        const LAYOUT: [(f64, f64, f64, f64, f64); 9] = [
            (100.0, 100.0, 0.0, 300.0, 25.0),
            (100.0, 500.0, 30.0, 300.0, 25.0),
            (100.0, 500.0, -10.0, 300.0, 50.0),
            (600.0, 50.0, 90.0, 500.0, 50.0),
            (50.0, 350.0, -70.0, 150.0, 15.0),
            (650.0, 350.0, -60.0, 400.0, 30.0),
            (850.0, 350.0, 50.0, 200.0, 25.0),
            (1000.0, 200.0, 0.0, 200.0, 25.0),
            (900.0, 600.0, 0.0, 200.0, 25.0),
        ];

        LAYOUT
            .iter()
            .map(|&(x, y, angle, width, height)| Obstacle::new(x, y, angle, width, height))
            .collect()
    }

    /// Spawns a new player at an obstacle-free position found by rejection
    /// sampling, bounded so a pathological layout fails the join instead of
    /// looping forever.
    pub fn add_player<R: Rng>(
        &mut self,
        id: u32,
        username: String,
        skin: String,
        rng: &mut R,
    ) -> Result<(), SpawnError> {
        let (x, y) = self.free_spawn_position(rng)?;
        info!("Player {} ({}) spawned at ({:.1}, {:.1})", id, username, x, y);
        self.players.push(Player::new(id, username, skin, x, y));
        Ok(())
    }

    fn free_spawn_position<R: Rng>(&self, rng: &mut R) -> Result<(f64, f64), SpawnError> {
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let x = rng.gen::<f64>() * MAP_SIZE_X;
            let y = rng.gen::<f64>() * MAP_SIZE_Y;
            if self.position_is_free(x, y) {
                return Ok((x, y));
            }
        }
        Err(SpawnError::Exhausted(MAX_SPAWN_ATTEMPTS))
    }

    /// A candidate is free when no obstacle contains any of the four probe
    /// points one player radius away along the axes.
    fn position_is_free(&self, x: f64, y: f64) -> bool {
        self.obstacles.iter().all(|obstacle| {
            !obstacle.contains_point(x + PLAYER_RADIUS, y)
                && !obstacle.contains_point(x - PLAYER_RADIUS, y)
                && !obstacle.contains_point(x, y + PLAYER_RADIUS)
                && !obstacle.contains_point(x, y - PLAYER_RADIUS)
        })
    }

    /// Removes a player; unknown ids are a no-op (the player may already
    /// have died or disconnected this tick).
    pub fn remove_player(&mut self, id: u32) {
        let before = self.players.len();
        self.players.retain(|player| player.id != id);
        if self.players.len() < before {
            info!("Removed player {}", id);
        }
    }

    /// Applies the latest heading for a player; unknown ids are a no-op.
    pub fn handle_input(&mut self, id: u32, direction: f64) {
        if let Some(player) = self.players.iter_mut().find(|player| player.id == id) {
            player.set_direction(direction);
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advances the whole simulation by `dt` seconds of wall clock.
    ///
    /// The sub-step order is a contract; see the module docs. `timestamp`
    /// is the wall-clock millisecond stamp carried by outgoing snapshots.
    pub fn tick(&mut self, dt: f64, timestamp: u64) -> TickReport {
        self.tick_count += 1;

        // 1. Advance bullets; drop those leaving the playfield.
        self.bullets.retain_mut(|bullet| !bullet.update(dt));

        // 2. Advance players in join order, collecting newly fired bullets.
        for player in self.players.iter_mut() {
            if let Some(bullet) = player.update(dt, &mut self.next_bullet_id) {
                self.bullets.push(bullet);
            }
        }

        // 3. Player pass before obstacle pass: a bullet that could satisfy
        //    both in this tick is credited to the player hit.
        let hits = apply_collisions(&mut self.players, &self.bullets);
        for hit in &hits {
            // The shooter may have disconnected mid-flight; skip silently.
            if let Some(shooter) = self
                .players
                .iter_mut()
                .find(|player| player.id == hit.parent_id)
            {
                shooter.on_dealt_damage();
            }
        }
        self.bullets
            .retain(|bullet| !hits.iter().any(|hit| hit.bullet_id == bullet.id));

        let blocked = apply_obstacle_collisions(&self.obstacles, &self.bullets);
        self.bullets.retain(|bullet| !blocked.contains(&bullet.id));

        // 4. Remove players whose hit points ran out.
        let mut eliminated = Vec::new();
        self.players.retain(|player| {
            if player.hp <= 0 {
                eliminated.push(player.id);
                false
            } else {
                true
            }
        });
        for id in &eliminated {
            info!("Player {} destroyed", id);
        }

        // 5. Snapshots go out at half the tick rate; physics stays at full
        //    rate either way.
        let mut snapshots = Vec::new();
        if self.send_snapshot {
            let leaderboard = self.leaderboard();
            for player in &self.players {
                snapshots.push((player.id, self.update_for(player, &leaderboard, timestamp)));
            }
            debug!(
                "Tick {}: broadcast to {} players, {} bullets live",
                self.tick_count,
                self.players.len(),
                self.bullets.len()
            );
        }
        self.send_snapshot = !self.send_snapshot;

        TickReport {
            eliminated,
            snapshots,
        }
    }

    /// Top five by descending score. The stable sort keeps join order
    /// between equal scores; rounding happens here only, stored scores stay
    /// fractional.
    fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(Ordering::Equal)
        });

        ranked
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .map(|player| LeaderboardEntry {
                username: player.username.clone(),
                score: player.score().round() as i64,
            })
            .collect()
    }

    fn update_for(
        &self,
        player: &Player,
        leaderboard: &[LeaderboardEntry],
        timestamp: u64,
    ) -> GameUpdate {
        GameUpdate {
            t: timestamp,
            me: player.snapshot(),
            others: self
                .players
                .iter()
                .filter(|other| other.id != player.id)
                .map(Player::snapshot)
                .collect(),
            bullets: self.bullets.iter().map(Bullet::snapshot).collect(),
            obstacles: self.obstacles.iter().map(Obstacle::snapshot).collect(),
            leaderboard: leaderboard.to_vec(),
        }
    }
}
