//! Collision resolution for one simulation tick
//!
//! Two passes over the live entity sets, always player pass first: a bullet
//! that could satisfy both a player hit and an obstacle hit in the same tick
//! is attributed to the player hit, so obstacles never absorb a kill.
//! Both passes are pure functions of the collections they are handed; the
//! world owns removal of the bullets they report destroyed.

use crate::entity::{Bullet, Player};
use crate::obstacle::Obstacle;
use shared::{BULLET_RADIUS, PLAYER_RADIUS};

/// A bullet consumed by striking a player, with the shooter to credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletHit {
    pub bullet_id: u64,
    pub parent_id: u32,
}

/// Bullet-versus-player pass.
///
/// For each bullet, the first player in collection order (join order) that
/// is not the shooter and sits within the combined radii takes one hit of
/// damage; the bullet is recorded destroyed and examined no further. Which
/// player "wins" a simultaneous overlap is therefore iteration-order
/// dependent, deliberately so.
pub fn apply_collisions(players: &mut [Player], bullets: &[Bullet]) -> Vec<BulletHit> {
    let mut destroyed = Vec::new();

    for bullet in bullets {
        for player in players.iter_mut() {
            if player.id == bullet.parent_id {
                continue;
            }
            if player.body.distance_to(&bullet.body) <= PLAYER_RADIUS + BULLET_RADIUS {
                player.take_bullet_damage();
                destroyed.push(BulletHit {
                    bullet_id: bullet.id,
                    parent_id: bullet.parent_id,
                });
                break;
            }
        }
    }

    destroyed
}

/// Bullet-versus-obstacle pass.
///
/// Must run after [`apply_collisions`] on the bullets that survived it;
/// returns the ids of bullets swallowed by static geometry.
pub fn apply_obstacle_collisions(obstacles: &[Obstacle], bullets: &[Bullet]) -> Vec<u64> {
    let mut destroyed = Vec::new();

    for bullet in bullets {
        if obstacles.iter().any(|obstacle| obstacle.contains(bullet)) {
            destroyed.push(bullet.id);
        }
    }

    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BULLET_DAMAGE, PLAYER_MAX_HP};

    fn test_player(id: u32, x: f64, y: f64) -> Player {
        Player::new(id, format!("player{}", id), "red_tank.png".to_string(), x, y)
    }

    #[test]
    fn test_bullet_hits_opponent() {
        let mut players = vec![test_player(1, 100.0, 100.0), test_player(2, 500.0, 500.0)];
        let bullets = vec![Bullet::new(10, 2, 105.0, 100.0, 0.0)];

        let hits = apply_collisions(&mut players, &bullets);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0], BulletHit { bullet_id: 10, parent_id: 2 });
        assert_eq!(players[0].hp, PLAYER_MAX_HP - BULLET_DAMAGE);
        assert_eq!(players[1].hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_bullet_ignores_own_shooter() {
        let mut players = vec![test_player(1, 100.0, 100.0)];
        let bullets = vec![Bullet::new(10, 1, 100.0, 100.0, 0.0)];

        let hits = apply_collisions(&mut players, &bullets);

        assert!(hits.is_empty());
        assert_eq!(players[0].hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_bullet_out_of_range_misses() {
        let mut players = vec![test_player(1, 100.0, 100.0)];
        // Just past the combined radii.
        let bullets = vec![Bullet::new(10, 2, 100.0 + PLAYER_RADIUS + BULLET_RADIUS + 0.1, 100.0, 0.0)];

        let hits = apply_collisions(&mut players, &bullets);

        assert!(hits.is_empty());
        assert_eq!(players[0].hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_simultaneous_overlap_first_player_in_order_wins() {
        // Both players overlap the bullet; only the first-inserted one is
        // hit and the bullet is destroyed exactly once.
        let mut players = vec![test_player(1, 102.0, 100.0), test_player(2, 98.0, 100.0)];
        let bullets = vec![Bullet::new(10, 3, 100.0, 100.0, 0.0)];

        let hits = apply_collisions(&mut players, &bullets);

        assert_eq!(hits.len(), 1);
        assert_eq!(players[0].hp, PLAYER_MAX_HP - BULLET_DAMAGE);
        assert_eq!(players[1].hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_one_player_takes_multiple_bullets_in_one_tick() {
        let mut players = vec![test_player(1, 100.0, 100.0)];
        let bullets = vec![
            Bullet::new(10, 2, 102.0, 100.0, 0.0),
            Bullet::new(11, 2, 98.0, 100.0, 0.0),
        ];

        let hits = apply_collisions(&mut players, &bullets);

        assert_eq!(hits.len(), 2);
        assert_eq!(players[0].hp, PLAYER_MAX_HP - 2 * BULLET_DAMAGE);
    }

    #[test]
    fn test_obstacle_pass_destroys_embedded_bullet() {
        let obstacles = vec![Obstacle::new(100.0, 100.0, 0.0, 300.0, 25.0).unwrap()];
        let bullets = vec![
            Bullet::new(10, 1, 250.0, 110.0, 0.0),
            Bullet::new(11, 1, 250.0, 400.0, 0.0),
        ];

        let destroyed = apply_obstacle_collisions(&obstacles, &bullets);

        assert_eq!(destroyed, vec![10]);
    }
}
