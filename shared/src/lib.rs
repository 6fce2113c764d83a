use serde::{Deserialize, Serialize};

pub const MAP_SIZE_X: f64 = 1200.0;
pub const MAP_SIZE_Y: f64 = 700.0;
pub const PLAYER_RADIUS: f64 = 15.0;
pub const PLAYER_MAX_HP: i32 = 100;
pub const PLAYER_SPEED: f64 = 200.0;
pub const PLAYER_FIRE_COOLDOWN: f64 = 0.25;
pub const SCORE_BULLET_HIT: f64 = 20.0;
pub const SCORE_PER_SECOND: f64 = 1.0;
pub const BULLET_RADIUS: f64 = 3.0;
pub const BULLET_SPEED: f64 = 800.0;
pub const BULLET_DAMAGE: i32 = 10;
pub const LEADERBOARD_SIZE: usize = 5;
pub const MAX_SPAWN_ATTEMPTS: u32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // Client -> server
    Join {
        username: String,
        skin: String,
    },
    Input {
        direction: f64,
    },
    Disconnect,

    // Server -> client
    Joined {
        player_id: u32,
    },
    Rejected {
        reason: String,
    },
    GameUpdate(GameUpdate),
    GameOver,
}

/// One per-recipient snapshot of world state, sent on broadcast ticks.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GameUpdate {
    /// Server wall-clock timestamp in milliseconds.
    pub t: u64,
    pub me: PlayerSnapshot,
    pub others: Vec<PlayerSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub hp: i32,
    pub username: String,
    pub score: f64,
    pub skin: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BulletSnapshot {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ObstacleSnapshot {
    pub x: f64,
    pub y: f64,
    /// Rotation in radians.
    pub direction: f64,
    pub width: f64,
    pub height: f64,
}

/// Leaderboard rows carry display-rounded scores; stored scores stay fractional.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_packet_serialization_join() {
        let packet = Packet::Join {
            username: "ace".to_string(),
            skin: "red_tank.png".to_string(),
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Join { username, skin } => {
                assert_eq!(username, "ace");
                assert_eq!(skin, "red_tank.png");
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_input() {
        let packet = Packet::Input {
            direction: std::f64::consts::FRAC_PI_4,
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Input { direction } => {
                assert_approx_eq!(direction, std::f64::consts::FRAC_PI_4)
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_game_update() {
        let update = GameUpdate {
            t: 123456789,
            me: PlayerSnapshot {
                x: 100.0,
                y: 200.0,
                direction: 1.5,
                hp: 90,
                username: "ace".to_string(),
                score: 21.5,
                skin: "red_tank.png".to_string(),
            },
            others: vec![PlayerSnapshot {
                x: 300.0,
                y: 400.0,
                direction: -0.5,
                hp: 40,
                username: "bo".to_string(),
                score: 60.0,
                skin: "blue_tank.png".to_string(),
            }],
            bullets: vec![BulletSnapshot { x: 110.0, y: 190.0 }],
            obstacles: vec![ObstacleSnapshot {
                x: 100.0,
                y: 100.0,
                direction: 0.0,
                width: 300.0,
                height: 25.0,
            }],
            leaderboard: vec![
                LeaderboardEntry {
                    username: "bo".to_string(),
                    score: 60,
                },
                LeaderboardEntry {
                    username: "ace".to_string(),
                    score: 22,
                },
            ],
        };

        let serialized = bincode::serialize(&Packet::GameUpdate(update)).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::GameUpdate(update) => {
                assert_eq!(update.t, 123456789);
                assert_eq!(update.me.username, "ace");
                assert_eq!(update.me.hp, 90);
                assert_approx_eq!(update.me.score, 21.5);
                assert_eq!(update.others.len(), 1);
                assert_eq!(update.others[0].username, "bo");
                assert_eq!(update.bullets.len(), 1);
                assert_approx_eq!(update.bullets[0].x, 110.0);
                assert_eq!(update.obstacles.len(), 1);
                assert_approx_eq!(update.obstacles[0].width, 300.0);
                assert_eq!(update.leaderboard.len(), 2);
                assert_eq!(update.leaderboard[0].score, 60);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_game_over() {
        let serialized = bincode::serialize(&Packet::GameOver).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::GameOver => {}
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_playfield_fits_obstacle_layout() {
        // The static obstacle layout assumes this much room.
        assert!(MAP_SIZE_X >= 1200.0);
        assert!(MAP_SIZE_Y >= 700.0);
        assert!(PLAYER_RADIUS > BULLET_RADIUS);
    }
}
