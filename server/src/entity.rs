//! Players, bullets, and the kinematic state they share

use shared::{
    BulletSnapshot, PlayerSnapshot, BULLET_DAMAGE, BULLET_SPEED, MAP_SIZE_X, MAP_SIZE_Y,
    PLAYER_FIRE_COOLDOWN, PLAYER_MAX_HP, PLAYER_SPEED, SCORE_BULLET_HIT, SCORE_PER_SECOND,
};

/// Position plus heading and speed, composed into every moving entity.
///
/// Heading 0 points up (-y) and positive angles turn clockwise, matching the
/// client's screen coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Kinematics {
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub speed: f64,
}

impl Kinematics {
    pub fn new(x: f64, y: f64, direction: f64, speed: f64) -> Self {
        Kinematics {
            x,
            y,
            direction,
            speed,
        }
    }

    /// Advances along the current heading at constant speed.
    pub fn advance(&mut self, dt: f64) {
        self.x += dt * self.speed * self.direction.sin();
        self.y -= dt * self.speed * self.direction.cos();
    }

    /// Euclidean distance between entity centers.
    pub fn distance_to(&self, other: &Kinematics) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A projectile traveling along the heading captured at fire time.
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u64,
    /// Owning player; lookup-only, the bullet outlives its owner's removal.
    pub parent_id: u32,
    pub body: Kinematics,
}

impl Bullet {
    pub fn new(id: u64, parent_id: u32, x: f64, y: f64, direction: f64) -> Self {
        Bullet {
            id,
            parent_id,
            body: Kinematics::new(x, y, direction, BULLET_SPEED),
        }
    }

    /// Advances the bullet; returns true if it left the playfield and
    /// should be destroyed.
    pub fn update(&mut self, dt: f64) -> bool {
        self.body.advance(dt);
        self.body.x < 0.0
            || self.body.x > MAP_SIZE_X
            || self.body.y < 0.0
            || self.body.y > MAP_SIZE_Y
    }

    pub fn snapshot(&self) -> BulletSnapshot {
        BulletSnapshot {
            x: self.body.x,
            y: self.body.y,
        }
    }
}

/// A connected player's avatar: kinematics plus combat state.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub username: String,
    pub skin: String,
    pub body: Kinematics,
    pub hp: i32,
    score: f64,
    fire_cooldown: f64,
}

impl Player {
    pub fn new(id: u32, username: String, skin: String, x: f64, y: f64) -> Self {
        Player {
            id,
            username,
            skin,
            body: Kinematics::new(x, y, 0.0, PLAYER_SPEED),
            hp: PLAYER_MAX_HP,
            score: 0.0,
            fire_cooldown: 0.0,
        }
    }

    /// Records the latest client heading; takes effect on the next update.
    /// There is no slew: turns are instantaneous, translation is constant
    /// speed.
    pub fn set_direction(&mut self, direction: f64) {
        self.body.direction = direction;
    }

    /// Advances the player one tick and ticks the fire cooldown.
    ///
    /// Returns the newly fired bullet whenever the cooldown has elapsed;
    /// firing is continuous, there is no trigger input. Bullet ids are
    /// issued from the world-owned counter.
    pub fn update(&mut self, dt: f64, next_bullet_id: &mut u64) -> Option<Bullet> {
        self.body.advance(dt);
        self.body.x = self.body.x.clamp(0.0, MAP_SIZE_X);
        self.body.y = self.body.y.clamp(0.0, MAP_SIZE_Y);

        // Survival trickle; fractional, rounded for display only.
        self.score += dt * SCORE_PER_SECOND;

        self.fire_cooldown -= dt;
        if self.fire_cooldown <= 0.0 {
            self.fire_cooldown += PLAYER_FIRE_COOLDOWN;
            let bullet = Bullet::new(
                *next_bullet_id,
                self.id,
                self.body.x,
                self.body.y,
                self.body.direction,
            );
            *next_bullet_id = next_bullet_id.wrapping_add(1);
            return Some(bullet);
        }
        None
    }

    pub fn take_bullet_damage(&mut self) {
        self.hp -= BULLET_DAMAGE;
    }

    /// Score credit for landing a bullet on an opponent.
    pub fn on_dealt_damage(&mut self) {
        self.score += SCORE_BULLET_HIT;
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.body.x,
            y: self.body.y,
            direction: self.body.direction,
            hp: self.hp,
            username: self.username.clone(),
            score: self.score,
            skin: self.skin.clone(),
        }
    }
}
