use crate::config::GameConfig;
use crate::constants::*;
use crate::rendering::Canvas;
use crate::types::{Hitbox, Vector2D, wrap_coordinate};
use log::debug;
use rand::Rng;

/// What happens to an entity that drifts past the playfield edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Re-enter from the opposite edge.
    Wrap,
    /// Leave play for good.
    Cull,
}

/// Shared motion rule for everything that flies across the playfield.
pub trait Moving {
    const EDGE: EdgePolicy;

    fn position(&self) -> Vector2D;
    fn set_position(&mut self, position: Vector2D);
    /// Displacement per tick in screen coordinates (y grows downwards).
    fn screen_velocity(&self) -> Vector2D;
    fn hitbox(&self, config: &GameConfig) -> Hitbox;

    /// Integrates one tick and applies the edge policy. Returns `false` once a
    /// culled entity has left `[0, width] x [0, height]`.
    fn advance(&mut self, config: &GameConfig) -> bool {
        let moved = self.position().add(self.screen_velocity());
        match Self::EDGE {
            EdgePolicy::Wrap => {
                self.set_position(Vector2D::new(
                    wrap_coordinate(moved.x, config.width),
                    wrap_coordinate(moved.y, config.height),
                ));
                true
            }
            EdgePolicy::Cull => {
                self.set_position(moved);
                (0.0..=config.width).contains(&moved.x) && (0.0..=config.height).contains(&moved.y)
            }
        }
    }

    fn collides_with<M: Moving>(&self, other: &M, config: &GameConfig) -> bool {
        self.hitbox(config).intersects(&other.hitbox(config))
    }
}

/// Held movement keys for one tick. Missing input state is all-false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub thrust: bool,
}

// --- Ship ---
#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub position: Vector2D,
    pub velocity: Vector2D, // y up, like the heading
    pub angle: f64,         // Degrees, 0 = pointing right
    pub thrusting: bool,
}

impl Ship {
    pub fn new(position: Vector2D) -> Self {
        Ship {
            position,
            velocity: Vector2D::default(),
            angle: 0.0,
            thrusting: false,
        }
    }

    /// Applies one tick of steering, thrust or drag, then moves and wraps.
    pub fn update(&mut self, controls: Controls, config: &GameConfig) {
        self.thrusting = false;

        if controls.left {
            self.angle += config.ship_rotation_step;
        }
        if controls.right {
            self.angle -= config.ship_rotation_step;
        }
        if controls.thrust {
            let push = Vector2D::from_degrees(self.angle).scale(config.ship_acceleration);
            self.velocity = self.velocity.add(push);
            self.thrusting = true;
        } else {
            self.velocity = self.velocity.scale(1.0 - config.ship_deceleration);
        }

        if self.velocity.length() > config.max_ship_speed {
            self.velocity = self.velocity.scale_to_length(config.max_ship_speed);
        }

        self.advance(config);
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Muzzle points on both wing tips, perpendicular to the heading.
    pub fn gun_positions(&self, config: &GameConfig) -> [Vector2D; 2] {
        [
            self.position.add(Vector2D::screen_offset(self.angle + 90.0, config.gun_offset)),
            self.position.add(Vector2D::screen_offset(self.angle - 90.0, config.gun_offset)),
        ]
    }

    /// Two bullets leaving the wing tips along the current heading.
    pub fn fire(&self, config: &GameConfig) -> [Bullet; 2] {
        let [left, right] = self.gun_positions(config);
        debug!("Ship fired at angle {} from ({:.1}, {:.1})", self.angle, self.position.x, self.position.y);
        [
            Bullet::new(left, self.angle, config.bullet_speed),
            Bullet::new(right, self.angle, config.bullet_speed),
        ]
    }

    pub fn draw(&self, canvas: &mut impl Canvas, config: &GameConfig) {
        let half_long = SHIP_SIZE / 2.0;
        let half_short = SHIP_SIZE * 0.7 / 2.0;
        let hull = [
            self.position.add(Vector2D::screen_offset(self.angle, half_long)),
            self.position.add(Vector2D::screen_offset(self.angle + 120.0, half_short)),
            self.position.add(Vector2D::screen_offset(self.angle - 120.0, half_short)),
        ];
        canvas.polygon(&hull);
        for gun in self.gun_positions(config) {
            canvas.circle(gun, GUN_MARKER_RADIUS);
        }
    }
}

impl Moving for Ship {
    const EDGE: EdgePolicy = EdgePolicy::Wrap;

    fn position(&self) -> Vector2D {
        self.position
    }

    fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    fn screen_velocity(&self) -> Vector2D {
        Vector2D::new(self.velocity.x, -self.velocity.y)
    }

    fn hitbox(&self, config: &GameConfig) -> Hitbox {
        Hitbox::square(self.position, config.ship_hitbox)
    }
}

// --- Asteroid ---

/// Where an asteroid sits in its fragmentation lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsteroidStage {
    Whole,
    SplitOnce,
    Fragment,
}

/// Result of a bullet striking an asteroid. The struck asteroid is always destroyed.
#[derive(Debug)]
pub enum HitOutcome {
    /// A never-split asteroid larger than the smallest size broke in two.
    Split(Vec<Asteroid>),
    /// An asteroid that had already split burst into short-lived fragments.
    Exploded(Vec<Asteroid>),
    /// Nothing left to break apart.
    Destroyed,
}

impl HitOutcome {
    pub fn into_fragments(self) -> Vec<Asteroid> {
        match self {
            HitOutcome::Split(children) | HitOutcome::Exploded(children) => children,
            HitOutcome::Destroyed => Vec::new(),
        }
    }

    /// Only a hit that leaves no fragments behind scores.
    pub fn awards_point(&self) -> bool {
        matches!(self, HitOutcome::Destroyed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Asteroid {
    pub position: Vector2D,
    pub angle: f64,
    pub speed: f64,
    pub size: u32,
    pub vertices: u8,
    pub fragment_timer: Option<u32>,
    pub has_split: bool,
}

impl Asteroid {
    /// A fresh asteroid at `position` with random heading, speed and outline.
    /// Smallest-size asteroids start their self-destruct countdown immediately.
    pub fn new(position: Vector2D, size: u32, rng: &mut impl Rng, config: &GameConfig) -> Self {
        let (min_speed, max_speed) = config.asteroid_speed_range;
        let (min_vertices, max_vertices) = config.asteroid_vertex_range;
        Asteroid {
            position,
            angle: rng.gen_range(0..=360) as f64,
            speed: rng.gen_range(min_speed..=max_speed) as f64,
            size,
            vertices: rng.gen_range(min_vertices..=max_vertices),
            fragment_timer: (size == config.smallest_size).then_some(config.fragment_lifetime),
            has_split: false,
        }
    }

    /// Anywhere on the playfield, inclusive of the far edges.
    pub fn spawn_random(size: u32, rng: &mut impl Rng, config: &GameConfig) -> Self {
        let x = rng.gen_range(0..=config.width as u32) as f64;
        let y = rng.gen_range(0..=config.height as u32) as f64;
        Asteroid::new(Vector2D::new(x, y), size, rng, config)
    }

    pub fn stage(&self) -> AsteroidStage {
        if self.has_split {
            AsteroidStage::SplitOnce
        } else if self.fragment_timer.is_some() {
            AsteroidStage::Fragment
        } else {
            AsteroidStage::Whole
        }
    }

    /// Moves, wraps and runs the fragment countdown. Returns `false` when the
    /// countdown has expired and the asteroid should disappear.
    pub fn update(&mut self, config: &GameConfig) -> bool {
        self.advance(config);
        match self.fragment_timer.as_mut() {
            Some(timer) => {
                *timer = timer.saturating_sub(1);
                *timer > 0
            }
            None => true,
        }
    }

    pub fn split(&mut self, rng: &mut impl Rng, config: &GameConfig) -> HitOutcome {
        if !self.has_split && self.size > config.smallest_size {
            self.has_split = true;
            let child_size = self.size / 2;
            debug!("Asteroid of size {} split into two of size {}", self.size, child_size);
            let children = (0..config.split_child_count)
                .map(|_| Asteroid::new(self.position, child_size, rng, config))
                .collect();
            HitOutcome::Split(children)
        } else if self.has_split {
            HitOutcome::Exploded(self.explode(rng, config))
        } else {
            HitOutcome::Destroyed
        }
    }

    fn explode(&self, rng: &mut impl Rng, config: &GameConfig) -> Vec<Asteroid> {
        let (min_speed, max_speed) = config.explosion_speed_range;
        debug!("Asteroid of size {} exploded into {} fragments", self.size, config.explosion_fragment_count);
        (0..config.explosion_fragment_count)
            .map(|_| {
                let mut fragment = Asteroid::new(self.position, config.smallest_size, rng, config);
                fragment.angle = rng.gen_range(0..=360) as f64;
                fragment.speed = rng.gen_range(min_speed..=max_speed) as f64;
                fragment.fragment_timer = Some(config.fragment_lifetime);
                fragment
            })
            .collect()
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        let step = 360.0 / self.vertices as f64;
        let radius = self.size as f64;
        let outline: Vec<Vector2D> = (0..self.vertices)
            .map(|i| {
                let radians = (step * i as f64 + self.angle).to_radians();
                Vector2D::new(
                    self.position.x + radius * radians.cos(),
                    self.position.y + radius * radians.sin(),
                )
            })
            .collect();
        canvas.polygon(&outline);
    }
}

impl Moving for Asteroid {
    const EDGE: EdgePolicy = EdgePolicy::Wrap;

    fn position(&self) -> Vector2D {
        self.position
    }

    fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    fn screen_velocity(&self) -> Vector2D {
        Vector2D::screen_offset(self.angle, self.speed)
    }

    fn hitbox(&self, _config: &GameConfig) -> Hitbox {
        Hitbox::square(self.position, self.size as f64)
    }
}

// --- Bullet ---
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub position: Vector2D,
    pub angle: f64,
    pub speed: f64,
}

impl Bullet {
    pub fn new(position: Vector2D, angle: f64, speed: f64) -> Self {
        Bullet { position, angle, speed }
    }

    /// Moves one tick; `false` once the bullet has left the playfield.
    pub fn update(&mut self, config: &GameConfig) -> bool {
        self.advance(config)
    }

    pub fn draw(&self, canvas: &mut impl Canvas, config: &GameConfig) {
        canvas.rect(self.position, config.bullet_width, config.bullet_height);
    }
}

impl Moving for Bullet {
    const EDGE: EdgePolicy = EdgePolicy::Cull;

    fn position(&self) -> Vector2D {
        self.position
    }

    fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    fn screen_velocity(&self) -> Vector2D {
        Vector2D::screen_offset(self.angle, self.speed)
    }

    fn hitbox(&self, config: &GameConfig) -> Hitbox {
        Hitbox::new(self.position, config.bullet_width, config.bullet_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> GameConfig {
        GameConfig::with_playfield(800.0, 600.0)
    }

    fn asteroid_at(x: f64, y: f64, size: u32) -> Asteroid {
        Asteroid {
            position: Vector2D::new(x, y),
            angle: 0.0,
            speed: 0.0,
            size,
            vertices: 6,
            fragment_timer: None,
            has_split: false,
        }
    }

    #[test]
    fn thrust_never_exceeds_max_speed() {
        let config = config();
        let mut ship = Ship::new(config.center());
        for tick in 0..500 {
            let controls = Controls { left: tick % 7 == 0, right: tick % 11 == 0, thrust: true };
            ship.update(controls, &config);
            assert!(ship.speed() <= config.max_ship_speed + 1e-9);
        }
        assert!((ship.speed() - config.max_ship_speed).abs() < 1e-9);
    }

    #[test]
    fn drag_decays_speed_geometrically() {
        let config = config();
        let mut ship = Ship::new(config.center());
        ship.velocity = Vector2D::new(3.0, 4.0);
        let mut expected = 5.0;
        for _ in 0..200 {
            ship.update(Controls::default(), &config);
            expected *= 1.0 - config.ship_deceleration;
            assert!((ship.speed() - expected).abs() < 1e-9);
            assert!(ship.speed() >= 0.0);
        }
        assert!(ship.speed() < 1e-3);
    }

    #[test]
    fn rotation_steps_five_degrees() {
        let config = config();
        let mut ship = Ship::new(config.center());
        ship.update(Controls { left: true, ..Controls::default() }, &config);
        assert_eq!(ship.angle, 5.0);
        ship.update(Controls { right: true, ..Controls::default() }, &config);
        ship.update(Controls { right: true, ..Controls::default() }, &config);
        assert_eq!(ship.angle, -5.0);
        assert!(!ship.thrusting);
    }

    #[test]
    fn thrust_moves_ship_up_the_screen_at_ninety_degrees() {
        let config = config();
        let mut ship = Ship::new(config.center());
        ship.angle = 90.0;
        ship.update(Controls { thrust: true, ..Controls::default() }, &config);
        assert!(ship.thrusting);
        assert!(ship.position.y < config.center().y);
        assert!((ship.position.x - config.center().x).abs() < 1e-9);
    }

    #[test]
    fn ship_wraps_inside_playfield() {
        let config = config();
        let mut ship = Ship::new(Vector2D::new(799.0, 1.0));
        ship.velocity = Vector2D::new(5.0, 5.0);
        ship.update(Controls::default(), &config);
        assert!((0.0..config.width).contains(&ship.position.x));
        assert!((0.0..config.height).contains(&ship.position.y));
    }

    #[test]
    fn fire_spawns_pair_at_wing_tips() {
        let config = config();
        let ship = Ship::new(Vector2D::new(400.0, 300.0));
        let [first, second] = ship.fire(&config);
        assert!((first.position.x - 400.0).abs() < 1e-9);
        assert!((first.position.y - 270.0).abs() < 1e-9);
        assert!((second.position.y - 330.0).abs() < 1e-9);
        assert_eq!(first.angle, 0.0);
        assert_eq!(second.speed, config.bullet_speed);
    }

    #[test]
    fn bullet_is_culled_on_leaving_bounds() {
        let config = config();
        let mut bullet = Bullet::new(Vector2D::new(795.0, 300.0), 0.0, 10.0);
        assert!(!bullet.update(&config));

        let mut inside = Bullet::new(Vector2D::new(790.0, 300.0), 0.0, 10.0);
        assert!(inside.update(&config), "landing exactly on the edge keeps the bullet");
    }

    #[test]
    fn asteroid_wraps_instead_of_leaving() {
        let config = config();
        let mut asteroid = asteroid_at(1.0, 599.0, 40);
        asteroid.angle = 225.0;
        asteroid.speed = 3.0;
        assert!(asteroid.update(&config));
        assert!((0.0..config.width).contains(&asteroid.position.x));
        assert!((0.0..config.height).contains(&asteroid.position.y));
    }

    #[test]
    fn new_asteroid_attributes_within_ranges() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let asteroid = Asteroid::spawn_random(40, &mut rng, &config);
            assert!((1.0..=3.0).contains(&asteroid.speed));
            assert!((0.0..=360.0).contains(&asteroid.angle));
            assert!((5..=8).contains(&asteroid.vertices));
            assert_eq!(asteroid.fragment_timer, None);
            assert_eq!(asteroid.stage(), AsteroidStage::Whole);
        }
        let small = Asteroid::new(Vector2D::default(), 10, &mut rng, &config);
        assert_eq!(small.fragment_timer, Some(30));
        assert_eq!(small.stage(), AsteroidStage::Fragment);
    }

    #[test]
    fn whole_asteroids_split_in_two_halves() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(3);
        let mut large = asteroid_at(100.0, 100.0, 40);
        let outcome = large.split(&mut rng, &config);
        assert!(!outcome.awards_point());
        let children = outcome.into_fragments();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.size == 20 && c.position == large.position));
        assert!(large.has_split);

        let mut medium = asteroid_at(50.0, 50.0, 20);
        let children = medium.split(&mut rng, &config).into_fragments();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.size == 10 && c.fragment_timer == Some(30)));
    }

    #[test]
    fn already_split_asteroid_explodes_into_ten_fragments() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(5);
        for size in [40, 20, 10] {
            let mut asteroid = asteroid_at(200.0, 200.0, size);
            asteroid.has_split = true;
            let outcome = asteroid.split(&mut rng, &config);
            assert!(matches!(outcome, HitOutcome::Exploded(_)));
            assert!(!outcome.awards_point());
            let fragments = outcome.into_fragments();
            assert_eq!(fragments.len(), 10);
            for fragment in &fragments {
                assert_eq!(fragment.size, 10);
                assert_eq!(fragment.fragment_timer, Some(30));
                assert!((2.0..=5.0).contains(&fragment.speed));
                assert_eq!(fragment.position, asteroid.position);
            }
        }
    }

    #[test]
    fn never_split_smallest_asteroid_is_destroyed_for_a_point() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(9);
        let mut small = asteroid_at(10.0, 10.0, 10);
        small.fragment_timer = Some(12);
        let outcome = small.split(&mut rng, &config);
        assert!(outcome.awards_point());
        assert!(outcome.into_fragments().is_empty());
    }

    #[test]
    fn fragment_expires_on_thirtieth_tick() {
        let config = config();
        let mut fragment = asteroid_at(300.0, 300.0, 10);
        fragment.fragment_timer = Some(30);
        for tick in 1..30 {
            assert!(fragment.update(&config), "alive at tick {tick}");
        }
        assert!(!fragment.update(&config));
    }

    #[test]
    fn hitboxes_follow_entity_sizes() {
        let config = config();
        let asteroid = asteroid_at(100.0, 100.0, 40);
        let near = Bullet::new(Vector2D::new(121.0, 100.0), 0.0, 10.0);
        let far = Bullet::new(Vector2D::new(123.0, 100.0), 0.0, 10.0);
        assert!(near.collides_with(&asteroid, &config));
        assert!(!far.collides_with(&asteroid, &config));
    }

    #[test]
    fn tuning_comes_from_config() {
        let mut config = config();
        config.split_child_count = 3;
        config.asteroid_speed_range = (4, 4);
        config.asteroid_vertex_range = (7, 7);
        config.explosion_speed_range = (9, 9);
        config.bullet_width = 60.0;
        config.ship_hitbox = 2.0;
        let mut rng = StdRng::seed_from_u64(21);

        let mut whole = asteroid_at(300.0, 300.0, 40);
        let children = whole.split(&mut rng, &config).into_fragments();
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|c| c.speed == 4.0 && c.vertices == 7));

        let fragments = whole.split(&mut rng, &config).into_fragments();
        assert!(fragments.iter().all(|f| f.speed == 9.0));

        let wide = Bullet::new(Vector2D::new(140.0, 100.0), 0.0, 0.0);
        assert!(wide.collides_with(&asteroid_at(100.0, 100.0, 40), &config));
        let ship = Ship::new(Vector2D::new(100.0, 100.0));
        assert!(!ship.collides_with(&asteroid_at(122.0, 100.0, 40), &config));
    }
}
