use std::io;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

use crate::audio::{AudioSink, SoundCue};
use crate::config::GameConfig;
use crate::entities::{Asteroid, Bullet, Controls, Moving, Ship};
use crate::rendering::{Canvas, draw_game_over_screen, draw_hud, draw_title_screen};
use crate::terminal_io::{InputEvent, InputSource, Key};

/// Input gathered for a single tick of play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    pub controls: Controls,
    /// Fire key presses seen this tick; each one fires a bullet pair.
    pub shots: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Running,
    /// The ship hit an asteroid; `score` is what the round earned.
    Over { score: u32 },
}

#[derive(Debug)]
pub struct TickReport {
    pub cues: Vec<SoundCue>,
    pub status: RoundStatus,
}

/// Everything alive during one round of play.
#[derive(Clone, Debug)]
pub struct Round {
    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub score: u32,
    pub ticks: u64,
}

impl Round {
    /// Ship at rest in the centre and a fresh field of whole asteroids.
    pub fn new(rng: &mut impl Rng, config: &GameConfig) -> Self {
        let asteroids = (0..config.initial_asteroid_count)
            .map(|_| Asteroid::spawn_random(config.largest_size, rng, config))
            .collect();
        info!("Round started with {} asteroids.", config.initial_asteroid_count);
        Round {
            ship: Ship::new(config.center()),
            asteroids,
            bullets: Vec::new(),
            score: 0,
            ticks: 0,
        }
    }

    /// Advances the round by one tick: fire, move, resolve hits, then check the ship.
    pub fn step(&mut self, input: TickInput, rng: &mut impl Rng, config: &GameConfig) -> TickReport {
        let mut cues = Vec::new();
        self.ticks += 1;

        for _ in 0..input.shots {
            self.bullets.extend(self.ship.fire(config));
            cues.push(SoundCue::Shoot);
        }

        self.ship.update(input.controls, config);
        if self.ship.thrusting {
            cues.push(SoundCue::Move);
        }

        self.bullets.retain_mut(|bullet| bullet.update(config));
        self.asteroids.retain_mut(|asteroid| {
            let alive = asteroid.update(config);
            if !alive {
                debug!("Fragment expired at ({:.1}, {:.1})", asteroid.position.x, asteroid.position.y);
            }
            alive
        });

        self.resolve_bullet_hits(rng, config, &mut cues);

        let status = if self.ship_destroyed(config) {
            info!("Ship destroyed after {} ticks. Score: {}", self.ticks, self.score);
            RoundStatus::Over { score: self.score }
        } else {
            RoundStatus::Running
        };
        TickReport { cues, status }
    }

    /// Each bullet takes out the first asteroid it overlaps. Fragments join the
    /// field at once, so later bullets in the same tick can hit them.
    fn resolve_bullet_hits(&mut self, rng: &mut impl Rng, config: &GameConfig, cues: &mut Vec<SoundCue>) {
        let asteroids = &mut self.asteroids;
        let score = &mut self.score;
        self.bullets.retain(|bullet| {
            let Some(index) = asteroids.iter().position(|asteroid| bullet.collides_with(asteroid, config)) else {
                return true;
            };
            let mut struck = asteroids.remove(index);
            debug!("Bullet hit {:?} asteroid of size {}", struck.stage(), struck.size);
            cues.push(SoundCue::Hit);
            let outcome = struck.split(rng, config);
            if outcome.awards_point() {
                *score += 1;
                debug!("Asteroid destroyed. Score: {}", score);
            }
            asteroids.extend(outcome.into_fragments());
            false
        });
    }

    pub fn ship_destroyed(&self, config: &GameConfig) -> bool {
        self.asteroids.iter().any(|asteroid| self.ship.collides_with(asteroid, config))
    }

    pub fn draw(&self, canvas: &mut impl Canvas, config: &GameConfig) {
        self.ship.draw(canvas, config);
        for asteroid in &self.asteroids {
            asteroid.draw(canvas);
        }
        for bullet in &self.bullets {
            bullet.draw(canvas, config);
        }
        draw_hud(canvas, self.score);
    }
}

/// Modal state of the whole program.
#[derive(Clone, Debug)]
pub enum Screen {
    Title,
    Playing(Round),
    GameOver { score: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Blocks until the next tick boundary.
pub struct FrameClock {
    interval: Option<Duration>,
    next_tick: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        FrameClock {
            interval: Some(Duration::from_secs(1) / fps.max(1)),
            next_tick: Instant::now(),
        }
    }

    /// Never sleeps; used for headless runs.
    pub fn unthrottled() -> Self {
        FrameClock { interval: None, next_tick: Instant::now() }
    }

    pub fn wait(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        self.next_tick += interval;
        let now = Instant::now();
        if self.next_tick > now {
            std::thread::sleep(self.next_tick - now);
        } else {
            // Running behind; don't try to catch up with a burst of ticks.
            self.next_tick = now;
        }
    }
}

pub struct Game<R: Rng> {
    config: GameConfig,
    rng: R,
    screen: Screen,
    frame_count: u64,
    max_frames: Option<u64>,
}

impl<R: Rng> Game<R> {
    pub fn new(config: GameConfig, rng: R, max_frames: Option<u64>) -> Self {
        Game {
            config,
            rng,
            screen: Screen::Title,
            frame_count: 0,
            max_frames,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn run(
        &mut self,
        input: &mut impl InputSource,
        canvas: &mut impl Canvas,
        audio: &mut impl AudioSink,
        clock: &mut FrameClock,
    ) -> io::Result<()> {
        while self.max_frames.is_none_or(|max| self.frame_count < max) {
            if self.frame(input, canvas, audio)? == Flow::Quit {
                info!("Quit requested after {} frames.", self.frame_count);
                return Ok(());
            }
            clock.wait();
        }
        info!("Frame limit of {} reached.", self.frame_count);
        Ok(())
    }

    /// One tick: poll input, advance whichever screen is active, draw it.
    pub fn frame(
        &mut self,
        input: &mut impl InputSource,
        canvas: &mut impl Canvas,
        audio: &mut impl AudioSink,
    ) -> io::Result<Flow> {
        let events = input.poll_events()?;
        if events.contains(&InputEvent::Quit) {
            return Ok(Flow::Quit);
        }
        self.frame_count += 1;

        let mut any_key = false;
        let mut shots = 0;
        for event in &events {
            match *event {
                InputEvent::KeyDown(key) => {
                    any_key = true;
                    if key == Key::Fire {
                        shots += 1;
                    }
                }
                InputEvent::Resize { columns, rows } => canvas.resize(columns, rows),
                InputEvent::Quit => {}
            }
        }

        let next = match &mut self.screen {
            Screen::Title | Screen::GameOver { .. } => {
                any_key.then(|| Screen::Playing(Round::new(&mut self.rng, &self.config)))
            }
            Screen::Playing(round) => {
                let tick = TickInput { controls: input.held(), shots };
                let report = round.step(tick, &mut self.rng, &self.config);
                for cue in report.cues {
                    audio.play(cue);
                }
                match report.status {
                    RoundStatus::Over { score } => Some(Screen::GameOver { score }),
                    RoundStatus::Running => None,
                }
            }
        };
        if let Some(screen) = next {
            self.screen = screen;
        }

        self.draw(canvas)?;
        Ok(Flow::Continue)
    }

    fn draw(&self, canvas: &mut impl Canvas) -> io::Result<()> {
        match &self.screen {
            Screen::Title => draw_title_screen(canvas),
            Screen::GameOver { score } => draw_game_over_screen(canvas, *score),
            Screen::Playing(round) => {
                canvas.clear();
                round.draw(canvas, &self.config);
                canvas.present()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2D;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> GameConfig {
        GameConfig::with_playfield(800.0, 600.0)
    }

    fn still_asteroid(x: f64, y: f64, size: u32) -> Asteroid {
        Asteroid {
            position: Vector2D::new(x, y),
            angle: 0.0,
            speed: 0.0,
            size,
            vertices: 5,
            fragment_timer: None,
            has_split: false,
        }
    }

    fn empty_round(config: &GameConfig) -> Round {
        Round {
            ship: Ship::new(config.center()),
            asteroids: Vec::new(),
            bullets: Vec::new(),
            score: 0,
            ticks: 0,
        }
    }

    #[test]
    fn new_round_spawns_whole_asteroids_inside_playfield() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(42);
        let round = Round::new(&mut rng, &config);
        assert_eq!(round.asteroids.len(), 5);
        assert!(round.asteroids.iter().all(|a| a.size == 40 && !a.has_split));
        assert!(round.asteroids.iter().all(|a| a.position.x <= 800.0 && a.position.y <= 600.0));
        assert_eq!(round.score, 0);
        assert_eq!(round.ship.position, config.center());
    }

    #[test]
    fn firing_adds_two_bullets_and_a_cue() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(1);
        let mut round = empty_round(&config);
        let report = round.step(TickInput { shots: 1, ..TickInput::default() }, &mut rng, &config);
        assert_eq!(round.bullets.len(), 2);
        assert_eq!(report.cues, vec![SoundCue::Shoot]);
        assert_eq!(report.status, RoundStatus::Running);
    }

    #[test]
    fn thrust_emits_move_cue() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(1);
        let mut round = empty_round(&config);
        let input = TickInput { controls: Controls { thrust: true, ..Controls::default() }, shots: 0 };
        let report = round.step(input, &mut rng, &config);
        assert_eq!(report.cues, vec![SoundCue::Move]);
    }

    #[test]
    fn bullet_removes_itself_and_the_asteroid_it_hits() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(2);
        let mut round = empty_round(&config);
        round.asteroids.push(still_asteroid(600.0, 100.0, 40));
        round.asteroids.push(still_asteroid(100.0, 500.0, 40));
        round.bullets.push(Bullet::new(Vector2D::new(580.0, 100.0), 0.0, 10.0));

        let report = round.step(TickInput::default(), &mut rng, &config);
        assert!(round.bullets.is_empty());
        assert_eq!(round.asteroids.len(), 3);
        assert_eq!(round.asteroids.iter().filter(|a| a.size == 20).count(), 2);
        assert_eq!(round.score, 0);
        assert_eq!(report.cues, vec![SoundCue::Hit]);
    }

    #[test]
    fn smallest_asteroid_scores_a_point() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(3);
        let mut round = empty_round(&config);
        let mut small = still_asteroid(600.0, 100.0, 10);
        small.fragment_timer = Some(30);
        round.asteroids.push(small);
        round.bullets.push(Bullet::new(Vector2D::new(590.0, 100.0), 0.0, 10.0));

        round.step(TickInput::default(), &mut rng, &config);
        assert!(round.asteroids.is_empty());
        assert_eq!(round.score, 1);
    }

    #[test]
    fn explosion_does_not_score() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(4);
        let mut round = empty_round(&config);
        let mut veteran = still_asteroid(600.0, 100.0, 20);
        veteran.has_split = true;
        round.asteroids.push(veteran);
        round.bullets.push(Bullet::new(Vector2D::new(590.0, 100.0), 0.0, 10.0));

        round.step(TickInput::default(), &mut rng, &config);
        assert_eq!(round.asteroids.len(), 10);
        assert!(round.asteroids.iter().all(|a| a.size == 10 && a.fragment_timer == Some(30)));
        assert_eq!(round.score, 0);
    }

    #[test]
    fn later_bullet_can_hit_fresh_fragments() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut round = empty_round(&config);
        round.asteroids.push(still_asteroid(600.0, 100.0, 40));
        round.bullets.push(Bullet::new(Vector2D::new(590.0, 100.0), 0.0, 0.0));
        round.bullets.push(Bullet::new(Vector2D::new(601.0, 101.0), 0.0, 0.0));

        round.step(TickInput::default(), &mut rng, &config);
        assert!(round.bullets.is_empty());
        // 40 -> two 20s, the second bullet splits one of them into two 10s.
        assert_eq!(round.asteroids.len(), 3);
        assert_eq!(round.asteroids.iter().filter(|a| a.size == 10).count(), 2);
    }

    #[test]
    fn ship_collision_ends_round_with_current_score() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(6);
        let mut round = empty_round(&config);
        round.score = 4;
        round.asteroids.push(still_asteroid(config.center().x + 20.0, config.center().y, 40));
        let report = round.step(TickInput::default(), &mut rng, &config);
        assert_eq!(report.status, RoundStatus::Over { score: 4 });
        assert_eq!(round.score, 4);
    }

    #[test]
    fn unthrottled_clock_returns_immediately() {
        let mut clock = FrameClock::unthrottled();
        let start = Instant::now();
        for _ in 0..1000 {
            clock.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
