//! Foreground effects: rising heart glyphs, sparks and heart-shaped bursts
//! drawn onto a fading layer.

use crate::heart::{burst, BurstShape, HeartSprite, Seed};
use crate::render::{Layer, Rgb};
use crate::rng::Dice;
use crate::tween::cubic_out;
use std::collections::VecDeque;

const SPARK_COLOR: Rgb = Rgb::new(255, 122, 160);
const HEART_COLOR: Rgb = Rgb::new(255, 45, 45);
const GLYPH_COLOR: Rgb = Rgb::new(255, 105, 180);
const TRAIL_FILL: Rgb = Rgb::new(3, 1, 6);

#[derive(Clone, Debug)]
pub(crate) struct FxConfig {
    pub(crate) heart_cap: usize,
    pub(crate) heart_life: f32,
    pub(crate) heart_velocity: f32,
    /// Acceleration as a multiple of the initial velocity.
    pub(crate) heart_effect: f32,
    pub(crate) heart_size: f32,
    pub(crate) spark_gravity: f32,
    pub(crate) glyph_interval: f32,
    pub(crate) glyph_spark_chance: f32,
    pub(crate) glyph_sparks: usize,
    pub(crate) fade_alpha: f32,
    pub(crate) dt_cap: f32,
    pub(crate) intro_burst: usize,
    pub(crate) click_hearts: usize,
    pub(crate) click_sparks: usize,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            heart_cap: 2200,
            heart_life: 3.6,
            heart_velocity: 70.0,
            heart_effect: -1.3,
            heart_size: 9.0,
            spark_gravity: 0.02,
            glyph_interval: 0.42,
            glyph_spark_chance: 0.06,
            glyph_sparks: 4,
            fade_alpha: 0.08,
            dt_cap: 0.055,
            intro_burst: 120,
            click_hearts: 80,
            click_sparks: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Glyph {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) size: f32,
    pub(crate) speed: f32,
    /// Degrees.
    pub(crate) rot: f32,
}

impl Glyph {
    /// Heart leaning with its rotation.
    pub(crate) fn ch(&self) -> char {
        match (self.rot.rem_euclid(360.0) / 90.0) as u32 {
            0 | 2 => '♥',
            _ => '❥',
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Spark {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) r: f32,
    pub(crate) age: f32,
    pub(crate) life: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct HeartParticle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) ax: f32,
    pub(crate) ay: f32,
    pub(crate) age: f32,
    pub(crate) life: f32,
}

impl HeartParticle {
    fn life_ratio(&self) -> f32 {
        (self.age / self.life).clamp(0.0, 1.0)
    }

    pub(crate) fn size(&self, base: f32) -> f32 {
        base * cubic_out(1.0 - self.life_ratio())
    }

    pub(crate) fn alpha(&self) -> f32 {
        1.0 - self.life_ratio()
    }
}

pub(crate) struct FxSim {
    pub(crate) cfg: FxConfig,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) sparks: Vec<Spark>,
    pub(crate) hearts: VecDeque<HeartParticle>,
    pub(crate) sparkles_enabled: bool,
    glyph_clock: f32,
    sprite: HeartSprite,
}

impl FxSim {
    pub(crate) fn new(cfg: FxConfig, width: f32, height: f32) -> Self {
        Self {
            cfg,
            width,
            height,
            glyphs: Vec::new(),
            sparks: Vec::new(),
            hearts: VecDeque::new(),
            sparkles_enabled: true,
            glyph_clock: 0.0,
            sprite: HeartSprite::render(16),
        }
    }

    pub(crate) fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn spawn_glyph(&mut self, dice: &mut impl Dice) {
        let x = dice.unit() * self.width;
        let size = dice.range(12.0, 40.0);
        let speed = dice.range(0.5, 1.4);
        let rot = dice.unit() * 360.0;
        self.glyphs.push(Glyph {
            x,
            y: self.height + 20.0,
            size,
            speed,
            rot,
        });
    }

    pub(crate) fn emit_sparks(&mut self, dice: &mut impl Dice, x: f32, y: f32, count: usize) {
        if !self.sparkles_enabled {
            return;
        }
        for _ in 0..count {
            let vx = dice.spread(2.6);
            let vy = -dice.range(0.2, 1.4);
            let r = dice.range(0.8, 3.0);
            let life = dice.range(0.6, 1.5);
            self.sparks.push(Spark {
                x,
                y,
                vx,
                vy,
                r,
                age: 0.0,
                life,
            });
        }
    }

    /// Oldest particles beyond the cap are dropped right here, not at tick time.
    pub(crate) fn add_heart(&mut self, seed: Seed) {
        self.hearts.push_back(HeartParticle {
            x: seed.x,
            y: seed.y,
            vx: seed.vx,
            vy: seed.vy,
            ax: seed.vx * self.cfg.heart_effect,
            ay: seed.vy * self.cfg.heart_effect,
            age: 0.0,
            life: self.cfg.heart_life,
        });
        while self.hearts.len() > self.cfg.heart_cap {
            self.hearts.pop_front();
        }
    }

    /// Full-size heart burst around the page centre.
    pub(crate) fn spawn_burst(&mut self, dice: &mut impl Dice, amount: usize) {
        let shape = BurstShape {
            offset_scale: 1.0,
            velocity: self.cfg.heart_velocity,
            velocity_scale: 1.0,
        };
        let origin = (self.width * 0.5, self.height * 0.5);
        for seed in burst(dice, amount, origin, shape) {
            self.add_heart(seed);
        }
    }

    /// Small burst plus sparks at the pointer.
    pub(crate) fn pointer_burst(&mut self, dice: &mut impl Dice, x: f32, y: f32) {
        let shape = BurstShape {
            offset_scale: 0.12,
            velocity: self.cfg.heart_velocity,
            velocity_scale: 0.4,
        };
        for seed in burst(dice, self.cfg.click_hearts, (x, y), shape) {
            self.add_heart(seed);
        }
        self.emit_sparks(dice, x, y, self.cfg.click_sparks);
    }

    /// Integrate every pool by `dt` seconds (clamped).
    pub(crate) fn advance(&mut self, dice: &mut impl Dice, dt: f32) {
        let dt = dt.clamp(0.0, self.cfg.dt_cap);
        let step = dt * 60.0;

        self.glyph_clock += dt;
        while self.glyph_clock >= self.cfg.glyph_interval {
            self.glyph_clock -= self.cfg.glyph_interval;
            self.spawn_glyph(dice);
        }

        let mut emit = Vec::new();
        self.glyphs.retain_mut(|g| {
            g.y -= g.speed * step;
            g.rot += 1.2;
            if dice.chance(self.cfg.glyph_spark_chance) {
                emit.push((g.x, g.y));
            }
            g.y + g.size >= -40.0
        });
        for (x, y) in emit {
            self.emit_sparks(dice, x, y, self.cfg.glyph_sparks);
        }

        let gravity = self.cfg.spark_gravity;
        self.sparks.retain_mut(|s| {
            s.vy += gravity * step;
            s.x += s.vx * step;
            s.y += s.vy * step;
            s.age += dt;
            s.age < s.life
        });

        self.hearts.retain_mut(|p| {
            p.x += p.vx * step;
            p.y += p.vy * step;
            p.vx += p.ax * dt;
            p.vy += p.ay * dt;
            p.age += dt;
            p.age < p.life
        });
    }

    pub(crate) fn paint(&self, layer: &mut Layer) {
        for g in &self.glyphs {
            // faint trail under the text glyph
            layer.splat(g.x, g.y, g.size * 0.12, GLYPH_COLOR, 0.35);
        }
        for s in &self.sparks {
            let alpha = (1.0 - s.age / s.life).clamp(0.0, 1.0);
            layer.splat(s.x, s.y, s.r, SPARK_COLOR, alpha);
        }
        for p in &self.hearts {
            let size = p.size(self.cfg.heart_size);
            layer.stamp(&self.sprite, p.x, p.y, size, HEART_COLOR, p.alpha());
        }
    }

    /// One frame: darken the persistent layer, integrate, draw.
    pub(crate) fn tick(&mut self, dice: &mut impl Dice, dt: f32, layer: &mut Layer) {
        layer.fade(TRAIL_FILL, self.cfg.fade_alpha);
        self.advance(dice, dt);
        self.paint(layer);
    }
}
