//! Falling petals. Each petal runs four tracks at once: the fall itself, a
//! horizontal sway, a rotational flutter and a late fade-out.

use crate::render::Rgb;
use crate::rng::Dice;
use crate::tween::{Ease, Tween};

#[derive(Clone, Debug)]
pub(crate) struct PetalConfig {
    pub(crate) cap: usize,
    pub(crate) ambient_chance: f32,
    /// A second draw above this spawns two petals instead of one.
    pub(crate) double_above: f32,
    pub(crate) fall_min: f32,
    pub(crate) fall_max: f32,
    pub(crate) fade_from: f32,
    pub(crate) intro: usize,
    pub(crate) pointer_count: usize,
    pub(crate) jitter_x: f32,
    pub(crate) jitter_y: f32,
    pub(crate) prune_margin: f32,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            cap: 90,
            ambient_chance: 0.018,
            double_above: 0.87,
            fall_min: 5.5,
            fall_max: 11.0,
            fade_from: 0.78,
            intro: 7,
            pointer_count: 10,
            jitter_x: 90.0,
            jitter_y: 60.0,
            prune_margin: 1200.0,
        }
    }
}

/// Optional overrides for a spawn; anything left `None` is randomised.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SpawnAt {
    pub(crate) x: Option<f32>,
    pub(crate) y: Option<f32>,
    pub(crate) size: Option<f32>,
}

#[derive(Clone, Debug)]
pub(crate) struct Petal {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) size: f32,
    pub(crate) color: Rgb,
    pub(crate) age: f32,
    fall_y: Tween,
    fall_x: Tween,
    fall_rot: Tween,
    sway: Tween,
    flutter: Tween,
    fade: Tween,
}

impl Petal {
    #[cfg(test)]
    pub(crate) fn fall_duration(&self) -> f32 {
        self.fall_y.duration
    }

    pub(crate) fn position(&self) -> (f32, f32) {
        let t = self.age;
        (
            self.left + self.fall_x.value_at(t) + self.sway.value_at(t),
            self.top + self.fall_y.value_at(t),
        )
    }

    /// Degrees.
    pub(crate) fn rotation(&self) -> f32 {
        self.fall_rot.value_at(self.age) + self.flutter.value_at(self.age)
    }

    pub(crate) fn opacity(&self) -> f32 {
        self.fade.value_at(self.age)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.fall_y.is_done(self.age)
    }

    pub(crate) fn glyph(&self) -> char {
        const FACES: [char; 4] = ['❀', '✿', '❁', '✾'];
        let quarter = (self.rotation().rem_euclid(360.0) / 90.0) as usize;
        FACES[quarter.min(3)]
    }
}

pub(crate) struct PetalField {
    pub(crate) cfg: PetalConfig,
    pub(crate) petals: Vec<Petal>,
    pub(crate) width: f32,
    pub(crate) height: f32,
    ambient: bool,
}

impl PetalField {
    pub(crate) fn new(cfg: PetalConfig, width: f32, height: f32) -> Self {
        Self {
            cfg,
            petals: Vec::new(),
            width,
            height,
            ambient: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn ambient_enabled(&self) -> bool {
        self.ambient
    }

    /// Hidden pages stop ambient spawning; petals already falling carry on.
    pub(crate) fn set_visible(&mut self, visible: bool) {
        if self.ambient != visible {
            log::debug!("ambient petals {}", if visible { "resumed" } else { "paused" });
        }
        self.ambient = visible;
    }

    /// Returns `None` once the cap is reached; existing petals are never
    /// evicted to make room.
    pub(crate) fn spawn(&mut self, dice: &mut impl Dice, at: SpawnAt) -> Option<&Petal> {
        if self.petals.len() >= self.cfg.cap {
            return None;
        }
        let size = match at.size {
            Some(s) => s,
            None => dice.range(18.0, 58.0),
        };
        let left = match at.x {
            Some(x) => x,
            None => dice.unit() * self.width,
        };
        let top = match at.y {
            Some(y) => y,
            None => -60.0 - dice.unit() * 80.0,
        };
        let end_y = self.height + 140.0 + dice.unit() * 160.0;
        let drift = dice.spread(160.0 + size * 0.6);
        let base_rotate = dice.spread(60.0);
        let spin = dice.spread(360.0);
        let fall = dice.range(self.cfg.fall_min, self.cfg.fall_max);
        let color = Rgb::new(
            255,
            120 + (dice.unit() * 60.0) as u8,
            160 + (dice.unit() * 80.0) as u8,
        );

        let sway_amt = dice.range(12.0, 36.0);
        let sway_dur = dice.range(1.6, 3.2);
        let rot_amt = dice.range(10.0, 32.0);
        let rot_dur = dice.range(0.8, 1.8);
        let rot_sign = if dice.unit() > 0.5 { 1.0 } else { -1.0 };

        self.petals.push(Petal {
            left,
            top,
            size,
            color,
            age: 0.0,
            fall_y: Tween::new(0.0, end_y, fall, Ease::Power1In),
            fall_x: Tween::new(0.0, drift, fall, Ease::Power1In),
            fall_rot: Tween::new(0.0, base_rotate + spin, fall, Ease::Power1In),
            sway: Tween::new(0.0, sway_amt, sway_dur, Ease::SineInOut)
                .delayed(0.02)
                .yoyo((fall / sway_dur).ceil() as u32),
            flutter: Tween::new(0.0, rot_sign * rot_amt, rot_dur, Ease::SineInOut)
                .yoyo((fall / rot_dur).ceil() as u32),
            fade: Tween::new(1.0, 0.0, fall * (1.0 - self.cfg.fade_from), Ease::Power1Out)
                .delayed(fall * self.cfg.fade_from),
        });
        self.petals.last()
    }

    /// Opening flurry.
    pub(crate) fn intro(&mut self, dice: &mut impl Dice) -> usize {
        let mut n = 0;
        for _ in 0..self.cfg.intro {
            let x = dice.unit() * self.width;
            let size = dice.range(20.0, 64.0);
            let at = SpawnAt {
                x: Some(x),
                y: None,
                size: Some(size),
            };
            if self.spawn(dice, at).is_some() {
                n += 1;
            }
        }
        n
    }

    /// One ambient draw per tick; returns how many petals appeared.
    pub(crate) fn ambient_tick(&mut self, dice: &mut impl Dice) -> usize {
        if !self.ambient || !dice.chance(self.cfg.ambient_chance) {
            return 0;
        }
        let count = if dice.unit() > self.cfg.double_above { 2 } else { 1 };
        let mut n = 0;
        for _ in 0..count {
            let size = dice.range(12.0, 58.0);
            let x = dice.unit() * self.width;
            let at = SpawnAt {
                x: Some(x),
                y: None,
                size: Some(size),
            };
            if self.spawn(dice, at).is_some() {
                n += 1;
            }
        }
        n
    }

    /// Cluster of petals around a pointer press.
    pub(crate) fn pointer(&mut self, dice: &mut impl Dice, x: f32, y: f32) -> usize {
        let mut n = 0;
        for _ in 0..self.cfg.pointer_count {
            let jx = x + dice.spread(self.cfg.jitter_x);
            let jy = y + dice.spread(self.cfg.jitter_y) - 60.0;
            let size = dice.range(12.0, 48.0);
            let at = SpawnAt {
                x: Some(jx.clamp(0.0, self.width)),
                y: Some(jy.max(-120.0)),
                size: Some(size),
            };
            if self.spawn(dice, at).is_some() {
                n += 1;
            }
        }
        n
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        for p in &mut self.petals {
            p.age += dt;
        }
        self.petals.retain(|p| !p.is_done());
    }

    /// Drops petals that ended up far outside the new page.
    pub(crate) fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let margin = self.cfg.prune_margin;
        let before = self.petals.len();
        self.petals.retain(|p| {
            let (_, y) = p.position();
            !(y > height + margin || y + p.size < -margin)
        });
        let pruned = before - self.petals.len();
        if pruned > 0 {
            log::debug!("pruned {pruned} stray petals after resize");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Script;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn field() -> PetalField {
        PetalField::new(PetalConfig::default(), 800.0, 600.0)
    }

    #[test]
    fn fall_lasts_between_bounds() {
        let mut f = field();
        for u in [0.0, 0.5, 0.999] {
            let mut d = Script::constant(u);
            let p = f.spawn(&mut d, SpawnAt::default()).cloned().unwrap();
            assert!(p.fall_duration() >= 5.5 && p.fall_duration() < 11.0);
        }
    }

    #[test]
    fn petal_lifecycle() {
        let mut f = field();
        let mut d = Script::constant(0.5);
        let p = f
            .spawn(
                &mut d,
                SpawnAt {
                    x: Some(100.0),
                    y: Some(-60.0),
                    size: Some(30.0),
                },
            )
            .cloned()
            .unwrap();
        // fall = 8.25 s at u = 0.5
        let fall = p.fall_duration();
        assert!((fall - 8.25).abs() < 1e-4);
        assert_eq!(p.position(), (100.0, -60.0));
        assert_eq!(p.opacity(), 1.0);

        f.advance(fall * 0.5);
        let mid = &f.petals[0];
        assert_eq!(mid.opacity(), 1.0);
        assert!(mid.position().1 > -60.0);

        f.advance(fall * 0.4);
        assert!(f.petals[0].opacity() < 1.0);

        f.advance(fall * 0.11);
        assert!(f.petals.is_empty());
    }

    #[test]
    fn fall_accelerates() {
        let mut f = field();
        let mut d = Script::constant(0.5);
        f.spawn(&mut d, SpawnAt::default());
        let fall = f.petals[0].fall_duration();
        let y0 = f.petals[0].position().1;
        f.advance(fall * 0.25);
        let y1 = f.petals[0].position().1;
        f.advance(fall * 0.25);
        let y2 = f.petals[0].position().1;
        assert!(y2 - y1 > y1 - y0);
    }

    #[test]
    fn cap_suppresses_new_spawns() {
        let mut f = field();
        f.cfg.cap = 3;
        let mut d = Script::constant(0.3);
        for _ in 0..3 {
            assert!(f.spawn(&mut d, SpawnAt::default()).is_some());
        }
        let first_left = f.petals[0].left;
        assert!(f.spawn(&mut d, SpawnAt::default()).is_none());
        assert_eq!(f.petals.len(), 3);
        assert_eq!(f.petals[0].left, first_left);
    }

    #[test]
    fn pointer_spawns_ten_with_bounded_jitter() {
        let mut f = field();
        let mut d = Script::new(&[0.0, 0.999, 0.25, 0.75, 0.5, 0.1]);
        let (px, py) = (400.0, 300.0);
        assert_eq!(f.pointer(&mut d, px, py), 10);
        assert_eq!(f.petals.len(), 10);
        for p in &f.petals {
            assert!(p.left >= px - 45.0 && p.left <= px + 45.0);
            assert!(p.top >= py - 90.0 && p.top <= py - 30.0);
            assert!(p.size >= 12.0 && p.size <= 48.0);
        }
    }

    #[test]
    fn pointer_clamps_to_page() {
        let mut f = field();
        let mut d = Script::constant(0.0);
        f.pointer(&mut d, 10.0, -200.0);
        for p in &f.petals {
            assert_eq!(p.left, 0.0);
            assert_eq!(p.top, -120.0);
        }
    }

    #[test]
    fn ambient_draw_spawns_one_or_two() {
        let mut f = field();
        // spawn chance hit, then 0.5 -> single
        let mut d = Script::new(&[0.01, 0.5]);
        assert_eq!(f.ambient_tick(&mut d), 1);

        let mut f = field();
        // chance hit, then 0.9 -> double
        let mut d = Script::new(&[0.01, 0.9]);
        assert_eq!(f.ambient_tick(&mut d), 2);

        let mut f = field();
        let mut d = Script::constant(0.5);
        assert_eq!(f.ambient_tick(&mut d), 0);
        assert_eq!(d.draws(), 1);
    }

    #[test]
    fn hidden_page_pauses_ambient_only() {
        let mut f = field();
        let mut d = Script::constant(0.01);
        f.set_visible(false);
        for _ in 0..100 {
            assert_eq!(f.ambient_tick(&mut d), 0);
        }
        assert!(f.petals.is_empty());
        assert_eq!(d.draws(), 0);

        // pointer still works while hidden
        assert_eq!(f.pointer(&mut d, 50.0, 50.0), 10);
        f.advance(1.0);
        assert_eq!(f.petals.len(), 10);

        f.set_visible(true);
        assert!(f.ambient_enabled());
        assert!(f.ambient_tick(&mut d) > 0);
    }

    #[test]
    fn intro_flurry() {
        let mut f = field();
        let mut d = Script::new(&[0.2, 0.7, 0.4]);
        assert_eq!(f.intro(&mut d), 7);
    }

    #[test]
    fn resize_prunes_strays() {
        let mut f = field();
        let mut d = Script::constant(0.5);
        f.spawn(
            &mut d,
            SpawnAt {
                x: Some(10.0),
                y: Some(5000.0),
                size: Some(20.0),
            },
        );
        f.spawn(&mut d, SpawnAt::default());
        f.resize(800.0, 600.0);
        assert_eq!(f.petals.len(), 1);
        assert_eq!(f.petals[0].top, -100.0);
    }

    #[test]
    fn glyph_follows_rotation() {
        let mut f = field();
        let mut d = Script::constant(0.5);
        f.spawn(&mut d, SpawnAt::default());
        let faces = ['❀', '✿', '❁', '✾'];
        assert!(faces.contains(&f.petals[0].glyph()));
    }

    proptest! {
        #[test]
        fn never_exceeds_cap(
            draws in proptest::collection::vec(0.0f32..1.0, 1..64),
            ticks in 1usize..400,
            cap in 1usize..40,
        ) {
            let mut f = field();
            f.cfg.cap = cap;
            f.cfg.ambient_chance = 0.5;
            let mut d = Script::new(&draws);
            for i in 0..ticks {
                f.ambient_tick(&mut d);
                if i % 37 == 0 {
                    f.pointer(&mut d, 300.0, 200.0);
                }
                prop_assert!(f.petals.len() <= cap);
                f.advance(0.016);
            }
        }
    }
}
