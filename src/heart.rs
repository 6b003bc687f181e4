use crate::rng::Dice;
use std::f32::consts::PI;

/// Curve extent used when mapping curve units onto a sprite of a given size.
pub(crate) const CURVE_SPAN: f32 = 350.0;

/// Point on the classic parametric heart. Defined for every real `t`;
/// `[-π, π]` traces the outline once.
pub(crate) fn heart_point(t: f32) -> (f32, f32) {
    let x = 160.0 * t.sin().powi(3);
    let y = 130.0 * t.cos() - 50.0 * (2.0 * t).cos() - 20.0 * (3.0 * t).cos()
        - 10.0 * (4.0 * t).cos()
        + 25.0;
    (x, y)
}

/// Initial state for one burst particle, in page coordinates (y grows down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Seed {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BurstShape {
    /// Scales the curve point into the spawn offset from the origin.
    pub(crate) offset_scale: f32,
    /// Outward speed: a curve point of magnitude `CURVE_SPAN` moves this many
    /// page pixels per 60 Hz frame.
    pub(crate) velocity: f32,
    pub(crate) velocity_scale: f32,
}

/// Samples `amount` independent curve points and turns each into an outward
/// radial seed around `origin`.
pub(crate) fn burst(
    dice: &mut impl Dice,
    amount: usize,
    origin: (f32, f32),
    shape: BurstShape,
) -> Vec<Seed> {
    (0..amount)
        .map(|_| {
            let t = PI - 2.0 * PI * dice.unit();
            let (hx, hy) = heart_point(t);
            // flip y: the curve is y-up, the page is y-down
            let (dx, dy) = (hx, -hy);
            let k = shape.velocity / CURVE_SPAN * shape.velocity_scale;
            Seed {
                x: origin.0 + dx * shape.offset_scale,
                y: origin.1 + dy * shape.offset_scale,
                vx: dx * k,
                vy: dy * k,
            }
        })
        .collect()
}

/// Coverage mask of the filled heart, rendered once and stamped at any size.
pub(crate) struct HeartSprite {
    pub(crate) res: usize,
    mask: Vec<bool>,
}

impl HeartSprite {
    pub(crate) fn render(res: usize) -> Self {
        let res = res.max(2);
        let outline = outline(0.02);
        let mut mask = vec![false; res * res];
        let half = res as f32 * 0.5;
        for v in 0..res {
            for u in 0..res {
                // texel centre back into curve units
                let cx = (u as f32 + 0.5 - half) * CURVE_SPAN / res as f32;
                let cy = (half - (v as f32 + 0.5)) * CURVE_SPAN / res as f32;
                mask[v * res + u] = inside(&outline, cx, cy);
            }
        }
        Self { res, mask }
    }

    /// Sample with `u`, `v` in `[0, 1)`.
    pub(crate) fn covers(&self, u: f32, v: f32) -> bool {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return false;
        }
        let x = (u * self.res as f32) as usize;
        let y = (v * self.res as f32) as usize;
        self.mask[y.min(self.res - 1) * self.res + x.min(self.res - 1)]
    }

    #[cfg(test)]
    pub(crate) fn filled(&self) -> usize {
        self.mask.iter().filter(|b| **b).count()
    }
}

fn outline(step: f32) -> Vec<(f32, f32)> {
    let mut pts = Vec::new();
    let mut t = -PI;
    while t < PI {
        pts.push(heart_point(t));
        t += step;
    }
    pts
}

// even-odd rule
fn inside(poly: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut hit = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            hit = !hit;
        }
        j = i;
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Script;
    use proptest::prelude::*;

    #[test]
    fn x_vanishes_on_the_axis() {
        assert_eq!(heart_point(0.0).0, 0.0);
        assert!(heart_point(PI).0.abs() < 1e-5);
        assert!(heart_point(-PI).0.abs() < 1e-5);
    }

    #[test]
    fn known_points() {
        let (_, top) = heart_point(0.0);
        assert!((top - 75.0).abs() < 1e-4);
        let (_, tip) = heart_point(PI);
        assert!((tip + 145.0).abs() < 1e-3);
        let (side, _) = heart_point(PI / 2.0);
        assert!((side - 160.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn mirror_symmetric(t in -PI..PI) {
            let (x1, y1) = heart_point(t);
            let (x2, y2) = heart_point(-t);
            prop_assert!((x1 + x2).abs() < 1e-3);
            prop_assert!((y1 - y2).abs() < 1e-3);
        }

        #[test]
        fn x_is_zero_only_on_the_axis(t in -3.1f32..3.1) {
            prop_assume!(t.abs() > 0.05);
            prop_assert!(heart_point(t).0.abs() > 0.0);
        }
    }

    #[test]
    fn burst_seeds_point_outward() {
        let mut d = Script::new(&[0.1, 0.3, 0.6, 0.85]);
        let shape = BurstShape {
            offset_scale: 1.0,
            velocity: 70.0,
            velocity_scale: 1.0,
        };
        let seeds = burst(&mut d, 4, (100.0, 50.0), shape);
        assert_eq!(seeds.len(), 4);
        for s in &seeds {
            let (dx, dy) = (s.x - 100.0, s.y - 50.0);
            // velocity is the offset scaled by 70/350
            assert!((s.vx - dx * 0.2).abs() < 1e-3);
            assert!((s.vy - dy * 0.2).abs() < 1e-3);
        }
    }

    #[test]
    fn burst_draws_one_value_per_particle() {
        let mut d = Script::constant(0.5);
        let shape = BurstShape {
            offset_scale: 0.12,
            velocity: 70.0,
            velocity_scale: 0.4,
        };
        let seeds = burst(&mut d, 80, (0.0, 0.0), shape);
        assert_eq!(d.draws(), 80);
        // u = 0.5 -> t = 0, the top notch of the heart
        assert!((seeds[0].y + 75.0 * 0.12).abs() < 1e-3);
    }

    #[test]
    fn sprite_is_a_heart() {
        let s = HeartSprite::render(24);
        assert!(s.filled() > 24 * 24 / 4);
        assert!(s.filled() < 24 * 24);
        // centre of the lobes is solid, the corners are empty
        assert!(s.covers(0.3, 0.4));
        assert!(s.covers(0.7, 0.4));
        assert!(!s.covers(0.02, 0.02));
        assert!(!s.covers(0.98, 0.98));
        assert!(!s.covers(1.2, 0.5));
    }
}
