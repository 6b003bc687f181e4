//! Slowly turning star cloud with drifting comets, seen through a
//! perspective camera that leans toward the pointer.

use crate::render::{Layer, Rgb};
use crate::rng::Dice;
use std::f32::consts::TAU;

const STAR_COLOR: Rgb = Rgb::new(255, 255, 255);
const COMET_COLOR: Rgb = Rgb::new(255, 195, 224);
const CLICK_COMET_COLOR: Rgb = Rgb::new(255, 192, 216);

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct V3 {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) z: f32,
}

impl V3 {
    pub(crate) const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn add(self, o: V3) -> V3 {
        V3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }

    fn sub(self, o: V3) -> V3 {
        V3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }

    fn rot_y(self, ang: f32) -> V3 {
        let (s, c) = ang.sin_cos();
        V3::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct BackdropConfig {
    pub(crate) stars: usize,
    pub(crate) comets: usize,
    pub(crate) spin_rate: f32,
    pub(crate) floor: f32,
    pub(crate) click_comet_ttl: f32,
    pub(crate) camera_lag: f32,
    pub(crate) parallax: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            stars: 900,
            comets: 5,
            spin_rate: 0.01,
            floor: -600.0,
            click_comet_ttl: 4.2,
            camera_lag: 0.8,
            parallax: 30.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum CometKind {
    /// Respawns near the top once it falls through the floor.
    Recycled,
    /// Pointer comet, dropped when `remaining` runs out.
    Transient { remaining: f32 },
}

#[derive(Clone, Debug)]
pub(crate) struct Comet {
    pub(crate) head: V3,
    pub(crate) tail: V3,
    /// Translation applied to both endpoints.
    pub(crate) offset: V3,
    pub(crate) speed: f32,
    pub(crate) phase: f32,
    pub(crate) base_opacity: f32,
    pub(crate) opacity: f32,
    pub(crate) kind: CometKind,
    pub(crate) respawns: u32,
}

impl Comet {
    fn random(dice: &mut impl Dice) -> Self {
        let (head, tail) = random_endpoints(dice, 100.0, 600.0);
        Self {
            head,
            tail,
            offset: V3::new(0.0, 0.0, 0.0),
            speed: dice.range(6.0, 18.0),
            phase: dice.unit() * 10.0,
            base_opacity: 0.6,
            opacity: 0.6,
            kind: CometKind::Recycled,
            respawns: 0,
        }
    }

    fn from_pointer(dice: &mut impl Dice, ttl: f32) -> Self {
        let hx = dice.spread(800.0);
        let hy = dice.range(100.0, 700.0);
        Self {
            head: V3::new(hx, hy, 0.0),
            tail: V3::new(hx - 180.0, hy - 80.0, 0.0),
            offset: V3::new(0.0, 0.0, 0.0),
            speed: 14.0,
            phase: 0.0,
            base_opacity: 0.9,
            opacity: 0.9,
            kind: CometKind::Transient { remaining: ttl },
            respawns: 0,
        }
    }

    /// Move back to the top with fresh endpoints; same comet, new path.
    fn reset(&mut self, dice: &mut impl Dice) {
        let (head, tail) = random_endpoints(dice, 200.0, 700.0);
        self.head = head;
        self.tail = tail;
        self.offset.y = 0.0;
        self.respawns += 1;
        log::trace!("comet recycled ({} times)", self.respawns);
    }

    fn world(&self) -> (V3, V3) {
        (self.head.add(self.offset), self.tail.add(self.offset))
    }
}

fn random_endpoints(dice: &mut impl Dice, y_lo: f32, y_hi: f32) -> (V3, V3) {
    let head = V3::new(dice.spread(800.0), dice.range(y_lo, y_hi), dice.spread(400.0));
    let tail = V3::new(
        head.x - dice.range(70.0, 260.0),
        head.y - dice.range(30.0, 160.0),
        head.z + dice.range(-40.0, 40.0),
    );
    (head, tail)
}

#[derive(Clone, Debug)]
pub(crate) struct Camera {
    pub(crate) pos: V3,
    pub(crate) target: (f32, f32),
    pub(crate) fov_deg: f32,
    pub(crate) aspect: f32,
    pub(crate) near: f32,
    pub(crate) far: f32,
}

impl Camera {
    fn new(aspect: f32) -> Self {
        Self {
            pos: V3::new(0.0, 0.0, 250.0),
            target: (0.0, 0.0),
            fov_deg: 60.0,
            aspect,
            near: 0.1,
            far: 2000.0,
        }
    }

    /// Normalised device coordinates and view depth, or `None` when clipped.
    pub(crate) fn project(&self, p: V3) -> Option<(f32, f32, f32)> {
        let v = p.sub(self.pos);
        let depth = -v.z;
        if depth < self.near || depth > self.far {
            return None;
        }
        let f = 1.0 / (self.fov_deg.to_radians() * 0.5).tan();
        let nx = v.x / depth * f / self.aspect;
        let ny = v.y / depth * f;
        Some((nx, ny, depth))
    }
}

pub(crate) struct Backdrop {
    pub(crate) cfg: BackdropConfig,
    pub(crate) stars: Vec<V3>,
    pub(crate) comets: Vec<Comet>,
    pub(crate) camera: Camera,
    pub(crate) elapsed: f32,
}

impl Backdrop {
    /// Decides once whether the terminal can carry the scene.
    pub(crate) fn detect(enabled: bool, colors: u16) -> bool {
        enabled && colors >= 256
    }

    pub(crate) fn new(dice: &mut impl Dice, cfg: BackdropConfig, aspect: f32) -> Self {
        let stars = (0..cfg.stars)
            .map(|_| {
                let r = dice.range(20.0, 900.0);
                let theta = dice.unit() * TAU;
                let phi = dice.range(-1.0, 1.0).acos();
                V3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                )
            })
            .collect();
        let comets = (0..cfg.comets).map(|_| Comet::random(dice)).collect();
        Self {
            cfg,
            stars,
            comets,
            camera: Camera::new(aspect.max(0.01)),
            elapsed: 0.0,
        }
    }

    pub(crate) fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect.max(0.01);
    }

    /// `nx`, `ny` are the pointer's offset from screen centre in `[-0.5, 0.5]`.
    pub(crate) fn steer(&mut self, nx: f32, ny: f32) {
        self.camera.target = (-nx * self.cfg.parallax, ny * self.cfg.parallax);
    }

    pub(crate) fn inject_comet(&mut self, dice: &mut impl Dice) {
        self.comets
            .push(Comet::from_pointer(dice, self.cfg.click_comet_ttl));
    }

    pub(crate) fn rotation(&self) -> f32 {
        self.elapsed * self.cfg.spin_rate
    }

    pub(crate) fn advance(&mut self, dice: &mut impl Dice, dt: f32) {
        self.elapsed += dt;

        // exponential approach, frame-rate independent
        let k = 1.0 - (-dt / self.cfg.camera_lag.max(1e-3)).exp();
        self.camera.pos.x += (self.camera.target.0 - self.camera.pos.x) * k;
        self.camera.pos.y += (self.camera.target.1 - self.camera.pos.y) * k;

        let step = dt * 60.0;
        let floor = self.cfg.floor;
        for c in &mut self.comets {
            c.phase += dt;
            let u = c.phase;
            c.offset.x += (u * 0.8).cos() * 0.2 * (c.speed * 0.02) * step;
            c.offset.y -= 0.6 * (c.speed * 0.02) * step;
            c.opacity = c.base_opacity * (0.9 + 0.1 * (u * 1.3).sin());
            match c.kind {
                CometKind::Transient { ref mut remaining } => *remaining -= dt,
                CometKind::Recycled => {
                    if c.offset.y < floor {
                        c.reset(dice);
                    }
                }
            }
        }
        self.comets
            .retain(|c| !matches!(c.kind, CometKind::Transient { remaining } if remaining <= 0.0));
    }

    /// Page position of a world point on a `w`×`h` page.
    fn to_page(&self, p: V3, w: f32, h: f32) -> Option<(f32, f32, f32)> {
        let (nx, ny, depth) = self.camera.project(p)?;
        if nx.abs() > 1.2 || ny.abs() > 1.2 {
            return None;
        }
        Some(((nx + 1.0) * 0.5 * w, (1.0 - ny) * 0.5 * h, depth))
    }

    pub(crate) fn paint(&self, layer: &mut Layer, page: (f32, f32)) {
        let (w, h) = page;
        let ang = self.rotation();
        for s in &self.stars {
            if let Some((x, y, depth)) = self.to_page(s.rot_y(ang), w, h) {
                let near = (1.0 - depth / self.camera.far).clamp(0.0, 1.0);
                layer.glow(x, y, STAR_COLOR, 0.25 + 0.65 * near * near);
            }
        }
        for c in &self.comets {
            let (a, b) = c.world();
            if let (Some(pa), Some(pb)) = (self.to_page(a, w, h), self.to_page(b, w, h)) {
                let col = match c.kind {
                    CometKind::Recycled => COMET_COLOR,
                    CometKind::Transient { .. } => CLICK_COMET_COLOR,
                };
                layer.line((pa.0, pa.1), (pb.0, pb.1), col, c.opacity);
            }
        }
    }
}
