use crate::audio::{AudioToggle, CommandPlayer};
use crate::backdrop::{Backdrop, BackdropConfig};
use crate::captions::CaptionCycle;
use crate::config::Settings;
use crate::error::InitError;
use crate::fx::{FxConfig, FxSim};
use crate::heart::HeartSprite;
use crate::input::{collect_input_nonblocking, map_event, Action};
use crate::page::Page;
use crate::petals::{PetalConfig, PetalField};
use crate::render::{compose, draw_centered, draw_text, Cell, Layer, Rgb, Terminal, Viewport};
use crate::rng;
use crossterm::{style, terminal, tty::IsTty};
use rand::rngs::StdRng;
use std::f32::consts::TAU;
use std::io;
use std::time::{Duration, Instant};

const MIN_COLS: u16 = 24;
const MIN_ROWS: u16 = 10;

/// Seconds before the opening heart burst.
const INTRO_BURST_AT: f32 = 0.6;

const BACKGROUND: Rgb = Rgb::new(3, 1, 6);
const GLYPH_PINK: Rgb = Rgb::new(255, 105, 180);
const CAPTION_COLOR: Rgb = Rgb::new(255, 214, 232);
const HUD_COLOR: Rgb = Rgb::new(150, 110, 135);
const PREMIUM_HEART: Rgb = Rgb::new(255, 45, 85);

const DEDICATION: &str = "For you, every heartbeat of this page.";
const HINTS: &str = "click/space hearts · m music · s sparkles · p premium · q quit";

pub(crate) struct App {
    settings: Settings,
    term: Terminal,
    vp: Viewport,
    dice: StdRng,
    sky: Layer,
    trails: Layer,
    fx: FxSim,
    petals: PetalField,
    backdrop: Option<Backdrop>,
    captions: Option<CaptionCycle>,
    audio: Option<AudioToggle<CommandPlayer>>,
    page: Page,
    big_heart: HeartSprite,
    intro_burst_in: Option<f32>,
    should_quit: bool,
}

/// The core drawing surface: an interactive terminal with room to draw.
fn check_surface() -> Result<(u16, u16), InitError> {
    if !io::stdout().is_tty() {
        return Err(InitError::NotATerminal);
    }
    let (cols, rows) = terminal::size().map_err(InitError::Size)?;
    if cols < MIN_COLS || rows < MIN_ROWS {
        return Err(InitError::TooSmall {
            cols,
            rows,
            min_cols: MIN_COLS,
            min_rows: MIN_ROWS,
        });
    }
    Ok((cols, rows))
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let (cols, rows) = match check_surface() {
            Ok(size) => size,
            Err(e) => {
                log::error!("cannot start: {e}");
                return Err(e.into());
            }
        };

        let mut dice = rng::seeded(settings.seed);
        let vp = Viewport {
            cols,
            rows,
            px_per_dot: settings.px_per_dot,
        };
        let (w, h) = vp.page();

        let mut fx = FxSim::new(FxConfig::default(), w, h);
        fx.sparkles_enabled = settings.sparkles;

        let mut petals = PetalField::new(PetalConfig::default(), w, h);
        let opened = petals.intro(&mut dice);
        log::debug!("{opened} opening petals");

        let colors = style::available_color_count();
        let backdrop = if Backdrop::detect(settings.backdrop, colors) {
            Some(Backdrop::new(&mut dice, BackdropConfig::default(), w / h))
        } else {
            log::info!("star backdrop off (enabled: {}, colours: {colors})", settings.backdrop);
            None
        };

        let captions = CaptionCycle::new(settings.captions.clone(), settings.caption_interval);
        if captions.is_none() {
            log::info!("no captions configured");
        }

        let audio = match settings.audio_command.as_deref() {
            Some(cmd) => match CommandPlayer::parse(cmd) {
                Ok(player) => Some(AudioToggle::new(player)),
                Err(e) => {
                    log::warn!("music disabled: {e}");
                    None
                }
            },
            None => None,
        };

        let term = Terminal::begin(cols, rows)?;

        Ok(Self {
            settings,
            term,
            vp,
            dice,
            sky: Layer::new(vp),
            trails: Layer::new(vp),
            fx,
            petals,
            backdrop,
            captions,
            audio,
            page: Page::Main,
            big_heart: HeartSprite::render(64),
            intro_burst_in: Some(INTRO_BURST_AT),
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);
        let mut last_frame = Instant::now();

        while !self.should_quit {
            let frame_start = Instant::now();

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event(&ev) {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            let now = Instant::now();
            let dt = now
                .saturating_duration_since(last_frame)
                .as_secs_f32()
                .min(self.fx.cfg.dt_cap);
            last_frame = now;

            self.update(dt);
            self.render_frame()?;

            spin_sleep(frame_dt, frame_start);
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Click { col, row } => {
                let (x, y) = self.vp.cell_to_page(col, row);
                self.click(x, y);
            }
            Action::ClickCentre => {
                let (w, h) = self.vp.page();
                self.click(w * 0.5, h * 0.5);
            }
            Action::Pointer { col, row } => {
                if let Some(b) = self.backdrop.as_mut() {
                    let (x, y) = self.vp.cell_to_page(col, row);
                    let (w, h) = self.vp.page();
                    b.steer(x / w - 0.5, y / h - 0.5);
                }
            }
            Action::ToggleAudio => {
                if let Some(a) = self.audio.as_mut() {
                    a.toggle();
                }
            }
            Action::OpenPremium => self.page.open_premium(),
            Action::ToggleSparkles => {
                self.fx.sparkles_enabled = !self.fx.sparkles_enabled;
            }
            Action::Visibility(visible) => self.petals.set_visible(visible),
            Action::Resize { cols, rows } => self.resize(cols, rows),
        }
    }

    fn click(&mut self, x: f32, y: f32) {
        if self.page != Page::Main {
            return;
        }
        self.fx.pointer_burst(&mut self.dice, x, y);
        self.petals.pointer(&mut self.dice, x, y);
        if let Some(b) = self.backdrop.as_mut() {
            b.inject_comet(&mut self.dice);
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        if cols == 0 || rows == 0 {
            return;
        }
        log::debug!("resize to {cols}x{rows}");
        self.term.resize(cols, rows);
        self.vp = Viewport {
            cols,
            rows,
            px_per_dot: self.settings.px_per_dot,
        };
        self.sky = Layer::new(self.vp);
        self.trails = Layer::new(self.vp);
        let (w, h) = self.vp.page();
        self.fx.resize(w, h);
        self.petals.resize(w, h);
        if let Some(b) = self.backdrop.as_mut() {
            b.set_aspect(w / h);
        }
    }

    fn update(&mut self, dt: f32) {
        self.page.advance(dt);
        if !self.page.is_main() {
            return;
        }

        if let Some(left) = self.intro_burst_in.as_mut() {
            *left -= dt;
            if *left <= 0.0 {
                self.intro_burst_in = None;
                let amount = self.fx.cfg.intro_burst;
                self.fx.spawn_burst(&mut self.dice, amount);
            }
        }

        self.petals.ambient_tick(&mut self.dice);
        self.petals.advance(dt);

        if let Some(b) = self.backdrop.as_mut() {
            b.advance(&mut self.dice, dt);
        }

        if let Some(c) = self.captions.as_mut() {
            if c.advance(dt) {
                log::trace!("caption {}", c.index());
            }
        }

        self.fx.tick(&mut self.dice, dt, &mut self.trails);
    }

    fn background(&self) -> style::Color {
        if self.settings.enable_color {
            BACKGROUND.color(true)
        } else {
            style::Color::Reset
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = self.background();
        self.term.cur.clear(bg);

        match self.page {
            Page::Premium { shown_for } => self.draw_premium(shown_for, bg),
            _ => self.draw_main(bg),
        }

        self.term.present()?;
        Ok(())
    }

    fn draw_main(&mut self, bg: style::Color) {
        let color = self.settings.enable_color;
        let dim = self.page.dim();

        self.sky.clear();
        if let Some(b) = &self.backdrop {
            b.paint(&mut self.sky, self.vp.page());
        }
        compose(&self.sky, &self.trails, &mut self.term.cur, bg, color, dim);

        for g in &self.fx.glyphs {
            if let Some((cx, cy)) = self.vp.page_to_cell(g.x, g.y) {
                let cell = Cell {
                    ch: g.ch(),
                    fg: GLYPH_PINK.scale(dim).color(color),
                    bg,
                };
                self.term.cur.set(cx, cy, cell);
            }
        }

        for p in &self.petals.petals {
            let (x, y) = p.position();
            if let Some((cx, cy)) = self.vp.page_to_cell(x, y) {
                let fg = p.color.mix(BACKGROUND, 1.0 - p.opacity()).scale(dim);
                let cell = Cell {
                    ch: p.glyph(),
                    fg: fg.color(color),
                    bg,
                };
                self.term.cur.set(cx, cy, cell);
            }
        }

        let rows = self.term.rows;
        if let Some(c) = &self.captions {
            let lift = (c.rise() / (4.0 * self.vp.px_per_dot)).round() as u16;
            let fg = CAPTION_COLOR.mix(BACKGROUND, 1.0 - c.alpha()).scale(dim);
            draw_centered(
                &mut self.term.cur,
                rows.saturating_sub(4).saturating_add(lift).min(rows - 1),
                c.current(),
                fg.color(color),
                bg,
            );
        }

        let hud = HUD_COLOR.scale(dim).color(color);
        if let Some(a) = &self.audio {
            let label = a.label();
            let x = self.term.cols.saturating_sub(label.chars().count() as u16 + 1);
            draw_text(&mut self.term.cur, x, 0, label, hud, bg);
        }
        draw_text(&mut self.term.cur, 1, rows - 1, HINTS, hud, bg);
    }

    fn draw_premium(&mut self, shown_for: f32, bg: style::Color) {
        let color = self.settings.enable_color;
        let (w, h) = self.vp.page();
        // beat twice a second
        let pulse = 1.0 + 0.08 * (shown_for * TAU * 2.0).sin().max(0.0);
        let size = w.min(h) * 0.6 * pulse;

        self.sky.clear();
        self.trails.clear();
        self.sky
            .stamp(&self.big_heart, w * 0.5, h * 0.45, size, PREMIUM_HEART, 1.0);
        let fade_in = (shown_for / 0.8).clamp(0.0, 1.0);
        compose(&self.sky, &self.trails, &mut self.term.cur, bg, color, fade_in);

        let rows = self.term.rows;
        let fg = CAPTION_COLOR.scale(fade_in).color(color);
        draw_centered(&mut self.term.cur, rows.saturating_sub(3), DEDICATION, fg, bg);
        let hud = HUD_COLOR.scale(fade_in).color(color);
        draw_centered(&mut self.term.cur, rows - 1, "q quit", hud, bg);
    }
}

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    let mut app = App::init(settings)?;
    let result = app.run();
    // restore the terminal even if the loop failed
    app.term.end()?;
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
