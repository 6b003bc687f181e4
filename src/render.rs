use crate::heart::HeartSprite;
use crossterm::{
    cursor,
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn scale(self, k: f32) -> Self {
        let k = k.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * k) as u8,
            g: (self.g as f32 * k) as u8,
            b: (self.b as f32 * k) as u8,
        }
    }

    pub(crate) fn mix(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        Self {
            r: (self.r as f32 * u + other.r as f32 * t) as u8,
            g: (self.g as f32 * u + other.g as f32 * t) as u8,
            b: (self.b as f32 * u + other.b as f32 * t) as u8,
        }
    }

    pub(crate) fn color(self, enable_color: bool) -> Color {
        if enable_color {
            Color::Rgb {
                r: self.r,
                g: self.g,
                b: self.b,
            }
        } else {
            Color::White
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }

    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                ch: ' ',
                fg: Color::White,
                bg,
            };
        }
    }
}

/// Maps page pixels onto braille dots (2×4 per cell).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) px_per_dot: f32,
}

impl Viewport {
    pub(crate) fn dots(&self) -> (usize, usize) {
        (self.cols as usize * 2, self.rows as usize * 4)
    }

    /// Page size in logical pixels.
    pub(crate) fn page(&self) -> (f32, f32) {
        let (w, h) = self.dots();
        (w as f32 * self.px_per_dot, h as f32 * self.px_per_dot)
    }

    /// Centre of a terminal cell in page pixels.
    pub(crate) fn cell_to_page(&self, col: u16, row: u16) -> (f32, f32) {
        (
            (col as f32 + 0.5) * 2.0 * self.px_per_dot,
            (row as f32 + 0.5) * 4.0 * self.px_per_dot,
        )
    }

    pub(crate) fn page_to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let cx = (x / (2.0 * self.px_per_dot)).floor();
        let cy = (y / (4.0 * self.px_per_dot)).floor();
        if cx < 0.0 || cy < 0.0 || cx >= self.cols as f32 || cy >= self.rows as f32 {
            return None;
        }
        Some((cx as u16, cy as u16))
    }
}

/// Float RGB drawing surface at dot resolution, addressed in page pixels.
pub(crate) struct Layer {
    pub(crate) w: usize,
    pub(crate) h: usize,
    scale: f32,
    px: Vec<[f32; 3]>,
}

impl Layer {
    pub(crate) fn new(vp: Viewport) -> Self {
        let (w, h) = vp.dots();
        Self {
            w,
            h,
            scale: vp.px_per_dot.max(0.1),
            px: vec![[0.0; 3]; w * h],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.px.fill([0.0; 3]);
    }

    /// Composite a translucent fill over the whole surface.
    pub(crate) fn fade(&mut self, toward: Rgb, alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let t = [toward.r as f32, toward.g as f32, toward.b as f32];
        for p in &mut self.px {
            for c in 0..3 {
                p[c] += (t[c] - p[c]) * a;
            }
        }
    }

    pub(crate) fn sample(&self, dx: usize, dy: usize) -> [f32; 3] {
        if dx < self.w && dy < self.h {
            self.px[dy * self.w + dx]
        } else {
            [0.0; 3]
        }
    }

    fn blend_dot(&mut self, dx: i32, dy: i32, col: Rgb, alpha: f32) {
        if dx < 0 || dy < 0 || dx as usize >= self.w || dy as usize >= self.h {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let p = &mut self.px[dy as usize * self.w + dx as usize];
        let s = [col.r as f32, col.g as f32, col.b as f32];
        for c in 0..3 {
            p[c] += (s[c] - p[c]) * a;
        }
    }

    fn add_dot(&mut self, dx: i32, dy: i32, col: Rgb, gain: f32) {
        if dx < 0 || dy < 0 || dx as usize >= self.w || dy as usize >= self.h {
            return;
        }
        let p = &mut self.px[dy as usize * self.w + dx as usize];
        p[0] = (p[0] + col.r as f32 * gain).min(255.0);
        p[1] = (p[1] + col.g as f32 * gain).min(255.0);
        p[2] = (p[2] + col.b as f32 * gain).min(255.0);
    }

    /// Filled disc of `radius` page pixels (at least one dot).
    pub(crate) fn splat(&mut self, x: f32, y: f32, radius: f32, col: Rgb, alpha: f32) {
        let cx = x / self.scale;
        let cy = y / self.scale;
        let r = (radius / self.scale).max(0.5);
        let r2 = r * r;
        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;
        let mut hit = false;
        for dy in y0..=y1 {
            for dx in x0..=x1 {
                let ox = dx as f32 + 0.5 - cx;
                let oy = dy as f32 + 0.5 - cy;
                if ox * ox + oy * oy <= r2 {
                    self.blend_dot(dx, dy, col, alpha);
                    hit = true;
                }
            }
        }
        if !hit {
            self.blend_dot(cx.floor() as i32, cy.floor() as i32, col, alpha);
        }
    }

    /// Additive point, used for stars.
    pub(crate) fn glow(&mut self, x: f32, y: f32, col: Rgb, gain: f32) {
        self.add_dot(
            (x / self.scale).floor() as i32,
            (y / self.scale).floor() as i32,
            col,
            gain,
        );
    }

    /// Additive line, stepped at roughly one sample per dot.
    pub(crate) fn line(&mut self, a: (f32, f32), b: (f32, f32), col: Rgb, gain: f32) {
        let (ax, ay) = (a.0 / self.scale, a.1 / self.scale);
        let (bx, by) = (b.0 / self.scale, b.1 / self.scale);
        let len = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
        let steps = (len.ceil() as usize).clamp(1, 4096);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            // head bright, tail fading
            let fade = 1.0 - t * 0.8;
            self.add_dot(
                (ax + (bx - ax) * t).floor() as i32,
                (ay + (by - ay) * t).floor() as i32,
                col,
                gain * fade,
            );
        }
    }

    /// Draw `sprite` centred on `(x, y)` with a side of `size` page pixels.
    pub(crate) fn stamp(
        &mut self,
        sprite: &HeartSprite,
        x: f32,
        y: f32,
        size: f32,
        col: Rgb,
        alpha: f32,
    ) {
        let side = size / self.scale;
        if side <= 0.0 || alpha <= 0.0 {
            return;
        }
        if side < 1.0 {
            // too small to show a shape
            self.blend_dot(
                (x / self.scale).floor() as i32,
                (y / self.scale).floor() as i32,
                col,
                alpha * side,
            );
            return;
        }
        let left = x / self.scale - side * 0.5;
        let top = y / self.scale - side * 0.5;
        let x0 = left.floor() as i32;
        let y0 = top.floor() as i32;
        let n = side.ceil() as i32 + 1;
        for dy in y0..y0 + n {
            for dx in x0..x0 + n {
                let u = (dx as f32 + 0.5 - left) / side;
                let v = (dy as f32 + 0.5 - top) / side;
                if sprite.covers(u, v) {
                    self.blend_dot(dx, dy, col, alpha);
                }
            }
        }
    }
}

/* -----------------------------
   Braille composition
------------------------------ */

fn braille_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

const INK_THRESHOLD: f32 = 28.0;

/// Adds `sky` and `fx` per dot and writes braille cells. `dim` scales the
/// final colours (page transitions).
pub(crate) fn compose(
    sky: &Layer,
    fx: &Layer,
    out: &mut CellBuffer,
    bg: Color,
    enable_color: bool,
    dim: f32,
) {
    for cy in 0..out.h as usize {
        for cx in 0..out.w as usize {
            let mut mask = 0u8;
            let mut sum = [0.0f32; 3];
            let mut ink = 0u32;
            for dy in 0..4 {
                for dx in 0..2 {
                    let (x, y) = (cx * 2 + dx, cy * 4 + dy);
                    let a = sky.sample(x, y);
                    let b = fx.sample(x, y);
                    let p = [
                        (a[0] + b[0]).min(255.0),
                        (a[1] + b[1]).min(255.0),
                        (a[2] + b[2]).min(255.0),
                    ];
                    if p[0].max(p[1]).max(p[2]) >= INK_THRESHOLD {
                        mask |= braille_bit(dx, dy);
                        for c in 0..3 {
                            sum[c] += p[c];
                        }
                        ink += 1;
                    }
                }
            }
            if mask == 0 {
                out.set(
                    cx as u16,
                    cy as u16,
                    Cell {
                        ch: ' ',
                        fg: Color::White,
                        bg,
                    },
                );
                continue;
            }
            let n = ink as f32;
            let rgb = Rgb::new(
                (sum[0] / n) as u8,
                (sum[1] / n) as u8,
                (sum[2] / n) as u8,
            )
            .scale(dim);
            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            out.set(
                cx as u16,
                cy as u16,
                Cell {
                    ch,
                    fg: rgb.color(enable_color),
                    bg,
                },
            );
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    let mut xx = x;
    for ch in s.chars() {
        if xx >= buf.w {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
        xx = xx.saturating_add(1);
    }
}

pub(crate) fn draw_centered(buf: &mut CellBuffer, y: u16, s: &str, fg: Color, bg: Color) {
    let len = s.chars().count() as u16;
    let x = buf.w.saturating_sub(len) / 2;
    draw_text(buf, x, y, s, fg, bg);
}

/* -----------------------------
   Terminal lifecycle
------------------------------ */

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin(cols: u16, rows: u16) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableMouseCapture,
            EnableFocusChange,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            DisableFocusChange,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows);
        self.cur = CellBuffer::new(cols, rows);
        // force a full repaint on the next present
        for c in &mut self.prev.cells {
            c.ch = '\0';
        }
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}
