use crate::tween::{Ease, Tween};

pub(crate) const DEFAULT_CAPTIONS: [&str; 10] = [
    "You light up my whole world",
    "You amaze me every single morning",
    "Everything is better with you",
    "Your way of being enchants me every day",
    "You are the most beautiful person I know",
    "You are perfect just the way you are",
    "Every second with you is incredible",
    "You make my heart beat faster",
    "With you everything becomes special",
    "My heart is yours, always",
];

/// Rotating compliment line with a short reveal animation.
pub(crate) struct CaptionCycle {
    lines: Vec<String>,
    index: usize,
    interval: f32,
    clock: f32,
    shown_for: f32,
    alpha: Tween,
    rise: Tween,
}

impl CaptionCycle {
    /// `None` when there is nothing to show.
    pub(crate) fn new(lines: Vec<String>, interval: f32) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }
        Some(Self {
            lines,
            index: 0,
            interval: interval.max(0.1),
            clock: 0.0,
            shown_for: 0.0,
            // first line only fades in
            alpha: Tween::new(0.0, 1.0, 0.9, Ease::Linear),
            rise: Tween::new(0.0, 0.0, 0.9, Ease::Linear),
        })
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn current(&self) -> &str {
        &self.lines[self.index]
    }

    pub(crate) fn alpha(&self) -> f32 {
        self.alpha.value_at(self.shown_for)
    }

    /// Vertical offset in page pixels, easing from 18 to 0.
    pub(crate) fn rise(&self) -> f32 {
        self.rise.value_at(self.shown_for)
    }

    /// Returns true when a new line was brought up.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.clock += dt;
        self.shown_for += dt;
        let mut changed = false;
        while self.clock >= self.interval {
            self.clock -= self.interval;
            self.index = (self.index + 1) % self.lines.len();
            changed = true;
        }
        if changed {
            self.shown_for = self.clock;
            self.alpha = Tween::new(0.0, 1.0, 0.85, Ease::Power2Out);
            self.rise = Tween::new(18.0, 0.0, 0.85, Ease::Power2Out);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn empty_list_is_absent() {
        assert!(CaptionCycle::new(Vec::new(), 4.2).is_none());
    }

    #[test]
    fn advances_on_interval_and_wraps() {
        let mut c = CaptionCycle::new(lines(3), 4.2).unwrap();
        assert_eq!(c.current(), "line 0");
        assert!(!c.advance(4.0));
        assert!(c.advance(0.3));
        assert_eq!(c.index(), 1);
        c.advance(4.2);
        c.advance(4.2);
        assert_eq!(c.current(), "line 0");
    }

    #[test]
    fn first_line_fades_in_without_rising() {
        let mut c = CaptionCycle::new(lines(2), 4.2).unwrap();
        assert_eq!(c.alpha(), 0.0);
        c.advance(0.45);
        assert!((c.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(c.rise(), 0.0);
    }

    #[test]
    fn later_lines_rise_into_place() {
        let mut c = CaptionCycle::new(lines(2), 1.0).unwrap();
        c.advance(1.0);
        assert_eq!(c.rise(), 18.0);
        assert_eq!(c.alpha(), 0.0);
        c.advance(0.9);
        assert_eq!(c.rise(), 0.0);
        assert_eq!(c.alpha(), 1.0);
    }

    #[test]
    fn defaults_are_non_empty() {
        assert!(DEFAULT_CAPTIONS.iter().all(|s| !s.is_empty()));
    }
}
