use std::f32::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ease {
    Linear,
    /// Quadratic ease-in ("accelerates over time").
    Power1In,
    Power1Out,
    /// Cubic ease-out.
    Power2Out,
    SineInOut,
}

impl Ease {
    pub(crate) fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1In => t * t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power2Out => cubic_out(t),
            Ease::SineInOut => -((PI * t).cos() - 1.0) * 0.5,
        }
    }
}

pub(crate) fn cubic_out(t: f32) -> f32 {
    let u = t - 1.0;
    u * u * u + 1.0
}

/// One animated scalar track.
///
/// `repeat` counts extra plays after the first; with `yoyo` every odd play
/// runs backwards.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tween {
    pub(crate) from: f32,
    pub(crate) to: f32,
    pub(crate) delay: f32,
    pub(crate) duration: f32,
    pub(crate) ease: Ease,
    pub(crate) repeat: u32,
    pub(crate) yoyo: bool,
}

impl Tween {
    pub(crate) fn new(from: f32, to: f32, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            delay: 0.0,
            duration,
            ease,
            repeat: 0,
            yoyo: false,
        }
    }

    pub(crate) fn delayed(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub(crate) fn yoyo(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self.yoyo = true;
        self
    }

    pub(crate) fn total(&self) -> f32 {
        self.delay + self.duration * (self.repeat as f32 + 1.0)
    }

    pub(crate) fn is_done(&self, elapsed: f32) -> bool {
        elapsed >= self.total()
    }

    pub(crate) fn value_at(&self, elapsed: f32) -> f32 {
        let local = elapsed - self.delay;
        if local <= 0.0 {
            return self.from;
        }
        if self.duration <= 0.0 || elapsed >= self.total() {
            return self.lerp(self.progress_of_play(self.repeat, 1.0));
        }
        let play = ((local / self.duration).floor() as u32).min(self.repeat);
        let within = ((local - play as f32 * self.duration) / self.duration).clamp(0.0, 1.0);
        self.lerp(self.progress_of_play(play, within))
    }

    fn progress_of_play(&self, play: u32, within: f32) -> f32 {
        if self.yoyo && play % 2 == 1 {
            self.ease.apply(1.0 - within)
        } else {
            self.ease.apply(within)
        }
    }

    fn lerp(&self, k: f32) -> f32 {
        self.from + (self.to - self.from) * k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn eases_pin_endpoints() {
        for e in [
            Ease::Linear,
            Ease::Power1In,
            Ease::Power1Out,
            Ease::Power2Out,
            Ease::SineInOut,
        ] {
            assert!(close(e.apply(0.0), 0.0), "{e:?}");
            assert!(close(e.apply(1.0), 1.0), "{e:?}");
        }
        assert!(Ease::Power1In.apply(0.5) < 0.5);
        assert!(Ease::Power2Out.apply(0.5) > 0.5);
    }

    #[test]
    fn delay_holds_start_value() {
        let t = Tween::new(1.0, 0.0, 2.0, Ease::Linear).delayed(3.0);
        assert_eq!(t.value_at(0.0), 1.0);
        assert_eq!(t.value_at(2.9), 1.0);
        assert!(close(t.value_at(4.0), 0.5));
        assert_eq!(t.value_at(5.0), 0.0);
        assert!(t.is_done(5.0));
        assert!(!t.is_done(4.99));
    }

    #[test]
    fn yoyo_swings_back() {
        let t = Tween::new(0.0, 10.0, 1.0, Ease::Linear).yoyo(2);
        assert!(close(t.value_at(0.5), 5.0));
        assert!(close(t.value_at(1.0), 10.0));
        assert!(close(t.value_at(1.25), 7.5));
        assert!(close(t.value_at(2.5), 5.0));
        // three plays: forward, back, forward
        assert_eq!(t.total(), 3.0);
        assert!(close(t.value_at(10.0), 10.0));
    }

    #[test]
    fn odd_yoyo_rests_at_origin() {
        let t = Tween::new(0.0, 4.0, 0.5, Ease::SineInOut).yoyo(1);
        assert!(close(t.value_at(1.0), 0.0));
    }
}
