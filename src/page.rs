/// Which screen is showing. The premium button fades the main page out and
/// then swaps pages once the fade has run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Page {
    Main,
    Leaving { remaining: f32 },
    Premium { shown_for: f32 },
}

pub(crate) const LEAVE_DELAY: f32 = 1.2;

impl Page {
    /// Only the main page reacts; repeated presses do not restart the fade.
    pub(crate) fn open_premium(&mut self) {
        if *self == Page::Main {
            *self = Page::Leaving {
                remaining: LEAVE_DELAY,
            };
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        match self {
            Page::Main => {}
            Page::Leaving { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    log::info!("navigating to premium page");
                    *self = Page::Premium { shown_for: 0.0 };
                }
            }
            Page::Premium { shown_for } => *shown_for += dt,
        }
    }

    /// Brightness multiplier for the main page during the fade.
    pub(crate) fn dim(&self) -> f32 {
        match self {
            Page::Main => 1.0,
            Page::Leaving { remaining } => (remaining / LEAVE_DELAY).clamp(0.0, 1.0),
            Page::Premium { .. } => 0.0,
        }
    }

    pub(crate) fn is_main(&self) -> bool {
        !matches!(self, Page::Premium { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fades_then_navigates() {
        let mut p = Page::Main;
        p.open_premium();
        assert_eq!(p, Page::Leaving { remaining: 1.2 });
        p.advance(0.6);
        assert!((p.dim() - 0.5).abs() < 1e-4);
        assert!(p.is_main());
        p.advance(0.5);
        assert!(matches!(p, Page::Leaving { .. }));
        p.advance(0.2);
        assert_eq!(p, Page::Premium { shown_for: 0.0 });
        assert!(!p.is_main());
        p.advance(1.0);
        assert_eq!(p, Page::Premium { shown_for: 1.0 });
    }

    #[test]
    fn second_press_does_not_restart() {
        let mut p = Page::Main;
        p.open_premium();
        p.advance(1.0);
        p.open_premium();
        assert!(matches!(p, Page::Leaving { remaining } if remaining < 0.3));
    }
}
