//! Floating label shown while the pointer is over an interactive mark.
//!
//! Entering a mark shows its text with a short fade-in; moving keeps the
//! label next to the pointer; leaving starts a hide timer. Entering another
//! mark (or the same one) before the timer runs out cancels the hide.

use crate::config::TooltipConfig;
use crate::scene::{MarkId, Point, TooltipContent};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Hidden,
    Shown { since: Instant },
    Hiding { since: Instant, hide_at: Instant },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPresenter {
    fade_in: Duration,
    hide_after: Duration,
    phase: Phase,
    mark: Option<MarkId>,
    content: Option<TooltipContent>,
    pointer: Point,
}

impl Default for TooltipPresenter {
    fn default() -> Self {
        Self::new(&TooltipConfig::default())
    }
}

impl TooltipPresenter {
    pub fn new(cfg: &TooltipConfig) -> Self {
        Self {
            fade_in: Duration::from_millis(cfg.fade_in_ms),
            hide_after: Duration::from_millis(cfg.hide_after_ms),
            phase: Phase::Hidden,
            mark: None,
            content: None,
            pointer: (0.0, 0.0),
        }
    }

    pub fn enter(&mut self, mark: MarkId, content: TooltipContent, pointer: Point, now: Instant) {
        let since = match self.phase {
            // Keep the fade progress when moving between marks.
            Phase::Shown { since } | Phase::Hiding { since, .. } => since,
            Phase::Hidden => now,
        };
        self.phase = Phase::Shown { since };
        self.mark = Some(mark);
        self.content = Some(content);
        self.pointer = pointer;
    }

    pub fn move_to(&mut self, pointer: Point) {
        self.pointer = pointer;
    }

    pub fn leave(&mut self, now: Instant) {
        if let Phase::Shown { since } = self.phase {
            self.phase = Phase::Hiding {
                since,
                hide_at: now + self.hide_after,
            };
        }
    }

    /// Drop everything immediately, e.g. when the scene is rebuilt.
    pub fn reset(&mut self) {
        self.phase = Phase::Hidden;
        self.mark = None;
        self.content = None;
    }

    /// Advance timers; returns `true` while an animation is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Hiding { hide_at, .. } if now >= hide_at => {
                self.reset();
                false
            }
            Phase::Hiding { .. } => true,
            Phase::Shown { since } => now < since + self.fade_in,
            Phase::Hidden => false,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, Phase::Hidden)
    }

    pub fn mark(&self) -> Option<MarkId> {
        self.mark.filter(|_| self.is_visible())
    }

    /// 0.0..=1.0 (fade-in; 0.9 is the resting opacity of the label).
    pub fn opacity(&self, now: Instant) -> f32 {
        let since = match self.phase {
            Phase::Hidden => return 0.0,
            Phase::Shown { since } | Phase::Hiding { since, .. } => since,
        };
        if self.fade_in.is_zero() {
            return 0.9;
        }
        let t = now.saturating_duration_since(since).as_secs_f32() / self.fade_in.as_secs_f32();
        0.9 * t.min(1.0)
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref().filter(|_| self.is_visible())
    }

    /// Top-left corner of the label: pointer plus the mark's offset.
    pub fn position(&self) -> Option<Point> {
        self.content().map(|c| {
            (
                self.pointer.0 + c.offset.0 as f64,
                self.pointer.1 + c.offset.1 as f64,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip() -> TooltipContent {
        TooltipContent {
            lines: vec!["Country: A".into()],
            offset: (10, 10),
        }
    }

    #[test]
    fn show_follow_hide() {
        let t0 = Instant::now();
        let mut p = TooltipPresenter::default();
        assert!(!p.is_visible());
        p.enter(MarkId(3), tip(), (100.0, 50.0), t0);
        assert_eq!(p.position(), Some((110.0, 60.0)));
        assert!(p.tick(t0 + Duration::from_millis(100)));
        assert!(p.opacity(t0 + Duration::from_millis(100)) < 0.9);
        assert_eq!(p.opacity(t0 + Duration::from_millis(300)), 0.9);
        p.move_to((120.0, 70.0));
        assert_eq!(p.position(), Some((130.0, 80.0)));
        p.leave(t0 + Duration::from_millis(300));
        assert!(p.tick(t0 + Duration::from_millis(600)));
        assert!(p.is_visible());
        assert!(!p.tick(t0 + Duration::from_millis(800)));
        assert!(!p.is_visible());
        assert_eq!(p.mark(), None);
    }

    #[test]
    fn reentering_cancels_hide() {
        let t0 = Instant::now();
        let mut p = TooltipPresenter::default();
        p.enter(MarkId(1), tip(), (0.0, 0.0), t0);
        p.leave(t0);
        p.enter(MarkId(2), tip(), (0.0, 0.0), t0 + Duration::from_millis(100));
        p.tick(t0 + Duration::from_secs(5));
        assert_eq!(p.mark(), Some(MarkId(2)));
    }
}
