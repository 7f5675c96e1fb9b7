use crate::sim::PetAction;
use std::time::Duration;

const BOUNCE_LEG: Duration = Duration::from_millis(800);
const BOUNCE_HEIGHT: f32 = -8.0;
const MOVE_LEG: Duration = Duration::from_millis(600);
const PULSE_LEG: Duration = Duration::from_millis(200);
const WIGGLE_LEG: Duration = Duration::from_millis(300);

pub(crate) const FEED_X: f32 = -40.0;
pub(crate) const SLEEP_X: f32 = 40.0;

fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Endless up/down hop, one leg up then one leg down.
pub(crate) fn bounce_y(t: Duration) -> f32 {
    let leg = BOUNCE_LEG.as_secs_f32();
    let phase = t.as_secs_f32() % (2.0 * leg);
    if phase < leg {
        lerp(0.0, BOUNCE_HEIGHT, ease_in_out(phase / leg))
    } else {
        lerp(BOUNCE_HEIGHT, 0.0, ease_in_out((phase - leg) / leg))
    }
}

#[derive(Clone, Copy, Debug)]
struct Leg {
    to: f32,
    dur: Duration,
}

/// A value driven by a sequence of eased legs. Starting a new sequence
/// picks up from wherever the old one currently is.
#[derive(Clone, Debug)]
pub(crate) struct Track {
    origin: f32,
    start: Duration,
    legs: Vec<Leg>,
}

impl Track {
    fn at_rest(v: f32) -> Self {
        Self {
            origin: v,
            start: Duration::ZERO,
            legs: Vec::new(),
        }
    }

    fn run(&mut self, now: Duration, legs: &[(f32, Duration)]) {
        self.origin = self.value_at(now);
        self.start = now;
        self.legs = legs.iter().map(|&(to, dur)| Leg { to, dur }).collect();
    }

    pub(crate) fn value_at(&self, now: Duration) -> f32 {
        let mut from = self.origin;
        let mut t = now.saturating_sub(self.start);
        for leg in &self.legs {
            if t < leg.dur {
                let k = t.as_secs_f32() / leg.dur.as_secs_f32();
                return lerp(from, leg.to, ease_in_out(k));
            }
            t -= leg.dur;
            from = leg.to;
        }
        from
    }
}

pub(crate) struct Animator {
    now: Duration,
    x: Track,
    scale: Track,
}

impl Animator {
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            x: Track::at_rest(0.0),
            scale: Track::at_rest(1.0),
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    fn move_to(&mut self, x: f32) {
        self.x.run(self.now, &[(x, MOVE_LEG)]);
    }

    fn pulse(&mut self) {
        self.scale.run(self.now, &[(1.1, PULSE_LEG), (1.0, PULSE_LEG)]);
    }

    pub(crate) fn on_started(&mut self, action: PetAction) {
        match action {
            PetAction::Feed => {
                self.move_to(FEED_X);
                self.pulse();
            }
            PetAction::Sleep => self.move_to(SLEEP_X),
            PetAction::Play => {
                self.pulse();
                self.x.run(
                    self.now,
                    &[
                        (-30.0, WIGGLE_LEG),
                        (30.0, WIGGLE_LEG),
                        (-20.0, WIGGLE_LEG),
                        (0.0, WIGGLE_LEG),
                    ],
                );
            }
        }
    }

    pub(crate) fn on_finished(&mut self, action: PetAction) {
        match action {
            PetAction::Feed | PetAction::Sleep => self.move_to(0.0),
            PetAction::Play => {}
        }
    }

    /// Pet offset in design points, x then y.
    pub(crate) fn offset(&self) -> (f32, f32) {
        (self.x.value_at(self.now), bounce_y(self.now))
    }

    pub(crate) fn scale(&self) -> f32 {
        self.scale.value_at(self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn bounce_peaks_and_returns() {
        assert!(close(bounce_y(ms(0)), 0.0));
        assert!(close(bounce_y(ms(800)), -8.0));
        assert!(close(bounce_y(ms(1600)), 0.0));
        assert!(close(bounce_y(ms(2400)), -8.0));
        let mid = bounce_y(ms(400));
        assert!(mid < 0.0 && mid > -8.0);
    }

    #[test]
    fn feed_walks_left_then_home() {
        let mut a = Animator::new();
        a.on_started(PetAction::Feed);
        a.advance(ms(600));
        assert!(close(a.offset().0, FEED_X));
        a.advance(ms(1400));
        a.on_finished(PetAction::Feed);
        a.advance(ms(600));
        assert!(close(a.offset().0, 0.0));
    }

    #[test]
    fn pulse_grows_then_settles() {
        let mut a = Animator::new();
        a.on_started(PetAction::Play);
        a.advance(ms(200));
        assert!(close(a.scale(), 1.1));
        a.advance(ms(200));
        assert!(close(a.scale(), 1.0));
    }

    #[test]
    fn wiggle_hits_each_leg() {
        let mut a = Animator::new();
        a.on_started(PetAction::Play);
        for expect in [-30.0, 30.0, -20.0, 0.0] {
            a.advance(ms(300));
            assert!(close(a.offset().0, expect), "expected {expect}");
        }
    }

    #[test]
    fn new_sequence_starts_from_current_value() {
        let mut a = Animator::new();
        a.on_started(PetAction::Sleep);
        a.advance(ms(300));
        let mid = a.offset().0;
        assert!(mid > 0.0 && mid < SLEEP_X);
        a.on_finished(PetAction::Sleep);
        assert!(close(a.offset().0, mid));
    }
}
