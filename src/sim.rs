use crate::model::{
    lower, raise, Activity, Mood, PetState, FEED_COST, FEED_HUNGER, LOW_STAT, PLAY_ENERGY_COST,
    PLAY_HEALTH, PLAY_MIN_ENERGY, PLAY_REWARD, SLEEP_ENERGY, SLEEP_HEALTH,
};
use crate::sched::{Scheduler, TaskId};
use log::{debug, info};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PetAction {
    Feed,
    Sleep,
    Play,
}

impl PetAction {
    fn activity(self) -> Activity {
        match self {
            PetAction::Feed => Activity::Eating,
            PetAction::Sleep => Activity::Sleeping,
            PetAction::Play => Activity::Playing,
        }
    }
}

/// How long each activity runs before its effect lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Timings {
    pub(crate) feed: Duration,
    pub(crate) sleep: Duration,
    pub(crate) play: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            feed: Duration::from_millis(2000),
            sleep: Duration::from_millis(3000),
            play: Duration::from_millis(1500),
        }
    }
}

impl Timings {
    fn delay(&self, action: PetAction) -> Duration {
        match action {
            PetAction::Feed => self.feed,
            PetAction::Sleep => self.sleep,
            PetAction::Play => self.play,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ignored {
    Busy(Activity),
    NotEnoughCoins,
    TooTired,
}

impl Ignored {
    /// Short line shown under the buttons after a refused press.
    pub(crate) fn hint(self) -> &'static str {
        match self {
            Ignored::Busy(Activity::Sleeping) => "Shh... sta dormendo",
            Ignored::Busy(_) => "Un attimo...",
            Ignored::NotEnoughCoins => "Servono 5 monete",
            Ignored::TooTired => "Troppo stanco per giocare",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Started(Activity),
    Ignored(Ignored),
}

#[derive(Clone, Copy, Debug)]
struct Running {
    task: TaskId,
    started: Duration,
    delay: Duration,
}

/// Owns the pet and every pending activity completion.
///
/// Completions live in the controller's own [`Scheduler`]; once the
/// controller is gone nothing can touch the state again.
pub(crate) struct PetController {
    state: PetState,
    timings: Timings,
    sched: Scheduler<PetAction>,
    running: Option<Running>,
}

impl PetController {
    pub(crate) fn new(timings: Timings) -> Self {
        Self::with_state(PetState::default(), timings)
    }

    pub(crate) fn with_state(state: PetState, timings: Timings) -> Self {
        Self {
            state,
            timings,
            sched: Scheduler::new(),
            running: None,
        }
    }

    pub(crate) fn snapshot(&self) -> PetState {
        self.state
    }

    pub(crate) fn busy(&self) -> bool {
        !self.state.is_idle()
    }

    pub(crate) fn mood(&self) -> Mood {
        derive_mood(&self.state)
    }

    pub(crate) fn feed(&mut self) -> Outcome {
        self.start(PetAction::Feed)
    }

    pub(crate) fn sleep(&mut self) -> Outcome {
        self.start(PetAction::Sleep)
    }

    pub(crate) fn play(&mut self) -> Outcome {
        self.start(PetAction::Play)
    }

    pub(crate) fn apply(&mut self, action: PetAction) -> Outcome {
        match action {
            PetAction::Feed => self.feed(),
            PetAction::Sleep => self.sleep(),
            PetAction::Play => self.play(),
        }
    }

    fn start(&mut self, action: PetAction) -> Outcome {
        if let Err(why) = self.check(action) {
            debug!("{action:?} ignored: {why:?}");
            return Outcome::Ignored(why);
        }

        // The guard flips before the timer is armed, so a second press in
        // the same input batch sees a busy pet.
        let activity = action.activity();
        self.state.activity = activity;

        let delay = self.timings.delay(action);
        let task = self.sched.schedule(delay, action);
        self.running = Some(Running {
            task,
            started: self.sched.now(),
            delay,
        });
        info!("{action:?} started, done in {}ms", delay.as_millis());
        Outcome::Started(activity)
    }

    fn check(&self, action: PetAction) -> Result<(), Ignored> {
        if !self.state.is_idle() {
            return Err(Ignored::Busy(self.state.activity));
        }
        match action {
            PetAction::Feed if self.state.coins < FEED_COST => Err(Ignored::NotEnoughCoins),
            PetAction::Play if self.state.energy < PLAY_MIN_ENERGY => Err(Ignored::TooTired),
            _ => Ok(()),
        }
    }

    /// Advance the clock by `dt` and land every completion that came due.
    /// Returns the actions that finished, in the order they finished.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<PetAction> {
        let done = self.sched.advance(dt);
        for action in &done {
            self.complete(*action);
        }
        done
    }

    fn complete(&mut self, action: PetAction) {
        let s = &mut self.state;
        match action {
            PetAction::Feed => {
                s.hunger = raise(s.hunger, FEED_HUNGER);
                s.coins = s.coins.saturating_sub(FEED_COST);
            }
            PetAction::Sleep => {
                s.energy = raise(s.energy, SLEEP_ENERGY);
                s.health = raise(s.health, SLEEP_HEALTH);
            }
            PetAction::Play => {
                s.energy = lower(s.energy, PLAY_ENERGY_COST);
                s.health = raise(s.health, PLAY_HEALTH);
                s.coins = s.coins.saturating_add(PLAY_REWARD);
            }
        }
        s.activity = Activity::Idle;
        self.running = None;
        info!(
            "{action:?} done: coins={} health={} hunger={} energy={}",
            s.coins, s.health, s.hunger, s.energy
        );
    }

    /// Fraction of the running activity already elapsed, `None` when idle.
    pub(crate) fn activity_progress(&self) -> Option<f32> {
        let r = self.running?;
        if r.delay.is_zero() {
            return Some(1.0);
        }
        let elapsed = self.sched.now().saturating_sub(r.started);
        Some((elapsed.as_secs_f32() / r.delay.as_secs_f32()).clamp(0.0, 1.0))
    }

    /// Drop the pending completion without applying it. The pet goes back
    /// to idle with its stats untouched.
    pub(crate) fn cancel(&mut self) -> bool {
        let Some(r) = self.running.take() else {
            return false;
        };
        self.sched.cancel(r.task);
        self.state.activity = Activity::Idle;
        info!("activity cancelled");
        true
    }
}

impl Drop for PetController {
    fn drop(&mut self) {
        let n = self.sched.pending();
        if n > 0 {
            debug!("discarding {n} pending completion(s)");
        }
        self.sched.cancel_all();
    }
}

pub(crate) fn derive_mood(s: &PetState) -> Mood {
    match s.activity {
        Activity::Sleeping => return Mood::Tired,
        Activity::Eating => return Mood::Yum,
        Activity::Playing => return Mood::Excited,
        Activity::Idle => {}
    }
    if s.hunger < LOW_STAT {
        return Mood::Sad;
    }
    if s.energy < LOW_STAT {
        return Mood::Sleepy;
    }
    if s.health < LOW_STAT {
        return Mood::Sick;
    }
    Mood::Happy
}
