use crate::anim::Animator;
use crate::config::{self, Cli, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action, UiAction};
use crate::logging;
use crate::model::Room;
use crate::render::{draw_screen, Frame, Palette, Terminal};
use crate::sim::{Outcome, PetAction, PetController};
use log::info;
use std::time::{Duration, Instant};

/// The screen. Owns the pet for as long as it is mounted.
pub(crate) struct App {
    settings: Settings,
    pet: PetController,
    anim: Animator,
    room: Room,
    help_open: bool,
    notice: Option<&'static str>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(settings: Settings) -> Self {
        let pet = PetController::new(settings.timings());
        Self {
            settings,
            pet,
            anim: Animator::new(),
            room: Room::default(),
            help_open: false,
            notice: None,
            should_quit: false,
        }
    }

    fn handle(&mut self, action: UiAction) {
        match action {
            UiAction::Pet(a) => self.press(a),
            UiAction::Room(r) => self.set_room(r),
            UiAction::NextRoom => self.set_room(self.room.next()),
            UiAction::HelpToggle => self.help_open = !self.help_open,
            UiAction::Quit => self.should_quit = true,
        }
    }

    fn press(&mut self, action: PetAction) {
        match self.pet.apply(action) {
            Outcome::Started(_) => {
                self.notice = None;
                self.anim.on_started(action);
            }
            Outcome::Ignored(why) => self.notice = Some(why.hint()),
        }
    }

    fn set_room(&mut self, room: Room) {
        if room != self.room {
            info!("room -> {}", room.label());
            self.room = room;
        }
    }

    /// Move pet and animation clocks together.
    fn advance(&mut self, dt: Duration) {
        self.anim.advance(dt);
        for done in self.pet.advance(dt) {
            self.anim.on_finished(done);
        }
    }

    fn frame(&self) -> Frame<'_> {
        Frame {
            pet: self.pet.snapshot(),
            mood: self.pet.mood(),
            room: self.room,
            name: &self.settings.pet_name,
            offset: self.anim.offset(),
            scale: self.anim.scale(),
            busy: self.pet.busy(),
            progress: self.pet.activity_progress(),
            notice: self.notice,
            help_open: self.help_open,
        }
    }

    fn run(&mut self, term: &mut Terminal) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);
        let palette = Palette::new(self.settings.enable_color);
        let mut last_frame = Instant::now();

        while !self.should_quit {
            term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(self.help_open, &ev) {
                    self.handle(action);
                    if self.should_quit {
                        break;
                    }
                }
            }

            let now = Instant::now();
            self.advance(now.saturating_duration_since(last_frame));
            last_frame = now;

            draw_screen(&mut term.cur, &self.frame(), palette);
            term.present(true)?;

            spin_sleep(frame_dt, Instant::now());
        }
        Ok(())
    }
}

pub(crate) fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = config::paths_for(&cli)?;
    let log_path = match (&cli.log_file, &paths) {
        (Some(p), _) => p.clone(),
        (None, Some(paths)) => paths.log_path.clone(),
        (None, None) => anyhow::bail!("no log file location"),
    };
    logging::init(&log_path)?;

    let settings = config::resolve(&cli, paths.as_ref());
    info!(
        "starting: fps={} color={} feed={}ms sleep={}ms play={}ms",
        settings.fps_cap,
        settings.enable_color,
        settings.feed_ms,
        settings.sleep_ms,
        settings.play_ms
    );

    let mut app = App::new(settings);
    let mut term = Terminal::begin()?;
    let result = app.run(&mut term);
    term.end()?;
    // unmount: nothing may land after the screen is gone
    app.pet.cancel();
    drop(app);
    info!("bye");
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Activity;
    use crate::render::CellBuffer;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn double_press_in_one_batch() {
        let mut app = App::new(Settings::default());
        app.handle(UiAction::Pet(PetAction::Feed));
        app.handle(UiAction::Pet(PetAction::Sleep));
        assert_eq!(app.pet.snapshot().activity, Activity::Eating);
        app.advance(ms(2000));
        let s = app.pet.snapshot();
        assert_eq!((s.coins, s.hunger, s.energy), (95, 85, 90));
        assert!(s.is_idle());
    }

    #[test]
    fn rooms_switch_without_touching_pet() {
        let mut app = App::new(Settings::default());
        let before = app.pet.snapshot();
        app.handle(UiAction::NextRoom);
        assert_eq!(app.room, Room::Kitchen);
        app.handle(UiAction::Room(Room::Living));
        assert_eq!(app.room, Room::Living);
        assert_eq!(app.pet.snapshot(), before);
    }

    #[test]
    fn feed_animation_returns_home() {
        let mut app = App::new(Settings::default());
        app.handle(UiAction::Pet(PetAction::Feed));
        app.advance(ms(600));
        assert!(app.anim.offset().0 < -39.0);
        app.advance(ms(1400));
        app.advance(ms(600));
        assert!(app.anim.offset().0.abs() < 1e-3);
    }

    #[test]
    fn ignored_press_does_not_animate() {
        let mut app = App::new(Settings::default());
        app.handle(UiAction::Pet(PetAction::Sleep));
        app.handle(UiAction::Pet(PetAction::Play));
        app.advance(ms(600));
        // still on the sleep walk, no wiggle
        assert!(app.anim.offset().0 > 39.0);
    }

    #[test]
    fn frame_draws_without_panicking() {
        let mut app = App::new(Settings::default());
        app.handle(UiAction::HelpToggle);
        app.handle(UiAction::Pet(PetAction::Play));
        for size in [(80, 30), (20, 5), (1, 1)] {
            let mut buf = CellBuffer::new(size.0, size.1);
            draw_screen(&mut buf, &app.frame(), Palette::new(false));
        }
    }

    #[test]
    fn refused_press_leaves_hint() {
        let mut app = App::new(Settings::default());
        app.handle(UiAction::Pet(PetAction::Sleep));
        app.handle(UiAction::Pet(PetAction::Feed));
        assert_eq!(app.notice, Some("Shh... sta dormendo"));
        app.advance(ms(3000));
        app.handle(UiAction::Pet(PetAction::Play));
        assert_eq!(app.notice, None);
    }

    #[test]
    fn quit_sets_flag() {
        let mut app = App::new(Settings::default());
        app.handle(UiAction::Quit);
        assert!(app.should_quit);
    }
}
