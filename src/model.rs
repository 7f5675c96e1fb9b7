pub(crate) const STAT_MAX: u8 = 100;

pub(crate) const FEED_COST: u32 = 5;
pub(crate) const FEED_HUNGER: u8 = 25;

pub(crate) const SLEEP_ENERGY: u8 = 35;
pub(crate) const SLEEP_HEALTH: u8 = 10;

pub(crate) const PLAY_MIN_ENERGY: u8 = 10;
pub(crate) const PLAY_ENERGY_COST: u8 = 15;
pub(crate) const PLAY_HEALTH: u8 = 5;
pub(crate) const PLAY_REWARD: u32 = 3;

// mood thresholds
pub(crate) const LOW_STAT: u8 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum Activity {
    #[default]
    Idle,
    Eating,
    Sleeping,
    Playing,
}

impl Activity {
    pub(crate) fn bubble(self) -> Option<&'static str> {
        match self {
            Activity::Idle => None,
            Activity::Eating => Some("Gnam gnam..."),
            Activity::Sleeping => Some("Zzz..."),
            Activity::Playing => Some("Evviva!"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mood {
    Tired,
    Yum,
    Excited,
    Sad,
    Sleepy,
    Sick,
    Happy,
}

impl Mood {
    /// Face drawn inside the pet body. All glyphs are single-width.
    pub(crate) fn face(self) -> &'static str {
        match self {
            Mood::Tired => "(-_-) z",
            Mood::Yum => "(^q^)",
            Mood::Excited => "\\(^o^)/",
            Mood::Sad => "(T_T)",
            Mood::Sleepy => "(=_=)",
            Mood::Sick => "(x_x)",
            Mood::Happy => "(^_^)",
        }
    }
}

/// Everything the pet is. Stats are kept in `0..=100`, coins never go negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PetState {
    pub(crate) coins: u32,
    pub(crate) health: u8,
    pub(crate) hunger: u8,
    pub(crate) energy: u8,
    pub(crate) activity: Activity,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            coins: 100,
            health: 80,
            hunger: 60,
            energy: 90,
            activity: Activity::Idle,
        }
    }
}

impl PetState {
    pub(crate) fn is_idle(&self) -> bool {
        self.activity == Activity::Idle
    }
}

pub(crate) fn raise(stat: u8, by: u8) -> u8 {
    stat.saturating_add(by).min(STAT_MAX)
}

pub(crate) fn lower(stat: u8, by: u8) -> u8 {
    stat.saturating_sub(by)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum Room {
    #[default]
    Bedroom,
    Kitchen,
    Living,
}

impl Room {
    pub(crate) const ALL: [Room; 3] = [Room::Bedroom, Room::Kitchen, Room::Living];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Room::Bedroom => "Camera",
            Room::Kitchen => "Cucina",
            Room::Living => "Salotto",
        }
    }

    pub(crate) fn tab(self) -> &'static str {
        match self {
            Room::Bedroom => "1 Camera",
            Room::Kitchen => "2 Cucina",
            Room::Living => "3 Salotto",
        }
    }

    /// Background tint as RGB.
    pub(crate) fn tint(self) -> (u8, u8, u8) {
        match self {
            Room::Bedroom => (0xed, 0xe9, 0xfe),
            Room::Kitchen => (0xfe, 0xf3, 0xc7),
            Room::Living => (0xdb, 0xea, 0xfe),
        }
    }

    pub(crate) fn next(self) -> Room {
        match self {
            Room::Bedroom => Room::Kitchen,
            Room::Kitchen => Room::Living,
            Room::Living => Room::Bedroom,
        }
    }
}
