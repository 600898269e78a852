//! Static hobby catalogue shown on the hobbies pages.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HobbyKind {
    Photography,
    Gym,
    Cooking,
    Reading,
    Music,
    Travel,
}

#[derive(Debug, Clone, Copy)]
pub struct Hobby {
    pub kind: HobbyKind,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub icon: &'static str,
    pub background_image: &'static str,
    pub description: &'static str,
    pub why: &'static str,
    pub experience: &'static str,
    pub highlights: &'static [&'static str],
    pub goals: &'static [&'static str],
    pub started: &'static str,
    pub frequency: &'static str,
    pub level: &'static str,
    pub equipment: &'static [&'static str],
    pub resources: &'static [&'static str],
}

impl HobbyKind {
    pub const ALL: [HobbyKind; 6] = [
        HobbyKind::Photography,
        HobbyKind::Gym,
        HobbyKind::Cooking,
        HobbyKind::Reading,
        HobbyKind::Music,
        HobbyKind::Travel,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            HobbyKind::Photography => "photography",
            HobbyKind::Gym => "gym",
            HobbyKind::Cooking => "cooking",
            HobbyKind::Reading => "reading",
            HobbyKind::Music => "music",
            HobbyKind::Travel => "travel",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == value)
    }

    pub fn details(self) -> &'static Hobby {
        match self {
            HobbyKind::Photography => &PHOTOGRAPHY,
            HobbyKind::Gym => &GYM,
            HobbyKind::Cooking => &COOKING,
            HobbyKind::Reading => &READING,
            HobbyKind::Music => &MUSIC,
            HobbyKind::Travel => &TRAVEL,
        }
    }

    /// Every other hobby, in catalogue order.
    pub fn related(self) -> impl Iterator<Item = &'static Hobby> {
        Self::ALL
            .into_iter()
            .filter(move |kind| *kind != self)
            .map(HobbyKind::details)
    }
}

pub fn all() -> impl Iterator<Item = &'static Hobby> {
    HobbyKind::ALL.into_iter().map(HobbyKind::details)
}

static PHOTOGRAPHY: Hobby = Hobby {
    kind: HobbyKind::Photography,
    title: "Photography",
    subtitle: "Capturing moments and telling stories through the lens",
    icon: "fas fa-camera",
    background_image: "https://images.unsplash.com/photo-1452587925148-ce544e77e70d?w=1600&h=400&fit=crop",
    description: "What started with a phone camera grew into a serious hobby with a mirrorless body, \
        a couple of lenses and a habit of chasing the light on weekends.",
    why: "Photography trains the eye to notice detail in ordinary places. A good frame keeps a \
        moment that words tend to lose.",
    experience: "Mostly landscape and street work around Guadalajara, with the occasional local \
        meetup and community exhibition.",
    highlights: &[
        "Landscapes in Jalisco's natural areas",
        "Street photography in the historic center",
        "Golden hour and blue hour sessions",
        "Long exposure techniques",
        "Editing in Lightroom and Photoshop",
    ],
    goals: &[
        "Build a cohesive portfolio of Jalisco landscapes",
        "Master advanced editing techniques",
        "Enter photography competitions",
    ],
    started: "2018",
    frequency: "Weekly",
    level: "Intermediate",
    equipment: &[
        "Mirrorless camera",
        "Wide-angle lens",
        "Tripod",
        "Adobe Lightroom",
    ],
    resources: &[
        "r/photography",
        "Local photography workshops",
        "Photography channels on YouTube",
    ],
};

static GYM: Hobby = Hobby {
    kind: HobbyKind::Gym,
    title: "Gym & Fitness",
    subtitle: "Building strength, discipline and a healthy routine",
    icon: "fas fa-dumbbell",
    background_image: "https://images.unsplash.com/photo-1534438327276-14e5300c3a48?w=1600&h=400&fit=crop",
    description: "Strength training and cardio are part of the daily schedule. The routine keeps \
        energy up for long days in front of a screen.",
    why: "Training gives structure and measurable progress, and it is time away from screens.",
    experience: "Compound lifts, functional work and HIIT, following structured programs and \
        tracking every session.",
    highlights: &[
        "Five training days a week",
        "Progressive overload",
        "HIIT cardio",
        "Nutrition planning",
        "Mobility and recovery work",
    ],
    goals: &[
        "Hit specific strength milestones",
        "Train consistently all year",
        "Improve flexibility",
    ],
    started: "2020",
    frequency: "5 times per week",
    level: "Intermediate",
    equipment: &[
        "Gym membership",
        "Workout tracking app",
        "Resistance bands",
        "Foam roller",
    ],
    resources: &["Fitness channels on YouTube", "MyFitnessPal", "Personal training sessions"],
};

static COOKING: Hobby = Hobby {
    kind: HobbyKind::Cooking,
    title: "Cooking",
    subtitle: "Experimenting with flavors and sharing good food",
    icon: "fas fa-utensils",
    background_image: "https://images.unsplash.com/photo-1556910103-1c02745aae4d?w=1600&h=400&fit=crop",
    description: "The kitchen is the creative outlet away from code, from picking ingredients at \
        the market to trying a new cuisine on a weeknight.",
    why: "Turning raw ingredients into a meal is satisfying, and a home-cooked dinner brings \
        people together.",
    experience: "Italian, Asian, Mediterranean and traditional Mexican dishes, sometimes from a \
        recipe and sometimes improvised.",
    highlights: &[
        "Homemade pasta and sauces",
        "Traditional dishes from Jalisco",
        "Stir-fries and noodle dishes",
        "Bread and pastries",
    ],
    goals: &[
        "Sharpen knife skills",
        "Keep a personal recipe collection",
        "Host dinners for friends and family",
    ],
    started: "2019",
    frequency: "4-5 times per week",
    level: "Intermediate",
    equipment: &["Chef's knife set", "Cast iron skillet", "Dutch oven", "Kitchen scale"],
    resources: &["Cooking channels on YouTube", "Local cooking classes", "Cookbooks"],
};

static READING: Hobby = Hobby {
    kind: HobbyKind::Reading,
    title: "Reading",
    subtitle: "Exploring new worlds and ideas through books",
    icon: "fas fa-book",
    background_image: "https://images.unsplash.com/photo-1481627834876-b7833e8f5570?w=1600&h=400&fit=crop",
    description: "A reading list that mixes science fiction, biographies, technical books and \
        general non-fiction.",
    why: "Books bring perspectives that daily work never will, and reading before bed beats \
        scrolling.",
    experience: "At least a book a month, often several at once, with notes kept in a reading \
        journal.",
    highlights: &[
        "Science fiction classics",
        "Biographies of technology pioneers",
        "Books on software testing",
        "Latin American literature",
    ],
    goals: &["Read 20 books a year", "Write short reviews", "Start a book club"],
    started: "Childhood",
    frequency: "Daily",
    level: "Advanced",
    equipment: &["Kindle", "Physical book collection", "Reading journal"],
    resources: &["Goodreads", "r/books", "Local bookstores"],
};

static MUSIC: Hobby = Hobby {
    kind: HobbyKind::Music,
    title: "Music",
    subtitle: "Finding rhythm and inspiration through sound",
    icon: "fas fa-music",
    background_image: "https://images.unsplash.com/photo-1511379938547-c1f69419868d?w=1600&h=400&fit=crop",
    description: "Playing guitar, finding new artists and going to live shows.",
    why: "Practice on the guitar needs the same focus as coding but uses a different part of \
        the brain.",
    experience: "Acoustic fingerstyle and some electric guitar, mostly covers with the odd \
        original piece.",
    highlights: &[
        "Acoustic fingerstyle",
        "Live concerts and festivals",
        "Playlists for every mood",
        "Music theory basics",
    ],
    goals: &["Record an original song", "Play an open mic night"],
    started: "2017",
    frequency: "3-4 times per week",
    level: "Intermediate",
    equipment: &["Acoustic guitar", "Electric guitar", "Amplifier", "Audio interface"],
    resources: &["Guitar tutorials on YouTube", "Ultimate Guitar tabs", "Music theory courses"],
};

static TRAVEL: Hobby = Hobby {
    kind: HobbyKind::Travel,
    title: "Travel",
    subtitle: "Exploring new places and cultures",
    icon: "fas fa-plane",
    background_image: "https://images.unsplash.com/photo-1488646953014-85cb44e25828?w=1600&h=400&fit=crop",
    description: "Cities across Mexico and a few trips abroad, each one documented with photos \
        and a journal.",
    why: "Travel breaks routine and challenges assumptions about how other people live.",
    experience: "A mix of planned days and spontaneous exploring, looking for local food and \
        neighborhoods over tourist spots.",
    highlights: &[
        "Colonial cities and beaches",
        "Food markets and street food",
        "Archaeological sites",
        "Weekend trips around Jalisco",
    ],
    goals: &[
        "Visit every state in Mexico",
        "Travel to South America and Europe",
        "Take longer trips",
    ],
    started: "2016",
    frequency: "Monthly",
    level: "Intermediate",
    equipment: &["Travel backpack", "Camera", "Travel journal", "Power bank"],
    resources: &["Travel blogs", "Google Maps", "Local tourism sites"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_for_every_hobby() {
        for kind in HobbyKind::ALL {
            assert_eq!(HobbyKind::from_slug(kind.slug()), Some(kind));
            assert_eq!(kind.details().kind, kind);
        }
        assert_eq!(HobbyKind::from_slug("skydiving"), None);
    }

    #[test]
    fn related_excludes_current_hobby() {
        let related: Vec<_> = HobbyKind::Music.related().map(|hobby| hobby.kind).collect();
        assert_eq!(related.len(), 5);
        assert!(!related.contains(&HobbyKind::Music));
    }
}
