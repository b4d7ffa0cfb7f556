use alloc::format;
use alloc::string::String;
use rand::Rng;

/// Delay after a challenge request before a fun fact may pop up, in milliseconds.
pub const FUN_FACT_DELAY_MS: u32 = 1200;
const FUN_FACT_CHANCE: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TutorialStep {
    pub title: &'static str,
    pub content: &'static str,
}

pub const TUTORIAL_STEPS: [TutorialStep; 5] = [
    TutorialStep {
        title: "Welcome to Sequence Master!",
        content: "Learn how to solve sequence puzzles and challenge your logical thinking.",
    },
    TutorialStep {
        title: "Game Modes",
        content: "Choose from Classic (20s), Speed (10s), Zen (no timer), or Daily Challenge modes.",
    },
    TutorialStep {
        title: "Sequence Patterns",
        content: "Each sequence follows a unique pattern. Use the hint to help you solve it!",
    },
    TutorialStep {
        title: "Time Management",
        content: "Most modes have a timer. Answer before time runs out! Watch for the warning when time is low.",
    },
    TutorialStep {
        title: "Achievements",
        content: "Earn achievements and climb the global leaderboard! Try different modes to unlock all achievements.",
    },
];

pub const FUN_FACTS: [&str; 6] = [
    "Did you know? Each Fibonacci number is the sum of the two before it, and the ratio of neighbours approaches the golden ratio.",
    "Did you know? The Online Encyclopedia of Integer Sequences lists more than 370,000 sequences.",
    "Did you know? The sum of the first n odd numbers is always n squared.",
    "Did you know? Triangular numbers count the dots in a triangle: 1, 3, 6, 10, 15...",
    "Did you know? The Collatz sequence has been checked for every start below 2^68 and always reaches 1.",
    "Did you know? Powers of two double every step, so 2^10 is already 1024.",
];

/// Rolls whether a fun fact should follow the next challenge, and which one.
pub fn roll_fun_fact<R: Rng>(rng: &mut R) -> Option<&'static str> {
    rng.random_bool(FUN_FACT_CHANCE)
        .then(|| FUN_FACTS[rng.random_range(0..FUN_FACTS.len())])
}

/// Position in the how-to-play walkthrough.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tutorial {
    index: usize,
}

impl Tutorial {
    pub fn step(&self) -> &'static TutorialStep {
        &TUTORIAL_STEPS[self.index]
    }

    pub const fn is_first(&self) -> bool {
        self.index == 0
    }

    pub const fn is_last(&self) -> bool {
        self.index + 1 == TUTORIAL_STEPS.len()
    }

    /// Moves one step back, staying put on the first step.
    pub fn back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Moves one step forward, or `None` once the walkthrough is finished.
    pub fn advance(self) -> Option<Self> {
        (!self.is_last()).then_some(Self {
            index: self.index + 1,
        })
    }

    pub fn indicator(&self) -> String {
        format!("{}/{}", self.index + 1, TUTORIAL_STEPS.len())
    }
}
