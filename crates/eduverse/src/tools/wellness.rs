//! Static wellness tips shown in the student tool browser
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipCategory {
    Mindfulness,
    Sleep,
    Nutrition,
    Exercise,
    StudyBreaks,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tip {
    pub title: &'static str,
    pub body: &'static str,
}

const fn tip(title: &'static str, body: &'static str) -> Tip {
    Tip { title, body }
}

const MINDFULNESS: &[Tip] = &[
    tip("Box breathing", "Breathe in for four counts, hold for four, breathe out for four, hold for four. Repeat five times before an exam."),
    tip("Name five things", "When stress builds, name five things you can see, four you can touch and three you can hear."),
    tip("One-minute pause", "Before starting a new subject, sit still for a minute and notice how you feel."),
    tip("Gratitude note", "Write down one thing that went well today before you go to bed."),
];

const SLEEP: &[Tip] = &[
    tip("Fixed wake time", "Wake up at the same time every day, including weekends, to keep your body clock steady."),
    tip("Screens off", "Put phones and laptops away 30 minutes before sleep."),
    tip("No all-nighters", "Sleep helps memory settle. A rested brain recalls more than a tired one that studied longer."),
    tip("Cool and dark", "A cool, dark and quiet room makes it easier to fall asleep."),
];

const NUTRITION: &[Tip] = &[
    tip("Eat breakfast", "A breakfast with protein and whole grains keeps your focus up through morning classes."),
    tip("Drink water", "Keep a water bottle at your desk. Even mild dehydration makes concentration harder."),
    tip("Smart snacks", "Choose fruit, nuts or yoghurt over sugary snacks during long study sessions."),
    tip("Go easy on caffeine", "Avoid coffee and energy drinks in the late afternoon so they do not disturb your sleep."),
];

const EXERCISE: &[Tip] = &[
    tip("Daily walk", "A 20-minute walk improves mood and attention for the rest of the day."),
    tip("Stretch breaks", "Stand up and stretch your neck, shoulders and back every hour you sit."),
    tip("Move with friends", "Join a sport or a dance group. Exercise is easier to keep up with company."),
    tip("Stairs count", "Take the stairs when you can. Small bits of movement add up."),
];

const STUDY_BREAKS: &[Tip] = &[
    tip("Pomodoro", "Study for 25 minutes, then rest for 5. After four rounds take a longer 15 to 30 minute break."),
    tip("Change the scene", "Spend your break away from your desk, ideally near a window or outside."),
    tip("Rest your eyes", "Every 20 minutes, look at something 20 feet away for 20 seconds."),
    tip("Switch subjects", "Alternating between subjects keeps your mind fresh and improves long-term recall."),
];

impl TipCategory {
    pub const ALL: [TipCategory; 5] = [
        TipCategory::Mindfulness,
        TipCategory::Sleep,
        TipCategory::Nutrition,
        TipCategory::Exercise,
        TipCategory::StudyBreaks,
    ];

    pub fn tips(&self) -> &'static [Tip] {
        match self {
            TipCategory::Mindfulness => MINDFULNESS,
            TipCategory::Sleep => SLEEP,
            TipCategory::Nutrition => NUTRITION,
            TipCategory::Exercise => EXERCISE,
            TipCategory::StudyBreaks => STUDY_BREAKS,
        }
    }
}

/// Tips grouped by category; a single category when one is given.
pub fn tips_for(category: Option<TipCategory>) -> Vec<(TipCategory, &'static [Tip])> {
    match category {
        Some(c) => vec![(c, c.tips())],
        None => TipCategory::ALL.iter().map(|c| (*c, c.tips())).collect(),
    }
}
