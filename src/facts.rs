use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const FACTS: &[&str] = &[
    "A day on Venus is longer than its year.",
    "Neutron stars can spin more than 600 times per second.",
    "The footprints left on the Moon will last for millions of years.",
    "Light from the Sun takes about 8 minutes and 20 seconds to reach Earth.",
    "Jupiter's Great Red Spot is a storm larger than Earth.",
    "There are more stars in the universe than grains of sand on all of Earth's beaches.",
    "One million Earths could fit inside the Sun.",
    "Saturn would float in water because it is mostly made of gas.",
    "The Milky Way and Andromeda galaxies will collide in about 4.5 billion years.",
    "A teaspoon of neutron star material would weigh about a billion tons on Earth.",
    "Olympus Mons on Mars is nearly three times as tall as Mount Everest.",
    "The International Space Station orbits Earth about every 90 minutes.",
];

pub fn random_fact() -> &'static str {
    random_fact_with(&mut rand::thread_rng())
}

pub fn random_fact_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FACTS.choose(rng).copied().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactMode {
    Auto,
    #[default]
    OnDemand,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Hidden,
    Visible(&'static str),
    Swapping {
        next: &'static str,
        show_at: Instant,
    },
}

/// Show/hide state of the fact panel. Triggering while a fact is already on
/// screen hides it, waits `transition`, then shows the next fact.
#[derive(Debug, Clone)]
pub struct FactPanel {
    mode: FactMode,
    transition: Duration,
    phase: Phase,
}

impl FactMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Some(FactMode::Auto),
            "on_demand" => Some(FactMode::OnDemand),
            "off" => Some(FactMode::Off),
            _ => None,
        }
    }
}

impl FactPanel {
    pub fn new(mode: FactMode, transition: Duration) -> Self {
        Self {
            mode,
            transition,
            phase: Phase::Hidden,
        }
    }

    pub fn mode(&self) -> FactMode {
        self.mode
    }

    pub fn start(&mut self, fact: &'static str) {
        if self.mode == FactMode::Auto {
            self.phase = Phase::Visible(fact);
        }
    }

    pub fn trigger(&mut self, fact: &'static str, now: Instant) -> bool {
        if self.mode == FactMode::Off {
            return false;
        }
        self.phase = match self.phase {
            Phase::Hidden => Phase::Visible(fact),
            Phase::Visible(_) | Phase::Swapping { .. } => Phase::Swapping {
                next: fact,
                show_at: now + self.transition,
            },
        };
        true
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Swapping { next, show_at } if now >= show_at => {
                self.phase = Phase::Visible(next);
                true
            }
            _ => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Swapping { .. })
    }

    pub fn visible_fact(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Visible(fact) => Some(fact),
            Phase::Hidden | Phase::Swapping { .. } => None,
        }
    }
}
