//! Content categories for tweets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Building and shipping progress.
    Build,
    /// Hot takes and controversial opinions.
    HotTake,
    /// Motivation and urgency.
    Motivational,
    /// Indie hackers and bootstrapped founders.
    IndieHacker,
    /// Mentions of a tech stack.
    TechStack,
    /// Struggles and debugging.
    Struggle,
    /// Launches and releases.
    Launch,
    /// Text that matched no rule.
    Generic,
    /// No text at all.
    Neutral,
}

impl Category {
    /// Get all categories.
    #[must_use]
    pub fn all() -> &'static [Category] {
        &[
            Category::Build,
            Category::HotTake,
            Category::Motivational,
            Category::IndieHacker,
            Category::TechStack,
            Category::Struggle,
            Category::Launch,
            Category::Generic,
            Category::Neutral,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Build => "build",
            Category::HotTake => "hot-take",
            Category::Motivational => "motivational",
            Category::IndieHacker => "indie-hacker",
            Category::TechStack => "tech-stack",
            Category::Struggle => "struggle",
            Category::Launch => "launch",
            Category::Generic => "generic",
            Category::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}
