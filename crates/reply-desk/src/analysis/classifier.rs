//! Keyword-rule classification of tweet text.
//!
//! Rules live in an ordered table. The first rule with any keyword present as
//! a substring of the lower-cased text wins, so table order is priority order.

use super::categories::Category;

/// A category and the keywords that trigger it.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Category assigned when the rule fires.
    pub category: Category,
    /// Lower-case substrings, any one of which fires the rule.
    pub keywords: &'static [&'static str],
}

impl Rule {
    /// Whether any keyword occurs in already lower-cased text.
    #[must_use]
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        category: Category::Build,
        keywords: &[
            "building", "shipped", "launch", "build", "day", "week", "progress", "shipping",
            "code", "dev", "project", "feature",
        ],
    },
    Rule {
        category: Category::HotTake,
        keywords: &[
            "unpopular",
            "controversial",
            "hot take",
            "opinion",
            "change my mind",
            "disagree",
            "wrong",
        ],
    },
    Rule {
        category: Category::Motivational,
        keywords: &[
            "motivation", "start", "begin", "first", "never", "time", "best time", "yesterday",
            "now",
        ],
    },
    Rule {
        category: Category::IndieHacker,
        keywords: &["indie", "saas", "mrr", "revenue", "bootstrapped", "solo", "founder"],
    },
    Rule {
        category: Category::TechStack,
        keywords: &[
            "react", "vue", "node", "javascript", "python", "golang", "rust", "ai", "agent",
            "typescript", "nextjs", "tailwind",
        ],
    },
    Rule {
        category: Category::Struggle,
        keywords: &[
            "hard", "difficult", "struggle", "stuck", "problem", "issue", "bug", "error", "fix",
        ],
    },
    Rule {
        category: Category::Launch,
        keywords: &["launch", "release", "live", "product", "shipped", "shipping"],
    },
];

/// Ordered rule table with generic and neutral fallbacks.
#[derive(Debug, Clone, Copy)]
pub struct RuleTable {
    rules: &'static [Rule],
}

impl Default for RuleTable {
    fn default() -> Self {
        Self { rules: RULES }
    }
}

impl RuleTable {
    /// Build a table over a custom rule list.
    #[must_use]
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// The rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Classify text. Empty text is [`Category::Neutral`]; text that matches
    /// no rule is [`Category::Generic`].
    #[must_use]
    pub fn classify(&self, text: &str) -> Category {
        if text.is_empty() {
            return Category::Neutral;
        }

        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(Category::Generic, |rule| rule.category)
    }
}

/// Classify text with the built-in rule table.
#[must_use]
pub fn classify(text: &str) -> Category {
    RuleTable::default().classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_beats_hot_take() {
        assert_eq!(
            classify("Unpopular opinion: I shipped it anyway"),
            Category::Build
        );
    }

    #[test]
    fn test_each_rule_reachable() {
        assert_eq!(classify("I shipped a new feature today"), Category::Build);
        assert_eq!(classify("Hot take: tabs > spaces"), Category::HotTake);
        assert_eq!(classify("Just START."), Category::Motivational);
        assert_eq!(classify("MRR hit $1k"), Category::IndieHacker);
        assert_eq!(classify("rust > go"), Category::TechStack);
        assert_eq!(classify("stuck on this bug"), Category::Struggle);
        assert_eq!(classify("new release out"), Category::Launch);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("SHIPPED"), Category::Build);
        assert_eq!(classify("Saas"), Category::IndieHacker);
    }

    #[test]
    fn test_substring_matching() {
        // "today" contains "day"
        assert_eq!(classify("what a good today"), Category::Build);
        // "said" contains "ai"
        assert_eq!(classify("she said so"), Category::TechStack);
    }

    #[test]
    fn test_fallbacks_are_distinct() {
        assert_eq!(classify(""), Category::Neutral);
        assert_eq!(classify("hello"), Category::Generic);
        assert_ne!(Category::Neutral, Category::Generic);
    }

    #[test]
    fn test_whitespace_is_not_empty() {
        assert_eq!(classify("   "), Category::Generic);
    }

    #[test]
    fn test_table_order() {
        let order: Vec<Category> = RuleTable::default()
            .rules()
            .iter()
            .map(|r| r.category)
            .collect();
        assert_eq!(
            order,
            vec![
                Category::Build,
                Category::HotTake,
                Category::Motivational,
                Category::IndieHacker,
                Category::TechStack,
                Category::Struggle,
                Category::Launch,
            ]
        );
    }

    #[test]
    fn test_custom_table() {
        const ONLY_LAUNCH: &[Rule] = &[Rule {
            category: Category::Launch,
            keywords: &["release"],
        }];
        let table = RuleTable::new(ONLY_LAUNCH);
        assert_eq!(table.classify("release day"), Category::Launch);
        assert_eq!(table.classify("shipped"), Category::Generic);
    }
}
