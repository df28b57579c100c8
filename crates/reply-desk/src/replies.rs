//! Candidate reply generation.

use crate::analysis::Category;

/// Maximum number of candidates returned for one tweet.
pub const MAX_CANDIDATES: usize = 8;

/// Text longer than this (in characters) earns the transparency candidate.
pub const LONG_TEXT_CHARS: usize = 200;

/// Text shorter than this (in characters) earns the short candidate.
pub const SHORT_TEXT_CHARS: usize = 50;

/// Appended for long, detailed tweets.
pub const DETAILED_REPLY: &str = "detailed update. appreciate the transparency";

/// Appended for short tweets.
pub const SHORT_REPLY: &str = "short and sweet";

/// Base candidates for a category, in presentation order.
#[must_use]
pub fn candidates(category: Category) -> &'static [&'static str] {
    match category {
        Category::Build => &[
            "ship it 🚀",
            "solid progress",
            "day by day",
            "consistency wins",
            "keep building",
            "nice work",
            "forward motion",
            "every commit counts",
        ],
        Category::HotTake => &[
            "hot take and i agree",
            "this is the way",
            "unpopular but true",
            "change my mind",
            "facts don't care about feelings",
        ],
        Category::Motivational => &[
            "the best time is now",
            "started is half done",
            "let's gooo",
            "no better day than today",
            "action beats intention",
            "tomorrow is not a strategy",
        ],
        Category::IndieHacker => &[
            "bootstrapped vibes",
            "indie hacker energy",
            "saas life",
            "solopreneur wins",
            "build in public",
        ],
        Category::TechStack => &[
            "clean stack",
            "solid tech choice",
            "tech decisions matter",
            "nice stack",
            "interesting choice",
            "solid engineering",
        ],
        Category::Struggle => &[
            "every bug is a lesson",
            "stuck means you're close",
            "debugging builds character",
            "keep pushing",
            "the fix is near",
            "you'll figure it out",
        ],
        Category::Launch => &[
            "congrats on the launch!",
            "into the world it goes",
            "live at last",
            "well deserved 🎉",
            "shipped! 🎉",
            "live baby",
        ],
        Category::Generic => &[
            "this is the way",
            "agreed",
            "facts",
            "well said",
            "preach",
            "solid point",
            "true that",
            "ngl this hits",
            "real",
            "couldn't agree more",
            "exactly",
        ],
        Category::Neutral => &["solid point", "agreed", "preach", "ngl this hits", "facts"],
    }
}

/// Generate the ordered candidate list for a category.
///
/// Length-based candidates are appended before the list is cut to
/// [`MAX_CANDIDATES`], so a category whose base list is already full never
/// shows them. The neutral set carries no length signal and is returned as is.
#[must_use]
pub fn generate(category: Category, text_len: usize) -> Vec<String> {
    let mut replies: Vec<String> = candidates(category)
        .iter()
        .map(ToString::to_string)
        .collect();

    if category == Category::Neutral {
        return replies;
    }

    if text_len > LONG_TEXT_CHARS {
        replies.push(DETAILED_REPLY.to_string());
    }
    if text_len < SHORT_TEXT_CHARS {
        replies.push(SHORT_REPLY.to_string());
    }

    replies.truncate(MAX_CANDIDATES);
    replies
}
