//! Content analysis module.
//!
//! Classifies tweet text into a category using ordered keyword rules.

mod categories;
mod classifier;

pub use categories::Category;
pub use classifier::{classify, Rule, RuleTable, RULES};
