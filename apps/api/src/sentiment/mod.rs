// Text sentiment: static lexicon, per-text analysis, and the per-user
// word-frequency model maintained from journal writes.

pub mod analyzer;
pub mod handlers;
pub mod lexicon;
pub mod word_frequency;
