//! Static word sets backing sentiment analysis and word-frequency tracking.
//! All entries are lowercase; lookups happen after lowercasing the input.

use std::collections::HashSet;
use std::sync::LazyLock;

const POSITIVE_WORDS: &[&str] = &[
    "happy", "joy", "joyful", "glad", "good", "great", "calm", "relaxed", "peaceful",
    "content", "grateful", "thankful", "hopeful", "proud", "excited", "love", "loved",
    "loving", "wonderful", "amazing", "awesome", "fantastic", "cheerful", "energized",
    "motivated", "inspired", "confident", "accomplished", "blessed", "optimistic",
    "relieved", "rested", "refreshed", "strong", "safe", "fun", "smile", "smiled",
    "laugh", "laughed", "enjoy", "enjoyed", "better", "best", "nice", "kind", "bright",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "unhappy", "angry", "mad", "upset", "anxious", "worried", "stressed",
    "tired", "exhausted", "lonely", "alone", "empty", "hopeless", "worthless",
    "helpless", "numb", "trapped", "overwhelmed", "depressed", "miserable", "awful",
    "terrible", "horrible", "bad", "worse", "worst", "hate", "hated", "afraid",
    "scared", "nervous", "frustrated", "annoyed", "guilty", "ashamed", "hurt",
    "broken", "cry", "cried", "crying", "despair", "panic", "pain", "sick",
    "unbearable", "drained", "suicidal",
];

/// Subset of the negative words that flag distress on their own.
const DISTRESS_WORDS: &[&str] = &[
    "hopeless", "worthless", "helpless", "empty", "numb", "trapped", "overwhelmed",
    "despair", "broken", "unbearable", "panic", "suicidal", "alone",
];

/// Subset of the positive words required for a text to count as uplifting.
const UPLIFT_WORDS: &[&str] = &[
    "grateful", "thankful", "hopeful", "proud", "joy", "joyful", "inspired",
    "peaceful", "accomplished", "loved", "blessed", "excited", "optimistic",
];

const INTENSITY_WORDS: &[&str] = &[
    "very", "so", "really", "extremely", "incredibly", "totally", "completely",
    "absolutely", "deeply", "utterly", "terribly", "super", "too", "truly",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had",
    "her", "was", "one", "our", "out", "has", "him", "his", "how", "its", "let",
    "may", "who", "did", "get", "got", "she", "too", "use", "way", "day", "today",
    "this", "that", "with", "have", "from", "they", "will", "would", "there",
    "their", "what", "about", "which", "when", "make", "like", "time", "just",
    "know", "take", "into", "your", "some", "could", "them", "than", "then",
    "also", "been", "were", "said", "each", "she's", "he's", "it's", "i'm",
    "i've", "i'll", "don't", "didn't", "can't", "won't", "isn't", "wasn't",
    "very", "really", "much", "more", "most", "over", "after", "before", "because",
    "while", "where", "being", "doing", "does", "done", "myself", "yourself",
    "these", "those", "here", "only", "even", "still", "again", "feel", "felt",
    "feeling", "things", "thing", "went", "going",
];

fn to_set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static POSITIVE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| to_set(POSITIVE_WORDS));
static NEGATIVE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| to_set(NEGATIVE_WORDS));
static DISTRESS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| to_set(DISTRESS_WORDS));
static UPLIFT: LazyLock<HashSet<&'static str>> = LazyLock::new(|| to_set(UPLIFT_WORDS));
static INTENSITY: LazyLock<HashSet<&'static str>> = LazyLock::new(|| to_set(INTENSITY_WORDS));
static STOP: LazyLock<HashSet<&'static str>> = LazyLock::new(|| to_set(STOPWORDS));

pub fn is_positive(word: &str) -> bool {
    POSITIVE.contains(word)
}

pub fn is_negative(word: &str) -> bool {
    NEGATIVE.contains(word)
}

pub fn is_distress(word: &str) -> bool {
    DISTRESS.contains(word)
}

pub fn is_uplift(word: &str) -> bool {
    UPLIFT.contains(word)
}

pub fn is_intensifier(word: &str) -> bool {
    INTENSITY.contains(word)
}

pub fn is_stopword(word: &str) -> bool {
    STOP.contains(word)
}
