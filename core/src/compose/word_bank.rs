use rand::seq::SliceRandom;
use rand::Rng;

pub(crate) const GREETINGS: &[&str] = &["hello!", "hey", "yo"];
pub(crate) const OPENERS: &[&str] = &["hello!", "hey", "hi", "well,", ""];
pub(crate) const THANKS: &[&str] = &["thanks", "thank you", "many thanks", "thx"];
pub(crate) const FOR: &[&str] = &["for"];
pub(crate) const CONTENT_SUBJECTS: &[&str] = &["reading", "your post", "your message"];
pub(crate) const FOLLOW_SUBJECTS: &[&str] = &["following me", "the follow"];
pub(crate) const RECIPROCALS: &[&str] = &["too", "as well", ""];
pub(crate) const MENTION_SUBJECTS: &[&str] = &["your message", "your post", "your mention"];

pub(crate) const INTERJECTIONS: &[&str] = &[
    "wow", "hey", "huh", "hm", "hum", "huhu", "wao", "awesome", "nice",
];
pub(crate) const OPINIONS: &[&str] = &[
    "that is",
    "this is",
    "it's",
    "i think that it's",
    "is it",
    "it's me or it is",
    "i'm the only one who thinks that it is",
    "i'm the only one who thinks this is",
];
pub(crate) const ADJECTIVES: &[&str] = &[
    "awesome",
    "really awesome",
    "impressive",
    "great",
    "nice",
    "very nice",
    "neat",
    "very well done",
    "very great",
    "so great",
    "really great",
    "so cool",
    "really cool",
    "very cool",
    "so nice",
];
pub(crate) const SEPARATORS: &[&str] = &[".", "!", "!!", "..."];

/// Uniformly pick one entry of a bank
pub(crate) fn pick<'a, R: Rng + ?Sized>(rng: &mut R, bank: &[&'a str]) -> &'a str {
    bank.choose(rng).copied().unwrap_or_default()
}

/// Fill each slot from its bank and join the non-empty picks with single spaces
pub(crate) fn fill_slots<R: Rng + ?Sized>(rng: &mut R, slots: &[&[&str]]) -> String {
    slots
        .iter()
        .map(|bank| pick(rng, bank))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}

/// Capitalize the first letter and lowercase the rest, half of the time
pub(crate) fn maybe_capitalize<R: Rng + ?Sized>(rng: &mut R, word: &str) -> String {
    if coin_flip(rng) && word.chars().count() > 1 {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            return first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect();
        }
    }
    word.to_string()
}

/// Uppercase the whole word, half of the time
pub(crate) fn maybe_uppercase<R: Rng + ?Sized>(rng: &mut R, word: &str) -> String {
    if coin_flip(rng) {
        word.to_uppercase()
    } else {
        word.to_string()
    }
}
