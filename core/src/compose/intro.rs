use super::word_bank::{
    coin_flip, maybe_capitalize, maybe_uppercase, pick, ADJECTIVES, INTERJECTIONS, OPINIONS,
    SEPARATORS,
};
use rand::Rng;

/// Build an unsolicited opening remark such as "Wow! this is so cool".
///
/// The interjection and opinion clauses are each included on a coin flip, the
/// adjective clause always is. Casing varies per clause. No mention prefix.
pub fn compose_intro<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut intro = String::new();

    if coin_flip(rng) {
        let interjection = pick(rng, INTERJECTIONS);
        let interjection = maybe_capitalize(rng, interjection);
        intro.push_str(&maybe_uppercase(rng, &interjection));
        if coin_flip(rng) {
            intro.push_str(pick(rng, SEPARATORS));
        }
        intro.push(' ');
    }

    if coin_flip(rng) {
        let opinion = pick(rng, OPINIONS);
        intro.push_str(&maybe_capitalize(rng, opinion));
        intro.push(' ');
    }

    let adjective = pick(rng, ADJECTIVES);
    if intro.trim().is_empty() {
        intro.push_str(&maybe_capitalize(rng, adjective));
    } else {
        intro.push_str(adjective);
    }

    if coin_flip(rng) {
        intro.push_str(pick(rng, SEPARATORS));
    }

    intro
}
