//! Reply and commentary text generation.
//!
//! Incoming messages are cleaned, classified by an external
//! [`IntentClassifier`], and answered by a [`ReplyComposer`] that samples
//! phrases from fixed word banks. [`compose_intro`] builds unsolicited
//! opening remarks from the same kind of banks.

mod clean;
mod intro;
mod reply;
mod word_bank;

pub use clean::clean_message;
pub use intro::compose_intro;
pub use reply::{Reply, ReplyComposer};

use crate::models::Classification;
use crate::Result;

/// Classifications below this confidence never produce a reply
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Maps free text to a ranked list of intents, best first.
///
/// An empty list means "no classification" and is not an error. Implementations
/// own their request deadlines and report failures as [`crate::Error::Classification`].
pub trait IntentClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Classification>>;
}

impl<F> IntentClassifier for F
where
    F: Fn(&str) -> Result<Vec<Classification>>,
{
    fn classify(&self, text: &str) -> Result<Vec<Classification>> {
        self(text)
    }
}

/// Answers whether the bot already follows an actor back.
pub trait FollowCheck {
    fn is_following(&self, actor_handle: &str) -> Result<bool>;
}

impl<F> FollowCheck for F
where
    F: Fn(&str) -> Result<bool>,
{
    fn is_following(&self, actor_handle: &str) -> Result<bool> {
        self(actor_handle)
    }
}
