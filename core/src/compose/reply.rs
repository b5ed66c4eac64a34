use super::word_bank::{
    fill_slots, CONTENT_SUBJECTS, FOLLOW_SUBJECTS, FOR, GREETINGS, MENTION_SUBJECTS, OPENERS,
    RECIPROCALS, THANKS,
};
use super::{clean_message, compose_intro, FollowCheck, IntentClassifier, CONFIDENCE_THRESHOLD};
use crate::models::Intent;
use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Outcome of a composition attempt. "No reply" is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub composed: bool,
}

impl Reply {
    pub fn none() -> Self {
        Self::default()
    }

    fn mention(actor_handle: &str, body: &str) -> Self {
        Self {
            text: format!("@{} {}", actor_handle, body),
            composed: true,
        }
    }
}

/// Composes replies to classified messages.
///
/// Holds its own randomness source so tests can pass a seeded or mock
/// generator, and the follow-check collaborator used by
/// [`Intent::AppreciationForFollow`].
///
/// Follow-check policy: when the follow check fails, the composer treats the
/// actor as not followed and answers with the generic appreciation phrasing.
/// The failure is logged and never surfaced to the caller.
pub struct ReplyComposer<R: Rng, F: FollowCheck> {
    rng: R,
    follow_check: F,
}

impl<F: FollowCheck> ReplyComposer<StdRng, F> {
    /// Composer seeded from the operating system
    pub fn from_entropy(follow_check: F) -> Self {
        Self::new(StdRng::from_entropy(), follow_check)
    }
}

impl<R: Rng, F: FollowCheck> ReplyComposer<R, F> {
    pub fn new(rng: R, follow_check: F) -> Self {
        Self { rng, follow_check }
    }

    /// Compose a reply for a classifier label and its confidence.
    ///
    /// Returns [`Reply::none`] for low confidence, unknown labels, or an
    /// unusable actor handle.
    pub fn compose(&mut self, intent_label: &str, confidence: f64, actor_handle: &str) -> Reply {
        if confidence.is_nan() || confidence < CONFIDENCE_THRESHOLD {
            debug!(intent = intent_label, confidence, "Not enough confidence for intent");
            return Reply::none();
        }

        match Intent::from_label(intent_label) {
            Some(intent) => self.compose_intent(intent, actor_handle),
            None => {
                debug!(intent = intent_label, "Unsupported intent");
                Reply::none()
            }
        }
    }

    /// Compose a reply for an already accepted intent
    pub fn compose_intent(&mut self, intent: Intent, actor_handle: &str) -> Reply {
        if actor_handle.is_empty() || actor_handle.chars().any(char::is_whitespace) {
            warn!(handle = actor_handle, "Refusing to mention malformed handle");
            return Reply::none();
        }

        let body = match intent {
            Intent::Greeting => fill_slots(&mut self.rng, &[GREETINGS]),
            Intent::AppreciationForContent => {
                fill_slots(&mut self.rng, &[OPENERS, THANKS, FOR, CONTENT_SUBJECTS])
            }
            Intent::AppreciationForFollow => {
                if self.is_followed_back(actor_handle) {
                    fill_slots(
                        &mut self.rng,
                        &[OPENERS, THANKS, FOR, FOLLOW_SUBJECTS, RECIPROCALS],
                    )
                } else {
                    fill_slots(&mut self.rng, &[OPENERS, THANKS, FOR, MENTION_SUBJECTS])
                }
            }
        };

        Reply::mention(actor_handle, &body)
    }

    /// Clean, classify, and answer a raw incoming message.
    ///
    /// Classifier errors propagate unchanged and are not retried.
    pub fn respond<C>(&mut self, classifier: &C, raw_text: &str, actor_handle: &str) -> Result<Reply>
    where
        C: IntentClassifier + ?Sized,
    {
        let message = clean_message(raw_text);
        if message.is_empty() {
            return Ok(Reply::none());
        }

        let outcomes = classifier.classify(&message)?;
        match outcomes.first() {
            Some(best) => Ok(self.compose(&best.intent, best.confidence, actor_handle)),
            None => Ok(Reply::none()),
        }
    }

    /// A stand-alone opening remark, see [`compose_intro`]
    pub fn intro(&mut self) -> String {
        compose_intro(&mut self.rng)
    }

    fn is_followed_back(&self, actor_handle: &str) -> bool {
        match self.follow_check.is_following(actor_handle) {
            Ok(following) => following,
            Err(err) => {
                warn!(handle = actor_handle, error = %err, "Follow check failed, using generic thanks");
                false
            }
        }
    }
}
