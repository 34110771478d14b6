//! Bounded conversation memory for studyclaw.
//!
//! One store, one file: the conversation log lives in a JSON array on
//! disk, and compression keeps it under a configured size by replacing old
//! history with a synthetic summary message.

pub mod store;

pub use store::ConversationStore;
