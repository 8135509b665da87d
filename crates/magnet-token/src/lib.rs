/// Magnet Token Library
///
/// Turns numeric account ids into short, URL-safe feed tokens. The encoding
/// is the salted hashids scheme restricted to a hex alphabet: anyone holding
/// the salt can reverse it, nobody else can enumerate feeds by counting.
///
/// This is an anti-enumeration measure only. It is not authentication.

pub mod feed_token;

pub use feed_token::{FEED_TOKEN_ALPHABET, FeedTokenGenerator, generate, looks_like_token};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("feed token salt is empty or unset")]
    MissingSalt,

    #[error("account id {0} is negative and cannot be encoded")]
    NegativeAccountId(i64),

    #[error("invalid token alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("malformed token")]
    Malformed,
}
