use std::fmt;

use harsh::Harsh;

use crate::TokenError;

/// Feed tokens only ever contain these characters.
pub const FEED_TOKEN_ALPHABET: &str = "0123456789abcdef";

/// Derives feed tokens from account ids. Build once per salt and share.
pub struct FeedTokenGenerator {
    harsh: Harsh,
}

impl FeedTokenGenerator {
    pub fn new(salt: &str) -> Result<Self, TokenError> {
        if salt.trim().is_empty() {
            return Err(TokenError::MissingSalt);
        }
        let harsh = Harsh::builder()
            .salt(salt)
            .alphabet(FEED_TOKEN_ALPHABET)
            .build()
            .map_err(|e| TokenError::InvalidAlphabet(e.to_string()))?;
        Ok(Self { harsh })
    }

    pub fn generate(&self, account_id: i64) -> Result<String, TokenError> {
        let id = u64::try_from(account_id).map_err(|_| TokenError::NegativeAccountId(account_id))?;
        Ok(self.harsh.encode(&[id]))
    }

    /// Recover the account id a token was generated from.
    ///
    /// Only canonical tokens are accepted: the id must re-encode to exactly
    /// `token`.
    pub fn decode(&self, token: &str) -> Result<i64, TokenError> {
        let ids = self.harsh.decode(token).map_err(|_| TokenError::Malformed)?;
        let [id] = ids.as_slice() else {
            return Err(TokenError::Malformed);
        };
        if self.harsh.encode(&[*id]) != token {
            return Err(TokenError::Malformed);
        }
        i64::try_from(*id).map_err(|_| TokenError::Malformed)
    }
}

// Never print the salt.
impl fmt::Debug for FeedTokenGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedTokenGenerator").finish_non_exhaustive()
    }
}

/// Cheap syntactic check: could this string have come out of `generate`?
pub fn looks_like_token(token: &str) -> bool {
    // i64::MAX encodes to 20 characters with the hex alphabet.
    !token.is_empty() && token.len() <= 32 && token.chars().all(|c| FEED_TOKEN_ALPHABET.contains(c))
}

/// One-shot token generation for callers that do not keep a generator.
pub fn generate(account_id: i64, salt: &str) -> Result<String, TokenError> {
    FeedTokenGenerator::new(salt)?.generate(account_id)
}
