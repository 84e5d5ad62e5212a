//! Opaque token generation for confirmation and reschedule links.

use rand::distributions::Alphanumeric;
use rand::Rng;

pub trait TokenGenerator: Send + Sync {
    /// Produce a cryptographically random opaque identifier.
    fn generate(&self) -> String;
}

const TOKEN_LEN: usize = 32;

/// Alphanumeric tokens from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandTokenGenerator;

impl TokenGenerator for RandTokenGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect()
    }
}
