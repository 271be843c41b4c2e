use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Salted SHA-256 password digest, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PasswordDigest {
    salt: String,
    digest: String,
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl PasswordDigest {
    pub(crate) fn new(password: &str) -> Self {
        let salt: [u8; 16] = rand::random();
        Self {
            salt: hex::encode(salt),
            digest: digest(&salt, password),
        }
    }

    pub(crate) fn verify(&self, password: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt) else {
            return false;
        };
        let candidate = digest(&salt, password);
        // Compare every byte regardless of where the first mismatch is.
        candidate.len() == self.digest.len()
            && candidate
                .bytes()
                .zip(self.digest.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}
