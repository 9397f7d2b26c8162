use rand::{Rng, distr::Alphanumeric};

pub const DEFAULT_PASSWORD_LEN: usize = 16;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// How requested account names are fitted into the engine's identifier limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierPolicy {
    max_len: Option<usize>,
    suffix_len: usize,
}

impl Default for IdentifierPolicy {
    /// Legacy MySQL: 16 characters, 12 kept from the request plus 4 random.
    fn default() -> Self {
        Self::truncating(16, 4)
    }
}

impl IdentifierPolicy {
    /// Names longer than `max_len` keep their first `max_len - suffix_len`
    /// characters and get a random alphanumeric suffix.
    pub fn truncating(max_len: usize, suffix_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            suffix_len: suffix_len.min(max_len),
        }
    }

    /// For engines without an account-name limit.
    pub fn unbounded() -> Self {
        Self {
            max_len: None,
            suffix_len: 0,
        }
    }

    pub fn derive_username(&self, requested: &str) -> String {
        let Some(max_len) = self.max_len else {
            return requested.to_string();
        };
        if requested.chars().count() <= max_len {
            return requested.to_string();
        }
        let mut name: String = requested.chars().take(max_len - self.suffix_len).collect();
        name.push_str(&random_alphanumeric(self.suffix_len));
        name
    }
}

/// Initial account password; tenants are expected to rotate it.
pub fn generate_password(len: usize) -> String {
    random_alphanumeric(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn short_names_are_kept_verbatim() {
        let policy = IdentifierPolicy::default();
        assert_eq!(policy.derive_username("ciclops"), "ciclops");
        assert_eq!(
            policy.derive_username("exactlysixteench"),
            "exactlysixteench"
        );
    }

    #[test]
    fn long_names_are_truncated_with_random_suffix() {
        let policy = IdentifierPolicy::default();
        let name = policy.derive_username("usernamegreaterthan16");
        assert_eq!(name.chars().count(), 16);
        assert!(name.starts_with("usernamegrea"));
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn truncated_names_rarely_collide() {
        let policy = IdentifierPolicy::default();
        let names: HashSet<String> = (0..50)
            .map(|_| policy.derive_username("usernamegreaterthan16"))
            .collect();
        assert!(names.len() > 45);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let policy = IdentifierPolicy::truncating(8, 2);
        let name = policy.derive_username("ééééééééé");
        assert_eq!(name.chars().count(), 8);
        assert!(name.starts_with("éééééé"));
    }

    #[test]
    fn unbounded_policy_never_truncates() {
        let long = "x".repeat(64);
        assert_eq!(IdentifierPolicy::unbounded().derive_username(&long), long);
    }

    #[test]
    fn passwords_have_requested_length() {
        let pw = generate_password(DEFAULT_PASSWORD_LEN);
        assert_eq!(pw.len(), DEFAULT_PASSWORD_LEN);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(pw, generate_password(DEFAULT_PASSWORD_LEN));
    }
}
