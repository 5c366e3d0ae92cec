use uuid::Uuid;

// Fixed password that satisfies the API's complexity policy. Reused across
// iterations on purpose; only the email has to be unique.
const DUMMY_PASSWORD: &str = "Dummy@_pass1234";

#[derive(Debug, Clone)]
pub struct Identity {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

/// Produces registration payloads that will not collide across iterations.
/// The email embeds a full 128-bit random token; the nickname only gets a
/// short suffix, which is enough since the API keys accounts by email.
#[derive(Debug, Default)]
pub struct IdentityGenerator;

impl IdentityGenerator {
    pub fn next_identity(&mut self) -> Identity {
        let token = Uuid::new_v4().simple().to_string();
        Identity {
            nickname: format!("dummy_{}", &token[..8]),
            email: format!("dummy_{}@example.com", token),
            password: DUMMY_PASSWORD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn emails_are_unique_across_a_full_run() {
        let mut gen = IdentityGenerator;
        let emails: HashSet<String> = (0..1000).map(|_| gen.next_identity().email).collect();
        assert_eq!(emails.len(), 1000);
    }

    #[test]
    fn identity_fields_have_the_expected_shape() {
        let mut gen = IdentityGenerator;
        let identity = gen.next_identity();
        assert!(identity.nickname.starts_with("dummy_"));
        assert!(identity.email.starts_with("dummy_"));
        assert!(identity.email.ends_with("@example.com"));
        assert_eq!(identity.password, DUMMY_PASSWORD);
    }
}
