use validator::validate_email;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        let email = email.trim().to_string();

        if email.chars().any(char::is_whitespace)
            || !validate_email(&email)
            || !has_dotted_domain(&email)
        {
            return Err(format!("{} is not a valid email address", email));
        }

        Ok(Self(email))
    }
}

// The domain needs a dot with text on both sides: `user@localhost` is refused.
fn has_dotted_domain(email: &str) -> bool {
    email
        .rsplit_once('@')
        .map(|(_, domain)| {
            domain
                .split_once('.')
                .map_or(false, |(name, tld)| !name.is_empty() && !tld.is_empty())
        })
        .unwrap_or(false)
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
