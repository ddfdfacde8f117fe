use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

mod patterns {
    #![allow(clippy::unwrap_used)]

    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    }
}

use patterns::EMAIL_REGEX;

static GLOBAL_REDACTOR: OnceLock<PiiRedactor> = OnceLock::new();

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    /// Redact every recognised PII value inside free text.
    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    /// Redact a value known to be an email address, whether or not it is well formed.
    pub fn redact_email(&self, email: &str) -> String {
        if !self.config.redact_emails {
            return email.to_string();
        }
        self.mask_email(email)
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                self.mask_email(caps.get(0).map_or("", |m| m.as_str()))
            })
            .to_string()
    }

    fn mask_email(&self, email: &str) -> String {
        if self.config.hash_for_correlation {
            return format!("EMAIL[{}]", hash_value(email));
        }

        match email.split_once('@') {
            Some((local, domain)) => format!("{}***@{}***", first_char(local), first_char(domain)),
            None => "***@***".to_string(),
        }
    }
}

fn first_char(value: &str) -> String {
    value.chars().take(1).collect()
}

fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_lowercase().as_bytes());
    let result = hasher.finalize();
    // First 8 bytes keep the tag short
    let prefix: Vec<u8> = result.iter().take(8).copied().collect();
    general_purpose::STANDARD_NO_PAD.encode(prefix)
}

/// Install the process-wide redactor. Returns `false` if one was already installed.
pub fn install_redactor(redactor: PiiRedactor) -> bool {
    GLOBAL_REDACTOR.set(redactor).is_ok()
}

fn global() -> &'static PiiRedactor {
    GLOBAL_REDACTOR.get_or_init(PiiRedactor::default)
}

/// Redact an email address with the process-wide redactor.
pub fn redact_email(email: &str) -> String {
    global().redact_email(email)
}

/// Redact PII inside free text with the process-wide redactor.
pub fn redact(text: &str) -> String {
    global().redact(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn masking() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_email_masking() {
        let redacted = masking().redact("User john.doe@example.com logged in");
        assert_eq!(redacted, "User j***@e*** logged in");
    }

    #[test]
    fn test_email_hash_is_stable() {
        let redactor = PiiRedactor::default();
        let first = redactor.redact_email("a@x.com");
        let second = redactor.redact_email("A@X.com");

        assert!(first.starts_with("EMAIL["));
        assert!(!first.contains("a@x.com"));
        assert_eq!(first, second);
        assert_ne!(first, redactor.redact_email("b@x.com"));
    }

    #[test]
    fn test_malformed_email_still_redacted() {
        assert_eq!(masking().redact_email("not-an-email"), "***@***");
        assert!(PiiRedactor::default()
            .redact_email("not-an-email")
            .starts_with("EMAIL["));
    }

    #[test]
    fn test_custom_patterns() {
        let redactor = PiiRedactor::new(RedactionConfig {
            custom_patterns: vec![(Regex::new(r"token=\S+").unwrap(), "token=[REDACTED]".to_string())],
            ..Default::default()
        });

        assert_eq!(redactor.redact("login token=abc.def"), "login token=[REDACTED]");
    }

    #[test]
    fn test_disabled_email_redaction_passes_through() {
        let redactor = PiiRedactor::new(RedactionConfig {
            redact_emails: false,
            ..Default::default()
        });
        assert_eq!(redactor.redact_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_multibyte_local_part() {
        assert_eq!(masking().redact_email("élodie@x.com"), "é***@x***");
    }

    proptest! {
        #[test]
        fn prop_redacted_text_never_contains_email(local in "[a-z]{1,12}", domain in "[a-z]{1,12}") {
            let email = format!("{}@{}.com", local, domain);
            let text = format!("Login for {} failed", email);
            prop_assert!(!PiiRedactor::default().redact(&text).contains(&email));
            prop_assert!(!masking().redact(&text).contains(&email));
        }
    }
}
