//! Nullable PoW validator: accept or reject fixed tokens.

use std::collections::HashSet;
use std::sync::Mutex;

use powdist_work::WorkValidator;

/// One recorded validation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationCheck {
    pub work: String,
    pub hash: String,
    pub difficulty: Option<u64>,
}

/// A validator that accepts exactly the configured work tokens.
pub struct NullWorkValidator {
    accepted: Option<HashSet<String>>,
    checks: Mutex<Vec<ValidationCheck>>,
}

impl NullWorkValidator {
    /// Accept only these tokens.
    pub fn accepting<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: Some(tokens.into_iter().map(Into::into).collect()),
            checks: Mutex::new(Vec::new()),
        }
    }

    /// Accept every token.
    pub fn accept_all() -> Self {
        Self {
            accepted: None,
            checks: Mutex::new(Vec::new()),
        }
    }

    /// Reject every token.
    pub fn reject_all() -> Self {
        Self::accepting(Vec::<String>::new())
    }

    /// Every call made so far, in order.
    pub fn checks(&self) -> Vec<ValidationCheck> {
        self.checks.lock().expect("null validator poisoned").clone()
    }
}

impl WorkValidator for NullWorkValidator {
    fn validate(&self, work: &str, hash: &str, difficulty: Option<u64>) -> bool {
        self.checks
            .lock()
            .expect("null validator poisoned")
            .push(ValidationCheck {
                work: work.to_string(),
                hash: hash.to_string(),
                difficulty,
            });
        match &self.accepted {
            Some(tokens) => tokens.contains(work),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_listed_tokens() {
        let v = NullWorkValidator::accepting(["good"]);
        assert!(v.validate("good", "h", None));
        assert!(!v.validate("bad", "h", Some(7)));
        assert_eq!(v.checks().len(), 2);
        assert_eq!(v.checks()[1].difficulty, Some(7));
    }

    #[test]
    fn accept_and_reject_all() {
        assert!(NullWorkValidator::accept_all().validate("x", "h", None));
        assert!(!NullWorkValidator::reject_all().validate("x", "h", None));
    }
}
