//! Paths that bypass authentication.

use crate::config::AllowListConfig;

/// Static set of path fragments, matched by substring containment.
#[derive(Debug, Clone)]
pub struct AllowList {
    fragments: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &AllowListConfig) -> Self {
        Self::new(config.fragments.iter().cloned())
    }

    pub fn permits(&self, path: &str) -> bool {
        self.fragments.iter().any(|fragment| path.contains(fragment.as_str()))
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fragments() {
        let allow = AllowList::from_config(&AllowListConfig::default());

        assert!(allow.permits("/api/media/public/logo.png"));
        assert!(allow.permits("/api/auth/login"));
        assert!(allow.permits("/api/auth/register/send-verification"));
        assert!(!allow.permits("/api/user/profile"));
        assert!(!allow.permits("/api/auth/refresh"));
    }

    #[test]
    fn test_containment_not_prefix() {
        let allow = AllowList::new(["/public"]);
        assert!(allow.permits("/v2/public/file"));
        assert!(!allow.permits("/pub"));
    }
}
