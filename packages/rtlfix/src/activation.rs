//! Whether the current page should be corrected.

use rtlfix_traits::site::SiteId;

use crate::settings::SettingsSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivationState {
    Active,
    #[default]
    Inactive,
}

impl ActivationState {
    pub fn is_active(self) -> bool {
        self == ActivationState::Active
    }
}

impl From<bool> for ActivationState {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

/// How activation changed between two settings snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Became active. `unexcluded` is set when the site was just removed from the exclusion list.
    Activated { unexcluded: bool },
    /// Became inactive, because correction was switched off and/or the site was excluded.
    Deactivated { disabled: bool, excluded: bool },
    Unchanged,
}

/// Derives the activation state of one page from settings snapshots. The page's site
/// identity is fixed for the lifetime of the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPolicy {
    site: SiteId,
}

impl ActivationPolicy {
    pub fn new(site: SiteId) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &SiteId {
        &self.site
    }

    /// Active iff settings are known, correction is enabled and the site is not excluded.
    pub fn evaluate(&self, snapshot: Option<&SettingsSnapshot>) -> ActivationState {
        snapshot
            .is_some_and(|snapshot| snapshot.enabled && !snapshot.is_excluded(&self.site))
            .into()
    }

    pub fn transition(&self, previous: Option<&SettingsSnapshot>, next: &SettingsSnapshot) -> Transition {
        let was = self.evaluate(previous);
        let now = self.evaluate(Some(next));
        match (was, now) {
            (ActivationState::Inactive, ActivationState::Active) => Transition::Activated {
                unexcluded: previous.is_some_and(|previous| previous.is_excluded(&self.site)),
            },
            (ActivationState::Active, ActivationState::Inactive) => Transition::Deactivated {
                disabled: !next.enabled,
                excluded: next.is_excluded(&self.site),
            },
            _ => Transition::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(enabled: bool, excluded: &[&str]) -> SettingsSnapshot {
        SettingsSnapshot::new(enabled, excluded.iter().copied())
    }

    #[test]
    fn unknown_settings_are_inactive() {
        let policy = ActivationPolicy::new(SiteId::from_hostname("example.com"));
        assert_eq!(policy.evaluate(None), ActivationState::Inactive);
    }

    #[test]
    fn enabled_and_not_excluded_is_active() {
        let policy = ActivationPolicy::new(SiteId::from_hostname("example.com"));
        assert!(policy.evaluate(Some(&snapshot(true, &["other.com"]))).is_active());
        assert!(!policy.evaluate(Some(&snapshot(false, &[]))).is_active());
        assert!(!policy.evaluate(Some(&snapshot(true, &["Example.com"]))).is_active());
    }

    #[test]
    fn exclusion_is_exact_hostname_match() {
        let policy = ActivationPolicy::new(SiteId::from_hostname("news.example.com"));
        assert!(policy.evaluate(Some(&snapshot(true, &["example.com"]))).is_active());
    }

    #[test]
    fn transitions() {
        let policy = ActivationPolicy::new(SiteId::from_hostname("example.com"));
        let on = snapshot(true, &[]);
        let off = snapshot(false, &[]);
        let excluded = snapshot(true, &["example.com"]);

        assert_eq!(policy.transition(None, &on), Transition::Activated { unexcluded: false });
        assert_eq!(policy.transition(None, &off), Transition::Unchanged);
        assert_eq!(
            policy.transition(Some(&on), &off),
            Transition::Deactivated {
                disabled: true,
                excluded: false
            }
        );
        assert_eq!(
            policy.transition(Some(&on), &excluded),
            Transition::Deactivated {
                disabled: false,
                excluded: true
            }
        );
        assert_eq!(
            policy.transition(Some(&excluded), &on),
            Transition::Activated { unexcluded: true }
        );
        assert_eq!(policy.transition(Some(&on), &snapshot(true, &["a.com"])), Transition::Unchanged);
    }
}
