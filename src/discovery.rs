//! EIP-6963 provider registry and target wallet selection.

use crate::{
    eip1193::{ProviderInfo, SharedProvider},
    host::Announcement,
};
use chrono::{DateTime, Utc};
use log::debug;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
};

/// How the wanted wallet identifies itself: a self-declared boolean flag on
/// the provider object, or a substring of its announced reverse-DNS id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletTarget {
    pub flag: String,
    pub rdns_pattern: String,
}

impl WalletTarget {
    pub fn new(flag: &str, rdns_pattern: &str) -> Self {
        Self { flag: flag.to_string(), rdns_pattern: rdns_pattern.to_lowercase() }
    }

    pub fn metamask() -> Self {
        Self::new("isMetaMask", "metamask")
    }

    pub fn matches(&self, provider: &SharedProvider, info: Option<&ProviderInfo>) -> bool {
        if provider.has_flag(&self.flag) {
            return true;
        }
        match info {
            Some(info) if !self.rdns_pattern.is_empty() => {
                info.rdns.to_lowercase().contains(&self.rdns_pattern)
            }
            _ => false,
        }
    }
}

impl Default for WalletTarget {
    fn default() -> Self {
        Self::metamask()
    }
}

/// A provider that answered discovery
#[derive(Clone)]
pub struct DiscoveredProvider {
    pub key: String,
    pub info: Option<ProviderInfo>,
    pub provider: SharedProvider,
    pub discovered_at: DateTime<Utc>,
}

impl Debug for DiscoveredProvider {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "DiscoveredProvider {} {:?} at {}", self.key, self.info, self.discovered_at)
    }
}

/// Everything discovery has seen, plus the selected candidate
#[derive(Default)]
pub(crate) struct Registry {
    pub loaded: bool,
    pub candidate: Option<SharedProvider>,
    pub candidate_info: Option<ProviderInfo>,
    pub discovered: HashMap<String, DiscoveredProvider>,
}

impl Registry {
    /// Records an announcement. Returns true if it became the candidate.
    pub fn announce(&mut self, target: &WalletTarget, announcement: Announcement) -> bool {
        let Some(provider) = announcement.provider else {
            debug!("Ignoring announcement without a provider: {:?}", announcement.info);
            return false;
        };
        let info = announcement.info;

        let now = Utc::now();
        let key = provider_key(info.as_ref(), &now);
        self.discovered.insert(
            key.clone(),
            DiscoveredProvider {
                key: key.clone(),
                info: info.clone(),
                provider: provider.clone(),
                discovered_at: now,
            },
        );

        if self.candidate.is_some() || !target.matches(&provider, info.as_ref()) {
            return false;
        }
        debug!("Selected announced provider {key}");
        self.candidate = Some(provider);
        self.candidate_info = info;
        true
    }

    /// Legacy `window.ethereum` fallback, only consulted while nothing is selected
    pub fn refresh_legacy(&mut self, target: &WalletTarget, legacy: Vec<SharedProvider>) {
        if self.candidate.is_some() {
            return;
        }
        if let Some(provider) = legacy.into_iter().find(|p| p.has_flag(&target.flag)) {
            debug!("Selected legacy injected provider");
            self.candidate = Some(provider);
        }
    }
}

fn provider_key(info: Option<&ProviderInfo>, now: &DateTime<Utc>) -> String {
    match info {
        Some(info) if !info.uuid.is_empty() => info.uuid.clone(),
        Some(info) if !info.rdns.is_empty() => info.rdns.clone(),
        _ => format!("provider_{}_{}", now.timestamp_millis(), rand::random::<u32>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{info, MockProvider};
    use std::rc::Rc;

    fn announce(
        registry: &mut Registry,
        info: Option<ProviderInfo>,
        provider: &Rc<MockProvider>,
    ) -> bool {
        let provider: SharedProvider = provider.clone();
        registry.announce(&WalletTarget::metamask(), Announcement { info, provider: Some(provider) })
    }

    #[test]
    fn first_matching_announcement_wins() {
        let mut registry = Registry::default();
        let other = MockProvider::plain();
        let first = MockProvider::metamask();
        let second = MockProvider::metamask();

        assert!(!announce(&mut registry, Some(info("1", "Other", "com.other")), &other));
        assert!(registry.candidate.is_none());

        assert!(announce(&mut registry, Some(info("2", "MetaMask", "io.metamask")), &first));
        assert!(!announce(&mut registry, Some(info("3", "MetaMask Flask", "io.metamask.flask")), &second));
        assert!(!announce(&mut registry, Some(info("2", "MetaMask", "io.metamask")), &first));

        let candidate = registry.candidate.clone().unwrap();
        let expected: SharedProvider = first.clone();
        assert!(Rc::ptr_eq(&candidate, &expected));
        assert_eq!(registry.candidate_info.as_ref().unwrap().uuid, "2");
        assert_eq!(registry.discovered.len(), 3);
    }

    #[test]
    fn rdns_match_is_case_insensitive() {
        let mut registry = Registry::default();
        let unflagged = MockProvider::plain();
        assert!(announce(&mut registry, Some(info("x", "MetaMask", "IO.MetaMask")), &unflagged));
    }

    #[test]
    fn announcements_without_provider_are_ignored() {
        let mut registry = Registry::default();
        let accepted = registry.announce(
            &WalletTarget::metamask(),
            Announcement { info: Some(info("1", "MetaMask", "io.metamask")), provider: None },
        );
        assert!(!accepted);
        assert!(registry.discovered.is_empty());
    }

    #[test]
    fn anonymous_announcements_get_generated_keys() {
        let mut registry = Registry::default();
        announce(&mut registry, None, &MockProvider::plain());
        announce(&mut registry, None, &MockProvider::plain());
        assert_eq!(registry.discovered.len(), 2);
        assert!(registry.discovered.keys().all(|k| k.starts_with("provider_")));
    }

    #[test]
    fn rdns_is_the_fallback_key() {
        let mut registry = Registry::default();
        announce(&mut registry, Some(info("", "Rabby", "io.rabby")), &MockProvider::plain());
        assert!(registry.discovered.contains_key("io.rabby"));
    }

    #[test]
    fn legacy_scan_picks_first_flagged_provider() {
        let mut registry = Registry::default();
        let plain = MockProvider::plain();
        let flagged = MockProvider::metamask();
        let root = MockProvider::metamask();
        registry.refresh_legacy(
            &WalletTarget::metamask(),
            vec![plain as SharedProvider, flagged.clone() as SharedProvider, root as SharedProvider],
        );

        let expected: SharedProvider = flagged;
        assert!(Rc::ptr_eq(registry.candidate.as_ref().unwrap(), &expected));
        assert!(registry.candidate_info.is_none());
    }

    #[test]
    fn legacy_scan_never_replaces_a_candidate() {
        let mut registry = Registry::default();
        let announced = MockProvider::metamask();
        announce(&mut registry, Some(info("1", "MetaMask", "io.metamask")), &announced);
        registry.refresh_legacy(
            &WalletTarget::metamask(),
            vec![MockProvider::metamask() as SharedProvider],
        );

        let expected: SharedProvider = announced;
        assert!(Rc::ptr_eq(registry.candidate.as_ref().unwrap(), &expected));
    }
}
