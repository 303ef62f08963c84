use dashmap::DashMap;
use std::collections::BTreeMap;

/// Discovered asset URLs grouped by domain
///
/// Shared by every branch of one crawl run. Domain creation and appends go
/// through the map's entry API, so concurrent first discovery of a domain
/// yields a single list and no append is lost. Duplicate URLs inside one
/// domain's list are kept; the download manager de-duplicates them.
#[derive(Debug, Default)]
pub struct AssetMap {
    domains: DashMap<String, Vec<String>>,
}

impl AssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `domain` has a (possibly empty) list
    pub fn ensure_domain(&self, domain: &str) {
        self.domains.entry(domain.to_string()).or_default();
    }

    /// Appends asset URLs to the domain's list, creating it if needed
    pub fn append<I>(&self, domain: &str, assets: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .extend(assets);
    }

    /// Copy of one domain's list
    pub fn get(&self, domain: &str) -> Option<Vec<String>> {
        self.domains.get(domain).map(|list| list.value().clone())
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.domains.contains_key(domain)
    }

    /// Number of domains, including those without assets
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Total number of asset URLs across all domains
    pub fn asset_count(&self) -> usize {
        self.domains.iter().map(|list| list.value().len()).sum()
    }

    /// Domain-sorted copy of the whole map
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.domains
            .iter()
            .map(|list| (list.key().clone(), list.value().clone()))
            .collect()
    }
}

impl FromIterator<(String, Vec<String>)> for AssetMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        let map = AssetMap::new();
        for (domain, assets) in iter {
            map.append(&domain, assets);
        }
        map
    }
}
