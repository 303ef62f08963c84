use dashmap::DashSet;

/// Set of URLs already claimed during one crawl run
///
/// Entries are never removed. [`VisitedSet::insert`] is an atomic
/// check-and-insert, so when two branches race on the same URL exactly one
/// of them wins and fetches it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`, returning false if it was already claimed
    pub fn insert(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Sorted copy of every claimed URL
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.iter().map(|u| u.key().clone()).collect();
        urls.sort();
        urls
    }
}
