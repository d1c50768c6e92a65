//! Cached list responses with loading and error flags.

/// Where a [`ListCache`] is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// The last successfully fetched list, plus the state of the current fetch.
///
/// A failed fetch records its error and keeps whatever items were loaded
/// before, so the UI can keep showing stale data next to the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCache<T> {
    items: Vec<T>,
    status: LoadStatus,
    error: Option<String>,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: LoadStatus::Idle,
            error: None,
        }
    }
}

impl<T> ListCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch: mark loading and clear any previous error.
    pub fn begin(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    /// Finish a fetch successfully, replacing the cached items.
    pub fn resolve(&mut self, items: Vec<T>) {
        self.items = items;
        self.status = LoadStatus::Loaded;
        self.error = None;
    }

    /// Finish a fetch with an error. Cached items are left as they were.
    pub fn reject(&mut self, error: impl Into<String>) {
        self.status = LoadStatus::Errored;
        self.error = Some(error.into());
    }

    /// Forget the last error without touching the items.
    pub fn clear_error(&mut self) {
        self.error = None;
        if self.status == LoadStatus::Errored {
            self.status = if self.items.is_empty() {
                LoadStatus::Idle
            } else {
                LoadStatus::Loaded
            };
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access for in-place updates after a successful mutation
    /// (e.g. a like toggle) without refetching the whole list.
    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    #[must_use]
    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_cycle() {
        let mut cache = ListCache::new();
        assert_eq!(cache.status(), LoadStatus::Idle);

        cache.begin();
        assert!(cache.is_loading());

        cache.resolve(vec!["a", "b"]);
        assert_eq!(cache.status(), LoadStatus::Loaded);
        assert_eq!(cache.items(), &["a", "b"]);
        assert!(cache.error().is_none());
    }

    #[test]
    fn test_failure_keeps_previous_items() {
        let mut cache = ListCache::new();
        cache.begin();
        cache.resolve(vec![1, 2, 3]);

        cache.begin();
        cache.reject("connection refused");

        assert_eq!(cache.status(), LoadStatus::Errored);
        assert_eq!(cache.error(), Some("connection refused"));
        assert_eq!(cache.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_begin_clears_error() {
        let mut cache: ListCache<u8> = ListCache::new();
        cache.begin();
        cache.reject("boom");

        cache.begin();
        assert!(cache.error().is_none());
        assert!(cache.is_loading());
    }

    #[test]
    fn test_clear_error_keeps_items() {
        let mut cache = ListCache::new();
        cache.begin();
        cache.resolve(vec![7]);
        cache.begin();
        cache.reject("timeout");

        cache.clear_error();
        assert!(cache.error().is_none());
        assert_eq!(cache.status(), LoadStatus::Loaded);
        assert_eq!(cache.items(), &[7]);
    }
}
