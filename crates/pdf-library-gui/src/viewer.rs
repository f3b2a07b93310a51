use std::collections::{HashMap, VecDeque};

/// Rendered page bitmap
#[derive(Clone)]
pub struct CachedPage {
    pub rgba_data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Maximum number of pages to cache
const MAX_CACHED_PAGES: usize = 50;

/// LRU cache of rendered pages for the open document
pub struct PageCache {
    pages: HashMap<usize, CachedPage>,
    order: VecDeque<usize>,
    capacity: usize,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHED_PAGES)
    }
}

impl PageCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&mut self, page_index: usize, page: CachedPage) {
        if self.pages.contains_key(&page_index) {
            self.order.retain(|k| *k != page_index);
        }

        while self.order.len() >= self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.pages.remove(&old);
            }
        }

        self.pages.insert(page_index, page);
        self.order.push_back(page_index);
    }

    pub fn get(&mut self, page_index: usize) -> Option<&CachedPage> {
        if self.pages.contains_key(&page_index) {
            self.order.retain(|k| *k != page_index);
            self.order.push_back(page_index);
            self.pages.get(&page_index)
        } else {
            None
        }
    }

    pub fn contains(&self, page_index: usize) -> bool {
        self.pages.contains_key(&page_index)
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Neighbouring pages worth rendering ahead of time
pub fn prefetch_candidates(page_index: usize, page_count: usize) -> Vec<usize> {
    [page_index + 1, page_index + 2, page_index.wrapping_sub(1)]
        .into_iter()
        .filter(|&i| i < page_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(width: usize) -> CachedPage {
        CachedPage {
            rgba_data: vec![0; width * 4],
            width,
            height: 1,
        }
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = PageCache::with_capacity(2);
        cache.insert(0, page(1));
        cache.insert(1, page(1));
        // Touch 0 so 1 becomes the oldest
        assert!(cache.get(0).is_some());
        cache.insert(2, page(1));

        assert!(cache.contains(0));
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut cache = PageCache::with_capacity(2);
        cache.insert(0, page(1));
        cache.insert(0, page(3));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(0).map(|p| p.width), Some(3));
        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_prefetch_candidates_stay_in_range() {
        assert_eq!(prefetch_candidates(0, 5), [1, 2]);
        assert_eq!(prefetch_candidates(2, 5), [3, 4, 1]);
        assert_eq!(prefetch_candidates(4, 5), [3]);
        assert!(prefetch_candidates(0, 1).is_empty());
    }
}
