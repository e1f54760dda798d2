//! Bounded cache of decoded gallery images keyed by index

use image::DynamicImage;
use std::collections::{HashMap, VecDeque};

/// Least-recently-used cache of decoded images
#[derive(Debug)]
pub struct ImageCache {
    capacity: usize,
    entries: HashMap<usize, DynamicImage>,
    recency: VecDeque<usize>,
}

impl ImageCache {
    /// Cache holding at most `capacity` images; zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    fn touch(&mut self, index: usize) {
        self.recency.retain(|&i| i != index);
        self.recency.push_back(index);
    }

    /// Cached image at `index`
    pub fn get(&mut self, index: usize) -> Option<&DynamicImage> {
        if self.entries.contains_key(&index) {
            self.touch(index);
        }
        self.entries.get(&index)
    }

    /// Store an image, evicting the least recently used one when full
    pub fn insert(&mut self, index: usize, image: DynamicImage) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&index) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self.recency.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(index, image);
        self.touch(index);
    }

    /// Drop the image at `index`
    pub fn remove(&mut self, index: usize) -> Option<DynamicImage> {
        self.recency.retain(|&i| i != index);
        self.entries.remove(&index)
    }

    /// Whether `index` is cached
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Cached images
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }
}
