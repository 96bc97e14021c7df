//! Page walking over a single partition.
//!
//! Past an undocumented depth the server does not return an empty page or an error; it
//! keeps answering with the last valid page. The walker watches for that repetition (and
//! for the other end signals) and turns a partition into a finite sequence of batches.

use crate::client::CollectionClient;
use crate::domain::{ItemKey, KeyedItem, Partition, WalkEnd};
use crate::error::ExportError;
use std::collections::HashSet;
use tracing::debug;

/// Bounds for walking one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    /// Items requested per page; fixed for the whole walk.
    pub page_size: u32,
    /// First page index to request (1-based).
    pub start_page: u32,
    /// Maximum number of pages to walk; 0 removes the bound.
    pub max_pages: u32,
    /// End after this many consecutive pages add nothing new to the partition; 0 disables.
    pub stop_after_no_new: u32,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self { page_size: 20, start_page: 1, max_pages: 200, stop_after_no_new: 3 }
    }
}

/// One fetched page of a partition, keyed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    pub page_index: u32,
    pub items: Vec<KeyedItem>,
    /// Raw items on the page, including ones without a usable key.
    pub raw_count: usize,
    /// Keys on this page that were not seen earlier in the same partition.
    pub new_in_partition: usize,
    pub reported_page_count: Option<u32>,
}

/// Lazy iterator over the pages of one partition.
///
/// Yields `Ok(batch)` per page with content, or a single `Err` when a fetch fails, after
/// which the walk is over. [`PageWalker::end_reason`] tells why it ended.
pub struct PageWalker<'a, C: CollectionClient + ?Sized> {
    client: &'a C,
    partition: &'a Partition,
    limits: WalkLimits,
    next_page: u32,
    pages_walked: u32,
    total_pages: Option<u32>,
    previous_keys: Option<HashSet<ItemKey>>,
    seen_in_partition: HashSet<ItemKey>,
    no_new_streak: u32,
    ended: Option<WalkEnd>,
}

impl<'a, C: CollectionClient + ?Sized> PageWalker<'a, C> {
    pub fn new(client: &'a C, partition: &'a Partition, limits: WalkLimits) -> Self {
        Self {
            client,
            partition,
            limits,
            next_page: limits.start_page.max(1),
            pages_walked: 0,
            total_pages: None,
            previous_keys: None,
            seen_in_partition: HashSet::new(),
            no_new_streak: 0,
            ended: None,
        }
    }

    pub fn end_reason(&self) -> Option<WalkEnd> {
        self.ended
    }

    /// The page index the walker will request next (or just failed on).
    pub fn current_page(&self) -> u32 {
        self.next_page
    }

    pub fn pages_walked(&self) -> u32 {
        self.pages_walked
    }

    fn finish(&mut self, reason: WalkEnd) {
        debug!("{} ended at page {}: {:?}", self.partition, self.next_page, reason);
        self.ended = Some(reason);
    }

    fn step(&mut self) -> Option<Result<PageBatch, ExportError>> {
        if self.limits.max_pages > 0 && self.pages_walked >= self.limits.max_pages {
            self.finish(WalkEnd::PageLimit);
            return None;
        }
        if let Some(total) = self.total_pages {
            if self.next_page > total {
                self.finish(WalkEnd::LastReportedPage);
                return None;
            }
        }

        let page_index = self.next_page;
        let page = match self.client.fetch_page(self.partition, page_index, self.limits.page_size) {
            Ok(page) => page,
            Err(err) => {
                self.finish(WalkEnd::Failed);
                return Some(Err(err));
            }
        };

        // Only the first non-zero page count is trusted; zero means "unknown" here.
        if self.total_pages.is_none() {
            self.total_pages = page.reported_page_count.filter(|count| *count > 0);
        }

        if page.items.is_empty() {
            self.finish(WalkEnd::EmptyPage);
            return None;
        }

        let raw_count = page.items.len();
        let items: Vec<KeyedItem> = page
            .items
            .into_iter()
            .filter_map(|record| match record.key() {
                Some(key) => Some(KeyedItem { key, record }),
                None => {
                    debug!("{} page {page_index}: skipping item without a key", self.partition);
                    None
                }
            })
            .collect();

        let page_keys: HashSet<ItemKey> = items.iter().map(|item| item.key.clone()).collect();
        if !page_keys.is_empty() && self.previous_keys.as_ref() == Some(&page_keys) {
            self.finish(WalkEnd::RepeatedPage);
            return None;
        }

        let new_in_partition =
            page_keys.iter().filter(|key| self.seen_in_partition.insert((*key).clone())).count();
        if new_in_partition == 0 {
            self.no_new_streak += 1;
        } else {
            self.no_new_streak = 0;
        }

        self.previous_keys = Some(page_keys);
        self.pages_walked += 1;
        self.next_page += 1;

        if self.limits.stop_after_no_new > 0 && self.no_new_streak >= self.limits.stop_after_no_new {
            self.finish(WalkEnd::NoNewItems);
        }

        Some(Ok(PageBatch {
            page_index,
            items,
            raw_count,
            new_in_partition,
            reported_page_count: page.reported_page_count,
        }))
    }
}

impl<C: CollectionClient + ?Sized> Iterator for PageWalker<'_, C> {
    type Item = Result<PageBatch, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ended.is_some() {
            return None;
        }
        self.step()
    }
}
