//! Reconciliation engine: walk every partition and union the pages into one collection.
//!
//! Partitions are walked one at a time and pages in order, because clamp detection needs
//! the previous page before the next one is requested. The dedup index is owned here and
//! nowhere else.

use crate::client::CollectionClient;
use crate::domain::{Partition, RunMetadata, WalkEnd};
use crate::error::ExportError;
use crate::index::{DedupIndex, DedupSnapshot};
use crate::scope::{enumerate_partitions, ExportScope};
use crate::sink::ProgressSink;
use crate::walker::{PageWalker, WalkLimits};
use tracing::{debug, info, warn};

/// Options for one export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOptions {
    pub limits: WalkLimits,
    /// Stop the whole run once this many unique items are indexed.
    pub expected_count: Option<usize>,
}

/// What a run produced: the final collection and how the run went.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub metadata: RunMetadata,
    pub snapshot: DedupSnapshot,
}

impl ExportReport {
    pub fn unique_items(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_complete(&self) -> bool {
        self.metadata.failed_partitions.is_empty()
    }
}

pub struct Reconciler<'c, C: CollectionClient + ?Sized> {
    client: &'c C,
    options: ReconcileOptions,
}

impl<'c, C: CollectionClient + ?Sized> Reconciler<'c, C> {
    pub fn new(client: &'c C, options: ReconcileOptions) -> Self {
        Self { client, options }
    }

    /// Walk `partitions` in order, reporting to `sink` after every page.
    ///
    /// Transport failures abandon only the partition they happen in. Authentication and
    /// configuration failures abort the run; whatever the sink already holds stays there.
    pub fn run<S>(&self, partitions: &[Partition], sink: &mut S) -> Result<ExportReport, ExportError>
    where
        S: ProgressSink + ?Sized,
    {
        let target_types = partitions
            .first()
            .map(|p| p.target_types.iter().copied().collect())
            .unwrap_or_default();
        let mut metadata = RunMetadata::new(target_types, self.options.expected_count);
        let mut index = DedupIndex::new();

        info!("walking {} partitions", partitions.len());
        'partitions: for partition in partitions {
            metadata.begin_partition(partition);
            info!("{partition} ({}): starting", partition.folder.title);

            let mut walker = PageWalker::new(self.client, partition, self.options.limits);
            while let Some(step) = walker.next() {
                let batch = match step {
                    Ok(batch) => batch,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        warn!("{partition}: page {} failed, skipping partition: {err}", walker.current_page());
                        metadata.record_failure(partition, walker.current_page(), err.to_string());
                        break;
                    }
                };

                let first = batch.items.first().map(|i| i.key.to_string());
                let last = batch.items.last().map(|i| i.key.to_string());
                let mut added = 0usize;
                for item in batch.items {
                    if !partition.accepts(item.key.target_type) {
                        continue;
                    }
                    if index.insert_if_absent(item.key, item.record) {
                        added += 1;
                    }
                }

                metadata.record_page(partition, batch.page_index, added, index.len());
                debug!(
                    "{partition} page {}: items={} newInPartition={} added={} unique={} totalPage={:?} first={:?} last={:?}",
                    batch.page_index,
                    batch.raw_count,
                    batch.new_in_partition,
                    added,
                    index.len(),
                    batch.reported_page_count,
                    first,
                    last,
                );

                let reached_expected =
                    self.options.expected_count.is_some_and(|expected| index.len() >= expected);
                if reached_expected {
                    metadata.stopped = true;
                    metadata.end_partition(WalkEnd::Stopped);
                }
                persist(sink, &metadata, &index);

                if reached_expected {
                    info!("reached expected count of {} unique items, stopping", index.len());
                    break 'partitions;
                }
            }

            let ended = walker.end_reason().unwrap_or(WalkEnd::Failed);
            metadata.end_partition(ended);
            info!(
                "{partition}: {:?} after {} pages, {} unique so far",
                ended,
                walker.pages_walked(),
                index.len()
            );
        }

        persist(sink, &metadata, &index);
        Ok(ExportReport { metadata, snapshot: index.snapshot() })
    }
}

/// Enumerate `scope` and reconcile all of its partitions.
pub fn run_export<C, S>(
    client: &C,
    scope: &ExportScope,
    options: &ReconcileOptions,
    sink: &mut S,
) -> Result<ExportReport, ExportError>
where
    C: CollectionClient + ?Sized,
    S: ProgressSink + ?Sized,
{
    let partitions = enumerate_partitions(scope)?;
    Reconciler::new(client, *options).run(&partitions, sink)
}

/// Sink failures are reported but never stop the run.
fn persist<S: ProgressSink + ?Sized>(sink: &mut S, metadata: &RunMetadata, index: &DedupIndex) {
    if let Err(err) = sink.record(metadata, &index.snapshot()) {
        warn!("failed to persist progress: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Page;
    use crate::domain::{Folder, RawItem, SortOrder, TargetType};
    use serde_json::json;
    use std::collections::{BTreeSet, HashMap};

    /// Serves scripted pages per folder id; missing pages are empty.
    struct FolderPages(HashMap<&'static str, Vec<Vec<(i64, &'static str)>>>);

    impl CollectionClient for FolderPages {
        fn fetch_page(&self, partition: &Partition, page_index: u32, _: u32) -> Result<Page, ExportError> {
            let items = self
                .0
                .get(partition.folder.id.as_str())
                .and_then(|pages| pages.get(page_index as usize - 1))
                .map(|items| {
                    items
                        .iter()
                        .map(|(tt, id)| RawItem(json!({"targetType": tt, "target": {"objectId": id}})))
                        .collect()
                })
                .unwrap_or_default();
            Ok(Page { items, reported_page_count: None })
        }
    }

    fn partition(folder: &str, types: &[i64]) -> Partition {
        Partition {
            folder: Folder::new(folder, folder),
            sort_order: SortOrder(0),
            target_types: types.iter().copied().map(TargetType).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn items_outside_type_filter_are_not_indexed() {
        let client = FolderPages(HashMap::from([("F", vec![vec![(102, "w"), (120, "s"), (10, "link")]])]));
        let partitions = vec![partition("F", &[102, 120])];
        let report = Reconciler::new(&client, ReconcileOptions::default())
            .run(&partitions, &mut crate::sink::NoProgress)
            .unwrap();
        let keys: Vec<String> = report.snapshot.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["102:w", "120:s"]);
    }

    #[test]
    fn sink_is_called_per_page_plus_final() {
        let client = FolderPages(HashMap::from([("F", vec![vec![(102, "a")], vec![(102, "b")]])]));
        let partitions = vec![partition("F", &[102])];
        let mut calls = Vec::new();
        let mut sink = |meta: &RunMetadata, snapshot: &DedupSnapshot| {
            calls.push((meta.last.as_ref().map(|l| l.page_index), snapshot.len()));
        };
        Reconciler::new(&client, ReconcileOptions::default()).run(&partitions, &mut sink).unwrap();
        assert_eq!(calls, vec![(Some(1), 1), (Some(2), 2), (Some(2), 2)]);
    }

    #[test]
    fn failing_sink_does_not_abort_run() {
        struct Broken;
        impl ProgressSink for Broken {
            fn record(&mut self, _: &RunMetadata, _: &DedupSnapshot) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
        }
        let client = FolderPages(HashMap::from([("F", vec![vec![(102, "a")]])]));
        let report = Reconciler::new(&client, ReconcileOptions::default())
            .run(&[partition("F", &[102])], &mut Broken)
            .unwrap();
        assert_eq!(report.unique_items(), 1);
    }

    #[test]
    fn partition_progress_records_end_reason() {
        let client = FolderPages(HashMap::from([("F", vec![vec![(102, "a")], vec![(102, "a")]])]));
        let report = Reconciler::new(&client, ReconcileOptions::default())
            .run(&[partition("F", &[102])], &mut crate::sink::NoProgress)
            .unwrap();
        let progress = &report.metadata.partitions[0];
        assert_eq!(progress.ended, Some(WalkEnd::RepeatedPage));
        assert_eq!(progress.pages_walked, 1);
        assert_eq!(progress.last_page, Some(1));
        assert_eq!(progress.new_items, 1);
        assert!(report.is_complete());
    }
}
