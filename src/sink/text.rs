//! Plain-text output, appended as items are discovered.

use super::ProgressSink;
use crate::domain::RunMetadata;
use crate::index::DedupSnapshot;
use crate::render::{render_block, WordCache};
use anyhow::{Context, Result};
use std::io::Write;

/// Renders the items added since the previous call and appends them to `out`.
///
/// Snapshots only ever grow in discovery order, so the items already written are a
/// prefix of every later snapshot.
pub struct TextSink<'a> {
    out: Box<dyn Write + 'a>,
    words: WordCache<'a>,
    seen: usize,
    rendered: usize,
}

impl<'a> TextSink<'a> {
    pub fn new(out: impl Write + 'a, words: WordCache<'a>) -> Self {
        Self { out: Box::new(out), words, seen: 0, rendered: 0 }
    }

    /// Items that produced a block so far.
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// Items looked at so far, rendered or skipped.
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl ProgressSink for TextSink<'_> {
    fn record(&mut self, _metadata: &RunMetadata, snapshot: &DedupSnapshot) -> Result<()> {
        for item in snapshot.iter().skip(self.seen) {
            if let Some(block) = render_block(item, &mut self.words) {
                self.out.write_all(block.as_bytes()).context("Failed writing text output")?;
                self.rendered += 1;
            }
            self.seen += 1;
        }
        self.out.flush().context("Failed flushing text output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemKey, RawItem, TargetType};
    use crate::index::DedupIndex;
    use crate::render::render_text;
    use serde_json::json;
    use similar_asserts::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Collects written bytes where the test can still see them.
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).expect("utf8 output")
        }
    }

    fn sentence(index: &mut DedupIndex, id: &str, title: &str) {
        let record = RawItem(json!({"targetType": 120, "target": {"objectId": id, "title": title}}));
        index.insert_if_absent(ItemKey::new(TargetType::SENTENCE, id), record);
    }

    #[test]
    fn appends_only_new_items_per_page() {
        let buffer = Shared::default();
        let mut sink = TextSink::new(buffer.clone(), WordCache::offline());
        let meta = RunMetadata::new(vec![TargetType::SENTENCE], None);
        let mut index = DedupIndex::new();

        sentence(&mut index, "s1", "一つ目");
        sink.record(&meta, &index.snapshot()).expect("first page");
        assert_eq!(buffer.text(), "\n---\n一つ目\n");

        sentence(&mut index, "s2", "");
        sentence(&mut index, "s3", "三つ目");
        sink.record(&meta, &index.snapshot()).expect("second page");
        sink.record(&meta, &index.snapshot()).expect("repeated state");

        let (whole, count) = render_text(&index.snapshot(), &mut WordCache::offline());
        assert_eq!(buffer.text(), whole);
        assert_eq!(sink.rendered(), count);
        assert_eq!(sink.rendered(), 2);
        assert_eq!(sink.seen(), 3);
    }
}
