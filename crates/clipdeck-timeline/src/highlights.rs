//! Highlight aggregation over checked clips.

use clipdeck_models::Highlight;
use tracing::info;

use crate::error::{TimelineError, TimelineResult};
use crate::store::ClipStore;

/// Highlights created during one editing session.
#[derive(Debug, Clone, Default)]
pub struct HighlightAggregator {
    highlights: Vec<Highlight>,
}

impl HighlightAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every checked clip into a new highlight and clear the checklist.
    ///
    /// Clips appear in list order, not in the order they were checked.
    pub fn create_highlight(&mut self, store: &mut ClipStore) -> TimelineResult<Highlight> {
        if store.checked_ids().is_empty() {
            return Err(TimelineError::NothingChecked);
        }

        let n = self.highlights.len() as u64 + 1;
        let highlight = Highlight::from_clips(n, store.checked_clips());
        store.clear_checked();

        info!(
            highlight = %highlight.video_name,
            clips = highlight.clips.len(),
            total_secs = highlight.total_secs(),
            "Highlight created"
        );

        self.highlights.push(highlight.clone());
        Ok(highlight)
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// One line per highlight: name, ranges and labels.
    pub fn describe(&self) -> Vec<String> {
        self.highlights
            .iter()
            .map(|h| format!("{} [{}] ({})", h.video_name, h.ranges_summary(), h.meta_summary()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdeck_models::{Clip, ClipId, TimeRange};

    fn store() -> ClipStore {
        ClipStore::with_clips(vec![
            Clip::new(1, "Kickoff", 10.0, 30.0),
            Clip::new(2, "Goal", 600.0, 650.0),
            Clip::new(3, "Replay", 700.0, 760.0),
        ])
    }

    #[test]
    fn test_highlight_uses_list_order() {
        let mut s = store();
        let mut agg = HighlightAggregator::new();
        s.toggle_checked(ClipId(2)).unwrap();
        s.toggle_checked(ClipId(1)).unwrap();

        let h = agg.create_highlight(&mut s).unwrap();
        assert_eq!(h.video_name, "하이라이트 1");
        assert_eq!(h.clips, vec![TimeRange::new(10.0, 30.0), TimeRange::new(600.0, 650.0)]);
        assert_eq!(h.meta, vec!["Kickoff".to_string(), "Goal".to_string()]);
        assert!(s.checked_ids().is_empty());
    }

    #[test]
    fn test_highlight_names_count_up() {
        let mut s = store();
        let mut agg = HighlightAggregator::new();
        s.set_checked_clips([ClipId(3)]);
        agg.create_highlight(&mut s).unwrap();
        s.set_checked_clips([ClipId(1), ClipId(3)]);
        let h = agg.create_highlight(&mut s).unwrap();

        assert_eq!(h.video_name, "하이라이트 2");
        assert_eq!(h.id, 2);
        assert_eq!(agg.highlights().len(), 2);
    }

    #[test]
    fn test_empty_checklist_rejected() {
        let mut s = store();
        let mut agg = HighlightAggregator::new();
        assert_eq!(agg.create_highlight(&mut s), Err(TimelineError::NothingChecked));
        assert!(agg.highlights().is_empty());
    }

    #[test]
    fn test_highlight_is_a_snapshot() {
        let mut s = store();
        let mut agg = HighlightAggregator::new();
        s.set_checked_clips([ClipId(2)]);
        agg.create_highlight(&mut s).unwrap();

        s.update_clip(ClipId(2), "10:00", "12:00").unwrap();
        assert_eq!(agg.highlights()[0].clips, vec![TimeRange::new(600.0, 650.0)]);
    }

    #[test]
    fn test_describe() {
        let mut s = store();
        let mut agg = HighlightAggregator::new();
        s.set_checked_clips([ClipId(1), ClipId(2)]);
        agg.create_highlight(&mut s).unwrap();
        assert_eq!(agg.describe(), vec!["하이라이트 1 [0:10~0:30, 10:00~10:50] (Kickoff, Goal)".to_string()]);
    }
}
