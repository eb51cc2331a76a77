//! Clip store.
//!
//! Ordered, in-memory clip list with single selection and a checklist.
//! Insertion order is display order and is never changed.

use clipdeck_models::{
    parse_time_input, validate_bounds, validate_label, Clip, ClipId, SpanPolicy, ValidationError,
};
use tracing::{debug, info};

use crate::error::{TimelineError, TimelineResult};

/// Clip list an editing session starts with when none is supplied.
pub fn default_clips() -> Vec<Clip> {
    let mut clips = vec![Clip::new(1, "Intro", 10.0, 30.0)];
    clips.extend((0..9u32).map(|i| {
        let from = 600.0 * f64::from(i + 1);
        Clip::new(u64::from(i) + 2, "Middle", from, from + 600.0)
    }));
    clips
}

/// Owned clip collection plus selection state.
#[derive(Debug, Clone)]
pub struct ClipStore {
    clips: Vec<Clip>,
    selected: Option<ClipId>,
    checked: Vec<ClipId>,
    duration: Option<f64>,
    next_id: u64,
    policy: SpanPolicy,
}

impl Default for ClipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipStore {
    pub fn new() -> Self {
        Self::with_clips(Vec::new())
    }

    /// Start from a seeded list. New IDs are allocated above the largest
    /// seeded ID.
    pub fn with_clips(clips: Vec<Clip>) -> Self {
        let next_id = clips.iter().map(|c| c.id.as_u64()).max().unwrap_or(0) + 1;
        Self {
            clips,
            selected: None,
            checked: Vec::new(),
            duration: None,
            next_id,
            policy: SpanPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SpanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Known media duration, used by the upper-bound rule.
    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
    }

    pub fn policy(&self) -> &SpanPolicy {
        &self.policy
    }

    /// Validate and append a new clip.
    ///
    /// Rules run in order and the first failure is returned: label, start,
    /// end, ordering, minimum span, duration.
    pub fn create_clip(
        &mut self,
        label: &str,
        from_text: &str,
        to_text: &str,
    ) -> Result<Clip, ValidationError> {
        let label = validate_label(label)?;
        let range = validate_bounds(
            parse_time_input(from_text),
            parse_time_input(to_text),
            self.duration,
            &self.policy,
        )?;

        let clip = Clip::new(self.next_id, label, range.from, range.to);
        self.next_id += 1;
        self.clips.push(clip.clone());

        info!(clip_id = %clip.id, from = clip.from, to = clip.to, "Clip created");
        Ok(clip)
    }

    /// Re-bound an existing clip from user-typed times. The label is kept.
    pub fn update_clip(&mut self, id: ClipId, from_text: &str, to_text: &str) -> TimelineResult<Clip> {
        self.update_clip_bounds(id, parse_time_input(from_text), parse_time_input(to_text))
    }

    /// Re-bound an existing clip from numeric times.
    pub fn update_clip_bounds(&mut self, id: ClipId, from: f64, to: f64) -> TimelineResult<Clip> {
        let index = self
            .clips
            .iter()
            .position(|c| c.id == id)
            .ok_or(TimelineError::ClipNotFound(id))?;

        let range = validate_bounds(from, to, self.duration, &self.policy)?;

        let clip = &mut self.clips[index];
        clip.from = range.from;
        clip.to = range.to;

        info!(clip_id = %id, from = clip.from, to = clip.to, "Clip updated");
        Ok(clip.clone())
    }

    /// Replace a clip's label without touching its bounds.
    pub fn relabel(&mut self, id: ClipId, label: impl Into<String>) -> TimelineResult<Clip> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(TimelineError::ClipNotFound(id))?;
        clip.label = label.into();
        Ok(clip.clone())
    }

    /// Make `id` the selected clip. Playback is not affected here.
    pub fn select_clip(&mut self, id: ClipId) -> TimelineResult<&Clip> {
        let clip = self
            .clips
            .iter()
            .find(|c| c.id == id)
            .ok_or(TimelineError::ClipNotFound(id))?;
        self.selected = Some(id);
        debug!(clip_id = %id, "Clip selected");
        Ok(clip)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<ClipId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Clip> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Checkbox semantics: add when absent, remove when present.
    ///
    /// Returns whether the clip is checked afterwards.
    pub fn toggle_checked(&mut self, id: ClipId) -> TimelineResult<bool> {
        if self.get(id).is_none() {
            return Err(TimelineError::ClipNotFound(id));
        }
        if let Some(pos) = self.checked.iter().position(|c| *c == id) {
            self.checked.remove(pos);
            Ok(false)
        } else {
            self.checked.push(id);
            Ok(true)
        }
    }

    /// Replace the checklist. Unknown and repeated IDs are dropped.
    pub fn set_checked_clips(&mut self, ids: impl IntoIterator<Item = ClipId>) {
        self.checked.clear();
        for id in ids {
            if self.get(id).is_some() && !self.checked.contains(&id) {
                self.checked.push(id);
            }
        }
    }

    pub fn clear_checked(&mut self) {
        self.checked.clear();
    }

    /// Checked IDs in the order they were checked.
    pub fn checked_ids(&self) -> &[ClipId] {
        &self.checked
    }

    pub fn is_checked(&self, id: ClipId) -> bool {
        self.checked.contains(&id)
    }

    /// Checked clips in list order.
    pub fn checked_clips(&self) -> impl Iterator<Item = &Clip> + '_ {
        self.clips.iter().filter(move |c| self.checked.contains(&c.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ClipStore {
        ClipStore::with_clips(vec![
            Clip::new(1, "Intro", 10.0, 30.0),
            Clip::new(2, "Middle", 600.0, 1200.0),
        ])
    }

    #[test]
    fn test_default_clips() {
        let clips = default_clips();
        assert_eq!(clips.len(), 10);
        assert_eq!(clips[0], Clip::new(1, "Intro", 10.0, 30.0));
        assert_eq!(clips[1], Clip::new(2, "Middle", 600.0, 1200.0));
        assert_eq!(clips[9], Clip::new(10, "Middle", 5400.0, 6000.0));
    }

    #[test]
    fn test_create_clip_appends_with_fresh_id() {
        let mut s = store();
        let clip = s.create_clip("  Goal ", "1:00", "2:30").unwrap();
        assert_eq!(clip.id, ClipId(3));
        assert_eq!(clip.label, "Goal");
        assert_eq!((clip.from, clip.to), (60.0, 150.0));
        assert_eq!(s.clips().last(), Some(&clip));

        let next = s.create_clip("Again", "0:00", "1:00").unwrap();
        assert_eq!(next.id, ClipId(4));
    }

    #[test]
    fn test_empty_label_checked_first() {
        let mut s = ClipStore::new();
        assert_eq!(s.create_clip("", "0:10", "0:20"), Err(ValidationError::EmptyLabel));
        assert_eq!(s.create_clip("   ", "10", "5"), Err(ValidationError::EmptyLabel));
        assert!(s.is_empty());
    }

    #[test]
    fn test_inverted_range_before_span_rule() {
        let mut s = ClipStore::new();
        assert_eq!(s.create_clip("x", "10", "5"), Err(ValidationError::StartNotBeforeEnd));
        assert_eq!(s.create_clip("x", "40", "40"), Err(ValidationError::StartNotBeforeEnd));
    }

    #[test]
    fn test_create_succeeds_iff_bucket_span_and_duration() {
        let mut s = ClipStore::new();
        s.set_duration(Some(100.0));

        let cases = [
            (29.0, 61.0, true),
            (10.0, 65.0, true),
            (40.0, 70.0, true),
            (40.0, 55.0, false),
            (31.0, 59.0, false),
            (59.0, 60.0, true),
            (10.0, 100.0, true),
            (10.0, 101.0, false),
        ];
        for (from, to, ok) in cases {
            let result = s.create_clip("c", &from.to_string(), &to.to_string());
            assert_eq!(result.is_ok(), ok, "{}..{}: {:?}", from, to, result);
        }
    }

    #[test]
    fn test_overflowing_time_input_is_rejected() {
        let mut s = store();
        assert!(s.create_clip("x", "0", "9000000000000000000:00").is_err());
        assert!(s.update_clip(ClipId(1), "5000000000000000:00:00", "1:00").is_ok());
        assert_eq!(s.get(ClipId(1)).map(|c| c.from), Some(0.0));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_exceeds_duration_message() {
        let mut s = ClipStore::new();
        s.set_duration(Some(125.0));
        let err = s.create_clip("c", "0:10", "3:00").unwrap_err();
        assert_eq!(err, ValidationError::ExceedsDuration { to: 180.0, duration: 125.0 });
        assert!(err.to_string().contains("2:05"));
    }

    #[test]
    fn test_unknown_duration_skips_upper_bound() {
        let mut s = ClipStore::new();
        s.set_duration(Some(0.0));
        assert_eq!(s.duration(), None);
        assert!(s.create_clip("c", "0", "99:00").is_ok());
    }

    #[test]
    fn test_update_preserves_id_and_label() {
        let mut s = store();
        let clip = s.update_clip(ClipId(1), "0:30", "1:30").unwrap();
        assert_eq!(clip, Clip::new(1, "Intro", 30.0, 90.0));
        assert_eq!(s.clips()[0], clip);
        assert_eq!(s.clips()[1].id, ClipId(2));
    }

    #[test]
    fn test_failed_update_leaves_clip_untouched() {
        let mut s = store();
        s.set_duration(Some(1000.0));
        let err = s.update_clip_bounds(ClipId(2), 600.0, 1500.0).unwrap_err();
        assert!(matches!(err, TimelineError::Validation(ValidationError::ExceedsDuration { .. })));
        assert_eq!(s.get(ClipId(2)), Some(&Clip::new(2, "Middle", 600.0, 1200.0)));
    }

    #[test]
    fn test_update_unknown_clip() {
        let mut s = store();
        assert_eq!(
            s.update_clip(ClipId(99), "0", "1:00"),
            Err(TimelineError::ClipNotFound(ClipId(99)))
        );
    }

    #[test]
    fn test_selection() {
        let mut s = store();
        assert!(s.selected().is_none());
        s.select_clip(ClipId(2)).unwrap();
        assert_eq!(s.selected().map(|c| c.id), Some(ClipId(2)));
        assert!(s.select_clip(ClipId(7)).is_err());
        assert_eq!(s.selected_id(), Some(ClipId(2)));
        s.clear_selection();
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_checklist_independent_of_selection() {
        let mut s = store();
        s.select_clip(ClipId(1)).unwrap();
        assert!(s.toggle_checked(ClipId(2)).unwrap());
        assert!(s.toggle_checked(ClipId(1)).unwrap());
        assert_eq!(s.checked_ids(), &[ClipId(2), ClipId(1)]);
        assert!(!s.toggle_checked(ClipId(2)).unwrap());
        assert_eq!(s.checked_ids(), &[ClipId(1)]);
        assert_eq!(s.selected_id(), Some(ClipId(1)));
    }

    #[test]
    fn test_checked_clips_follow_list_order() {
        let mut s = store();
        s.set_checked_clips([ClipId(2), ClipId(9), ClipId(1), ClipId(2)]);
        assert_eq!(s.checked_ids(), &[ClipId(2), ClipId(1)]);
        let ids: Vec<_> = s.checked_clips().map(|c| c.id).collect();
        assert_eq!(ids, vec![ClipId(1), ClipId(2)]);
    }

    #[test]
    fn test_relabel() {
        let mut s = store();
        let clip = s.relabel(ClipId(1), "Updated Clip").unwrap();
        assert_eq!(clip.label, "Updated Clip");
        assert_eq!((clip.from, clip.to), (10.0, 30.0));
    }
}
