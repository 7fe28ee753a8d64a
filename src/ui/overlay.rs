use crate::game::item::{DisplayGroup, EntityId};
use crate::ui::anim::{clamp01, damp, ease_out_cubic};
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::Range;

pub const POPUP_SPEED: f32 = 10.0;
pub const SCROLL_SPEED: f32 = 15.0;
// Longer frames (hitches, debugger pauses) are treated as this long.
pub const MAX_FRAME_DT: f32 = 0.1;
const SNAP_EPSILON: f32 = 0.001;
// Entrance animation completes in 1/6 s.
pub const ENTRY_RATE: f32 = 6.0;
const PRUNE_INTERVAL: f32 = 1.0;

/// Horizontal distance a row slides in from, in overlay units.
pub const SLIDE_DISTANCE: f32 = 50.0;
const MIN_ROW_ALPHA: f32 = 0.05;
// Fade-out is steeper above the viewport than below it.
const TOP_FADE: f32 = 1.5;
const PROMPT_OVERHANG: f32 = 0.5;
const COMPACT_COUNT_FROM: u32 = 10_000;

/// Frame-clock presentation state. Reads step outputs, never writes them.
#[derive(Clone, Debug, Default)]
pub struct OverlayState {
    popup_progress: f32,
    current_scroll: f32,
    entry_progress: FxHashMap<EntityId, f32>,
    prune_timer: f32,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(
        &mut self,
        dt: f32,
        should_show: bool,
        target_scroll: f32,
        groups: &[DisplayGroup],
        visible_rows: f32,
    ) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        let popup_target = if should_show { 1.0 } else { 0.0 };
        self.popup_progress = damp(self.popup_progress, popup_target, POPUP_SPEED, dt);
        if should_show {
            if 1.0 - self.popup_progress < SNAP_EPSILON {
                self.popup_progress = 1.0;
            }
        } else if self.popup_progress < SNAP_EPSILON {
            self.popup_progress = 0.0;
            self.entry_progress.clear();
        }

        let rows = visible_rows.max(1.0);
        let max_scroll = (groups.len() as f32 - rows).max(0.0);
        let target = if target_scroll.is_finite() {
            target_scroll.clamp(0.0, max_scroll)
        } else {
            0.0
        };
        if (target - self.current_scroll).abs() < SNAP_EPSILON {
            self.current_scroll = target;
        } else {
            self.current_scroll = damp(self.current_scroll, target, SCROLL_SPEED, dt);
        }

        if self.popup_progress > 0.0 {
            for group in groups {
                let p = self.entry_progress.entry(group.primary_id()).or_insert(0.0);
                *p = (*p + ENTRY_RATE * dt).min(1.0);
            }
        }

        self.prune_timer += dt;
        if self.prune_timer >= PRUNE_INTERVAL {
            self.prune_timer = 0.0;
            self.prune(groups);
        }
    }

    fn prune(&mut self, groups: &[DisplayGroup]) {
        if groups.is_empty() {
            self.entry_progress.clear();
            return;
        }
        let live: FxHashSet<EntityId> = groups.iter().map(DisplayGroup::primary_id).collect();
        self.entry_progress.retain(|id, _| live.contains(id));
    }

    #[inline(always)]
    pub const fn popup_progress(&self) -> f32 {
        self.popup_progress
    }

    #[inline(always)]
    pub const fn current_scroll(&self) -> f32 {
        self.current_scroll
    }

    /// Entrance progress of the row whose first member is `id`; 0 if unseen.
    pub fn entry_progress(&self, id: EntityId) -> f32 {
        self.entry_progress.get(&id).copied().unwrap_or(0.0)
    }

    pub fn tracked_entries(&self) -> usize {
        self.entry_progress.len()
    }

    /// Rows worth drawing this frame with their fade and slide, in list order.
    pub fn row_layouts(&self, groups: &[DisplayGroup], visible_rows: f32) -> Vec<RowLayout> {
        let rows = visible_rows.max(1.0);
        visible_range(self.current_scroll, rows, groups.len())
            .filter_map(|index| {
                let relative = index as f32 - self.current_scroll;
                let alpha = edge_alpha(relative, rows) * self.popup_progress;
                if alpha <= MIN_ROW_ALPHA {
                    return None;
                }
                Some(RowLayout {
                    index,
                    relative,
                    alpha,
                    slide_offset: slide_offset(self.entry_progress(groups[index].primary_id())),
                })
            })
            .collect()
    }

    /// Opacity of the pickup key prompt beside the selected row, or `None`
    /// when it should not be drawn.
    pub fn prompt_alpha(&self, selected_index: usize, visible_rows: f32) -> Option<f32> {
        let relative = selected_index as f32 - self.current_scroll;
        let alpha = key_prompt_alpha(relative, visible_rows.max(1.0))? * self.popup_progress;
        (alpha > MIN_ROW_ALPHA).then_some(alpha)
    }

    pub fn scroll_bar(&self, len: usize, visible_rows: f32) -> Option<ScrollBar> {
        scroll_bar(len, visible_rows, self.current_scroll)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowLayout {
    pub index: usize,
    /// Row position relative to the smoothed viewport top, in rows.
    pub relative: f32,
    pub alpha: f32,
    pub slide_offset: f32,
}

/// Indices worth laying out: the viewport plus one row of overscan each side.
pub fn visible_range(scroll: f32, visible_rows: f32, len: usize) -> Range<usize> {
    let start = (scroll.floor() - 1.0).max(0.0) as usize;
    let end = ((scroll + visible_rows).ceil() + 1.0).max(0.0) as usize;
    start.min(len)..(end + 1).min(len)
}

/// Opacity of a row at `relative` rows from the viewport top. Rows above the
/// top and past the last full row fade out.
pub fn edge_alpha(relative: f32, visible_rows: f32) -> f32 {
    let last = visible_rows - 1.0;
    if relative < 0.0 {
        clamp01(1.0 + relative * TOP_FADE)
    } else if relative > last {
        clamp01(1.0 - (relative - last))
    } else {
        1.0
    }
}

#[inline(always)]
pub fn slide_offset(entry_progress: f32) -> f32 {
    (1.0 - ease_out_cubic(entry_progress)) * SLIDE_DISTANCE
}

/// Fade of the key prompt for a selected row `relative` rows below the
/// viewport top. It follows the row half a row past the bottom edge.
pub fn key_prompt_alpha(relative: f32, visible_rows: f32) -> Option<f32> {
    let bottom = visible_rows + PROMPT_OVERHANG;
    if relative <= -1.0 || relative >= bottom {
        return None;
    }
    if relative < 0.0 {
        Some(1.0 + relative)
    } else {
        Some(clamp01(bottom - relative))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollBar {
    /// Thumb length as a share of the track.
    pub thumb_ratio: f32,
    /// Thumb position, 0 at the top of the track and 1 at the bottom.
    pub progress: f32,
}

/// Scroll bar geometry; `None` when every row fits.
pub fn scroll_bar(len: usize, visible_rows: f32, scroll: f32) -> Option<ScrollBar> {
    let total = len as f32;
    let rows = visible_rows.max(1.0);
    if total <= rows {
        return None;
    }
    let max_scroll = total - rows;
    Some(ScrollBar {
        thumb_ratio: rows / total,
        progress: clamp01(scroll / max_scroll),
    })
}

/// Stack size shown after the name. Single items get none and stacks of
/// 10000 or more are shortened to thousands.
pub fn count_label(count: u32) -> Option<String> {
    match count {
        0 | 1 => None,
        COMPACT_COUNT_FROM.. => Some(format!("{}k", count / 1000)),
        n => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::item::RawCandidate;
    use crate::game::loot;

    fn groups(n: u32) -> Vec<DisplayGroup> {
        loot::aggregate((1..=n).map(|i| {
            RawCandidate::new(i, &format!("minecraft:item_{i}"), &format!("Item {i}"), 1)
        }))
    }

    #[test]
    fn popup_rises_and_snaps_fully_open() {
        let list = groups(2);
        let mut state = OverlayState::new();
        for _ in 0..120 {
            state.tick(1.0 / 60.0, true, 0.0, &list, 4.5);
        }
        assert_eq!(state.popup_progress(), 1.0);
    }

    #[test]
    fn hiding_snaps_to_zero_and_forgets_entrances() {
        let list = groups(3);
        let mut state = OverlayState::new();
        for _ in 0..30 {
            state.tick(1.0 / 60.0, true, 0.0, &list, 4.5);
        }
        assert!(state.tracked_entries() > 0);
        for _ in 0..120 {
            state.tick(1.0 / 60.0, false, 0.0, &list, 4.5);
        }
        assert_eq!(state.popup_progress(), 0.0);
        assert_eq!(state.tracked_entries(), 0, "fully hidden overlay replays entrances");
    }

    #[test]
    fn long_frames_are_clamped() {
        let list = groups(1);
        let mut clamped = OverlayState::new();
        clamped.tick(5.0, true, 0.0, &list, 4.5);
        let mut reference = OverlayState::new();
        reference.tick(MAX_FRAME_DT, true, 0.0, &list, 4.5);
        assert_eq!(clamped.popup_progress(), reference.popup_progress());
        assert!(clamped.popup_progress() < 1.0);
    }

    #[test]
    fn scroll_target_is_clamped_to_last_page() {
        let list = groups(6);
        let mut state = OverlayState::new();
        for _ in 0..200 {
            state.tick(1.0 / 60.0, true, 99.0, &list, 4.5);
        }
        assert_eq!(state.current_scroll(), 1.5, "six rows minus 4.5 visible");

        let short = groups(2);
        for _ in 0..200 {
            state.tick(1.0 / 60.0, true, 3.0, &short, 4.5);
        }
        assert_eq!(state.current_scroll(), 0.0);
    }

    #[test]
    fn scroll_within_epsilon_snaps_before_damping() {
        let list = groups(6);
        let mut state = OverlayState::new();
        state.current_scroll = 0.9995;
        state.tick(0.0, true, 1.0, &list, 4.5);
        assert_eq!(state.current_scroll(), 1.0, "no time needed to close a tiny gap");

        // A damped step that lands inside epsilon is drawn once before snapping.
        state.current_scroll = 0.9988;
        state.tick(1.0 / 60.0, true, 1.0, &list, 4.5);
        let damped = state.current_scroll();
        assert!(damped > 0.9988 && damped < 1.0, "got {damped}");
        state.tick(1.0 / 60.0, true, 1.0, &list, 4.5);
        assert_eq!(state.current_scroll(), 1.0);
    }

    #[test]
    fn entrance_progress_starts_on_first_sight_and_saturates() {
        let list = groups(1);
        let id = list[0].primary_id();
        let mut state = OverlayState::new();
        assert_eq!(state.entry_progress(id), 0.0);
        state.tick(0.05, true, 0.0, &list, 4.5);
        assert!((state.entry_progress(id) - 0.3).abs() < 1e-6);
        for _ in 0..10 {
            state.tick(0.05, true, 0.0, &list, 4.5);
        }
        assert_eq!(state.entry_progress(id), 1.0);
    }

    #[test]
    fn entrance_waits_while_popup_is_closed() {
        let list = groups(1);
        let mut state = OverlayState::new();
        state.tick(0.05, false, 0.0, &list, 4.5);
        assert_eq!(state.tracked_entries(), 0);
    }

    #[test]
    fn departed_rows_are_pruned_after_a_second() {
        let before = groups(3);
        let after = groups(1);
        let mut state = OverlayState::new();
        state.tick(0.05, true, 0.0, &before, 4.5);
        assert_eq!(state.tracked_entries(), 3);

        state.tick(0.05, true, 0.0, &after, 4.5);
        assert_eq!(state.tracked_entries(), 3, "no sweep before the interval elapses");
        for _ in 0..20 {
            state.tick(0.05, true, 0.0, &after, 4.5);
        }
        assert_eq!(state.tracked_entries(), 1);
    }

    #[test]
    fn visible_range_adds_one_row_of_overscan() {
        assert_eq!(visible_range(0.0, 4.5, 20), 0..7);
        assert_eq!(visible_range(3.2, 4.5, 20), 2..10);
        assert_eq!(visible_range(3.2, 4.5, 5), 2..5);
        assert_eq!(visible_range(0.0, 4.5, 0), 0..0);
    }

    #[test]
    fn edge_alpha_fades_outside_full_rows() {
        assert_eq!(edge_alpha(0.0, 4.0), 1.0);
        assert_eq!(edge_alpha(3.0, 4.0), 1.0);
        assert!((edge_alpha(-0.5, 4.0) - 0.25).abs() < 1e-6);
        assert!((edge_alpha(3.5, 4.0) - 0.5).abs() < 1e-6);
        assert_eq!(edge_alpha(-2.0, 4.0), 0.0);
        assert_eq!(edge_alpha(6.0, 4.0), 0.0);
    }

    #[test]
    fn slide_offset_runs_from_full_distance_to_zero() {
        assert_eq!(slide_offset(0.0), SLIDE_DISTANCE);
        assert_eq!(slide_offset(1.0), 0.0);
        assert!(slide_offset(0.5) < SLIDE_DISTANCE / 2.0);
    }

    #[test]
    fn row_layouts_skip_nearly_transparent_rows() {
        let list = groups(10);
        let mut state = OverlayState::new();
        for _ in 0..120 {
            state.tick(1.0 / 60.0, true, 0.0, &list, 4.0);
        }
        let rows = state.row_layouts(&list, 4.0);
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        // Row 4 sits one past the last full row and fades to zero.
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(rows.iter().all(|r| r.alpha == 1.0));
        assert!(rows.iter().all(|r| r.slide_offset == 0.0));
    }

    #[test]
    fn key_prompt_follows_selection_past_the_edges() {
        assert_eq!(key_prompt_alpha(0.0, 4.5), Some(1.0));
        assert_eq!(key_prompt_alpha(4.0, 4.5), Some(1.0));
        assert_eq!(key_prompt_alpha(-0.25, 4.5), Some(0.75));
        assert_eq!(key_prompt_alpha(4.75, 4.5), Some(0.25));
        assert_eq!(key_prompt_alpha(-1.0, 4.5), None);
        assert_eq!(key_prompt_alpha(5.0, 4.5), None);
    }

    #[test]
    fn prompt_alpha_scales_with_popup_and_hides_when_faint() {
        let list = groups(3);
        let mut state = OverlayState::new();
        assert_eq!(state.prompt_alpha(0, 4.5), None, "closed popup draws no prompt");
        for _ in 0..120 {
            state.tick(1.0 / 60.0, true, 0.0, &list, 4.5);
        }
        assert_eq!(state.prompt_alpha(0, 4.5), Some(1.0));
        assert_eq!(state.prompt_alpha(5, 4.5), None);
    }

    #[test]
    fn scroll_bar_only_when_rows_overflow() {
        assert_eq!(scroll_bar(4, 4.5, 0.0), None);
        assert_eq!(scroll_bar(0, 4.5, 0.0), None);
        let bar = scroll_bar(9, 4.5, 0.0);
        assert_eq!(
            bar,
            Some(ScrollBar {
                thumb_ratio: 0.5,
                progress: 0.0,
            })
        );
        assert_eq!(scroll_bar(9, 4.5, 2.25).map(|b| b.progress), Some(0.5));
        assert_eq!(scroll_bar(9, 4.5, 40.0).map(|b| b.progress), Some(1.0));
    }

    #[test]
    fn count_label_shortens_big_stacks() {
        assert_eq!(count_label(1), None);
        assert_eq!(count_label(0), None);
        assert_eq!(count_label(64).as_deref(), Some("64"));
        assert_eq!(count_label(9_999).as_deref(), Some("9999"));
        assert_eq!(count_label(10_000).as_deref(), Some("10k"));
        assert_eq!(count_label(12_345).as_deref(), Some("12k"));
    }
}
