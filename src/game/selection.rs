use crate::config::ScrollMode;

/// Cyclic selection plus the integer top row of the list viewport.
///
/// Every mutator re-clamps against the current list length, so the index
/// can never point past the list and the viewport never scrolls past the
/// last full page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_index: usize,
    scroll_offset: usize,
}

#[inline(always)]
fn rows_of(visible_rows: f32) -> f32 {
    if visible_rows.is_finite() {
        visible_rows.max(1.0)
    } else {
        1.0
    }
}

/// Largest valid top row for `len` entries and `visible_rows` rows on screen.
pub fn max_scroll_offset(len: usize, visible_rows: f32) -> usize {
    (len as f32 - rows_of(visible_rows)).max(0.0).ceil() as usize
}

impl SelectionState {
    pub const fn new() -> Self {
        Self {
            selected_index: 0,
            scroll_offset: 0,
        }
    }

    #[inline(always)]
    pub const fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[inline(always)]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Moves the selection by `delta` rows, wrapping at both ends.
    pub fn step(&mut self, delta: isize, len: usize, visible_rows: f32) {
        self.select(self.selected_index as isize + delta, len, visible_rows);
    }

    /// Jumps to `index`; `-1` lands on the last row, `len` on the first.
    pub fn select(&mut self, index: isize, len: usize, visible_rows: f32) {
        if len == 0 {
            self.selected_index = 0;
            self.scroll_offset = 0;
            return;
        }
        self.selected_index = if index < 0 {
            len - 1
        } else if index as usize >= len {
            0
        } else {
            index as usize
        };
        self.follow_selection(len, visible_rows);
    }

    /// Re-clamps after the list changed underneath the selection.
    pub fn validate(&mut self, len: usize, visible_rows: f32) {
        self.select(self.selected_index as isize, len, visible_rows);
    }

    fn follow_selection(&mut self, len: usize, visible_rows: f32) {
        let rows = rows_of(visible_rows);
        if len as f32 <= rows {
            self.scroll_offset = 0;
            return;
        }

        let sel = self.selected_index;
        if (sel + 1) as f32 > self.scroll_offset as f32 + rows {
            // Selection becomes the last fully visible row.
            self.scroll_offset = (sel as f32 - rows + 1.0).ceil().max(0.0) as usize;
        }
        if sel < self.scroll_offset {
            self.scroll_offset = sel;
        }
        self.scroll_offset = self.scroll_offset.min(max_scroll_offset(len, rows));
    }
}

/// Turns a held scroll key into discrete pulses: one on press, then a
/// faster repeat once the key has been held past the delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollRepeat {
    held_steps: u32,
}

impl ScrollRepeat {
    pub fn tick(&mut self, held: bool, delay: u32, interval: u32) -> bool {
        if !held {
            self.held_steps = 0;
            return false;
        }
        self.held_steps = self.held_steps.saturating_add(1);
        self.held_steps == 1
            || (self.held_steps > delay && self.held_steps % interval.max(1) == 0)
    }

    pub fn reset(&mut self) {
        self.held_steps = 0;
    }
}

/// Everything the scroll gate looks at, sampled by the host for this step.
#[derive(Clone, Copy, Debug, Default)]
pub struct GestureGate {
    pub host_ui_open: bool,
    pub list_len: usize,
    pub override_held: bool,
    pub modifier_held: bool,
    pub standing_still: bool,
}

pub fn gesture_allowed(mode: ScrollMode, gate: &GestureGate) -> bool {
    if gate.host_ui_open || gate.list_len <= 1 || gate.override_held {
        return false;
    }
    match mode {
        ScrollMode::Always => true,
        ScrollMode::KeyBind => gate.modifier_held,
        ScrollMode::StandStill => gate.standing_still,
    }
}

/// Wheel up moves the selection toward the top of the list.
#[inline(always)]
pub fn wheel_direction(delta: f64) -> isize {
    if delta > 0.0 {
        -1
    } else if delta < 0.0 {
        1
    } else {
        0
    }
}
