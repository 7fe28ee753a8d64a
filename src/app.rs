use crate::config::{ActivationMode, Config};
use crate::core::input::{InputEvent, InputState, VirtualAction};
use crate::core::network::{PickupSink, send_pickup};
use crate::core::world::{InventorySnapshot, Viewer, Whitelist, WorldSnapshot};
use crate::game::item::{DisplayGroup, EntityId, ItemKind};
use crate::game::loot::{self, FilterMode};
use crate::game::pickup::{self, PickupAction, PickupHandler, SINGLE_PICKUP_CAP};
use crate::game::selection::{self, GestureGate, ScrollRepeat, SelectionState};
use crate::ui::overlay::{self, OverlayState, ScrollBar};
use log::{debug, info};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::time::Instant;

// Carried item types are re-read on the first step in a world and every this
// many after.
pub const INVENTORY_REFRESH_STEPS: u64 = 10;

/// What the host hands the core once per simulation step.
pub struct StepContext<'a> {
    /// `None` while no player is in a world (menus, loading screens).
    pub viewer: Option<Viewer>,
    pub world: &'a dyn WorldSnapshot,
    pub inventory: &'a dyn InventorySnapshot,
    pub whitelist: &'a dyn Whitelist,
    /// A host screen (chat, inventory, settings) has focus.
    pub host_ui_open: bool,
}

/// The overlay core. Constructed once by the host and driven through
/// `on_step` at simulation rate and `on_frame` at render rate.
pub struct LootCore {
    config: Config,
    groups: Arc<[DisplayGroup]>,
    selection: SelectionState,
    pickup: PickupHandler,
    scroll_repeat: ScrollRepeat,
    input: InputState,
    overlay: OverlayState,
    inventory: FxHashSet<ItemKind>,
    inventory_stale: bool,
    filter_mode: FilterMode,
    auto_mode: bool,
    overlay_toggled: bool,
    step_count: u64,
    last_frame_time: Option<Instant>,
    viewer: Option<Viewer>,
    should_show: bool,
    host_ui_open: bool,
}

impl LootCore {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            groups: Arc::from(Vec::new()),
            selection: SelectionState::new(),
            pickup: PickupHandler::new(),
            scroll_repeat: ScrollRepeat::default(),
            input: InputState::new(),
            overlay: OverlayState::new(),
            inventory: FxHashSet::default(),
            inventory_stale: true,
            filter_mode: FilterMode::All,
            auto_mode: false,
            overlay_toggled: false,
            step_count: 0,
            last_frame_time: None,
            viewer: None,
            should_show: false,
            host_ui_open: false,
        }
    }

    /* ------------------------------ step clock ------------------------------ */

    pub fn on_step(&mut self, ctx: &StepContext<'_>, sink: &mut dyn PickupSink) {
        self.host_ui_open = ctx.host_ui_open;

        let Some(viewer) = ctx.viewer else {
            self.clear_world();
            return;
        };
        self.viewer = Some(viewer);

        if ctx.host_ui_open {
            // Presses made while a host screen had focus belong to that screen.
            self.pickup.reset_hold();
            self.scroll_repeat.reset();
            self.input.clear_clicks();
            self.should_show = false;
            return;
        }

        if self.inventory_stale || self.step_count % INVENTORY_REFRESH_STEPS == 0 {
            self.refresh_inventory(ctx.inventory);
        }
        self.step_count += 1;

        // 1. Ranking
        let candidates = ctx.world.nearby_items(&viewer.scan_region(), self.step_count);
        self.groups = loot::scan(candidates, self.filter_mode, ctx.whitelist).into();

        // 2. Selection
        let rows = self.config.visible_rows;
        self.selection.validate(self.groups.len(), rows);

        // 3. Auto pickup
        if self.auto_mode && self.has_items() {
            if self.pickup.can_auto_pickup() {
                send_pickup(sink, pickup::batch_targets(&self.groups), true);
            }
        } else {
            self.pickup.reset_auto_cooldown();
        }

        // 4. Input
        self.handle_toggle_keys();
        self.handle_pickup_key(sink);
        self.handle_scroll_keys();

        self.should_show = self.has_items() && !self.auto_mode && self.activation_met();
    }

    fn clear_world(&mut self) {
        self.viewer = None;
        self.groups = Arc::from(Vec::new());
        self.inventory.clear();
        self.inventory_stale = true;
        // Presses made in menus must not leak into the next world.
        self.input.release_all();
        self.selection.validate(0, self.config.visible_rows);
        self.pickup.reset();
        self.scroll_repeat.reset();
        self.should_show = false;
    }

    fn refresh_inventory(&mut self, inventory: &dyn InventorySnapshot) {
        self.inventory.clear();
        self.inventory.extend(inventory.carried_kinds());
        self.inventory_stale = false;
    }

    fn handle_toggle_keys(&mut self) {
        for _ in 0..self.input.consume_clicks(VirtualAction::ToggleFilter) {
            self.toggle_filter_mode();
        }
        for _ in 0..self.input.consume_clicks(VirtualAction::ToggleAuto) {
            self.toggle_auto_mode();
        }
        let show_clicks = self.input.consume_clicks(VirtualAction::ShowOverlay);
        if self.config.activation_mode == ActivationMode::KeyToggle && show_clicks % 2 == 1 {
            self.overlay_toggled = !self.overlay_toggled;
        }
        // Level-only actions never need their edges.
        for action in [
            VirtualAction::Pickup,
            VirtualAction::ScrollUp,
            VirtualAction::ScrollDown,
            VirtualAction::ScrollModifier,
            VirtualAction::Override,
        ] {
            self.input.consume_clicks(action);
        }
    }

    fn handle_pickup_key(&mut self, sink: &mut dyn PickupSink) {
        let action = self.pickup.tick_input(
            self.input.is_held(VirtualAction::Pickup),
            self.input.is_held(VirtualAction::Override),
            self.has_items(),
        );
        match action {
            PickupAction::Single => self.send_single_pickup(sink),
            PickupAction::Batch => {
                send_pickup(sink, pickup::batch_targets(&self.groups), false);
            }
            PickupAction::None => {}
        }
    }

    fn send_single_pickup(&self, sink: &mut dyn PickupSink) {
        let Some(group) = self.groups.get(self.selection.selected_index()) else {
            return;
        };
        let origin = self.viewer.map_or(glam::Vec3::ZERO, |v| v.position);
        send_pickup(sink, pickup::nearest_within_cap(group, origin, SINGLE_PICKUP_CAP), false);
    }

    fn handle_scroll_keys(&mut self) {
        let up = self.input.is_held(VirtualAction::ScrollUp);
        let down = self.input.is_held(VirtualAction::ScrollDown);
        let pulse = self.scroll_repeat.tick(
            up || down,
            self.config.scroll_repeat_delay,
            self.config.scroll_repeat_interval,
        );
        if pulse && self.gesture_allowed() {
            let delta = if up { -1 } else { 1 };
            self.selection
                .step(delta, self.groups.len(), self.config.visible_rows);
        }
    }

    fn activation_met(&self) -> bool {
        let Some(viewer) = self.viewer else {
            return false;
        };
        match self.config.activation_mode {
            ActivationMode::Always => true,
            ActivationMode::LookDown => viewer.pitch_degrees > self.config.look_down_angle,
            ActivationMode::StandStill => viewer.is_standing_still(),
            ActivationMode::KeyHold => self.input.is_held(VirtualAction::ShowOverlay),
            ActivationMode::KeyToggle => self.overlay_toggled,
        }
    }

    fn gesture_allowed(&self) -> bool {
        let gate = GestureGate {
            host_ui_open: self.host_ui_open,
            list_len: self.groups.len(),
            override_held: self.input.is_held(VirtualAction::Override),
            modifier_held: self.input.is_held(VirtualAction::ScrollModifier),
            standing_still: self.viewer.is_some_and(|v| v.is_standing_still()),
        };
        selection::gesture_allowed(self.config.scroll_mode, &gate)
    }

    /* ----------------------------- input events ----------------------------- */

    /// Mouse wheel. Returns true when the gesture moved the selection and the
    /// host should not pass it on (e.g. to hotbar scrolling).
    pub fn on_scroll_gesture(&mut self, delta: f64) -> bool {
        let direction = selection::wheel_direction(delta);
        if direction == 0 || !self.gesture_allowed() {
            return false;
        }
        self.selection
            .step(direction, self.groups.len(), self.config.visible_rows);
        true
    }

    pub fn on_key_event(&mut self, ev: InputEvent) {
        self.input.apply(ev);
    }

    pub fn release_all_keys(&mut self) {
        self.input.release_all();
    }

    pub fn toggle_filter_mode(&mut self) {
        self.filter_mode = self.filter_mode.toggled();
        self.pickup.reset_hold();
        self.selection
            .validate(self.groups.len(), self.config.visible_rows);
        info!("Loot filter: {}", self.filter_mode.as_str());
    }

    pub fn toggle_auto_mode(&mut self) {
        self.auto_mode = !self.auto_mode;
        self.pickup.reset();
        info!("Auto pickup {}", if self.auto_mode { "on" } else { "off" });
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        if config.activation_mode != ActivationMode::KeyToggle {
            self.overlay_toggled = false;
        }
        self.scroll_repeat.reset();
        self.selection.validate(self.groups.len(), config.visible_rows);
        debug!("Overlay config replaced: {config:?}");
    }

    /* ----------------------------- frame clock ------------------------------ */

    pub fn on_frame(&mut self, dt: f32) {
        self.overlay.tick(
            dt,
            self.should_show,
            self.selection.scroll_offset() as f32,
            &self.groups,
            self.config.visible_rows,
        );
    }

    /// `on_frame` with the delta taken from the previous call's timestamp.
    pub fn on_frame_at(&mut self, now: Instant) {
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_frame_time = Some(now);
        self.on_frame(dt);
    }

    /* ------------------------------- queries -------------------------------- */

    #[inline(always)]
    pub fn has_items(&self) -> bool {
        !self.groups.is_empty()
    }

    /// True while the core owns the pickup key and the wheel, so the host
    /// should not also act on them.
    pub fn should_intercept(&self) -> bool {
        self.has_items() || self.pickup.is_interacting()
    }

    pub fn pickup_progress(&self) -> f32 {
        if self.has_items() {
            self.pickup.progress()
        } else {
            0.0
        }
    }

    /// The row's item type is not in the last inventory snapshot.
    pub fn is_new_item(&self, group: &DisplayGroup) -> bool {
        !self.inventory.contains(&group.identity().kind)
    }

    pub fn groups(&self) -> &Arc<[DisplayGroup]> {
        &self.groups
    }

    pub const fn selection(&self) -> SelectionState {
        self.selection
    }

    pub const fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub const fn is_auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub const fn should_show(&self) -> bool {
        self.should_show
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn view(&self) -> ViewModel {
        let selected = self.selection.selected_index();
        let rows = self
            .overlay
            .row_layouts(&self.groups, self.config.visible_rows)
            .into_iter()
            .map(|layout| {
                let group = &self.groups[layout.index];
                RowView {
                    index: layout.index,
                    primary_id: group.primary_id(),
                    relative: layout.relative,
                    alpha: layout.alpha,
                    slide_offset: layout.slide_offset,
                    selected: layout.index == selected,
                    is_new: self.is_new_item(group),
                    count_label: overlay::count_label(group.count()),
                }
            })
            .collect();

        let rows_visible = self.config.visible_rows;
        ViewModel {
            groups: Arc::clone(&self.groups),
            selected_index: selected,
            scroll_offset: self.selection.scroll_offset(),
            current_scroll: self.overlay.current_scroll(),
            popup_progress: self.overlay.popup_progress(),
            pickup_progress: self.pickup_progress(),
            filter_mode: self.filter_mode,
            auto_mode: self.auto_mode,
            prompt_alpha: self.overlay.prompt_alpha(selected, rows_visible),
            scroll_bar: self.overlay.scroll_bar(self.groups.len(), rows_visible),
            rows,
        }
    }
}

/// Read-only snapshot for the host's renderer.
#[derive(Clone, Debug)]
pub struct ViewModel {
    pub groups: Arc<[DisplayGroup]>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub current_scroll: f32,
    pub popup_progress: f32,
    pub pickup_progress: f32,
    pub filter_mode: FilterMode,
    pub auto_mode: bool,
    /// Pickup key prompt opacity; `None` hides it.
    pub prompt_alpha: Option<f32>,
    pub scroll_bar: Option<ScrollBar>,
    /// Rows to draw this frame, already culled and faded.
    pub rows: Vec<RowView>,
}

impl ViewModel {
    pub fn selected_group(&self) -> Option<&DisplayGroup> {
        self.groups.get(self.selected_index)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub index: usize,
    pub primary_id: EntityId,
    pub relative: f32,
    pub alpha: f32,
    pub slide_offset: f32,
    pub selected: bool,
    pub is_new: bool,
    pub count_label: Option<String>,
}
