use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Host-agnostic overlay actions. The host maps its own key bindings onto
/// these and forwards edges through `LootCore::on_key_event`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VirtualAction {
    Pickup,
    ScrollUp,
    ScrollDown,
    // Required for scrolling in `ScrollMode::KeyBind`.
    ScrollModifier,
    ShowOverlay,
    ToggleFilter,
    ToggleAuto,
    // Shift: cancels pickup holds and blocks scrolling.
    Override,
}

pub const ALL_ACTIONS: [VirtualAction; 8] = [
    VirtualAction::Pickup,
    VirtualAction::ScrollUp,
    VirtualAction::ScrollDown,
    VirtualAction::ScrollModifier,
    VirtualAction::ShowOverlay,
    VirtualAction::ToggleFilter,
    VirtualAction::ToggleAuto,
    VirtualAction::Override,
];

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct HeldKeys: u8 {
        const PICKUP = 1 << 0;
        const SCROLL_UP = 1 << 1;
        const SCROLL_DOWN = 1 << 2;
        const SCROLL_MODIFIER = 1 << 3;
        const SHOW_OVERLAY = 1 << 4;
        const TOGGLE_FILTER = 1 << 5;
        const TOGGLE_AUTO = 1 << 6;
        const OVERRIDE = 1 << 7;
    }
}

impl VirtualAction {
    #[inline(always)]
    pub const fn flag(self) -> HeldKeys {
        match self {
            Self::Pickup => HeldKeys::PICKUP,
            Self::ScrollUp => HeldKeys::SCROLL_UP,
            Self::ScrollDown => HeldKeys::SCROLL_DOWN,
            Self::ScrollModifier => HeldKeys::SCROLL_MODIFIER,
            Self::ShowOverlay => HeldKeys::SHOW_OVERLAY,
            Self::ToggleFilter => HeldKeys::TOGGLE_FILTER,
            Self::ToggleAuto => HeldKeys::TOGGLE_AUTO,
            Self::Override => HeldKeys::OVERRIDE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "Pickup",
            Self::ScrollUp => "ScrollUp",
            Self::ScrollDown => "ScrollDown",
            Self::ScrollModifier => "ScrollModifier",
            Self::ShowOverlay => "ShowOverlay",
            Self::ToggleFilter => "ToggleFilter",
            Self::ToggleAuto => "ToggleAuto",
            Self::Override => "Override",
        }
    }
}

impl fmt::Display for VirtualAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VirtualAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ALL_ACTIONS
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub action: VirtualAction,
    pub pressed: bool,
}

impl InputEvent {
    pub const fn press(action: VirtualAction) -> Self {
        Self {
            action,
            pressed: true,
        }
    }

    pub const fn release(action: VirtualAction) -> Self {
        Self {
            action,
            pressed: false,
        }
    }
}

/// Level state of every action plus the rising edges seen since the last step.
///
/// Key events arrive at frame rate; the step clock samples `is_held` and
/// drains clicks with `consume_clicks`, so a tap shorter than one step is
/// still seen once.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: HeldKeys,
    clicks: SmallVec<[VirtualAction; 8]>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, ev: InputEvent) {
        let flag = ev.action.flag();
        if ev.pressed {
            // OS auto-repeat re-sends presses while held; only the first counts.
            if !self.held.contains(flag) {
                self.clicks.push(ev.action);
            }
            self.held.insert(flag);
        } else {
            self.held.remove(flag);
        }
    }

    #[inline(always)]
    pub fn is_held(&self, action: VirtualAction) -> bool {
        self.held.contains(action.flag())
    }

    #[inline(always)]
    pub const fn held(&self) -> HeldKeys {
        self.held
    }

    /// Number of presses of `action` since the last call; clears them.
    pub fn consume_clicks(&mut self, action: VirtualAction) -> u32 {
        let before = self.clicks.len();
        self.clicks.retain(|a| *a != action);
        (before - self.clicks.len()) as u32
    }

    pub fn clear_clicks(&mut self) {
        self.clicks.clear();
    }

    /// Drops pending presses and forgets held keys, e.g. when the host
    /// window loses focus and releases will never arrive.
    pub fn release_all(&mut self) {
        self.held = HeldKeys::empty();
        self.clicks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_track_level() {
        let mut input = InputState::new();
        input.apply(InputEvent::press(VirtualAction::Pickup));
        assert!(input.is_held(VirtualAction::Pickup));
        assert!(!input.is_held(VirtualAction::Override));
        input.apply(InputEvent::release(VirtualAction::Pickup));
        assert!(!input.is_held(VirtualAction::Pickup));
    }

    #[test]
    fn auto_repeat_presses_count_once() {
        let mut input = InputState::new();
        for _ in 0..4 {
            input.apply(InputEvent::press(VirtualAction::ToggleFilter));
        }
        assert_eq!(input.consume_clicks(VirtualAction::ToggleFilter), 1);
        assert_eq!(input.consume_clicks(VirtualAction::ToggleFilter), 0, "clicks are drained");
    }

    #[test]
    fn tap_within_one_step_is_still_a_click() {
        let mut input = InputState::new();
        input.apply(InputEvent::press(VirtualAction::ShowOverlay));
        input.apply(InputEvent::release(VirtualAction::ShowOverlay));
        input.apply(InputEvent::press(VirtualAction::ShowOverlay));
        input.apply(InputEvent::release(VirtualAction::ShowOverlay));
        input.apply(InputEvent::press(VirtualAction::ToggleAuto));
        assert!(!input.is_held(VirtualAction::ShowOverlay));
        assert_eq!(input.consume_clicks(VirtualAction::ShowOverlay), 2);
        assert_eq!(input.consume_clicks(VirtualAction::ToggleAuto), 1);
    }

    #[test]
    fn release_all_forgets_everything() {
        let mut input = InputState::new();
        input.apply(InputEvent::press(VirtualAction::Pickup));
        input.apply(InputEvent::press(VirtualAction::Override));
        input.release_all();
        assert_eq!(input.held(), HeldKeys::empty());
        assert_eq!(input.consume_clicks(VirtualAction::Pickup), 0);
    }

    #[test]
    fn action_names_parse_case_insensitively() {
        for action in ALL_ACTIONS {
            assert_eq!(VirtualAction::from_str(&action.to_string()), Ok(action));
        }
        assert_eq!(VirtualAction::from_str(" scrollup "), Ok(VirtualAction::ScrollUp));
        assert_eq!(VirtualAction::from_str("Jump"), Err(()));
    }
}
