use better_looting::app::{LootCore, StepContext};
use better_looting::config;
use better_looting::core::input::{InputEvent, VirtualAction};
use better_looting::core::network::JsonLineSink;
use better_looting::core::world::{NoWhitelist, Viewer};
use better_looting::game::item::{ItemKind, Rarity, RawCandidate};
use glam::Vec3;
use log::{debug, info};
use std::time::{Duration, Instant};

const STEPS_PER_SECOND: u32 = 20;
const FRAMES_PER_STEP: u32 = 3;
const DEMO_STEPS: u32 = 80;

fn scripted_world() -> Vec<RawCandidate> {
    vec![
        RawCandidate::new(101, "minecraft:diamond", "Diamond", 3)
            .with_rarity(Rarity::Rare)
            .at(Vec3::new(0.8, 0.0, 0.2)),
        RawCandidate::new(102, "minecraft:arrow", "Arrow", 40).at(Vec3::new(0.3, 0.0, -0.4)),
        RawCandidate::new(103, "minecraft:arrow", "Arrow", 40).at(Vec3::new(1.1, 0.0, 0.9)),
        RawCandidate::new(104, "minecraft:iron_sword", "Iron Sword", 1)
            .unstackable()
            .with_tooltip()
            .at(Vec3::new(-0.6, 0.2, 0.0)),
        RawCandidate::new(105, "minecraft:iron_sword", "Iron Sword", 1)
            .unstackable()
            .with_tooltip()
            .at(Vec3::new(-0.9, 0.0, 0.5)),
        RawCandidate::new(106, "minecraft:golden_apple", "Golden Apple", 2)
            .with_rarity(Rarity::Rare)
            .at(Vec3::new(0.0, 0.0, 1.2)),
        RawCandidate::new(107, "minecraft:cobblestone", "Cobblestone", 64)
            .at(Vec3::new(5.0, 0.0, 0.0)),
    ]
}

// Keys the scripted player presses, by step.
fn scripted_input(step: u32) -> &'static [InputEvent] {
    const SCROLL_PRESS: &[InputEvent] = &[InputEvent::press(VirtualAction::ScrollDown)];
    const SCROLL_RELEASE: &[InputEvent] = &[InputEvent::release(VirtualAction::ScrollDown)];
    const PICK: &[InputEvent] = &[InputEvent::press(VirtualAction::Pickup)];
    const DROP: &[InputEvent] = &[InputEvent::release(VirtualAction::Pickup)];
    match step {
        10 => SCROLL_PRESS,
        11 => SCROLL_RELEASE,
        20 | 40 => PICK,
        23 | 60 => DROP,
        _ => &[],
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    let path = std::env::args_os()
        .nth(1)
        .map_or_else(config::default_path, Into::into);
    let cfg = config::load(&path);
    log::set_max_level(cfg.log_level.as_level_filter());

    let mut core = LootCore::new(cfg);
    let mut world = scripted_world();
    let inventory = vec![ItemKind::new("minecraft:arrow")];
    let mut sink = JsonLineSink::new(std::io::stdout().lock());
    let mut viewer = Viewer::new(Vec3::ZERO);
    viewer.pitch_degrees = 60.0;

    let frame_time = Duration::from_secs(1) / (STEPS_PER_SECOND * FRAMES_PER_STEP);
    let mut clock = Instant::now();
    info!("Demo: {DEMO_STEPS} steps at {STEPS_PER_SECOND} steps/s");

    for step in 1..=DEMO_STEPS {
        for ev in scripted_input(step) {
            core.on_key_event(*ev);
        }
        let ctx = StepContext {
            viewer: Some(viewer),
            world: &world,
            inventory: &inventory,
            whitelist: &NoWhitelist,
            host_ui_open: false,
        };
        core.on_step(&ctx, &mut sink);

        for _ in 0..FRAMES_PER_STEP {
            clock += frame_time;
            core.on_frame_at(clock);
        }

        let view = core.view();
        debug!(
            "step {step}: {} rows, selected {}, popup {:.2}, hold {:.2}",
            view.groups.len(),
            view.selected_index,
            view.popup_progress,
            view.pickup_progress
        );
        // The server grants requests a few steps later: the tap at step 23
        // takes the golden apple, the hold from step 40 takes the rest.
        match step {
            26 => world.retain(|c| c.id.0 != 106),
            58 => world.retain(|c| c.position.length() > 2.0),
            _ => {}
        }
        viewer.previous_position = viewer.position;
    }

    info!("Demo finished after {} steps.", core.step_count());
    Ok(())
}
