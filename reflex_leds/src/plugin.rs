use bevy::input::gamepad::{Gamepad, GamepadButton, GamepadButtonType, Gamepads};
use bevy::prelude::*;

use crate::*;

/// Session settings chosen before the app starts.
#[derive(Debug, Clone, Resource)]
pub struct ReflexSettings {
    pub mode: GameMode,
    pub config: GameConfig,
}

impl Default for ReflexSettings {
    fn default() -> Self { Self { mode: GameMode::Competitive, config: GameConfig::default() } }
}

#[derive(Resource)]
pub struct ReflexRuntime {
    pub session: Session,
    pads: PadEdgeDetector,
    last_cued: Option<RoundId>,
}

/// Latest snapshot for whatever draws the LEDs and stat panels.
#[derive(Resource, Debug, Clone)]
pub struct ReflexDisplay(pub DisplayState);

#[derive(Event, Debug, Clone, Copy)]
pub struct PromptCue { pub target: Direction }

pub struct ReflexPlugin;

impl Plugin for ReflexPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReflexSettings>()
            .add_event::<PromptCue>()
            .add_systems(Startup, setup)
            .add_systems(Update, (read_keyboard, read_gamepads, tick_session, publish_display).chain());
    }
}

fn setup(mut commands: Commands, settings: Res<ReflexSettings>) {
    let session = Session::new(settings.config.clone(), settings.mode);
    commands.insert_resource(ReflexDisplay(session.display_state()));
    commands.insert_resource(ReflexRuntime { session, pads: PadEdgeDetector::new(), last_cued: None });
}

fn now_ms(time: &Time) -> u64 { time.elapsed().as_millis() as u64 }

/// Browser-style key names, as the normalizer expects.
fn key_name(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::KeyR => RESET_KEY,
        KeyCode::Space => PAUSE_KEY,
        _ => return None,
    })
}

fn read_keyboard(mut rt: ResMut<ReflexRuntime>, keys: Res<ButtonInput<KeyCode>>, time: Res<Time>) {
    let now = now_ms(&time);
    for code in keys.get_just_pressed() {
        if let Some(key) = key_name(*code) {
            rt.session.handle_raw_input(&RawInput::key(key), now);
        }
    }
}

fn button_type(index: u8) -> GamepadButtonType {
    match index {
        0 => GamepadButtonType::South,
        1 => GamepadButtonType::East,
        2 => GamepadButtonType::West,
        3 => GamepadButtonType::North,
        9 => GamepadButtonType::Start,
        other => GamepadButtonType::Other(other),
    }
}

fn read_gamepads(
    mut rt: ResMut<ReflexRuntime>,
    gamepads: Res<Gamepads>,
    buttons: Res<ButtonInput<GamepadButton>>,
    time: Res<Time>,
) {
    let now = now_ms(&time);
    let rt = &mut *rt;
    for gamepad in gamepads.iter() {
        let Gamepad { id } = gamepad;
        let levels: Vec<bool> = (0..=GAMEPAD_PAUSE_BUTTON)
            .map(|i| buttons.pressed(GamepadButton::new(gamepad, button_type(i))))
            .collect();
        for raw in rt.pads.poll(id as u32, &levels) {
            rt.session.handle_raw_input(&raw, now);
        }
    }
}

fn tick_session(mut rt: ResMut<ReflexRuntime>, time: Res<Time>, mut cues: EventWriter<PromptCue>) {
    let rt = &mut *rt;
    rt.session.tick(now_ms(&time));
    // prompts drawn by input handlers this frame are cued here too
    if let Some(target) = rt.session.current_target() {
        let id = rt.session.round().map(|r| r.id);
        if id != rt.last_cued {
            rt.last_cued = id;
            cues.send(PromptCue { target });
        }
    }
}

fn publish_display(rt: Res<ReflexRuntime>, mut display: ResMut<ReflexDisplay>) {
    if rt.is_changed() {
        display.0 = rt.session.display_state();
    }
}
