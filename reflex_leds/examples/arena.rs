use bevy::prelude::*;
use reflex_leds::*;

fn main() {
    App::new()
        .insert_resource(ReflexSettings::default())
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window { title: "REFLEX LEDS".into(), resolution: (960.0, 540.0).into(), ..default() }),
                ..default()
            }),
            ReflexPlugin,
        ))
        .add_systems(Update, (on_prompt, on_banner))
        .run();
}

fn on_prompt(mut ev: EventReader<PromptCue>) {
    for cue in ev.read() {
        info!("LED {}", cue.target);
    }
}

fn on_banner(display: Res<ReflexDisplay>, mut last: Local<Option<Banner>>) {
    let banner = display.0.banner;
    if *last != Some(banner) {
        info!("{:?} (window {} ms)", banner, display.0.difficulty_window_ms);
        *last = Some(banner);
    }
}
