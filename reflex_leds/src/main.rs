use std::process::ExitCode;

use reflex_leds::{run_bots, Bot, BotProfile, ControlSource, GameConfig, GameMode, Session};

const USAGE: &str = "usage: reflex_leds [--mode competitive|cooperative|points] [--bots N] \
[--profile novice|skilled|master] [--duration-ms T] [--config PATH] [--log PATH]";

struct Args {
    mode: GameMode,
    bots: u32,
    profile: Option<BotProfile>,
    duration_ms: u64,
    config: Option<String>,
    log: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut out = Args { mode: GameMode::Competitive, bots: 2, profile: None, duration_ms: 30_000, config: None, log: None };
    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("missing value for {}", flag));
        match flag.as_str() {
            "--mode" => out.mode = value()?.parse()?,
            "--bots" => out.bots = value()?.parse().map_err(|e| format!("--bots: {}", e))?,
            "--profile" => out.profile = Some(value()?.parse()?),
            "--duration-ms" => out.duration_ms = value()?.parse().map_err(|e| format!("--duration-ms: {}", e))?,
            "--config" => out.config = Some(value()?),
            "--log" => out.log = Some(value()?),
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument '{}'\n{}", other, USAGE)),
        }
    }
    Ok(out)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    let cfg = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    let cycle = [BotProfile::Skilled, BotProfile::Novice, BotProfile::Master];
    let base_seed = cfg.seed.unwrap_or_else(rand::random);
    let mut bots: Vec<Bot> = (0..args.bots.min(cfg.max_players as u32))
        .map(|i| {
            let profile = args.profile.unwrap_or(cycle[i as usize % cycle.len()]);
            Bot::new(ControlSource::Gamepad(i), profile, &cfg, base_seed ^ (0xB0_75 + u64::from(i)))
        })
        .collect();

    tracing::info!(mode = %args.mode, bots = bots.len(), duration_ms = args.duration_ms, "starting headless session");
    let mut session = Session::new(cfg, args.mode);
    run_bots(&mut session, &mut bots, 0, args.duration_ms, 16);

    if let Some(path) = &args.log {
        if let Err(e) = session.log().save(path) {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
        tracing::info!(rounds = session.log().rounds.len(), path = %path, "session log written");
    }

    match serde_json::to_string_pretty(&session.display_state()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("failed to encode display state: {}", e);
            ExitCode::FAILURE
        }
    }
}
