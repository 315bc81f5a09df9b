use reflex_leds::*;

fn bots(cfg: &GameConfig, n: u32) -> Vec<Bot> {
    let profiles = [BotProfile::Skilled, BotProfile::Novice, BotProfile::Master, BotProfile::Skilled];
    (0..n)
        .map(|i| Bot::new(ControlSource::Gamepad(i), profiles[i as usize % profiles.len()], cfg, 100 + u64::from(i)))
        .collect()
}

fn run(mode: GameMode, n: u32) -> Session {
    let cfg = GameConfig { seed: Some(2024), ..GameConfig::default() };
    let mut bots = bots(&cfg, n);
    let mut session = Session::new(cfg, mode);
    run_bots(&mut session, &mut bots, 0, 60_000, 16);
    session
}

fn live_rounds(s: &Session) -> u64 {
    u64::from(s.round().is_some())
}

#[test]
fn competitive_bots_play_a_minute() {
    let s = run(GameMode::Competitive, 3);
    assert_eq!(s.players().len(), 3);
    assert!(s.total_prompts_issued() > 50);
    assert_eq!(s.total_prompts_issued(), s.log().rounds.len() as u64 + live_rounds(&s));

    let claimed = s
        .log()
        .rounds
        .iter()
        .filter(|r| matches!(r.outcome, RoundOutcome::Claimed { .. }))
        .count() as u32;
    let correct: u32 = s.players().players().iter().map(|p| p.correct_count).sum();
    assert_eq!(claimed, correct);

    // the master bot is fastest and takes the most rounds
    let best = s.players().players().iter().max_by_key(|p| p.correct_count).unwrap();
    assert_eq!(best.id, 3);
}

#[test]
fn cooperative_bots_clear_rounds() {
    let s = run(GameMode::Cooperative, 2);
    assert!(s.log().rounds.iter().any(|r| r.outcome == RoundOutcome::Cleared));
    let window = s.difficulty_window_ms();
    assert!((ModeTuning::COOPERATIVE.min_window_ms..=ModeTuning::COOPERATIVE.max_window_ms).contains(&window));
}

#[test]
fn points_bots_accumulate_scores() {
    let s = run(GameMode::Points, 4);
    let scored: u32 = s
        .log()
        .rounds
        .iter()
        .filter_map(|r| match &r.outcome {
            RoundOutcome::Scored { awards } => Some(awards.iter().map(|(_, pts)| *pts).sum::<u32>()),
            _ => None,
        })
        .sum();
    let total: u32 = s.players().players().iter().map(|p| p.score).sum();
    // a live round may already hold awards not yet logged
    assert!(total >= scored);
    assert!(scored > 0);
    let display = s.display_state();
    assert_eq!(display.players.len(), 4);
    assert!(display.players.iter().all(|p| p.accuracy_pct.is_some()));
}
