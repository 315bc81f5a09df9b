//! Property-based checks over arbitrary command sequences.

use proptest::prelude::*;

use reflex_leds::*;

#[derive(Debug, Clone)]
enum Op {
    Join(u32),
    Key(usize),
    Press(u8, usize),
    Advance(u64),
    Pause,
    Reset,
}

const KEYS: [&str; 8] = ["ArrowUp", "ArrowLeft", "ArrowRight", "ArrowDown", "w", "a", "d", "s"];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (0u32..6).prop_map(Op::Join),
        2 => (0usize..KEYS.len()).prop_map(Op::Key),
        6 => (1u8..=5, 0usize..4).prop_map(|(p, d)| Op::Press(p, d)),
        6 => (0u64..2500).prop_map(Op::Advance),
        1 => Just(Op::Pause),
        1 => Just(Op::Reset),
    ]
}

fn mode_strategy() -> impl Strategy<Value = GameMode> {
    prop_oneof![Just(GameMode::Competitive), Just(GameMode::Cooperative), Just(GameMode::Points)]
}

fn apply(s: &mut Session, op: &Op, now: &mut u64) {
    match op {
        Op::Join(pad) => {
            s.join(ControlSource::Gamepad(*pad), *now);
        }
        Op::Key(i) => s.handle_raw_input(&RawInput::key(KEYS[*i]), *now),
        Op::Press(p, d) => s.handle_direction_input(*p, Direction::ALL[*d], *now),
        Op::Advance(dt) => {
            *now += dt;
            s.tick(*now);
        }
        Op::Pause => s.toggle_pause(None, *now),
        Op::Reset => s.reset(*now),
    }
}

fn check_invariants(s: &Session) -> Result<(), TestCaseError> {
    let tuning = s.config().tuning(s.mode());
    let w = s.difficulty_window_ms();
    prop_assert!(tuning.min_window_ms <= w && w <= tuning.max_window_ms, "window {} out of bounds", w);

    let live = matches!(s.phase(), RoundPhase::Prompting | RoundPhase::Closing);
    prop_assert_eq!(live, s.round().is_some());
    prop_assert!(s.pending_tasks().len() <= 1, "tasks: {:?}", s.pending_tasks());
    if s.is_paused() {
        prop_assert!(s.pending_tasks().is_empty());
        prop_assert!(s.round().is_none());
    }

    let players = s.players().players();
    prop_assert_eq!(s.players().assigned_inputs().len(), players.len() * 4);
    for (i, p) in players.iter().enumerate() {
        prop_assert_eq!(usize::from(p.id), i + 1);
        prop_assert_eq!(p.correct_count + p.wrong_count, p.total_presses);
        prop_assert!(p.streak <= p.longest_streak);
        prop_assert!(players.iter().filter(|q| q.control_source == p.control_source).count() == 1);
    }
    prop_assert!(s.total_prompts_issued() >= s.log().rounds.len() as u64);
    Ok(())
}

proptest! {
    #[test]
    fn session_invariants_hold(
        mode in mode_strategy(),
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let cfg = GameConfig { seed: Some(seed), ..GameConfig::default() };
        let mut s = Session::new(cfg, mode);
        let mut now = 0u64;
        for op in &ops {
            apply(&mut s, op, &mut now);
            check_invariants(&s)?;
        }
    }

    #[test]
    fn reset_twice_equals_reset_once(
        mode in mode_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let cfg = GameConfig { seed: Some(1), ..GameConfig::default() };
        let mut s = Session::new(cfg, mode);
        let mut now = 0u64;
        for op in &ops {
            apply(&mut s, op, &mut now);
        }
        s.reset(now);
        let once = (s.display_state(), s.phase(), s.pending_tasks().to_vec(), s.log().clone());
        s.reset(now);
        let twice = (s.display_state(), s.phase(), s.pending_tasks().to_vec(), s.log().clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn joins_never_share_bindings(pads in prop::collection::vec(0u32..8, 0..20)) {
        let mut reg = PlayerRegistry::new(MAX_PLAYERS);
        for pad in pads {
            reg.join(ControlSource::Gamepad(pad));
        }
        let total: usize = reg.players().iter().map(|p| p.control_source.bindings().len()).sum();
        prop_assert_eq!(reg.assigned_inputs().len(), total);
        prop_assert!(reg.len() <= MAX_PLAYERS);
    }

    #[test]
    fn target_draw_is_in_direction_set(seed in any::<u64>()) {
        let mut src = RandomDirections::seeded(seed);
        for _ in 0..16 {
            prop_assert!(Direction::ALL.contains(&src.next_direction()));
        }
    }
}
