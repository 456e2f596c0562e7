//! Integration tests for the Hokm engine.
//!
//! These drive complete sessions through the dispatcher, the same way an
//! adapter would.

use hokm_core::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

fn dispatcher(seed: u64) -> Dispatcher {
    Dispatcher::with_seed(MatchRules::default(), seed).unwrap()
}

fn ids(mode: Mode) -> Vec<PlayerId> {
    (0..mode.capacity()).map(|i| PlayerId::from(format!("user-{i}"))).collect()
}

/// Create a session and fill every seat
fn full_table(d: &Dispatcher, mode: Mode) -> (SessionId, Vec<PlayerId>) {
    let players = ids(mode);
    let id = d.create_session(mode, players[0].clone(), "Host".into()).unwrap();
    for (i, p) in players.iter().enumerate().skip(1) {
        d.join_session(id, p.clone(), format!("Guest {i}")).unwrap();
    }
    (id, players)
}

fn bots(players: &[PlayerId], difficulty: BotDifficulty) -> Vec<Bot> {
    players
        .iter()
        .enumerate()
        .map(|(i, p)| Bot::with_seed(p.clone(), difficulty, i as u64))
        .collect()
}

/// Let the bot on turn make one move
fn bot_step(d: &Dispatcher, id: SessionId, bots: &mut [Bot]) -> ActionResult {
    let snapshot = d.snapshot(id).unwrap();
    let bot = bots
        .iter_mut()
        .find(|b| snapshot.turn_player() == Some(&b.player))
        .expect("someone is on turn");
    let hand = d.show_hand(id, &bot.player).unwrap();
    let mv = bot.choose_move(&snapshot, &hand).expect("bot has a move");
    match d.dispatch(mv.into_command(id, bot.player.clone())).unwrap() {
        Response::Updated(result) => result,
        other => panic!("unexpected response {:?}", other),
    }
}

/// Play until the match ends, returning every event
fn play_out(d: &Dispatcher, id: SessionId, bots: &mut [Bot]) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..10_000 {
        let result = bot_step(d, id, bots);
        events.extend(result.events);
        if matches!(result.snapshot.status, SessionStatus::Finished { .. }) {
            return events;
        }
    }
    panic!("match did not finish");
}

fn hakem_holder_of_ace(d: &Dispatcher, id: SessionId, players: &[PlayerId]) -> Option<Seat> {
    players
        .iter()
        .position(|p| d.show_hand(id, p).unwrap().contains(&Card::ACE_OF_SPADES))
        .map(|i| i as Seat)
}

#[test]
fn test_four_player_lobby_fills_and_deals() {
    for seed in 0..20 {
        let d = dispatcher(seed);
        let players = ids(Mode::FourPlayer);
        let id = d
            .create_session(Mode::FourPlayer, players[0].clone(), "Host".into())
            .unwrap();

        for (i, p) in players.iter().enumerate().skip(1) {
            let result = d.join_session(id, p.clone(), format!("Guest {i}")).unwrap();
            let expected = if i == 3 {
                SessionStatus::ChoosingTrump
            } else {
                SessionStatus::Lobby
            };
            assert_eq!(result.snapshot.status, expected);
        }

        let snapshot = d.snapshot(id).unwrap();
        let expected_hakem = hakem_holder_of_ace(&d, id, &players).unwrap_or(0);
        assert_eq!(snapshot.hakem, Some(expected_hakem));
        assert_eq!(snapshot.turn, Some(expected_hakem));
        for p in &players {
            assert_eq!(d.show_hand(id, p).unwrap().len(), 5);
        }
    }
}

#[test]
fn test_join_errors_through_dispatcher() {
    let d = dispatcher(1);
    let (id, players) = full_table(&d, Mode::TwoPlayer);

    assert_eq!(
        d.join_session(id, "late".into(), "Late".into()),
        Err(GameError::SessionFull)
    );
    assert_eq!(
        d.join_session(id, players[1].clone(), "Again".into()),
        Err(GameError::AlreadyJoined)
    );
}

#[test]
fn test_trump_choice_rules() {
    let d = dispatcher(2);
    let (id, players) = full_table(&d, Mode::FourPlayer);
    let snapshot = d.snapshot(id).unwrap();
    let hakem = snapshot.hakem.unwrap();
    let other = &players[Mode::FourPlayer.next_seat(hakem) as usize];
    let hakem_id = &players[hakem as usize];

    let card = d.show_hand(id, hakem_id).unwrap()[0];
    assert_eq!(d.play_card(id, hakem_id, card), Err(GameError::InvalidState));
    assert_eq!(d.choose_trump(id, other, Suit::Hearts), Err(GameError::NotHakem));
    assert_eq!(d.snapshot(id).unwrap(), snapshot);

    let result = d.choose_trump(id, hakem_id, Suit::Hearts).unwrap();
    assert_eq!(
        result.events,
        vec![GameEvent::TrumpChosen {
            hakem,
            suit: Suit::Hearts
        }]
    );
    assert_eq!(result.snapshot.status, SessionStatus::Playing);
    assert_eq!(result.snapshot.trump, Some(Suit::Hearts));
    for p in &players {
        assert_eq!(d.show_hand(id, p).unwrap().len(), 13);
    }

    assert_eq!(
        d.choose_trump(id, hakem_id, Suit::Clubs),
        Err(GameError::InvalidState)
    );
}

#[test]
fn test_out_of_turn_play_is_rejected_without_change() {
    let d = dispatcher(3);
    let (id, players) = full_table(&d, Mode::FourPlayer);
    let hakem = d.snapshot(id).unwrap().hakem.unwrap();
    d.choose_trump(id, &players[hakem as usize], Suit::Spades).unwrap();

    let leader = &players[hakem as usize];
    let lead = d.legal_cards(id, leader).unwrap()[0];
    d.play_card(id, leader, lead).unwrap();

    let before = d.snapshot(id).unwrap();
    let intruder = &players[hakem as usize];
    let card = d.show_hand(id, intruder).unwrap()[0];

    assert_eq!(d.play_card(id, intruder, card), Err(GameError::NotYourTurn));
    assert_eq!(d.snapshot(id).unwrap(), before);
    assert_eq!(before.current_trick.len(), 1);
}

#[test]
fn test_follow_suit_is_enforced() {
    let mut checked = 0;

    for seed in 0..10 {
        let d = dispatcher(seed);
        let (id, players) = full_table(&d, Mode::FourPlayer);
        let mut table = bots(&players, BotDifficulty::Easy);
        bot_step(&d, id, &mut table);

        for _ in 0..30 {
            let snapshot = d.snapshot(id).unwrap();
            if snapshot.status != SessionStatus::Playing {
                break;
            }
            let plays = snapshot.trick_plays();
            if let (Some(led), Some(player)) = (trick::led_suit(&plays), snapshot.turn_player()) {
                let hand = d.show_hand(id, player).unwrap();
                let off_suit = hand.iter().find(|c| c.suit != led);
                if hand.iter().any(|c| c.suit == led) {
                    if let Some(&card) = off_suit {
                        assert_eq!(
                            d.play_card(id, player, card),
                            Err(GameError::IllegalCard(IllegalCardReason::MustFollowSuit { led }))
                        );
                        assert_eq!(d.snapshot(id).unwrap(), snapshot);
                        checked += 1;
                    }
                }
            }
            bot_step(&d, id, &mut table);
        }
    }

    assert!(checked > 0, "no follow-suit situation came up");
}

#[test]
fn test_card_not_in_hand_is_illegal() {
    let d = dispatcher(4);
    let (id, players) = full_table(&d, Mode::TwoPlayer);
    let hakem = d.snapshot(id).unwrap().hakem.unwrap();
    let hakem_id = &players[hakem as usize];
    d.choose_trump(id, hakem_id, Suit::Diamonds).unwrap();

    let other = &players[Mode::TwoPlayer.next_seat(hakem) as usize];
    let foreign = d.show_hand(id, other).unwrap()[0];
    assert_eq!(
        d.play_card(id, hakem_id, foreign),
        Err(GameError::IllegalCard(IllegalCardReason::NotInHand))
    );
}

#[test]
fn test_full_four_player_match() {
    let d = dispatcher(2024);
    let (id, players) = full_table(&d, Mode::FourPlayer);
    let mut table = bots(&players, BotDifficulty::Medium);

    let events = play_out(&d, id, &mut table);

    let mut round_wins = SideScore::default();
    let mut tricks = SideScore::default();
    for event in &events {
        match event {
            GameEvent::TrickWon { side, tricks: count, .. } => {
                tricks.increment(*side);
                assert_eq!(tricks.get(*side), *count);
                assert!(*count <= 7);
            }
            GameEvent::RoundWon { side, match_score, .. } => {
                assert_eq!(tricks.get(*side), 7);
                assert!(tricks.get(side.opponent()) < 7);
                tricks = SideScore::default();
                round_wins.increment(*side);
                assert_eq!(*match_score, round_wins);
            }
            _ => {}
        }
    }

    let Some(GameEvent::MatchWon { side, match_score }) = events.last().cloned() else {
        panic!("last event should be the match result");
    };
    assert_eq!(match_score.get(side), 7);
    assert!(match_score.get(side.opponent()) < 7);
    assert_eq!(round_wins, match_score);

    // Finished sessions are retired
    assert_eq!(d.snapshot(id), Err(GameError::SessionNotFound));
    assert_eq!(d.session_count(), 0);
}

#[test]
fn test_four_player_hakem_rotation() {
    let d = dispatcher(77);
    let (id, players) = full_table(&d, Mode::FourPlayer);
    let mut table = bots(&players, BotDifficulty::Easy);

    let mut hakem = d.snapshot(id).unwrap().hakem.unwrap();
    let mut rounds_seen = 0;
    loop {
        let result = bot_step(&d, id, &mut table);
        let Some(winner) = result.events.iter().find_map(|e| match e {
            GameEvent::RoundWon { side, .. } => Some(*side),
            _ => None,
        }) else {
            continue;
        };
        if matches!(result.snapshot.status, SessionStatus::Finished { .. }) {
            break;
        }

        let expected = if Mode::FourPlayer.side_of(hakem) == winner {
            hakem
        } else {
            (hakem + 1) % 4
        };
        assert_eq!(result.snapshot.hakem, Some(expected));
        hakem = expected;
        rounds_seen += 1;
    }
    assert!(rounds_seen >= 6);
}

#[test]
fn test_two_player_hakem_alternates() {
    let d = dispatcher(5);
    let (id, players) = full_table(&d, Mode::TwoPlayer);
    let mut table = bots(&players, BotDifficulty::Medium);
    let first = d.snapshot(id).unwrap().hakem.unwrap();

    let result = loop {
        let result = bot_step(&d, id, &mut table);
        if result.snapshot.round == Some(2) {
            break result;
        }
    };

    // Whoever won round 1, the other player is hakem now
    assert_eq!(result.snapshot.hakem, Some(1 - first));
    assert_eq!(result.snapshot.status, SessionStatus::ChoosingTrump);
    assert_eq!(result.snapshot.trick_score, SideScore::default());
    assert_eq!(result.snapshot.match_score.a + result.snapshot.match_score.b, 1);
}

#[test]
fn test_two_player_keep_on_win_rotation() {
    let rules = MatchRules {
        two_player_rotation: HakemRotation::KeepOnWin,
        ..MatchRules::default()
    };
    let d = Dispatcher::with_seed(rules, 6).unwrap();
    let (id, players) = full_table(&d, Mode::TwoPlayer);
    let mut table = bots(&players, BotDifficulty::Medium);
    let first = d.snapshot(id).unwrap().hakem.unwrap();

    let result = loop {
        let result = bot_step(&d, id, &mut table);
        if result.snapshot.round == Some(2) {
            break result;
        }
    };

    let winner = if result.snapshot.match_score.a == 1 {
        Side::A
    } else {
        Side::B
    };
    let expected = if Mode::TwoPlayer.side_of(first) == winner {
        first
    } else {
        1 - first
    };
    assert_eq!(result.snapshot.hakem, Some(expected));
}

#[test]
fn test_two_player_match_leaves_half_deck_undealt() {
    let d = dispatcher(8);
    let (id, players) = full_table(&d, Mode::TwoPlayer);
    let hakem = d.snapshot(id).unwrap().hakem.unwrap();
    d.choose_trump(id, &players[hakem as usize], Suit::Clubs).unwrap();

    let mut seen = HashSet::new();
    for p in &players {
        let hand = d.show_hand(id, p).unwrap();
        assert_eq!(hand.len(), 13);
        seen.extend(hand);
    }
    assert_eq!(seen.len(), 26);
}

#[test]
fn test_short_match_rules() {
    let rules = MatchRules {
        tricks_to_win_round: 1,
        rounds_to_win_match: 2,
        ..MatchRules::default()
    };
    let d = Dispatcher::with_seed(rules, 10).unwrap();
    let (id, players) = full_table(&d, Mode::TwoPlayer);
    let mut table = bots(&players, BotDifficulty::Easy);

    let events = play_out(&d, id, &mut table);
    let rounds = events
        .iter()
        .filter(|e| matches!(e, GameEvent::RoundWon { .. }))
        .count();
    assert!((2..=3).contains(&rounds));
}

#[test]
fn test_cancel_discards_session() {
    let d = dispatcher(11);
    let (id, players) = full_table(&d, Mode::FourPlayer);

    assert_eq!(
        d.cancel_session(id, &players[2], false),
        Err(GameError::NotAuthorized)
    );
    let events = d.cancel_session(id, &players[0], false).unwrap();
    assert_eq!(
        events,
        vec![GameEvent::SessionCancelled {
            by: players[0].clone()
        }]
    );

    assert_eq!(
        d.choose_trump(id, &players[0], Suit::Hearts),
        Err(GameError::SessionNotFound)
    );
    assert_eq!(
        d.cancel_session(id, &players[0], false),
        Err(GameError::SessionNotFound)
    );
}

#[test]
fn test_sessions_run_in_parallel() {
    let d = dispatcher(12);
    let tables: Vec<(SessionId, Vec<PlayerId>)> = (0..6)
        .map(|i| {
            let mode = if i % 2 == 0 { Mode::TwoPlayer } else { Mode::FourPlayer };
            let players: Vec<PlayerId> = (0..mode.capacity())
                .map(|s| PlayerId::from(format!("t{i}-p{s}")))
                .collect();
            let id = d.create_session(mode, players[0].clone(), "Host".into()).unwrap();
            for p in &players[1..] {
                d.join_session(id, p.clone(), "Guest".into()).unwrap();
            }
            (id, players)
        })
        .collect();

    std::thread::scope(|scope| {
        for (id, players) in &tables {
            let d = &d;
            scope.spawn(move || {
                let mut table = bots(players, BotDifficulty::Easy);
                play_out(d, *id, &mut table);
            });
        }
    });

    assert_eq!(d.session_count(), 0);
}

/// Every dealt card of a 4-player round is held, on the table or in a won trick
fn assert_cards_accounted_for(snapshot: &SessionSnapshot) {
    let held: usize = snapshot.seats.iter().map(|s| s.cards_in_hand).sum();
    let tricks = (snapshot.trick_score.a + snapshot.trick_score.b) as usize;
    assert!(snapshot.current_trick.len() < snapshot.capacity);

    if snapshot.status == SessionStatus::ChoosingTrump {
        assert_eq!(held, 4 * 5);
        assert!(snapshot.current_trick.is_empty());
        assert_eq!(tricks, 0);
    } else {
        assert_eq!(held + snapshot.current_trick.len() + 4 * tricks, DECK_SIZE);
    }
}

#[test]
fn test_one_session_under_concurrent_commands() {
    let d = dispatcher(14);
    let (id, _) = full_table(&d, Mode::FourPlayer);
    let played = AtomicUsize::new(0);
    let resolved = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let Ok(snapshot) = d.snapshot(id) else {
                        return;
                    };
                    let Some(player) = snapshot.turn_player().cloned() else {
                        return;
                    };

                    let outcome = if snapshot.status == SessionStatus::ChoosingTrump {
                        d.choose_trump(id, &player, Suit::Hearts)
                    } else {
                        let legal = d.legal_cards(id, &player).unwrap_or_default();
                        let Some(&card) = legal.first() else {
                            continue;
                        };
                        d.play_card(id, &player, card)
                    };

                    match outcome {
                        Ok(result) => {
                            assert_cards_accounted_for(&result.snapshot);
                            for event in &result.events {
                                match event {
                                    GameEvent::CardPlayed { .. } => {
                                        played.fetch_add(1, Ordering::SeqCst);
                                    }
                                    GameEvent::TrickWon { .. } => {
                                        resolved.fetch_add(1, Ordering::SeqCst);
                                    }
                                    _ => {}
                                }
                            }
                        }
                        // Lost a race with another thread acting for the same seat
                        Err(GameError::NotYourTurn)
                        | Err(GameError::NotHakem)
                        | Err(GameError::InvalidState)
                        | Err(GameError::IllegalCard(_))
                        | Err(GameError::SessionNotFound) => {}
                        Err(other) => panic!("unexpected rejection {other:?}"),
                    }
                }
            });
        }
    });

    let played = played.into_inner();
    let resolved = resolved.into_inner();
    assert!(played > 0);

    if let Ok(snapshot) = d.snapshot(id) {
        assert_cards_accounted_for(&snapshot);
        assert_eq!(played, 4 * resolved + snapshot.current_trick.len());
    }
}

#[test]
fn test_snapshot_round_trips_as_json() {
    let d = dispatcher(13);
    let (id, _) = full_table(&d, Mode::FourPlayer);
    let snapshot = d.snapshot(id).unwrap();

    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}
