use super::cards_types::{Card, Rank, Suit};
use super::scoring::{apply_round_scoring, compute_outcome, round_score};
use super::state::{GameOutcome, RoundPhase};
use super::test_state_helpers::playing_game;

fn card(rank: Rank, suit: Suit) -> Card {
    Card { suit, rank }
}

#[test]
fn round_score_sums_remaining_slots() {
    // {3♠, 7♦, vanished, K♣} = 3 + 7 + 0 + 13 = 23
    let hand = [
        Some(card(Rank::Three, Suit::Spades)),
        Some(card(Rank::Seven, Suit::Diamonds)),
        None,
        Some(card(Rank::King, Suit::Clubs)),
    ];
    assert_eq!(round_score(&hand), 23);
}

#[test]
fn round_score_ace_counts_one() {
    let hand = [
        Some(card(Rank::Ace, Suit::Hearts)),
        Some(card(Rank::Ace, Suit::Spades)),
        None,
        None,
    ];
    assert_eq!(round_score(&hand), 2);
}

#[test]
fn scoring_writes_round_scores_and_cumulative_totals() {
    let mut state = playing_game(2, 1);
    {
        let round = state.current_round_mut().unwrap();
        round.hands[0] = [
            Some(card(Rank::Two, Suit::Clubs)),
            Some(card(Rank::Three, Suit::Clubs)),
            None,
            None,
        ];
        round.hands[1] = [
            Some(card(Rank::King, Suit::Hearts)),
            Some(card(Rank::Queen, Suit::Hearts)),
            Some(card(Rank::Jack, Suit::Hearts)),
            None,
        ];
        round.phase = RoundPhase::Scoring;
        round.turn = None;
    }

    apply_round_scoring(&mut state).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.scores, Some(vec![5, 36]));
    assert_eq!(round.phase, RoundPhase::Complete);
    assert_eq!(state.cumulative_scores, vec![5, 36]);
}

#[test]
fn correct_declaration_increments_calls() {
    let mut state = playing_game(2, 1);
    {
        let round = state.current_round_mut().unwrap();
        round.hands[0] = [Some(card(Rank::Ace, Suit::Clubs)), None, None, None];
        round.hands[1] = [Some(card(Rank::Nine, Suit::Clubs)), None, None, None];
        round.declared_by = Some(0);
        round.phase = RoundPhase::Scoring;
        round.turn = None;
    }

    apply_round_scoring(&mut state).unwrap();

    assert_eq!(state.current_round().unwrap().declaration_correct, Some(true));
    assert_eq!(state.scambodia_calls, vec![1, 0]);
}

#[test]
fn tied_declaration_is_not_correct() {
    let mut state = playing_game(2, 1);
    {
        let round = state.current_round_mut().unwrap();
        round.hands[0] = [Some(card(Rank::Five, Suit::Clubs)), None, None, None];
        round.hands[1] = [Some(card(Rank::Five, Suit::Hearts)), None, None, None];
        round.declared_by = Some(0);
        round.phase = RoundPhase::Scoring;
        round.turn = None;
    }

    apply_round_scoring(&mut state).unwrap();

    assert_eq!(
        state.current_round().unwrap().declaration_correct,
        Some(false)
    );
    assert_eq!(state.scambodia_calls, vec![0, 0]);
}

#[test]
fn scoring_applies_once_only() {
    let mut state = playing_game(2, 1);
    {
        let round = state.current_round_mut().unwrap();
        round.phase = RoundPhase::Scoring;
        round.turn = None;
    }

    apply_round_scoring(&mut state).unwrap();
    let totals_after_first = state.cumulative_scores.clone();

    // Second call sees Complete and must not double-count.
    apply_round_scoring(&mut state).unwrap();
    assert_eq!(state.cumulative_scores, totals_after_first);
}

#[test]
fn outcome_lowest_cumulative_wins() {
    let mut state = playing_game(3, 1);
    state.cumulative_scores = vec![12, 7, 30];
    assert_eq!(compute_outcome(&state), GameOutcome::Winner { seat: 1 });
}

#[test]
fn outcome_tie_broken_by_correct_declarations() {
    // Both finish on 10; A declared correctly twice, B once -> A wins.
    let mut state = playing_game(2, 3);
    state.cumulative_scores = vec![10, 10];
    state.scambodia_calls = vec![2, 1];
    assert_eq!(compute_outcome(&state), GameOutcome::Winner { seat: 0 });
}

#[test]
fn outcome_full_tie_is_a_draw() {
    let mut state = playing_game(3, 1);
    state.cumulative_scores = vec![10, 10, 25];
    state.scambodia_calls = vec![1, 1, 0];
    assert_eq!(
        compute_outcome(&state),
        GameOutcome::Draw { seats: vec![0, 1] }
    );
}
