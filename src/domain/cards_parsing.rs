//! Parsing and display for card types (compact 2-character tokens).

use std::fmt;
use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

fn rank_char(rank: Rank) -> char {
    match rank {
        Rank::Ace => 'A',
        Rank::Two => '2',
        Rank::Three => '3',
        Rank::Four => '4',
        Rank::Five => '5',
        Rank::Six => '6',
        Rank::Seven => '7',
        Rank::Eight => '8',
        Rank::Nine => '9',
        Rank::Ten => 'T',
        Rank::Jack => 'J',
        Rank::Queen => 'Q',
        Rank::King => 'K',
    }
}

fn suit_char(suit: Suit) -> char {
    match suit {
        Suit::Clubs => 'C',
        Suit::Diamonds => 'D',
        Suit::Hearts => 'H',
        Suit::Spades => 'S',
    }
}

fn rank_from_char(c: char) -> Option<Rank> {
    match c {
        'A' => Some(Rank::Ace),
        '2' => Some(Rank::Two),
        '3' => Some(Rank::Three),
        '4' => Some(Rank::Four),
        '5' => Some(Rank::Five),
        '6' => Some(Rank::Six),
        '7' => Some(Rank::Seven),
        '8' => Some(Rank::Eight),
        '9' => Some(Rank::Nine),
        'T' => Some(Rank::Ten),
        'J' => Some(Rank::Jack),
        'Q' => Some(Rank::Queen),
        'K' => Some(Rank::King),
        _ => None,
    }
}

fn suit_from_char(c: char) -> Option<Suit> {
    match c {
        'C' => Some(Suit::Clubs),
        'D' => Some(Suit::Diamonds),
        'H' => Some(Suit::Hearts),
        'S' => Some(Suit::Spades),
        _ => None,
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", rank_char(self.rank), suit_char(self.suit))
    }
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(DomainError::validation(
                ValidationKind::ParseCard,
                format!("Card token must be 2 characters, got {s:?}"),
            ));
        };
        let rank = rank_from_char(r).ok_or_else(|| {
            DomainError::validation(ValidationKind::ParseCard, format!("Invalid rank: {r}"))
        })?;
        let suit = suit_from_char(su).ok_or_else(|| {
            DomainError::validation(ValidationKind::ParseCard, format!("Invalid suit: {su}"))
        })?;
        Ok(Card { suit, rank })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        for token in ["AS", "2C", "TD", "JH", "QS", "KC", "9D"] {
            let card: Card = token.parse().unwrap();
            assert_eq!(card.to_string(), token);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert!("1S".parse::<Card>().is_err());
        assert!("AX".parse::<Card>().is_err());
        assert!("ASS".parse::<Card>().is_err());
    }
}
