//! Serialization and deserialization for card types

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Card, Rank, Suit};

// Suit serde
impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            Suit::Clubs => "CLUBS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Hearts => "HEARTS",
            Suit::Spades => "SPADES",
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "CLUBS" => Ok(Suit::Clubs),
            "DIAMONDS" => Ok(Suit::Diamonds),
            "HEARTS" => Ok(Suit::Hearts),
            "SPADES" => Ok(Suit::Spades),
            _ => Err(serde::de::Error::custom(format!("Invalid suit: {s}"))),
        }
    }
}

// Rank serde
impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            Rank::Ace => "ACE",
            Rank::Two => "TWO",
            Rank::Three => "THREE",
            Rank::Four => "FOUR",
            Rank::Five => "FIVE",
            Rank::Six => "SIX",
            Rank::Seven => "SEVEN",
            Rank::Eight => "EIGHT",
            Rank::Nine => "NINE",
            Rank::Ten => "TEN",
            Rank::Jack => "JACK",
            Rank::Queen => "QUEEN",
            Rank::King => "KING",
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "ACE" => Ok(Rank::Ace),
            "TWO" => Ok(Rank::Two),
            "THREE" => Ok(Rank::Three),
            "FOUR" => Ok(Rank::Four),
            "FIVE" => Ok(Rank::Five),
            "SIX" => Ok(Rank::Six),
            "SEVEN" => Ok(Rank::Seven),
            "EIGHT" => Ok(Rank::Eight),
            "NINE" => Ok(Rank::Nine),
            "TEN" => Ok(Rank::Ten),
            "JACK" => Ok(Rank::Jack),
            "QUEEN" => Ok(Rank::Queen),
            "KING" => Ok(Rank::King),
            _ => Err(serde::de::Error::custom(format!("Invalid rank: {s}"))),
        }
    }
}

// Card serde (compact 2-character format like "AS", "2C")
impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Card>()
            .map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_serde_roundtrip() {
        let cases = [
            (Rank::Ace, Suit::Spades, "AS"),
            (Rank::Ten, Suit::Diamonds, "TD"),
            (Rank::Three, Suit::Hearts, "3H"),
            (Rank::King, Suit::Clubs, "KC"),
        ];
        for (rank, suit, token) in cases {
            let c = Card { suit, rank };
            let s = serde_json::to_string(&c).unwrap();
            assert_eq!(s, format!("\"{token}\""));
            let decoded: Card = serde_json::from_str(&s).unwrap();
            assert_eq!(decoded, c);
        }
    }

    #[test]
    fn suit_serde() {
        assert_eq!(serde_json::to_string(&Suit::Clubs).unwrap(), "\"CLUBS\"");
        assert_eq!(serde_json::to_string(&Suit::Spades).unwrap(), "\"SPADES\"");
        assert_eq!(
            serde_json::from_str::<Suit>("\"DIAMONDS\"").unwrap(),
            Suit::Diamonds
        );
        assert!(serde_json::from_str::<Suit>("\"JOKERS\"").is_err());
    }

    #[test]
    fn rank_serde() {
        assert_eq!(serde_json::to_string(&Rank::Ace).unwrap(), "\"ACE\"");
        assert_eq!(serde_json::to_string(&Rank::King).unwrap(), "\"KING\"");
        assert_eq!(
            serde_json::from_str::<Rank>("\"SEVEN\"").unwrap(),
            Rank::Seven
        );
        assert!(serde_json::from_str::<Rank>("\"ONE\"").is_err());
    }
}
