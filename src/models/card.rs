use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// Deck order used when mapping API integers onto cards
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
        }
    }
}

/// Card rank, 1 (ace) through 13 (king)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rank(u8);

impl Rank {
    pub const ACE: Rank = Rank(1);
    pub const KING: Rank = Rank(13);

    pub fn new(value: u8) -> Option<Self> {
        (1..=13).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        match self.0 {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        }
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase();
        let value = match label.as_str() {
            "A" => 1,
            "J" => 11,
            "Q" => 12,
            "K" => 13,
            other => other.parse::<u8>().map_err(|_| format!("unknown rank '{}'", s))?,
        };
        Rank::new(value).ok_or_else(|| format!("rank out of range '{}'", s))
    }
}

impl TryFrom<String> for Rank {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Map an integer in 1..=52 onto a standard deck
    pub fn from_index(index: u32) -> Option<Self> {
        if !(1..=52).contains(&index) {
            return None;
        }
        let zero_based = index - 1;
        let suit = Suit::ALL[(zero_based / 13) as usize];
        let rank = Rank((zero_based % 13) as u8 + 1);
        Some(Self { suit, rank })
    }

    /// Arithmetic value: ace is 1, face cards are 11 to 13
    pub fn value(&self) -> i64 {
        i64::from(self.rank.value())
    }

    pub fn display_name(&self) -> String {
        format!("{} of {}", self.rank.label(), self.suit.name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_values() {
        let ace = Card::new(Suit::Spades, "A".parse().unwrap());
        let ten = Card::new(Suit::Hearts, "10".parse().unwrap());
        let queen = Card::new(Suit::Clubs, "q".parse().unwrap());
        let king = Card::new(Suit::Diamonds, Rank::KING);

        assert_eq!(ace.value(), 1);
        assert_eq!(ten.value(), 10);
        assert_eq!(queen.value(), 12);
        assert_eq!(king.value(), 13);
    }

    #[test]
    fn test_invalid_ranks_rejected() {
        assert!("0".parse::<Rank>().is_err());
        assert!("14".parse::<Rank>().is_err());
        assert!("Z".parse::<Rank>().is_err());
        assert!(Rank::new(0).is_none());
    }

    #[test]
    fn test_from_index_covers_deck() {
        assert_eq!(Card::from_index(1), Some(Card::new(Suit::Hearts, Rank::ACE)));
        assert_eq!(Card::from_index(13), Some(Card::new(Suit::Hearts, Rank::KING)));
        assert_eq!(Card::from_index(14), Some(Card::new(Suit::Diamonds, Rank::ACE)));
        assert_eq!(Card::from_index(52), Some(Card::new(Suit::Spades, Rank::KING)));
        assert_eq!(Card::from_index(0), None);
        assert_eq!(Card::from_index(53), None);
    }

    #[test]
    fn test_display() {
        let card = Card::new(Suit::Hearts, Rank::new(12).unwrap());
        assert_eq!(card.to_string(), "Q♥");
        assert_eq!(card.display_name(), "Q of hearts");
    }

    #[test]
    fn test_serde_uses_labels() {
        let card = Card::new(Suit::Clubs, Rank::ACE);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"suit":"clubs","rank":"A"}"#);
    }
}
