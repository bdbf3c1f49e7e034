use std::{collections::HashSet, str::FromStr};

use crate::models::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Combine the running result with the next card value.
    /// Division by zero leaves the result untouched.
    pub fn apply(self, acc: i64, value: i64) -> i64 {
        match self {
            Operation::Add => acc.saturating_add(value),
            Operation::Subtract => acc.saturating_sub(value),
            Operation::Multiply => acc.saturating_mul(value),
            Operation::Divide if value == 0 => acc,
            Operation::Divide => acc / value,
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Operation::Add),
            "-" => Ok(Operation::Subtract),
            "*" | "x" => Ok(Operation::Multiply),
            "/" => Ok(Operation::Divide),
            other => Err(format!("'{}' is not one of + - * /", other)),
        }
    }
}

/// Cards picked for one answer, as zero-based positions in the hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub operation: Operation,
    pub positions: Vec<usize>,
}

impl Selection {
    pub fn card_count(&self) -> usize {
        self.positions.len()
    }

    /// Fold the selected card values left to right with the operation
    pub fn evaluate(&self, cards: &[Card]) -> i64 {
        let mut values = self.positions.iter().map(|&i| cards[i].value());
        let Some(first) = values.next() else {
            return 0;
        };
        values.fold(first, |acc, value| self.operation.apply(acc, value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Play(Selection),
    Skip,
    Quit,
    Help,
}

pub struct MoveValidator;

impl MoveValidator {
    pub const MIN_CARDS: usize = 2;

    /// Parse a line like `+ 1 3 4` against a hand of `hand_size` cards
    pub fn parse(input: &str, hand_size: usize) -> Result<Move, String> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "" => return Err("enter a move such as '+ 1 2'".to_string()),
            "skip" | "s" => return Ok(Move::Skip),
            "quit" | "q" | "exit" => return Ok(Move::Quit),
            "help" | "h" | "?" => return Ok(Move::Help),
            _ => {}
        }

        let mut tokens = input.split_whitespace();
        let operation: Operation = tokens
            .next()
            .ok_or_else(|| "missing operation".to_string())?
            .parse()?;

        let positions = tokens
            .map(|token| {
                token
                    .parse::<usize>()
                    .map_err(|_| format!("'{}' is not a card number", token))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::check_positions(&positions, hand_size)?;

        Ok(Move::Play(Selection {
            operation,
            positions: positions.into_iter().map(|p| p - 1).collect(),
        }))
    }

    /// Positions are 1-based here
    fn check_positions(positions: &[usize], hand_size: usize) -> Result<(), String> {
        if positions.len() < Self::MIN_CARDS {
            return Err(format!("select at least {} cards", Self::MIN_CARDS));
        }

        if let Some(bad) = positions.iter().find(|&&p| p == 0 || p > hand_size) {
            return Err(format!("card {} is not in your hand (1-{})", bad, hand_size));
        }

        let unique: HashSet<_> = positions.iter().collect();
        if unique.len() != positions.len() {
            return Err("each card can only be used once".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rank, Suit};

    fn hand(values: &[u8]) -> Vec<Card> {
        values
            .iter()
            .map(|&v| Card::new(Suit::Hearts, Rank::new(v).unwrap()))
            .collect()
    }

    fn play(input: &str) -> Selection {
        match MoveValidator::parse(input, 5) {
            Ok(Move::Play(selection)) => selection,
            other => panic!("expected a play, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(MoveValidator::parse("skip", 5), Ok(Move::Skip));
        assert_eq!(MoveValidator::parse(" Q ", 5), Ok(Move::Quit));
        assert_eq!(MoveValidator::parse("?", 5), Ok(Move::Help));
    }

    #[test]
    fn test_parse_selection() {
        let selection = play("* 2 5 1");
        assert_eq!(selection.operation, Operation::Multiply);
        assert_eq!(selection.positions, vec![1, 4, 0]);
    }

    #[test]
    fn test_rejects_bad_moves() {
        assert!(MoveValidator::parse("", 5).is_err());
        assert!(MoveValidator::parse("% 1 2", 5).is_err());
        assert!(MoveValidator::parse("+ 1", 5).is_err());
        assert!(MoveValidator::parse("+ 1 6", 5).is_err());
        assert!(MoveValidator::parse("+ 0 1", 5).is_err());
        assert!(MoveValidator::parse("+ 2 2", 5).is_err());
        assert!(MoveValidator::parse("+ 1 two", 5).is_err());
    }

    #[test]
    fn test_evaluate_operations() {
        let cards = hand(&[12, 3, 2, 5, 1]);

        assert_eq!(play("+ 1 2 3").evaluate(&cards), 17);
        assert_eq!(play("- 1 2 3").evaluate(&cards), 7);
        assert_eq!(play("* 2 3 4").evaluate(&cards), 30);
        assert_eq!(play("/ 1 2 3").evaluate(&cards), 2);
    }

    #[test]
    fn test_division_truncates() {
        let cards = hand(&[7, 2]);
        assert_eq!(play("/ 1 2").evaluate(&cards), 3);
        assert_eq!(play("/ 2 1").evaluate(&cards), 0);
    }

    #[test]
    fn test_divide_by_zero_is_skipped() {
        assert_eq!(Operation::Divide.apply(9, 0), 9);
        assert_eq!(Operation::Divide.apply(9, 3), 3);
    }

    #[test]
    fn test_subtraction_can_go_negative() {
        let cards = hand(&[2, 9]);
        assert_eq!(play("- 1 2").evaluate(&cards), -7);
    }
}
