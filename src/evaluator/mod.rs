pub(crate) mod combinations;
pub(crate) mod detector;
pub(crate) mod hand_analysis;
pub(crate) mod rank_groups;
pub(crate) mod straight_info;
pub(crate) mod suit_info;

use crate::cards::{Card, Rank};
use core::cmp::Ordering;
use std::fmt;

/// Smallest card pool that can be evaluated.
pub const HAND_SIZE: usize = 5;

/// Compact, comparable hand strength. Higher is better.
/// Encodes category and the five tie-break ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue(u64);

/// Poker hand category from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl Category {
    pub const COUNT: usize = 10;

    /// Every category, weakest first.
    pub const ALL: [Category; Category::COUNT] = [
        Category::HighCard,
        Category::OnePair,
        Category::TwoPair,
        Category::ThreeOfAKind,
        Category::Straight,
        Category::Flush,
        Category::FullHouse,
        Category::FourOfAKind,
        Category::StraightFlush,
        Category::RoyalFlush,
    ];

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Stable name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Category::HighCard => "HighCard",
            Category::OnePair => "OnePair",
            Category::TwoPair => "TwoPair",
            Category::ThreeOfAKind => "ThreeOfAKind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "FullHouse",
            Category::FourOfAKind => "FourOfAKind",
            Category::StraightFlush => "StraightFlush",
            Category::RoyalFlush => "RoyalFlush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl HandValue {
    /// Return the packed comparable value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Pack a category and five tie-break ranks into a comparable value.
    pub fn from_parts(category: Category, ranks: &[Rank; 5]) -> Self {
        // [ category (8 bits) | r0 (6) | r1 (6) | r2 (6) | r3 (6) | r4 (6) | 10 zero bits ]
        const CAT_SHIFT: u32 = 48;
        const RANK_STRIDE: u32 = 6;
        let mut v: u64 = (category as u64) << CAT_SHIFT;
        for (i, r) in ranks.iter().enumerate() {
            let offset = CAT_SHIFT - RANK_STRIDE * (i as u32 + 1);
            v |= (*r as u64) << offset;
        }
        HandValue(v)
    }

    pub fn category(self) -> Category {
        Category::ALL[(self.0 >> 48) as usize]
    }
}

/// Best five-card hand found in a card pool.
///
/// Ordered by category, then by the ranks of `best_five` in order, then by
/// the ranks of `kickers` lexicographically, where a kicker list that is a
/// prefix of another is the smaller. Within one pool size that means
/// kickers over their common length; across sizes the larger pool wins an
/// otherwise equal hand, which keeps the order transitive. Suits never
/// matter. Showdowns use [`EvaluatedHand::cmp_best_five`] and ignore kickers.
#[derive(Debug, Clone)]
pub struct EvaluatedHand {
    pub category: Category,
    /// Cards in significance order: rank groups by (count desc, rank desc),
    /// straights from their top card (the wheel ends with its Ace).
    pub best_five: [Card; 5],
    /// Cards of the pool left out of `best_five`, highest first.
    pub kickers: Vec<Card>,
    value: HandValue,
}

impl EvaluatedHand {
    /// Packed category and best-five key, ignoring kickers.
    pub const fn value(&self) -> HandValue {
        self.value
    }

    /// Tie-break ranks within the category.
    pub fn tiebreak(&self) -> [Rank; 5] {
        self.best_five.map(Card::rank)
    }

    /// Compare category and best five only, the way a showdown does.
    pub fn cmp_best_five(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }

    fn cmp_kickers(&self, other: &Self) -> Ordering {
        self.kickers.iter().map(|c| c.rank()).cmp(other.kickers.iter().map(|c| c.rank()))
    }
}

impl Ord for EvaluatedHand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_best_five(other).then_with(|| self.cmp_kickers(other))
    }
}

impl PartialOrd for EvaluatedHand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EvaluatedHand {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EvaluatedHand {}

impl fmt::Display for EvaluatedHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.category)?;
        for (i, card) in self.best_five.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{card}")?;
        }
        f.write_str("]")
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("need at least 5 cards to evaluate, got {0}")]
    NotEnoughCards(usize),
}

/// Evaluate exactly five cards. `kickers` is empty.
pub fn evaluate_five(cards: &[Card; 5]) -> EvaluatedHand {
    let analysis = hand_analysis::HandAnalysis::new(cards);
    analysis.build_evaluation(detector::classify(&analysis))
}

/// Best five-card hand from a pool of five or more cards.
///
/// Every 5-card subset is scored and the greatest kept; among subsets that
/// compare equal the first one enumerated wins.
///
/// ```
/// use poker_sim::cards::parse_cards;
/// use poker_sim::evaluator::{evaluate, Category};
///
/// let cards = parse_cards("Ts Js Qs Ks As 4h 2c").unwrap();
/// let hand = evaluate(&cards).unwrap();
/// assert_eq!(hand.category, Category::RoyalFlush);
/// assert_eq!(hand.kickers.len(), 2);
/// ```
pub fn evaluate(cards: &[Card]) -> Result<EvaluatedHand, EvalError> {
    if cards.len() < HAND_SIZE {
        return Err(EvalError::NotEnoughCards(cards.len()));
    }

    let mut best: Option<EvaluatedHand> = None;
    for indices in combinations::Combinations::<HAND_SIZE>::new(cards.len()) {
        let mut candidate = evaluate_five(&indices.map(|i| cards[i]));

        let order = best.as_ref().map_or(Ordering::Greater, |b| candidate.cmp_best_five(b));
        if order.is_lt() {
            continue;
        }
        candidate.kickers = kickers(cards, &indices);
        if best.as_ref().map_or(true, |b| candidate > *b) {
            best = Some(candidate);
        }
    }

    // n >= 5 always yields at least one subset
    best.ok_or(EvalError::NotEnoughCards(cards.len()))
}

/// Cards outside the chosen subset, highest rank first.
fn kickers(cards: &[Card], chosen: &[usize; HAND_SIZE]) -> Vec<Card> {
    let mut rest: Vec<Card> = cards
        .iter()
        .enumerate()
        .filter(|(i, _)| !chosen.contains(i))
        .map(|(_, &c)| c)
        .collect();
    rest.sort_by(|a, b| b.cmp(a));
    rest
}

/// Compare the best hands of two card pools.
///
/// ```
/// use poker_sim::cards::parse_cards;
/// use poker_sim::evaluator::compare;
/// use std::cmp::Ordering;
///
/// let kings = parse_cards("Kc Kd Kh Ks 2c").unwrap();
/// let queens = parse_cards("Qc Qd Qh Qs Ac").unwrap();
/// assert_eq!(compare(&kings, &queens).unwrap(), Ordering::Greater);
/// ```
pub fn compare(a: &[Card], b: &[Card]) -> Result<Ordering, EvalError> {
    let ea = evaluate(a)?;
    let eb = evaluate(b)?;
    Ok(ea.cmp(&eb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{parse_cards, Suit};

    fn eval(s: &str) -> EvaluatedHand {
        evaluate(&parse_cards(s).unwrap()).unwrap()
    }

    #[test]
    fn not_enough_cards_errors() {
        let cards = parse_cards("As Ks Qs Js").unwrap();
        assert_eq!(evaluate(&cards).unwrap_err(), EvalError::NotEnoughCards(4));
        assert_eq!(evaluate(&[]).unwrap_err(), EvalError::NotEnoughCards(0));
    }

    #[test]
    fn compare_propagates_errors() {
        let a = parse_cards("As Ks Qs Js Ts").unwrap();
        let b = parse_cards("2c").unwrap();
        assert!(matches!(compare(&a, &b), Err(EvalError::NotEnoughCards(1))));
    }

    #[test]
    fn value_round_trips_category() {
        for cat in Category::ALL {
            let v = HandValue::from_parts(cat, &[Rank::Ace; 5]);
            assert_eq!(v.category(), cat);
        }
    }

    #[test]
    fn category_names_and_order() {
        assert_eq!(Category::ALL.len(), Category::COUNT);
        assert!(Category::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Category::RoyalFlush.to_string(), "RoyalFlush");
        assert_eq!(Category::OnePair.ordinal(), 1);
    }

    #[test]
    fn five_cards_have_no_kickers() {
        let e = eval("Ah Kd 7s 5c 2d");
        assert_eq!(e.category, Category::HighCard);
        assert!(e.kickers.is_empty());
    }

    #[test]
    fn seven_cards_keep_two_kickers_sorted() {
        let e = eval("2c 4h Ts Js Qs Ks As");
        assert_eq!(e.category, Category::RoyalFlush);
        assert_eq!(e.kickers, vec![Card::new(Rank::Four, Suit::Hearts), Card::new(Rank::Two, Suit::Clubs)]);
    }

    #[test]
    fn full_house_picks_best_trips_and_pair() {
        // two sets of trips: the higher plays as trips, the lower as the pair
        let e = eval("9c 9d 9h 4s 4c 4d 2h");
        assert_eq!(e.category, Category::FullHouse);
        assert_eq!(e.tiebreak(), [Rank::Nine, Rank::Nine, Rank::Nine, Rank::Four, Rank::Four]);
    }

    #[test]
    fn straight_prefers_highest_run() {
        let e = eval("Ac 2d 3h 4s 5c 6d 9h");
        assert_eq!(e.category, Category::Straight);
        assert_eq!(e.tiebreak()[0], Rank::Six);
    }

    #[test]
    fn kicker_order_stays_transitive_across_pool_sizes() {
        let with_king = eval("As Ks Qs Js Ts Kh");
        let bare = eval("As Ks Qs Js Ts");
        let with_two = eval("As Ks Qs Js Ts 2h");
        assert_eq!(with_king.cmp_best_five(&bare), Ordering::Equal);
        assert_eq!(with_two.cmp_best_five(&bare), Ordering::Equal);
        assert!(with_king > with_two);
        assert!(with_two > bare);
        assert!(with_king > bare);

        let mut hands = vec![with_two.clone(), bare.clone(), with_king.clone()];
        hands.sort();
        assert_eq!(hands.iter().map(|h| h.kickers.len()).collect::<Vec<_>>(), vec![0, 1, 1]);
        assert_eq!(hands[2].kickers, with_king.kickers);
    }

    #[test]
    fn trips_beat_two_pair_across_different_pools() {
        assert_eq!(eval("7c 7d 7h Ks 2c").cmp(&eval("Ac Ad Kh Ks Qc")), Ordering::Greater);
    }

    #[test]
    fn full_house_trips_rank_outweighs_pair_rank() {
        let kings_full = eval("Kc Kd Kh 2s 2c");
        let queens_full = eval("Qc Qd Qh As Ac");
        assert!(kings_full > queens_full);
    }

    #[test]
    fn suits_do_not_break_ties() {
        let a = eval("Ac Kd 9h 7s 4c");
        let b = eval("Ad Kh 9s 7c 4d");
        assert_eq!(a, b);
    }

    #[test]
    fn kickers_break_ties_after_best_five() {
        // same board plays for both, the leftover cards differ
        let a = eval("As Ks Qs Js Ts 9h 8d");
        let b = eval("Ah Kh Qh Jh Th 3c 2d");
        assert_eq!(a.cmp_best_five(&b), Ordering::Equal);
        assert!(a > b);
    }

    #[test]
    fn display_lists_best_five() {
        assert_eq!(eval("Ac 2d 3h 4s 5c").to_string(), "Straight [5c 4s 3h 2d Ac]");
    }
}
