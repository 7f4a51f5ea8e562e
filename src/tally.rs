use crate::evaluator::Category;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Index};

/// One occurrence counter per hand category, all starting at zero.
///
/// ```
/// use poker_sim::evaluator::Category;
/// use poker_sim::tally::HandTally;
///
/// let mut t = HandTally::default();
/// t.record(Category::Flush);
/// t.record(Category::Flush);
/// assert_eq!(t[Category::Flush], 2);
/// assert_eq!(t.total(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HandTally {
    counts: [u64; Category::COUNT],
}

/// One `(category name, count)` row of a flattened tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCount {
    pub name: String,
    pub count: u64,
}

impl HandTally {
    pub fn record(&mut self, category: Category) {
        self.counts[category.ordinal() as usize] += 1;
    }

    pub fn get(&self, category: Category) -> u64 {
        self.counts[category.ordinal() as usize]
    }

    /// Sum over every category.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Add another tally into this one, category by category.
    pub fn merge(&mut self, other: &HandTally) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            *mine += theirs;
        }
    }

    /// All categories, weakest first, including zero counts.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Flat rows in category order, for persistence or display.
    pub fn rows(&self) -> Vec<HandCount> {
        self.iter().map(|(c, count)| HandCount { name: c.name().to_string(), count }).collect()
    }
}

impl Index<Category> for HandTally {
    type Output = u64;

    fn index(&self, category: Category) -> &u64 {
        &self.counts[category.ordinal() as usize]
    }
}

impl AddAssign<&HandTally> for HandTally {
    fn add_assign(&mut self, rhs: &HandTally) {
        self.merge(rhs);
    }
}

impl Add for HandTally {
    type Output = HandTally;

    fn add(mut self, rhs: HandTally) -> HandTally {
        self.merge(&rhs);
        self
    }
}
