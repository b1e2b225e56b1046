//! Physical tables: configuration and the free/busy pool the schedulers allocate from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number painted on a physical table (1–9).
pub type TableNumber = u8;

pub const MIN_TABLES: usize = 3;
pub const MAX_TABLES: usize = 5;
pub const LOWEST_TABLE_NUMBER: TableNumber = 1;
pub const HIGHEST_TABLE_NUMBER: TableNumber = 9;

/// Which tables are in use, in the order they are handed out.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    count: usize,
    numbers: Vec<TableNumber>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(MIN_TABLES, &[1, 2, 3])
    }
}

impl TableConfig {
    /// Build a valid configuration from arbitrary input.
    ///
    /// The count is clamped to 3–5. Numbers outside 1–9 and repeats are dropped,
    /// then the list is padded with the lowest unused numbers and cut to `count`.
    pub fn new(count: usize, numbers: &[TableNumber]) -> Self {
        let count = count.clamp(MIN_TABLES, MAX_TABLES);
        let mut unique: Vec<TableNumber> = Vec::with_capacity(count);
        for &n in numbers {
            if (LOWEST_TABLE_NUMBER..=HIGHEST_TABLE_NUMBER).contains(&n) && !unique.contains(&n) {
                unique.push(n);
            }
        }
        for n in LOWEST_TABLE_NUMBER..=HIGHEST_TABLE_NUMBER {
            if unique.len() >= count {
                break;
            }
            if !unique.contains(&n) {
                unique.push(n);
            }
        }
        unique.truncate(count);
        Self { count, numbers: unique }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn numbers(&self) -> &[TableNumber] {
        &self.numbers
    }

    /// Change the pool size, keeping the numbers already chosen where possible.
    pub fn with_count(&self, count: usize) -> Self {
        Self::new(count, &self.numbers)
    }

    /// Put `number` at `position`. If another position already uses it, the two swap.
    pub fn with_number_at(&self, position: usize, number: TableNumber) -> Option<Self> {
        if position >= self.numbers.len() || !(LOWEST_TABLE_NUMBER..=HIGHEST_TABLE_NUMBER).contains(&number) {
            return None;
        }
        let mut numbers = self.numbers.clone();
        if let Some(other) = numbers.iter().position(|&n| n == number) {
            numbers.swap(position, other);
        } else {
            numbers[position] = number;
        }
        Some(Self { count: self.count, numbers })
    }
}

/// Allocation state of a table pool: free tables in hand-out order, busy tables by holder.
///
/// `K` identifies whatever holds a table (a league match or a bracket slot).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>"))]
pub struct TablePool<K> {
    pub free: Vec<TableNumber>,
    pub busy: BTreeMap<TableNumber, K>,
}

impl<K> Default for TablePool<K> {
    fn default() -> Self {
        Self {
            free: Vec::new(),
            busy: BTreeMap::new(),
        }
    }
}

impl<K: Clone + PartialEq> TablePool<K> {
    /// All configured tables free.
    pub fn new(config: &TableConfig) -> Self {
        Self {
            free: config.numbers().to_vec(),
            busy: BTreeMap::new(),
        }
    }

    /// Hand out free tables, front first, while `claim_next` finds a waiting holder.
    ///
    /// `claim_next` receives the table about to be handed out, seats the next
    /// eligible holder at it and returns that holder, or returns `None` when
    /// nobody is waiting. Returns the assignments made.
    pub fn fill<F>(&mut self, mut claim_next: F) -> Vec<(TableNumber, K)>
    where
        F: FnMut(TableNumber) -> Option<K>,
    {
        let mut assigned = Vec::new();
        while let Some(&table) = self.free.first() {
            let Some(holder) = claim_next(table) else {
                break;
            };
            self.free.remove(0);
            self.busy.insert(table, holder.clone());
            log::debug!("Table {} assigned", table);
            assigned.push((table, holder));
        }
        assigned
    }

    /// Return `table` to the back of the free list if `holder` is the one holding it.
    pub fn release(&mut self, table: TableNumber, holder: &K) -> bool {
        if self.busy.get(&table) != Some(holder) {
            return false;
        }
        self.busy.remove(&table);
        if !self.free.contains(&table) {
            self.free.push(table);
        }
        log::debug!("Table {} released", table);
        true
    }

    pub fn in_use(&self) -> usize {
        self.busy.len()
    }

    /// Make the pool consistent with the configured tables and the actual seatings.
    ///
    /// Busy entries come from `seated` (tables outside the configuration are
    /// dropped). Free tables keep their current order; configured tables found in
    /// neither list are appended in configuration order.
    pub fn reconcile<I>(&self, config: &TableConfig, seated: I) -> Self
    where
        I: IntoIterator<Item = (TableNumber, K)>,
    {
        let mut busy = BTreeMap::new();
        for (table, holder) in seated {
            if config.numbers().contains(&table) {
                busy.entry(table).or_insert(holder);
            }
        }
        let mut free: Vec<TableNumber> = Vec::new();
        let known = self.free.iter().chain(config.numbers());
        for &n in known {
            if config.numbers().contains(&n) && !busy.contains_key(&n) && !free.contains(&n) {
                free.push(n);
            }
        }
        Self { free, busy }
    }
}
