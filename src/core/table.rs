// Chained hash table with power-of-two capacity, load-factor growth, and fail-fast cursors.
use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::rc::Rc;

use tracing::trace;

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_CAPACITY: usize = 16;

// Grow when len / capacity reaches 3/4.
const LOAD_NUMERATOR: usize = 3;
const LOAD_DENOMINATOR: usize = 4;

const GROWTH_FACTOR: usize = 2;

pub type DefaultState = BuildHasherDefault<DefaultHasher>;

/// Keys accepted by [`KeyedTable::put`].
///
/// `is_blank` is the precondition hook: a blank key is rejected before the
/// table is touched. Only string-like keys can be blank.
pub trait TableKey: Hash + Eq {
    fn is_blank(&self) -> bool {
        false
    }
}

impl TableKey for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl TableKey for &str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl TableKey for Box<str> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl TableKey for Rc<str> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! plain_table_keys {
    ($($ty:ty),*) => {
        $(impl TableKey for $ty {})*
    };
}

plain_table_keys!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, char, bool);

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    next: Option<usize>,
}

/// Hash table using separate chaining.
///
/// Nodes live in a dense arena; each bucket stores the arena index of its
/// chain head and each node the index of its successor. Bucket count is
/// always a power of two and doubles once `len >= 0.75 * capacity`.
/// Growth rebuilds every chain, so traversal order is bucket order and is
/// not stable across a resize.
#[derive(Clone, Debug)]
pub struct KeyedTable<K, V, S = DefaultState> {
    buckets: Vec<Option<usize>>,
    nodes: Vec<Node<K, V>>,
    generation: u64,
    hasher: S,
}

impl<K, V> KeyedTable<K, V, DefaultState> {
    pub fn new() -> Self {
        Self::empty(DEFAULT_CAPACITY, DefaultState::default())
    }

    /// Creates a table whose capacity is the least power of two `>= capacity`.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_and_hasher(capacity, DefaultState::default())
    }
}

impl<K, V> Default for KeyedTable<K, V, DefaultState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> KeyedTable<K, V, S> {
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("table capacity must be greater than zero"));
        }
        let Some(capacity) = capacity.checked_next_power_of_two() else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("table capacity {capacity} is too large")));
        };
        Ok(Self::empty(capacity, hasher))
    }

    fn empty(capacity: usize, hasher: S) -> Self {
        Self {
            buckets: vec![None; capacity],
            nodes: Vec::new(),
            generation: 0,
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Structural modification counter observed by cursors.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops every entry; capacity is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.fill(None);
        self.bump_generation();
    }

    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            table: self,
            bucket: 0,
            next: None,
            remaining: self.nodes.len(),
        }
    }

    /// Starts a fail-fast traversal that may be interleaved with mutation.
    pub fn cursor(&self) -> TableCursor {
        TableCursor {
            expected_generation: self.generation,
            bucket: 0,
            successor: None,
            last_returned: None,
            remaining: self.nodes.len(),
        }
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<K, V, S> KeyedTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts or replaces. Replacing an existing key is not a structural
    /// change: it neither grows the table nor invalidates cursors.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, Error>
    where
        K: TableKey,
    {
        if key.is_blank() {
            return Err(Error::new(ErrorKind::Usage).with_message("table key must not be empty"));
        }
        if let Some(idx) = self.find(&key) {
            let old = std::mem::replace(&mut self.nodes[idx].value, value);
            return Ok(Some(old));
        }

        self.link_tail(key, value);
        self.bump_generation();
        if self.nodes.len() * LOAD_DENOMINATOR >= self.buckets.len() * LOAD_NUMERATOR {
            self.resize();
        }
        Ok(None)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|idx| &self.nodes[idx].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, candidate)| candidate == value)
    }

    /// Removes `key` if present. Absent keys leave the table untouched.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.find(key)?;
        let (node, _) = self.unlink(idx);
        Some(node.value)
    }

    /// Puts every entry of `other`, in `other`'s traversal order.
    pub fn put_all<S2>(&mut self, other: &KeyedTable<K, V, S2>) -> Result<(), Error>
    where
        K: TableKey + Clone,
        V: Clone,
    {
        for (key, value) in other.iter() {
            self.put(key.clone(), value.clone())?;
        }
        Ok(())
    }

    fn slot_for<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut current = self.buckets[self.slot_for(key)];
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.key.borrow() == key {
                return Some(idx);
            }
            current = node.next;
        }
        None
    }

    fn link_tail(&mut self, key: K, value: V) {
        let slot = self.slot_for(&key);
        let idx = self.nodes.len();
        self.nodes.push(Node {
            key,
            value,
            next: None,
        });

        let Some(mut tail) = self.buckets[slot] else {
            self.buckets[slot] = Some(idx);
            return;
        };
        while let Some(next) = self.nodes[tail].next {
            tail = next;
        }
        self.nodes[tail].next = Some(idx);
    }

    /// Detaches node `idx` from its chain and compacts the arena.
    ///
    /// Returns the removed node and, when the arena's last node was moved
    /// into `idx` to fill the hole, that node's previous index.
    fn unlink(&mut self, idx: usize) -> (Node<K, V>, Option<usize>) {
        let slot = self.slot_for(&self.nodes[idx].key);
        let next = self.nodes[idx].next;
        self.replace_link(slot, idx, next);

        let last = self.nodes.len() - 1;
        let moved_from = if idx != last {
            let last_slot = self.slot_for(&self.nodes[last].key);
            self.replace_link(last_slot, last, Some(idx));
            Some(last)
        } else {
            None
        };

        let node = self.nodes.swap_remove(idx);
        self.bump_generation();
        (node, moved_from)
    }

    // Rewrites whichever link in `slot`'s chain points at `from`.
    fn replace_link(&mut self, slot: usize, from: usize, to: Option<usize>) {
        if self.buckets[slot] == Some(from) {
            self.buckets[slot] = to;
            return;
        }
        let mut current = self.buckets[slot];
        while let Some(idx) = current {
            if self.nodes[idx].next == Some(from) {
                self.nodes[idx].next = to;
                return;
            }
            current = self.nodes[idx].next;
        }
    }

    fn resize(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity * GROWTH_FACTOR;
        let old_buckets = std::mem::replace(&mut self.buckets, vec![None; new_capacity]);
        let mut old_nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        self.nodes.reserve(old_nodes.len());

        for head in old_buckets {
            let mut current = head;
            while let Some(idx) = current {
                let Some(node) = old_nodes[idx].take() else {
                    break;
                };
                current = node.next;
                self.link_tail(node.key, node.value);
            }
        }
        trace!(old_capacity, new_capacity, len = self.nodes.len(), "keyed table resized");
    }
}

impl<K, V, S> fmt::Display for KeyedTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "]")
    }
}

impl<'a, K, V, S> IntoIterator for &'a KeyedTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing traversal in bucket order, then chain order.
pub struct Iter<'a, K, V, S> {
    table: &'a KeyedTable<K, V, S>,
    bucket: usize,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = match self.next {
            Some(idx) => idx,
            None => loop {
                let head = *self.table.buckets.get(self.bucket)?;
                self.bucket += 1;
                if let Some(head) = head {
                    break head;
                }
            },
        };
        let node = &self.table.nodes[idx];
        self.next = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S> {}

#[derive(Debug, PartialEq, Eq)]
pub struct TableEntry<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
}

/// Fail-fast traversal that does not hold a borrow between steps.
///
/// The cursor records the table generation when created; every step
/// re-checks it and reports `ConcurrentModification` if a new key was put or
/// a key was removed through the table itself. Removal through
/// [`TableCursor::remove`] keeps the cursor valid. A cursor must only be
/// driven with the table that created it.
#[derive(Debug)]
pub struct TableCursor {
    expected_generation: u64,
    bucket: usize,
    successor: Option<usize>,
    last_returned: Option<usize>,
    remaining: usize,
}

impl TableCursor {
    pub fn has_next<K, V, S>(&self, table: &KeyedTable<K, V, S>) -> Result<bool, Error> {
        self.check_generation(table)?;
        Ok(self.remaining > 0)
    }

    pub fn next<'a, K, V, S>(
        &mut self,
        table: &'a KeyedTable<K, V, S>,
    ) -> Result<Option<TableEntry<'a, K, V>>, Error> {
        self.check_generation(table)?;
        if self.remaining == 0 {
            return Ok(None);
        }

        let idx = match self.successor {
            Some(idx) => idx,
            None => loop {
                let Some(head) = table.buckets.get(self.bucket).copied() else {
                    return Err(Error::new(ErrorKind::Internal)
                        .with_message("cursor ran past the last bucket"));
                };
                self.bucket += 1;
                if let Some(head) = head {
                    break head;
                }
            },
        };

        let Some(node) = table.nodes.get(idx) else {
            return Err(foreign_table());
        };
        self.successor = node.next;
        self.last_returned = Some(idx);
        self.remaining -= 1;
        Ok(Some(TableEntry {
            key: &node.key,
            value: &node.value,
        }))
    }

    /// Removes the entry returned by the last `next`. Allowed once per step.
    pub fn remove<K, V, S>(&mut self, table: &mut KeyedTable<K, V, S>) -> Result<(K, V), Error>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        self.check_generation(table)?;
        let Some(idx) = self.last_returned.take() else {
            return Err(Error::new(ErrorKind::IllegalState)
                .with_message("remove requires a preceding next")
                .with_hint("Each entry returned by the cursor can be removed at most once."));
        };

        if idx >= table.nodes.len() {
            return Err(foreign_table());
        }
        let (node, moved_from) = table.unlink(idx);
        if moved_from.is_some() && self.successor == moved_from {
            self.successor = Some(idx);
        }
        self.expected_generation = table.generation;
        Ok((node.key, node.value))
    }

    fn check_generation<K, V, S>(&self, table: &KeyedTable<K, V, S>) -> Result<(), Error> {
        if table.generation != self.expected_generation {
            return Err(Error::new(ErrorKind::ConcurrentModification)
                .with_message("table was structurally modified during traversal"));
        }
        Ok(())
    }
}

fn foreign_table() -> Error {
    Error::new(ErrorKind::Internal)
        .with_message("cursor position is not in this table")
        .with_hint("Drive a cursor only with the table that created it.")
}

#[cfg(test)]
mod tests {
    use super::{KeyedTable, TableKey};
    use crate::core::error::ErrorKind;
    use std::collections::BTreeSet;
    use std::hash::{BuildHasherDefault, Hasher};

    fn grades() -> KeyedTable<String, u32> {
        let mut table = KeyedTable::with_capacity(2).expect("table");
        let rows = [
            ("Novački", 4),
            ("Orešković", 5),
            ("Miniri", 2),
            ("Bobić", 2),
            ("Đurdek", 1),
            ("Benković", 1),
            ("Mamić", 5),
            ("Ćurin", 5),
            ("Jeleč", 3),
            ("Martinjak", 1),
            ("Jakovljev", 2),
            ("Cicijelj", 4),
            ("Žuljević", 3),
            ("Kratofil", 4),
            ("Žabić", 2),
            ("Bruck", 3),
            ("Mrvelj", 3),
            ("Šimunović", 1),
        ];
        for (name, grade) in rows {
            table.put(name.to_string(), grade).expect("put");
        }
        table
    }

    fn keys<V>(table: &KeyedTable<String, V>) -> Vec<String> {
        table.iter().map(|(key, _)| key.clone()).collect()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = KeyedTable::<String, u32>::with_capacity(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let cases = [
            (1, 1),
            (2, 2),
            (3, 4),
            (4, 4),
            (5, 8),
            (33, 64),
            (100, 128),
            (129, 256),
            (1024, 1024),
            (65535, 65536),
        ];
        for (requested, expected) in cases {
            let table = KeyedTable::<u32, u32>::with_capacity(requested).expect("table");
            assert_eq!(table.capacity(), expected, "requested {requested}");
        }
        assert_eq!(KeyedTable::<u32, u32>::new().capacity(), 16);
    }

    #[test]
    fn blank_key_is_rejected_without_mutation() {
        let mut table = KeyedTable::<String, u32>::new();
        let err = table.put(String::new(), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(table.is_empty());
        assert_eq!(table.generation(), 0);
        assert!("".is_blank());
        assert!(!7u32.is_blank());
    }

    #[test]
    fn put_same_key_replaces_value() {
        let mut table = KeyedTable::<String, u32>::new();
        assert_eq!(table.put("Ivana".to_string(), 2).expect("put"), None);
        let generation = table.generation();
        assert_eq!(table.put("Ivana".to_string(), 5).expect("put"), Some(2));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Ivana"), Some(&5));
        assert_eq!(table.generation(), generation);
    }

    #[test]
    fn lookups_and_size_track_live_keys() {
        let mut table = grades();
        assert_eq!(table.len(), 18);
        assert_eq!(table.get("Bruck"), Some(&3));
        assert_eq!(table.get("Nepostojeći"), None);
        assert!(table.contains_key("Žabić"));
        assert!(!table.contains_key("Žabac"));
        assert!(table.contains_value(&5));
        assert!(!table.contains_value(&6));

        assert_eq!(table.remove("Bruck"), Some(3));
        assert_eq!(table.remove("Bruck"), None);
        assert_eq!(table.len(), 17);
        assert!(!table.contains_key("Bruck"));

        for (name, _) in grades().iter() {
            table.remove(name.as_str());
        }
        assert!(table.is_empty());
    }

    #[test]
    fn removal_keeps_other_chain_members_reachable() {
        let mut table = KeyedTable::<u32, u32>::with_capacity(1).expect("table");
        table.put(1, 10).expect("put");
        assert_eq!(table.capacity(), 2);
        for key in 2..=40 {
            table.put(key, key * 10).expect("put");
        }
        for key in (1..=40).step_by(3) {
            assert_eq!(table.remove(&key), Some(key * 10));
        }
        for key in 1..=40 {
            let expected = if (key - 1) % 3 == 0 { None } else { Some(key * 10) };
            assert_eq!(table.get(&key).copied(), expected, "key {key}");
        }
        assert_eq!(table.iter().count(), table.len());
    }

    #[test]
    fn resize_happens_when_load_factor_is_reached() {
        let mut table = KeyedTable::<u32, u32>::with_capacity(4).expect("table");
        table.put(1, 1).expect("put");
        table.put(2, 2).expect("put");
        assert_eq!(table.capacity(), 4);
        table.put(3, 3).expect("put");
        assert_eq!(table.capacity(), 8);
        for key in 4..6 {
            table.put(key, key).expect("put");
        }
        assert_eq!(table.capacity(), 8);
        table.put(6, 6).expect("put");
        assert_eq!(table.capacity(), 16);
        for key in 1..=6 {
            assert_eq!(table.get(&key), Some(&key));
        }
    }

    #[test]
    fn display_lists_entries() {
        let mut table = KeyedTable::<String, u32>::new();
        assert_eq!(table.to_string(), "[]");
        table.put("Ana".to_string(), 3).expect("put");
        assert_eq!(table.to_string(), "[Ana=3]");

        let rendered = grades().to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with(']'));
        assert_eq!(rendered.matches(", ").count(), 17);
        assert!(rendered.contains("Šimunović=1"));
    }

    #[test]
    fn clear_drops_everything() {
        let mut table = grades();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.get("Benković"), None);
        assert!(!table.contains_key("Žuljević"));
        assert!(!table.contains_value(&5));
    }

    #[test]
    fn put_all_copies_entries() {
        let source = grades();
        let mut copy = KeyedTable::new();
        copy.put_all(&source).expect("put_all");
        assert_eq!(copy.len(), source.len());
        let mut expected = keys(&source);
        let mut actual = keys(&copy);
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn iteration_visits_every_entry_once() {
        let table = grades();
        let mut seen = BTreeSet::new();
        for (key, value) in &table {
            assert!(table.contains_key(key.as_str()));
            assert!(table.contains_value(value));
            assert!(seen.insert(key.clone()));
        }
        assert_eq!(seen.len(), table.len());
        assert_eq!(KeyedTable::<String, u32>::with_capacity(100).expect("t").iter().count(), 0);
    }

    #[test]
    fn cursor_matches_borrowing_iteration() {
        let table = grades();
        let mut cursor = table.cursor();
        let mut via_cursor = Vec::new();
        while let Some(entry) = cursor.next(&table).expect("next") {
            via_cursor.push(entry.key.clone());
        }
        assert_eq!(via_cursor, keys(&table));
        assert!(!cursor.has_next(&table).expect("has_next"));
    }

    #[test]
    fn cursor_remove_drops_current_entry() {
        let mut table = grades();
        let mut cursor = table.cursor();
        let mut visited = 0;
        loop {
            let remove = match cursor.next(&table).expect("next") {
                Some(entry) => *entry.value == 5,
                None => break,
            };
            visited += 1;
            if remove {
                cursor.remove(&mut table).expect("remove");
            }
        }
        assert_eq!(visited, 18);
        assert_eq!(table.len(), 15);
        assert!(!table.contains_value(&5));
    }

    #[test]
    fn cursor_remove_twice_is_illegal_state() {
        let mut table = grades();
        let mut cursor = table.cursor();
        cursor.next(&table).expect("next").expect("entry");
        cursor.remove(&mut table).expect("first remove");
        let err = cursor.remove(&mut table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);

        cursor.next(&table).expect("next").expect("entry");
        cursor.remove(&mut table).expect("remove after advance");
        assert_eq!(table.len(), 16);
    }

    #[test]
    fn cursor_remove_before_next_is_illegal_state() {
        let mut table = grades();
        let mut cursor = table.cursor();
        let err = cursor.remove(&mut table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[derive(Default)]
    struct SingleBucket;

    impl Hasher for SingleBucket {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    #[test]
    fn cursor_driven_with_another_table_is_internal() {
        let mut chained =
            KeyedTable::with_capacity_and_hasher(16, BuildHasherDefault::<SingleBucket>::default())
                .expect("table");
        for key in ["a", "b", "c", "d", "e"] {
            chained.put(key.to_string(), 1u32).expect("put");
        }
        let mut narrow: KeyedTable<String, u32> = KeyedTable::new();
        for key in ["x", "y", "z"] {
            narrow.put(key.to_string(), 1).expect("put");
        }
        narrow.remove("y");
        narrow.remove("z");
        assert_eq!(narrow.generation(), chained.generation());

        let mut cursor = chained.cursor();
        cursor.next(&chained).expect("next").expect("entry");
        assert_eq!(cursor.next(&narrow).unwrap_err().kind(), ErrorKind::Internal);

        let mut cursor = chained.cursor();
        cursor.next(&chained).expect("next").expect("entry");
        cursor.next(&chained).expect("next").expect("entry");
        assert_eq!(cursor.remove(&mut narrow).unwrap_err().kind(), ErrorKind::Internal);
        assert_eq!(narrow.len(), 1);
    }

    #[test]
    fn outside_remove_fails_next_step() {
        let mut table = grades();
        let mut cursor = table.cursor();
        let key = cursor
            .next(&table)
            .expect("next")
            .map(|entry| entry.key.clone())
            .expect("entry");
        table.remove(key.as_str());
        let err = cursor.next(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConcurrentModification);
    }

    #[test]
    fn outside_put_of_new_key_fails_next_step() {
        let mut table = grades();
        let mut cursor = table.cursor();
        cursor.next(&table).expect("next");
        table.put("Novak".to_string(), 2).expect("put");
        let err = cursor.next(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConcurrentModification);
        assert_eq!(cursor.has_next(&table).unwrap_err().kind(), ErrorKind::ConcurrentModification);
    }

    #[test]
    fn outside_update_of_existing_key_is_allowed() {
        let mut table = grades();
        let mut cursor = table.cursor();
        let mut updated = 0;
        loop {
            let key = match cursor.next(&table).expect("next") {
                Some(entry) if *entry.value == 5 => entry.key.clone(),
                Some(_) => continue,
                None => break,
            };
            table.put(key, 4).expect("put");
            updated += 1;
        }
        assert_eq!(updated, 3);
        assert!(!table.contains_value(&5));
    }

    #[test]
    fn traversal_order_changes_across_resize() {
        let mut table = KeyedTable::<u32, u32>::with_capacity(1).expect("table");
        for key in 0..64 {
            table.put(key, key).expect("put");
        }
        let before = table.iter().map(|(key, _)| *key).collect::<Vec<_>>();
        let capacity = table.capacity();
        let mut key = 64;
        while table.capacity() == capacity {
            table.put(key, key).expect("put");
            key += 1;
        }
        let after = table
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| *key < 64)
            .collect::<Vec<_>>();
        assert_eq!(after.len(), before.len());
        assert_ne!(after, before);
    }
}
