use std::fmt::{self, Debug};
use std::iter::FusedIterator;
use std::mem;

use crate::{Error, Item, Result};

/// CPU IDs must be below this value.
///
/// This mirrors the largest `CONFIG_NR_CPUS` the Linux kernel can be built with (8192, on
/// PowerPC). Any attempt to add a larger ID to a [`CpuSet`] fails with [`Error::OutOfRange`]
/// before the set is touched.
pub const CPU_ID_LIMIT: Item = 8192;

// Capacity is allocated in whole machine words, the same way `CPU_ALLOC_SIZE` does it, so the
// buffer can be handed to the operating system as-is.
const WORD_BITS: Item = u64::BITS;
const WORD_BYTES: usize = size_of::<u64>();

/// Number of bytes needed to address CPU IDs `0..cpu_count`, rounded up to whole words.
pub(crate) fn bytes_for(cpu_count: Item) -> usize {
    (cpu_count.div_ceil(WORD_BITS) as usize).saturating_mul(WORD_BYTES)
}

// Byte index and bit mask within that byte.
fn locate(cpu: Item) -> (usize, u8) {
    ((cpu >> 3) as usize, 1 << (cpu & 7))
}

/// A growable set of CPU IDs, stored as a bit mask with one bit per ID.
///
/// A new set has no capacity at all. Adding an ID grows the mask just enough to address that ID;
/// capacity never shrinks until the set is [reset][Self::reset]. Whether a set is
/// [allocated][Self::is_allocated] is significant on its own: a set that has capacity but no IDs
/// stands for "something was specified but it selected no CPUs", which is different from "nothing
/// was specified".
///
/// Every mutating operation either succeeds fully or leaves the set exactly as it was.
///
/// # Example
///
/// ```
/// use cpu_set::CpuSet;
///
/// let mut set = CpuSet::new();
/// set.add(3).unwrap();
/// set.add(1).unwrap();
///
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3]);
/// assert_eq!(set.to_string(), "1 3");
/// ```
#[derive(Clone, Default)]
pub struct CpuSet {
    bits: Vec<u8>,
}

impl CpuSet {
    /// Creates an empty set without any capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Creates a set containing the given IDs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if any ID is at or above [`CPU_ID_LIMIT`] and
    /// [`Error::AllocationFailure`] if the mask cannot be allocated.
    pub fn try_from_ids(ids: impl IntoIterator<Item = Item>) -> Result<Self> {
        let mut set = Self::new();

        for cpu in ids {
            set.add(cpu)?;
        }

        Ok(set)
    }

    /// Creates a set from a raw affinity mask, where bit `n % 8` of byte `n / 8` stands for
    /// CPU `n`. This is the layout used by `cpu_set_t` on Linux.
    ///
    /// The capacity of the new set is only as large as needed for the highest ID present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the mask has a bit set at or above [`CPU_ID_LIMIT`] and
    /// [`Error::AllocationFailure`] if the mask cannot be allocated.
    pub fn from_bytes(mask: &[u8]) -> Result<Self> {
        let mut set = Self::new();

        // Highest first, so the only growth happens on the first add.
        for cpu in CpuIds::new(mask).rev() {
            set.add(cpu)?;
        }

        Ok(set)
    }

    /// Adds a single CPU ID to the set, growing the set if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `cpu` is at or above [`CPU_ID_LIMIT`] and
    /// [`Error::AllocationFailure`] if the set needed to grow but could not. In both cases the
    /// set is left unchanged.
    pub fn add(&mut self, cpu: Item) -> Result<()> {
        if cpu >= CPU_ID_LIMIT {
            return Err(Error::OutOfRange { cpu });
        }

        self.ensure_capacity(bytes_for(cpu.saturating_add(1)))?;

        let (index, mask) = locate(cpu);
        let byte = self
            .bits
            .get_mut(index)
            .expect("capacity was just ensured to cover this CPU");
        *byte |= mask;

        Ok(())
    }

    /// Adds every CPU ID in `other` to this set.
    ///
    /// IDs are added from the highest to the lowest. The first add therefore performs the only
    /// growth this merge can need, so an allocation failure happens before anything is changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the set could not grow to cover the highest ID in
    /// `other`. The set is left unchanged in that case.
    pub fn add_all(&mut self, other: &Self) -> Result<()> {
        for cpu in other.iter().rev() {
            self.add(cpu)?;
        }

        Ok(())
    }

    /// Grows the set so it can address CPU IDs `0..cpu_count` without adding any of them.
    ///
    /// Existing IDs are kept. Newly added capacity is zeroed. Does nothing if the set is already
    /// large enough or `cpu_count` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `cpu_count` exceeds [`CPU_ID_LIMIT`] and
    /// [`Error::AllocationFailure`] if the set could not grow.
    pub fn grow_to(&mut self, cpu_count: Item) -> Result<()> {
        if cpu_count > CPU_ID_LIMIT {
            return Err(Error::OutOfRange {
                cpu: cpu_count.saturating_sub(1),
            });
        }

        self.ensure_capacity(bytes_for(cpu_count))
    }

    /// Releases the storage of the set, returning it to the unallocated state.
    ///
    /// Calling this on a set that is already unallocated does nothing.
    pub fn reset(&mut self) {
        self.bits = Vec::new();
    }

    /// Moves the contents out of this set, leaving it unallocated.
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Whether the set contains the given CPU ID.
    #[must_use]
    pub fn contains(&self, cpu: Item) -> bool {
        let (index, mask) = locate(cpu);

        self.bits.get(index).is_some_and(|byte| byte & mask != 0)
    }

    /// Number of CPU IDs in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Whether the set contains no CPU IDs. An empty set may still be
    /// [allocated][Self::is_allocated].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|byte| *byte == 0)
    }

    /// Whether the set has any capacity, i.e. whether anything was ever specified for it since
    /// it was created or last reset.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        !self.bits.is_empty()
    }

    /// Capacity of the set in bytes. Always a whole number of machine words.
    #[must_use]
    pub fn capacity_bytes(&self) -> usize {
        self.bits.len()
    }

    /// The raw mask, in the layout described at [`from_bytes()`][Self::from_bytes].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Iterates over the CPU IDs in the set in ascending order.
    #[must_use]
    pub fn iter(&self) -> CpuIds<'_> {
        CpuIds::new(&self.bits)
    }

    fn ensure_capacity(&mut self, required_bytes: usize) -> Result<()> {
        let Some(additional) = required_bytes
            .checked_sub(self.bits.len())
            .filter(|additional| *additional > 0)
        else {
            return Ok(());
        };

        #[cfg(test)]
        {
            if allocation_limit::exceeded(required_bytes) {
                return Err(Error::AllocationFailure {
                    requested_bytes: required_bytes,
                });
            }
        }

        if self.bits.try_reserve_exact(additional).is_err() {
            return Err(Error::AllocationFailure {
                requested_bytes: required_bytes,
            });
        }

        // Cannot reallocate, the space was reserved above.
        self.bits.resize(required_bytes, 0);

        Ok(())
    }
}

impl PartialEq for CpuSet {
    /// Sets are equal when they contain the same IDs, regardless of capacity.
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for CpuSet {}

impl Debug for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuSet")
            .field("cpus", &self.iter().collect::<Vec<_>>())
            .field("capacity_bytes", &self.bits.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a CpuSet {
    type Item = Item;
    type IntoIter = CpuIds<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the CPU IDs in a [`CpuSet`], in ascending order.
///
/// Obtained from [`CpuSet::iter()`]. Can also be walked from the back to visit IDs in
/// descending order.
#[derive(Clone, Debug)]
pub struct CpuIds<'a> {
    bits: &'a [u8],

    // Bit indexes, `front..back` is still to be visited.
    front: usize,
    back: usize,
}

impl<'a> CpuIds<'a> {
    fn new(bits: &'a [u8]) -> Self {
        Self {
            bits,
            front: 0,
            back: bits.len().saturating_mul(8),
        }
    }

    fn byte_at(&self, bit: usize) -> u8 {
        self.bits.get(bit >> 3).copied().unwrap_or_default()
    }

    fn is_set(&self, bit: usize) -> bool {
        self.byte_at(bit) & (1 << (bit & 7)) != 0
    }
}

// Bit indexes beyond the `Item` range cannot be expressed as IDs. Saturating them yields an ID
// that `CpuSet::add()` rejects as out of range.
fn to_item(bit: usize) -> Item {
    Item::try_from(bit).unwrap_or(Item::MAX)
}

impl Iterator for CpuIds<'_> {
    type Item = Item;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let bit = self.front;

            // Skip whole empty bytes instead of testing each of their bits.
            if bit & 7 == 0 && self.byte_at(bit) == 0 {
                self.front = bit.saturating_add(8).min(self.back);
                continue;
            }

            self.front = bit.saturating_add(1);

            if self.is_set(bit) {
                return Some(to_item(bit));
            }
        }

        None
    }
}

impl DoubleEndedIterator for CpuIds<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back = self.back.saturating_sub(1);
            let bit = self.back;

            if self.is_set(bit) {
                return Some(to_item(bit));
            }
        }

        None
    }
}

impl FusedIterator for CpuIds<'_> {}


#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(CpuSet: Send, Sync, Clone, Debug, Default);

    fn ids(set: &CpuSet) -> Vec<Item> {
        set.iter().collect()
    }

    #[test]
    fn new_set_is_unallocated() {
        let set = CpuSet::new();

        assert!(!set.is_allocated());
        assert!(set.is_empty());
        assert_eq!(set.capacity_bytes(), 0);
        assert_eq!(set.len(), 0);
        assert_eq!(ids(&set), Vec::<Item>::new());
    }

    #[test]
    fn added_ids_come_back_sorted_and_deduplicated() {
        let mut set = CpuSet::new();

        for cpu in [70, 3, 8191, 3, 0, 64, 70, 9] {
            set.add(cpu).unwrap();
        }

        assert_eq!(ids(&set), vec![0, 3, 9, 64, 70, 8191]);
        assert_eq!(set.len(), 6);
        assert!(set.contains(64));
        assert!(!set.contains(65));
        assert!(!set.contains(100_000));
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let orderings: [&[Item]; 5] = [
            &[0, 1, 63, 64, 500, 8191],
            &[8191, 500, 64, 63, 1, 0],
            &[64, 0, 8191, 1, 500, 63],
            &[1, 1, 8191, 0, 64, 8191, 63, 500, 0],
            &[500, 63, 64, 64, 64, 0, 1, 8191],
        ];

        let expected = CpuSet::try_from_ids(orderings[0].iter().copied()).unwrap();

        for ordering in orderings {
            let set = CpuSet::try_from_ids(ordering.iter().copied()).unwrap();

            assert_eq!(ids(&set), vec![0, 1, 63, 64, 500, 8191], "order {ordering:?}");
            assert_eq!(set.as_bytes(), expected.as_bytes(), "order {ordering:?}");
        }
    }

    #[test]
    fn capacity_is_whole_words() {
        let mut set = CpuSet::new();

        set.add(0).unwrap();
        assert_eq!(set.capacity_bytes(), 8);

        set.add(63).unwrap();
        assert_eq!(set.capacity_bytes(), 8);

        set.add(64).unwrap();
        assert_eq!(set.capacity_bytes(), 16);

        // Never shrinks.
        set.add(1).unwrap();
        assert_eq!(set.capacity_bytes(), 16);
    }

    #[test]
    fn highest_id_is_accepted() {
        let mut set = CpuSet::new();

        set.add(CPU_ID_LIMIT - 1).unwrap();

        assert_eq!(ids(&set), vec![8191]);
        assert_eq!(set.capacity_bytes(), 1024);
    }

    #[test]
    fn out_of_range_leaves_set_untouched() {
        let mut set = CpuSet::try_from_ids([1, 5]).unwrap();
        let before = set.as_bytes().to_vec();

        for cpu in [CPU_ID_LIMIT, CPU_ID_LIMIT + 1, Item::MAX] {
            let error = set.add(cpu).unwrap_err();
            assert!(matches!(error, Error::OutOfRange { cpu: rejected } if rejected == cpu));
        }

        assert_eq!(set.as_bytes(), before.as_slice());
    }

    #[test]
    fn grown_capacity_is_zeroed_and_keeps_existing_bits() {
        let mut set = CpuSet::try_from_ids([2, 7]).unwrap();

        set.grow_to(200).unwrap();

        assert_eq!(set.capacity_bytes(), 32);
        assert_eq!(ids(&set), vec![2, 7]);
        assert!(set.as_bytes().iter().skip(1).all(|byte| *byte == 0));
    }

    #[test]
    fn grow_to_never_shrinks() {
        let mut set = CpuSet::try_from_ids([500]).unwrap();
        let capacity = set.capacity_bytes();

        set.grow_to(1).unwrap();
        set.grow_to(0).unwrap();

        assert_eq!(set.capacity_bytes(), capacity);
    }

    #[test]
    fn grow_to_respects_limit() {
        let mut set = CpuSet::new();

        set.grow_to(CPU_ID_LIMIT).unwrap();
        assert_eq!(set.capacity_bytes(), 1024);

        set.grow_to(CPU_ID_LIMIT + 1).unwrap_err();
        assert_eq!(set.capacity_bytes(), 1024);
    }

    #[test]
    fn grow_to_one_allocates_without_adding() {
        let mut set = CpuSet::new();

        set.grow_to(1).unwrap();

        assert!(set.is_allocated());
        assert!(set.is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut set = CpuSet::try_from_ids([1, 2, 3]).unwrap();

        set.reset();
        assert!(!set.is_allocated());

        set.reset();
        assert!(!set.is_allocated());
        assert_eq!(set, CpuSet::new());
    }

    #[test]
    fn take_leaves_source_unallocated() {
        let mut source = CpuSet::try_from_ids([4, 9]).unwrap();

        let taken = source.take();

        assert_eq!(ids(&taken), vec![4, 9]);
        assert!(!source.is_allocated());
    }

    #[test]
    fn add_all_merges() {
        let mut set = CpuSet::try_from_ids([1, 100]).unwrap();
        let other = CpuSet::try_from_ids([0, 100, 700]).unwrap();

        set.add_all(&other).unwrap();

        assert_eq!(ids(&set), vec![0, 1, 100, 700]);
        assert_eq!(ids(&other), vec![0, 100, 700]);
    }

    #[test]
    fn add_all_from_empty_changes_nothing() {
        let mut set = CpuSet::try_from_ids([5]).unwrap();
        let before = set.as_bytes().to_vec();

        set.add_all(&CpuSet::new()).unwrap();

        assert_eq!(set.as_bytes(), before.as_slice());
    }

    #[test]
    fn add_all_allocation_failure_leaves_set_untouched() {
        let mut set = CpuSet::try_from_ids([1, 3]).unwrap();
        let other = CpuSet::try_from_ids([2, 64, 1000]).unwrap();
        let before = set.as_bytes().to_vec();

        let _limit = allocation_limit::set(set.capacity_bytes());

        let error = set.add_all(&other).unwrap_err();

        assert!(matches!(
            error,
            Error::AllocationFailure {
                requested_bytes: 128
            }
        ));
        assert_eq!(set.as_bytes(), before.as_slice());
    }

    #[test]
    fn add_all_within_capacity_succeeds_under_limit() {
        let mut set = CpuSet::new();
        set.grow_to(128).unwrap();
        let other = CpuSet::try_from_ids([0, 127]).unwrap();

        let _limit = allocation_limit::set(set.capacity_bytes());

        set.add_all(&other).unwrap();
        assert_eq!(ids(&set), vec![0, 127]);
    }

    #[test]
    fn single_add_allocation_failure_leaves_set_untouched() {
        let mut set = CpuSet::try_from_ids([1]).unwrap();

        let _limit = allocation_limit::set(8);

        set.add(64).unwrap_err();
        assert_eq!(ids(&set), vec![1]);
        assert_eq!(set.capacity_bytes(), 8);
    }

    #[test]
    fn iterates_from_both_ends() {
        let set = CpuSet::try_from_ids([0, 8, 9, 63, 64, 200]).unwrap();

        assert_eq!(
            set.iter().rev().collect::<Vec<_>>(),
            vec![200, 64, 63, 9, 8, 0]
        );

        let mut iter = set.iter();
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(200));
        assert_eq!(iter.next(), Some(8));
        assert_eq!(iter.next_back(), Some(64));
        assert_eq!(iter.next(), Some(9));
        assert_eq!(iter.next(), Some(63));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iteration_is_restartable() {
        let set = CpuSet::try_from_ids([3, 4]).unwrap();

        assert_eq!(ids(&set), ids(&set));
        assert_eq!((&set).into_iter().count(), 2);
    }

    #[test]
    fn from_bytes_uses_cpu_set_t_layout() {
        let set = CpuSet::from_bytes(&[0b0000_0101, 0, 0b1000_0000]).unwrap();

        assert_eq!(ids(&set), vec![0, 2, 23]);
        assert_eq!(set.capacity_bytes(), 8);
    }

    #[test]
    fn from_bytes_rejects_bits_beyond_limit() {
        let mut mask = vec![0_u8; 2048];
        mask[1024] = 1;

        let error = CpuSet::from_bytes(&mask).unwrap_err();
        assert!(matches!(error, Error::OutOfRange { cpu: 8192 }));
    }

    #[test]
    fn from_bytes_of_zeroes_is_unallocated() {
        let set = CpuSet::from_bytes(&[0; 16]).unwrap();

        assert!(!set.is_allocated());
    }

    #[test]
    fn equality_ignores_capacity() {
        let small = CpuSet::try_from_ids([1]).unwrap();
        let mut large = CpuSet::try_from_ids([1]).unwrap();
        large.grow_to(4096).unwrap();

        assert_eq!(small, large);
        assert_ne!(small.capacity_bytes(), large.capacity_bytes());
        assert_ne!(small, CpuSet::try_from_ids([2]).unwrap());
    }

    #[test]
    fn clone_is_independent() {
        let original = CpuSet::try_from_ids([1]).unwrap();
        let mut copy = original.clone();

        copy.add(2).unwrap();

        assert_eq!(ids(&original), vec![1]);
        assert_eq!(ids(&copy), vec![1, 2]);
    }

    #[test]
    fn debug_lists_ids() {
        let set = CpuSet::try_from_ids([1, 2]).unwrap();

        assert_eq!(
            format!("{set:?}"),
            "CpuSet { cpus: [1, 2], capacity_bytes: 8 }"
        );
    }
}
