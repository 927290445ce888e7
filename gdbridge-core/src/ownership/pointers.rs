/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Process-wide registry of engine handles held by Rust values.
//!
//! Every string, variant and object handle that crosses into Rust memory is stored here, and Rust values only keep a
//! [`Pointer`] to their slot. A slot carries the raw engine value and whether Rust owns it. Slots are reused, so each
//! carries a generation that is bumped on removal; a `Pointer` from an earlier generation is stale and can no longer
//! reach the engine. This makes releasing idempotent and lets [`sweep()`] release everything at shutdown without
//! invalidating the memory of Rust values that still hold pointers.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use crate::sys;
use sys::Global;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Handle kinds

/// A kind of engine resource that Rust code can hold.
///
/// # Safety
/// `release` must be safe to call exactly once for every raw value registered as owned.
pub unsafe trait Handle: 'static {
    /// Raw value stored in the registry. At most 24 bytes, alignment at most 8.
    type Raw: Copy + 'static;

    /// Name used in diagnostics and sweep reports.
    const KIND: &'static str;

    /// Gives up the reference that Rust holds.
    ///
    /// # Safety
    /// `raw` must be a value previously registered as owned, and must not be released twice.
    unsafe fn release(raw: Self::Raw);
}

/// Whether Rust is responsible for releasing a handle.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Ownership {
    /// Rust holds a reference and releases it.
    Owned,

    /// The engine keeps the value alive; Rust only observes it.
    Borrowed,
}

type Words = [u64; 3];

fn encode<R: Copy>(raw: R) -> Words {
    const {
        assert!(size_of::<R>() <= size_of::<Words>(), "handle raw value exceeds 24 bytes");
        assert!(align_of::<R>() <= align_of::<Words>(), "handle raw value alignment exceeds 8");
    };

    let mut words = [0u64; 3];
    // SAFETY: size checked above; unaligned write for generality.
    unsafe { std::ptr::write_unaligned(words.as_mut_ptr() as *mut R, raw) };
    words
}

/// # Safety
/// `words` must have been produced by `encode::<R>()`.
unsafe fn decode<R: Copy>(words: Words) -> R {
    std::ptr::read_unaligned(words.as_ptr() as *const R)
}

unsafe fn release_words<H: Handle>(words: Words) {
    H::release(decode::<H::Raw>(words));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Registry

pub(crate) struct Entry {
    words: Words,
    release: unsafe fn(Words),
    kind: &'static str,
    ownership: Ownership,
    pinned: bool,
}

impl Entry {
    fn new<H: Handle>(raw: H::Raw, ownership: Ownership) -> Self {
        Self {
            words: encode(raw),
            release: release_words::<H>,
            kind: H::KIND,
            ownership,
            pinned: false,
        }
    }

    /// Releases the engine value if Rust owns it. Returns whether a release happened.
    ///
    /// # Safety
    /// Must be called at most once per registered value, and never while the registry is locked.
    unsafe fn finish(self) -> bool {
        match self.ownership {
            Ownership::Owned => {
                (self.release)(self.words);
                true
            }
            Ownership::Borrowed => false,
        }
    }
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Slot storage. Does not call into the engine; callers release removed entries after unlocking.
#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Registry {
    fn insert(&mut self, entry: Entry) -> (u32, u32) {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.entry.is_none());

            slot.entry = Some(entry);
            return (index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).expect("handle registry exhausted");
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        (index, 0)
    }

    fn entry(&self, index: u32, generation: u32) -> Option<&Entry> {
        let slot = self.slots.get(index as usize)?;
        if slot.generation == generation {
            slot.entry.as_ref()
        } else {
            None
        }
    }

    fn entry_mut(&mut self, index: u32, generation: u32) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation == generation {
            slot.entry.as_mut()
        } else {
            None
        }
    }

    fn remove(&mut self, index: u32, generation: u32) -> Option<Entry> {
        self.entry(index, generation)?;
        Some(self.vacate(index))
    }

    fn vacate(&mut self, index: u32) -> Entry {
        let slot = &mut self.slots[index as usize];
        let entry = slot.entry.take().expect("vacated slot must be occupied");

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        entry
    }

    /// Removes every unpinned entry, newest first.
    fn drain_unpinned(&mut self) -> Vec<Entry> {
        let indices: Vec<u32> = (0..self.slots.len() as u32)
            .rev()
            .filter(|&i| matches!(&self.slots[i as usize].entry, Some(e) if !e.pinned))
            .collect();

        indices.into_iter().map(|i| self.vacate(i)).collect()
    }

    /// Removes every entry, pinned or not.
    fn drain_all(&mut self) -> Vec<Entry> {
        let indices: Vec<u32> = (0..self.slots.len() as u32)
            .filter(|&i| self.slots[i as usize].entry.is_some())
            .collect();

        indices.into_iter().map(|i| self.vacate(i)).collect()
    }

    fn stats(&self) -> PointerStats {
        let mut stats = PointerStats::default();
        for entry in self.slots.iter().filter_map(|s| s.entry.as_ref()) {
            stats.live += 1;
            match entry.ownership {
                Ownership::Owned => stats.owned += 1,
                Ownership::Borrowed => stats.borrowed += 1,
            }
            if entry.pinned {
                stats.pinned += 1;
            }
        }
        stats
    }
}

static REGISTRY: Global<Registry> = Global::default();

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Pointer

/// Copyable reference to a registry slot holding a handle of kind `H`.
///
/// Dropping a `Pointer` does nothing; the wrapper types that hold one decide when to [`release()`](Self::release)
/// or [`end()`](Self::end) it.
pub struct Pointer<H: Handle> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> H>,
}

impl<H: Handle> Pointer<H> {
    /// Registers a handle that Rust owns and must release.
    pub fn new(raw: H::Raw) -> Self {
        Self::register(raw, Ownership::Owned)
    }

    /// Registers a handle that Rust never releases, such as an engine singleton.
    pub fn borrowed(raw: H::Raw) -> Self {
        Self::register(raw, Ownership::Borrowed)
    }

    fn register(raw: H::Raw, ownership: Ownership) -> Self {
        let (index, generation) = REGISTRY.lock().insert(Entry::new::<H>(raw, ownership));

        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Raw value of the handle.
    ///
    /// # Panics
    /// If the handle was released, ended or swept.
    #[track_caller]
    pub fn get(self) -> H::Raw {
        match self.try_get() {
            Some(raw) => raw,
            None => panic!(
                "{} handle used after release (slot {}, generation {})",
                H::KIND,
                self.index,
                self.generation
            ),
        }
    }

    /// Raw value of the handle, or `None` if it is no longer registered.
    pub fn try_get(self) -> Option<H::Raw> {
        let registry = REGISTRY.lock();
        let entry = registry.entry(self.index, self.generation)?;

        // SAFETY: entries of this generation were encoded from `H::Raw`.
        Some(unsafe { decode::<H::Raw>(entry.words) })
    }

    /// Replaces the stored raw value, e.g. after the engine updated a value in place.
    ///
    /// # Panics
    /// If the handle is stale.
    #[track_caller]
    pub fn set(self, raw: H::Raw) {
        let mut registry = REGISTRY.lock();
        match registry.entry_mut(self.index, self.generation) {
            Some(entry) => entry.words = encode(raw),
            None => panic!("{} handle modified after release", H::KIND),
        }
    }

    /// Unregisters the handle without releasing it, because ownership moved elsewhere.
    ///
    /// Returns the raw value, or `None` if the handle was already gone.
    pub fn end(self) -> Option<H::Raw> {
        let entry = REGISTRY.lock().remove(self.index, self.generation)?;

        // SAFETY: see `try_get()`.
        Some(unsafe { decode::<H::Raw>(entry.words) })
    }

    /// Unregisters the handle and releases it if Rust owns it.
    ///
    /// Returns whether an engine release happened. Stale handles are a no-op.
    pub fn release(self) -> bool {
        // Lock is dropped at the end of the statement, before the engine call.
        let entry = REGISTRY.lock().remove(self.index, self.generation);

        match entry {
            // SAFETY: the entry was just removed, so this is its only release.
            Some(entry) => unsafe { entry.finish() },
            None => false,
        }
    }

    /// Excludes the handle from [`sweep()`]. Returns `false` if the handle is stale.
    pub fn pin(self) -> bool {
        match REGISTRY.lock().entry_mut(self.index, self.generation) {
            Some(entry) => {
                entry.pinned = true;
                true
            }
            None => false,
        }
    }

    pub fn is_live(self) -> bool {
        REGISTRY.lock().entry(self.index, self.generation).is_some()
    }

    /// Ownership of the handle, or `None` if it is stale.
    pub fn ownership(self) -> Option<Ownership> {
        REGISTRY
            .lock()
            .entry(self.index, self.generation)
            .map(|e| e.ownership)
    }
}

impl<H: Handle> Clone for Pointer<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: Handle> Copy for Pointer<H> {}

impl<H: Handle> PartialEq for Pointer<H> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<H: Handle> Eq for Pointer<H> {}

impl<H: Handle> fmt::Debug for Pointer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer<{}>({}@{})", H::KIND, self.index, self.generation)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Whole-registry operations

/// Counts of registered handles.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct PointerStats {
    pub live: usize,
    pub owned: usize,
    pub borrowed: usize,

    /// Subset of `live` excluded from sweeps.
    pub pinned: usize,
}

/// Outcome of a [`sweep()`].
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct SweepReport {
    /// Owned handles released, per kind.
    pub released: BTreeMap<&'static str, usize>,

    /// Borrowed handles dropped without engine calls.
    pub forgotten: usize,

    /// Pinned handles left in place.
    pub pinned: usize,
}

impl SweepReport {
    pub fn total_released(&self) -> usize {
        self.released.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.released.is_empty() && self.forgotten == 0
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "released {} handle(s)", self.total_released())?;

        if !self.released.is_empty() {
            let per_kind: Vec<String> = self
                .released
                .iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect();
            write!(f, " ({})", per_kind.join(", "))?;
        }

        write!(f, ", forgot {} borrowed", self.forgotten)?;
        if self.pinned > 0 {
            write!(f, ", kept {} pinned", self.pinned)?;
        }
        Ok(())
    }
}

/// Releases every owned, unpinned handle and forgets borrowed ones.
///
/// Rust values still holding swept pointers become inert: dropping them is a no-op, accessing them panics.
pub fn sweep() -> SweepReport {
    let (entries, pinned) = {
        let mut registry = REGISTRY.lock();
        let entries = registry.drain_unpinned();
        (entries, registry.stats().pinned)
    };

    let mut report = SweepReport {
        pinned,
        ..SweepReport::default()
    };

    for entry in entries {
        let kind = entry.kind;

        // SAFETY: drained entries are no longer reachable through any pointer.
        if unsafe { entry.finish() } {
            *report.released.entry(kind).or_default() += 1;
        } else {
            report.forgotten += 1;
        }
    }

    report
}

/// Unregisters every handle without releasing anything. Returns how many were dropped.
pub fn forget_all() -> usize {
    REGISTRY.lock().drain_all().len()
}

pub fn stats() -> PointerStats {
    REGISTRY.lock().stats()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests
