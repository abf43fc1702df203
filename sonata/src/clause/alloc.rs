//! Clause allocator.
use std::mem::transmute;
use std::slice;

use sonata_formula::lit::LitIdx;
use sonata_formula::Lit;

use super::{header::HEADER_LEN, Clause, ClauseHeader};

/// Integer type used to store offsets into [`ClauseAlloc`]'s memory.
type ClauseOffset = u32;

/// Bump allocator for clause storage.
///
/// Clauses are allocated from a single continuous buffer. Clauses cannot be freed individually. To
/// reclaim space from deleted clauses, a new `ClauseAlloc` is created and the remaining clauses are
/// copied over.
///
/// When the `ClauseAlloc`'s buffer is full, it is reallocated using the growing strategy of
/// [`Vec`]. External references ([`ClauseRef`]) store an offset into the `ClauseAlloc`'s memory and
/// remain valid when the buffer is grown.
///
/// **Safety**: Using this type is always memory safe, even if invariants of the clause storage are
/// violated, for example by mixing `ClauseRef`s of different allocators. Code doing that will get
/// garbage data or a panic from an internal bounds check, but no undefined behaviour.
#[derive(Default)]
pub struct ClauseAlloc {
    buffer: Vec<LitIdx>,
}

impl ClauseAlloc {
    /// Create an empty clause allocator.
    pub fn new() -> ClauseAlloc {
        ClauseAlloc::default()
    }

    /// Create a clause allocator with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> ClauseAlloc {
        ClauseAlloc {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Allocate space for and add a new clause.
    ///
    /// Clauses have a minimal size of 3, as binary and unit clauses are handled separately. This is
    /// enforced on the ClauseAlloc level to safely avoid extra bound checks when accessing the
    /// initial literals of a clause.
    ///
    /// The length field of the header is set to the size of the given slice. The returned
    /// [`ClauseRef`] can be used to access the new clause.
    pub fn add_clause(&mut self, mut header: ClauseHeader, lits: &[Lit]) -> ClauseRef {
        let offset = self.buffer.len();

        assert!(
            lits.len() >= 3,
            "ClauseAlloc can only store ternary and larger clauses"
        );

        assert!(
            offset <= (ClauseOffset::max_value() as usize),
            "Exceeded ClauseAlloc's maximal buffer size"
        );

        header.set_len(lits.len());

        self.buffer.extend_from_slice(&header.data);

        let lit_idx_slice = unsafe {
            // This is safe as Lit is repr(transparent) over LitIdx
            slice::from_raw_parts(lits.as_ptr() as *const LitIdx, lits.len())
        };

        self.buffer.extend_from_slice(lit_idx_slice);

        ClauseRef {
            offset: offset as ClauseOffset,
        }
    }

    /// Access the header of a clause.
    pub fn header(&self, cref: ClauseRef) -> &ClauseHeader {
        let offset = cref.offset as usize;
        assert!(
            offset + HEADER_LEN <= self.buffer.len(),
            "ClauseRef out of bounds"
        );
        unsafe {
            let header_ptr = self.buffer.as_ptr().add(offset) as *const ClauseHeader;
            &*header_ptr
        }
    }

    /// Mutate the header of a clause.
    pub fn header_mut(&mut self, cref: ClauseRef) -> &mut ClauseHeader {
        let offset = cref.offset as usize;
        assert!(
            offset + HEADER_LEN <= self.buffer.len(),
            "ClauseRef out of bounds"
        );
        unsafe {
            let header_ptr = self.buffer.as_mut_ptr().add(offset) as *mut ClauseHeader;
            &mut *header_ptr
        }
    }

    /// Access a clause.
    pub fn clause(&self, cref: ClauseRef) -> &Clause {
        let len = self.header(cref).len();
        let data_len = len + HEADER_LEN;

        let offset = cref.offset as usize;
        assert!(
            offset + data_len <= self.buffer.len(),
            "ClauseRef out of bounds"
        );
        unsafe {
            transmute::<&[LitIdx], &Clause>(slice::from_raw_parts(
                self.buffer.as_ptr().add(offset),
                data_len,
            ))
        }
    }

    /// Mutate a clause.
    pub fn clause_mut(&mut self, cref: ClauseRef) -> &mut Clause {
        let len = self.header(cref).len();
        let data_len = len + HEADER_LEN;

        let offset = cref.offset as usize;
        assert!(
            offset + data_len <= self.buffer.len(),
            "ClauseRef out of bounds"
        );
        unsafe {
            transmute::<&mut [LitIdx], &mut Clause>(slice::from_raw_parts_mut(
                self.buffer.as_mut_ptr().add(offset),
                data_len,
            ))
        }
    }

    /// Current buffer size in multiples of [`LitIdx`].
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }
}

/// Compact reference to a clause.
///
/// Used with [`ClauseAlloc`] to access the clause.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ClauseRef {
    offset: ClauseOffset,
}
