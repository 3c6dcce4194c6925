//! Debug-only reentrancy check for the hash table.
//!
//! The table calls user code (the key strategies) while a chain is being
//! walked or relinked. A strategy that reaches back into the same table at
//! that point would observe half-updated links. In debug builds every
//! guarded entry point records which operation is running, and a nested
//! entry panics naming both operations. In release builds the check
//! compiles away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;

/// Table operations that run user strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableOp {
    Add,
    Remove,
    Get,
    GetMut,
    ContainsKey,
    Locate,
}

impl fmt::Display for TableOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableOp::Add => "add",
            TableOp::Remove => "remove",
            TableOp::Get => "get",
            TableOp::GetMut => "get_mut",
            TableOp::ContainsKey => "contains_key",
            TableOp::Locate => "locate",
        })
    }
}

/// Tracks the operation a table is in the middle of. Guard an entry point
/// with `let _g = self.reentrancy.enter(TableOp::Get);`.
#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    running: Cell<Option<TableOp>>,
    // The table is single-threaded; keep it !Send and !Sync.
    _single_threaded: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            running: Cell::new(None),
            _single_threaded: PhantomData,
        }
    }

    /// Marks the table as running `op` until the returned guard drops.
    ///
    /// Panics in debug builds when another operation is still running.
    #[inline]
    #[track_caller]
    pub(crate) fn enter(&self, op: TableOp) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.running.get() {
                panic!("hash table reentered: `{op}` called from a key strategy while `{outer}` was running");
            }
            self.running.set(Some(op));
            Entered { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            Entered { _owner: PhantomData }
        }
    }

    #[cfg(all(test, debug_assertions))]
    fn running(&self) -> Option<TableOp> {
        self.running.get()
    }
}

/// RAII marker returned by [`ReentrancyCheck::enter`].
pub(crate) struct Entered<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.running.set(None);
    }
}
