//! Cleanup for callbacks that unwind mid-sweep.

/// Lends the context to a running callback and runs `on_unwind` against it
/// if the guard is dropped before [`finish`](Self::finish).
pub(crate) struct CallbackGuard<'a, C, F: FnMut(&mut C)> {
    ctx: &'a mut C,
    on_unwind: F,
    finished: bool,
}

impl<'a, C, F: FnMut(&mut C)> CallbackGuard<'a, C, F> {
    pub(crate) fn new(ctx: &'a mut C, on_unwind: F) -> Self {
        Self {
            ctx,
            on_unwind,
            finished: false,
        }
    }

    /// The context, for passing to the callback.
    pub(crate) fn ctx(&mut self) -> &mut C {
        self.ctx
    }

    /// Marks the callback as returned normally.
    pub(crate) fn finish(mut self) {
        self.finished = true;
    }
}

impl<C, F: FnMut(&mut C)> Drop for CallbackGuard<'_, C, F> {
    fn drop(&mut self) {
        // Only reached without `finish` when the callback panicked.
        if !self.finished {
            (self.on_unwind)(self.ctx);
        }
    }
}
