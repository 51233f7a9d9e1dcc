use {
    crate::signature::{Callable, CallableOnce, Signature},
    std::{
        ffi::c_void,
        panic::{self, AssertUnwindSafe},
        process,
    },
};

/// Heap cell which owns a type-erased closure.
///
/// Only ever reached through the opaque `*mut c_void` returned by [`into_raw`],
/// which is handed to the external API and passed back to the trampolines / the deleter.
///
/// [`into_raw`]: #method.into_raw
pub(crate) struct ClosureBox<F> {
    callable: F,
    /// Whether the box frees itself when first invoked.
    destroy_on_invoke: bool,
}

impl<F> ClosureBox<F> {
    /// Moves the closure `callable` to the heap and returns the opaque context pointer.
    ///
    /// If `destroy_on_invoke` is `true`, the box frees itself at the end of the first call to
    /// [`invoke`]; otherwise it lives until [`delete`] is called.
    ///
    /// Aborts on allocation failure.
    ///
    /// [`invoke`]: #method.invoke
    /// [`delete`]: #method.delete
    pub(crate) fn into_raw(callable: F, destroy_on_invoke: bool) -> *mut c_void {
        let ctx = Box::into_raw(Box::new(Self {
            callable,
            destroy_on_invoke,
        }))
        .cast::<c_void>();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            ?ctx,
            closure = std::any::type_name::<F>(),
            destroy_on_invoke,
            "allocated closure box"
        );

        ctx
    }

    /// Calls the boxed closure with `args`.
    ///
    /// For boxes created with `destroy_on_invoke`, the box is dropped after the closure
    /// returns and its result is produced; the closure may use its captures up to that point.
    ///
    /// A panic in the closure aborts the process: it must not unwind into the trampoline's
    /// `extern "C"` caller.
    ///
    /// # Safety
    ///
    /// `ctx` must have been returned by [`into_raw`] for this exact `F`, and must not have been freed,
    /// either by [`delete`] or by a previous call of a `destroy_on_invoke` box.
    /// The caller guarantees the closure is not re-entered through the same `ctx` while it runs.
    ///
    /// [`into_raw`]: #method.into_raw
    /// [`delete`]: #method.delete
    pub(crate) unsafe fn invoke<S>(ctx: *mut c_void, args: S::Args) -> S::Output
    where
        S: Signature,
        F: Callable<S>,
    {
        let this = ctx.cast::<Self>();

        if (*this).destroy_on_invoke {
            let mut this = Box::from_raw(this);

            let result = catch_or_abort(|| this.callable.call(args));

            // Box and closure captures dropped here, after the result is produced.
            drop(this);

            #[cfg(feature = "tracing")]
            tracing::trace!(?ctx, "one-shot closure box destroyed after call");

            result
        } else {
            let callable = &mut (*this).callable;
            catch_or_abort(|| callable.call(args))
        }
    }

    /// Drops the closure and frees the box, regardless of `destroy_on_invoke`.
    ///
    /// # Safety
    ///
    /// `ctx` must have been returned by [`into_raw`] for this exact `F` and must not have been freed.
    ///
    /// [`into_raw`]: #method.into_raw
    pub(crate) unsafe extern "C" fn delete(ctx: *mut c_void) {
        drop(Box::from_raw(ctx.cast::<Self>()));

        #[cfg(feature = "tracing")]
        tracing::trace!(?ctx, "closure box deleted");
    }
}

/// Runs `f`, aborting the process if it panics.
fn catch_or_abort<R>(f: impl FnOnce() -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            #[cfg(feature = "tracing")]
            tracing::error!("closure panicked inside a trampoline, aborting");

            process::abort()
        }
    }
}

/// Adapts an `FnOnce` closure for storage in a [`ClosureBox`], which calls its closure by mutable reference.
///
/// Yields the closure on the first call. A `destroy_on_invoke` box is freed by that call,
/// so there is no second one.
///
/// [`ClosureBox`]: struct.ClosureBox.html
pub(crate) struct Fuse<F>(Option<F>);

impl<F> Fuse<F> {
    pub(crate) fn new(f: F) -> Self {
        Self(Some(f))
    }
}

impl<S, F> Callable<S> for Fuse<F>
where
    S: Signature,
    F: CallableOnce<S>,
{
    fn call(&mut self, args: S::Args) -> S::Output {
        match self.0.take() {
            Some(f) => f.call_once(args),
            None => unreachable!("tried to call a one-shot closure twice"),
        }
    }
}
