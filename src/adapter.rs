//! Lifetime policies, generic over the trampoline [`Convention`].
//!
//! Each function boxes a closure and returns its context together with the trampoline for
//! the convention `C`. The named functions at the crate root (`prefix_invoker_deleter` etc.)
//! are thin wrappers which fix `C` and order the tuple after the trampoline's parameters.
//!
//! A panic which escapes the closure aborts the process when the closure is called through
//! a trampoline, before it can unwind into the `extern "C"` caller.
//!
//! [`Convention`]: ../convention/trait.Convention.html

use {
    crate::{
        closure_box::{ClosureBox, Fuse},
        context::{Deleter, SharedContext, UniqueContext},
        convention::Convention,
        signature::{Callable, CallableOnce, Signature},
    },
    std::ffi::c_void,
};

/// Boxes the multi-shot closure `f`.
///
/// Returns the opaque context, the trampoline and the deleter.
/// The caller must call the deleter with the context exactly once to free the box.
pub fn manual<C, S, F>(f: F) -> (*mut c_void, C::Trampoline<S>, Deleter)
where
    C: Convention,
    S: Signature,
    F: Callable<S>,
{
    let ctx = ClosureBox::into_raw(f, false);

    (ctx, C::trampoline::<S, F>(), ClosureBox::<F>::delete)
}

/// Boxes the one-shot closure `f`.
///
/// Returns the opaque context and the trampoline.
/// The box frees itself after the first call returns, so the trampoline must be called exactly once:
/// never calling it leaks the box, calling it again is a use-after-free.
pub fn oneshot<C, S, F>(f: F) -> (*mut c_void, C::Trampoline<S>)
where
    C: Convention,
    S: Signature,
    F: CallableOnce<S>,
{
    let ctx = ClosureBox::into_raw(Fuse::new(f), true);

    (ctx, C::trampoline::<S, Fuse<F>>())
}

/// Boxes the multi-shot closure `f`.
///
/// Returns a move-only handle which frees the box when dropped, and the trampoline.
pub fn unique<'a, C, S, F>(f: F) -> (UniqueContext<'a>, C::Trampoline<S>)
where
    C: Convention,
    S: Signature,
    F: Callable<S> + 'a,
{
    let (ctx, trampoline, deleter) = manual::<C, S, F>(f);

    (unsafe { UniqueContext::from_raw(ctx, deleter) }, trampoline)
}

/// Boxes the multi-shot closure `f`.
///
/// Returns a reference-counted handle which frees the box when its last clone is dropped, and the trampoline.
pub fn shared<'a, C, S, F>(f: F) -> (SharedContext<'a>, C::Trampoline<S>)
where
    C: Convention,
    S: Signature,
    F: Callable<S> + 'a,
{
    let (ctx, trampoline) = unique::<C, S, F>(f);

    (ctx.into(), trampoline)
}
