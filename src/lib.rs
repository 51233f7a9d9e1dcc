//! Wraps Rust closures as an opaque `*mut c_void` context plus `extern "C"` trampolines
//! for C-style callback APIs.
//!
//! Every adapter comes in two calling conventions,
//! with the context as the first ([`Prefix`]) or the last ([`Suffix`]) trampoline argument,
//! and one of four lifetime policies:
//!
//! | Policy | Prefix | Suffix | Freed by |
//! |---|---|---|---|
//! | Manual | [`prefix_invoker_deleter`] | [`suffix_invoker_deleter`] | calling the returned deleter once |
//! | One-shot | [`prefix_invoker_oneshot`] | [`suffix_invoker_oneshot`] | the single trampoline call |
//! | Exclusive | [`prefix_invoker_unique`] | [`suffix_invoker_unique`] | dropping the [`UniqueContext`] |
//! | Shared | [`prefix_invoker_shared`] | [`suffix_invoker_shared`] | dropping the last [`SharedContext`] clone |
//!
//! The signature is deduced from the closure's argument and return types,
//! or may be spelled out as a function pointer type: `prefix_invoker_deleter::<fn(i32) -> i32, _>(f)`.
//!
//! Trampolines are `unsafe` to call: the caller guarantees they are passed the context they were created with,
//! that the context is alive, and that a one-shot context is called exactly once.
//! The raw contexts of the manual and one-shot policies carry no lifetime, so the caller also guarantees
//! that everything the closure borrows outlives every call. The handle types track this borrow instead.
//! A panic which escapes the closure aborts the process.
//!
//! [`Prefix`]: convention/enum.Prefix.html
//! [`Suffix`]: convention/enum.Suffix.html
//! [`UniqueContext`]: struct.UniqueContext.html
//! [`SharedContext`]: struct.SharedContext.html
//! [`prefix_invoker_deleter`]: fn.prefix_invoker_deleter.html
//! [`suffix_invoker_deleter`]: fn.suffix_invoker_deleter.html
//! [`prefix_invoker_oneshot`]: fn.prefix_invoker_oneshot.html
//! [`suffix_invoker_oneshot`]: fn.suffix_invoker_oneshot.html
//! [`prefix_invoker_unique`]: fn.prefix_invoker_unique.html
//! [`suffix_invoker_unique`]: fn.suffix_invoker_unique.html
//! [`prefix_invoker_shared`]: fn.prefix_invoker_shared.html
//! [`suffix_invoker_shared`]: fn.suffix_invoker_shared.html

pub mod adapter;
mod closure_box;
mod context;
pub mod convention;
mod signature;

pub use {
    context::{Deleter, SharedContext, UniqueContext},
    convention::{Convention, Prefix, Suffix},
    signature::{Callable, CallableOnce, Signature},
};

use std::ffi::c_void;

/// Transforms `f` into an `(context, invoker, deleter)` tuple.
///
/// The invoker takes the same arguments as `f`, prefixed by the context.
/// It may be called any number of times until the deleter is called with the context,
/// which must happen exactly once to free the closure.
///
/// The context does not borrow what `f` borrows: the caller guarantees those borrows outlive every call.
///
/// ```
/// use minitrampoline::prefix_invoker_deleter;
///
/// let (ctx, invoker, deleter) = prefix_invoker_deleter(|x: i32| x + 1);
///
/// unsafe {
///     assert_eq!(invoker(ctx, 41), 42);
///     assert_eq!(invoker(ctx, 1), 2);
///
///     deleter(ctx);
/// }
/// ```
pub fn prefix_invoker_deleter<S, F>(f: F) -> (*mut c_void, S::Prefix, Deleter)
where
    S: Signature,
    F: Callable<S>,
{
    adapter::manual::<Prefix, S, F>(f)
}

/// Transforms `f` into a `(context, oneshot_invoker)` tuple.
///
/// The invoker takes the same arguments as `f`, prefixed by the context.
/// The closure is freed by the first call, so the invoker must be called exactly once:
/// if it is never called the closure leaks, a second call is a use-after-free.
///
/// The context does not borrow what `f` borrows: the caller guarantees those borrows outlive the call.
pub fn prefix_invoker_oneshot<S, F>(f: F) -> (*mut c_void, S::Prefix)
where
    S: Signature,
    F: CallableOnce<S>,
{
    adapter::oneshot::<Prefix, S, F>(f)
}

/// Transforms `f` into a `(context, invoker)` tuple, where the context frees the closure when dropped.
///
/// The invoker takes the same arguments as `f`, prefixed by [`UniqueContext::as_ptr`].
///
/// [`UniqueContext::as_ptr`]: struct.UniqueContext.html#method.as_ptr
pub fn prefix_invoker_unique<'a, S, F>(f: F) -> (UniqueContext<'a>, S::Prefix)
where
    S: Signature,
    F: Callable<S> + 'a,
{
    adapter::unique::<Prefix, S, F>(f)
}

/// Transforms `f` into a `(context, invoker)` tuple, where the last clone of the context frees the closure when dropped.
///
/// The invoker takes the same arguments as `f`, prefixed by [`SharedContext::as_ptr`].
///
/// [`SharedContext::as_ptr`]: struct.SharedContext.html#method.as_ptr
pub fn prefix_invoker_shared<'a, S, F>(f: F) -> (SharedContext<'a>, S::Prefix)
where
    S: Signature,
    F: Callable<S> + 'a,
{
    adapter::shared::<Prefix, S, F>(f)
}

/// Transforms `f` into an `(invoker, context, deleter)` tuple.
///
/// The invoker takes the same arguments as `f`, suffixed by the context.
/// It may be called any number of times until the deleter is called with the context,
/// which must happen exactly once to free the closure.
///
/// The context does not borrow what `f` borrows: the caller guarantees those borrows outlive every call.
///
/// ```
/// use minitrampoline::suffix_invoker_deleter;
///
/// let (invoker, ctx, deleter) = suffix_invoker_deleter(|a: u32, b: u32| a.max(b));
///
/// unsafe {
///     assert_eq!(invoker(3, 7, ctx), 7);
///
///     deleter(ctx);
/// }
/// ```
pub fn suffix_invoker_deleter<S, F>(f: F) -> (S::Suffix, *mut c_void, Deleter)
where
    S: Signature,
    F: Callable<S>,
{
    let (ctx, invoker, deleter) = adapter::manual::<Suffix, S, F>(f);
    (invoker, ctx, deleter)
}

/// Transforms `f` into an `(oneshot_invoker, context)` tuple.
///
/// The invoker takes the same arguments as `f`, suffixed by the context.
/// The closure is freed by the first call, so the invoker must be called exactly once:
/// if it is never called the closure leaks, a second call is a use-after-free.
///
/// The context does not borrow what `f` borrows: the caller guarantees those borrows outlive the call.
pub fn suffix_invoker_oneshot<S, F>(f: F) -> (S::Suffix, *mut c_void)
where
    S: Signature,
    F: CallableOnce<S>,
{
    let (ctx, invoker) = adapter::oneshot::<Suffix, S, F>(f);
    (invoker, ctx)
}

/// Transforms `f` into an `(invoker, context)` tuple, where the context frees the closure when dropped.
///
/// The invoker takes the same arguments as `f`, suffixed by [`UniqueContext::as_ptr`].
///
/// [`UniqueContext::as_ptr`]: struct.UniqueContext.html#method.as_ptr
pub fn suffix_invoker_unique<'a, S, F>(f: F) -> (S::Suffix, UniqueContext<'a>)
where
    S: Signature,
    F: Callable<S> + 'a,
{
    let (ctx, invoker) = adapter::unique::<Suffix, S, F>(f);
    (invoker, ctx)
}

/// Transforms `f` into an `(invoker, context)` tuple, where the last clone of the context frees the closure when dropped.
///
/// The invoker takes the same arguments as `f`, suffixed by [`SharedContext::as_ptr`].
///
/// [`SharedContext::as_ptr`]: struct.SharedContext.html#method.as_ptr
pub fn suffix_invoker_shared<'a, S, F>(f: F) -> (S::Suffix, SharedContext<'a>)
where
    S: Signature,
    F: Callable<S> + 'a,
{
    let (ctx, invoker) = adapter::shared::<Suffix, S, F>(f);
    (invoker, ctx)
}
