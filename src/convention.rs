use crate::signature::{Callable, Signature};

mod private {
    pub trait Sealed {}
}

/// Where the trampoline takes the opaque context argument.
///
/// Selects the trampoline shape independently of the lifetime policy,
/// see the generic constructors in [`adapter`].
///
/// [`adapter`]: ../adapter/index.html
pub trait Convention: private::Sealed {
    /// Trampoline function pointer type for the signature `S`.
    type Trampoline<S: Signature>: Copy;

    /// Returns the trampoline which calls boxed closures of type `F`.
    fn trampoline<S: Signature, F: Callable<S>>() -> Self::Trampoline<S>;
}

/// Context is the first trampoline argument: `fn(ctx, A1, .., An) -> R`.
#[derive(Clone, Copy, Debug)]
pub enum Prefix {}

/// Context is the last trampoline argument: `fn(A1, .., An, ctx) -> R`.
#[derive(Clone, Copy, Debug)]
pub enum Suffix {}

impl private::Sealed for Prefix {}
impl private::Sealed for Suffix {}

impl Convention for Prefix {
    type Trampoline<S: Signature> = S::Prefix;

    fn trampoline<S: Signature, F: Callable<S>>() -> Self::Trampoline<S> {
        S::prefix::<F>()
    }
}

impl Convention for Suffix {
    type Trampoline<S: Signature> = S::Suffix;

    fn trampoline<S: Signature, F: Callable<S>>() -> Self::Trampoline<S> {
        S::suffix::<F>()
    }
}
