use {
    crate::closure_box::ClosureBox,
    std::ffi::c_void,
};

mod private {
    pub trait Sealed {}
}

/// A closure signature, spelled as a plain function pointer type, e.g. `fn(i32, *const u8) -> bool`.
///
/// Implemented for `fn(A1, .., An) -> R` with `n` from `0` to `12`.
///
/// Knows the two trampoline shapes for the signature:
/// [`Prefix`] takes the opaque context as its first argument, [`Suffix`] takes it as its last.
///
/// [`Prefix`]: #associatedtype.Prefix
/// [`Suffix`]: #associatedtype.Suffix
pub trait Signature: private::Sealed + Sized {
    /// Argument list as a tuple.
    type Args;
    /// Return type.
    type Output;
    /// `unsafe extern "C" fn(*mut c_void, A1, .., An) -> R`.
    type Prefix: Copy;
    /// `unsafe extern "C" fn(A1, .., An, *mut c_void) -> R`.
    type Suffix: Copy;

    /// Returns the context-first trampoline for boxed closures of type `F`.
    fn prefix<F: Callable<Self>>() -> Self::Prefix;

    /// Returns the context-last trampoline for boxed closures of type `F`.
    fn suffix<F: Callable<Self>>() -> Self::Suffix;
}

/// A closure which may be called any number of times with the arguments of the signature `S`.
///
/// Blanket-implemented for every `FnMut` with a matching argument list,
/// which lets the compiler deduce `S` from the closure.
pub trait Callable<S: Signature> {
    /// Calls the closure with the unpacked `args`.
    fn call(&mut self, args: S::Args) -> S::Output;
}

/// A closure which may be called once with the arguments of the signature `S`.
///
/// Blanket-implemented for every `FnOnce` with a matching argument list.
pub trait CallableOnce<S: Signature> {
    /// Consumes the closure and calls it with the unpacked `args`.
    fn call_once(self, args: S::Args) -> S::Output;
}

macro_rules! impl_signature {
    ($( $arg:ident ),*) => {
        impl<R, $( $arg ),*> private::Sealed for fn($( $arg ),*) -> R {}

        impl<R, $( $arg ),*> Signature for fn($( $arg ),*) -> R {
            type Args = ($( $arg, )*);
            type Output = R;
            type Prefix = unsafe extern "C" fn(*mut c_void, $( $arg ),*) -> R;
            type Suffix = unsafe extern "C" fn($( $arg, )* *mut c_void) -> R;

            fn prefix<F: Callable<Self>>() -> Self::Prefix {
                #[allow(non_snake_case, improper_ctypes_definitions)]
                unsafe extern "C" fn trampoline<F, R, $( $arg ),*>(ctx: *mut c_void, $( $arg: $arg ),*) -> R
                where
                    F: Callable<fn($( $arg ),*) -> R>,
                {
                    ClosureBox::<F>::invoke::<fn($( $arg ),*) -> R>(ctx, ($( $arg, )*))
                }

                trampoline::<F, R, $( $arg ),*>
            }

            fn suffix<F: Callable<Self>>() -> Self::Suffix {
                #[allow(non_snake_case, improper_ctypes_definitions)]
                unsafe extern "C" fn trampoline<F, R, $( $arg ),*>($( $arg: $arg, )* ctx: *mut c_void) -> R
                where
                    F: Callable<fn($( $arg ),*) -> R>,
                {
                    ClosureBox::<F>::invoke::<fn($( $arg ),*) -> R>(ctx, ($( $arg, )*))
                }

                trampoline::<F, R, $( $arg ),*>
            }
        }

        impl<Func, R, $( $arg ),*> Callable<fn($( $arg ),*) -> R> for Func
        where
            Func: FnMut($( $arg ),*) -> R,
        {
            #[allow(non_snake_case)]
            fn call(&mut self, ($( $arg, )*): ($( $arg, )*)) -> R {
                self($( $arg ),*)
            }
        }

        impl<Func, R, $( $arg ),*> CallableOnce<fn($( $arg ),*) -> R> for Func
        where
            Func: FnOnce($( $arg ),*) -> R,
        {
            #[allow(non_snake_case)]
            fn call_once(self, ($( $arg, )*): ($( $arg, )*)) -> R {
                self($( $arg ),*)
            }
        }
    };
}

impl_signature!();
impl_signature!(A1);
impl_signature!(A1, A2);
impl_signature!(A1, A2, A3);
impl_signature!(A1, A2, A3, A4);
impl_signature!(A1, A2, A3, A4, A5);
impl_signature!(A1, A2, A3, A4, A5, A6);
impl_signature!(A1, A2, A3, A4, A5, A6, A7);
impl_signature!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_signature!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_signature!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_signature!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_signature!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);
