use {
    static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any},
    std::{
        ffi::c_void,
        fmt,
        marker::PhantomData,
        mem::ManuallyDrop,
        ptr::NonNull,
        rc::Rc,
    },
};

/// Frees a closure box given its opaque context pointer.
///
/// Must be called exactly once per multi-shot context, and never for a one-shot context.
pub type Deleter = unsafe extern "C" fn(*mut c_void);

/// Move-only owning handle to a multi-shot closure box.
///
/// Dropping the handle calls the box's [`Deleter`] exactly once.
/// Use [`as_ptr`] to pass the opaque context to the external API;
/// the pointer is only valid while the handle is alive.
///
/// `'a` is the lifetime of the closure's borrows, if any.
///
/// [`Deleter`]: type.Deleter.html
/// [`as_ptr`]: #method.as_ptr
pub struct UniqueContext<'a> {
    ptr: NonNull<c_void>,
    deleter: Deleter,
    _closure: PhantomData<&'a ()>,
}

// Niche-optimized, no thread safety assumed about the erased closure.
assert_eq_size!(UniqueContext<'static>, [usize; 2]);
assert_eq_size!(Option<UniqueContext<'static>>, UniqueContext<'static>);
assert_not_impl_any!(UniqueContext<'static>: Clone, Send, Sync);

impl<'a> UniqueContext<'a> {
    /// Adopts a context created with the manual policy, e.g. by [`prefix_invoker_deleter`].
    ///
    /// # Safety
    ///
    /// `ptr` must be a live, non-null multi-shot context and `deleter` must be the deleter returned with it.
    /// The caller hands its obligation to call `deleter` over to the handle
    /// and guarantees the closure's borrows outlive `'a`.
    ///
    /// [`prefix_invoker_deleter`]: ../fn.prefix_invoker_deleter.html
    pub unsafe fn from_raw(ptr: *mut c_void, deleter: Deleter) -> Self {
        debug_assert!(!ptr.is_null(), "tried to adopt a null closure context");

        #[cfg(feature = "tracing")]
        tracing::trace!(ctx = ?ptr, "unique closure context acquired");

        Self {
            ptr: NonNull::new_unchecked(ptr),
            deleter,
            _closure: PhantomData,
        }
    }

    /// Returns the opaque context pointer to pass to the external API.
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }

    /// Releases ownership without freeing the box.
    ///
    /// The caller becomes responsible for calling the returned deleter exactly once.
    pub fn into_raw(self) -> (*mut c_void, Deleter) {
        let this = ManuallyDrop::new(self);

        (this.ptr.as_ptr(), this.deleter)
    }
}

impl<'a> Drop for UniqueContext<'a> {
    fn drop(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(ctx = ?self.ptr, "unique closure context released");

        unsafe {
            (self.deleter)(self.ptr.as_ptr());
        }
    }
}

impl<'a> fmt::Debug for UniqueContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UniqueContext").field(&self.ptr).finish()
    }
}

/// Reference-counted owning handle to a multi-shot closure box.
///
/// Clones share the box; dropping the last clone calls the box's [`Deleter`] exactly once.
///
/// [`Deleter`]: type.Deleter.html
#[derive(Clone)]
pub struct SharedContext<'a>(Rc<UniqueContext<'a>>);

assert_impl_all!(SharedContext<'static>: Clone);
assert_not_impl_any!(SharedContext<'static>: Send, Sync);

impl<'a> SharedContext<'a> {
    /// Returns the opaque context pointer to pass to the external API.
    pub fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// Number of live clones of this handle.
    pub fn strong_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }
}

impl<'a> From<UniqueContext<'a>> for SharedContext<'a> {
    fn from(unique: UniqueContext<'a>) -> Self {
        Self(Rc::new(unique))
    }
}

impl<'a> fmt::Debug for SharedContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedContext").field(&self.0.ptr).finish()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::cell::Cell,
    };

    thread_local! {
        static DELETED: Cell<u32> = Cell::new(0);
    }

    /// Stands in for a closure box deleter; `ptr` points to a leaked `u32`.
    unsafe extern "C" fn count_delete(ptr: *mut c_void) {
        drop(Box::from_raw(ptr.cast::<u32>()));
        DELETED.with(|deleted| deleted.set(deleted.get() + 1));
    }

    fn deleted() -> u32 {
        DELETED.with(Cell::get)
    }

    fn unique() -> UniqueContext<'static> {
        let ptr = Box::into_raw(Box::new(7u32)).cast::<c_void>();
        unsafe { UniqueContext::from_raw(ptr, count_delete) }
    }

    #[test]
    fn unique_drop() {
        let ctx = unique();
        assert_eq!(unsafe { *ctx.as_ptr().cast::<u32>() }, 7);
        assert_eq!(deleted(), 0);

        drop(ctx);
        assert_eq!(deleted(), 1);
    }

    #[test]
    fn unique_move() {
        let ctx = unique();
        let ptr = ctx.as_ptr();

        let moved = Some(ctx);
        assert_eq!(deleted(), 0);

        let moved = moved.map(|ctx| {
            assert_eq!(ctx.as_ptr(), ptr);
            ctx
        });
        assert_eq!(deleted(), 0);

        drop(moved);
        assert_eq!(deleted(), 1);
    }

    #[test]
    fn unique_into_raw() {
        let (ptr, deleter) = unique().into_raw();
        assert_eq!(deleted(), 0);

        let ctx = unsafe { UniqueContext::from_raw(ptr, deleter) };
        assert_eq!(ctx.as_ptr(), ptr);
        assert_eq!(deleted(), 0);

        drop(ctx);
        assert_eq!(deleted(), 1);
    }

    #[test]
    fn shared_drop_order() {
        let first = SharedContext::from(unique());
        let second = first.clone();
        let third = second.clone();

        assert_eq!(SharedContext::strong_count(&first), 3);
        assert_eq!(first.as_ptr(), third.as_ptr());

        drop(second);
        drop(first);
        assert_eq!(deleted(), 0);
        assert_eq!(SharedContext::strong_count(&third), 1);

        drop(third);
        assert_eq!(deleted(), 1);
    }

    #[test]
    fn debug() {
        let ctx = unique();
        let ptr = ctx.as_ptr();

        assert_eq!(format!("{:?}", ctx), format!("UniqueContext({:?})", ptr));

        let shared = SharedContext::from(ctx);
        assert_eq!(format!("{:?}", shared), format!("SharedContext({:?})", ptr));
    }
}
