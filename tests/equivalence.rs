//! Calling through a trampoline gives the same result as calling the closure directly.

use {
    minitrampoline::*,
    proptest::{collection::vec, prelude::*},
};

fn mix(a: i32, b: i32) -> i32 {
    a.wrapping_mul(31).wrapping_add(b)
}

proptest! {
    #[test]
    fn manual_matches_direct(a in any::<i32>(), b in any::<i32>()) {
        let (ctx, prefix, prefix_deleter) = prefix_invoker_deleter(mix);
        let (suffix, suffix_ctx, suffix_deleter) = suffix_invoker_deleter(mix);

        let (via_prefix, via_suffix) = unsafe { (prefix(ctx, a, b), suffix(a, b, suffix_ctx)) };

        unsafe {
            prefix_deleter(ctx);
            suffix_deleter(suffix_ctx);
        }

        prop_assert_eq!(via_prefix, mix(a, b));
        prop_assert_eq!(via_suffix, mix(a, b));
    }

    #[test]
    fn floats_match_direct(x in any::<f64>(), y in any::<f64>()) {
        let f = |x: f64, y: f64| x.mul_add(2.0, y);

        let (ctx, invoker) = prefix_invoker_unique(f);
        let result = unsafe { invoker(ctx.as_ptr(), x, y) };

        prop_assert_eq!(result.to_bits(), f(x, y).to_bits());
    }

    #[test]
    fn mixed_widths_match_direct(a in any::<u8>(), b in any::<u16>(), c in any::<u32>(), d in any::<u64>()) {
        let f = |a: u8, b: u16, c: u32, d: u64| (a as u64) ^ ((b as u64) << 8) ^ ((c as u64) << 24) ^ d;

        let (invoker, ctx) = suffix_invoker_shared(f);
        let result = unsafe { invoker(a, b, c, d, ctx.as_ptr()) };

        prop_assert_eq!(result, f(a, b, c, d));
    }

    #[test]
    fn oneshot_matches_direct(words in vec("[a-z]{0,8}", 0..8), sep in "[,;]") {
        let expected = words.join(sep.as_str());

        let (ctx, invoker) = prefix_invoker_oneshot(move |sep: *const String| {
            words.join(unsafe { (*sep).as_str() })
        });

        let result = unsafe { invoker(ctx, &sep) };

        prop_assert_eq!(result, expected);
    }

    #[test]
    fn stateful_matches_fold(steps in vec(any::<i64>(), 0..32)) {
        let mut acc = 0i64;

        let (ctx, invoker, deleter) = prefix_invoker_deleter(move |step: i64| {
            acc = acc.wrapping_add(step);
            acc
        });

        let mut last = 0;
        for step in &steps {
            last = unsafe { invoker(ctx, *step) };
        }

        unsafe {
            deleter(ctx);
        }

        prop_assert_eq!(last, steps.iter().fold(0i64, |acc, step| acc.wrapping_add(*step)));
    }
}
