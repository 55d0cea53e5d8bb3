//! Zigzag mapping between signed and unsigned integers.
//!
//! Values of small magnitude end up with few significant bits
//! regardless of their sign: `0, -1, 1, -2, 2, ...` become
//! `0, 1, 2, 3, 4, ...`.

macro_rules! zigzag_impl {
    ($($zig:ident, $zag:ident: $signed:ty => $unsigned:ty;)*) => {
        $(
            #[doc = concat!("Maps a [`", stringify!($signed), "`] onto its zigzag [`", stringify!($unsigned), "`] form.")]
            #[inline]
            pub const fn $zig(value: $signed) -> $unsigned {
                ((value << 1) ^ (value >> (<$signed>::BITS - 1))) as $unsigned
            }

            #[doc = concat!("Recovers a [`", stringify!($signed), "`] from its zigzag form.")]
            #[inline]
            pub const fn $zag(value: $unsigned) -> $signed {
                ((value >> 1) as $signed) ^ -((value & 1) as $signed)
            }
        )*
    };
}

zigzag_impl! {
    zig32, zag32: i32 => u32;
    zig64, zag64: i64 => u64;
}
