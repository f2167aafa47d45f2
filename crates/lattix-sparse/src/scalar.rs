use std::fmt::Debug;

/// Element type stored in a sparse tensor.
///
/// A scalar has an additive zero (the implicit value of every missing
/// coordinate), supports the arithmetic used by addition, matrix products and
/// reductions, and can report its magnitude so that near-zero sums can be
/// elided.
pub trait Scalar: Copy + PartialOrd + Debug + num_traits::Num + Send + Sync + 'static {
    /// Absolute value of the scalar, used when comparing against an elision threshold.
    fn magnitude(self) -> Self;
}

macro_rules! impl_scalar_signed {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn magnitude(self) -> Self {
                    self.saturating_abs()
                }
            }
        )*
    };
}

macro_rules! impl_scalar_unsigned {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn magnitude(self) -> Self {
                    self
                }
            }
        )*
    };
}

macro_rules! impl_scalar_float {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn magnitude(self) -> Self {
                    self.abs()
                }
            }
        )*
    };
}

impl_scalar_signed!(i8, i16, i32, i64, i128, isize);
impl_scalar_unsigned!(u8, u16, u32, u64, u128, usize);
impl_scalar_float!(f32, f64);
