//! Fixed-width unsigned words carried on the address and data buses.

use core::fmt;
use core::hash::Hash;

/// Unsigned integer type usable as a bus address or data word.
///
/// The bus widths (`adr_wl`, `data_wl`) are selected at compile time by the
/// word type, e.g. `BusMasterController<u32, u8>` for a 32-bit address bus
/// with an 8-bit data bus. The default for both is `u16`.
pub trait BusWord:
    Copy + Default + Eq + Hash + fmt::Debug + fmt::LowerHex + fmt::UpperHex + Send + Sync + 'static
{
    /// Bit width of the bus lines carrying this word.
    const BITS: u32;
    /// All lines low.
    const ZERO: Self;

    /// Widens the word to `u64` without loss.
    fn to_u64(self) -> u64;

    /// Narrows a `u64` to this width, dropping high bits.
    fn from_u64_truncating(value: u64) -> Self;

    /// Narrows a `u64` to this width, rejecting values that do not fit.
    fn try_from_u64(value: u64) -> Option<Self>;
}

macro_rules! impl_bus_word {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BusWord for $ty {
                const BITS: u32 = <$ty>::BITS;
                const ZERO: Self = 0;

                #[inline]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                #[inline]
                #[allow(clippy::cast_possible_truncation)]
                fn from_u64_truncating(value: u64) -> Self {
                    value as $ty
                }

                #[inline]
                fn try_from_u64(value: u64) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_bus_word!(u8, u16, u32, u64);
