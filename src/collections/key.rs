/*!
 * Fallible Key Hashing
 *
 * Keys of the sharded collections hash through `HashKey`, which may refuse.
 * Statically typed keys never refuse; `Value::List` (and anything containing
 * one) does, surfacing as `KeyError::UnhashableKey` before any shard is
 * locked.
 */

use crate::core::errors::KeyError;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// A key that can be hashed, or can report why it cannot
///
/// Equal keys must produce equal hashes. Implementations must write the same
/// bytes to `state` every time for the same key.
pub trait HashKey: Eq {
    /// Feed this key into `state`, or fail with `UnhashableKey`
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError>;
}

macro_rules! impl_infallible_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl HashKey for $t {
                #[inline]
                fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
                    self.hash(state);
                    Ok(())
                }
            }
        )*
    };
}

impl_infallible_key!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String, str, (),
);

impl<T: HashKey + ?Sized> HashKey for &T {
    #[inline]
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        (**self).try_hash(state)
    }
}

impl<T: HashKey + ?Sized> HashKey for Box<T> {
    #[inline]
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        (**self).try_hash(state)
    }
}

impl<T: HashKey + ?Sized> HashKey for Arc<T> {
    #[inline]
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        (**self).try_hash(state)
    }
}

impl<T: HashKey + ?Sized> HashKey for Rc<T> {
    #[inline]
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        (**self).try_hash(state)
    }
}

impl<T: HashKey> HashKey for Option<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        match self {
            None => {
                state.write_u8(0);
                Ok(())
            }
            Some(inner) => {
                state.write_u8(1);
                inner.try_hash(state)
            }
        }
    }
}

impl<T: HashKey> HashKey for Vec<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<(), KeyError> {
        state.write_usize(self.len());
        self.iter().try_for_each(|item| item.try_hash(state))
    }
}

macro_rules! impl_tuple_key {
    ($($name:ident),+) => {
        impl<$($name: HashKey),+> HashKey for ($($name,)+) {
            #[allow(non_snake_case)]
            fn try_hash<HS: Hasher>(&self, state: &mut HS) -> Result<(), KeyError> {
                let ($($name,)+) = self;
                $($name.try_hash(state)?;)+
                Ok(())
            }
        }
    };
}

impl_tuple_key!(A);
impl_tuple_key!(A, B);
impl_tuple_key!(A, B, C);
impl_tuple_key!(A, B, C, D);
