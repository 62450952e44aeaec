use core::num::NonZero;

// Narrow the raw index in tests so arena-exhaustion paths are reachable.
#[cfg(test)]
type RawIndex = u16;
#[cfg(not(test))]
type RawIndex = u32;

/// A stable slot index into an [`Arena`](super::arena::Arena).
///
/// Stored as `NonZero` so `Option<Handle>` costs no extra space; leaf sibling
/// links and root pointers lean on that niche.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawIndex>);

impl Handle {
    pub(crate) const MAX: usize = (RawIndex::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        // `index + 1` cannot be zero and cannot overflow after the assert.
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawIndex;
        match NonZero::new(raw) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
