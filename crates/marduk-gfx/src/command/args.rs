use std::any::Any;
use std::fmt;

/// Maximum number of arguments an envelope can carry (`argc` fits in a `u8`).
pub const MAX_ARGS: usize = u8::MAX as usize;

/// Owned, type-erased argument vector handed to `*WithArgs` commands.
///
/// Values are moved in at submission time, so an asynchronous command never
/// observes storage owned by the submitting thread.
#[derive(Default)]
pub struct Args {
    values: Vec<Option<Box<dyn Any + Send>>>,
}

impl Args {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` and returns `self` for chaining.
    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.values.push(Some(Box::new(value)));
    }

    /// Argument count as seen by the command.
    ///
    /// Saturates at [`MAX_ARGS`]; submission rejects longer vectors before a
    /// command can observe them.
    pub fn argc(&self) -> u8 {
        u8::try_from(self.values.len()).unwrap_or(u8::MAX)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows argument `index` if it exists, was not taken, and is a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.as_ref()?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, index: usize) -> Option<&mut T> {
        self.values.get_mut(index)?.as_mut()?.downcast_mut::<T>()
    }

    /// Moves argument `index` out. A type mismatch leaves the slot untouched.
    pub fn take<T: Any>(&mut self, index: usize) -> Option<T> {
        let slot = self.values.get_mut(index)?;
        if !slot.as_ref().is_some_and(|value| value.is::<T>()) {
            return None;
        }
        slot.take()?.downcast::<T>().ok().map(|value| *value)
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("argc", &self.values.len()).finish()
    }
}
