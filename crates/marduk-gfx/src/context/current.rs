use std::any::Any;
use std::cell::RefCell;

use crate::error::ContextError;

use super::RenderContext;

thread_local! {
    static CURRENT: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

/// Parks `context` in the calling thread's slot. Replaces any previous one.
pub(crate) fn install<C: RenderContext>(context: C) {
    CURRENT.with(|slot| {
        let previous = slot.borrow_mut().replace(Box::new(context));
        if previous.is_some() {
            log::warn!("replacing a rendering context that was still current");
        }
    });
}

/// Takes the context of type `C` back out of the calling thread's slot.
pub(crate) fn uninstall<C: RenderContext>() -> Option<C> {
    CURRENT.with(|slot| {
        let boxed = slot.borrow_mut().take()?;
        match boxed.downcast::<C>() {
            Ok(context) => Some(*context),
            Err(_) => {
                log::warn!("current rendering context has an unexpected type");
                None
            }
        }
    })
}

/// Runs `f` with the rendering context current on this thread.
///
/// Only succeeds inside commands executing on the context worker.
pub fn with_current<C, R>(f: impl FnOnce(&mut C) -> R) -> Result<R, ContextError>
where
    C: RenderContext,
{
    CURRENT.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| ContextError::Busy)?;
        let context = slot.as_mut().ok_or(ContextError::NotCurrent)?;
        let context = context.downcast_mut::<C>().ok_or(ContextError::WrongType)?;
        Ok(f(context))
    })
}

/// Whether a rendering context is installed on the calling thread.
pub fn is_current() -> bool {
    CURRENT.with(|slot| slot.try_borrow().map(|s| s.is_some()).unwrap_or(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NullContext;

    struct Other;

    impl RenderContext for Other {
        fn make_current(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn not_current_without_install() {
        assert!(!is_current());
        assert_eq!(with_current(|_: &mut NullContext| ()), Err(ContextError::NotCurrent));
    }

    #[test]
    fn install_then_borrow_then_uninstall() {
        install(NullContext::default());
        assert!(is_current());
        assert_eq!(with_current(|_: &mut Other| ()), Err(ContextError::WrongType));

        let nested = with_current(|_: &mut NullContext| with_current(|_: &mut NullContext| ()));
        assert_eq!(nested, Ok(Err(ContextError::Busy)));

        assert!(uninstall::<NullContext>().is_some());
        assert!(!is_current());
    }

    #[test]
    fn slot_is_per_thread() {
        install(NullContext::default());
        let seen_elsewhere = std::thread::spawn(is_current).join().unwrap();
        assert!(!seen_elsewhere);
        uninstall::<NullContext>();
    }
}
