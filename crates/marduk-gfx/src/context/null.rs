use super::RenderContext;

/// Context that performs no graphics work.
///
/// Useful for tools and tests that exercise the command path without a GPU.
/// Counts commands that reach it through
/// [`with_current`](crate::context::with_current).
#[derive(Debug, Default)]
pub struct NullContext {
    active: bool,
    touches: u64,
}

impl NullContext {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Records one use and returns the running total.
    pub fn touch(&mut self) -> u64 {
        self.touches += 1;
        self.touches
    }
}

impl RenderContext for NullContext {
    fn make_current(&mut self) -> anyhow::Result<()> {
        self.active = true;
        Ok(())
    }

    fn release(&mut self) {
        self.active = false;
    }

    fn label(&self) -> &str {
        "null context"
    }
}
