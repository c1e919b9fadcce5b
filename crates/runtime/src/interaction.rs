//! Distinguishes user-driven viewport changes from programmatic ones.
//!
//! The host owns a single "non-interactive" flag. Code that mutates the map on
//! its own behalf enters a [`SuppressionScope`]; the returned guard keeps the
//! flag raised until it is dropped. Guards nest, so the flag only drops when
//! the outermost guard goes away. A guard may be held across `.await` points,
//! which keeps move notifications fired while a fetch is pending classified
//! as programmatic.

use std::cell::Cell;

/// Host-side interactivity marker.
pub trait InteractivityFlag {
    fn set_non_interactive(&self, value: bool);
    fn is_interactive(&self) -> bool;
}

/// In-process flag for hosts that have no flag of their own.
#[derive(Debug)]
pub struct LocalFlag {
    non_interactive: Cell<bool>,
}

impl Default for LocalFlag {
    fn default() -> Self {
        Self {
            non_interactive: Cell::new(false),
        }
    }
}

impl LocalFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractivityFlag for LocalFlag {
    fn set_non_interactive(&self, value: bool) {
        self.non_interactive.set(value);
    }

    fn is_interactive(&self) -> bool {
        !self.non_interactive.get()
    }
}

impl<F: InteractivityFlag + ?Sized> InteractivityFlag for std::rc::Rc<F> {
    fn set_non_interactive(&self, value: bool) {
        (**self).set_non_interactive(value)
    }

    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }
}

/// Depth counter in front of an [`InteractivityFlag`].
#[derive(Debug, Default)]
pub struct SuppressionScope {
    depth: Cell<u32>,
}

impl SuppressionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises `flag` (if not already raised by this scope) until the guard drops.
    pub fn enter<'a>(&'a self, flag: &'a dyn InteractivityFlag) -> SuppressionGuard<'a> {
        let depth = self.depth.get();
        if depth == 0 {
            flag.set_non_interactive(true);
        }
        self.depth.set(depth + 1);
        SuppressionGuard { scope: self, flag }
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    pub fn is_active(&self) -> bool {
        self.depth.get() > 0
    }
}

#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub struct SuppressionGuard<'a> {
    scope: &'a SuppressionScope,
    flag: &'a dyn InteractivityFlag,
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        let depth = self.scope.depth.get().saturating_sub(1);
        self.scope.depth.set(depth);
        if depth == 0 {
            self.flag.set_non_interactive(false);
        }
    }
}
