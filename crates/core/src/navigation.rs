//! Screen navigation with a back stack.

use crate::model::Route;

/// Route state machine: the current screen plus the path that led to it.
///
/// History is never empty. The current route is always its last element, so
/// it is kept separately from the earlier entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    current: Route,
    previous: Vec<Route>,
}

impl Navigator {
    /// Starts on [`Route::ENTRY`].
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Route::ENTRY)
    }

    #[must_use]
    pub fn starting_at(initial: Route) -> Self {
        Self {
            current: initial,
            previous: Vec::new(),
        }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.current
    }

    /// Moves to `route` unconditionally and records it.
    pub fn navigate(&mut self, route: Route) {
        self.previous.push(self.current);
        self.current = route;
    }

    /// Pops one entry. Returns false (and changes nothing) on the first screen.
    pub fn go_back(&mut self) -> bool {
        match self.previous.pop() {
            Some(route) => {
                self.current = route;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.previous.is_empty()
    }

    /// Visited routes, oldest first, ending with the current one.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        let mut history = self.previous.clone();
        history.push(self.current);
        history
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.previous.len() + 1
    }

    /// Drops the whole stack and returns to the entry screen.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
