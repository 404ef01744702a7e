use crate::core::Screen;

/// Finite-state selector over the fixed screen set. Transitions happen only
/// on explicit navigation or on scan completion. No guards, no history
/// stack, no deep linking: a target screen always starts fresh.
#[derive(Debug, Default)]
pub struct Router {
    current: Screen,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn navigate(&mut self, screen: Screen) {
        tracing::debug!("Navigating: {} -> {}", self.current, screen);
        self.current = screen;
    }

    /// Every back action lands on home.
    pub fn back(&mut self) {
        self.navigate(Screen::Home);
    }

    /// Completion of the scan flow moves straight to the results screen.
    pub fn complete_scan(&mut self) {
        self.navigate(Screen::Results);
    }
}
