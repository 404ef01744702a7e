use crate::core::router::Router;
use crate::core::session::SessionState;
use crate::core::{Analyzer, CapturedImage, Result, ScanResult, Screen};

/// Drives one pass of the scan flow over the analysis port: analyze the
/// captured image, record it against the active profile, then take the
/// results transition. `run_scan` borrows the app mutably for its whole
/// duration, so a second analysis cannot start while one is outstanding.
pub struct ScanApp<A: Analyzer> {
    analyzer: A,
    session: SessionState,
    router: Router,
}

impl<A: Analyzer> ScanApp<A> {
    pub fn new(analyzer: A, session: SessionState) -> Self {
        Self {
            analyzer,
            session,
            router: Router::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn current_screen(&self) -> Screen {
        self.router.current()
    }

    pub fn navigate(&mut self, screen: Screen) {
        self.router.navigate(screen);
    }

    pub fn back(&mut self) {
        self.router.back();
    }

    pub async fn run_scan(&mut self, image: CapturedImage) -> Result<&ScanResult> {
        self.router.navigate(Screen::Scan);

        tracing::info!("🔬 Analyzing captured image ({} bytes)", image.jpeg_bytes().len());
        let result = self.analyzer.analyze(&image).await;
        tracing::info!(
            "🩸 Estimate: {:.1} g/dL ({}), confidence {:.2}",
            result.hemoglobin,
            result.classification,
            result.confidence
        );

        let stored = self.session.record_scan(result)?;
        self.router.complete_scan();
        Ok(stored)
    }
}
