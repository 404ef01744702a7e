use crate::core::{Profile, Result, ScanResult};
use crate::domain::model::{Classification, FeatureScores};
use crate::utils::error::ScanError;
use uuid::Uuid;

/// In-memory registry of profiles and scan results. Everything here is
/// volatile and lost on process exit. Mutation happens only through the
/// operations below; there is no edit or delete.
#[derive(Debug, Default)]
pub struct SessionState {
    profiles: Vec<Profile>,
    active_profile_id: Option<String>,
    scans: Vec<ScanResult>,
    latest: Option<usize>,
}

/// Aggregates backing the per-profile trends view.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub scan_count: usize,
    pub average_hemoglobin: f64,
    pub latest_hemoglobin: f64,
    pub latest_classification: Classification,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a profile. The first profile added becomes the active one.
    /// Duplicate ids are rejected; existing profiles are never touched.
    pub fn add_profile(&mut self, profile: Profile) -> Result<()> {
        if self.profiles.iter().any(|p| p.id == profile.id) {
            return Err(ScanError::SessionError {
                message: format!("profile id already exists: {}", profile.id),
            });
        }

        tracing::debug!("Profile added: {} ({})", profile.name, profile.id);
        let id = profile.id.clone();
        self.profiles.push(profile);
        if self.active_profile_id.is_none() {
            self.active_profile_id = Some(id);
        }
        Ok(())
    }

    /// Pure reassignment of the active profile; the id must be known.
    pub fn select_profile(&mut self, id: &str) -> Result<()> {
        if !self.profiles.iter().any(|p| p.id == id) {
            return Err(ScanError::SessionError {
                message: format!("unknown profile id: {}", id),
            });
        }
        self.active_profile_id = Some(id.to_string());
        Ok(())
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        let id = self.active_profile_id.as_deref()?;
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Append a completed scan, stamping the active profile's id over
    /// whatever owner the analysis client produced. Fails when no valid
    /// active profile exists instead of recording an orphan.
    pub fn record_scan(&mut self, mut result: ScanResult) -> Result<&ScanResult> {
        let owner = self.active_profile().ok_or_else(|| ScanError::SessionError {
            message: "no active profile to record the scan against".to_string(),
        })?;

        result.user_id = owner.id.clone();
        self.scans.push(result);
        self.latest = Some(self.scans.len() - 1);
        Ok(&self.scans[self.scans.len() - 1])
    }

    /// The most recent recorded scan, used for immediate display after a
    /// capture completes. Seeded history does not count.
    pub fn latest_result(&self) -> Option<&ScanResult> {
        self.latest.and_then(|index| self.scans.get(index))
    }

    pub fn results(&self) -> &[ScanResult] {
        &self.scans
    }

    pub fn results_for<'a>(&'a self, profile_id: &'a str) -> impl Iterator<Item = &'a ScanResult> {
        self.scans.iter().filter(move |r| r.user_id == profile_id)
    }

    pub fn trend_summary(&self, profile_id: &str) -> Option<TrendSummary> {
        let results: Vec<&ScanResult> = self.results_for(profile_id).collect();
        let latest = *results.last()?;
        let total: f64 = results.iter().map(|r| r.hemoglobin).sum();
        Some(TrendSummary {
            scan_count: results.len(),
            average_hemoglobin: total / results.len() as f64,
            latest_hemoglobin: latest.hemoglobin,
            latest_classification: latest.classification,
        })
    }

    /// Seed two past scans for the active profile so the trends view has
    /// history to chart on first run.
    pub fn seed_demo_history(&mut self) -> Result<()> {
        const DAY_MILLIS: i64 = 86_400_000;

        let owner = self
            .active_profile()
            .ok_or_else(|| ScanError::SessionError {
                message: "no active profile to seed history for".to_string(),
            })?
            .id
            .clone();

        let now = ScanResult::now_millis();
        let samples = [
            (5, 11.2, 0.88, (0.70, 0.75, 0.80, 0.78)),
            (2, 11.5, 0.92, (0.72, 0.78, 0.82, 0.80)),
        ];

        for (days_ago, hemoglobin, confidence, (vascular, colorimetric, textural, spectral)) in
            samples
        {
            self.scans.push(ScanResult {
                id: format!("scan-{}", Uuid::new_v4()),
                user_id: owner.clone(),
                timestamp: now - days_ago * DAY_MILLIS,
                hemoglobin,
                classification: Classification::Mild,
                confidence,
                features: FeatureScores {
                    vascular_visibility: vascular,
                    colorimetric_index: colorimetric,
                    textural_analysis: textural,
                    spectral_reflectance: spectral,
                },
                image_data: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Gender;

    fn profile(name: &str) -> Profile {
        Profile::new(name, 30, Gender::Other, "👤")
    }

    fn scan(user_id: &str, hemoglobin: f64) -> ScanResult {
        ScanResult {
            id: format!("scan-{}", Uuid::new_v4()),
            user_id: user_id.to_string(),
            timestamp: ScanResult::now_millis(),
            hemoglobin,
            classification: Classification::Normal,
            confidence: 0.9,
            features: FeatureScores::uniform(0.8),
            image_data: None,
        }
    }

    #[test]
    fn test_first_profile_becomes_active() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let p1_id = p1.id.clone();
        session.add_profile(p1).unwrap();
        session.add_profile(profile("Grace")).unwrap();

        assert_eq!(session.active_profile().unwrap().id, p1_id);
        assert_eq!(session.profiles().len(), 2);
    }

    #[test]
    fn test_profiles_are_append_only() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let p1_id = p1.id.clone();
        session.add_profile(p1).unwrap();

        let before: Vec<String> = session.profiles().iter().map(|p| p.id.clone()).collect();
        session.add_profile(profile("Grace")).unwrap();
        let after: Vec<String> = session.profiles().iter().map(|p| p.id.clone()).collect();

        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(session.profiles()[0].id, p1_id);
    }

    #[test]
    fn test_duplicate_profile_id_rejected() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let dup = p1.clone();
        session.add_profile(p1).unwrap();
        assert!(session.add_profile(dup).is_err());
        assert_eq!(session.profiles().len(), 1);
    }

    #[test]
    fn test_select_unknown_profile_fails() {
        let mut session = SessionState::new();
        session.add_profile(profile("Ada")).unwrap();
        assert!(session.select_profile("user-missing").is_err());
    }

    #[test]
    fn test_record_scan_overrides_owner_id() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let p1_id = p1.id.clone();
        session.add_profile(p1).unwrap();

        let stored = session.record_scan(scan("unknown", 9.5)).unwrap();
        assert_eq!(stored.user_id, p1_id);
        assert_eq!(session.latest_result().unwrap().user_id, p1_id);
    }

    #[test]
    fn test_record_scan_without_profile_fails_fast() {
        let mut session = SessionState::new();
        assert!(session.record_scan(scan("unknown", 9.5)).is_err());
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_results_for_filters_by_owner() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let p1_id = p1.id.clone();
        session.add_profile(p1).unwrap();
        let p2 = profile("Grace");
        let p2_id = p2.id.clone();
        session.add_profile(p2).unwrap();

        session.record_scan(scan("unknown", 9.5)).unwrap();
        session.select_profile(&p2_id).unwrap();
        session.record_scan(scan("unknown", 13.1)).unwrap();

        assert_eq!(session.results_for(&p1_id).count(), 1);
        assert_eq!(session.results_for(&p2_id).count(), 1);
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn test_trend_summary() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let p1_id = p1.id.clone();
        session.add_profile(p1).unwrap();
        session.record_scan(scan("unknown", 10.0)).unwrap();
        session.record_scan(scan("unknown", 12.0)).unwrap();

        let summary = session.trend_summary(&p1_id).unwrap();
        assert_eq!(summary.scan_count, 2);
        assert!((summary.average_hemoglobin - 11.0).abs() < 1e-9);
        assert_eq!(summary.latest_hemoglobin, 12.0);

        assert!(session.trend_summary("user-missing").is_none());
    }

    #[test]
    fn test_demo_history_does_not_set_latest() {
        let mut session = SessionState::new();
        let p1 = profile("Ada");
        let p1_id = p1.id.clone();
        session.add_profile(p1).unwrap();
        session.seed_demo_history().unwrap();

        assert_eq!(session.results_for(&p1_id).count(), 2);
        assert!(session.latest_result().is_none());
    }
}
