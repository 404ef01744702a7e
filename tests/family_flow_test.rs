use hemoscan::core::{Classification, FeatureScores, Profile, ScanResult};
use hemoscan::domain::model::Gender;
use hemoscan::SessionState;

fn scan(hemoglobin: f64, classification: Classification) -> ScanResult {
    ScanResult {
        id: format!("scan-{}", uuid::Uuid::new_v4()),
        user_id: "unknown".to_string(),
        timestamp: ScanResult::now_millis(),
        hemoglobin,
        classification,
        confidence: 0.9,
        features: FeatureScores::uniform(0.8),
        image_data: None,
    }
}

#[test]
fn test_family_members_keep_separate_histories() {
    let mut session = SessionState::new();

    let parent = Profile::new("Parent", 42, Gender::Female, "👩");
    let parent_id = parent.id.clone();
    session.add_profile(parent).unwrap();

    let child = Profile::new("Child", 9, Gender::Male, "🧒");
    let child_id = child.id.clone();
    session.add_profile(child).unwrap();

    // First profile stays active until an explicit selection.
    assert_eq!(session.active_profile().unwrap().id, parent_id);
    session.record_scan(scan(13.2, Classification::Normal)).unwrap();

    session.select_profile(&child_id).unwrap();
    session.record_scan(scan(10.8, Classification::Mild)).unwrap();
    session.record_scan(scan(11.1, Classification::Mild)).unwrap();

    assert_eq!(session.results_for(&parent_id).count(), 1);
    assert_eq!(session.results_for(&child_id).count(), 2);

    let child_summary = session.trend_summary(&child_id).unwrap();
    assert_eq!(child_summary.scan_count, 2);
    assert_eq!(child_summary.latest_classification, Classification::Mild);

    let parent_summary = session.trend_summary(&parent_id).unwrap();
    assert_eq!(parent_summary.latest_hemoglobin, 13.2);
}

#[test]
fn test_selecting_back_and_forth_never_loses_profiles() {
    let mut session = SessionState::new();
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let profile = Profile::new(name, 30, Gender::Other, "👤");
        ids.push(profile.id.clone());
        session.add_profile(profile).unwrap();
    }

    for id in ids.iter().rev() {
        session.select_profile(id).unwrap();
        assert_eq!(session.active_profile().unwrap().id, *id);
    }

    assert_eq!(session.profiles().len(), 3);
    let names: Vec<&str> = session.profiles().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
}
