pub mod analysis;
pub mod app;
#[cfg(feature = "camera")]
pub mod camera;
pub mod capture;
pub mod router;
pub mod session;

pub use crate::domain::model::{
    CapturedImage, Classification, FeatureScores, Profile, ScanResult, Screen,
};
pub use crate::domain::ports::{Analyzer, CameraDevice, CameraFeed, ConfigProvider};
pub use crate::utils::error::Result;
