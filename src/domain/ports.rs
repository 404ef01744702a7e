use crate::domain::model::{CapturedImage, RawFrame, ScanResult};
use crate::utils::error::CameraError;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn model_id(&self) -> &str;
    fn api_key(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
    fn jpeg_quality(&self) -> u8;
    fn retain_images(&self) -> bool;
}

/// Analysis port. Implementations must not fail: any transport or parse
/// problem becomes a zero-confidence placeholder result instead of an error.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, image: &CapturedImage) -> ScanResult;
}

/// A camera attached to the machine. Opening it hands out a live feed.
pub trait CameraDevice {
    type Feed: CameraFeed;

    fn open(&self) -> std::result::Result<Self::Feed, CameraError>;
}

/// A live feed handle. Implementations release the underlying device in
/// `Drop`, so the hardware cannot leak on any exit path.
pub trait CameraFeed {
    fn grab(&mut self) -> std::result::Result<RawFrame, CameraError>;
}
