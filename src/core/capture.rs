use crate::core::{CameraDevice, CameraFeed, CapturedImage, Result};
use crate::domain::model::{CaptureOrigin, RawFrame};
use crate::utils::error::{CameraError, ScanError};
use image::codecs::jpeg::JpegEncoder;
use std::path::Path;

/// A camera device that is never available. Used when capture runs purely
/// off uploaded files, or in builds without a camera backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl CameraDevice for NoCamera {
    type Feed = NoFeed;

    fn open(&self) -> std::result::Result<NoFeed, CameraError> {
        Err(CameraError::NotFound)
    }
}

pub struct NoFeed;

impl CameraFeed for NoFeed {
    fn grab(&mut self) -> std::result::Result<RawFrame, CameraError> {
        Err(CameraError::NotFound)
    }
}

/// Owns the capture lifecycle: at most one live feed and at most one
/// current image at any time. The feed is a scoped handle (released by
/// `Drop`), so every path that replaces or abandons it releases the
/// hardware before the next acquisition.
pub struct CaptureSession<D: CameraDevice> {
    device: D,
    feed: Option<D::Feed>,
    current: Option<CapturedImage>,
    jpeg_quality: u8,
}

impl<D: CameraDevice> CaptureSession<D> {
    pub fn new(device: D, jpeg_quality: u8) -> Self {
        Self {
            device,
            feed: None,
            current: None,
            jpeg_quality,
        }
    }

    /// Bring the live feed up. Any previously held feed is released first.
    pub fn start_camera(&mut self) -> std::result::Result<(), CameraError> {
        self.release_feed();
        match self.device.open() {
            Ok(feed) => {
                tracing::debug!("Camera feed acquired");
                self.feed = Some(feed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("📷 Camera acquisition failed: {}", e.user_message());
                Err(e)
            }
        }
    }

    fn release_feed(&mut self) {
        if self.feed.take().is_some() {
            tracing::debug!("Camera feed released");
        }
    }

    pub fn has_live_feed(&self) -> bool {
        self.feed.is_some()
    }

    pub fn current_image(&self) -> Option<&CapturedImage> {
        self.current.as_ref()
    }

    /// Grab one frame from the live feed, encode it at the configured JPEG
    /// quality, and make it the current image. The feed is released whether
    /// or not the grab succeeds.
    pub fn capture_frame(&mut self) -> Result<&CapturedImage> {
        let mut feed = self.feed.take().ok_or_else(|| ScanError::ProcessingError {
            message: "no live camera feed to capture from".to_string(),
        })?;
        let frame = feed.grab().map_err(ScanError::from)?;
        drop(feed);

        let jpeg = encode_frame(frame, self.jpeg_quality)?;
        Ok(self
            .current
            .insert(CapturedImage::new(jpeg, CaptureOrigin::CameraFrame)))
    }

    /// Use a user-selected image file as the current image. The file is
    /// decoded and re-encoded to the same JPEG representation as a live
    /// frame; any live feed is released.
    pub fn upload(&mut self, path: &Path) -> Result<&CapturedImage> {
        let decoded = image::open(path)?;
        self.release_feed();

        let jpeg = encode_rgb(&decoded.to_rgb8(), self.jpeg_quality)?;
        Ok(self
            .current
            .insert(CapturedImage::new(jpeg, CaptureOrigin::Upload)))
    }

    /// Discard the current image and re-acquire the feed.
    pub fn retake(&mut self) -> std::result::Result<(), CameraError> {
        self.current = None;
        self.start_camera()
    }

    /// Abandon the capture attempt entirely, releasing everything.
    pub fn abandon(&mut self) {
        self.current = None;
        self.release_feed();
    }

    /// Hand the current image off to the caller, releasing any live feed.
    pub fn take_image(&mut self) -> Option<CapturedImage> {
        self.release_feed();
        self.current.take()
    }
}

fn encode_frame(frame: RawFrame, quality: u8) -> Result<Vec<u8>> {
    let buffer = image::RgbImage::from_raw(frame.width, frame.height, frame.pixels).ok_or_else(
        || ScanError::ProcessingError {
            message: "camera frame buffer does not match its dimensions".to_string(),
        },
    )?;
    encode_rgb(&buffer, quality)
}

fn encode_rgb(buffer: &image::RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.encode_image(buffer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Counters {
        opens: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    impl Counters {
        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }
    }

    struct MockCamera {
        counters: Counters,
        open_error: Option<CameraError>,
        grab_fails: bool,
    }

    impl MockCamera {
        fn working(counters: Counters) -> Self {
            Self {
                counters,
                open_error: None,
                grab_fails: false,
            }
        }

        fn failing(error: CameraError) -> Self {
            Self {
                counters: Counters::default(),
                open_error: Some(error),
                grab_fails: false,
            }
        }
    }

    impl CameraDevice for MockCamera {
        type Feed = MockFeed;

        fn open(&self) -> std::result::Result<MockFeed, CameraError> {
            if let Some(e) = &self.open_error {
                return Err(e.clone());
            }
            self.counters.opens.fetch_add(1, Ordering::SeqCst);
            Ok(MockFeed {
                counters: self.counters.clone(),
                grab_fails: self.grab_fails,
            })
        }
    }

    struct MockFeed {
        counters: Counters,
        grab_fails: bool,
    }

    impl CameraFeed for MockFeed {
        fn grab(&mut self) -> std::result::Result<RawFrame, CameraError> {
            if self.grab_fails {
                return Err(CameraError::Unknown("sensor read failed".to_string()));
            }
            Ok(RawFrame {
                width: 2,
                height: 2,
                pixels: vec![128; 12],
            })
        }
    }

    impl Drop for MockFeed {
        fn drop(&mut self) {
            self.counters.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_capture_frame_releases_feed_and_holds_one_image() {
        let counters = Counters::default();
        let mut session = CaptureSession::new(MockCamera::working(counters.clone()), 85);

        session.start_camera().unwrap();
        assert!(session.has_live_feed());

        let image = session.capture_frame().unwrap();
        assert_eq!(image.origin(), CaptureOrigin::CameraFrame);
        // JPEG SOI marker
        assert_eq!(&image.jpeg_bytes()[..2], &[0xff, 0xd8]);

        assert!(!session.has_live_feed());
        assert_eq!(counters.opens(), 1);
        assert_eq!(counters.releases(), 1);
    }

    #[test]
    fn test_restart_releases_previous_feed_first() {
        let counters = Counters::default();
        let mut session = CaptureSession::new(MockCamera::working(counters.clone()), 85);

        session.start_camera().unwrap();
        session.start_camera().unwrap();

        assert_eq!(counters.opens(), 2);
        assert_eq!(counters.releases(), 1);
    }

    #[test]
    fn test_retake_discards_image_and_reacquires() {
        let counters = Counters::default();
        let mut session = CaptureSession::new(MockCamera::working(counters.clone()), 85);

        session.start_camera().unwrap();
        session.capture_frame().unwrap();
        assert!(session.current_image().is_some());

        session.retake().unwrap();
        assert!(session.current_image().is_none());
        assert!(session.has_live_feed());
        assert_eq!(counters.opens(), 2);
    }

    #[test]
    fn test_upload_releases_live_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nail.png");
        image::RgbImage::from_pixel(4, 4, image::Rgb([200, 160, 150]))
            .save(&path)
            .unwrap();

        let counters = Counters::default();
        let mut session = CaptureSession::new(MockCamera::working(counters.clone()), 85);
        session.start_camera().unwrap();

        let image = session.upload(&path).unwrap();
        assert_eq!(image.origin(), CaptureOrigin::Upload);
        assert_eq!(&image.jpeg_bytes()[..2], &[0xff, 0xd8]);

        assert!(!session.has_live_feed());
        assert_eq!(counters.releases(), 1);
    }

    #[test]
    fn test_grab_failure_releases_feed_and_keeps_no_image() {
        let counters = Counters::default();
        let mut camera = MockCamera::working(counters.clone());
        camera.grab_fails = true;
        let mut session = CaptureSession::new(camera, 85);

        session.start_camera().unwrap();
        assert!(session.capture_frame().is_err());

        assert!(session.current_image().is_none());
        assert!(!session.has_live_feed());
        assert_eq!(counters.releases(), 1);
    }

    #[test]
    fn test_capture_without_feed_fails() {
        let mut session = CaptureSession::new(MockCamera::working(Counters::default()), 85);
        assert!(session.capture_frame().is_err());
    }

    #[test]
    fn test_acquisition_failure_classification_surfaces() {
        let mut session = CaptureSession::new(MockCamera::failing(CameraError::Busy), 85);
        let err = session.start_camera().unwrap_err();
        assert_eq!(err, CameraError::Busy);
        assert!(err.user_message().contains("in use"));

        let mut session = CaptureSession::new(MockCamera::failing(CameraError::PermissionDenied), 85);
        let err = session.start_camera().unwrap_err();
        assert!(err.user_message().contains("use upload"));
    }

    #[test]
    fn test_abandon_releases_everything() {
        let counters = Counters::default();
        let mut session = CaptureSession::new(MockCamera::working(counters.clone()), 85);

        session.start_camera().unwrap();
        session.capture_frame().unwrap();
        session.start_camera().unwrap();
        session.abandon();

        assert!(session.current_image().is_none());
        assert!(!session.has_live_feed());
        assert_eq!(counters.opens(), 2);
        assert_eq!(counters.releases(), 2);
    }

    #[test]
    fn test_no_camera_device_reports_not_found() {
        let mut session = CaptureSession::new(NoCamera, 85);
        assert_eq!(session.start_camera().unwrap_err(), CameraError::NotFound);
    }
}
