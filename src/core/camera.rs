use crate::core::{CameraDevice, CameraFeed};
use crate::domain::model::RawFrame;
use crate::utils::error::CameraError;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

/// A camera attached to this machine, addressed by platform index. Desktop
/// capture APIs carry no facing-mode hint, so rear/front selection is the
/// user's choice of index.
pub struct DeviceCamera {
    index: u32,
}

impl DeviceCamera {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

impl CameraDevice for DeviceCamera {
    type Feed = DeviceFeed;

    fn open(&self) -> std::result::Result<DeviceFeed, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera =
            nokhwa::Camera::new(CameraIndex::Index(self.index), requested).map_err(classify)?;
        camera.open_stream().map_err(classify)?;
        Ok(DeviceFeed { camera })
    }
}

pub struct DeviceFeed {
    camera: nokhwa::Camera,
}

impl CameraFeed for DeviceFeed {
    fn grab(&mut self) -> std::result::Result<RawFrame, CameraError> {
        let buffer = self.camera.frame().map_err(classify)?;
        let decoded = buffer.decode_image::<RgbFormat>().map_err(classify)?;
        Ok(RawFrame {
            width: decoded.width(),
            height: decoded.height(),
            pixels: decoded.into_raw(),
        })
    }
}

impl Drop for DeviceFeed {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::debug!("Camera stream stop failed: {}", e);
        }
    }
}

fn classify(err: nokhwa::NokhwaError) -> CameraError {
    classify_message(&err.to_string())
}

/// Backend errors carry platform strings rather than stable variants for
/// the cases we present, so classification matches on the message.
fn classify_message(message: &str) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("access denied") {
        CameraError::PermissionDenied
    } else if lower.contains("not found") || lower.contains("no device") || lower.contains("no such")
    {
        CameraError::NotFound
    } else if lower.contains("busy") || lower.contains("in use") {
        CameraError::Busy
    } else {
        CameraError::Unknown(message.to_string())
    }
}
