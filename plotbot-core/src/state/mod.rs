mod calibration;
mod status;

pub use calibration::CalibrationState;
pub use status::DeviceStatus;
