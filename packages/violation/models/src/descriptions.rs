//! Humanized descriptions that carry meaning beyond display.
//!
//! Camera violations are identified by their humanized description, so the
//! strings here are shared between the normalizer (which produces them) and
//! the streak engine (which counts them).

use crate::CameraViolationKind;

/// School zone speed camera (code 36).
pub const SCHOOL_ZONE_SPEED_CAMERA: &str = "School Zone Speed Camera Violation";
/// Red light camera (code 7).
pub const RED_LIGHT_CAMERA: &str = "Failure to Stop at Red Light";
/// Fixed bus lane camera (code 5).
pub const BUS_LANE_CAMERA: &str = "Bus Lane Violation";
/// Bus-mounted bus lane camera (code 12 from 2019-12-06).
pub const MOBILE_BUS_LANE_CAMERA: &str = "Mobile Bus Lane Violation";
/// Code 12 before 2019-12-06.
pub const NO_STANDING_SNOW_EMERGENCY: &str = "No Standing - Snow Emergency";

/// Maps a humanized description to its camera program.
#[must_use]
pub fn camera_kind(humanized: &str) -> Option<CameraViolationKind> {
    match humanized {
        SCHOOL_ZONE_SPEED_CAMERA => Some(CameraViolationKind::SchoolZoneSpeed),
        RED_LIGHT_CAMERA => Some(CameraViolationKind::RedLight),
        BUS_LANE_CAMERA | MOBILE_BUS_LANE_CAMERA => Some(CameraViolationKind::BusLane),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_camera_descriptions() {
        assert_eq!(
            camera_kind(SCHOOL_ZONE_SPEED_CAMERA),
            Some(CameraViolationKind::SchoolZoneSpeed)
        );
        assert_eq!(
            camera_kind(MOBILE_BUS_LANE_CAMERA),
            Some(CameraViolationKind::BusLane)
        );
        assert_eq!(camera_kind(NO_STANDING_SNOW_EMERGENCY), None);
    }
}
