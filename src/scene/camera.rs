use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    /// Radians per logical pixel of drag.
    pub rotate_speed: f32,
    /// Fractional distance change per wheel step.
    pub zoom_speed: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 5.0,
            min_distance: 1.5,
            max_distance: 20.0,
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_pitch: -1.4,
            max_pitch: 1.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    settings: CameraSettings,
    yaw: f32,
    pitch: f32,
    distance: f32,
    target: Vec3,
    aspect: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
}

impl CameraRig {
    pub fn new(settings: CameraSettings, aspect: f32) -> Self {
        let distance = settings
            .distance
            .clamp(settings.min_distance, settings.max_distance);
        Self {
            settings,
            yaw: 0.0,
            pitch: 0.0,
            distance,
            target: Vec3::ZERO,
            aspect: sanitize_aspect(aspect),
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.settings.fov_degrees.to_radians(),
            self.aspect,
            self.settings.near,
            self.settings.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Queues an orbit by a pointer delta in logical pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * self.settings.rotate_speed;
        self.pending_pitch += dy * self.settings.rotate_speed;
        if self.settings.damping <= 0.0 {
            self.advance();
        }
    }

    pub fn zoom(&mut self, steps: f32) {
        self.pending_zoom += steps * self.settings.zoom_speed;
        if self.settings.damping <= 0.0 {
            self.advance();
        }
    }

    /// Applies one frame of damped motion. Returns true while motion remains.
    pub fn advance(&mut self) -> bool {
        let factor = if self.settings.damping <= 0.0 {
            1.0
        } else {
            self.settings.damping.min(1.0)
        };

        self.yaw += self.pending_yaw * factor;
        self.pitch = (self.pitch + self.pending_pitch * factor)
            .clamp(self.settings.min_pitch, self.settings.max_pitch);
        self.distance = (self.distance * (1.0 - self.pending_zoom * factor))
            .clamp(self.settings.min_distance, self.settings.max_distance);

        let keep = 1.0 - factor;
        self.pending_yaw *= keep;
        self.pending_pitch *= keep;
        self.pending_zoom *= keep;

        const SETTLED: f32 = 1e-5;
        if self.pending_yaw.abs() < SETTLED
            && self.pending_pitch.abs() < SETTLED
            && self.pending_zoom.abs() < SETTLED
        {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            self.pending_zoom = 0.0;
            return false;
        }
        true
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw == 0.0 && self.pending_pitch == 0.0 && self.pending_zoom == 0.0
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_positive_z_at_configured_distance() {
        let rig = CameraRig::new(CameraSettings::default(), 16.0 / 9.0);
        let eye = rig.eye_position();
        assert!((eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn damped_orbit_eases_over_frames() {
        let mut rig = CameraRig::new(CameraSettings::default(), 1.0);
        rig.orbit(-100.0, 0.0);
        let total = 100.0 * rig.settings().rotate_speed;

        assert!(rig.advance());
        let first = rig.yaw();
        assert!((first - total * 0.05).abs() < 1e-6);

        for _ in 0..400 {
            rig.advance();
        }
        assert!((rig.yaw() - total).abs() < 1e-3);
        assert!(rig.is_settled());
    }

    #[test]
    fn zero_damping_applies_immediately() {
        let settings = CameraSettings {
            damping: 0.0,
            ..CameraSettings::default()
        };
        let mut rig = CameraRig::new(settings, 1.0);
        rig.zoom(1.0);
        assert!((rig.distance() - 4.5).abs() < 1e-5);
        assert!(rig.is_settled());
    }

    #[test]
    fn pitch_and_distance_are_clamped() {
        let settings = CameraSettings {
            damping: 0.0,
            ..CameraSettings::default()
        };
        let mut rig = CameraRig::new(settings, 1.0);
        rig.orbit(0.0, 10_000.0);
        assert_eq!(rig.pitch(), 1.4);
        rig.zoom(-1000.0);
        assert_eq!(rig.distance(), 20.0);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let mut rig = CameraRig::new(CameraSettings::default(), 0.0);
        assert_eq!(rig.aspect(), 1.0);
        rig.set_aspect(f32::NAN);
        assert_eq!(rig.aspect(), 1.0);
        rig.set_aspect(2.0);
        assert_eq!(rig.aspect(), 2.0);
    }
}
