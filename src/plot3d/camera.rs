use eframe::egui;
use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::PI;

use crate::plot3d::gpu_types::SceneUniforms;

/// Orbit camera that revolves around a target point.
///
/// The camera position is derived from spherical coordinates (azimuth,
/// elevation, distance) relative to `target`. Elevation is measured from the
/// ground plane, so the full polar range `[0, PI]` maps to
/// `[-PI/2, PI/2]` here.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Rotation around the world Y axis, radians.
    pub azimuth: f32,
    pub elevation: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

/// Where the camera starts and returns to on reset.
pub const HOME_POSITION: Vec3 = Vec3::new(5.0, 5.0, 10.0);

const ELEVATION_MIN: f32 = -PI / 2.0 + 0.01;
const ELEVATION_MAX: f32 = PI / 2.0 - 0.01;

pub const DISTANCE_MIN: f32 = 3.0;
pub const DISTANCE_MAX: f32 = 20.0;

/// Scales rotate, zoom and pan input alike.
const CONTROL_SPEED: f32 = 0.5;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(HOME_POSITION, Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Camera placed at `eye` and orbiting `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().clamp(DISTANCE_MIN, DISTANCE_MAX);
        Self {
            target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / offset.length().max(f32::EPSILON))
                .asin()
                .clamp(ELEVATION_MIN, ELEVATION_MAX),
            fov_y: 75.0_f32.to_radians(),
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_elev, cos_elev) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let offset = Vec3::new(cos_elev * sin_az, sin_elev, cos_elev * cos_az) * self.distance;
        self.target + offset
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, 0.1, 1000.0)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn rotate(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        self.azimuth += delta_azimuth;
        self.elevation = (self.elevation + delta_elevation).clamp(ELEVATION_MIN, ELEVATION_MAX);
    }

    /// Multiply the distance by `factor`, staying within `[3, 20]`.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(DISTANCE_MIN, DISTANCE_MAX);
    }

    /// Move the target in the camera's right/up plane, scaled by distance.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let view = self.view_matrix();
        let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);

        let scale = self.distance * 0.002 * CONTROL_SPEED;
        self.target += right * (-dx * scale) + up * (dy * scale);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Left drag orbits, right drag pans, scroll zooms, double-click resets.
    pub fn handle_input(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.rotate(delta.x * -0.01 * CONTROL_SPEED, delta.y * -0.01 * CONTROL_SPEED);
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.pan(delta.x, delta.y);
        }

        if response.hovered() {
            let scroll = response.ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.0 {
                let factor = (1.0_f32 - scroll * 0.002 * CONTROL_SPEED).clamp(0.5, 2.0);
                self.zoom(factor);
            }
        }

        if response.double_clicked() {
            self.reset();
        }
    }

    /// Project a world point into `rect`; `None` when it is behind the camera.
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
        let aspect = rect.width() / rect.height().max(1.0);
        let clip = self.view_projection(aspect) * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(egui::Pos2::new(
            rect.left() + (ndc_x * 0.5 + 0.5) * rect.width(),
            rect.top() + (-ndc_y * 0.5 + 0.5) * rect.height(),
        ))
    }

    /// Uniforms with the camera fields filled; per-draw fields are zeroed.
    pub fn uniforms(&self, aspect: f32) -> SceneUniforms {
        let pos = self.position();
        SceneUniforms {
            view_proj: self.view_projection(aspect).to_cols_array_2d(),
            camera_pos: [pos.x, pos.y, pos.z, 1.0],
            color: [0.0; 4],
            resolution: [0.0; 2],
            ambient: 0.0,
            line_width: 0.0,
            mesh_info: [0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home_position() {
        let cam = OrbitCamera::default();
        let p = cam.position();
        assert!((p - HOME_POSITION).length() < 1e-4, "got {p:?}");
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(0.01);
        assert_eq!(cam.distance, DISTANCE_MIN);
        cam.zoom(100.0);
        assert_eq!(cam.distance, DISTANCE_MAX);
    }

    #[test]
    fn elevation_stays_off_the_poles() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 10.0);
        assert!(cam.elevation < PI / 2.0);
        cam.rotate(0.0, -20.0);
        assert!(cam.elevation > -PI / 2.0);
    }

    #[test]
    fn target_projects_to_rect_center() {
        let cam = OrbitCamera::default();
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(400.0, 300.0));
        let p = cam.project(Vec3::ZERO, rect).unwrap();
        assert!((p.x - 200.0).abs() < 0.5 && (p.y - 150.0).abs() < 0.5);
    }
}
