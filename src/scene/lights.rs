use crate::design::Rgb;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
    pub casts_shadow: bool,
    pub shadow_map_size: u32,
}

impl DirectionalLight {
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub accent: PointLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Rgb::WHITE,
                intensity: 0.6,
            },
            key: DirectionalLight {
                color: Rgb::WHITE,
                intensity: 0.8,
                position: Vec3::new(5.0, 5.0, 5.0),
                casts_shadow: true,
                shadow_map_size: 2048,
            },
            accent: PointLight {
                color: Rgb::from_u32(0xFFCC00),
                intensity: 0.5,
                position: Vec3::new(-5.0, 3.0, 5.0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub radius: f32,
    pub height: f32,
    pub color: Rgb,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            radius: 3.0,
            height: -1.6,
            color: Rgb::from_u32(0x2A2A2A),
        }
    }
}
