use crate::config::LayoutKind;

pub const EGO_REPULSION_K: f32 = 0.6;
pub const EGO_LINK_K: f32 = 0.8;

pub const DRAG_ALPHA_TARGET: f32 = 0.3;
pub const DYNAMIC_ALPHA_TARGET: f32 = 0.05;
pub const IMPULSE_INTERVAL_TICKS: u64 = 180;
pub const IMPULSE_MAX_SPEED: f32 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub charge: f32,
    pub theta: f32,
    pub link_strength: f32,
    pub link_distance: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub center_strength: f32,
    pub cluster_radius: f32,
    pub cluster_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub alpha_target: f32,
    pub velocity_decay: f32,
    pub max_speed: f32,
    pub impulse_interval: Option<u64>,
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge: 150.0,
            theta: 0.9,
            link_strength: 0.4,
            link_distance: 60.0,
            collision_padding: 6.0,
            collision_strength: 0.7,
            center_strength: 0.04,
            cluster_radius: 36.0,
            cluster_strength: 0.5,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            max_speed: 40.0,
            impulse_interval: None,
        }
    }
}

impl ForceParams {
    pub fn resolve(layout: LayoutKind, dynamic: bool) -> Self {
        let base = Self::default();
        let mut params = match layout {
            LayoutKind::KamadaKawai => Self {
                link_strength: 0.9,
                link_distance: 45.0,
                collision_padding: 1.5,
                ..base
            },
            LayoutKind::FruchtermanReingold => Self {
                charge: 420.0,
                link_strength: 0.12,
                link_distance: 80.0,
                alpha_decay: base.alpha_decay * 2.0,
                ..base
            },
            LayoutKind::Spring
            | LayoutKind::Circular
            | LayoutKind::Shell
            | LayoutKind::Random => base,
        };

        if dynamic {
            params.alpha_target = DYNAMIC_ALPHA_TARGET;
            params.alpha_decay *= 0.5;
            params.velocity_decay *= 0.5;
            params.impulse_interval = Some(IMPULSE_INTERVAL_TICKS);
        }
        params
    }
}

pub fn ego_repulsion(base: f32, distance: u32) -> f32 {
    base * (1.0 + EGO_REPULSION_K * (distance as f32 + 1.0).ln())
}

pub fn ego_link_strength(base: f32, source_distance: u32, target_distance: u32) -> f32 {
    let far = source_distance.max(target_distance) as f32;
    base / (1.0 + EGO_LINK_K * (far + 1.0).ln())
}
