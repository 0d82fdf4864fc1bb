//! Particle scene.
//!
//! Every particle carries two home positions, one in the tree and one in the
//! scatter cloud.  Each frame it eases toward the position the current mode
//! asks for; in PhotoView the active photo is pulled to a fixed spot in
//! front of the camera instead.  The scene also owns the smoothed cursor and
//! the camera rotation it drives.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tree_mode::{AppMode, ItemId};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants (world units)
// ════════════════════════════════════════════════════════════════════════════

pub const TREE_HEIGHT:    f32 = 6.0;
pub const TREE_RADIUS:    f32 = 2.4;
pub const SCATTER_RADIUS: f32 = 6.0;
const CAMERA_DIST:        f32 = 14.0;
const NEAR_PLANE:         f32 = 0.5;
const FOCAL:              f32 = 1.1;
/// Camera-space spot the viewed photo is pulled to.
const FOCUS_DEPTH:        f32 = 5.0;
/// Non-active particles recede by this factor in PhotoView.
const RECEDE:             f32 = 1.35;

const EASE:               f32 = 0.08;
const FOCUS_EASE:         f32 = 0.14;
const CURSOR_EASE:        f32 = 0.2;
const SPIN_PER_TICK:      f32 = 0.004;
const YAW_RANGE:          f32 = PI;
const BASE_PITCH:         f32 = 0.12;
const PITCH_RANGE:        f32 = 0.6;

const GOLDEN_ANGLE:       f32 = 2.399_963;

// ════════════════════════════════════════════════════════════════════════════
// Color palette
// ════════════════════════════════════════════════════════════════════════════

const ORNAMENT_HUES: [f32; 5] = [0.0, 45.0, 130.0, 200.0, 330.0];
pub const LIGHT_COLOR: u32 = 0xFFFFF2C0;
pub const PHOTO_COLOR: u32 = 0xFFF5F5F5;
pub const STAR_COLOR:  u32 = 0xFFFFD700;

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
pub fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Star,
    Ornament,
    Light,
    Photo(ItemId),
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub kind:    ParticleKind,
    pub color:   u32,
    /// World-space radius.
    pub size:    f32,
    pub tree:    [f32; 3],
    pub scatter: [f32; 3],
    pub pos:     [f32; 3],
}

/// A world point after rotation and perspective.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Normalized screen coordinates, (0, 0) top-left.
    pub x:     f32,
    pub y:     f32,
    /// Distance in front of the camera.
    pub depth: f32,
    /// Screen-height units per world unit at this depth.
    pub scale: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene {
    particles: Vec<Particle>,
    rng:       StdRng,
    /// Width / height of the output.
    aspect:    f32,
    cursor:    (f32, f32),
    spin:      f32,
    yaw:       f32,
    pitch:     f32,
}

impl Scene {
    /// Lay out `count` decorative particles (star included).
    pub fn new(count: usize, aspect: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None    => StdRng::from_entropy(),
        };
        let mut scene = Scene {
            particles: Vec::with_capacity(count),
            rng,
            aspect:    aspect.max(0.1),
            cursor:    (0.5, 0.5),
            spin:      0.0,
            yaw:       0.0,
            pitch:     BASE_PITCH,
        };

        if count > 0 {
            let top = [0.0, TREE_HEIGHT / 2.0 + 0.25, 0.0];
            let scatter = scene.scatter_point();
            scene.particles.push(Particle {
                kind: ParticleKind::Star, color: STAR_COLOR, size: 0.22,
                tree: top, scatter, pos: top,
            });
        }

        let decorations = count.saturating_sub(1);
        for i in 0..decorations {
            let h = (i as f32 + 0.5) / decorations as f32;
            let light = i % 3 == 0;
            let inset = if light { 1.0 } else { scene.rng.gen_range(0.55..1.0) };
            let tree = tree_point(i, h, inset);
            let scatter = scene.scatter_point();
            let (kind, color, size) = if light {
                (ParticleKind::Light, LIGHT_COLOR, 0.05)
            } else {
                let hue = ORNAMENT_HUES[scene.rng.gen_range(0..ORNAMENT_HUES.len())];
                (ParticleKind::Ornament, hsv_to_argb(hue, 0.8, 0.9), scene.rng.gen_range(0.07..0.14))
            };
            scene.particles.push(Particle { kind, color, size, tree, scatter, pos: tree });
        }
        scene
    }

    /// Hang a photo on the tree's surface.
    pub fn add_photo(&mut self, id: ItemId) {
        let h = self.rng.gen_range(0.1..0.85);
        let i = self.rng.gen_range(0..1000);
        let tree = tree_point(i, h, 1.05);
        let scatter = self.scatter_point();
        self.particles.push(Particle {
            kind: ParticleKind::Photo(id), color: PHOTO_COLOR, size: 0.3,
            tree, scatter, pos: tree,
        });
    }

    fn scatter_point(&mut self) -> [f32; 3] {
        // Uniform in a ball: random direction, radius ∝ cbrt(u).
        let theta = self.rng.gen_range(0.0..2.0 * PI);
        let cos_phi: f32 = self.rng.gen_range(-1.0..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
        let r = SCATTER_RADIUS * self.rng.gen::<f32>().cbrt();
        [r * sin_phi * theta.cos(), r * cos_phi, r * sin_phi * theta.sin()]
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }

    /// Smoothed cursor, normalized screen coordinates.
    pub fn cursor(&self) -> (f32, f32) { self.cursor }

    pub fn yaw(&self) -> f32 { self.yaw }

    /// Where `p` should be heading in `mode`.
    pub fn target(&self, p: &Particle, mode: AppMode, active: Option<ItemId>) -> [f32; 3] {
        match mode {
            AppMode::Tree    => p.tree,
            AppMode::Scatter => p.scatter,
            AppMode::PhotoView => match (p.kind, active) {
                (ParticleKind::Photo(id), Some(a)) if id == a => self.focus_point(),
                _ => scale(p.scatter, RECEDE),
            },
        }
    }

    /// World point that projects to screen centre at `FOCUS_DEPTH`.
    fn focus_point(&self) -> [f32; 3] {
        let camera = [0.0, 0.0, CAMERA_DIST - FOCUS_DEPTH];
        mul(&transpose(&rotation(self.yaw, self.pitch)), &camera)
    }

    /// Advance one frame.  `cursor` is the latest hand cursor, if a hand is
    /// present; without one the view drifts back to centre.
    pub fn tick(&mut self, mode: AppMode, active: Option<ItemId>, cursor: Option<(f32, f32)>) {
        let (tx, ty) = cursor.unwrap_or((0.5, 0.5));
        self.cursor.0 += (tx - self.cursor.0) * CURSOR_EASE;
        self.cursor.1 += (ty - self.cursor.1) * CURSOR_EASE;

        if mode == AppMode::Tree {
            self.spin = (self.spin + SPIN_PER_TICK) % (2.0 * PI);
        }
        self.yaw   = self.spin + (self.cursor.0 - 0.5) * YAW_RANGE;
        self.pitch = BASE_PITCH + (self.cursor.1 - 0.5) * PITCH_RANGE;

        let focus = self.focus_point();
        for i in 0..self.particles.len() {
            let p = &self.particles[i];
            let focused = matches!((p.kind, active, mode),
                (ParticleKind::Photo(id), Some(a), AppMode::PhotoView) if id == a);
            let (target, ease) = if focused {
                (focus, FOCUS_EASE)
            } else {
                (self.target(p, mode, active), EASE)
            };
            let p = &mut self.particles[i];
            for axis in 0..3 {
                p.pos[axis] += (target[axis] - p.pos[axis]) * ease;
            }
        }
    }

    /// Rotate by the current camera and apply perspective.  `None` behind the
    /// near plane.
    pub fn project(&self, world: [f32; 3]) -> Option<Projected> {
        let v = mul(&rotation(self.yaw, self.pitch), &world);
        let depth = CAMERA_DIST - v[2];
        if depth < NEAR_PLANE {
            return None;
        }
        let s = FOCAL / depth;
        Some(Projected {
            x:     0.5 + v[0] * s / self.aspect,
            y:     0.5 - v[1] * s,
            depth,
            scale: s,
        })
    }

    /// On-screen position of photo `id`, if it is in front of the camera.
    pub fn photo_position(&self, id: ItemId) -> Option<(f32, f32)> {
        self.particles.iter()
            .find(|p| p.kind == ParticleKind::Photo(id))
            .and_then(|p| self.project(p.pos))
            .map(|pr| (pr.x, pr.y))
    }

    /// On-screen position of every photo.
    pub fn photo_positions(&self) -> Vec<(ItemId, Option<(f32, f32)>)> {
        self.particles.iter()
            .filter_map(|p| match p.kind {
                ParticleKind::Photo(id) => Some((id, self.project(p.pos).map(|pr| (pr.x, pr.y)))),
                _ => None,
            })
            .collect()
    }
}

/// Point on a cone spiral at height fraction `h`; `inset` < 1 pulls it inside
/// the surface.
fn tree_point(i: usize, h: f32, inset: f32) -> [f32; 3] {
    let radius = TREE_RADIUS * (1.0 - h) * inset;
    let angle = i as f32 * GOLDEN_ANGLE;
    [radius * angle.cos(), -TREE_HEIGHT / 2.0 + h * TREE_HEIGHT, radius * angle.sin()]
}

// ────────────────────────────────────────────────────────────────────────────
// 3×3 rotation helpers
// ────────────────────────────────────────────────────────────────────────────

/// Yaw about Y, then pitch about X.
fn rotation(yaw: f32, pitch: f32) -> [[f32; 3]; 3] {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let ry = [[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]];
    let rx = [[1.0, 0.0, 0.0], [0.0, cp, -sp], [0.0, sp, cp]];
    mul_m(&rx, &ry)
}

fn mul(m: &[[f32; 3]; 3], v: &[f32; 3]) -> [f32; 3] {
    let mut out = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i] += m[i][j] * v[j];
        }
    }
    out
}

fn mul_m(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                out[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    out
}

fn transpose(m: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[j][i];
        }
    }
    out
}

fn scale(v: [f32; 3], k: f32) -> [f32; 3] {
    [v[0] * k, v[1] * k, v[2] * k]
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: [f32; 3], b: [f32; 3]) -> f32 {
        ((a[0]-b[0]).powi(2) + (a[1]-b[1]).powi(2) + (a[2]-b[2]).powi(2)).sqrt()
    }

    fn scene_with_photo() -> Scene {
        let mut s = Scene::new(120, 1.0, Some(5));
        s.add_photo(ItemId(0));
        s.add_photo(ItemId(1));
        s
    }

    #[test]
    fn particle_count_includes_star() {
        let s = Scene::new(50, 1.0, Some(1));
        assert_eq!(s.particles().len(), 50);
        assert_eq!(s.particles()[0].kind, ParticleKind::Star);
        assert!(Scene::new(0, 1.0, Some(1)).particles().is_empty());
    }

    #[test]
    fn tree_layout_is_a_cone() {
        let s = Scene::new(300, 1.0, Some(2));
        for p in s.particles().iter().skip(1) {
            let [x, y, z] = p.tree;
            let h = (y + TREE_HEIGHT / 2.0) / TREE_HEIGHT;
            assert!((0.0..=1.0).contains(&h));
            assert!((x * x + z * z).sqrt() <= TREE_RADIUS * (1.0 - h) + 1e-4);
        }
    }

    #[test]
    fn scatter_stays_in_ball() {
        let s = Scene::new(300, 1.0, Some(3));
        for p in s.particles() {
            assert!(dist(p.scatter, [0.0; 3]) <= SCATTER_RADIUS + 1e-4);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let a = Scene::new(40, 1.0, Some(9));
        let b = Scene::new(40, 1.0, Some(9));
        for (p, q) in a.particles().iter().zip(b.particles()) {
            assert_eq!(p.tree, q.tree);
            assert_eq!(p.scatter, q.scatter);
        }
    }

    #[test]
    fn particles_converge_on_scatter() {
        let mut s = scene_with_photo();
        for _ in 0..300 { s.tick(AppMode::Scatter, None, None); }
        for p in s.particles() {
            assert!(dist(p.pos, p.scatter) < 1e-2);
        }
    }

    #[test]
    fn particles_return_to_tree() {
        let mut s = scene_with_photo();
        for _ in 0..200 { s.tick(AppMode::Scatter, None, None); }
        for _ in 0..300 { s.tick(AppMode::Tree, None, None); }
        for p in s.particles() {
            assert!(dist(p.pos, p.tree) < 1e-2);
        }
    }

    #[test]
    fn viewed_photo_comes_to_front_centre() {
        let mut s = scene_with_photo();
        for _ in 0..300 { s.tick(AppMode::PhotoView, Some(ItemId(1)), Some((0.5, 0.5))); }
        let (x, y) = s.photo_position(ItemId(1)).unwrap();
        assert!((x - 0.5).abs() < 0.02, "x={}", x);
        assert!((y - 0.5).abs() < 0.02, "y={}", y);

        let focus = s.particles().iter()
            .find(|p| p.kind == ParticleKind::Photo(ItemId(1))).unwrap();
        let nearest = s.particles().iter()
            .filter_map(|p| s.project(p.pos))
            .map(|pr| pr.depth)
            .fold(f32::MAX, f32::min);
        assert!((s.project(focus.pos).unwrap().depth - nearest).abs() < 1e-3);
    }

    #[test]
    fn cursor_is_smoothed() {
        let mut s = Scene::new(10, 1.0, Some(4));
        s.tick(AppMode::Tree, None, Some((1.0, 1.0)));
        let (x, _) = s.cursor();
        assert!(x > 0.5 && x < 1.0);
        for _ in 0..100 { s.tick(AppMode::Tree, None, Some((1.0, 1.0))); }
        assert!((s.cursor().0 - 1.0).abs() < 1e-3);
        for _ in 0..100 { s.tick(AppMode::Tree, None, None); }
        assert!((s.cursor().0 - 0.5).abs() < 1e-3);
    }

    #[test]
    fn cursor_steers_yaw() {
        let mut left = Scene::new(10, 1.0, Some(4));
        let mut right = Scene::new(10, 1.0, Some(4));
        for _ in 0..50 {
            left.tick(AppMode::Scatter, None, Some((0.1, 0.5)));
            right.tick(AppMode::Scatter, None, Some((0.9, 0.5)));
        }
        assert!(left.yaw() < 0.0);
        assert!(right.yaw() > 0.0);
    }

    #[test]
    fn origin_projects_to_centre() {
        let mut s = Scene::new(10, 1.6, Some(4));
        s.tick(AppMode::Scatter, None, Some((0.8, 0.2)));
        let pr = s.project([0.0; 3]).unwrap();
        assert!((pr.x - 0.5).abs() < 1e-6);
        assert!((pr.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let s = Scene::new(1, 1.0, Some(4));
        let mut p = [0.0, 0.0, CAMERA_DIST + 1.0];
        // Undo the camera rotation so the point really sits behind the lens.
        p = mul(&transpose(&rotation(s.yaw, s.pitch)), &p);
        assert!(s.project(p).is_none());
    }

    #[test]
    fn photo_positions_cover_all_photos() {
        let s = scene_with_photo();
        let ids: Vec<_> = s.photo_positions().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ItemId(0), ItemId(1)]);
    }

    #[test]
    fn hsv_primary_colors() {
        assert_eq!(hsv_to_argb(0.0, 1.0, 1.0), 0xFFFF0000);
        assert_eq!(hsv_to_argb(120.0, 1.0, 1.0), 0xFF00FF00);
        assert_eq!(hsv_to_argb(240.0, 1.0, 1.0), 0xFF0000FF);
    }
}
