//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ MODE  PHOTOS  TRACKER                                    │
//! │                         *                                │
//! │                        o·o          ◯ ← cursor           │
//! │                       o·o·o        ╱                     │
//! │                      o·[▣]·o ─────╯  (connector in       │
//! │                     o·o·o·o·o         photo view)        │
//! │                                                          │
//! │ status bar                                               │
//! │ key legend                                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! In simulation mode the window is also the input device: number keys set
//! the hand pose and the mouse moves the palm.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use hand_signal::{GestureKind, HandSignal};
use tree_mode::AppMode;

use crate::scene::{ParticleKind, Projected, Scene};
use crate::tracker::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 960;
pub const WIN_H:       usize = 640;
const STATUS_Y:        usize = WIN_H - 40;
const CURSOR_R:        f32   = 11.0;
const BG_COLOR:        u32   = 0xFF0B1026;
const HUD_BG:          u32   = 0xFF141B3A;
const CONNECTOR_COLOR: u32   = 0xFFFFD700;
const TEXT_COLOR:      u32   = 0xFFEEEEEE;
const DIM_TEXT:        u32   = 0xFF8890A8;
const GLYPH_PX:        usize = 2;

// ════════════════════════════════════════════════════════════════════════════
// View: what one frame needs from the app
// ════════════════════════════════════════════════════════════════════════════

pub struct View<'a> {
    pub scene:         &'a Scene,
    pub signal:        &'a HandSignal,
    pub mode:          AppMode,
    /// Screen position of the photo being viewed, for the connector.
    pub active_target: Option<(f32, f32)>,
    pub status:        &'a str,
    pub photos:        usize,
    pub tracker:       &'a str,
}

/// Window-level actions that are not hand gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    AddPhoto,
    Release,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:       Window,
    buf:          Vec<u32>,
    sim_tx:       Sender<SimInput>,
    last_pointer: Option<(f32, f32)>,
    frame:        u64,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Gesture Tree",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            last_pointer: None,
            frame: 0,
        })
    }

    pub fn aspect() -> f32 { WIN_W as f32 / WIN_H as f32 }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Pose keys and pointer motion go to the
    /// simulation tracker; everything else comes back as commands.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        if !self.window.is_open() {
            commands.push(UiCommand::Quit);
            return commands;
        }

        let pressed = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if pressed(&self.window, Key::Q) || pressed(&self.window, Key::Escape) {
            commands.push(UiCommand::Quit);
            return commands;
        }
        if pressed(&self.window, Key::P) { commands.push(UiCommand::AddPhoto); }
        if pressed(&self.window, Key::R) { commands.push(UiCommand::Release); }

        let pose_keys = [
            (Key::Key1, SimKey::Open),
            (Key::Key2, SimKey::Fist),
            (Key::Key3, SimKey::Pinch),
            (Key::Key4, SimKey::Relaxed),
            (Key::H,    SimKey::ToggleHand),
        ];
        for (key, sim) in pose_keys {
            if pressed(&self.window, key) {
                let _ = self.sim_tx.send(SimInput::KeyDown(sim));
            }
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let p = (mx / WIN_W as f32, my / WIN_H as f32);
            if self.last_pointer != Some(p) {
                self.last_pointer = Some(p);
                let _ = self.sim_tx.send(SimInput::Pointer { x: p.0, y: p.1 });
            }
        }

        commands
    }

    /// Render one frame.
    pub fn render(&mut self, view: &View<'_>) {
        self.frame += 1;
        self.buf.fill(BG_COLOR);

        self.draw_particles(view.scene);

        if let (AppMode::PhotoView, Some(target), true) =
            (view.mode, view.active_target, view.signal.present)
        {
            let (cx, cy) = view.scene.cursor();
            self.draw_line(to_px(cx, cy), to_px(target.0, target.1), CONNECTOR_COLOR);
        }

        if view.signal.present {
            let (cx, cy) = view.scene.cursor();
            let (px, py) = to_px(cx, cy);
            self.draw_ring(px, py, CURSOR_R, gesture_color(view.signal.gesture));
            self.fill_circle(px, py, 2.5, gesture_color(view.signal.gesture));
        }

        // ── HUD ───────────────────────────────────────────────────────────
        self.fill_rect(0, 0, WIN_W, 22, HUD_BG);
        let hud = format!(
            "MODE: {}   PHOTOS: {}   TRACKER: {}   HAND: {}",
            view.mode.name(),
            view.photos,
            view.tracker,
            if view.signal.present { view.signal.gesture.name() } else { "-" },
        );
        self.draw_label(&hud, 10, 6, TEXT_COLOR);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, HUD_BG);
        self.draw_label(view.status, 10, STATUS_Y + 6, TEXT_COLOR);
        self.draw_label(
            "mouse=palm  1=open 2=fist 3=pinch 4=relaxed  h=hand  p=add photo  r=release  q=quit",
            10, WIN_H - 16, DIM_TEXT,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Particles ─────────────────────────────────────────────────────────

    fn draw_particles(&mut self, scene: &Scene) {
        let mut visible: Vec<(Projected, usize)> = scene.particles().iter()
            .enumerate()
            .filter_map(|(i, p)| scene.project(p.pos).map(|pr| (pr, i)))
            .collect();
        // Painter's order: far first.
        visible.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

        for (pr, i) in visible {
            let p = &scene.particles()[i];
            let (x, y) = to_px(pr.x, pr.y);
            let r = (p.size * pr.scale * WIN_H as f32).max(1.0);
            let fog = ((pr.depth - 10.0) / 14.0).clamp(0.0, 0.7);
            let color = blend(p.color, BG_COLOR, fog);

            match p.kind {
                ParticleKind::Star => {
                    self.draw_diamond(x, y, r * 1.6, color);
                }
                ParticleKind::Light => {
                    let twinkle = ((self.frame as f32 * 0.15 + i as f32).sin() + 1.0) * 0.25;
                    self.fill_circle(x, y, r * 2.2, blend(BG_COLOR, color, 0.25 * twinkle));
                    self.fill_circle(x, y, r, color);
                }
                ParticleKind::Ornament => {
                    self.fill_circle(x, y, r, color);
                    let hi = blend(color, 0xFFFFFFFF, 0.55);
                    self.fill_circle(x - r * 0.35, y - r * 0.35, r * 0.3, hi);
                }
                ParticleKind::Photo(id) => {
                    let inner = blend(photo_tint(id.0), BG_COLOR, fog);
                    self.fill_square(x, y, r, color);
                    self.fill_square(x, y, r * 0.82, inner);
                }
            }
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            let start = row * WIN_W + x.min(WIN_W);
            let end   = row * WIN_W + (x + w).min(WIN_W);
            self.buf[start..end].fill(color);
        }
    }

    fn fill_square(&mut self, cx: f32, cy: f32, half: f32, color: u32) {
        let h = half.round() as isize;
        let (x, y) = (cx.round() as isize, cy.round() as isize);
        for dy in -h..=h {
            for dx in -h..=h {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.ceil() as isize;
        let (x, y) = (cx.round() as isize, cy.round() as isize);
        let r2 = r * r;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f32 <= r2 {
                    self.set_pixel(x + dx, y + dy, color);
                }
            }
        }
    }

    fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let steps = (r * 8.0) as usize;
        for s in 0..steps {
            let a = s as f32 / steps as f32 * std::f32::consts::TAU;
            self.set_pixel((cx + r * a.cos()).round() as isize, (cy + r * a.sin()).round() as isize, color);
        }
    }

    fn draw_diamond(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.round() as isize;
        let (x, y) = (cx.round() as isize, cy.round() as isize);
        for dy in -ri..=ri {
            let span = ri - dy.abs();
            for dx in -span..=span {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// Bresenham line.
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: u32) {
        let (mut x0, mut y0) = (from.0.round() as isize, from.1.round() as isize);
        let (x1, y1) = (to.0.round() as isize, to.1.round() as isize);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x0 += sx; }
            if e2 <= dx { err += dx; y0 += sy; }
        }
    }

    /// 3×5 bitmap font, drawn at `GLYPH_PX` pixels per dot.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * GLYPH_PX;
        for (n, ch) in text.chars().enumerate() {
            let gx = x + n * advance;
            if gx + advance > WIN_W { break; }
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) == 0 { continue; }
                    let px = gx + col * GLYPH_PX;
                    let py = y + row * GLYPH_PX;
                    self.fill_rect(px, py, GLYPH_PX, GLYPH_PX, color);
                }
            }
        }
    }
}

fn to_px(x: f32, y: f32) -> (f32, f32) {
    (x * WIN_W as f32, y * WIN_H as f32)
}

fn gesture_color(g: GestureKind) -> u32 {
    match g {
        GestureKind::OpenHand => 0xFF66FF99,
        GestureKind::Fist     => 0xFFFF5566,
        GestureKind::Pinch    => 0xFFFFD700,
        GestureKind::None     => 0xFFFFFFFF,
    }
}

/// Stand-in picture color for a photo, stable per id.
fn photo_tint(id: usize) -> u32 {
    crate::scene::hsv_to_argb(id as f32 * 67.0, 0.45, 0.75)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font (upper case; lower case folds onto it)
// ────────────────────────────────────────────────────────────────────────────

const GLYPHS: &[(char, [u8; 5])] = &[
    ('0', [7, 5, 5, 5, 7]), ('1', [2, 6, 2, 2, 7]), ('2', [7, 1, 7, 4, 7]),
    ('3', [7, 1, 7, 1, 7]), ('4', [5, 5, 7, 1, 1]), ('5', [7, 4, 7, 1, 7]),
    ('6', [7, 4, 7, 5, 7]), ('7', [7, 1, 1, 1, 1]), ('8', [7, 5, 7, 5, 7]),
    ('9', [7, 5, 7, 1, 7]),
    ('A', [7, 5, 7, 5, 5]), ('B', [6, 5, 6, 5, 6]), ('C', [7, 4, 4, 4, 7]),
    ('D', [6, 5, 5, 5, 6]), ('E', [7, 4, 7, 4, 7]), ('F', [7, 4, 7, 4, 4]),
    ('G', [7, 4, 5, 5, 7]), ('H', [5, 5, 7, 5, 5]), ('I', [7, 2, 2, 2, 7]),
    ('J', [1, 1, 1, 5, 7]), ('K', [5, 5, 6, 5, 5]), ('L', [4, 4, 4, 4, 7]),
    ('M', [5, 7, 5, 5, 5]), ('N', [7, 5, 5, 5, 5]), ('O', [7, 5, 5, 5, 7]),
    ('P', [7, 5, 7, 4, 4]), ('Q', [7, 5, 5, 7, 1]), ('R', [6, 5, 6, 5, 5]),
    ('S', [7, 4, 7, 1, 7]), ('T', [7, 2, 2, 2, 2]), ('U', [5, 5, 5, 5, 7]),
    ('V', [5, 5, 5, 2, 2]), ('W', [5, 5, 5, 7, 5]), ('X', [5, 5, 2, 5, 5]),
    ('Y', [5, 5, 7, 2, 2]), ('Z', [7, 1, 2, 4, 7]),
    ('/', [1, 1, 2, 4, 4]), ('-', [0, 0, 7, 0, 0]), ('.', [0, 0, 0, 0, 2]),
    (',', [0, 0, 0, 2, 4]), (':', [0, 2, 0, 2, 0]), ('=', [0, 7, 0, 7, 0]),
    ('+', [0, 2, 7, 2, 0]), ('#', [5, 7, 5, 7, 5]), ('(', [1, 2, 2, 2, 1]),
    (')', [4, 2, 2, 2, 4]), ('>', [4, 2, 1, 2, 4]), ('_', [0, 0, 0, 0, 7]),
    (' ', [0, 0, 0, 0, 0]),
];

fn glyph(c: char) -> [u8; 5] {
    let c = c.to_ascii_uppercase();
    GLYPHS.iter()
        .find(|(g, _)| *g == c)
        .map(|(_, bits)| *bits)
        .unwrap_or([0, 0, 2, 0, 0])
}

/// Mix two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let channel = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca + (cb - ca) * t).round() as u32) << shift
    };
    0xFF000000 | channel(16) | channel(8) | channel(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 0.0), 0xFF102030);
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000FE, 0.5), 0xFF00007F);
    }

    #[test]
    fn lower_case_folds_to_upper() {
        assert_eq!(glyph('m'), glyph('M'));
        assert_eq!(glyph('~'), [0, 0, 2, 0, 0]);
    }

    #[test]
    fn every_gesture_has_a_distinct_cursor_color() {
        let colors = [GestureKind::None, GestureKind::OpenHand, GestureKind::Fist, GestureKind::Pinch]
            .map(gesture_color);
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j]);
            }
        }
    }
}
