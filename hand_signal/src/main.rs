//! Interactive explorer: build a synthetic hand, nudge it, and watch how the
//! classifier reads it.

use hand_signal::{
    measure, Classifier, ClassifierConfig, Landmark, LANDMARK_COUNT,
    pose::{self, Pose},
    THUMB_TIP,
};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Hand Signal Classifier Explorer             ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let mut config = ClassifierConfig::default();
    let mut pose   = Pose::Open;
    let (mut cx, mut cy, mut scale) = (0.5_f32, 0.5_f32, 0.2_f32);
    let mut frame: Vec<Landmark> = pose::hand(pose, cx, cy, scale).to_vec();

    loop {
        report(&frame, &config);
        print_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => {
                pose = pick_pose();
                frame = pose::hand(pose, cx, cy, scale).to_vec();
            }
            "2" => {
                cx = read_f32("  Palm centre x (0–1): ", cx).clamp(0.0, 1.0);
                cy = read_f32("  Palm centre y (0–1): ", cy).clamp(0.0, 1.0);
                frame = pose::hand(pose, cx, cy, scale).to_vec();
            }
            "3" => {
                scale = read_f32("  Hand scale (default 0.2): ", 0.2).max(0.001);
                frame = pose::hand(pose, cx, cy, scale).to_vec();
            }
            "4" => {
                let dx = read_f32("  Move thumb tip by dx: ", 0.0);
                let dy = read_f32("  Move thumb tip by dy: ", 0.0);
                frame[THUMB_TIP].x += dx;
                frame[THUMB_TIP].y += dy;
            }
            "5" => {
                config.pinch_abs = read_f32("  Absolute pinch gap (default 0.05): ", 0.05);
                config.pinch_rel = read_f32("  Relative pinch gap (default 0.5): ", 0.5);
            }
            "6" => {
                let n: usize = read_line("  Keep how many landmarks? ")
                    .trim().parse().unwrap_or(LANDMARK_COUNT);
                frame.truncate(n);
            }
            "7" => {
                frame = pose::hand(pose, cx, cy, scale).to_vec();
                println!("  Frame rebuilt.");
            }
            "q" | "quit" | "exit" => {
                println!("  Goodbye.");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
    }
}

fn report(frame: &[Landmark], config: &ClassifierConfig) {
    println!();
    match measure(frame) {
        Ok(g) => {
            println!("  centroid      : ({:.3}, {:.3})", g.centroid.0, g.centroid.1);
            println!("  open fingers  : {}", g.open_count);
            println!("  hand scale    : {:.4}", g.hand_scale);
            println!("  pinch gap     : {:.4}  (abs < {:.3}, rel < {:.4})",
                g.pinch_distance, config.pinch_abs, g.hand_scale * config.pinch_rel);
        }
        Err(e) => println!("  invalid frame : {}", e),
    }
    let signal = Classifier::new(*config).classify_frame(Some(frame));
    match signal.cursor() {
        Some((x, y)) => println!("  → {}  cursor=({:.3}, {:.3})", signal.gesture, x, y),
        None         => println!("  → no hand"),
    }
    println!();
}

fn print_menu() {
    println!("  1. Pick pose        2. Move palm        3. Set scale");
    println!("  4. Nudge thumb tip  5. Pinch thresholds 6. Truncate frame");
    println!("  7. Rebuild frame    q. Quit");
}

fn pick_pose() -> Pose {
    for (i, p) in Pose::ALL.iter().enumerate() {
        print!("    {}.{}  ", i + 1, p.name());
    }
    println!();
    match read_line("    Choice (default 1): ").trim() {
        "2" => Pose::Fist,
        "3" => Pose::Pinch,
        "4" => Pose::Relaxed,
        _   => Pose::Open,
    }
}

fn read_f32(prompt: &str, default: f32) -> f32 {
    read_line(prompt).trim().parse().unwrap_or(default)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
