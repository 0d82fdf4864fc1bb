//! Interactive walk through the interaction state machine: type gestures,
//! add photos, and watch the mode change.

use hand_signal::{GestureKind, HandSignal};
use tree_mode::{Controller, FocusSet, Outcome, SelectionPolicy, Skip};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Tree Mode State Machine Explorer            ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let policy = read_line("  Selection policy (random|nearest, default random): ")
        .parse::<SelectionPolicy>()
        .unwrap_or_default();
    let mut ctl    = Controller::new(policy.build(None));
    let mut photos = FocusSet::new();
    let mut cursor = (0.5_f32, 0.5_f32);

    println!("\n  ✓  Mode: {}  ({} selection)\n", ctl.mode(), ctl.policy());

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        let gesture = match choice.as_str() {
            "o" => Some((GestureKind::OpenHand, true)),
            "f" => Some((GestureKind::Fist,     true)),
            "p" => Some((GestureKind::Pinch,    true)),
            "n" => Some((GestureKind::None,     true)),
            "a" => Some((GestureKind::None,     false)),
            _   => None,
        };

        if let Some((gesture, present)) = gesture {
            let signal = HandSignal { gesture, x: cursor.0, y: cursor.1, present };
            let out = ctl.apply(&signal, &photos);
            print_outcome(&out, &photos);
            continue;
        }

        match choice.as_str() {
            "r" => {
                let out = ctl.release();
                print_outcome(&out, &photos);
            }
            "+" => {
                let handle = read_line("  Photo handle: ").trim().to_string();
                let id = photos.add(if handle.is_empty() { "photo".to_string() } else { handle });
                let x = read_line("  Drawn at x (blank = unplaced): ").trim().parse::<f32>();
                let y = read_line("  Drawn at y (blank = unplaced): ").trim().parse::<f32>();
                if let (Ok(x), Ok(y)) = (x, y) {
                    photos.set_screen_pos(id, Some((x, y)));
                }
                println!("  Added photo {} ({} total).", id, photos.len());
            }
            "c" => {
                cursor.0 = read_line("  Cursor x: ").trim().parse().unwrap_or(cursor.0);
                cursor.1 = read_line("  Cursor y: ").trim().parse().unwrap_or(cursor.1);
                println!("  Cursor at ({:.2}, {:.2}).", cursor.0, cursor.1);
            }
            "l" => {
                if photos.is_empty() {
                    println!("  No photos yet.");
                }
                for item in photos.iter() {
                    let pos = item.screen_pos
                        .map(|(x, y)| format!("({:.2}, {:.2})", x, y))
                        .unwrap_or_else(|| "unplaced".to_string());
                    println!("    {}  {}  {}", item.id, item.handle, pos);
                }
            }
            "q" | "quit" | "exit" => {
                println!("  Goodbye.");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
    }
}

fn print_outcome(out: &Outcome, photos: &FocusSet) {
    if let Some(change) = out.change {
        println!("  {} → {}", change.from, change.to);
    }
    if let Some(Skip::SelectionUnavailable) = out.skipped {
        println!("  (pinch ignored: no photos)");
    }
    let active = out.active
        .and_then(|id| photos.get(id))
        .map(|item| format!("{} {}", item.id, item.handle))
        .unwrap_or_else(|| "none".to_string());
    println!("  Mode: {}   Active: {}", out.mode, active);
}

fn print_ops_menu() {
    println!();
    println!("  Gestures: o=open  f=fist  p=pinch  n=none  a=hand absent");
    println!("  Other:    r=release  +=add photo  c=move cursor  l=list photos  q=quit");
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
