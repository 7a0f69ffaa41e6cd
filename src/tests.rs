use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use crate::roi::{RoiRect, RoiSelector};

/// Replays scripted drag gestures against a selector and compares the
/// committed rect with the expected outcome. Run with `--features tests`.
pub fn main_tests() -> Result<()> {
    struct Gesture {
        label: &'static str,
        anchor: (f64, f64),
        moves: &'static [(f64, f64)],
        release: (f64, f64),
        expected: Option<RoiRect>,
    }

    let gestures = [
        Gesture {
            label: "simple down-right drag",
            anchor: (10.5, 20.5),
            moves: &[(50., 60.), (100.2, 80.9)],
            release: (100.2, 80.9),
            expected: Some(RoiRect::new(10., 20., 100., 80.)),
        },
        Gesture {
            label: "reversed drag normalizes",
            anchor: (300., 240.),
            moves: &[(200., 100.), (50., 40.)],
            release: (50., 40.),
            expected: Some(RoiRect::new(50., 40., 300., 240.)),
        },
        Gesture {
            label: "overshoot clamps to canvas",
            anchor: (600., 400.),
            moves: &[(900., 700.)],
            release: (900., 700.),
            expected: Some(RoiRect::new(600., 400., 640., 480.)),
        },
        Gesture {
            label: "click without movement discards",
            anchor: (100., 100.),
            moves: &[],
            release: (100., 100.),
            expected: None,
        },
        Gesture {
            label: "horizontal line discards",
            anchor: (10., 50.),
            moves: &[(200., 50.)],
            release: (200., 50.4),
            expected: None,
        },
        Gesture {
            label: "negative coordinates clamp to origin",
            anchor: (-20., -30.),
            moves: &[(120., 90.)],
            release: (120., 90.),
            expected: Some(RoiRect::new(0., 0., 120., 90.)),
        },
    ];

    let mut passed = 0;
    let mut failed = 0;

    for g in gestures.iter() {
        let mut selector = RoiSelector::new((640., 480.));

        selector.begin_drag(g.anchor);
        for m in g.moves {
            selector.update_drag(*m);
        }
        selector.end_drag(g.release);

        if selector.rect() == g.expected {
            debug!("ok: {}", g.label);
            passed += 1;
        } else {
            error!(
                "FAIL: {}: got {:?}, expected {:?}",
                g.label,
                selector.rect(),
                g.expected
            );
            failed += 1;
        }
    }

    info!("{} passed, {} failed", passed, failed);

    ensure!(failed == 0, "{} gesture checks failed", failed);

    Ok(())
}
