//! Scramble generation.
//!
//! Face-turning puzzles share one rejection sampler: a face may not follow
//! itself, and three consecutive moves may not share an axis. Everything else
//! (pyraminx tips, megaminx lines, square-1 pairs) is a small custom rule
//! wrapped in [`crate::puzzle::CustomGenerator`].

use crate::puzzle::{FaceRule, PuzzleSpec};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

const FACE_MODIFIERS: [&str; 3] = ["", "'", "2"];
const CORNER_MODIFIERS: [&str; 2] = ["", "'"];
const CORNER_SCRAMBLE_LENGTH: usize = 11;

const PYRAMINX_TIPS: [&str; 4] = ["u", "l", "r", "b"];

const MEGAMINX_LINES: usize = 7;
const MEGAMINX_PAIRS_PER_LINE: usize = 5;

const SQUARE_ONE_PAIRS: usize = 13;

/// Produce a scramble using the thread-local RNG.
pub fn generate(spec: &PuzzleSpec) -> String {
    generate_with(spec, &mut rand::thread_rng())
}

/// Produce a scramble from an explicit RNG. Custom generators bring their own
/// randomness and ignore `rng`.
pub fn generate_with<R: Rng + ?Sized>(spec: &PuzzleSpec, rng: &mut R) -> String {
    match spec {
        PuzzleSpec::Custom(generator) => generator.call(),
        PuzzleSpec::FaceTurning(spec) => {
            let moves = sample_moves(spec.faces(), spec.scramble_length(), &FACE_MODIFIERS, rng);
            debug!(length = moves.len(), "generated face-turning scramble");
            moves.join(" ")
        }
    }
}

/// Axis-aware rejection sampling over `faces`.
///
/// `faces` must satisfy the diversity checked by `FaceTurningSpec::new`,
/// otherwise the loop may never accept a draw.
fn sample_moves<R: Rng + ?Sized>(
    faces: &[FaceRule],
    length: usize,
    modifiers: &[&str],
    rng: &mut R,
) -> Vec<String> {
    let mut moves = Vec::with_capacity(length);
    let mut last: Option<&FaceRule> = None;
    let mut second_last: Option<&FaceRule> = None;

    while moves.len() < length {
        let Some(rule) = faces.choose(rng) else {
            break;
        };

        if last.is_some_and(|l| l.face == rule.face) {
            continue;
        }
        if let (Some(l), Some(s)) = (last, second_last) {
            if rule.axis == l.axis && rule.axis == s.axis {
                continue;
            }
        }

        let base = rule
            .candidate_moves
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(rule.face.as_str());
        let modifier = modifiers.choose(rng).copied().unwrap_or("");
        moves.push(format!("{base}{modifier}"));

        second_last = last;
        last = Some(rule);
    }

    moves
}

fn pyraminx_faces() -> [FaceRule; 4] {
    [
        FaceRule::new("U", 0, &["U"]),
        FaceRule::new("L", 0, &["L"]),
        FaceRule::new("R", 1, &["R"]),
        FaceRule::new("B", 1, &["B"]),
    ]
}

fn skewb_faces() -> [FaceRule; 4] {
    [
        FaceRule::new("R", 0, &["R"]),
        FaceRule::new("U", 0, &["U"]),
        FaceRule::new("L", 1, &["L"]),
        FaceRule::new("B", 1, &["B"]),
    ]
}

/// 11 corner turns followed by each tip on a coin flip.
pub fn pyraminx<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut moves = sample_moves(
        &pyraminx_faces(),
        CORNER_SCRAMBLE_LENGTH,
        &CORNER_MODIFIERS,
        rng,
    );

    for tip in PYRAMINX_TIPS {
        if rng.gen_bool(0.5) {
            let modifier = CORNER_MODIFIERS.choose(rng).copied().unwrap_or("");
            moves.push(format!("{tip}{modifier}"));
        }
    }

    moves.join(" ")
}

pub fn skewb<R: Rng + ?Sized>(rng: &mut R) -> String {
    sample_moves(&skewb_faces(), CORNER_SCRAMBLE_LENGTH, &CORNER_MODIFIERS, rng).join(" ")
}

/// Seven lines of `R±± D±±` pairs, each closed by a `U` turn. Lines are
/// separated by newlines rather than spaces.
pub fn megaminx<R: Rng + ?Sized>(rng: &mut R) -> String {
    let lines: Vec<String> = (0..MEGAMINX_LINES)
        .map(|_| {
            let mut tokens = Vec::with_capacity(MEGAMINX_PAIRS_PER_LINE * 2 + 1);
            for _ in 0..MEGAMINX_PAIRS_PER_LINE {
                tokens.push(if rng.gen_bool(0.5) { "R++" } else { "R--" });
                tokens.push(if rng.gen_bool(0.5) { "D++" } else { "D--" });
            }
            tokens.push(if rng.gen_bool(0.5) { "U" } else { "U'" });
            tokens.join(" ")
        })
        .collect();

    lines.join("\n")
}

/// Thirteen `(top,bottom)` twists; `(0,0)` is redrawn.
pub fn square_one<R: Rng + ?Sized>(rng: &mut R) -> String {
    let pairs: Vec<String> = (0..SQUARE_ONE_PAIRS)
        .map(|_| loop {
            let top: i32 = rng.gen_range(-5..6);
            let bottom: i32 = rng.gen_range(-5..6);
            if top != 0 || bottom != 0 {
                break format!("({top},{bottom})");
            }
        })
        .collect();

    pairs.join(" / ")
}
