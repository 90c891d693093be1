use crate::error::ScrambleError;
use crate::scramble;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// One twist as it is printed in a scramble. Never parsed.
pub type MoveToken = String;

/// Groups parallel faces (R and L share an axis).
pub type AxisId = u8;

/// A face a scramble may turn, with the base tokens it can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRule {
    pub face: String,
    pub axis: AxisId,
    pub candidate_moves: Vec<MoveToken>,
}

impl FaceRule {
    pub fn new(face: &str, axis: AxisId, candidate_moves: &[&str]) -> Self {
        Self {
            face: face.to_string(),
            axis,
            candidate_moves: candidate_moves.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// A validated face-turning vocabulary.
///
/// Construction checks the face/axis diversity that the rejection sampler in
/// [`scramble::generate`] relies on to terminate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceTurningSpec {
    faces: Vec<FaceRule>,
    scramble_length: usize,
}

impl FaceTurningSpec {
    pub fn new(faces: Vec<FaceRule>, scramble_length: usize) -> Result<Self, ScrambleError> {
        validate_faces(&faces, scramble_length)?;
        Ok(Self {
            faces,
            scramble_length,
        })
    }

    /// Built-in vocabularies, covered by `builtin_specs_are_valid`.
    fn builtin(faces: Vec<FaceRule>, scramble_length: usize) -> Self {
        debug_assert!(validate_faces(&faces, scramble_length).is_ok());
        Self {
            faces,
            scramble_length,
        }
    }

    pub fn faces(&self) -> &[FaceRule] {
        &self.faces
    }

    pub fn scramble_length(&self) -> usize {
        self.scramble_length
    }
}

pub(crate) fn validate_faces(faces: &[FaceRule], scramble_length: usize) -> Result<(), ScrambleError> {
    if faces.is_empty() {
        return Err(ScrambleError::NoFaces);
    }

    let mut axis_of: HashMap<&str, AxisId> = HashMap::new();
    for rule in faces {
        if rule.candidate_moves.is_empty() {
            return Err(ScrambleError::NoCandidateMoves {
                face: rule.face.clone(),
            });
        }
        match axis_of.get(rule.face.as_str()) {
            Some(axis) if *axis != rule.axis => {
                return Err(ScrambleError::InconsistentAxis {
                    face: rule.face.clone(),
                })
            }
            _ => {
                axis_of.insert(&rule.face, rule.axis);
            }
        }
    }

    if scramble_length == 0 {
        return Ok(());
    }

    if axis_of.len() < 3 {
        return Err(ScrambleError::TooFewFaces {
            found: axis_of.len(),
        });
    }

    let axes: HashSet<AxisId> = axis_of.values().copied().collect();
    if axes.len() < 2 {
        return Err(ScrambleError::TooFewAxes { found: axes.len() });
    }

    Ok(())
}

/// Scramble rule for puzzles that don't fit a uniform face/modifier draw.
#[derive(Clone)]
pub struct CustomGenerator(Arc<dyn Fn() -> String + Send + Sync>);

impl CustomGenerator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for CustomGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomGenerator(..)")
    }
}

/// How to scramble one puzzle
#[derive(Debug, Clone)]
pub enum PuzzleSpec {
    FaceTurning(FaceTurningSpec),
    Custom(CustomGenerator),
}

impl From<FaceTurningSpec> for PuzzleSpec {
    fn from(spec: FaceTurningSpec) -> Self {
        PuzzleSpec::FaceTurning(spec)
    }
}

/// Puzzles with a built-in scramble rule
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum PuzzleKind {
    #[value(name = "2x2")]
    #[serde(rename = "2x2")]
    #[strum(serialize = "2x2")]
    TwoByTwo,
    #[value(name = "3x3")]
    #[serde(rename = "3x3")]
    #[strum(serialize = "3x3")]
    #[default]
    ThreeByThree,
    #[value(name = "4x4")]
    #[serde(rename = "4x4")]
    #[strum(serialize = "4x4")]
    FourByFour,
    #[value(name = "5x5")]
    #[serde(rename = "5x5")]
    #[strum(serialize = "5x5")]
    FiveByFive,
    #[value(name = "6x6")]
    #[serde(rename = "6x6")]
    #[strum(serialize = "6x6")]
    SixBySix,
    #[value(name = "7x7")]
    #[serde(rename = "7x7")]
    #[strum(serialize = "7x7")]
    SevenBySeven,
    #[value(name = "pyraminx")]
    #[serde(rename = "pyraminx")]
    #[strum(serialize = "pyraminx")]
    Pyraminx,
    #[value(name = "skewb")]
    #[serde(rename = "skewb")]
    #[strum(serialize = "skewb")]
    Skewb,
    #[value(name = "megaminx")]
    #[serde(rename = "megaminx")]
    #[strum(serialize = "megaminx")]
    Megaminx,
    #[value(name = "sq1")]
    #[serde(rename = "sq1")]
    #[strum(serialize = "sq1")]
    SquareOne,
}

impl PuzzleKind {
    pub fn spec(&self) -> PuzzleSpec {
        match self {
            PuzzleKind::TwoByTwo => FaceTurningSpec::builtin(
                vec![
                    FaceRule::new("R", 0, &["R"]),
                    FaceRule::new("U", 1, &["U"]),
                    FaceRule::new("F", 2, &["F"]),
                ],
                9,
            )
            .into(),
            PuzzleKind::ThreeByThree => cube_spec(&[], 20),
            PuzzleKind::FourByFour => cube_spec(&["w"], 40),
            PuzzleKind::FiveByFive => cube_spec(&["w"], 60),
            PuzzleKind::SixBySix => cube_spec(&["w", "3w"], 80),
            PuzzleKind::SevenBySeven => cube_spec(&["w", "3w"], 100),
            PuzzleKind::Pyraminx => {
                PuzzleSpec::Custom(CustomGenerator::new(|| scramble::pyraminx(&mut rand::thread_rng())))
            }
            PuzzleKind::Skewb => {
                PuzzleSpec::Custom(CustomGenerator::new(|| scramble::skewb(&mut rand::thread_rng())))
            }
            PuzzleKind::Megaminx => {
                PuzzleSpec::Custom(CustomGenerator::new(|| scramble::megaminx(&mut rand::thread_rng())))
            }
            PuzzleKind::SquareOne => {
                PuzzleSpec::Custom(CustomGenerator::new(|| scramble::square_one(&mut rand::thread_rng())))
            }
        }
    }

    /// Next puzzle in catalogue order, wrapping around
    pub fn next(&self) -> PuzzleKind {
        let all = PuzzleKind::value_variants();
        let idx = all.iter().position(|k| k == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

/// Six-face cube vocabulary. Wide turns are written `Rw`, `3Rw` and so on.
fn cube_spec(wide_suffixes: &[&str], scramble_length: usize) -> PuzzleSpec {
    let faces = [("R", 0), ("L", 0), ("U", 1), ("D", 1), ("F", 2), ("B", 2)]
        .iter()
        .map(|&(face, axis)| {
            let mut moves = vec![face.to_string()];
            for suffix in wide_suffixes {
                moves.push(match suffix.strip_suffix('w') {
                    Some(layers) if !layers.is_empty() => format!("{layers}{face}w"),
                    _ => format!("{face}{suffix}"),
                });
            }
            FaceRule {
                face: face.to_string(),
                axis,
                candidate_moves: moves,
            }
        })
        .collect();

    FaceTurningSpec::builtin(faces, scramble_length).into()
}
