//! Opening repertoire

use serde::{Deserialize, Serialize};
use shakmaty::{san::San, Chess, Position};

use crate::error::{Error, Result};
use crate::notation::strip_annotations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn xp_multiplier(&self) -> f64 {
        match self {
            Difficulty::Beginner => 1.0,
            Difficulty::Intermediate => 1.5,
            Difficulty::Advanced => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub name: String,
    pub moves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Both sides' moves, white first, in SAN.
    pub main_line: Vec<String>,
    pub key_ideas: Vec<String>,
    pub variations: Vec<Variation>,
}

impl Opening {
    /// Plays every line of the opening through shakmaty from the initial
    /// position.
    pub fn validate(&self) -> Result<()> {
        validate_line(&self.id, &self.main_line)?;
        for variation in &self.variations {
            validate_line(&self.id, &variation.moves)?;
        }
        Ok(())
    }
}

fn validate_line(opening: &str, moves: &[String]) -> Result<()> {
    let mut position = Chess::default();

    for (ply, text) in moves.iter().enumerate() {
        let invalid = || Error::InvalidLine {
            opening: opening.to_string(),
            ply,
            san: text.clone(),
        };

        let san: San = strip_annotations(text).parse().map_err(|_| invalid())?;
        let mv = san.to_move(&position).map_err(|_| invalid())?;
        position = position.play(mv).map_err(|_| invalid())?;
    }

    Ok(())
}

/// The fixed table of openings offered for training.
#[derive(Debug, Clone, Default)]
pub struct Repertoire {
    openings: Vec<Opening>,
}

impl Repertoire {
    pub fn new(openings: Vec<Opening>) -> Self {
        Self { openings }
    }

    pub fn get(&self, id: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opening> {
        self.openings.iter()
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Opening> {
        self.openings.get(index)
    }

    pub fn validate(&self) -> Result<()> {
        self.openings.iter().try_for_each(Opening::validate)
    }

    pub fn standard() -> Self {
        Self::new(vec![
            opening(
                "italian-game",
                "Italian Game",
                "One of the oldest recorded openings, focusing on quick development and control of the center.",
                Difficulty::Beginner,
                &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "c3", "d6", "d4"],
                &[
                    "Control the center with pawns",
                    "Develop knights before bishops",
                    "Castle kingside early",
                    "Aim at the weak f7 square",
                    "Build a pawn center with c3 and d4",
                ],
                &[
                    ("Giuoco Piano", &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "c3"]),
                    ("Two Knights Defense", &["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6"]),
                ],
            ),
            opening(
                "sicilian-defense",
                "Sicilian Defense",
                "The most popular and aggressive answer to 1.e4, leading to asymmetrical positions.",
                Difficulty::Intermediate,
                &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3"],
                &[
                    "Fight for the center with c5 instead of e5",
                    "Accept asymmetrical pawn structures",
                    "Counterattack on the queenside",
                ],
                &[
                    (
                        "Najdorf Variation",
                        &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "a6"],
                    ),
                    (
                        "Dragon Variation",
                        &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "g6"],
                    ),
                ],
            ),
            opening(
                "french-defense",
                "French Defense",
                "A solid defense built on a pawn chain, at the cost of a passive c8 bishop.",
                Difficulty::Intermediate,
                &["e4", "e6", "d4", "d5", "Nc3", "Nf6", "Bg5"],
                &[
                    "Set up the e6-d5 pawn chain",
                    "Challenge White's center at once",
                    "Break with ...c5 or ...f6",
                ],
                &[
                    ("Winawer Variation", &["e4", "e6", "d4", "d5", "Nc3", "Bb4"]),
                    ("Tarrasch Variation", &["e4", "e6", "d4", "d5", "Nd2"]),
                ],
            ),
            opening(
                "queens-gambit",
                "Queen's Gambit",
                "White offers the c-pawn to gain central control and faster development.",
                Difficulty::Intermediate,
                &["d4", "d5", "c4", "e6", "Nc3", "Nf6", "Bg5"],
                &[
                    "Use c4 to challenge Black's center",
                    "Develop with Nc3, Nf3 and Bg5",
                    "Keep central control",
                ],
                &[
                    ("Queen's Gambit Declined", &["d4", "d5", "c4", "e6", "Nc3", "Nf6"]),
                    ("Queen's Gambit Accepted", &["d4", "d5", "c4", "dxc4"]),
                ],
            ),
            opening(
                "ruy-lopez",
                "Ruy López",
                "The Spanish Opening, putting early pressure on the e5 pawn.",
                Difficulty::Advanced,
                &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O"],
                &[
                    "Pressure the defender of e5",
                    "Keep the light-squared bishop flexible",
                    "Castle kingside quickly",
                ],
                &[
                    ("Berlin Defense", &["e4", "e5", "Nf3", "Nc6", "Bb5", "Nf6"]),
                    (
                        "Marshall Attack",
                        &[
                            "e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O", "Be7",
                            "Re1", "b5", "Bb3", "O-O", "c3", "d5",
                        ],
                    ),
                ],
            ),
            opening(
                "caro-kann-defense",
                "Caro-Kann Defense",
                "A solid positional defense to 1.e4 that supports d5 without locking in the c8 bishop.",
                Difficulty::Beginner,
                &["e4", "c6", "d4", "d5", "Nc3", "Nf6", "Bg5"],
                &[
                    "Support d5 with c6",
                    "Keep the light-squared bishop free",
                    "Aim for a sound pawn structure",
                ],
                &[
                    (
                        "Classical Variation",
                        &["e4", "c6", "d4", "d5", "Nc3", "dxe4", "Nxe4", "Bf5"],
                    ),
                    ("Advance Variation", &["e4", "c6", "d4", "d5", "e5", "Bf5"]),
                ],
            ),
            opening(
                "english-opening",
                "English Opening",
                "A flexible start with 1.c4 that controls the center from the flank.",
                Difficulty::Intermediate,
                &["c4", "e5", "Nc3", "Nf6", "Nf3", "Nc6", "g3"],
                &[
                    "Control the center from the wing",
                    "Fianchetto the kingside bishop",
                    "Delay committing the d-pawn",
                ],
                &[
                    ("Indian Setup", &["c4", "Nf6", "Nc3", "g6", "g3", "Bg7", "Bg2"]),
                    ("Symmetrical Defense", &["c4", "c5", "Nc3", "Nc6"]),
                ],
            ),
            opening(
                "scandinavian-defense",
                "Scandinavian Defense",
                "An immediate strike at e4 that brings the black queen out early.",
                Difficulty::Intermediate,
                &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5", "Nf3", "Nf6", "Bc4"],
                &[
                    "Challenge the center on move one",
                    "Accept an early queen sortie",
                    "Rebuild with Nf6, Bf5 and c6",
                ],
                &[
                    ("Main Line", &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"]),
                    ("Portuguese Variation", &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qd8"]),
                ],
            ),
            opening(
                "kings-indian-attack",
                "King's Indian Attack",
                "A flexible system with Nf3, g3 and a kingside fianchetto.",
                Difficulty::Intermediate,
                &["Nf3", "d5", "d3", "Nf6", "c4", "e6", "g3", "Be7", "Bg2"],
                &[
                    "Control the center with pieces",
                    "Stay flexible about pawn breaks",
                    "Use the g2 bishop for long-term pressure",
                ],
                &[
                    ("Immediate c4", &["Nf3", "d5", "c4", "Nf6", "g3", "e6", "d3"]),
                    ("Flexible Setup", &["Nf3", "c5", "g3", "Nf6", "Bg2", "d6", "d4"]),
                ],
            ),
            opening(
                "scotch-game",
                "Scotch Game",
                "An early d4 that opens the center and leads to tactical play.",
                Difficulty::Intermediate,
                &["e4", "e5", "Nf3", "Nc6", "d4", "exd4", "Nxd4", "Nf6", "Nc3", "Bb4", "Nxc6"],
                &[
                    "Open the center early with d4",
                    "Recapture on d4 with the knight",
                    "Develop quickly",
                ],
                &[
                    (
                        "Scotch Four Knights",
                        &["e4", "e5", "Nf3", "Nc6", "d4", "exd4", "Nxd4", "Nf6"],
                    ),
                    ("Scotch Gambit", &["e4", "e5", "Nf3", "Nc6", "d4", "exd4", "Bc4"]),
                ],
            ),
        ])
    }
}

fn opening(
    id: &str,
    name: &str,
    description: &str,
    difficulty: Difficulty,
    main_line: &[&str],
    key_ideas: &[&str],
    variations: &[(&str, &[&str])],
) -> Opening {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Opening {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        difficulty,
        main_line: owned(main_line),
        key_ideas: owned(key_ideas),
        variations: variations
            .iter()
            .map(|(name, moves)| Variation {
                name: name.to_string(),
                moves: owned(moves),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Color};
    use crate::notation::algebraic_to_move;
    use crate::notation::apply_move;
    use shakmaty::{fen::Fen, EnPassantMode};

    #[test]
    fn test_standard_repertoire_is_legal() {
        let repertoire = Repertoire::standard();
        assert_eq!(repertoire.len(), 10);
        repertoire.validate().unwrap();
    }

    #[test]
    fn test_lookup_by_id() {
        let repertoire = Repertoire::standard();
        let ruy = repertoire.get("ruy-lopez").unwrap();
        assert_eq!(ruy.difficulty, Difficulty::Advanced);
        assert!(repertoire.get("bongcloud").is_none());
    }

    #[test]
    fn test_validate_reports_first_illegal_ply() {
        let bad = opening("bad", "Bad", "", Difficulty::Beginner, &["e4", "e5", "Ke3"], &[], &[]);
        match bad.validate() {
            Err(Error::InvalidLine { opening, ply, san }) => {
                assert_eq!(opening, "bad");
                assert_eq!(ply, 2);
                assert_eq!(san, "Ke3");
            }
            other => panic!("expected InvalidLine, got {:?}", other),
        }
    }

    #[test]
    fn test_codec_agrees_with_shakmaty_on_every_line() {
        for opening in Repertoire::standard().iter() {
            let lines = std::iter::once(&opening.main_line)
                .chain(opening.variations.iter().map(|v| &v.moves));

            for line in lines {
                let mut board = Board::initial();
                let mut position = Chess::default();
                let mut side = Color::White;

                for text in line {
                    let mv = algebraic_to_move(text, &board, side)
                        .unwrap_or_else(|| panic!("{}: cannot resolve {}", opening.id, text));
                    board = apply_move(&board, &mv);

                    let san: San = text.parse().unwrap();
                    let reference = san.to_move(&position).unwrap();
                    position = position.play(reference).unwrap();

                    let fen = Fen::from_position(&position, EnPassantMode::Legal).to_string();
                    let placement = fen.split(' ').next().unwrap();
                    assert_eq!(board.to_fen_placement(), placement, "{} after {}", opening.id, text);

                    side = side.opposite();
                }
            }
        }
    }
}
