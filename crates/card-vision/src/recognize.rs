use card_model::{CardCandidate, GameDetails, PokemonFields};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vocabulary that only ever appears on MTG cards.
const MTG_CUES: [&str; 8] = [
    "deckmaster",
    "instant",
    "sorcery",
    "creature",
    "artifact",
    "enchantment",
    "planeswalker",
    "mana",
];

/// Vocabulary that only ever appears on Pokemon cards.
const POKEMON_CUES: [&str; 10] = [
    "pokemon",
    "pok\u{e9}mon",
    "weakness",
    "resistance",
    "retreat",
    "hp",
    "pokedex",
    "pok\u{e9}dex",
    "trainer",
    "energy",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameGuess {
    Pokemon,
    Mtg,
    #[default]
    Unknown,
}

/// Structured fields pulled out of raw OCR text. Empty strings mean the
/// field was not found; everything stays editable downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
    pub game: GameGuess,
    pub name: String,
    pub hp: String,
    pub number: String,
}

impl Recognition {
    /// Convert to an upsert candidate. Set fields stay empty for a
    /// lookup service or the user to fill in.
    pub fn into_candidate(self) -> CardCandidate {
        let game = match self.game {
            GameGuess::Pokemon => GameDetails::Pokemon(PokemonFields {
                hp: self.hp,
                ..PokemonFields::default()
            }),
            GameGuess::Mtg => GameDetails::Mtg(Default::default()),
            GameGuess::Unknown => GameDetails::Unknown,
        };
        CardCandidate {
            name: self.name,
            number: self.number,
            qty: 1,
            game,
            ..CardCandidate::default()
        }
    }
}

/// Guess what OCR text says about a card: which game it belongs to, the
/// card name, HP, and the printed collector number.
pub fn recognize_text(text: &str) -> Recognition {
    let lowered = text.to_lowercase();
    let mtg_hits = MTG_CUES.iter().filter(|cue| lowered.contains(*cue)).count();
    let pokemon_hits = POKEMON_CUES
        .iter()
        .filter(|cue| lowered.contains(*cue))
        .count();

    // Ties go to MTG; "hp" alone is a weak cue
    let game = if pokemon_hits > mtg_hits && pokemon_hits > 0 {
        GameGuess::Pokemon
    } else if mtg_hits > 0 {
        GameGuess::Mtg
    } else {
        GameGuess::Unknown
    };

    let recognition = Recognition {
        game,
        name: guess_name(text),
        hp: find_hp(text),
        number: find_printed_number(text),
    };
    debug!(
        "Recognized game={:?} name='{}' hp='{}' number='{}'",
        recognition.game, recognition.name, recognition.hp, recognition.number
    );
    recognition
}

/// First line that reads like a card title: at least three alphabetic
/// characters and no "HP" fragment (the stat line usually OCRs first).
fn guess_name(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| {
            let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
            alpha >= 3 && !line.to_lowercase().contains("hp")
        })
        .unwrap_or_default()
        .to_string()
}

/// Digits following an "HP" marker, e.g. "HP 120". Accepts 2 to 4 digits.
fn find_hp(text: &str) -> String {
    let lowered = text.to_lowercase();
    let bytes = lowered.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = lowered[search_from..].find("hp") {
        let at = search_from + rel;
        search_from = at + 2;

        // Word boundary on the left, so "graphping" noise is skipped
        if at > 0 && bytes[at - 1].is_ascii_alphanumeric() {
            continue;
        }
        let mut i = at + 2;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let run = i - start;
        if (2..=4).contains(&run) {
            return lowered[start..i].to_string();
        }
    }
    String::new()
}

/// First "n/m" collector pair: 1-3 digits, a slash, 2-4 digits, with
/// optional spaces around the slash. Returned in normalized "n/m" form.
fn find_printed_number(text: &str) -> String {
    let bytes = text.as_bytes();
    for (at, &b) in bytes.iter().enumerate() {
        if b != b'/' {
            continue;
        }

        // Walk left over spaces, then collect the leading digit run
        let mut left_end = at;
        while left_end > 0 && bytes[left_end - 1] == b' ' {
            left_end -= 1;
        }
        let mut left_start = left_end;
        while left_start > 0 && bytes[left_start - 1].is_ascii_digit() {
            left_start -= 1;
        }
        let left_run = left_end - left_start;
        if !(1..=3).contains(&left_run) {
            continue;
        }

        // Walk right over spaces, then collect the trailing digit run
        let mut right_start = at + 1;
        while right_start < bytes.len() && bytes[right_start] == b' ' {
            right_start += 1;
        }
        let mut right_end = right_start;
        while right_end < bytes.len() && bytes[right_end].is_ascii_digit() {
            right_end += 1;
        }
        let right_run = right_end - right_start;
        if !(2..=4).contains(&right_run) {
            continue;
        }

        return format!(
            "{}/{}",
            &text[left_start..left_end],
            &text[right_start..right_end]
        );
    }
    String::new()
}
