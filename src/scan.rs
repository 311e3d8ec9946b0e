use card_capture::{CaptureError, VideoSource};
use card_model::{CardCandidate, GameDetails};
use card_vision::{capture_and_warp, recognize_text, OcrEngine, Recognition};
use image::RgbaImage;
use tracing::debug;

use crate::lookup::{CardLookup, LookupQuery};

/// Everything one scan produced, from pixels to an upsert-ready
/// candidate. Intermediate stages are kept so a UI can show its work.
#[derive(Debug, Clone)]
pub struct ScannedCard {
    pub image: RgbaImage,
    pub used_warp: bool,
    pub text: String,
    pub recognition: Recognition,
    pub candidate: CardCandidate,
}

/// Run the full scan flow: grab and straighten a frame, read its text,
/// guess fields, and optionally refine them against a card database.
///
/// Only `NotReady` escapes; every later stage degrades toward an empty
/// candidate the user can finish by hand.
pub fn scan_to_candidate(
    source: &mut dyn VideoSource,
    ocr: &dyn OcrEngine,
    lookup: Option<&dyn CardLookup>,
) -> Result<ScannedCard, CaptureError> {
    let outcome = capture_and_warp(source)?;
    let text = ocr.extract_text(&outcome.image);
    let recognition = recognize_text(&text);
    let mut candidate = recognition.clone().into_candidate();

    if let Some(lookup) = lookup {
        if !candidate.name.trim().is_empty() {
            let query = LookupQuery {
                name: candidate.name.clone(),
                number: candidate.number.clone(),
                expansion: String::new(),
            };
            if let Some(hit) = lookup.search(&query).into_iter().next() {
                debug!("Lookup refined scan: '{}' -> '{}'", candidate.name, hit.name);
                candidate = merge_candidates(candidate, hit);
            }
        }
    }

    Ok(ScannedCard {
        image: outcome.image,
        used_warp: outcome.used_warp,
        text,
        recognition,
        candidate,
    })
}

/// Fold a lookup hit over scanned fields. The hit wins wherever it has
/// something to say; scanned fields survive everywhere else.
fn merge_candidates(scanned: CardCandidate, hit: CardCandidate) -> CardCandidate {
    let pick = |hit: String, scanned: String| {
        if hit.trim().is_empty() {
            scanned
        } else {
            hit
        }
    };
    CardCandidate {
        name: pick(hit.name, scanned.name),
        series: pick(hit.series, scanned.series),
        expansion: pick(hit.expansion, scanned.expansion),
        number: pick(hit.number, scanned.number),
        rarity: pick(hit.rarity, scanned.rarity),
        qty: scanned.qty.max(1),
        notes: pick(hit.notes, scanned.notes),
        game: match hit.game {
            GameDetails::Unknown => scanned.game,
            known => known,
        },
        image: hit.image.or(scanned.image),
        value: if hit.value > 0.0 { hit.value } else { scanned.value },
    }
}
