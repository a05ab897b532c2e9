//! Re-placing template images on generated slides.

use crate::degrade::{DegradeKind, DegradeLog};
use crate::document::{DocumentModel, SlideHandle};
use crate::types::{ApplyOn, Asset};

/// Whether an asset belongs on the slide at `slide_index`.
pub fn applies_to(asset: &Asset, slide_index: usize) -> bool {
    match asset.apply_on {
        ApplyOn::All => true,
        ApplyOn::TitleOnly => slide_index == 0,
        ApplyOn::None => false,
    }
}

/// Place every applicable asset on the slide at its template geometry.
///
/// Returns the number of assets placed; failures are recorded and skipped.
pub fn place_assets<D>(
    doc: &mut D,
    slide: &SlideHandle,
    slide_index: usize,
    assets: &[Asset],
    log: &mut DegradeLog,
) -> usize
where
    D: DocumentModel + ?Sized,
{
    let mut placed = 0;
    for asset in assets.iter().filter(|a| applies_to(a, slide_index)) {
        match doc.place_image(slide, &asset.id, asset.rect()) {
            Ok(()) => placed += 1,
            Err(e) => log.record(
                Some(slide_index),
                DegradeKind::AssetFailure,
                format!("asset '{}': {}", asset.id, e),
            ),
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDeck;
    use crate::types::{RawImage, RawLayout, RawTemplateData};

    fn asset(id: &str, apply_on: ApplyOn) -> Asset {
        Asset {
            id: id.to_string(),
            left: 5,
            top: 6,
            width: 7,
            height: 8,
            apply_on,
        }
    }

    #[test]
    fn test_title_only_asset() {
        let logo = asset("logo", ApplyOn::TitleOnly);
        assert!(applies_to(&logo, 0));
        assert!(!applies_to(&logo, 1));
    }

    #[test]
    fn test_all_and_none() {
        for idx in [0, 1, 7] {
            assert!(applies_to(&asset("a", ApplyOn::All), idx));
            assert!(!applies_to(&asset("n", ApplyOn::None), idx));
        }
    }

    #[test]
    fn test_place_assets_skips_unknown_images() {
        let raw = RawTemplateData {
            layouts: vec![RawLayout {
                index: 0,
                name: "Blank".into(),
                placeholders: Vec::new(),
            }],
            images: vec![RawImage {
                id: "logo".into(),
                left: 5,
                top: 6,
                width: 7,
                height: 8,
                size_bytes: 99,
                source_slide: 0,
            }],
            ..RawTemplateData::default()
        };
        let mut deck = MemoryDeck::from_template(&raw);
        let mut log = DegradeLog::new();
        let slide = deck.instantiate(0).unwrap();

        let assets = [
            asset("logo", ApplyOn::All),
            asset("ghost", ApplyOn::All),
            asset("logo", ApplyOn::None),
        ];
        let placed = place_assets(&mut deck, &slide, 3, &assets, &mut log);
        deck.commit(slide).unwrap();

        assert_eq!(placed, 1);
        assert_eq!(log.count(DegradeKind::AssetFailure), 1);
        let images = &deck.slides()[0].images;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].rect, asset("logo", ApplyOn::All).rect());
    }
}
