use serde::Serialize;

use crate::models::RecommendationItem;

/// Icon shown for platforms outside the known vocabulary
pub const DEFAULT_PLATFORM_ICON: &str = "https://placehold.co/32x32/e2e8f0/64748b?text=?";

const PLATFORM_ICONS: [(&str, &str); 12] = [
    ("Netflix", "https://img.icons8.com/color/48/netflix.png"),
    ("Amazon Prime Video", "https://img.icons8.com/color/48/amazon-prime-video.png"),
    ("Disney+", "https://img.icons8.com/color/48/disney-plus.png"),
    ("Hulu", "https://img.icons8.com/color/48/hulu.png"),
    ("HBO Max", "https://img.icons8.com/color/48/hbo-max.png"),
    ("Max", "https://img.icons8.com/color/48/hbo-max.png"),
    ("Apple TV+", "https://img.icons8.com/color/48/apple-tv.png"),
    ("Peacock", "https://img.icons8.com/color/48/peacock-tv.png"),
    ("Paramount+", "https://img.icons8.com/fluency/48/paramount-plus.png"),
    ("Crunchyroll", "https://img.icons8.com/color/48/crunchyroll.png"),
    ("Showtime", "https://img.icons8.com/color/48/showtime.png"),
    ("Starz", "https://img.icons8.com/color/48/starz.png"),
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformBadge {
    pub name: String,
    pub icon_url: String,
}

/// Colors derived from the title so a card looks the same on every render
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardPalette {
    pub background: String,
    pub primary_glow: String,
    pub secondary_glow: String,
}

/// Render-ready view of one recommendation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Card {
    pub title: String,
    pub year: Option<i32>,
    pub summary: String,
    pub rating_label: String,
    pub platforms: Vec<PlatformBadge>,
    pub palette: CardPalette,
}

impl From<&RecommendationItem> for Card {
    fn from(item: &RecommendationItem) -> Self {
        Self {
            title: item.title.clone(),
            year: item.year,
            summary: item.summary.clone(),
            rating_label: rating_label(item.rating),
            platforms: item
                .streaming_platforms
                .iter()
                .map(|name| platform_badge(name))
                .collect(),
            palette: CardPalette::for_title(&item.title),
        }
    }
}

impl CardPalette {
    pub fn for_title(title: &str) -> Self {
        Self {
            background: title_hsl(title, 50, 20, 0),
            primary_glow: title_hsl(title, 70, 40, 0),
            secondary_glow: title_hsl(title, 70, 40, 60),
        }
    }
}

/// Every known platform with its icon
pub fn known_platforms() -> Vec<PlatformBadge> {
    PLATFORM_ICONS
        .iter()
        .map(|(name, icon)| PlatformBadge {
            name: name.to_string(),
            icon_url: icon.to_string(),
        })
        .collect()
}

pub fn platform_icon(name: &str) -> &'static str {
    PLATFORM_ICONS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_PLATFORM_ICON)
}

fn platform_badge(name: &str) -> PlatformBadge {
    PlatformBadge {
        name: name.to_string(),
        icon_url: platform_icon(name).to_string(),
    }
}

pub fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(rating) if rating.is_finite() => format!("{:.1}", rating),
        _ => "N/A".to_string(),
    }
}

/// 32-bit string hash over UTF-16 code units (`unit + (hash << 5) - hash`)
///
/// The shift operates on the 32-bit truncation while the subtraction keeps
/// the full value, so the accumulator is 64-bit.
fn title_hash(title: &str) -> i64 {
    title.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32) << 5);
        i64::from(unit) + shifted - hash
    })
}

/// CSS `hsl()` color whose hue is derived from `title`
///
/// Hues keep the sign of the hash; CSS wraps negative hues.
pub fn title_hsl(title: &str, saturation: u8, lightness: u8, offset: i64) -> String {
    let hue = (title_hash(title) + offset) % 360;
    format!("hsl({}, {}%, {}%)", hue, saturation, lightness)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_platform_icons() {
        assert_eq!(platform_icon("Netflix"), "https://img.icons8.com/color/48/netflix.png");
        assert_eq!(platform_icon("Max"), platform_icon("HBO Max"));
        assert_eq!(platform_icon("Tubi"), DEFAULT_PLATFORM_ICON);
        assert_eq!(known_platforms().len(), 12);
    }

    #[test]
    fn test_rating_label() {
        assert_eq!(rating_label(Some(8.44)), "8.4");
        assert_eq!(rating_label(Some(6.96)), "7.0");
        assert_eq!(rating_label(Some(0.0)), "0.0");
        assert_eq!(rating_label(None), "N/A");
    }

    #[test]
    fn test_title_hash_matches_reference_values() {
        assert_eq!(title_hash(""), 0);
        // 'A' = 65
        assert_eq!(title_hash("A"), 65);
        // 66 + (65 << 5) - 65 = 2081
        assert_eq!(title_hash("AB"), 2081);
    }

    #[test]
    fn test_palette_is_stable_and_offset() {
        assert_eq!(title_hsl("AB", 50, 20, 0), "hsl(281, 50%, 20%)");
        assert_eq!(title_hsl("AB", 70, 40, 60), "hsl(341, 70%, 40%)");
        assert_eq!(CardPalette::for_title("Dune"), CardPalette::for_title("Dune"));
    }

    #[test]
    fn test_card_from_item() {
        let item = RecommendationItem {
            title: "Andor".to_string(),
            year: Some(2022),
            summary: "A rebel is made.".to_string(),
            rating: Some(8.4),
            streaming_platforms: vec!["Disney+".to_string(), "Nebula".to_string()],
        };

        let card = Card::from(&item);

        assert_eq!(card.rating_label, "8.4");
        assert_eq!(card.platforms.len(), 2);
        assert_eq!(card.platforms[0].icon_url, "https://img.icons8.com/color/48/disney-plus.png");
        assert_eq!(card.platforms[1].icon_url, DEFAULT_PLATFORM_ICON);
    }
}
