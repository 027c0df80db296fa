//! Fixed category table driving the placeholder poster's look.

use crate::foundation::core::Rgb8;

/// Theme grouping of a video, derived from the id of its containing page section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Gameplay and streaming content.
    Gaming,
    /// Product and brand commercials.
    Commercial,
    /// Music videos.
    MusicVideo,
    /// Corporate and explainer videos.
    Corporate,
    /// Weddings and live events.
    Wedding,
    /// Short-form social media edits.
    Social,
    /// Anything unrecognized or unlabeled.
    Default,
}

/// Static style entry for one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryStyle {
    /// The category this entry describes.
    pub category: Category,
    /// Section ids that select this category (lowercase).
    pub labels: &'static [&'static str],
    /// Gradient stops at offsets 0, 0.5 and 1.
    pub ramp: [Rgb8; 3],
    /// Title drawn on the placeholder when the page provides no section heading.
    pub title: &'static str,
}

static TABLE: [CategoryStyle; 7] = [
    CategoryStyle {
        category: Category::Gaming,
        labels: &["gaming"],
        ramp: [
            Rgb8::from_hex(0x0f0c29),
            Rgb8::from_hex(0x302b63),
            Rgb8::from_hex(0x24243e),
        ],
        title: "Gaming Content",
    },
    CategoryStyle {
        category: Category::Commercial,
        labels: &["commercial", "commercials"],
        ramp: [
            Rgb8::from_hex(0xf12711),
            Rgb8::from_hex(0xf5af19),
            Rgb8::from_hex(0xe65c00),
        ],
        title: "Commercials",
    },
    CategoryStyle {
        category: Category::MusicVideo,
        labels: &["music", "music-videos"],
        ramp: [
            Rgb8::from_hex(0xfc466b),
            Rgb8::from_hex(0x3f5efb),
            Rgb8::from_hex(0x1a1a2e),
        ],
        title: "Music Videos",
    },
    CategoryStyle {
        category: Category::Corporate,
        labels: &["corporate"],
        ramp: [
            Rgb8::from_hex(0x0f2027),
            Rgb8::from_hex(0x203a43),
            Rgb8::from_hex(0x2c5364),
        ],
        title: "Corporate Videos",
    },
    CategoryStyle {
        category: Category::Wedding,
        labels: &["wedding", "weddings", "events"],
        ramp: [
            Rgb8::from_hex(0xee9ca7),
            Rgb8::from_hex(0xc79081),
            Rgb8::from_hex(0x8e5e6e),
        ],
        title: "Weddings & Events",
    },
    CategoryStyle {
        category: Category::Social,
        labels: &["social", "social-media"],
        ramp: [
            Rgb8::from_hex(0x00c6ff),
            Rgb8::from_hex(0x0072ff),
            Rgb8::from_hex(0x003c8f),
        ],
        title: "Social Media",
    },
    CategoryStyle {
        category: Category::Default,
        labels: &[],
        ramp: [
            Rgb8::from_hex(0x667eea),
            Rgb8::from_hex(0x764ba2),
            Rgb8::from_hex(0x4a2c6d),
        ],
        title: "Featured Video",
    },
];

impl Category {
    /// Every category, `Default` last.
    pub const ALL: [Category; 7] = [
        Category::Gaming,
        Category::Commercial,
        Category::MusicVideo,
        Category::Corporate,
        Category::Wedding,
        Category::Social,
        Category::Default,
    ];

    /// Resolve a section label. Unknown or absent labels resolve to [`Category::Default`].
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Category::Default;
        };
        let label = label.trim().to_ascii_lowercase();
        TABLE
            .iter()
            .find(|s| s.labels.contains(&label.as_str()))
            .map(|s| s.category)
            .unwrap_or(Category::Default)
    }

    /// The static style entry for this category.
    pub fn style(self) -> &'static CategoryStyle {
        // TABLE is ordered like `Category::ALL`.
        &TABLE[self as usize]
    }

    /// Gradient stops for the placeholder.
    pub fn ramp(self) -> [Rgb8; 3] {
        self.style().ramp
    }

    /// Title used when the page has no heading for the section.
    pub fn default_title(self) -> &'static str {
        self.style().title
    }

    /// Title to draw: the section heading when present and non-blank, else the default title.
    pub fn display_title(self, heading: Option<&str>) -> String {
        match heading.map(str::trim) {
            Some(h) if !h.is_empty() => h.to_owned(),
            _ => self.default_title().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_enum() {
        for (idx, c) in Category::ALL.iter().enumerate() {
            assert_eq!(TABLE[idx].category, *c);
            assert_eq!(c.style().category, *c);
        }
    }

    #[test]
    fn labels_resolve_case_insensitively() {
        assert_eq!(Category::from_label(Some("gaming")), Category::Gaming);
        assert_eq!(Category::from_label(Some("  Gaming ")), Category::Gaming);
        assert_eq!(
            Category::from_label(Some("MUSIC-VIDEOS")),
            Category::MusicVideo
        );
        assert_eq!(Category::from_label(Some("events")), Category::Wedding);
    }

    #[test]
    fn unknown_and_absent_labels_use_purple_default() {
        assert_eq!(Category::from_label(None), Category::Default);
        assert_eq!(Category::from_label(Some("cooking")), Category::Default);
        assert_eq!(Category::from_label(Some("")), Category::Default);
        assert_eq!(Category::Default.ramp()[0], Rgb8::from_hex(0x667eea));
    }

    #[test]
    fn display_title_prefers_heading() {
        assert_eq!(
            Category::Gaming.display_title(Some("Gaming Highlights")),
            "Gaming Highlights"
        );
        assert_eq!(Category::Gaming.display_title(Some("   ")), "Gaming Content");
        assert_eq!(Category::Default.display_title(None), "Featured Video");
    }

    #[test]
    fn every_named_category_has_a_label() {
        for c in Category::ALL {
            if c != Category::Default {
                assert!(!c.style().labels.is_empty(), "{c:?} has no labels");
            }
        }
    }
}
