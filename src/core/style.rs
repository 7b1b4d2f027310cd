use once_cell::sync::Lazy;

/// A named studio backdrop/lighting preset.
///
/// The suffix is appended verbatim to the base generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePreset {
    pub id: &'static str,
    pub display_name: &'static str,
    pub prompt_suffix: &'static str,
}

/// A named output-shape token passed to the model for the generate flow only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    pub id: &'static str,
    pub display_name: &'static str,
    pub value: &'static str,
}

/// Static style catalog, validated once at first access.
pub static STYLE_PRESETS: Lazy<Vec<StylePreset>> = Lazy::new(|| {
    let presets = vec![
        StylePreset {
            id: "neutral",
            display_name: "Neutral Studio",
            prompt_suffix: "For the background, use a neutral gray or off-white textured canvas.",
        },
        StylePreset {
            id: "gradient",
            display_name: "Luxury Gradient",
            prompt_suffix: "For the background, use a subtle, luxurious dark-to-light gradient, like deep blue to black.",
        },
        StylePreset {
            id: "monochrome",
            display_name: "Monochrome",
            prompt_suffix: "Convert the entire image to a high-contrast, professional black and white portrait. Pay close attention to tones and shadows. For the background, use a solid dark gray.",
        },
        StylePreset {
            id: "lifestyle",
            display_name: "Lifestyle",
            prompt_suffix: "Instead of a studio background, create a slightly out-of-focus, high-end indoor environment that looks natural and aspirational, like a modern apartment or an upscale cafe. The lighting should feel natural but perfected.",
        },
    ];
    validate_presets(&presets);
    presets
});

/// Static aspect-ratio catalog.
pub static ASPECT_RATIOS: Lazy<Vec<AspectRatio>> = Lazy::new(|| {
    vec![
        AspectRatio {
            id: "square",
            display_name: "Square",
            value: "1:1",
        },
        AspectRatio {
            id: "portrait",
            display_name: "Portrait",
            value: "3:4",
        },
        AspectRatio {
            id: "classic",
            display_name: "Classic",
            value: "4:3",
        },
        AspectRatio {
            id: "story",
            display_name: "Story",
            value: "9:16",
        },
        AspectRatio {
            id: "widescreen",
            display_name: "Widescreen",
            value: "16:9",
        },
    ]
});

fn validate_presets(presets: &[StylePreset]) {
    let mut seen = Vec::new();
    for preset in presets {
        assert!(!preset.id.is_empty(), "style preset with empty id");
        assert!(
            !preset.prompt_suffix.is_empty(),
            "style preset '{}' has an empty prompt suffix",
            preset.id
        );
        assert!(
            !seen.contains(&preset.id),
            "duplicate style preset id '{}'",
            preset.id
        );
        seen.push(preset.id);
    }
}

/// Default preset: first catalog entry.
pub fn default_style() -> StylePreset {
    STYLE_PRESETS[0].clone()
}

/// Default aspect ratio: first catalog entry.
pub fn default_aspect_ratio() -> AspectRatio {
    ASPECT_RATIOS[0].clone()
}

/// Look up a preset by id.
pub fn style_by_id(id: &str) -> Option<StylePreset> {
    STYLE_PRESETS.iter().find(|p| p.id == id).cloned()
}

/// Look up an aspect ratio by id or by ratio token ("16:9").
pub fn aspect_ratio_by_id(id: &str) -> Option<AspectRatio> {
    ASPECT_RATIOS
        .iter()
        .find(|r| r.id == id || r.value == id)
        .cloned()
}

/// All style ids, for config validation and help text.
pub fn style_ids() -> Vec<&'static str> {
    STYLE_PRESETS.iter().map(|p| p.id).collect()
}

/// All aspect-ratio ids, for config validation and help text.
pub fn aspect_ratio_ids() -> Vec<&'static str> {
    ASPECT_RATIOS.iter().map(|r| r.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_valid() {
        assert_eq!(STYLE_PRESETS.len(), 4);
        assert_eq!(ASPECT_RATIOS.len(), 5);
    }

    #[test]
    fn defaults_are_first_entries() {
        assert_eq!(default_style().id, "neutral");
        assert_eq!(default_aspect_ratio().value, "1:1");
    }

    #[test]
    fn lookup_by_id() {
        let mono = style_by_id("monochrome").unwrap();
        assert_eq!(mono.display_name, "Monochrome");
        assert!(style_by_id("sepia").is_none());
    }

    #[test]
    fn ratio_lookup_accepts_token() {
        assert_eq!(aspect_ratio_by_id("widescreen").unwrap().value, "16:9");
        assert_eq!(aspect_ratio_by_id("16:9").unwrap().id, "widescreen");
        assert!(aspect_ratio_by_id("2:1").is_none());
    }
}
