//! Prompt assembly for the three generation flows.
//!
//! Everything here is pure and deterministic. The model itself is not, so
//! these builders are the only place the exact request text can be pinned
//! down by tests.

use crate::core::style::StylePreset;
use crate::media::ImageAsset;

/// Base instruction for the style-generation flow, an ordered checklist of
/// enhancement steps. Versioned: changing this text changes the product.
pub const BASE_PROMPT: &str = "Act as an AI image enhancement specialist. Your goal is to transform this casual, low-quality personal photo into a high-resolution, professional studio portrait. Follow these steps precisely:
1. Analyze the input image for resolution, lighting, color balance, noise, and background.
2. Upscale and sharpen the image, applying super-resolution to recover details.
3. Simulate soft, diffused studio lighting. Balance highlights and reduce harsh shadows.
4. Apply professional color grading for vibrant, natural skin tones.
5. Remove the existing background and replace it with a clean, professional studio backdrop as specified.
6. Retouch skin naturally: smooth texture, enhance eyes, remove blemishes, and adjust contrast without over-editing.
7. Enhance the quality and texture of clothing and accessories.
8. Ensure the final output is a high-resolution, portrait-oriented, studio-grade image.
Constraint: Preserve the person's identity and proportions. Avoid artificial or unrealistic results. The final aesthetic should be comparable to high-end fashion or editorial photography.";

/// Separator between the base instruction and a style's suffix.
pub const STYLE_DELIMITER: &str = "\n\nStyle-specific instruction: ";

const CLEAN_UP_PROMPT: &str = "Act as a professional photo retoucher. Enhance this photo while obeying these hard constraints:
- Do not alter the person's identity, facial features, or proportions.
- Do not change or replace the background.
- Do not add, remove, or reposition any objects.
Apply only the following enhancements:
1. Improve lighting and contrast.
2. Balance colors and saturation for natural skin tones.
3. Increase sharpness and recover fine detail.
4. Reduce noise and compression artifacts.
The result must look like a cleaner, better-lit version of the exact same photograph.";

const EDIT_PREAMBLE: &str = "You are an expert AI photo editor. Edit the following image based on my instructions. The key is to preserve the person's identity and facial features while making the requested changes.";

const REFERENCE_PREAMBLE: &str =
    "Use this second image as a style and content reference for the edit:";

/// One unit of a multi-part model request.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    Image(ImageAsset),
}

/// Full prompt for the style-generation flow: base instruction, delimiter,
/// then the preset's suffix.
pub fn build_generation_prompt(style: &StylePreset) -> String {
    format!("{}{}{}", BASE_PROMPT, STYLE_DELIMITER, style.prompt_suffix)
}

/// Fixed instruction for the clean-up flow.
pub fn clean_up_prompt() -> &'static str {
    CLEAN_UP_PROMPT
}

/// Ordered parts for the edit flow.
///
/// Order is fixed: edit preamble, target image, then (only when a reference
/// is supplied) the reference preamble and reference image, and finally the
/// user's instruction as a quoted directive. Callers must reject empty
/// instructions before building.
pub fn build_edit_parts(
    image: &ImageAsset,
    instruction: &str,
    reference: Option<&ImageAsset>,
) -> Vec<PromptPart> {
    let mut parts = vec![
        PromptPart::Text(EDIT_PREAMBLE.to_string()),
        PromptPart::Image(image.clone()),
    ];

    if let Some(reference) = reference {
        parts.push(PromptPart::Text(REFERENCE_PREAMBLE.to_string()));
        parts.push(PromptPart::Image(reference.clone()));
    }

    parts.push(PromptPart::Text(format!(
        "My instruction is: \"{}\"",
        instruction
    )));

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::STYLE_PRESETS;

    fn asset(byte: u8) -> ImageAsset {
        ImageAsset::new(vec![byte], "image/png")
    }

    #[test]
    fn generation_prompt_contains_base_then_suffix() {
        for style in STYLE_PRESETS.iter() {
            let prompt = build_generation_prompt(style);
            let base_pos = prompt.find(BASE_PROMPT).unwrap();
            let suffix_pos = prompt.find(style.prompt_suffix).unwrap();
            assert_eq!(base_pos, 0);
            assert!(suffix_pos > base_pos);
            assert!(prompt.ends_with(style.prompt_suffix));
        }
    }

    #[test]
    fn generation_prompt_is_deterministic() {
        let style = &STYLE_PRESETS[0];
        assert_eq!(build_generation_prompt(style), build_generation_prompt(style));
    }

    #[test]
    fn clean_up_prompt_is_idempotent() {
        assert_eq!(clean_up_prompt(), clean_up_prompt());
        assert!(clean_up_prompt().contains("Do not alter the person's identity"));
        assert!(clean_up_prompt().contains("Reduce noise"));
    }

    #[test]
    fn edit_parts_without_reference() {
        let target = asset(1);
        let parts = build_edit_parts(&target, "make the jacket leather", None);

        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], PromptPart::Text(t) if t == EDIT_PREAMBLE));
        assert_eq!(parts[1], PromptPart::Image(target));
        assert!(
            matches!(&parts[2], PromptPart::Text(t) if t == "My instruction is: \"make the jacket leather\"")
        );
    }

    #[test]
    fn edit_parts_with_reference() {
        let target = asset(1);
        let reference = asset(2);
        let parts = build_edit_parts(&target, "match this pose", Some(&reference));

        assert_eq!(parts.len(), 5);
        assert!(matches!(&parts[0], PromptPart::Text(_)));
        assert_eq!(parts[1], PromptPart::Image(target));
        assert!(matches!(&parts[2], PromptPart::Text(t) if t == REFERENCE_PREAMBLE));
        assert_eq!(parts[3], PromptPart::Image(reference));
        assert!(matches!(&parts[4], PromptPart::Text(t) if t.contains("match this pose")));
    }

    #[test]
    fn instruction_is_kept_verbatim_inside_quotes() {
        let target = asset(1);
        let parts = build_edit_parts(&target, "add a \"subtle\" smile", None);
        let PromptPart::Text(last) = parts.last().unwrap() else {
            panic!("last part must be text");
        };
        assert_eq!(last, "My instruction is: \"add a \"subtle\" smile\"");
    }
}
