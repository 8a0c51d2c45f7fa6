//! Image-generation intent detection
//!
//! A keyword-matching classifier over free-text input, deciding whether a
//! user turn should be routed to image generation instead of chat
//! completion. Matching is case-insensitive substring containment against a
//! fixed multilingual keyword list (Portuguese and English); no negation
//! handling, no scoring. Keywords embedded in longer words also trigger,
//! which is accepted behavior for this heuristic.
//!
//! Attached images take precedence over keywords: a turn that uploads
//! images signals image-understanding intent, so generation routing is
//! suppressed even when a keyword matches.

/// Keyword list checked against lowercased input.
///
/// First match wins; order is irrelevant.
const IMAGE_INTENT_KEYWORDS: &[&str] = &[
    // Portuguese
    "gerar imagem",
    "gerar uma imagem",
    "gere uma imagem",
    "gera uma imagem",
    "criar imagem",
    "criar uma imagem",
    "crie uma imagem",
    "desenhe",
    "desenhar",
    "pinte",
    "pintar",
    "faça um desenho",
    "faca um desenho",
    "gerar arte",
    "criar arte",
    // English
    "generate image",
    "generate an image",
    "create image",
    "create an image",
    "make an image",
    "draw me",
    "draw a picture",
    "draw an image",
    "paint a picture",
    "paint an image",
    "sketch",
    "generate art",
    "create art",
];

/// Decide whether a user turn asks for image generation
///
/// # Arguments
///
/// * `text` - Raw user input text
/// * `has_attached_images` - Whether the turn carries uploaded images
///
/// # Returns
///
/// `true` when the text contains a recognized keyword and no images are
/// attached; `false` otherwise.
///
/// # Examples
///
/// ```
/// use palaver::intent::wants_image_generation;
///
/// assert!(wants_image_generation("generate image of a cat", false));
/// assert!(!wants_image_generation("what does this show?", false));
/// // Uploaded images suppress generation routing:
/// assert!(!wants_image_generation("generate image of a cat", true));
/// ```
pub fn wants_image_generation(text: &str, has_attached_images: bool) -> bool {
    if has_attached_images {
        return false;
    }

    let lowered = text.to_lowercase();
    IMAGE_INTENT_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_variant_triggers() {
        for keyword in IMAGE_INTENT_KEYWORDS {
            assert!(
                wants_image_generation(keyword, false),
                "keyword {:?} should trigger",
                keyword
            );
        }
    }

    #[test]
    fn test_keyword_inside_sentence_triggers() {
        assert!(wants_image_generation("please generate image of a cat", false));
        assert!(wants_image_generation(
            "você pode gerar uma imagem de um gato?",
            false
        ));
        assert!(wants_image_generation("crie uma imagem bem colorida", false));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert!(wants_image_generation("GENERATE IMAGE of a dog", false));
        assert!(wants_image_generation("Desenhe um cachorro", false));
        assert!(wants_image_generation("Create An Image of the sea", false));
    }

    #[test]
    fn test_plain_text_does_not_trigger() {
        assert!(!wants_image_generation("what is the capital of France?", false));
        assert!(!wants_image_generation("tell me about rust lifetimes", false));
        assert!(!wants_image_generation("", false));
    }

    #[test]
    fn test_attached_images_force_false() {
        for keyword in IMAGE_INTENT_KEYWORDS {
            assert!(
                !wants_image_generation(keyword, true),
                "keyword {:?} must not trigger with attachments",
                keyword
            );
        }
    }

    #[test]
    fn test_attached_images_with_plain_text_is_false() {
        assert!(!wants_image_generation("what is in this photo?", true));
    }

    #[test]
    fn test_substring_containment_also_triggers() {
        // Containment is the documented matching rule, even mid-word.
        assert!(wants_image_generation("redesenhe o logotipo", false));
        assert!(wants_image_generation("a quick sketchup question", false));
    }

    #[test]
    fn test_partial_keyword_does_not_trigger() {
        assert!(!wants_image_generation("generate", false));
        assert!(!wants_image_generation("image", false));
        assert!(!wants_image_generation("gerar", false));
    }
}
