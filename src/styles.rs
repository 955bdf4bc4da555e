use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const NO_STYLE: &str = "(None)";
pub const CUSTOM_ASPECT_RATIO: &str = "Custom";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StylePreset {
    pub name: &'static str,
    /// Contains a single `{prompt}` placeholder.
    pub template: &'static str,
}

impl StylePreset {
    pub fn apply(&self, prompt: &str) -> String {
        self.template.replace("{prompt}", prompt.trim())
    }
}

pub const STYLES: &[StylePreset] = &[
    StylePreset {
        name: "(None)",
        template: "{prompt}",
    },
    StylePreset {
        name: "Cinematic",
        template: "{prompt}, cinematic still, emotional, harmonious, vignette, high-budget production, bokeh, cinemascope, moody, epic, breathtaking, film grain, vintage film look, atmospheric lighting, rich textures",
    },
    StylePreset {
        name: "Photographic",
        template: "{prompt}, cinematic photo, shot with a 35mm camera, soft bokeh, professional 4k resolution, hyper-realistic lighting, fine-grain film look, studio quality, beautifully composed",
    },
    StylePreset {
        name: "Anime",
        template: "{prompt}, vibrant anime artwork, highly detailed, studio-quality animation, vivid colors, dynamic composition, emotive character design, energy-filled, inspired by popular anime key visuals",
    },
    StylePreset {
        name: "Manga",
        template: "{prompt}, dynamic manga style, high-energy scenes, crisp line work, bold expressions, iconic Japanese comic style, expressive characters, vibrant panels, intricate detailing, action-packed",
    },
    StylePreset {
        name: "Digital Art",
        template: "{prompt}, concept art, digital painting, painterly textures, cinematic lighting, matte painting style, stunning visual effects, visually captivating, ultra-detailed, imaginative and illustrative",
    },
    StylePreset {
        name: "Pixel art",
        template: "{prompt}, pixel-art style, 8-bit graphics, retro, low-res, nostalgic, charmingly blocky, simplistic but detailed, colorful, evoking the spirit of vintage video games, playful design",
    },
    StylePreset {
        name: "Fantasy art",
        template: "{prompt}, ethereal fantasy concept art, celestial landscapes, magical realism, majestic and otherworldly creatures, painterly strokes, otherworldly lighting, dreamy atmosphere, mystical and enchanting world-building",
    },
    StylePreset {
        name: "Neonpunk",
        template: "{prompt}, neonpunk style, cyberpunk aesthetic, vaporwave vibes, vibrant neon lighting, stunning contrasts, futuristic cityscapes, sleek and ultra-modern design, high energy, magenta and dark purple highlights, intricate detailing",
    },
    StylePreset {
        name: "3D Model",
        template: "{prompt}, professional 3D model rendered in octane, hyper-realistic textures, volumetric lighting effects, dramatic composition, highly detailed design, cutting-edge 3D art, lifelike rendering",
    },
    StylePreset {
        name: "Gothic",
        template: "{prompt}, gothic art style, dark and moody atmosphere, intricate architectural details, high contrast lighting, dramatic shadows, ethereal yet eerie ambiance, elaborate robes and accessories, dark-toned color palette, mysterious and brooding",
    },
    StylePreset {
        name: "Steampunk",
        template: "{prompt}, steampunk style, Victorian-inspired fashion with futuristic mechanical elements, brass, copper, and leather details, steam-powered gadgets, intricate clockwork design, dark earthy tones, rich textures, adventurous, historical yet speculative",
    },
    StylePreset {
        name: "Surrealism",
        template: "{prompt}, surrealistic art, dreamlike and otherworldly imagery, unexpected combinations, distorted forms, unusual perspectives, vibrant colors blending into a chaotic yet beautiful scene, mind-bending compositions, blending reality and fantasy seamlessly",
    },
    StylePreset {
        name: "Baroque",
        template: "{prompt}, baroque art style, highly detailed, lavish and ornate, dramatic use of light and shadow (chiaroscuro), luxurious textures, classical and grandiose composition, rich golden tones, historical richness, intricate patterns and flourishes",
    },
    StylePreset {
        name: "Pop Art",
        template: "{prompt}, pop art style, bold, bright, and colorful, comic book-inspired, exaggerated, graphic imagery, iconic modern symbols, graphic lines, heavy use of primary colors, playful and nostalgic, inspired by Andy Warhol and Roy Lichtenstein",
    },
    StylePreset {
        name: "Art Deco",
        template: "{prompt}, art deco style, geometric patterns, symmetrical designs, luxurious and elegant, metallic accents, 1920s-inspired architecture, sleek lines, opulent color palette with gold, chrome, and jewel tones, glamorous and sophisticated",
    },
    StylePreset {
        name: "Retro Futurism",
        template: "{prompt}, retro futurism style, mid-20th century vision of the future, vintage technology with futuristic elements, neon lights, metallic finishes, vibrant, bold contrasts, sleek designs, space-age aesthetics, bold use of chrome and neon colors",
    },
    StylePreset {
        name: "Pulp Fiction",
        template: "{prompt}, pulp fiction style, comic-book style, exaggerated expressions, high contrast and shadow, gritty and raw, vintage detective or noir vibe, dark tones with bursts of bright red or yellow, pulp magazine aesthetic, vintage typography",
    },
    StylePreset {
        name: "Dreamcore",
        template: "{prompt}, dreamcore style, unsettlingly surreal, distorted reality, strange and abstract visuals, a mix of eerie, innocent, and nostalgic elements, distorted faces, floating objects, distorted environments, unsettling atmosphere with soft lighting and soft textures",
    },
    StylePreset {
        name: "Minimalism",
        template: "{prompt}, minimalist art style, clean and simple lines, sparse use of color, negative space, subtle design elements, understated composition, harmonious and balanced, focus on essential forms and shapes, elegance in simplicity",
    },
    StylePreset {
        name: "Gritty Urban",
        template: "{prompt}, gritty urban art style, street art-inspired, graffiti elements, worn textures, raw and authentic feel, urban decay, bold, aggressive lines, faded and weathered colors, rough concrete and metal surfaces, atmosphere of rebellion",
    },
    StylePreset {
        name: "Watercolor",
        template: "{prompt}, watercolor style, soft and fluid brush strokes, light and airy feel, transparent layers of pigment, delicate and ethereal, gentle blend of hues, romantic, detailed nature scenes, subtle gradients and light reflections, dreamy yet realistic",
    },
    StylePreset {
        name: "Impressionism",
        template: "{prompt}, impressionist style, loose brush strokes, light-filled scenes, emphasis on light and movement, rich colors and dynamic compositions, blurred forms, evocative yet not highly detailed, capturing the essence of a moment in time, natural landscapes or urban settings",
    },
    StylePreset {
        name: "Hyperrealism",
        template: "{prompt}, hyperrealistic art style, extremely detailed, photo-like quality, lifelike textures, meticulous attention to every detail, vibrant, near-perfect reproduction of real life, capturing the beauty in small things, immaculate lighting, and sharp focus",
    },
    StylePreset {
        name: "Futurism",
        template: "{prompt}, futurism art style, dynamic lines, motion and speed, technological advancements, sleek and innovative designs, metallic and digital textures, bright neon lights, abstract representations of the future, energy-filled, angular composition",
    },
    StylePreset {
        name: "Victorian Gothic",
        template: "{prompt}, Victorian gothic style, dark romanticism, ornate Victorian architecture, elegant yet eerie, lace, velvet, and deep red tones, mysterious ambiance, heavy use of shadows, vintage clothing with a gothic twist, haunted, brooding atmosphere",
    },
];

pub const ASPECT_RATIOS: &[&str] = &[
    "1152 x 896",
    "896 x 1152",
    "1216 x 832",
    "832 x 1216",
    "1344 x 768",
    "768 x 1344",
    "1536 x 640",
    "640 x 1536",
    CUSTOM_ASPECT_RATIO,
];

pub fn find_style(name: &str) -> Option<&'static StylePreset> {
    let name = name.trim();
    STYLES.iter().find(|style| style.name.eq_ignore_ascii_case(name))
}

/// Applies the named style to `prompt`. `None` and `(None)` leave the prompt
/// untouched apart from trimming.
pub fn apply_style(style: Option<&str>, prompt: &str) -> AppResult<String> {
    match style.map(str::trim).filter(|name| !name.is_empty()) {
        None => Ok(prompt.trim().to_string()),
        Some(name) => find_style(name)
            .map(|preset| preset.apply(prompt))
            .ok_or_else(|| AppError::validation(format!("Unknown style: {name}"))),
    }
}

/// Resolves an aspect-ratio label such as `"1152 x 896"` to `(width, height)`.
/// `Custom` resolves to `None`, meaning the caller's own dimensions apply.
pub fn parse_aspect_ratio(label: &str) -> AppResult<Option<(u32, u32)>> {
    let label = label.trim();
    if label.eq_ignore_ascii_case(CUSTOM_ASPECT_RATIO) {
        return Ok(None);
    }
    if !ASPECT_RATIOS.contains(&label) {
        return Err(AppError::validation(format!("Unknown aspect ratio: {label}")));
    }
    let parsed = label.split_once('x').and_then(|(width, height)| {
        Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
    });
    parsed
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("Unknown aspect ratio: {label}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_a_placeholder() {
        assert_eq!(STYLES.len(), 26);
        for style in STYLES {
            assert!(style.template.contains("{prompt}"), "{}", style.name);
        }
    }

    #[test]
    fn applies_named_style() {
        let styled = apply_style(Some("pixel art"), "  a castle ").unwrap();
        assert!(styled.starts_with("a castle, pixel-art style"));
        assert_eq!(apply_style(Some(NO_STYLE), "a castle").unwrap(), "a castle");
        assert_eq!(apply_style(None, " a castle ").unwrap(), "a castle");
        assert_eq!(apply_style(Some(""), "a castle").unwrap(), "a castle");
    }

    #[test]
    fn unknown_style_is_a_validation_error() {
        let err = apply_style(Some("Cubism"), "a castle").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn parses_aspect_ratio_presets() {
        assert_eq!(parse_aspect_ratio("1152 x 896").unwrap(), Some((1152, 896)));
        assert_eq!(parse_aspect_ratio("640 x 1536").unwrap(), Some((640, 1536)));
        assert_eq!(parse_aspect_ratio("custom").unwrap(), None);
        assert!(parse_aspect_ratio("1000 x 1000").is_err());
    }
}
