use crate::models::{BrandProfile, ImageAsset, LabeledAsset, RequestPart};

/// Non-negotiable fidelity mandate injected into every generation request.
pub const SUBJECT_FIDELITY_MANDATE: &str = "SUBJECT FIDELITY MANDATE: Reproduce the primary \
subject's geometry, proportions and any visible text EXACTLY as supplied. Do not redraw, \
restyle or paraphrase lettering; do not alter facial structure, logos or product shapes.";

/// Lighting and shadow realism mandate.
pub const REALISM_MANDATE: &str = "REALISM MANDATE: Light the composed scene with one coherent \
key light. Cast shadows must agree with that light in direction and softness. No floating \
subjects, no halo artifacts around cut-outs.";

/// Anti-fabrication mandate.
pub const NO_FABRICATED_BRANDING_MANDATE: &str = "BRAND SAFETY MANDATE: Never invent logos, \
watermarks, channel marks or brand names that are not present in the supplied reference \
images or brand directive.";

/// Trailing directive describing the expected output.
pub const OUTPUT_FORMAT_DIRECTIVE: &str = "OUTPUT: Return exactly one finished image and \
nothing else. No borders, no commentary, no contact sheets.";

/// The default mandate set, in injection order.
pub fn default_mandates() -> Vec<&'static str> {
    vec![
        SUBJECT_FIDELITY_MANDATE,
        REALISM_MANDATE,
        NO_FABRICATED_BRANDING_MANDATE,
    ]
}

/// Render the brand directive block for a caller-supplied brand kit.
/// Fields are interpolated verbatim; a missing tone falls back to
/// "Professional".
pub fn brand_directive(brand: &BrandProfile) -> String {
    let tone = brand.tone_of_voice.as_deref().unwrap_or("Professional");
    let mut block = format!(
        "BRAND DIRECTIVE:\n- Brand name: {}\n- Tone of voice: {}\n- Primary color: {}\n- Accent color: {}",
        brand.display_name, tone, brand.color_primary, brand.color_accent
    );
    if let Some(font) = &brand.heading_font {
        block.push_str(&format!("\n- Heading font: {}", font));
    }
    block
}

/// Build the ordered payload for one generation request.
///
/// Ordering is significant and fixed: the labeled primary asset, each
/// auxiliary asset labeled with its uppercased role in caller-supplied
/// order, then a single trailing text part concatenating the mandates, the
/// brand directive (omitted entirely when no brand is supplied), the task
/// instruction and the output-format directive.
pub fn assemble(
    mandates: &[&str],
    brand: Option<&BrandProfile>,
    primary: &ImageAsset,
    primary_role: &str,
    auxiliary: &[LabeledAsset],
    task_instruction: &str,
) -> Vec<RequestPart> {
    let mut parts = Vec::with_capacity(auxiliary.len() + 2);

    parts.push(RequestPart::Image {
        asset: primary.clone(),
        role: primary_role.to_uppercase(),
    });

    for labeled in auxiliary {
        parts.push(RequestPart::Image {
            asset: labeled.asset.clone(),
            role: labeled.role.to_uppercase(),
        });
    }

    parts.push(RequestPart::Text(trailing_text(
        mandates,
        brand,
        task_instruction,
    )));
    parts
}

/// Payload for a request that carries no reference images at all.
pub fn assemble_text_only(
    mandates: &[&str],
    brand: Option<&BrandProfile>,
    task_instruction: &str,
) -> Vec<RequestPart> {
    vec![RequestPart::Text(trailing_text(
        mandates,
        brand,
        task_instruction,
    ))]
}

fn trailing_text(mandates: &[&str], brand: Option<&BrandProfile>, task_instruction: &str) -> String {
    let mut blocks: Vec<String> = mandates.iter().map(|m| m.to_string()).collect();
    if let Some(profile) = brand {
        blocks.push(brand_directive(profile));
    }
    blocks.push(task_instruction.to_string());
    blocks.push(OUTPUT_FORMAT_DIRECTIVE.to_string());
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(tag: &str) -> ImageAsset {
        ImageAsset::new(format!("{}-bytes", tag), "image/jpeg")
    }

    fn brand() -> BrandProfile {
        BrandProfile {
            display_name: "Northwind".to_string(),
            tone_of_voice: None,
            color_primary: "#0A3D62".to_string(),
            color_accent: "#F6B93B".to_string(),
            heading_font: Some("Archivo Black".to_string()),
        }
    }

    #[test]
    fn test_assemble_is_order_stable() {
        let primary = asset("subject");
        let aux = vec![
            LabeledAsset::new(asset("logo"), "brand logo"),
            LabeledAsset::new(asset("bg"), "background plate"),
        ];
        let first = assemble(
            &default_mandates(),
            Some(&brand()),
            &primary,
            "subject source",
            &aux,
            "Make a thumbnail.",
        );
        let second = assemble(
            &default_mandates(),
            Some(&brand()),
            &primary,
            "subject source",
            &aux,
            "Make a thumbnail.",
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_roles_are_uppercased_in_caller_order() {
        let aux = vec![
            LabeledAsset::new(asset("logo"), "brand logo"),
            LabeledAsset::new(asset("bg"), "background plate"),
        ];
        let parts = assemble(
            &default_mandates(),
            None,
            &asset("subject"),
            "subject source",
            &aux,
            "Make a thumbnail.",
        );

        match &parts[0] {
            RequestPart::Image { role, .. } => assert_eq!(role, "SUBJECT SOURCE"),
            other => panic!("expected image part, got {:?}", other),
        }
        match &parts[1] {
            RequestPart::Image { role, .. } => assert_eq!(role, "BRAND LOGO"),
            other => panic!("expected image part, got {:?}", other),
        }
        match &parts[2] {
            RequestPart::Image { role, .. } => assert_eq!(role, "BACKGROUND PLATE"),
            other => panic!("expected image part, got {:?}", other),
        }
    }

    #[test]
    fn test_single_trailing_text_part() {
        let parts = assemble(
            &default_mandates(),
            Some(&brand()),
            &asset("subject"),
            "subject source",
            &[],
            "Make a thumbnail.",
        );
        assert_eq!(parts.len(), 2);

        let text = match parts.last().unwrap() {
            RequestPart::Text(t) => t,
            other => panic!("expected trailing text part, got {:?}", other),
        };
        assert!(text.contains("SUBJECT FIDELITY MANDATE"));
        assert!(text.contains("BRAND DIRECTIVE"));
        assert!(text.contains("Northwind"));
        assert!(text.contains("Make a thumbnail."));
        assert!(text.ends_with(OUTPUT_FORMAT_DIRECTIVE));
    }

    #[test]
    fn test_omitted_brand_leaves_no_placeholder() {
        let parts = assemble(
            &default_mandates(),
            None,
            &asset("subject"),
            "subject source",
            &[],
            "Make a thumbnail.",
        );
        let text = match parts.last().unwrap() {
            RequestPart::Text(t) => t,
            other => panic!("expected trailing text part, got {:?}", other),
        };
        assert!(!text.contains("BRAND DIRECTIVE"));
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_missing_tone_falls_back_to_professional() {
        let directive = brand_directive(&brand());
        assert!(directive.contains("Tone of voice: Professional"));
        assert!(directive.contains("Heading font: Archivo Black"));
    }
}
