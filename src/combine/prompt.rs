//! Prompt construction for the text generator.
//!
//! Two prompts: the combination request sent once per resolution, and the
//! rationale request used to explain an already chosen combination.

use super::types::{Attribute, Catalog, Combination, Selections};

/// Build the combination request.
///
/// Locked attributes are listed verbatim; the generator is told to copy them,
/// pick defaulted ones from the catalog, keep the three results diverse, and
/// answer with bare JSON in the `combinations` schema.
pub fn build_combination_prompt(
    product_type: &str,
    selections: &Selections,
    catalog: &Catalog,
) -> String {
    let selections_json = serde_json::to_string_pretty(selections).unwrap_or_default();
    let catalog_json = serde_json::to_string_pretty(catalog).unwrap_or_default();

    let locked: Vec<String> = selections
        .locked()
        .map(|(attr, value)| format!("- {}: \"{}\"", attr.key(), value))
        .collect();
    let locked_block = if locked.is_empty() {
        "(none: every attribute is \"Default\")".to_string()
    } else {
        locked.join("\n")
    };

    let schema_fields: String = Attribute::ALL
        .iter()
        .map(|a| format!("      \"{key}\": \"<one from catalog.{key}>\",\n", key = a.key()))
        .collect();

    format!(
        r#"You are a senior surface-pattern designer asked to propose the **top 3 print-ready combinations** for a {product_type}.

## Inputs
### User selections (may include "Default")
{selections_json}

### Locked attributes (copy these unchanged into all 3 combinations)
{locked_block}

### Available options catalog (each list contains the allowed values for that attribute)
{catalog_json}

## Decision Rules (very important)
1) Respect all **non-default** user selections exactly (do not change them).
2) For each attribute marked **"Default"**, you must **choose** a value from the corresponding catalog.
3) If **all** attributes are "Default": return your **3 best diverse** full combinations across all attributes.
4) If **only some** attributes are "Default": choose values **only** for those attributes; keep the user-selected attributes fixed.
5) If **multiple** attributes are "Default": vary them across the 3 combinations so they are **meaningfully different** (no near-duplicates).
6) Favor combinations that are cohesive (palette, pattern, motif, style and finish together), print-friendly, and suitable for a {product_type}.
7) Avoid conflicts (e.g., heavy metallic foil with a style that demands flat-matte minimalism, or illegible color-on-color).
8) Only use options present in the catalogs for their respective attributes (no new, unseen values).

## Output format (STRICT)
Return **only valid JSON**, no markdown. Use this exact schema:
{{
  "combinations": [
    {{
{schema_fields}      "rationale": "<why this set works; 1-2 short sentences>"
    }},
    {{ ... }},
    {{ ... }}
  ]
}}

- Exactly 3 items in "combinations".
- Each item must fill **all five** attributes.
- Ensure diversity across the 3 items (do not repeat the same set).
"#
    )
}

/// Build the rationale request for one combination.
pub fn build_rationale_prompt(product_type: &str, combination: &Combination) -> String {
    let attributes: String = Attribute::ALL
        .iter()
        .map(|&a| format!("- {}: {}\n", a.label(), combination.get(a)))
        .collect();

    format!(
        r#"You are an expert surface designer specializing in a premium {product_type} and tableware aesthetics.
Given the following design combination, write a short rationale (2-4 sentences) explaining why this
combination works well together and what visual or emotional effect it creates.
Focus on harmony, balance, and design storytelling.

Design Combination:
{attributes}
Guidelines:
- Highlight how these elements complement one another (e.g., contrast, theme consistency, mood, season).
- Avoid generic statements like "it looks nice together."
- Be specific but concise; keep it within 40 words.
- Do not restate the parameters; explain the *why* and *effect*.
- Output only the rationale text, no bullet points or extra formatting.
"#
    )
}
