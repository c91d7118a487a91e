//! Fixed model prompts for every pipeline stage.
//!
//! The detector and analyzer prompts describe JSON shapes the parsing code
//! depends on; keep them in step with `component_detector.rs`.

/// Word used for detected elements in prompts and ordinals.
pub const DETECTION_TERM: &str = "component";

pub const DETECTION_SYSTEM_PROMPT: &str = "You are a precise UI inspection engine. \
You look at screenshots of user interfaces and enumerate the distinct UI components \
you can see. You only answer with JSON.";

pub fn detection_user_prompt(cap: usize) -> String {
    format!(
        r#"List at most {cap} of the most important UI components visible in this screenshot.
Respond with a single JSON object of this exact shape:
{{
  "components": [
    {{
      "type": "button | input | text | image | icon | navigation | card | list | header | footer | other",
      "location": "short description of where it sits, e.g. top-left header",
      "bbox": [x, y, width, height],
      "confidence": 0.0,
      "text": "visible text or a short description"
    }}
  ]
}}
Coordinates are integer pixels in the original image, origin top-left.
Order components from top to bottom, then left to right.
If you see no components, return {{"components": []}}."#
    )
}

pub const COMPONENT_SYSTEM_PROMPT: &str = r#"You are a senior UI designer documenting a single interface component so a developer can rebuild it exactly.
Respond with one JSON object with these keys:
{
  "visual": { "shape": "", "colors": [], "typography": "", "spacing": "", "borders_and_shadows": "" },
  "content": { "text": "", "icons": [], "imagery": "" },
  "interaction": { "role": "", "states": [], "behavior": "" },
  "location": { "region": "", "alignment": "", "relationships": "" }
}
Be concrete: name colors as hex values, sizes in pixels, fonts by family and weight where visible."#;

pub fn component_user_prompt(index: usize, location_label: &str) -> String {
    format!(
        "Analyze {DETECTION_TERM} #{} of the interface, labelled \"{location_label}\". \
Describe only this {DETECTION_TERM}.",
        index + 1
    )
}

pub const DESIGN_SYSTEM_PROMPT: &str = "You are a design-systems expert. \
Given a screenshot of a user interface, you describe its layout and design system \
precisely enough for an engineer to reproduce it without seeing the image.";

pub const DESIGN_USER_PROMPT: &str = "Describe the overall layout of this interface \
(grid, columns, regions, alignment, spacing rhythm), the color palette with hex values, \
typography (families, sizes, weights, hierarchy), corner radii, shadows, iconography style, \
and any recurring design-system patterns.";

pub const ACTIVITY_SYSTEM_PROMPT: &str = "You describe what a user is doing or can do \
on a screen, in plain language, in two or three sentences.";

pub const ACTIVITY_USER_PROMPT: &str = "What is happening on this screen? \
Describe the purpose of the interface and the activity it supports.";

pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You turn interface specifications into a single, \
self-contained build prompt for an AI code-generation tool. Keep every concrete value \
(colors, sizes, text, positions). Remove repetition, resolve contradictions in favor of the \
component-level detail, and answer with the prompt only.";
