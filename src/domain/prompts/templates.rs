//! Prompt templates for the analyzer and generator steps.
//!
//! Placeholders are written as `{name}` and filled in a single pass, so text
//! inside a document or feedback that happens to look like a placeholder is
//! left untouched.

use crate::domain::analysis::DocumentAnalysis;
use crate::domain::plan::PresentationPlan;

pub const ANALYST_SYSTEM_PROMPT: &str = "You are an expert business analyst.";

pub const DESIGNER_SYSTEM_PROMPT: &str = "You are an expert presentation designer.";

pub const REVISER_SYSTEM_PROMPT: &str =
    "You are an expert presentation designer helping to refine a presentation.";

/// Renders the document analysis prompt.
pub fn analysis_prompt(document: &str) -> String {
    fill(DOCUMENT_ANALYSIS_PROMPT, &[("document", document)])
}

/// Renders the first-generation prompt.
pub fn generation_prompt(analysis: &DocumentAnalysis, document: &str) -> String {
    let analysis_json = analysis_json(analysis);
    fill(
        PLAN_GENERATION_PROMPT,
        &[
            ("analysis", &analysis_json),
            ("document", document),
            ("slide_types", SLIDE_TYPES_DESCRIPTION),
        ],
    )
}

/// Renders the revision prompt carrying the facts, the prior plan and the feedback.
pub fn revision_prompt(
    current_plan: &PresentationPlan,
    analysis: &DocumentAnalysis,
    feedback: &str,
    document: &str,
) -> String {
    let plan_json = serde_json::to_string_pretty(current_plan)
        .unwrap_or_else(|_| current_plan.summary());
    let analysis_json = analysis_json(analysis);
    fill(
        PLAN_REVISION_PROMPT,
        &[
            ("analysis", &analysis_json),
            ("current_plan", &plan_json),
            ("feedback", feedback),
            ("document", document),
            ("slide_types", SLIDE_TYPES_DESCRIPTION),
        ],
    )
}

fn analysis_json(analysis: &DocumentAnalysis) -> String {
    serde_json::to_string_pretty(analysis).unwrap_or_else(|_| analysis.main_topic.clone())
}

/// Replaces every `{key}` in `template` with its value in one left-to-right pass.
pub(crate) fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let matched = values.iter().find(|(key, _)| {
            after.starts_with(key) && after[key.len()..].starts_with('}')
        });

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub const SLIDE_TYPES_DESCRIPTION: &str = r#"Available slide types:

1. **title** - Title slide (first slide)
   - title: Main presentation title
   - subtitle: Optional tagline
   - author: Presenter/company name
   - date: Presentation date

2. **agenda** - Agenda/outline slide
   - title: Usually "Agenda" or "Overview"
   - items: List of agenda items

3. **content** - General content slide
   - title: Slide title
   - body: Main content (can include bullet points)
   - image_suggestion: Optional image/diagram suggestion

4. **key_points** - Highlights important points
   - title: Slide title
   - points: List of points, each with 'heading' and 'description'

5. **section_header** - Section divider
   - title: Section title
   - subtitle: Optional subtitle

6. **closing** - Final slide
   - title: Usually "Thank You" or "Next Steps"
   - message: Call to action or closing message

Every slide may also carry "speaker_notes". Do not add fields that are not
listed for a slide's type."#;

const DOCUMENT_ANALYSIS_PROMPT: &str = r#"Analyze the following technical and economic proposal document and extract key information that will help create an effective presentation.

## Document to Analyze:
{document}

## Your Task:
Analyze the document and provide a structured analysis including:

1. **Main Topic**: What is the core subject/proposal about?
2. **Key Entities**: Which projects, products, organizations or people are named?
3. **Key Sections**: What are the main sections or themes in the document?
4. **Technical Highlights**: What technical aspects should be emphasized?
5. **Economic Highlights**: What business/economic benefits or costs should be highlighted?
6. **Timeline**: What schedule, phases or deadlines are stated?
7. **Target Audience**: Who is the intended audience for this presentation?
8. **Suggested Tone**: What tone would be most appropriate (formal, persuasive, technical, etc.)?

## Output Format:
Respond with a single JSON object with this structure and no other keys:
```json
{
  "main_topic": "string",
  "key_entities": ["string", ...],
  "key_sections": ["string", ...],
  "technical_highlights": ["string", ...],
  "economic_highlights": ["string", ...],
  "timeline": "string",
  "target_audience": "string",
  "suggested_tone": "string"
}
```"#;

const PLAN_GENERATION_PROMPT: &str = r#"Based on the document analysis below, create a comprehensive presentation plan.

## Document Analysis:
{analysis}

## Original Document:
{document}

## Available Slide Types:
{slide_types}

## Your Task:
Create a presentation plan that:
1. Starts with a compelling title slide
2. Includes an agenda/overview
3. Covers all key technical points
4. Highlights economic benefits
5. Ends with a clear call to action or next steps

## Guidelines:
- Target 10-15 slides for a 30-minute presentation
- Use appropriate slide types for different content
- Include speaker notes for each slide
- Make titles concise and impactful
- Ensure logical flow between slides
- Balance technical depth with business value

## Output Format:
Respond with a single JSON object with this structure:
```json
{
  "title": "Presentation title",
  "description": "Brief description",
  "target_audience": "Intended audience",
  "estimated_duration_minutes": 30,
  "slides": [
    {"slide_type": "title", "title": "Main Title", "subtitle": "Subtitle", "author": "Author", "date": "Date", "speaker_notes": "Notes"},
    {"slide_type": "agenda", "title": "Agenda", "items": ["Item 1", "Item 2"], "speaker_notes": "Notes"},
    {"slide_type": "content", "title": "Slide Title", "body": "Content text", "image_suggestion": "", "speaker_notes": "Notes"},
    {"slide_type": "key_points", "title": "Slide Title", "points": [{"heading": "Point", "description": "Detail"}], "speaker_notes": "Notes"}
  ]
}
```

Slide types: title, agenda, content, key_points, section_header, closing"#;

const PLAN_REVISION_PROMPT: &str = r#"Revise the presentation plan below based on the user's feedback.

## Document Analysis:
{analysis}

## Current Presentation Plan:
{current_plan}

## User Feedback:
{feedback}

## Original Document:
{document}

## Available Slide Types:
{slide_types}

## Your Task:
Revise the presentation plan based on the user's feedback. Make sure to:
1. Address all points mentioned in the feedback
2. Maintain the overall coherence of the presentation
3. Keep the slide count reasonable (10-20 slides)
4. Preserve any aspects the user didn't mention (they're likely satisfied with those)

## Output Format:
Respond with the complete revised presentation plan as a single JSON object with the same structure as the current plan:
```json
{
  "title": "Presentation title",
  "description": "Brief description",
  "target_audience": "Intended audience",
  "estimated_duration_minutes": 30,
  "slides": [ ... slide objects ... ]
}
```"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{Slide, SlideKind};

    #[test]
    fn fill_replaces_known_placeholders_only() {
        let out = fill("Hi {name}, {unknown} {name}!", &[("name", "Ada")]);
        assert_eq!(out, "Hi Ada, {unknown} Ada!");
    }

    #[test]
    fn fill_does_not_expand_placeholders_inside_values() {
        let out = fill(
            "{feedback} / {document}",
            &[("feedback", "mention {document}"), ("document", "DOC")],
        );
        assert_eq!(out, "mention {document} / DOC");
    }

    #[test]
    fn analysis_prompt_embeds_document_and_schema() {
        let prompt = analysis_prompt("Proposal for Project X, budget $50k");
        assert!(prompt.contains("Proposal for Project X, budget $50k"));
        assert!(prompt.contains("\"main_topic\": \"string\""));
        assert!(!prompt.contains("{document}"));
    }

    #[test]
    fn generation_prompt_embeds_analysis_and_catalogue() {
        let prompt = generation_prompt(&DocumentAnalysis::new("Project X"), "the doc");
        assert!(prompt.contains("\"main_topic\": \"Project X\""));
        assert!(prompt.contains("the doc"));
        assert!(prompt.contains("Available slide types:"));
    }

    #[test]
    fn revision_prompt_embeds_plan_and_feedback() {
        let plan = PresentationPlan::new("Deck", vec![Slide::title("Deck")]).unwrap();
        let mut analysis = DocumentAnalysis::new("Project X");
        analysis.economic_highlights = vec!["Budget of $50k".to_string()];

        let prompt = revision_prompt(&plan, &analysis, "add a slide about risks", "the doc");

        assert!(prompt.contains("add a slide about risks"));
        assert!(prompt.contains("\"slide_type\": \"title\""));
        assert!(prompt.contains("\"main_topic\": \"Project X\""));
        assert!(prompt.contains("Budget of $50k"));
        assert!(!prompt.contains("{analysis}"));
    }

    #[test]
    fn catalogue_lists_every_kind_and_field() {
        for kind in SlideKind::ALL {
            assert!(SLIDE_TYPES_DESCRIPTION.contains(&format!("**{}**", kind)), "{}", kind);
            for field in kind.allowed_fields() {
                assert!(SLIDE_TYPES_DESCRIPTION.contains(&format!("- {}:", field)), "{}", field);
            }
        }
    }
}
