use crate::common::capture::ScreenCapture;
use crate::config::StageTuning;
use crate::network::gateway::ModelGateway;
use crate::network::request::ModelRequest;
use crate::pipeline::domain::detection::{BoundingBox, Detection};
use crate::pipeline::orchestration::stage_outcome::StageOutcome;
use crate::pipeline::prompts::{detection_user_prompt, DETECTION_SYSTEM_PROMPT, DETECTION_TERM};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One item of the detector's JSON reply, before normalization.
#[derive(Deserialize)]
struct RawComponent {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    location: Option<Value>,
    #[serde(default)]
    bbox: Option<Value>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    text: Option<Value>,
}

/// Asks the model to enumerate the UI components in a screenshot.
pub struct ComponentDetector {
    gateway: Arc<dyn ModelGateway>,
    tuning: StageTuning,
    min_confidence: f32,
}

impl ComponentDetector {
    pub fn new(gateway: Arc<dyn ModelGateway>, tuning: StageTuning) -> Self {
        Self {
            gateway,
            tuning,
            min_confidence: 0.0,
        }
    }

    /// Drops detections the model itself scored below `min_confidence`.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// At most `cap` detections; a cap of 0 is treated as 1. Malformed output
    /// and gateway failures both yield an empty list.
    pub async fn detect(&self, image: &ScreenCapture, cap: usize) -> Vec<Detection> {
        self.detect_outcome(image, cap).await.unwrap_or_default()
    }

    #[instrument(skip(self, image), fields(stage = "detection"))]
    pub async fn detect_outcome(&self, image: &ScreenCapture, cap: usize) -> StageOutcome<Vec<Detection>> {
        let cap = cap.max(1);
        let request = ModelRequest::new(detection_user_prompt(cap))
            .system(DETECTION_SYSTEM_PROMPT)
            .temperature(self.tuning.temperature)
            .max_output_tokens(self.tuning.max_tokens)
            .json(true)
            .image(image.clone());

        let raw = match self.gateway.invoke(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Component detection call failed: {}", e);
                return StageOutcome::degraded(Vec::new(), e.to_string());
            }
        };

        match parse_detections(&raw, cap, self.min_confidence) {
            Ok(detections) => {
                info!("Detected {} components", detections.len());
                StageOutcome::Ok(detections)
            }
            Err(reason) => {
                warn!("Discarding detector output: {}", reason);
                debug!("Raw detector output: {}", raw);
                StageOutcome::degraded(Vec::new(), reason)
            }
        }
    }
}

/// Parses the detector reply into at most `cap` detections.
///
/// An explicit empty `components` list is a valid "nothing found" answer;
/// unparseable JSON or a missing `components` key is an error.
pub fn parse_detections(raw: &str, cap: usize, min_confidence: f32) -> Result<Vec<Detection>, String> {
    let json = extract_json_object(raw).ok_or_else(|| "no JSON object in response".to_string())?;
    let mut root: Value = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;

    let items = match root.get_mut("components").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err("`components` is not an array".to_string()),
        None => return Err("missing `components` key".to_string()),
    };

    let detections = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawComponent>(item) {
            Ok(component) => Some(component),
            Err(e) => {
                debug!("Skipping malformed component entry: {}", e);
                None
            }
        })
        .filter(|component| confidence_of(component) >= min_confidence)
        .take(cap)
        .enumerate()
        .map(|(index, component)| normalize(component, index))
        .collect();

    Ok(detections)
}

fn normalize(component: RawComponent, index: usize) -> Detection {
    let confidence = confidence_of(&component);
    let kind = non_empty_str(component.kind.as_ref()).unwrap_or(DETECTION_TERM);
    let bounding_box = component
        .bbox
        .as_ref()
        .map(BoundingBox::from_value)
        .unwrap_or_default();

    let label = non_empty_str(component.text.as_ref())
        .or_else(|| non_empty_str(component.location.as_ref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", DETECTION_TERM, index + 1));

    Detection::new(kind, bounding_box, confidence, label)
}

fn confidence_of(component: &RawComponent) -> f32 {
    match &component.confidence {
        Some(Value::Number(n)) => n.as_f64().map(|c| c as f32).unwrap_or(1.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1.0),
        _ => 1.0,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// Tolerates ```json fences and prose around the object
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::ScriptedGateway;
    use serde_json::json;

    fn components(n: usize) -> String {
        let items: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "type": "button",
                    "location": format!("row {i}"),
                    "bbox": [i * 10, 0, 10, 10],
                    "confidence": 0.9,
                    "text": format!("Button {i}")
                })
            })
            .collect();
        json!({ "components": items }).to_string()
    }

    fn detector(reply: &str) -> ComponentDetector {
        ComponentDetector::new(
            Arc::new(ScriptedGateway::replying(reply)),
            StageTuning::new(0.1, 1000),
        )
    }

    #[tokio::test]
    async fn never_returns_more_than_cap() {
        let image = ScreenCapture::solid(10, 10);
        for cap in [1, 3, 6, 20] {
            let detections = detector(&components(10)).detect(&image, cap).await;
            assert_eq!(detections.len(), cap.min(10));
        }
    }

    #[tokio::test]
    async fn invalid_json_or_missing_key_gives_empty_list() {
        let image = ScreenCapture::solid(10, 10);
        for reply in ["not json at all", "{\"items\": []}", "{\"components\": 4}", "{ broken"] {
            let outcome = detector(reply).detect_outcome(&image, 6).await;
            assert!(outcome.is_degraded(), "{reply}");
            assert!(outcome.into_result().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn zero_cap_is_treated_as_one() {
        let gateway = Arc::new(ScriptedGateway::replying(&components(3)));
        let detector = ComponentDetector::new(gateway.clone(), StageTuning::new(0.1, 1000));

        let detections = detector.detect(&ScreenCapture::solid(10, 10), 0).await;
        assert_eq!(detections.len(), 1);
        assert!(gateway.calls()[0].user_prompt.contains("at most 1"));
    }

    #[tokio::test]
    async fn gateway_failure_gives_empty_list() {
        let detector = ComponentDetector::new(
            Arc::new(ScriptedGateway::failing(401)),
            StageTuning::new(0.1, 1000),
        );
        assert!(detector.detect(&ScreenCapture::solid(10, 10), 6).await.is_empty());
    }

    #[tokio::test]
    async fn requests_json_with_the_image() {
        let gateway = Arc::new(ScriptedGateway::replying("{\"components\": []}"));
        let detector = ComponentDetector::new(gateway.clone(), StageTuning::new(0.1, 1000));

        let outcome = detector.detect_outcome(&ScreenCapture::solid(10, 10), 4).await;
        assert!(!outcome.is_degraded());

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].want_json);
        assert!(calls[0].image.is_some());
        assert!(calls[0].user_prompt.contains("at most 4"));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = format!("Here you go:\n```json\n{}\n```", components(2));
        assert_eq!(parse_detections(&raw, 6, 0.0).unwrap().len(), 2);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let raw = json!({
            "components": [
                { "type": "input", "location": "top bar" },
                {}
            ]
        })
        .to_string();
        let detections = parse_detections(&raw, 6, 0.0).unwrap();

        assert_eq!(detections[0].kind(), "input");
        assert_eq!(detections[0].label(), "top bar");
        assert_eq!(detections[0].confidence(), 1.0);
        assert_eq!(detections[0].bounding_box(), BoundingBox::default());

        assert_eq!(detections[1].kind(), "component");
        assert_eq!(detections[1].label(), "component 2");
    }

    #[test]
    fn object_form_bbox_is_normalized() {
        let raw = json!({
            "components": [
                { "type": "card", "bbox": { "x": 100, "y": 50, "width": 80, "height": 30 }, "text": "Card" }
            ]
        })
        .to_string();
        let detections = parse_detections(&raw, 6, 0.0).unwrap();
        assert_eq!(detections[0].bounding_box(), BoundingBox::new(100.0, 50.0, 80.0, 30.0));
    }

    #[test]
    fn min_confidence_filters_before_the_cap() {
        let raw = json!({
            "components": [
                { "type": "a", "confidence": 0.2 },
                { "type": "b", "confidence": 0.8 },
                { "type": "c", "confidence": "0.95" }
            ]
        })
        .to_string();
        let detections = parse_detections(&raw, 2, 0.5).unwrap();
        let kinds: Vec<&str> = detections.iter().map(Detection::kind).collect();
        assert_eq!(kinds, vec!["b", "c"]);
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let raw = r#"{"components": ["button", {"type": "link", "text": "Home"}]}"#;
        let detections = parse_detections(raw, 6, 0.0).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label(), "Home");
    }
}
