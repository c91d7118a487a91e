use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Axis-aligned rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The two shapes providers use for a box.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBoundingBox {
    Array([f32; 4]),
    Object {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Normalizes `[x, y, w, h]` or `{x, y, width, height}` into a box.
    /// Anything else yields the zero box.
    pub fn from_value(value: &Value) -> Self {
        match RawBoundingBox::deserialize(value) {
            Ok(RawBoundingBox::Array([x, y, width, height])) => Self::new(x, y, width, height),
            Ok(RawBoundingBox::Object {
                x,
                y,
                width,
                height,
            }) => Self::new(x, y, width, height),
            Err(_) => Self::default(),
        }
    }

    /// Multiplies position and extent per axis, e.g. to move between a
    /// downscaled image and its source.
    pub fn scaled(&self, scale_x: f32, scale_y: f32) -> Self {
        Self::new(
            self.x * scale_x,
            self.y * scale_y,
            self.width * scale_x,
            self.height * scale_y,
        )
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }
}

/// One UI element the model reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    kind: String,
    bounding_box: BoundingBox,
    confidence: f32,
    label: String,
}

impl Detection {
    pub fn new(kind: impl Into<String>, bounding_box: BoundingBox, confidence: f32, label: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            kind: kind.into(),
            bounding_box,
            confidence,
            label: label.into(),
        }
    }

    pub fn rescaled(self, scale_x: f32, scale_y: f32) -> Self {
        Self {
            bounding_box: self.bounding_box.scaled(scale_x, scale_y),
            ..self
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_and_object_boxes_normalize_identically() {
        let from_array = BoundingBox::from_value(&json!([10, 10, 50, 20]));
        let from_object = BoundingBox::from_value(&json!({"x": 10, "y": 10, "width": 50, "height": 20}));
        assert_eq!(from_array, from_object);
        assert_eq!(from_array, BoundingBox::new(10.0, 10.0, 50.0, 20.0));
    }

    #[test]
    fn scaling_moves_position_and_extent() {
        let scaled = BoundingBox::new(10.0, 10.0, 50.0, 20.0).scaled(4.0, 4.0);
        assert_eq!(scaled, BoundingBox::new(40.0, 40.0, 200.0, 80.0));
        assert_eq!(scaled.scaled(0.25, 0.25), BoundingBox::new(10.0, 10.0, 50.0, 20.0));
    }

    #[test]
    fn unrecognized_box_shapes_become_zero() {
        assert_eq!(BoundingBox::from_value(&json!([1, 2, 3])), BoundingBox::default());
        assert_eq!(BoundingBox::from_value(&json!("10,10,5,5")), BoundingBox::default());
        assert_eq!(BoundingBox::from_value(&json!({"x": 1, "y": 2})), BoundingBox::default());
    }

    #[test]
    fn negative_extent_is_clamped() {
        let b = BoundingBox::from_value(&json!([5, 5, -3, 8]));
        assert_eq!(b.width, 0.0);
        assert!(b.is_empty());
    }

    #[test]
    fn confidence_is_clamped_into_unit_range() {
        let d = Detection::new("button", BoundingBox::default(), 1.7, "OK");
        assert_eq!(d.confidence(), 1.0);
        let d = Detection::new("button", BoundingBox::default(), -0.2, "OK");
        assert_eq!(d.confidence(), 0.0);
    }
}
