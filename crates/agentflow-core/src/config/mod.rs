use serde_json::{Map, Value, json};

use crate::{Error, LayoutMode, Result};

/// Layout and viewport configuration, stored as a JSON object addressed by dotted paths.
///
/// Keys use camelCase to match the trace viewer's front-end conventions:
///
/// ```text
/// layout.mode              zigzag | smart | grid | circle | breadthfirst | dagre | cose-bilkent
/// layout.topMargin         vertical space reserved above the first row
/// viewport.width/height    viewport size in pixels
/// fit.snakePadding         fit margin after a snake layout
/// fit.externalPadding      fit margin after a delegated layout
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig(Value);

impl Default for FlowConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FlowConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn defaults() -> Self {
        Self(json!({
            "layout": {
                "mode": "zigzag",
                "topMargin": 150.0,
            },
            "viewport": {
                "width": 800.0,
                "height": 600.0,
            },
            "fit": {
                "snakePadding": 60.0,
                "externalPadding": 30.0,
            },
        }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a YAML (or JSON, which YAML accepts) document and merges it over the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::defaults());
        }
        let value: Value = serde_yaml::from_str(text)?;
        Self::with_overrides(value)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::with_overrides(value)
    }

    fn with_overrides(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::defaults()),
            Value::Object(_) => {
                let mut cfg = Self::defaults();
                cfg.deep_merge(&value);
                cfg.validate()?;
                Ok(cfg)
            }
            other => Err(Error::InvalidConfig {
                message: format!("expected a mapping at the top level, got `{other}`"),
            }),
        }
    }

    fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64().filter(|v| v.is_finite())
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // A config built with `from_value` may hold any JSON value; coerce to an object so
        // this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    pub fn layout_mode(&self) -> Result<LayoutMode> {
        match self.get_str("layout.mode") {
            Some(raw) => raw.parse(),
            None => Ok(LayoutMode::default()),
        }
    }

    pub fn top_margin(&self) -> f64 {
        self.get_f64("layout.topMargin").unwrap_or(150.0)
    }

    pub fn viewport_width(&self) -> f64 {
        self.get_f64("viewport.width").unwrap_or(800.0)
    }

    pub fn viewport_height(&self) -> f64 {
        self.get_f64("viewport.height").unwrap_or(600.0)
    }

    pub fn snake_fit_padding(&self) -> f64 {
        self.get_f64("fit.snakePadding").unwrap_or(60.0)
    }

    pub fn external_fit_padding(&self) -> f64 {
        self.get_f64("fit.externalPadding").unwrap_or(30.0)
    }

    fn validate(&self) -> Result<()> {
        self.layout_mode()?;
        for key in [
            "layout.topMargin",
            "viewport.width",
            "viewport.height",
            "fit.snakePadding",
            "fit.externalPadding",
        ] {
            if let Some(v) = self.get(key) {
                if !v.as_f64().is_some_and(f64::is_finite) {
                    return Err(Error::InvalidConfig {
                        message: format!("`{key}` must be a number, got `{v}`"),
                    });
                }
            }
        }
        Ok(())
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
