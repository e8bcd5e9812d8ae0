use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Optical,
    Radar,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Optical => "optical",
            Modality::Radar => "radar",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SceneReference
// ---------------------------------------------------------------------------

/// One acquisition as returned by the imagery query layer. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneReference {
    pub scene_id: String,
    pub acquisition_time: DateTime<Utc>,
    pub modality: Modality,
}

// ---------------------------------------------------------------------------
// AreaOfInterest
// ---------------------------------------------------------------------------

/// Axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl AreaOfInterest {
    pub fn is_valid(&self) -> bool {
        self.min_lon < self.max_lon
            && self.min_lat < self.max_lat
            && (-180.0..=180.0).contains(&self.min_lon)
            && (-180.0..=180.0).contains(&self.max_lon)
            && (-90.0..=90.0).contains(&self.min_lat)
            && (-90.0..=90.0).contains(&self.max_lat)
    }

    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &AreaOfInterest) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }
}

// ---------------------------------------------------------------------------
// TimeWindow
// ---------------------------------------------------------------------------

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` leading up to (and excluding) `end`. Saturates at the
    /// earliest representable time.
    pub fn trailing(end: DateTime<Utc>, days: u32) -> Self {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end }
    }

    /// Everything strictly before `end`.
    pub fn until(end: DateTime<Utc>) -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end,
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

// ---------------------------------------------------------------------------
// Attribute filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{n}"),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Lt,
    Gt,
}

/// A metadata predicate such as `CLOUDY_PIXEL_PERCENTAGE lt 20` or
/// `instrumentMode eq IW`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub attribute: String,
    pub op: FilterOp,
    pub value: AttributeValue,
}

impl AttributeFilter {
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            op: FilterOp::Eq,
            value: AttributeValue::Text(value.into()),
        }
    }

    pub fn lt(attribute: impl Into<String>, value: f64) -> Self {
        Self {
            attribute: attribute.into(),
            op: FilterOp::Lt,
            value: AttributeValue::Number(value),
        }
    }

    /// A missing attribute never matches. Ordering ops only apply to numbers;
    /// equality compares numbers numerically and text exactly.
    pub fn matches(&self, actual: Option<&AttributeValue>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match (self.op, actual, &self.value) {
            (FilterOp::Eq, AttributeValue::Number(a), AttributeValue::Number(b)) => a == b,
            (FilterOp::Eq, AttributeValue::Text(a), AttributeValue::Text(b)) => a == b,
            (FilterOp::Lt, AttributeValue::Number(a), AttributeValue::Number(b)) => a < b,
            (FilterOp::Gt, AttributeValue::Number(a), AttributeValue::Number(b)) => a > b,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let w = TimeWindow::new(start, end);
        assert!(w.contains(start));
        assert!(!w.contains(end));
    }

    #[test]
    fn trailing_window_spans_days() {
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let w = TimeWindow::trailing(end, 30);
        assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(w.label(), "2024-03-01 to 2024-03-31");
    }

    #[test]
    fn huge_trailing_window_saturates() {
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let w = TimeWindow::trailing(end, u32::MAX);
        assert_eq!(w.start, DateTime::<Utc>::MIN_UTC);
        assert!(w.contains(Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn aoi_intersection() {
        let kigali = AreaOfInterest {
            min_lon: 30.0,
            min_lat: -2.0,
            max_lon: 30.2,
            max_lat: -1.9,
        };
        let overlapping = AreaOfInterest {
            min_lon: 30.1,
            min_lat: -2.5,
            max_lon: 31.0,
            max_lat: -1.95,
        };
        let far = AreaOfInterest {
            min_lon: 10.0,
            min_lat: 10.0,
            max_lon: 11.0,
            max_lat: 11.0,
        };
        assert!(kigali.is_valid());
        assert!(kigali.intersects(&overlapping));
        assert!(!kigali.intersects(&far));
    }

    #[test]
    fn filter_matching() {
        let cloud = AttributeFilter::lt("CLOUDY_PIXEL_PERCENTAGE", 20.0);
        assert!(cloud.matches(Some(&AttributeValue::Number(5.0))));
        assert!(!cloud.matches(Some(&AttributeValue::Number(20.0))));
        assert!(!cloud.matches(None));
        assert!(!cloud.matches(Some(&AttributeValue::Text("5".into()))));

        let mode = AttributeFilter::eq("instrumentMode", "IW");
        assert!(mode.matches(Some(&AttributeValue::Text("IW".into()))));
        assert!(!mode.matches(Some(&AttributeValue::Text("EW".into()))));
    }

    #[test]
    fn filter_yaml_shape() {
        let yaml = "attribute: CLOUDY_PIXEL_PERCENTAGE\nop: lt\nvalue: 20\n";
        let f: AttributeFilter = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(f, AttributeFilter::lt("CLOUDY_PIXEL_PERCENTAGE", 20.0));
    }
}
