//! JSON import/export of interval sequences.
//!
//! Export layout:
//!
//! ```json
//! {
//!   "name": "Hill repeats",
//!   "description": "optional",
//!   "intervals": [
//!     { "name": "Warm up", "duration": 300, "type": "warmup", "color": "#3B82F6" }
//!   ],
//!   "exportedAt": "2024-05-01T10:00:00Z"
//! }
//! ```
//!
//! Import is lenient about optional fields (`type`, `color`, timestamps) and
//! strict about `name` and a positive `duration` on every interval.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::timer::{is_hex_color, IntervalCategory, IntervalDefinition, IntervalSequence};

const DEFAULT_IMPORT_NAME: &str = "Imported training";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTraining {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub intervals: Vec<ExportedInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedInterval {
    pub name: String,
    /// Seconds.
    pub duration: u64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IntervalCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ExportedTraining {
    pub fn from_sequence(
        name: impl Into<String>,
        description: Option<String>,
        sequence: &IntervalSequence,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            intervals: sequence
                .intervals()
                .iter()
                .map(|i| ExportedInterval {
                    name: i.name.clone(),
                    duration: i.duration_secs,
                    category: Some(i.category),
                    color: Some(i.color.clone()),
                })
                .collect(),
            exported_at: Some(exported_at),
            created_at: None,
        }
    }
}

/// Result of a successful import: fresh ids, validated intervals.
#[derive(Debug, Clone)]
pub struct ImportedTraining {
    pub name: String,
    pub description: Option<String>,
    pub intervals: Vec<IntervalDefinition>,
}

impl ImportedTraining {
    pub fn sequence(&self) -> Result<IntervalSequence> {
        IntervalSequence::build(self.intervals.clone())
    }
}

/// Pretty-printed JSON for an export.
pub fn export_json(training: &ExportedTraining) -> Result<String> {
    Ok(serde_json::to_string_pretty(training)?)
}

/// File name used when exporting on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("training-{}.json", date.format("%Y-%m-%d"))
}

/// Parse an import payload.
///
/// Every failure is reported as [`CoreError::ImportFormat`] with a message
/// naming the offending interval.
pub fn import_json(payload: &str) -> Result<ImportedTraining> {
    let root: Value = serde_json::from_str(payload)
        .map_err(|e| CoreError::ImportFormat(format!("invalid JSON: {e}")))?;

    let obj = root
        .as_object()
        .ok_or_else(|| CoreError::ImportFormat("top level must be an object".into()))?;

    let entries = obj
        .get("intervals")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::ImportFormat("must contain an 'intervals' array".into()))?;

    if entries.is_empty() {
        return Err(CoreError::ImportFormat("'intervals' is empty".into()));
    }

    let intervals = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_interval(index, entry))
        .collect::<Result<Vec<_>>>()?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMPORT_NAME)
        .to_string();
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty());

    Ok(ImportedTraining {
        name,
        description,
        intervals,
    })
}

fn parse_interval(index: usize, entry: &Value) -> Result<IntervalDefinition> {
    let position = index + 1;
    let fail = |msg: &str| CoreError::ImportFormat(format!("interval {position}: {msg}"));

    let obj = entry.as_object().ok_or_else(|| fail("must be an object"))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| fail("missing 'name'"))?;

    let duration = match obj.get("duration") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|&d| d > 0)
    .ok_or_else(|| fail("'duration' must be a positive whole number of seconds"))?;

    let category = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(IntervalCategory::parse)
        .unwrap_or(IntervalCategory::Custom);

    let mut def = IntervalDefinition::new(name, duration, category);
    match obj.get("color") {
        None | Some(Value::Null) => {}
        Some(Value::String(c)) if is_hex_color(c) => def = def.with_color(c.clone()),
        Some(_) => return Err(fail("'color' must be a #RRGGBB string")),
    }
    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn imports_legacy_payload() {
        let payload = r##"{
            "name": "Hill repeats",
            "description": "Entrenamiento exportado",
            "intervals": [
                { "name": "Calentamiento", "duration": 240, "type": "calentamiento", "color": "#3B82F6" },
                { "name": "Subida", "duration": "120", "type": "intenso" },
                { "name": "Suelto", "duration": 60 }
            ],
            "exportedAt": "2024-05-01T10:00:00.000Z"
        }"##;
        let imported = import_json(payload).unwrap();
        assert_eq!(imported.name, "Hill repeats");
        assert_eq!(imported.intervals.len(), 3);
        assert_eq!(imported.intervals[0].category, IntervalCategory::Warmup);
        assert_eq!(imported.intervals[1].duration_secs, 120);
        assert_eq!(imported.intervals[1].color, "#EF4444");
        assert_eq!(imported.intervals[2].category, IntervalCategory::Custom);
        assert_eq!(imported.sequence().unwrap().total_duration_secs(), 420);
    }

    #[test]
    fn rejects_missing_name() {
        let err = import_json(r#"{"intervals":[{"duration":10}]}"#).unwrap_err();
        assert_eq!(err.to_string(), "Import failed: interval 1: missing 'name'");
    }

    #[test]
    fn rejects_non_positive_duration() {
        for bad in ["0", "-5", "\"abc\"", "1.5", "null"] {
            let payload = format!(r#"{{"intervals":[{{"name":"A","duration":{bad}}}]}}"#);
            let err = import_json(&payload).unwrap_err();
            assert!(matches!(err, CoreError::ImportFormat(_)), "accepted {bad}");
        }
    }

    #[test]
    fn rejects_missing_intervals() {
        assert!(matches!(import_json("{}"), Err(CoreError::ImportFormat(_))));
        assert!(matches!(import_json("[]"), Err(CoreError::ImportFormat(_))));
        assert!(matches!(import_json("not json"), Err(CoreError::ImportFormat(_))));
        assert!(matches!(
            import_json(r#"{"intervals":[]}"#),
            Err(CoreError::ImportFormat(_))
        ));
    }

    #[test]
    fn rejects_bad_color() {
        let err = import_json(r#"{"intervals":[{"name":"A","duration":5,"color":"red"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("color"));
    }

    #[test]
    fn export_uses_camel_case_and_type() {
        let seq = IntervalSequence::build(vec![IntervalDefinition::new(
            "Sprint",
            30,
            IntervalCategory::Intense,
        )])
        .unwrap();
        let out = ExportedTraining::from_sequence("Set", None, &seq, Utc::now());
        let json: Value = serde_json::from_str(&export_json(&out).unwrap()).unwrap();
        assert!(json.get("exportedAt").is_some());
        assert!(json.get("description").is_none());
        assert_eq!(json["intervals"][0]["type"], "intense");
        assert_eq!(json["intervals"][0]["duration"], 30);
    }

    #[test]
    fn file_name_has_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "training-2024-03-09.json");
    }

    fn category() -> impl Strategy<Value = IntervalCategory> {
        prop::sample::select(IntervalCategory::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn export_then_import_preserves_sequence(
            items in prop::collection::vec(("[A-Za-z][A-Za-z ]{0,12}", 1u64..100_000, category()), 1..12)
        ) {
            let defs: Vec<_> = items
                .iter()
                .map(|(n, d, c)| IntervalDefinition::new(n.trim().to_string(), *d, *c))
                .collect();
            let seq = IntervalSequence::build(defs).unwrap();
            let json = export_json(&ExportedTraining::from_sequence("P", None, &seq, Utc::now())).unwrap();
            let back = import_json(&json).unwrap().sequence().unwrap();

            prop_assert_eq!(back.len(), seq.len());
            prop_assert_eq!(back.total_duration_secs(), seq.total_duration_secs());
            for (a, b) in seq.intervals().iter().zip(back.intervals()) {
                prop_assert_eq!(&a.name, &b.name);
                prop_assert_eq!(a.duration_secs, b.duration_secs);
                prop_assert_eq!(a.category, b.category);
                prop_assert_eq!(&a.color, &b.color);
            }
        }
    }
}
