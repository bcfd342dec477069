pub mod completions;
pub mod config;
pub mod run;
pub mod sets;
pub mod transfer;

use std::path::{Path, PathBuf};

use clap::Args;
use spintimer_core::storage::ColorsConfig;
use spintimer_core::{
    import_json, CoreError, Database, IntervalCategory, IntervalDefinition, IntervalSequence,
    SavedSet,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Where a sequence comes from. At most one source may be given.
#[derive(Args, Debug, Default)]
pub struct SequenceSource {
    /// Saved set id, id prefix, or exact name
    #[arg(long, conflicts_with_all = ["file", "intervals"])]
    pub set: Option<String>,
    /// JSON file in export format ("-" for stdin)
    #[arg(long, conflicts_with = "intervals")]
    pub file: Option<PathBuf>,
    /// Inline interval as NAME:DURATION[:TYPE[:COLOR]], repeatable.
    /// DURATION is seconds, or a form like 5m, 90s, 1m30s.
    #[arg(long = "interval", short = 'i', value_name = "SPEC")]
    pub intervals: Vec<String>,
}

impl SequenceSource {
    pub fn is_empty(&self) -> bool {
        self.set.is_none() && self.file.is_none() && self.intervals.is_empty()
    }
}

/// A resolved sequence plus the saved set it came from, if any.
pub struct Resolved {
    pub sequence: IntervalSequence,
    pub name: Option<String>,
    pub description: Option<String>,
    pub saved_set: Option<SavedSet>,
}

/// Build a sequence from the given source.
pub fn resolve_sequence(
    source: &SequenceSource,
    db: &Database,
    colors: &ColorsConfig,
) -> CliResult<Resolved> {
    if let Some(key) = &source.set {
        let set = find_set(db, key)?;
        return Ok(Resolved {
            sequence: set.sequence()?,
            name: Some(set.name.clone()),
            description: set.description.clone(),
            saved_set: Some(set),
        });
    }

    if let Some(path) = &source.file {
        let imported = import_json(&read_input(path)?)?;
        return Ok(Resolved {
            sequence: imported.sequence()?,
            name: Some(imported.name),
            description: imported.description,
            saved_set: None,
        });
    }

    let defs = source
        .intervals
        .iter()
        .map(|spec| parse_interval_spec(spec, colors))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Resolved {
        sequence: IntervalSequence::build(defs)?,
        name: None,
        description: None,
        saved_set: None,
    })
}

pub fn find_set(db: &Database, key: &str) -> CliResult<SavedSet> {
    db.find_saved_set(key)?.ok_or_else(|| {
        CoreError::NotFound {
            kind: "saved set",
            id: key.to_string(),
        }
        .into()
    })
}

pub fn read_input(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Parse `NAME:DURATION[:TYPE[:COLOR]]`.
pub fn parse_interval_spec(
    spec: &str,
    colors: &ColorsConfig,
) -> Result<IntervalDefinition, String> {
    let mut parts = spec.split(':');
    let name = parts.next().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(format!("interval '{spec}': name is empty"));
    }
    let duration = parts
        .next()
        .ok_or_else(|| format!("interval '{spec}': missing duration"))
        .and_then(|d| parse_duration(d).map_err(|e| format!("interval '{spec}': {e}")))?;
    let category = match parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        Some(label) => IntervalCategory::parse(label)
            .ok_or_else(|| format!("interval '{spec}': unknown type '{label}'"))?,
        None => IntervalCategory::Custom,
    };
    let color = match parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        Some(c) if spintimer_core::timer::is_hex_color(c) => c.to_string(),
        Some(c) => return Err(format!("interval '{spec}': '{c}' is not a #RRGGBB color")),
        None => colors.for_category(category).to_string(),
    };
    if parts.next().is_some() {
        return Err(format!("interval '{spec}': too many ':' separated fields"));
    }
    Ok(IntervalDefinition::new(name, duration, category).with_color(color))
}

/// Parse `90`, `90s`, `5m` or `1m30s` into seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> Result<u64, String> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<u64>() {
        return positive(secs, input);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    let mut seen_unit = false;
    for c in input.chars() {
        match c {
            '0'..='9' => digits.push(c),
            'm' | 's' => {
                let n: u64 = digits
                    .parse()
                    .map_err(|_| format!("invalid duration '{input}'"))?;
                total = total.saturating_add(if c == 'm' { n.saturating_mul(60) } else { n });
                digits.clear();
                seen_unit = true;
            }
            _ => return Err(format!("invalid duration '{input}'")),
        }
    }
    if !digits.is_empty() || !seen_unit {
        return Err(format!("invalid duration '{input}'"));
    }
    positive(total, input)
}

fn positive(secs: u64, input: &str) -> Result<u64, String> {
    if secs == 0 {
        Err(format!("duration '{input}' must be at least one second"))
    } else {
        Ok(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("90"), Ok(90));
        assert_eq!(parse_duration("90s"), Ok(90));
        assert_eq!(parse_duration("5m"), Ok(300));
        assert_eq!(parse_duration("1m30s"), Ok(90));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("0m").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("1m30").is_err());
    }

    #[test]
    fn interval_specs() {
        let colors = ColorsConfig::default();
        let def = parse_interval_spec("Climb:2m:intense", &colors).unwrap();
        assert_eq!(def.name, "Climb");
        assert_eq!(def.duration_secs, 120);
        assert_eq!(def.category, IntervalCategory::Intense);
        assert_eq!(def.color, "#EF4444");

        let def = parse_interval_spec("Easy:60::#123abc", &colors).unwrap();
        assert_eq!(def.category, IntervalCategory::Custom);
        assert_eq!(def.color, "#123abc");

        assert!(parse_interval_spec(":60", &colors).is_err());
        assert!(parse_interval_spec("A", &colors).is_err());
        assert!(parse_interval_spec("A:0", &colors).is_err());
        assert!(parse_interval_spec("A:10:tempo", &colors).is_err());
        assert!(parse_interval_spec("A:10:custom:blue", &colors).is_err());
    }

    #[test]
    fn config_colors_override_category_default() {
        let mut colors = ColorsConfig::default();
        colors.warmup = "#000000".into();
        let def = parse_interval_spec("Warm:60:warmup", &colors).unwrap();
        assert_eq!(def.color, "#000000");
    }
}
