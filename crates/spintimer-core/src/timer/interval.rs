use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalCategory {
    #[serde(alias = "calentamiento")]
    Warmup,
    #[serde(alias = "intenso")]
    Intense,
    #[serde(alias = "medio")]
    Medium,
    #[serde(alias = "enfriamiento")]
    Cooldown,
    #[default]
    Custom,
}

impl IntervalCategory {
    pub const ALL: [IntervalCategory; 5] = [
        IntervalCategory::Warmup,
        IntervalCategory::Intense,
        IntervalCategory::Medium,
        IntervalCategory::Cooldown,
        IntervalCategory::Custom,
    ];

    /// Color an interval of this category gets unless overridden.
    pub fn default_color(self) -> &'static str {
        match self {
            IntervalCategory::Warmup => "#3B82F6",
            IntervalCategory::Intense => "#EF4444",
            IntervalCategory::Medium => "#F59E0B",
            IntervalCategory::Cooldown => "#10B981",
            IntervalCategory::Custom => "#8B5CF6",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntervalCategory::Warmup => "warmup",
            IntervalCategory::Intense => "intense",
            IntervalCategory::Medium => "medium",
            IntervalCategory::Cooldown => "cooldown",
            IntervalCategory::Custom => "custom",
        }
    }

    /// Parse a category label, accepting the legacy Spanish labels too.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "warmup" | "warm-up" | "calentamiento" => Some(IntervalCategory::Warmup),
            "intense" | "intenso" => Some(IntervalCategory::Intense),
            "medium" | "medio" => Some(IntervalCategory::Medium),
            "cooldown" | "cool-down" | "enfriamiento" => Some(IntervalCategory::Cooldown),
            "custom" => Some(IntervalCategory::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntervalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true for `#RRGGBB` colors.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// A single named, timed segment of a training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalDefinition {
    pub id: String,
    pub name: String,
    pub duration_secs: u64,
    pub category: IntervalCategory,
    pub color: String,
}

impl IntervalDefinition {
    /// Create a definition with a fresh id and the category's default color.
    pub fn new(name: impl Into<String>, duration_secs: u64, category: IntervalCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration_secs,
            category,
            color: category.default_color().to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Copy of this definition under a new id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_category_color() {
        let def = IntervalDefinition::new("Sprint", 30, IntervalCategory::Intense);
        assert_eq!(def.color, "#EF4444");
        assert!(!def.id.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let a = IntervalDefinition::new("A", 10, IntervalCategory::Custom);
        let b = a.duplicate();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn legacy_category_labels_deserialize() {
        let cat: IntervalCategory = serde_json::from_str("\"enfriamiento\"").unwrap();
        assert_eq!(cat, IntervalCategory::Cooldown);
        assert_eq!(serde_json::to_string(&cat).unwrap(), "\"cooldown\"");
    }

    #[test]
    fn parse_labels() {
        assert_eq!(IntervalCategory::parse("Warm-Up"), Some(IntervalCategory::Warmup));
        assert_eq!(IntervalCategory::parse("intenso"), Some(IntervalCategory::Intense));
        assert_eq!(IntervalCategory::parse("tempo"), None);
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#8b5cf6"));
        assert!(!is_hex_color("8B5CF6"));
        assert!(!is_hex_color("#8B5CF"));
        assert!(!is_hex_color("#GGGGGG"));
    }
}
