//! Resource Registry - Load resource schemas from JSON
//!
//! This module loads every resource descriptor (columns, form fields, filters,
//! transitions) and the shared option sets from embedded JSON files and
//! provides lookup functions for the rest of the application.

use crate::i18n::Locale;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/common.json"),
    include_str!("../resources/members.json"),
    include_str!("../resources/finance.json"),
    include_str!("../resources/fleet.json"),
];

/// One value of an enumerated field
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDef {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub label_ar: Option<String>,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

impl OptionDef {
    pub fn label(&self, locale: Locale) -> &str {
        match (locale, &self.label_ar) {
            (Locale::Ar, Some(ar)) => ar,
            _ => &self.label,
        }
    }
}

/// How a column value is displayed
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Date,
}

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub header: String,
    /// Dot path; `a|b` tries `a` first and falls back to `b`
    pub json_path: String,
    pub width: u16,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub kind: ColumnKind,
}

/// Input kind of a form field
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Select,
    Reference,
    Bool,
}

/// Form field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    /// Dot path into the record, e.g. `contact.phone`
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Default for new records; `"today"` on date fields means the current date
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Filter input kind
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Text,
    Select,
    Date,
    Reference,
}

/// Filter definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FilterDef {
    /// Query parameter name
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FilterKind,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Row condition gating a transition
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub field: String,
    pub equals: String,
}

/// Status transition definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionDef {
    pub key: String,
    pub display_name: String,
    pub shortcut: String,
    /// Path segment after `/{resource}/{id}/`
    pub path: String,
    /// Option set offered as targets; the choice is sent as `{status}`
    #[serde(default)]
    pub status_options: Option<String>,
    #[serde(default)]
    pub visible_when: Option<Condition>,
}

impl TransitionDef {
    /// Whether the transition applies to a row
    pub fn applies_to(&self, record: &Value) -> bool {
        match &self.visible_when {
            Some(cond) => extract_json_value(record, &cond.field) == cond.equals,
            None => true,
        }
    }

    pub fn needs_target(&self) -> bool {
        self.status_options.is_some()
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    #[serde(skip)]
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub order: u32,
    /// Collection path under the API base
    pub path: String,
    pub id_field: String,
    /// Fields joined to label a record in pickers and dialogs
    #[serde(default)]
    pub label_fields: Vec<String>,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub filters: Vec<FilterDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

impl ResourceDef {
    pub fn record_id(&self, record: &Value) -> Option<String> {
        match record.get(&self.id_field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Human label for a record, falling back to its id
    pub fn record_label(&self, record: &Value) -> String {
        let parts: Vec<String> = self
            .label_fields
            .iter()
            .map(|f| extract_json_value(record, f))
            .filter(|v| v != "-" && !v.is_empty())
            .collect();

        if parts.is_empty() {
            self.record_id(record).unwrap_or_else(|| "-".to_string())
        } else {
            parts.join(" ")
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn filter(&self, key: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn transition_by_shortcut(&self, shortcut: &str) -> Option<&TransitionDef> {
        self.transitions.iter().find(|t| t.shortcut == shortcut)
    }

    /// Resources referenced by form fields or filters
    pub fn referenced_resources(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .fields
            .iter()
            .filter_map(|f| f.reference.clone())
            .chain(self.filters.iter().filter_map(|f| f.reference.clone()))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResourceConfig {
    #[serde(default)]
    pub option_sets: HashMap<String, Vec<OptionDef>>,
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig::default();

        for content in RESOURCE_FILES {
            // Embedded at compile time and covered by tests
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.option_sets.extend(partial.option_sets);
            final_config.resources.extend(partial.resources);
        }

        for (key, def) in final_config.resources.iter_mut() {
            def.key = key.clone();
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// All resource keys in menu order
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut defs: Vec<&ResourceDef> = get_registry().resources.values().collect();
    defs.sort_by_key(|d| d.order);
    defs.into_iter().map(|d| d.key.as_str()).collect()
}

/// Get an option set by name
pub fn get_option_set(name: &str) -> Option<&'static Vec<OptionDef>> {
    get_registry().option_sets.get(name)
}

/// Values of an option set, in declaration order
pub fn option_values(name: &str) -> Vec<String> {
    get_option_set(name)
        .map(|set| set.iter().map(|o| o.value.clone()).collect())
        .unwrap_or_default()
}

/// Display label for a code; unmapped codes pass through unchanged
pub fn label_for(option_set: &str, code: &str, locale: Locale) -> String {
    get_option_set(option_set)
        .and_then(|set| set.iter().find(|o| o.value == code))
        .map(|o| o.label(locale).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Get color for a value based on option set name
pub fn get_color_for_value(option_set: &str, value: &str) -> Option<[u8; 3]> {
    get_option_set(option_set)?
        .iter()
        .find(|o| o.value == value)
        .and_then(|o| o.color)
}

/// Look up a value by dot path (numeric segments index arrays)
pub fn lookup_path<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = item;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) if current.is_array() => current.get(idx)?,
            _ => current.get(part)?,
        };
    }
    Some(current)
}

/// Extract a display value using a dot-notation path.
///
/// `a|b` alternatives are tried in order; the first scalar wins. Missing
/// values render as `-`.
pub fn extract_json_value(item: &Value, path: &str) -> String {
    for alternative in path.split('|') {
        let Some(value) = lookup_path(item, alternative.trim()) else {
            continue;
        };

        match value {
            Value::String(s) => return s.clone(),
            Value::Number(n) => return n.to_string(),
            Value::Bool(b) => return b.to_string(),
            Value::Null => continue,
            // An embedded reference with no better alternative shows its id
            Value::Object(map) => {
                if let Some(Value::String(id)) = map.get("_id") {
                    if path.split('|').last() == Some(alternative) {
                        return id.clone();
                    }
                }
                continue;
            },
            Value::Array(arr) => return format!("[{} items]", arr.len()),
        }
    }
    "-".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert_eq!(registry.resources.len(), 6, "Registry should have six resources");
    }

    #[test]
    fn test_resource_keys_in_menu_order() {
        assert_eq!(
            get_all_resource_keys(),
            vec!["members", "payments", "expenses", "vehicles", "trips", "maintenance"]
        );
    }

    #[test]
    fn test_filters_and_transitions_per_resource() {
        let filters = |k: &str| -> Vec<String> {
            get_resource(k).unwrap().filters.iter().map(|f| f.key.clone()).collect()
        };
        assert_eq!(filters("members"), vec!["status"]);
        assert_eq!(filters("payments"), vec!["date"]);
        assert_eq!(filters("expenses"), vec!["category"]);
        assert_eq!(filters("vehicles"), vec!["status"]);
        assert_eq!(filters("trips"), vec!["status"]);
        assert_eq!(filters("maintenance"), vec!["vehicle"]);

        let expenses = get_resource("expenses").unwrap();
        let keys: Vec<&str> = expenses.transitions.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["approve", "reject"]);
        assert!(get_resource("members").unwrap().transitions.is_empty());

        for key in ["vehicles", "trips", "maintenance"] {
            let def = get_resource(key).unwrap();
            let status = def.transition_by_shortcut("s").unwrap();
            let options = option_values(status.status_options.as_deref().unwrap());
            assert_eq!(options.len(), 4, "{} should offer four statuses", key);
        }
    }

    #[test]
    fn test_every_option_reference_resolves() {
        let registry = get_registry();
        for def in registry.resources.values() {
            for name in def
                .columns
                .iter()
                .filter_map(|c| c.options.as_ref())
                .chain(def.fields.iter().filter_map(|f| f.options.as_ref()))
                .chain(def.filters.iter().filter_map(|f| f.options.as_ref()))
            {
                assert!(get_option_set(name).is_some(), "{}: missing option set {}", def.key, name);
            }
            for reference in def.referenced_resources() {
                assert!(get_resource(&reference).is_some());
            }
        }
    }

    #[test]
    fn test_label_for_passes_unmapped_codes_through() {
        assert_eq!(label_for("expense_category", "rent", Locale::En), "Rent");
        assert_eq!(label_for("expense_category", "rent", Locale::Ar), "إيجار");
        assert_eq!(label_for("payment_type", "تبرع عام", Locale::Ar), "تبرع عام");
        assert_eq!(label_for("no_such_set", "x", Locale::En), "x");
    }

    #[test]
    fn test_extract_nested_and_alternatives() {
        let row = json!({
            "_id": "p1",
            "member": {"_id": "m1", "fullName": {"first": "Ahmed"}},
            "spentBy": "Treasurer",
            "tags": ["a", "b"]
        });
        assert_eq!(extract_json_value(&row, "member.fullName.first"), "Ahmed");
        assert_eq!(extract_json_value(&row, "spentBy.fullName|spentBy"), "Treasurer");
        assert_eq!(extract_json_value(&row, "missing"), "-");
        assert_eq!(extract_json_value(&row, "tags"), "[2 items]");
        assert_eq!(extract_json_value(&row, "tags.1"), "b");
        assert_eq!(extract_json_value(&row, "member.fullName.last|member"), "m1");
    }

    #[test]
    fn test_record_label_and_id() {
        let members = get_resource("members").unwrap();
        let row = json!({"_id": "m1", "fullName": {"first": "Sara", "last": "Ali"}});
        assert_eq!(members.record_id(&row).as_deref(), Some("m1"));
        assert_eq!(members.record_label(&row), "Sara Ali");
        assert_eq!(members.record_label(&json!({"_id": "m2"})), "m2");
    }

    #[test]
    fn test_transition_visibility() {
        let expenses = get_resource("expenses").unwrap();
        let approve = &expenses.transitions[0];
        assert!(approve.applies_to(&json!({"approvalStatus": "pending"})));
        assert!(!approve.applies_to(&json!({"approvalStatus": "approved"})));
        assert!(!approve.needs_target());
    }
}
