//! Edit Session State
//!
//! Modal form state machine: `Closed`, `Create` or `Edit { target_id }`.
//! The draft is a nested JSON object addressed by the dot paths of the
//! resource's field definitions.

use super::query::AsyncStatus;
use super::registry::{lookup_path, FieldDef, FieldKind, ResourceDef};
use crate::api::{ApiResult, FormError};
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Closed,
    Create,
    Edit { target_id: String },
}

/// Request prepared by a successful `begin_submit`
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPlan {
    Create { payload: Value },
    Update { id: String, payload: Value },
}

#[derive(Debug, Clone)]
pub struct EditSession {
    def: &'static ResourceDef,
    mode: EditMode,
    draft: Value,
    busy: bool,
    /// Local validation failure of the last submit attempt
    pub field_error: Option<FormError>,
    pub status: AsyncStatus,
}

impl EditSession {
    pub fn new(def: &'static ResourceDef) -> Self {
        Self {
            def,
            mode: EditMode::Closed,
            draft: Value::Object(Map::new()),
            busy: false,
            field_error: None,
            status: AsyncStatus::default(),
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != EditMode::Closed
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn target_id(&self) -> Option<&str> {
        match &self.mode {
            EditMode::Edit { target_id } => Some(target_id),
            _ => None,
        }
    }

    pub fn draft(&self) -> &Value {
        &self.draft
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        &self.def.fields
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Open an empty form seeded with field defaults
    pub fn open_create(&mut self) {
        self.open_create_on(Local::now().date_naive());
    }

    /// `open_create` with an explicit value for `"today"` defaults
    pub fn open_create_on(&mut self, today: NaiveDate) {
        let mut draft = Value::Object(Map::new());
        for field in &self.def.fields {
            set_path(&mut draft, &field.key, default_value(field, today));
        }
        self.reset(EditMode::Create, draft);
    }

    /// Open the form for an existing record. Returns false when the record
    /// carries no id.
    pub fn open_edit(&mut self, record: &Value) -> bool {
        let Some(id) = self.def.record_id(record) else {
            tracing::warn!("cannot edit {} record without id", self.def.key);
            return false;
        };

        let mut draft = Value::Object(Map::new());
        for field in &self.def.fields {
            set_path(&mut draft, &field.key, seed_value(field, lookup_path(record, &field.key)));
        }
        self.reset(EditMode::Edit { target_id: id }, draft);
        true
    }

    /// Discard the draft
    pub fn close(&mut self) {
        self.reset(EditMode::Closed, Value::Object(Map::new()));
    }

    fn reset(&mut self, mode: EditMode, draft: Value) {
        self.mode = mode;
        self.draft = draft;
        self.busy = false;
        self.field_error = None;
        self.status = AsyncStatus::default();
    }

    // =========================================================================
    // Draft access
    // =========================================================================

    /// Write one value; sibling fields of nested objects are kept
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), FormError> {
        if !self.is_open() {
            return Err(FormError::Closed);
        }
        set_path(&mut self.draft, path, value);
        if matches!(&self.field_error, Some(FormError::Required { field, .. }) if field == path) {
            self.field_error = None;
        }
        Ok(())
    }

    pub fn field_value(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.draft, path)
    }

    /// Draft value as editable text
    pub fn field_text(&self, path: &str) -> String {
        match self.field_value(path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// First required field left empty
    pub fn validate(&self) -> Result<(), FormError> {
        for field in self.def.fields.iter().filter(|f| f.required) {
            if is_blank(self.field_value(&field.key)) {
                return Err(FormError::Required {
                    field: field.key.clone(),
                    label: field.label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Draft converted for sending: number fields become JSON numbers
    pub fn to_payload(&self) -> Value {
        let mut payload = self.draft.clone();
        for field in self.def.fields.iter().filter(|f| f.kind == FieldKind::Number) {
            let Some(Value::String(text)) = lookup_path(&payload, &field.key) else {
                continue;
            };
            if let Some(number) = parse_number(text) {
                set_path(&mut payload, &field.key, number);
            }
        }
        payload
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate and mark the session busy.
    ///
    /// Fails when closed or already submitting. A required field left empty
    /// is recorded in `field_error` and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<SubmitPlan, FormError> {
        if self.busy {
            return Err(FormError::Busy);
        }

        let plan = match &self.mode {
            EditMode::Closed => return Err(FormError::Closed),
            EditMode::Create => SubmitPlan::Create { payload: Value::Null },
            EditMode::Edit { target_id } => SubmitPlan::Update {
                id: target_id.clone(),
                payload: Value::Null,
            },
        };

        if let Err(e) = self.validate() {
            self.field_error = Some(e.clone());
            return Err(e);
        }

        self.field_error = None;
        self.busy = true;
        self.status.start();

        let payload = self.to_payload();
        Ok(match plan {
            SubmitPlan::Create { .. } => SubmitPlan::Create { payload },
            SubmitPlan::Update { id, .. } => SubmitPlan::Update { id, payload },
        })
    }

    /// Record the server's answer. Success closes the form; failure keeps
    /// the mode and the draft.
    pub fn finish_submit(&mut self, result: &ApiResult<Value>, fallback: &str) -> bool {
        self.busy = false;
        match result {
            Ok(_) => {
                self.close();
                true
            },
            Err(e) => {
                tracing::warn!("saving {} failed: {}", self.def.key, e);
                self.status.fail(e.user_message(fallback));
                false
            },
        }
    }
}

/// Merge `value` into `root` at a dot path, creating objects on the way
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let mut parts = path.split('.').peekable();
    let mut current = root;

    while let Some(part) = parts.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };

        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return;
        }
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn default_value(field: &FieldDef, today: NaiveDate) -> Value {
    match (&field.default, field.kind) {
        (Some(Value::String(s)), FieldKind::Date) if s == "today" => {
            Value::String(today.format("%Y-%m-%d").to_string())
        },
        (Some(default), _) => default.clone(),
        (None, FieldKind::Bool) => Value::Bool(false),
        (None, _) => Value::String(String::new()),
    }
}

fn seed_value(field: &FieldDef, value: Option<&Value>) -> Value {
    let value = match value {
        Some(Value::Null) | None => {
            return match field.kind {
                FieldKind::Bool => Value::Bool(false),
                _ => Value::String(String::new()),
            };
        },
        Some(v) => v,
    };

    match (field.kind, value) {
        // Populated references arrive as embedded objects
        (FieldKind::Reference, Value::Object(map)) => map
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new())),
        (FieldKind::Date, Value::String(s)) => Value::String(truncate_date(s)),
        _ => value.clone(),
    }
}

/// `2024-03-01T00:00:00.000Z` → `2024-03-01`
fn truncate_date(s: &str) -> String {
    match s.get(..10) {
        Some(day) if NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok() => day.to_string(),
        _ => s.to_string(),
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::resource::registry::get_resource;
    use serde_json::json;

    fn session(key: &str) -> EditSession {
        EditSession::new(get_resource(key).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn test_open_create_seeds_defaults() {
        let mut edit = session("payments");
        edit.open_create_on(day());
        assert_eq!(edit.mode(), &EditMode::Create);
        assert_eq!(edit.target_id(), None);
        assert_eq!(edit.field_text("paymentDate"), "2024-05-17");
        assert_eq!(edit.field_text("paymentMethod"), "cash");
        assert_eq!(edit.field_value("isPaid"), Some(&json!(true)));
        assert_eq!(edit.field_text("amount"), "");
    }

    #[test]
    fn test_open_edit_seeds_nested_values() {
        let mut edit = session("members");
        let record = json!({
            "_id": "m1",
            "fullName": {"first": "Sara", "last": "Ali"},
            "contact": {"phone": "0500", "email": "s@x.org"},
            "primaryAddress": {"city": "Riyadh"},
            "dateOfBirth": "1990-04-02T00:00:00.000Z",
            "membershipStatus": "active"
        });
        assert!(edit.open_edit(&record));
        assert_eq!(edit.target_id(), Some("m1"));
        assert_eq!(edit.field_text("fullName.first"), "Sara");
        assert_eq!(edit.field_text("fullName.last"), "Ali");
        assert_eq!(edit.field_text("contact.email"), "s@x.org");
        assert_eq!(edit.field_text("dateOfBirth"), "1990-04-02");
        assert_eq!(edit.field_text("fullName.middle"), "");
    }

    #[test]
    fn test_open_edit_takes_reference_ids() {
        let mut edit = session("maintenance");
        let record = json!({"_id": "x1", "vehicle": {"_id": "v9", "make": "Toyota"}, "cost": 120});
        assert!(edit.open_edit(&record));
        assert_eq!(edit.field_text("vehicle"), "v9");
        assert_eq!(edit.field_value("cost"), Some(&json!(120)));
        assert!(!edit.open_edit(&json!({"cost": 1})));
        assert_eq!(edit.target_id(), Some("x1"));
    }

    #[test]
    fn test_set_field_merges_nested() {
        let mut edit = session("members");
        assert_eq!(edit.set_field("fullName.first", json!("x")), Err(FormError::Closed));

        edit.open_create_on(day());
        edit.set_field("fullName.first", json!("Omar")).unwrap();
        edit.set_field("fullName.last", json!("Saleh")).unwrap();
        assert_eq!(edit.draft()["fullName"]["first"], "Omar");
        assert_eq!(edit.draft()["fullName"]["last"], "Saleh");
    }

    #[test]
    fn test_close_discards_draft() {
        let mut edit = session("members");
        edit.open_create_on(day());
        edit.set_field("nationalId", json!("123")).unwrap();
        edit.close();
        assert!(!edit.is_open());
        assert_eq!(edit.draft(), &json!({}));
    }

    #[test]
    fn test_required_fields_block_submit() {
        let mut edit = session("expenses");
        edit.open_create_on(day());
        let err = edit.begin_submit().unwrap_err();
        assert!(matches!(err, FormError::Required { ref field, .. } if field == "category"));
        assert!(!edit.is_busy());
        assert_eq!(edit.field_error, Some(err));
    }

    #[test]
    fn test_submit_plan_and_busy_guard() {
        let mut edit = session("expenses");
        edit.open_create_on(day());
        for (k, v) in [("category", "rent"), ("amount", "250.5"), ("spentBy", "Ali"), ("purpose", "Hall")] {
            edit.set_field(k, json!(v)).unwrap();
        }

        let plan = edit.begin_submit().unwrap();
        let SubmitPlan::Create { payload } = plan else {
            panic!("expected create");
        };
        assert_eq!(payload["amount"], json!(250.5));
        assert_eq!(payload["approvalStatus"], "pending");
        assert_eq!(edit.begin_submit(), Err(FormError::Busy));

        let failed: ApiResult<Value> = Err(ApiError::Validation("amount must be positive".into()));
        assert!(!edit.finish_submit(&failed, "fallback"));
        assert_eq!(edit.mode(), &EditMode::Create);
        assert_eq!(edit.field_text("purpose"), "Hall");
        assert_eq!(edit.status.error.as_deref(), Some("amount must be positive"));

        assert!(edit.begin_submit().is_ok());
        assert!(edit.finish_submit(&Ok(json!({"_id": "e1"})), "fallback"));
        assert!(!edit.is_open());
    }

    #[test]
    fn test_update_plan_targets_record() {
        let mut edit = session("vehicles");
        let record = json!({
            "_id": "v1", "make": "Toyota", "model": "Hilux", "year": 2020,
            "licensePlate": "ABC", "status": "available", "currentOdometer": 1000,
            "fuelType": "diesel"
        });
        edit.open_edit(&record);
        edit.set_field("currentOdometer", json!("1500")).unwrap();
        match edit.begin_submit().unwrap() {
            SubmitPlan::Update { id, payload } => {
                assert_eq!(id, "v1");
                assert_eq!(payload["currentOdometer"], json!(1500));
                assert_eq!(payload["year"], json!(2020));
            },
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_set_path_replaces_scalars() {
        let mut v = json!({"a": 1});
        set_path(&mut v, "a.b", json!(2));
        assert_eq!(v, json!({"a": {"b": 2}}));
    }
}
