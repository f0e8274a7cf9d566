//! Composite Screen
//!
//! One `ResourceScreen` per resource binds a `ResourceClient`, the list
//! state and the edit session. Members, payments, expenses, vehicles, trips
//! and maintenance differ only in their registry descriptor.

use super::client::{ResourceClient, Transition, LOOKUP_LIMIT};
use super::edit::{EditSession, SubmitPlan};
use super::query::{Applied, AsyncStatus, ListResult, ListState, PAGE_SIZE};
use super::registry::ResourceDef;
use crate::api::{ApiClient, ApiResult, FormError};
use crate::i18n::{Failure, Locale};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::mpsc::UnboundedSender;

/// A finished background list fetch
#[derive(Debug)]
pub struct ListResponse {
    pub resource: String,
    pub seq: u64,
    pub result: ApiResult<ListResult>,
}

/// Reference resource key and its (id, label) options
pub type LookupResult = (String, ApiResult<Vec<(String, String)>>);

/// A finished background call, routed back to the screen that issued it
#[derive(Debug)]
pub enum ScreenEvent {
    List(ListResponse),
    Saved {
        resource: String,
        result: ApiResult<Value>,
    },
    Action {
        resource: String,
        failure: Failure,
        result: ApiResult<Value>,
    },
    Lookups {
        resource: String,
        results: Vec<LookupResult>,
    },
    Detail {
        resource: String,
        id: String,
        result: ApiResult<Value>,
    },
}

impl ScreenEvent {
    pub fn resource(&self) -> &str {
        match self {
            ScreenEvent::List(response) => &response.resource,
            ScreenEvent::Saved { resource, .. }
            | ScreenEvent::Action { resource, .. }
            | ScreenEvent::Lookups { resource, .. }
            | ScreenEvent::Detail { resource, .. } => resource,
        }
    }
}

/// Answer to a yes/no prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// What a row action or submission ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Server accepted; the list has been invalidated
    Completed,
    /// Server or transport failure, recorded in the owning status
    Failed,
    /// Nothing was sent (declined, or another action in flight)
    Skipped,
}

pub struct ResourceScreen {
    client: ResourceClient,
    pub list: ListState,
    pub edit: EditSession,
    /// Row actions (delete and transitions)
    pub action_status: AsyncStatus,
    pub selected: usize,
    busy: bool,
    locale: Locale,
    /// Reference resource key → (id, label) options for pickers
    lookups: HashMap<String, Vec<(String, String)>>,
    lookups_loading: bool,
    /// Full record fetched for the detail view, keyed by id
    detail: Option<(String, Value)>,
    pub detail_status: AsyncStatus,
}

impl ResourceScreen {
    pub fn new(client: ResourceClient, locale: Locale) -> Self {
        let def = client.def();
        Self {
            client,
            list: ListState::new(PAGE_SIZE),
            edit: EditSession::new(def),
            action_status: AsyncStatus::default(),
            selected: 0,
            busy: false,
            locale,
            lookups: HashMap::new(),
            lookups_loading: false,
            detail: None,
            detail_status: AsyncStatus::default(),
        }
    }

    pub fn def(&self) -> &'static ResourceDef {
        self.client.def()
    }

    pub fn key(&self) -> &'static str {
        &self.client.def().key
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn selected_record(&self) -> Option<&Value> {
        self.list.rows().get(self.selected)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_record().and_then(|r| self.def().record_id(r))
    }

    // =========================================================================
    // List
    // =========================================================================

    /// Issue the scheduled refresh on a background task. Returns the
    /// sequence number when a request went out.
    pub fn spawn_refresh(&mut self, tx: &UnboundedSender<ScreenEvent>) -> Option<u64> {
        let ticket = self.list.take_scheduled()?;
        let client = self.client.clone();
        let tx = tx.clone();
        let resource = self.key().to_string();

        tracing::debug!("list {} page {} (seq {})", resource, ticket.query.page, ticket.seq);
        tokio::spawn(async move {
            let result = client.list(&ticket.query).await;
            let _ = tx.send(ScreenEvent::List(ListResponse {
                resource,
                seq: ticket.seq,
                result,
            }));
        });
        Some(ticket.seq)
    }

    /// Run the scheduled refresh inline, if any
    pub async fn refresh_scheduled(&mut self) -> Option<Applied> {
        let ticket = self.list.take_scheduled()?;
        let result = self.client.list(&ticket.query).await;
        Some(self.apply_list(ticket.seq, result))
    }

    /// Refetch the current page now
    pub async fn refresh_now(&mut self) -> Applied {
        self.list.invalidate();
        self.refresh_scheduled().await.unwrap_or(Applied::Stale)
    }

    pub fn apply_list_response(&mut self, response: ListResponse) -> Applied {
        self.apply_list(response.seq, response.result)
    }

    fn apply_list(&mut self, seq: u64, result: ApiResult<ListResult>) -> Applied {
        let applied = self
            .list
            .apply(seq, result, Failure::Load.message(self.locale));
        let len = self.list.rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        applied
    }

    // =========================================================================
    // Detail
    // =========================================================================

    /// Fetch the selected record in full for the detail view
    pub fn spawn_detail(&mut self, tx: &UnboundedSender<ScreenEvent>) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        self.detail = None;
        self.detail_status.start();

        let client = self.client.clone();
        let tx = tx.clone();
        let resource = self.key().to_string();
        tokio::spawn(async move {
            let result = client.get(&id).await;
            let _ = tx.send(ScreenEvent::Detail { resource, id, result });
        });
        true
    }

    /// Keep a fetched record if it is still the selected one
    pub fn apply_detail(&mut self, id: String, result: ApiResult<Value>) -> Applied {
        if self.selected_id().as_deref() != Some(id.as_str()) {
            tracing::debug!("dropping detail of {} {}, selection moved", self.key(), id);
            return Applied::Stale;
        }
        match result {
            Ok(record) => {
                self.detail = Some((id, record));
                self.detail_status.succeed();
            },
            Err(e) => {
                tracing::warn!("detail of {} {} failed: {}", self.key(), id, e);
                self.detail_status
                    .fail(e.user_message(Failure::Load.message(self.locale)));
            },
        }
        Applied::Applied
    }

    /// Record for the detail view: the fetched one when it matches the
    /// selection, otherwise the list row
    pub fn detail_record(&self) -> Option<&Value> {
        let selected = self.selected_id();
        match &self.detail {
            Some((id, record)) if selected.as_deref() == Some(id.as_str()) => Some(record),
            _ => self.selected_record(),
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Send the open draft on a background task: POST for a new record,
    /// PUT for an existing one. The answer arrives as `ScreenEvent::Saved`.
    pub fn spawn_submit(&mut self, tx: &UnboundedSender<ScreenEvent>) -> Result<(), FormError> {
        let plan = self.edit.begin_submit()?;
        let client = self.client.clone();
        let tx = tx.clone();
        let resource = self.key().to_string();

        tokio::spawn(async move {
            let result = send_plan(&client, &plan).await;
            let _ = tx.send(ScreenEvent::Saved { resource, result });
        });
        Ok(())
    }

    /// Send the open draft and wait for the answer
    pub async fn submit(&mut self) -> Result<Outcome, FormError> {
        let plan = self.edit.begin_submit()?;
        let result = send_plan(&self.client, &plan).await;
        Ok(self.finish_submit(result))
    }

    pub fn finish_submit(&mut self, result: ApiResult<Value>) -> Outcome {
        if self.edit.finish_submit(&result, Failure::Save.message(self.locale)) {
            self.list.invalidate();
            Outcome::Completed
        } else {
            Outcome::Failed
        }
    }

    // =========================================================================
    // Row actions
    // =========================================================================

    /// Delete a record once the user has confirmed
    pub async fn remove(&mut self, id: &str, confirmation: Confirmation) -> Outcome {
        if !self.begin_remove(id, confirmation) {
            return Outcome::Skipped;
        }
        let result = self.client.remove(id).await.map(|_| Value::Null);
        self.finish_action(result, Failure::Delete)
    }

    /// `remove` on a background task; false when nothing was sent
    pub fn spawn_remove(&mut self, id: &str, confirmation: Confirmation, tx: &UnboundedSender<ScreenEvent>) -> bool {
        if !self.begin_remove(id, confirmation) {
            return false;
        }
        let client = self.client.clone();
        let id = id.to_string();
        self.spawn_action(Failure::Delete, tx, async move {
            client.remove(&id).await.map(|_| Value::Null)
        });
        true
    }

    fn begin_remove(&mut self, id: &str, confirmation: Confirmation) -> bool {
        if confirmation == Confirmation::Declined {
            tracing::debug!("delete of {} {} declined", self.key(), id);
            return false;
        }
        self.begin_action()
    }

    /// Approve, reject or change the status of a record
    pub async fn transition(&mut self, id: &str, action: &Transition) -> Outcome {
        if !self.begin_action() {
            return Outcome::Skipped;
        }

        let result = self.client.transition(id, action).await;
        self.finish_action(result, Failure::for_transition(&action.key))
    }

    /// `transition` on a background task; false when nothing was sent
    pub fn spawn_transition(&mut self, id: &str, action: &Transition, tx: &UnboundedSender<ScreenEvent>) -> bool {
        if !self.begin_action() {
            return false;
        }
        let client = self.client.clone();
        let id = id.to_string();
        let action = action.clone();
        let failure = Failure::for_transition(&action.key);
        self.spawn_action(failure, tx, async move {
            client.transition(&id, &action).await
        });
        true
    }

    fn spawn_action<F>(&self, failure: Failure, tx: &UnboundedSender<ScreenEvent>, call: F)
    where
        F: Future<Output = ApiResult<Value>> + Send + 'static,
    {
        let tx = tx.clone();
        let resource = self.key().to_string();
        tokio::spawn(async move {
            let result = call.await;
            let _ = tx.send(ScreenEvent::Action { resource, failure, result });
        });
    }

    /// Claim the action slot; false while another action is in flight
    fn begin_action(&mut self) -> bool {
        if self.busy {
            tracing::debug!("{} action ignored, another is in flight", self.key());
            return false;
        }
        self.busy = true;
        self.action_status.start();
        true
    }

    pub fn finish_action(&mut self, result: ApiResult<Value>, failure: Failure) -> Outcome {
        self.busy = false;
        match result {
            Ok(_) => {
                self.action_status.succeed();
                self.list.invalidate();
                Outcome::Completed
            },
            Err(e) => {
                tracing::warn!("{} action failed: {}", self.key(), e);
                self.action_status.fail(e.user_message(failure.message(self.locale)));
                Outcome::Failed
            },
        }
    }

    // =========================================================================
    // Reference pickers
    // =========================================================================

    /// Fetch option lists for every referenced resource and wait
    pub async fn load_lookups(&mut self) {
        let results = fetch_lookups(self.client.api().clone(), self.def().referenced_resources()).await;
        self.apply_lookups(results);
    }

    /// `load_lookups` on a background task; false when nothing is missing
    /// or a fetch is already running
    pub fn spawn_lookups(&mut self, tx: &UnboundedSender<ScreenEvent>) -> bool {
        if self.lookups_loading || !self.needs_lookups() {
            return false;
        }
        self.lookups_loading = true;

        let api = self.client.api().clone();
        let keys = self.def().referenced_resources();
        let tx = tx.clone();
        let resource = self.key().to_string();
        tokio::spawn(async move {
            let results = fetch_lookups(api, keys).await;
            let _ = tx.send(ScreenEvent::Lookups { resource, results });
        });
        true
    }

    /// Failed lookups stay missing and are retried on the next form
    pub fn apply_lookups(&mut self, results: Vec<LookupResult>) {
        self.lookups_loading = false;
        for (key, result) in results {
            match result {
                Ok(options) => {
                    self.lookups.insert(key, options);
                },
                Err(e) => tracing::warn!("lookup of {} failed: {}", key, e),
            }
        }
    }

    /// True when pickers reference other resources that are not loaded yet
    pub fn needs_lookups(&self) -> bool {
        self.def()
            .referenced_resources()
            .iter()
            .any(|key| !self.lookups.contains_key(key))
    }

    pub fn lookup_options(&self, resource: &str) -> &[(String, String)] {
        self.lookups.get(resource).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Label of a referenced record, or the id when unknown
    pub fn lookup_label(&self, resource: &str, id: &str) -> String {
        self.lookup_options(resource)
            .iter()
            .find(|(option_id, _)| option_id == id)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    #[cfg(test)]
    pub(crate) fn set_lookup(&mut self, resource: &str, options: Vec<(String, String)>) {
        self.lookups.insert(resource.to_string(), options);
    }
}

async fn send_plan(client: &ResourceClient, plan: &SubmitPlan) -> ApiResult<Value> {
    match plan {
        SubmitPlan::Create { payload } => client.create(payload).await,
        SubmitPlan::Update { id, payload } => client.update(id, payload).await,
    }
}

/// Option lists for the given resources, fetched concurrently
async fn fetch_lookups(api: ApiClient, keys: Vec<String>) -> Vec<LookupResult> {
    let fetches = keys.iter().filter_map(|key| {
        let client = ResourceClient::for_key(api.clone(), key)?;
        Some(async move {
            let def = client.def();
            let options = client.lookup(LOOKUP_LIMIT).await.map(|rows| {
                rows.iter()
                    .filter_map(|row| Some((def.record_id(row)?, def.record_label(row))))
                    .collect::<Vec<_>>()
            });
            (def.key.clone(), options)
        })
    });
    futures::future::join_all(fetches).await
}

/// Screen for a registry key
pub fn screen_for(api: ApiClient, key: &str, locale: Locale) -> Option<ResourceScreen> {
    ResourceClient::for_key(api, key).map(|client| ResourceScreen::new(client, locale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Session};
    use serde_json::json;

    fn screen(key: &str) -> ResourceScreen {
        let api = ApiClient::new("http://127.0.0.1:9/api", Session::new()).unwrap();
        screen_for(api, key, Locale::En).unwrap()
    }

    #[tokio::test]
    async fn test_declined_delete_is_a_noop() {
        let mut s = screen("members");
        assert_eq!(s.remove("m1", Confirmation::Declined).await, Outcome::Skipped);
        assert!(!s.action_status.loading);
        assert!(s.action_status.error.is_none());
    }

    #[tokio::test]
    async fn test_delete_without_session_fails_fast() {
        let mut s = screen("members");
        assert_eq!(s.remove("m1", Confirmation::Confirmed).await, Outcome::Failed);
        assert_eq!(
            s.action_status.error.as_deref(),
            Some(Failure::Delete.message(Locale::En))
        );
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_submit_closed_form_is_rejected() {
        let mut s = screen("expenses");
        assert_eq!(s.submit().await, Err(FormError::Closed));
    }

    #[test]
    fn test_stale_response_keeps_selection_in_range() {
        let mut s = screen("vehicles");
        let ticket = s.list.take_scheduled().unwrap();
        let rows = vec![json!({"_id": "v1"}), json!({"_id": "v2"})];
        let applied = s.apply_list_response(ListResponse {
            resource: "vehicles".into(),
            seq: ticket.seq,
            result: Ok(ListResult { rows, total_count: 2, total_pages: 1 }),
        });
        assert_eq!(applied, Applied::Applied);
        s.selected = 1;
        assert_eq!(s.selected_id().as_deref(), Some("v2"));

        s.list.invalidate();
        let ticket = s.list.take_scheduled().unwrap();
        s.apply_list_response(ListResponse {
            resource: "vehicles".into(),
            seq: ticket.seq,
            result: Ok(ListResult { rows: vec![json!({"_id": "v1"})], total_count: 1, total_pages: 1 }),
        });
        assert_eq!(s.selected, 0);

        let stale = s.apply_list_response(ListResponse {
            resource: "vehicles".into(),
            seq: ticket.seq - 1,
            result: Err(ApiError::Network("late".into())),
        });
        assert_eq!(stale, Applied::Stale);
        assert!(s.list.status.error.is_none());
    }

    #[test]
    fn test_detail_follows_selection() {
        let mut s = screen("members");
        let ticket = s.list.take_scheduled().unwrap();
        let rows = vec![json!({"_id": "m1", "phone": "1"}), json!({"_id": "m2"})];
        s.apply_list_response(ListResponse {
            resource: "members".into(),
            seq: ticket.seq,
            result: Ok(ListResult { rows, total_count: 2, total_pages: 1 }),
        });

        let full = json!({"_id": "m1", "phone": "1", "notes": "founding member"});
        assert_eq!(s.apply_detail("m1".into(), Ok(full.clone())), Applied::Applied);
        assert_eq!(s.detail_record(), Some(&full));

        s.selected = 1;
        assert_eq!(s.detail_record().unwrap()["_id"], "m2");
        assert_eq!(s.apply_detail("m1".into(), Ok(full)), Applied::Stale);
    }

    #[test]
    fn test_failed_lookup_is_retried() {
        let mut s = screen("payments");
        s.apply_lookups(vec![("members".into(), Err(ApiError::Network("down".into())))]);
        assert!(s.needs_lookups());
        s.apply_lookups(vec![("members".into(), Ok(vec![("m1".into(), "Ahmed Ali".into())]))]);
        assert!(!s.needs_lookups());
        assert_eq!(s.lookup_label("members", "m1"), "Ahmed Ali");
    }

    #[test]
    fn test_lookup_label_falls_back_to_id() {
        let mut s = screen("maintenance");
        s.set_lookup("vehicles", vec![("v1".into(), "Toyota Hilux".into())]);
        assert_eq!(s.lookup_label("vehicles", "v1"), "Toyota Hilux");
        assert_eq!(s.lookup_label("vehicles", "v2"), "v2");
        assert!(!s.needs_lookups());
        assert!(screen("payments").needs_lookups());
        assert!(!screen("vehicles").needs_lookups());
    }
}
