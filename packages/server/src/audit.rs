use chrono::Utc;

use crate::models::app_version::AppVersionPayload;

/// Audit-field stamping hook, injected through the application state.
///
/// With a configured principal, create stamps `created_by`/`created_date`
/// (and the last-modified pair), and update stamps the last-modified pair —
/// but only into fields the caller left absent: caller-provided audit values
/// always win. Without a principal the hook is inert and audit columns
/// behave as plain writable fields.
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    principal: Option<String>,
}

impl Auditor {
    pub fn new(principal: Option<String>) -> Self {
        Self { principal }
    }

    pub fn stamp_create(&self, record: &mut AppVersionPayload) {
        let Some(principal) = &self.principal else {
            return;
        };
        let now = Utc::now();
        if record.created_by.is_none() {
            record.created_by = Some(principal.clone());
        }
        if record.created_date.is_none() {
            record.created_date = Some(now);
        }
        if record.last_modified_by.is_none() {
            record.last_modified_by = Some(principal.clone());
        }
        if record.last_modified_date.is_none() {
            record.last_modified_date = Some(now);
        }
    }

    pub fn stamp_update(&self, record: &mut AppVersionPayload) {
        let Some(principal) = &self.principal else {
            return;
        };
        if record.last_modified_by.is_none() {
            record.last_modified_by = Some(principal.clone());
        }
        if record.last_modified_date.is_none() {
            record.last_modified_date = Some(Utc::now());
        }
    }
}
