//! ObservationScope for request-level logging
//!
//! - Logs `{name}_BEGIN` on creation (TRACE)
//! - Logs `{name}_COMPLETE` with elapsed time on `complete()` (TRACE)
//! - Logs `{name}_REJECTED` with the error code on `reject()` (WARN)
//! - Logs `{name}_INCOMPLETE` if dropped without either (WARN)

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the lifecycle of one facade call
///
/// ```ignore
/// let scope = ObservationScope::with_fields("SNATCH_LIST", &[("entity", "Person")]);
/// match work() {
///     Ok(rows) => scope.complete_with_fields(&[("rows", &rows.len().to_string())]),
///     Err(e) => scope.reject(e.code(), &e.to_string()),
/// }
/// ```
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    started: Instant,
    finished: bool,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a scope whose fields are repeated on every event
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started: Instant::now(),
            finished: false,
        };
        Logger::trace(&format!("{}_BEGIN", name), &scope.field_refs());
        scope
    }

    /// Microseconds since the scope was opened
    pub fn elapsed_us(&self) -> u128 {
        self.started.elapsed().as_micros()
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.elapsed_us().to_string();
        let mut fields = self.field_refs();
        fields.extend(extra.iter().copied());
        fields.push(("elapsed_us", elapsed.as_str()));
        Logger::trace(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Close the scope for a rejected request
    pub fn reject(mut self, code: &str, message: &str) {
        self.finished = true;
        let mut fields = self.field_refs();
        fields.push(("code", code));
        fields.push(("message", message));
        Logger::warn(&format!("{}_REJECTED", self.name), &fields);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&format!("{}_INCOMPLETE", self.name), &fields);
        }
    }
}
