use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use unitmock_common::Value;

use crate::identity::{MockId, MockKey, key};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub args: Vec<Value>,
    pub at: DateTime<Utc>,
}

/// How many times a mocked method ran, and with which arguments
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallRecord {
    count: usize,
    calls: Vec<RecordedCall>,
}

impl CallRecord {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Arguments of call number `call_index`, counted from 1
    pub fn arguments(&self, call_index: usize) -> Option<&[Value]> {
        call_index
            .checked_sub(1)
            .and_then(|i| self.calls.get(i))
            .map(|call| call.args.as_slice())
    }

    pub fn last(&self) -> Option<&RecordedCall> {
        self.calls.last()
    }
}

/// Call records of every mock created from one session, keyed by mock identity
#[derive(Clone, Debug, Default)]
pub struct InvocationLedger {
    records: Arc<RwLock<HashMap<MockKey, CallRecord>>>,
}

impl InvocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call and returns the call counter after recording
    pub fn record_call(&self, id: MockId, method: &str, args: Vec<Value>) -> usize {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records.entry(key(id, method)).or_default();
        record.count += 1;
        record.calls.push(RecordedCall {
            args,
            at: Utc::now(),
        });
        record.count
    }

    pub fn record(&self, id: MockId, method: &str) -> Option<CallRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(id, method))
            .cloned()
    }

    pub fn call_count(&self, id: MockId, method: &str) -> usize {
        self.record(id, method).map_or(0, |r| r.count())
    }

    /// Names of the methods of mock `id` that were called at least once
    pub fn called_methods(&self, id: MockId) -> Vec<String> {
        let mut methods: Vec<String> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, method)| method.clone())
            .collect();
        methods.sort();
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_call_counts_and_keeps_arguments() {
        let ledger = InvocationLedger::new();
        let id = MockId::generate();

        assert_eq!(ledger.record_call(id, "send", vec!["a".into()]), 1);
        assert_eq!(ledger.record_call(id, "send", vec!["b".into(), 2.into()]), 2);

        let record = ledger.record(id, "send").unwrap();
        assert_eq!(record.count(), 2);
        assert_eq!(record.arguments(1), Some(&[Value::from("a")][..]));
        assert_eq!(record.arguments(2).map(|a| a.len()), Some(2));
        assert_eq!(record.arguments(0), None);
        assert_eq!(record.arguments(3), None);
    }

    #[test]
    fn test_records_are_partitioned_by_identity() {
        let ledger = InvocationLedger::new();
        let first = MockId::generate();
        let second = MockId::generate();

        ledger.record_call(first, "send", vec![]);
        ledger.record_call(first, "send", vec![]);
        ledger.record_call(second, "send", vec![]);

        assert_eq!(ledger.call_count(first, "send"), 2);
        assert_eq!(ledger.call_count(second, "send"), 1);
        assert_eq!(ledger.call_count(second, "other"), 0);
        assert_eq!(ledger.called_methods(first), vec!["send".to_string()]);
    }
}
