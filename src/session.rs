use crate::error::EditError;
use crate::stats::{Penalty, SolveRecord};
use crate::util::parse_time_input;

/// Solves for one puzzle/session, newest first.
///
/// This is the owner the statistics engine reads from; every edit goes
/// through here and fails without touching the record when rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveHistory {
    records: Vec<SolveRecord>,
    next_id: u64,
}

impl SolveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records loaded from a store. Ids continue after the largest one seen.
    pub fn from_records(mut records: Vec<SolveRecord>) -> Self {
        records.sort_by(|a, b| b.id.cmp(&a.id));
        let next_id = records.first().map_or(0, |r| r.id + 1);
        Self { records, next_id }
    }

    pub fn records(&self) -> &[SolveRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&SolveRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&mut self, raw_time_ms: u64) -> &SolveRecord {
        let record = SolveRecord::new(self.next_id, raw_time_ms);
        self.next_id += 1;
        self.records.insert(0, record);
        &self.records[0]
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut SolveRecord, EditError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EditError::UnknownSolve(id))
    }

    pub fn set_penalty(&mut self, id: u64, penalty: Penalty) -> Result<(), EditError> {
        self.find_mut(id)?.penalty = penalty;
        Ok(())
    }

    /// Apply `penalty`, or clear it if it's already set. Returns the new penalty.
    pub fn toggle_penalty(&mut self, id: u64, penalty: Penalty) -> Result<Penalty, EditError> {
        let record = self.find_mut(id)?;
        record.penalty = if record.penalty == penalty {
            Penalty::None
        } else {
            penalty
        };
        Ok(record.penalty)
    }

    /// Replace the raw time with a typed value. The penalty is kept.
    pub fn edit_time(&mut self, id: u64, input: &str) -> Result<u64, EditError> {
        let record = self.find_mut(id)?;
        let raw_time_ms = parse_time_input(input)?;
        record.raw_time_ms = raw_time_ms;
        Ok(raw_time_ms)
    }

    pub fn delete(&mut self, id: u64) -> Result<SolveRecord, EditError> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(EditError::UnknownSolve(id))?;
        Ok(self.records.remove(idx))
    }
}
