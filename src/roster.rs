//! Roster reconciliation.
//!
//! A submission for one scope (a class and date for attendance, a class,
//! assessment and date for grades) is turned into the minimal set of
//! update/delete/insert operations that makes the stored rows match it.
//! Planning is pure; the store applies a plan inside one transaction.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A submitted per-student value. Only usable values produce a stored row.
pub trait RosterValue: Clone {
    fn is_usable(&self) -> bool;
}

/// Attendance: any listed student is a submission, present or not.
impl RosterValue for bool {
    fn is_usable(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeValue {
    pub score: Option<f64>,
    pub comment: Option<String>,
}

/// Grades: a student without a score counts as not submitted.
impl RosterValue for GradeValue {
    fn is_usable(&self) -> bool {
        self.score.is_some()
    }
}

/// The identity of a stored row within the scope being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredRow {
    pub record_id: i64,
    pub student_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan<V> {
    /// `(record id, new value)`
    pub updates: Vec<(i64, V)>,
    /// record ids
    pub deletes: Vec<i64>,
    /// `(student id, value)`
    pub inserts: Vec<(i64, V)>,
}

impl<V> ReconcilePlan<V> {
    pub fn summary(&self) -> ReconcileSummary {
        ReconcileSummary {
            updated: self.updates.len(),
            inserted: self.inserts.len(),
            deleted: self.deletes.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub updated: usize,
    pub inserted: usize,
    pub deleted: usize,
}

/// Plans the operations that make `existing` match `incoming`.
///
/// Incoming entries with a non-positive student id are ignored and the last
/// entry for a repeated student wins. A stored row is updated when its
/// student has a usable incoming value and deleted otherwise; usable values
/// with no stored row become inserts. Extra stored rows for one student
/// (which the storage constraints should already prevent) are deleted so the
/// scope ends up with at most one row per student.
pub fn plan<V, E, I>(existing: E, incoming: I) -> ReconcilePlan<V>
where
    V: RosterValue,
    E: IntoIterator<Item = StoredRow>,
    I: IntoIterator<Item = (i64, V)>,
{
    let mut wanted: BTreeMap<i64, V> = BTreeMap::new();
    for (student_id, value) in incoming {
        if student_id <= 0 {
            continue;
        }
        wanted.insert(student_id, value);
    }
    wanted.retain(|_, value| value.is_usable());

    let mut updates = Vec::new();
    let mut deletes = Vec::new();
    let mut stored: HashSet<i64> = HashSet::new();
    for row in existing {
        if !stored.insert(row.student_id) {
            deletes.push(row.record_id);
            continue;
        }
        match wanted.get(&row.student_id) {
            Some(value) => updates.push((row.record_id, value.clone())),
            None => deletes.push(row.record_id),
        }
    }

    let inserts = wanted
        .into_iter()
        .filter(|(student_id, _)| !stored.contains(student_id))
        .collect();

    ReconcilePlan {
        updates,
        deletes,
        inserts,
    }
}
