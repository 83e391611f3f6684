//! Diagnostic snapshot of a registry's size.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Width of the component name column in the [`Display`](fmt::Display)
/// rendering.
const NAME_COLUMN: usize = 40;

/// Entity and component counts at one point in time.
///
/// Purely informational: nothing in the registry reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    entity_count: usize,
    /// Keyed by component type name. Singleton types report 0 or 1.
    component_counts: BTreeMap<String, usize>,
    created: SystemTime,
}

impl Status {
    pub(crate) fn new(entity_count: usize, component_counts: BTreeMap<String, usize>) -> Self {
        Self {
            entity_count,
            component_counts,
            created: SystemTime::now(),
        }
    }

    /// Number of known (alive) entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    #[must_use]
    pub fn component_counts(&self) -> &BTreeMap<String, usize> {
        &self.component_counts
    }

    /// Count for one component type, by name.
    #[must_use]
    pub fn component_count(&self, name: &str) -> Option<usize> {
        self.component_counts.get(name).copied()
    }

    /// When the snapshot was taken.
    #[must_use]
    pub fn created(&self) -> SystemTime {
        self.created
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "-- Entity registry status (created {}):",
            iso8601_utc(self.created)
        )?;
        writeln!(f, "entities : {}", self.entity_count)?;
        writeln!(f, "component counts :")?;
        for (name, count) in &self.component_counts {
            // Long names keep their tail, which is the distinctive part.
            let shown = match name.char_indices().rev().nth(NAME_COLUMN - 1) {
                Some((start, _)) => &name[start..],
                None => name.as_str(),
            };
            writeln!(f, "  {shown:<NAME_COLUMN$} = {count}")?;
        }
        Ok(())
    }
}

/// Formats `time` as `yyyy-MM-ddTHH:mm:ss+0000` in UTC. Times before the
/// epoch render as the epoch.
fn iso8601_utc(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hour, minute, second) = (rem / 3_600, rem % 3_600 / 60, rem % 60);

    // Days since 1970-01-01 to a proleptic Gregorian date.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}+0000")
}
