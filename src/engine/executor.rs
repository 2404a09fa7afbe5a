//! Parallel lifecycle execution

use super::Entry;
use crate::error::Result;
use crate::resource::{self, Node, RemoteResource};
use nodeapi::Client;
use rayon::prelude::*;
use statemap::{ApplyResult, ApplySummary, DeclaredState, ResourceState, StateStore};

/// What to do with every entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create entries without an identity, update the rest
    Apply,
    /// Read entries that have an identity; drop the ones gone remotely
    Refresh,
    /// Delete entries that have an identity
    Destroy,
}

#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub operation: Operation,
    /// Number of parallel jobs
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            operation: Operation::Apply,
            jobs: 4,
        }
    }
}

/// Result for one entry, in manifest order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub kind: String,
    /// Identity, or `<kind> #<index>` when it never had one
    pub label: String,
    pub result: ApplyResult,
}

#[derive(Debug, Default)]
pub struct ExecuteReport {
    pub outcomes: Vec<EntryOutcome>,
    pub summary: ApplySummary,
}

/// Nodes must exist before anything attached to them, and go last.
fn tier(kind: &str, operation: Operation) -> u8 {
    let is_parent = kind == Node::KIND;
    match operation {
        Operation::Destroy => u8::from(is_parent),
        Operation::Apply | Operation::Refresh => u8::from(!is_parent),
    }
}

/// Run `opts.operation` over `entries`
///
/// Failures are recorded per entry and never stop the batch. After a
/// refresh, entries whose resource is gone remotely are removed from
/// `entries`.
pub fn execute(client: &Client, entries: &mut Vec<Entry>, opts: &ExecuteOptions) -> Result<ExecuteReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs.max(1))
        .build()?;

    let mut outcomes: Vec<Option<EntryOutcome>> = vec![None; entries.len()];
    for phase in 0..=1 {
        let finished: Vec<(usize, EntryOutcome)> = pool.install(|| {
            entries
                .par_iter_mut()
                .enumerate()
                .filter(|(_, entry)| tier(&entry.kind, opts.operation) == phase)
                .map(|(index, entry)| (index, run_entry(client, opts.operation, index, entry)))
                .collect()
        });
        for (index, outcome) in finished {
            outcomes[index] = Some(outcome);
        }
    }

    let outcomes: Vec<EntryOutcome> = outcomes.into_iter().flatten().collect();

    if opts.operation == Operation::Refresh {
        let mut gone = outcomes.iter().map(|o| o.result == ApplyResult::Removed);
        entries.retain(|_| !gone.next().unwrap_or(false));
    }

    let mut summary = ApplySummary::default();
    for outcome in &outcomes {
        summary.add_result(&outcome.result);
    }

    Ok(ExecuteReport { outcomes, summary })
}

fn run_entry(client: &Client, operation: Operation, index: usize, entry: &mut Entry) -> EntryOutcome {
    let before = entry.state.id().map(str::to_string);

    let result = match apply_entry(client, operation, entry) {
        Ok(result) => result,
        Err(err) => {
            log::error!("{} #{index} failed: {err}", entry.kind);
            ApplyResult::Failed {
                error: err.to_string(),
            }
        }
    };

    let label = entry
        .state
        .id()
        .map(str::to_string)
        .or(before)
        .unwrap_or_else(|| format!("{} #{index}", entry.kind));

    EntryOutcome {
        kind: entry.kind.clone(),
        label,
        result,
    }
}

fn apply_entry(client: &Client, operation: Operation, entry: &mut Entry) -> Result<ApplyResult> {
    let handler = resource::handler(&entry.kind)?;
    let state = &mut entry.state;

    match operation {
        Operation::Apply if state.has_id() => handler.update(client, state),
        Operation::Apply => handler.create(client, state),
        Operation::Refresh if !state.has_id() => Ok(ApplyResult::NoChange),
        Operation::Refresh => refresh(client, handler, state),
        Operation::Destroy if !state.has_id() => Ok(ApplyResult::NoChange),
        Operation::Destroy => handler.delete(client, state),
    }
}

fn refresh(client: &Client, handler: &dyn resource::ResourceHandler, state: &mut DeclaredState) -> Result<ApplyResult> {
    let before = state.clone();
    match handler.read(client, state)? {
        ResourceState::Absent => Ok(ApplyResult::Removed),
        ResourceState::Present if *state == before => Ok(ApplyResult::NoChange),
        ResourceState::Present => Ok(ApplyResult::Modified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::mock_client;
    use nodeapi::Method;
    use statemap::Value;

    fn entry(kind: &str, node_id: &str) -> Entry {
        Entry::new(kind, DeclaredState::new().with("node_id", node_id))
    }

    #[test]
    fn test_apply_creates_then_updates() {
        let (client, mock) = mock_client();
        let mut entries = vec![entry("node", "a"), entry("cpu_limits", "a")];
        let opts = ExecuteOptions::default();

        let report = execute(&client, &mut entries, &opts).unwrap();
        assert_eq!(report.summary.created, 2);
        assert_eq!(report.outcomes[0].label, "node_a");
        assert_eq!(report.outcomes[1].label, "cpu_limits_a");

        let report = execute(&client, &mut entries, &opts).unwrap();
        assert_eq!(report.summary.modified, 2);
        assert_eq!(mock.writes().len(), 4);
    }

    #[test]
    fn test_apply_writes_nodes_first() {
        let (client, mock) = mock_client();
        let mut entries = vec![
            entry("snmp", "a"),
            entry("io_limits", "a"),
            entry("node", "a"),
        ];
        let opts = ExecuteOptions {
            jobs: 2,
            ..ExecuteOptions::default()
        };

        execute(&client, &mut entries, &opts).unwrap();

        let writes = mock.writes();
        assert!(writes[0].url.ends_with("/v2/node/a"));
    }

    #[test]
    fn test_destroy_removes_nodes_last() {
        let (client, mock) = mock_client();
        let mut entries = vec![entry("node", "a"), entry("license", "a")];
        execute(&client, &mut entries, &ExecuteOptions::default()).unwrap();

        let opts = ExecuteOptions {
            operation: Operation::Destroy,
            jobs: 4,
        };
        let report = execute(&client, &mut entries, &opts).unwrap();

        assert_eq!(report.summary.removed, 2);
        let last = mock.writes().pop().unwrap();
        assert_eq!(last.method, Method::Delete);
        assert!(last.url.ends_with("/v2/node/a"));
        assert!(entries.iter().all(|e| !e.state.has_id()));
    }

    #[test]
    fn test_failures_are_recorded_not_raised() {
        let (client, mock) = mock_client();
        mock.respond(Method::Put, "/node/b/config/snmp", 422, "bad version");
        let mut entries = vec![entry("snmp", "a"), entry("snmp", "b"), entry("router", "c")];

        let report = execute(&client, &mut entries, &ExecuteOptions::default()).unwrap();

        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.failed, 2);
        assert!(!report.summary.is_success());
        assert!(matches!(&report.outcomes[1].result, ApplyResult::Failed { .. }));
        assert_eq!(report.outcomes[1].label, "snmp #1");
        assert!(matches!(&report.outcomes[2].result, ApplyResult::Failed { error } if error.contains("router")));
    }

    #[test]
    fn test_refresh_drops_missing_and_reports_drift() {
        let (client, mock) = mock_client();
        let mut entries = vec![entry("node", "a"), entry("node", "b"), entry("node", "c")];
        execute(&client, &mut entries, &ExecuteOptions::default()).unwrap();

        let opts = ExecuteOptions {
            operation: Operation::Refresh,
            jobs: 4,
        };
        // first refresh pulls the server-side fields into state
        execute(&client, &mut entries, &opts).unwrap();

        mock.put_document("/v2/node/a", &serde_json::json!({ "name": "renamed" }));
        mock.respond(Method::Get, "/v2/node/b", 404, "not found");

        let report = execute(&client, &mut entries, &opts).unwrap();

        assert_eq!(report.summary.modified, 1);
        assert_eq!(report.summary.removed, 1);
        assert_eq!(report.summary.no_change, 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].state.get("name"), Some(&Value::from("renamed")));
        assert_eq!(entries[1].state.id(), Some("node_c"));
    }

    #[test]
    fn test_refresh_skips_entries_never_created() {
        let (client, mock) = mock_client();
        let mut entries = vec![entry("io_limits", "a")];
        let opts = ExecuteOptions {
            operation: Operation::Refresh,
            jobs: 1,
        };

        let report = execute(&client, &mut entries, &opts).unwrap();

        assert_eq!(report.summary.no_change, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_parallel_apply_serializes_writes() {
        let (client, mock) = mock_client();
        mock.set_latency(std::time::Duration::from_millis(3));
        let mut entries: Vec<Entry> = (0..12).map(|i| entry("cpu_limits", &format!("n{i}"))).collect();
        let opts = ExecuteOptions {
            jobs: 6,
            ..ExecuteOptions::default()
        };

        let report = execute(&client, &mut entries, &opts).unwrap();

        assert_eq!(report.summary.created, 12);
        assert_eq!(mock.max_concurrent_writes(), 1);
    }
}
