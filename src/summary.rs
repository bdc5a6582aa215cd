use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Result;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::parser::extended::ExtendedParser;
use crate::parser::{LogEntry, LogParser};

const TOP_COUNT: usize = 3;

/// Per-file accumulator. One instance lives for exactly one file's line
/// stream and is frozen into a [`FileSummary`] by [`finish`](Self::finish).
///
/// IP counts and request timings keep their first-seen insertion order next
/// to the lookup index, so the top-3 selections can break ties the same way
/// on every run.
#[derive(Debug, Default)]
pub struct AggregationState {
    total_requests: u64,
    ip_index: HashMap<String, usize>,
    ip_counts: Vec<(String, u64)>,
    methods: MethodCounts,
    timing_index: HashMap<String, usize>,
    timings: Vec<(String, String)>,
}

/// Request counts for the five recognized verbs, matched case-sensitively.
/// Anything else (including lowercase forms) lands in no bucket.
#[derive(Debug, Default, Clone, Copy)]
struct MethodCounts {
    get: u64,
    post: u64,
    head: u64,
    put: u64,
    delete: u64,
}

impl MethodCounts {
    fn bump(&mut self, method: &str) {
        match method {
            "GET" => self.get += 1,
            "POST" => self.post += 1,
            "HEAD" => self.head += 1,
            "PUT" => self.put += 1,
            "DELETE" => self.delete += 1,
            _ => {}
        }
    }
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume(&mut self, entry: &LogEntry) {
        self.total_requests += 1;

        match self.ip_index.get(&entry.client_ip) {
            Some(&at) => self.ip_counts[at].1 += 1,
            None => {
                self.ip_index
                    .insert(entry.client_ip.clone(), self.ip_counts.len());
                self.ip_counts.push((entry.client_ip.clone(), 1));
            }
        }

        self.methods.bump(&entry.method);

        let key = format!(
            "{} {} {} {}",
            entry.method, entry.client_ip, entry.path, entry.date
        );
        match self.timing_index.get(&key) {
            // last write wins, the key keeps its first-insert position
            Some(&at) => self.timings[at].1 = entry.request_time.clone(),
            None => {
                self.timing_index.insert(key.clone(), self.timings.len());
                self.timings.push((key, entry.request_time.clone()));
            }
        }
    }

    pub fn finish(self) -> FileSummary {
        let mut top_ips = self.ip_counts;
        // stable sort: equal counts keep first-seen order
        top_ips.sort_by(|a, b| b.1.cmp(&a.1));
        top_ips.truncate(TOP_COUNT);

        let mut top_slowest = self.timings;
        // string comparison on the raw request_time field, "9" outranks "10"
        top_slowest.sort_by(|a, b| b.1.cmp(&a.1));
        top_slowest.truncate(TOP_COUNT);

        FileSummary {
            count_requests: self.total_requests,
            top_ips,
            get_count: self.methods.get,
            post_count: self.methods.post,
            head_count: self.methods.head,
            put_count: self.methods.put,
            delete_count: self.methods.delete,
            top_slowest,
        }
    }
}

/// Frozen per-file result. Field order matches the result-file key order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub count_requests: u64,
    #[serde(rename = "top_3_ip")]
    pub top_ips: Vec<(String, u64)>,
    #[serde(rename = "get_requests_count")]
    pub get_count: u64,
    #[serde(rename = "post_requests_count")]
    pub post_count: u64,
    #[serde(rename = "head_requests_count")]
    pub head_count: u64,
    #[serde(rename = "put_requests_count")]
    pub put_count: u64,
    #[serde(rename = "delete_requests_count")]
    pub delete_count: u64,
    #[serde(rename = "top_3_longest_requests", serialize_with = "timing_map")]
    pub top_slowest: Vec<(String, String)>,
}

// Serializes the ranked timings as a JSON object without reordering its keys.
fn timing_map<S>(entries: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, time) in entries {
        map.serialize_entry(key, time)?;
    }
    map.end()
}

/// Aggregates an in-memory line sequence. Lines that do not parse are
/// skipped and leave every counter untouched.
pub fn summarize_lines<I, S>(lines: I) -> FileSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parser = ExtendedParser::default();
    let mut state = AggregationState::new();
    for line in lines {
        if let Ok(entry) = parser.parse(line.as_ref()) {
            state.consume(&entry);
        }
    }
    state.finish()
}

/// Streams one log file through the parser and freezes its summary.
/// Open and read errors propagate as-is; unparsable lines are skipped.
pub fn summarize_file(path: &Path) -> Result<FileSummary> {
    let file = File::open(path)?;
    let parser = ExtendedParser::default();
    let mut state = AggregationState::new();
    let mut lines_read: u64 = 0;
    for line in BufReader::new(file).lines() {
        let line = line?;
        lines_read += 1;
        if let Ok(entry) = parser.parse(&line) {
            state.consume(&entry);
        }
    }
    let summary = state.finish();
    tracing::debug!(
        "{}: {} lines read, {} matched",
        path.display(),
        lines_read,
        summary.count_requests
    );
    Ok(summary)
}
