use anyhow::Result;

pub mod extended;

/// One access-log line decomposed into its raw fields.
///
/// Every field keeps the exact text found on the line: the timestamp stays in
/// log format and `request_time` stays whatever the server wrote, so any
/// ordering done on it is string ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub client_ip: String,
    pub date: String,
    pub timezone: String,
    pub method: String,
    pub path: String,
    pub protocol_version: Option<String>,
    pub status: String,
    pub body_bytes_sent: String,
    pub referer: String,
    pub user_agent: String,
    pub request_time: String,
}

pub trait LogParser {
    fn parse(&self, line: &str) -> Result<LogEntry>;
}
