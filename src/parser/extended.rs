// Parses the extended combined log format: nginx combined with the raw
// $request_time appended after the user-agent field:
//
//   <ip> - - [<date> <tz>] "<method> <path>[ HTTP/<ver>]" <status> <bytes> "<referer>" "<ua>" <request_time>
//
// A line either yields every field or an error; there is no partial entry.

use super::{LogEntry, LogParser};
use anyhow::{anyhow, Result};

#[derive(Default)]
pub struct ExtendedParser {}

impl LogParser for ExtendedParser {
    fn parse(&self, line: &str) -> Result<LogEntry> {
        let ip_end = line
            .find(" - - [")
            .ok_or(anyhow!("No client IP separator found"))?;
        let client_ip = &line[..ip_end];
        let rest = &line[ip_end + " - - [".len()..];

        // Time field: date runs to the first space, timezone to the bracket
        let date_end = rest.find(' ').ok_or(anyhow!("No space in time found"))?;
        let date = &rest[..date_end];
        let rest = &rest[date_end + 1..];
        let tz_end = rest
            .find(']')
            .ok_or(anyhow!("No closing bracket for time found"))?;
        let timezone = &rest[..tz_end];
        let rest = &rest[tz_end + 1..];

        let rest = rest
            .strip_prefix(" \"")
            .ok_or(anyhow!("No opening quote for request found"))?;
        let request_end = rest
            .find('"')
            .ok_or(anyhow!("No closing quote for request found"))?;
        let request = &rest[..request_end];
        let rest = &rest[request_end + 1..];

        // "<method> <path>[ HTTP/<ver>]"; the version suffix is optional and
        // the method is not validated against any verb list
        let method_end = request
            .find(' ')
            .ok_or(anyhow!("No space after method found"))?;
        let method = &request[..method_end];
        let target = &request[method_end + 1..];
        let (path, protocol_version) = match target.find(" HTTP/") {
            Some(at) => (&target[..at], Some(target[at + 1..].to_string())),
            None => (target, None),
        };

        let rest = rest
            .strip_prefix(' ')
            .ok_or(anyhow!("No space after request found"))?;
        let status_end = rest
            .find(' ')
            .ok_or(anyhow!("No space after status found"))?;
        let status = &rest[..status_end];
        if status.len() != 3 || !status.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow!("Status is not three digits"));
        }
        let rest = &rest[status_end + 1..];

        let bytes_end = rest
            .find(' ')
            .ok_or(anyhow!("No space after body bytes found"))?;
        let body_bytes_sent = &rest[..bytes_end];
        if body_bytes_sent != "-" && !body_bytes_sent.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow!("Body bytes is neither digits nor a dash"));
        }
        let rest = &rest[bytes_end + 1..];

        let (referer, rest) = quoted(rest).ok_or(anyhow!("No quoted referer found"))?;
        let rest = rest
            .strip_prefix(' ')
            .ok_or(anyhow!("No space after referer found"))?;
        let (user_agent, rest) = quoted(rest).ok_or(anyhow!("No quoted user agent found"))?;

        // Everything after the user agent's closing quote and one space is the
        // request time, kept verbatim with any trailing content
        let request_time = rest
            .strip_prefix(' ')
            .ok_or(anyhow!("No request time field found"))?;

        Ok(LogEntry {
            client_ip: client_ip.to_string(),
            date: date.to_string(),
            timezone: timezone.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            protocol_version,
            status: status.to_string(),
            body_bytes_sent: body_bytes_sent.to_string(),
            referer: referer.to_string(),
            user_agent: user_agent.to_string(),
            request_time: request_time.to_string(),
        })
    }
}

/// Content of a leading quoted segment plus the text after its closing quote.
fn quoted(s: &str) -> Option<(&str, &str)> {
    let s = s.strip_prefix('"')?;
    let end = s.find('"')?;
    Some((&s[..end], &s[end + 1..]))
}
