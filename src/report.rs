use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::summary::FileSummary;

/// Path of the result file written next to its input: the input's final
/// extension is dropped and `_result.json` is appended to the stem, so
/// `access.log` becomes `access_result.json` and an extensionless `access`
/// becomes `access_result.json` as well.
pub fn result_path(input: &Path) -> PathBuf {
    match input.file_stem() {
        Some(stem) => {
            let mut name = stem.to_os_string();
            name.push("_result.json");
            input.with_file_name(name)
        }
        None => {
            let mut name = input.as_os_str().to_os_string();
            name.push("_result.json");
            PathBuf::from(name)
        }
    }
}

/// Renders the summary as the result-file document: a single-element array
/// holding one object, pretty-printed with four-space indentation.
pub fn summary_json(summary: &FileSummary) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    std::slice::from_ref(summary).serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

pub fn write_summary_json(path: &Path, summary: &FileSummary) -> Result<()> {
    std::fs::write(path, summary_json(summary)?)?;
    Ok(())
}

/// Prints the fixed-order console block for one file.
pub fn print_summary(summary: &FileSummary) {
    println!("Requests count: {}", summary.count_requests);
    println!("GET: {}", summary.get_count);
    println!("POST: {}", summary.post_count);
    println!("HEAD: {}", summary.head_count);
    println!("PUT: {}", summary.put_count);
    println!("DELETE: {}", summary.delete_count);
    println!("TOP 3 IP address: {:?}", summary.top_ips);
    println!("TOP 3 longest requests: {:?}", summary.top_slowest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_path_strips_known_extension() {
        assert_eq!(
            result_path(Path::new("access.log")),
            PathBuf::from("access_result.json")
        );
        assert_eq!(
            result_path(Path::new("/var/log/nginx/access.log")),
            PathBuf::from("/var/log/nginx/access_result.json")
        );
    }

    #[test]
    fn test_result_path_handles_odd_names() {
        assert_eq!(
            result_path(Path::new("accesslog")),
            PathBuf::from("accesslog_result.json")
        );
        assert_eq!(
            result_path(Path::new("archive.tar.gz")),
            PathBuf::from("archive.tar_result.json")
        );
        assert_eq!(
            result_path(Path::new("logs/access.2023-10-10.log")),
            PathBuf::from("logs/access.2023-10-10_result.json")
        );
    }

    #[test]
    fn test_summary_json_empty_shape() {
        let json = summary_json(&FileSummary::default()).unwrap();
        let expected = r#"[
    {
        "count_requests": 0,
        "top_3_ip": [],
        "get_requests_count": 0,
        "post_requests_count": 0,
        "head_requests_count": 0,
        "put_requests_count": 0,
        "delete_requests_count": 0,
        "top_3_longest_requests": {}
    }
]"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_summary_json_populated_shape() {
        let summary = FileSummary {
            count_requests: 3,
            top_ips: vec![("1.1.1.1".to_string(), 2), ("2.2.2.2".to_string(), 1)],
            get_count: 2,
            post_count: 1,
            head_count: 0,
            put_count: 0,
            delete_count: 0,
            top_slowest: vec![
                (
                    "POST 2.2.2.2 /upload 10/Oct/2023:13:55:36".to_string(),
                    "0.9".to_string(),
                ),
                (
                    "GET 1.1.1.1 /index.html 10/Oct/2023:13:55:36".to_string(),
                    "0.5".to_string(),
                ),
            ],
        };
        let json = summary_json(&summary).unwrap();
        // the timing object keeps rank order, not alphabetical key order
        let expected = r#"[
    {
        "count_requests": 3,
        "top_3_ip": [
            [
                "1.1.1.1",
                2
            ],
            [
                "2.2.2.2",
                1
            ]
        ],
        "get_requests_count": 2,
        "post_requests_count": 1,
        "head_requests_count": 0,
        "put_requests_count": 0,
        "delete_requests_count": 0,
        "top_3_longest_requests": {
            "POST 2.2.2.2 /upload 10/Oct/2023:13:55:36": "0.9",
            "GET 1.1.1.1 /index.html 10/Oct/2023:13:55:36": "0.5"
        }
    }
]"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_write_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_result.json");
        let summary = FileSummary::default();
        write_summary_json(&path, &summary).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, summary_json(&summary).unwrap());
    }
}
