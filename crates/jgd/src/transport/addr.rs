//
// addr.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Parsing and discovery for the recorder's transport address (§4.A).

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use url::Url;

use crate::error::Error;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Tcp { host: String, port: u16 },
    Unix { path: String },
    NamedPipe { name: String },
}

impl Address {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|_| Error::BadAddress(raw.to_string()))?;
        match url.scheme() {
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| Error::BadAddress(raw.to_string()))?
                    .to_string();
                let port = url.port().ok_or_else(|| Error::BadAddress(raw.to_string()))?;
                if port == 0 {
                    return Err(Error::BadAddress(raw.to_string()));
                }
                Ok(Address::Tcp { host, port })
            },
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(Error::BadAddress(raw.to_string()));
                }
                Ok(Address::Unix { path: path.to_string() })
            },
            "npipe" => {
                let name = url.path().trim_start_matches('/').to_string();
                if name.is_empty() {
                    return Err(Error::BadAddress(raw.to_string()));
                }
                Ok(Address::NamedPipe { name })
            },
            _ => Err(Error::BadAddress(raw.to_string())),
        }
    }
}

/// Resolve an address per the precedence in §4.A, without ever touching
/// the discovery file when `explicit` is set -- a connection failure on
/// an explicit address is not a license to fall back (tested contract).
pub fn resolve(explicit: Option<&str>, host_option: Option<&str>) -> Result<String> {
    if let Some(addr) = explicit {
        return Ok(addr.to_string());
    }
    if let Ok(addr) = env::var("JGD_SOCKET") {
        if !addr.is_empty() {
            return Ok(addr);
        }
    }
    if let Some(addr) = host_option {
        return Ok(addr.to_string());
    }
    for dir in discovery_dirs() {
        let candidate = dir.join("jgd-discovery.json");
        if let Ok(contents) = fs::read_to_string(&candidate) {
            if let Some(path) = parse_discovery_file(&contents) {
                return Ok(path);
            }
        }
    }
    Err(Error::NoAddress)
}

fn discovery_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for var in ["TMPDIR", "TMP", "TEMP", "USERPROFILE"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                dirs.push(PathBuf::from(value));
            }
        }
    }
    dirs.push(PathBuf::from("/tmp"));
    dirs
}

fn parse_discovery_file(contents: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(contents).ok()?;
    value.get("socketPath")?.as_str().map(|s| s.to_string())
}

pub fn discovery_file_path_for_dir(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join("jgd-discovery.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tcp_address() {
        let addr = Address::parse("tcp://127.0.0.1:8080").unwrap();
        assert_eq!(addr, Address::Tcp { host: "127.0.0.1".into(), port: 8080 });
    }

    #[test]
    fn parses_tcp_localhost() {
        let addr = Address::parse("tcp://localhost:9000").unwrap();
        assert_eq!(addr, Address::Tcp { host: "localhost".into(), port: 9000 });
    }

    #[test]
    fn parses_unix_triple_slash() {
        let addr = Address::parse("unix:///tmp/jgd.sock").unwrap();
        assert_eq!(addr, Address::Unix { path: "/tmp/jgd.sock".into() });
    }

    #[test]
    fn parses_unix_with_localhost_authority() {
        let addr = Address::parse("unix://localhost/tmp/jgd.sock").unwrap();
        assert_eq!(addr, Address::Unix { path: "/tmp/jgd.sock".into() });
    }

    #[test]
    fn parses_npipe_address() {
        let addr = Address::parse("npipe:///jgd-pipe").unwrap();
        assert_eq!(addr, Address::NamedPipe { name: "jgd-pipe".into() });
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(Address::parse("ftp://host/path").is_err());
    }

    #[test]
    fn rejects_raw_path_without_scheme() {
        assert!(Address::parse("/tmp/jgd.sock").is_err());
    }

    #[test]
    fn explicit_address_wins_over_everything() {
        let resolved = resolve(Some("tcp://127.0.0.1:1"), Some("unix:///tmp/other.sock")).unwrap();
        assert_eq!(resolved, "tcp://127.0.0.1:1");
    }

    #[test]
    fn discovery_file_json_shape() {
        let contents = r#"{"socketPath":"unix:///tmp/abc.sock"}"#;
        assert_eq!(parse_discovery_file(contents), Some("unix:///tmp/abc.sock".to_string()));
    }
}
