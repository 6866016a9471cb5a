use serde::{Deserialize, Serialize};

/// Endpoint metadata with secrets redacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedEndpoint {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub redacted: String,
}

/// Redact credentials from an endpoint URL while extracting non-sensitive metadata.
///
/// Userinfo (`user:pass@`) is dropped entirely and sensitive query parameters are masked.
pub fn redact_endpoint(url: &str) -> RedactedEndpoint {
    let mut scheme = None;
    let mut host = None;
    let mut port = None;
    let mut redacted = url.to_string();

    if let Some(scheme_end) = url.find("://") {
        scheme = Some(url[..scheme_end].to_string());
        let after_scheme = &url[scheme_end + 3..];
        let authority_end = after_scheme
            .find(['/', '?', '#'])
            .unwrap_or(after_scheme.len());
        let authority = &after_scheme[..authority_end];
        let rest = &after_scheme[authority_end..];

        let host_port = match authority.rfind('@') {
            Some(at_idx) => &authority[at_idx + 1..],
            None => authority,
        };

        match host_port.rsplit_once(':') {
            Some((name, raw_port)) if raw_port.parse::<u16>().is_ok() => {
                host = Some(name.to_string());
                port = raw_port.parse::<u16>().ok();
            }
            _ if !host_port.is_empty() => host = Some(host_port.to_string()),
            _ => {}
        }

        redacted = format!("{}://{host_port}{rest}", &url[..scheme_end]);
    }

    RedactedEndpoint {
        scheme,
        host,
        port,
        redacted: redact_query_params(&redacted),
    }
}

fn redact_query_params(url: &str) -> String {
    let Some(query_start) = url.find('?') else {
        return url.to_string();
    };

    let (base, query) = url.split_at(query_start + 1);
    let params: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            Some((key, value)) => format!("{key}={value}"),
            None => pair.to_string(),
        })
        .collect();

    format!("{base}{}", params.join("&"))
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pass" | "token" | "api_key" | "apikey" | "key"
    )
}
