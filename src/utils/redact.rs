use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_CREDENTIALS: Regex = Regex::new(r"(?i)\b([a-z][a-z0-9+.-]*://)[^/@\s]+@").unwrap();
}

/// Strips `user:token@` from a URL before it reaches the logs.
pub fn redact_url(url: &str) -> String {
    URL_CREDENTIALS.replace_all(url, "${1}***@").into_owned()
}

pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
