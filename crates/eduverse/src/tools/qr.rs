//! QR payload strings. Rendering the image happens in the browser.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    #[serde(alias = "none", alias = "nopass")]
    None,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QrPayload {
    Text {
        text: String,
    },
    Url {
        url: String,
    },
    Email {
        address: String,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
    Phone {
        number: String,
    },
    Sms {
        number: String,
        #[serde(default)]
        message: Option<String>,
    },
    Wifi {
        ssid: String,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        security: WifiSecurity,
        #[serde(default)]
        hidden: bool,
    },
}

/// Backslash-escape the characters that are structural in a `WIFI:` string.
fn escape_wifi(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

impl QrPayload {
    pub fn encode(&self) -> String {
        match self {
            QrPayload::Text { text } => text.clone(),
            QrPayload::Url { url } => {
                let url = url.trim();
                if url.contains("://") {
                    url.to_string()
                } else {
                    format!("https://{}", url)
                }
            }
            QrPayload::Email { address, subject, body } => {
                let query: Vec<String> = [("subject", subject), ("body", body)]
                    .into_iter()
                    .filter_map(|(k, v)| v.as_deref().filter(|v| !v.is_empty()).map(|v| format!("{}={}", k, percent_encode(v))))
                    .collect();
                if query.is_empty() {
                    format!("mailto:{}", address.trim())
                } else {
                    format!("mailto:{}?{}", address.trim(), query.join("&"))
                }
            }
            QrPayload::Phone { number } => format!("tel:{}", number.trim()),
            QrPayload::Sms { number, message } => {
                format!("SMSTO:{}:{}", number.trim(), message.as_deref().unwrap_or_default())
            }
            QrPayload::Wifi { ssid, password, security, hidden } => {
                let kind = match security {
                    WifiSecurity::Wpa => "WPA",
                    WifiSecurity::Wep => "WEP",
                    WifiSecurity::None => "nopass",
                };
                let mut payload = format!("WIFI:T:{};S:{};", kind, escape_wifi(ssid));
                if *security != WifiSecurity::None {
                    if let Some(password) = password {
                        payload.push_str(&format!("P:{};", escape_wifi(password)));
                    }
                }
                if *hidden {
                    payload.push_str("H:true;");
                }
                payload.push(';');
                payload
            }
        }
    }
}
