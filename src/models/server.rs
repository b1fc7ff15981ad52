use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A speed test server as advertised by the server list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub host: String,
    /// Upload endpoint; the latency and download resources live beside it
    pub url: String,
    /// Distance from the client in km, when the list provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Averaged latency probe result, set once the server has been selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

impl ServerDescriptor {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            country: String::new(),
            sponsor: String::new(),
            host: String::new(),
            url: url.into(),
            distance: None,
            latency_ms: None,
        }
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({}, {})", self.id, self.sponsor, self.name, self.country)?;
        if let Some(latency) = self.latency_ms {
            write!(f, " {latency:.3} ms")?;
        }
        Ok(())
    }
}

// The public server list sends ids as strings, some mirrors as numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_server_list_entry() {
        let raw = r#"{
            "url": "http://speed.example.net:8080/speedtest/upload.php",
            "lat": "40.7143", "lon": "-74.0060",
            "distance": 12,
            "name": "New York, NY",
            "country": "United States",
            "sponsor": "Example ISP",
            "id": "10390",
            "host": "speed.example.net:8080"
        }"#;

        let server: ServerDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(server.id, "10390");
        assert_eq!(server.distance, Some(12.0));
        assert_eq!(server.sponsor, "Example ISP");
        assert_eq!(server.latency_ms, None);
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let server: ServerDescriptor =
            serde_json::from_str(r#"{"id": 42, "url": "http://a/upload.php"}"#).unwrap();
        assert_eq!(server.id, "42");
        assert!(server.name.is_empty());
    }

    #[test]
    fn test_display_includes_latency_once_selected() {
        let mut server = ServerDescriptor::new("7", "http://a/upload.php");
        server.sponsor = "Acme".to_string();
        server.name = "Oslo".to_string();
        server.country = "Norway".to_string();
        assert_eq!(server.to_string(), "#7 Acme (Oslo, Norway)");

        server.latency_ms = Some(15.25);
        assert_eq!(server.to_string(), "#7 Acme (Oslo, Norway) 15.250 ms");
    }
}
