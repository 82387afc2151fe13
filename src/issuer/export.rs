use super::ProxyCredential;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
  Txt,
  Csv,
  Json,
}

impl ExportFormat {
  pub fn parse(value: &str) -> Option<ExportFormat> {
    match value {
      "txt" => Some(ExportFormat::Txt),
      "csv" => Some(ExportFormat::Csv),
      "json" => Some(ExportFormat::Json),
      _ => None,
    }
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      ExportFormat::Txt => "text/plain",
      ExportFormat::Csv => "text/csv",
      ExportFormat::Json => "application/json",
    }
  }
}

// The txt and csv layouts are parsed by user scripts; field order is a
// compatibility contract. The username encoding keeps fields free of
// colons and commas.
pub fn export(proxies: &[ProxyCredential], format: ExportFormat) -> String {
  match format {
    ExportFormat::Txt => proxies
      .iter()
      .map(|p| format!("{}:{}:{}:{}", p.host, p.port, p.username, p.password))
      .collect::<Vec<String>>()
      .join("\n"),
    ExportFormat::Csv => {
      let mut lines: Vec<String> = vec![String::from("host,port,username,password")];
      lines.extend(proxies.iter().map(|p| format!("{},{},{},{}", p.host, p.port, p.username, p.password)));
      lines.join("\n")
    }
    ExportFormat::Json => serde_json::to_string(proxies).unwrap_or_else(|_| String::from("[]")),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn proxies() -> Vec<ProxyCredential> {
    let expires_at = Utc::now();
    vec![
      ProxyCredential {
        host: String::from("gw1.keymint.io"),
        port: 8000,
        username: String::from("km_user-country_us"),
        password: String::from("s3cret"),
        country: Some(String::from("us")),
        expires_at,
      },
      ProxyCredential {
        host: String::from("gw2.keymint.io"),
        port: 8001,
        username: String::from("km_user-country_us-session_abc123def456-lifetime_30"),
        password: String::from("s3cret"),
        country: Some(String::from("us")),
        expires_at,
      },
    ]
  }

  #[test]
  fn txt_is_colon_joined_one_line_per_credential() {
    let out = export(&proxies(), ExportFormat::Txt);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "gw1.keymint.io:8000:km_user-country_us:s3cret");
  }

  #[test]
  fn csv_has_header_and_delimiter_free_fields() {
    let out = export(&proxies(), ExportFormat::Csv);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "host,port,username,password");
    assert_eq!(lines.len(), 3);
    for line in &lines[1..] {
      assert_eq!(line.split(',').count(), 4);
    }
  }

  #[test]
  fn json_round_trips_to_an_identical_batch() {
    let original = proxies();
    let out = export(&original, ExportFormat::Json);
    let parsed: Vec<ProxyCredential> = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, original);
  }

  #[test]
  fn unknown_format_is_rejected() {
    assert_eq!(ExportFormat::parse("xml"), None);
    assert_eq!(ExportFormat::parse("csv"), Some(ExportFormat::Csv));
  }
}
