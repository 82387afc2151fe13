use http::StatusCode;

pub struct ApiResponse {
  status: StatusCode,
  content_type: &'static str,
  body: String,
}

impl ApiResponse {
  pub fn json(status: StatusCode, body: String) -> Self {
    Self {
      status,
      content_type: "application/json",
      body,
    }
  }

  pub fn text(status: StatusCode, content_type: &'static str, body: String) -> Self {
    Self { status, content_type, body }
  }

  pub fn error(status: StatusCode, message: &str) -> Self {
    Self::json(status, serde_json::json!({ "error": message }).to_string())
  }

  pub fn field_error(status: StatusCode, field: &str, message: &str) -> Self {
    Self::json(status, serde_json::json!({ "errors": { field: message } }).to_string())
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = format!(
      "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
      self.status.as_u16(),
      self.status.canonical_reason().unwrap_or(""),
      self.content_type,
      self.body.len()
    )
    .into_bytes();
    out.extend_from_slice(self.body.as_bytes());
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_line_and_content_length_are_written() {
    let response = ApiResponse::json(StatusCode::PAYMENT_REQUIRED, String::from("{\"total_cost\":30}"));
    let raw = String::from_utf8(response.to_bytes()).unwrap();
    assert!(raw.starts_with("HTTP/1.1 402 Payment Required\r\n"));
    assert!(raw.contains("Content-Type: application/json\r\n"));
    assert!(raw.contains("Content-Length: 17\r\n"));
    assert!(raw.ends_with("{\"total_cost\":30}"));
  }

  #[test]
  fn field_error_nests_under_errors() {
    let response = ApiResponse::field_error(StatusCode::UNPROCESSABLE_ENTITY, "quantity", "must be between 1 and 1000");
    let raw = String::from_utf8(response.to_bytes()).unwrap();
    assert!(raw.contains("\"errors\""));
    assert!(raw.contains("\"quantity\""));
  }
}
