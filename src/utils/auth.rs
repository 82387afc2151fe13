use base64::engine::general_purpose;
use base64::Engine;

// Dashboard calls send "Bearer <key>"; user scripts tend to reuse their proxy
// tooling and send the key as a Basic password instead. Both resolve to the key.
pub fn extract_api_key(header_value: &str) -> Option<String> {
  const BEARER_PREFIX: &str = "Bearer ";
  const BASIC_PREFIX: &str = "Basic ";

  if let Some(token) = header_value.strip_prefix(BEARER_PREFIX) {
    let token = token.trim();
    if token.is_empty() {
      return None;
    }
    return Some(token.to_string());
  }

  if let Some(encoded) = header_value.strip_prefix(BASIC_PREFIX) {
    return extract_basic_key(encoded);
  }

  None
}

fn extract_basic_key(encoded: &str) -> Option<String> {
  let decoded_bytes = general_purpose::STANDARD.decode(encoded).ok()?;
  let decoded_str = String::from_utf8(decoded_bytes).ok()?;

  let mut parts = decoded_str.splitn(2, ':');
  let _username = parts.next()?;
  let password = parts.next()?.to_string();

  if password.is_empty() {
    return None;
  }

  Some(password)
}
