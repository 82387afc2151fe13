use rand::Rng;

// Lowercase so the encoded username survives the whole-string lowercasing
// applied by downstream gateway parsers.
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const SESSION_ID_LEN: usize = 12;

#[derive(Clone, Debug)]
pub struct SessionParams {
  pub id: String,
  pub lifetime_minutes: u32,
}

impl SessionParams {
  pub fn new(lifetime_minutes: u32) -> Self {
    Self {
      id: random_token(SESSION_ID_LEN),
      lifetime_minutes,
    }
  }
}

pub fn random_token(len: usize) -> String {
  let mut rng = rand::thread_rng();
  (0..len)
    .map(|_| {
      let idx = rng.gen_range(0..TOKEN_CHARSET.len());
      TOKEN_CHARSET[idx] as char
    })
    .collect()
}

// Hyphens delimit the key_value segments, so user-supplied text must not
// carry hyphens or spaces of its own. Commas are stripped for the same
// reason on the csv export side.
pub fn normalize_segment(value: &str) -> String {
  value
    .trim()
    .chars()
    .filter(|c| !matches!(c, ' ' | '-' | ','))
    .flat_map(char::to_lowercase)
    .collect()
}

// Fixed segment order: base, country, city, session + lifetime. Absent inputs
// contribute no segment; an absent session segment means rotating.
pub fn encode_username(base: &str, country: Option<&str>, city: Option<&str>, session: Option<&SessionParams>) -> String {
  let mut username = String::from(base);

  if let Some(code) = country {
    username.push_str("-country_");
    username.push_str(&normalize_segment(code));
  }

  if let Some(slug) = city {
    username.push_str("-city_");
    username.push_str(&normalize_segment(slug));
  }

  if let Some(session) = session {
    username.push_str("-session_");
    username.push_str(&session.id);
    username.push_str(&format!("-lifetime_{}", session.lifetime_minutes));
  }

  username
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_only_when_nothing_is_targeted() {
    assert_eq!(encode_username("km_user", None, None, None), "km_user");
  }

  #[test]
  fn segments_appear_in_fixed_order() {
    let session = SessionParams {
      id: String::from("abc123def456"),
      lifetime_minutes: 30,
    };
    let username = encode_username("km_user", Some("us"), Some("newyork"), Some(&session));
    assert_eq!(username, "km_user-country_us-city_newyork-session_abc123def456-lifetime_30");
  }

  #[test]
  fn encoding_is_deterministic() {
    let session = SessionParams {
      id: String::from("abc123def456"),
      lifetime_minutes: 10,
    };
    let first = encode_username("km_user", Some("de"), None, Some(&session));
    let second = encode_username("km_user", Some("de"), None, Some(&session));
    assert_eq!(first, second);
  }

  #[test]
  fn city_spaces_and_case_are_stripped() {
    let username = encode_username("km_user", None, Some("New York"), None);
    assert_eq!(username, "km_user-city_newyork");
  }

  #[test]
  fn separator_characters_cannot_leak_into_segments() {
    assert_eq!(normalize_segment("Sao-Paulo"), "saopaulo");
    assert_eq!(normalize_segment("a,b c-D"), "abcd");
  }

  #[test]
  fn session_tokens_are_lowercase_alphanumeric() {
    let token = random_token(SESSION_ID_LEN);
    assert_eq!(token.len(), SESSION_ID_LEN);
    assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
  }
}
