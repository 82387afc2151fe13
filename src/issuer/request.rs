use serde::Deserialize;

use super::error::GenerateError;
use super::username::normalize_segment;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionType {
  Rotating,
  Sticky,
}

impl SessionType {
  pub fn parse(value: &str) -> Option<SessionType> {
    match value {
      "rotating" => Some(SessionType::Rotating),
      "sticky" => Some(SessionType::Sticky),
      _ => None,
    }
  }
}

// Wire shape of POST /proxies/generate. Quantity is kept signed here so that
// out-of-range values surface as field errors instead of deserialization noise.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub product_id: i64,
  pub quantity: i64,
  pub country: Option<String>,
  pub city: Option<String>,
  pub session_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub product_id: i64,
  pub quantity: u32,
  pub country: Option<String>,
  pub city: Option<String>,
  pub session_type: SessionType,
}

impl GenerationRequest {
  // Validated once at the boundary; everything past this point trusts the value.
  // Country membership in the product's geo pool is checked by the issuer, which
  // has the product at hand.
  pub fn from_body(body: GenerateBody, max_batch: u32) -> Result<GenerationRequest, GenerateError> {
    if body.quantity < 1 || body.quantity > max_batch as i64 {
      return Err(GenerateError::validation("quantity", format!("must be between 1 and {}", max_batch)));
    }

    let session_type = match body.session_type.as_deref() {
      None => SessionType::Rotating,
      Some(raw) => SessionType::parse(raw).ok_or_else(|| GenerateError::validation("session_type", "must be \"rotating\" or \"sticky\""))?,
    };

    let country = match body.country.as_deref() {
      None => None,
      Some(raw) => {
        let code = normalize_segment(raw);
        if code.is_empty() {
          return Err(GenerateError::validation("country", "must be an ISO country code"));
        }
        Some(code)
      }
    };

    // City stays advisory free text; it is normalized for the username encoding
    // but never checked against a city list.
    let city = body.city.as_deref().map(normalize_segment).filter(|slug| !slug.is_empty());

    Ok(GenerationRequest {
      product_id: body.product_id,
      quantity: body.quantity as u32,
      country,
      city,
      session_type,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn body(quantity: i64) -> GenerateBody {
    GenerateBody {
      product_id: 7,
      quantity,
      country: None,
      city: None,
      session_type: None,
    }
  }

  #[test]
  fn zero_quantity_is_rejected() {
    let err = GenerationRequest::from_body(body(0), 1000).unwrap_err();
    assert!(matches!(err, GenerateError::Validation { field: "quantity", .. }));
  }

  #[test]
  fn negative_quantity_is_rejected() {
    let err = GenerationRequest::from_body(body(-3), 1000).unwrap_err();
    assert!(matches!(err, GenerateError::Validation { field: "quantity", .. }));
  }

  #[test]
  fn quantity_above_batch_bound_is_rejected() {
    let err = GenerationRequest::from_body(body(1001), 1000).unwrap_err();
    assert!(matches!(err, GenerateError::Validation { field: "quantity", .. }));
  }

  #[test]
  fn session_type_defaults_to_rotating() {
    let request = GenerationRequest::from_body(body(3), 1000).unwrap();
    assert_eq!(request.session_type, SessionType::Rotating);
  }

  #[test]
  fn unknown_session_type_is_rejected() {
    let mut raw = body(3);
    raw.session_type = Some(String::from("persistent"));
    let err = GenerationRequest::from_body(raw, 1000).unwrap_err();
    assert!(matches!(err, GenerateError::Validation { field: "session_type", .. }));
  }

  #[test]
  fn country_and_city_are_normalized() {
    let mut raw = body(3);
    raw.country = Some(String::from("US"));
    raw.city = Some(String::from("New York"));
    let request = GenerationRequest::from_body(raw, 1000).unwrap();
    assert_eq!(request.country.as_deref(), Some("us"));
    assert_eq!(request.city.as_deref(), Some("newyork"));
  }
}
