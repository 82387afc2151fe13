use std::collections::HashMap;
use std::time::Duration;

use bytes::BytesMut;
use tokio::{io::AsyncReadExt, net::TcpStream};

use super::utils::error::ApiParserError;

pub struct ApiParser<'a> {
  stream: &'a mut TcpStream,
  buffer: BytesMut,
}

pub struct ApiRequest {
  pub method: String,
  pub path: String,
  pub query: HashMap<String, String>,
  pub authorization: Option<String>,
  pub body: BytesMut,
}

impl<'a> ApiParser<'a> {
  const MAX_BUF: usize = 65536;
  const MAX_TIMEOUT: Duration = Duration::from_secs(10);

  pub fn new(stream: &mut TcpStream) -> ApiParser {
    ApiParser {
      stream,
      buffer: BytesMut::with_capacity(ApiParser::MAX_BUF / 8),
    }
  }

  pub async fn read(&mut self) -> Result<ApiRequest, ApiParserError> {
    loop {
      match tokio::time::timeout(ApiParser::MAX_TIMEOUT, self.stream.read_buf(&mut self.buffer)).await {
        Ok(result) => match result {
          Ok(bytes_read) => {
            if bytes_read == 0 {
              // Client closed the connection before the request was complete.
              return Err(ApiParserError::ClosedConnection);
            }
            if self.buffer.len() > ApiParser::MAX_BUF {
              return Err(ApiParserError::BufferLimitExceeded);
            }

            // Headers or body may still be in flight; keep reading on None.
            if let Some(request) = self.parse_request()? {
              return Ok(request);
            }
          }
          Err(e) => return Err(ApiParserError::StreamReadError(e)),
        },
        Err(_) => return Err(ApiParserError::StreamReadTimeout),
      }
    }
  }

  fn parse_request(&self) -> Result<Option<ApiRequest>, ApiParserError> {
    let mut headers = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut headers);

    match req.parse(&self.buffer) {
      Ok(httparse::Status::Complete(len)) => {
        let method = req.method.ok_or(ApiParserError::MissingMethod)?;
        let raw_path = req.path.ok_or(ApiParserError::MissingPath)?;

        let mut content_length: usize = 0;
        let mut authorization: Option<String> = None;

        for header in req.headers.iter() {
          if header.name.eq_ignore_ascii_case("content-length") {
            content_length = std::str::from_utf8(header.value)
              .ok()
              .and_then(|v| v.trim().parse().ok())
              .ok_or(ApiParserError::InvalidContentLength)?;
          }
          if header.name.eq_ignore_ascii_case("authorization") {
            authorization = String::from_utf8(header.value.to_vec()).ok();
          }
        }

        let body_bytes = &self.buffer[len..];
        if body_bytes.len() < content_length {
          return Ok(None);
        }

        let (path, query) = split_path_query(raw_path);

        Ok(Some(ApiRequest {
          method: method.to_string(),
          path,
          query,
          authorization,
          body: BytesMut::from(&body_bytes[..content_length]),
        }))
      }
      Ok(httparse::Status::Partial) => Ok(None),
      Err(_) => Err(ApiParserError::Unknown),
    }
  }
}

fn split_path_query(raw_path: &str) -> (String, HashMap<String, String>) {
  match raw_path.split_once('?') {
    Some((path, query)) => (path.to_string(), url::form_urlencoded::parse(query.as_bytes()).into_owned().collect()),
    None => (raw_path.to_string(), HashMap::new()),
  }
}
