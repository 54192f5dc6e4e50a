/// RESP (REdis Serialization Protocol) data types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// Simple strings, used for simple responses like "OK"
  SimpleString(String),
  /// Errors
  Error(String),
  /// Integers
  Integer(i64),
  /// Bulk strings, used for binary-safe strings (can be null)
  BulkString(Option<Vec<u8>>),
  /// Arrays of other values (can be null)
  Array(Option<Vec<Value>>),
}

/// The peer sent bytes that cannot be RESP
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
  #[error("unknown type byte 0x{0:02x}")]
  UnknownType(u8),
  #[error("invalid length or integer '{0}'")]
  InvalidNumber(String),
  #[error("bulk string is not terminated by CRLF")]
  MissingTerminator,
}

impl Value {
  /// Create a simple OK response
  pub fn ok() -> Self {
    Value::SimpleString("OK".to_string())
  }

  /// Create an error response
  pub fn error(msg: impl Into<String>) -> Self {
    Value::Error(msg.into())
  }

  /// Create a non-null bulk string
  pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
    Value::BulkString(Some(data.into()))
  }

  /// Borrow the payload of a bulk or simple string
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      Value::BulkString(Some(data)) => Some(data),
      Value::SimpleString(s) => Some(s.as_bytes()),
      _ => None,
    }
  }

  /// Encode Value to RESP bytes
  pub fn encode(&self) -> Vec<u8> {
    let mut buf = Vec::new();
    self.encode_to(&mut buf);
    buf
  }

  fn encode_to(&self, buf: &mut Vec<u8>) {
    match self {
      Value::SimpleString(s) => {
        buf.push(b'+');
        buf.extend_from_slice(s.as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::Error(e) => {
        buf.push(b'-');
        buf.extend_from_slice(e.as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::Integer(i) => {
        buf.push(b':');
        buf.extend_from_slice(i.to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::BulkString(None) => {
        buf.extend_from_slice(b"$-1\r\n");
      }
      Value::BulkString(Some(data)) => {
        buf.push(b'$');
        buf.extend_from_slice(data.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(data);
        buf.extend_from_slice(b"\r\n");
      }
      Value::Array(None) => {
        buf.extend_from_slice(b"*-1\r\n");
      }
      Value::Array(Some(items)) => {
        buf.push(b'*');
        buf.extend_from_slice(items.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        for item in items {
          item.encode_to(buf);
        }
      }
    }
  }
}

/// Parser for RESP protocol
pub struct Parser;

impl Parser {
  /// Parse one value from the front of `buffer`.
  ///
  /// Returns `Ok(None)` while the buffer holds an incomplete frame, and
  /// `Ok(Some((value, consumed_bytes)))` once a whole frame is available.
  pub fn parse(buffer: &[u8]) -> Result<Option<(Value, usize)>, ParseError> {
    if buffer.is_empty() {
      return Ok(None);
    }

    let mut pos = 0;
    let result = Self::parse_value(buffer, &mut pos)?;
    Ok(result.map(|value| (value, pos)))
  }

  /// Total frame size announced by a bulk string header, if one is complete.
  ///
  /// Lets a reader wait for the whole payload instead of re-parsing the
  /// buffer after every partial read.
  pub fn frame_len_hint(buffer: &[u8]) -> Option<usize> {
    if buffer.first() != Some(&b'$') {
      return None;
    }
    let mut pos = 1;
    let line = Self::read_line(buffer, &mut pos)?;
    let len = usize::try_from(Self::parse_number(line).ok()?).ok()?;
    Some(pos + len + 2)
  }

  fn parse_value(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>, ParseError> {
    if *pos >= buffer.len() {
      return Ok(None);
    }

    let type_byte = buffer[*pos];
    *pos += 1;

    match type_byte {
      b'+' => Ok(Self::read_line(buffer, pos).map(|line| {
        Value::SimpleString(String::from_utf8_lossy(line).to_string())
      })),
      b'-' => Ok(
        Self::read_line(buffer, pos).map(|line| Value::Error(String::from_utf8_lossy(line).to_string())),
      ),
      b':' => match Self::read_line(buffer, pos) {
        Some(line) => Ok(Some(Value::Integer(Self::parse_number(line)?))),
        None => Ok(None),
      },
      b'$' => Self::parse_bulk_string(buffer, pos),
      b'*' => Self::parse_array(buffer, pos),
      other => Err(ParseError::UnknownType(other)),
    }
  }

  fn parse_bulk_string(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>, ParseError> {
    let Some(line) = Self::read_line(buffer, pos) else {
      return Ok(None);
    };
    let len = Self::parse_number(line)?;

    if len == -1 {
      return Ok(Some(Value::BulkString(None)));
    }

    if len < 0 {
      return Err(ParseError::InvalidNumber(len.to_string()));
    }

    let len = len as usize;

    // len bytes of payload plus CRLF
    if *pos + len + 2 > buffer.len() {
      return Ok(None);
    }

    if &buffer[*pos + len..*pos + len + 2] != b"\r\n" {
      return Err(ParseError::MissingTerminator);
    }

    let data = buffer[*pos..*pos + len].to_vec();
    *pos += len + 2;

    Ok(Some(Value::BulkString(Some(data))))
  }

  fn parse_array(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>, ParseError> {
    let Some(line) = Self::read_line(buffer, pos) else {
      return Ok(None);
    };
    let count = Self::parse_number(line)?;

    if count == -1 {
      return Ok(Some(Value::Array(None)));
    }

    if count < 0 {
      return Err(ParseError::InvalidNumber(count.to_string()));
    }

    let count = count as usize;
    let mut items = Vec::with_capacity(count.min(1024));

    for _ in 0..count {
      match Self::parse_value(buffer, pos)? {
        Some(item) => items.push(item),
        None => return Ok(None),
      }
    }

    Ok(Some(Value::Array(Some(items))))
  }

  fn parse_number(line: &[u8]) -> Result<i64, ParseError> {
    // atoi accepts a valid prefix, so require the whole line to be digits
    let digits = line.strip_prefix(b"-").unwrap_or(line);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
      return Err(ParseError::InvalidNumber(String::from_utf8_lossy(line).to_string()));
    }
    atoi::atoi::<i64>(line)
      .ok_or_else(|| ParseError::InvalidNumber(String::from_utf8_lossy(line).to_string()))
  }

  fn read_line<'a>(buffer: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let start = *pos;

    for i in start..buffer.len().saturating_sub(1) {
      if buffer[i] == b'\r' && buffer[i + 1] == b'\n' {
        *pos = i + 2;
        return Some(&buffer[start..i]);
      }
    }

    None
  }
}
