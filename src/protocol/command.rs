use crate::protocol::resp::Value;

/// Redis commands issued by the store client
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  /// PING
  Ping,
  /// AUTH password
  Auth { password: String },
  /// SELECT index
  Select { db: u32 },
  /// GET key
  Get { key: String },
  /// SET key value
  Set { key: String, value: Vec<u8> },
  /// DEL key
  Del { key: String },
  /// SCAN cursor MATCH pattern COUNT count
  Scan {
    cursor: u64,
    pattern: String,
    count: usize,
  },
}

impl Command {
  /// Command name as sent on the wire
  pub fn name(&self) -> &'static str {
    match self {
      Command::Ping => "PING",
      Command::Auth { .. } => "AUTH",
      Command::Select { .. } => "SELECT",
      Command::Get { .. } => "GET",
      Command::Set { .. } => "SET",
      Command::Del { .. } => "DEL",
      Command::Scan { .. } => "SCAN",
    }
  }

  /// Build the RESP request frame: an array of bulk strings
  pub fn to_resp(&self) -> Value {
    let mut items = vec![Value::bulk(self.name())];
    match self {
      Command::Ping => {}
      Command::Auth { password } => items.push(Value::bulk(password.as_str())),
      Command::Select { db } => items.push(Value::bulk(db.to_string())),
      Command::Get { key } | Command::Del { key } => items.push(Value::bulk(key.as_str())),
      Command::Set { key, value } => {
        items.push(Value::bulk(key.as_str()));
        items.push(Value::bulk(value.clone()));
      }
      Command::Scan {
        cursor,
        pattern,
        count,
      } => {
        items.push(Value::bulk(cursor.to_string()));
        items.push(Value::bulk("MATCH"));
        items.push(Value::bulk(pattern.as_str()));
        items.push(Value::bulk("COUNT"));
        items.push(Value::bulk(count.to_string()));
      }
    }
    Value::Array(Some(items))
  }

  /// Encode straight to wire bytes
  pub fn encode(&self) -> Vec<u8> {
    self.to_resp().encode()
  }
}

/// Escape glob metacharacters so `prefix` is matched literally by SCAN MATCH
pub fn glob_escape(prefix: &str) -> String {
  let mut escaped = String::with_capacity(prefix.len());
  for c in prefix.chars() {
    if matches!(c, '*' | '?' | '[' | ']' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

/// SCAN pattern selecting every key that starts with `prefix`
pub fn prefix_pattern(prefix: &str) -> String {
  format!("{}*", glob_escape(prefix))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_command_frame() {
    let cmd = Command::Get {
      key: "song:Imagine".to_string(),
    };
    assert_eq!(cmd.encode(), b"*2\r\n$3\r\nGET\r\n$12\r\nsong:Imagine\r\n");
  }

  #[test]
  fn test_set_command_frame() {
    let cmd = Command::Set {
      key: "k".to_string(),
      value: b"{}".to_vec(),
    };
    assert_eq!(
      cmd.to_resp(),
      Value::Array(Some(vec![
        Value::bulk("SET"),
        Value::bulk("k"),
        Value::bulk("{}"),
      ]))
    );
  }

  #[test]
  fn test_scan_command_frame() {
    let cmd = Command::Scan {
      cursor: 17,
      pattern: "user:*".to_string(),
      count: 100,
    };
    assert_eq!(
      cmd.to_resp(),
      Value::Array(Some(vec![
        Value::bulk("SCAN"),
        Value::bulk("17"),
        Value::bulk("MATCH"),
        Value::bulk("user:*"),
        Value::bulk("COUNT"),
        Value::bulk("100"),
      ]))
    );
  }

  #[test]
  fn test_ping_has_no_arguments() {
    assert_eq!(Command::Ping.encode(), b"*1\r\n$4\r\nPING\r\n");
  }

  #[test]
  fn test_glob_escape() {
    assert_eq!(glob_escape("song:"), "song:");
    assert_eq!(glob_escape("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    assert_eq!(prefix_pattern("song:"), "song:*");
  }
}
