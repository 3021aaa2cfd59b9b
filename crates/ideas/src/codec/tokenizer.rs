//! Quote-aware CSV scanning

/// Split CSV text into records of fields
///
/// Records end at LF or CRLF outside of quotes. A field wrapped in double quotes may contain
/// commas, line breaks and doubled quotes (`""`), which decode to a single literal quote. A quote
/// only opens quoted mode at the start of a field; anywhere else it is kept as-is.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
  let mut records = Vec::new();
  let mut record = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut at_field_start = true;
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          field.push('"');
          chars.next();
        }
        '"' => in_quotes = false,
        _ => field.push(c),
      }
      continue;
    }

    match c {
      '"' if at_field_start => {
        in_quotes = true;
        at_field_start = false;
      }
      ',' => {
        record.push(std::mem::take(&mut field));
        at_field_start = true;
      }
      '\r' if chars.peek() == Some(&'\n') => {}
      '\n' => {
        record.push(std::mem::take(&mut field));
        records.push(std::mem::take(&mut record));
        at_field_start = true;
      }
      _ => {
        field.push(c);
        at_field_start = false;
      }
    }
  }

  if !record.is_empty() || !field.is_empty() || !at_field_start {
    record.push(field);
    records.push(record);
  }

  records
}

/// Tokenize a single CSV line
pub fn parse_line(line: &str) -> Vec<String> {
  parse_records(line).into_iter().next().unwrap_or_else(|| vec![String::new()])
}
