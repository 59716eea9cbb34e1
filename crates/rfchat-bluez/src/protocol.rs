//! Bluetooth address and SDP record helpers

use uuid::Uuid;

use crate::error::BluezError;

/// Serial Port service class / profile (16-bit SIG UUID)
pub const SERIAL_PORT_CLASS: u16 = 0x1101;

const SERIAL_PORT_PROFILE_VERSION: u16 = 0x0102;

/// Parse a colon-separated Bluetooth address such as `00:1A:7D:DA:71:13`
pub fn parse_address(address: &str) -> Result<[u8; 6], BluezError> {
    let invalid = || BluezError::InvalidAddress(address.to_string());

    let mut bytes = [0u8; 6];
    let mut parts = address.trim().split(':');
    for byte in bytes.iter_mut() {
        let part = parts.next().ok_or_else(invalid)?;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(bytes)
}

/// SDP record for an RFCOMM chat service on `channel`.
///
/// Lists the service UUID and the Serial Port class, and declares the Serial
/// Port profile, so generic serial clients recognise the service as well.
pub fn serial_port_record(name: &str, service: &Uuid, channel: u8) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<record>
  <attribute id="0x0001">
    <sequence>
      <uuid value="{service}" />
      <uuid value="0x{class:04x}" />
    </sequence>
  </attribute>
  <attribute id="0x0004">
    <sequence>
      <sequence>
        <uuid value="0x0100" />
      </sequence>
      <sequence>
        <uuid value="0x0003" />
        <uint8 value="0x{channel:02x}" />
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x0005">
    <sequence>
      <uuid value="0x1002" />
    </sequence>
  </attribute>
  <attribute id="0x0009">
    <sequence>
      <sequence>
        <uuid value="0x{class:04x}" />
        <uint16 value="0x{version:04x}" />
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x0100">
    <text value="{name}" />
  </attribute>
</record>
"#,
        service = service.hyphenated(),
        class = SERIAL_PORT_CLASS,
        channel = channel,
        version = SERIAL_PORT_PROFILE_VERSION,
        name = escape_xml(name),
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(
            parse_address("00:1A:7d:DA:71:13").unwrap(),
            [0x00, 0x1A, 0x7D, 0xDA, 0x71, 0x13]
        );
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        let malformed = [
            "",
            "00:1A:7D:DA:71",
            "00:1A:7D:DA:71:13:00",
            "0:1A:7D:DA:71:13",
            "zz:1A:7D:DA:71:13",
            "+1:1A:7D:DA:71:13",
        ];
        for address in malformed {
            assert!(
                matches!(parse_address(address), Err(BluezError::InvalidAddress(_))),
                "accepted {:?}",
                address
            );
        }
    }

    #[test]
    fn test_serial_port_record_lists_both_classes() {
        let service = Uuid::parse_str("94f39d29-7d6d-437d-973b-fba39e49d4ee").unwrap();
        let record = serial_port_record("chat", &service, 3);

        let classes = record
            .split("<attribute id=\"0x0004\">")
            .next()
            .unwrap();
        assert!(classes.contains(r#"<uuid value="94f39d29-7d6d-437d-973b-fba39e49d4ee" />"#));
        assert!(classes.contains(r#"<uuid value="0x1101" />"#));
        assert!(record.contains(r#"<uint8 value="0x03" />"#));
        assert!(record.contains(r#"<uint16 value="0x0102" />"#));
        assert!(record.contains(r#"<text value="chat" />"#));
    }

    #[test]
    fn test_serial_port_record_escapes_name() {
        let record = serial_port_record("a<b> & \"c\"", &Uuid::nil(), 1);
        assert!(record.contains(r#"<text value="a&lt;b&gt; &amp; &quot;c&quot;" />"#));
    }
}
