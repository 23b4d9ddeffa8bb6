//! MAC address formatting and parsing.

use thiserror::Error;

/// Error returned when a MAC address string is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid MAC address `{input}`: expected six hex octets like 00:00:5e:00:53:01")]
pub struct MacParseError {
    input: String,
}

/// Format 6 bytes as a MAC address string in colon-separated hex format.
///
/// # Example
///
/// ```
/// use isakmp2pcap::format::format_mac;
///
/// let bytes = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
/// assert_eq!(format_mac(&bytes), "aa:bb:cc:dd:ee:ff");
/// ```
pub fn format_mac(bytes: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
    )
}

/// Parse a MAC address written as six hex octets separated by `:` or `-`.
///
/// # Example
///
/// ```
/// use isakmp2pcap::format::parse_mac;
///
/// assert_eq!(
///     parse_mac("00:00:5e:00:53:01").unwrap(),
///     [0x00, 0x00, 0x5e, 0x00, 0x53, 0x01]
/// );
/// ```
pub fn parse_mac(input: &str) -> Result<[u8; 6], MacParseError> {
    let err = || MacParseError {
        input: input.to_string(),
    };

    let mut mac = [0u8; 6];
    let mut octets = input.split([':', '-']);
    for slot in mac.iter_mut() {
        let octet = octets.next().ok_or_else(err)?;
        // Fails unless the octet is exactly two hex digits
        hex::decode_to_slice(octet, std::slice::from_mut(slot)).map_err(|_| err())?;
    }

    if octets.next().is_some() {
        return Err(err());
    }
    Ok(mac)
}
