//! IDML package detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Mimetype declared by IDML packages.
pub const IDML_MIMETYPE: &str = "application/vnd.adobe.indesign-idml-package";

/// IDML format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdmlFormat {
    /// Whether the package starts with a stored `mimetype` entry naming IDML
    pub declared_mimetype: bool,
}

impl std::fmt::Display for IdmlFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.declared_mimetype {
            write!(f, "IDML package ({})", IDML_MIMETYPE)
        } else {
            write!(f, "IDML package (no mimetype entry)")
        }
    }
}

/// Zip local file header signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const LOCAL_HEADER_LEN: usize = 30;
const HEADER_PROBE_LEN: u64 = 256;

/// Detect an IDML package from a file path.
///
/// # Example
/// ```no_run
/// use unidml::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("brochure.idml").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<IdmlFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_PROBE_LEN as usize);
    BufReader::new(file)
        .take(HEADER_PROBE_LEN)
        .read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect an IDML package from its leading bytes.
///
/// The data must be a zip archive. When the first entry is a stored
/// `mimetype` file it must name the IDML mimetype; packages without that
/// entry are accepted and later validated by their `designmap.xml`.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<IdmlFormat> {
    if data.len() < LOCAL_HEADER_LEN || !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    match first_entry_mimetype(data) {
        Some(mimetype) if mimetype == IDML_MIMETYPE => Ok(IdmlFormat {
            declared_mimetype: true,
        }),
        Some(_) => Err(Error::UnknownFormat),
        None => Ok(IdmlFormat {
            declared_mimetype: false,
        }),
    }
}

/// Read the content of a leading stored `mimetype` entry.
fn first_entry_mimetype(data: &[u8]) -> Option<String> {
    let read_u16 = |offset: usize| -> Option<usize> {
        let bytes = data.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]) as usize)
    };
    let read_u32 = |offset: usize| -> Option<usize> {
        let bytes = data.get(offset..offset + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
    };

    let method = read_u16(8)?;
    let compressed_size = read_u32(18)?;
    let name_len = read_u16(26)?;
    let extra_len = read_u16(28)?;

    let name = data.get(LOCAL_HEADER_LEN..LOCAL_HEADER_LEN + name_len)?;
    if name != b"mimetype" || method != 0 {
        return None;
    }

    let start = LOCAL_HEADER_LEN + name_len + extra_len;
    let content = data.get(start..start + compressed_size)?;
    Some(String::from_utf8_lossy(content).trim().to_string())
}

/// Check if a file is an IDML package.
pub fn is_idml<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes look like an IDML package.
pub fn is_idml_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_entry(name: &str, content: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(ZIP_MAGIC);
        data.extend_from_slice(&[20, 0]); // version
        data.extend_from_slice(&[0, 0]); // flags
        data.extend_from_slice(&[0, 0]); // stored
        data.extend_from_slice(&[0, 0, 0, 0]); // time, date
        data.extend_from_slice(&[0, 0, 0, 0]); // crc
        data.extend_from_slice(&(content.len() as u32).to_le_bytes());
        data.extend_from_slice(&(content.len() as u32).to_le_bytes());
        data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(name.as_bytes());
        data.extend_from_slice(content);
        data
    }

    #[test]
    fn test_detect_declared_mimetype() {
        let data = stored_entry("mimetype", IDML_MIMETYPE.as_bytes());
        let format = detect_format_from_bytes(&data).unwrap();
        assert!(format.declared_mimetype);
    }

    #[test]
    fn test_detect_other_zip_mimetype() {
        let data = stored_entry("mimetype", b"application/epub+zip");
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_zip_without_mimetype() {
        let data = stored_entry("designmap.xml", b"<Document/>");
        let format = detect_format_from_bytes(&data).unwrap();
        assert!(!format.declared_mimetype);
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3 padding padding padding"),
            Err(Error::UnknownFormat)
        ));
        assert!(!is_idml_bytes(b"PK"));
    }
}
