use std::path::Path;

use super::{io_error, ConversionError, ConversionResult};

/// Read a file as UTF-8 text
pub fn convert(path: &Path) -> Result<ConversionResult, ConversionError> {
    let bytes = std::fs::read(path).map_err(io_error(path))?;
    let text = String::from_utf8(bytes).map_err(|_| {
        ConversionError::UnsupportedFormat(format!("{} is not a UTF-8 text file", path.display()))
    })?;

    let text = text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text);
    Ok(ConversionResult::new(None, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_binary_content_is_rejected() {
        let mut temp = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        temp.write_all(&[0xff, 0xfe, 0x00, 0x9f]).unwrap();

        assert!(matches!(convert(temp.path()), Err(ConversionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let mut temp = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(temp, "\u{feff}# Notes").unwrap();

        assert_eq!(convert(temp.path()).unwrap().text_content, "# Notes");
    }
}
