// PPTX slides are zipped DrawingML; text runs live in <a:t> elements,
// one <a:p> per paragraph.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use zip::ZipArchive;

use super::{io_error, ConversionError, ConversionResult};

static TEXT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a:t(?:\s[^>]*)?>([^<]*)</a:t>").expect("valid text run pattern"));
static CORE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<dc:title>([^<]*)</dc:title>").expect("valid title pattern"));

pub fn convert(path: &Path) -> Result<ConversionResult, ConversionError> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ConversionError::malformed(path, e))?;

    let mut slides: Vec<(u32, String)> = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ConversionError::malformed(path, e))?;
        if let Some(number) = slide_number(entry.name()) {
            let mut xml = String::new();
            entry.read_to_string(&mut xml).map_err(io_error(path))?;
            slides.push((number, xml));
        }
    }

    if slides.is_empty() {
        return Err(ConversionError::malformed(path, "presentation contains no slides"));
    }
    slides.sort_by_key(|(number, _)| *number);

    let title = match archive.by_name("docProps/core.xml") {
        Ok(mut entry) => {
            let mut xml = String::new();
            entry.read_to_string(&mut xml).map_err(io_error(path))?;
            CORE_TITLE
                .captures(&xml)
                .map(|caps| unescape_xml(caps[1].trim()))
                .filter(|t| !t.is_empty())
        }
        Err(_) => None,
    };

    let text = slides
        .iter()
        .map(|(number, xml)| {
            let body = slide_text(xml);
            if body.is_empty() {
                format!("<!-- Slide number: {} -->", number)
            } else {
                format!("<!-- Slide number: {} -->\n{}", number, body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(ConversionResult::new(title, text))
}

fn slide_number(entry_name: &str) -> Option<u32> {
    entry_name
        .strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn slide_text(xml: &str) -> String {
    xml.split("</a:p>")
        .map(|paragraph| {
            TEXT_RUN
                .captures_iter(paragraph)
                .map(|caps| unescape_xml(&caps[1]))
                .collect::<String>()
        })
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
