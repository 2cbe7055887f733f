use std::io::{ Cursor, Read };

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

/// Text of the main document part, one line per paragraph.
pub fn extract(bytes: &[u8]) -> Result<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("not a DOCX container: {}", e))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("missing {}: {}", DOCUMENT_PART, e))?;

    let mut xml = String::new();
    part.take(MAX_DOCUMENT_XML_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| format!("unreadable {}: {}", DOCUMENT_PART, e))?;

    paragraphs(&xml)
}

/// Walks the body, one line per top-level paragraph.
///
/// Text boxes carry their content twice (`mc:Choice` for modern readers and
/// `mc:Fallback` for legacy ones), so fallback subtrees are skipped. A
/// paragraph nested inside a text box ends with a line break instead of
/// closing the surrounding paragraph.
fn paragraphs(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut fallback_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| format!("malformed document XML: {}", e))?;
        if fallback_depth > 0 {
            match &event {
                Event::Start(e) if e.local_name().as_ref() == b"Fallback" => fallback_depth += 1,
                Event::End(e) if e.local_name().as_ref() == b"Fallback" => fallback_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"Fallback" => fallback_depth = 1,
                    b"p" => paragraph_depth += 1,
                    b"r" => run_depth += 1,
                    b"t" => in_text = true,
                    _ => {}
                }
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    b"p" => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0 {
                            lines.push(std::mem::take(&mut current));
                        } else {
                            current.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            // Tab stops inside paragraph properties are also `w:tab`; only runs count.
            Event::Empty(e) if run_depth > 0 => {
                match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" | b"cr" => current.push('\n'),
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| format!("bad text node: {}", e))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines.join("\n").trim().to_string())
}
