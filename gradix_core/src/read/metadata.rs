use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use super::{unexpected_eof, XmlReaderExtensions};

/// Parses the 'metadata' element, returning the name and description.
pub(crate) fn parse_metadata(
    xml_reader: &mut Reader<&[u8]>,
) -> Result<(Option<String>, Option<String>)> {
    let mut name = None;
    let mut description = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    name = Some(xml_reader.read_inner_as_string()?);
                }
                b"desc" => {
                    description = Some(xml_reader.read_inner_as_string()?);
                }
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"metadata" => {
                    return Ok((name, description));
                }
                _ => {}
            },
            Ok(Event::Eof) => return Err(unexpected_eof("metadata")),
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            // Ignore spurious Event::Text, they are newlines.
            _ => {}
        }
    }
}
