#![allow(clippy::single_match)]

use std::borrow::Cow;

use anyhow::{bail, Context, Result};
use attributes::Attributes;
use gpx::parse_gpx;
use logging_timer::time;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use time::{
    format_description::{well_known, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime,
};

use crate::model::Gpx;

mod attributes;
mod gpx;
mod metadata;
mod track;
mod track_segment;
mod trackpoint;

/// The XSD, which defines the format of a GPX file, is at
/// https://www.topografix.com/GPX/1/1/gpx.xsd. GPX 1.0 files use the same
/// trk/trkseg/trkpt structure so they are read by the same code.
pub fn read_gpx_from_str(data: &str) -> Result<Gpx> {
    read_gpx_from_slice(data.as_bytes())
}

pub fn read_gpx_from_slice(data: &[u8]) -> Result<Gpx> {
    let xml_reader = Reader::from_reader(data);
    read_gpx_from_reader(xml_reader)
}

#[time]
pub fn read_gpx_from_reader(mut xml_reader: Reader<&[u8]>) -> Result<Gpx> {
    let mut gpx: Option<Gpx> = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" if gpx.is_none() => {
                    let mut attrs = Attributes::new(&e, &xml_reader)?;
                    let mut partial_gpx = parse_gpx(&mut xml_reader)?;
                    partial_gpx.version = attrs.take("version");
                    partial_gpx.creator = attrs.take("creator");
                    gpx = Some(partial_gpx);
                }
                _ => bail!(
                    "Unexpected Start element {:?}",
                    xml_reader.bytes_to_cow(e.name().as_ref())?
                ),
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"gpx" if gpx.is_none() => {
                    let mut attrs = Attributes::new(&e, &xml_reader)?;
                    gpx = Some(Gpx {
                        version: attrs.take("version"),
                        creator: attrs.take("creator"),
                        ..Default::default()
                    });
                }
                _ => bail!(
                    "Unexpected Empty element {:?}",
                    xml_reader.bytes_to_cow(e.name().as_ref())?
                ),
            },
            Ok(Event::Eof) => {
                // We should already have consumed the closing '</gpx>' tag in parse_gpx().
                // So the next thing will be EOF.
                return gpx.context("Did not find the 'gpx' element");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            // Declaration, comments, doctype and whitespace.
            _ => (),
        }
    }
}

/// Returns the standard error for an element that was never closed.
pub(crate) fn unexpected_eof(element: &str) -> anyhow::Error {
    anyhow::anyhow!("Reached EOF unexpectedly inside a '{element}' element. File is probably corrupt.")
}

pub(crate) trait XmlReaderConversions {
    fn bytes_to_cow<'a, 'b>(&'a self, bytes: &'b [u8]) -> Result<Cow<'b, str>>;
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String>;
}

impl<R> XmlReaderConversions for Reader<R> {
    #[inline]
    fn bytes_to_cow<'a, 'b>(&'a self, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
        Ok(self.decoder().decode(bytes)?)
    }

    #[inline]
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        // Ensure everything goes through decode().
        Ok(self.bytes_to_cow(bytes)?.into())
    }
}

pub(crate) trait XmlReaderExtensions {
    fn read_inner_as_string(&mut self) -> Result<String>;
    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<()>;
}

impl XmlReaderExtensions for Reader<&[u8]> {
    /// Reads the 'INNER TEXT' from a tag such as <tag>INNER TEXT</tag>,
    /// consuming the closing tag. Surrounding whitespace is trimmed.
    fn read_inner_as_string(&mut self) -> Result<String> {
        let mut text = String::new();

        loop {
            match self.read_event() {
                Ok(Event::Text(t)) => text.push_str(&t.unescape()?),
                Ok(Event::CData(t)) => text.push_str(&self.bytes_to_cow(&t)?),
                Ok(Event::Comment(_)) => {}
                Ok(Event::End(_)) => return Ok(text.trim().to_owned()),
                Ok(Event::Eof) => bail!("Reached EOF unexpectedly while reading element text"),
                Err(e) => bail!("Error at position {}: {:?}", self.error_position(), e),
                e => bail!(
                    "Got unexpected XML element {:?} (was expecting Event::Text), the document is probably corrupt",
                    e
                ),
            }
        }
    }

    /// Skips over an element we are not interested in, including all of its
    /// children and its closing tag.
    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let end = start.to_end();
        if let Err(e) = self.read_to_end(end.name()) {
            bail!(
                "Failed to skip element {:?}: {:?}",
                String::from_utf8_lossy(end.name().as_ref()),
                e
            );
        }
        Ok(())
    }
}

const GPX_TIME_NO_OFFSET: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const GPX_TIME_NO_OFFSET_SUBSECOND: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// Parses a time such as "2024-09-21T06:59:46.000Z". Some devices leave off
/// the offset, those times are taken to be UTC as the XSD says they should be.
pub(crate) fn parse_gpx_time(text: &str) -> Option<OffsetDateTime> {
    if let Ok(t) = OffsetDateTime::parse(text, &well_known::Rfc3339) {
        return Some(t);
    }

    PrimitiveDateTime::parse(text, GPX_TIME_NO_OFFSET)
        .or_else(|_| PrimitiveDateTime::parse(text, GPX_TIME_NO_OFFSET_SUBSECOND))
        .ok()
        .map(|t| t.assume_utc())
}
