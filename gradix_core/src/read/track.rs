use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::{Track, TrackSegment};

use super::{track_segment::parse_track_segment, unexpected_eof, XmlReaderExtensions};

pub(crate) fn parse_track(xml_reader: &mut Reader<&[u8]>) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    track.name = Some(xml_reader.read_inner_as_string()?);
                }
                b"trkseg" => {
                    track.segments.push(parse_track_segment(xml_reader)?);
                }
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"trkseg" => track.segments.push(TrackSegment::default()),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trk" => {
                    return Ok(track);
                }
                _ => {}
            },
            Ok(Event::Eof) => return Err(unexpected_eof("trk")),
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            // Ignore spurious Event::Text, they are newlines.
            _ => {}
        }
    }
}
