use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::TrackSegment;

use super::{
    trackpoint::{parse_empty_trackpoint, parse_trackpoint},
    unexpected_eof, XmlReaderExtensions,
};

pub(crate) fn parse_track_segment(xml_reader: &mut Reader<&[u8]>) -> Result<TrackSegment> {
    let mut segment = TrackSegment::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    let point = parse_trackpoint(&e, xml_reader)?;
                    segment.points.push(point);
                }
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    let point = parse_empty_trackpoint(&e, xml_reader)?;
                    segment.points.push(point);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trkseg" => {
                    return Ok(segment);
                }
                _ => {}
            },
            Ok(Event::Eof) => return Err(unexpected_eof("trkseg")),
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            // Ignore spurious Event::Text, they are newlines.
            _ => {}
        }
    }
}
