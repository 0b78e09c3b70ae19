use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::model::{Gpx, Track};

use super::{
    metadata::parse_metadata, track::parse_track, unexpected_eof, XmlReaderExtensions,
};

/// Parses the 'gpx' element itself. Only metadata and tracks are of interest,
/// waypoints, routes and extensions are skipped.
pub(crate) fn parse_gpx(xml_reader: &mut Reader<&[u8]>) -> Result<Gpx> {
    let mut gpx = Gpx::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"metadata" => {
                    let (name, description) = parse_metadata(xml_reader)?;
                    gpx.name = name;
                    gpx.description = description;
                }
                // GPX 1.0 has no metadata element, these live directly under 'gpx'.
                b"name" => {
                    gpx.name = Some(xml_reader.read_inner_as_string()?);
                }
                b"desc" => {
                    gpx.description = Some(xml_reader.read_inner_as_string()?);
                }
                b"trk" => {
                    let track = parse_track(xml_reader)?;
                    gpx.tracks.push(track);
                }
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"trk" => gpx.tracks.push(Track::default()),
                _ => (),
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"gpx" => {
                    return Ok(gpx);
                }
                _ => (),
            },
            Ok(Event::Eof) => return Err(unexpected_eof("gpx")),
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
