use anyhow::{bail, Result};
use log::warn;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::model::{Lat, Lon, RawPoint};

use super::{attributes::Attributes, parse_gpx_time, unexpected_eof, XmlReaderExtensions};

/// Parses a `<trkpt lat=".." lon="..">` element and its children, up to and
/// including the closing tag. Only `<ele>` and `<time>` are kept.
pub(crate) fn parse_trackpoint(
    start: &BytesStart<'_>,
    xml_reader: &mut Reader<&[u8]>,
) -> Result<RawPoint> {
    let mut point = parse_empty_trackpoint(start, xml_reader)?;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = xml_reader.read_inner_as_string()?;
                    point.elevation = parse_elevation(&text);
                }
                b"time" => {
                    let text = xml_reader.read_inner_as_string()?;
                    point.time = parse_gpx_time(&text);
                    if point.time.is_none() {
                        warn!("Ignoring unparseable trackpoint time {:?}", text);
                    }
                }
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    return Ok(point);
                }
                _ => {}
            },
            Ok(Event::Eof) => return Err(unexpected_eof("trkpt")),
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            // Ignore spurious Event::Text, they are newlines.
            _ => {}
        }
    }
}

/// Parses the attributes of a trackpoint. Used directly for the
/// self-closing `<trkpt lat=".." lon=".."/>` form.
pub(crate) fn parse_empty_trackpoint(
    start: &BytesStart<'_>,
    xml_reader: &Reader<&[u8]>,
) -> Result<RawPoint> {
    let mut attrs = Attributes::new(start, xml_reader)?;
    let latitude: Lat = attrs.get("lat", "trkpt")?;
    let longitude: Lon = attrs.get("lon", "trkpt")?;

    // Range is not checked, only that the values are real numbers.
    if !latitude.is_finite() || !longitude.is_finite() {
        bail!("Trackpoint has a non-finite coordinate (lat={latitude}, lon={longitude})");
    }

    Ok(RawPoint {
        latitude,
        longitude,
        elevation: None,
        time: None,
    })
}

/// Elevations that cannot be parsed are treated as missing rather than
/// failing the whole document.
fn parse_elevation(text: &str) -> Option<f64> {
    match text.parse::<f64>() {
        Ok(ele) if ele.is_finite() => Some(ele),
        _ => {
            warn!("Ignoring unparseable trackpoint elevation {:?}", text);
            None
        }
    }
}
