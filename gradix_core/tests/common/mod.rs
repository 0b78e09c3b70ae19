//! Builds small GPX documents for the integration tests.

#![allow(dead_code)]

/// Degrees of latitude in one metre, near enough.
pub const METRE: f64 = 1.0 / 111_195.0;

#[derive(Debug, Clone, Default)]
pub struct Pt {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<String>,
}

impl Pt {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Default::default()
        }
    }

    pub fn ele(mut self, ele: f64) -> Self {
        self.ele = Some(ele);
        self
    }

    pub fn time(mut self, time: &str) -> Self {
        self.time = Some(time.to_owned());
        self
    }

    fn to_xml(&self) -> String {
        let mut children = String::new();
        if let Some(ele) = self.ele {
            children.push_str(&format!("<ele>{ele}</ele>"));
        }
        if let Some(time) = &self.time {
            children.push_str(&format!("<time>{time}</time>"));
        }

        if children.is_empty() {
            format!(r#"<trkpt lat="{}" lon="{}"/>"#, self.lat, self.lon)
        } else {
            format!(r#"<trkpt lat="{}" lon="{}">{children}</trkpt>"#, self.lat, self.lon)
        }
    }
}

/// Wraps a body in a GPX 1.1 root element.
pub fn gpx_doc(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="gradix tests" xmlns="http://www.topografix.com/GPX/1/1">
{body}
</gpx>"#
    )
}

/// A single track, each inner slice being one segment.
pub fn track(segments: &[&[Pt]]) -> String {
    let mut s = String::from("<trk>");
    for seg in segments {
        s.push_str("<trkseg>");
        for p in *seg {
            s.push_str(&p.to_xml());
        }
        s.push_str("</trkseg>");
    }
    s.push_str("</trk>");
    s
}

/// A one-track, one-segment document.
pub fn single_track_doc(points: &[Pt]) -> String {
    gpx_doc(&track(&[points]))
}

/// Points heading due north from (45, 7), `step_metres` apart, with the
/// given elevation for each.
pub fn northward(step_metres: f64, elevations: impl IntoIterator<Item = f64>) -> Vec<Pt> {
    elevations
        .into_iter()
        .enumerate()
        .map(|(i, e)| Pt::new(45.0 + i as f64 * step_metres * METRE, 7.0).ele(e))
        .collect()
}

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
