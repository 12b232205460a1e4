use lazy_static::lazy_static;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Result;
use crate::route::RouteDocument;

pub const MIME_TYPE: &str = "application/gpx+xml";

static GPX_VERSION: &str = "1.1";
static GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
static XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
static GPX_SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";
static CREATOR: &str = "Bannergress to GPX Export";

#[derive(Debug)]
pub struct DeliveredFile {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub bytes: usize,
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Renders the route as a GPX 1.1 document. All escaping is left to quick-xml.
pub fn to_gpx(route: &RouteDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", GPX_VERSION));
    gpx.push_attribute(("xmlns", GPX_NAMESPACE));
    gpx.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    gpx.push_attribute(("xsi:schemaLocation", GPX_SCHEMA_LOCATION));
    gpx.push_attribute(("creator", CREATOR));
    writer.write_event(Event::Start(gpx))?;

    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text_element(&mut writer, "name", &route.name)?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    writer.write_event(Event::Start(BytesStart::new("rte")))?;
    write_text_element(&mut writer, "name", &route.name)?;
    for w in &route.waypoints {
        let (lat, lon) = w.latlon.to_gpx();
        let mut rtept = BytesStart::new("rtept");
        rtept.push_attribute(("lat", lat.as_str()));
        rtept.push_attribute(("lon", lon.as_str()));
        writer.write_event(Event::Start(rtept))?;
        write_text_element(&mut writer, "name", &w.name)?;
        write_text_element(&mut writer, "desc", &w.description)?;
        writer.write_event(Event::End(BytesEnd::new("rtept")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("rte")))?;

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(writer.into_inner())
}

/// Collapses every run of characters that are neither letters nor digits
/// into one `_`, then drops underscores at either end. May return "".
pub fn sanitize(s: &str) -> String {
    lazy_static! {
        static ref NOT_ALPHANUMERIC: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();
    }

    NOT_ALPHANUMERIC
        .replace_all(s, "_")
        .trim_matches('_')
        .to_owned()
}

pub fn file_name(route: &RouteDocument) -> String {
    numbered_file_name(route, 0)
}

/// `Route_<stem>.gpx`, then `Route_<stem> (1).gpx`, `(2)`, ... for retries.
fn numbered_file_name(route: &RouteDocument, attempt: usize) -> String {
    match attempt {
        0 => format!("Route_{}.gpx", sanitize(&route.title)),
        n => format!("Route_{} ({}).gpx", sanitize(&route.title), n),
    }
}

/// Writes the document into `dir` under its derived file name.
///
/// Content goes to a uniquely named temp file in `dir` which is then linked
/// into place without replacing anything. If the name is taken the next
/// numbered name is tried. The temp file is removed on every error path.
pub fn export(route: &RouteDocument, dir: &Path) -> Result<DeliveredFile> {
    let content = to_gpx(route)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(&content)?;
    temp.as_file().sync_all()?;

    let mut attempt = 0;
    let path = loop {
        let path = dir.join(numbered_file_name(route, attempt));
        match temp.persist_noclobber(&path) {
            Ok(_) => break path,
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "File exists, trying next name");
                temp = e.file;
                attempt += 1;
            }
            Err(e) => return Err(e.error.into()),
        }
    };

    info!(path = %path.display(), waypoints = route.waypoints.len(), "GPX written");
    Ok(DeliveredFile {
        path,
        mime_type: MIME_TYPE,
        bytes: content.len(),
    })
}
