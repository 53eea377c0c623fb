//! Locating the thumbnail container layer and its export candidates.
//!
//! Inkscape marks layers as `<g inkscape:groupmode="layer">` with a
//! human-readable `inkscape:label`. The scan walks the XML event stream
//! once, stops at the first layer labeled [`THUMBS_LABEL`], and records
//! that layer's direct children for candidate filtering.
//!
//! Attribute and element names are matched by local name (`g`, `label`,
//! `groupmode`, `id`), so any prefix bound to the Inkscape namespace is
//! accepted.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Label that marks the container layer among all layers in the document.
pub const THUMBS_LABEL: &str = "_thumbs";

/// Scan failure, reported with the byte offset the parser stopped at.
#[derive(Debug, Error)]
#[error("malformed SVG at byte {position}: {message}")]
pub struct ScanError {
    position: u64,
    message: String,
}

impl ScanError {
    fn at(position: u64, err: impl std::fmt::Display) -> Self {
        Self {
            position,
            message: err.to_string(),
        }
    }
}

/// The designated container layer and its direct children.
#[derive(Debug, Clone)]
pub struct Container {
    /// The layer element's own id attribute, if present (for diagnostics).
    id: Option<String>,
    children: Vec<ChildNode>,
}

impl Container {
    /// The layer element's id attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Number of direct children, before candidate filtering.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// A direct child of the container, before candidate filtering.
#[derive(Debug, Clone)]
struct ChildNode {
    /// Element local name (`g` for groups).
    tag: String,
    id: Option<String>,
}

/// A child that qualifies for export: a group with a non-empty id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
}

/// Scan the document for the first layer labeled [`THUMBS_LABEL`].
///
/// Returns `None` when no such layer exists. When several layers carry
/// the label, the first in document order wins and the rest are never
/// inspected.
pub fn locate_container(data: &[u8]) -> Result<Option<Container>, ScanError> {
    let mut reader = Reader::from_reader(data);

    loop {
        let pos = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                if is_thumbs_layer(&elem, pos)? {
                    let id = local_attr(&elem, b"id", pos)?;
                    let children = collect_children(&mut reader)?;
                    return Ok(Some(Container { id, children }));
                }
            }
            Ok(Event::Empty(elem)) => {
                // Self-closing layer: matches, but has no children
                if is_thumbs_layer(&elem, pos)? {
                    let id = local_attr(&elem, b"id", pos)?;
                    return Ok(Some(Container {
                        id,
                        children: Vec::new(),
                    }));
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(ScanError::at(reader.error_position(), e)),
        }
    }
}

/// Iterate the export candidates among the container's direct children.
///
/// A child qualifies if it is a group (`<g>`) with a non-empty `id`.
/// Restartable: re-iterating an unmodified container yields the same
/// sequence, in document order. Duplicate ids are reported as distinct
/// candidates; the later export overwrites the earlier artifact.
pub fn enumerate_candidates(container: &Container) -> impl Iterator<Item = Candidate> + '_ {
    container.children.iter().filter_map(|child| {
        let id = child.id.as_deref()?;
        (child.tag == "g" && !id.is_empty()).then(|| Candidate { id: id.to_string() })
    })
}

/// Record the container's direct children, skipping over nested content,
/// until the container element closes.
fn collect_children(reader: &mut Reader<&[u8]>) -> Result<Vec<ChildNode>, ScanError> {
    let mut children = Vec::new();
    // Depth relative to the container: 0 = directly inside it
    let mut depth = 0usize;

    loop {
        let pos = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                if depth == 0 {
                    children.push(child_node(&elem, pos)?);
                }
                depth += 1;
            }
            Ok(Event::Empty(elem)) => {
                if depth == 0 {
                    children.push(child_node(&elem, pos)?);
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Ok(children);
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ScanError::at(
                    reader.error_position(),
                    "document ended inside the container layer",
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(ScanError::at(reader.error_position(), e)),
        }
    }
}

fn child_node(elem: &BytesStart<'_>, pos: u64) -> Result<ChildNode, ScanError> {
    Ok(ChildNode {
        tag: String::from_utf8_lossy(elem.name().local_name().as_ref()).into_owned(),
        id: local_attr(elem, b"id", pos)?,
    })
}

/// A layer element carrying the sentinel label?
fn is_thumbs_layer(elem: &BytesStart<'_>, pos: u64) -> Result<bool, ScanError> {
    if elem.name().local_name().as_ref() != b"g" {
        return Ok(false);
    }
    if local_attr(elem, b"groupmode", pos)?.as_deref() != Some("layer") {
        return Ok(false);
    }
    Ok(local_attr(elem, b"label", pos)?.as_deref() == Some(THUMBS_LABEL))
}

/// Look up an attribute by local name, ignoring its namespace prefix.
fn local_attr(
    elem: &BytesStart<'_>,
    name: &[u8],
    pos: u64,
) -> Result<Option<String>, ScanError> {
    for attr in elem.attributes() {
        let attr = attr.map_err(|e| ScanError::at(pos, e))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| ScanError::at(pos, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
