//! Page-tree helpers shared by the raster provider and the box writer

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::geometry::PageBox;
use crate::raster::Orientation;

/// Box attributes that define a page's visible area, in PDF order
pub const BOX_KEYS: [&[u8]; 5] = [b"MediaBox", b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 3] = [b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains in broken files
const MAX_TREE_DEPTH: usize = 64;

/// Geometry of one page as the renderer sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// CropBox if present, otherwise MediaBox
    pub visible: PageBox,
    pub orientation: Orientation,
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Read a four-number rectangle, following indirect references
pub fn read_rect(doc: &Document, obj: &Object) -> Option<PageBox> {
    let array = resolve(doc, obj).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(array) {
        *slot = number(resolve(doc, item))?;
    }
    Some(PageBox::from(values))
}

/// Look up `key` on the page or, for inheritable keys, its ancestors
pub fn attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict: &Dictionary = doc.get_dictionary(page_id).ok()?;
    let inheritable = INHERITABLE_KEYS.contains(&key);
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        if !inheritable {
            return None;
        }
        let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

pub fn page_geometry(doc: &Document, page_id: ObjectId) -> Option<PageGeometry> {
    let media = attribute(doc, page_id, b"MediaBox").and_then(|o| read_rect(doc, o))?;
    let visible = attribute(doc, page_id, b"CropBox")
        .and_then(|o| read_rect(doc, o))
        .and_then(|crop| crop.intersect(&media))
        .unwrap_or(media);
    let rotation = attribute(doc, page_id, b"Rotate")
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0);
    Some(PageGeometry {
        visible,
        orientation: Orientation::from_rotation(rotation),
    })
}

pub fn rect_object(b: &PageBox) -> Object {
    Object::Array(vec![
        Object::Real(b.llx as f32),
        Object::Real(b.lly as f32),
        Object::Real(b.urx as f32),
        Object::Real(b.ury as f32),
    ])
}
