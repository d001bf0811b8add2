//! In-memory XML document and the structural queries the mutator needs.
//!
//! Parsing and serialization are delegated to `xmltree`. Comments and
//! processing instructions outside the root element are kept and written
//! back around it.
//!
//! Nodes are addressed by [`NodePath`], the chain of child indices from the
//! root element, which doubles as node identity: two paths are equal exactly
//! when they name the same node.
//!
//! Element names are compared by local name only. `<m:Neutral>` and
//! `<Neutral>` both match `"Neutral"`.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use xml::writer::{EventWriter, XmlEvent};
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::{ColorChangerError, Result};

/// Position of an element in the tree: child indices from the root.
///
/// The empty path is the root element. Ordering is lexicographic, so sorting
/// paths yields document order and every ancestor sorts before its
/// descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| NodePath(rest.to_vec()))
    }

    /// Proper ancestors, outermost (root) first.
    fn ancestors(&self) -> impl Iterator<Item = NodePath> + '_ {
        (0..self.0.len()).map(|len| NodePath(self.0[..len].to_vec()))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A parsed XML document. Owns the root element plus any comments and
/// processing instructions around it.
#[derive(Debug, Clone)]
pub struct Document {
    prolog: Vec<XMLNode>,
    root: Element,
    epilog: Vec<XMLNode>,
}

impl Document {
    /// Parse a document from any reader.
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let nodes = Element::parse_all(reader)
            .map_err(|e| ColorChangerError::SourceParse(e.to_string()))?;

        let mut prolog = Vec::new();
        let mut root = None;
        let mut epilog = Vec::new();
        for node in nodes {
            match node {
                XMLNode::Element(el) if root.is_none() => root = Some(el),
                XMLNode::Comment(_) | XMLNode::ProcessingInstruction(..) => {
                    if root.is_none() {
                        prolog.push(node);
                    } else {
                        epilog.push(node);
                    }
                }
                _ => {}
            }
        }
        let root = root
            .ok_or_else(|| ColorChangerError::SourceParse("no root element".into()))?;
        Ok(Document {
            prolog,
            root,
            epilog,
        })
    }

    /// Read and parse the document at `path`. The file handle is released
    /// before this returns, whether or not parsing succeeded.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            ColorChangerError::SourceParse(format!("{}: {e}", path.display()))
        })?;
        Self::parse(BufReader::new(file)).map_err(|e| match e {
            ColorChangerError::SourceParse(msg) => {
                ColorChangerError::SourceParse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Serialize with indentation into `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        if self.prolog.is_empty() {
            self.root
                .write_with_config(&mut writer, indented())
                .map_err(serialization)?;
        } else {
            {
                let mut events = indented().create_writer(&mut writer);
                write_misc(&mut events, &self.prolog)?;
            }
            writer.write_all(b"\n").map_err(serialization)?;
            self.root
                .write_with_config(&mut writer, indented().write_document_declaration(false))
                .map_err(serialization)?;
        }

        if !self.epilog.is_empty() {
            writer.write_all(b"\n").map_err(serialization)?;
            let mut events = indented()
                .write_document_declaration(false)
                .create_writer(&mut writer);
            write_misc(&mut events, &self.epilog)?;
        }
        Ok(())
    }

    /// Serialize with indentation into a string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(serialization)
    }

    /// Write the document to `path` atomically (write to a temp file in the
    /// same directory, then rename over `path`). Nothing is created if
    /// serialization itself fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let fail = |detail: String| {
            ColorChangerError::Serialization(format!("{}: {detail}", path.display()))
        };

        let mut contents = Vec::new();
        self.write_to(&mut contents).map_err(|e| match e {
            ColorChangerError::Serialization(detail) => fail(detail),
            other => other,
        })?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
        tmp.write_all(&contents).map_err(|e| fail(e.to_string()))?;
        // On failure the PersistError owns the temp file and deletes it on drop
        tmp.persist(path).map_err(|e| fail(e.error.to_string()))?;
        Ok(())
    }

    /// The element at `path`, if the path still resolves.
    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        path.0.iter().try_fold(&self.root, |el, &i| {
            el.children.get(i).and_then(XMLNode::as_element)
        })
    }

    pub fn element_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        path.0.iter().try_fold(&mut self.root, |el, &i| {
            el.children.get_mut(i).and_then(XMLNode::as_mut_element)
        })
    }

    /// Every element (root included) matching `pred`, in document order.
    pub fn find_descendants<F>(&self, pred: F) -> Vec<NodePath>
    where
        F: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        collect(&self.root, NodePath::root(), &pred, &mut found);
        found
    }

    /// Proper ancestors of `path` whose local name is `name`, outermost first.
    pub fn ancestors_named(&self, path: &NodePath, name: &str) -> Vec<NodePath> {
        path.ancestors()
            .filter(|p| self.element(p).is_some_and(|el| el.name == name))
            .collect()
    }

    /// Direct element children of `path` whose local name is `name`.
    pub fn child_elements_named(&self, path: &NodePath, name: &str) -> Vec<NodePath> {
        let Some(parent) = self.element(path) else {
            return Vec::new();
        };
        parent
            .children
            .iter()
            .enumerate()
            .filter(|(_, node)| node.as_element().is_some_and(|el| el.name == name))
            .map(|(i, _)| path.child(i))
            .collect()
    }

    /// Detach the element at `path` from its parent and return it.
    ///
    /// Later siblings shift down by one, so any other path through them is
    /// stale afterwards.
    pub fn remove(&mut self, path: &NodePath) -> Result<Element> {
        let stale = || ColorChangerError::Query(format!("no element at {path}"));
        let (&index, _) = path.0.split_last().ok_or_else(|| {
            ColorChangerError::Query("the root element cannot be removed".into())
        })?;
        let parent_path = path.parent().ok_or_else(stale)?;
        let parent = self.element_mut(&parent_path).ok_or_else(stale)?;
        if !parent
            .children
            .get(index)
            .is_some_and(|node| node.as_element().is_some())
        {
            return Err(stale());
        }
        match parent.children.remove(index) {
            XMLNode::Element(el) => Ok(el),
            _ => Err(stale()),
        }
    }

    /// Append `child` as the last child of the element at `path`.
    pub fn append_child(&mut self, path: &NodePath, child: Element) -> Result<NodePath> {
        let parent = self
            .element_mut(path)
            .ok_or_else(|| ColorChangerError::Query(format!("no element at {path}")))?;
        parent.children.push(XMLNode::Element(child));
        Ok(path.child(parent.children.len() - 1))
    }
}

fn collect<F>(el: &Element, path: NodePath, pred: &F, found: &mut Vec<NodePath>)
where
    F: Fn(&Element) -> bool,
{
    if pred(el) {
        found.push(path.clone());
    }
    for (i, node) in el.children.iter().enumerate() {
        if let Some(child) = node.as_element() {
            collect(child, path.child(i), pred, found);
        }
    }
}

fn indented() -> EmitterConfig {
    EmitterConfig::new().perform_indent(true)
}

fn serialization(e: impl fmt::Display) -> ColorChangerError {
    ColorChangerError::Serialization(e.to_string())
}

/// Emit top-level comments and processing instructions. Other node kinds
/// never reach the prolog or epilog.
fn write_misc<W: Write>(events: &mut EventWriter<W>, nodes: &[XMLNode]) -> Result<()> {
    for node in nodes {
        let written = match node {
            XMLNode::Comment(text) => events.write(XmlEvent::comment(text)),
            XMLNode::ProcessingInstruction(name, data) => {
                events.write(XmlEvent::processing_instruction(name, data.as_deref()))
            }
            _ => Ok(()),
        };
        written.map_err(serialization)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Map>
  <Neutral id="a">
    <Body><Origin X="1" Y="2"/></Body>
    <Actor.Color R="1" G="2" B="3"/>
  </Neutral>
  <Neutral id="b"/>
</Map>"#;

    fn doc(xml: &str) -> Document {
        Document::parse(xml.as_bytes()).unwrap()
    }

    fn named(name: &'static str) -> impl Fn(&Element) -> bool {
        move |el| el.name == name
    }

    // ── NodePath ──

    #[test]
    fn node_path_ordering_is_document_order() {
        let mut paths = vec![
            NodePath::from(vec![1]),
            NodePath::from(vec![0, 2]),
            NodePath::root(),
            NodePath::from(vec![0]),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![
                NodePath::root(),
                NodePath::from(vec![0]),
                NodePath::from(vec![0, 2]),
                NodePath::from(vec![1]),
            ]
        );
    }

    #[test]
    fn node_path_relations() {
        let outer = NodePath::from(vec![0]);
        let inner = outer.child(3);
        assert_eq!(inner, NodePath::from(vec![0, 3]));
        assert_eq!(inner.parent(), Some(outer));
        assert_eq!(NodePath::root().parent(), None);
    }

    // ── queries ──

    #[test]
    fn find_descendants_in_document_order() {
        let d = doc(MAP);
        let neutrals = d.find_descendants(named("Neutral"));
        assert_eq!(neutrals.len(), 2);
        assert!(neutrals[0] < neutrals[1]);
        assert_eq!(
            d.element(&neutrals[0]).unwrap().attributes.get("id").map(String::as_str),
            Some("a")
        );
    }

    #[test]
    fn find_descendants_includes_root() {
        let d = doc(MAP);
        assert_eq!(d.find_descendants(named("Map")), vec![NodePath::root()]);
    }

    #[test]
    fn ancestors_named_walks_up() {
        let d = doc(MAP);
        let origin = d.find_descendants(named("Origin")).remove(0);
        let neutrals = d.ancestors_named(&origin, "Neutral");
        assert_eq!(neutrals.len(), 1);
        assert_eq!(origin.parent().and_then(|body| body.parent()), Some(neutrals[0].clone()));
        assert!(d.ancestors_named(&origin, "Origin").is_empty());
    }

    #[test]
    fn child_elements_named_is_direct_only() {
        let d = doc(MAP);
        let neutral = d.find_descendants(named("Neutral")).remove(0);
        assert_eq!(d.child_elements_named(&neutral, "Actor.Color").len(), 1);
        assert!(d.child_elements_named(&neutral, "Origin").is_empty());
    }

    #[test]
    fn names_match_regardless_of_prefix() {
        let d = doc(
            r#"<m:Map xmlns:m="urn:map"><m:Neutral><m:Origin/></m:Neutral></m:Map>"#,
        );
        let origin = d.find_descendants(named("Origin"));
        assert_eq!(origin.len(), 1);
        assert_eq!(d.ancestors_named(&origin[0], "Neutral").len(), 1);
    }

    #[test]
    fn element_on_stale_path_is_none() {
        let d = doc(MAP);
        assert!(d.element(&NodePath::from(vec![99])).is_none());
        assert!(d.child_elements_named(&NodePath::from(vec![99]), "x").is_empty());
    }

    // ── mutation ──

    #[test]
    fn remove_detaches_element() {
        let mut d = doc(MAP);
        let color = d.find_descendants(named("Actor.Color")).remove(0);
        let removed = d.remove(&color).unwrap();
        assert_eq!(removed.name, "Actor.Color");
        assert!(d.find_descendants(named("Actor.Color")).is_empty());
    }

    #[test]
    fn remove_twice_is_query_error() {
        let mut d = doc("<Map><Neutral/></Map>");
        let neutral = d.find_descendants(named("Neutral")).remove(0);
        d.remove(&neutral).unwrap();
        assert!(matches!(d.remove(&neutral), Err(ColorChangerError::Query(_))));
    }

    #[test]
    fn remove_root_is_query_error() {
        let mut d = doc(MAP);
        assert!(matches!(
            d.remove(&NodePath::root()),
            Err(ColorChangerError::Query(_))
        ));
    }

    #[test]
    fn append_child_goes_last() {
        let mut d = doc(MAP);
        let neutral = d.find_descendants(named("Neutral")).remove(1);
        let added = d.append_child(&neutral, Element::new("Marker")).unwrap();
        let parent = d.element(&neutral).unwrap();
        assert_eq!(added, neutral.child(parent.children.len() - 1));
        assert_eq!(d.element(&added).unwrap().name, "Marker");
    }

    #[test]
    fn append_child_to_stale_path_fails() {
        let mut d = doc(MAP);
        let result = d.append_child(&NodePath::from(vec![42]), Element::new("X"));
        assert!(matches!(result, Err(ColorChangerError::Query(_))));
    }

    // ── parse / serialize ──

    #[test]
    fn malformed_xml_is_source_parse_error() {
        let result = Document::parse("<Map><Neutral></Map>".as_bytes());
        assert!(matches!(result, Err(ColorChangerError::SourceParse(_))));
    }

    #[test]
    fn load_missing_file_is_source_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::load(&dir.path().join("missing.xml")).unwrap_err();
        assert!(matches!(err, ColorChangerError::SourceParse(_)));
        assert!(err.to_string().contains("missing.xml"));
    }

    #[test]
    fn save_then_load_preserves_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        doc(MAP).save(&path).unwrap();

        let reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.find_descendants(named("Neutral")).len(), 2);
        assert_eq!(reloaded.find_descendants(named("Origin")).len(), 1);

        // Only the target is left behind; the temp file was renamed over it.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_leaves_unrelated_tmp_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        let sibling = dir.path().join("out.xml.tmp");
        std::fs::write(&sibling, "keep me").unwrap();

        doc(MAP).save(&path).unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "keep me");
    }

    #[test]
    fn comments_outside_root_survive_save_and_load() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- header -->
<?editor version="3"?>
<Map><Neutral><Origin/></Neutral></Map>
<!-- footer -->"#;
        let text = doc(xml).to_xml_string().unwrap();
        let header = text.find("<!-- header -->").expect("header comment dropped");
        let pi = text.find("<?editor version=\"3\"?>").expect("processing instruction dropped");
        let root = text.find("<Map>").unwrap();
        let footer = text.find("<!-- footer -->").expect("footer comment dropped");
        assert!(text.starts_with("<?xml"));
        assert!(header < pi && pi < root && root < footer, "wrong order:\n{text}");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        doc(xml).save(&path).unwrap();
        let reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.to_xml_string().unwrap(), text);
        assert_eq!(reloaded.find_descendants(named("Origin")).len(), 1);
    }

    #[test]
    fn document_without_root_is_source_parse_error() {
        let result = Document::parse("<!-- only a comment -->".as_bytes());
        assert!(matches!(result, Err(ColorChangerError::SourceParse(_))));
    }

    #[test]
    fn save_output_is_indented() {
        let text = doc("<Map><Neutral><Origin/></Neutral></Map>")
            .to_xml_string()
            .unwrap();
        assert!(text.contains("\n  <Neutral>"), "not indented:\n{text}");
    }

    #[test]
    fn save_into_missing_directory_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.xml");
        assert!(matches!(
            doc(MAP).save(&path),
            Err(ColorChangerError::Serialization(_))
        ));
        assert!(!path.exists());
    }
}
