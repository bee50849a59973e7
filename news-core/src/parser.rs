use roxmltree::{Document, Node, ParsingOptions};

use crate::error::NewsError;
use crate::feed::RawItem;

/// Where a family of feed documents keeps its items.
#[derive(Debug, Clone, Copy)]
pub struct ItemProbe {
    /// Required root element name; `None` accepts any root.
    pub root: Option<&'static str>,
    /// Element names to descend through below the root.
    pub path: &'static [&'static str],
    pub item: &'static str,
}

/// Tried in order; the first probe that finds at least one item wins.
pub const ITEM_PROBES: &[ItemProbe] = &[
    ItemProbe { root: Some("rss"), path: &["channel"], item: "item" },
    ItemProbe { root: Some("items"), path: &[], item: "item" },
    ItemProbe { root: Some("haberler"), path: &[], item: "haber" },
    ItemProbe { root: None, path: &[], item: "haber" },
    ItemProbe { root: Some("feed"), path: &[], item: "entry" },
    ItemProbe { root: Some("RDF"), path: &[], item: "item" },
];

impl ItemProbe {
    fn locate<'a, 'input>(&self, root: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        if let Some(expected) = self.root {
            if !name_is(root, expected) {
                return Vec::new();
            }
        }
        let mut container = root;
        for segment in self.path {
            match container.children().find(|child| name_is(*child, segment)) {
                Some(next) => container = next,
                None => return Vec::new(),
            }
        }
        container
            .children()
            .filter(|child| name_is(*child, self.item))
            .collect()
    }
}

/// Parses a feed document of unknown shape into raw items. A well-formed
/// document with no recognisable item list yields an empty vector.
pub fn parse_document(text: &str) -> Result<Vec<RawItem>, NewsError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    let root = doc.root_element();

    for probe in ITEM_PROBES {
        let nodes = probe.locate(root);
        if !nodes.is_empty() {
            return Ok(nodes.into_iter().map(flatten).collect());
        }
    }
    Ok(Vec::new())
}

fn flatten(node: Node<'_, '_>) -> RawItem {
    let mut item = RawItem::new();
    for attr in node.attributes() {
        item.insert(attr.name(), attr.value().trim());
    }
    for child in node.children().filter(Node::is_element) {
        let name = child.tag_name().name();
        let text = text_of(child);
        if !text.is_empty() {
            item.insert(name, text);
        }
        for attr in child.attributes() {
            let value = attr.value().trim();
            if !value.is_empty() {
                item.insert(format!("{name}.{}", attr.name()), value);
            }
        }
    }
    item
}

fn text_of(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}

fn name_is(node: Node<'_, '_>, expected: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rss_channel_items() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title>
  <item><title>A</title><link>http://e/1</link>
    <enclosure url="http://e/1.jpg" type="image/jpeg"/></item>
  <item><title><![CDATA[B & C]]></title></item>
</channel></rss>"#;
        let items = parse_document(xml).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("title"), Some("A"));
        assert_eq!(items[0].get("enclosure.url"), Some("http://e/1.jpg"));
        assert_eq!(items[1].get("title"), Some("B & C"));
    }

    #[test]
    fn reads_haberler_documents() {
        let xml = r#"<haberler>
  <haber haber_id="17"><haber_manset>Manşet</haber_manset><haber_link>/haber/ekonomi/x</haber_link></haber>
</haberler>"#;
        let items = parse_document(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("haber_id"), Some("17"));
        assert_eq!(items[0].get("haber_manset"), Some("Manşet"));
    }

    #[test]
    fn reads_haber_under_any_root() {
        let xml = "<xml_mobile><haber><baslik>X</baslik></haber><haber><baslik>Y</baslik></haber></xml_mobile>";
        assert_eq!(parse_document(xml).unwrap().len(), 2);
    }

    #[test]
    fn reads_atom_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><title>Atom</title><link href="http://e/a"/><updated>2024-10-21T07:28:00Z</updated></entry>
</feed>"#;
        let items = parse_document(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("link.href"), Some("http://e/a"));
        assert_eq!(items[0].get("updated"), Some("2024-10-21T07:28:00Z"));
    }

    #[test]
    fn reads_rdf_items() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="http://e/"><title>Kanal</title></channel>
  <item rdf:about="http://e/1"><title>Bir</title><link>http://e/1</link></item>
  <item rdf:about="http://e/2"><title>Iki</title><link>http://e/2</link></item>
</rdf:RDF>"#;
        let items = parse_document(xml).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("title"), Some("Bir"));
        assert_eq!(items[1].get("link"), Some("http://e/2"));
    }

    #[test]
    fn unknown_shape_yields_nothing() {
        assert!(parse_document("<html><body>maintenance</body></html>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_document("<rss><channel>").is_err());
        assert!(parse_document("").is_err());
    }
}
