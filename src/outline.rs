//! Structural outline of a YAML document
//!
//! The document is parsed with tree-sitter-yaml and flattened into an arena
//! of mappings, sequences, sequence items, key-values and scalars carrying
//! byte ranges and parent links. Anchors, tags and the block/flow node
//! wrappers are transparent, so `metadata: &m` still owns its `name` key and
//! a flow mapping nests exactly like a block one.

use crate::navigation::KeyPathTree;
use crate::types::TextRange;
use tree_sitter::{Node as SyntaxNode, Parser};

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Mapping,
    Sequence,
    SequenceItem,
    KeyValue { key: String, key_range: TextRange },
    Scalar { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
}

/// Token under a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The key-value (for a key) or scalar node
    pub node: NodeId,
    /// Token text without surrounding quotes
    pub text: String,
    pub range: TextRange,
    pub is_key: bool,
}

const SCALAR_KINDS: &[&str] = &[
    "plain_scalar",
    "double_quote_scalar",
    "single_quote_scalar",
    "block_scalar",
];

/// Parsed outline
#[derive(Debug, Clone, Default)]
pub struct YamlOutline {
    nodes: Vec<Node>,
}

impl YamlOutline {
    /// Parse `text`. Syntax errors leave the unaffected parts of the tree
    /// usable; a parser that cannot be set up yields an empty outline.
    pub fn parse(text: &str) -> Self {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&tree_sitter_yaml::LANGUAGE.into()) {
            log::warn!("YAML grammar could not be loaded: {}", e);
            return Self::default();
        }

        let Some(tree) = parser.parse(text, None) else {
            log::warn!("YAML parse produced no tree");
            return Self::default();
        };

        let mut outline = Self::default();
        outline.walk(tree.root_node(), text, None);
        outline
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(id))
            .map(|(i, _)| i)
    }

    /// Key text of a key-value node
    pub fn key(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::KeyValue { key, .. } => Some(key),
            _ => None,
        }
    }

    /// A key-value has a value when anything hangs below it
    pub fn has_value(&self, id: NodeId) -> bool {
        self.children(id).next().is_some()
    }

    /// Text of a key-value's inline scalar value
    pub fn scalar_value(&self, id: NodeId) -> Option<&str> {
        self.children(id).find_map(|child| match &self.nodes[child].kind {
            NodeKind::Scalar { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Innermost key or scalar token containing `offset`
    pub fn token_at(&self, offset: usize) -> Option<Token> {
        let mut best: Option<Token> = None;

        for (id, node) in self.nodes.iter().enumerate() {
            let token = match &node.kind {
                NodeKind::KeyValue { key, key_range } if key_range.contains(offset) => Token {
                    node: id,
                    text: key.clone(),
                    range: *key_range,
                    is_key: true,
                },
                NodeKind::Scalar { text } if node.range.contains(offset) => Token {
                    node: id,
                    text: text.clone(),
                    range: node.range,
                    is_key: false,
                },
                _ => continue,
            };

            if best.as_ref().map_or(true, |b| token.range.len() < b.range.len()) {
                best = Some(token);
            }
        }

        best
    }

    /// Nearest key-value at or above a node
    pub fn enclosing_key_value(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if self.key(node_id).is_some() {
                return Some(node_id);
            }
            current = self.parent(node_id);
        }
        None
    }

    /// Dotted path of keys from the document root down to a key-value
    pub fn key_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.key(node_id) {
                Some(key) => segments.push(key.to_string()),
                None => break,
            }
            current = self.parent_key_value(node_id);
        }
        segments.reverse();
        segments.join(".")
    }
}

impl KeyPathTree for YamlOutline {
    type Node = NodeId;

    fn key_text(&self, node: NodeId) -> Option<&str> {
        self.key(node)
    }

    /// Key-values sit in a mapping, which hangs either straight off the parent
    /// key-value or off a sequence item; the item adds the sequence hop.
    fn parent_key_value(&self, node: NodeId) -> Option<NodeId> {
        let mapping = self.parent(node)?;
        let above = self.parent(mapping)?;

        match self.nodes[above].kind {
            NodeKind::KeyValue { .. } => Some(above),
            NodeKind::SequenceItem => {
                let sequence = self.parent(above)?;
                let owner = self.parent(sequence)?;
                self.key(owner).map(|_| owner)
            }
            _ => None,
        }
    }
}

impl YamlOutline {
    fn push(&mut self, kind: NodeKind, range: TextRange, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node {
            kind,
            range,
            parent,
        });
        self.nodes.len() - 1
    }

    fn walk(&mut self, node: SyntaxNode<'_>, source: &str, parent: Option<NodeId>) {
        match node.kind() {
            "block_mapping" | "flow_mapping" => {
                let id = self.push(NodeKind::Mapping, range_of(node), parent);
                self.walk_children(node, source, Some(id));
            }
            "block_sequence" => {
                let id = self.push(NodeKind::Sequence, range_of(node), parent);
                self.walk_children(node, source, Some(id));
            }
            "block_sequence_item" => {
                let id = self.push(NodeKind::SequenceItem, range_of(node), parent);
                self.walk_children(node, source, Some(id));
            }
            "flow_sequence" => self.flow_sequence(node, source, parent),
            "block_mapping_pair" | "flow_pair" => self.pair(node, source, parent),
            kind if SCALAR_KINDS.contains(&kind) => {
                let raw = &source[node.byte_range()];
                let trimmed = raw.trim_end();
                let range = TextRange::new(node.start_byte(), node.start_byte() + trimmed.len());
                self.push(
                    NodeKind::Scalar {
                        text: scalar_text(kind, trimmed),
                    },
                    range,
                    parent,
                );
            }
            "comment" | "alias" => {}
            // stream, document, block_node, flow_node, anchor, tag, ERROR
            _ => self.walk_children(node, source, parent),
        }
    }

    fn walk_children(&mut self, node: SyntaxNode<'_>, source: &str, parent: Option<NodeId>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, source, parent);
        }
    }

    /// Flow sequence entries get an item node so they ascend like block items
    fn flow_sequence(&mut self, node: SyntaxNode<'_>, source: &str, parent: Option<NodeId>) {
        let sequence = self.push(NodeKind::Sequence, range_of(node), parent);

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "flow_node" => {
                    let item = self.push(NodeKind::SequenceItem, range_of(child), Some(sequence));
                    self.walk(child, source, Some(item));
                }
                // `[key: value]` is a single-pair mapping
                "flow_pair" => {
                    let item = self.push(NodeKind::SequenceItem, range_of(child), Some(sequence));
                    let mapping = self.push(NodeKind::Mapping, range_of(child), Some(item));
                    self.pair(child, source, Some(mapping));
                }
                _ => {}
            }
        }
    }

    fn pair(&mut self, node: SyntaxNode<'_>, source: &str, parent: Option<NodeId>) {
        let Some(key_node) = node.child_by_field_name("key") else {
            self.walk_children(node, source, parent);
            return;
        };

        let key = match find_scalar(key_node) {
            Some(scalar) => scalar_text(scalar.kind(), source[scalar.byte_range()].trim_end()),
            None => source[key_node.byte_range()].trim().to_string(),
        };

        let kv = self.push(
            NodeKind::KeyValue {
                key,
                key_range: range_of(key_node),
            },
            range_of(node),
            parent,
        );

        if let Some(value) = node.child_by_field_name("value") {
            self.walk(value, source, Some(kv));
        }
    }
}

fn range_of(node: SyntaxNode<'_>) -> TextRange {
    TextRange::new(node.start_byte(), node.end_byte())
}

/// First scalar at or below `node`, skipping anchors and tags
fn find_scalar(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    if SCALAR_KINDS.contains(&node.kind()) {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(find_scalar)
}

/// Scalar value without quotes or block indicators
fn scalar_text(kind: &str, raw: &str) -> String {
    match kind {
        "double_quote_scalar" => unquote(raw, '"').to_string(),
        "single_quote_scalar" => unquote(raw, '\'').replace("''", "'"),
        "block_scalar" => raw
            .lines()
            .skip(1)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => raw.trim().to_string(),
    }
}

fn unquote(raw: &str, quote: char) -> &str {
    raw.strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .unwrap_or(raw)
}
