//! ComfyUI workflow exports: `{"nodes": [...], "links": [...]}`.
//!
//! Prompts are recovered by walking backwards from each sampler's `positive` and
//! `negative` inputs until a `CLIPTextEncode` node is reached. Inputs come in two shapes:
//!
//! - an object of `name -> [node_id, output_slot]` (API-style inputs embedded in a graph)
//! - an array of `{name, type, link}` slots, resolved through the top-level `links` table
//!   where each entry is `[link_id, origin_id, origin_slot, target_id, target_slot, type]`
//!
//! The walk records the shallowest depth each node was reached at and stops at a depth
//! limit, so cyclic or dangling graphs end with no prompt instead of looping.

use crate::error::ExtractResult;
use crate::prompt::PromptPair;
use serde_json::{Map, Value};
use std::collections::HashMap;

const SAMPLER_TYPES: &[&str] = &["KSampler", "KSamplerAdvanced"];
const TEXT_ENCODE_TYPE: &str = "CLIPTextEncode";

/// A reference to one output slot of another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditioningRef {
    pub target_id: String,
    pub output_slot: Option<u64>,
}

#[derive(Debug, Clone)]
struct Node<'a> {
    node_type: &'a str,
    /// Connected inputs in declaration order.
    inputs: Vec<(&'a str, ConditioningRef)>,
    widgets_values: &'a [Value],
}

impl<'a> Node<'a> {
    fn parse(node: &'a Value, links: &HashMap<String, ConditioningRef>) -> Self {
        Node {
            node_type: node.get("type").and_then(Value::as_str).unwrap_or_default(),
            inputs: node
                .get("inputs")
                .map(|inputs| parse_inputs(inputs, links))
                .unwrap_or_default(),
            widgets_values: node
                .get("widgets_values")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }

    fn is_sampler(&self) -> bool {
        SAMPLER_TYPES.contains(&self.node_type)
    }

    fn input(&self, name: &str) -> Option<&ConditioningRef> {
        self.inputs
            .iter()
            .find(|(input_name, _)| *input_name == name)
            .map(|(_, reference)| reference)
    }

    fn widget_text(&self) -> Option<String> {
        self.widgets_values.first().and_then(scalar_text)
    }
}

/// Node-id → node index for one workflow document.
#[derive(Debug)]
struct WorkflowGraph<'a> {
    nodes: HashMap<String, Node<'a>>,
    /// Every sampler entry in document order, including ones sharing or lacking an id.
    samplers: Vec<Node<'a>>,
}

impl<'a> WorkflowGraph<'a> {
    fn from_document(root: &'a Value) -> Option<Self> {
        let nodes = root.get("nodes")?.as_array()?;
        let links = root
            .get("links")
            .and_then(Value::as_array)
            .map(|links| index_links(links))
            .unwrap_or_default();

        let mut graph = WorkflowGraph {
            nodes: HashMap::with_capacity(nodes.len()),
            samplers: Vec::new(),
        };

        for node in nodes {
            let parsed = Node::parse(node, &links);
            if parsed.is_sampler() {
                graph.samplers.push(parsed.clone());
            }
            if let Some(id) = node.get("id").and_then(id_text) {
                graph.nodes.insert(id, parsed);
            }
        }

        Some(graph)
    }

    /// Follows a conditioning input back to the prompt text that feeds it.
    ///
    /// Depth-first over each node's inputs in declaration order; the first non-empty text
    /// wins. Nodes further than `max_depth` hops away are never expanded. A node is only
    /// expanded again when it is reached by a strictly shorter path than before.
    fn trace_conditioning(&self, start: &str, max_depth: usize) -> Option<String> {
        let mut shallowest: HashMap<&str, usize> = HashMap::new();
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];

        while let Some((node_id, depth)) = stack.pop() {
            match shallowest.get(node_id) {
                Some(&seen) if seen <= depth => continue,
                _ => {
                    shallowest.insert(node_id, depth);
                }
            }
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };

            if node.node_type == TEXT_ENCODE_TYPE {
                match node.widget_text() {
                    Some(text) if !text.is_empty() => return Some(text),
                    _ => continue,
                }
            }

            if depth >= max_depth {
                log::debug!(
                    "Conditioning trace from node {} stopped at depth {} (node {})",
                    start,
                    depth,
                    node_id
                );
                continue;
            }

            // Reversed so the first declared input is popped first.
            for (_, reference) in node.inputs.iter().rev() {
                stack.push((reference.target_id.as_str(), depth + 1));
            }
        }

        None
    }
}

pub fn extract(json: &str, max_trace_depth: usize) -> ExtractResult<PromptPair> {
    let root: Value = serde_json::from_str(json)?;
    let Some(graph) = WorkflowGraph::from_document(&root) else {
        return Ok(PromptPair::default());
    };

    let mut positive_prompts = Vec::new();
    let mut negative_prompts = Vec::new();

    for sampler in &graph.samplers {
        if let Some(text) = sampler
            .input("positive")
            .and_then(|reference| graph.trace_conditioning(&reference.target_id, max_trace_depth))
        {
            positive_prompts.push(text);
        }
        if let Some(text) = sampler
            .input("negative")
            .and_then(|reference| graph.trace_conditioning(&reference.target_id, max_trace_depth))
        {
            negative_prompts.push(text);
        }
    }

    Ok(PromptPair::new(
        positive_prompts.join(", "),
        negative_prompts.join(", "),
    ))
}

fn parse_inputs<'a>(
    inputs: &'a Value,
    links: &HashMap<String, ConditioningRef>,
) -> Vec<(&'a str, ConditioningRef)> {
    match inputs {
        Value::Object(map) => map
            .iter()
            .filter_map(|(name, value)| {
                conditioning_ref(value).map(|reference| (name.as_str(), reference))
            })
            .collect(),
        Value::Array(slots) => slots
            .iter()
            .filter_map(|slot| {
                let name = slot.get("name").and_then(Value::as_str)?;
                let link_id = slot.get("link").and_then(id_text)?;
                links.get(&link_id).map(|reference| (name, reference.clone()))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// `[node_id, output_slot]`, with the id as a string or an integer.
fn conditioning_ref(value: &Value) -> Option<ConditioningRef> {
    match value.as_array()?.as_slice() {
        [target, slot] if slot.is_u64() => Some(ConditioningRef {
            target_id: id_text(target)?,
            output_slot: slot.as_u64(),
        }),
        _ => None,
    }
}

fn index_links(links: &[Value]) -> HashMap<String, ConditioningRef> {
    links
        .iter()
        .filter_map(|link| match link {
            Value::Array(fields) => link_from_fields(fields),
            Value::Object(fields) => link_from_object(fields),
            _ => None,
        })
        .collect()
}

fn link_from_fields(fields: &[Value]) -> Option<(String, ConditioningRef)> {
    let link_id = id_text(fields.first()?)?;
    let reference = ConditioningRef {
        target_id: id_text(fields.get(1)?)?,
        output_slot: fields.get(2).and_then(Value::as_u64),
    };
    Some((link_id, reference))
}

fn link_from_object(fields: &Map<String, Value>) -> Option<(String, ConditioningRef)> {
    let link_id = id_text(fields.get("id")?)?;
    let reference = ConditioningRef {
        target_id: id_text(fields.get("origin_id")?)?,
        output_slot: fields.get("origin_slot").and_then(Value::as_u64),
    };
    Some((link_id, reference))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        _ => None,
    }
}
