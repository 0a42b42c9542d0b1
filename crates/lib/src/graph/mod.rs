//! Component dependency graph.
//!
//! The graph is built once from a component table and validated up front:
//! every requirement must name a known component and the graph must be
//! acyclic. Queries then walk the `requires` edges.

mod types;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::trace;

use crate::options::OptionRegistry;

pub use types::*;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
  #[error("component '{component}' requires unknown component '{requirement}'")]
  UnknownComponent { component: String, requirement: String },

  #[error("component '{0}' is declared more than once")]
  DuplicateComponent(String),

  #[error("cyclic dependency: {}", chain.join(" -> "))]
  CyclicDependency { chain: Vec<String> },

  #[error("component not found: {0}")]
  NotFound(String),
}

/// A validated, acyclic component graph.
#[derive(Debug, Clone)]
pub struct ComponentGraph {
  components: BTreeMap<String, Component>,

  /// Edges point from a requirement to the component that requires it.
  graph: DiGraph<String, ()>,

  nodes: HashMap<String, NodeIndex>,

  /// Requirements before dependents.
  order: Vec<String>,
}

impl ComponentGraph {
  /// Build and validate a graph.
  pub fn new(components: impl IntoIterator<Item = Component>) -> Result<Self, GraphError> {
    let mut graph = Self::assemble(components)?;
    graph.order = graph.compute_order()?;
    Ok(graph)
  }

  /// The lely-core component graph, with system libraries gated by `options`.
  pub fn lely(options: &OptionRegistry) -> Result<Self, GraphError> {
    Self::new(COMPONENTS.iter().map(|def| def.instantiate(options)))
  }

  /// Create nodes and edges without checking for cycles.
  fn assemble(components: impl IntoIterator<Item = Component>) -> Result<Self, GraphError> {
    let mut by_name = BTreeMap::new();
    for component in components {
      if by_name.contains_key(&component.name) {
        return Err(GraphError::DuplicateComponent(component.name));
      }
      by_name.insert(component.name.clone(), component);
    }

    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();
    for name in by_name.keys() {
      nodes.insert(name.clone(), graph.add_node(name.clone()));
    }

    for component in by_name.values() {
      let dependent = nodes[&component.name];
      for requirement in &component.requires {
        let Some(&dependency) = nodes.get(requirement) else {
          return Err(GraphError::UnknownComponent {
            component: component.name.clone(),
            requirement: requirement.clone(),
          });
        };
        graph.add_edge(dependency, dependent, ());
      }
    }

    Ok(Self {
      components: by_name,
      graph,
      nodes,
      order: Vec::new(),
    })
  }

  fn compute_order(&self) -> Result<Vec<String>, GraphError> {
    match toposort(&self.graph, None) {
      Ok(sorted) => Ok(sorted.into_iter().map(|idx| self.graph[idx].clone()).collect()),
      Err(cycle) => {
        let name = &self.graph[cycle.node_id()];
        // Walk from the offending node to report the full chain.
        match self.resolve_transitive(name) {
          Err(err) => Err(err),
          Ok(_) => Err(GraphError::CyclicDependency {
            chain: vec![name.clone(), name.clone()],
          }),
        }
      }
    }
  }

  pub fn get(&self, name: &str) -> Option<&Component> {
    self.components.get(name)
  }

  /// Components in name order.
  pub fn components(&self) -> impl Iterator<Item = &Component> {
    self.components.values()
  }

  /// Component names with every requirement listed before its dependents.
  pub fn topological_order(&self) -> &[String] {
    &self.order
  }

  /// Components that directly require `name`.
  pub fn dependents(&self, name: &str) -> Vec<&str> {
    let Some(&idx) = self.nodes.get(name) else {
      return Vec::new();
    };
    let mut dependents: Vec<&str> = self
      .graph
      .neighbors_directed(idx, petgraph::Direction::Outgoing)
      .map(|dep| self.graph[dep].as_str())
      .collect();
    dependents.sort_unstable();
    dependents
  }

  /// Every component reachable from `name` through `requires` edges.
  ///
  /// The result excludes `name` itself. Reaching a component that is still
  /// being visited fails with [`GraphError::CyclicDependency`].
  pub fn resolve_transitive(&self, name: &str) -> Result<BTreeSet<String>, GraphError> {
    let Some((name, _)) = self.components.get_key_value(name) else {
      return Err(GraphError::NotFound(name.to_string()));
    };

    let mut stack = vec![name.as_str()];
    let mut visited = BTreeSet::new();
    self.visit(name, &mut stack, &mut visited)?;
    Ok(visited)
  }

  fn visit<'a>(
    &'a self,
    name: &'a str,
    stack: &mut Vec<&'a str>,
    visited: &mut BTreeSet<String>,
  ) -> Result<(), GraphError> {
    let component = self
      .components
      .get(name)
      .ok_or_else(|| GraphError::NotFound(name.to_string()))?;

    for requirement in &component.requires {
      if let Some(pos) = stack.iter().position(|on_stack| *on_stack == requirement.as_str()) {
        let mut chain: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
        chain.push(requirement.clone());
        return Err(GraphError::CyclicDependency { chain });
      }
      if visited.contains(requirement) {
        continue;
      }

      trace!(component = %name, requirement = %requirement, "visiting requirement");
      stack.push(requirement);
      self.visit(requirement, stack, visited)?;
      stack.pop();
      visited.insert(requirement.clone());
    }

    Ok(())
  }
}
