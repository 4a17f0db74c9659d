use crate::element::Element;
use crate::error::AssemblyError;
use nalgebra::{Point, Scalar};
use serde::{Deserialize, Serialize};

pub mod procedural;

/// A mesh node: a point with `D` physical coordinates.
pub type Node<T, const D: usize> = Point<T, D>;

/// Index-based mesh owning its nodes and elements.
///
/// Elements refer to nodes by their index in [`nodes`](Self::nodes). The indices are
/// expected to be in bounds, which can be checked with [`validate`](Self::validate).
/// The assemblers check every element before using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Mesh<T: Scalar, const D: usize> {
    nodes: Vec<Node<T, D>>,
    elements: Vec<Element>,
}

pub type Mesh1d<T> = Mesh<T, 1>;
pub type Mesh2d<T> = Mesh<T, 2>;
pub type Mesh3d<T> = Mesh<T, 3>;

impl<T: Scalar, const D: usize> Mesh<T, D> {
    /// Construct a mesh from nodes and elements without checking the elements.
    pub fn from_nodes_and_elements(nodes: Vec<Node<T, D>>, elements: Vec<Element>) -> Self {
        Self { nodes, elements }
    }

    /// Construct a mesh from nodes and elements, rejecting elements that are not
    /// consistent with the nodes.
    pub fn try_from_nodes_and_elements(
        nodes: Vec<Node<T, D>>,
        elements: Vec<Element>,
    ) -> Result<Self, AssemblyError> {
        let mesh = Self::from_nodes_and_elements(nodes, elements);
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn nodes(&self) -> &[Node<T, D>] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Checks that every element has the node count and reference dimension of its kind
    /// and only refers to nodes in the mesh.
    ///
    /// Returns the error for the first offending element.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        (0..self.num_elements()).try_for_each(|element_index| self.check_element(element_index))
    }

    /// Checks a single element, see [`validate`](Self::validate).
    ///
    /// # Panics
    ///
    /// Panics if the element index is out of bounds.
    pub fn check_element(&self, element_index: usize) -> Result<(), AssemblyError> {
        let element = &self.elements[element_index];
        let kind = element.kind();
        if element.node_indices().len() != kind.num_nodes() {
            return Err(AssemblyError::NodeCountMismatch {
                element: element_index,
                kind,
                expected: kind.num_nodes(),
                actual: element.node_indices().len(),
            });
        }
        if kind.reference_dim() != D {
            return Err(AssemblyError::DimensionMismatch {
                element: element_index,
                kind,
                reference_dim: kind.reference_dim(),
                geometry_dim: D,
            });
        }
        check_node_indices(element_index, element, self.num_nodes())
    }
}

fn check_node_indices(
    element_index: usize,
    element: &Element,
    num_nodes: usize,
) -> Result<(), AssemblyError> {
    match element
        .node_indices()
        .iter()
        .find(|&&node_index| node_index >= num_nodes)
    {
        Some(&node_index) => Err(AssemblyError::NodeIndexOutOfBounds {
            element: element_index,
            node_index,
            num_nodes,
        }),
        None => Ok(()),
    }
}
