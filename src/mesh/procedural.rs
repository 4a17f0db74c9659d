//! Basic procedural mesh generation routines.
use crate::element::Element;
use crate::mesh::{Mesh1d, Mesh2d};
use crate::Real;
use nalgebra::{Point1, Point2, Vector2};

/// Uniform segment mesh of the unit interval `[0, 1]`.
pub fn create_unit_interval_uniform_segment_mesh_1d<T: Real>(cells: usize) -> Mesh1d<T> {
    create_uniform_segment_mesh_1d(T::zero(), T::one(), cells)
}

/// Uniform segment mesh of the interval `[a, b]` with the given number of cells.
///
/// Nodes are numbered from `a` to `b`, and element `i` connects nodes `i` and `i + 1`.
pub fn create_uniform_segment_mesh_1d<T: Real>(a: T, b: T, cells: usize) -> Mesh1d<T> {
    if cells == 0 {
        return Mesh1d::from_nodes_and_elements(Vec::new(), Vec::new());
    }

    let num_cells = T::from_usize(cells).expect("Must be able to fit usize in T");
    let h = (b - a) / num_cells;
    let nodes = (0..=cells)
        .map(|i| {
            let i_as_t = T::from_usize(i).expect("Must be able to fit usize in T");
            Point1::new(a + i_as_t * h)
        })
        .collect();
    let elements = (0..cells).map(|i| Element::segment2([i, i + 1])).collect();
    Mesh1d::from_nodes_and_elements(nodes, elements)
}

/// Uniform quad mesh of the unit square `[0, 1]^2`.
pub fn create_unit_square_uniform_quad_mesh_2d<T: Real>(cells_per_dim: usize) -> Mesh2d<T> {
    create_rectangular_uniform_quad_mesh_2d(
        &Vector2::new(T::one(), T::one()),
        [cells_per_dim, cells_per_dim],
        &Point2::origin(),
    )
}

/// Generates an axis-aligned rectangular uniform quad mesh given its extents, the number of
/// cells along each axis and its bottom-left corner.
///
/// Nodes are numbered row by row starting at the bottom-left corner, and each quad lists
/// its nodes counterclockwise starting from its own bottom-left node.
pub fn create_rectangular_uniform_quad_mesh_2d<T: Real>(
    extents: &Vector2<T>,
    cells: [usize; 2],
    bottom_left: &Point2<T>,
) -> Mesh2d<T> {
    let [num_cells_x, num_cells_y] = cells;
    if num_cells_x == 0 || num_cells_y == 0 {
        return Mesh2d::from_nodes_and_elements(Vec::new(), Vec::new());
    }

    let to_t = |i: usize| T::from_usize(i).expect("Must be able to fit usize in T");
    let cell_size = Vector2::new(extents.x / to_t(num_cells_x), extents.y / to_t(num_cells_y));
    let num_nodes_x = num_cells_x + 1;
    let to_global_node_index = |i, j| num_nodes_x * j + i;

    let mut nodes = Vec::with_capacity(num_nodes_x * (num_cells_y + 1));
    for j in 0..=num_cells_y {
        for i in 0..=num_cells_x {
            let offset = Vector2::new(to_t(i) * cell_size.x, to_t(j) * cell_size.y);
            nodes.push(bottom_left + offset);
        }
    }

    let mut elements = Vec::with_capacity(num_cells_x * num_cells_y);
    for j in 0..num_cells_y {
        for i in 0..num_cells_x {
            elements.push(Element::quad4([
                to_global_node_index(i, j),
                to_global_node_index(i + 1, j),
                to_global_node_index(i + 1, j + 1),
                to_global_node_index(i, j + 1),
            ]));
        }
    }

    Mesh2d::from_nodes_and_elements(nodes, elements)
}
