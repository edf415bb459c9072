//! QForge Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures the transformation
//! engine operates on.
//!
//! # Overview
//!
//! Circuits are fixed-width and stored as a DAG (Directed Acyclic Graph)
//! whose edges are qubit wires. The DAG exposes ASAP layering and
//! wire-neighbour queries, which is what rewrite rules and the layered
//! encoder need. The high-level [`Circuit`] API provides a builder on top.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing wires
//! - **Gates**: [`StandardGate`] for the built-in gate set
//! - **Parameters**: [`ParameterExpression`] for symbolic and concrete angles
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **DAG**: [`CircuitDag`] for the internal graph representation
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qforge_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 2);
//! assert_eq!(circuit.dag().layers().len(), 2);
//! ```
//!
//! # Example: Binding a Gate Template
//!
//! ```rust
//! use qforge_ir::StandardGate;
//!
//! let template = StandardGate::from_name("rz").unwrap();
//! assert_eq!(template.free_parameter_count(), 1);
//!
//! let bound = template.bind_free_parameters(&[0.5]).unwrap();
//! assert_eq!(bound.angle(), Some(0.5));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `SX`, `SXdg` | 1 | sqrt(X) and its inverse |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `CX`, `CZ` | 2 | Controlled-NOT and Controlled-Z |
//! | `Swap` | 2 | SWAP gate |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex};
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::Instruction;
pub use parameter::{ParameterExpression, normalize_angle};
pub use qubit::QubitId;
