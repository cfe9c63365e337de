// SPDX-License-Identifier: MIT OR Apache-2.0
//! Calculator nodes: number inputs, the four arithmetic operators and a result sink.

use crate::node::{NodeCategory, NodeRegistry, NodeTemplate};
use crate::socket::SocketType;

/// Type tag carried by every calculator socket
pub const NUMBER: SocketType = 1;

/// Create the calculator node registry
pub fn create_calculator_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    registry.register(
        NodeTemplate::new("input", "Input", NodeCategory::Input, &[], &[NUMBER])
            .with_description("Constant number"),
    );

    // Binary operators
    for (id, title, description) in [
        ("add", "Add", "Sum of two numbers"),
        ("subtract", "Subtract", "Difference of two numbers"),
        ("multiply", "Multiply", "Product of two numbers"),
        ("divide", "Divide", "Quotient of two numbers"),
    ] {
        registry.register(
            NodeTemplate::new(id, title, NodeCategory::Math, &[NUMBER, NUMBER], &[NUMBER])
                .with_description(description),
        );
    }

    registry.register(
        NodeTemplate::new("output", "Output", NodeCategory::Output, &[NUMBER], &[])
            .with_description("Displays the incoming value"),
    );

    registry
}
