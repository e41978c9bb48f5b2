// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt::Write as _;

use super::graph::SupportGraph;

impl SupportGraph {
    /// Renders the graph as Graphviz DOT.
    ///
    /// Ground-supported vertices are drawn filled; edge labels carry the
    /// number of credited sub-shape pairs.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph support {\n    rankdir=BT;\n");
        for (id, v) in self.vertices() {
            let style = if v.ground_supported {
                ", style=filled, fillcolor=\"#c8e6c9\""
            } else {
                ""
            };
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "    v{} [label=\"{}\\npen={:.4} vol={:.6}\\nsupport={:.4}\"{}];",
                id.0,
                escape(v.object_id.as_str()),
                v.penetration_distance,
                v.colliding_volume,
                v.support_contribution,
                style
            );
        }
        for (_, e) in self.edges() {
            let _ = writeln!(
                out,
                "    v{} -> v{} [label=\"{}\"];",
                e.from.0,
                e.to.0,
                e.counted_shape_pairs.len()
            );
        }
        out.push_str("}\n");
        out
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
