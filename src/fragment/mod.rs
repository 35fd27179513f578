//! Boolean reconciliation.
//!
//! Kernel tags do not survive a boolean operation, so ownership of the
//! results is re-established purely by position: operands are submitted in a
//! known order and the kernel answers with one descendant list per operand,
//! in that same order. Tag values are never interpreted. An empty descendant
//! list for an operand that should have survived is fatal.

use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::kernel::{EntityRef, Kernel, Session};

/// Largest tool batch submitted to a single boolean call. Large stacks are
/// fragmented in chunks of this size to keep kernel calls tractable.
pub const CHUNK_LIMIT: usize = 10;

/// A named set of surfaces owned by one solid of the geometry.
///
/// After a boolean operation the set is rewritten in place with the
/// descendants of its previous members.
#[derive(Debug, Clone)]
pub struct ShapeGroup {
    pub name: String,
    pub entities: Vec<EntityRef>,
}

impl ShapeGroup {
    #[must_use]
    pub fn new(name: impl Into<String>, entities: Vec<EntityRef>) -> Self {
        Self {
            name: name.into(),
            entities,
        }
    }
}

/// Which boolean the reconciler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    /// All operands kept, mutually split at intersections.
    Fragment,
    /// Tools subtracted from the domain and removed.
    Cut,
}

impl BooleanKind {
    fn op(self) -> &'static str {
        match self {
            Self::Fragment => "fragment",
            Self::Cut => "cut",
        }
    }
}

/// Runs one boolean over the flattened surfaces of `groups`, with `tools` as
/// the tool operands, and rewrites every group with its descendants.
///
/// Returns the per-tool descendant lists, in tool submission order. For a
/// [`BooleanKind::Cut`] the tools are consumed and the lists are empty.
///
/// # Errors
///
/// [`ReconcileError::EmptyDescendants`] if any domain operand (or, for a
/// fragment, any tool operand) comes back with no descendants, and
/// [`ReconcileError::LengthMismatch`] if the kernel reports a different
/// operand count than was submitted.
pub fn reconcile<K: Kernel>(
    session: &mut Session<K>,
    groups: &mut [ShapeGroup],
    tools: &[EntityRef],
    kind: BooleanKind,
) -> Result<Vec<Vec<EntityRef>>> {
    let mut flat: Vec<EntityRef> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for group in groups.iter() {
        spans.push((flat.len(), group.entities.len()));
        flat.extend_from_slice(&group.entities);
    }

    let outcome = match kind {
        BooleanKind::Fragment => session.fragment(&flat, tools)?,
        BooleanKind::Cut => session.cut(&flat, tools)?,
    };

    let expected = flat.len() + tools.len();
    if outcome.descendants.len() != expected {
        return Err(ReconcileError::LengthMismatch {
            expected,
            got: outcome.descendants.len(),
        }
        .into());
    }

    for (position, (group, (start, len))) in groups.iter_mut().zip(&spans).enumerate() {
        let mut rebuilt = Vec::new();
        for offset in 0..*len {
            let index = start + offset;
            let kids = &outcome.descendants[index];
            if kids.is_empty() {
                return Err(ReconcileError::EmptyDescendants {
                    role: "domain group",
                    index: position,
                    dim: flat[index].dim.as_u8(),
                    op: kind.op(),
                }
                .into());
            }
            rebuilt.extend_from_slice(kids);
        }
        debug!(group = %group.name, surfaces = rebuilt.len(), "reconciled");
        group.entities = rebuilt;
    }

    let mut tool_fragments = Vec::with_capacity(tools.len());
    for (offset, tool) in tools.iter().enumerate() {
        let index = flat.len() + offset;
        let kids = outcome.descendants[index].clone();
        if kind == BooleanKind::Fragment && kids.is_empty() {
            return Err(ReconcileError::EmptyDescendants {
                role: "tool",
                index: offset,
                dim: tool.dim.as_u8(),
                op: kind.op(),
            }
            .into());
        }
        tool_fragments.push(kids);
    }
    Ok(tool_fragments)
}

/// Fragments a long run of groups in batches of [`CHUNK_LIMIT`].
///
/// The first group is the base; the remaining groups join the arrangement
/// chunk by chunk, each batch re-submitting everything already reconciled so
/// the result stays conformal.
///
/// # Errors
///
/// Same failure modes as [`reconcile`].
pub fn reconcile_chunked<K: Kernel>(
    session: &mut Session<K>,
    groups: &mut [ShapeGroup],
) -> Result<()> {
    if groups.len() < 2 {
        return Ok(());
    }
    let mut done = 1;
    while done < groups.len() {
        let next = (done + CHUNK_LIMIT).min(groups.len());
        let (processed, incoming) = groups.split_at_mut(done);
        let chunk = &mut incoming[..next - done];

        // the chunk's surfaces ride along as tools so their descendants come
        // back positionally too
        let tools: Vec<EntityRef> = chunk.iter().flat_map(|g| g.entities.clone()).collect();
        let tool_fragments = reconcile(session, processed, &tools, BooleanKind::Fragment)?;

        let mut cursor = 0;
        for group in chunk.iter_mut() {
            let len = group.entities.len();
            let mut rebuilt = Vec::new();
            for kids in &tool_fragments[cursor..cursor + len] {
                rebuilt.extend_from_slice(kids);
            }
            cursor += len;
            group.entities = rebuilt;
        }
        done = next;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MagmeshError;
    use crate::kernel::{Dim, PlanarKernel};
    use crate::math::Point2;

    fn session() -> Session<PlanarKernel> {
        Session::new(PlanarKernel::new())
    }

    fn vertical_line(s: &mut Session<PlanarKernel>, x: f64, z0: f64, z1: f64) -> EntityRef {
        let a = s.add_point(Point2::new(x, z0));
        let b = s.add_point(Point2::new(x, z1));
        s.add_line(a, b)
    }

    #[test]
    fn groups_follow_their_descendants() {
        let mut s = session();
        let lower = s.add_rectangle(100.0, -50.0, 50.0, 50.0);
        let upper = s.add_rectangle(100.0, 0.0, 50.0, 50.0);
        let line = vertical_line(&mut s, 120.0, -50.0, 50.0);

        let mut groups = vec![
            ShapeGroup::new("B1", vec![lower]),
            ShapeGroup::new("B2", vec![upper]),
        ];
        let lines = reconcile(&mut s, &mut groups, &[line], BooleanKind::Fragment).unwrap();

        assert_eq!(groups[0].entities.len(), 2);
        assert_eq!(groups[1].entities.len(), 2);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].is_empty());
        assert!(lines[0].iter().all(|e| e.dim == Dim::Curve));
    }

    #[test]
    fn untouched_group_keeps_single_surface() {
        let mut s = session();
        let far = s.add_rectangle(0.0, 0.0, 10.0, 10.0);
        let near = s.add_rectangle(100.0, -50.0, 50.0, 100.0);
        let line = vertical_line(&mut s, 120.0, -50.0, 50.0);

        let mut groups = vec![
            ShapeGroup::new("left", vec![far]),
            ShapeGroup::new("right", vec![near]),
        ];
        reconcile(&mut s, &mut groups, &[line], BooleanKind::Fragment).unwrap();

        assert_eq!(groups[0].entities.len(), 1);
        assert_eq!(groups[1].entities.len(), 2);
        // identity is positional: the surviving surface is still a fresh tag
        assert_ne!(groups[0].entities[0], far);
    }

    #[test]
    fn cut_consumes_tools() {
        let mut s = session();
        let base = s.add_rectangle(0.0, 0.0, 10.0, 10.0);
        let hole = s.add_rectangle(4.0, 4.0, 2.0, 2.0);

        let mut groups = vec![ShapeGroup::new("base", vec![base])];
        let tool_fragments =
            reconcile(&mut s, &mut groups, &[hole], BooleanKind::Cut).unwrap();

        assert!(groups[0].entities.len() > 1);
        assert!(tool_fragments[0].is_empty());
    }

    #[test]
    fn swallowed_domain_is_fatal() {
        let mut s = session();
        let small = s.add_rectangle(4.0, 4.0, 1.0, 1.0);
        let big = s.add_rectangle(0.0, 0.0, 10.0, 10.0);

        let mut groups = vec![ShapeGroup::new("small", vec![small])];
        let err = reconcile(&mut s, &mut groups, &[big], BooleanKind::Cut).unwrap_err();
        assert!(matches!(
            err,
            MagmeshError::Reconcile(ReconcileError::EmptyDescendants { index: 0, .. })
        ));
    }

    #[test]
    fn swallowed_group_reports_its_position() {
        let mut s = session();
        let a0 = s.add_rectangle(0.0, 0.0, 1.0, 1.0);
        let a1 = s.add_rectangle(2.0, 0.0, 1.0, 1.0);
        let b = s.add_rectangle(10.0, 10.0, 1.0, 1.0);
        let tool = s.add_rectangle(9.0, 9.0, 3.0, 3.0);

        let mut groups = vec![
            ShapeGroup::new("a", vec![a0, a1]),
            ShapeGroup::new("b", vec![b]),
        ];
        let err = reconcile(&mut s, &mut groups, &[tool], BooleanKind::Cut).unwrap_err();
        // the group position, not the flat entity offset
        assert!(matches!(
            err,
            MagmeshError::Reconcile(ReconcileError::EmptyDescendants { index: 1, .. })
        ));
    }

    #[test]
    fn chunked_fragmentation_reconciles_every_group() {
        let mut s = session();
        let mut groups = Vec::new();
        // a column of touching unit squares, more than one chunk worth
        for i in 0..25 {
            let z = f64::from(i);
            let tag = s.add_rectangle(0.0, z, 1.0, 1.0);
            groups.push(ShapeGroup::new(format!("p{i}"), vec![tag]));
        }
        reconcile_chunked(&mut s, &mut groups).unwrap();
        for g in &groups {
            assert_eq!(g.entities.len(), 1, "group {} lost its surface", g.name);
        }
        s.synchronize();
        for g in &groups {
            assert!(s.bounding_box(g.entities[0]).is_ok());
        }
    }
}
