//! Drop-target geometry
//!
//! Pure decisions over normalized pointer positions. The UI adapter
//! reduces each pointer event to a bounding box plus client coordinates;
//! everything after that point is plain math, testable without any DOM.
//!
//! Degenerate input (zero-size boxes, NaN coordinates) always reads as
//! "outside the drop zone". Never an error, never a partial preview.

/// Axis-aligned box in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Zero-size, inverted and NaN boxes all count as degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Pointer position scaled into a rect; both axes are 0..=1 inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

impl PointerOffset {
    /// Scale client coordinates into `rect`. `None` for degenerate rects
    /// and non-finite input.
    pub fn normalized(rect: Rect, client_x: f64, client_y: f64) -> Option<Self> {
        if rect.is_degenerate() {
            return None;
        }
        let x = (client_x - rect.left) / rect.width;
        let y = (client_y - rect.top) / rect.height;
        if x.is_finite() && y.is_finite() {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub fn is_inside(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// What kind of row the pointer is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverKind {
    LeafRow,
    GroupHeader,
}

/// Vertical band of a list container, relative to its padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerZone {
    /// Above the first row.
    LeadPadding,
    /// Below the last row.
    TailPadding,
    /// Over the rows themselves; per-row handling applies.
    Body,
}

/// Where a dropped entry would land relative to the hovered target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropDecision {
    InsertBefore,
    InsertAfter,
    PrependChild,
    NoOp,
}

/// Placement for a pointer over an entry row.
///
/// Leaf rows split at the vertical midpoint. Group headers reserve the
/// top quarter for sibling insertion; anything lower drops into the
/// group as its first child.
pub fn drop_decision(kind: HoverKind, offset: PointerOffset) -> DropDecision {
    if !offset.is_inside() {
        return DropDecision::NoOp;
    }
    match kind {
        HoverKind::LeafRow => {
            if offset.y < 0.5 {
                DropDecision::InsertBefore
            } else {
                DropDecision::InsertAfter
            }
        }
        HoverKind::GroupHeader => {
            if offset.y < 0.25 {
                DropDecision::InsertBefore
            } else {
                DropDecision::PrependChild
            }
        }
    }
}

/// Classify a pointer against a container's padding bands.
///
/// `None` when the pointer is outside the container or the box is
/// degenerate.
pub fn container_zone(
    container: Rect,
    lead_padding: f64,
    tail_padding: f64,
    client_x: f64,
    client_y: f64,
) -> Option<ContainerZone> {
    let offset = PointerOffset::normalized(container, client_x, client_y)?;
    if !offset.is_inside() {
        return None;
    }
    let y = client_y - container.top;
    if y < lead_padding {
        Some(ContainerZone::LeadPadding)
    } else if y > container.height - tail_padding {
        Some(ContainerZone::TailPadding)
    } else {
        Some(ContainerZone::Body)
    }
}

/// Placement for a pointer over container space outside any row.
pub fn container_decision(zone: ContainerZone) -> DropDecision {
    match zone {
        ContainerZone::LeadPadding => DropDecision::InsertBefore,
        ContainerZone::TailPadding => DropDecision::InsertAfter,
        ContainerZone::Body => DropDecision::NoOp,
    }
}

/// True when the pointer no longer falls inside `container`.
///
/// Dragleave fires when entering child elements too; testing against the
/// container's own box filters those false positives.
pub fn left_container(container: Rect, client_x: f64, client_y: f64) -> bool {
    match PointerOffset::normalized(container, client_x, client_y) {
        Some(offset) => !offset.is_inside(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Rect {
        Rect::new(10.0, 100.0, 200.0, 40.0)
    }

    fn offset_at(y: f64) -> PointerOffset {
        PointerOffset::normalized(row(), 20.0, 100.0 + y * 40.0).expect("finite rect")
    }

    #[test]
    fn leaf_rows_split_at_the_midpoint() {
        assert_eq!(
            drop_decision(HoverKind::LeafRow, offset_at(0.2)),
            DropDecision::InsertBefore
        );
        assert_eq!(
            drop_decision(HoverKind::LeafRow, offset_at(0.8)),
            DropDecision::InsertAfter
        );
        // The midpoint itself is not "above".
        assert_eq!(
            drop_decision(HoverKind::LeafRow, offset_at(0.5)),
            DropDecision::InsertAfter
        );
    }

    #[test]
    fn group_headers_reserve_the_top_quarter() {
        assert_eq!(
            drop_decision(HoverKind::GroupHeader, offset_at(0.1)),
            DropDecision::InsertBefore
        );
        assert_eq!(
            drop_decision(HoverKind::GroupHeader, offset_at(0.25)),
            DropDecision::PrependChild
        );
        assert_eq!(
            drop_decision(HoverKind::GroupHeader, offset_at(0.9)),
            DropDecision::PrependChild
        );
    }

    #[test]
    fn out_of_box_offsets_decide_nothing() {
        let above = PointerOffset { x: 0.5, y: -0.2 };
        let right = PointerOffset { x: 1.4, y: 0.5 };
        assert_eq!(drop_decision(HoverKind::LeafRow, above), DropDecision::NoOp);
        assert_eq!(
            drop_decision(HoverKind::GroupHeader, right),
            DropDecision::NoOp
        );
    }

    #[test]
    fn degenerate_rects_read_as_outside() {
        let flat = Rect::new(0.0, 0.0, 200.0, 0.0);
        assert!(flat.is_degenerate());
        assert_eq!(PointerOffset::normalized(flat, 10.0, 0.0), None);

        let inverted = Rect::new(0.0, 0.0, -5.0, 40.0);
        assert_eq!(PointerOffset::normalized(inverted, 1.0, 1.0), None);

        let nan_box = Rect::new(f64::NAN, 0.0, 100.0, 40.0);
        assert_eq!(PointerOffset::normalized(nan_box, 1.0, 1.0), None);
        assert!(left_container(nan_box, 1.0, 1.0));
    }

    #[test]
    fn non_finite_coordinates_read_as_outside() {
        assert_eq!(PointerOffset::normalized(row(), f64::NAN, 110.0), None);
        assert!(left_container(row(), f64::INFINITY, 110.0));
    }

    #[test]
    fn container_zones_follow_the_padding_bands() {
        let list = Rect::new(0.0, 0.0, 300.0, 500.0);
        assert_eq!(
            container_zone(list, 12.0, 12.0, 10.0, 5.0),
            Some(ContainerZone::LeadPadding)
        );
        assert_eq!(
            container_zone(list, 12.0, 12.0, 10.0, 495.0),
            Some(ContainerZone::TailPadding)
        );
        assert_eq!(
            container_zone(list, 12.0, 12.0, 10.0, 250.0),
            Some(ContainerZone::Body)
        );
        // Outside the box entirely.
        assert_eq!(container_zone(list, 12.0, 12.0, 10.0, 600.0), None);
    }

    #[test]
    fn container_decisions_map_to_run_edges() {
        assert_eq!(
            container_decision(ContainerZone::LeadPadding),
            DropDecision::InsertBefore
        );
        assert_eq!(
            container_decision(ContainerZone::TailPadding),
            DropDecision::InsertAfter
        );
        assert_eq!(container_decision(ContainerZone::Body), DropDecision::NoOp);
    }

    #[test]
    fn leaving_is_tested_against_the_container_box() {
        let list = Rect::new(0.0, 0.0, 300.0, 500.0);
        assert!(!left_container(list, 150.0, 250.0));
        assert!(left_container(list, 150.0, 501.0));
        assert!(left_container(list, -1.0, 250.0));
    }
}
