//! Stack geometry.
//!
//! Records stack upward from an anchor at `screen_height - margin_bottom`,
//! right-aligned at `screen_width - margin_right`. All functions here are pure
//! over the slice of on-screen records; the scheduler decides when to call them.

use std::cmp::Reverse;

use procwatch_core::config::NotificationConfig;

use super::types::{NotificationId, NotificationRecord, ProcessDetails};

/// Position changes smaller than this, on both axes, are not applied.
pub const MOVE_EPSILON: i32 = 2;

/// Horizontal padding around the text of an expanded record.
const CONTENT_PADDING: i32 = 70;
/// Approximate advance of one character of record text.
const CHAR_WIDTH: i32 = 7;
/// Expanded records never come closer than this to the left screen edge.
const SCREEN_EDGE_MARGIN: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub screen_width: i32,
    pub screen_height: i32,
    pub margin_right: i32,
    pub margin_bottom: i32,
    pub spacing: i32,
    pub top_margin: i32,
    pub max_notifications: u32,
    pub height: i32,
    pub collapsed_width: i32,
}

impl LayoutParams {
    /// Bottom edge of the lowest slot.
    pub fn anchor(&self) -> i32 {
        self.screen_height - self.margin_bottom
    }

    /// Vertical space one record takes, gap included.
    pub fn slot(&self) -> i32 {
        self.height + self.spacing
    }

    /// Highest y any record may take: the soft capacity limit, but never above
    /// the top margin.
    pub fn floor(&self) -> i32 {
        let limit = i32::try_from(self.max_notifications).unwrap_or(i32::MAX);
        let capacity = limit.saturating_mul(self.slot());
        self.anchor().saturating_sub(capacity).max(self.top_margin)
    }

    /// Right-aligned x for a record of `width`.
    pub fn right_x(&self, width: i32) -> i32 {
        self.screen_width - width - self.margin_right
    }

    /// Full width needed to show the longest text line of `process`.
    pub fn full_width_for(&self, process: &ProcessDetails) -> i32 {
        let longest = [process.name.chars().count(), process.path.chars().count(), process.pid_label().chars().count()]
            .into_iter()
            .max()
            .unwrap_or(0) as i32;
        let wanted = CONTENT_PADDING + longest.saturating_mul(CHAR_WIDTH);
        let max_width = (self.screen_width - SCREEN_EDGE_MARGIN).max(self.collapsed_width);
        wanted.clamp(self.collapsed_width, max_width)
    }
}

impl From<&NotificationConfig> for LayoutParams {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            screen_width: config.screen_width,
            screen_height: config.screen_height,
            margin_right: config.margin_right,
            margin_bottom: config.margin_bottom,
            spacing: config.spacing,
            top_margin: config.top_margin,
            max_notifications: config.max_notifications,
            height: config.height,
            collapsed_width: config.collapsed_width,
        }
    }
}

/// A position change applied by a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub id: NotificationId,
    pub x: i32,
    pub y: i32,
}

/// Room left between the stack's reference point and the floor, in slots.
///
/// The reference is the topmost obstacle if any, otherwise the anchor. Only
/// records above the reference consume space; records trapped under an
/// obstacle do not give any back.
pub fn available_slots(records: &[NotificationRecord], params: &LayoutParams) -> usize {
    let reference = records
        .iter()
        .filter(|r| r.is_obstacle())
        .map(|r| r.geometry.y)
        .min()
        .unwrap_or_else(|| params.anchor());
    let consumed: i32 = records
        .iter()
        .filter(|r| !r.is_obstacle() && r.geometry.y < reference)
        .map(|r| r.geometry.height + params.spacing)
        .sum();
    let available = reference - params.floor() - consumed;
    if available <= 0 || params.slot() <= 0 {
        0
    } else {
        (available / params.slot()) as usize
    }
}

/// y for a new record of `height`: directly above the topmost record, or on
/// the anchor for an empty stack, never above the floor.
pub fn placement_y(records: &[NotificationRecord], height: i32, params: &LayoutParams) -> i32 {
    let ideal = match records.iter().map(|r| r.geometry.y).min() {
        Some(top) => top - params.spacing - height,
        None => params.anchor() - height,
    };
    ideal.max(params.floor())
}

fn bottom_up_order(records: &[NotificationRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| (Reverse(records[i].geometry.y), i));
    order
}

fn exceeds_epsilon(dx: i32, dy: i32) -> bool {
    dx.abs() >= MOVE_EPSILON || dy.abs() >= MOVE_EPSILON
}

/// Re-stacks records bottom to top and right-aligns them.
///
/// Each record's target derives from the *actual* resulting position of the
/// record below it. Obstacles keep their y and become the new reference. A
/// record below an obstacle whose target would reach into the obstacle's
/// footprint stays where it is. Repeating the pass without a state change
/// yields no moves.
pub fn reposition(records: &mut [NotificationRecord], params: &LayoutParams) -> Vec<Move> {
    let obstacles: Vec<(i32, i32)> = records
        .iter()
        .filter(|r| r.is_obstacle())
        .map(|r| (r.geometry.y, r.geometry.bottom()))
        .collect();
    let floor = params.floor();

    let mut moves = Vec::new();
    let mut expected_bottom = params.anchor();
    for index in bottom_up_order(records) {
        let record = &mut records[index];
        let target_x = params.right_x(record.effective_width());

        if record.is_obstacle() {
            if (target_x - record.geometry.x).abs() >= MOVE_EPSILON {
                record.geometry.x = target_x;
                moves.push(Move { id: record.id, x: target_x, y: record.geometry.y });
            }
            expected_bottom = record.geometry.y - params.spacing;
            continue;
        }

        let current_y = record.geometry.y;
        let mut target_y = (expected_bottom - record.geometry.height).max(floor);
        let crosses_obstacle = obstacles
            .iter()
            .any(|&(top, bottom)| current_y > top && target_y < bottom + params.spacing);
        if crosses_obstacle {
            target_y = current_y;
        }

        if exceeds_epsilon(target_x - record.geometry.x, target_y - current_y) {
            record.geometry.x = target_x;
            record.geometry.y = target_y;
            moves.push(Move { id: record.id, x: target_x, y: target_y });
        }
        expected_bottom = record.geometry.y - params.spacing;
    }
    moves
}

/// A hole in the stack: where a record of `height` would sit at `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySpace {
    pub y: i32,
    pub height: i32,
}

/// Holes between vertically adjacent records, scanning from the top.
///
/// Scanning stops at the first obstacle: a hole directly above it is still
/// reported, nothing below it is.
pub fn find_empty_spaces(records: &[NotificationRecord], params: &LayoutParams) -> Vec<EmptySpace> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| (records[i].geometry.y, i));

    let mut spaces = Vec::new();
    for pair in order.windows(2) {
        let (upper, lower) = (&records[pair[0]], &records[pair[1]]);
        if upper.is_obstacle() {
            return spaces;
        }
        let expected_y = lower.geometry.y - params.spacing - upper.geometry.height;
        if expected_y - upper.geometry.y >= MOVE_EPSILON {
            spaces.push(EmptySpace { y: expected_y, height: upper.geometry.height });
        }
        if lower.is_obstacle() {
            return spaces;
        }
    }

    if let Some(&last) = order.last() {
        let lowest = &records[last];
        if !lowest.is_obstacle() {
            let expected_y = params.anchor() - lowest.geometry.height;
            if expected_y - lowest.geometry.y >= MOVE_EPSILON {
                spaces.push(EmptySpace { y: expected_y, height: lowest.geometry.height });
            }
        }
    }
    spaces
}

/// Slides the lowest record above `space` down into it.
///
/// Gives up when that record is an obstacle; obstacles are never moved to
/// fill a hole.
pub fn fill_empty_space(
    records: &mut [NotificationRecord],
    space: EmptySpace,
    params: &LayoutParams,
) -> Option<Move> {
    let index = (0..records.len())
        .filter(|&i| records[i].geometry.y < space.y)
        .max_by_key(|&i| (records[i].geometry.y, Reverse(i)))?;
    let record = &mut records[index];
    if record.is_obstacle() {
        return None;
    }
    let x = params.right_x(record.effective_width());
    let y = space.y + space.height - record.geometry.height;
    record.geometry.x = x;
    record.geometry.y = y;
    Some(Move { id: record.id, x, y })
}
